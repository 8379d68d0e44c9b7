//! Query and predicate builder
//!
//! A [`Where`] is a flat conjunction of [`Relation`]s. There is no
//! disjunction and no nesting: the backing store only evaluates flat
//! predicates. The builder performs no filtering itself; executing a
//! [`StoreObjectQuery`] hands it to the backing store.

use crate::object::StoreObject;
use crate::traits::ObjectStore;
use objectstore_core::{ConsistencyLevel, Error, Primitive, Result, StoreObjectMetadata};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Comparison operator of a single-value relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationOp {
    /// Equal to
    Eq,
    /// Greater than
    Gt,
    /// Less than
    Lt,
    /// Greater than or equal to
    Gte,
    /// Less than or equal to
    Lte,
}

impl RelationOp {
    /// Check if an ordering of `stored` against the bound value satisfies
    /// this operator
    pub fn matches(&self, ordering: Ordering) -> bool {
        match self {
            RelationOp::Eq => ordering == Ordering::Equal,
            RelationOp::Gt => ordering == Ordering::Greater,
            RelationOp::Lt => ordering == Ordering::Less,
            RelationOp::Gte => ordering != Ordering::Less,
            RelationOp::Lte => ordering != Ordering::Greater,
        }
    }

    /// Operator symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            RelationOp::Eq => "=",
            RelationOp::Gt => ">",
            RelationOp::Lt => "<",
            RelationOp::Gte => ">=",
            RelationOp::Lte => "<=",
        }
    }
}

impl fmt::Display for RelationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One predicate on one field
///
/// Either an operator with exactly one value, or a membership test ("IN")
/// with the operator unset and any number of candidate values. Immutable once
/// built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    identifier: String,
    op: Option<RelationOp>,
    values: Vec<Primitive>,
}

impl Relation {
    /// Single-value comparison
    pub fn new(
        identifier: impl Into<String>,
        op: RelationOp,
        value: impl Into<Primitive>,
    ) -> Result<Self> {
        let identifier = Self::check_identifier(identifier.into())?;
        Ok(Relation {
            identifier,
            op: Some(op),
            values: vec![value.into()],
        })
    }

    /// Membership test; candidate order is preserved
    pub fn one_of(
        identifier: impl Into<String>,
        values: impl IntoIterator<Item = Primitive>,
    ) -> Result<Self> {
        let identifier = Self::check_identifier(identifier.into())?;
        Ok(Relation {
            identifier,
            op: None,
            values: values.into_iter().collect(),
        })
    }

    fn check_identifier(identifier: String) -> Result<String> {
        if identifier.is_empty() {
            return Err(Error::invalid_argument("relation identifier cannot be empty"));
        }
        Ok(identifier)
    }

    /// Field the relation applies to
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Operator, `None` for a membership test
    pub fn op(&self) -> Option<RelationOp> {
        self.op
    }

    /// Bound values (exactly one unless this is a membership test)
    pub fn values(&self) -> &[Primitive] {
        &self.values
    }

    /// Check if this is a membership test
    pub fn is_membership(&self) -> bool {
        self.op.is_none()
    }

    /// Evaluate against a stored value
    ///
    /// Values of different kinds never match.
    pub fn matches(&self, stored: &Primitive) -> bool {
        match self.op {
            None => self.values.iter().any(|v| v == stored),
            Some(op) => self
                .values
                .first()
                .and_then(|v| stored.compare(v))
                .map(|ordering| op.matches(ordering))
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Some(op) => match self.values.first() {
                Some(v) => write!(f, "{} {} {}", self.identifier, op, v),
                None => write!(f, "{} {} ?", self.identifier, op),
            },
            None => {
                write!(f, "{} IN (", self.identifier)?;
                for (i, v) in self.values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Conjunction of relations
///
/// ```ignore
/// let filter = Where::new()
///     .equal_to("status", "open")?
///     .greater_than("priority", 2i32)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Where {
    relations: Vec<Relation>,
}

impl Where {
    /// Empty conjunction (matches everything)
    pub fn new() -> Self {
        Where::default()
    }

    /// One-relation filter: `identifier = value`
    ///
    /// The static factories start a filter without `Where::new()`; the
    /// chained methods below extend it.
    pub fn equal(identifier: impl Into<String>, value: impl Into<Primitive>) -> Result<Self> {
        Where::new().equal_to(identifier, value)
    }

    /// One-relation filter: `identifier > value`
    pub fn greater(identifier: impl Into<String>, value: impl Into<Primitive>) -> Result<Self> {
        Where::new().greater_than(identifier, value)
    }

    /// One-relation filter: `identifier < value`
    pub fn less(identifier: impl Into<String>, value: impl Into<Primitive>) -> Result<Self> {
        Where::new().less_than(identifier, value)
    }

    /// One-relation filter: `identifier >= value`
    pub fn at_least(identifier: impl Into<String>, value: impl Into<Primitive>) -> Result<Self> {
        Where::new().greater_than_or_equal_to(identifier, value)
    }

    /// One-relation filter: `identifier <= value`
    pub fn at_most(identifier: impl Into<String>, value: impl Into<Primitive>) -> Result<Self> {
        Where::new().less_than_or_equal_to(identifier, value)
    }

    /// One-relation filter: `identifier IN (values...)`, order preserved
    pub fn one_of<V: Into<Primitive>>(
        identifier: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self> {
        Where::new().is_in(identifier, values)
    }

    /// Add an arbitrary relation
    pub fn and(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    fn with(self, identifier: impl Into<String>, op: RelationOp, value: impl Into<Primitive>) -> Result<Self> {
        Ok(self.and(Relation::new(identifier, op, value)?))
    }

    /// `identifier = value`
    pub fn equal_to(self, identifier: impl Into<String>, value: impl Into<Primitive>) -> Result<Self> {
        self.with(identifier, RelationOp::Eq, value)
    }

    /// `identifier > value`
    pub fn greater_than(
        self,
        identifier: impl Into<String>,
        value: impl Into<Primitive>,
    ) -> Result<Self> {
        self.with(identifier, RelationOp::Gt, value)
    }

    /// `identifier < value`
    pub fn less_than(self, identifier: impl Into<String>, value: impl Into<Primitive>) -> Result<Self> {
        self.with(identifier, RelationOp::Lt, value)
    }

    /// `identifier >= value`
    pub fn greater_than_or_equal_to(
        self,
        identifier: impl Into<String>,
        value: impl Into<Primitive>,
    ) -> Result<Self> {
        self.with(identifier, RelationOp::Gte, value)
    }

    /// `identifier <= value`
    pub fn less_than_or_equal_to(
        self,
        identifier: impl Into<String>,
        value: impl Into<Primitive>,
    ) -> Result<Self> {
        self.with(identifier, RelationOp::Lte, value)
    }

    /// `identifier IN (values...)`
    pub fn is_in<V: Into<Primitive>>(
        self,
        identifier: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self> {
        let relation = Relation::one_of(identifier, values.into_iter().map(Into::into))?;
        Ok(self.and(relation))
    }

    /// Relations in insertion order
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Check if there are no relations
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl From<Relation> for Where {
    fn from(relation: Relation) -> Self {
        Where::new().and(relation)
    }
}

impl fmt::Display for Where {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, r) in self.relations.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{}", r)?;
        }
        Ok(())
    }
}

/// A query over one object table, executed by the backing store
pub struct StoreObjectQuery {
    store: Arc<dyn ObjectStore>,
    metadata: StoreObjectMetadata,
    query_name: Option<String>,
    id: Option<Uuid>,
    filter: Option<Where>,
    limit: Option<usize>,
    allow_filtering: bool,
    consistency: Option<ConsistencyLevel>,
}

impl StoreObjectQuery {
    /// Create a query for the given schema, optionally scoped to one id
    pub fn new(store: Arc<dyn ObjectStore>, metadata: StoreObjectMetadata, id: Option<Uuid>) -> Self {
        StoreObjectQuery {
            store,
            metadata,
            query_name: None,
            id,
            filter: None,
            limit: None,
            allow_filtering: false,
            consistency: None,
        }
    }

    /// Target schema
    pub fn metadata(&self) -> &StoreObjectMetadata {
        &self.metadata
    }

    /// Target class name
    pub fn class_name(&self) -> &str {
        self.metadata.class_name()
    }

    /// Backing store this query executes against
    pub fn store_handle(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.store)
    }

    /// Name for a named (prepared) query
    pub fn query_name(&self) -> Option<&str> {
        self.query_name.as_deref()
    }

    /// Set the query name
    pub fn set_query_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.query_name = Some(name.into());
        self
    }

    /// Id this query is scoped to
    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// Filter expression
    pub fn filter(&self) -> Option<&Where> {
        self.filter.as_ref()
    }

    /// Attach a filter expression, replacing any previous one
    pub fn set_where(&mut self, filter: Where) -> &mut Self {
        self.filter = Some(filter);
        self
    }

    /// Maximum number of rows; `None` is the store default
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Set the maximum number of rows
    pub fn set_limit(&mut self, limit: Option<usize>) -> &mut Self {
        self.limit = limit;
        self
    }

    /// Check if a full scan is permitted
    pub fn allow_filtering(&self) -> bool {
        self.allow_filtering
    }

    /// Permit filtering on non-key fields (may require a full scan)
    pub fn set_allow_filtering(&mut self, allow: bool) -> &mut Self {
        self.allow_filtering = allow;
        self
    }

    /// Read consistency; `None` is the store default
    pub fn consistency(&self) -> Option<ConsistencyLevel> {
        self.consistency
    }

    /// Set the read consistency
    pub fn set_consistency(&mut self, level: Option<ConsistencyLevel>) -> &mut Self {
        self.consistency = level;
        self
    }

    /// Run the query against the backing store
    pub fn execute(&self) -> Result<Vec<StoreObject>> {
        debug!(
            target: "objectstore::query",
            class = %self.class_name(),
            id = ?self.id,
            filter = %self.filter.as_ref().map(|w| w.to_string()).unwrap_or_default(),
            limit = ?self.limit,
            "Executing query"
        );
        self.store.execute(self)
    }
}

impl fmt::Debug for StoreObjectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreObjectQuery")
            .field("class_name", &self.class_name())
            .field("query_name", &self.query_name)
            .field("id", &self.id)
            .field("filter", &self.filter)
            .field("limit", &self.limit)
            .field("allow_filtering", &self.allow_filtering)
            .field("consistency", &self.consistency)
            .finish()
    }
}
