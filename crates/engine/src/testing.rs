//! Recording store double for unit tests

use crate::object::StoreObject;
use crate::query::StoreObjectQuery;
use crate::result::StoreResult;
use crate::traits::{ObjectStore, StoreRequest};
use chrono::Utc;
use objectstore_core::{
    CollectionKind, ConsistencyLevel, Error, ObjectStoreItem, PrimitiveType, Result,
    StoreObjectMetadata, ID_FIELD, LAST_MODIFIED_FIELD,
};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// What a query looked like when it reached the store
#[derive(Debug, Clone)]
pub(crate) struct ExecutedQuery {
    pub class_name: String,
    pub query_name: Option<String>,
    pub limit: Option<usize>,
    pub allow_filtering: bool,
    pub consistency: Option<ConsistencyLevel>,
}

#[derive(Default)]
struct Recorded {
    requests: Vec<StoreRequest>,
    queries: Vec<ExecutedQuery>,
    last_assigned: Option<Uuid>,
    reject_conditional: bool,
    fail_next: Option<String>,
}

/// Accepts every write, returns no rows, and remembers what it saw
#[derive(Clone, Default)]
pub(crate) struct RecordingStore {
    state: Arc<Mutex<Recorded>>,
}

impl RecordingStore {
    pub fn requests(&self) -> Vec<StoreRequest> {
        self.state.lock().requests.clone()
    }

    pub fn queries(&self) -> Vec<ExecutedQuery> {
        self.state.lock().queries.clone()
    }

    pub fn assigned_id(&self) -> Uuid {
        self.state.lock().last_assigned.unwrap_or_else(Uuid::nil)
    }

    pub fn reject_conditional_writes(&self) {
        self.state.lock().reject_conditional = true;
    }

    pub fn fail_next(&self, message: &str) {
        self.state.lock().fail_next = Some(message.to_string());
    }

    fn take_failure(&self) -> Result<()> {
        match self.state.lock().fail_next.take() {
            Some(message) => Err(Error::store(message)),
            None => Ok(()),
        }
    }
}

impl ObjectStore for RecordingStore {
    fn create_object_table(&self, class_name: &str, _if_not_exists: bool) -> Result<StoreObjectMetadata> {
        Ok(StoreObjectMetadata::with_identity(class_name))
    }

    fn drop_object_table(
        &self,
        class_name: &str,
        _if_exists: bool,
    ) -> Result<Option<StoreObjectMetadata>> {
        Ok(Some(StoreObjectMetadata::with_identity(class_name)))
    }

    fn add_primitive_field(
        &self,
        class_name: &str,
        _field_name: &str,
        _field_type: PrimitiveType,
        _if_not_exists: bool,
    ) -> Result<StoreObjectMetadata> {
        self.metadata(class_name)
    }

    fn add_collection_field(
        &self,
        class_name: &str,
        _field_name: &str,
        _kind: CollectionKind,
        _first: PrimitiveType,
        _second: Option<PrimitiveType>,
        _if_not_exists: bool,
    ) -> Result<StoreObjectMetadata> {
        self.metadata(class_name)
    }

    fn drop_field(&self, class_name: &str, _field_name: &str) -> Result<StoreObjectMetadata> {
        self.metadata(class_name)
    }

    fn change_field_type(
        &self,
        class_name: &str,
        _field_name: &str,
        _new_type: PrimitiveType,
    ) -> Result<StoreObjectMetadata> {
        self.metadata(class_name)
    }

    fn metadata(&self, class_name: &str) -> Result<StoreObjectMetadata> {
        Ok(StoreObjectMetadata::with_identity(class_name))
    }

    fn create_store_object(&self, class_name: &str, id: Option<Uuid>) -> Result<StoreObject> {
        Ok(StoreObject::new(
            Arc::new(self.clone()),
            self.metadata(class_name)?,
            id,
        ))
    }

    fn delete(&self, _class_name: &str, _id: Uuid, _level: Option<ConsistencyLevel>) -> Result<()> {
        self.take_failure()
    }

    fn create_query(&self, class_name: &str, id: Option<Uuid>) -> Result<StoreObjectQuery> {
        Ok(StoreObjectQuery::new(
            Arc::new(self.clone()),
            self.metadata(class_name)?,
            id,
        ))
    }

    fn retrieve_ids(
        &self,
        _class_name: &str,
        _limit: Option<usize>,
        _level: Option<ConsistencyLevel>,
    ) -> Result<Vec<Uuid>> {
        self.take_failure()?;
        Ok(Vec::new())
    }

    fn submit(&self, request: StoreRequest) -> Result<StoreResult> {
        self.take_failure()?;
        let mut state = self.state.lock();
        let conditional = request.is_conditional();
        state.requests.push(request.clone());

        let id = request.id.unwrap_or_else(Uuid::new_v4);
        let identity = vec![
            ObjectStoreItem::new(ID_FIELD, id)?,
            ObjectStoreItem::new(LAST_MODIFIED_FIELD, Utc::now())?,
        ];
        if conditional && state.reject_conditional {
            return Ok(StoreResult::failure(identity));
        }
        state.last_assigned = Some(id);
        Ok(StoreResult::success(identity))
    }

    fn execute(&self, query: &StoreObjectQuery) -> Result<Vec<StoreObject>> {
        self.take_failure()?;
        self.state.lock().queries.push(ExecutedQuery {
            class_name: query.class_name().to_string(),
            query_name: query.query_name().map(str::to_string),
            limit: query.limit(),
            allow_filtering: query.allow_filtering(),
            consistency: query.consistency(),
        });
        Ok(Vec::new())
    }
}
