//! Object Mapping Tests
//!
//! End-to-end tests of domain objects against the in-memory store:
//! - round_trip: every field shape survives store and revive
//! - lifecycle: table creation, conditional stores, deletes and queries

#[path = "../common/mod.rs"]
mod common;

mod lifecycle;
mod round_trip;
