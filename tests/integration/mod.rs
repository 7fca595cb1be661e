//! Integration tests for the carton composition engine

mod support;

mod carton_composition;
mod lifecycle_ordering;
mod payload_routing;
mod sled_store;
