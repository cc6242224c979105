//! Process-wide schema cache.
//!
//! Reads are lock-free (`DashMap`). Builds take a reentrant mutex so that
//! each type is built exactly once while nested builds on the same thread
//! can recurse into the cache. The mutex also guards the stack of types
//! under construction, which is how cycles are caught.

use std::any::{type_name, TypeId};
use std::cell::RefCell;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::ReentrantMutex;

use super::record::Record;
use super::schema::{SchemaBuilder, StructSchema};
use crate::error::{Result, SchemaError};

struct SchemaCache {
    schemas: DashMap<TypeId, Arc<StructSchema>>,
    building: ReentrantMutex<RefCell<Vec<TypeId>>>,
}

static CACHE: Lazy<SchemaCache> = Lazy::new(|| SchemaCache {
    schemas: DashMap::new(),
    building: ReentrantMutex::new(RefCell::new(Vec::new())),
});

fn lookup(id: &TypeId) -> Option<Arc<StructSchema>> {
    CACHE.schemas.get(id).map(|hit| Arc::clone(hit.value()))
}

/// Cached schema of `R`, building (and caching) it on first request.
pub fn schema_of<R: Record>() -> Result<Arc<StructSchema>> {
    let id = TypeId::of::<R>();
    if let Some(schema) = lookup(&id) {
        return Ok(schema);
    }

    let building = CACHE.building.lock();
    if let Some(schema) = lookup(&id) {
        return Ok(schema);
    }
    if building.borrow().contains(&id) {
        return Err(SchemaError::Cycle {
            record: type_name::<R>(),
        }
        .into());
    }

    building.borrow_mut().push(id);
    let built = build::<R>();
    building.borrow_mut().pop();

    let schema = Arc::new(built?);
    CACHE.schemas.insert(id, Arc::clone(&schema));
    tracing::debug!(
        record = schema.name(),
        fields = schema.fields().len(),
        omit_absent = schema.omit_absent(),
        "schema derived"
    );
    Ok(schema)
}

/// Whether `R` already has a cached schema.
pub fn is_cached<R: Record>() -> bool {
    CACHE.schemas.contains_key(&TypeId::of::<R>())
}

fn build<R: Record>() -> Result<StructSchema> {
    let mut builder = SchemaBuilder::<R>::new();
    R::describe(&mut builder)?;
    builder.finish()
}
