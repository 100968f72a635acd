//! In-memory document base.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use dashmap::DashMap;

use crate::docs::{check_name, Base, BaseError, User};

/// Documents kept in process memory, keyed by user URN.
#[derive(Clone, Default)]
pub struct MemoryBase {
    users: Arc<DashMap<String, Arc<MemoryUser>>>,
}

impl MemoryBase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Base for MemoryBase {
    async fn user(&self, urn: &str) -> Result<Arc<dyn User>, BaseError> {
        let user: Arc<dyn User> = self
            .users
            .entry(urn.to_string())
            .or_insert_with(|| Arc::new(MemoryUser::default()))
            .clone();
        Ok(user)
    }
}

#[derive(Default)]
pub struct MemoryUser {
    docs: DashMap<String, Bytes>,
}

#[async_trait]
impl User for MemoryUser {
    async fn docs(&self) -> Result<Vec<String>, BaseError> {
        let mut names: Vec<String> = self.docs.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn read(&self, name: &str) -> Result<Bytes, BaseError> {
        check_name(name)?;
        self.docs
            .get(name)
            .map(|doc| doc.value().clone())
            .ok_or_else(|| BaseError::NotFound(name.to_string()))
    }

    async fn write(&self, name: &str, content: Bytes) -> Result<(), BaseError> {
        check_name(name)?;
        self.docs.insert(name.to_string(), content);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), BaseError> {
        check_name(name)?;
        self.docs
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| BaseError::NotFound(name.to_string()))
    }
}
