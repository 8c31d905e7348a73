use async_trait::async_trait;
use std::time::Duration;

use crate::domain::errors::StoreError;
use crate::domain::ports::KeyValueStore;

/// Stores nothing. Every read misses, so API reads always go to the API.
#[derive(Clone, Copy, Default)]
pub struct NullStore;

#[async_trait]
impl KeyValueStore for NullStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), StoreError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}
