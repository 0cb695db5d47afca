//! The storage contract and JSON helpers on top of it.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{PersistenceError, Result};

/// Asynchronous key/value store for serialized state.
///
/// Implementations must report backend failures as errors rather than
/// silently dropping writes. Loading a key that was never saved is not an
/// error and yields `None`; deleting it is a no-op.
pub trait PersistenceProvider: Send + Sync + 'static {
    /// Store `data` under `key`, replacing any previous value.
    fn save(&self, key: &str, data: String) -> impl Future<Output = Result<()>> + Send;

    /// Fetch the value stored under `key`.
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Remove `key`.
    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send;

    /// All stored keys, sorted.
    fn list(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Remove every stored key.
    fn clear(&self) -> impl Future<Output = Result<()>> + Send;
}

impl<P: PersistenceProvider> PersistenceProvider for Arc<P> {
    fn save(&self, key: &str, data: String) -> impl Future<Output = Result<()>> + Send {
        (**self).save(key, data)
    }

    fn load(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send {
        (**self).load(key)
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send {
        (**self).delete(key)
    }

    fn list(&self) -> impl Future<Output = Result<Vec<String>>> + Send {
        (**self).list()
    }

    fn clear(&self) -> impl Future<Output = Result<()>> + Send {
        (**self).clear()
    }
}

/// Serialize `value` as JSON and store it under `key`.
pub async fn save_json<P, T>(provider: &P, key: &str, value: &T) -> Result<()>
where
    P: PersistenceProvider,
    T: Serialize + ?Sized,
{
    let data = serde_json::to_string(value).map_err(|source| PersistenceError::Serialization {
        key: key.to_string(),
        source,
    })?;
    provider.save(key, data).await
}

/// Load the value under `key` and parse it as JSON.
pub async fn load_json<P, T>(provider: &P, key: &str) -> Result<Option<T>>
where
    P: PersistenceProvider,
    T: DeserializeOwned,
{
    let Some(data) = provider.load(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&data)
        .map(Some)
        .map_err(|source| PersistenceError::Deserialization {
            key: key.to_string(),
            source,
        })
}
