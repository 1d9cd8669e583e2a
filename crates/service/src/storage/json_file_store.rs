use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::errors::ServiceError;

/// JSON file holding a single serialized value.
///
/// The whole value is rewritten on every save through a sibling `.tmp` file that
/// is renamed over the target. Callers serialize access themselves (the customer
/// repository saves while holding its write lock).
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    file_path: PathBuf,
}

impl JsonFileStore {
    /// Open the file at `path`, returning the stored value.
    /// Creates the file (and its directory) holding `T::default()` if missing.
    pub async fn open<T, P>(path: P) -> Result<(Self, T), ServiceError>
    where
        T: Default + Serialize + DeserializeOwned,
        P: Into<PathBuf>,
    {
        let file_path = path.into();
        common::env::ensure_data_dir(&file_path)
            .await
            .map_err(ServiceError::storage)?;

        let store = Self { file_path };
        let value = match fs::read(&store.file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => T::default(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| ServiceError::Corrupt {
                path: store.file_path.display().to_string(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = T::default();
                store.save(&empty).await?;
                info!(path = %store.file_path.display(), "created empty snapshot");
                empty
            }
            Err(e) => return Err(ServiceError::storage(e)),
        };

        Ok((store, value))
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.file_path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Replace the file contents with `value`. The previous contents survive a failed write.
    pub async fn save<T: Serialize>(&self, value: &T) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(value).map_err(ServiceError::storage)?;
        let tmp = self.temp_path();
        fs::write(&tmp, data).await.map_err(ServiceError::storage)?;
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::storage(e));
        }
        debug!(path = %self.file_path.display(), "snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("json_file_store_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn missing_file_is_created_with_default() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let (_store, value) = JsonFileStore::open::<BTreeMap<String, i32>, _>(&tmp).await?;
        assert!(value.is_empty());
        assert!(fs::metadata(&tmp).await.is_ok());
        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn saved_value_is_loaded_again() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let (store, mut value) = JsonFileStore::open::<BTreeMap<String, i32>, _>(&tmp).await?;
        value.insert("a".into(), 1);
        store.save(&value).await?;

        let (_again, reloaded) = JsonFileStore::open::<BTreeMap<String, i32>, _>(&tmp).await?;
        assert_eq!(reloaded.get("a"), Some(&1));
        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn garbage_is_reported_as_corrupt() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        fs::write(&tmp, b"{not json").await?;
        let err = JsonFileStore::open::<BTreeMap<String, i32>, _>(&tmp).await.unwrap_err();
        match err {
            ServiceError::Corrupt { path, reason } => {
                assert_eq!(path, tmp.display().to_string());
                assert!(!reason.is_empty());
            }
            other => panic!("expected corrupt snapshot, got {other:?}"),
        }
        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn save_replaces_file_without_leaving_temp() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let (store, mut value) = JsonFileStore::open::<BTreeMap<String, i32>, _>(&tmp).await?;
        value.insert("b".into(), 2);
        store.save(&value).await?;

        assert!(fs::metadata(store.temp_path()).await.is_err());
        let on_disk: BTreeMap<String, i32> = serde_json::from_slice(&fs::read(&tmp).await?)?;
        assert_eq!(on_disk, value);
        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_contents() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let (store, mut value) = JsonFileStore::open::<BTreeMap<String, i32>, _>(&tmp).await?;
        value.insert("kept".into(), 1);
        store.save(&value).await?;

        // a directory squatting on the temp name makes the write fail
        fs::create_dir(store.temp_path()).await?;
        value.insert("lost".into(), 2);
        assert!(matches!(store.save(&value).await, Err(ServiceError::Storage(_))));

        let (_again, reloaded) = JsonFileStore::open::<BTreeMap<String, i32>, _>(&tmp).await?;
        assert_eq!(reloaded.get("kept"), Some(&1));
        assert!(reloaded.get("lost").is_none());
        let _ = fs::remove_dir(store.temp_path()).await;
        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }
}
