use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};
use crate::repository::traits::KeyValueStore;

const DEFAULT_DIR_NAME: &str = ".robodash";

/// Stores every key as `<base_dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileKeyValueStore {
    base_dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let path = match base_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&path).map_err(|source| Error::DirectoryCreate {
            path: path.clone(),
            source,
        })?;
        Ok(FileKeyValueStore { base_dir: path })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }
}

pub fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or(Error::HomeDirUnavailable)?;
    Ok(home_dir.join(DEFAULT_DIR_NAME))
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        // write-then-rename so a crash mid-write leaves the previous value
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(key, path = %path.display(), bytes = value.len(), "stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let store = FileKeyValueStore::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(store.get("robots").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let store = FileKeyValueStore::new(Some(dir.path().join("nested"))).unwrap();
        store.set("activities", "[]").unwrap();
        assert_eq!(store.get("activities").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("nested").join("activities.json").exists());
    }

    #[test]
    fn test_set_overwrites() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let store = FileKeyValueStore::new(Some(dir.path().to_path_buf())).unwrap();
        store.set("robots", "[1]").unwrap();
        store.set("robots", "[2]").unwrap();
        assert_eq!(store.get("robots").unwrap().as_deref(), Some("[2]"));
    }
}
