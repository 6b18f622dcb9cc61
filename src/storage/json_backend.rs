use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::core::utils::{ensure_dir, PathResolver};

use super::{KeyValueStore, Result};

const TMP_SUFFIX: &str = "tmp";

/// One JSON file per key under `<data dir>/store`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens the store beneath `base` (or the default data directory).
    pub fn new(base: Option<PathBuf>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(base);
        let root = PathResolver::store_dir_in(&app_root);
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", canonical_name(key)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key);
        let tmp = tmp_path(&path);
        write_atomic(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = value.len(), "store entry written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.entry_path(key)) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Writes `data` to `path` through a sibling temp file and a rename, so a
/// reader never observes a half-written file.
pub fn save_text_to_path(path: &Path, data: &str) -> Result<()> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Maps a namespaced key such as `finance_core:data:v1` onto a file stem.
pub(crate) fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "entry".into()
    } else {
        sanitized
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_temp_dir() -> (FileStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(Some(temp.path().to_path_buf())).unwrap();
        (store, temp)
    }

    #[test]
    fn set_get_remove_roundtrip() {
        let (store, _temp) = store_with_temp_dir();
        assert_eq!(store.get("finance_core:data:v1").unwrap(), None);
        store.set("finance_core:data:v1", "{\"records\":[]}").unwrap();
        assert_eq!(
            store.get("finance_core:data:v1").unwrap().as_deref(),
            Some("{\"records\":[]}")
        );
        store.remove("finance_core:data:v1").unwrap();
        store.remove("finance_core:data:v1").unwrap();
        assert_eq!(store.get("finance_core:data:v1").unwrap(), None);
    }

    #[test]
    fn keys_map_to_sanitized_file_names() {
        let (store, _temp) = store_with_temp_dir();
        let path = store.entry_path("finance_core:data:v1");
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("finance_core_data_v1.json")
        );
        assert_eq!(canonical_name("::"), "entry");
    }

    #[test]
    fn no_temp_file_left_behind() {
        let (store, _temp) = store_with_temp_dir();
        store.set("k", "v").unwrap();
        let leftovers: Vec<_> = fs::read_dir(store.root())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
