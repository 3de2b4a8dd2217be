//! Server session store: derived key to [`ServerRecord`].
//!
//! One reader/writer lock guards the whole map. Every insert rewrites the
//! full map to disk while the write lock is held, so the file is always a
//! complete snapshot. On disk the file is a JSON object whose values are
//! themselves JSON-encoded records.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::{DirsignError, Result};
use crate::record::ServerRecord;

pub struct SessionStore {
    records: RwLock<HashMap<String, ServerRecord>>,
    file: Option<PathBuf>,
}

impl SessionStore {
    /// Store backed by `file`. A missing file starts empty; an unreadable
    /// or corrupt one is an error.
    pub fn open(file: impl Into<PathBuf>) -> Result<Self> {
        let file = file.into();
        let records = load(&file)?;
        tracing::info!(path = %file.display(), records = records.len(), "session store loaded");
        Ok(Self {
            records: RwLock::new(records),
            file: Some(file),
        })
    }

    /// Store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            file: None,
        }
    }

    pub fn get(&self, key: &str) -> Option<ServerRecord> {
        let record = self.records.read().get(key).cloned();
        tracing::debug!(key, found = record.is_some(), "session store lookup");
        record
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Insert a record under a key that must not exist yet, then persist the
    /// whole map. A failed flush takes the new entry back out.
    pub fn insert_new(&self, key: &str, record: ServerRecord) -> Result<()> {
        let mut records = self.records.write();
        if records.contains_key(key) {
            return Err(DirsignError::Conflict(format!("key {key} already registered")));
        }
        records.insert(key.to_string(), record);

        if let Some(file) = &self.file {
            if let Err(e) = flush(file, &records) {
                records.remove(key);
                tracing::warn!(key, error = %e, "session store flush failed");
                return Err(e);
            }
        }

        tracing::debug!(key, records = records.len(), "session store written");
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

fn load(file: &Path) -> Result<HashMap<String, ServerRecord>> {
    let data = match fs::read(file) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => return Err(e.into()),
    };

    let raw: HashMap<String, String> = serde_json::from_slice(&data)?;
    raw.into_iter()
        .map(|(key, value)| -> Result<(String, ServerRecord)> {
            let record = serde_json::from_str(&value).map_err(|e| {
                DirsignError::Serialization(format!("record {key}: {e}"))
            })?;
            Ok((key, record))
        })
        .collect()
}

fn flush(file: &Path, records: &HashMap<String, ServerRecord>) -> Result<()> {
    let raw = records
        .iter()
        .map(|(key, record)| -> Result<(String, String)> {
            Ok((key.clone(), serde_json::to_string(record)?))
        })
        .collect::<Result<HashMap<String, String>>>()?;
    let data = serde_json::to_vec(&raw)?;

    let tmp = file.with_extension("tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, file)?;
    Ok(())
}
