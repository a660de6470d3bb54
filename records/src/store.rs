use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{StoreError, StoreResult, TagDraft, TaggedLocation, documents_dir};

/// Storage for tagged locations.
pub trait RecordStore {
    /// Every record, in insertion order.
    fn records(&self) -> &[TaggedLocation];

    /// The record with `id`.
    fn get(&self, id: u64) -> Option<&TaggedLocation> {
        self.records().iter().find(|record| record.id == id)
    }

    /// Store a new record and return it with its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be persisted.
    fn insert(&mut self, draft: TagDraft) -> StoreResult<TaggedLocation>;

    /// Replace the editable fields of record `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or an error if the
    /// change cannot be persisted.
    fn update(&mut self, id: u64, draft: TagDraft) -> StoreResult<TaggedLocation>;

    /// Remove record `id`, along with its photo.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or an error if the
    /// change cannot be persisted.
    fn delete(&mut self, id: u64) -> StoreResult<TaggedLocation>;

    /// Reserve an id for a new photo. Ids are never reused.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter cannot be persisted.
    fn next_photo_id(&mut self) -> StoreResult<u64>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    next_photo_id: u64,
    #[serde(default)]
    records: Vec<TaggedLocation>,
}

/// Records held in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: StoreDocument,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: u64) -> StoreResult<usize> {
        self.document
            .records
            .iter()
            .position(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))
    }
}

impl RecordStore for MemoryStore {
    fn records(&self) -> &[TaggedLocation] {
        &self.document.records
    }

    fn insert(&mut self, draft: TagDraft) -> StoreResult<TaggedLocation> {
        self.document.next_id += 1;
        let record = draft.into_record(self.document.next_id);
        self.document.records.push(record.clone());
        Ok(record)
    }

    fn update(&mut self, id: u64, draft: TagDraft) -> StoreResult<TaggedLocation> {
        let index = self.position(id)?;
        let record = draft.into_record(id);
        self.document.records[index] = record.clone();
        Ok(record)
    }

    fn delete(&mut self, id: u64) -> StoreResult<TaggedLocation> {
        let index = self.position(id)?;
        Ok(self.document.records.remove(index))
    }

    fn next_photo_id(&mut self) -> StoreResult<u64> {
        let id = self.document.next_photo_id;
        self.document.next_photo_id += 1;
        Ok(id)
    }
}

/// Records persisted as a JSON document; photos live next to it.
///
/// Every change is written back before the call returns; a change that
/// cannot be written is not applied.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    photo_dir: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// File name of the store document.
    pub const FILE_NAME: &'static str = "locations.json";

    /// Open the store in [`documents_dir`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoDocumentsDir`] if the platform has no
    /// documents directory, or any error from [`open`](Self::open).
    pub fn open_default() -> StoreResult<Self> {
        let dir = documents_dir().ok_or(StoreError::NoDocumentsDir)?;
        Self::open(dir.join(Self::FILE_NAME))
    }

    /// Open the document at `path`; a missing file is an empty store.
    /// Photos are kept in the same directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let document = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no store at {}, starting empty", path.display());
                StoreDocument::default()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        let photo_dir = path
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf);
        info!(
            "opened {} with {} records",
            path.display(),
            document.records.len()
        );
        Ok(Self {
            path,
            photo_dir,
            inner: MemoryStore { document },
        })
    }

    /// The store document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where photos are kept.
    #[must_use]
    pub fn photo_dir(&self) -> &Path {
        &self.photo_dir
    }

    /// Apply `change` to a copy, write it out, and only then keep it.
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut MemoryStore) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut next = self.inner.clone();
        let out = change(&mut next)?;
        self.save(&next.document)?;
        self.inner = next;
        Ok(out)
    }

    fn save(&self, document: &StoreDocument) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = serde_json::to_string_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn remove_photo(&self, record: &TaggedLocation) {
        let Some(path) = record.photo_path(&self.photo_dir) else {
            return;
        };
        match fs::remove_file(&path) {
            Ok(()) => debug!("removed {}", path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!("failed to remove {}: {err}", path.display()),
        }
    }
}

impl RecordStore for JsonFileStore {
    fn records(&self) -> &[TaggedLocation] {
        self.inner.records()
    }

    fn insert(&mut self, draft: TagDraft) -> StoreResult<TaggedLocation> {
        self.commit(|store| store.insert(draft))
    }

    fn update(&mut self, id: u64, draft: TagDraft) -> StoreResult<TaggedLocation> {
        self.commit(|store| store.update(id, draft))
    }

    fn delete(&mut self, id: u64) -> StoreResult<TaggedLocation> {
        let record = self.commit(|store| store.delete(id))?;
        self.remove_photo(&record);
        Ok(record)
    }

    fn next_photo_id(&mut self) -> StoreResult<u64> {
        self.commit(MemoryStore::next_photo_id)
    }
}
