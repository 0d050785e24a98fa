use crate::codec;
use crate::config::RecoveryMode;
use crate::error::HubError;
use crate::record::{RecordId, StoredRecord};
use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::warn;

/// Generic engine over one named collection backed by a single flat file.
///
/// Mutating operations serialize through `write_gate` and hold it across the
/// whole load→persist cycle, so two read-modify-write cycles on the same
/// collection never interleave. Reads run without the gate: the file is only
/// ever replaced by an atomic rename, so an overlapping read observes some
/// valid prior or current state.
///
/// Every operation re-reads durable state before acting. No caller holds a
/// collection in memory across operations.
pub struct CollectionStore<R> {
    dir: PathBuf,
    primary: PathBuf,
    prev: PathBuf,
    recovery_mode: RecoveryMode,
    write_gate: Mutex<()>,
    _record: PhantomData<fn() -> R>,
}

impl<R: StoredRecord> CollectionStore<R> {
    pub fn new(dir: &Path, file_name: &str, recovery_mode: RecoveryMode) -> Self {
        Self {
            dir: dir.to_path_buf(),
            primary: dir.join(file_name),
            prev: dir.join(format!("{file_name}.prev")),
            recovery_mode,
            write_gate: Mutex::new(()),
            _record: PhantomData,
        }
    }

    /// Current full contents in insertion order.
    pub async fn list(&self) -> Result<Vec<R>, HubError> {
        self.load()
    }

    pub async fn get(&self, id: RecordId) -> Result<R, HubError> {
        self.load()?
            .into_iter()
            .find(|r| r.record_id() == id)
            .ok_or(HubError::NotFound {
                resource_type: R::KIND,
                id,
            })
    }

    /// Assigns the next id (`max(existing) + 1`, or `1` for an empty
    /// collection), appends, persists, and returns the stored record.
    pub async fn insert(&self, mut record: R) -> Result<R, HubError> {
        let _gate = self.write_gate.lock().await;
        let mut records = self.load()?;
        record.assign_record_id(next_record_id(&records));
        records.push(record.clone());
        self.persist(&records)?;
        Ok(record)
    }

    /// Removes the record with the matching id. The backing file is left
    /// untouched when no record matches.
    pub async fn delete(&self, id: RecordId) -> Result<(), HubError> {
        let _gate = self.write_gate.lock().await;
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|r| r.record_id() != id);
        if records.len() == before {
            return Err(HubError::NotFound {
                resource_type: R::KIND,
                id,
            });
        }
        self.persist(&records)
    }

    /// Applies a pure transformation to the record with the matching id,
    /// persists the collection, and returns the updated record.
    pub async fn mutate(
        &self,
        id: RecordId,
        apply: impl FnOnce(&mut R),
    ) -> Result<R, HubError> {
        let _gate = self.write_gate.lock().await;
        let mut records = self.load()?;
        let Some(record) = records.iter_mut().find(|r| r.record_id() == id) else {
            return Err(HubError::NotFound {
                resource_type: R::KIND,
                id,
            });
        };
        apply(record);
        let updated = record.clone();
        self.persist(&records)?;
        Ok(updated)
    }

    fn load(&self) -> Result<Vec<R>, HubError> {
        let kind = R::KIND;
        let primary_err = match read_collection::<R>(&self.primary) {
            Ok(records) => return Ok(records),
            Err(err) => err,
        };
        if self.prev.exists() {
            match read_collection::<R>(&self.prev) {
                Ok(records) => {
                    warn!(
                        collection = %kind,
                        error = %primary_err,
                        "collection file unreadable, loaded predecessor copy"
                    );
                    return Ok(records);
                }
                Err(prev_err) => {
                    warn!(collection = %kind, error = %prev_err, "predecessor copy unreadable");
                }
            }
        }
        match self.recovery_mode {
            RecoveryMode::Permissive => {
                warn!(
                    collection = %kind,
                    error = %primary_err,
                    "collection file unreadable, treating collection as empty"
                );
                Ok(Vec::new())
            }
            RecoveryMode::Strict => Err(primary_err),
        }
    }

    /// Whole-file rewrite: copy the current primary aside, write the new
    /// contents to a temp file in the same directory, fsync, rename over the
    /// primary, fsync the directory. Either the rename happens and the new
    /// contents are durable, or the primary keeps its old bytes.
    fn persist(&self, records: &[R]) -> Result<(), HubError> {
        let bytes = codec::encode_collection(records)?;
        if self.primary.exists() {
            let current = fs::read(&self.primary)?;
            fs::write(&self.prev, current)?;
            fsync_file(&self.prev)?;
        }
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.primary).map_err(|e| HubError::Io(e.error))?;
        fsync_dir(&self.dir)?;
        Ok(())
    }
}

fn next_record_id<R: StoredRecord>(records: &[R]) -> RecordId {
    records
        .iter()
        .map(|r| r.record_id())
        .max()
        .map_or(1, |max| max + 1)
}

fn read_collection<R: StoredRecord>(path: &Path) -> Result<Vec<R>, HubError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(HubError::Io(err)),
    };
    codec::decode_collection(&bytes)
}

fn fsync_file(path: &Path) -> Result<(), HubError> {
    let file = fs::OpenOptions::new().read(true).open(path)?;
    file.sync_all()?;
    Ok(())
}

fn fsync_dir(path: &Path) -> Result<(), HubError> {
    let dir = fs::File::open(path)?;
    dir.sync_all()?;
    Ok(())
}
