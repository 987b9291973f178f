// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Axiom Guard Audit Log
// ─────────────────────────────────────────────────────────────────────
//! Append-only, hash-stamped audit log.
//!
//! Storage is one JSON object per line. `append` writes, flushes and
//! fsyncs the line before the entry becomes visible to readers, so a
//! successful return means the entry survives a crash.
//!
//! Appends are serialized by `append_lock`; the in-memory index sits
//! behind an `RwLock` that is only write-locked for the final push, so
//! readers always observe a complete prefix of the log.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use axiom_types::{utc_timestamp, GuardError, GuardResult};

use crate::canonical::hash_canonical;
use crate::digest::ContentHash;
use crate::merkle::merkle_root;

/// One line of the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: String,
    pub actor: String,
    pub action: String,
    pub payload_hash: ContentHash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merkle_leaf: Option<ContentHash>,
}

impl AuditEntry {
    /// Merkle leaf for this entry: hash of its canonical form.
    pub fn leaf_hash(&self) -> GuardResult<ContentHash> {
        hash_canonical(self)
    }
}

/// Optional fields attached at append time.
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    pub commit_hash: Option<String>,
    pub merkle_leaf: Option<ContentHash>,
}

/// Durable backing store for audit entries.
pub trait AuditSink: Send + Sync {
    /// Persist one entry. Must not return `Ok` until the entry is durable.
    fn persist(&self, entry: &AuditEntry) -> GuardResult<()>;
}

/// Sink that keeps nothing beyond the in-memory index.
pub struct MemorySink;

impl AuditSink for MemorySink {
    fn persist(&self, _entry: &AuditEntry) -> GuardResult<()> {
        Ok(())
    }
}

/// File operations needed for an all-or-nothing line append.
trait LineFile: Write {
    fn byte_len(&self) -> io::Result<u64>;
    fn sync(&self) -> io::Result<()>;
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl LineFile for File {
    fn byte_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn sync(&self) -> io::Result<()> {
        self.sync_data()
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)?;
        self.seek(SeekFrom::End(0))?;
        self.sync_data()
    }
}

/// Write, flush and fsync `line`. On any failure the file is cut back
/// to its previous length so no partial or unacknowledged line remains.
fn append_line<F: LineFile>(file: &mut F, line: &[u8]) -> io::Result<()> {
    let len = file.byte_len()?;
    let written = file
        .write_all(line)
        .and_then(|_| file.flush())
        .and_then(|_| file.sync());
    if let Err(e) = written {
        if let Err(undo) = file.truncate_to(len) {
            log::error!("rollback to {len} bytes failed after write error ({e}): {undo}");
        }
        return Err(e);
    }
    Ok(())
}

fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    file.seek(SeekFrom::End(0))?;
    Ok(last[0] == b'\n')
}

/// JSON-lines file sink with flush + fsync per entry.
pub struct JsonlSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlSink {
    /// Open for appending. A non-empty file must end with a newline;
    /// a torn last line is reported instead of being extended.
    pub fn open(path: impl AsRef<Path>) -> GuardResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        if !ends_with_newline(&mut file)? {
            return Err(GuardError::Storage(format!(
                "{} ends with an incomplete line",
                path.display()
            )));
        }
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JsonlSink {
    /// Append one JSON line, then flush and fsync. Nothing is left in
    /// the file if this returns an error.
    pub fn persist_line<T: Serialize + ?Sized>(&self, value: &T) -> GuardResult<()> {
        let mut line = serde_json::to_string(value)
            .map_err(|e| GuardError::Serialization(format!("audit line: {e}")))?;
        line.push('\n');
        let mut file = self.file.lock();
        append_line(&mut *file, line.as_bytes()).map_err(|e| {
            GuardError::Storage(format!("append to {}: {e}", self.path.display()))
        })
    }
}

impl AuditSink for JsonlSink {
    fn persist(&self, entry: &AuditEntry) -> GuardResult<()> {
        self.persist_line(entry)
    }
}

/// Read every entry from an existing JSONL log.
pub fn read_entries(path: impl AsRef<Path>) -> GuardResult<Vec<AuditEntry>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
            GuardError::Storage(format!(
                "corrupt audit log {} at line {}: {e}",
                path.display(),
                line_no + 1
            ))
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

/// Append-only audit log.
pub struct AuditLog {
    sink: Box<dyn AuditSink>,
    append_lock: Mutex<()>,
    entries: RwLock<Vec<AuditEntry>>,
}

impl AuditLog {
    pub fn with_sink(sink: Box<dyn AuditSink>, existing: Vec<AuditEntry>) -> Self {
        Self {
            sink,
            append_lock: Mutex::new(()),
            entries: RwLock::new(existing),
        }
    }

    /// Log with no durable storage.
    pub fn in_memory() -> Self {
        Self::with_sink(Box::new(MemorySink), Vec::new())
    }

    /// Open (or create) a JSONL log, reloading any existing entries.
    pub fn open(path: impl AsRef<Path>) -> GuardResult<Self> {
        let path = path.as_ref();
        let existing = if path.exists() {
            read_entries(path)?
        } else {
            Vec::new()
        };
        log::debug!(
            "audit log {} opened with {} entries",
            path.display(),
            existing.len()
        );
        let sink = JsonlSink::open(path)?;
        Ok(Self::with_sink(Box::new(sink), existing))
    }

    pub fn append<T: Serialize + ?Sized>(
        &self,
        actor: &str,
        action: &str,
        payload: &T,
    ) -> GuardResult<AuditEntry> {
        self.append_with(actor, action, payload, AppendOptions::default())
    }

    /// Hash `payload`, stamp the entry, persist it durably, then publish it.
    pub fn append_with<T: Serialize + ?Sized>(
        &self,
        actor: &str,
        action: &str,
        payload: &T,
        options: AppendOptions,
    ) -> GuardResult<AuditEntry> {
        let payload_hash = hash_canonical(payload)?;

        let _guard = self.append_lock.lock();
        let entry = AuditEntry {
            timestamp: utc_timestamp(),
            actor: actor.to_string(),
            action: action.to_string(),
            payload_hash,
            commit_hash: options.commit_hash,
            merkle_leaf: options.merkle_leaf,
        };
        if let Err(e) = self.sink.persist(&entry) {
            log::error!("audit append failed for action {action}: {e}");
            return Err(match e {
                GuardError::Storage(_) => e,
                other => GuardError::Storage(other.to_string()),
            });
        }
        self.entries.write().push(entry.clone());
        Ok(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Most recently appended entry.
    pub fn last(&self) -> Option<AuditEntry> {
        self.entries.read().last().cloned()
    }

    pub fn get(&self, index: usize) -> Option<AuditEntry> {
        self.entries.read().get(index).cloned()
    }

    /// Entries from `from` (inclusive) to the current end.
    pub fn entries_since(&self, from: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read();
        entries.get(from..).map(<[AuditEntry]>::to_vec).unwrap_or_default()
    }

    /// A contiguous batch, in insertion order.
    pub fn entries_in_range(&self, range: Range<usize>) -> GuardResult<Vec<AuditEntry>> {
        let entries = self.entries.read();
        entries.get(range.clone()).map(<[AuditEntry]>::to_vec).ok_or_else(|| {
            GuardError::Config(format!(
                "range {}..{} out of bounds for {} entries",
                range.start,
                range.end,
                entries.len()
            ))
        })
    }

    /// Ordered Merkle leaves for a contiguous batch.
    pub fn leaf_hashes(&self, range: Range<usize>) -> GuardResult<Vec<ContentHash>> {
        self.entries_in_range(range)?
            .iter()
            .map(AuditEntry::leaf_hash)
            .collect()
    }

    /// Merkle root over a contiguous batch.
    pub fn merkle_root(&self, range: Range<usize>) -> GuardResult<ContentHash> {
        merkle_root(&self.leaf_hashes(range)?)
    }

    /// Check a payload against the hash stored at `index`.
    pub fn verify_payload<T: Serialize + ?Sized>(
        &self,
        index: usize,
        payload: &T,
    ) -> GuardResult<bool> {
        let entry = self.get(index).ok_or_else(|| {
            GuardError::Config(format!("no audit entry at index {index}"))
        })?;
        Ok(entry.payload_hash == hash_canonical(payload)?)
    }
}
