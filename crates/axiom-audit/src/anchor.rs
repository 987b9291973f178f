// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Axiom Guard Batch Anchors
// ─────────────────────────────────────────────────────────────────────
//! Merkle roots over "everything since the last anchor", ready to be
//! published to an external ledger. Publication itself is out of scope:
//! this module only produces, persists and re-verifies the roots.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use axiom_types::{utc_timestamp, GuardError, GuardResult};

use crate::audit_log::{AuditLog, JsonlSink};
use crate::digest::ContentHash;

/// A Merkle root covering `entry_count` log entries from `first_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRecord {
    pub merkle_root: ContentHash,
    pub first_index: usize,
    pub entry_count: usize,
    pub anchored_at: String,
}

impl AnchorRecord {
    /// Index one past the last covered entry, `None` if the range
    /// overflows (only possible for a forged record).
    pub fn end_index(&self) -> Option<usize> {
        self.first_index.checked_add(self.entry_count)
    }
}

fn corrupt_end(anchor: &AnchorRecord) -> GuardError {
    GuardError::Storage(format!(
        "anchor range {} + {} overflows",
        anchor.first_index, anchor.entry_count
    ))
}

/// Anchor every entry from `first_index` to the current end of `log`.
pub fn build_anchor(log: &AuditLog, first_index: usize) -> GuardResult<AnchorRecord> {
    let end = log.len();
    if first_index >= end {
        return Err(GuardError::EmptyLeafSet);
    }
    let merkle_root = log.merkle_root(first_index..end)?;
    let anchor = AnchorRecord {
        merkle_root,
        first_index,
        entry_count: end - first_index,
        anchored_at: utc_timestamp(),
    };
    log::info!(
        "anchored entries {}..{end} root={}",
        anchor.first_index,
        anchor.merkle_root
    );
    Ok(anchor)
}

/// Recompute the root over the anchored range and compare.
///
/// Returns `false` if the range is no longer present or any entry in
/// it changed.
pub fn verify_anchor(log: &AuditLog, anchor: &AnchorRecord) -> bool {
    let Some(end) = anchor.end_index() else {
        log::warn!("anchor verification failed: {}", corrupt_end(anchor));
        return false;
    };
    match log.merkle_root(anchor.first_index..end) {
        Ok(root) => root == anchor.merkle_root,
        Err(e) => {
            log::warn!("anchor verification failed: {e}");
            false
        }
    }
}

fn next_index(anchors: &[AnchorRecord]) -> GuardResult<usize> {
    match anchors.last() {
        None => Ok(0),
        Some(last) => last.end_index().ok_or_else(|| corrupt_end(last)),
    }
}

/// Persisted sequence of anchors (JSON lines), optionally file-backed.
pub struct AnchorLedger {
    path: Option<PathBuf>,
    anchors: Mutex<Vec<AnchorRecord>>,
}

impl AnchorLedger {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            anchors: Mutex::new(Vec::new()),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> GuardResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut anchors = Vec::new();
        if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            for (line_no, line) in text.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let anchor: AnchorRecord = serde_json::from_str(line).map_err(|e| {
                    GuardError::Storage(format!(
                        "corrupt anchor ledger {} at line {}: {e}",
                        path.display(),
                        line_no + 1
                    ))
                })?;
                let expected_first = next_index(&anchors)?;
                if anchor.end_index().is_none() || anchor.first_index != expected_first {
                    return Err(GuardError::Storage(format!(
                        "corrupt anchor ledger {} at line {}: range {}+{} does not follow index {expected_first}",
                        path.display(),
                        line_no + 1,
                        anchor.first_index,
                        anchor.entry_count
                    )));
                }
                anchors.push(anchor);
            }
        }
        Ok(Self {
            path: Some(path),
            anchors: Mutex::new(anchors),
        })
    }

    /// First log index not yet covered by an anchor.
    pub fn next_unanchored(&self) -> GuardResult<usize> {
        next_index(&self.anchors.lock())
    }

    pub fn latest(&self) -> Option<AnchorRecord> {
        self.anchors.lock().last().cloned()
    }

    pub fn all(&self) -> Vec<AnchorRecord> {
        self.anchors.lock().clone()
    }

    /// Anchor everything appended since the previous anchor and persist it.
    pub fn anchor_pending(&self, log: &AuditLog) -> GuardResult<AnchorRecord> {
        let mut anchors = self.anchors.lock();
        let from = next_index(&anchors)?;
        let anchor = build_anchor(log, from)?;
        if let Some(path) = &self.path {
            let sink = JsonlSink::open(path)?;
            sink.persist_line(&anchor)?;
        }
        anchors.push(anchor.clone());
        Ok(anchor)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn filled_log(n: usize) -> AuditLog {
        let log = AuditLog::in_memory();
        for i in 0..n {
            log.append("system", "decision_executed", &json!({ "i": i }))
                .unwrap();
        }
        log
    }

    #[test]
    fn test_build_and_verify() {
        let log = filled_log(3);
        let anchor = build_anchor(&log, 0).unwrap();
        assert_eq!(anchor.entry_count, 3);
        assert_eq!(anchor.merkle_root, log.merkle_root(0..3).unwrap());
        assert!(verify_anchor(&log, &anchor));
    }

    #[test]
    fn test_nothing_to_anchor() {
        let log = filled_log(2);
        assert!(matches!(build_anchor(&log, 2), Err(GuardError::EmptyLeafSet)));
    }

    #[test]
    fn test_tampered_anchor_fails() {
        let log = filled_log(3);
        let mut anchor = build_anchor(&log, 0).unwrap();
        anchor.merkle_root = ContentHash::compute(b"forged");
        assert!(!verify_anchor(&log, &anchor));
        anchor.entry_count = 10;
        assert!(!verify_anchor(&log, &anchor));
    }

    #[test]
    fn test_ledger_tracks_batches() {
        let log = filled_log(3);
        let ledger = AnchorLedger::in_memory();
        let a1 = ledger.anchor_pending(&log).unwrap();
        assert_eq!((a1.first_index, a1.entry_count), (0, 3));
        assert!(ledger.anchor_pending(&log).is_err());

        log.append("system", "decision_blocked", &json!({})).unwrap();
        let a2 = ledger.anchor_pending(&log).unwrap();
        assert_eq!((a2.first_index, a2.entry_count), (3, 1));
        assert_eq!(ledger.next_unanchored().unwrap(), 4);
        assert_eq!(ledger.all().len(), 2);
    }

    #[test]
    fn test_ledger_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchors.jsonl");
        let log = filled_log(2);
        let anchor = {
            let ledger = AnchorLedger::open(&path).unwrap();
            ledger.anchor_pending(&log).unwrap()
        };
        let reopened = AnchorLedger::open(&path).unwrap();
        assert_eq!(reopened.latest(), Some(anchor));
        assert_eq!(reopened.next_unanchored().unwrap(), 2);
    }

    #[test]
    fn test_overflowing_anchor_fails_verification() {
        let log = filled_log(3);
        let mut anchor = build_anchor(&log, 0).unwrap();
        anchor.first_index = usize::MAX;
        assert_eq!(anchor.end_index(), None);
        assert!(!verify_anchor(&log, &anchor));
    }

    #[test]
    fn test_ledger_rejects_forged_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchors.jsonl");
        let log = filled_log(2);
        let mut anchor = build_anchor(&log, 0).unwrap();
        anchor.first_index = usize::MAX;
        std::fs::write(&path, format!("{}\n", serde_json::to_string(&anchor).unwrap())).unwrap();
        let err = AnchorLedger::open(&path).err().unwrap();
        assert!(matches!(err, GuardError::Storage(ref m) if m.contains("line 1")));

        // A gap between batches is also rejected.
        anchor.first_index = 5;
        std::fs::write(&path, format!("{}\n", serde_json::to_string(&anchor).unwrap())).unwrap();
        assert!(AnchorLedger::open(&path).is_err());
    }
}
