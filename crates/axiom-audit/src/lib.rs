// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Axiom Guard Audit Trail
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Tamper-evident decision history.
//!
//! # Invariants
//!
//! 1. **Canonical hashing**: every hash is taken over the canonical
//!    encoding, so structurally equal payloads hash identically no
//!    matter how their fields were ordered.
//!
//! 2. **Append-only**: entries are never edited, removed or reordered.
//!    An entry is published to readers only after the sink reports it
//!    durable.
//!
//! 3. **Reproducible roots**: the Merkle root over a byte-identical
//!    entry sequence is always the same digest. Roots are recomputed
//!    from the log on demand; the log is the source of truth.

pub mod anchor;
pub mod audit_log;
pub mod canonical;
pub mod digest;
pub mod merkle;

pub use anchor::{build_anchor, verify_anchor, AnchorLedger, AnchorRecord};
pub use audit_log::{
    read_entries, AppendOptions, AuditEntry, AuditLog, AuditSink, JsonlSink, MemorySink,
};
pub use canonical::{canonical_string, canonicalize, hash_canonical};
pub use digest::ContentHash;
pub use merkle::{inclusion_proof, merkle_root, verify_inclusion, InclusionProof, ProofStep, Side};
