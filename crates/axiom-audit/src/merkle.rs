// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Axiom Guard Merkle Builder
// ─────────────────────────────────────────────────────────────────────
//! Binary Merkle tree over ordered leaf hashes.
//!
//! Each level combines adjacent pairs with `hash(a ++ b)`. An odd
//! level pairs its last digest with itself. A single leaf is its own
//! root, and an empty leaf set is an error rather than a sentinel.
//! Leaf order is significant: it encodes audit entry order.

use serde::{Deserialize, Serialize};

use axiom_types::{GuardError, GuardResult};

use crate::digest::ContentHash;

fn next_level(level: &[ContentHash]) -> Vec<ContentHash> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => ContentHash::combine(left, right),
            [last] => ContentHash::combine(last, last),
            _ => unreachable!("chunks(2) yields one or two items"),
        })
        .collect()
}

/// Reduce `leaves` to a single root.
pub fn merkle_root(leaves: &[ContentHash]) -> GuardResult<ContentHash> {
    if leaves.is_empty() {
        return Err(GuardError::EmptyLeafSet);
    }
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
    }
    Ok(level[0])
}

/// Which side the sibling sits on at one proof step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    pub sibling: ContentHash,
    pub side: Side,
}

/// Path from one leaf up to the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    pub leaf_index: usize,
    pub leaf_count: usize,
    pub path: Vec<ProofStep>,
}

/// Build the inclusion proof for `leaves[index]`.
pub fn inclusion_proof(leaves: &[ContentHash], index: usize) -> GuardResult<InclusionProof> {
    if leaves.is_empty() {
        return Err(GuardError::EmptyLeafSet);
    }
    if index >= leaves.len() {
        return Err(GuardError::Config(format!(
            "leaf index {index} out of range for {} leaves",
            leaves.len()
        )));
    }
    let mut path = Vec::new();
    let mut level = leaves.to_vec();
    let mut idx = index;
    while level.len() > 1 {
        let step = if idx % 2 == 0 {
            // Duplicate-last: an unpaired node is its own right sibling.
            let sibling = level.get(idx + 1).copied().unwrap_or(level[idx]);
            ProofStep {
                sibling,
                side: Side::Right,
            }
        } else {
            ProofStep {
                sibling: level[idx - 1],
                side: Side::Left,
            }
        };
        path.push(step);
        level = next_level(&level);
        idx /= 2;
    }
    Ok(InclusionProof {
        leaf_index: index,
        leaf_count: leaves.len(),
        path,
    })
}

/// Recompute the root from `leaf` along `proof` and compare.
pub fn verify_inclusion(leaf: &ContentHash, proof: &InclusionProof, root: &ContentHash) -> bool {
    let mut current = *leaf;
    for step in &proof.path {
        current = match step.side {
            Side::Left => ContentHash::combine(&step.sibling, &current),
            Side::Right => ContentHash::combine(&current, &step.sibling),
        };
    }
    current == *root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: usize) -> Vec<ContentHash> {
        (0..n)
            .map(|i| ContentHash::compute(format!("leaf-{i}").as_bytes()))
            .collect()
    }

    #[test]
    fn test_empty_is_error() {
        assert!(matches!(merkle_root(&[]), Err(GuardError::EmptyLeafSet)));
        assert!(matches!(inclusion_proof(&[], 0), Err(GuardError::EmptyLeafSet)));
    }

    #[test]
    fn test_single_leaf_is_root() {
        let l = leaves(1);
        assert_eq!(merkle_root(&l).unwrap(), l[0]);
    }

    #[test]
    fn test_two_leaves() {
        let h1 = ContentHash::from_bytes([0xaa; 32]);
        let h2 = ContentHash::from_bytes([0xbb; 32]);
        assert_eq!(
            merkle_root(&[h1, h2]).unwrap(),
            ContentHash::combine(&h1, &h2)
        );
    }

    #[test]
    fn test_three_leaves_duplicate_last() {
        let h1 = ContentHash::from_bytes([0xaa; 32]);
        let h2 = ContentHash::from_bytes([0xbb; 32]);
        let h3 = ContentHash::from_bytes([0xcc; 32]);
        let expected = ContentHash::combine(
            &ContentHash::combine(&h1, &h2),
            &ContentHash::combine(&h3, &h3),
        );
        assert_eq!(merkle_root(&[h1, h2, h3]).unwrap(), expected);
    }

    #[test]
    fn test_deterministic() {
        let l = leaves(7);
        assert_eq!(merkle_root(&l).unwrap(), merkle_root(&l).unwrap());
    }

    #[test]
    fn test_order_sensitive() {
        let mut l = leaves(5);
        let before = merkle_root(&l).unwrap();
        l.swap(1, 3);
        assert_ne!(before, merkle_root(&l).unwrap());
    }

    #[test]
    fn test_inclusion_proofs_verify_for_every_leaf() {
        for n in [1usize, 2, 3, 5, 8, 11] {
            let l = leaves(n);
            let root = merkle_root(&l).unwrap();
            for (i, leaf) in l.iter().enumerate() {
                let proof = inclusion_proof(&l, i).unwrap();
                assert!(verify_inclusion(leaf, &proof, &root), "n={n} i={i}");
            }
        }
    }

    #[test]
    fn test_inclusion_rejects_wrong_leaf() {
        let l = leaves(4);
        let root = merkle_root(&l).unwrap();
        let proof = inclusion_proof(&l, 2).unwrap();
        assert!(!verify_inclusion(&l[1], &proof, &root));
        assert!(inclusion_proof(&l, 4).is_err());
    }
}
