// Copyright 2020 The Braid Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Merkle tree over the parent hashes of a block. The root commits the full
//! ordered parent set into the `parent_root` header field.

use crate::core::hash::{hash_bytes, Hash, HASH_SIZE, ZERO_HASH};

/// Hash of the concatenation of the two child hashes, the inner node of the
/// merkle tree.
fn hash_merkle_branches(left: &Hash, right: &Hash) -> Hash {
	let mut data = [0u8; HASH_SIZE * 2];
	data[..HASH_SIZE].copy_from_slice(left.as_bytes());
	data[HASH_SIZE..].copy_from_slice(right.as_bytes());
	hash_bytes(&data)
}

/// Builds the merkle tree store for the given ordered parent hashes. The
/// store is laid out as a flat array where the leaves occupy the first
/// next-power-of-two entries and each level follows the one below it, the
/// root sitting in the last entry. A missing right child is paired with a
/// duplicate of the left one.
fn build_merkle_tree_store(parents: &[Hash]) -> Vec<Option<Hash>> {
	let next_pot = parents.len().next_power_of_two();
	let array_size = next_pot * 2 - 1;
	let mut merkles: Vec<Option<Hash>> = vec![None; array_size];
	for (i, h) in parents.iter().enumerate() {
		merkles[i] = Some(*h);
	}

	let mut offset = next_pot;
	let mut i = 0;
	while i < array_size - 1 {
		merkles[offset] = match (merkles[i], merkles[i + 1]) {
			// parent of an empty subtree stays empty
			(None, _) => None,
			(Some(left), None) => Some(hash_merkle_branches(&left, &left)),
			(Some(left), Some(right)) => Some(hash_merkle_branches(&left, &right)),
		};
		i += 2;
		offset += 1;
	}
	merkles
}

/// The merkle root over an ordered list of parent hashes. An empty parent
/// set (genesis) commits to the zero hash.
pub fn parents_merkle_root(parents: &[Hash]) -> Hash {
	if parents.is_empty() {
		return ZERO_HASH;
	}
	let merkles = build_merkle_tree_store(parents);
	merkles[merkles.len() - 1].unwrap_or(ZERO_HASH)
}
