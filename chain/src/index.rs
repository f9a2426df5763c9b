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

//! The block index: the concurrent lookup and status-update surface over
//! all block nodes the process knows about. Lookups go through a sharded
//! map so readers don't contend; status updates are atomic per node and
//! tracked in a dirty set until flushed to the store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::blocknode::{BlockNode, BlockStatus};
use crate::core::core::hash::Hash;
use crate::core::core::BlockHeader;
use crate::error::{Error, ErrorKind};
use crate::store::IndexStore;
use crate::util::{Mutex, RwLock};

/// Number of shards the node map is split over. Must be a power of two.
const SHARD_COUNT: usize = 32;

/// The index over all known block nodes, mapping hashes to nodes and
/// mediating every concurrent status mutation.
pub struct BlockIndex {
	/// hash to node mapping, sharded by the first hash byte
	shards: Vec<RwLock<HashMap<Hash, Arc<BlockNode>>>>,
	/// nodes whose status changed since the last flush
	dirty: Mutex<HashSet<Hash>>,
}

impl BlockIndex {
	/// A new, empty index.
	pub fn new() -> BlockIndex {
		BlockIndex {
			shards: (0..SHARD_COUNT).map(|_| RwLock::new(HashMap::new())).collect(),
			dirty: Mutex::new(HashSet::new()),
		}
	}

	fn shard(&self, hash: &Hash) -> &RwLock<HashMap<Hash, Arc<BlockNode>>> {
		&self.shards[hash.0[0] as usize & (SHARD_COUNT - 1)]
	}

	/// Looks up the node for the given block hash. Returns None if there
	/// is no entry for the hash.
	pub fn lookup_node(&self, hash: &Hash) -> Option<Arc<BlockNode>> {
		self.shard(hash).read().get(hash).cloned()
	}

	/// Whether the index knows about the given block hash.
	pub fn have_block(&self, hash: &Hash) -> bool {
		self.shard(hash).read().contains_key(hash)
	}

	/// Number of nodes in the index.
	pub fn node_count(&self) -> usize {
		self.shards.iter().map(|s| s.read().len()).sum()
	}

	/// Adds an already-built node to the index and registers it as a child
	/// of each of its parents. Fails if a node with the same hash exists.
	pub fn add_node(&self, node: Arc<BlockNode>) -> Result<Arc<BlockNode>, Error> {
		let hash = *node.get_hash();
		{
			let mut shard = self.shard(&hash).write();
			if shard.contains_key(&hash) {
				return Err(ErrorKind::DuplicateHash(hash).into());
			}
			shard.insert(hash, node.clone());
		}
		for parent in node.parents() {
			parent.add_child(&node);
		}
		debug!("added block {} to the index", hash);
		Ok(node)
	}

	/// Builds a node for a freshly seen header, resolving its parent
	/// hashes against the index, and inserts it. Fails if any parent is
	/// unknown or if the block is already present.
	pub fn create_node(
		&self,
		header: &BlockHeader,
		parent_hashes: &[Hash],
	) -> Result<Arc<BlockNode>, Error> {
		let mut parents = Vec::with_capacity(parent_hashes.len());
		for parent_hash in parent_hashes {
			match self.lookup_node(parent_hash) {
				Some(parent) => parents.push(parent),
				None => return Err(ErrorKind::UnknownParent(*parent_hash).into()),
			}
		}
		self.add_node(Arc::new(BlockNode::new(header, parents)))
	}

	/// Current status of the given node.
	pub fn node_status(&self, node: &BlockNode) -> BlockStatus {
		node.status()
	}

	/// Sets the provided status flags on the node, leaving the others
	/// untouched, and marks it dirty for the next flush.
	pub fn set_status_flags(&self, node: &BlockNode, flags: BlockStatus) {
		node.or_status(flags);
		self.dirty.lock().insert(*node.get_hash());
	}

	/// Clears the provided status flags on the node, leaving the others
	/// untouched, and marks it dirty for the next flush.
	pub fn unset_status_flags(&self, node: &BlockNode, flags: BlockStatus) {
		node.and_status(!flags.bits());
		self.dirty.lock().insert(*node.get_hash());
	}

	/// Hands every dirty node to the store and clears the dirty set. A
	/// store failure leaves the set untouched so the statuses are retried
	/// on the next flush; nodes dirtied while flushing stay dirty.
	pub fn flush_dirty(&self, store: &dyn IndexStore) -> Result<(), Error> {
		let snapshot: Vec<Hash> = self.dirty.lock().iter().cloned().collect();
		for hash in &snapshot {
			if let Some(node) = self.lookup_node(hash) {
				store
					.save_block_node(&node.header(), node.status())
					.map_err(|e| ErrorKind::StoreErr(format!("{}", e)))?;
			}
		}
		let mut dirty = self.dirty.lock();
		for hash in &snapshot {
			dirty.remove(hash);
		}
		Ok(())
	}

	/// Number of nodes currently waiting to be flushed. Mostly useful for
	/// tests and stats.
	pub fn dirty_count(&self) -> usize {
		self.dirty.lock().len()
	}
}

impl Default for BlockIndex {
	fn default() -> BlockIndex {
		BlockIndex::new()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn header(version: u32) -> BlockHeader {
		let mut header = BlockHeader::default();
		header.version = version;
		header
	}

	#[test]
	fn lookup_after_insert() {
		let index = BlockIndex::new();
		let genesis = index.create_node(&header(1), &[]).unwrap();
		assert!(index.have_block(genesis.get_hash()));
		let found = index.lookup_node(genesis.get_hash()).unwrap();
		assert!(Arc::ptr_eq(&found, &genesis));
		assert_eq!(index.node_count(), 1);
	}

	#[test]
	fn duplicate_insert_rejected() {
		let index = BlockIndex::new();
		let genesis = index.create_node(&header(1), &[]).unwrap();
		let err = index.create_node(&header(1), &[]).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::DuplicateHash(*genesis.get_hash()));
	}

	#[test]
	fn unknown_parent_rejected() {
		let index = BlockIndex::new();
		let missing = Hash::from_vec(&[42]);
		let err = index.create_node(&header(1), &[missing]).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::UnknownParent(missing));
	}

	#[test]
	fn insertion_links_children() {
		let index = BlockIndex::new();
		let genesis = index.create_node(&header(1), &[]).unwrap();
		let child = index
			.create_node(&header(2), &[*genesis.get_hash()])
			.unwrap();
		assert!(genesis.has_child(&child));
		assert_eq!(child.parents()[0].get_hash(), genesis.get_hash());
	}

	#[test]
	fn status_flags_set_and_unset() {
		let index = BlockIndex::new();
		let node = index.create_node(&header(1), &[]).unwrap();
		index.set_status_flags(&node, BlockStatus::DATA_STORED);
		assert!(index.node_status(&node).have_data());
		index.unset_status_flags(&node, BlockStatus::DATA_STORED);
		assert!(!index.node_status(&node).have_data());
		assert_eq!(index.dirty_count(), 1);
	}

	#[test]
	fn valid_and_invalid_are_exclusive() {
		let index = BlockIndex::new();
		let node = index.create_node(&header(1), &[]).unwrap();
		index.set_status_flags(&node, BlockStatus::DATA_STORED);

		node.valid(&index);
		assert!(node.status().known_valid());
		assert!(!node.status().known_invalid());

		node.invalid(&index);
		assert_eq!(
			node.status(),
			BlockStatus::DATA_STORED | BlockStatus::INVALID
		);

		node.valid(&index);
		assert_eq!(node.status(), BlockStatus::DATA_STORED | BlockStatus::VALID);
	}
}
