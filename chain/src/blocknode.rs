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

//! In-memory representation of a single block of the DAG. There will be
//! hundreds of thousands of these, living for the whole lifetime of the
//! index. All header-derived fields are immutable and readable without
//! synchronization; the validation status, order, height, layer and work
//! sum are the only moving parts.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Weak};

use chrono::{DateTime, TimeZone, Utc};
use num_bigint::BigInt;

use crate::core::consensus::MEDIAN_TIME_BLOCKS;
use crate::core::core::hash::Hash;
use crate::core::core::merkle::parents_merkle_root;
use crate::core::core::BlockHeader;
use crate::core::pow::{calc_work, Pow, PowType};
use crate::index::BlockIndex;
use crate::util::RwLock;
use crate::view::ChainView;

/// Order of a node the DAG ordering has not placed yet.
pub const MAX_BLOCK_ORDER: u64 = u64::max_value();

bitflags! {
	/// Bit flags representing the validation state of a block node.
	///
	/// The status is serialized for long-term storage, so the flag values
	/// must remain stable across versions.
	pub struct BlockStatus: u8 {
		/// The block's payload is stored on disk
		const DATA_STORED = 0b0000_0001;
		/// The block has been fully validated
		const VALID = 0b0000_0010;
		/// The block has failed validation
		const INVALID = 0b0000_0100;
	}
}

impl BlockStatus {
	/// Whether the full block data is stored in the database. False for a
	/// node where only the header is known.
	pub fn have_data(self) -> bool {
		self.contains(BlockStatus::DATA_STORED)
	}

	/// Whether the block is known to be valid. False for a valid block
	/// that has not been fully validated yet.
	pub fn known_valid(self) -> bool {
		self.contains(BlockStatus::VALID)
	}

	/// Whether the block is known to be invalid. False for an invalid
	/// block that has not been proven invalid yet.
	pub fn known_invalid(self) -> bool {
		self.contains(BlockStatus::INVALID)
	}
}

/// A block within the DAG, used to track the validation state of every
/// known block and to select the chain the ordering builds on.
///
/// Parent references are strong and child references weak: the DAG is
/// acyclic in the parent direction, so this breaks every reference cycle
/// while the index's own strong references keep all children alive for as
/// long as the node itself.
#[derive(Debug)]
pub struct BlockNode {
	/// hash of the block this node represents
	hash: Hash,
	/// all the parents of this node, fixed at creation
	parents: Vec<Arc<BlockNode>>,
	/// all the children of this node, appended as they are inserted
	children: RwLock<Vec<Weak<BlockNode>>>,

	/// total amount of work in the DAG up to and including this node
	work_sum: RwLock<BigInt>,

	// Fields from the block header to aid in chain selection and in
	// reconstructing the header from memory. Immutable.
	block_version: u32,
	bits: u32,
	timestamp: i64,
	tx_root: Hash,
	state_root: Hash,
	// reserved for future consensus use, always zero for now
	extra_data: [u8; 32],

	/// validation state; only accessed through the concurrent-safe status
	/// methods on the index once the node has been added to it
	status: AtomicU8,

	/// position of this node in the total DAG order, MAX_BLOCK_ORDER until
	/// the ordering has placed it
	order: AtomicU64,
	/// longest-path distance from genesis along main parents
	height: AtomicU64,
	/// topological layer in the DAG
	layer: AtomicU64,

	/// the proof of work carried by the block header
	pow: Pow,
}

impl BlockNode {
	/// Builds a new block node for the given header and resolved parent
	/// nodes. The work sum starts as the work of the block itself; a
	/// genesis node (no parents) is ordered at position 0 right away,
	/// everything else waits for the DAG ordering.
	pub fn new(header: &BlockHeader, parents: Vec<Arc<BlockNode>>) -> BlockNode {
		let order = if parents.is_empty() {
			0
		} else {
			MAX_BLOCK_ORDER
		};
		BlockNode {
			hash: header.block_hash(),
			work_sum: RwLock::new(calc_work(header.difficulty, header.pow.pow_type())),
			parents,
			children: RwLock::new(vec![]),
			block_version: header.version,
			bits: header.difficulty,
			timestamp: header.timestamp.timestamp(),
			tx_root: header.tx_root,
			state_root: header.state_root,
			extra_data: [0; 32],
			status: AtomicU8::new(0),
			order: AtomicU64::new(order),
			height: AtomicU64::new(0),
			layer: AtomicU64::new(0),
			pow: header.pow.clone(),
		}
	}

	/// The hash of the block this node represents.
	pub fn get_hash(&self) -> &Hash {
		&self.hash
	}

	/// The timestamp of the block, in seconds since epoch.
	pub fn get_timestamp(&self) -> i64 {
		self.timestamp
	}

	/// The compact difficulty target claimed by the block.
	pub fn bits(&self) -> u32 {
		self.bits
	}

	/// Which proof of work algorithm secured the block.
	pub fn get_pow_type(&self) -> PowType {
		self.pow.pow_type()
	}

	/// The proof of work carried by the block.
	pub fn pow(&self) -> &Pow {
		&self.pow
	}

	/// Reconstructs the full block header from the node. No lock is needed,
	/// all the fields read are immutable.
	pub fn header(&self) -> BlockHeader {
		let parent_root = parents_merkle_root(&self.parent_hashes());
		BlockHeader {
			version: self.block_version,
			parent_root,
			tx_root: self.tx_root,
			state_root: self.state_root,
			difficulty: self.bits,
			timestamp: Utc.timestamp(self.timestamp, 0),
			pow: self.pow.clone(),
		}
	}

	/// The parent nodes, in the order the block listed them.
	pub fn parents(&self) -> &[Arc<BlockNode>] {
		&self.parents
	}

	/// The hashes of all parents, in DAG order.
	pub fn parent_hashes(&self) -> Vec<Hash> {
		map_vec!(self.parents, |p| *p.get_hash())
	}

	/// The child nodes inserted so far.
	pub fn children(&self) -> Vec<Arc<BlockNode>> {
		self.children
			.read()
			.iter()
			.filter_map(|c| c.upgrade())
			.collect()
	}

	/// Registers a child of this node. Idempotent: inserting a child that
	/// is already present is a no-op.
	pub fn add_child(&self, child: &Arc<BlockNode>) {
		let mut children = self.children.write();
		let present = children
			.iter()
			.filter_map(|c| c.upgrade())
			.any(|c| c.hash == child.hash);
		if !present {
			children.push(Arc::downgrade(child));
		}
	}

	/// Whether the given node is already registered as a child.
	pub fn has_child(&self, child: &BlockNode) -> bool {
		self.children
			.read()
			.iter()
			.filter_map(|c| c.upgrade())
			.any(|c| c.hash == child.hash)
	}

	/// The parent the DAG ordering placed first, ties broken by the first
	/// one encountered.
	pub fn get_forward_parent(&self) -> Option<Arc<BlockNode>> {
		let mut result: Option<&Arc<BlockNode>> = None;
		for p in &self.parents {
			if result.map(|r| p.get_order() < r.get_order()).unwrap_or(true) {
				result = Some(p);
			}
		}
		result.cloned()
	}

	/// The parent the DAG ordering placed last, ties broken by the first
	/// one encountered.
	pub fn get_back_parent(&self) -> Option<Arc<BlockNode>> {
		let mut result: Option<&Arc<BlockNode>> = None;
		for p in &self.parents {
			if result.map(|r| p.get_order() > r.get_order()).unwrap_or(true) {
				result = Some(p);
			}
		}
		result.cloned()
	}

	/// An independent copy of this node. The children slice is copied (the
	/// children themselves are shared), the work sum becomes a fresh big
	/// integer and the immutable proof of work is shared. Used when a
	/// speculative alternate view of the node is needed.
	pub fn clone_node(&self) -> BlockNode {
		BlockNode {
			hash: self.hash,
			parents: self.parents.clone(),
			children: RwLock::new(self.children.read().clone()),
			work_sum: RwLock::new(self.work_sum.read().clone()),
			block_version: self.block_version,
			bits: self.bits,
			timestamp: self.timestamp,
			tx_root: self.tx_root,
			state_root: self.state_root,
			extra_data: self.extra_data,
			status: AtomicU8::new(self.status.load(Ordering::SeqCst)),
			order: AtomicU64::new(self.order.load(Ordering::SeqCst)),
			height: AtomicU64::new(self.height.load(Ordering::SeqCst)),
			layer: AtomicU64::new(self.layer.load(Ordering::SeqCst)),
			pow: self.pow.clone(),
		}
	}

	/// Total work in the DAG up to and including this node.
	pub fn work_sum(&self) -> BigInt {
		self.work_sum.read().clone()
	}

	/// Recomputes the work sum once the main parent has been selected:
	/// the parent's accumulated work plus the work of this block. Assigns
	/// a fresh integer so no intermediate state is aliased.
	pub fn calc_work_sum(&self, main_parent: &BlockNode) {
		let own_work = calc_work(self.bits, self.pow.pow_type());
		let new_sum = main_parent.work_sum() + own_work;
		*self.work_sum.write() = new_sum;
	}

	/// The weight of the block: the bit length of its accumulated work.
	pub fn get_weight(&self) -> u64 {
		self.work_sum.read().bits() as u64
	}

	/// The position of this node in the total DAG order.
	pub fn get_order(&self) -> u64 {
		self.order.load(Ordering::SeqCst)
	}

	/// Whether the DAG ordering has placed this node yet.
	pub fn is_ordered(&self) -> bool {
		self.get_order() != MAX_BLOCK_ORDER
	}

	/// Sets the DAG order of the node. Only the ordering subsystem and the
	/// index may call this.
	pub fn set_order(&self, order: u64) {
		self.order.store(order, Ordering::SeqCst);
	}

	/// Longest-path distance from genesis along main parents.
	pub fn get_height(&self) -> u64 {
		self.height.load(Ordering::SeqCst)
	}

	/// Sets the height of the node. Only the ordering subsystem and the
	/// index may call this.
	pub fn set_height(&self, height: u64) {
		self.height.store(height, Ordering::SeqCst);
	}

	/// Topological layer of the node in the DAG.
	pub fn get_layer(&self) -> u64 {
		self.layer.load(Ordering::SeqCst)
	}

	/// Sets the layer of the node. Only the ordering subsystem and the
	/// index may call this.
	pub fn set_layer(&self, layer: u64) {
		self.layer.store(layer, Ordering::SeqCst);
	}

	/// Current validation status of the node.
	pub fn status(&self) -> BlockStatus {
		BlockStatus::from_bits_truncate(self.status.load(Ordering::SeqCst))
	}

	pub(crate) fn or_status(&self, flags: BlockStatus) {
		self.status.fetch_or(flags.bits(), Ordering::SeqCst);
	}

	pub(crate) fn and_status(&self, mask: u8) {
		self.status.fetch_and(mask, Ordering::SeqCst);
	}

	/// Marks the block as validated, clearing any earlier invalid mark.
	pub fn valid(&self, index: &BlockIndex) {
		index.set_status_flags(self, BlockStatus::VALID);
		index.unset_status_flags(self, BlockStatus::INVALID);
	}

	/// Marks the block as failed validation, clearing any earlier valid
	/// mark.
	pub fn invalid(&self, index: &BlockIndex) {
		index.set_status_flags(self, BlockStatus::INVALID);
		index.unset_status_flags(self, BlockStatus::VALID);
	}

	/// The median time of the few blocks prior to, and including, this
	/// node, walking the DAG along main parents. The window is
	/// `MEDIAN_TIME_BLOCKS` wide, shorter only near genesis.
	///
	/// The median of an even-sized window is the element at `count / 2`
	/// rather than the average of the middle two. Consensus critical: this
	/// must not change, even-sized windows only occur near genesis.
	pub fn calc_past_median_time(&self, view: &ChainView<'_>) -> DateTime<Utc> {
		let mut timestamps = Vec::with_capacity(MEDIAN_TIME_BLOCKS);
		timestamps.push(self.timestamp);

		let mut iter_node = view.get_main_parent(self);
		while timestamps.len() < MEDIAN_TIME_BLOCKS {
			match iter_node {
				Some(node) => {
					timestamps.push(node.get_timestamp());
					iter_node = view.get_main_parent(&node);
				}
				None => break,
			}
		}

		timestamps.sort();
		Utc.timestamp(timestamps[timestamps.len() / 2], 0)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn status_bits_are_stable() {
		assert_eq!(BlockStatus::DATA_STORED.bits(), 0x01);
		assert_eq!(BlockStatus::VALID.bits(), 0x02);
		assert_eq!(BlockStatus::INVALID.bits(), 0x04);
	}

	#[test]
	fn status_predicates() {
		let status = BlockStatus::DATA_STORED | BlockStatus::VALID;
		assert!(status.have_data());
		assert!(status.known_valid());
		assert!(!status.known_invalid());
		assert!(!BlockStatus::empty().known_valid());
	}

	#[test]
	fn genesis_is_ordered_at_zero() {
		let node = BlockNode::new(&BlockHeader::default(), vec![]);
		assert!(node.is_ordered());
		assert_eq!(node.get_order(), 0);
	}

	#[test]
	fn fresh_node_is_unordered() {
		let genesis = Arc::new(BlockNode::new(&BlockHeader::default(), vec![]));
		let mut header = BlockHeader::default();
		header.version = 2;
		let node = BlockNode::new(&header, vec![genesis]);
		assert!(!node.is_ordered());
		assert_eq!(node.get_order(), MAX_BLOCK_ORDER);
	}

	#[test]
	fn add_child_is_idempotent() {
		let genesis = Arc::new(BlockNode::new(&BlockHeader::default(), vec![]));
		let mut header = BlockHeader::default();
		header.version = 2;
		let child = Arc::new(BlockNode::new(&header, vec![genesis.clone()]));
		genesis.add_child(&child);
		genesis.add_child(&child);
		assert_eq!(genesis.children().len(), 1);
		assert!(genesis.has_child(&child));
	}

	#[test]
	fn forward_and_back_parents_by_order() {
		let mk = |version: u32, order: u64| {
			let mut header = BlockHeader::default();
			header.version = version;
			let node = Arc::new(BlockNode::new(&header, vec![]));
			node.set_order(order);
			node
		};
		let p1 = mk(1, 5);
		let p2 = mk(2, 2);
		let p3 = mk(3, 9);
		let mut header = BlockHeader::default();
		header.version = 4;
		let node = BlockNode::new(&header, vec![p1, p2.clone(), p3.clone()]);
		assert_eq!(
			node.get_forward_parent().unwrap().get_hash(),
			p2.get_hash()
		);
		assert_eq!(node.get_back_parent().unwrap().get_hash(), p3.get_hash());
	}

	#[test]
	fn header_roundtrips_through_node() {
		let genesis = Arc::new(BlockNode::new(&BlockHeader::default(), vec![]));
		let mut header = BlockHeader::default();
		header.version = 7;
		header.difficulty = 0x207_4000;
		header.timestamp = Utc.timestamp(1_592_222_400, 0);
		header.parent_root = parents_merkle_root(&[*genesis.get_hash()]);
		let node = BlockNode::new(&header, vec![genesis]);
		assert_eq!(node.header(), header);
		assert_eq!(node.header().block_hash(), *node.get_hash());
	}

	#[test]
	fn clone_node_work_sum_is_independent() {
		// 2^256 / 2^221 == 2^35 of work per block
		let mut header = BlockHeader::default();
		header.difficulty = 0x1c1f_ffff;
		let main_parent = Arc::new(BlockNode::new(&header, vec![]));
		header.version = 2;
		let node = BlockNode::new(&header, vec![main_parent.clone()]);
		let cloned = node.clone_node();

		// recomputing the original's work sum must not touch the clone
		node.calc_work_sum(&main_parent);
		assert_eq!(cloned.work_sum(), BigInt::from(1u64) << 35);
		assert_eq!(node.work_sum(), BigInt::from(1u64) << 36);
		assert_eq!(
			node.work_sum(),
			main_parent.work_sum() + calc_work(header.difficulty, PowType::Blake2bd)
		);
	}
}
