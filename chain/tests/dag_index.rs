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

extern crate braid_chain as chain;
extern crate braid_core as core;
extern crate braid_util as util;

use std::sync::Arc;

use chain::{BlockIndex, BlockNode, BlockStatus, ChainView, DagOracle, IndexStore};
use chrono::{TimeZone, Utc};
use core::core::hash::Hash;
use core::core::BlockHeader;
use core::pow::calc_work;
use util::Mutex;

/// Picks the parent with the greatest accumulated work, ties broken by the
/// smallest hash. The production ordering lives outside this crate; this
/// stands in for it.
struct MaxWorkOracle<'a> {
	index: &'a BlockIndex,
}

impl<'a> DagOracle for MaxWorkOracle<'a> {
	fn get_main_parent(&self, parents: &[Hash]) -> Option<Hash> {
		let mut best: Option<Arc<BlockNode>> = None;
		for hash in parents {
			let node = self.index.lookup_node(hash)?;
			best = match best {
				None => Some(node),
				Some(b) => {
					let work = node.work_sum();
					let best_work = b.work_sum();
					if work > best_work || (work == best_work && node.get_hash() < b.get_hash())
					{
						Some(node)
					} else {
						Some(b)
					}
				}
			};
		}
		best.map(|b| *b.get_hash())
	}
}

/// Collects everything it is asked to persist.
struct RecordingStore {
	saved: Mutex<Vec<(Hash, u8)>>,
	fail: bool,
}

impl RecordingStore {
	fn new(fail: bool) -> RecordingStore {
		RecordingStore {
			saved: Mutex::new(vec![]),
			fail,
		}
	}
}

impl IndexStore for RecordingStore {
	fn save_block_node(
		&self,
		header: &BlockHeader,
		status: BlockStatus,
	) -> Result<(), chain::Error> {
		if self.fail {
			return Err(chain::ErrorKind::StoreErr("store offline".to_owned()).into());
		}
		self.saved
			.lock()
			.push((header.block_hash(), status.bits()));
		Ok(())
	}
}

fn header_at(timestamp: i64, difficulty: u32, parent_root: Hash) -> BlockHeader {
	let mut header = BlockHeader::default();
	header.difficulty = difficulty;
	header.timestamp = Utc.timestamp(timestamp, 0);
	header.parent_root = parent_root;
	header
}

/// Inserts a linear chain with one block per timestamp, orders it as it
/// goes and returns the tip.
fn build_chain(index: &BlockIndex, timestamps: &[i64]) -> Arc<BlockNode> {
	let mut prev: Option<Arc<BlockNode>> = None;
	for (i, ts) in timestamps.iter().enumerate() {
		let parents = match &prev {
			Some(p) => vec![*p.get_hash()],
			None => vec![],
		};
		let parent_root = core::core::merkle::parents_merkle_root(&parents);
		let node = index
			.create_node(&header_at(*ts, 0x1c1f_ffff, parent_root), &parents)
			.unwrap();
		node.set_order(i as u64);
		node.set_height(i as u64);
		node.set_layer(i as u64);
		if let Some(p) = &prev {
			node.calc_work_sum(p);
		}
		prev = Some(node);
	}
	prev.unwrap()
}

#[test]
fn past_median_time_full_window() {
	util::init_test_logger();
	let index = BlockIndex::new();
	// the last 11 blocks of the chain carry these timestamps, newest last
	let timestamps = [5, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100];
	let tip = build_chain(&index, &timestamps);

	let oracle = MaxWorkOracle { index: &index };
	let view = ChainView::new(&index, &oracle);
	assert_eq!(tip.calc_past_median_time(&view).timestamp(), 50);
}

#[test]
fn past_median_time_near_genesis() {
	let index = BlockIndex::new();
	let tip = build_chain(&index, &[100, 200, 300]);

	let oracle = MaxWorkOracle { index: &index };
	let view = ChainView::new(&index, &oracle);
	// 3 samples only; the middle one wins, not an average
	assert_eq!(tip.calc_past_median_time(&view).timestamp(), 200);
}

#[test]
fn work_sums_accumulate_along_main_parents() {
	let index = BlockIndex::new();
	let tip = build_chain(&index, &[100, 130, 160, 190]);

	let oracle = MaxWorkOracle { index: &index };
	let view = ChainView::new(&index, &oracle);

	let mut node = tip;
	while let Some(main_parent) = view.get_main_parent(&node) {
		assert_eq!(
			node.work_sum(),
			main_parent.work_sum() + calc_work(node.bits(), node.get_pow_type())
		);
		node = main_parent;
	}
	// the walk ends at genesis, which carries exactly its own work
	assert_eq!(node.work_sum(), calc_work(node.bits(), node.get_pow_type()));
}

#[test]
fn parent_child_links_hold_across_the_dag() {
	let index = BlockIndex::new();
	let genesis = index
		.create_node(&header_at(0, 0x1c1f_ffff, Hash::default()), &[])
		.unwrap();

	// two competing children of genesis, merged by a fourth block
	let left = index
		.create_node(
			&header_at(30, 0x1c1f_ffff, Hash::default()),
			&[*genesis.get_hash()],
		)
		.unwrap();
	let right = index
		.create_node(
			&header_at(31, 0x1c1f_ffff, Hash::default()),
			&[*genesis.get_hash()],
		)
		.unwrap();
	let merge = index
		.create_node(
			&header_at(60, 0x1c1f_ffff, Hash::default()),
			&[*left.get_hash(), *right.get_hash()],
		)
		.unwrap();

	for node in &[left.clone(), right.clone(), merge.clone()] {
		for parent in node.parents() {
			assert!(parent.has_child(node));
		}
	}
	assert_eq!(genesis.children().len(), 2);
	assert_eq!(merge.parents().len(), 2);
}

#[test]
fn forward_and_back_parent_of_a_merge_block() {
	let index = BlockIndex::new();
	let genesis = index
		.create_node(&header_at(0, 0x1c1f_ffff, Hash::default()), &[])
		.unwrap();
	let left = index
		.create_node(
			&header_at(30, 0x1c1f_ffff, Hash::default()),
			&[*genesis.get_hash()],
		)
		.unwrap();
	let right = index
		.create_node(
			&header_at(31, 0x1c1f_ffff, Hash::default()),
			&[*genesis.get_hash()],
		)
		.unwrap();
	left.set_order(1);
	right.set_order(2);
	let merge = index
		.create_node(
			&header_at(60, 0x1c1f_ffff, Hash::default()),
			&[*right.get_hash(), *left.get_hash()],
		)
		.unwrap();

	assert_eq!(
		merge.get_forward_parent().unwrap().get_hash(),
		left.get_hash()
	);
	assert_eq!(
		merge.get_back_parent().unwrap().get_hash(),
		right.get_hash()
	);
	assert!(!merge.is_ordered());
}

#[test]
fn flush_hands_dirty_statuses_to_the_store() {
	let index = BlockIndex::new();
	let node = index
		.create_node(&header_at(0, 0x1c1f_ffff, Hash::default()), &[])
		.unwrap();
	index.set_status_flags(&node, BlockStatus::DATA_STORED);
	node.valid(&index);
	assert_eq!(index.dirty_count(), 1);

	let store = RecordingStore::new(false);
	index.flush_dirty(&store).unwrap();
	assert_eq!(index.dirty_count(), 0);

	let saved = store.saved.lock();
	assert_eq!(saved.len(), 1);
	assert_eq!(saved[0].0, *node.get_hash());
	// stable storage encoding: data stored | valid
	assert_eq!(saved[0].1, 0x01 | 0x02);
}

#[test]
fn failed_flush_keeps_the_dirty_set() {
	let index = BlockIndex::new();
	let node = index
		.create_node(&header_at(0, 0x1c1f_ffff, Hash::default()), &[])
		.unwrap();
	node.invalid(&index);

	let store = RecordingStore::new(true);
	assert!(index.flush_dirty(&store).is_err());
	assert_eq!(index.dirty_count(), 1);
}

#[test]
fn statuses_update_concurrently() {
	let index = Arc::new(BlockIndex::new());
	let mut nodes = vec![];
	for ts in 0..16 {
		let node = index
			.create_node(&header_at(ts, 0x1c1f_ffff, Hash::default()), &[])
			.unwrap();
		nodes.push(node);
	}

	let mut handles = vec![];
	for node in nodes.iter().cloned() {
		let index = index.clone();
		handles.push(std::thread::spawn(move || {
			for _ in 0..100 {
				node.valid(&index);
				node.invalid(&index);
			}
		}));
	}
	for h in handles {
		h.join().unwrap();
	}

	for node in &nodes {
		// every node went through the two ordered updates; whatever
		// interleaving happened, the flags stay exclusive
		let status = node.status();
		assert!(!(status.known_valid() && status.known_invalid()));
	}
}
