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

//! Read-only navigation over the DAG. The view ties the index to the
//! ordering oracle so callers can follow the canonical linearization of
//! the DAG (main parents) without knowing how it is computed.

use std::sync::Arc;

use crate::blocknode::BlockNode;
use crate::core::core::hash::Hash;
use crate::index::BlockIndex;

/// The part of the DAG ordering the index consumes: selection of the
/// canonical main parent among a candidate parent set, by whatever
/// consensus rule the ordering implements (typically maximum cumulative
/// work with a deterministic tie-break).
pub trait DagOracle: Send + Sync {
	/// The hash of the canonical main parent among the candidates, or None
	/// when the set is empty or entirely unknown to the ordering.
	fn get_main_parent(&self, parents: &[Hash]) -> Option<Hash>;
}

/// Navigation handle over the DAG: an index to resolve hashes plus the
/// oracle that linearizes it.
pub struct ChainView<'a> {
	index: &'a BlockIndex,
	oracle: &'a dyn DagOracle,
}

impl<'a> ChainView<'a> {
	/// A view over the given index and ordering oracle.
	pub fn new(index: &'a BlockIndex, oracle: &'a dyn DagOracle) -> ChainView<'a> {
		ChainView { index, oracle }
	}

	/// The index this view resolves hashes against.
	pub fn index(&self) -> &BlockIndex {
		self.index
	}

	/// The main parent of the given node: the canonical one among its
	/// parents, as selected by the oracle. None for genesis.
	pub fn get_main_parent(&self, node: &BlockNode) -> Option<Arc<BlockNode>> {
		let parents = node.parent_hashes();
		if parents.is_empty() {
			return None;
		}
		let main_parent = self.oracle.get_main_parent(&parents)?;
		self.index.lookup_node(&main_parent)
	}

	/// The DAG order of the node.
	pub fn order_of(&self, node: &BlockNode) -> u64 {
		node.get_order()
	}

	/// The height of the node.
	pub fn height_of(&self, node: &BlockNode) -> u64 {
		node.get_height()
	}

	/// The topological layer of the node.
	pub fn layer_of(&self, node: &BlockNode) -> u64 {
		node.get_layer()
	}

	/// Whether the ordering has placed the node.
	pub fn is_ordered(&self, node: &BlockNode) -> bool {
		node.is_ordered()
	}
}
