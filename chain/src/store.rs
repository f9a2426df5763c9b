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

//! Contract the index requires from whoever persists it. The index itself
//! never touches disk; flushing hands the header fields and the status
//! byte of every dirty node to an implementation of this trait.

use crate::blocknode::BlockStatus;
use crate::core::core::BlockHeader;
use crate::error::Error;

/// Persistence contract consumed by the block index.
///
/// The status byte is stored in its stable encoding (`0x01` data stored,
/// `0x02` valid, `0x04` invalid) and must be written back unchanged.
pub trait IndexStore: Send + Sync {
	/// Saves the header fields and current status of one block node.
	fn save_block_node(&self, header: &BlockHeader, status: BlockStatus) -> Result<(), Error>;
}
