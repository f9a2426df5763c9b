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

//! Block header and its binary encoding. The header commits to the ordered
//! parent set through `parent_root`, to the transaction set through
//! `tx_root` and carries the proof of work that secured it.

use chrono::naive::NaiveDateTime;
use chrono::{DateTime, TimeZone, Utc};

use crate::core::hash::{Hash, Hashed, ZERO_HASH};
use crate::pow::Pow;
use crate::ser::{self, Readable, Reader, Writeable, Writer};

/// Block header, fairly standard compared to other PoW chains, except that
/// a block references several parents through a merkle root rather than a
/// single previous block.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockHeader {
	/// Version of the block
	pub version: u32,
	/// Root of the merkle tree over the hashes of all parents
	pub parent_root: Hash,
	/// Merkle root of the transactions in the block
	pub tx_root: Hash,
	/// Root of the state trie after this block
	pub state_root: Hash,
	/// Difficulty target for the proof of work, in compact form
	pub difficulty: u32,
	/// Timestamp at which the block was built
	pub timestamp: DateTime<Utc>,
	/// Proof of work and related
	pub pow: Pow,
}

impl Default for BlockHeader {
	fn default() -> BlockHeader {
		BlockHeader {
			version: 1,
			parent_root: ZERO_HASH,
			tx_root: ZERO_HASH,
			state_root: ZERO_HASH,
			difficulty: 0,
			timestamp: DateTime::<Utc>::from_utc(NaiveDateTime::from_timestamp(0, 0), Utc),
			pow: Pow::default(),
		}
	}
}

/// Serialization of a block header
impl Writeable for BlockHeader {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		self.write_pre_pow(writer)?;
		self.pow.write(writer)?;
		Ok(())
	}
}

/// Deserialization of a block header
impl Readable for BlockHeader {
	fn read(reader: &mut dyn Reader) -> Result<BlockHeader, ser::Error> {
		let version = reader.read_u32()?;
		let parent_root = Hash::read(reader)?;
		let tx_root = Hash::read(reader)?;
		let state_root = Hash::read(reader)?;
		let (difficulty, timestamp) = ser_multiread!(reader, read_u32, read_i64);
		let pow = Pow::read(reader)?;
		Ok(BlockHeader {
			version,
			parent_root,
			tx_root,
			state_root,
			difficulty,
			timestamp: Utc.timestamp(timestamp, 0),
			pow,
		})
	}
}

impl BlockHeader {
	/// Write the pre-PoW portion of the header
	pub fn write_pre_pow<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		writer.write_u32(self.version)?;
		self.parent_root.write(writer)?;
		self.tx_root.write(writer)?;
		self.state_root.write(writer)?;
		ser_multiwrite!(
			writer,
			[write_u32, self.difficulty],
			[write_i64, self.timestamp.timestamp()]
		);
		Ok(())
	}

	/// Serialized bytes of the header that feed the proof of work: every
	/// field except the proof itself, followed by the PoW nonce.
	pub fn pow_input_bytes(&self) -> Result<Vec<u8>, ser::Error> {
		let mut bytes = vec![];
		{
			let mut writer = ser::BinWriter::new(&mut bytes);
			self.write_pre_pow(&mut writer)?;
			writer.write_u64(self.pow.nonce())?;
		}
		Ok(bytes)
	}

	/// The hash of the block this header represents.
	pub fn block_hash(&self) -> Hash {
		self.hash()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::ser;

	#[test]
	fn header_ser_roundtrip() {
		let mut header = BlockHeader::default();
		header.difficulty = 0x1c1f_ffff;
		header.timestamp = Utc.timestamp(1_548_324_900, 0);
		let vec = ser::ser_vec(&header).unwrap();
		let header2: BlockHeader = ser::deserialize(&mut &vec[..]).unwrap();
		assert_eq!(header, header2);
	}

	#[test]
	fn block_hash_commits_to_pow() {
		let header = BlockHeader::default();
		let mut header2 = header.clone();
		header2.pow = Pow::blake2bd(42);
		assert_ne!(header.block_hash(), header2.block_hash());
	}

	#[test]
	fn pow_input_excludes_proof() {
		let header = BlockHeader::default();
		// pre-pow fields: 4 + 32 * 3 + 4 + 8, plus the 8 byte nonce
		assert_eq!(header.pow_input_bytes().unwrap().len(), 120);
	}
}
