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

//! Inventory vectors, the typed hash references peers exchange to
//! advertise which blocks and transactions they know about.

use std::fmt;

use enum_primitive::FromPrimitive;
use log::debug;

use crate::core::core::hash::{Hash, HASH_SIZE};
use crate::core::ser::{self, Readable, Reader, Writeable, Writer};

/// The maximum number of inventory vectors a single inv message may carry.
pub const MAX_INV_PER_MSG: usize = 50_000;

/// Serialized size of a single inventory vector: type plus hash.
pub const INV_VECT_PAYLOAD_SIZE: usize = 4 + HASH_SIZE;

enum_from_primitive! {
	/// The allowed types of inventory vectors. The numeric values are part
	/// of the wire format.
	#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
	pub enum InvType {
		/// No data, used to signal an error back to a peer
		Error = 0,
		/// Hash of a transaction
		Tx = 1,
		/// Hash of a block
		Block = 2,
		/// Hash of a filtered block
		FilteredBlock = 3,
	}
}

impl fmt::Display for InvType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			InvType::Error => write!(f, "ERROR"),
			InvType::Tx => write!(f, "MSG_TX"),
			InvType::Block => write!(f, "MSG_BLOCK"),
			InvType::FilteredBlock => write!(f, "MSG_FILTERED_BLOCK"),
		}
	}
}

/// Human-readable form of a raw inventory type value, including ones no
/// known variant maps to.
pub fn inv_type_string(inv_type: u32) -> String {
	match InvType::from_u32(inv_type) {
		Some(t) => format!("{}", t),
		None => format!("Unknown InvType ({})", inv_type),
	}
}

/// An inventory vector: describes data, as specified by the type field,
/// that a peer wants, has, or does not have to another peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InvVect {
	/// Type of the data being referenced
	pub inv_type: InvType,
	/// Hash of the data
	pub hash: Hash,
}

impl InvVect {
	/// A new inventory vector for the provided type and hash.
	pub fn new(inv_type: InvType, hash: Hash) -> InvVect {
		InvVect { inv_type, hash }
	}
}

impl Writeable for InvVect {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		writer.write_u32(self.inv_type as u32)?;
		self.hash.write(writer)
	}
}

impl Readable for InvVect {
	fn read(reader: &mut dyn Reader) -> Result<InvVect, ser::Error> {
		let inv_type =
			InvType::from_u32(reader.read_u32()?).ok_or(ser::Error::CorruptedData)?;
		let hash = Hash::read(reader)?;
		Ok(InvVect { inv_type, hash })
	}
}

/// The inv message: a count-prefixed list of inventory vectors. Used to
/// advertise availability unsolicited or in reply to getblocks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inv {
	/// The advertised inventory
	pub inventory: Vec<InvVect>,
}

impl Inv {
	/// An inv message with no entries yet.
	pub fn new() -> Inv {
		Inv { inventory: vec![] }
	}

	/// Appends an inventory vector, refusing to grow past
	/// `MAX_INV_PER_MSG` entries.
	pub fn add_inv_vect(&mut self, iv: InvVect) -> Result<(), ser::Error> {
		if self.inventory.len() >= MAX_INV_PER_MSG {
			return Err(ser::Error::CountError);
		}
		self.inventory.push(iv);
		Ok(())
	}
}

impl Writeable for Inv {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		if self.inventory.len() > MAX_INV_PER_MSG {
			return Err(ser::Error::CountError);
		}
		writer.write_u64(self.inventory.len() as u64)?;
		for iv in &self.inventory {
			iv.write(writer)?;
		}
		Ok(())
	}
}

impl Readable for Inv {
	fn read(reader: &mut dyn Reader) -> Result<Inv, ser::Error> {
		let count = reader.read_u64()? as usize;
		if count > MAX_INV_PER_MSG {
			debug!("inv message advertising {} entries, max {}", count, MAX_INV_PER_MSG);
			return Err(ser::Error::CountError);
		}
		let mut inventory = Vec::with_capacity(count);
		for _ in 0..count {
			inventory.push(InvVect::read(reader)?);
		}
		Ok(Inv { inventory })
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::core::ser::{deserialize, ser_vec};

	fn sample_hash() -> Hash {
		let mut bytes = [0u8; HASH_SIZE];
		bytes[HASH_SIZE - 1] = 0x01;
		Hash(bytes)
	}

	#[test]
	fn inv_vect_roundtrip() {
		for inv_type in &[
			InvType::Error,
			InvType::Tx,
			InvType::Block,
			InvType::FilteredBlock,
		] {
			let iv = InvVect::new(*inv_type, sample_hash());
			let vec = ser_vec(&iv).unwrap();
			assert_eq!(vec.len(), INV_VECT_PAYLOAD_SIZE);
			let iv2: InvVect = deserialize(&mut &vec[..]).unwrap();
			assert_eq!(iv, iv2);
		}
	}

	#[test]
	fn inv_vect_wire_layout() {
		let iv = InvVect::new(InvType::Block, sample_hash());
		let vec = ser_vec(&iv).unwrap();
		assert_eq!(vec.len(), 36);
		// little-endian type word first
		assert_eq!(&vec[..4], &[0x02, 0x00, 0x00, 0x00]);
		// then the hash bytes as-is
		assert_eq!(vec[35], 0x01);
		assert!(vec[4..35].iter().all(|b| *b == 0));
	}

	#[test]
	fn unknown_inv_type_rejected() {
		let mut vec = ser_vec(&InvVect::new(InvType::Block, sample_hash())).unwrap();
		vec[0] = 0x07;
		let res: Result<InvVect, ser::Error> = deserialize(&mut &vec[..]);
		assert_eq!(res.unwrap_err(), ser::Error::CorruptedData);
	}

	#[test]
	fn unknown_inv_type_pretty_printed() {
		assert_eq!(inv_type_string(2), "MSG_BLOCK");
		assert_eq!(inv_type_string(7), "Unknown InvType (7)");
	}

	#[test]
	fn inv_message_roundtrip() {
		let mut inv = Inv::new();
		for i in 0..3 {
			let mut bytes = [0u8; HASH_SIZE];
			bytes[0] = i;
			inv.add_inv_vect(InvVect::new(InvType::Tx, Hash(bytes)))
				.unwrap();
		}
		let vec = ser_vec(&inv).unwrap();
		assert_eq!(vec.len(), 8 + 3 * INV_VECT_PAYLOAD_SIZE);
		let inv2: Inv = deserialize(&mut &vec[..]).unwrap();
		assert_eq!(inv, inv2);
	}

	#[test]
	fn oversized_inv_count_rejected() {
		// an inv message claiming more entries than allowed, truncated
		// after the count; the count check fires before any read
		let mut vec = vec![];
		vec.extend_from_slice(&(MAX_INV_PER_MSG as u64 + 1).to_le_bytes());
		let res: Result<Inv, ser::Error> = deserialize(&mut &vec[..]);
		assert_eq!(res.unwrap_err(), ser::Error::CountError);
	}

	#[test]
	fn add_inv_vect_enforces_the_cap() {
		let mut inv = Inv::new();
		for _ in 0..MAX_INV_PER_MSG {
			inv.add_inv_vect(InvVect::new(InvType::Block, sample_hash()))
				.unwrap();
		}
		assert_eq!(
			inv.add_inv_vect(InvVect::new(InvType::Block, sample_hash()))
				.unwrap_err(),
			ser::Error::CountError
		);
	}
}
