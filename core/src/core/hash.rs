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

//! Hash Function
//!
//! Primary hash function used in the protocol
//!

use std::fmt;

use crate::blake2::blake2b::Blake2b;

use crate::ser::{self, Readable, Reader, Writeable, Writer};
use crate::util;

/// The size of a hash in bytes.
pub const HASH_SIZE: usize = 32;

/// A hash consisting of all zeroes, often used as a sentinel. Not the hash
/// of anything.
pub const ZERO_HASH: Hash = Hash([0; HASH_SIZE]);

/// A hash to uniquely (or close enough) identify one of the main blockchain
/// constructs. Used pervasively for blocks and transactions.
#[derive(Copy, Clone, PartialEq, PartialOrd, Eq, Ord, Hash, Default)]
pub struct Hash(pub [u8; HASH_SIZE]);

impl fmt::Debug for Hash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let hash_hex = self.to_hex();
		const NUM_SHOW: usize = 12;
		write!(f, "{}", &hash_hex[..NUM_SHOW])
	}
}

impl fmt::Display for Hash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}

impl Hash {
	/// Builds a Hash from a byte vector. If the vector is too short, it will be
	/// completed by zeroes. If it's too long, it will be truncated.
	pub fn from_vec(v: &[u8]) -> Hash {
		let mut h = [0; HASH_SIZE];
		let copy_size = std::cmp::min(v.len(), HASH_SIZE);
		h[..copy_size].copy_from_slice(&v[..copy_size]);
		Hash(h)
	}

	/// Converts the hash to a byte vector
	pub fn to_vec(&self) -> Vec<u8> {
		self.0.to_vec()
	}

	/// The byte slice representation of the hash
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	/// Convert a hash to hex string format.
	pub fn to_hex(&self) -> String {
		util::to_hex(self.to_vec())
	}

	/// Convert hex string back to hash.
	pub fn from_hex(hex: &str) -> Result<Hash, ser::Error> {
		let bytes = util::from_hex(hex.to_string()).map_err(|_| ser::Error::CorruptedData)?;
		if bytes.len() != HASH_SIZE {
			return Err(ser::Error::CorruptedData);
		}
		Ok(Hash::from_vec(&bytes))
	}
}

impl Readable for Hash {
	fn read(reader: &mut dyn Reader) -> Result<Hash, ser::Error> {
		let v = reader.read_fixed_bytes(HASH_SIZE)?;
		let mut a = [0; HASH_SIZE];
		a.copy_from_slice(&v[..]);
		Ok(Hash(a))
	}
}

impl Writeable for Hash {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		writer.write_fixed_bytes(&self.0)
	}
}

/// Serializer that outputs a hash of the serialized object
pub struct HashWriter {
	state: Blake2b,
}

impl HashWriter {
	/// Consume the `HashWriter`, outputting its current hash into a 32-byte
	/// array
	pub fn finalize(self, output: &mut [u8]) {
		output.copy_from_slice(self.state.finalize().as_bytes());
	}

	/// Consume the `HashWriter`, outputting a `Hash` corresponding to its
	/// current state
	pub fn into_hash(self) -> Hash {
		let mut res = [0; HASH_SIZE];
		res.copy_from_slice(self.state.finalize().as_bytes());
		Hash(res)
	}
}

impl Default for HashWriter {
	fn default() -> HashWriter {
		HashWriter {
			state: Blake2b::new(HASH_SIZE),
		}
	}
}

impl Writer for HashWriter {
	fn write_u8(&mut self, n: u8) -> Result<(), ser::Error> {
		self.state.update(&[n]);
		Ok(())
	}
	fn write_u16(&mut self, n: u16) -> Result<(), ser::Error> {
		self.state.update(&n.to_le_bytes());
		Ok(())
	}
	fn write_u32(&mut self, n: u32) -> Result<(), ser::Error> {
		self.state.update(&n.to_le_bytes());
		Ok(())
	}
	fn write_u64(&mut self, n: u64) -> Result<(), ser::Error> {
		self.state.update(&n.to_le_bytes());
		Ok(())
	}
	fn write_i64(&mut self, n: i64) -> Result<(), ser::Error> {
		self.state.update(&n.to_le_bytes());
		Ok(())
	}
	fn write_fixed_bytes(&mut self, bytes: &[u8]) -> Result<(), ser::Error> {
		self.state.update(bytes);
		Ok(())
	}
}

/// A trait for types that have their hash (blake2b) taken from their byte
/// serialization.
pub trait Hashed {
	/// Obtain the hash of the object
	fn hash(&self) -> Hash;
}

impl<W: Writeable> Hashed for W {
	fn hash(&self) -> Hash {
		let mut hasher = HashWriter::default();
		Writeable::write(self, &mut hasher).unwrap();
		hasher.into_hash()
	}
}

/// Hash of a raw byte slice, bypassing the ser framework.
pub fn hash_bytes(data: &[u8]) -> Hash {
	let mut state = Blake2b::new(HASH_SIZE);
	state.update(data);
	let mut res = [0; HASH_SIZE];
	res.copy_from_slice(state.finalize().as_bytes());
	Hash(res)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn hash_hex_roundtrip() {
		let h = hash_bytes(b"braid");
		let h2 = Hash::from_hex(&h.to_hex()).unwrap();
		assert_eq!(h, h2);
	}

	#[test]
	fn zero_hash_is_not_a_hash() {
		assert_ne!(hash_bytes(&[]), ZERO_HASH);
	}

	#[test]
	fn ser_roundtrip() {
		let h = hash_bytes(b"braid");
		let vec = crate::ser::ser_vec(&h).unwrap();
		assert_eq!(vec.len(), HASH_SIZE);
		let h2: Hash = crate::ser::deserialize(&mut &vec[..]).unwrap();
		assert_eq!(h, h2);
	}
}
