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

//! Difficulty arithmetic: conversions between the 32-bit compact target
//! representation and arbitrary-precision integers, work computation and
//! the graph-weight scaling of the cycle proofs of work.

use num::{One, Signed, ToPrimitive, Zero};
use num_bigint::{BigInt, Sign};

use crate::core::hash::{Hash, HASH_SIZE};
use crate::pow::PowType;

lazy_static! {
	/// 2^256, numerator when converting a target into its work equivalent.
	pub static ref ONE_LSH_256: BigInt = BigInt::one() << 256;
}

/// Converts the compact representation that encodes a 256-bit target as a
/// kind of floating point into a big integer. The mantissa sits in the low
/// 23 bits, the sign in bit 23 and the base-256 exponent in the high byte.
pub fn compact_to_big(compact: u32) -> BigInt {
	let mantissa = compact & 0x007f_ffff;
	let is_negative = compact & 0x0080_0000 != 0;
	let exponent = compact >> 24;

	// Treat the exponent as the number of bytes of the full value and the
	// mantissa as its 3 most significant bytes.
	let bn = if exponent <= 3 {
		BigInt::from(mantissa >> (8 * (3 - exponent)))
	} else {
		BigInt::from(mantissa) << (8 * (exponent - 3) as usize)
	};

	if is_negative {
		-bn
	} else {
		bn
	}
}

/// Converts a big integer back into its compact representation. The compact
/// form only encodes the 3 most significant bytes, so the conversion is
/// lossy for larger numbers.
pub fn big_to_compact(n: &BigInt) -> u32 {
	if n.is_zero() {
		return 0;
	}

	let abs = n.abs();
	let mut exponent = (abs.bits() + 7) / 8;
	let mut mantissa = if exponent <= 3 {
		// small enough for the whole value to fit the mantissa
		abs.to_u32().unwrap_or(0) << (8 * (3 - exponent))
	} else {
		(abs >> (8 * (exponent - 3))).to_u32().unwrap_or(0)
	};

	// When the mantissa already has the sign bit set, shift it back one byte
	// and bump the exponent instead so the sign stays available.
	if mantissa & 0x0080_0000 != 0 {
		mantissa >>= 8;
		exponent += 1;
	}

	let mut compact = (exponent as u32) << 24 | mantissa;
	if n.sign() == Sign::Minus {
		compact |= 0x0080_0000;
	}
	compact
}

/// Interprets a block hash as a big integer. The hash bytes are in
/// little-endian order on the wire, so they are reversed first.
pub fn hash_to_big(hash: &Hash) -> BigInt {
	let mut buf = [0u8; HASH_SIZE];
	for (i, b) in hash.as_bytes().iter().rev().enumerate() {
		buf[i] = *b;
	}
	BigInt::from_bytes_be(Sign::Plus, &buf)
}

/// The amount of work a block with the given compact difficulty contributes
/// to its DAG. For the hash-based pow the target is a ceiling on the hash,
/// so the work is `2^256 / (target + 1)`. The cycle targets are already
/// denominated in graph-weight units and count as-is.
pub fn calc_work(bits: u32, pow_type: PowType) -> BigInt {
	let difficulty_num = compact_to_big(bits);
	if difficulty_num.sign() != Sign::Plus {
		return BigInt::zero();
	}
	match pow_type {
		PowType::Blake2bd => &*ONE_LSH_256 / (difficulty_num + 1u32),
		PowType::Cuckaroo | PowType::Cuckatoo => difficulty_num,
	}
}

/// Scaling factor of a cycle proof of work: the graph has `2^edge_bits`
/// edges and twice that many nodes, and the verification effort grows with
/// the edge bits on top of it. Roughly doubles for every extra edge bit.
pub fn graph_weight(edge_bits: u8) -> u64 {
	(2u64 << edge_bits) * (edge_bits as u64)
}

/// Effective difficulty achieved by a cycle proof: the graph weight scaled
/// by how far below the maximum the block hash landed.
pub fn calc_cuckoo_diff(graph_weight: u64, block_hash: &Hash) -> BigInt {
	let hash_big = hash_to_big(block_hash);
	let scaled = BigInt::from(graph_weight) * &*ONE_LSH_256;
	if hash_big.is_zero() {
		return scaled;
	}
	scaled / hash_big
}
