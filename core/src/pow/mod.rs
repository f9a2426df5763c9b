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

//! The proof of work needs to strike a balance between fast header
//! verification to avoid DoS attacks and difficulty for block verifiers to
//! build new blocks. Braid runs several algorithms side by side: the
//! hash-based blake2bd and the cycle-finding cuckaroo and cuckatoo, each
//! with its own difficulty floor and a height-indexed share of the blocks.
//! The variant a block uses is part of its header and drives verification,
//! work accounting and the per-algorithm difficulty retarget.

pub mod blake2bd;
pub mod cuckaroo;
pub mod cuckatoo;
pub mod cuckoo;
pub mod difficulty;
pub mod error;

pub use crate::pow::cuckoo::{CuckooProof, CycleVerifier};
pub use crate::pow::difficulty::{
	big_to_compact, calc_cuckoo_diff, calc_work, compact_to_big, graph_weight, hash_to_big,
};
pub use crate::pow::error::{Error, ErrorKind};

use std::fmt;

use num_bigint::{BigInt, Sign};

use crate::consensus::PROOF_NONCE_COUNT;
use crate::core::hash::Hash;
use crate::params::PowConfig;
use crate::ser::{self, Readable, Reader, Writeable, Writer};

/// Types of proof of work a block can carry. The byte values are part of
/// the wire and storage formats and must remain stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowType {
	/// Classical hash-based proof of work
	Blake2bd = 0,
	/// ASIC-resistant cycle-finding proof of work
	Cuckaroo = 1,
	/// ASIC-friendly cycle-finding proof of work over larger graphs
	Cuckatoo = 2,
}

impl PowType {
	fn from_u8(t: u8) -> Option<PowType> {
		match t {
			0 => Some(PowType::Blake2bd),
			1 => Some(PowType::Cuckaroo),
			2 => Some(PowType::Cuckatoo),
			_ => None,
		}
	}
}

impl fmt::Display for PowType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PowType::Blake2bd => write!(f, "blake2bd"),
			PowType::Cuckaroo => write!(f, "cuckaroo"),
			PowType::Cuckatoo => write!(f, "cuckatoo"),
		}
	}
}

/// The proof of work of a block, a tagged variant over the supported
/// algorithms. Set at construction from the header and immutable from then
/// on; dispatch is per block.
#[derive(Clone, Debug, PartialEq)]
pub enum Pow {
	/// Hash-based proof of work, nothing beyond the nonce to carry
	Blake2bd {
		/// Nonce increment used to mine this block.
		nonce: u64,
	},
	/// Cuckaroo cycle and its parameters
	Cuckaroo(CuckooProof),
	/// Cuckatoo cycle and its parameters
	Cuckatoo(CuckooProof),
}

impl Default for Pow {
	fn default() -> Pow {
		Pow::Blake2bd { nonce: 0 }
	}
}

impl Pow {
	/// A hash-based proof of work with the given nonce.
	pub fn blake2bd(nonce: u64) -> Pow {
		Pow::Blake2bd { nonce }
	}

	/// A cuckaroo proof of work.
	pub fn cuckaroo(nonce: u64, edge_bits: u8, circle_nonces: [u32; PROOF_NONCE_COUNT]) -> Pow {
		Pow::Cuckaroo(CuckooProof {
			nonce,
			edge_bits,
			circle_nonces,
		})
	}

	/// A cuckatoo proof of work.
	pub fn cuckatoo(nonce: u64, edge_bits: u8, circle_nonces: [u32; PROOF_NONCE_COUNT]) -> Pow {
		Pow::Cuckatoo(CuckooProof {
			nonce,
			edge_bits,
			circle_nonces,
		})
	}

	/// Which algorithm this proof of work uses.
	pub fn pow_type(&self) -> PowType {
		match self {
			Pow::Blake2bd { .. } => PowType::Blake2bd,
			Pow::Cuckaroo(_) => PowType::Cuckaroo,
			Pow::Cuckatoo(_) => PowType::Cuckatoo,
		}
	}

	/// The nonce the miner iterated on.
	pub fn nonce(&self) -> u64 {
		match self {
			Pow::Blake2bd { nonce } => *nonce,
			Pow::Cuckaroo(proof) | Pow::Cuckatoo(proof) => proof.nonce,
		}
	}

	/// The number of bits sizing the cycle graph, 0 for the hash-based
	/// variant.
	pub fn edge_bits(&self) -> u8 {
		match self {
			Pow::Blake2bd { .. } => 0,
			Pow::Cuckaroo(proof) | Pow::Cuckatoo(proof) => proof.edge_bits,
		}
	}

	/// The edge indices of the cycle, when there is one.
	pub fn circle_nonces(&self) -> Option<&[u32; PROOF_NONCE_COUNT]> {
		match self {
			Pow::Blake2bd { .. } => None,
			Pow::Cuckaroo(proof) | Pow::Cuckatoo(proof) => Some(&proof.circle_nonces),
		}
	}

	/// The siphash seed derived from the proof-of-work input bytes of the
	/// header.
	pub fn sip_hash(&self, header_data: &[u8]) -> Hash {
		cuckoo::sip_hash(header_data)
	}

	/// Verifies this proof of work for the given header bytes and block
	/// hash against the claimed compact target. Cycle proofs are checked
	/// through the provided external verifier.
	pub fn verify(
		&self,
		header_data: &[u8],
		block_hash: &Hash,
		target_diff_bits: u32,
		config: &PowConfig,
		verifier: &dyn CycleVerifier,
	) -> Result<(), Error> {
		match self {
			Pow::Blake2bd { .. } => blake2bd::verify(header_data, target_diff_bits, config),
			Pow::Cuckaroo(proof) => cuckaroo::verify(
				proof,
				header_data,
				block_hash,
				target_diff_bits,
				config,
				verifier,
			),
			Pow::Cuckatoo(proof) => cuckatoo::verify(
				proof,
				header_data,
				block_hash,
				target_diff_bits,
				config,
				verifier,
			),
		}
	}

	/// The share of blocks this algorithm is expected to produce at the
	/// given main height, left-shifted 32 bits for fixed-point precision in
	/// the retarget arithmetic.
	pub fn pow_percent(&self, config: &PowConfig, main_height: u64) -> BigInt {
		let percent = config.get_percent_by_height(main_height);
		let target = match self {
			Pow::Blake2bd { .. } => percent.blake2bd_percent,
			Pow::Cuckaroo(_) => percent.cuckaroo_percent,
			Pow::Cuckatoo(_) => percent.cuckatoo_percent,
		};
		BigInt::from(target) << 32
	}

	/// Whether this algorithm is allowed to produce blocks at the given
	/// main height.
	pub fn check_available(&self, config: &PowConfig, main_height: u64) -> bool {
		let percent = config.get_percent_by_height(main_height);
		match self {
			Pow::Blake2bd { .. } => percent.blake2bd_percent > 0,
			Pow::Cuckaroo(_) => percent.cuckaroo_percent > 0,
			Pow::Cuckatoo(_) => percent.cuckatoo_percent > 0,
		}
	}

	/// Projects the next difficulty for this algorithm. The base projection
	/// scales the old difficulty by the weighted average block spacing, and
	/// is then corrected towards the algorithm's target share of blocks:
	/// producing more than its share makes its blocks harder, less makes
	/// them easier.
	pub fn get_next_diff_big(
		&self,
		weighted_sum_div: &BigInt,
		old_diff_big: &BigInt,
		current_pow_percent: &BigInt,
		config: &PowConfig,
		main_height: u64,
	) -> BigInt {
		let next_diff_big = (old_diff_big.clone() << 32) / weighted_sum_div;
		let target_percent = self.pow_percent(config, main_height);
		if target_percent.sign() != Sign::Plus {
			return next_diff_big;
		}
		let current_percent = current_pow_percent.clone() * 100u32;
		if current_percent > target_percent {
			next_diff_big * target_percent / current_percent
		} else {
			next_diff_big * current_percent / target_percent
		}
	}

	/// Clamps a reduced difficulty to the algorithm's network floor. A zero
	/// input yields the floor itself. For the hash-based variant the big
	/// value is a target, so the clamp caps it at the pow limit instead.
	pub fn get_safe_diff(&self, config: &PowConfig, cur_reduce_diff: u64) -> BigInt {
		match self {
			Pow::Blake2bd { .. } => {
				let limit_big = config.blake2bd_pow_limit.clone();
				if cur_reduce_diff == 0 {
					return limit_big;
				}
				let new_target = BigInt::from(cur_reduce_diff);
				if new_target > limit_big {
					limit_big
				} else {
					new_target
				}
			}
			Pow::Cuckaroo(_) => safe_cycle_diff(config.cuckaroo_min_difficulty, cur_reduce_diff),
			Pow::Cuckatoo(_) => safe_cycle_diff(config.cuckatoo_min_difficulty, cur_reduce_diff),
		}
	}
}

fn safe_cycle_diff(min_diff_bits: u32, cur_reduce_diff: u64) -> BigInt {
	let min_diff_big = compact_to_big(min_diff_bits);
	if cur_reduce_diff == 0 {
		return min_diff_big;
	}
	let new_target = BigInt::from(cur_reduce_diff);
	// Limit new value to the floor of the algorithm.
	if new_target < min_diff_big {
		min_diff_big
	} else {
		new_target
	}
}

impl Writeable for Pow {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		writer.write_u8(self.pow_type() as u8)?;
		match self {
			Pow::Blake2bd { nonce } => writer.write_u64(*nonce),
			Pow::Cuckaroo(proof) | Pow::Cuckatoo(proof) => proof.write(writer),
		}
	}
}

impl Readable for Pow {
	fn read(reader: &mut dyn Reader) -> Result<Pow, ser::Error> {
		let t = reader.read_u8()?;
		match PowType::from_u8(t) {
			Some(PowType::Blake2bd) => Ok(Pow::Blake2bd {
				nonce: reader.read_u64()?,
			}),
			Some(PowType::Cuckaroo) => Ok(Pow::Cuckaroo(CuckooProof::read(reader)?)),
			Some(PowType::Cuckatoo) => Ok(Pow::Cuckatoo(CuckooProof::read(reader)?)),
			None => Err(ser::Error::CorruptedData),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::params::TESTNET_PARAMS;
	use num::{One, Zero};

	fn cuckatoo29() -> Pow {
		Pow::cuckatoo(0, 29, [0; PROOF_NONCE_COUNT])
	}

	#[test]
	fn pow_ser_roundtrip() {
		for pow in &[
			Pow::blake2bd(42),
			Pow::cuckaroo(1, 24, [7; PROOF_NONCE_COUNT]),
			cuckatoo29(),
		] {
			let vec = ser::ser_vec(pow).unwrap();
			let pow2: Pow = ser::deserialize(&mut &vec[..]).unwrap();
			assert_eq!(*pow, pow2);
		}
	}

	#[test]
	fn unknown_pow_type_rejected() {
		let vec = vec![9u8; 16];
		let res: Result<Pow, ser::Error> = ser::deserialize(&mut &vec[..]);
		assert_eq!(res.unwrap_err(), ser::Error::CorruptedData);
	}

	#[test]
	fn percent_is_shifted() {
		let config = &TESTNET_PARAMS.pow_config;
		assert_eq!(
			cuckatoo29().pow_percent(config, 0),
			BigInt::from(20u32) << 32
		);
		assert_eq!(
			Pow::blake2bd(0).pow_percent(config, 0),
			BigInt::from(10u32) << 32
		);
	}

	#[test]
	fn availability_follows_schedule() {
		let config = &TESTNET_PARAMS.pow_config;
		assert!(cuckatoo29().check_available(config, 0));
		assert!(Pow::blake2bd(0).check_available(config, 1_000_000));
	}

	#[test]
	fn next_diff_under_target_share_gets_easier() {
		let config = &TESTNET_PARAMS.pow_config;
		let weighted_sum_div = BigInt::one() << 32;
		let old_diff = BigInt::from(1000u32);
		// producing 10% of blocks against a 20% target
		let current_percent = BigInt::from(10u32);
		let next = cuckatoo29().get_next_diff_big(
			&weighted_sum_div,
			&old_diff,
			&current_percent,
			config,
			0,
		);
		// base is (1000 << 32) / 2^32 = 1000, then scaled down by
		// 1000 / (20 << 32)
		assert!(next < old_diff);
		assert_eq!(
			next,
			(BigInt::from(1000u32) * BigInt::from(1000u32)) / (BigInt::from(20u32) << 32)
		);
	}

	#[test]
	fn next_diff_over_target_share_gets_harder() {
		let config = &TESTNET_PARAMS.pow_config;
		let weighted_sum_div = BigInt::one() << 32;
		let old_diff = BigInt::from(1000u32);
		// past its 20% target; the shifted current percent dwarfs it
		let current_percent = BigInt::from(90u32) << 32;
		let next = cuckatoo29().get_next_diff_big(
			&weighted_sum_div,
			&old_diff,
			&current_percent,
			config,
			0,
		);
		let expected = (BigInt::from(1000u32) * (BigInt::from(20u32) << 32))
			/ ((BigInt::from(90u32) << 32) * 100u32);
		assert_eq!(next, expected);
	}

	#[test]
	fn safe_diff_clamps_to_floor() {
		let config = &TESTNET_PARAMS.pow_config;
		let min = compact_to_big(config.cuckatoo_min_difficulty);
		assert_eq!(cuckatoo29().get_safe_diff(config, 0), min);
		assert_eq!(cuckatoo29().get_safe_diff(config, 1), min);
		assert_eq!(
			cuckatoo29().get_safe_diff(config, 1_000_000_000),
			BigInt::from(1_000_000_000u64)
		);
	}

	#[test]
	fn safe_diff_caps_hash_target_at_limit() {
		let config = &TESTNET_PARAMS.pow_config;
		assert_eq!(
			Pow::blake2bd(0).get_safe_diff(config, 0),
			config.blake2bd_pow_limit
		);
		assert_eq!(
			Pow::blake2bd(0).get_safe_diff(config, 1856),
			BigInt::from(1856u32)
		);
	}

	#[test]
	fn zero_percent_leaves_base_projection() {
		let mut config = TESTNET_PARAMS.pow_config.clone();
		config.percent[0].cuckatoo_percent = 0;
		let next = cuckatoo29().get_next_diff_big(
			&(BigInt::one() << 32),
			&BigInt::from(1000u32),
			&BigInt::zero(),
			&config,
			0,
		);
		assert_eq!(next, BigInt::from(1000u32));
	}
}
