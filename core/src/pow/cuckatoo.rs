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

//! Cuckatoo, the ASIC-friendly member of the Cuckoo Cycle family. Requires
//! larger graphs than cuckaroo, hence the higher edge-bits floor.

use crate::core::hash::Hash;
use crate::params::PowConfig;
use crate::pow::cuckoo::{verify_cycle, CuckooProof, CycleVerifier};
use crate::pow::error::Error;

/// Least amount of edge bits a cuckatoo graph can have.
pub const MIN_CUCKATOO_EDGE_BITS: u8 = 29;

/// Largest amount of edge bits a cuckatoo graph can have.
pub const MAX_CUCKATOO_EDGE_BITS: u8 = 32;

/// Verifies a cuckatoo proof against the claimed compact target.
pub fn verify(
	proof: &CuckooProof,
	header_data: &[u8],
	block_hash: &Hash,
	target_diff_bits: u32,
	config: &PowConfig,
	verifier: &dyn CycleVerifier,
) -> Result<(), Error> {
	verify_cycle(
		proof,
		header_data,
		block_hash,
		target_diff_bits,
		config.cuckatoo_min_difficulty,
		MIN_CUCKATOO_EDGE_BITS,
		MAX_CUCKATOO_EDGE_BITS,
		|sip_key, nonces, edge_bits| verifier.verify_cuckatoo(sip_key, nonces, edge_bits),
	)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::core::hash::{Hash, HASH_SIZE};
	use crate::params::TESTNET_PARAMS;
	use crate::pow::error::ErrorKind;

	/// Accepts or rejects every cycle wholesale, standing in for the real
	/// cycle verifier.
	struct StubVerifier(bool);

	impl CycleVerifier for StubVerifier {
		fn verify_cuckaroo(
			&self,
			_sip_key: &[u8; HASH_SIZE],
			_nonces: &[u32],
			_edge_bits: u8,
		) -> Result<(), Error> {
			self.result()
		}

		fn verify_cuckatoo(
			&self,
			_sip_key: &[u8; HASH_SIZE],
			_nonces: &[u32],
			_edge_bits: u8,
		) -> Result<(), Error> {
			self.result()
		}
	}

	impl StubVerifier {
		fn result(&self) -> Result<(), Error> {
			if self.0 {
				Ok(())
			} else {
				Err(ErrorKind::CycleInvalid("no cycle".to_owned()).into())
			}
		}
	}

	fn proof(edge_bits: u8) -> CuckooProof {
		let mut proof = CuckooProof::default();
		proof.edge_bits = edge_bits;
		proof
	}

	// an all-zero block hash maps to the maximum effective difficulty, so
	// the too-easy check never trips in these tests
	fn best_hash() -> Hash {
		Hash([0; HASH_SIZE])
	}

	#[test]
	fn edge_bits_bounds() {
		let config = &TESTNET_PARAMS.pow_config;
		let ok = StubVerifier(true);
		let target = config.cuckatoo_min_difficulty;
		for edge_bits in &[28u8, 33] {
			let err = verify(
				&proof(*edge_bits),
				b"header",
				&best_hash(),
				target,
				config,
				&ok,
			)
			.unwrap_err();
			match err.kind() {
				ErrorKind::EdgeBitsOutOfRange { min, max, .. } => {
					assert_eq!(min, MIN_CUCKATOO_EDGE_BITS);
					assert_eq!(max, MAX_CUCKATOO_EDGE_BITS);
				}
				k => panic!("unexpected error kind {:?}", k),
			}
		}
		assert!(verify(&proof(29), b"header", &best_hash(), target, config, &ok).is_ok());
	}

	#[test]
	fn cycle_failure_propagates() {
		let config = &TESTNET_PARAMS.pow_config;
		let bad = StubVerifier(false);
		let err = verify(
			&proof(29),
			b"header",
			&best_hash(),
			config.cuckatoo_min_difficulty,
			config,
			&bad,
		)
		.unwrap_err();
		match err.kind() {
			ErrorKind::CycleInvalid(_) => (),
			k => panic!("unexpected error kind {:?}", k),
		}
	}

	#[test]
	fn target_below_network_floor() {
		let config = &TESTNET_PARAMS.pow_config;
		let ok = StubVerifier(true);
		// decodes strictly below the 0x2074000 cuckatoo floor
		let err = verify(&proof(29), b"header", &best_hash(), 0x0207_3fff, config, &ok)
			.unwrap_err();
		match err.kind() {
			ErrorKind::BelowMinDifficulty(..) => (),
			k => panic!("unexpected error kind {:?}", k),
		}
	}

	#[test]
	fn effective_difficulty_too_easy() {
		let config = &TESTNET_PARAMS.pow_config;
		let ok = StubVerifier(true);
		// the worst possible hash achieves just the graph weight
		// (29 * 2^30 ~ 3.1e10); a target beyond it must be rejected
		let worst = Hash([0xff; HASH_SIZE]);
		let err = verify(&proof(29), b"header", &worst, 0x0510_0000, config, &ok).unwrap_err();
		match err.kind() {
			ErrorKind::TooEasy => (),
			k => panic!("unexpected error kind {:?}", k),
		}
	}
}
