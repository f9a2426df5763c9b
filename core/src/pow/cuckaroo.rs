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

//! Cuckaroo, the ASIC-resistant variation of Cuckoo Cycle aimed at keeping
//! commodity hardware competitive. Tolerates smaller graphs than cuckatoo.

use crate::core::hash::Hash;
use crate::params::PowConfig;
use crate::pow::cuckoo::{verify_cycle, CuckooProof, CycleVerifier};
use crate::pow::error::Error;

/// Least amount of edge bits a cuckaroo graph can have.
pub const MIN_CUCKAROO_EDGE_BITS: u8 = 24;

/// Largest amount of edge bits a cuckaroo graph can have.
pub const MAX_CUCKAROO_EDGE_BITS: u8 = 32;

/// Verifies a cuckaroo proof against the claimed compact target.
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
		config.cuckaroo_min_difficulty,
		MIN_CUCKAROO_EDGE_BITS,
		MAX_CUCKAROO_EDGE_BITS,
		|sip_key, nonces, edge_bits| verifier.verify_cuckaroo(sip_key, nonces, edge_bits),
	)
}
