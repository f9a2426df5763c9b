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

//! Data and verification steps common to the cuckoo family of proofs of
//! work. A proof is a cycle of `PROOF_NONCE_COUNT` edges in a bipartite
//! graph seeded by a siphash key derived from the block header. The cycle
//! finding itself lives outside this crate; the [`CycleVerifier`] trait is
//! the seam it plugs into.

use crate::consensus::PROOF_NONCE_COUNT;
use crate::core::hash::{hash_bytes, Hash, HASH_SIZE};
use crate::pow::difficulty::{calc_cuckoo_diff, compact_to_big, graph_weight};
use crate::pow::error::{Error, ErrorKind};
use crate::ser::{self, Readable, Reader, Writeable, Writer};

/// Contract of the external cycle verifier. Implementations check that the
/// provided nonces form a valid cycle of the expected length in the graph
/// generated from the siphash key for the given number of edge bits.
pub trait CycleVerifier: Send + Sync {
	/// Verify a cuckaroo cycle.
	fn verify_cuckaroo(
		&self,
		sip_key: &[u8; HASH_SIZE],
		circle_nonces: &[u32],
		edge_bits: u8,
	) -> Result<(), Error>;

	/// Verify a cuckatoo cycle.
	fn verify_cuckatoo(
		&self,
		sip_key: &[u8; HASH_SIZE],
		circle_nonces: &[u32],
		edge_bits: u8,
	) -> Result<(), Error>;
}

/// The proof carried by a cuckoo-family block: the nonce the miner iterated
/// on, the size of the graph and the edge indices of the cycle found in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CuckooProof {
	/// Nonce increment used to mine this block.
	pub nonce: u64,
	/// Power of 2 used for the size of the cuckoo graph
	pub edge_bits: u8,
	/// The edge indices of the cycle
	pub circle_nonces: [u32; PROOF_NONCE_COUNT],
}

impl Default for CuckooProof {
	fn default() -> CuckooProof {
		CuckooProof {
			nonce: 0,
			edge_bits: 0,
			circle_nonces: [0; PROOF_NONCE_COUNT],
		}
	}
}

impl Writeable for CuckooProof {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), ser::Error> {
		ser_multiwrite!(writer, [write_u64, self.nonce], [write_u8, self.edge_bits]);
		for n in self.circle_nonces.iter() {
			writer.write_u32(*n)?;
		}
		Ok(())
	}
}

impl Readable for CuckooProof {
	fn read(reader: &mut dyn Reader) -> Result<CuckooProof, ser::Error> {
		let (nonce, edge_bits) = ser_multiread!(reader, read_u64, read_u8);
		let mut circle_nonces = [0u32; PROOF_NONCE_COUNT];
		for n in circle_nonces.iter_mut() {
			*n = reader.read_u32()?;
		}
		Ok(CuckooProof {
			nonce,
			edge_bits,
			circle_nonces,
		})
	}
}

/// The siphash seed of the cycle graph, derived from the header bytes that
/// feed the proof of work.
pub fn sip_hash(header_data: &[u8]) -> Hash {
	hash_bytes(header_data)
}

/// Verification steps shared by the cuckoo variants. The caller provides
/// the edge-bits bounds, the compact min-difficulty floor of its variant
/// and the verifier entry point for its cycle flavor.
pub(crate) fn verify_cycle<F>(
	proof: &CuckooProof,
	header_data: &[u8],
	block_hash: &Hash,
	target_diff_bits: u32,
	min_diff_bits: u32,
	min_edge_bits: u8,
	max_edge_bits: u8,
	verify: F,
) -> Result<(), Error>
where
	F: FnOnce(&[u8; HASH_SIZE], &[u32], u8) -> Result<(), Error>,
{
	let target_diff = compact_to_big(target_diff_bits);
	let edge_bits = proof.edge_bits;
	if edge_bits < min_edge_bits || edge_bits > max_edge_bits {
		return Err(ErrorKind::EdgeBitsOutOfRange {
			edge_bits,
			min: min_edge_bits,
			max: max_edge_bits,
		}
		.into());
	}

	let sip_key = sip_hash(header_data);
	verify(&sip_key.0, &proof.circle_nonces, edge_bits).map_err(|e| {
		debug!("cycle verification failed: {}", e);
		Error::from(ErrorKind::CycleInvalid(format!("{}", e)))
	})?;

	// The claimed target must itself clear the network floor.
	let min_diff = compact_to_big(min_diff_bits);
	if target_diff < min_diff {
		return Err(
			ErrorKind::BelowMinDifficulty(target_diff.to_string(), min_diff.to_string()).into(),
		);
	}

	if calc_cuckoo_diff(graph_weight(edge_bits), block_hash) < target_diff {
		return Err(ErrorKind::TooEasy.into());
	}
	Ok(())
}
