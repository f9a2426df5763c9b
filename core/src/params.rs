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

//! Per-network immutable parameters: everything that distinguishes one
//! braid network from another, from the genesis block to the proof-of-work
//! floors, retarget windows and address-encoding magics.

use std::time::Duration;

use num::One;
use num_bigint::BigInt;

use crate::core::hash::Hash;
use crate::core::BlockHeader;
use crate::genesis;

/// The braid networks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
	/// Main production network
	Mainnet,
	/// Public test network
	Testnet,
	/// Local private network
	Privnet,
}

/// A DNS seed advertising network nodes, and whether it supports filtering
/// by service flags.
#[derive(Clone, Debug)]
pub struct DnsSeed {
	/// Hostname of the seed
	pub host: &'static str,
	/// Whether the seed supports filtering by service flags
	pub has_filtering: bool,
}

/// A known-good block hash the chain must pass through at a given height.
#[derive(Clone, Debug)]
pub struct Checkpoint {
	/// Height of the checkpointed block
	pub height: u64,
	/// Its hash
	pub hash: Hash,
}

/// One entry of the height-indexed proof-of-work share schedule: which
/// fraction of the blocks each algorithm is expected to produce from
/// `main_height` on.
#[derive(Clone, Debug)]
pub struct PercentItem {
	/// Height this entry takes effect at
	pub main_height: u64,
	/// Share of blake2bd blocks, as a percentage
	pub blake2bd_percent: i64,
	/// Share of cuckaroo blocks, as a percentage
	pub cuckaroo_percent: i64,
	/// Share of cuckatoo blocks, as a percentage
	pub cuckatoo_percent: i64,
}

/// Proof-of-work limits and schedule of a network.
#[derive(Clone, Debug)]
pub struct PowConfig {
	/// Highest target (easiest proof) a blake2bd block may claim
	pub blake2bd_pow_limit: BigInt,
	/// Compact form of `blake2bd_pow_limit`
	pub blake2bd_pow_limit_bits: u32,
	/// Compact difficulty floor of cuckaroo blocks
	pub cuckaroo_min_difficulty: u32,
	/// Compact difficulty floor of cuckatoo blocks
	pub cuckatoo_min_difficulty: u32,
	/// Share schedule, sorted by ascending `main_height`, never empty
	pub percent: Vec<PercentItem>,
}

impl PowConfig {
	/// The schedule entry in effect at the given height: the one with the
	/// greatest `main_height` not above it.
	pub fn get_percent_by_height(&self, height: u64) -> &PercentItem {
		self.percent
			.iter()
			.rev()
			.find(|p| p.main_height <= height)
			.unwrap_or(&self.percent[0])
	}
}

/// All the parameters defining one braid network.
#[derive(Clone, Debug)]
pub struct Params {
	/// Human readable name of the network
	pub name: &'static str,
	/// Which network this is
	pub net: Network,
	/// Default TCP port nodes listen on
	pub default_port: &'static str,
	/// DNS seeds for initial peer discovery
	pub dns_seeds: Vec<DnsSeed>,

	// Chain parameters
	/// The header of the first block of the chain
	pub genesis_block: BlockHeader,
	/// Hash of the genesis block
	pub genesis_hash: Hash,
	/// Proof-of-work limits and schedule
	pub pow_config: PowConfig,
	/// Whether the minimum difficulty can be reduced on a stalled network
	pub reduce_min_difficulty: bool,
	/// How long a block must be stalled for before the reduction applies
	pub min_diff_reduction_time: Duration,
	/// Whether block generation (mining) is supported on this network
	pub generate_supported: bool,
	/// Exponent used when weighting blocks in the retarget window
	pub work_diff_alpha: i64,
	/// Number of blocks in one difficulty window
	pub work_diff_window_size: i64,
	/// Number of windows considered by a retarget
	pub work_diff_windows: i64,
	/// Maximum serialized block sizes, by block version
	pub maximum_block_sizes: Vec<usize>,
	/// Maximum serialized size of a single transaction
	pub max_tx_size: usize,
	/// Targeted spacing between blocks
	pub target_time_per_block: Duration,
	/// Targeted duration of a full difficulty window
	pub target_timespan: Duration,
	/// Bound on how much a single retarget can move the difficulty
	pub retarget_adjustment_factor: i64,

	// Subsidy parameters
	/// Coinbase subsidy of the first reduction interval
	pub base_subsidy: i64,
	/// Numerator of the subsidy reduction ratio
	pub mul_subsidy: i64,
	/// Denominator of the subsidy reduction ratio
	pub div_subsidy: i64,
	/// Number of blocks between subsidy reductions
	pub subsidy_reduction_interval: i64,
	/// Share of the subsidy rewarding work, as a percentage
	pub work_reward_proportion: u16,
	/// Share of the subsidy rewarding stake, as a percentage
	pub stake_reward_proportion: u16,
	/// Share of the subsidy taxed, as a percentage
	pub block_tax_proportion: u16,

	/// Blocks a coinbase output must age before it can be spent
	pub coinbase_maturity: u16,
	/// Checkpoints ordered from oldest to newest
	pub checkpoints: Vec<Checkpoint>,

	// Address encoding magics
	/// Leading letter of human readable addresses
	pub network_address_prefix: &'static str,
	/// Magic of pay-to-pubkey addresses
	pub pub_key_addr_id: [u8; 2],
	/// Magic of pay-to-pubkey-hash addresses
	pub pub_key_hash_addr_id: [u8; 2],
	/// Magic of Edwards-curve pay-to-pubkey-hash addresses
	pub pkh_edwards_addr_id: [u8; 2],
	/// Magic of Schnorr pay-to-pubkey-hash addresses
	pub pkh_schnorr_addr_id: [u8; 2],
	/// Magic of pay-to-script-hash addresses
	pub script_hash_addr_id: [u8; 2],
	/// Magic of WIF private keys
	pub private_key_id: [u8; 2],
	/// Magic of BIP32 extended private keys
	pub hd_private_key_id: [u8; 4],
	/// Magic of BIP32 extended public keys
	pub hd_public_key_id: [u8; 4],
	/// BIP44 coin type used in HD derivation paths
	pub hd_coin_type: u32,
}

fn testnet_params() -> Params {
	let genesis_block = genesis::genesis_testnet();
	let genesis_hash = genesis_block.block_hash();
	Params {
		name: "testnet",
		net: Network::Testnet,
		default_port: "18130",
		dns_seeds: vec![
			DnsSeed {
				host: "testnet-seed.hlcwallet.info",
				has_filtering: true,
			},
			DnsSeed {
				host: "testnet-seed.qitmeer.xyz",
				has_filtering: true,
			},
			DnsSeed {
				host: "testnet-seed.qitmeer.top",
				has_filtering: true,
			},
		],

		// Chain parameters
		genesis_block,
		genesis_hash,
		pow_config: PowConfig {
			// the highest proof of work value a blake2bd block can have,
			// 2^221 - 1
			blake2bd_pow_limit: (BigInt::one() << 221) - 1u32,
			blake2bd_pow_limit_bits: 0x1c1f_ffff,
			cuckaroo_min_difficulty: 0x160_0000, // 96
			cuckatoo_min_difficulty: 0x207_4000, // 1856
			percent: vec![PercentItem {
				main_height: 0,
				blake2bd_percent: 10,
				cuckaroo_percent: 70,
				cuckatoo_percent: 20,
			}],
		},
		reduce_min_difficulty: false,
		min_diff_reduction_time: Duration::from_secs(0), // does not apply
		generate_supported: true,
		work_diff_alpha: 1,
		work_diff_window_size: 120, // difficulty check interval is about 120*30 = 1 hour
		work_diff_windows: 20,
		maximum_block_sizes: vec![1_310_720],
		max_tx_size: 1_000_000,
		target_time_per_block: Duration::from_secs(30),
		target_timespan: Duration::from_secs(30 * 120), // TimePerBlock * WindowSize
		retarget_adjustment_factor: 2,

		// Subsidy parameters
		base_subsidy: 13_000_000_000, // 130 coins
		mul_subsidy: 100,
		div_subsidy: 10_000_000_000_000,
		subsidy_reduction_interval: 1_538_462,
		work_reward_proportion: 10,
		stake_reward_proportion: 0,
		block_tax_proportion: 0,

		coinbase_maturity: 720, // 720 * 30s = 6 hours
		checkpoints: vec![],

		// Address encoding magics
		network_address_prefix: "T",
		pub_key_addr_id: [0x0f, 0x0f],      // starts with Tk
		pub_key_hash_addr_id: [0x0f, 0x12], // starts with Tm
		pkh_edwards_addr_id: [0x0f, 0x01],  // starts with Te
		pkh_schnorr_addr_id: [0x0f, 0x1e],  // starts with Tr
		script_hash_addr_id: [0x0e, 0xe2],  // starts with TS
		private_key_id: [0x0c, 0xe2],       // starts with Pt
		hd_private_key_id: [0x04, 0x35, 0x83, 0x97], // starts with tprv
		hd_public_key_id: [0x04, 0x35, 0x87, 0xd1], // starts with tpub
		hd_coin_type: 223,
	}
}

lazy_static! {
	/// Parameters of the public test network.
	pub static ref TESTNET_PARAMS: Params = testnet_params();
}
