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

//! Definition of the genesis block of the networks. Like all genesis
//! blocks, it has no parents and its fields are hardcoded rather than
//! mined.

use chrono::prelude::*;

use crate::consensus::PROOF_NONCE_COUNT;
use crate::core::hash::ZERO_HASH;
use crate::core::BlockHeader;
use crate::pow::Pow;

/// Genesis block definition of the test network.
pub fn genesis_testnet() -> BlockHeader {
	BlockHeader {
		version: 1,
		parent_root: ZERO_HASH,
		tx_root: ZERO_HASH,
		state_root: ZERO_HASH,
		difficulty: 0x1c1f_ffff,
		timestamp: Utc.ymd(2020, 6, 15).and_hms(12, 0, 0),
		pow: Pow::cuckaroo(0, 24, [0; PROOF_NONCE_COUNT]),
	}
}
