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

//! All the rules required for a cryptocurrency to have reach consensus across
//! the whole network are complex and hard to completely isolate. Some can be
//! simple parameters (like block reward), others complex algorithms (like
//! the DAG ordering rules). However, as long as they're simple enough,
//! consensus-relevant constants and short functions should be kept here.

/// Cycle proof size: the number of nonces a cuckoo-family proof of work
/// carries, i.e. the length of the cycle found in the graph.
pub const PROOF_NONCE_COUNT: usize = 42;

/// Number of ancestors sampled (following main parents) when computing the
/// past median time of a block. Must be odd: the median picks the element
/// at index `count / 2`, which is only exact for odd-sized windows, and the
/// even-sized path is reached near genesis alone.
pub const MEDIAN_TIME_BLOCKS: usize = 11;
