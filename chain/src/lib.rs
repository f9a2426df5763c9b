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

//! The in-memory block-DAG index: every known block lives here as a node
//! carrying its parent and child links, its cumulative work, its position
//! in the DAG order and a concurrently mutable validation status.

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![warn(missing_docs)]

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate failure_derive;
#[macro_use]
extern crate log;
#[macro_use]
extern crate braid_core as core;
use braid_util as util;

mod blocknode;
mod error;
mod index;
mod store;
mod view;

pub use crate::blocknode::{BlockNode, BlockStatus, MAX_BLOCK_ORDER};
pub use crate::error::{Error, ErrorKind};
pub use crate::index::BlockIndex;
pub use crate::store::IndexStore;
pub use crate::view::{ChainView, DagOracle};
