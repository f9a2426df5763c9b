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

//! Proof of work verification errors
use failure::{Backtrace, Context, Fail};
use std::fmt::{self, Display};

/// PoW verification error
#[derive(Debug)]
pub struct Error {
	inner: Context<ErrorKind>,
}

/// PoW verification error types
#[derive(Clone, Debug, Eq, Fail, PartialEq)]
pub enum ErrorKind {
	/// The edge bits of a cycle proof are outside the bounds of its variant
	#[fail(
		display = "edge bits {} out of the allowed range {}..={}",
		edge_bits, min, max
	)]
	EdgeBitsOutOfRange {
		/// edge bits carried by the proof
		edge_bits: u8,
		/// lower bound of the variant
		min: u8,
		/// upper bound of the variant
		max: u8,
	},
	/// The cycle verifier rejected the proof
	#[fail(display = "invalid cycle: {}", _0)]
	CycleInvalid(String),
	/// The claimed target difficulty is below the network floor
	#[fail(
		display = "block target difficulty of {} is less than min diff {}",
		_0, _1
	)]
	BelowMinDifficulty(String, String),
	/// The proof's effective difficulty is less than the claimed target
	#[fail(display = "difficulty is too easy")]
	TooEasy,
	/// Unrecognized proof of work type byte on the wire
	#[fail(display = "unknown pow type {}", _0)]
	UnknownPowType(u8),
}

impl Fail for Error {
	fn cause(&self) -> Option<&dyn Fail> {
		self.inner.cause()
	}

	fn backtrace(&self) -> Option<&Backtrace> {
		self.inner.backtrace()
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.inner, f)
	}
}

impl Error {
	/// Return errorkind
	pub fn kind(&self) -> ErrorKind {
		self.inner.get_context().clone()
	}
}

impl From<ErrorKind> for Error {
	fn from(kind: ErrorKind) -> Error {
		Error {
			inner: Context::new(kind),
		}
	}
}

impl From<Context<ErrorKind>> for Error {
	fn from(inner: Context<ErrorKind>) -> Error {
		Error { inner }
	}
}
