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

//! The application version, formatted per the semantic versioning 2.0.0
//! spec (http://semver.org/).

/// The allowed characters for the pre-release portion of a semantic
/// version string.
const SEMANTIC_ALPHABET: &str =
	"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-";

/// The allowed characters for the build portion of a semantic version
/// string.
const SEMANTIC_BUILD_ALPHABET: &str =
	"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-.";

/// Major version component of the current release
pub const MAJOR: u32 = 0;
/// Minor version component of the current release
pub const MINOR: u32 = 7;
/// Patch version component of the current release
pub const PATCH: u32 = 8;

/// Pre-release marker appended to the version string with a hyphen. It
/// MUST only contain characters from the semantic alphabet, anything else
/// is stripped.
pub const PRE_RELEASE: &str = "";

/// Build metadata appended to the version string with a plus. It MUST only
/// contain characters from the semantic build alphabet, anything else is
/// stripped.
pub const BUILD: &str = "dev";

/// Returns the application version as a properly formed string per the
/// semantic versioning 2.0.0 spec.
pub fn version() -> String {
	format_version(MAJOR, MINOR, PATCH, PRE_RELEASE, BUILD)
}

/// Formats the provided version components into a semantic version string,
/// stripping invalid characters from the pre-release and build portions and
/// omitting either portion entirely when nothing valid remains.
pub fn format_version(major: u32, minor: u32, patch: u32, pre_release: &str, build: &str) -> String {
	// Start with the major, minor, and patch versions.
	let mut version = format!("{}.{}.{}", major, minor, patch);

	// Append pre-release version if there is one. The hyphen called for by
	// the semantic versioning spec is automatically appended and should not
	// be contained in the pre-release string.
	let pre_release = normalize_pre_rel_string(pre_release);
	if !pre_release.is_empty() {
		version = format!("{}-{}", version, pre_release);
	}

	// Append build metadata if there is any. The plus called for by the
	// semantic versioning spec is automatically appended and should not be
	// contained in the build metadata string.
	let build = normalize_build_string(build);
	if !build.is_empty() {
		version = format!("{}+{}", version, build);
	}

	version
}

/// Returns the passed string stripped of all characters which are not valid
/// according to the provided semantic versioning alphabet.
fn normalize_sem_string(s: &str, alphabet: &str) -> String {
	s.chars().filter(|c| alphabet.contains(*c)).collect()
}

/// Returns the passed string stripped of all characters which are not valid
/// according to the semantic versioning guidelines for pre-release strings.
fn normalize_pre_rel_string(s: &str) -> String {
	normalize_sem_string(s, SEMANTIC_ALPHABET)
}

/// Returns the passed string stripped of all characters which are not valid
/// according to the semantic versioning guidelines for build metadata
/// strings.
fn normalize_build_string(s: &str) -> String {
	normalize_sem_string(s, SEMANTIC_BUILD_ALPHABET)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn full_version() {
		assert_eq!(format_version(0, 7, 8, "rc1", "dev"), "0.7.8-rc1+dev");
		// dots are not in the pre-release alphabet
		assert_eq!(format_version(0, 7, 8, "rc.1", "dev"), "0.7.8-rc1+dev");
	}

	#[test]
	fn strips_invalid_characters() {
		// dots are not part of the pre-release alphabet but are valid in
		// build metadata
		assert_eq!(
			format_version(0, 7, 8, "bad space", "dev"),
			"0.7.8-badspace+dev"
		);
		assert_eq!(format_version(1, 2, 3, "", "1.2 α"), "1.2.3+1.2");
	}

	#[test]
	fn omits_empty_portions() {
		assert_eq!(format_version(0, 7, 8, "", ""), "0.7.8");
		assert_eq!(format_version(0, 7, 8, " ", "!!"), "0.7.8");
		assert_eq!(format_version(0, 7, 8, "rc-2", ""), "0.7.8-rc-2");
	}

	#[test]
	fn current_version_is_well_formed() {
		assert_eq!(version(), "0.7.8+dev");
	}
}
