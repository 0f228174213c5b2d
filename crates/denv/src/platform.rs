// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Platform context and the predicates that gate package declarations.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

#[cfg(test)]
#[path = "./platform_test.rs"]
mod platform_test;

/// Operating systems that a declaration can target.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Os {
    #[strum(serialize = "linux")]
    Linux,
    #[serde(rename = "macos", alias = "darwin")]
    #[strum(to_string = "macos", serialize = "darwin")]
    MacOs,
    #[strum(serialize = "windows")]
    Windows,
}

impl Os {
    /// The host operating system, if it is one denv knows about.
    pub fn current() -> Option<Self> {
        match std::env::consts::OS {
            "linux" => Some(Self::Linux),
            "macos" => Some(Self::MacOs),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }
}

/// CPU architectures that a declaration can target.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Arch {
    #[serde(rename = "x86_64")]
    #[strum(serialize = "x86_64")]
    X86_64,
    #[serde(rename = "aarch64", alias = "arm64")]
    #[strum(to_string = "aarch64", serialize = "arm64")]
    Aarch64,
}

impl Arch {
    /// The host architecture, if it is one denv knows about.
    pub fn current() -> Option<Self> {
        match std::env::consts::ARCH {
            "x86_64" => Some(Self::X86_64),
            "aarch64" => Some(Self::Aarch64),
            _ => None,
        }
    }
}

/// Resolution-time facts about the target platform.
///
/// Features are kept sorted so that two contexts built from the same flags in
/// a different order compare and render identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PlatformContext {
    pub os: Os,
    pub arch: Arch,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub features: BTreeSet<String>,
}

impl PlatformContext {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self {
            os,
            arch,
            features: BTreeSet::new(),
        }
    }

    /// Describe the host this process is running on, with no features set.
    ///
    /// This is for front ends only; resolution itself never inspects the
    /// host.
    pub fn current() -> crate::Result<Self> {
        let os = Os::current()
            .ok_or_else(|| Error::UnsupportedPlatform(std::env::consts::OS.to_string()))?;
        let arch = Arch::current()
            .ok_or_else(|| Error::UnsupportedPlatform(std::env::consts::ARCH.to_string()))?;
        Ok(Self::new(os, arch))
    }

    pub fn with_feature<S: Into<String>>(mut self, feature: S) -> Self {
        self.features.insert(feature.into());
        self
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features.extend(features.into_iter().map(Into::into));
        self
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    /// The `<arch>-<os>` identifier, eg: `x86_64-linux`.
    pub fn triple(&self) -> String {
        format!("{}-{}", self.arch, self.os)
    }
}

impl fmt::Display for PlatformContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.triple())?;
        if !self.features.is_empty() {
            let features: Vec<&str> = self.features.iter().map(String::as_str).collect();
            write!(f, " [{}]", features.join(","))?;
        }
        Ok(())
    }
}

/// Condition under which a package declaration applies.
///
/// Every populated field must hold for the predicate to match:
/// `os` and `arch` are any-of lists, `features` must all be selected and
/// none of `without` may be. An empty predicate matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformPredicate {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub os: Vec<Os>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arch: Vec<Arch>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub without: Vec<String>,
}

impl PlatformPredicate {
    pub fn matches(&self, context: &PlatformContext) -> bool {
        (self.os.is_empty() || self.os.contains(&context.os))
            && (self.arch.is_empty() || self.arch.contains(&context.arch))
            && self.features.iter().all(|f| context.has_feature(f))
            && !self.without.iter().any(|f| context.has_feature(f))
    }
}
