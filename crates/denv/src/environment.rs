// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! The resolved, immutable environment handed to an applier.

use indexmap::IndexMap;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::package::PackageSet;
use crate::variable::MergeMode;

#[cfg(test)]
#[path = "./environment_test.rs"]
mod environment_test;

/// A single resolved variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVar {
    pub value: String,
    #[serde(skip_serializing_if = "MergeMode::is_replace")]
    pub merge: MergeMode,
    pub separator: String,
}

/// Output of resolution: ordered variable values plus the packages and
/// platform they were computed from.
///
/// Variables iterate in the order their specs were declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEnvironment {
    platform: String,
    packages: PackageSet,
    variables: IndexMap<String, ResolvedVar>,
}

impl ResolvedEnvironment {
    pub(crate) fn new(
        platform: String,
        packages: PackageSet,
        variables: IndexMap<String, ResolvedVar>,
    ) -> Self {
        Self {
            platform,
            packages,
            variables,
        }
    }

    /// Triple of the platform this environment was resolved for.
    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn packages(&self) -> &PackageSet {
        &self.packages
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(|v| v.value.as_str())
    }

    pub fn var(&self, name: &str) -> Option<&ResolvedVar> {
        self.variables.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedVar)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Name and value of every variable, in order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.variables
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Hex SHA-256 over the `name=value` lines in order.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (name, var) in &self.variables {
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(var.value.as_bytes());
            hasher.update(b"\n");
        }
        format!("{:x}", hasher.finalize())
    }
}
