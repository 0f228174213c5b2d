// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Package declarations and the ordered sets they resolve into.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::platform::{PlatformContext, PlatformPredicate};

#[cfg(test)]
#[path = "./package_test.rs"]
mod package_test;

/// Attributes that default to `<prefix>/<name>` when a prefix is known.
const PREFIX_DIRS: &[&str] = &["lib", "include", "bin", "share"];

/// A declared dependency.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PackageRef {
    /// Unique name of the package within one resolved set.
    pub name: String,

    #[serde(
        default,
        deserialize_with = "crate::scalar::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,

    /// Installation root used to derive directory attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Explicit attribute values, overriding anything derived from `prefix`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, String>,

    /// Restricts the declaration to matching platforms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<PlatformPredicate>,
}

impl PackageRef {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            version: None,
            prefix: None,
            outputs: BTreeMap::new(),
            when: None,
        }
    }

    pub fn with_version<S: Into<String>>(mut self, version: S) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_output<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }

    pub fn when(mut self, predicate: PlatformPredicate) -> Self {
        self.when = Some(predicate);
        self
    }

    /// True if this declaration applies to the given platform.
    pub fn applies_to(&self, context: &PlatformContext) -> bool {
        self.when.as_ref().is_none_or(|p| p.matches(context))
    }

    /// Look up a named attribute of this package.
    ///
    /// `outputs` entries win, then the declared fields, then the directories
    /// derived from `prefix`.
    pub fn attribute(&self, key: &str) -> Option<String> {
        if let Some(value) = self.outputs.get(key) {
            return Some(value.clone());
        }
        match key {
            "name" => Some(self.name.clone()),
            "version" => self.version.clone(),
            "prefix" => self.prefix.clone(),
            "pkgconfig" => self.prefix_join("lib/pkgconfig"),
            k if PREFIX_DIRS.contains(&k) => self.prefix_join(k),
            _ => None,
        }
    }

    fn prefix_join(&self, rel: &str) -> Option<String> {
        let prefix = self.prefix.as_deref()?.trim_end_matches('/');
        Some(format!("{prefix}/{rel}"))
    }
}

/// Packages selected for one platform, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PackageSet(Vec<PackageRef>);

impl PackageSet {
    pub(crate) fn from_vec(packages: Vec<PackageRef>) -> Self {
        Self(packages)
    }

    pub fn get(&self, name: &str) -> Option<&PackageRef> {
        self.0.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|p| p.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PackageRef> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[PackageRef] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a PackageSet {
    type Item = &'a PackageRef;
    type IntoIter = std::slice::Iter<'a, PackageRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
