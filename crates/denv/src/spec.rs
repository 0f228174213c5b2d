// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Spec file parsing and data types for .denv.yaml files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::package::PackageRef;
use crate::variable::DerivedSpec;

#[cfg(test)]
#[path = "./spec_test.rs"]
mod spec_test;

/// API version for spec files.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum ApiVersion {
    #[default]
    #[serde(rename = "denv/v0")]
    V0,
}

/// Helper for two-stage deserialization to determine API version first.
#[derive(Deserialize)]
struct ApiVersionMapping {
    #[serde(default)]
    api: ApiVersion,
}

/// Environment declaration from a .denv.yaml file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EnvSpec {
    /// API version identifier.
    pub api: ApiVersion,

    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// In-tree inheritance control.
    /// When false (default), stops walking up directory tree.
    /// When true, discovers .denv.yaml files in parent directories.
    #[serde(default)]
    pub inherit: bool,

    /// Other spec files composed before this one.
    /// Can use absolute paths, home-relative (~/) paths, or relative paths.
    /// Relative paths are resolved relative to this file's directory.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,

    /// Features assumed when the caller does not select any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_features: Vec<String>,

    /// Package declarations, in precedence order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<PackageRef>,

    /// Variables derived from the resolved packages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<DerivedSpec>,

    /// Path to the file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl EnvSpec {
    /// Parse spec from YAML string.
    pub fn from_yaml<S: Into<String>>(yaml: S) -> crate::Result<Self> {
        let yaml = yaml.into();
        let invalid = |error, yaml: &str| crate::Error::InvalidYaml {
            error,
            yaml_content: yaml.to_string(),
        };

        // Stage 1: Parse to get API version
        let value: serde_yaml::Value =
            serde_yaml::from_str(&yaml).map_err(|e| invalid(e, &yaml))?;
        let with_version: ApiVersionMapping =
            serde_yaml::from_value(value.clone()).map_err(|e| invalid(e, &yaml))?;

        // Stage 2: Deserialize based on version
        match with_version.api {
            ApiVersion::V0 => serde_yaml::from_value(value).map_err(|e| invalid(e, &yaml)),
        }
    }

    /// Load spec from file path.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| crate::Error::ReadFailed {
            path: path.to_path_buf(),
            error: e,
        })?;

        let mut spec = Self::from_yaml(yaml)?;
        spec.source_path = Some(path.to_path_buf());
        spec.validate()?;
        Ok(spec)
    }

    /// Check the declaration for problems visible without resolving it.
    ///
    /// Duplicate package names are not reported here since they may be
    /// guarded by exclusive platform predicates.
    pub fn validate(&self) -> crate::Result<()> {
        let origin = self
            .source_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<inline>".to_string());

        if let Some(pkg) = self.packages.iter().find(|p| p.name.trim().is_empty()) {
            return Err(crate::Error::ValidationFailed(format!(
                "{origin}: package with empty name (version {:?})",
                pkg.version
            )));
        }

        let mut names = HashSet::new();
        for var in &self.variables {
            if var.name().trim().is_empty() {
                return Err(crate::Error::ValidationFailed(format!(
                    "{origin}: variable with empty name"
                )));
            }
            if !names.insert(var.name()) {
                return Err(crate::Error::DuplicateVariable(var.name().to_string()));
            }
        }

        Ok(())
    }

    /// Resolve relative includes to absolute paths.
    pub fn resolve_includes(&self) -> crate::Result<Vec<PathBuf>> {
        let base_dir = self
            .source_path
            .as_ref()
            .and_then(|p| p.parent())
            .ok_or_else(|| {
                crate::Error::ValidationFailed(
                    "Cannot resolve includes without source_path".to_string(),
                )
            })?;

        self.includes
            .iter()
            .map(|include| resolve_include_path(include, Some(base_dir)))
            .collect()
    }
}

/// Resolve an include reference to an absolute canonical path.
///
/// Home-relative (`~/`) and absolute paths stand alone; anything else is
/// joined onto `base_dir`.
pub(crate) fn resolve_include_path(include: &str, base_dir: Option<&Path>) -> crate::Result<PathBuf> {
    let path = if include.starts_with('~') {
        let home = dirs::home_dir().ok_or_else(|| {
            crate::Error::ValidationFailed("Cannot resolve ~ without HOME".to_string())
        })?;
        let rel = include.strip_prefix("~/").unwrap_or(include);
        home.join(rel)
    } else if Path::new(include).is_absolute() {
        PathBuf::from(include)
    } else {
        let base = base_dir.ok_or_else(|| {
            crate::Error::ValidationFailed(format!(
                "Cannot resolve relative include '{include}' without base directory"
            ))
        })?;
        base.join(include)
    };

    dunce::canonicalize(&path).map_err(|e| crate::Error::IncludeNotFound {
        path: path.clone(),
        error: e,
    })
}
