// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Lock file structures and helpers for denv.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ComposedEnvironment;
use crate::platform::PlatformContext;

#[cfg(test)]
#[path = "./lock_test.rs"]
mod lock_test;

/// Lock file API version.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub enum LockApiVersion {
    #[serde(rename = "denv/v0/lock")]
    V0,
}

/// Lock file pinning the sources and the environment they resolved to.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LockFile {
    pub api: LockApiVersion,
    pub generated: GenerationMetadata,
    pub sources: Vec<SourceFile>,
    pub platform: PlatformContext,
    /// Digest of the resolved `name=value` lines.
    pub digest: String,
    pub packages: Vec<String>,
    pub variables: IndexMap<String, String>,
}

/// Metadata about when and where the lock was generated.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GenerationMetadata {
    pub timestamp: DateTime<Utc>,
    pub denv_version: String,
    pub hostname: String,
}

/// Source spec file tracked by the lock.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub sha256: String,
}

impl LockFile {
    /// Load a lock file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| crate::Error::ReadFailed {
            path: path.to_path_buf(),
            error: e,
        })?;
        serde_yaml::from_str(&yaml).map_err(|e| crate::Error::InvalidYaml {
            error: e,
            yaml_content: yaml,
        })
    }

    /// Serialize and write this lock file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let yaml = serde_yaml::to_string(self).map_err(|e| crate::Error::InvalidYaml {
            error: e,
            yaml_content: String::new(),
        })?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

fn hash_file(path: &Path) -> crate::Result<String> {
    let content = std::fs::read(path).map_err(|e| crate::Error::ReadFailed {
        path: path.to_path_buf(),
        error: e,
    })?;
    Ok(format!("{:x}", Sha256::digest(&content)))
}

/// Generate lock file from composed environment.
pub fn generate_lock(
    composed: &ComposedEnvironment,
    context: &PlatformContext,
) -> crate::Result<LockFile> {
    let platform = composed.platform_for(context);
    let env = crate::resolve(&composed.packages, &platform, &composed.variables)?;

    let sources = composed
        .source_files
        .iter()
        .map(|path| {
            Ok(SourceFile {
                path: path.clone(),
                sha256: hash_file(path)?,
            })
        })
        .collect::<crate::Result<Vec<_>>>()?;

    Ok(LockFile {
        api: LockApiVersion::V0,
        generated: GenerationMetadata {
            timestamp: Utc::now(),
            denv_version: env!("CARGO_PKG_VERSION").to_string(),
            hostname: hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "unknown".to_string()),
        },
        sources,
        platform,
        digest: env.digest(),
        packages: env.packages().names().map(String::from).collect(),
        variables: env.pairs().into_iter().collect(),
    })
}

/// Verify lock file matches current environment.
pub fn verify_lock(
    lock: &LockFile,
    composed: &ComposedEnvironment,
    context: &PlatformContext,
) -> crate::Result<Vec<LockChange>> {
    let mut changes = Vec::new();

    for (i, source) in lock.sources.iter().enumerate() {
        let Some(actual_path) = composed.source_files.get(i) else {
            changes.push(LockChange {
                kind: LockChangeKind::SourceFileRemoved,
                reference: source.path.display().to_string(),
                expected: Some(source.sha256.clone()),
                actual: None,
            });
            continue;
        };

        let actual_hash = hash_file(actual_path)?;
        if actual_path != &source.path || actual_hash != source.sha256 {
            changes.push(LockChange {
                kind: LockChangeKind::SourceFileChanged,
                reference: source.path.display().to_string(),
                expected: Some(source.sha256.clone()),
                actual: Some(actual_hash),
            });
        }
    }

    for extra in composed.source_files.iter().skip(lock.sources.len()) {
        changes.push(LockChange {
            kind: LockChangeKind::SourceFileAdded,
            reference: extra.display().to_string(),
            expected: None,
            actual: None,
        });
    }

    let platform = composed.platform_for(context);
    if platform != lock.platform {
        changes.push(LockChange {
            kind: LockChangeKind::PlatformChanged,
            reference: "platform".to_string(),
            expected: Some(lock.platform.to_string()),
            actual: Some(platform.to_string()),
        });
    }

    let env = crate::resolve(&composed.packages, &platform, &composed.variables)?;
    if env.digest() == lock.digest {
        return Ok(changes);
    }

    for (name, locked) in &lock.variables {
        match env.get(name) {
            None => changes.push(LockChange {
                kind: LockChangeKind::VariableRemoved,
                reference: name.clone(),
                expected: Some(locked.clone()),
                actual: None,
            }),
            Some(actual) if actual != locked => changes.push(LockChange {
                kind: LockChangeKind::VariableChanged,
                reference: name.clone(),
                expected: Some(locked.clone()),
                actual: Some(actual.to_string()),
            }),
            Some(_) => {}
        }
    }
    for (name, var) in env.iter() {
        if !lock.variables.contains_key(name) {
            changes.push(LockChange {
                kind: LockChangeKind::VariableAdded,
                reference: name.to_string(),
                expected: None,
                actual: Some(var.value.clone()),
            });
        }
    }

    Ok(changes)
}

/// A single detected change between lock and current environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockChange {
    pub kind: LockChangeKind,
    pub reference: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

/// Types of lock mismatches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockChangeKind {
    SourceFileChanged,
    SourceFileAdded,
    SourceFileRemoved,
    PlatformChanged,
    VariableChanged,
    VariableAdded,
    VariableRemoved,
}
