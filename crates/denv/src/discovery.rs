// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Discovery algorithm for finding and loading .denv.yaml files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::spec::resolve_include_path;
use crate::{DENV_FILENAME, DENV_LOCAL_FILENAME, EnvSpec};

#[cfg(test)]
#[path = "./discovery_test.rs"]
mod discovery_test;

/// Options for discovery behavior.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Disable in-tree inheritance (from --no-inherit or DENV_NO_INHERIT).
    pub no_inherit: bool,

    /// Enable in-tree inheritance (from --inherit or DENV_INHERIT).
    pub force_inherit: bool,

    /// Additional includes from CLI (from --include flags).
    pub cli_includes: Vec<String>,

    /// Additional includes from environment (from DENV_INCLUDE).
    pub env_includes: Vec<String>,
}

/// Discover all applicable .denv.yaml files.
///
/// Returns specs in composition order: every spec is preceded by the specs
/// it includes, and parents precede children.
pub fn discover_specs<P: AsRef<Path>>(
    start_path: P,
    options: &DiscoveryOptions,
) -> crate::Result<Vec<EnvSpec>> {
    let mut loader = Loader::default();
    let mut specs = Vec::new();

    let cwd = resolve_start_path(Path::new("."));
    for include in options.cli_includes.iter().chain(&options.env_includes) {
        let spec = loader.load_include(include, Some(&cwd))?;
        loader.expand(spec, &mut specs)?;
    }

    let start = resolve_start_path(start_path.as_ref());
    let (start, start_spec_path) = if start.is_file() {
        let dir = start.parent().map(Path::to_path_buf).unwrap_or_default();
        (dir, start)
    } else {
        let spec_path = start.join(DENV_FILENAME);
        (start, spec_path)
    };
    for spec in discover_in_tree(&start, &start_spec_path, options)? {
        loader.expand(spec, &mut specs)?;
    }

    let local_path = start.join(DENV_LOCAL_FILENAME);
    if local_path.is_file() {
        tracing::debug!(path = %local_path.display(), "loading local override");
        let local = EnvSpec::load(&local_path)?;
        loader.expand(local, &mut specs)?;
    }

    Ok(specs)
}

/// Resolve starting path, preferring $PWD to preserve symlinks.
fn resolve_start_path(start_path: &Path) -> PathBuf {
    if start_path.is_absolute() {
        return start_path.to_owned();
    }
    match std::env::var("PWD").ok() {
        Some(pwd) => PathBuf::from(pwd).join(start_path),
        None => std::env::current_dir()
            .unwrap_or_default()
            .join(start_path),
    }
}

/// Discover specs in directory tree (walking up parents).
///
/// `start_spec_path` is usually `start/.denv.yaml`, or the file named
/// explicitly when discovery starts from a file.
fn discover_in_tree(
    start: &Path,
    start_spec_path: &Path,
    options: &DiscoveryOptions,
) -> crate::Result<Vec<EnvSpec>> {
    let mut specs = Vec::new();
    let mut current = start.to_path_buf();

    if start_spec_path.is_file() {
        let spec = EnvSpec::load(start_spec_path)?;
        let should_inherit = if options.force_inherit {
            true
        } else if options.no_inherit {
            false
        } else {
            spec.inherit
        };
        specs.push(spec);
        if !should_inherit {
            return Ok(specs);
        }
    } else if options.no_inherit {
        return Err(crate::Error::NotFoundAtPath(current));
    }

    while current.pop() {
        let spec_path = current.join(DENV_FILENAME);
        if !spec_path.is_file() {
            continue;
        }
        tracing::debug!(path = %spec_path.display(), "found parent spec");
        let spec = EnvSpec::load(&spec_path)?;
        let inherit = spec.inherit;
        specs.insert(0, spec);
        if !inherit {
            break;
        }
    }

    if specs.is_empty() {
        return Err(crate::Error::NotFoundInTree(start.to_path_buf()));
    }

    Ok(specs)
}

/// Loads include files, tracking every file seen in one discovery pass.
#[derive(Default)]
struct Loader {
    seen: HashSet<PathBuf>,
    /// Files whose includes are being expanded right now.
    active: Vec<PathBuf>,
}

impl Loader {
    fn load_include(&mut self, include: &str, base_dir: Option<&Path>) -> crate::Result<EnvSpec> {
        let path = resolve_include_path(include, base_dir)?;
        if self.active.contains(&path) {
            return Err(crate::Error::CircularInclude(path));
        }
        if !self.seen.insert(path.clone()) {
            return Err(crate::Error::DuplicateInclude(path));
        }
        EnvSpec::load(&path)
    }

    /// Push `spec` onto `out`, preceded by everything it includes.
    fn expand(&mut self, spec: EnvSpec, out: &mut Vec<EnvSpec>) -> crate::Result<()> {
        let canonical = spec
            .source_path
            .as_ref()
            .and_then(|p| dunce::canonicalize(p).ok());
        if let Some(path) = &canonical {
            self.seen.insert(path.clone());
            self.active.push(path.clone());
        }
        let base_dir = spec
            .source_path
            .as_ref()
            .and_then(|p| p.parent())
            .map(Path::to_path_buf);
        for include in &spec.includes {
            let included = self.load_include(include, base_dir.as_deref())?;
            self.expand(included, out)?;
        }
        if canonical.is_some() {
            self.active.pop();
        }
        out.push(spec);
        Ok(())
    }
}
