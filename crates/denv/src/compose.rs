// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Composition logic for combining multiple specs into one declaration.

use std::path::PathBuf;

use crate::environment::ResolvedEnvironment;
use crate::package::PackageRef;
use crate::platform::PlatformContext;
use crate::variable::DerivedSpec;
use crate::EnvSpec;

#[cfg(test)]
#[path = "./compose_test.rs"]
mod compose_test;

/// Composed declaration from multiple specs.
///
/// Composition only concatenates; a package or variable declared by two
/// specs is reported when the result is resolved.
#[derive(Debug, Clone, Default)]
pub struct ComposedEnvironment {
    /// Package declarations of every spec (in order).
    pub packages: Vec<PackageRef>,

    /// Variable specs of every spec (in order).
    pub variables: Vec<DerivedSpec>,

    /// Default features of every spec, first occurrence kept.
    pub default_features: Vec<String>,

    /// Source files that contributed to this composition.
    pub source_files: Vec<PathBuf>,
}

impl ComposedEnvironment {
    /// The context to resolve with: `context` itself if the caller selected
    /// any features, otherwise `context` with the declared defaults.
    pub fn platform_for(&self, context: &PlatformContext) -> PlatformContext {
        if !context.features.is_empty() || self.default_features.is_empty() {
            return context.clone();
        }
        tracing::debug!(features = ?self.default_features, "using default features");
        context
            .clone()
            .with_features(self.default_features.iter().cloned())
    }

    /// Resolve this declaration for `context`, applying default features.
    pub fn resolve(&self, context: &PlatformContext) -> crate::Result<ResolvedEnvironment> {
        let context = self.platform_for(context);
        crate::resolve(&self.packages, &context, &self.variables)
    }
}

/// Compose multiple specs into a single declaration.
///
/// Specs are processed in order, so earlier specs take search-path
/// precedence over later ones.
pub fn compose_specs(specs: &[EnvSpec]) -> ComposedEnvironment {
    let mut composed = ComposedEnvironment::default();

    for spec in specs {
        composed.packages.extend(spec.packages.iter().cloned());
        composed.variables.extend(spec.variables.iter().cloned());

        for feature in &spec.default_features {
            if !composed.default_features.contains(feature) {
                composed.default_features.push(feature.clone());
            }
        }

        if let Some(path) = &spec.source_path {
            composed.source_files.push(path.clone());
        }
    }

    composed
}
