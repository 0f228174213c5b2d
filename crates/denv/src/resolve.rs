// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Resolution of declared packages and variables into an environment.
//!
//! Everything here is a pure function of its arguments: no filesystem,
//! process or host state is consulted, so the same inputs always produce
//! the same [`ResolvedEnvironment`].

use std::collections::HashMap;
use std::collections::HashSet;

use indexmap::IndexMap;

use crate::environment::{ResolvedEnvironment, ResolvedVar};
use crate::package::{PackageRef, PackageSet};
use crate::platform::PlatformContext;
use crate::variable::DerivedSpec;
use crate::{Error, Result};

#[cfg(test)]
#[path = "./resolve_test.rs"]
mod resolve_test;

/// Select the declared packages that apply to `context`.
///
/// Declaration order is kept as-is. A name that is selected twice is an
/// error rather than being deduplicated.
pub fn resolve_packages(declared: &[PackageRef], context: &PlatformContext) -> Result<PackageSet> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut selected = Vec::new();

    for (index, package) in declared.iter().enumerate() {
        if !package.applies_to(context) {
            tracing::debug!(package = %package.name, platform = %context, "package excluded");
            continue;
        }
        if let Some(first) = seen.insert(package.name.as_str(), index) {
            return Err(Error::DuplicatePackage {
                name: package.name.clone(),
                first,
                second: index,
            });
        }
        selected.push(package.clone());
    }

    Ok(PackageSet::from_vec(selected))
}

/// Fold the resolved packages into the value of `name`.
///
/// An empty set yields an empty value without calling `fold`.
pub fn compute_derived_variable<F>(name: &str, fold: F, resolved: &PackageSet) -> Result<String>
where
    F: FnOnce(&[PackageRef]) -> Result<String>,
{
    if resolved.is_empty() {
        tracing::trace!(variable = name, "no packages selected");
        return Ok(String::new());
    }
    fold(resolved.as_slice())
}

/// Derive the value of `name` from the single package called `package`.
pub fn compute_version_dependent_variable<F>(
    name: &str,
    package: &str,
    attribute: F,
    resolved: &PackageSet,
) -> Result<String>
where
    F: FnOnce(&PackageRef) -> Result<String>,
{
    let found = resolved
        .get(package)
        .ok_or_else(|| Error::MissingDependency {
            variable: name.to_string(),
            package: package.to_string(),
        })?;
    attribute(found)
}

/// Resolve packages for `context` and evaluate every variable spec.
///
/// Either every variable is produced or an error is returned; there is no
/// partially resolved result.
pub fn resolve(
    declared: &[PackageRef],
    context: &PlatformContext,
    specs: &[DerivedSpec],
) -> Result<ResolvedEnvironment> {
    let mut names = HashSet::new();
    for spec in specs {
        if !names.insert(spec.name()) {
            return Err(Error::DuplicateVariable(spec.name().to_string()));
        }
    }

    let packages = resolve_packages(declared, context)?;
    tracing::debug!(platform = %context, count = packages.len(), "packages resolved");

    let mut variables = IndexMap::with_capacity(specs.len());
    for spec in specs {
        let value = evaluate(spec, &packages)?;
        tracing::trace!(variable = spec.name(), %value, "variable resolved");
        variables.insert(
            spec.name().to_string(),
            ResolvedVar {
                value,
                merge: spec.merge(),
                separator: spec.separator().to_string(),
            },
        );
    }

    Ok(ResolvedEnvironment::new(context.triple(), packages, variables))
}

fn evaluate(spec: &DerivedSpec, packages: &PackageSet) -> Result<String> {
    match spec {
        DerivedSpec::Join(join) => compute_derived_variable(&join.join, |p| join.fold(p), packages),
        DerivedSpec::Template(template) => compute_version_dependent_variable(
            &template.template,
            &template.package,
            |p| template.render(p),
            packages,
        ),
        DerivedSpec::Set(set) => Ok(set.value.clone()),
    }
}
