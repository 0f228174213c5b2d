// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for denv operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience Result type with denv Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during denv operations.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// The same package name was selected twice for one platform
    #[error("Package '{name}' is declared more than once (entries {first} and {second})")]
    #[diagnostic(
        code(denv::duplicate_package),
        help("Remove one of the declarations or guard them with mutually exclusive 'when' predicates")
    )]
    DuplicatePackage {
        name: String,
        first: usize,
        second: usize,
    },

    /// A version-dependent variable refers to a package that was not selected
    #[error("Variable '{variable}' requires package '{package}', which is not selected for this platform")]
    #[diagnostic(
        code(denv::missing_dependency),
        help("Declare '{package}' for this platform or restrict the variable to platforms that have it")
    )]
    MissingDependency { variable: String, package: String },

    /// Two derived variables share a name
    #[error("Variable '{0}' is declared more than once")]
    #[diagnostic(code(denv::duplicate_variable))]
    DuplicateVariable(String),

    /// A package does not provide an attribute that a variable reads
    #[error("Package '{package}' has no '{attribute}' attribute (needed by '{variable}')")]
    #[diagnostic(
        code(denv::missing_attribute),
        help("Set 'prefix' on the package or add '{attribute}' to its 'outputs'")
    )]
    MissingAttribute {
        variable: String,
        package: String,
        attribute: String,
    },

    /// Template string could not be parsed
    #[error("Invalid template for '{variable}': {reason}")]
    #[diagnostic(
        code(denv::invalid_template),
        help("Placeholders look like {{version}}; write {{{{ and }}}} for literal braces")
    )]
    InvalidTemplate { variable: String, reason: String },

    /// Host platform cannot be described
    #[error("Unsupported platform: {0}")]
    #[diagnostic(
        code(denv::unsupported_platform),
        help("Pass --os and --arch explicitly")
    )]
    UnsupportedPlatform(String),

    /// No .denv.yaml found in directory tree
    #[error("No .denv.yaml found in {0:?} or any parent directory")]
    #[diagnostic(
        code(denv::not_found_in_tree),
        help("Create a .denv.yaml file with 'denv init' or specify a path with -f")
    )]
    NotFoundInTree(PathBuf),

    /// .denv.yaml not found at specified path
    #[error(".denv.yaml not found at {0:?}")]
    #[diagnostic(code(denv::not_found_at_path))]
    NotFoundAtPath(PathBuf),

    /// Invalid YAML in spec file
    #[error("Invalid .denv.yaml file: {error}")]
    #[diagnostic(
        code(denv::invalid_yaml),
        help("Check YAML syntax and ensure 'api: denv/v0' is present")
    )]
    InvalidYaml {
        #[source]
        error: serde_yaml::Error,
        yaml_content: String,
    },

    /// Failed to read file
    #[error("Failed to read file: {path:?}")]
    #[diagnostic(code(denv::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Include file not found
    #[error("Include file not found: {path:?}")]
    #[diagnostic(
        code(denv::include_not_found),
        help("Check that the include path is correct and the file exists")
    )]
    IncludeNotFound {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Circular include detected
    #[error("Circular include detected: {0:?}")]
    #[diagnostic(
        code(denv::circular_include),
        help("Remove the circular reference in your includes")
    )]
    CircularInclude(PathBuf),

    /// The same file is reached through two different include chains
    #[error("File is included more than once: {0:?}")]
    #[diagnostic(
        code(denv::duplicate_include),
        help("Include shared declarations from a single place so they are composed once")
    )]
    DuplicateInclude(PathBuf),

    /// Validation error
    #[error("Validation failed: {0}")]
    #[diagnostic(code(denv::validation_failed))]
    ValidationFailed(String),

    /// IO error passthrough
    #[error(transparent)]
    #[diagnostic(code(denv::io_error))]
    Io(#[from] std::io::Error),
}

