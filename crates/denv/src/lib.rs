// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! denv - Declarative Development Environment Resolver
//!
//! This crate turns a declared set of packages and derived variables
//! (`.denv.yaml`) into a fully specified process environment for one target
//! platform.
//!
//! # Overview
//!
//! Resolution is a pure function of the declaration and a
//! [`PlatformContext`]: packages whose `when` predicate does not match are
//! dropped, the rest keep their declared order, and every variable is
//! folded from them in that order. The resulting [`ResolvedEnvironment`] is
//! handed to an applier ([`apply`]) that writes a shell script or configures
//! a child process. Resolution never touches the running process.
//!
//! # Example
//!
//! ```yaml
//! # .denv.yaml
//! api: denv/v0
//! description: "skia + egui development shell"
//! default_features: [x11]
//!
//! packages:
//!   - name: fontconfig
//!     prefix: /opt/fontconfig
//!   - name: wayland
//!     prefix: /opt/wayland
//!     when: { os: [linux], features: [wayland] }
//!   - name: libX11
//!     prefix: /opt/libX11
//!     when: { os: [linux], features: [x11] }
//!   - name: libclang
//!     version: "17.0.6"
//!     prefix: /opt/llvm
//!
//! variables:
//!   - join: LD_LIBRARY_PATH
//!     attribute: lib
//!     merge: prepend
//!   - template: BINDGEN_EXTRA_CLANG_ARGS
//!     package: libclang
//!     value: "-isystem {lib}/clang/{version}/include"
//! ```

pub mod apply;
pub mod compose;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod lock;
pub mod package;
pub mod platform;
pub mod resolve;
mod scalar;
pub mod spec;
pub mod variable;

pub use apply::{Shell, apply_to_command, merged_value, render_script};
pub use compose::{ComposedEnvironment, compose_specs};
pub use discovery::{DiscoveryOptions, discover_specs};
pub use environment::{ResolvedEnvironment, ResolvedVar};
pub use error::{Error, Result};
pub use lock::{LockChange, LockChangeKind, LockFile, generate_lock, verify_lock};
pub use package::{PackageRef, PackageSet};
pub use platform::{Arch, Os, PlatformContext, PlatformPredicate};
pub use resolve::{
    compute_derived_variable,
    compute_version_dependent_variable,
    resolve,
    resolve_packages,
};
pub use spec::{ApiVersion, EnvSpec};
pub use variable::{DerivedSpec, JoinVar, MergeMode, SetVar, TemplateVar};

/// Well-known filename for environment specs.
pub const DENV_FILENAME: &str = ".denv.yaml";

/// Well-known filename for local overrides.
pub const DENV_LOCAL_FILENAME: &str = ".denv.local.yaml";

/// Well-known filename for lock files.
pub const DENV_LOCK_FILENAME: &str = ".denv.lock.yaml";
