// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Command line flags shared between subcommands.

use std::path::PathBuf;

use clap::Args;
use miette::Result;

#[cfg(test)]
#[path = "./flags_test.rs"]
mod flags_test;

/// Flags controlling which .denv.yaml files are loaded.
#[derive(Args, Clone, Debug, Default)]
pub struct DiscoveryFlags {
    /// Start discovery from PATH
    #[clap(short = 'f', long, default_value = ".")]
    pub file: PathBuf,

    /// Enable in-tree discovery
    #[clap(long, env = "DENV_INHERIT", value_parser = truthy)]
    pub inherit: bool,

    /// Disable in-tree discovery
    #[clap(short = 'n', long, env = "DENV_NO_INHERIT", value_parser = truthy)]
    pub no_inherit: bool,

    /// Additional .denv.yaml to include
    #[clap(short = 'i', long = "include")]
    pub includes: Vec<String>,

    /// Colon-separated includes applied after --include
    #[clap(long = "env-include", env = "DENV_INCLUDE", value_delimiter = ':', hide = true)]
    pub env_includes: Vec<String>,
}

impl DiscoveryFlags {
    pub fn options(&self) -> denv::DiscoveryOptions {
        denv::DiscoveryOptions {
            no_inherit: self.no_inherit,
            force_inherit: self.inherit,
            cli_includes: self.includes.clone(),
            env_includes: self
                .env_includes
                .iter()
                .filter(|s| !s.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// Discover and compose every spec reachable from these flags.
    pub fn compose(&self) -> Result<(Vec<denv::EnvSpec>, denv::ComposedEnvironment)> {
        let specs = denv::discover_specs(&self.file, &self.options())?;
        tracing::debug!(count = specs.len(), "discovered specs");
        let composed = denv::compose_specs(&specs);
        Ok((specs, composed))
    }

    /// The lock file that sits beside the starting spec.
    pub fn lock_path(&self) -> PathBuf {
        if self.file.is_file() {
            self.file.with_file_name(denv::DENV_LOCK_FILENAME)
        } else {
            self.file.join(denv::DENV_LOCK_FILENAME)
        }
    }
}

/// Flags selecting the platform to resolve for.
#[derive(Args, Clone, Debug, Default)]
pub struct PlatformFlags {
    /// Target operating system (default: host)
    #[clap(long)]
    pub os: Option<denv::Os>,

    /// Target architecture (default: host)
    #[clap(long)]
    pub arch: Option<denv::Arch>,

    /// Enable a platform feature, eg: wayland (repeatable)
    #[clap(short = 'F', long = "feature", env = "DENV_FEATURES", value_delimiter = ',')]
    pub features: Vec<String>,
}

impl PlatformFlags {
    /// Build the platform context, filling unset fields from the host.
    pub fn context(&self) -> Result<denv::PlatformContext> {
        let (os, arch) = match (self.os, self.arch) {
            (Some(os), Some(arch)) => (os, arch),
            (os, arch) => {
                let host = denv::PlatformContext::current()?;
                (os.unwrap_or(host.os), arch.unwrap_or(host.arch))
            }
        };
        let features = self
            .features
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(String::from);
        Ok(denv::PlatformContext::new(os, arch).with_features(features))
    }
}

/// Parse the truthy values accepted in environment variables.
fn truthy(value: &str) -> std::result::Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got '{other}'")),
    }
}
