// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `denv env` command.

use clap::Args;
use miette::Result;

use crate::flags::{DiscoveryFlags, PlatformFlags};

/// Print a script that applies the environment to a shell
///
/// Intended to be evaluated by the calling shell, eg: `eval "$(denv env)"`.
#[derive(Debug, Args)]
pub struct CmdEnv {
    #[clap(flatten)]
    discovery: DiscoveryFlags,

    #[clap(flatten)]
    platform: PlatformFlags,

    /// Shell dialect to emit (default: from $SHELL)
    #[clap(long)]
    shell: Option<denv::Shell>,
}

impl CmdEnv {
    pub fn run(&mut self) -> Result<i32> {
        let (_, composed) = self.discovery.compose()?;
        let platform = composed.platform_for(&self.platform.context()?);
        let env = composed.resolve(&platform)?;

        let shell = self.shell.unwrap_or_else(|| {
            std::env::var("SHELL")
                .ok()
                .and_then(|s| denv::Shell::from_path(&s))
                .unwrap_or_default()
        });
        tracing::debug!(%shell, platform = %platform, "rendering script");

        print!("{}", denv::render_script(&env, shell));
        Ok(0)
    }
}
