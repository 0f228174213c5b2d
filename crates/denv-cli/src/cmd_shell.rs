// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `denv shell` command.

use clap::Args;
use miette::Result;

use crate::flags::{DiscoveryFlags, PlatformFlags};

/// Enter interactive shell in environment
#[derive(Debug, Args)]
pub struct CmdShell {
    #[clap(flatten)]
    discovery: DiscoveryFlags,

    #[clap(flatten)]
    platform: PlatformFlags,

    /// Shell to use
    #[clap(long)]
    shell: Option<String>,
}

impl CmdShell {
    pub fn run(&mut self) -> Result<i32> {
        let shell = self
            .shell
            .clone()
            .or_else(|| std::env::var("SHELL").ok())
            .unwrap_or_else(|| "/bin/bash".to_string());

        let mut run_cmd = super::cmd_run::CmdRun {
            discovery: self.discovery.clone(),
            platform: self.platform.clone(),
            dry_run: false,
            command: vec![shell],
        };

        run_cmd.run()
    }
}
