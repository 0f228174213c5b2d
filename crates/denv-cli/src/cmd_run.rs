// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `denv run` command.

use clap::Args;
use colored::Colorize;
use miette::Result;

use crate::flags::{DiscoveryFlags, PlatformFlags};

/// Run a command inside the environment
#[derive(Debug, Args)]
pub struct CmdRun {
    #[clap(flatten)]
    pub discovery: DiscoveryFlags,

    #[clap(flatten)]
    pub platform: PlatformFlags,

    /// Show what would be applied without running
    #[clap(long)]
    pub dry_run: bool,

    /// Command to run (default: $SHELL)
    #[clap(last = true)]
    pub command: Vec<String>,
}

impl CmdRun {
    pub fn run(&mut self) -> Result<i32> {
        let (specs, composed) = self.discovery.compose()?;

        if specs.is_empty() {
            return Err(miette::miette!(
                "No .denv.yaml files discovered. Run 'denv init' to create one."
            ));
        }

        let platform = composed.platform_for(&self.platform.context()?);
        let env = composed.resolve(&platform)?;

        if self.dry_run {
            println!("{} {}", "Platform:".bold(), platform);
            println!("{}", "Discovered files:".bold());
            for spec in &specs {
                if let Some(path) = &spec.source_path {
                    println!("  - {}", path.display());
                }
            }
            println!();
            println!("{} variables:", env.len());
            for (name, var) in env.iter() {
                let inherited = std::env::var(name).ok();
                let value = denv::merged_value(var, inherited.as_deref());
                println!("  {}={}", name.cyan(), value.green());
            }
            return Ok(0);
        }

        let (program, args) = match self.command.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => {
                let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string());
                (shell, Vec::new())
            }
        };

        let mut cmd = std::process::Command::new(&program);
        cmd.args(&args);
        denv::apply_to_command(&env, &mut cmd, |name| std::env::var(name).ok());

        tracing::info!(%program, platform = %platform, "entering environment");

        let status = cmd
            .status()
            .map_err(|e| miette::miette!("Failed to execute {program}: {e}"))?;

        // A signal-terminated child has no code.
        Ok(status.code().unwrap_or(1))
    }
}
