// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Verify that the current environment matches the lock file.

use clap::Args;
use colored::Colorize;
use miette::Result;

use crate::flags::{DiscoveryFlags, PlatformFlags};

/// Verify environment matches lock file
#[derive(Debug, Args)]
pub struct CmdCheck {
    #[clap(flatten)]
    discovery: DiscoveryFlags,

    #[clap(flatten)]
    platform: PlatformFlags,

    /// Exit with error on mismatch
    #[clap(long)]
    strict: bool,
}

impl CmdCheck {
    pub fn run(&mut self) -> Result<i32> {
        let (_, composed) = self.discovery.compose()?;
        let context = self.platform.context()?;
        let lock_path = self.discovery.lock_path();

        if !lock_path.exists() {
            if self.strict {
                return Err(miette::miette!("No lock file found at {:?}", lock_path));
            } else {
                println!("{} No lock file found", "Warning:".yellow());
                return Ok(2);
            }
        }

        let lock = denv::LockFile::load(&lock_path)?;
        let changes = denv::verify_lock(&lock, &composed, &context)?;

        if changes.is_empty() {
            println!("{} Environment matches lock file", "✓".green());
            return Ok(0);
        }

        if self.strict {
            eprintln!("{} Environment differs from lock file:", "Error:".red());
        } else {
            println!("{} Environment differs from lock file:", "Warning:".yellow());
        }

        for change in &changes {
            match &change.kind {
                denv::LockChangeKind::VariableChanged | denv::LockChangeKind::PlatformChanged => {
                    println!("  - '{}' changed", change.reference);
                    if let (Some(exp), Some(act)) = (&change.expected, &change.actual) {
                        println!("    Expected: {}", exp);
                        println!("    Actual:   {}", act);
                    }
                }
                denv::LockChangeKind::SourceFileChanged => {
                    println!("  - Source file '{}' was modified", change.reference);
                }
                _ => {
                    println!("  - {:?}: {}", change.kind, change.reference);
                }
            }
        }

        if self.strict {
            return Ok(1);
        }

        println!("\nRun 'denv lock --update' to update the lock file");
        Ok(0)
    }
}
