// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Generate or update lock files for denv environments.

use clap::Args;
use miette::Result;

use crate::flags::{DiscoveryFlags, PlatformFlags};

/// Generate or update lock file
#[derive(Debug, Args)]
pub struct CmdLock {
    #[clap(flatten)]
    discovery: DiscoveryFlags,

    #[clap(flatten)]
    platform: PlatformFlags,

    /// Update existing lock file
    #[clap(long)]
    update: bool,

    /// Force regeneration even if up-to-date
    #[clap(long)]
    force: bool,

    /// Verify lock is current (exit 1 if not)
    #[clap(long)]
    check: bool,
}

impl CmdLock {
    pub fn run(&mut self) -> Result<i32> {
        let (_, composed) = self.discovery.compose()?;
        let context = self.platform.context()?;
        let lock_path = self.discovery.lock_path();

        if self.check {
            if !lock_path.exists() {
                eprintln!("No lock file found at {:?}", lock_path);
                return Ok(2);
            }

            let lock = denv::LockFile::load(&lock_path)?;
            let changes = denv::verify_lock(&lock, &composed, &context)?;

            if !changes.is_empty() {
                eprintln!("Lock file is out of date:");
                for change in &changes {
                    eprintln!("  - {:?}: {}", change.kind, change.reference);
                }
                return Ok(1);
            }

            println!("Lock file is up to date");
            return Ok(0);
        }

        if lock_path.exists() && !self.update && !self.force {
            return Err(miette::miette!(
                "Lock file already exists at {:?}. Use --update or --force",
                lock_path
            ));
        }

        if lock_path.exists() && self.update && !self.force {
            let existing = denv::LockFile::load(&lock_path)?;
            if denv::verify_lock(&existing, &composed, &context)?.is_empty() {
                println!("Lock file is already up to date: {:?}", lock_path);
                return Ok(0);
            }
        }

        let lock = denv::generate_lock(&composed, &context)?;
        lock.save(&lock_path)?;
        tracing::info!(digest = %lock.digest, "wrote lock file");
        println!("Generated lock file: {:?}", lock_path);

        Ok(0)
    }
}
