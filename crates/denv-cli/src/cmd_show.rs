// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `denv show` command.

use clap::{Args, ValueEnum};
use colored::Colorize;
use itertools::Itertools;
use miette::{IntoDiagnostic, Result};

use crate::flags::{DiscoveryFlags, PlatformFlags};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Format {
    #[default]
    Table,
    Yaml,
    Json,
}

/// Display the resolved environment
#[derive(Debug, Args)]
pub struct CmdShow {
    #[clap(flatten)]
    discovery: DiscoveryFlags,

    #[clap(flatten)]
    platform: PlatformFlags,

    /// Show discovered files
    #[clap(long)]
    files: bool,

    /// Show resolved variables
    #[clap(long)]
    variables: bool,

    /// Show all information
    #[clap(long)]
    all: bool,

    /// Output format
    #[clap(long, value_enum, default_value_t)]
    format: Format,
}

impl CmdShow {
    pub fn run(&mut self) -> Result<i32> {
        let (specs, composed) = self.discovery.compose()?;
        let platform = composed.platform_for(&self.platform.context()?);
        let env = composed.resolve(&platform)?;

        match self.format {
            Format::Yaml => {
                let yaml = serde_yaml::to_string(&env).into_diagnostic()?;
                print!("{yaml}");
            }
            Format::Json => self.show_json(&specs, &env)?,
            Format::Table => {
                let neither = !self.files && !self.variables;
                let show_files = self.files || self.all || neither;
                let show_variables = self.variables || self.all || neither;

                if show_files {
                    self.show_files_table(&specs);
                }
                if show_files && show_variables {
                    println!();
                }
                if show_variables {
                    self.show_variables_table(&env);
                }
            }
        }

        Ok(0)
    }

    fn show_files_table(&self, specs: &[denv::EnvSpec]) {
        println!("{}", "Discovered Files:".bold());
        println!();

        for (i, spec) in specs.iter().enumerate() {
            let path = spec
                .source_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<unknown>".to_string());

            let inherit_marker = if spec.inherit { " [inherit]" } else { "" };
            let includes_marker = if !spec.includes.is_empty() {
                format!(" [includes: {}]", spec.includes.len())
            } else {
                String::new()
            };

            println!(
                "  {}. {}{}{}",
                i + 1,
                path.cyan(),
                inherit_marker.yellow(),
                includes_marker.blue()
            );

            if let Some(desc) = &spec.description {
                println!("     {}", desc.dimmed());
            }
        }

        println!();
        println!("Total: {} file(s)", specs.len());
    }

    fn show_variables_table(&self, env: &denv::ResolvedEnvironment) {
        println!("{} {}", "Platform:".bold(), env.platform().green());
        println!();

        if env.packages().is_empty() {
            println!("{} {}", "Packages:".bold(), "(none)".dimmed());
        } else {
            println!("{} {}", "Packages:".bold(), env.packages().names().join(", "));
        }
        println!();

        println!("{}", "Variables:".bold());
        if env.is_empty() {
            println!("  {}", "(no variables)".dimmed());
        }
        for (name, var) in env.iter() {
            let value = var.value.as_str();
            match var.merge {
                denv::MergeMode::Replace => {
                    println!("  {} = {}", name.cyan(), value.green());
                }
                denv::MergeMode::Prepend => {
                    println!("  {} = {} + ${}", name.cyan(), value.green(), name);
                }
                denv::MergeMode::Append => {
                    println!("  {} = ${} + {}", name.cyan(), name, value.green());
                }
            }
        }

        println!();
        println!("Total: {} variable(s)", env.len());
    }

    fn show_json(&self, specs: &[denv::EnvSpec], env: &denv::ResolvedEnvironment) -> Result<()> {
        let files: Vec<String> = specs
            .iter()
            .filter_map(|s| s.source_path.as_ref().map(|p| p.display().to_string()))
            .collect();

        let output = serde_json::json!({
            "discovered_files": files,
            "environment": env,
            "digest": env.digest(),
        });
        let json = serde_json::to_string_pretty(&output).into_diagnostic()?;
        println!("{json}");
        Ok(())
    }
}
