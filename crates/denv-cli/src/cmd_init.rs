// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `denv init` command.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use miette::Result;

#[cfg(test)]
#[path = "./cmd_init_test.rs"]
mod cmd_init_test;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Template {
    Minimal,
    #[default]
    Standard,
    Full,
}

/// Create a new .denv.yaml file
#[derive(Debug, Args)]
pub struct CmdInit {
    /// Directory to create file in
    #[clap(default_value = ".")]
    path: PathBuf,

    /// Enable in-tree inheritance
    #[clap(long)]
    inherit: bool,

    /// Add an initial package declaration
    #[clap(long = "package")]
    packages: Vec<String>,

    /// Template to use
    #[clap(long, value_enum, default_value_t)]
    template: Template,
}

impl CmdInit {
    pub fn run(&mut self) -> Result<i32> {
        let spec_path = self.path.join(denv::DENV_FILENAME);

        if spec_path.exists() {
            return Err(miette::miette!(
                ".denv.yaml already exists at {:?}",
                spec_path
            ));
        }

        let content = self.render();

        std::fs::write(&spec_path, content)
            .map_err(|e| miette::miette!("Failed to write .denv.yaml: {}", e))?;
        tracing::info!(path = ?spec_path, "created spec");

        println!("Created .denv.yaml at {:?}", spec_path);
        println!();
        println!("Next steps:");
        println!("  1. Edit the file to declare your packages and variables");
        println!("  2. Run 'denv show' to preview the environment");
        println!("  3. Run 'denv shell' to enter the environment");

        Ok(0)
    }

    fn render(&self) -> String {
        match self.template {
            Template::Minimal => self.generate_minimal_template(),
            Template::Standard => self.generate_standard_template(),
            Template::Full => self.generate_full_template(),
        }
    }

    fn packages_section(&self) -> String {
        if self.packages.is_empty() {
            return "packages: []\n".to_string();
        }
        let entries: Vec<String> = self
            .packages
            .iter()
            .map(|name| format!("  - name: {name}"))
            .collect();
        format!("packages:\n{}\n", entries.join("\n"))
    }

    fn generate_minimal_template(&self) -> String {
        format!(
            "api: denv/v0\n\
            inherit: {}\n\
            \n\
            {}",
            self.inherit,
            self.packages_section()
        )
    }

    fn generate_standard_template(&self) -> String {
        format!(
            "# denv environment declaration\n\
            \n\
            api: denv/v0\n\
            \n\
            # Optional: Human-readable description\n\
            # description: \"My project environment\"\n\
            \n\
            # In-tree inheritance (default: false)\n\
            # When true, parent directory .denv.yaml files are loaded first\n\
            inherit: {}\n\
            \n\
            # Packages, in precedence order\n\
            #   - name: zlib\n\
            #     version: \"1.3\"\n\
            #     prefix: /opt/zlib\n\
            {}\
            \n\
            # Variables derived from the resolved packages\n\
            # variables:\n\
            #   - join: LD_LIBRARY_PATH\n\
            #     attribute: lib\n\
            #     merge: prepend\n",
            self.inherit,
            self.packages_section(),
        )
    }

    fn generate_full_template(&self) -> String {
        format!(
            "# denv environment declaration\n\
            # Full example with all fields documented\n\
            \n\
            api: denv/v0\n\
            \n\
            description: \"Full example environment\"\n\
            \n\
            inherit: {}\n\
            \n\
            # Other declarations composed before this one\n\
            includes: []\n\
            #   - ~/.config/denv/defaults.denv.yaml\n\
            #   - ../shared/common.denv.yaml\n\
            \n\
            # Features assumed when none are selected with --feature\n\
            default_features: []\n\
            #   - x11\n\
            \n\
            {}\
            #   - name: libclang\n\
            #     version: \"17.0.6\"\n\
            #     prefix: /opt/llvm\n\
            #   - name: wayland\n\
            #     prefix: /usr\n\
            #     when:\n\
            #       os: [linux]\n\
            #       features: [wayland]\n\
            #   - name: libx11\n\
            #     prefix: /usr\n\
            #     when:\n\
            #       os: [linux]\n\
            #       without: [wayland]\n\
            \n\
            variables: []\n\
            #   - join: LD_LIBRARY_PATH\n\
            #     attribute: lib\n\
            #     merge: prepend\n\
            #   - template: BINDGEN_EXTRA_CLANG_ARGS\n\
            #     package: libclang\n\
            #     value: \"-isystem {{lib}}/clang/{{version}}/include\"\n\
            #   - set: RUST_BACKTRACE\n\
            #     value: \"1\"\n",
            self.inherit,
            self.packages_section(),
        )
    }
}
