// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! denv - Declarative Development Environment Resolver CLI

use clap::{Parser, Subcommand};
use miette::Result;

mod cmd_check;
mod cmd_env;
mod cmd_init;
mod cmd_lock;
mod cmd_run;
mod cmd_shell;
mod cmd_show;
mod flags;

use cmd_check::CmdCheck;
use cmd_env::CmdEnv;
use cmd_init::CmdInit;
use cmd_lock::CmdLock;
use cmd_run::CmdRun;
use cmd_shell::CmdShell;
use cmd_show::CmdShow;

#[derive(Parser)]
#[clap(
    name = "denv",
    about = "Declarative Development Environment Resolver",
    version,
    long_about = "Resolve .denv.yaml declarations into a deterministic environment for the target platform"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase verbosity (-v, -vv, -vvv)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new .denv.yaml file
    Init(CmdInit),

    /// Display the resolved environment
    Show(CmdShow),

    /// Print a script that applies the environment to a shell
    Env(CmdEnv),

    /// Run a command inside the environment
    Run(CmdRun),

    /// Enter an interactive shell in the environment
    Shell(CmdShell),

    /// Generate or update lock file
    Lock(CmdLock),

    /// Verify environment matches lock file
    Check(CmdCheck),
}

impl Opt {
    fn run(self) -> Result<i32> {
        let log_level = match (self.logging.quiet, self.logging.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        };

        // Logs go to stderr so that `denv env` output can be eval'd.
        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init();

        match self.cmd {
            Command::Init(mut cmd) => cmd.run(),
            Command::Show(mut cmd) => cmd.run(),
            Command::Env(mut cmd) => cmd.run(),
            Command::Run(mut cmd) => cmd.run(),
            Command::Shell(mut cmd) => cmd.run(),
            Command::Lock(mut cmd) => cmd.run(),
            Command::Check(mut cmd) => cmd.run(),
        }
    }
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    let code = opt.run()?;
    std::process::exit(code);
}
