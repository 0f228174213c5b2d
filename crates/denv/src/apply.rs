// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Applying a resolved environment to shells and child processes.
//!
//! This is the only place where resolved values meet an existing process
//! environment. Resolution itself never reads or writes one.

use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::environment::{ResolvedEnvironment, ResolvedVar};
use crate::variable::MergeMode;

#[cfg(test)]
#[path = "./apply_test.rs"]
mod apply_test;

/// Shell dialects that scripts can be rendered for.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Shell {
    #[default]
    Bash,
    Zsh,
    Fish,
}

impl Shell {
    /// Guess the dialect from a shell path such as the value of `$SHELL`.
    pub fn from_path(path: &str) -> Option<Self> {
        let name = path.rsplit('/').next().unwrap_or(path);
        name.parse().ok()
    }
}

/// Combine a resolved variable with the value already in the environment.
pub fn merged_value(var: &ResolvedVar, inherited: Option<&str>) -> String {
    let existing = inherited.filter(|v| !v.is_empty());
    match (var.merge, existing) {
        (MergeMode::Replace, _) | (_, None) => var.value.clone(),
        (_, Some(existing)) if var.value.is_empty() => existing.to_string(),
        (MergeMode::Prepend, Some(existing)) => {
            format!("{}{}{}", var.value, var.separator, existing)
        }
        (MergeMode::Append, Some(existing)) => {
            format!("{}{}{}", existing, var.separator, var.value)
        }
    }
}

/// Set every resolved variable on `command`.
///
/// `inherited` supplies the current value of a variable for prepend and
/// append merges; pass `|name| std::env::var(name).ok()` to merge with the
/// calling process. Prepend and append variables that resolved to an empty
/// value are not set at all, matching [`render_script`].
pub fn apply_to_command<F>(env: &ResolvedEnvironment, command: &mut Command, inherited: F)
where
    F: Fn(&str) -> Option<String>,
{
    for (name, var) in env.iter() {
        if var.value.is_empty() && !var.merge.is_replace() {
            tracing::trace!(variable = name, "left unchanged");
            continue;
        }
        let current = inherited(name);
        let value = merged_value(var, current.as_deref());
        tracing::trace!(variable = name, %value, "applying to command");
        command.env(name, value);
    }
}

/// Render a script that, when sourced, applies the environment.
pub fn render_script(env: &ResolvedEnvironment, shell: Shell) -> String {
    let mut script = format!("# denv environment for {}\n", env.platform());
    for (name, var) in env.iter() {
        if var.value.is_empty() && !var.merge.is_replace() {
            script.push_str(&format!("# {name} unchanged\n"));
            continue;
        }
        let line = match shell {
            Shell::Bash | Shell::Zsh => posix_line(name, var),
            Shell::Fish => fish_line(name, var),
        };
        script.push_str(&line);
        script.push('\n');
    }
    script
}

fn posix_line(name: &str, var: &ResolvedVar) -> String {
    let value = escape_double_quoted(&var.value);
    let sep = escape_double_quoted(&var.separator);
    match var.merge {
        MergeMode::Replace => format!("export {name}=\"{value}\""),
        MergeMode::Prepend => format!("export {name}=\"{value}${{{name}:+{sep}${{{name}}}}}\""),
        MergeMode::Append => format!("export {name}=\"${{{name}:+${{{name}}}{sep}}}{value}\""),
    }
}

fn fish_line(name: &str, var: &ResolvedVar) -> String {
    let value = escape_fish_quoted(&var.value);
    let sep = escape_fish_quoted(&var.separator);
    match var.merge {
        MergeMode::Replace => format!("set -gx {name} \"{value}\""),
        MergeMode::Prepend => format!(
            "if set -q {name}; and test -n \"${name}\"; set -gx {name} \"{value}{sep}${name}\"; else; set -gx {name} \"{value}\"; end"
        ),
        MergeMode::Append => format!(
            "if set -q {name}; and test -n \"${name}\"; set -gx {name} \"${name}{sep}{value}\"; else; set -gx {name} \"{value}\"; end"
        ),
    }
}

fn escape_double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Fish only treats `\`, `"` and `$` as special inside double quotes.
fn escape_fish_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
