// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Declarations of the environment variables derived from a package set.
//!
//! Each entry names its variable with the key that selects its kind:
//!
//! ```yaml
//! variables:
//!   - join: LD_LIBRARY_PATH
//!     attribute: lib
//!   - template: BINDGEN_EXTRA_CLANG_ARGS
//!     package: libclang
//!     value: "-isystem {lib}/clang/{version}/include"
//!   - set: RUST_BACKTRACE
//!     value: "1"
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::package::PackageRef;
use crate::{Error, Result};

#[cfg(test)]
#[path = "./variable_test.rs"]
mod variable_test;

/// Separator used when none is declared.
pub const DEFAULT_SEPARATOR: &str = ":";

/// How the applier combines a resolved value with one already present in
/// the target process environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    #[default]
    Replace,
    Prepend,
    Append,
}

impl MergeMode {
    pub fn is_replace(&self) -> bool {
        matches!(self, Self::Replace)
    }
}

/// One derived environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DerivedSpec {
    Join(JoinVar),
    Template(TemplateVar),
    Set(SetVar),
}

/// The kind is chosen by which naming key is present, so that errors from
/// the chosen kind (eg: an unknown field) are reported as-is.
impl<'de> Deserialize<'de> for DerivedSpec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_yaml::Value::deserialize(deserializer)?;
        let Some(mapping) = value.as_mapping() else {
            return Err(D::Error::custom("variable entry must be a mapping"));
        };
        let kind = ["join", "template", "set"]
            .into_iter()
            .find(|key| mapping.contains_key(*key));

        let parsed = match kind {
            Some("join") => serde_yaml::from_value(value).map(Self::Join),
            Some("template") => serde_yaml::from_value(value).map(Self::Template),
            Some("set") => serde_yaml::from_value(value).map(Self::Set),
            _ => {
                return Err(D::Error::custom(
                    "variable entry needs one of 'join', 'template' or 'set'",
                ));
            }
        };
        parsed.map_err(D::Error::custom)
    }
}

impl DerivedSpec {
    /// Name of the variable this spec produces.
    pub fn name(&self) -> &str {
        match self {
            Self::Join(j) => &j.join,
            Self::Template(t) => &t.template,
            Self::Set(s) => &s.set,
        }
    }

    pub fn merge(&self) -> MergeMode {
        match self {
            Self::Join(j) => j.merge,
            Self::Template(t) => t.merge,
            Self::Set(s) => s.merge,
        }
    }

    /// Separator the applier uses for prepend and append merges.
    pub fn separator(&self) -> &str {
        let sep = match self {
            Self::Join(j) => j.separator.as_deref(),
            Self::Template(t) => t.separator.as_deref(),
            Self::Set(s) => s.separator.as_deref(),
        };
        sep.unwrap_or(DEFAULT_SEPARATOR)
    }
}

/// Joins one attribute of every selected package, in resolved order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JoinVar {
    pub join: String,
    pub attribute: String,

    /// Defaults to `:`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,

    /// Restrict the fold to these packages. Names that are not selected on
    /// the current platform contribute nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "MergeMode::is_replace")]
    pub merge: MergeMode,
}

impl JoinVar {
    pub fn new<N: Into<String>, A: Into<String>>(name: N, attribute: A) -> Self {
        Self {
            join: name.into(),
            attribute: attribute.into(),
            separator: None,
            packages: None,
            merge: MergeMode::default(),
        }
    }

    /// Fold the selected packages into a single value.
    pub fn fold(&self, packages: &[PackageRef]) -> Result<String> {
        let mut parts = Vec::new();
        for package in packages {
            if let Some(only) = &self.packages {
                if !only.contains(&package.name) {
                    continue;
                }
            }
            let value = package
                .attribute(&self.attribute)
                .ok_or_else(|| Error::MissingAttribute {
                    variable: self.join.clone(),
                    package: package.name.clone(),
                    attribute: self.attribute.clone(),
                })?;
            parts.push(value);
        }
        Ok(parts.join(self.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR)))
    }
}

/// Renders a value from the attributes of one designated package.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateVar {
    pub template: String,
    pub package: String,

    /// Text with `{attribute}` placeholders.
    #[serde(deserialize_with = "crate::scalar::string")]
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,

    #[serde(default, skip_serializing_if = "MergeMode::is_replace")]
    pub merge: MergeMode,
}

impl TemplateVar {
    pub fn new<N, P, V>(name: N, package: P, value: V) -> Self
    where
        N: Into<String>,
        P: Into<String>,
        V: Into<String>,
    {
        Self {
            template: name.into(),
            package: package.into(),
            value: value.into(),
            separator: None,
            merge: MergeMode::default(),
        }
    }

    /// Substitute every placeholder with the matching package attribute.
    pub fn render(&self, package: &PackageRef) -> Result<String> {
        let invalid = |reason: String| Error::InvalidTemplate {
            variable: self.template.clone(),
            reason,
        };

        let mut out = String::with_capacity(self.value.len());
        let mut chars = self.value.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let mut key = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => key.push(c),
                            None => {
                                return Err(invalid(format!("unclosed placeholder '{{{key}'")));
                            }
                        }
                    }
                    let key = key.trim();
                    if key.is_empty() {
                        return Err(invalid("empty placeholder".to_string()));
                    }
                    let value = package
                        .attribute(key)
                        .ok_or_else(|| Error::MissingAttribute {
                            variable: self.template.clone(),
                            package: package.name.clone(),
                            attribute: key.to_string(),
                        })?;
                    out.push_str(&value);
                }
                '}' => return Err(invalid("unmatched '}'".to_string())),
                c => out.push(c),
            }
        }
        Ok(out)
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SetVar {
    pub set: String,
    #[serde(deserialize_with = "crate::scalar::string")]
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,

    #[serde(default, skip_serializing_if = "MergeMode::is_replace")]
    pub merge: MergeMode,
}

impl SetVar {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            set: name.into(),
            value: value.into(),
            separator: None,
            merge: MergeMode::default(),
        }
    }
}
