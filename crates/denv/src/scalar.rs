// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Deserializers that accept any YAML scalar where a string is stored.
//!
//! `value: 1` and `version: 17` are read as `"1"` and `"17"`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

fn to_string(value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err("expected a scalar, found null".to_string()),
        Value::Sequence(_) => Err("expected a scalar, found a sequence".to_string()),
        Value::Mapping(_) => Err("expected a scalar, found a mapping".to_string()),
        Value::Tagged(tagged) => to_string(tagged.value),
    }
}

pub(crate) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    to_string(Value::deserialize(deserializer)?).map_err(D::Error::custom)
}

pub(crate) fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => to_string(value).map(Some).map_err(D::Error::custom),
    }
}
