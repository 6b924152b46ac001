//! Definitions loaded from JSON or YAML documents.
//!
//! A document maps identifiers to either a definition string or a structured
//! class spec:
//!
//! ```yaml
//! Logger:
//!   class: ConsoleLogger
//!   params:
//!     level: debug
//!     sink: "@Stderr"
//! Cache: "@Logger"
//! Db: "#primary"
//! ```
//!
//! String parameter values starting with `@` or `#` become identifier
//! references; other scalars become `String`, `i64`, `f64` or `bool` values,
//! anything else a `serde_json::Value`.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::definition::Definition;
use crate::error::{DiError, DiResult};
use crate::identifier::{ALIAS_SIGIL, VARIANT_SIGIL};
use crate::params::{Arg, Params};

/// One entry of a definitions document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DefinitionConfig {
    /// String form, parsed like [`Definition::parse`]
    Reference(String),
    /// `make(class, params)`
    Spec {
        class: String,
        #[serde(default)]
        params: BTreeMap<String, Value>,
    },
}

impl DefinitionConfig {
    pub fn into_definition(self) -> DiResult<Definition> {
        match self {
            DefinitionConfig::Reference(raw) => Definition::parse(&raw),
            DefinitionConfig::Spec { class, params } => {
                let params = params
                    .into_iter()
                    .fold(Params::new(), |params, (name, value)| {
                        params.with(name, param_arg(value))
                    });
                Ok(Definition::class(class, params))
            }
        }
    }
}

/// A whole definitions document, ordered by identifier.
///
/// # Examples
///
/// ```
/// use ferrous_wire::config::DefinitionsConfig;
///
/// let config = DefinitionsConfig::from_json(r#"{
///     "Logger": { "class": "ConsoleLogger", "params": { "level": "debug" } },
///     "Cache": "@Logger"
/// }"#).unwrap();
/// assert_eq!(config.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct DefinitionsConfig {
    definitions: BTreeMap<String, DefinitionConfig>,
}

impl DefinitionsConfig {
    pub fn from_json(json: &str) -> DiResult<Self> {
        serde_json::from_str(json).map_err(|e| DiError::Config(format!("json: {}", e)))
    }

    pub fn from_yaml(yaml: &str) -> DiResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| DiError::Config(format!("yaml: {}", e)))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DefinitionConfig> {
        self.definitions.get(id)
    }

    /// Converts every entry; invalid definition strings surface per entry.
    pub fn into_definitions(self) -> Vec<(String, DiResult<Definition>)> {
        self.definitions
            .into_iter()
            .map(|(id, entry)| (id, entry.into_definition()))
            .collect()
    }
}

fn param_arg(value: Value) -> Arg {
    match value {
        Value::String(s) if s.starts_with(ALIAS_SIGIL) || s.starts_with(VARIANT_SIGIL) => {
            Arg::Ref(s)
        }
        Value::String(s) => Arg::value(s),
        Value::Bool(b) => Arg::value(b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Arg::value(i),
            (None, Some(f)) => Arg::value(f),
            (None, None) => Arg::value(Value::Number(n)),
        },
        other => Arg::value(other),
    }
}
