//! Named parameter sets for objects configured with a grouper.

use std::fmt;

use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::Grouper;
use crate::error::{GroupError, Result};

/// Ordered, serializable parameters of a named object.
///
/// Values are stored as JSON so that heterogeneous settings, including a
/// [`Grouper`](super::Grouper), live side by side and can be read back typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSet {
    name: String,
    parameters: IndexMap<String, Value>,
}

impl ParamSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: IndexMap::new(),
        }
    }

    pub fn insert<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        let key = key.into();
        let value = serde_json::to_value(value).map_err(|err| {
            GroupError::config(format!("parameter '{key}' is not serializable: {err}"))
        })?;
        self.parameters.insert(key, value);
        Ok(())
    }

    pub fn with<T: Serialize>(mut self, key: impl Into<String>, value: T) -> Result<Self> {
        self.insert(key, value)?;
        Ok(self)
    }

    /// Read parameter `key` back as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .parameters
            .get(key)
            .ok_or_else(|| GroupError::config(format!("no parameter '{key}'")))?;
        serde_json::from_value(value.clone())
            .map_err(|err| GroupError::config(format!("parameter '{key}': {err}")))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &IndexMap<String, Value> {
        &self.parameters
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (key, value)) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match as_grouper(value) {
                Some(grouper) => write!(f, "{key}={grouper}")?,
                None => write!(f, "{key}={value}")?,
            }
        }
        f.write_str(")")
    }
}

/// A stored value that deserializes as a grouper.
fn as_grouper(value: &Value) -> Option<Grouper> {
    value.get("group")?;
    Grouper::deserialize(value).ok()
}
