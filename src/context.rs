//! Shared state for one scenario run.

use serde_json::Value;
use std::collections::HashMap;

/// Key/value bag handed to every step of a scenario.
///
/// The runner creates one per scenario and lends it to each step's `run`.
/// Steps read values produced by earlier steps (for example a port bound at
/// runtime) and may write values for later ones.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    vars: HashMap<String, Value>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    /// String value stored under `key`, if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.vars.get(key).and_then(Value::as_str)
    }

    /// Port stored under `key`. Accepts numbers and numeric strings.
    pub fn get_port(&self, key: &str) -> Option<u16> {
        match self.vars.get(key)? {
            Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.vars.insert(key.into(), value.into())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.vars.remove(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
