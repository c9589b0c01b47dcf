use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::HostState;

/// Scalar published through the avatar's variable store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoreValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for StoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreValue::Bool(flag) => write!(f, "{flag}"),
            StoreValue::Integer(value) => write!(f, "{value}"),
            StoreValue::Number(value) => write!(f, "{value}"),
            StoreValue::Text(text) => write!(f, "{text:?}"),
        }
    }
}

/// One flat namespace with no owner tag on its entries.
#[derive(Debug, Default)]
pub(super) struct StoreHost {
    values: BTreeMap<String, StoreValue>,
}

impl StoreHost {
    pub(super) fn iter(&self) -> impl Iterator<Item = (&String, &StoreValue)> {
        self.values.iter()
    }
}

impl HostState {
    pub fn store_set(&mut self, key: &str, value: Option<StoreValue>) {
        match value {
            Some(value) => {
                self.log(format!("store.{key} = {value}"));
                self.store.values.insert(key.to_string(), value);
            }
            None => {
                self.log(format!("store.{key} = nil"));
                self.store.values.remove(key);
            }
        }
    }

    pub fn store_get(&self, key: &str) -> Option<&StoreValue> {
        self.store.values.get(key)
    }

    pub fn store_keys(&self) -> Vec<String> {
        self.store.values.keys().cloned().collect()
    }

    pub fn take_store(&mut self) -> BTreeMap<String, StoreValue> {
        self.log("store.clear");
        std::mem::take(&mut self.store.values)
    }
}
