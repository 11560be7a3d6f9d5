//! Flat diagnostics snapshot of a component.

use std::collections::BTreeMap;
use std::fmt;

/// A snapshot value: number, flag, or label.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

/// Ordered key/value map of the externally interesting fields of one
/// component. Consumed by rendering and diagnostics; never read back by
/// the engine.
pub type Snapshot = BTreeMap<String, Value>;

/// Convenience for building snapshots without repeating `.into()` noise.
pub fn put(snapshot: &mut Snapshot, key: &str, value: impl Into<Value>) {
    snapshot.insert(key.to_owned(), value.into());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_display_plainly() {
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Text("FULL".into()).to_string(), "FULL");
    }

    #[test]
    fn snapshot_is_ordered() {
        let mut snap = Snapshot::new();
        put(&mut snap, "volume", 1.0);
        put(&mut snap, "level", 0.5);
        let keys: Vec<_> = snap.keys().cloned().collect();
        assert_eq!(keys, vec!["level".to_string(), "volume".to_string()]);
    }
}
