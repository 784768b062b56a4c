//! Task identities.
//!
//! Stores key tasks by whatever the source data already uses: a numeric
//! primary key, a string key, or raw bytes (e.g. a binary UUID column).
//! `TaskId` keeps all three behind one comparable, hashable type.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Opaque task identity.
///
/// Ordering is variant-first (`Num < Str < Bytes`), then by value. Stores
/// that need a stable `take` order may rely on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Num(i64),
    Str(String),
    Bytes(Vec<u8>),
}

impl TaskId {
    /// Fresh ULID-backed identity for tasks without a natural key.
    ///
    /// ULIDs sort by creation time, so generated ids keep insertion order
    /// when a store orders by id.
    pub fn generate() -> Self {
        Self::Str(Ulid::new().to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
            Self::Bytes(bytes) => {
                f.write_str("0x")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<i64> for TaskId {
    fn from(n: i64) -> Self {
        Self::Num(n)
    }
}

impl From<i32> for TaskId {
    fn from(n: i32) -> Self {
        Self::Num(i64::from(n))
    }
}

impl From<u32> for TaskId {
    fn from(n: u32) -> Self {
        Self::Num(i64::from(n))
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<Vec<u8>> for TaskId {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for TaskId {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<Ulid> for TaskId {
    fn from(ulid: Ulid) -> Self {
        Self::Str(ulid.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_each_variant() {
        assert_eq!(TaskId::from(42).to_string(), "42");
        assert_eq!(TaskId::from("user-7").to_string(), "user-7");
        assert_eq!(TaskId::from(vec![0x0a, 0xff]).to_string(), "0x0aff");
    }

    #[test]
    fn generated_ids_are_unique_strings() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().map(str::len), Some(26));
    }

    #[test]
    fn serializes_untagged() {
        assert_eq!(serde_json::to_value(TaskId::from(3)).unwrap(), serde_json::json!(3));
        assert_eq!(
            serde_json::to_value(TaskId::from("a")).unwrap(),
            serde_json::json!("a")
        );
        let back: TaskId = serde_json::from_value(serde_json::json!("b")).unwrap();
        assert_eq!(back, TaskId::from("b"));
    }
}
