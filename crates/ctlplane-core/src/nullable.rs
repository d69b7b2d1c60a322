//! `Nullable<T>`: the absent/null/value PATCH idiom used on every Update
//! DTO for a field that may be explicitly cleared.
//!
//! Serializes as: absent field -> omitted; explicit null -> `null`;
//! present value -> the value itself. Deserializes the inverse.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Nullable<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Nullable<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Nullable::Absent)
    }

    /// Per the resolved Open Question: only the `Null` variant is nil. An
    /// explicit empty value (e.g. `""`) is not treated as nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Nullable::Null)
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Nullable::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Nullable<&T> {
        match self {
            Nullable::Absent => Nullable::Absent,
            Nullable::Null => Nullable::Null,
            Nullable::Value(v) => Nullable::Value(v),
        }
    }

    /// Apply this PATCH-style field onto an existing `Option<T>`, returning
    /// the field unchanged when absent.
    pub fn apply(self, existing: Option<T>) -> Option<T> {
        match self {
            Nullable::Absent => existing,
            Nullable::Null => None,
            Nullable::Value(v) => Some(v),
        }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Nullable::Absent => unreachable!("Absent fields must use skip_serializing_if"),
            Nullable::Null => serializer.serialize_none(),
            Nullable::Value(v) => serializer.serialize_some(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|opt| match opt {
            Some(v) => Nullable::Value(v),
            None => Nullable::Null,
        })
    }
}

/// Helper for `#[serde(default, skip_serializing_if = "...")]` field attrs.
pub fn nullable_is_absent<T>(value: &Nullable<T>) -> bool {
    value.is_absent()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, Default)]
    struct Patch {
        #[serde(default, skip_serializing_if = "nullable_is_absent")]
        description: Nullable<String>,
    }

    #[test]
    fn absent_field_is_omitted() {
        let patch = Patch::default();
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn explicit_null_round_trips() {
        let patch = Patch { description: Nullable::Null };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"description":null}"#);
        let back: Patch = serde_json::from_str(&json).unwrap();
        assert_eq!(back.description, Nullable::Null);
    }

    #[test]
    fn value_round_trips() {
        let patch = Patch { description: Nullable::Value("hi".to_string()) };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"description":"hi"}"#);
        let back: Patch = serde_json::from_str(&json).unwrap();
        assert_eq!(back.description, Nullable::Value("hi".to_string()));
    }

    #[test]
    fn apply_absent_keeps_existing() {
        let n: Nullable<String> = Nullable::Absent;
        assert_eq!(n.apply(Some("old".to_string())), Some("old".to_string()));
    }

    #[test]
    fn apply_null_clears() {
        let n: Nullable<String> = Nullable::Null;
        assert_eq!(n.apply(Some("old".to_string())), None);
    }

    #[test]
    fn empty_string_is_not_nil() {
        let n: Nullable<String> = Nullable::Value(String::new());
        assert!(!n.is_nil());
    }
}
