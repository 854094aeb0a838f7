//! Error types for loading and runtime lookups.

use std::fmt;

use thiserror::Error;

/// Which kind of named item a lookup was looking for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LookupKind {
    Bone,
    Slot,
    Skin,
    Attachment,
    Animation,
    Region,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LookupKind::Bone => "bone",
            LookupKind::Slot => "slot",
            LookupKind::Skin => "skin",
            LookupKind::Attachment => "attachment",
            LookupKind::Animation => "animation",
            LookupKind::Region => "atlas region",
        };
        f.write_str(s)
    }
}

/// Failures raised while building templates from atlas text or skeleton JSON.
/// A failed load never yields a partial template.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("skeleton json parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("atlas line {line}: {reason}")]
    Atlas { line: usize, reason: String },

    #[error("atlas line {line}: unknown {field} value '{value}'")]
    UnknownKeyword {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("atlas line {line}: '{key}' expects {expected} values, got {actual}")]
    TupleArity {
        line: usize,
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("{kind} '{name}' referenced by {referrer} not found")]
    MissingReference {
        kind: LookupKind,
        name: String,
        referrer: String,
    },

    #[error("invalid color '{0}': expected 8 hex digits (rrggbbaa)")]
    InvalidColor(String),

    #[error("unsupported attachment type '{kind}' for attachment '{name}'")]
    UnsupportedAttachment { kind: String, name: String },

    #[error("keyframes must be non-decreasing in time for '{0}'")]
    UnsortedKeyframes(String),
}

/// Failures of runtime operations that take a name from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkeletonError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: LookupKind, name: String },
}

impl SkeletonError {
    pub(crate) fn not_found(kind: LookupKind, name: &str) -> Self {
        Self::NotFound {
            kind,
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_kind_and_item() {
        let err = SkeletonError::not_found(LookupKind::Skin, "goblin");
        assert_eq!(err.to_string(), "skin not found: goblin");
    }

    #[test]
    fn missing_reference_message() {
        let err = LoadError::MissingReference {
            kind: LookupKind::Bone,
            name: "hip".into(),
            referrer: "slot 'torso'".into(),
        };
        assert_eq!(
            err.to_string(),
            "bone 'hip' referenced by slot 'torso' not found"
        );
    }
}
