use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::GoCtorError;

/// Prefix prepended to the type name to build the constructor's name.
pub const CONSTRUCTOR_PREFIX: &str = "New";

/// What to do when the requested type is not declared in the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingTypePolicy {
    /// Insert a zero-field constructor at the start of the declaration body.
    #[default]
    Prepend,
    /// Refuse with [`GoCtorError::TypeNotFound`].
    Fail,
}

/// Everything a single generation run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
    /// The Go file to rewrite in place.
    pub path: PathBuf,
    /// The type the constructor returns.
    pub type_name: String,
    pub missing_type: MissingTypePolicy,
}

impl GenerateConfig {
    /// Creates a config with the tolerant missing-type policy.
    ///
    /// ## Errors
    /// Returns an error if `type_name` is not a Go identifier.
    pub fn new<P: Into<PathBuf>, S: Into<String>>(
        path: P,
        type_name: S,
    ) -> Result<Self, GoCtorError> {
        let type_name = type_name.into();
        if !is_go_identifier(&type_name) {
            return Err(GoCtorError::InvalidTypeName { name: type_name });
        }

        Ok(Self {
            path: path.into(),
            type_name,
            missing_type: MissingTypePolicy::default(),
        })
    }

    /// Sets the missing-type policy.
    pub fn with_missing_type(mut self, policy: MissingTypePolicy) -> Self {
        self.missing_type = policy;
        self
    }

    /// Name of the constructor this run generates, e.g. `NewServer`.
    pub fn constructor_name(&self) -> String {
        constructor_name(&self.type_name)
    }
}

/// Builds the constructor name for a type.
pub fn constructor_name(type_name: &str) -> String {
    format!("{CONSTRUCTOR_PREFIX}{type_name}")
}

const GO_KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Returns true when `name` can name a Go type.
///
/// The blank identifier is rejected since a `_` type cannot be referenced.
pub fn is_go_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if !(first == '_' || first.is_alphabetic()) {
        return false;
    }

    name != "_"
        && chars.all(|ch| ch == '_' || ch.is_alphanumeric())
        && !GO_KEYWORDS.contains(&name)
}
