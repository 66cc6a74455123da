use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by go-ctor operations.
#[derive(Debug, Error)]
pub enum GoCtorError {
    #[error("`{name}` is not a valid Go type name")]
    InvalidTypeName { name: String },

    #[error("Failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse `{path}` at {line}:{column}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Constructor `{name}` already exists in `{path}`")]
    DuplicateConstructor { path: PathBuf, name: String },

    #[error("Type `{type_name}` is not declared in `{path}`")]
    TypeNotFound { path: PathBuf, type_name: String },

    #[error("Could not format `{path}`: {message}")]
    Format { path: PathBuf, message: String },

    #[error("Could not write `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Go grammar could not be loaded: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}
