//! Error types.
//!
//! `DofError` covers configuration errors that abort the run before any item
//! is processed. `ExpandError` is a soft error: the expander reports it and
//! substitutes nothing.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised while building or running a pipeline.
#[derive(Error, Debug)]
pub enum DofError {
    #[error("regex error compiling '{pattern}'")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid directory exclude pattern '{pattern}'")]
    InvalidDirPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("recipe '{0}' not found")]
    RecipeNotFound(String),

    #[error("invalid sequence '{0}' (example: dof -s 1..10)")]
    InvalidSequence(String),

    #[error("option -s requires an argument (example: dof -s 1..10)")]
    MissingSequence,

    #[error("unknown option [{0}]")]
    UnknownOption(char),

    #[error("cannot read configuration {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

/// Soft errors from expanding a single `%` escape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    #[error("unknown element `%{0}'")]
    UnknownVariable(String),
}
