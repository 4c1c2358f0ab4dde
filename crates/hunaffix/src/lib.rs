//! Hunspell affix/dictionary expansion engine.
//!
//! This crate parses the Hunspell textual affix (`.aff`) and dictionary
//! (`.dic`) formats and computes the closure of all surface word forms
//! obtainable by applying prefix/suffix rules to each stem.
//!
//! # Architecture
//!
//! - [`scanner`] -- Text decoding and line scanning with byte offsets
//! - [`affix`] -- Affix rule parser producing an [`affix::AffixConfig`]
//! - [`dictionary`] -- Stem dictionary parser producing [`dictionary::Stem`] records
//! - [`generate`] -- Breadth-first closure over conditional string rewrites
//!
//! The single entry point for consumers is [`compute_word_set`].

pub mod affix;
pub mod dictionary;
pub mod generate;
pub mod scanner;

use std::path::{Path, PathBuf};

use hashbrown::HashSet;

/// Error type for affix and dictionary parsing.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("not a regular file: {0}")]
    NotARegularFile(PathBuf),
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    /// The file does not fit the format at the named directive.
    #[error("malformed {directive} directive at byte offset {offset}")]
    Format {
        directive: &'static str,
        offset: usize,
    },
    #[error("unsupported feature: {0}")]
    Unsupported(String),
    #[error("invalid affix definition: {0}")]
    InvalidAffix(String),
}

/// Check that a path names an existing regular file, before any parsing.
pub(crate) fn check_regular_file(path: &Path) -> Result<(), DictError> {
    if !path.exists() {
        return Err(DictError::FileNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(DictError::NotARegularFile(path.to_path_buf()));
    }
    Ok(())
}

/// Compute the complete deduplicated set of surface word forms for the
/// given affix file and dictionary file.
///
/// The dictionary is decoded with the encoding declared by the affix
/// file's `SET` directive and tokenized per its `FLAG` mode. Generation
/// uses the default derivation bounds; see [`generate::generate`] for
/// explicit control.
pub fn compute_word_set(
    affix_path: &Path,
    dictionary_path: &Path,
) -> Result<HashSet<String>, DictError> {
    let config = affix::AffixConfig::from_path(affix_path)?;
    let stems = dictionary::from_path(dictionary_path, &config)?;
    Ok(generate::generate(
        &config,
        stems,
        &generate::GenerateOptions::default(),
    ))
}
