// Stem dictionary parsing.
//
// One stem per line: `word/FLAGS field:value ...`. The conventional
// leading entry-count line, comment lines and lines with leading
// whitespace are skipped.

use std::path::Path;

use hashbrown::HashMap;

use crate::DictError;
use crate::affix::{AffixConfig, FlagMode};
use crate::scanner::LineScanner;

/// A dictionary stem: surface text after input conversion, the flags that
/// link it to affix rule groups, and its morphological data fields.
///
/// Derived words reuse this type; their flags come from a prefix rule's
/// continuation component and their field map is copied, never shared,
/// from the parent.
#[derive(Debug, Clone, Default)]
pub struct Stem {
    pub word: String,
    pub flags: Vec<String>,
    /// Morphological fields keyed by tag name; duplicate keys accumulate
    /// values in order of appearance.
    pub morph: HashMap<String, Vec<String>>,
}

impl Stem {
    /// Parse one `word/FLAGS field:value ...` entry.
    ///
    /// `conversion` is the ICONV table, applied to the word portion only.
    /// The first whitespace token after the slash is the flag string;
    /// remaining tokens of the form `key:value` are morphological fields.
    pub fn parse_line(line: &str, flag_mode: FlagMode, conversion: &[(String, String)]) -> Stem {
        let (word_part, flag_part) = match line.split_once('/') {
            Some((word, rest)) => (word, Some(rest)),
            None => (line, None),
        };

        let word = apply_conversion(word_part.trim(), conversion);
        let mut flags = Vec::new();
        let mut morph: HashMap<String, Vec<String>> = HashMap::new();

        if let Some(rest) = flag_part {
            let mut fields = rest.split_whitespace();
            if let Some(flag_str) = fields.next() {
                flags = flag_mode.split(flag_str);
            }
            for field in fields {
                if let Some((key, value)) = field.split_once(':') {
                    morph
                        .entry(key.trim().to_string())
                        .or_default()
                        .push(value.trim().to_string());
                }
            }
        }

        Stem { word, flags, morph }
    }
}

/// Apply an ordered literal substring-replacement table, left to right,
/// each mapping applied globally.
pub fn apply_conversion(text: &str, table: &[(String, String)]) -> String {
    let mut out = text.to_string();
    for (from, to) in table {
        if out.contains(from.as_str()) {
            out = out.replace(from.as_str(), to);
        }
    }
    out
}

/// Parse a dictionary file from disk, decoding and tokenizing it per the
/// affix file's configuration.
pub fn from_path(path: &Path, config: &AffixConfig) -> Result<Vec<Stem>, DictError> {
    crate::check_regular_file(path)?;
    let bytes = std::fs::read(path)?;
    Ok(parse_bytes(&bytes, config))
}

/// Parse dictionary contents into an ordered stem sequence.
///
/// Skipped lines: blank/whitespace-only, `#`-prefixed, leading-whitespace,
/// and pure decimal count lines. Unknown flags on a stem are not an error;
/// they are inert during generation.
pub fn parse_bytes(bytes: &[u8], config: &AffixConfig) -> Vec<Stem> {
    let mut scanner = LineScanner::new(bytes, config.encoding);
    let mut stems = Vec::new();

    while let Some((line, _)) = scanner.next_line() {
        if line.starts_with(['#', ' ', '\t']) {
            continue;
        }
        let entry = line.trim();
        if entry.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        stems.push(Stem::parse_line(entry, config.flag_mode, &config.iconv));
    }

    log::debug!("parsed {} dictionary stems", stems.len());
    stems
}
