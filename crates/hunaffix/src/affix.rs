// Affix rule file parsing.
//
// The affix file is a line-oriented directive format. Each directive is
// dispatched on the exact keyword of its first whitespace token; multi-line
// directives declare a count and consume that many follow-up lines carrying
// the same keyword. A SET directive naming a different encoding than the
// one currently in effect discards all accumulated state and restarts the
// whole parse under the new encoding.

use std::path::Path;
use std::sync::OnceLock;

use hashbrown::HashMap;
use regex::Regex;

use crate::DictError;
use crate::scanner::{Encoding, LineScanner};

/// Whether a rule group applies at the start or the end of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffixKind {
    Prefix,
    Suffix,
}

impl AffixKind {
    fn directive(self) -> &'static str {
        match self {
            AffixKind::Prefix => "PFX",
            AffixKind::Suffix => "SFX",
        }
    }
}

/// Flag tokenization mode set by the FLAG directive.
///
/// The numeric comma-separated mode (`FLAG num`) is rejected as
/// unsupported rather than silently mis-tokenized. Any value other than
/// `long` or `num` selects single-character flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagMode {
    #[default]
    Single,
    Long,
}

impl FlagMode {
    fn from_value(value: &str) -> Result<FlagMode, DictError> {
        match value.to_ascii_lowercase().as_str() {
            "long" => Ok(FlagMode::Long),
            "num" => Err(DictError::Unsupported(
                "numeric flag mode (FLAG num)".to_string(),
            )),
            _ => Ok(FlagMode::Single),
        }
    }

    /// Split a flag string into individual flags. In long mode an odd
    /// trailing character is dropped.
    pub fn split(self, flags: &str) -> Vec<String> {
        match self {
            FlagMode::Single => flags.chars().map(String::from).collect(),
            FlagMode::Long => {
                let chars: Vec<char> = flags.chars().collect();
                chars
                    .chunks_exact(2)
                    .map(|pair| pair.iter().collect())
                    .collect()
            }
        }
    }

    /// Flag length enforced on PFX/SFX body lines.
    fn flag_len(self) -> usize {
        match self {
            FlagMode::Single => 1,
            FlagMode::Long => 2,
        }
    }
}

/// One conditional string rewrite in an affix group. Immutable once parsed.
#[derive(Debug)]
pub struct Rule {
    /// Literal substring removed before the affix is attached. Empty means
    /// "remove nothing" (the `0` sentinel in the file).
    pub stripping: String,
    /// Literal substring appended or prepended. For prefix rules this is
    /// the primary component only; see `continuation`.
    pub affix: String,
    /// Continuation flag string from the slash-separated secondary
    /// component of a prefix rule's affix cell. A word derived through the
    /// rule carries these flags and can take a further derivation step.
    /// The file format provides this channel for prefix rules only.
    pub continuation: Option<String>,
    /// Condition compiled with the anchor for this group's end of the word
    /// (`^...` for prefixes, `...$` for suffixes).
    pub condition: Regex,
    /// Free-form tags inherited by words derived through this rule.
    pub morphological_fields: Vec<String>,
}

/// An ordered rule group introduced by a PFX/SFX header, keyed by flag.
#[derive(Debug)]
pub struct AffixGroup {
    pub kind: AffixKind,
    /// Whether this group may combine, in one derivation step, with a
    /// cross-product group of the opposite kind.
    pub cross_product: bool,
    pub rules: Vec<Rule>,
}

/// Aggregate of everything an affix file declares.
///
/// The suggestion and compounding options are stored for fidelity with the
/// format; word-form generation consumes only the encoding, the flag mode,
/// the conversion tables and the rule groups.
#[derive(Debug, Default)]
pub struct AffixConfig {
    pub encoding: Encoding,
    pub flag_mode: FlagMode,
    pub complex_prefixes: bool,
    pub lang: Option<String>,
    pub ignore: Option<String>,
    pub af: Vec<String>,
    pub am: Vec<String>,

    // Suggestion options
    pub key: Vec<String>,
    pub try_chars: Option<String>,
    pub nosuggest: Option<String>,
    pub maxcpdsugs: Option<u32>,
    pub maxngramsugs: Option<u32>,
    pub maxdiff: u32,
    pub onlymaxdiff: bool,
    pub nosplitsugs: bool,
    pub sugswithdots: bool,
    pub rep: Vec<(String, String)>,
    pub map: Vec<(String, String)>,
    pub phone: Option<String>,
    pub warn: Option<String>,
    pub forbidwarn: bool,

    // Compounding options (recognized for format fidelity, never expanded)
    pub breaking: Vec<String>,
    pub compound_rules: Vec<String>,
    pub compound_min: u32,
    pub compound_flag: Option<String>,
    pub compound_begin: Option<String>,
    pub compound_last: Option<String>,
    pub compound_middle: Option<String>,
    pub only_in_compound: Option<String>,
    pub compound_permit_flag: Option<String>,
    pub compound_forbid_flag: Option<String>,
    pub compound_root: Option<String>,
    pub compound_word_max: Option<u32>,
    pub check_compound_dup: bool,
    pub check_compound_rep: bool,
    pub check_compound_case: bool,
    pub check_compound_triple: bool,
    pub simplified_triple: bool,
    pub check_compound_pattern: Vec<Vec<String>>,
    pub force_ucase: Option<String>,
    pub compound_syllable: Option<String>,
    pub syllable_num: Option<String>,

    // Other options
    pub circumfix: Option<String>,
    pub forbidden_word: Option<String>,
    pub fullstrip: bool,
    pub keepcase: Option<String>,
    pub iconv: Vec<(String, String)>,
    pub oconv: Vec<(String, String)>,
    pub lemma_present: Option<String>,
    pub needaffix: Option<String>,
    pub pseudo_root: Option<String>,
    pub substandard: Option<String>,
    pub wordchars: Option<String>,
    pub checksharps: bool,

    /// Rule groups keyed by flag.
    pub groups: HashMap<String, AffixGroup>,
}

impl AffixConfig {
    fn new(encoding: Encoding) -> AffixConfig {
        AffixConfig {
            encoding,
            maxdiff: 5,
            compound_min: 3,
            ..AffixConfig::default()
        }
    }

    /// Parse an affix file from disk.
    pub fn from_path(path: &Path) -> Result<AffixConfig, DictError> {
        crate::check_regular_file(path)?;
        let bytes = std::fs::read(path)?;
        AffixConfig::parse_bytes(&bytes)
    }

    /// Parse affix file contents.
    ///
    /// The encoding-restart protocol is an explicit outer retry loop: a
    /// single pass either completes, fails, or requests a restart under a
    /// new encoding. Each encoding is tried at most once, so conflicting
    /// SET directives cannot loop.
    pub fn parse_bytes(bytes: &[u8]) -> Result<AffixConfig, DictError> {
        let mut encoding = Encoding::default();
        let mut tried = vec![encoding];
        loop {
            match parse_pass(bytes, encoding) {
                Ok(config) => return Ok(config),
                Err(PassError::Restart(new_encoding, offset)) => {
                    if tried.contains(&new_encoding) {
                        return Err(DictError::Format {
                            directive: "SET",
                            offset,
                        });
                    }
                    log::debug!(
                        "SET {} differs from {}; restarting parse",
                        new_encoding.name(),
                        encoding.name()
                    );
                    tried.push(new_encoding);
                    encoding = new_encoding;
                }
                Err(PassError::Fatal(err)) => return Err(err),
            }
        }
    }
}

/// Outcome of one parse pass that is not a finished config.
enum PassError {
    /// A SET directive declared a different encoding; the whole file must
    /// be reparsed from scratch. Carries the directive's byte offset.
    Restart(Encoding, usize),
    Fatal(DictError),
}

impl From<DictError> for PassError {
    fn from(err: DictError) -> PassError {
        PassError::Fatal(err)
    }
}

fn parse_pass(bytes: &[u8], encoding: Encoding) -> Result<AffixConfig, PassError> {
    let mut config = AffixConfig::new(encoding);
    let mut scanner = LineScanner::new(bytes, encoding);

    while let Some((raw, offset)) = scanner.next_line() {
        let line = raw.trim();
        let keyword = line.split_whitespace().next().unwrap_or("");
        let value = line[keyword.len()..].trim();

        match keyword {
            // General options
            "SET" => {
                let name = require_value(value, "SET", offset)?;
                let declared = Encoding::from_name(name)
                    .ok_or_else(|| DictError::Unsupported(format!("encoding {name}")))?;
                if declared != encoding {
                    return Err(PassError::Restart(declared, offset));
                }
            }
            "FLAG" => {
                config.flag_mode = FlagMode::from_value(require_value(value, "FLAG", offset)?)?;
            }
            "COMPLEXPREFIXES" => config.complex_prefixes = true,
            "LANG" => config.lang = scalar(value, "LANG", offset)?,
            "IGNORE" => config.ignore = scalar(value, "IGNORE", offset)?,
            "AF" => parse_counted_values(&mut scanner, "AF", value, offset, &mut config.af)?,
            "AM" => parse_counted_values(&mut scanner, "AM", value, offset, &mut config.am)?,

            // Suggestion options
            "KEY" => {
                config.key = require_value(value, "KEY", offset)?
                    .split('|')
                    .map(str::to_string)
                    .collect();
            }
            "TRY" => config.try_chars = scalar(value, "TRY", offset)?,
            "NOSUGGEST" => config.nosuggest = scalar(value, "NOSUGGEST", offset)?,
            "MAXCPDSUGS" => config.maxcpdsugs = Some(parse_int(value, "MAXCPDSUGS", offset)?),
            "MAXNGRAMSUGS" => config.maxngramsugs = Some(parse_int(value, "MAXNGRAMSUGS", offset)?),
            "MAXDIFF" => {
                let n = parse_int(value, "MAXDIFF", offset)?;
                if !(1..=10).contains(&n) {
                    return Err(DictError::Format {
                        directive: "MAXDIFF",
                        offset,
                    }
                    .into());
                }
                config.maxdiff = n;
            }
            "ONLYMAXDIFF" => config.onlymaxdiff = true,
            "NOSPLITSUGS" => config.nosplitsugs = true,
            "SUGSWITHDOTS" => config.sugswithdots = true,
            "REP" => parse_counted_pairs(&mut scanner, "REP", value, offset, &mut config.rep)?,
            "MAP" => parse_map_block(&mut scanner, value, offset, &mut config.map)?,
            "PHONE" => config.phone = scalar(value, "PHONE", offset)?,
            "WARN" => config.warn = scalar(value, "WARN", offset)?,
            "FORBIDWARN" => config.forbidwarn = true,

            // Compounding options
            "BREAK" => {
                parse_counted_values(&mut scanner, "BREAK", value, offset, &mut config.breaking)?;
            }
            "COMPOUNDRULE" => parse_counted_values(
                &mut scanner,
                "COMPOUNDRULE",
                value,
                offset,
                &mut config.compound_rules,
            )?,
            "COMPOUNDMIN" => config.compound_min = parse_int(value, "COMPOUNDMIN", offset)?,
            "COMPOUNDFLAG" => config.compound_flag = scalar(value, "COMPOUNDFLAG", offset)?,
            "COMPOUNDBEGIN" => config.compound_begin = scalar(value, "COMPOUNDBEGIN", offset)?,
            "COMPOUNDLAST" => config.compound_last = scalar(value, "COMPOUNDLAST", offset)?,
            "COMPOUNDMIDDLE" => config.compound_middle = scalar(value, "COMPOUNDMIDDLE", offset)?,
            "ONLYINCOMPOUND" => config.only_in_compound = scalar(value, "ONLYINCOMPOUND", offset)?,
            "COMPOUNDPERMITFLAG" => {
                config.compound_permit_flag = scalar(value, "COMPOUNDPERMITFLAG", offset)?;
            }
            "COMPOUNDFORBIDFLAG" => {
                config.compound_forbid_flag = scalar(value, "COMPOUNDFORBIDFLAG", offset)?;
            }
            "COMPOUNDROOT" => config.compound_root = scalar(value, "COMPOUNDROOT", offset)?,
            "COMPOUNDWORDMAX" => {
                config.compound_word_max = Some(parse_int(value, "COMPOUNDWORDMAX", offset)?);
            }
            "CHECKCOMPOUNDDUP" => config.check_compound_dup = true,
            "CHECKCOMPOUNDREP" => config.check_compound_rep = true,
            "CHECKCOMPOUNDCASE" => config.check_compound_case = true,
            "CHECKCOMPOUNDTRIPLE" => config.check_compound_triple = true,
            "SIMPLIFIEDTRIPLE" => config.simplified_triple = true,
            "CHECKCOMPOUNDPATTERN" => parse_pattern_block(
                &mut scanner,
                value,
                offset,
                &mut config.check_compound_pattern,
            )?,
            "FORCEUCASE" => config.force_ucase = scalar(value, "FORCEUCASE", offset)?,
            "COMPOUNDSYLLABLE" => {
                config.compound_syllable = scalar(value, "COMPOUNDSYLLABLE", offset)?;
            }
            "SYLLABLENUM" => config.syllable_num = scalar(value, "SYLLABLENUM", offset)?,

            // Affix creation
            "PFX" => parse_affix_block(&mut scanner, &mut config, AffixKind::Prefix, value, offset)?,
            "SFX" => parse_affix_block(&mut scanner, &mut config, AffixKind::Suffix, value, offset)?,

            // Other options
            "CIRCUMFIX" => config.circumfix = scalar(value, "CIRCUMFIX", offset)?,
            "FORBIDDENWORD" => config.forbidden_word = scalar(value, "FORBIDDENWORD", offset)?,
            "FULLSTRIP" => config.fullstrip = true,
            "KEEPCASE" => config.keepcase = scalar(value, "KEEPCASE", offset)?,
            "ICONV" => parse_counted_pairs(&mut scanner, "ICONV", value, offset, &mut config.iconv)?,
            "OCONV" => parse_counted_pairs(&mut scanner, "OCONV", value, offset, &mut config.oconv)?,
            "LEMMA_PRESENT" => config.lemma_present = scalar(value, "LEMMA_PRESENT", offset)?,
            "NEEDAFFIX" => config.needaffix = scalar(value, "NEEDAFFIX", offset)?,
            "PSEUDOROOT" => config.pseudo_root = scalar(value, "PSEUDOROOT", offset)?,
            "SUBSTANDARD" => config.substandard = scalar(value, "SUBSTANDARD", offset)?,
            "WORDCHARS" => config.wordchars = scalar(value, "WORDCHARS", offset)?,
            "CHECKSHARPS" => config.checksharps = true,

            // Unknown directives and comments are ignored.
            _ => {}
        }
    }

    Ok(config)
}

/// The directive's value with surrounding whitespace removed; a missing
/// value is a format error.
fn require_value<'a>(
    value: &'a str,
    directive: &'static str,
    offset: usize,
) -> Result<&'a str, DictError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DictError::Format { directive, offset });
    }
    Ok(trimmed)
}

fn scalar(
    value: &str,
    directive: &'static str,
    offset: usize,
) -> Result<Option<String>, DictError> {
    Ok(Some(require_value(value, directive, offset)?.to_string()))
}

fn parse_int(value: &str, directive: &'static str, offset: usize) -> Result<u32, DictError> {
    require_value(value, directive, offset)?
        .parse()
        .map_err(|_| DictError::Format { directive, offset })
}

/// Pull the next line of a counted block; running out of input is a format
/// error against the block's directive.
fn next_block_line(
    scanner: &mut LineScanner<'_>,
    directive: &'static str,
) -> Result<(String, usize), DictError> {
    scanner.next_line().ok_or(DictError::Format {
        directive,
        offset: scanner.offset(),
    })
}

/// Split a block body line into its keyword and remainder, enforcing that
/// the keyword matches the block's directive.
fn block_body<'a>(
    line: &'a str,
    directive: &'static str,
    offset: usize,
) -> Result<&'a str, DictError> {
    let line = line.trim();
    let keyword = line.split_whitespace().next().unwrap_or("");
    if keyword != directive {
        return Err(DictError::Format { directive, offset });
    }
    Ok(line[keyword.len()..].trim())
}

/// `<KEYWORD> <n>` followed by n lines `<KEYWORD> <value>`; each value is
/// appended to an ordered list.
fn parse_counted_values(
    scanner: &mut LineScanner<'_>,
    directive: &'static str,
    header_value: &str,
    header_offset: usize,
    out: &mut Vec<String>,
) -> Result<(), DictError> {
    let count = parse_int(header_value, directive, header_offset)?;
    for _ in 0..count {
        let (line, offset) = next_block_line(scanner, directive)?;
        let rest = block_body(&line, directive, offset)?;
        out.push(require_value(rest, directive, offset)?.to_string());
    }
    Ok(())
}

/// `<KEYWORD> <n>` followed by n lines `<KEYWORD> <key> <value>`; builds an
/// ordered key-to-value table. The value keeps any internal whitespace.
fn parse_counted_pairs(
    scanner: &mut LineScanner<'_>,
    directive: &'static str,
    header_value: &str,
    header_offset: usize,
    out: &mut Vec<(String, String)>,
) -> Result<(), DictError> {
    let count = parse_int(header_value, directive, header_offset)?;
    for _ in 0..count {
        let (line, offset) = next_block_line(scanner, directive)?;
        let rest = block_body(&line, directive, offset)?;
        let key = rest.split_whitespace().next().unwrap_or("");
        if key.is_empty() {
            return Err(DictError::Format { directive, offset });
        }
        let value = rest[key.len()..].trim();
        if value.is_empty() {
            return Err(DictError::Format { directive, offset });
        }
        out.push((key.to_string(), value.to_string()));
    }
    Ok(())
}

/// Matches one MAP token: a parenthesized character class or a single
/// word character.
fn map_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^\d\s.\-)(\[\]\\/]+\)|\w").unwrap())
}

/// MAP block: each body line's value must split into exactly two
/// letter-or-parenthesized-class tokens.
fn parse_map_block(
    scanner: &mut LineScanner<'_>,
    header_value: &str,
    header_offset: usize,
    out: &mut Vec<(String, String)>,
) -> Result<(), DictError> {
    let count = parse_int(header_value, "MAP", header_offset)?;
    for _ in 0..count {
        let (line, offset) = next_block_line(scanner, "MAP")?;
        let rest = block_body(&line, "MAP", offset)?;
        let tokens: Vec<&str> = map_token_regex()
            .find_iter(rest)
            .map(|m| m.as_str())
            .collect();
        if tokens.len() != 2 {
            return Err(DictError::Format {
                directive: "MAP",
                offset,
            });
        }
        let strip = |token: &str| {
            token
                .strip_prefix('(')
                .and_then(|t| t.strip_suffix(')'))
                .unwrap_or(token)
                .to_string()
        };
        out.push((strip(tokens[0]), strip(tokens[1])));
    }
    Ok(())
}

/// CHECKCOMPOUNDPATTERN block: each body line carries a 2-3 token pattern
/// tuple, stored for fidelity only.
fn parse_pattern_block(
    scanner: &mut LineScanner<'_>,
    header_value: &str,
    header_offset: usize,
    out: &mut Vec<Vec<String>>,
) -> Result<(), DictError> {
    let count = parse_int(header_value, "CHECKCOMPOUNDPATTERN", header_offset)?;
    for _ in 0..count {
        let (line, offset) = next_block_line(scanner, "CHECKCOMPOUNDPATTERN")?;
        let rest = block_body(&line, "CHECKCOMPOUNDPATTERN", offset)?;
        let tokens: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
        if !(2..=3).contains(&tokens.len()) {
            return Err(DictError::Format {
                directive: "CHECKCOMPOUNDPATTERN",
                offset,
            });
        }
        out.push(tokens);
    }
    Ok(())
}

/// PFX/SFX block: `<KEYWORD> <flag> <Y|N> <n>` header followed by n body
/// lines `<KEYWORD> <flag> <stripping> <affix> [<condition> [<morph>...]]`.
fn parse_affix_block(
    scanner: &mut LineScanner<'_>,
    config: &mut AffixConfig,
    kind: AffixKind,
    header_value: &str,
    header_offset: usize,
) -> Result<(), DictError> {
    let directive = kind.directive();
    let parts: Vec<&str> = header_value.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(DictError::Format {
            directive,
            offset: header_offset,
        });
    }
    let flag = parts[0].to_string();
    let cross_product = match parts[1] {
        "Y" => true,
        "N" => false,
        _ => {
            return Err(DictError::Format {
                directive,
                offset: header_offset,
            });
        }
    };
    let count: u32 = parts[2].parse().map_err(|_| DictError::Format {
        directive,
        offset: header_offset,
    })?;

    let mut rules = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (line, offset) = next_block_line(scanner, directive)?;
        let rest = block_body(&line, directive, offset)?;
        let tokens: Vec<&str> = rest.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(DictError::Format { directive, offset });
        }
        let rule_flag = tokens[0];
        if rule_flag.chars().count() != config.flag_mode.flag_len() || rule_flag != flag {
            return Err(DictError::Format { directive, offset });
        }

        let stripping = match tokens[1] {
            "0" => String::new(),
            other => other.to_string(),
        };

        let (affix, continuation) = match kind {
            AffixKind::Prefix => {
                let components: Vec<&str> = tokens[2].split('/').collect();
                match components.len() {
                    1 => (components[0], None),
                    2 => (components[0], Some(components[1].to_string())),
                    _ => {
                        return Err(DictError::InvalidAffix(format!(
                            "prefix affix cell {:?} for flag {flag} has more than two \
                             slash-separated components",
                            tokens[2]
                        )));
                    }
                }
            }
            AffixKind::Suffix => (tokens[2], None),
        };
        let affix = match affix {
            "0" => String::new(),
            other => other.to_string(),
        };

        let condition_src = tokens.get(3).copied().unwrap_or(".");
        let anchored = match kind {
            AffixKind::Prefix => format!("^(?:{condition_src})"),
            AffixKind::Suffix => format!("(?:{condition_src})$"),
        };
        let condition =
            Regex::new(&anchored).map_err(|_| DictError::Format { directive, offset })?;

        let morphological_fields = tokens[4..].iter().map(|t| t.to_string()).collect();

        rules.push(Rule {
            stripping,
            affix,
            continuation,
            condition,
            morphological_fields,
        });
    }

    config.groups.insert(
        flag,
        AffixGroup {
            kind,
            cross_product,
            rules,
        },
    );
    Ok(())
}
