// hunaffix-cli: shared utilities for the command-line tools.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use regex::Regex;

/// Extension of the affix input file.
const AFF_EXT: &str = "aff";

/// Extension of the stem dictionary input file.
const DIC_EXT: &str = "dic";

/// Extension of the cached flat word-list file.
const WRD_EXT: &str = "wrd";

/// Print an error to stderr and exit with a non-zero status.
pub fn fatal(message: &str) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

/// Whether the argument list asks for help.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "-h" || a == "--help")
}

/// Remove a `-k VALUE` / `--key VALUE` option pair from `args` and return
/// the value. The last occurrence wins.
pub fn take_option(args: &mut Vec<String>, short: &str, long: &str) -> Option<String> {
    let mut value = None;
    while let Some(pos) = args.iter().position(|a| a == short || a == long) {
        if pos + 1 >= args.len() {
            fatal(&format!("option {long} requires a value"));
        }
        args.remove(pos);
        value = Some(args.remove(pos));
    }
    value
}

/// Remove a boolean switch from `args`, reporting whether it was present.
pub fn take_switch(args: &mut Vec<String>, short: &str, long: &str) -> bool {
    let mut present = false;
    while let Some(pos) = args.iter().position(|a| a == short || a == long) {
        args.remove(pos);
        present = true;
    }
    present
}

/// Input and cache paths for a dictionary name within a directory.
///
/// `DIC` names the file stem: `DIC.aff` and `DIC.dic` are the inputs,
/// `DIC.wrd` is the derived flat word list (one word per line).
pub struct DictPaths {
    pub affix: PathBuf,
    pub dictionary: PathBuf,
    pub wordlist: PathBuf,
}

impl DictPaths {
    pub fn new(dir: &Path, name: &str) -> DictPaths {
        DictPaths {
            affix: dir.join(format!("{name}.{AFF_EXT}")),
            dictionary: dir.join(format!("{name}.{DIC_EXT}")),
            wordlist: dir.join(format!("{name}.{WRD_EXT}")),
        }
    }

    pub fn has_wordlist(&self) -> bool {
        self.wordlist.is_file()
    }

    pub fn has_dictionary(&self) -> bool {
        self.affix.is_file() && self.dictionary.is_file()
    }
}

/// Read a cached word list, one word per line.
pub fn read_wordlist(path: &Path) -> io::Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Write a word list cache, sorted for determinism.
pub fn write_wordlist<'a, I>(path: &Path, words: I) -> io::Result<()>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut sorted: Vec<&str> = words.into_iter().map(String::as_str).collect();
    sorted.sort_unstable();
    let mut out = sorted.join("\n");
    out.push('\n');
    fs::write(path, out)
}

/// Length and pattern filter applied to candidate words.
pub struct WordFilter {
    /// Exclusive lower bound on word length; 0 admits everything.
    pub min: usize,
    /// Exclusive upper bound on word length; `None` means unlimited.
    pub max: Option<usize>,
    pub regex: Option<Regex>,
    /// Invert the regex match.
    pub negate: bool,
}

impl WordFilter {
    pub fn matches(&self, word: &str) -> bool {
        let len = word.chars().count();
        if len <= self.min {
            return false;
        }
        if let Some(max) = self.max {
            if len >= max {
                return false;
            }
        }
        match &self.regex {
            Some(regex) => regex.is_match(word) != self.negate,
            None => true,
        }
    }
}
