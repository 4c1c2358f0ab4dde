// hunaffix-passphrase: generate random word-based passphrases.
//
// Expands a Hunspell affix/dictionary pair into its full word list (or
// reuses a cached DIC.wrd file), filters the candidates by length and an
// optional regular expression, and prints passphrases built from randomly
// chosen words.
//
// Usage:
//   hunaffix-passphrase [OPTIONS] DIC
//
// DIC names the files without extension: DIC.aff and DIC.dic are the
// inputs, DIC.wrd is the cached word list. When the cache exists it is
// used unless -f forces a fresh expansion.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use hunaffix_cli::{DictPaths, WordFilter, fatal, take_option, take_switch, wants_help};
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use regex::Regex;

fn print_help() {
    println!("hunaffix-passphrase: generate random word-based passphrases.");
    println!();
    println!("Usage: hunaffix-passphrase [OPTIONS] DIC");
    println!();
    println!("DIC names the dictionary files without extension: DIC.aff and");
    println!("DIC.dic are expanded into a word list, cached as DIC.wrd.");
    println!();
    println!("Options:");
    println!("  -c, --count N       words per passphrase (default 4)");
    println!("  -t, --tosses N      number of passphrases to generate (default 5)");
    println!("  -l, --min N         minimum word length, exclusive (default 0)");
    println!("  -g, --max N         maximum word length, exclusive; -1 for no limit");
    println!("  -r, --regex RE      only use words matching the expression");
    println!("  -n, --negate        invert the regular expression filter");
    println!("  -s, --separator S   string between words (default a single space)");
    println!("  -o, --output FILE   append passphrases to FILE instead of stdout");
    println!("  -p, --path DIR      directory with the dictionary files (default .)");
    println!("  -f, --force         recompute the word list even if DIC.wrd exists");
    println!("  -h, --help          print this help");
}

fn int_option(args: &mut Vec<String>, short: &str, long: &str, default: i64) -> i64 {
    match take_option(args, short, long) {
        Some(value) => value
            .parse()
            .unwrap_or_else(|_| fatal(&format!("option {long} expects an integer, got {value:?}"))),
        None => default,
    }
}

fn main() {
    env_logger::init();
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    if wants_help(&args) {
        print_help();
        return;
    }

    let count = int_option(&mut args, "-c", "--count", 4);
    let tosses = int_option(&mut args, "-t", "--tosses", 5);
    let min = int_option(&mut args, "-l", "--min", 0);
    let max = int_option(&mut args, "-g", "--max", -1);
    let negate = take_switch(&mut args, "-n", "--negate");
    let force = take_switch(&mut args, "-f", "--force");
    let separator = take_option(&mut args, "-s", "--separator").unwrap_or_else(|| " ".to_string());
    let output = take_option(&mut args, "-o", "--output");
    let dir = take_option(&mut args, "-p", "--path").unwrap_or_else(|| ".".to_string());
    let regex_src = take_option(&mut args, "-r", "--regex");

    if count < 1 {
        fatal("the count parameter has to be greater than 0");
    }
    if tosses < 1 {
        fatal("the number of tosses has to be a positive number");
    }
    if min < 0 {
        fatal("the min parameter has to be greater or equal than 0");
    }
    if max != -1 && max <= min {
        fatal("the max parameter has to be greater than the min parameter, or -1");
    }

    let name = match args.as_slice() {
        [name] if !name.starts_with('-') => name.clone(),
        [] => fatal("missing DIC argument; see --help"),
        _ => fatal(&format!("unexpected arguments: {}", args.join(" "))),
    };

    let dir = Path::new(&dir);
    if !dir.is_dir() {
        fatal(&format!(
            "path to dictionary files not found: {}",
            dir.display()
        ));
    }

    let filter = WordFilter {
        min: min as usize,
        max: (max != -1).then_some(max as usize),
        regex: regex_src.map(|src| {
            Regex::new(&src)
                .unwrap_or_else(|e| fatal(&format!("invalid filter expression: {e}")))
        }),
        negate,
    };

    let paths = DictPaths::new(dir, &name);
    if force && !paths.has_dictionary() {
        fatal(&format!(
            "no affix/dictionary pair found: {}, {}",
            paths.affix.display(),
            paths.dictionary.display()
        ));
    }
    if !force && !paths.has_wordlist() && !paths.has_dictionary() {
        fatal(&format!(
            "no word list or dictionary found: {}, {} + {}",
            paths.wordlist.display(),
            paths.affix.display(),
            paths.dictionary.display()
        ));
    }

    let words: Vec<String> = if force || !paths.has_wordlist() {
        let set = hunaffix::compute_word_set(&paths.affix, &paths.dictionary)
            .unwrap_or_else(|e| fatal(&e.to_string()));
        hunaffix_cli::write_wordlist(&paths.wordlist, set.iter()).unwrap_or_else(|e| {
            fatal(&format!(
                "failed to write {}: {e}",
                paths.wordlist.display()
            ))
        });
        set.into_iter().collect()
    } else {
        hunaffix_cli::read_wordlist(&paths.wordlist).unwrap_or_else(|e| {
            fatal(&format!("failed to read {}: {e}", paths.wordlist.display()))
        })
    };

    let candidates: Vec<&str> = words
        .iter()
        .map(String::as_str)
        .filter(|word| filter.matches(word))
        .collect();
    if candidates.is_empty() {
        fatal("no words left after filtering");
    }

    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(
            OpenOptions::new()
                .append(true)
                .create(true)
                .open(&path)
                .unwrap_or_else(|e| fatal(&format!("failed to open {path}: {e}"))),
        ),
        None => Box::new(io::stdout()),
    };

    // OsRng so passphrases come from the operating system's entropy source.
    for _ in 0..tosses {
        let picks: Vec<&str> = (0..count)
            .map(|_| *candidates.choose(&mut OsRng).unwrap())
            .collect();
        if let Err(e) = writeln!(out, "{}", picks.join(&separator)) {
            fatal(&format!("write failed: {e}"));
        }
    }
}
