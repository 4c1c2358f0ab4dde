// hunaffix-wordlist: expand an affix/dictionary pair into a word list.
//
// Prints every surface form reachable from the dictionary stems, one per
// line, sorted. The output is the same flat format the passphrase tool
// caches as DIC.wrd.
//
// Usage:
//   hunaffix-wordlist [OPTIONS] DIC

use std::io::{self, BufWriter, Write};
use std::path::Path;

use hunaffix::dictionary::apply_conversion;
use hunaffix_cli::{DictPaths, fatal, take_option, take_switch, wants_help};

fn print_help() {
    println!("hunaffix-wordlist: expand an affix/dictionary pair into a word list.");
    println!();
    println!("Usage: hunaffix-wordlist [OPTIONS] DIC");
    println!();
    println!("Reads DIC.aff and DIC.dic and prints every derivable surface");
    println!("form, one per line, sorted.");
    println!();
    println!("Options:");
    println!("  -p, --path DIR    directory with the dictionary files (default .)");
    println!("  -o, --output FILE write the list to FILE instead of stdout");
    println!("  -b, --stems-only  print only the converted stems, without expansion");
    println!("  -h, --help        print this help");
}

fn main() {
    env_logger::init();
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    if wants_help(&args) {
        print_help();
        return;
    }

    let dir = take_option(&mut args, "-p", "--path").unwrap_or_else(|| ".".to_string());
    let output = take_option(&mut args, "-o", "--output");
    let stems_only = take_switch(&mut args, "-b", "--stems-only");

    let name = match args.as_slice() {
        [name] if !name.starts_with('-') => name.clone(),
        [] => fatal("missing DIC argument; see --help"),
        _ => fatal(&format!("unexpected arguments: {}", args.join(" "))),
    };

    let paths = DictPaths::new(Path::new(&dir), &name);

    let mut words: Vec<String> = if stems_only {
        let config = hunaffix::affix::AffixConfig::from_path(&paths.affix)
            .unwrap_or_else(|e| fatal(&e.to_string()));
        let stems = hunaffix::dictionary::from_path(&paths.dictionary, &config)
            .unwrap_or_else(|e| fatal(&e.to_string()));
        stems
            .into_iter()
            .map(|stem| apply_conversion(&stem.word, &config.oconv))
            .collect()
    } else {
        hunaffix::compute_word_set(&paths.affix, &paths.dictionary)
            .unwrap_or_else(|e| fatal(&e.to_string()))
            .into_iter()
            .collect()
    };
    words.sort_unstable();
    words.dedup();

    match output {
        Some(path) => {
            let mut body = words.join("\n");
            body.push('\n');
            std::fs::write(&path, body)
                .unwrap_or_else(|e| fatal(&format!("failed to write {path}: {e}")));
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            for word in &words {
                if let Err(e) = writeln!(out, "{word}") {
                    fatal(&format!("write failed: {e}"));
                }
            }
        }
    }
}
