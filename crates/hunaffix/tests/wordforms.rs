//! End-to-end tests: affix + dictionary files on disk through
//! `compute_word_set`.

use std::fs;
use std::path::PathBuf;

use hunaffix::{DictError, compute_word_set};

/// A scratch directory holding one affix/dictionary pair, removed on drop.
struct TempDict {
    dir: PathBuf,
}

impl TempDict {
    fn new(name: &str, affix: &[u8], dic: &[u8]) -> TempDict {
        let dir = std::env::temp_dir().join(format!("hunaffix-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("test.aff"), affix).unwrap();
        fs::write(dir.join("test.dic"), dic).unwrap();
        TempDict { dir }
    }

    fn aff(&self) -> PathBuf {
        self.dir.join("test.aff")
    }

    fn dic(&self) -> PathBuf {
        self.dir.join("test.dic")
    }
}

impl Drop for TempDict {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

fn sorted(set: &hashbrown::HashSet<String>) -> Vec<&str> {
    let mut words: Vec<&str> = set.iter().map(String::as_str).collect();
    words.sort_unstable();
    words
}

#[test]
fn cross_product_expansion() {
    let dict = TempDict::new(
        "cross",
        b"SFX A Y 1\nSFX A 0 s .\nPFX B Y 1\nPFX B 0 un .\n",
        b"2\n# stems\ndo/AB\nknot\n",
    );
    let words = compute_word_set(&dict.aff(), &dict.dic()).unwrap();
    assert_eq!(sorted(&words), vec!["do", "dos", "knot", "undo", "undos"]);
}

#[test]
fn conditions_and_stripping() {
    let dict = TempDict::new(
        "cond",
        b"SFX A Y 2\nSFX A 0 s [^sy]\nSFX A y ies y\n",
        b"cat/A\nbus/A\nfly/A\n",
    );
    let words = compute_word_set(&dict.aff(), &dict.dic()).unwrap();
    assert_eq!(
        sorted(&words),
        vec!["bus", "cat", "cats", "flies", "fly"]
    );
}

#[test]
fn set_restart_governs_dictionary_decoding() {
    // The affix file declares ISO8859-1 after other directives; both the
    // rules and the dictionary must be decoded under the final encoding.
    let mut affix = b"TRY abc\nSET ISO8859-1\nSFX A Y 1\nSFX A 0 ".to_vec();
    affix.push(0xE9); // é
    affix.extend_from_slice(b" .\n");
    let dict = TempDict::new("latin1", &affix, &[b'c', 0xE9, b'/', b'A', b'\n']);
    let words = compute_word_set(&dict.aff(), &dict.dic()).unwrap();
    assert_eq!(sorted(&words), vec!["cé", "céé"]);
}

#[test]
fn long_flag_mode_end_to_end() {
    let dict = TempDict::new(
        "long",
        b"FLAG long\nSFX Aa Y 1\nSFX Aa 0 s .\n",
        b"word/Aa\n",
    );
    let words = compute_word_set(&dict.aff(), &dict.dic()).unwrap();
    assert_eq!(sorted(&words), vec!["word", "words"]);
}

#[test]
fn input_and_output_conversion() {
    let dict = TempDict::new(
        "conv",
        b"ICONV 1\nICONV ' \xE2\x80\x99\nOCONV 1\nOCONV a A\nSET UTF-8\nSFX S Y 1\nSFX S 0 s .\n",
        b"can't/S\n",
    );
    let words = compute_word_set(&dict.aff(), &dict.dic()).unwrap();
    assert_eq!(sorted(&words), vec!["cAn\u{2019}t", "cAn\u{2019}ts"]);
}

#[test]
fn missing_affix_file() {
    let dict = TempDict::new("missing", b"", b"word\n");
    let err = compute_word_set(&dict.dir.join("absent.aff"), &dict.dic()).unwrap_err();
    assert!(matches!(err, DictError::FileNotFound(_)));
}

#[test]
fn format_error_aborts_the_whole_parse() {
    let dict = TempDict::new(
        "badcount",
        b"SFX A Y 3\nSFX A 0 s .\n",
        b"word/A\n",
    );
    let err = compute_word_set(&dict.aff(), &dict.dic()).unwrap_err();
    assert!(matches!(
        err,
        DictError::Format {
            directive: "SFX",
            ..
        }
    ));
}
