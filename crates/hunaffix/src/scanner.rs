// Text decoding and line scanning.
//
// Affix and dictionary files carry their own encoding declaration (the
// affix file's SET directive), so decoding happens per line against the
// raw bytes. This keeps the scanner's byte offsets exact even when a
// multi-byte encoding is in effect.

/// Character encoding declared by the affix file's `SET` directive.
///
/// The default is a 7-bit ASCII-compatible encoding; malformed bytes are
/// replaced with U+FFFD rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Ascii,
    Utf8,
    Latin1,
    Latin15,
}

impl Encoding {
    /// Resolve a `SET` directive value. Names are matched case-insensitively;
    /// unknown names return `None`.
    pub fn from_name(name: &str) -> Option<Encoding> {
        match name.to_ascii_uppercase().as_str() {
            "ASCII" | "US-ASCII" => Some(Encoding::Ascii),
            "UTF-8" | "UTF8" => Some(Encoding::Utf8),
            "ISO8859-1" | "ISO-8859-1" | "LATIN1" => Some(Encoding::Latin1),
            "ISO8859-15" | "ISO-8859-15" => Some(Encoding::Latin15),
            _ => None,
        }
    }

    /// Canonical name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Ascii => "ASCII",
            Encoding::Utf8 => "UTF-8",
            Encoding::Latin1 => "ISO8859-1",
            Encoding::Latin15 => "ISO8859-15",
        }
    }

    /// Decode a run of raw bytes. Bytes outside the encoding are replaced
    /// with U+FFFD.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Ascii => bytes
                .iter()
                .map(|&b| if b < 0x80 { b as char } else { '\u{FFFD}' })
                .collect(),
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            Encoding::Latin15 => bytes.iter().map(|&b| latin15_char(b)).collect(),
        }
    }
}

/// ISO 8859-15 differs from Latin-1 in eight positions.
fn latin15_char(b: u8) -> char {
    match b {
        0xA4 => '\u{20AC}', // euro sign
        0xA6 => 'Š',
        0xA8 => 'š',
        0xB4 => 'Ž',
        0xB8 => 'ž',
        0xBC => 'Œ',
        0xBD => 'œ',
        0xBE => 'Ÿ',
        _ => b as char,
    }
}

/// Supplies the next semantically significant (non-blank) line of a file.
///
/// Lines that are empty or whitespace-only are skipped. No other
/// normalization is performed; comment handling is a caller concern.
pub struct LineScanner<'a> {
    bytes: &'a [u8],
    encoding: Encoding,
    pos: usize,
}

impl<'a> LineScanner<'a> {
    pub fn new(bytes: &'a [u8], encoding: Encoding) -> LineScanner<'a> {
        LineScanner {
            bytes,
            encoding,
            pos: 0,
        }
    }

    /// Byte offset the scanner has consumed up to. Monotonically increasing;
    /// used for diagnostics when a block ends prematurely.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// The next non-blank line (line terminator removed) and the byte
    /// offset at which it starts. Returns `None` at end of file.
    pub fn next_line(&mut self) -> Option<(String, usize)> {
        while self.pos < self.bytes.len() {
            let start = self.pos;
            let rest = &self.bytes[start..];
            let len = rest
                .iter()
                .position(|&b| b == b'\n')
                .map(|i| i + 1)
                .unwrap_or(rest.len());
            self.pos += len;

            let mut line = &rest[..len];
            if let [head @ .., b'\n'] = line {
                line = head;
            }
            if let [head @ .., b'\r'] = line {
                line = head;
            }

            let decoded = self.encoding.decode(line);
            if decoded.trim().is_empty() {
                continue;
            }
            return Some((decoded, start));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_and_whitespace_lines() {
        let mut scanner = LineScanner::new(b"a\n\n   \n\t\nb\n", Encoding::Ascii);
        assert_eq!(scanner.next_line(), Some(("a".to_string(), 0)));
        assert_eq!(scanner.next_line(), Some(("b".to_string(), 9)));
        assert_eq!(scanner.next_line(), None);
    }

    #[test]
    fn offsets_are_byte_positions() {
        let mut scanner = LineScanner::new(b"first\nsecond\n", Encoding::Ascii);
        let (_, off1) = scanner.next_line().unwrap();
        let (_, off2) = scanner.next_line().unwrap();
        assert_eq!(off1, 0);
        assert_eq!(off2, 6);
        assert_eq!(scanner.offset(), 13);
    }

    #[test]
    fn strips_crlf() {
        let mut scanner = LineScanner::new(b"word\r\nnext\r\n", Encoding::Ascii);
        assert_eq!(scanner.next_line().unwrap().0, "word");
        assert_eq!(scanner.next_line().unwrap().0, "next");
    }

    #[test]
    fn last_line_without_newline() {
        let mut scanner = LineScanner::new(b"only", Encoding::Ascii);
        assert_eq!(scanner.next_line(), Some(("only".to_string(), 0)));
        assert_eq!(scanner.next_line(), None);
    }

    #[test]
    fn ascii_replaces_high_bytes() {
        assert_eq!(Encoding::Ascii.decode(&[b'a', 0xE9]), "a\u{FFFD}");
    }

    #[test]
    fn latin1_maps_bytes_directly() {
        assert_eq!(Encoding::Latin1.decode(&[0xE9]), "é");
    }

    #[test]
    fn latin15_euro_sign() {
        assert_eq!(Encoding::Latin15.decode(&[0xA4]), "\u{20AC}");
        assert_eq!(Encoding::Latin1.decode(&[0xA4]), "\u{A4}");
    }

    #[test]
    fn utf8_replaces_malformed_sequences() {
        assert_eq!(Encoding::Utf8.decode(&[0xC3, 0xA9]), "é");
        assert_eq!(Encoding::Utf8.decode(&[0xC3]), "\u{FFFD}");
    }

    #[test]
    fn encoding_names_resolve_case_insensitively() {
        assert_eq!(Encoding::from_name("utf-8"), Some(Encoding::Utf8));
        assert_eq!(Encoding::from_name("ISO-8859-1"), Some(Encoding::Latin1));
        assert_eq!(Encoding::from_name("KOI8-R"), None);
    }
}
