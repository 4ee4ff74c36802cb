//! Backtracking cursor over attribute-value text.
//!
//! Every scan operation is transactional: it either consumes a whole
//! token (advancing the cursor past it, including any leading
//! whitespace) or fails and leaves the cursor exactly where it was.
//! Matching is grapheme-cluster-atomic, so a multi-scalar cluster such
//! as a flag emoji matches or fails as a whole.

use std::collections::BTreeSet;

use unicode_segmentation::UnicodeSegmentation;

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ScanError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("expected `{expected}`")]
    Mismatch { expected: String },

    #[error("malformed number")]
    MalformedNumber,
}

impl ScanError {
    fn mismatch(expected: impl Into<String>) -> Self {
        Self::Mismatch {
            expected: expected.into(),
        }
    }
}

/// Set-membership predicate over grapheme clusters. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterSet {
    clusters: BTreeSet<String>,
}

impl CharacterSet {
    pub fn new(characters: &str) -> Self {
        Self {
            clusters: characters.graphemes(true).map(str::to_owned).collect(),
        }
    }

    pub fn contains(&self, cluster: &str) -> bool {
        self.clusters.contains(cluster)
    }

    pub fn whitespace() -> Self {
        Self::new(" \t\n\r")
    }

    pub fn whitespace_or_comma() -> Self {
        Self::new(" \t\n\r,")
    }

    pub fn digits() -> Self {
        Self::new("0123456789")
    }

    pub fn hexadecimal() -> Self {
        Self::new("0123456789abcdefABCDEF")
    }
}

impl From<&str> for CharacterSet {
    fn from(characters: &str) -> Self {
        Self::new(characters)
    }
}

#[derive(Clone, Debug)]
pub struct Scanner<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, position: 0 }
    }

    /// Current byte offset into the text. Monotonically non-decreasing.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_eof(&self) -> bool {
        self.position >= self.text.len()
    }

    /// True once only whitespace remains before the end of the text.
    pub fn is_exhausted(&self) -> bool {
        self.text[self.position..].trim_start().is_empty()
    }

    fn after_whitespace(&self) -> usize {
        let rest = &self.text[self.position..];
        self.position + (rest.len() - rest.trim_start().len())
    }

    /// Consumes `literal` verbatim, after skipping leading whitespace.
    pub fn scan_string(&mut self, literal: &str) -> Result<(), ScanError> {
        let start = self.after_whitespace();
        let rest = &self.text[start..];
        if rest.is_empty() {
            return Err(ScanError::UnexpectedEof);
        }
        if rest.starts_with(literal) {
            self.position = start + literal.len();
            Ok(())
        } else {
            Err(ScanError::mismatch(literal))
        }
    }

    /// Consumes exactly one grapheme cluster belonging to `set`.
    pub fn scan_character(&mut self, matching_any: &CharacterSet) -> Result<&'a str, ScanError> {
        let start = self.after_whitespace();
        let rest = &self.text[start..];
        let cluster = rest.graphemes(true).next().ok_or(ScanError::UnexpectedEof)?;
        if matching_any.contains(cluster) {
            self.position = start + cluster.len();
            Ok(cluster)
        } else {
            Err(ScanError::mismatch(format!("character in {matching_any:?}")))
        }
    }

    /// Greedily consumes the longest contiguous run of clusters all in
    /// `set`. Returns `None` (cursor unmoved) if the first cluster after
    /// whitespace is not in the set.
    pub fn scan(&mut self, any: &CharacterSet) -> Option<&'a str> {
        let start = self.after_whitespace();
        let mut end = start;
        for cluster in self.text[start..].graphemes(true) {
            if !any.contains(cluster) {
                break;
            }
            end += cluster.len();
        }
        if end == start {
            return None;
        }
        self.position = end;
        Some(&self.text[start..end])
    }

    /// Unsigned 8-bit integer. A leading sign, or a value above 255,
    /// is malformed input.
    pub fn scan_uint8(&mut self) -> Result<u8, ScanError> {
        let start = self.after_whitespace();
        let end = digit_run_end(self.text, start);
        if end == start {
            return Err(self.number_error(start));
        }
        let value = self.text[start..end]
            .parse::<u8>()
            .map_err(|_| ScanError::MalformedNumber)?;
        self.position = end;
        Ok(value)
    }

    pub fn scan_float(&mut self) -> Result<f32, ScanError> {
        let (slice, end) = self.number_slice()?;
        let value = slice.parse::<f32>().map_err(|_| ScanError::MalformedNumber)?;
        self.position = end;
        Ok(value)
    }

    pub fn scan_double(&mut self) -> Result<f64, ScanError> {
        let (slice, end) = self.number_slice()?;
        let value = slice.parse::<f64>().map_err(|_| ScanError::MalformedNumber)?;
        self.position = end;
        Ok(value)
    }

    /// Integer length, optional leading `-`.
    pub fn scan_length(&mut self) -> Result<i64, ScanError> {
        let start = self.after_whitespace();
        let mut digits = start;
        if self.text[start..].starts_with('-') {
            digits += 1;
        }
        let end = digit_run_end(self.text, digits);
        if end == digits {
            return Err(self.number_error(start));
        }
        let value = self.text[start..end]
            .parse::<i64>()
            .map_err(|_| ScanError::MalformedNumber)?;
        self.position = end;
        Ok(value)
    }

    /// Accepts exactly `0`, `1`, `true` or `false`.
    pub fn scan_bool(&mut self) -> Result<bool, ScanError> {
        for (literal, value) in [("true", true), ("false", false), ("1", true), ("0", false)] {
            if self.scan_string(literal).is_ok() {
                return Ok(value);
            }
        }
        Err(ScanError::mismatch("0|1|true|false"))
    }

    /// Bare fraction; succeeds only if the value lies in [0, 1] and the
    /// literal consumes the remaining input.
    pub fn scan_percentage_float(&mut self) -> Result<f32, ScanError> {
        let start = self.position;
        let value = self.scan_float()?;
        if (0.0..=1.0).contains(&value) && self.is_exhausted() {
            Ok(value)
        } else {
            self.position = start;
            Err(ScanError::MalformedNumber)
        }
    }

    /// A bare fraction in [0, 1], or `<number> %` scaled by 1/100.
    pub fn scan_percentage(&mut self) -> Result<f32, ScanError> {
        if let Ok(value) = self.scan_percentage_float() {
            return Ok(value);
        }
        let start = self.position;
        let value = self.scan_float()?;
        if (0.0..=100.0).contains(&value) && self.scan_string("%").is_ok() {
            Ok(value / 100.0)
        } else {
            self.position = start;
            Err(ScanError::MalformedNumber)
        }
    }

    /// One signed number out of an SVG coordinate list. Consumes at most
    /// one `,` separator first; a `-` directly after the previous number
    /// acts as an implicit separator.
    pub fn scan_coordinate(&mut self) -> Result<f64, ScanError> {
        let start = self.position;
        let _ = self.scan_string(",");
        match self.scan_double() {
            Ok(value) => Ok(value),
            Err(e) => {
                self.position = start;
                Err(e)
            }
        }
    }

    fn number_slice(&self) -> Result<(&'a str, usize), ScanError> {
        let start = self.after_whitespace();
        let end = number_end(self.text, start);
        if end == start {
            return Err(self.number_error(start));
        }
        Ok((&self.text[start..end], end))
    }

    fn number_error(&self, start: usize) -> ScanError {
        if start >= self.text.len() {
            ScanError::UnexpectedEof
        } else {
            ScanError::MalformedNumber
        }
    }
}

fn digit_run_end(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = start;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    i
}

/// Byte offset just past a signed decimal literal starting at `start`,
/// or `start` itself when no literal is present. The exponent is only
/// consumed when it carries digits, so `10e` stops after `10`.
fn number_end(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = start;
    if i < bytes.len() && bytes[i] == b'-' {
        i += 1;
    }
    let int_end = digit_run_end(text, i);
    let mut has_digits = int_end > i;
    i = int_end;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_end = digit_run_end(text, i + 1);
        if frac_end > i + 1 {
            i = frac_end;
            has_digits = true;
        }
    }
    if !has_digits {
        return start;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_end = digit_run_end(text, j);
        if exp_end > j {
            i = exp_end;
        }
    }
    i
}
