use regex::Regex;
use std::sync::OnceLock;

/// A report line split into key and value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> ClassifiedLine<'a> {
    /// Checks if the key looks like the first cell of a DVH data row
    ///
    /// The key must consist only of ASCII digits and decimal points.
    pub fn is_numeric_row(&self) -> bool {
        !self.key.is_empty() && self.key.bytes().all(|b| b.is_ascii_digit() || b == b'.')
    }
}

/// Splits a trimmed, non-empty line into key and value
///
/// The split happens at the first separator, scanning left to right, where a
/// separator is either a colon with optional surrounding whitespace or a run
/// of two or more whitespace characters. Without a separator the whole line
/// is the key and the value is empty.
///
/// # Example
///
/// ```
/// use dvhcat_core::parser::classify_line;
///
/// let line = classify_line("Patient ID : P001");
/// assert_eq!((line.key, line.value), ("Patient ID", "P001"));
///
/// let line = classify_line("Volume [cm³]    123.4");
/// assert_eq!((line.key, line.value), ("Volume [cm³]", "123.4"));
/// ```
pub fn classify_line(line: &str) -> ClassifiedLine<'_> {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    let re = SEPARATOR
        .get_or_init(|| Regex::new(r"\s*:\s*|\s{2,}").expect("Failed to compile regex"));

    match re.find(line) {
        Some(m) => ClassifiedLine {
            key: line[..m.start()].trim(),
            value: line[m.end()..].trim(),
        },
        None => ClassifiedLine {
            key: line.trim(),
            value: "",
        },
    }
}

/// Splits a DVH data row into its whitespace-separated cells
pub fn row_tokens(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}
