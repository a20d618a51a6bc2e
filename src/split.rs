//! Command-line splitting.
//!
//! A chain is authored as one free-text blob; it is stored and executed as an
//! ordered list of lines. Lines break on newline, carriage return or `;`.
//! The same rule (trim, drop empties) splits a directive body on `+`.

/// Delimiters separating command lines inside a blob.
pub const LINE_DELIMITERS: &[char] = &['\n', '\r', ';'];

/// Iterate over the trimmed, non-empty segments of `s` split on any of
/// `delimiters`. Consecutive delimiters collapse.
pub fn segments<'a>(s: &'a str, delimiters: &'a [char]) -> impl Iterator<Item = &'a str> + 'a {
    s.split(move |c: char| delimiters.contains(&c))
        .map(|seg| seg.trim_matches(|c: char| c.is_ascii_whitespace()))
        .filter(|seg| !seg.is_empty())
}

/// Split a multi-line blob into owned command lines.
pub fn split_lines(blob: &str) -> Vec<String> {
    segments(blob, LINE_DELIMITERS).map(str::to_owned).collect()
}
