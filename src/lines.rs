//! Line normalization and `{$name}` variable substitution.

use std::borrow::Cow;
use std::collections::HashMap;

const BOM: char = '\u{feff}';

/// Splits playlist text into lines.
///
/// A leading byte-order mark is dropped and `\r\n`, `\r` and `\n` are all
/// treated as line terminators. Blank lines are kept so that line indices
/// stay 1:1 with the input, which is what warning messages refer to.
///
/// ```
/// let lines = m3u_rs::lines::normalize_lines("\u{feff}#EXTM3U\r\n\r\nhttp://x\rnext");
/// assert_eq!(lines, vec!["#EXTM3U", "", "http://x", "next"]);
/// ```
pub fn normalize_lines(input: &str) -> Vec<&str> {
    let input = input.strip_prefix(BOM).unwrap_or(input);
    let mut lines = Vec::new();
    let mut rest = input;

    while let Some(pos) = rest.find(['\r', '\n']) {
        lines.push(&rest[..pos]);
        let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[pos + skip..];
    }
    lines.push(rest);

    lines
}

/// Name to value table filled by `#EXT-X-DEFINE`.
///
/// Definitions apply to every line after the one that declared them, for the
/// rest of a single parse.
#[derive(Debug, Default, Clone)]
pub struct Variables {
    values: HashMap<String, String>,
}

impl Variables {
    pub fn new() -> Variables {
        Default::default()
    }

    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replaces every `{$name}` with its defined value.
    ///
    /// References to names that were never defined are left in place.
    pub fn substitute<'a>(&self, line: &'a str) -> Cow<'a, str> {
        if self.values.is_empty() || !line.contains("{$") {
            return Cow::Borrowed(line);
        }

        let mut out = String::with_capacity(line.len());
        let mut rest = line;

        while let Some(start) = rest.find("{$") {
            out.push_str(&rest[..start]);
            let candidate = &rest[start..];
            match candidate.find('}') {
                Some(end) => {
                    let name = &candidate[2..end];
                    match self.get(name) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&candidate[..=end]),
                    }
                    rest = &candidate[end + 1..];
                }
                None => {
                    out.push_str(candidate);
                    rest = "";
                }
            }
        }
        out.push_str(rest);

        Cow::Owned(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_blank_lines() {
        assert_eq!(normalize_lines("a\n\nb\n"), vec!["a", "", "b", ""]);
    }

    #[test]
    fn mixed_line_endings() {
        assert_eq!(normalize_lines("a\r\nb\rc\nd"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn bom_is_stripped() {
        assert_eq!(normalize_lines("\u{feff}#EXTM3U"), vec!["#EXTM3U"]);
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize_lines(""), vec![""]);
    }

    #[test]
    fn substitute_defined() {
        let mut vars = Variables::new();
        vars.define("host", "cdn.example.com");
        assert_eq!(
            vars.substitute("https://{$host}/a/{$host}.ts"),
            "https://cdn.example.com/a/cdn.example.com.ts"
        );
    }

    #[test]
    fn substitute_leaves_unknown_names() {
        let mut vars = Variables::new();
        vars.define("a", "1");
        assert_eq!(vars.substitute("{$a}-{$b}-{$"), "1-{$b}-{$");
    }

    #[test]
    fn substitute_without_definitions_borrows() {
        let vars = Variables::new();
        assert!(matches!(vars.substitute("{$a}"), Cow::Borrowed(_)));
    }
}
