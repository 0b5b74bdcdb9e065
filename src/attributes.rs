//! The attribute tokenizer shared by the IPTV and HLS scanners.
//!
//! Both dialects describe records with `KEY=VALUE` lists. IPTV lines separate
//! them with whitespace (`tvg-id="a" group-title="News"`) and use unquoted
//! commas inside values (`url-tvg=http://a/x.xml,http://b/y.xml`). HLS tags
//! separate them with commas (`BANDWIDTH=1280000,CODECS="avc1.4d401f,mp4a.40.2"`).
//! [`parse_attributes`] reads the first form, [`parse_attribute_list`] the
//! second. Neither knows which names are meaningful; that is left to the callers.

use indexmap::map::{IntoIter, Iter};
use indexmap::IndexMap;
use nom::branch::alt;
use nom::bytes::complete::{take_while, take_while1};
use nom::character::complete::{anychar, char, digit1, one_of, space0};
use nom::combinator::{all_consuming, map, map_res, opt, recognize, value};
use nom::error::{Error, ErrorKind};
use nom::multi::fold_many0;
use nom::sequence::{pair, preceded, tuple};
use nom::IResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str;

/// Attribute name to value mapping with lower-cased keys.
///
/// Lookups are case-insensitive. Inserting an existing key replaces its value
/// but keeps the original position, so iteration follows first appearance.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap(IndexMap<String, String>);

impl AttributeMap {
    pub fn new() -> AttributeMap {
        Default::default()
    }

    /// Inserts `value` under the lower-cased `key`, returning the previous value.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.as_ref().to_ascii_lowercase(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&*lower(key)).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(&*lower(key))
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(&*lower(key))
    }

    /// Returns the value for the first of `keys` that is present.
    pub fn get_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.get(k))
    }

    /// Parses the value for `key` as a decimal unsigned integer.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    /// Parses the value for `key` as a decimal floating point number.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(parse_decimal)
    }

    /// HLS enumerated booleans: only `YES` counts as true.
    pub fn get_yes_no(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("YES"))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Runs the quote-trim step over every value.
    pub fn unescape_values(&mut self) {
        for v in self.0.values_mut() {
            if v.contains('\\') {
                *v = unescape_value(v);
            }
        }
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for AttributeMap {
    type Item = (String, String);
    type IntoIter = IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for AttributeMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attrs = AttributeMap::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

impl fmt::Display for AttributeMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}=\"{}\"", k, v)?;
        }
        Ok(())
    }
}

fn lower(key: &str) -> std::borrow::Cow<'_, str> {
    if key.bytes().any(|b| b.is_ascii_uppercase()) {
        std::borrow::Cow::Owned(key.to_ascii_lowercase())
    } else {
        std::borrow::Cow::Borrowed(key)
    }
}

// -----------------------------------------------------------------------------------------------
// Tokenizer
// -----------------------------------------------------------------------------------------------

/// Tokenizes a whitespace-separated attribute list into an [`AttributeMap`].
///
/// Commas are ordinary value characters here, so an unquoted
/// `url-tvg=http://a/x.xml,http://b/y.xml` keeps both URLs. Accepted tokens are `key="value"`, `key='value'`, `key=bareword` and a bare
/// `key`, which gets the value `"true"`. Whitespace around `=` is allowed.
/// Characters that cannot start a key are skipped. When a key repeats the last
/// occurrence wins.
///
/// Quoted values are returned as written between the quotes, escapes
/// included; see [`unescape_value`].
///
/// ```
/// use m3u_rs::attributes::parse_attributes;
///
/// let attrs = parse_attributes(r#"tvg-ID="bbc.uk" group-title='News' radio catchup-days=7"#);
/// assert_eq!(attrs.get("tvg-id"), Some("bbc.uk"));
/// assert_eq!(attrs.get("group-title"), Some("News"));
/// assert_eq!(attrs.get("radio"), Some("true"));
/// assert_eq!(attrs.get("catchup-days"), Some("7"));
/// ```
pub fn parse_attributes(input: &str) -> AttributeMap {
    tokenize(input, false)
}

/// Tokenizes a comma-separated HLS attribute list.
///
/// Same tokens as [`parse_attributes`], but an unquoted comma ends a bareword
/// and separates attributes. Commas inside quotes are kept.
///
/// ```
/// use m3u_rs::attributes::parse_attribute_list;
///
/// let attrs = parse_attribute_list(r#"BANDWIDTH=1280000,CODECS="avc1.4d401f,mp4a.40.2""#);
/// assert_eq!(attrs.get("bandwidth"), Some("1280000"));
/// assert_eq!(attrs.get("codecs"), Some("avc1.4d401f,mp4a.40.2"));
/// ```
pub fn parse_attribute_list(input: &str) -> AttributeMap {
    tokenize(input, true)
}

fn tokenize(input: &str, commas: bool) -> AttributeMap {
    let result = fold_many0(
        preceded(
            separators(commas),
            alt((map(attribute(commas), Some), value(None, anychar))),
        ),
        AttributeMap::new,
        |mut acc: AttributeMap, token| {
            if let Some((key, value)) = token {
                acc.insert(key, value);
            }
            acc
        },
    )(input);

    match result {
        Ok((_, attrs)) => attrs,
        Err(_) => AttributeMap::new(),
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

fn separators<'a>(commas: bool) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    take_while(move |c: char| c.is_whitespace() || (commas && c == ','))
}

fn attribute<'a>(commas: bool) -> impl FnMut(&'a str) -> IResult<&'a str, (&'a str, &'a str)> {
    map(
        pair(
            take_while1(is_key_char),
            opt(preceded(tuple((space0, char('='), space0)), attribute_value(commas))),
        ),
        |(key, value)| (key, value.unwrap_or("true")),
    )
}

fn attribute_value<'a>(commas: bool) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    alt((double_quoted, single_quoted, bareword(commas)))
}

fn double_quoted(i: &str) -> IResult<&str, &str> {
    quoted(i, '"')
}

fn single_quoted(i: &str) -> IResult<&str, &str> {
    quoted(i, '\'')
}

fn bareword<'a>(commas: bool) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    take_while(move |c: char| !c.is_whitespace() && !(commas && c == ','))
}

/// Matches `q ... q`, skipping over backslash-escaped characters. Fails when
/// the closing quote is missing so the caller can fall back to a bareword.
fn quoted(i: &str, q: char) -> IResult<&str, &str> {
    let (body, _) = char::<_, Error<&str>>(q)(i)?;
    let mut escaped = false;
    for (pos, c) in body.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            c if c == q => return Ok((&body[pos + c.len_utf8()..], &body[..pos])),
            _ => {}
        }
    }
    Err(nom::Err::Error(Error::new(i, ErrorKind::Char)))
}

/// The quote-trim step: strips one pair of surrounding quotes if present and
/// resolves `\"`, `\'` and `\\`. Other backslashes are kept.
///
/// ```
/// assert_eq!(m3u_rs::attributes::unescape_value(r#""say \"hi\"""#), r#"say "hi""#);
/// ```
pub fn unescape_value(raw: &str) -> String {
    let trimmed = ['"', '\'']
        .iter()
        .find_map(|q| raw.strip_prefix(*q).and_then(|s| s.strip_suffix(*q)))
        .unwrap_or(raw);

    let mut out = String::with_capacity(trimmed.len());
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if matches!(next, '"' | '\'' | '\\') {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

// -----------------------------------------------------------------------------------------------
// Numbers
// -----------------------------------------------------------------------------------------------

pub(crate) fn number(i: &str) -> IResult<&str, u64> {
    map_res(digit1, str::parse::<u64>)(i)
}

pub(crate) fn float(i: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        str::parse::<f64>,
    )(i)
}

/// Parses a whole trimmed string as a decimal number. Rejects the `inf`/`NaN`
/// spellings that `f64::from_str` would otherwise accept.
pub(crate) fn parse_decimal(s: &str) -> Option<f64> {
    all_consuming(float)(s.trim()).ok().map(|(_, n)| n)
}
