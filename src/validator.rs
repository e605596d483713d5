//! Response checks used by [`HttpCall`](crate::HttpCall).

use crate::step::StepError;
use indexmap::IndexMap;
use reqwest::header::HeaderMap;
use std::fmt;

/// Expected header token meaning "present with any non-empty value".
pub const ANY: &str = "*";
/// Expected header token meaning "absent or empty".
pub const NONE: &str = "-";

/// How an expected response header is matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderExpectation {
    Any,
    Absent,
    Exact(String),
}

impl HeaderExpectation {
    pub fn parse(expected: &str) -> Self {
        match expected {
            ANY => HeaderExpectation::Any,
            NONE => HeaderExpectation::Absent,
            other => HeaderExpectation::Exact(other.to_string()),
        }
    }

    /// Match against the first observed value of the header.
    ///
    /// An empty value counts as absent.
    pub fn matches(&self, got: Option<&str>) -> bool {
        let got = got.unwrap_or("");
        match self {
            HeaderExpectation::Any => !got.is_empty(),
            HeaderExpectation::Absent => got.is_empty(),
            HeaderExpectation::Exact(want) => got == want,
        }
    }
}

impl fmt::Display for HeaderExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderExpectation::Any => f.write_str("any"),
            HeaderExpectation::Absent => f.write_str("none"),
            HeaderExpectation::Exact(want) => write!(f, "{want:?}"),
        }
    }
}

/// One response header that did not meet its expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMismatch {
    pub name: String,
    pub got: Option<String>,
    pub want: HeaderExpectation,
}

impl fmt::Display for HeaderMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let got = self.got.as_deref().unwrap_or("");
        write!(
            f,
            "got response header {:?} = {got:?}, want {}",
            self.name, self.want
        )
    }
}

/// Byte-exact body comparison. An empty `want` disables the check.
///
/// The observed body is only decoded (lossily) to build the error message.
pub fn validate_body(got: &[u8], want: &str) -> Result<(), StepError> {
    if want.is_empty() || got == want.as_bytes() {
        return Ok(());
    }
    Err(StepError::BodyMismatch {
        got: String::from_utf8_lossy(got).into_owned(),
        want: want.to_string(),
    })
}

/// Check every expected header, in declaration order.
///
/// Headers not listed in `expectations` are ignored.
pub fn validate_headers(
    headers: &HeaderMap,
    expectations: &IndexMap<String, String>,
) -> Vec<HeaderMismatch> {
    let mut mismatches = Vec::new();

    for (name, expected) in expectations {
        let got = headers
            .get(name.as_str())
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        let want = HeaderExpectation::parse(expected);
        if !want.matches(got.as_deref()) {
            mismatches.push(HeaderMismatch {
                name: name.clone(),
                got,
                want,
            });
        }
    }

    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(*value));
        }
        map
    }

    fn expect(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(HeaderExpectation::parse("*"), HeaderExpectation::Any);
        assert_eq!(HeaderExpectation::parse("-"), HeaderExpectation::Absent);
        assert_eq!(
            HeaderExpectation::parse("bar"),
            HeaderExpectation::Exact("bar".into())
        );
    }

    #[test]
    fn test_match_modes() {
        assert!(HeaderExpectation::Any.matches(Some("bar")));
        assert!(!HeaderExpectation::Any.matches(Some("")));
        assert!(!HeaderExpectation::Any.matches(None));

        assert!(HeaderExpectation::Absent.matches(None));
        assert!(HeaderExpectation::Absent.matches(Some("")));
        assert!(!HeaderExpectation::Absent.matches(Some("bar")));

        let exact = HeaderExpectation::Exact("bar".into());
        assert!(exact.matches(Some("bar")));
        assert!(!exact.matches(Some("Bar")));
        assert!(!exact.matches(None));
    }

    #[test]
    fn test_body_check_skipped_when_unset() {
        assert!(validate_body(b"anything", "").is_ok());
        assert!(validate_body(b"hello", "hello").is_ok());
        let err = validate_body(b"hello", "bye").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("hello") && msg.contains("bye"));
    }

    #[test]
    fn test_body_compares_raw_bytes() {
        // Lossy decoding would turn 0xff into U+FFFD and match.
        let err = validate_body(b"\xffok", "\u{FFFD}ok").unwrap_err();
        assert!(matches!(err, StepError::BodyMismatch { .. }));
        assert!(validate_body("caf\u{e9}".as_bytes(), "caf\u{e9}").is_ok());
    }

    #[test]
    fn test_headers_use_first_value_and_ignore_unlisted() {
        let observed = headers(&[
            ("x-foo", "bar"),
            ("x-foo", "second"),
            ("x-other", "ignored"),
        ]);
        let mismatches =
            validate_headers(&observed, &expect(&[("X-Foo", "bar")]));
        assert!(mismatches.is_empty());
    }

    #[test]
    fn test_headers_report_every_mismatch_in_order() {
        let observed = headers(&[("x-foo", "bar")]);
        let mismatches = validate_headers(
            &observed,
            &expect(&[
                ("x-foo", "-"),
                ("x-ok", "-"),
                ("x-missing", "*"),
                ("x-foo-2", "baz"),
            ]),
        );

        let names: Vec<&str> =
            mismatches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["x-foo", "x-missing", "x-foo-2"]);
        assert_eq!(mismatches[0].got.as_deref(), Some("bar"));
        assert_eq!(mismatches[1].got, None);
    }

    #[test]
    fn test_mismatch_display() {
        let m = HeaderMismatch {
            name: "x-foo".into(),
            got: Some("bar".into()),
            want: HeaderExpectation::Absent,
        };
        assert_eq!(
            m.to_string(),
            r#"got response header "x-foo" = "bar", want none"#
        );
    }
}
