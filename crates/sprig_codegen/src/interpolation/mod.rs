use regex::Regex;
use smallvec::SmallVec;
use sprig_core::{TEXT, UNESCAPE};

use crate::error::CodegenError;
use crate::utils::json_quote;

lazy_static! {
    /// An optionally backslash-escaped `#{` or `!{` marker.
    static ref MARKER_RE: Regex = Regex::new(r"(\\)?([#!])\{").unwrap();
}

/// One fragment of a scanned text payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// JSON-quoted literal text.
    Literal(String),
    /// Expression whose value is emitted escaped.
    Escaped(String),
    /// Expression whose value is emitted raw.
    Unescaped(String),
}

pub type SegmentVec = SmallVec<[Segment; 4]>;

impl Segment {
    /// Source form of the segment: a sentinel emission call.
    pub fn to_source(&self) -> String {
        match self {
            Segment::Literal(quoted) => format!("{}({})", TEXT, quoted),
            Segment::Escaped(expr) => format!("{}({})", TEXT, expr),
            Segment::Unescaped(expr) => format!("{}({})", UNESCAPE, expr),
        }
    }
}

/// Splits `text` into alternating literal and expression segments.
///
/// `#{expr}` yields an escaped-output segment and `!{expr}` a raw-output
/// segment; `\#{` and `\!{` drop the backslash and keep the marker
/// characters as literal text. Literal runs are flushed JSON-quoted. An
/// expression that never closes its delimiters is a fatal error.
pub fn interpolate(text: &str) -> Result<SegmentVec, CodegenError> {
    let mut segments = SegmentVec::new();
    let mut literal = String::new();
    let mut rest = text;

    while let Some(caps) = MARKER_RE.captures(rest) {
        let matched = caps.get(0).unwrap();
        let backslashed = caps.get(1).is_some();
        let marker = caps.get(2).unwrap().as_str();

        literal.push_str(&rest[..matched.start()]);
        rest = &rest[matched.end()..];

        if backslashed {
            literal.push_str(marker);
            literal.push('{');
            continue;
        }

        let end = balanced_end(rest).ok_or_else(|| CodegenError::MalformedInterpolation {
            text: text.to_owned(),
        })?;
        let expr = &rest[..end];
        rest = &rest[end + 1..];

        if !literal.is_empty() {
            segments.push(Segment::Literal(json_quote(&literal)));
            literal.clear();
        }

        if marker == "!" {
            segments.push(Segment::Unescaped(expr.to_owned()));
        } else {
            segments.push(Segment::Escaped(expr.to_owned()));
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(json_quote(&literal)));
    }

    Ok(segments)
}

/// Index of the `}` closing the expression that starts at the beginning of
/// `src`, skipping over string literals and nested bracket pairs. Returns
/// `None` when the input runs out before the delimiters balance.
fn balanced_end(src: &str) -> Option<usize> {
    #[derive(PartialEq, Clone, Copy)]
    enum Quote {
        None,
        Single,
        Double,
        Tick,
    }

    let mut quote = Quote::None;
    let mut escaped = false;
    let mut nesting = 0usize;

    for (idx, ch) in src.char_indices() {
        if quote != Quote::None {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' => escaped = true,
                '\'' if quote == Quote::Single => quote = Quote::None,
                '"' if quote == Quote::Double => quote = Quote::None,
                '`' if quote == Quote::Tick => quote = Quote::None,
                _ => {}
            }
            continue;
        }

        match ch {
            '\'' => quote = Quote::Single,
            '"' => quote = Quote::Double,
            '`' => quote = Quote::Tick,
            '{' | '[' | '(' => nesting += 1,
            '}' if nesting == 0 => return Some(idx),
            '}' | ']' | ')' => nesting = nesting.saturating_sub(1),
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_passes_plain_text_through_as_one_quoted_segment() {
        let segments = interpolate("hello world").unwrap();
        assert_eq!(segments.as_slice(), &[Segment::Literal("\"hello world\"".into())]);
    }

    #[test]
    fn it_returns_no_segments_for_empty_text() {
        assert!(interpolate("").unwrap().is_empty());
    }

    #[test]
    fn it_splits_escaped_interpolation() {
        let segments = interpolate("a #{1+1} b").unwrap();
        assert_eq!(
            segments.as_slice(),
            &[
                Segment::Literal("\"a \"".into()),
                Segment::Escaped("1+1".into()),
                Segment::Literal("\" b\"".into()),
            ]
        );
    }

    #[test]
    fn it_splits_raw_interpolation() {
        let segments = interpolate("x!{html}y").unwrap();
        assert_eq!(
            segments.as_slice(),
            &[
                Segment::Literal("\"x\"".into()),
                Segment::Unescaped("html".into()),
                Segment::Literal("\"y\"".into()),
            ]
        );
    }

    #[test]
    fn it_keeps_backslash_escaped_markers_literal() {
        let segments = interpolate(r"a \#{not code} b").unwrap();
        assert_eq!(
            segments.as_slice(),
            &[Segment::Literal("\"a #{not code} b\"".into())]
        );
    }

    #[test]
    fn it_scans_nested_braces_and_strings() {
        let segments = interpolate("#{fn({a: '}'})}").unwrap();
        assert_eq!(segments.as_slice(), &[Segment::Escaped("fn({a: '}'})".into())]);
    }

    #[test]
    fn it_rejects_unbalanced_expressions() {
        let err = interpolate("#{fn(").unwrap_err();
        assert!(matches!(err, CodegenError::MalformedInterpolation { .. }));
    }

    #[test]
    fn it_renders_segments_as_sentinel_calls() {
        assert_eq!(Segment::Literal("\"a\"".into()).to_source(), "ǃtext＿(\"a\")");
        assert_eq!(Segment::Escaped("1+1".into()).to_source(), "ǃtext＿(1+1)");
        assert_eq!(Segment::Unescaped("x".into()).to_source(), "ǃunescape＿(x)");
    }
}
