use crate::{
    ast::{BinaryOperator, StringNode, StringOperator},
    interpreter::evaluator::binary::comparison::holds,
    util::num::to_index,
};

/// Compares two byte strings lexicographically.
///
/// # Example
/// ```
/// use formulary::{ast::BinaryOperator, interpreter::evaluator::string::compare};
///
/// assert!(compare(BinaryOperator::Less, b"abc", b"abd"));
/// assert!(compare(BinaryOperator::Equal, b"", b""));
/// assert!(!compare(BinaryOperator::GreaterEqual, b"ab", b"abc"));
/// ```
#[must_use]
pub fn compare(op: BinaryOperator, left: &[u8], right: &[u8]) -> bool {
    holds(op, Some(left.cmp(right)))
}

/// Evaluates `in`, `like` or `ilike`.
#[must_use]
pub fn matches(op: StringOperator, left: &[u8], right: &[u8]) -> bool {
    match op {
        StringOperator::In => contains(right, left),
        StringOperator::Like => wildcard_match(left, right, false),
        StringOperator::ILike => wildcard_match(left, right, true),
    }
}

/// Whether `needle` occurs in `haystack`. The empty string occurs everywhere.
#[must_use]
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

/// Matches `text` against a wildcard `pattern`.
///
/// `*` matches any run of bytes, including none, and `?` matches exactly one
/// byte. With `ignore_case`, ASCII letters match regardless of case.
///
/// # Example
/// ```
/// use formulary::interpreter::evaluator::string::wildcard_match;
///
/// assert!(wildcard_match(b"formulary", b"f*ry", false));
/// assert!(wildcard_match(b"abc", b"a?c", false));
/// assert!(!wildcard_match(b"ABC", b"a*", false));
/// assert!(wildcard_match(b"ABC", b"a*", true));
/// ```
#[must_use]
pub fn wildcard_match(text: &[u8], pattern: &[u8], ignore_case: bool) -> bool {
    let same = |a: u8, b: u8| {
        if ignore_case { a.eq_ignore_ascii_case(&b) } else { a == b }
    };

    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(b'*') => {
                backtrack = Some((p, t));
                p += 1;
            },
            Some(&c) if c == b'?' || same(c, text[t]) => {
                t += 1;
                p += 1;
            },
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                },
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}

/// Extracts the inclusive range `[start, end]` of `source`.
///
/// Bounds are truncated towards zero and clipped to the string. A missing
/// start means the beginning, a missing end the last byte. An empty range
/// yields an empty string.
///
/// # Example
/// ```
/// use formulary::interpreter::evaluator::string::substring;
///
/// assert_eq!(substring(b"abcdef", Some(1.0), Some(3.0)), b"bcd".to_vec());
/// assert_eq!(substring(b"abcdef", Some(4.0), None), b"ef".to_vec());
/// assert_eq!(substring(b"abcdef", Some(2.0), Some(100.0)), b"cdef".to_vec());
/// assert_eq!(substring(b"abcdef", Some(3.0), Some(1.0)), Vec::<u8>::new());
/// ```
#[must_use]
pub fn substring(source: &[u8], start: Option<f64>, end: Option<f64>) -> Vec<u8> {
    let Some(last) = source.len().checked_sub(1) else {
        return Vec::new();
    };
    if end.is_some_and(|end| end < 0.0) {
        return Vec::new();
    }

    let start = start.map_or(0, bound);
    let end = end.map_or(last, bound).min(last);

    source.get(start..=end).map(<[u8]>::to_vec).unwrap_or_default()
}

/// Length of a string node, without copying bound storage.
pub fn length(node: &StringNode) -> usize {
    match node {
        StringNode::Variable(variable) => variable.len(),
        other => other.eval().len(),
    }
}

fn bound(value: f64) -> usize {
    to_index(value.max(0.0)).unwrap_or(usize::MAX)
}
