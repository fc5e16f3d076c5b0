//! String splitting used by atom `split`/`rsplit`.
//!
//! Mirrors the host string semantics the language exposes:
//!
//! - With no separator, runs of whitespace separate pieces and empty pieces
//!   are never produced. Once `maxsplit` splits have been made, the remainder
//!   is returned as-is (minus the whitespace consumed by the last split).
//! - With a separator, every occurrence splits and empty pieces are kept.
//!   `maxsplit = n` yields at most `n + 1` pieces.
//! - `maxsplit = None` means unlimited.

use crate::error::ValueError;

/// Split `text` from the left.
pub fn split<'a>(
    text: &'a str,
    sep: Option<&str>,
    maxsplit: Option<usize>,
) -> Result<Vec<&'a str>, ValueError> {
    match sep {
        None => Ok(split_whitespace(text, maxsplit)),
        Some("") => Err(ValueError::usage("empty separator")),
        Some(sep) => Ok(match maxsplit {
            None => text.split(sep).collect(),
            Some(n) => text.splitn(n.saturating_add(1), sep).collect(),
        }),
    }
}

/// Split `text` from the right. Pieces are returned in left-to-right order.
pub fn rsplit<'a>(
    text: &'a str,
    sep: Option<&str>,
    maxsplit: Option<usize>,
) -> Result<Vec<&'a str>, ValueError> {
    let mut pieces: Vec<&str> = match sep {
        None => return Ok(rsplit_whitespace(text, maxsplit)),
        Some("") => return Err(ValueError::usage("empty separator")),
        Some(sep) => match maxsplit {
            None => text.rsplit(sep).collect(),
            Some(n) => text.rsplitn(n.saturating_add(1), sep).collect(),
        },
    };
    pieces.reverse();
    Ok(pieces)
}

fn limit_reached(found: usize, maxsplit: Option<usize>) -> bool {
    maxsplit.is_some_and(|max| found >= max)
}

fn split_whitespace(text: &str, maxsplit: Option<usize>) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text.trim_start();

    while !rest.is_empty() {
        if limit_reached(pieces.len(), maxsplit) {
            pieces.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(at) => {
                pieces.push(&rest[..at]);
                rest = rest[at..].trim_start();
            }
            None => {
                pieces.push(rest);
                break;
            }
        }
    }

    pieces
}

fn rsplit_whitespace(text: &str, maxsplit: Option<usize>) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text.trim_end();

    while !rest.is_empty() {
        if limit_reached(pieces.len(), maxsplit) {
            pieces.push(rest);
            break;
        }
        match rest.char_indices().rev().find(|(_, c)| c.is_whitespace()) {
            Some((at, c)) => {
                pieces.push(&rest[at + c.len_utf8()..]);
                rest = rest[..at].trim_end();
            }
            None => {
                pieces.push(rest);
                break;
            }
        }
    }

    pieces.reverse();
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_whitespace() {
        assert_eq!(split("  a b\t c ", None, None).unwrap(), vec!["a", "b", "c"]);
        assert!(split("   ", None, None).unwrap().is_empty());
        assert!(split("", None, None).unwrap().is_empty());
    }

    #[test]
    fn test_split_whitespace_maxsplit() {
        assert_eq!(split("  a b  c ", None, Some(1)).unwrap(), vec!["a", "b  c "]);
        assert_eq!(split("  a b ", None, Some(0)).unwrap(), vec!["a b "]);
        assert_eq!(split("a ", None, Some(1)).unwrap(), vec!["a"]);
    }

    #[test]
    fn test_rsplit_whitespace_maxsplit() {
        assert_eq!(
            rsplit("  a b  c ", None, Some(1)).unwrap(),
            vec!["  a b", "c"]
        );
        assert_eq!(rsplit(" a b c", None, None).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_separator_keeps_empty_pieces() {
        assert_eq!(split("a,,b", Some(","), None).unwrap(), vec!["a", "", "b"]);
        assert_eq!(split("", Some(","), None).unwrap(), vec![""]);
    }

    #[test]
    fn test_split_separator_maxsplit() {
        assert_eq!(split("a.b.c", Some("."), Some(1)).unwrap(), vec!["a", "b.c"]);
        assert_eq!(rsplit("a.b.c", Some("."), Some(1)).unwrap(), vec!["a.b", "c"]);
        assert_eq!(split("a.b.c", Some("."), Some(0)).unwrap(), vec!["a.b.c"]);
    }

    #[test]
    fn test_empty_separator_is_usage_error() {
        assert!(split("abc", Some(""), None).unwrap_err().is_usage());
        assert!(rsplit("abc", Some(""), None).unwrap_err().is_usage());
    }
}
