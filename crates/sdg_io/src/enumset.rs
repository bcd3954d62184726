//! Loader for the enumerated-set file grammar of spec.md §6: a header line
//! `@numberofvalues = N`, then `N` lines of `<i>TAB<value>`, optionally
//! followed by `# comment`. Values may be quoted; `\"` and `\n` escapes are
//! recognised. Grounded in the line-tracking reader state machine of
//! `MyriadEnumSet::initialize(istream&, I16u&)`, ported from the original's
//! three-state machine (NOV/VLN/END) to an explicit line loop that returns
//! `Result` instead of throwing.

use sdg_core::EnumSet;

use crate::error::{DataFormatError, DataFormatResult};

pub fn load(name: &str, text: &str) -> DataFormatResult<EnumSet> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i as u32 + 1, l));

    let (header_line, expected) = next_significant(&mut lines).ok_or(DataFormatError::UnexpectedEof {
        what: "enum-set header",
        expected: 1,
    })?;
    let count = parse_header(header_line, expected)?;

    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        let (line_no, raw) = next_significant(&mut lines).ok_or(DataFormatError::UnexpectedEof {
            what: "enum-set values",
            expected: count - values.len(),
        })?;
        values.push(parse_value_line(line_no, raw)?);
    }

    Ok(EnumSet::new(name, values))
}

/// Strips a trailing `# comment`, then trims whitespace; returns `None` for
/// lines that are blank once stripped (these are skipped, not errors).
fn strip_comment(line: &str) -> Option<&str> {
    let stripped = line.split('#').next().unwrap_or("").trim();
    if stripped.is_empty() {
        None
    } else {
        Some(stripped)
    }
}

fn next_significant<'a, I>(lines: &mut I) -> Option<(u32, &'a str)>
where
    I: Iterator<Item = (u32, &'a str)>,
{
    for (no, raw) in lines.by_ref() {
        if let Some(stripped) = strip_comment(raw) {
            return Some((no, stripped));
        }
    }
    None
}

fn parse_header(line: &str, line_no: u32) -> DataFormatResult<usize> {
    let rest = line
        .strip_prefix("@numberofvalues")
        .ok_or(DataFormatError::BadHeader {
            line: line_no,
            expected: "@numberofvalues = N",
        })?;
    let rest = rest.trim_start();
    let digits = rest
        .strip_prefix('=')
        .ok_or(DataFormatError::BadHeader {
            line: line_no,
            expected: "@numberofvalues = N",
        })?
        .trim();
    digits.parse::<usize>().map_err(|_| DataFormatError::BadHeader {
        line: line_no,
        expected: "@numberofvalues = N",
    })
}

fn parse_value_line(line_no: u32, line: &str) -> DataFormatResult<String> {
    let (_, rest) = line
        .split_once('\t')
        .ok_or(DataFormatError::BadEnumValueLine { line: line_no })?;
    let rest = rest.trim();
    let unquoted = if let Some(inner) = rest
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    {
        inner
    } else {
        rest
    };
    Ok(unescape(unquoted))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('"') => {
                    out.push('"');
                    chars.next();
                }
                Some('n') => {
                    out.push('\n');
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_simple_domain() {
        let text = "@numberofvalues = 3\n0\tlow\n1\tmid\n2\thigh\n";
        let set = load("tier", text).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.label(1).unwrap(), "mid");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "# a domain\n\n@numberofvalues = 2\n# comment before value\n0\tfoo\n1\tbar # trailing\n";
        let set = load("x", text).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.label(0).unwrap(), "foo");
    }

    #[test]
    fn handles_quoted_and_escaped_values() {
        let text = "@numberofvalues = 1\n0\t\"line one\\nline two \\\"quoted\\\"\"\n";
        let set = load("x", text).unwrap();
        assert_eq!(set.label(0).unwrap(), "line one\nline two \"quoted\"");
    }

    #[test]
    fn rejects_bad_header() {
        let text = "@numvalues = 3\n0\tlow\n";
        assert!(matches!(
            load("x", text),
            Err(DataFormatError::BadHeader { .. })
        ));
    }

    #[test]
    fn rejects_missing_tab() {
        let text = "@numberofvalues = 1\nno-tab-here\n";
        assert!(matches!(
            load("x", text),
            Err(DataFormatError::BadEnumValueLine { .. })
        ));
    }

    #[test]
    fn reports_unexpected_eof_with_remaining_count() {
        let text = "@numberofvalues = 3\n0\tlow\n1\tmid\n";
        let err = load("x", text).unwrap_err();
        assert!(matches!(
            err,
            DataFormatError::UnexpectedEof { expected: 1, .. }
        ));
    }
}
