//! Loader for the combined-histogram and conditional-combined-histogram file
//! grammars of spec.md §6, grounded in `CombinedPrFunction::initialize(istream&,
//! I16u&)`'s line-tracking reader state machine — ported to a line-oriented
//! parser that returns `Result` (with the line number) instead of throwing.
//!
//! Grammar (combined): header lines `@numberofexactvals = E`,
//! `@numberofbins = B`, `@nullprobability = p`; then `E` lines
//! `p(X) = <prob> for X = { <value> }`; then `B` lines
//! `p(X) = <prob> for X = { x in [<min>, <max>) }`.
//!
//! Grammar (conditional combined): header `@numberofconditions = K`; then `K`
//! blocks, each opening with `@condition = [<min>, <max>)` followed inline by
//! a combined-histogram block.

use sdg_math::histogram::{CombinedHistogram, ConditionalCombinedHistogram, HistogramValue};

use crate::error::{DataFormatError, DataFormatResult};

struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Lines {
            inner: text.lines().enumerate(),
        }
    }

    /// Next non-blank, non-comment-only line, with its 1-based line number.
    fn next_significant(&mut self) -> Option<(u32, &'a str)> {
        for (i, raw) in self.inner.by_ref() {
            let stripped = raw.split('#').next().unwrap_or("").trim();
            if !stripped.is_empty() {
                return Some((i as u32 + 1, stripped));
            }
        }
        None
    }
}

fn header_usize(line: &str, line_no: u32, key: &str) -> DataFormatResult<usize> {
    let rest = line.strip_prefix('@').unwrap_or(line);
    let rest = rest
        .strip_prefix(key)
        .ok_or(DataFormatError::BadHeader {
            line: line_no,
            expected: "@<key> = N",
        })?
        .trim_start();
    let digits = rest
        .strip_prefix('=')
        .ok_or(DataFormatError::BadHeader {
            line: line_no,
            expected: "@<key> = N",
        })?
        .trim();
    digits.parse().map_err(|_| DataFormatError::BadHeader {
        line: line_no,
        expected: "@<key> = N",
    })
}

fn header_f64(line: &str, line_no: u32, key: &str) -> DataFormatResult<f64> {
    let rest = line.strip_prefix('@').unwrap_or(line);
    let rest = rest
        .strip_prefix(key)
        .ok_or(DataFormatError::BadHeader {
            line: line_no,
            expected: "@<key> = p",
        })?
        .trim_start();
    let digits = rest
        .strip_prefix('=')
        .ok_or(DataFormatError::BadHeader {
            line: line_no,
            expected: "@<key> = p",
        })?
        .trim();
    digits.parse().map_err(|_| DataFormatError::BadHeader {
        line: line_no,
        expected: "@<key> = p",
    })
}

/// Parses `p(X) = <prob> for X = { <value> }`.
fn parse_value_line<T: HistogramValue>(line: &str, line_no: u32) -> DataFormatResult<(T, f64)> {
    let rest = line
        .strip_prefix("p(X)")
        .map(str::trim_start)
        .and_then(|s| s.strip_prefix('='))
        .ok_or_else(|| bad_prob_line(line_no, line))?;
    let (prob_str, rest) = rest
        .split_once("for")
        .ok_or_else(|| bad_prob_line(line_no, line))?;
    let prob: f64 = prob_str.trim().parse().map_err(|_| bad_prob_line(line_no, line))?;

    let braces = rest
        .trim()
        .strip_prefix("X")
        .map(str::trim_start)
        .and_then(|s| s.strip_prefix('='))
        .map(str::trim_start)
        .and_then(|s| s.strip_prefix('{'))
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| bad_prob_line(line_no, line))?;

    let value: f64 = braces.trim().parse().map_err(|_| bad_prob_line(line_no, line))?;
    Ok((T::from_f64(value), prob))
}

/// Parses `p(X) = <prob> for X = { x in [<min>, <max>) }`.
fn parse_bucket_line<T: HistogramValue>(line: &str, line_no: u32) -> DataFormatResult<(T, T, f64)> {
    let rest = line
        .strip_prefix("p(X)")
        .map(str::trim_start)
        .and_then(|s| s.strip_prefix('='))
        .ok_or_else(|| bad_prob_line(line_no, line))?;
    let (prob_str, rest) = rest
        .split_once("for")
        .ok_or_else(|| bad_prob_line(line_no, line))?;
    let prob: f64 = prob_str.trim().parse().map_err(|_| bad_prob_line(line_no, line))?;

    let braces = rest
        .trim()
        .strip_prefix("X")
        .map(str::trim_start)
        .and_then(|s| s.strip_prefix('='))
        .map(str::trim_start)
        .and_then(|s| s.strip_prefix('{'))
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| bad_prob_line(line_no, line))?;

    let interval = braces
        .trim()
        .strip_prefix('x')
        .map(str::trim_start)
        .and_then(|s| s.strip_prefix("in"))
        .map(str::trim_start)
        .and_then(|s| s.strip_prefix('['))
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| bad_prob_line(line_no, line))?;

    let (min_str, max_str) = interval
        .split_once(',')
        .ok_or_else(|| bad_prob_line(line_no, line))?;
    let min: f64 = min_str.trim().parse().map_err(|_| bad_prob_line(line_no, line))?;
    let max: f64 = max_str.trim().parse().map_err(|_| bad_prob_line(line_no, line))?;
    Ok((T::from_f64(min), T::from_f64(max), prob))
}

fn bad_prob_line(line: u32, text: &str) -> DataFormatError {
    DataFormatError::BadProbabilityLine {
        line,
        text: text.to_string(),
    }
}

/// Loads a single combined-histogram block starting at the `@numberofexactvals`
/// header line.
pub fn load_combined<T: HistogramValue>(text: &str) -> DataFormatResult<CombinedHistogram<T>> {
    let mut lines = Lines::new(text);
    load_combined_block(&mut lines)
}

fn load_combined_block<T: HistogramValue>(
    lines: &mut Lines<'_>,
) -> DataFormatResult<CombinedHistogram<T>> {
    let (line_no, header) = lines.next_significant().ok_or(DataFormatError::UnexpectedEof {
        what: "combined-histogram header",
        expected: 3,
    })?;
    let num_values = header_usize(header, line_no, "numberofexactvals")?;

    let (line_no, header) = lines.next_significant().ok_or(DataFormatError::UnexpectedEof {
        what: "combined-histogram header",
        expected: 2,
    })?;
    let num_buckets = header_usize(header, line_no, "numberofbins")?;

    let (line_no, header) = lines.next_significant().ok_or(DataFormatError::UnexpectedEof {
        what: "combined-histogram header",
        expected: 1,
    })?;
    let null_probability = header_f64(header, line_no, "nullprobability")?;

    let mut values = Vec::with_capacity(num_values);
    for _ in 0..num_values {
        let (line_no, line) = lines.next_significant().ok_or(DataFormatError::UnexpectedEof {
            what: "exact-value probability lines",
            expected: num_values - values.len(),
        })?;
        values.push(parse_value_line::<T>(line, line_no)?);
    }

    let mut buckets = Vec::with_capacity(num_buckets);
    for _ in 0..num_buckets {
        let (line_no, line) = lines.next_significant().ok_or(DataFormatError::UnexpectedEof {
            what: "bucket probability lines",
            expected: num_buckets - buckets.len(),
        })?;
        buckets.push(parse_bucket_line::<T>(line, line_no)?);
    }

    Ok(CombinedHistogram::new(values, buckets, null_probability)?)
}

/// Loads the conditional-combined-histogram grammar: `@numberofconditions = K`
/// then `K` blocks, each opening with `@condition = [min, max)` followed by an
/// inline combined-histogram block.
pub fn load_conditional<C: HistogramValue, T: HistogramValue>(
    text: &str,
) -> DataFormatResult<ConditionalCombinedHistogram<C, T>> {
    let mut lines = Lines::new(text);

    let (line_no, header) = lines.next_significant().ok_or(DataFormatError::UnexpectedEof {
        what: "conditional-combined header",
        expected: 1,
    })?;
    let num_conditions = header_usize(header, line_no, "numberofconditions")?;

    let mut blocks = Vec::with_capacity(num_conditions);
    for _ in 0..num_conditions {
        let (line_no, header) = lines.next_significant().ok_or(DataFormatError::UnexpectedEof {
            what: "condition header",
            expected: num_conditions - blocks.len(),
        })?;
        let rest = header
            .strip_prefix("@condition")
            .map(str::trim_start)
            .and_then(|s| s.strip_prefix('='))
            .map(str::trim)
            .ok_or_else(|| DataFormatError::BadConditionHeader {
                line: line_no,
                text: header.to_string(),
            })?;
        let interval = rest
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| DataFormatError::BadConditionHeader {
                line: line_no,
                text: header.to_string(),
            })?;
        let (min_str, max_str) =
            interval
                .split_once(',')
                .ok_or_else(|| DataFormatError::BadConditionHeader {
                    line: line_no,
                    text: header.to_string(),
                })?;
        let min: f64 = min_str
            .trim()
            .parse()
            .map_err(|_| DataFormatError::BadConditionHeader {
                line: line_no,
                text: header.to_string(),
            })?;
        let max: f64 = max_str
            .trim()
            .parse()
            .map_err(|_| DataFormatError::BadConditionHeader {
                line: line_no,
                text: header.to_string(),
            })?;

        let inner = load_combined_block::<T>(&mut lines)?;
        blocks.push((C::from_f64(min), C::from_f64(max), inner));
    }

    Ok(ConditionalCombinedHistogram::new(blocks)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_scenario_three_from_spec() {
        let text = "\
@numberofexactvals = 1
@numberofbins = 2
@nullprobability = 0.0
p(X) = 0.25 for X = { 5 }
p(X) = 0.5 for X = { x in [10, 20) }
p(X) = 0.25 for X = { x in [20, 30) }
";
        let h: CombinedHistogram<i64> = load_combined(text).unwrap();
        assert_eq!(h.sample(0.0), Some(5));
        assert_eq!(h.sample(0.5), Some(15));
    }

    #[test]
    fn ignores_comments_and_blank_lines() {
        let text = "\
# a histogram
@numberofexactvals = 1
@numberofbins = 0

@nullprobability = 0.0
p(X) = 1.0 for X = { 9 } # the only value
";
        let h: CombinedHistogram<i64> = load_combined(text).unwrap();
        assert_eq!(h.sample(0.0), Some(9));
    }

    #[test]
    fn loads_conditional_combined() {
        let text = "\
@numberofconditions = 2
@condition = [0, 10)
@numberofexactvals = 1
@numberofbins = 0
@nullprobability = 0.0
p(X) = 1.0 for X = { 1 }
@condition = [10, 20)
@numberofexactvals = 1
@numberofbins = 0
@nullprobability = 0.0
p(X) = 1.0 for X = { 2 }
";
        let h: ConditionalCombinedHistogram<i64, i64> = load_conditional(text).unwrap();
        assert_eq!(h.sample(0.0, 15), Some(2));
        assert_eq!(h.sample(0.0, 3), Some(1));
    }

    #[test]
    fn rejects_bad_header() {
        let text = "@numexactvals = 1\n@numberofbins = 0\n@nullprobability = 0.0\n";
        let result: DataFormatResult<CombinedHistogram<i64>> = load_combined(text);
        assert!(matches!(result, Err(DataFormatError::BadHeader { .. })));
    }

    #[test]
    fn reports_unexpected_eof() {
        let text = "@numberofexactvals = 2\n@numberofbins = 0\n@nullprobability = 0.0\np(X) = 0.5 for X = { 1 }\n";
        let result: DataFormatResult<CombinedHistogram<i64>> = load_combined(text);
        assert!(matches!(
            result,
            Err(DataFormatError::UnexpectedEof { expected: 1, .. })
        ));
    }
}
