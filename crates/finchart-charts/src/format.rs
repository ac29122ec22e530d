//! Number formatting for hover text.

use serde::{Deserialize, Serialize};

/// Digit grouping convention for the integer part of a number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigitGrouping {
    /// Groups of three: 12,345,678.
    Western,
    /// Last three digits, then groups of two: 1,23,45,678.
    #[default]
    Indian,
}

/// Formats a number with `decimals` fraction digits and digit grouping.
///
/// Non-finite input formats as `"-"`.
#[must_use]
pub fn format_number(value: f64, decimals: usize, grouping: DigitGrouping) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rendered.as_str(), None),
    };

    let mut out = String::with_capacity(rendered.len() + rendered.len() / 2 + 1);
    // -0.00 should not carry a sign
    if value < 0.0 && rendered.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    out.push_str(&group_digits(int_part, grouping));
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn group_digits(digits: &str, grouping: DigitGrouping) -> String {
    let len = digits.len();
    if len <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(len - 3);
    let group = match grouping {
        DigitGrouping::Western => 3,
        DigitGrouping::Indian => 2,
    };

    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(group);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    groups.push(tail);
    groups.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_western_grouping() {
        assert_eq!(format_number(12_345_678.0, 0, DigitGrouping::Western), "12,345,678");
        assert_eq!(format_number(999.5, 1, DigitGrouping::Western), "999.5");
        assert_eq!(format_number(-1234.567, 2, DigitGrouping::Western), "-1,234.57");
    }

    #[test]
    fn test_indian_grouping() {
        assert_eq!(format_number(12_345_678.0, 0, DigitGrouping::Indian), "1,23,45,678");
        assert_eq!(format_number(240_893.0, 0, DigitGrouping::Indian), "2,40,893");
        assert_eq!(format_number(1000.0, 2, DigitGrouping::Indian), "1,000.00");
    }

    #[test]
    fn test_edge_values() {
        assert_eq!(format_number(f64::NAN, 2, DigitGrouping::Indian), "-");
        assert_eq!(format_number(-0.001, 2, DigitGrouping::Western), "0.00");
        assert_eq!(format_number(0.0, 0, DigitGrouping::Western), "0");
    }
}
