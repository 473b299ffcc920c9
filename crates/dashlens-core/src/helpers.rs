//! Small formatting helpers shared across widgets.

/// Human-facing number: integers print without a fraction, everything else
/// is rounded to two decimals with trailing zeros dropped.
pub fn format_number(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}

/// Leading numeric prefix of a string (`"96%"` -> 96, `"3.5x"` -> 3.5).
///
/// Leading whitespace is skipped. Returns `None` when no digits lead.
pub fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '-' | '+' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    s[..end].trim_end_matches('.').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_drops_needless_fraction() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(0.123456), "0.12");
        assert_eq!(format_number(-0.001), "0");
        assert_eq!(format_number(-12.75), "-12.75");
    }

    #[test]
    fn leading_number_reads_prefix() {
        assert_eq!(leading_number("96%"), Some(96.0));
        assert_eq!(leading_number(" 3.5x"), Some(3.5));
        assert_eq!(leading_number("-2.25 pts"), Some(-2.25));
        assert_eq!(leading_number("12."), Some(12.0));
        assert_eq!(leading_number("n/a"), None);
        assert_eq!(leading_number("."), None);
    }
}
