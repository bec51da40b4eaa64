//! Reminder offset parsing and formatting.
//!
//! An offset is a lead time in seconds before contest start. Users supply
//! offsets as tokens like `1d`, `2h`, `30m` or raw seconds.

/// Default reminder offsets, seconds before start, descending.
pub const DEFAULT_OFFSETS: [i64; 6] = [86_400, 7_200, 3_600, 1_800, 600, 300];

/// Parse a whitespace- or comma-separated list of offset tokens.
///
/// Accepted tokens: `<n>d`, `<n>h`, `<n>m`, or a bare number of seconds,
/// where `<n>` is an unsigned integer. Any invalid token, including a
/// sign-prefixed, fractional, or overflowing amount, rejects the whole
/// input (returns an empty vec). The result is deduplicated, restricted
/// to positive values, and sorted descending.
pub fn parse_offset_tokens(text: &str) -> Vec<i64> {
    let mut offsets: Vec<i64> = Vec::new();

    for token in text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        let token = token.to_ascii_lowercase();
        let (amount, unit) = if let Some(n) = token.strip_suffix('d') {
            (n, 86_400)
        } else if let Some(n) = token.strip_suffix('h') {
            (n, 3_600)
        } else if let Some(n) = token.strip_suffix('m') {
            (n, 60)
        } else {
            (token.as_str(), 1)
        };

        // Digits only: `-5`, `+5`, and `1.5h` are all invalid tokens.
        if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
            return Vec::new();
        }

        match amount.parse::<i64>().ok().and_then(|n| n.checked_mul(unit)) {
            Some(secs) => offsets.push(secs),
            None => return Vec::new(),
        }
    }

    offsets.sort_unstable_by(|a, b| b.cmp(a));
    offsets.dedup();
    offsets.retain(|&secs| secs > 0);
    offsets
}

/// Render an offset compactly: `1d`, `2h`, `30m`, `1h 30m`, `45s`.
pub fn format_offset(secs: i64) -> String {
    let mut secs = secs.max(0);
    let mut parts = Vec::new();

    for (unit, label) in [(86_400, "d"), (3_600, "h"), (60, "m")] {
        if secs >= unit {
            parts.push(format!("{}{}", secs / unit, label));
            secs %= unit;
        }
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{}s", secs));
    }

    parts.join(" ")
}

/// Render a full offset list for user display.
pub fn format_offset_list(offsets: &[i64]) -> String {
    offsets
        .iter()
        .map(|&secs| format_offset(secs))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_tokens() {
        assert_eq!(parse_offset_tokens("1d 2h 30m"), vec![86_400, 7_200, 1_800]);
        assert_eq!(parse_offset_tokens("1d,2h,30m"), vec![86_400, 7_200, 1_800]);
        assert_eq!(parse_offset_tokens("600"), vec![600]);
        assert_eq!(parse_offset_tokens("2H"), vec![7_200]);
    }

    #[test]
    fn test_parse_rejects_whole_input_on_invalid_token() {
        assert_eq!(parse_offset_tokens("1d xx"), Vec::<i64>::new());
        assert_eq!(parse_offset_tokens("soon"), Vec::<i64>::new());
        assert_eq!(parse_offset_tokens("1.5h"), Vec::<i64>::new());
    }

    #[test]
    fn test_parse_sorts_descending_and_dedups() {
        assert_eq!(
            parse_offset_tokens("30m 1d 2h 1440m"),
            vec![86_400, 7_200, 1_800]
        );
    }

    #[test]
    fn test_parse_drops_zero_tokens() {
        assert_eq!(parse_offset_tokens("0"), Vec::<i64>::new());
        assert_eq!(parse_offset_tokens("0 1h"), vec![3_600]);
    }

    #[test]
    fn test_parse_rejects_signed_amounts() {
        assert_eq!(parse_offset_tokens("-5"), Vec::<i64>::new());
        assert_eq!(parse_offset_tokens("+5"), Vec::<i64>::new());
        assert_eq!(parse_offset_tokens("-1h"), Vec::<i64>::new());
        // The valid token does not survive the invalid one.
        assert_eq!(parse_offset_tokens("1h -5"), Vec::<i64>::new());
    }

    #[test]
    fn test_parse_rejects_overflowing_amounts() {
        assert_eq!(
            parse_offset_tokens("106751991167301d"),
            Vec::<i64>::new()
        );
        assert_eq!(
            parse_offset_tokens("99999999999999999999"),
            Vec::<i64>::new()
        );
        assert_eq!(parse_offset_tokens("1h 106751991167301d"), Vec::<i64>::new());
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse_offset_tokens(""), Vec::<i64>::new());
        assert_eq!(parse_offset_tokens("   "), Vec::<i64>::new());
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(86_400), "1d");
        assert_eq!(format_offset(7_200), "2h");
        assert_eq!(format_offset(1_800), "30m");
        assert_eq!(format_offset(5_400), "1h 30m");
        assert_eq!(format_offset(45), "45s");
        assert_eq!(format_offset(0), "0s");
    }

    #[test]
    fn test_format_offset_list() {
        assert_eq!(
            format_offset_list(&[86_400, 7_200, 300]),
            "1d, 2h, 5m"
        );
    }

    #[test]
    fn test_defaults_are_descending() {
        let mut sorted = DEFAULT_OFFSETS.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(sorted, DEFAULT_OFFSETS.to_vec());
    }
}
