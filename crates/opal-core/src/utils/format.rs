/// Format an amount in cents for display
/// Negative amounts put the sign before the dollar symbol: -$1.50
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}

/// Parse a displayed dollar amount into cents.
/// Accepts "$12.34", "-$1.50", "$-1.50", "12", "$0.5" and surrounding whitespace.
/// Returns None for empty or non-numeric text.
pub fn parse_cents(text: &str) -> Option<i64> {
    let mut s = text.trim();
    if s.is_empty() {
        return None;
    }

    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest.trim_start();
    }
    s = s.strip_prefix('$').unwrap_or(s);
    if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest;
    }
    let s = s.replace(',', "");

    let (dollars, fraction) = match s.split_once('.') {
        Some((d, f)) => (d, f),
        None => (s.as_str(), ""),
    };
    if dollars.is_empty() && fraction.is_empty() {
        return None;
    }
    if !dollars.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
        || fraction.len() > 2
    {
        return None;
    }

    let dollars: i64 = if dollars.is_empty() { 0 } else { dollars.parse().ok()? };
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };

    let cents = dollars.checked_mul(100)?.checked_add(fraction)?;
    Some(if negative { -cents } else { cents })
}

/// Remove HTML tags and collapse whitespace
pub fn strip_html(s: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    let decoded = decode_entities(&result);
    // Also clean up multiple spaces and newlines
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the handful of HTML entities the site actually emits
pub fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#36;", "$")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(1234), "$12.34");
        assert_eq!(format_cents(5), "$0.05");
        assert_eq!(format_cents(0), "$0.00");
        assert_eq!(format_cents(-150), "-$1.50");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("$12.34"), Some(1234));
        assert_eq!(parse_cents(" -$1.50 "), Some(-150));
        assert_eq!(parse_cents("$-1.50"), Some(-150));
        assert_eq!(parse_cents("$0.5"), Some(50));
        assert_eq!(parse_cents("$1,024.00"), Some(102_400));
        assert_eq!(parse_cents("7"), Some(700));
        assert_eq!(parse_cents(""), None);
        assert_eq!(parse_cents("$"), None);
        assert_eq!(parse_cents("n/a"), None);
        assert_eq!(parse_cents("$1.234"), None);
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<b>Central</b>\n  to <i>Town Hall</i>"), "Central to Town Hall");
        assert_eq!(strip_html("Fish &amp; Chips&nbsp;"), "Fish & Chips");
        assert_eq!(strip_html("&#36;4.20"), "$4.20");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }
}
