use chrono::{Datelike, Local, NaiveDate};

/// Formats a number with a fixed number of fraction digits and comma grouping
/// in the integer part, e.g. `1234.5` with 2 digits becomes `1,234.50`.
/// Non-finite values render as `--`.
pub fn format_number(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return "--".to_string();
    }

    let fixed = format!("{:.*}", digits, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (index, ch) in int_part.chars().enumerate() {
        if index > 0 && (int_part.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && fixed.chars().any(|ch| ch.is_ascii_digit() && ch != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Echoes a stored number back into a form input: shortest representation,
/// empty for missing or non-finite values.
pub fn format_input_number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}

/// Chart axis label for an ISO date, `2025-03-02` becomes `3/2`.
/// Unparsable dates are returned unchanged.
pub fn format_chart_label(date: &str) -> String {
    if date.is_empty() {
        return String::new();
    }
    match parse_date(date) {
        Some(parsed) => format!("{}/{}", parsed.month(), parsed.day()),
        None => date.to_string(),
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

pub fn today_string() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Braces are escaped as well so user text can never form a page placeholder.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_uses_fixed_digits_and_grouping() {
        assert_eq!(format_number(60.0, 2), "60.00");
        assert_eq!(format_number(1234.5, 2), "1,234.50");
        assert_eq!(format_number(1234567.0, 0), "1,234,567");
        assert_eq!(format_number(-1234.26, 1), "-1,234.3");
        assert_eq!(format_number(f64::NAN, 2), "--");
        assert_eq!(format_number(f64::INFINITY, 1), "--");
    }

    #[test]
    fn negative_zero_after_rounding_has_no_sign() {
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    #[test]
    fn chart_label_drops_year_and_padding() {
        assert_eq!(format_chart_label("2025-03-02"), "3/2");
        assert_eq!(format_chart_label("2025-11-17"), "11/17");
        assert_eq!(format_chart_label("not-a-date"), "not-a-date");
        assert_eq!(format_chart_label(""), "");
    }

    #[test]
    fn input_number_echo() {
        assert_eq!(format_input_number(Some(120.0)), "120");
        assert_eq!(format_input_number(Some(80.5)), "80.5");
        assert_eq!(format_input_number(None), "");
        assert_eq!(format_input_number(Some(f64::NAN)), "");
    }

    #[test]
    fn html_escaping() {
        assert_eq!(escape_html("<b>\"a\" & 'b'</b>"), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
        assert_eq!(escape_html("{{ROWS}}"), "&#123;&#123;ROWS&#125;&#125;");
    }
}
