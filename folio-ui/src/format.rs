//! Number formatting for tooltip labels.

/// Format a value as US dollars: `$1,234.50`.
///
/// Negative values keep the sign after the currency symbol (`$-1,234.50`),
/// the same shape the host templates use.
pub fn usd(value: f64) -> String {
    format!("${}", grouped(value, 2))
}

/// Format a percentage with two decimals: `12.35%`
pub fn percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Share of `value` in `total` as a percentage, `0.0` when the total is zero
pub fn share_of_total(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        value / total * 100.0
    }
}

/// Fixed-precision rendering with comma thousands separators
fn grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    // "-0.00" would be odd in a tooltip
    if value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}
