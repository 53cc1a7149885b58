//! Number formatting for insight sentences (pure functions, no locale).

/// Compact US-dollar formatting: `$1.2B`, `$50.0M`, otherwise whole dollars
/// with thousands separators (`$12,345`).
pub fn currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let abs = amount.abs();
    if abs >= 1_000_000_000.0 {
        format!("{}${:.1}B", sign, abs / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{}${:.1}M", sign, abs / 1_000_000.0)
    } else {
        format!("{}${}", sign, number(abs))
    }
}

/// Dollar amount with cents, for per-service averages (`$1,234.56`).
pub fn currency_precise(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round();
    let whole = (cents / 100.0).trunc();
    let frac = cents - whole * 100.0;
    format!("{}${}.{:02}", sign, group_thousands(whole as u64), frac as u64)
}

/// Round to the nearest integer and insert thousands separators.
pub fn number(value: f64) -> String {
    let rounded = value.round();
    let digits = group_thousands(rounded.abs() as u64);
    if rounded < 0.0 {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// Integer percent without the sign, e.g. `-22.4` → `"22%"`.
pub fn percent(pct: f64) -> String {
    format!("{:.0}%", pct.abs())
}

/// Ratio with one decimal and an `x` suffix, e.g. `12.0x`.
pub fn ratio(value: f64) -> String {
    format!("{:.1}x", value)
}

/// English ordinal of a percentile rank clamped to 0–100: `1st`, `22nd`, `99th`.
pub fn ordinal(rank: f64) -> String {
    let n = rank.round().clamp(0.0, 100.0) as u32;
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

fn group_thousands(n: u64) -> String {
    let raw = n.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
