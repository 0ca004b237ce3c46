//! Display formatting shared by the API and CLI.

pub const NOT_AVAILABLE: &str = "N/A";

pub fn price(value: f64) -> String {
    format!("${value:.2}")
}

pub fn optional_price(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), price)
}

/// `2.8e12` -> `"$2800.00B"`; the dashboard always quotes market cap in billions.
pub fn market_cap_billions(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("${:.2}B", v / 1e9))
}

pub fn volume_millions(value: f64) -> String {
    format!("{:.2}M", value / 1e6)
}

/// Sign-prefixed percent: `+2.50%`, `-0.80%`. Zero counts as positive.
pub fn signed_percent(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{value:.2}%")
}

/// Sign-prefixed with two decimals and no unit, for sentiment in [-1, 1].
pub fn signed(value: f64) -> String {
    let sign = if value > 0.0 { "+" } else { "" };
    format!("{sign}{value:.2}")
}

pub fn score(value: f64) -> String {
    format!("{value:.1}")
}

pub fn ratio(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.2}"))
}

/// Thousands separators for whole counts: `1234567` -> `"1,234,567"`.
pub fn grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
