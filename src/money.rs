// 💵 Monetary Parser - "$5,469.30" → 5469.30
// Registry amounts arrive as display strings, never as numbers.

/// Characters removed before parsing: currency symbol and thousands separator
const STRIPPED_CHARS: [char; 2] = ['$', ','];

/// Parse a formatted currency string into a number.
///
/// Returns `None` when nothing numeric is left after stripping the symbol and
/// separators ("", "N/A", "$", "12abc"), and for non-finite results ("NaN", "inf").
///
/// ```
/// use salary_ledger::money::parse_amount;
///
/// assert_eq!(parse_amount("$5,469.30"), Some(5469.30));
/// assert_eq!(parse_amount("N/A"), None);
/// ```
pub fn parse_amount(label: &str) -> Option<f64> {
    let cleaned: String = label
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect();

    let value = cleaned.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Parse an amount that may arrive either as a JSON number or a formatted string
pub fn parse_amount_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => parse_amount(s),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
