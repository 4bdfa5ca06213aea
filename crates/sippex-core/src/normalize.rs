//! SIPp header -> metric name normalization.
//!
//! Rules (applied in order):
//! - `(P)` / `(C)` suffixes collapse to `P` / `C`
//! - `<` becomes `lt_`, `>=` becomes `ge_`
//! - camel-case and acronym boundaries get an underscore
//! - everything is lowercased and prefixed with `sipp_`

/// Prefix shared by every exported metric.
pub const METRIC_PREFIX: &str = "sipp_";

/// Normalize one raw header token.
///
/// Returns `None` for blank tokens (unused trailing CSV columns).
pub fn normalize_header(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let s = raw
        .replace("(P)", "P")
        .replace("(C)", "C")
        .replace('<', "lt_")
        .replace(">=", "ge_");

    let s = split_camel(&s);
    let s = split_acronym(&s);

    Some(format!("{METRIC_PREFIX}{}", s.to_lowercase()))
}

// `aB` / `1B` -> `a_B` / `1_B`
fn split_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push('_');
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

// `UDPRetrans` -> `UDP_Retrans`
fn split_acronym(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev: Option<char> = None;
    let mut it = s.chars().peekable();
    while let Some(c) = it.next() {
        let next_lower = it.peek().is_some_and(|n| n.is_ascii_lowercase());
        if c.is_ascii_uppercase() && next_lower && prev.is_some_and(|p| p.is_ascii_uppercase()) {
            out.push('_');
        }
        out.push(c);
        prev = Some(c);
    }
    out
}
