// storefront-core/src/money.rs

//! Fixed-point money helpers. All amounts in this crate are integer cents
//! (`i64`); the hosted store exposes some monetary columns with an
//! ambiguous numeric type, so values coming off the wire go through
//! [`parse_cents`] instead of a float round-trip.

/// Strictly parse a non-negative decimal string ("12", "12.5", "12.99")
/// into cents. At most two fraction digits; signs, exponents, thousands
/// separators and empty strings are all rejected.
pub fn parse_cents(raw: &str) -> Option<i64> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }

  let (whole, frac) = match raw.split_once('.') {
    Some((w, f)) => (w, f),
    None => (raw, ""),
  };

  if whole.is_empty() && frac.is_empty() {
    return None;
  }
  if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
    return None;
  }
  if frac.len() > 2 {
    return None;
  }

  let whole_val: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
  let frac_val: i64 = match frac.len() {
    0 => 0,
    1 => frac.parse::<i64>().ok()? * 10,
    _ => frac.parse().ok()?,
  };

  whole_val.checked_mul(100)?.checked_add(frac_val)
}

/// Render cents as a plain two-decimal string ("3747" -> "37.47").
pub fn format_cents(cents: i64) -> String {
  let sign = if cents < 0 { "-" } else { "" };
  let abs = cents.unsigned_abs();
  format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
