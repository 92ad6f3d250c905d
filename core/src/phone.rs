// storefront-core/src/phone.rs

//! Contact phone normalization. The `orders.user_phone` column stores a
//! canonical international form (`+<country><number>`); it is written at
//! most once per order, so normalization happens before the first write.

/// Normalize a user-supplied phone number to `+<digits>`.
///
/// A leading `+` means the caller already provided a country code; bare
/// national numbers get `default_country_code` prepended. Separators
/// (spaces, dashes, parentheses, dots) are stripped. Returns `None` when
/// no plausible number remains.
pub fn normalize(raw: &str, default_country_code: &str) -> Option<String> {
  let trimmed = raw.trim();
  let (has_prefix, rest) = match trimmed.strip_prefix('+') {
    Some(rest) => (true, rest),
    None => (false, trimmed),
  };

  let mut digits = String::with_capacity(rest.len());
  for c in rest.chars() {
    if c.is_ascii_digit() {
      digits.push(c);
    } else if matches!(c, ' ' | '-' | '(' | ')' | '.') {
      continue;
    } else {
      return None;
    }
  }

  // 7 digits is the shortest national significant number in use.
  if digits.len() < 7 || digits.len() > 15 {
    return None;
  }

  if has_prefix {
    Some(format!("+{}", digits))
  } else {
    Some(format!("+{}{}", default_country_code, digits))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn prepends_default_country_code_to_national_numbers() {
    assert_eq!(normalize("5512345678", "52").as_deref(), Some("+525512345678"));
    assert_eq!(normalize("55 1234 5678", "52").as_deref(), Some("+525512345678"));
    assert_eq!(normalize("(55) 1234-5678", "52").as_deref(), Some("+525512345678"));
  }

  #[test]
  fn keeps_explicit_country_codes() {
    assert_eq!(normalize("+52 55 1234 5678", "1").as_deref(), Some("+525512345678"));
    assert_eq!(normalize("+1 555 010 9999", "52").as_deref(), Some("+15550109999"));
  }

  #[test]
  fn rejects_garbage() {
    assert_eq!(normalize("", "52"), None);
    assert_eq!(normalize("12345", "52"), None);
    assert_eq!(normalize("llamame", "52"), None);
    assert_eq!(normalize("55x1234x5678", "52"), None);
    assert_eq!(normalize("1234567890123456", "52"), None);
  }
}
