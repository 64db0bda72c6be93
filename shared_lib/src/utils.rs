use sha2::{Digest, Sha256};
use validator::ValidateEmail;

pub fn duration_to_ms_string(duration: std::time::Duration) -> String {
    format!("{:.2}ms", duration.as_secs_f64() * 1000.0)
}

pub fn hash_string(string: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(string);
    format!("{:x}", hasher.finalize())
}

/// Strips markup and control characters from free text input, collapses runs of
/// whitespace and trims the result.
pub fn sanitize_text_field(input: &str) -> String {
    let mut stripped = String::with_capacity(input.len());
    // a '<' past the last '>' can never open a tag
    let last_close = input.rfind('>');
    let mut pos = 0;

    while let Some(c) = input[pos..].chars().next() {
        if c == '<' && last_close.is_some_and(|close| close > pos) {
            if let Some(end) = input[pos..].find('>') {
                stripped.push(' ');
                pos += end + 1;
                continue;
            }
        }

        if c.is_control() {
            stripped.push(' ');
        } else {
            stripped.push(c);
        }
        pos += c.len_utf8();
    }

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trims an email address and drops any whitespace or control characters in it.
/// The result is not required to be a valid address.
pub fn sanitize_email(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect()
}

pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}

/// Reads the leading integer of a string the way loosely typed configuration is
/// usually coerced: leading whitespace is skipped, an optional sign and the
/// following digits are parsed, anything after them is ignored.
pub fn coerce_to_int(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, value.strip_prefix('+').unwrap_or(value)),
    };

    let digits: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    digits.parse::<i64>().ok().map(|number| number * sign)
}
