//! Credential redaction for log fields.
//!
//! The portal logs around login, refresh and password reset, so token and
//! password material must never reach the log file verbatim.

use serde_json::{Map, Value};

/// Replacement text for redacted values.
pub const REDACTED: &str = "[REDACTED]";

const MAX_VALUE_LEN: usize = 512;

const DENYLIST_KEYS: [&str; 9] = [
    "token",
    "access_token",
    "refresh_token",
    "authorization",
    "cookie",
    "password",
    "secret",
    "otp",
    "api_key",
];

/// Returns true when a field name looks like it carries a credential.
pub fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    DENYLIST_KEYS.iter().any(|entry| lower.contains(entry))
}

/// Scrub one recorded field value. Nested objects are walked by key.
pub fn scrub(key: &str, value: Value) -> Value {
    if is_sensitive_key(key) {
        return Value::String(REDACTED.to_string());
    }

    match value {
        Value::String(s) => sanitize_string(&s),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    let v = scrub(&k, v);
                    (k, v)
                })
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| scrub(key, item)).collect())
        }
        other => other,
    }
}

/// Mask the credential after every `Bearer ` in free text and cap its length.
pub fn scrub_message(raw: &str) -> String {
    let lower = raw.to_ascii_lowercase();
    let mut out = String::with_capacity(raw.len());
    let mut cursor = 0;

    while let Some(found) = lower[cursor..].find("bearer ") {
        let token_start = cursor + found + "bearer ".len();
        let token_end = raw[token_start..]
            .find(char::is_whitespace)
            .map(|offset| token_start + offset)
            .unwrap_or(raw.len());
        out.push_str(&raw[cursor..token_start]);
        out.push_str(REDACTED);
        cursor = token_end;
    }
    out.push_str(&raw[cursor..]);

    if out.len() > MAX_VALUE_LEN {
        return format!("[TRUNCATED:len={}]", out.len());
    }
    out
}

fn sanitize_string(raw: &str) -> Value {
    if looks_like_sensitive_value(raw) {
        return Value::String(REDACTED.to_string());
    }
    if raw.len() > MAX_VALUE_LEN {
        return Value::String(format!("[TRUNCATED:len={}]", raw.len()));
    }
    Value::String(raw.to_string())
}

fn looks_like_sensitive_value(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("bearer ") {
        return true;
    }
    // JWT shape: header.payload.signature
    if raw.matches('.').count() == 2 && raw.len() > 40 && !raw.contains(' ') {
        return true;
    }
    is_long_hex(raw) || is_long_base64(raw)
}

fn is_long_hex(value: &str) -> bool {
    value.len() > 48 && value.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_long_base64(value: &str) -> bool {
    value.len() > 48
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=' || c == '_')
}
