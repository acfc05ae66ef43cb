//! Usage: Redaction helpers for secrets that end up in logs (session ids, tokens, error bodies).

use serde_json::Value;

const TOKEN_MASK_PREFIX_LEN: usize = 6;
const TOKEN_MASK_SUFFIX_LEN: usize = 4;
const ERROR_SNIPPET_MAX_CHARS: usize = 500;

pub(crate) fn mask_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    let len = chars.len();
    if len <= TOKEN_MASK_PREFIX_LEN + TOKEN_MASK_SUFFIX_LEN {
        return "*".repeat(len.min(8));
    }

    let prefix: String = chars[..TOKEN_MASK_PREFIX_LEN].iter().collect();
    let suffix: String = chars[len - TOKEN_MASK_SUFFIX_LEN..].iter().collect();
    format!("{prefix}...{suffix}")
}

fn is_sensitive_key(key: &str) -> bool {
    let key_lc = key.trim().to_ascii_lowercase();
    key_lc.contains("token")
        || key_lc.contains("secret")
        || key_lc.contains("nonce")
        || key_lc == "sid"
        || key_lc == "authorization"
}

fn redact_sensitive_json_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                if is_sensitive_key(key) {
                    if let Some(raw) = nested.as_str() {
                        *nested = Value::String(mask_token(raw));
                        continue;
                    }
                }
                redact_sensitive_json_fields(nested);
            }
        }
        Value::Array(items) => {
            for nested in items {
                redact_sensitive_json_fields(nested);
            }
        }
        _ => {}
    }
}

/// Truncated, redacted copy of an HTTP body for diagnostics.
pub(crate) fn sanitize_body_snippet(body: &str) -> String {
    if let Ok(mut value) = serde_json::from_str::<Value>(body) {
        redact_sensitive_json_fields(&mut value);
        if let Ok(encoded) = serde_json::to_string(&value) {
            return encoded.chars().take(ERROR_SNIPPET_MAX_CHARS).collect();
        }
    }
    body.chars().take(ERROR_SNIPPET_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::{mask_token, sanitize_body_snippet};

    #[test]
    fn mask_token_keeps_prefix_and_suffix() {
        assert_eq!(mask_token("abcdef1234567890"), "abcdef...7890");
    }

    #[test]
    fn mask_token_short_values_redacts_fully() {
        assert_eq!(mask_token("abcd"), "****");
        assert_eq!(mask_token("   "), "");
    }

    #[test]
    fn mask_token_does_not_split_multibyte_chars() {
        assert_eq!(mask_token("ééééééxxxxxxéééé"), "éééééé...éééé");
    }

    #[test]
    fn sanitize_body_snippet_masks_token_fields() {
        let raw = r#"{
          "error": "bad nonce",
          "customToken": "tok_abcdefghijklmnop",
          "nested": {"sid": "session-1234567890"}
        }"#;
        let snippet = sanitize_body_snippet(raw);
        assert!(snippet.contains("bad nonce"));
        assert!(!snippet.contains("tok_abcdefghijklmnop"));
        assert!(!snippet.contains("session-1234567890"));
        assert!(snippet.contains(mask_token("tok_abcdefghijklmnop").as_str()));
    }

    #[test]
    fn sanitize_body_snippet_truncates_plain_text() {
        let body = "x".repeat(2_000);
        assert_eq!(sanitize_body_snippet(&body).len(), 500);
    }
}
