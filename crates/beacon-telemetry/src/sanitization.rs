//! Field sanitization and privacy protection

use crate::{config::PrivacyConfig, Error, Result};
use beacon_core::{Field, ERROR_KEY, SERVICE_KEY};
use regex::{Captures, Regex};

const REDACTED: &str = "[REDACTED]";

/// Redacts sensitive values from fields before they reach a sink.
///
/// A field whose key contains one of the configured names has its whole
/// value replaced. Every other value is scanned with the redaction patterns.
/// Sanitizing never adds, drops or reorders fields.
#[derive(Debug, Clone)]
pub struct FieldSanitizer {
    patterns: Vec<Regex>,
    redacted_fields: Vec<String>,
}

impl FieldSanitizer {
    /// Create a new field sanitizer
    pub fn new(config: &PrivacyConfig) -> Result<Self> {
        let mut patterns = Vec::with_capacity(config.redaction_patterns.len());

        for pattern_str in &config.redaction_patterns {
            let regex = Regex::new(pattern_str).map_err(|e| Error::Config {
                message: format!("Invalid redaction pattern '{}': {}", pattern_str, e),
            })?;
            patterns.push(regex);
        }

        Ok(Self {
            patterns,
            redacted_fields: config
                .redacted_fields
                .iter()
                .map(|field| field.to_lowercase())
                .collect(),
        })
    }

    /// Sanitize a single field
    pub fn sanitize(&self, field: &Field) -> Field {
        if self.should_redact_key(&field.key) {
            Field::new(field.key.clone(), REDACTED)
        } else {
            Field::new(field.key.clone(), self.sanitize_text(&field.value))
        }
    }

    /// Sanitize every field of a list, keeping order
    pub fn sanitize_all(&self, fields: &[Field]) -> Vec<Field> {
        fields.iter().map(|field| self.sanitize(field)).collect()
    }

    /// Apply the redaction patterns to free text
    pub fn sanitize_text(&self, text: &str) -> String {
        let mut sanitized = text.to_string();

        for pattern in &self.patterns {
            sanitized = pattern
                .replace_all(&sanitized, |caps: &Captures| {
                    if let Some(email) = caps.name("email") {
                        partially_redact_email(email.as_str())
                    } else if let Some(key) = caps.name("key") {
                        format!("{}={}", key.as_str(), REDACTED)
                    } else {
                        REDACTED.to_string()
                    }
                })
                .into_owned();
        }

        sanitized
    }

    fn should_redact_key(&self, key: &str) -> bool {
        if key == SERVICE_KEY || key == ERROR_KEY {
            return false;
        }

        let key_lower = key.to_lowercase();
        self.redacted_fields
            .iter()
            .any(|redacted| key_lower.contains(redacted.as_str()))
    }
}

/// Partially redact an email address (user@domain.com -> u***@d***.com)
fn partially_redact_email(email: &str) -> String {
    let Some((user, domain)) = email.split_once('@') else {
        return "[REDACTED_EMAIL]".to_string();
    };

    let redacted_user = match user.chars().next() {
        Some(first) if user.chars().count() > 1 => format!("{}***", first),
        _ => "*".to_string(),
    };

    let redacted_domain = match domain.find('.') {
        Some(dot_pos) => {
            let (domain_name, tld) = domain.split_at(dot_pos);
            match domain_name.chars().next() {
                Some(first) if domain_name.chars().count() > 1 => {
                    format!("{}***{}", first, tld)
                }
                _ => format!("*{}", tld),
            }
        }
        None => "***".to_string(),
    };

    format!("{}@{}", redacted_user, redacted_domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitizer() -> FieldSanitizer {
        FieldSanitizer::new(&PrivacyConfig::default()).unwrap()
    }

    #[test]
    fn test_sensitive_keys_are_redacted() {
        let sanitizer = sanitizer();

        let field = sanitizer.sanitize(&Field::new("Authorization", "Bearer abc"));
        assert_eq!(field, Field::new("Authorization", "[REDACTED]"));

        let field = sanitizer.sanitize(&Field::new("slack_token", "xoxb-1"));
        assert_eq!(field.value(), "[REDACTED]");
    }

    #[test]
    fn test_service_and_error_keys_are_never_key_redacted() {
        let config = PrivacyConfig {
            redacted_fields: vec!["service".to_string(), "error".to_string()],
            ..PrivacyConfig::default()
        };
        let sanitizer = FieldSanitizer::new(&config).unwrap();

        assert_eq!(
            sanitizer.sanitize(&Field::new("service", "slack")).value(),
            "slack"
        );
        assert_eq!(
            sanitizer.sanitize(&Field::new("error", "timeout")).value(),
            "timeout"
        );
    }

    #[test]
    fn test_patterns_apply_to_values() {
        let sanitizer = sanitizer();

        assert_eq!(
            sanitizer.sanitize_text("request failed api_key=sk-1234567890abcdef"),
            "request failed api_key=[REDACTED]"
        );
        assert_eq!(
            sanitizer.sanitize_text("card 4532-1234-5678-9012 declined"),
            "card [REDACTED] declined"
        );
        assert_eq!(
            sanitizer.sanitize_text("notify user@example.com"),
            "notify u***@e***.com"
        );
    }

    #[test]
    fn test_sanitize_all_keeps_order_and_count() {
        let sanitizer = sanitizer();
        let fields = vec![
            Field::new("service", "http"),
            Field::new("password", "hunter2"),
            Field::new("uri", "/ping"),
        ];

        let sanitized = sanitizer.sanitize_all(&fields);
        let keys: Vec<_> = sanitized.iter().map(|f| f.key()).collect();
        assert_eq!(keys, vec!["service", "password", "uri"]);
        assert_eq!(sanitized[1].value(), "[REDACTED]");
        assert_eq!(sanitized[2].value(), "/ping");
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = PrivacyConfig {
            redaction_patterns: vec!["(unclosed".to_string()],
            ..PrivacyConfig::default()
        };

        assert!(FieldSanitizer::new(&config).is_err());
    }

    #[test]
    fn test_partially_redact_email() {
        assert_eq!(partially_redact_email("john@example.com"), "j***@e***.com");
        assert_eq!(partially_redact_email("a@b.io"), "*@*.io");
        assert_eq!(partially_redact_email("nobody"), "[REDACTED_EMAIL]");
    }
}
