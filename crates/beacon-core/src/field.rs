//! Key/value fields attached to log entries

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

/// Key the diagnostic service uses to tag every handler with its consumer
pub const SERVICE_KEY: &str = "service";

/// Key under which a reported error is rendered
pub const ERROR_KEY: &str = "error";

/// A single named string value attached to a log entry.
///
/// Keys are not deduplicated anywhere: a list holding the same key twice is
/// handed to the backend exactly as built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub value: String,
}

impl Field {
    /// Create a field from anything string-like
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Render an error under the `error` key.
    ///
    /// The value is the error's message followed by each of its sources,
    /// joined with `": "`.
    pub fn error(err: &(dyn StdError + 'static)) -> Self {
        let mut value = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            value.push_str(": ");
            value.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::new(ERROR_KEY, value)
    }

    /// Render a timestamp as RFC 3339 with nanosecond precision
    pub fn time(key: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self::new(key, time.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }

    /// Render a duration the way `Debug` does (`1.5ms`, `2s`)
    pub fn duration(key: impl Into<String>, duration: Duration) -> Self {
        Self::new(key, format!("{:?}", duration))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, value.to_string())
    }

    /// Render any `Display` value
    pub fn display(key: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::new(key, value.to_string())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl<K, V> From<(K, V)> for Field
where
    K: Into<String>,
    V: Into<String>,
{
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_token(f, &self.key)?;
        f.write_str("=")?;
        write_token(f, &self.value)
    }
}

// Keys and values share one quoting rule
fn write_token(f: &mut fmt::Formatter<'_>, token: &str) -> fmt::Result {
    if needs_quoting(token) {
        write!(f, "{:?}", token)
    } else {
        f.write_str(token)
    }
}

/// logfmt-style rendering of an ordered field list: `k=v k2="v two"`
#[derive(Debug, Clone, Copy)]
pub struct DisplayFields<'a>(pub &'a [Field]);

impl fmt::Display for DisplayFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '=' || c == '"' || c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(thiserror::Error, Debug)]
    #[error("connection refused")]
    struct Refused;

    #[derive(thiserror::Error, Debug)]
    #[error("failed to post alert")]
    struct PostFailed {
        #[source]
        source: Refused,
    }

    #[test]
    fn test_error_field_includes_sources() {
        let err = PostFailed { source: Refused };
        let field = Field::error(&err);

        assert_eq!(field.key(), ERROR_KEY);
        assert_eq!(field.value(), "failed to post alert: connection refused");
    }

    #[test]
    fn test_time_and_duration_rendering() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();

        assert_eq!(
            Field::time("start", start).value(),
            "2024-03-01T12:30:00.000000000Z"
        );
        assert_eq!(
            Field::duration("duration", Duration::from_micros(1500)).value(),
            "1.5ms"
        );
        assert_eq!(Field::bool("enabled", false).value(), "false");
    }

    #[test]
    fn test_from_tuple() {
        let field: Field = ("task", "t1").into();
        assert_eq!(field, Field::new("task", "t1"));
    }

    #[test]
    fn test_display_fields_quotes_when_needed() {
        let fields = vec![
            Field::new("service", "http"),
            Field::new("uri", "/write?db=telegraf"),
            Field::new("agent", "curl 8.0"),
            Field::new("referer", ""),
        ];

        assert_eq!(
            DisplayFields(&fields).to_string(),
            r#"service=http uri="/write?db=telegraf" agent="curl 8.0" referer="""#
        );
    }

    #[test]
    fn test_display_fields_quotes_unsafe_keys() {
        let fields = vec![
            Field::new("task\nlevel=ERROR msg", "forged"),
            Field::new("a b", "c"),
            Field::new("", "empty"),
        ];

        let rendered = DisplayFields(&fields).to_string();
        assert_eq!(
            rendered,
            r#""task\nlevel=ERROR msg"=forged "a b"=c ""=empty"#
        );
        assert!(!rendered.contains('\n'));
    }

    #[test]
    fn test_display_fields_keeps_duplicates() {
        let fields = vec![Field::new("service", "slack"), Field::new("service", "x")];
        assert_eq!(DisplayFields(&fields).to_string(), "service=slack service=x");
    }

    #[test]
    fn test_field_serialization() {
        let field = Field::new("cluster", "c1");
        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, r#"{"key":"cluster","value":"c1"}"#);
    }
}
