//! Durations and chrono date types.

use super::descriptor::TypeDescriptor;
use super::{leaf_value, Decoder, DecoderContext, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use cfgweave_model::{ConfigNode, GResult, Tags, ValidationError};
use std::time::Duration;

/// Plain integers are milliseconds; otherwise a number with one of the
/// suffixes `ms`, `s`, `m`, `h`, `d`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationDecoder;

impl Decoder for DurationDecoder {
    fn name(&self) -> &str {
        "Duration"
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        *ty == TypeDescriptor::Duration
    }

    fn decode(
        &self,
        path: &str,
        _tags: &Tags,
        node: &ConfigNode,
        _ty: &TypeDescriptor,
        _ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        let text = match leaf_value(path, node, self.name()) {
            Ok(text) => text,
            Err(err) => return GResult::fail_one(err),
        };
        match parse_duration(text) {
            Some(duration) => GResult::ok(Value::Duration(duration)),
            None => GResult::fail_one(ValidationError::DecodingDuration {
                path: path.to_string(),
                value: text.to_string(),
            }),
        }
    }
}

fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (amount, unit) = text.split_at(split);
    let amount: u64 = amount.parse().ok()?;
    let seconds = |factor: u64| amount.checked_mul(factor).map(Duration::from_secs);
    match unit.trim() {
        "" | "ms" => Some(Duration::from_millis(amount)),
        "s" => Some(Duration::from_secs(amount)),
        "m" => seconds(60),
        "h" => seconds(60 * 60),
        "d" => seconds(24 * 60 * 60),
        _ => None,
    }
}

fn date_error(path: &str, text: &str, format: &str, err: chrono::ParseError) -> ValidationError {
    ValidationError::DecodingDateTime {
        path: path.to_string(),
        value: text.to_string(),
        format: format.to_string(),
        reason: err.to_string(),
    }
}

/// Date-time with offset, RFC 3339 unless another format is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeDecoder;

impl Decoder for DateTimeDecoder {
    fn name(&self) -> &str {
        "DateTime"
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        *ty == TypeDescriptor::DateTime
    }

    fn decode(
        &self,
        path: &str,
        _tags: &Tags,
        node: &ConfigNode,
        _ty: &TypeDescriptor,
        ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        let text = match leaf_value(path, node, self.name()) {
            Ok(text) => text.trim(),
            Err(err) => return GResult::fail_one(err),
        };
        let format = &ctx.settings.date_time_format;
        let parsed = if ctx.settings.uses_rfc3339() {
            DateTime::parse_from_rfc3339(text)
        } else {
            DateTime::parse_from_str(text, format)
        };
        match parsed {
            Ok(value) => GResult::ok(Value::DateTime(value)),
            Err(err) => GResult::fail_one(date_error(path, text, format, err)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateDecoder;

impl Decoder for DateDecoder {
    fn name(&self) -> &str {
        "LocalDate"
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        *ty == TypeDescriptor::Date
    }

    fn decode(
        &self,
        path: &str,
        _tags: &Tags,
        node: &ConfigNode,
        _ty: &TypeDescriptor,
        ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        let text = match leaf_value(path, node, self.name()) {
            Ok(text) => text.trim(),
            Err(err) => return GResult::fail_one(err),
        };
        let format = &ctx.settings.date_format;
        match NaiveDate::parse_from_str(text, format) {
            Ok(value) => GResult::ok(Value::Date(value)),
            Err(err) => GResult::fail_one(date_error(path, text, format, err)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDateTimeDecoder;

impl Decoder for LocalDateTimeDecoder {
    fn name(&self) -> &str {
        "LocalDateTime"
    }

    fn matches(&self, ty: &TypeDescriptor) -> bool {
        *ty == TypeDescriptor::LocalDateTime
    }

    fn decode(
        &self,
        path: &str,
        _tags: &Tags,
        node: &ConfigNode,
        _ty: &TypeDescriptor,
        ctx: &DecoderContext<'_>,
    ) -> GResult<Value> {
        let text = match leaf_value(path, node, self.name()) {
            Ok(text) => text.trim(),
            Err(err) => return GResult::fail_one(err),
        };
        let format = &ctx.settings.local_date_time_format;
        match NaiveDateTime::parse_from_str(text, format) {
            Ok(value) => GResult::ok(Value::LocalDateTime(value)),
            Err(err) => GResult::fail_one(date_error(path, text, format, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::super::DecoderSettings;
    use super::*;
    use chrono::{Datelike, Timelike};

    fn decode(text: &str, ty: TypeDescriptor) -> GResult<Value> {
        Fixture::new().decode(&ConfigNode::leaf(text), &ty)
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("1500"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_duration("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("2h"), Some(Duration::from_secs(7200)));
        assert_eq!(parse_duration("1d"), Some(Duration::from_secs(86400)));
        assert_eq!(parse_duration("10 s"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("s"), None);
        assert_eq!(parse_duration("5w"), None);
        assert_eq!(parse_duration("-5s"), None);
    }

    #[test]
    fn test_duration_error() {
        let result = decode("soon", TypeDescriptor::Duration);
        assert!(matches!(
            result.errors()[0],
            ValidationError::DecodingDuration { .. }
        ));
    }

    #[test]
    fn test_rfc3339() {
        let value = decode("2024-03-01T10:15:30+02:00", TypeDescriptor::DateTime)
            .into_value()
            .unwrap();
        let Value::DateTime(dt) = value else {
            panic!("expected date-time");
        };
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_custom_date_time_format() {
        let fixture = Fixture::with_settings(DecoderSettings {
            date_time_format: "%d/%m/%Y %H:%M %z".to_string(),
            ..DecoderSettings::default()
        });
        let result = fixture.decode(
            &ConfigNode::leaf("01/03/2024 10:15 +0000"),
            &TypeDescriptor::DateTime,
        );
        assert!(result.has_results(), "{:?}", result.errors());
    }

    #[test]
    fn test_date_and_local_date_time() {
        let Some(Value::Date(date)) = decode("2024-02-29", TypeDescriptor::Date).into_value() else {
            panic!("expected date");
        };
        assert_eq!(date.day(), 29);

        let result = decode("2024-02-29T08:00:00", TypeDescriptor::LocalDateTime);
        assert!(result.has_results());

        let result = decode("2023-02-29", TypeDescriptor::Date);
        assert!(matches!(
            &result.errors()[0],
            ValidationError::DecodingDateTime { format, .. } if format == "%Y-%m-%d"
        ));
    }
}
