//! Wire encoding for a lifetime duration (§6): accepted on input as either a
//! stringified duration (`"10s"`, `"1m32s"`, `"24h"`) or a plain nanosecond
//! count; always emitted as the string form.
//!
//! Grounded in the reference implementation's `Duration` wire type
//! (`pkg/api/v1/duration.go`), which wraps `time.Duration` the same way:
//! `MarshalJSON` always produces the Go string form, `UnmarshalJSON` accepts
//! either a JSON number (nanoseconds) or that same string. `humantime`'s
//! format does not match Go's (`"1m32s"` vs humantime's `"1m 32s"`), so this
//! is hand-rolled against the same composite h/m/s grammar rather than
//! pulled in from a crate.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// A `std::time::Duration` that serializes the way the reference
/// implementation's wire type does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireDuration(pub Duration);

impl WireDuration {
    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl From<Duration> for WireDuration {
    fn from(d: Duration) -> Self {
        Self(d)
    }
}

impl Serialize for WireDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_duration(self.0))
    }
}

impl<'de> Deserialize<'de> for WireDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DurationVisitor;

        impl<'de> Visitor<'de> for DurationVisitor {
            type Value = WireDuration;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a duration string (e.g. \"24h\") or a nanosecond count")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                parse_duration(v)
                    .map(WireDuration)
                    .map_err(|e| de::Error::custom(e))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(WireDuration(Duration::from_nanos(v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                if v < 0 {
                    return Err(de::Error::custom("duration nanoseconds must not be negative"));
                }
                Ok(WireDuration(Duration::from_nanos(v as u64)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                if v < 0.0 {
                    return Err(de::Error::custom("duration nanoseconds must not be negative"));
                }
                Ok(WireDuration(Duration::from_nanos(v as u64)))
            }
        }

        deserializer.deserialize_any(DurationVisitor)
    }
}

/// Format a duration the way Go's `time.Duration.String()` composes h/m/s
/// components, trimming a trailing fractional-seconds remainder.
fn format_duration(d: Duration) -> String {
    let total_ns = d.as_nanos();
    if total_ns == 0 {
        return "0s".to_string();
    }

    let hours = total_ns / 3_600_000_000_000;
    let rem = total_ns % 3_600_000_000_000;
    let minutes = rem / 60_000_000_000;
    let rem = rem % 60_000_000_000;
    let whole_seconds = rem / 1_000_000_000;
    let sub_second_ns = rem % 1_000_000_000;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    if whole_seconds > 0 || sub_second_ns > 0 || out.is_empty() {
        if sub_second_ns == 0 {
            out.push_str(&format!("{whole_seconds}s"));
        } else {
            let frac = format!("{sub_second_ns:09}");
            let trimmed = frac.trim_end_matches('0');
            out.push_str(&format!("{whole_seconds}.{trimmed}s"));
        }
    }
    out
}

/// Parse the composite h/m/s grammar `format_duration` emits, plus the
/// sub-second units (`ms`, `us`/`µs`, `ns`) the reference implementation's
/// `time.ParseDuration` also accepts.
fn parse_duration(s: &str) -> Result<Duration, String> {
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let mut total_ns: u128 = 0;
    let mut chars = s.char_indices().peekable();
    let mut matched_any = false;

    while let Some(&(start, c)) = chars.peek() {
        if !(c.is_ascii_digit() || c == '.') {
            return Err(format!("unexpected character '{c}' in duration"));
        }

        let mut end = start;
        while let Some(&(i, c)) = chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                end = i + c.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        let number_str = &s[start..end];
        let value: f64 = number_str
            .parse()
            .map_err(|_| format!("invalid numeric component '{number_str}'"))?;

        let unit_start = end;
        let mut unit_end = end;
        while let Some(&(i, c)) = chars.peek() {
            if c.is_ascii_alphabetic() || c == 'µ' {
                unit_end = i + c.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        let unit = &s[unit_start..unit_end];

        let ns_per_unit: f64 = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1_000.0,
            "ms" => 1_000_000.0,
            "s" => 1_000_000_000.0,
            "m" => 60_000_000_000.0,
            "h" => 3_600_000_000_000.0,
            other => return Err(format!("unknown duration unit '{other}'")),
        };

        total_ns += (value * ns_per_unit).round() as u128;
        matched_any = true;
    }

    if !matched_any {
        return Err("no duration components found".to_string());
    }

    Ok(Duration::from_nanos(total_ns.min(u64::MAX as u128) as u64))
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod tests;
