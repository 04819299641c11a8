// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use std::sync::Arc;

/// A caller-supplied value formatter.
#[derive(Clone)]
pub struct Formatter(Arc<dyn Fn(f64) -> String + Send + Sync>);

impl Formatter {
    /// Wraps a formatting function.
    pub fn new(f: impl Fn(f64) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Formats `value`.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        (self.0)(value)
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Formatter(..)")
    }
}

/// Formats `value` with thousands separators and at most two fraction digits.
///
/// Trailing fraction zeros are dropped: `1234.5` is `"1,234.5"` and `3.0` is
/// `"3"`. A value that rounds to zero prints without a sign.
#[must_use]
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".into();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-∞" } else { "∞" }.into();
    }

    // `{:.2}` alone rounds ties to even; round half away from zero first.
    let abs = value.abs();
    let rounded = if abs < 1e15 {
        (abs * 100.0).round() / 100.0
    } else {
        abs
    };
    let fixed = format!("{rounded:.2}");
    let (int, frac) = fixed.split_once('.').unwrap_or((&fixed, ""));
    let frac = frac.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + int.len() / 3 + 1);
    if value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        out.push('-');
    }
    for (i, digit) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_and_grouping() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(15.0), "15");
        assert_eq!(format_value(1000.0), "1,000");
        assert_eq!(format_value(1_234_567.0), "1,234,567");
        assert_eq!(format_value(-98_765.0), "-98,765");
    }

    #[test]
    fn at_most_two_fraction_digits() {
        assert_eq!(format_value(1234.5), "1,234.5");
        assert_eq!(format_value(0.333_333), "0.33");
        assert_eq!(format_value(0.125), "0.13");
        assert_eq!(format_value(-2.675), "-2.67");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(2.999), "3");
        assert_eq!(format_value(-0.001), "0");
    }

    #[test]
    fn non_finite() {
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "∞");
        assert_eq!(format_value(f64::NEG_INFINITY), "-∞");
    }

    #[test]
    fn custom_formatter() {
        let percent = Formatter::new(|v| format!("{v}%"));
        assert_eq!(percent.format(12.0), "12%");
        assert_eq!(format!("{percent:?}"), "Formatter(..)");
    }
}
