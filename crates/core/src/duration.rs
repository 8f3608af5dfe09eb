//! Interval strings such as `1h`, `90s`, `1h30m` or `1.5h`.

use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fraction digits beyond this are below nanosecond resolution for every unit.
const MAX_FRACTION_DIGITS: usize = 18;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("Duration must not be empty")]
    Empty,

    #[error("Invalid duration '{0}': expected <number><unit> pairs, e.g. 1h30m or 1.5h")]
    Malformed(String),

    #[error("Invalid duration '{input}': unknown unit '{unit}' (use ns, us, ms, s, m or h)")]
    UnknownUnit { input: String, unit: String },

    #[error("Duration '{0}' must be greater than zero")]
    Zero(String),
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Parse a sequence of `<decimal><unit>` pairs into a [`Duration`].
///
/// Accepts the same shapes as Go's `time.ParseDuration`: each number may
/// carry a fraction (`1.5h`, `.5s`) and units are `ns`, `us` (or `µs`),
/// `ms`, `s`, `m`, `h`. Signs are not accepted and a zero total is
/// rejected. Fractions are truncated to whole nanoseconds.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationError::Empty);
    }

    let malformed = || DurationError::Malformed(input.to_string());
    let mut total: u128 = 0;
    let mut rest = s;

    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let whole = &rest[..int_len];
        rest = &rest[int_len..];

        let mut fraction = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            fraction = &after_dot[..frac_len];
            rest = &after_dot[frac_len..];
        }

        if whole.is_empty() && fraction.is_empty() {
            return Err(malformed());
        }

        let unit_len = rest
            .bytes()
            .position(|b| b == b'.' || b.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        if unit.is_empty() {
            return Err(malformed());
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            input: input.to_string(),
            unit: unit.to_string(),
        })?;

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| malformed())?
        };
        let mut step = whole.checked_mul(scale).ok_or_else(malformed)?;

        let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
        if !fraction.is_empty() {
            let numerator: u128 = fraction.parse().map_err(|_| malformed())?;
            let denominator = 10u128.pow(fraction.len() as u32);
            step = step
                .checked_add(numerator * scale / denominator)
                .ok_or_else(malformed)?;
        }

        total = total.checked_add(step).ok_or_else(malformed)?;
    }

    if total == 0 {
        return Err(DurationError::Zero(input.to_string()));
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| malformed())?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}
