//! Numeric sequences for `-s first..last[..step]`.

use crate::error::DofError;

/// An inclusive arithmetic sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sequence {
    pub first: f64,
    pub last: f64,
    pub step: f64,
}

impl Sequence {
    /// The values, formatted the way `%g` prints them.
    ///
    /// Values are computed as `first + i * step`. A step pointing away from
    /// `last` gives no values.
    pub fn values(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut i = 0u64;
        loop {
            let value = self.first + i as f64 * self.step;
            let in_range = if self.step > 0.0 {
                value <= self.last
            } else {
                value >= self.last
            };
            if !in_range {
                break;
            }
            out.push(format_g(value));
            i += 1;
        }
        out
    }
}

/// Parse `first..last[..step]`.
pub fn parse(text: &str) -> Result<Sequence, DofError> {
    let invalid = || DofError::InvalidSequence(text.to_string());

    let (first, rest) = text.split_once("..").ok_or_else(invalid)?;
    let (last, step) = match rest.split_once("..") {
        Some((last, step)) => (last, Some(step)),
        None => (rest, None),
    };

    let number = |text: &str| -> Result<f64, DofError> {
        text.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(invalid)
    };

    let seq = Sequence {
        first: number(first)?,
        last: number(last)?,
        step: step.map(number).transpose()?.unwrap_or(1.0),
    };
    if seq.step == 0.0 {
        return Err(invalid());
    }
    Ok(seq)
}

/// Format like C's `%g`: six significant digits, trailing zeros dropped,
/// scientific notation for very small or very large magnitudes.
pub fn format_g(value: f64) -> String {
    const PRECISION: i32 = 6;

    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // rounding to six digits can bump the exponent (999999.7 -> 1e+06)
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= PRECISION {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
