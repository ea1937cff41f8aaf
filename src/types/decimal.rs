//! A fixed-point decimal kind stored as an `i128` mantissa and a base-10 scale.
//!
//! The value is `mantissa * 10^-scale`. Decimals travel on the wire as JSON
//! number literals and are never routed through `f64`, so every digit a
//! producer wrote survives a decode/encode cycle. Equality is representational:
//! `1.50` and `1.5` are different values because their scales differ.

use std::fmt;
use std::str::FromStr;

/// Largest supported scale (digits after the decimal point).
pub const MAX_DECIMAL_SCALE: u8 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal {
    mantissa: i128,
    scale: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecimalParseError {
    /// The text is not a JSON number.
    Malformed,
    /// The number has too many significant digits, or too large a scale.
    Overflow,
}

impl fmt::Display for DecimalParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecimalParseError::Malformed => f.write_str("not a decimal number"),
            DecimalParseError::Overflow => f.write_str("decimal out of range"),
        }
    }
}

impl std::error::Error for DecimalParseError {}

impl Decimal {
    /// Returns `None` when `scale` exceeds `MAX_DECIMAL_SCALE`.
    pub fn new(mantissa: i128, scale: u8) -> Option<Self> {
        (scale <= MAX_DECIMAL_SCALE).then_some(Self { mantissa, scale })
    }

    pub fn from_i64(value: i64) -> Self {
        Self {
            mantissa: value as i128,
            scale: 0,
        }
    }

    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Lossy conversion, for display and arithmetic outside the codec.
    pub fn to_f64(&self) -> f64 {
        self.mantissa as f64 / 10f64.powi(self.scale as i32)
    }
}

impl FromStr for Decimal {
    type Err = DecimalParseError;

    /// Parses the JSON number grammar: `-?digits(.digits)?([eE][+-]?digits)?`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (number, exponent) = match body.find(['e', 'E']) {
            Some(pos) => {
                let exp = &body[pos + 1..];
                let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(DecimalParseError::Malformed);
                }
                let exp: i64 = exp.parse().map_err(|_| DecimalParseError::Overflow)?;
                (&body[..pos], exp)
            }
            None => (body, 0),
        };

        let (int_part, frac_part) = match number.split_once('.') {
            Some((i, f)) if !f.is_empty() => (i, f),
            Some(_) => return Err(DecimalParseError::Malformed),
            None => (number, ""),
        };
        if int_part.is_empty()
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(DecimalParseError::Malformed);
        }

        let mut mantissa: i128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add((b - b'0') as i128))
                .ok_or(DecimalParseError::Overflow)?;
        }

        let mut scale = (frac_part.len() as i64).saturating_sub(exponent);
        if mantissa == 0 && scale < 0 {
            scale = 0;
        }
        if scale < 0 {
            let factor = u32::try_from(scale.unsigned_abs())
                .ok()
                .and_then(|p| 10i128.checked_pow(p))
                .ok_or(DecimalParseError::Overflow)?;
            mantissa = mantissa.checked_mul(factor).ok_or(DecimalParseError::Overflow)?;
            scale = 0;
        }
        // Trailing zeros beyond the supported scale carry no information.
        if mantissa == 0 {
            scale = scale.min(MAX_DECIMAL_SCALE as i64);
        }
        while scale > MAX_DECIMAL_SCALE as i64 && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }
        if scale > MAX_DECIMAL_SCALE as i64 {
            return Err(DecimalParseError::Overflow);
        }

        Ok(Self {
            mantissa: if negative { -mantissa } else { mantissa },
            scale: scale as u8,
        })
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mantissa < 0 {
            f.write_str("-")?;
        }
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return f.write_str(&digits);
        }
        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{}.{}", int_part, frac_part)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::from_i64(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display_preserve_scale() {
        for text in ["0", "1.50", "-0.05", "123456789.123456789", "-42"] {
            assert_eq!(dec(text).to_string(), text);
        }
        assert_ne!(dec("1.50"), dec("1.5"));
        assert_eq!(dec("-0.05").mantissa(), -5);
        assert_eq!(dec("-0.05").scale(), 2);
    }

    #[test]
    fn test_exponents() {
        assert_eq!(dec("1.5e3").to_string(), "1500");
        assert_eq!(dec("15E-1").to_string(), "1.5");
        assert_eq!(dec("2e+2").to_string(), "200");
        assert_eq!(dec("1e-28").scale(), 28);
    }

    #[test]
    fn test_zero_with_large_exponent() {
        assert_eq!(dec("0e400").to_string(), "0");
        assert_eq!(dec("-0.0E+99999").to_string(), "0");
        assert_eq!(dec("0.00").to_string(), "0.00");
        assert_eq!(dec("0e-400").scale(), MAX_DECIMAL_SCALE);
    }

    #[test]
    fn test_rejects_malformed_text() {
        for text in ["", "-", "1.", ".5", "1e", "abc", "1.2.3", "+1", "1e+"] {
            assert_eq!(text.parse::<Decimal>(), Err(DecimalParseError::Malformed), "{text}");
        }
    }

    #[test]
    fn test_overflow() {
        let too_many_digits = "1".repeat(40);
        assert_eq!(too_many_digits.parse::<Decimal>(), Err(DecimalParseError::Overflow));
        assert_eq!("1e-29".parse::<Decimal>(), Err(DecimalParseError::Overflow));
        assert_eq!("1e400".parse::<Decimal>(), Err(DecimalParseError::Overflow));
        // Trailing zeros past the maximum scale are trimmed rather than rejected.
        assert_eq!(dec("1.00000000000000000000000000000").scale(), MAX_DECIMAL_SCALE);
    }

    #[test]
    fn test_new_bounds_scale() {
        assert!(Decimal::new(1, MAX_DECIMAL_SCALE).is_some());
        assert!(Decimal::new(1, MAX_DECIMAL_SCALE + 1).is_none());
        assert_eq!(Decimal::from(7i64).to_string(), "7");
    }
}
