//! [BSON Decimal128](https://github.com/mongodb/specifications/blob/master/source/bson-decimal128/decimal128.md) data type representation

use std::{fmt, str::FromStr};

use crate::error::{Decimal128ErrorKind, Error, Result};

const EXPONENT_MAX: i64 = 6111;
const EXPONENT_MIN: i64 = -6176;
const EXPONENT_BIAS: i64 = 6176;
const MAX_DIGITS: usize = 34;

const SIGN_BIT: u32 = 127;
const COMBINATION_MASK: u128 = 0x1F;
const COMBINATION_INFINITY: u128 = 0x1E;
const COMBINATION_NAN: u128 = 0x1F;
const EXPONENT_MASK: u128 = 0x3FFF;
const COEFFICIENT_MASK: u128 = (1 << 113) - 1;

/// Struct representing a BSON Decimal128 type.
///
/// The value is stored as its 16 wire bytes; the string form is produced and parsed according to
/// the decimal128 specification without performing any arithmetic.
///
/// ```
/// use rawbson::Decimal128;
///
/// let d: Decimal128 = "-12.50".parse()?;
/// assert_eq!(d.to_string(), "-12.50");
/// assert!("12.5.0".parse::<Decimal128>().is_err());
/// # Ok::<(), rawbson::error::Error>(())
/// ```
#[derive(Copy, Clone, Hash, PartialEq, Eq)]
pub struct Decimal128 {
    /// BSON bytes containing the decimal128. Stored for round tripping.
    pub(crate) bytes: [u8; 16],
}

impl Decimal128 {
    /// Constructs a new `Decimal128` from the provided raw byte representation.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self { bytes }
    }

    /// Constructs a `Decimal128` from its high and low 64-bit halves, as they are written in the
    /// decimal128 specification.
    pub const fn from_parts(high: u64, low: u64) -> Self {
        let bits = ((high as u128) << 64) | low as u128;
        Self {
            bytes: bits.to_le_bytes(),
        }
    }

    /// Returns the raw byte representation of this `Decimal128`.
    pub const fn bytes(&self) -> [u8; 16] {
        self.bytes
    }

    fn bits(&self) -> u128 {
        u128::from_le_bytes(self.bytes)
    }

    /// Whether this value is NaN.
    pub fn is_nan(&self) -> bool {
        (self.bits() >> 122) & COMBINATION_MASK == COMBINATION_NAN
    }

    /// Whether this value is positive or negative infinity.
    pub fn is_infinite(&self) -> bool {
        (self.bits() >> 122) & COMBINATION_MASK == COMBINATION_INFINITY
    }

    fn is_negative(&self) -> bool {
        self.bits() >> SIGN_BIT == 1
    }

    /// Splits a finite value into its (unbiased exponent, coefficient) pair.
    fn finite_parts(&self) -> (i64, u128) {
        let bits = self.bits();
        // The "11" combination prefix encodes an implicit 100 coefficient prefix, which always
        // exceeds the 34 digit maximum and is therefore read as zero.
        if (bits >> 125) & 0b11 == 0b11 {
            let exponent = ((bits >> 111) & EXPONENT_MASK) as i64;
            return (exponent - EXPONENT_BIAS, 0);
        }
        let exponent = ((bits >> 113) & EXPONENT_MASK) as i64;
        let mut coefficient = bits & COEFFICIENT_MASK;
        if coefficient > max_coefficient() {
            coefficient = 0;
        }
        (exponent - EXPONENT_BIAS, coefficient)
    }

    fn encode(negative: bool, exponent: i64, coefficient: u128) -> Self {
        let biased = (exponent + EXPONENT_BIAS) as u128;
        let mut bits = (biased << 113) | coefficient;
        if negative {
            bits |= 1 << SIGN_BIT;
        }
        Self {
            bytes: bits.to_le_bytes(),
        }
    }

    fn special(negative: bool, combination: u128) -> Self {
        let mut bits = combination << 122;
        if negative {
            bits |= 1 << SIGN_BIT;
        }
        Self {
            bytes: bits.to_le_bytes(),
        }
    }
}

fn max_coefficient() -> u128 {
    10u128.pow(MAX_DIGITS as u32) - 1
}

fn digit_count(mut n: u128) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

impl fmt::Debug for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal128({})", self)
    }
}

impl fmt::Display for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nan() {
            return f.write_str("NaN");
        }
        if self.is_negative() {
            f.write_str("-")?;
        }
        if self.is_infinite() {
            return f.write_str("Infinity");
        }

        let (exponent, coefficient) = self.finite_parts();
        let digits = coefficient.to_string();
        let adjusted = exponent + digits.len() as i64 - 1;

        if exponent <= 0 && adjusted >= -6 {
            if exponent == 0 {
                return f.write_str(&digits);
            }
            let point = digits.len() as i64 + exponent;
            if point > 0 {
                let (whole, fraction) = digits.split_at(point as usize);
                write!(f, "{whole}.{fraction}")
            } else {
                write!(f, "0.{}{digits}", "0".repeat((-point) as usize))
            }
        } else {
            let (first, rest) = digits.split_at(1);
            f.write_str(first)?;
            if !rest.is_empty() {
                write!(f, ".{rest}")?;
            }
            write!(f, "E{}{adjusted}", if adjusted >= 0 { "+" } else { "" })
        }
    }
}

impl FromStr for Decimal128 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (negative, unsigned) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        if unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity") {
            return Ok(Self::special(negative, COMBINATION_INFINITY));
        }
        if unsigned.eq_ignore_ascii_case("nan") {
            return Ok(Self::special(false, COMBINATION_NAN));
        }

        let (mantissa, exponent_text) = match unsigned.find(['e', 'E']) {
            Some(at) => (&unsigned[..at], Some(&unsigned[at + 1..])),
            None => (unsigned, None),
        };

        let mut exponent: i64 = match exponent_text {
            None => 0,
            Some("") => return Err(Error::decimal128(Decimal128ErrorKind::EmptyExponent)),
            Some(text) => text.parse().map_err(|e: std::num::ParseIntError| {
                Error::decimal128(Decimal128ErrorKind::InvalidExponent {
                    message: e.to_string(),
                })
            })?,
        };

        let (whole, fraction) = match mantissa.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (mantissa, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(Error::decimal128(Decimal128ErrorKind::Unparseable));
        }
        if let Some(c) = whole
            .chars()
            .chain(fraction.chars())
            .find(|c| !c.is_ascii_digit())
        {
            return Err(Error::decimal128(Decimal128ErrorKind::InvalidCoefficient {
                message: format!("unexpected character {c:?}"),
            }));
        }

        exponent = exponent
            .checked_sub(fraction.len() as i64)
            .ok_or_else(|| Error::decimal128(Decimal128ErrorKind::Overflow))?;

        let mut digits: String = whole.chars().chain(fraction.chars()).collect();
        let significant = digits.trim_start_matches('0');
        digits = if significant.is_empty() {
            "0".to_string()
        } else {
            significant.to_string()
        };

        while digits.len() > MAX_DIGITS && digits.ends_with('0') {
            digits.pop();
            exponent += 1;
        }
        if digits.len() > MAX_DIGITS {
            return Err(Error::decimal128(Decimal128ErrorKind::InexactRounding));
        }

        let mut coefficient: u128 = digits.parse().map_err(|e: std::num::ParseIntError| {
            Error::decimal128(Decimal128ErrorKind::InvalidCoefficient {
                message: e.to_string(),
            })
        })?;

        while exponent > EXPONENT_MAX {
            if coefficient == 0 {
                exponent = EXPONENT_MAX;
            } else if digit_count(coefficient) < MAX_DIGITS {
                coefficient *= 10;
                exponent -= 1;
            } else {
                return Err(Error::decimal128(Decimal128ErrorKind::Overflow));
            }
        }
        while exponent < EXPONENT_MIN {
            if coefficient == 0 {
                exponent = EXPONENT_MIN;
            } else if coefficient % 10 == 0 {
                coefficient /= 10;
                exponent += 1;
            } else {
                return Err(Error::decimal128(Decimal128ErrorKind::Underflow));
            }
        }

        Ok(Self::encode(negative, exponent, coefficient))
    }
}
