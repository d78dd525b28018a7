//! Native Amount Parsing and Formatting
//!
//! Amounts cross the UI boundary as whole-unit decimal strings ("0.0500")
//! and are converted to exact base units (wei) with integer arithmetic only.

use ethers_core::types::U256;

use crate::error::{OnyxError, OnyxResult};

/// Decimal places of the native asset
pub const NATIVE_DECIMALS: usize = 18;

/// Minimum fractional digits in rendered amounts
pub const DISPLAY_DECIMALS: usize = 4;

/// Parse a whole-unit decimal string into base units
pub fn parse_native_amount(amount: &str) -> OnyxResult<U256> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(OnyxError::invalid_amount("Amount is empty"));
    }

    let (integer_part, fractional_part) = match trimmed.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (trimmed, ""),
    };

    if integer_part.is_empty() && fractional_part.is_empty() {
        return Err(OnyxError::invalid_amount(format!("Invalid amount: {}", trimmed)));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(integer_part) || !all_digits(fractional_part) {
        return Err(OnyxError::invalid_amount(format!("Invalid amount: {}", trimmed)));
    }
    if fractional_part.len() > NATIVE_DECIMALS {
        return Err(OnyxError::invalid_amount(format!(
            "Too many decimal places: max {} decimals",
            NATIVE_DECIMALS
        )));
    }

    // Pad fractional part to full precision
    let digits = format!(
        "{}{:0<width$}",
        if integer_part.is_empty() { "0" } else { integer_part },
        fractional_part,
        width = NATIVE_DECIMALS
    );

    U256::from_dec_str(&digits).map_err(|_| OnyxError::invalid_amount("Amount overflow"))
}

/// Parse an amount that must be strictly positive
pub fn require_positive_amount(amount: &str) -> OnyxResult<U256> {
    let value = parse_native_amount(amount)?;
    if value.is_zero() {
        return Err(OnyxError::invalid_amount("Amount must be greater than zero"));
    }
    Ok(value)
}

/// Format base units as a whole-unit decimal string with at least
/// `DISPLAY_DECIMALS` fractional digits and no precision loss
pub fn format_native_amount(value: U256) -> String {
    let base = U256::exp10(NATIVE_DECIMALS);
    let integer = value / base;
    let fractional = value % base;

    let frac_str = format!("{:0>width$}", fractional.to_string(), width = NATIVE_DECIMALS);
    let mut trimmed = frac_str.trim_end_matches('0');
    if trimmed.len() < DISPLAY_DECIMALS {
        trimmed = &frac_str[..DISPLAY_DECIMALS];
    }

    format!("{}.{}", integer, trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn milli(n: u64) -> U256 {
        U256::from(n) * U256::exp10(15)
    }

    #[test]
    fn test_parse_amounts() {
        assert_eq!(parse_native_amount("1").unwrap(), U256::exp10(18));
        assert_eq!(parse_native_amount("0.0010").unwrap(), milli(1));
        assert_eq!(parse_native_amount(".5").unwrap(), milli(500));
        assert_eq!(parse_native_amount("2.").unwrap(), U256::from(2) * U256::exp10(18));
        assert_eq!(parse_native_amount("0.000000000000000001").unwrap(), U256::one());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", ".", "abc", "1.2.3", "-1", "+1", "1e18", "0.0000000000000000001", "1,5"] {
            let err = parse_native_amount(bad).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidAmount, "input: {:?}", bad);
        }
    }

    #[test]
    fn test_require_positive() {
        assert_eq!(require_positive_amount("0").unwrap_err().code, ErrorCode::InvalidAmount);
        assert_eq!(require_positive_amount("0.0000").unwrap_err().code, ErrorCode::InvalidAmount);
        assert!(require_positive_amount("0.0005").is_ok());
    }

    #[test]
    fn test_format_amounts() {
        assert_eq!(format_native_amount(U256::zero()), "0.0000");
        assert_eq!(format_native_amount(milli(50)), "0.0500");
        assert_eq!(format_native_amount(U256::exp10(18)), "1.0000");
        assert_eq!(format_native_amount(U256::from(21_000_000_000_000u64)), "0.000021");
        assert_eq!(format_native_amount(U256::one()), "0.000000000000000001");
    }
}
