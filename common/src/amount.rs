//! Fixed-point amount handling
//!
//! Amounts entered by a user are decimal strings in units of the asset (e.g.
//! "100.5" USDC); on chain they are integers scaled by the asset's decimals.
//! Parsing always rounds down, so a parsed amount never exceeds what was typed.

use alloy_primitives::{U256, utils::format_units};

/// The number of fractional digits kept when formatting amounts for display
const DISPLAY_DECIMALS: u32 = 2;

/// The error type emitted when a user-entered amount cannot be resolved
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// The amount string was empty
    #[error("amount is empty")]
    Empty,
    /// The amount string is not a non-negative decimal number
    #[error("malformed amount: {0}")]
    Malformed(String),
    /// The amount resolves to zero base units
    #[error("amount must be greater than zero")]
    Zero,
    /// The scaled amount does not fit in 256 bits
    #[error("amount overflows a uint256")]
    Overflow,
}

/// Parse a decimal string into base units of an asset with `decimals`
/// decimals
///
/// Fractional digits beyond the asset's precision are truncated. Signs,
/// exponents and separators are rejected, as is any amount that resolves to
/// zero base units.
pub fn parse_amount(text: &str, decimals: u8) -> Result<U256, AmountError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
        return Err(AmountError::Malformed(text.to_string()));
    }

    let decimals = decimals as usize;
    let frac = &frac[..frac.len().min(decimals)];

    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    digits.push_str(frac);
    digits.extend(std::iter::repeat_n('0', decimals - frac.len()));
    if digits.is_empty() {
        return Err(AmountError::Zero);
    }

    let amount = U256::from_str_radix(&digits, 10).map_err(|_| AmountError::Overflow)?;
    if amount.is_zero() {
        return Err(AmountError::Zero);
    }

    Ok(amount)
}

/// Format a base-unit amount for display, floored to two decimal places and
/// grouped by thousands, e.g. `1234567891` at 6 decimals is "1,234.56"
pub fn format_amount(value: U256, decimals: u8) -> String {
    let Some(scale) = U256::from(10u64).checked_pow(U256::from(decimals)) else {
        return "0.00".to_string();
    };

    let whole = value / scale;
    let rem = value % scale;
    let hundred = U256::from(10u64.pow(DISPLAY_DECIMALS));
    let cents = match rem.checked_mul(hundred) {
        Some(scaled) => scaled / scale,
        None => rem / (scale / hundred),
    };

    format!("{}.{:0>2}", group_thousands(&whole.to_string()), cents.to_string())
}

/// Convert a base-unit amount into a lossy floating point value, as used for
/// ratios such as share price
pub fn to_decimal(value: U256, decimals: u8) -> f64 {
    format_units(value, decimals).ok().and_then(|s| s.parse().ok()).unwrap_or(0.0)
}

/// Insert a comma between each group of three digits
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_fractional_amount() {
        assert_eq!(parse_amount("100.5", 6).unwrap(), U256::from(100_500_000u64));
        assert_eq!(parse_amount(" 250 ", 6).unwrap(), U256::from(250_000_000u64));
        assert_eq!(parse_amount(".25", 6).unwrap(), U256::from(250_000u64));
        assert_eq!(parse_amount("7.", 2).unwrap(), U256::from(700u64));
        assert_eq!(parse_amount("1.5", 18).unwrap(), U256::from(1_500_000_000_000_000_000u128));
    }

    #[test]
    fn test_parse_rounds_down_excess_precision() {
        assert_eq!(parse_amount("1.2345679", 6).unwrap(), U256::from(1_234_567u64));
        assert_eq!(parse_amount("1.9", 0).unwrap(), U256::from(1u64));
        assert_eq!(parse_amount("0.0000009", 6), Err(AmountError::Zero));
    }

    #[test]
    fn test_parse_rejects_invalid_input() {
        assert_eq!(parse_amount("", 6), Err(AmountError::Empty));
        assert_eq!(parse_amount("   ", 6), Err(AmountError::Empty));
        assert_eq!(parse_amount("0", 6), Err(AmountError::Zero));
        assert_eq!(parse_amount("0.000", 6), Err(AmountError::Zero));
        for bad in ["-1", "+1", "1e6", "1.2.3", "1,000", ".", "abc", "0x10"] {
            assert!(
                matches!(parse_amount(bad, 6), Err(AmountError::Malformed(_))),
                "expected {bad} to be rejected"
            );
        }
    }

    #[test]
    fn test_parse_overflow() {
        let huge = "9".repeat(80);
        assert_eq!(parse_amount(&huge, 6), Err(AmountError::Overflow));
    }

    #[test]
    fn test_format_amount_floors() {
        assert_eq!(format_amount(U256::from(250_000_000u64), 6), "250.00");
        assert_eq!(format_amount(U256::from(1_234_567_891u64), 6), "1,234.56");
        assert_eq!(format_amount(U256::from(999u64), 6), "0.00");
        assert_eq!(format_amount(U256::from(1_000_000_000_000u64), 6), "1,000,000.00");
        assert_eq!(format_amount(U256::from(5u64), 0), "5.00");
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(to_decimal(U256::from(2_500_000u64), 6), 2.5);
        assert_eq!(to_decimal(U256::ZERO, 18), 0.0);
    }
}
