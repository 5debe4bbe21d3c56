use alloy::primitives::U256;
use eyre::Context as _;

/// Base-unit exponent for native EVM values (wei -> ether).
pub const WEI_DECIMALS: u32 = 18;

/// Parse an unsigned base-unit quantity written either in decimal or as `0x`-prefixed hex.
pub fn parse_quantity_u256(s: &str) -> eyre::Result<U256> {
    let s = s.trim();
    if s.is_empty() {
        eyre::bail!("empty quantity");
    }
    if s.starts_with('-') {
        eyre::bail!("quantity must be non-negative");
    }

    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex.is_empty() {
            return Ok(U256::ZERO);
        }
        return U256::from_str_radix(hex, 16).context("parse hex quantity");
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        eyre::bail!("invalid quantity: {s}");
    }
    U256::from_str_radix(s, 10).context("parse decimal quantity")
}

/// Format a base-unit integer amount into a minimal decimal string without using floats.
///
/// Examples:
/// - base=10^18, decimals=18 => "1"
/// - base=1500000, decimals=6 => "1.5"
/// - base=1, decimals=18 => "0.000000000000000001"
pub fn format_amount_base_to_ui_string(base: U256, decimals: u32) -> eyre::Result<String> {
    if decimals == 0 {
        return Ok(base.to_string());
    }
    let scale = U256::from(10_u8)
        .checked_pow(U256::from(decimals))
        .ok_or_else(|| eyre::eyre!("decimals too large"))?;
    let whole = base / scale;
    let frac = base % scale;
    if frac.is_zero() {
        return Ok(whole.to_string());
    }
    let width = usize::try_from(decimals).context("decimals out of range")?;
    let frac_s = format!("{:0>width$}", frac.to_string());
    let frac_s = frac_s.trim_end_matches('0');
    Ok(format!("{whole}.{frac_s}"))
}

/// Convert a wei quantity string into its ether-denominated decimal string.
pub fn wei_to_ether_string(wei: &str) -> eyre::Result<String> {
    let v = parse_quantity_u256(wei)?;
    format_amount_base_to_ui_string(v, WEI_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decimal_and_hex() -> eyre::Result<()> {
        assert_eq!(parse_quantity_u256("0")?, U256::ZERO);
        assert_eq!(parse_quantity_u256("42")?, U256::from(42_u8));
        assert_eq!(parse_quantity_u256("0x2a")?, U256::from(42_u8));
        assert_eq!(parse_quantity_u256("0x")?, U256::ZERO);
        Ok(())
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_quantity_u256("").is_err());
        assert!(parse_quantity_u256("-1").is_err());
        assert!(parse_quantity_u256("1.5").is_err());
        assert!(parse_quantity_u256("0xzz").is_err());
    }

    #[test]
    fn format_base_to_ui() -> eyre::Result<()> {
        assert_eq!(
            format_amount_base_to_ui_string(U256::from(1_500_000_u64), 6)?,
            "1.5"
        );
        assert_eq!(format_amount_base_to_ui_string(U256::from(1_u8), 6)?, "0.000001");
        assert_eq!(
            format_amount_base_to_ui_string(U256::from(10_000_000_u64), 6)?,
            "10"
        );
        assert_eq!(format_amount_base_to_ui_string(U256::from(7_u8), 0)?, "7");
        Ok(())
    }

    #[test]
    fn wei_scaling() -> eyre::Result<()> {
        assert_eq!(wei_to_ether_string("1000000000000000000")?, "1");
        assert_eq!(wei_to_ether_string("0")?, "0");
        assert_eq!(wei_to_ether_string("1")?, "0.000000000000000001");
        assert_eq!(wei_to_ether_string("2500000000000000000")?, "2.5");
        assert_eq!(wei_to_ether_string("0xde0b6b3a7640000")?, "1");
        Ok(())
    }
}
