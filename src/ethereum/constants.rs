//! Ethereum network constants.
//!
//! Contains chain IDs, Chainlink denomination identifiers and mainnet
//! feed addresses.

use alloy::primitives::{address, Address};

// ============================================================================
// Chain IDs
// ============================================================================

/// Ethereum Mainnet chain ID.
pub const ETHEREUM_MAINNET_CHAIN_ID: u64 = 1;

/// Sepolia testnet chain ID.
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

// ============================================================================
// Chainlink Denominations
// ============================================================================

/// Denomination used for ether as a base or quote asset.
pub const DENOMINATION_ETH: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Denomination used for bitcoin as a base or quote asset.
pub const DENOMINATION_BTC: Address = address!("bBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB");

/// US Dollar (ISO 4217 numeric code 840).
pub const DENOMINATION_USD: Address = address!("0000000000000000000000000000000000000348");

/// Euro (ISO 4217 numeric code 978).
pub const DENOMINATION_EUR: Address = address!("00000000000000000000000000000000000003d2");

/// Pound sterling (ISO 4217 numeric code 826).
pub const DENOMINATION_GBP: Address = address!("000000000000000000000000000000000000033a");

/// Japanese yen (ISO 4217 numeric code 392).
pub const DENOMINATION_JPY: Address = address!("0000000000000000000000000000000000000188");

/// Resolve a denomination symbol (case-insensitive) to its identifier.
pub fn denomination(symbol: &str) -> Option<Address> {
    match symbol.to_uppercase().as_str() {
        "ETH" => Some(DENOMINATION_ETH),
        "BTC" => Some(DENOMINATION_BTC),
        "USD" => Some(DENOMINATION_USD),
        "EUR" => Some(DENOMINATION_EUR),
        "GBP" => Some(DENOMINATION_GBP),
        "JPY" => Some(DENOMINATION_JPY),
        _ => None,
    }
}

// ============================================================================
// Token Addresses (Ethereum Mainnet)
// ============================================================================

/// Chainlink token (LINK) address on Ethereum Mainnet.
pub const LINK_ADDRESS: Address = address!("514910771AF9Ca656af840dff83E8264EcF986CA");

/// USDC address on Ethereum Mainnet.
pub const USDC_ADDRESS: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

// ============================================================================
// Chainlink Price Feed Addresses (Ethereum Mainnet)
// ============================================================================

/// Chainlink ETH/USD proxy on Ethereum Mainnet.
pub const ETH_USD_FEED: Address = address!("5f4eC3Df9cbd43714FE2740f5E3616155c5b8419");

/// Chainlink BTC/USD proxy on Ethereum Mainnet.
pub const BTC_USD_FEED: Address = address!("F4030086522a5bEEa4988F8cA5B36dbC97BeE88c");

/// Chainlink LINK/USD proxy on Ethereum Mainnet.
pub const LINK_USD_FEED: Address = address!("2c1d072e956AFFC0D435Cb7AC38EF18d24d9127c");

/// Chainlink USDC/USD proxy on Ethereum Mainnet.
pub const USDC_USD_FEED: Address = address!("8fFfFfd4AfB6115b954Bd326cbe7B4BA576818f6");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denomination_lookup_is_case_insensitive() {
        assert_eq!(denomination("usd"), Some(DENOMINATION_USD));
        assert_eq!(denomination("Eth"), Some(DENOMINATION_ETH));
        assert_eq!(denomination("LINK"), None);
    }

    #[test]
    fn test_fiat_denominations_are_iso_codes() {
        assert_eq!(DENOMINATION_USD.as_slice()[19], 0x48);
        assert_eq!(&DENOMINATION_EUR.as_slice()[18..], &[0x03, 0xd2]);
    }
}
