//! Environment-backed defaults for the demo binary.

use dotenv::dotenv;

/// Runtime defaults, read once at startup. Command-line flags override
/// these; both exist so demo runs are reproducible without editing code.
#[derive(Clone, Debug)]
pub struct Config {
    /// Default input amount in base units of the starting token.
    pub amount_in: u64,
    /// Default minimum profit in base units of the starting token.
    pub min_profit: u64,
    /// Default slippage bound in basis points.
    pub max_slippage_bps: u32,
}

impl Config {
    /// Loads `.env` and reads `AMOUNT_IN`, `MIN_PROFIT` and
    /// `MAX_SLIPPAGE_BPS`, falling back to built-in defaults for anything
    /// unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        dotenv().ok();
        Self {
            amount_in: parse_or(std::env::var("AMOUNT_IN").ok(), 1_000_000),
            min_profit: parse_or(std::env::var("MIN_PROFIT").ok(), 0),
            max_slippage_bps: parse_or(std::env::var("MAX_SLIPPAGE_BPS").ok(), 50),
        }
    }
}

/// Parses an optional environment value, falling back on absence or parse
/// failure.
fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_fallbacks() {
        assert_eq!(parse_or(None, 42u64), 42);
        assert_eq!(parse_or(Some("not a number".to_string()), 42u64), 42);
        assert_eq!(parse_or(Some("7".to_string()), 42u64), 7);
    }
}
