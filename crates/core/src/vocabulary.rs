/// Ticker symbols the service will accept in a trading pair. Matching is
/// exact and case-sensitive ("BTC.b" and "btc.b" are distinct symbols).
pub const DEFAULT_TICKERS: &[&str] = &[
    "ALOT", "ARENA", "AVAX", "BTC.b", "COQ", "EUROC", "GMX", "JOE", "PNG", "sAVAX", "USDC",
    "USDt", "WETH.e",
];

/// Operations the command surface understands. Only `swap` has an HTTP
/// endpoint today; the rest are reported at startup for operators.
pub const DEFAULT_OPERATIONS: &[&str] = &["swap", "send", "getBalance"];

/// The fixed vocabularies that bound valid domain values. Constructed once
/// at process start and handed to the schema builder and the LLM client;
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    tickers: Vec<String>,
    operations: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|s| s.to_string()).collect(),
            operations: DEFAULT_OPERATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Vocabulary {
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn operations(&self) -> &[String] {
        &self.operations
    }

    pub fn is_allowed_ticker(&self, symbol: &str) -> bool {
        self.tickers.iter().any(|t| t == symbol)
    }

    /// Comma-joined ticker list, as embedded in prompts and error messages.
    pub fn ticker_list(&self) -> String {
        self.tickers.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_case_sensitive() {
        let vocab = Vocabulary::default();
        assert!(vocab.is_allowed_ticker("BTC.b"));
        assert!(!vocab.is_allowed_ticker("btc.b"));
        assert!(!vocab.is_allowed_ticker("BTC"));
    }

    #[test]
    fn ticker_list_preserves_order() {
        let vocab = Vocabulary::default();
        assert!(vocab.ticker_list().starts_with("ALOT, ARENA"));
    }
}
