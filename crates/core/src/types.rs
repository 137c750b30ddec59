use serde::{Deserialize, Serialize};

/// Base/quote side of a swap. Both symbols must come from the ticker
/// vocabulary; nothing forbids base == quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingPair {
    pub base: String,
    pub quote: String,
}

/// The amount side of a swap. The amount stays a string end to end; it is
/// validated against the unsigned integer/decimal pattern but never parsed
/// into a numeric type, so magnitude is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapIntent {
    #[serde(rename = "baseAmount")]
    pub base_amount: String,
}

/// Canonical parsed form of a swap command, as produced by the LLM parser
/// and re-validated locally before leaving the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapCommand {
    pub pair: TradingPair,
    pub intent: SwapIntent,
}

/// The HTTP request payload for the command-parsing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommandInput {
    pub command: String,
}

/// One violated constraint: the dotted path of the offending field plus a
/// message suitable for returning to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
