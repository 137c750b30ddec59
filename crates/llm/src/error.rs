use async_openai::error::OpenAIError;
use swap_core::types::FieldError;
use thiserror::Error;

/// Everything that can go wrong between handing a command to the provider
/// and getting a contract-compliant value back. All variants surface to
/// HTTP callers as a 500 with the stringified message.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm provider request failed: {0}")]
    Provider(#[from] OpenAIError),
    #[error("llm provider request timed out after {0} seconds")]
    Timeout(u64),
    #[error("llm provider returned an empty response")]
    EmptyResponse,
    #[error("model did not call the {0} tool")]
    MissingToolCall(&'static str),
    #[error("failed to decode model output: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("model output failed contract validation: {}", format_violations(.0))]
    Contract(Vec<FieldError>),
}

fn format_violations(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_violations_are_listed_in_the_message() {
        let err = LlmError::Contract(vec![
            FieldError::new("pair.base", "Base ticker must be one of: ALOT"),
            FieldError::new("intent.baseAmount", "Base amount must be an unsigned integer or decimal amount"),
        ]);
        let text = err.to_string();
        assert!(text.contains("pair.base: Base ticker must be one of: ALOT"));
        assert!(text.contains("; intent.baseAmount:"));
    }
}
