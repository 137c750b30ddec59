use std::time::Duration;

use anyhow::{Context, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionNamedToolChoice, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionToolArgs,
        ChatCompletionToolChoiceOption, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        FunctionName, FunctionObjectArgs,
    },
    Client as OpenAIClient,
};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

use swap_core::config::{AppConfig, LlmConfig};
use swap_core::schema::{swap_command_schema, Schema};
use swap_core::types::SwapCommand;
use swap_core::vocabulary::Vocabulary;

use crate::error::LlmError;

/// Name of the tool the model is forced to call when parsing a command.
pub const SWAP_TOOL_NAME: &str = "emit_swap_command";

const STRUCTURED_CALL_TIMEOUT_SECS: u64 = 15;

/// The completion capability the HTTP layer depends on. Implemented by
/// `LlmClient` in production and by stubs in the endpoint tests.
#[async_trait]
pub trait CommandInterpreter: Send + Sync {
    /// Plain, unstructured completion for a single prompt.
    async fn chat_completion(&self, prompt: &str) -> Result<String, LlmError>;

    /// Parse a trimmed, non-empty free-text command into a `SwapCommand`.
    async fn parse_swap_command(&self, command: &str) -> Result<SwapCommand, LlmError>;
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    client: OpenAIClient<OpenAIConfig>,
    config: LlmConfig,
    vocabulary: Vocabulary,
    swap_schema: Schema,
}

impl LlmClient {
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let llm = config.require_llm_config()?.clone();
        Self::new(llm, Vocabulary::default())
    }

    pub fn new(config: LlmConfig, vocabulary: Vocabulary) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .context("failed to build HTTP client")?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.clone())
            .with_api_base(config.endpoint.trim_end_matches('/').to_string());

        let swap_schema = swap_command_schema(&vocabulary);

        Ok(Self {
            client: OpenAIClient::with_config(openai_config).with_http_client(http_client),
            config,
            vocabulary,
            swap_schema,
        })
    }
}

#[async_trait]
impl CommandInterpreter for LlmClient {
    #[instrument(skip(self, prompt), fields(model = %self.config.model))]
    async fn chat_completion(&self, prompt: &str) -> Result<String, LlmError> {
        let system_message = ChatCompletionRequestSystemMessageArgs::default()
            .content("You are a helpful assistant.")
            .build()?;

        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(self.config.model.clone())
            .messages([system_message.into(), user_message.into()])
            .build()?;

        info!(
            prompt = %truncate_for_log(prompt, 240),
            "sending chat completion request"
        );

        let response = self.client.chat().create(chat_request).await?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or(LlmError::EmptyResponse)
    }

    #[instrument(skip(self, command), fields(model = %self.config.model))]
    async fn parse_swap_command(&self, command: &str) -> Result<SwapCommand, LlmError> {
        let function = FunctionObjectArgs::default()
            .name(SWAP_TOOL_NAME)
            .description("Record the structured swap command extracted from the user instruction.")
            .parameters(Some(self.swap_schema.json_schema()))
            .build()?;

        let tool = ChatCompletionToolArgs::default().function(function).build()?;

        let system_message = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt(&self.vocabulary))
            .build()?;

        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(command)
            .build()?;

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(self.config.model.clone())
            .messages([system_message.into(), user_message.into()])
            .tools(vec![tool])
            .tool_choice(ChatCompletionToolChoiceOption::Named(
                ChatCompletionNamedToolChoice {
                    r#type: ChatCompletionToolType::Function,
                    function: FunctionName {
                        name: SWAP_TOOL_NAME.to_string(),
                    },
                },
            ))
            .temperature(0_f32)
            .build()?;

        info!(
            command = %truncate_for_log(command, 240),
            "requesting structured swap command"
        );

        let started = std::time::Instant::now();
        let response = match tokio::time::timeout(
            Duration::from_secs(STRUCTURED_CALL_TIMEOUT_SECS),
            self.client.chat().create(chat_request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                warn!(
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    error = %err,
                    "structured swap call failed"
                );
                return Err(err.into());
            }
            Err(_) => {
                warn!(
                    timeout_secs = STRUCTURED_CALL_TIMEOUT_SECS,
                    "structured swap call timed out"
                );
                return Err(LlmError::Timeout(STRUCTURED_CALL_TIMEOUT_SECS));
            }
        };

        let choice = response.choices.first().ok_or(LlmError::EmptyResponse)?;
        let tool_call = choice
            .message
            .tool_calls
            .as_ref()
            .and_then(|calls| calls.first())
            .ok_or(LlmError::MissingToolCall(SWAP_TOOL_NAME))?;

        let arguments: serde_json::Value = serde_json::from_str(&tool_call.function.arguments)?;

        // Provider output is not trusted: re-validate against the same
        // schema that produced the contract.
        self.swap_schema
            .validate(&arguments)
            .map_err(LlmError::Contract)?;

        let parsed: SwapCommand = serde_json::from_value(arguments)?;

        info!(
            base = %parsed.pair.base,
            quote = %parsed.pair.quote,
            amount = %parsed.intent.base_amount,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "swap command parsed"
        );

        Ok(parsed)
    }
}

fn system_prompt(vocabulary: &Vocabulary) -> String {
    format!(
        "You are a swap command parser for a token exchange.\n\
         Extract the trading pair and the amount to swap from the user's instruction.\n\
         Allowed tickers (case-sensitive, copy them verbatim): {}.\n\
         Amounts must be unsigned integer or decimal strings such as \"1.5\".\n\
         Call {} exactly once with the extracted fields.",
        vocabulary.ticker_list(),
        SWAP_TOOL_NAME,
    )
}

fn truncate_for_log(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    text.chars().take(max_chars).collect::<String>() + "…"
}
