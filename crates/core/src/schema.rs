use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

use crate::types::FieldError;
use crate::vocabulary::Vocabulary;

/// Unsigned integer or decimal: no sign, no exponent, no separators.
pub const AMOUNT_PATTERN: &str = r"^\d+(\.\d+)?$";

/// A declarative object schema: field name -> constraint. The same
/// description drives both the local validator (`validate`) and the output
/// contract sent to the LLM provider (`json_schema`).
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<Field>,
}

#[derive(Debug, Clone)]
pub struct Field {
    name: &'static str,
    label: &'static str,
    required: bool,
    constraint: Constraint,
}

#[derive(Debug, Clone)]
pub enum Constraint {
    /// Exact-match membership in a fixed string set. Case-sensitive, no
    /// normalization.
    OneOf(Vec<String>),
    /// String matching a regex; the pattern string is carried alongside the
    /// compiled form so it can be emitted into the provider contract.
    Pattern {
        pattern: &'static str,
        regex: Regex,
        hint: &'static str,
    },
    /// Non-empty string (whitespace-only counts as empty).
    NonEmptyText,
    /// A nested object described by its own schema.
    Nested(Schema),
}

impl Field {
    pub fn required(name: &'static str, label: &'static str, constraint: Constraint) -> Self {
        Self {
            name,
            label,
            required: true,
            constraint,
        }
    }

    pub fn optional(name: &'static str, label: &'static str, constraint: Constraint) -> Self {
        Self {
            name,
            label,
            required: false,
            constraint,
        }
    }
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Check a candidate value against every field rule. Returns all
    /// violations, one entry per constraint, rather than stopping at the
    /// first. No coercion across types and no defaulting of missing fields.
    pub fn validate(&self, value: &Value) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        self.collect_errors(value, "", &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn collect_errors(&self, value: &Value, prefix: &str, errors: &mut Vec<FieldError>) {
        for field in &self.fields {
            let path = join_path(prefix, field.name);
            match value.get(field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        errors.push(FieldError::new(
                            path,
                            format!("{} is required", field.label),
                        ));
                    }
                }
                Some(entry) => field.constraint.check(entry, field.label, &path, errors),
            }
        }
    }

    /// Render the schema as a JSON-Schema object suitable for a provider
    /// output contract (tool parameters). Every validator rule above has a
    /// counterpart here: enum membership, string patterns, required lists.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            if field.required {
                required.push(Value::String(field.name.to_string()));
            }
            properties.insert(field.name.to_string(), field.constraint.json_schema(field.label));
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

impl Constraint {
    fn check(&self, value: &Value, label: &str, path: &str, errors: &mut Vec<FieldError>) {
        match self {
            Constraint::OneOf(allowed) => match value.as_str() {
                None => errors.push(FieldError::new(
                    path,
                    format!("{label} must be a string"),
                )),
                Some(s) if !allowed.iter().any(|a| a == s) => errors.push(FieldError::new(
                    path,
                    format!("{label} must be one of: {}", allowed.join(", ")),
                )),
                Some(_) => {}
            },
            Constraint::Pattern { regex, hint, .. } => match value.as_str() {
                None => errors.push(FieldError::new(
                    path,
                    format!("{label} must be a string"),
                )),
                Some(s) if !regex.is_match(s) => {
                    errors.push(FieldError::new(path, format!("{label} {hint}")))
                }
                Some(_) => {}
            },
            Constraint::NonEmptyText => match value.as_str() {
                None => errors.push(FieldError::new(
                    path,
                    format!("{label} must be a string"),
                )),
                Some(s) if s.trim().is_empty() => {
                    errors.push(FieldError::new(path, format!("{label} cannot be empty")))
                }
                Some(_) => {}
            },
            Constraint::Nested(schema) => {
                if value.is_object() {
                    schema.collect_errors(value, path, errors);
                } else {
                    errors.push(FieldError::new(
                        path,
                        format!("{label} must be an object"),
                    ));
                }
            }
        }
    }

    fn json_schema(&self, label: &str) -> Value {
        match self {
            Constraint::OneOf(allowed) => json!({
                "type": "string",
                "enum": allowed,
                "description": label,
            }),
            Constraint::Pattern { pattern, hint, .. } => json!({
                "type": "string",
                "pattern": pattern,
                "description": format!("{label} ({hint})"),
            }),
            Constraint::NonEmptyText => json!({
                "type": "string",
                "minLength": 1,
                "description": label,
            }),
            Constraint::Nested(schema) => schema.json_schema(),
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn amount_constraint() -> Constraint {
    Constraint::Pattern {
        pattern: AMOUNT_PATTERN,
        regex: Regex::new(AMOUNT_PATTERN).expect("amount pattern is a valid regex"),
        hint: "must be an unsigned integer or decimal amount",
    }
}

/// Schema for the parsed swap command: `{ pair: { base, quote }, intent:
/// { baseAmount } }`, everything required.
pub fn swap_command_schema(vocabulary: &Vocabulary) -> Schema {
    let tickers = vocabulary.tickers().to_vec();
    Schema::new(vec![
        Field::required(
            "pair",
            "Trading pair",
            Constraint::Nested(Schema::new(vec![
                Field::required("base", "Base ticker", Constraint::OneOf(tickers.clone())),
                Field::required("quote", "Quote ticker", Constraint::OneOf(tickers)),
            ])),
        ),
        Field::required(
            "intent",
            "Swap intent",
            Constraint::Nested(Schema::new(vec![Field::required(
                "baseAmount",
                "Base amount",
                amount_constraint(),
            )])),
        ),
    ])
}

static RAW_COMMAND_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![Field::required(
        "command",
        "Command",
        Constraint::NonEmptyText,
    )])
});

/// Schema for the HTTP request payload: `{ command: non-empty string }`.
pub fn raw_command_schema() -> &'static Schema {
    &RAW_COMMAND_SCHEMA
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SwapCommand;

    fn swap_schema() -> Schema {
        swap_command_schema(&Vocabulary::default())
    }

    fn messages(result: Result<(), Vec<FieldError>>) -> Vec<String> {
        result
            .expect_err("expected validation failure")
            .into_iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect()
    }

    #[test]
    fn accepts_conforming_swap_command() {
        let value = json!({
            "pair": { "base": "USDC", "quote": "BTC.b" },
            "intent": { "baseAmount": "1.5" }
        });
        assert!(swap_schema().validate(&value).is_ok());

        // A conforming value decodes into the typed form and re-serializes
        // to the same JSON.
        let command: SwapCommand = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&command).unwrap(), value);
    }

    #[test]
    fn rejects_unknown_base_ticker_naming_the_allowed_set() {
        let value = json!({
            "pair": { "base": "DOGE", "quote": "USDC" },
            "intent": { "baseAmount": "10" }
        });
        let errors = messages(swap_schema().validate(&value));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("pair.base: Base ticker must be one of: ALOT, ARENA"));
        assert!(errors[0].contains("BTC.b"));
    }

    #[test]
    fn rejects_unknown_quote_ticker() {
        let value = json!({
            "pair": { "base": "USDC", "quote": "btc.b" },
            "intent": { "baseAmount": "10" }
        });
        let errors = messages(swap_schema().validate(&value));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("pair.quote: Quote ticker must be one of:"));
    }

    #[test]
    fn base_may_equal_quote() {
        let value = json!({
            "pair": { "base": "USDC", "quote": "USDC" },
            "intent": { "baseAmount": "1" }
        });
        assert!(swap_schema().validate(&value).is_ok());
    }

    #[test]
    fn amount_pattern_accepts_unsigned_integers_and_decimals() {
        for amount in ["0", "3.5", "1000.000001", "42"] {
            let value = json!({
                "pair": { "base": "AVAX", "quote": "USDt" },
                "intent": { "baseAmount": amount }
            });
            assert!(
                swap_schema().validate(&value).is_ok(),
                "expected {amount:?} to validate"
            );
        }
    }

    #[test]
    fn amount_pattern_rejects_everything_else() {
        for amount in ["1e5", "-3", "1,000", "", "abc", "1.", ".5", "+2", " 1"] {
            let value = json!({
                "pair": { "base": "AVAX", "quote": "USDt" },
                "intent": { "baseAmount": amount }
            });
            let errors = messages(swap_schema().validate(&value));
            assert_eq!(errors.len(), 1, "amount {amount:?}");
            assert_eq!(
                errors[0],
                "intent.baseAmount: Base amount must be an unsigned integer or decimal amount"
            );
        }
    }

    #[test]
    fn numeric_amount_is_not_coerced_to_a_string() {
        let value = json!({
            "pair": { "base": "AVAX", "quote": "USDt" },
            "intent": { "baseAmount": 1.5 }
        });
        let errors = messages(swap_schema().validate(&value));
        assert_eq!(errors, ["intent.baseAmount: Base amount must be a string"]);
    }

    #[test]
    fn missing_sections_report_every_violation() {
        let errors = messages(swap_schema().validate(&json!({})));
        assert_eq!(
            errors,
            [
                "pair: Trading pair is required",
                "intent: Swap intent is required"
            ]
        );
    }

    #[test]
    fn non_object_pair_is_a_single_error() {
        let value = json!({
            "pair": "USDC/BTC.b",
            "intent": { "baseAmount": "1" }
        });
        let errors = messages(swap_schema().validate(&value));
        assert_eq!(errors, ["pair: Trading pair must be an object"]);
    }

    #[test]
    fn command_required_wrong_type_and_empty_are_distinct_errors() {
        let schema = raw_command_schema();

        let errors = messages(schema.validate(&json!({})));
        assert_eq!(errors, ["command: Command is required"]);

        let errors = messages(schema.validate(&json!({ "command": 42 })));
        assert_eq!(errors, ["command: Command must be a string"]);

        let errors = messages(schema.validate(&json!({ "command": "" })));
        assert_eq!(errors, ["command: Command cannot be empty"]);

        let errors = messages(schema.validate(&json!({ "command": "   " })));
        assert_eq!(errors, ["command: Command cannot be empty"]);

        assert!(schema.validate(&json!({ "command": "swap 1 AVAX" })).is_ok());
    }

    #[test]
    fn json_schema_carries_every_validator_rule() {
        let contract = swap_schema().json_schema();

        assert_eq!(contract["type"], "object");
        assert_eq!(contract["additionalProperties"], json!(false));
        assert_eq!(contract["required"], json!(["pair", "intent"]));

        let base = &contract["properties"]["pair"]["properties"]["base"];
        assert_eq!(base["type"], "string");
        assert!(base["enum"]
            .as_array()
            .unwrap()
            .contains(&json!("BTC.b")));

        let pair = &contract["properties"]["pair"];
        assert_eq!(pair["required"], json!(["base", "quote"]));

        let amount = &contract["properties"]["intent"]["properties"]["baseAmount"];
        assert_eq!(amount["pattern"], AMOUNT_PATTERN);
    }

    #[test]
    fn raw_command_contract_requires_a_non_empty_string() {
        let contract = raw_command_schema().json_schema();
        assert_eq!(contract["required"], json!(["command"]));
        assert_eq!(contract["properties"]["command"]["minLength"], json!(1));
    }
}
