pub mod config;
pub mod schema;
pub mod types;
pub mod vocabulary;

pub use schema::{raw_command_schema, swap_command_schema, Constraint, Field, Schema};
pub use types::{FieldError, RawCommandInput, SwapCommand, SwapIntent, TradingPair};
pub use vocabulary::Vocabulary;
