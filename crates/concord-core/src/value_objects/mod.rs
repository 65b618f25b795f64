//! Value objects: identifiers and intent bitfields

mod intents;
mod snowflake;

pub use intents::Intents;
pub use snowflake::{Snowflake, SnowflakeParseError};
