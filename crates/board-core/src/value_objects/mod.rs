//! Value objects - immutable types that represent domain concepts

mod authorities;
mod snowflake;

pub use authorities::Authorities;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
