//! Snowflake ID - 64-bit time-ordered identifier
//!
//! Layout:
//! - Bits 63-22: milliseconds since [`Snowflake::EPOCH`]
//! - Bits 21-12: worker ID (0-1023)
//! - Bits 11-0:  per-millisecond sequence (0-4095)
//!
//! Ids from one generator are strictly increasing, so ordering by id is ordering by
//! creation. The bump engine relies on this for its eviction tie-break.

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    /// Custom epoch: 2024-01-01 00:00:00 UTC (milliseconds)
    pub const EPOCH: i64 = 1_704_067_200_000;

    const WORKER_BITS: i64 = 10;
    const SEQUENCE_BITS: i64 = 12;
    const SEQUENCE_MASK: i64 = (1 << Self::SEQUENCE_BITS) - 1;

    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Milliseconds since the Unix epoch encoded in the id
    #[inline]
    pub fn timestamp(&self) -> i64 {
        (self.0 >> (Self::WORKER_BITS + Self::SEQUENCE_BITS)) + Self::EPOCH
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp())
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.trim()
            .parse::<i64>()
            .map(Snowflake)
            .map_err(|_| SnowflakeParseError::InvalidFormat)
    }
}

/// Error when parsing a Snowflake from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid snowflake format")]
    InvalidFormat,
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Snowflake {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for i64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl std::str::FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Snowflake::parse(s)
    }
}

// Serialized as a string so JavaScript clients don't lose precision
impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Snowflake(n)),
            Raw::Text(s) => Snowflake::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Thread-safe Snowflake generator.
///
/// State is kept behind a short critical section. When the sequence for the current
/// millisecond is exhausted the generator moves on to the next millisecond instead of
/// sleeping, so ids stay strictly increasing even when the wall clock goes backwards.
pub struct SnowflakeGenerator {
    worker_id: u16,
    state: Mutex<GeneratorState>,
}

#[derive(Default)]
struct GeneratorState {
    last_timestamp: i64,
    sequence: i64,
}

impl SnowflakeGenerator {
    /// Create a new generator; worker ids are masked to 10 bits.
    pub fn new(worker_id: u16) -> Self {
        Self {
            worker_id: worker_id & 0x3FF,
            state: Mutex::new(GeneratorState::default()),
        }
    }

    pub fn generate(&self) -> Snowflake {
        let now = current_millis() - Snowflake::EPOCH;
        let mut state = self.state.lock();

        if now > state.last_timestamp {
            state.last_timestamp = now;
            state.sequence = 0;
        } else {
            state.sequence = (state.sequence + 1) & Snowflake::SEQUENCE_MASK;
            if state.sequence == 0 {
                state.last_timestamp += 1;
            }
        }

        let id = (state.last_timestamp << (Snowflake::WORKER_BITS + Snowflake::SEQUENCE_BITS))
            | (i64::from(self.worker_id) << Snowflake::SEQUENCE_BITS)
            | state.sequence;
        Snowflake(id)
    }

    pub fn worker_id(&self) -> u16 {
        self.worker_id
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for SnowflakeGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeGenerator")
            .field("worker_id", &self.worker_id)
            .finish()
    }
}

fn current_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_generated_ids_are_strictly_increasing() {
        let generator = SnowflakeGenerator::new(3);
        let mut last = generator.generate();
        for _ in 0..10_000 {
            let next = generator.generate();
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn test_concurrent_generation_is_unique() {
        let generator = Arc::new(SnowflakeGenerator::new(1));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = Arc::clone(&generator);
                std::thread::spawn(move || (0..1000).map(|_| generator.generate()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 8000);
    }

    #[test]
    fn test_timestamp_is_recent() {
        let id = SnowflakeGenerator::default().generate();
        let drift = (id.timestamp() - current_millis()).abs();
        assert!(drift < 5_000);
    }

    #[test]
    fn test_serde_as_string() {
        let id = Snowflake::new(1_234_567_890_123);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1234567890123\"");

        let parsed: Snowflake = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(parsed, Snowflake::new(42));
        let parsed: Snowflake = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, Snowflake::new(42));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Snowflake::parse("abc"), Err(SnowflakeParseError::InvalidFormat));
        assert_eq!("77".parse::<Snowflake>(), Ok(Snowflake::new(77)));
    }
}
