//! Task identifier generation.
//!
//! Identifiers are 8 random bytes from the operating system rendered as 16
//! lowercase hex characters. When the OS source fails, the current time in
//! nanoseconds is rendered instead; those identifiers are not collision
//! resistant under concurrent use.

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::warn;

/// Number of random bytes in an identifier.
pub const ID_BYTES: usize = 8;

/// Source of task identifiers.
pub trait IdGenerator: Send + Sync {
    /// Produce a new identifier.
    fn generate(&self) -> String;
}

/// Identifier generator backed by the OS random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> String {
        generate_id()
    }
}

/// Generate an identifier from the OS random source.
pub fn generate_id() -> String {
    generate_id_with(|buf| OsRng.try_fill_bytes(buf))
}

fn generate_id_with<F, E>(fill: F) -> String
where
    F: FnOnce(&mut [u8]) -> Result<(), E>,
    E: std::fmt::Display,
{
    let mut bytes = [0u8; ID_BYTES];
    match fill(&mut bytes) {
        Ok(()) => to_hex(&bytes),
        Err(e) => {
            warn!(error = %e, "Random source unavailable, using timestamp identifier");
            timestamp_id()
        }
    }
}

fn timestamp_id() -> String {
    let now = Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1000));
    format!("{:x}", nanos)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
