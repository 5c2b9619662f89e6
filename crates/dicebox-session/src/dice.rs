//! Random generators: roll values and session ids.

use rand::Rng;
use rand::distr::{Alphanumeric, SampleString};

/// A source of uniformly distributed roll values.
///
/// The registry draws every roll through this trait so tests can script
/// the outcome of a session. `Send + Sync + 'static` because one source is
/// shared by every session the registry runs.
pub trait RollSource: Send + Sync + 'static {
    /// Draws a value uniformly from `0..max`. `max` is at least 1.
    fn roll(&self, max: u32) -> u32;
}

/// The default [`RollSource`], backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngRoller;

impl RollSource for ThreadRngRoller {
    fn roll(&self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        rand::rng().random_range(0..max)
    }
}

/// Generates a random alphanumeric string of `len` characters
/// (`[A-Za-z0-9]`).
///
/// Used for session ids and for request ids. No cryptographic guarantee is
/// needed, uniqueness among live sessions is enforced by the registry.
pub fn generate_session_id(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::rng(), len)
}
