pub mod subprocess;

pub use subprocess::SubprocessChecker;

use async_trait::async_trait;
use crate::config::types::{CheckerConfig, DEFAULT_N_PUMPS, DEFAULT_TIME_LIMIT_SECS};
use crate::errors::CacheError;
use crate::models::{EvilInput, Language};

/// Iteration and time budget handed to the checker with every call. The
/// checker owns enforcement; callers treat an invocation as a bounded
/// blocking operation.
#[derive(Debug, Clone, Copy)]
pub struct CheckBudget {
    pub n_pumps: u64,
    pub time_limit_secs: u64,
}

impl Default for CheckBudget {
    fn default() -> Self {
        Self { n_pumps: DEFAULT_N_PUMPS, time_limit_secs: DEFAULT_TIME_LIMIT_SECS }
    }
}

impl CheckBudget {
    pub fn from_config(config: &CheckerConfig) -> Self {
        Self {
            n_pumps: config.n_pumps.unwrap_or(DEFAULT_N_PUMPS),
            time_limit_secs: config.time_limit_secs.unwrap_or(DEFAULT_TIME_LIMIT_SECS),
        }
    }
}

/// Ground truth as derived by the detector ensemble. `Vulnerable` always
/// carries the evidence that reproduced the blowup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Vulnerable(EvilInput),
    Safe,
}

/// External verdict-computing collaborator. The reconciliation job never
/// assumes a particular invocation mechanism; subprocess drivers and RPC
/// backends both fit behind this trait.
#[async_trait]
pub trait Checker: Send + Sync {
    /// Independently determine whether `pattern` is vulnerable under
    /// `language`'s engine, within `budget`.
    async fn check(
        &self,
        pattern: &str,
        language: Language,
        budget: CheckBudget,
    ) -> Result<CheckOutcome, CacheError>;

    /// Replay claimed evidence. Returns true when the engine blows past the
    /// budget on the attack input, i.e. the claim reproduces.
    async fn validate(
        &self,
        pattern: &str,
        language: Language,
        evil_input: &EvilInput,
        budget: CheckBudget,
    ) -> Result<bool, CacheError>;
}
