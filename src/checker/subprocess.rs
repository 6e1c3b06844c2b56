use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use crate::config::types::CheckerConfig;
use crate::errors::CacheError;
use crate::models::{EvilInput, Language, Verdict};
use super::{CheckBudget, CheckOutcome, Checker};

/// Checker backed by external driver commands. Each call writes the query to
/// a process-unique temp file, appends the file path to the configured argv,
/// and parses the driver's stdout as JSON.
pub struct SubprocessChecker {
    check_cmd: Vec<String>,
    validate_cmd: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckQuery<'a> {
    pattern: &'a str,
    language: &'a str,
    n_pumps: u64,
    time_limit: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateQuery<'a> {
    pattern: &'a str,
    language: &'a str,
    evil_input: &'a EvilInput,
    n_pumps: u64,
    time_limit: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckReply {
    result: Verdict,
    #[serde(default)]
    evil_input: Option<EvilInput>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateReply {
    timed_out: bool,
}

impl SubprocessChecker {
    pub fn new(check_cmd: Vec<String>, validate_cmd: Vec<String>) -> Result<Self, CacheError> {
        if check_cmd.is_empty() || validate_cmd.is_empty() {
            return Err(CacheError::Config(
                "Checker requires checkCmd and validateCmd".into(),
            ));
        }
        Ok(Self { check_cmd, validate_cmd })
    }

    pub fn from_config(config: &CheckerConfig) -> Result<Self, CacheError> {
        Self::new(
            config.check_cmd.clone().unwrap_or_default(),
            config.validate_cmd.clone().unwrap_or_default(),
        )
    }

    /// Outer bound on a driver invocation. The driver enforces its own
    /// time limit; this only catches contract violations (hung drivers),
    /// so it is far looser than the budget itself.
    fn outer_timeout(budget: CheckBudget) -> Duration {
        Duration::from_secs((budget.time_limit_secs * 30).max(60))
    }

    async fn run_driver(
        &self,
        argv: &[String],
        query_json: String,
        budget: CheckBudget,
    ) -> Result<String, CacheError> {
        let query_file = QueryFile::create(&query_json).await?;

        let mut command = Command::new(&argv[0]);
        command.args(&argv[1..]).arg(query_file.path());
        command.kill_on_drop(true);

        debug!(cmd = %argv.join(" "), "Invoking checker driver");
        let output = tokio::time::timeout(Self::outer_timeout(budget), command.output())
            .await
            .map_err(|_| CacheError::Collaborator(format!("Driver hung: {}", argv[0])))?
            .map_err(|e| CacheError::Collaborator(format!("Driver spawn failed: {}", e)))?;

        if !output.status.success() {
            return Err(CacheError::Collaborator(format!(
                "Driver {} exited with {}",
                argv[0], output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait::async_trait]
impl Checker for SubprocessChecker {
    async fn check(
        &self,
        pattern: &str,
        language: Language,
        budget: CheckBudget,
    ) -> Result<CheckOutcome, CacheError> {
        let query = serde_json::to_string(&CheckQuery {
            pattern,
            language: language.as_str(),
            n_pumps: budget.n_pumps,
            time_limit: budget.time_limit_secs,
        })?;

        let stdout = self.run_driver(&self.check_cmd, query, budget).await?;
        let reply: CheckReply = serde_json::from_str(&stdout)
            .map_err(|e| CacheError::Collaborator(format!("Malformed driver output: {}", e)))?;

        match (reply.result, reply.evil_input) {
            (Verdict::Vulnerable, Some(evil)) => Ok(CheckOutcome::Vulnerable(evil)),
            // A vulnerability report without reproducing input is useless to
            // us; the detectors timed out or mis-reported. Treat as safe,
            // preferring false negatives to unproven positives.
            (Verdict::Vulnerable, None) => Ok(CheckOutcome::Safe),
            (Verdict::Safe, _) | (Verdict::Unknown, _) => Ok(CheckOutcome::Safe),
            (Verdict::Invalid, _) => Err(CacheError::Collaborator(
                "Driver rejected the query as invalid".into(),
            )),
        }
    }

    async fn validate(
        &self,
        pattern: &str,
        language: Language,
        evil_input: &EvilInput,
        budget: CheckBudget,
    ) -> Result<bool, CacheError> {
        let query = serde_json::to_string(&ValidateQuery {
            pattern,
            language: language.as_str(),
            evil_input,
            n_pumps: budget.n_pumps,
            time_limit: budget.time_limit_secs,
        })?;

        let stdout = self.run_driver(&self.validate_cmd, query, budget).await?;
        let reply: ValidateReply = serde_json::from_str(&stdout)
            .map_err(|e| CacheError::Collaborator(format!("Malformed driver output: {}", e)))?;
        Ok(reply.timed_out)
    }
}

/// Temp query file removed on drop, one per invocation so concurrent driver
/// calls never collide.
struct QueryFile {
    path: PathBuf,
}

impl QueryFile {
    async fn create(content: &str) -> Result<Self, CacheError> {
        let path = std::env::temp_dir().join(format!(
            "vuln-regex-cache-query-{}-{}.json",
            std::process::id(),
            uuid::Uuid::new_v4()
        ));
        tokio::fs::write(&path, content).await?;
        Ok(Self { path })
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for QueryFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PumpPair;

    fn budget() -> CheckBudget {
        CheckBudget { n_pumps: 250_000, time_limit_secs: 1 }
    }

    fn evidence() -> EvilInput {
        EvilInput {
            pump_pairs: vec![PumpPair { prefix: "".into(), pump: "a".into() }],
            suffix: "!".into(),
        }
    }

    // `cat` echoes the query file back, which is valid JSON but not a valid
    // driver reply.
    #[tokio::test]
    async fn test_malformed_driver_output_is_collaborator_failure() {
        let checker = SubprocessChecker::new(
            vec!["cat".into()],
            vec!["cat".into()],
        )
        .unwrap();
        let err = checker.check("abc", Language::Javascript, budget()).await.unwrap_err();
        assert!(matches!(err, CacheError::Collaborator(_)));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_collaborator_failure() {
        let checker = SubprocessChecker::new(
            vec!["false".into()],
            vec!["false".into()],
        )
        .unwrap();
        let err = checker
            .validate("abc", Language::Javascript, &evidence(), budget())
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Collaborator(_)));
    }

    #[tokio::test]
    async fn test_missing_driver_is_collaborator_failure() {
        let checker = SubprocessChecker::new(
            vec!["/nonexistent/check-driver".into()],
            vec!["/nonexistent/validate-driver".into()],
        )
        .unwrap();
        let err = checker.check("abc", Language::Javascript, budget()).await.unwrap_err();
        assert!(matches!(err, CacheError::Collaborator(_)));
    }

    #[test]
    fn test_empty_command_rejected_at_construction() {
        assert!(SubprocessChecker::new(vec![], vec!["x".into()]).is_err());
    }

    #[test]
    fn test_outer_timeout_floors_at_a_minute() {
        assert_eq!(
            SubprocessChecker::outer_timeout(budget()),
            Duration::from_secs(60)
        );
        let wide = CheckBudget { n_pumps: 1, time_limit_secs: 10 };
        assert_eq!(SubprocessChecker::outer_timeout(wide), Duration::from_secs(300));
    }
}
