use tracing::{info, warn};

use crate::checker::{CheckBudget, CheckOutcome, Checker};
use crate::db::{Database, Promotion};
use crate::errors::CacheError;
use crate::models::{TrustedRecord, UntrustedClaim, Verdict};

/// Tally of one reconciliation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub processed: usize,
    pub promoted: usize,
    /// Safe determinations refused because the key was already trusted
    /// vulnerable.
    pub kept_existing: usize,
    /// Claims contradicted by the checker (lying or racing clients).
    pub false_reports: usize,
    pub malformed: usize,
    pub checker_failures: usize,
    /// Adjudicated claims whose verdict could not be written to the trusted
    /// table.
    pub storage_failures: usize,
}

/// Batch adjudicator for the quarantine store. Drains every staged claim,
/// asks the checker for ground truth, and promotes confirmed verdicts into
/// the trusted table. Claims are deleted in every branch so the quarantine
/// never grows unboundedly; dropped claims get restaged by future lookups.
///
/// Runs without self-serialization: schedule overlapping invocations under
/// flock or equivalent.
pub struct ReconciliationJob<'a> {
    db: &'a Database,
    checker: &'a dyn Checker,
    budget: CheckBudget,
}

impl<'a> ReconciliationJob<'a> {
    pub fn new(db: &'a Database, checker: &'a dyn Checker, budget: CheckBudget) -> Self {
        Self { db, checker, budget }
    }

    pub async fn run_pass(&self) -> Result<PassSummary, CacheError> {
        let claims = self.db.list_claims()?;
        info!(claims = claims.len(), "Reconciliation pass starting");

        let mut summary = PassSummary::default();
        for claim in claims {
            summary.processed += 1;
            self.adjudicate(claim, &mut summary).await;
        }

        info!(
            processed = summary.processed,
            promoted = summary.promoted,
            false_reports = summary.false_reports,
            malformed = summary.malformed,
            checker_failures = summary.checker_failures,
            storage_failures = summary.storage_failures,
            "Reconciliation pass complete"
        );
        Ok(summary)
    }

    async fn adjudicate(&self, claim: UntrustedClaim, summary: &mut PassSummary) {
        let outcome = match claim.result {
            Verdict::Unknown | Verdict::Safe => self.recompute(&claim, summary).await,
            Verdict::Vulnerable => self.replay_evidence(&claim, summary).await,
            Verdict::Invalid => {
                warn!(key = %claim.key(), "Malformed claim");
                summary.malformed += 1;
                Ok(())
            }
        };

        match outcome {
            Ok(()) => {}
            Err(e @ CacheError::Collaborator(_)) => {
                warn!(key = %claim.key(), error = %e, "Checker failed, dropping claim");
                summary.checker_failures += 1;
            }
            Err(e) => {
                warn!(key = %claim.key(), error = %e, "Failed to store verdict, dropping claim");
                summary.storage_failures += 1;
            }
        }

        // Delete unconditionally; whatever happened above, this claim is
        // spent.
        match self.db.delete_claim(&claim.id) {
            Ok(_) => {}
            Err(e) => warn!(id = %claim.id, error = %e, "Failed to delete claim"),
        }
    }

    /// No proof supplied, so the claimed verdict is only a hint: recompute
    /// from scratch and store whatever the checker derives. Whether the
    /// claimant told the truth is logged for abuse tracking but does not
    /// change the outcome.
    async fn recompute(
        &self,
        claim: &UntrustedClaim,
        summary: &mut PassSummary,
    ) -> Result<(), CacheError> {
        if claim.pattern.is_empty() {
            summary.malformed += 1;
            return Ok(());
        }

        let outcome = self
            .checker
            .check(&claim.pattern, claim.language, self.budget)
            .await?;

        let record = match outcome {
            CheckOutcome::Vulnerable(evil) => {
                if claim.result == Verdict::Safe {
                    warn!(key = %claim.key(), "Claimed SAFE but checker found vulnerable -- false report");
                    summary.false_reports += 1;
                }
                TrustedRecord {
                    pattern: claim.pattern.clone(),
                    language: claim.language,
                    result: Verdict::Vulnerable,
                    evil_input: Some(evil),
                }
            }
            CheckOutcome::Safe => TrustedRecord {
                pattern: claim.pattern.clone(),
                language: claim.language,
                result: Verdict::Safe,
                evil_input: None,
            },
        };

        self.promote(record, summary)
    }

    /// A vulnerable claim must carry evidence; replay it and promote only if
    /// the blowup reproduces.
    async fn replay_evidence(
        &self,
        claim: &UntrustedClaim,
        summary: &mut PassSummary,
    ) -> Result<(), CacheError> {
        let Some(evil) = claim.evil_input.clone() else {
            warn!(key = %claim.key(), "VULNERABLE claim missing evilInput");
            summary.malformed += 1;
            return Ok(());
        };
        if claim.pattern.is_empty() {
            summary.malformed += 1;
            return Ok(());
        }

        let reproduced = self
            .checker
            .validate(&claim.pattern, claim.language, &evil, self.budget)
            .await?;

        if !reproduced {
            warn!(key = %claim.key(), "Evidence did not reproduce -- false report");
            summary.false_reports += 1;
            return Ok(());
        }

        let record = TrustedRecord {
            pattern: claim.pattern.clone(),
            language: claim.language,
            result: Verdict::Vulnerable,
            evil_input: Some(evil),
        };
        self.promote(record, summary)
    }

    fn promote(&self, record: TrustedRecord, summary: &mut PassSummary) -> Result<(), CacheError> {
        match self.db.promote(&record)? {
            Promotion::Inserted | Promotion::Replaced => {
                info!(key = %record.key(), result = %record.result, "Promoted to trusted store");
                summary.promoted += 1;
            }
            Promotion::KeptExistingVulnerable => {
                info!(key = %record.key(), "Kept existing VULNERABLE record over new SAFE determination");
                summary.kept_existing += 1;
            }
        }
        Ok(())
    }
}
