//! The submission lifecycle manager.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::compliance::{
    build_period_adjustment_filing, build_periodic_payment_filing, can_transition, tax_period,
    transition, validate_period_adjustment, validate_worker_record,
};
use crate::config::{EmployerConfig, GatewayConfig, RtiConfig};
use crate::error::{RtiError, RtiResult};
use crate::gateway::{GatewayRef, GatewayStatus, SimulatedGateway};
use crate::models::{
    FilingDocument, Issue, PeriodAdjustmentFiling, PeriodAdjustmentInput, PeriodicPaymentFiling,
    Submission, SubmissionEvent, SubmissionStatus, SubmissionType, SubmitOutcome,
    ValidationResult, WorkerPayRecord,
};
use crate::report;
use crate::store::{
    FilingStoreRef, InMemoryFilingStore, InMemorySubmissionStore, SubmissionStoreRef,
};

use super::ConfirmationScheduler;

/// Attempts at a compare-and-swap write before giving up.
const MAX_WRITE_RETRIES: u32 = 3;

/// Gateway polls before a confirmation task stops waiting.
pub const MAX_CONFIRMATION_POLLS: u32 = 20;

/// Warning left on a submission whose confirmation task gave up.
pub const CONFIRMATION_PENDING: &str = "CONFIRMATION_PENDING";

/// Drives submissions from draft to confirmation.
///
/// The manager owns no records itself: submissions and filing documents
/// live in the injected repositories and the gateway is injected too.
/// Clones share all of them, along with the confirmation scheduler and the
/// in-flight submit guard.
///
/// # Example
///
/// ```
/// use rti_engine::config::ConfigLoader;
/// use rti_engine::lifecycle::SubmissionManager;
/// use rti_engine::models::{SubmissionStatus, SubmissionType};
///
/// # #[tokio::main]
/// # async fn main() {
/// let config = ConfigLoader::from_yaml_str(
///     "employer:\n  employer_ref: \"123/AB45678\"\n  accounts_office_ref: \"123PA00045678\"\n",
/// )
/// .unwrap();
/// let manager = SubmissionManager::in_memory(config.config());
///
/// let submission = manager
///     .create_submission(SubmissionType::NilPayment, "run_001", None)
///     .await
///     .unwrap();
/// assert_eq!(submission.status, SubmissionStatus::Draft);
/// # }
/// ```
#[derive(Clone)]
pub struct SubmissionManager {
    submissions: SubmissionStoreRef,
    filings: FilingStoreRef,
    gateway: GatewayRef,
    employer: EmployerConfig,
    gateway_config: GatewayConfig,
    scheduler: ConfirmationScheduler,
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

/// Releases a submission's in-flight claim when dropped.
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
    id: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

fn record_label(record: &WorkerPayRecord, index: usize) -> String {
    if !record.worker_ref.trim().is_empty() {
        record.worker_ref.clone()
    } else if !record.ni_number.trim().is_empty() {
        record.ni_number.clone()
    } else {
        format!("record #{}", index + 1)
    }
}

fn validate_periodic_payment(filing: &PeriodicPaymentFiling) -> ValidationResult {
    let mut result = ValidationResult::default();
    for (index, record) in filing.worker_records.iter().enumerate() {
        let label = record_label(record, index);
        let checked = validate_worker_record(record);
        result.merge(ValidationResult::from_issues(
            checked
                .errors
                .into_iter()
                .map(|issue| issue.for_record(label.clone()))
                .collect(),
            checked
                .warnings
                .into_iter()
                .map(|issue| issue.for_record(label.clone()))
                .collect(),
        ));
    }
    result
}

fn not_found_issue(id: Uuid) -> Issue {
    Issue::error(
        "SUBMISSION_NOT_FOUND",
        format!("Submission {} does not exist", id),
        "id",
    )
}

impl SubmissionManager {
    /// Creates a manager over the given stores and gateway.
    pub fn new(
        submissions: SubmissionStoreRef,
        filings: FilingStoreRef,
        gateway: GatewayRef,
        config: &RtiConfig,
    ) -> Self {
        Self {
            submissions,
            filings,
            gateway,
            employer: config.employer.clone(),
            gateway_config: config.gateway.clone(),
            scheduler: ConfirmationScheduler::new(),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Creates a manager with in-memory stores and a simulated gateway.
    pub fn in_memory(config: &RtiConfig) -> Self {
        Self::new(
            Arc::new(InMemorySubmissionStore::new()),
            Arc::new(InMemoryFilingStore::new()),
            Arc::new(SimulatedGateway::new(config.gateway.clone())),
            config,
        )
    }

    /// The confirmation scheduler used by this manager.
    pub fn scheduler(&self) -> &ConfirmationScheduler {
        &self.scheduler
    }

    // ------------------------------------------------------------------
    // Filing documents
    // ------------------------------------------------------------------

    /// Builds and stores a periodic payment filing for a payroll run.
    pub async fn record_periodic_payment_filing(
        &self,
        payroll_run_id: &str,
        worker_records: Vec<WorkerPayRecord>,
        payment_date: NaiveDate,
    ) -> RtiResult<PeriodicPaymentFiling> {
        let filing = build_periodic_payment_filing(
            payroll_run_id,
            worker_records,
            payment_date,
            &self.employer,
        );
        self.filings.insert(filing.clone().into()).await?;

        debug!(
            filing_id = %filing.id,
            payroll_run_id = %payroll_run_id,
            workers = filing.worker_records.len(),
            "Recorded periodic payment filing"
        );
        Ok(filing)
    }

    /// Builds and stores a period adjustment filing.
    pub async fn record_period_adjustment_filing(
        &self,
        tax_year: &str,
        tax_month: u32,
        input: PeriodAdjustmentInput,
    ) -> RtiResult<PeriodAdjustmentFiling> {
        let filing = build_period_adjustment_filing(tax_year, tax_month, input, &self.employer);
        self.filings.insert(filing.clone().into()).await?;

        debug!(
            filing_id = %filing.id,
            tax_year = %filing.tax_year,
            tax_month = filing.tax_month,
            "Recorded period adjustment filing"
        );
        Ok(filing)
    }

    /// Records a payroll run's periodic payment filing and creates its
    /// submission.
    pub async fn finalize_payroll_run(
        &self,
        payroll_run_id: &str,
        worker_records: Vec<WorkerPayRecord>,
        payment_date: NaiveDate,
    ) -> RtiResult<(PeriodicPaymentFiling, Submission)> {
        let mut filing = self
            .record_periodic_payment_filing(payroll_run_id, worker_records, payment_date)
            .await?;
        let submission = self
            .create_submission(
                SubmissionType::PeriodicPayment,
                payroll_run_id,
                Some(filing.id),
            )
            .await?;
        filing.submission_id = Some(submission.id);
        Ok((filing, submission))
    }

    /// Records a period adjustment filing and creates its submission.
    pub async fn file_period_adjustment(
        &self,
        payroll_run_id: &str,
        tax_year: &str,
        tax_month: u32,
        input: PeriodAdjustmentInput,
    ) -> RtiResult<(PeriodAdjustmentFiling, Submission)> {
        let mut filing = self
            .record_period_adjustment_filing(tax_year, tax_month, input)
            .await?;
        let submission = self
            .create_submission(
                SubmissionType::PeriodAdjustment,
                payroll_run_id,
                Some(filing.id),
            )
            .await?;
        filing.submission_id = Some(submission.id);
        Ok((filing, submission))
    }

    /// Fetches a filing document by id.
    pub async fn get_filing(&self, id: Uuid) -> RtiResult<Option<FilingDocument>> {
        self.filings.get(id).await
    }

    // ------------------------------------------------------------------
    // Submissions
    // ------------------------------------------------------------------

    /// Creates a draft submission, optionally backed by a stored filing
    /// document.
    ///
    /// The tax period is today's. Totals and the employee count are copied
    /// from a periodic payment document; other types carry zero totals.
    /// The document is claimed for the new submission before the submission
    /// is stored, and released again if storing fails.
    ///
    /// # Errors
    ///
    /// - [`RtiError::MissingFilingDocument`] if the type needs a document
    ///   and none was given
    /// - [`RtiError::FilingNotFound`] if the document does not exist
    /// - [`RtiError::FilingTypeMismatch`] if the document is of another kind
    /// - [`RtiError::FilingAlreadyLinked`] if another submission owns it
    pub async fn create_submission(
        &self,
        submission_type: SubmissionType,
        payroll_run_id: &str,
        filing_document_id: Option<Uuid>,
    ) -> RtiResult<Submission> {
        let document = match filing_document_id {
            Some(document_id) => {
                let document = self
                    .filings
                    .get(document_id)
                    .await?
                    .ok_or(RtiError::FilingNotFound { id: document_id })?;

                let matches_type = matches!(
                    (submission_type, &document),
                    (SubmissionType::PeriodicPayment, FilingDocument::PeriodicPayment(_))
                        | (SubmissionType::PeriodAdjustment, FilingDocument::PeriodAdjustment(_))
                );
                if !matches_type {
                    return Err(RtiError::FilingTypeMismatch {
                        id: document_id,
                        submission_type: submission_type.to_string(),
                    });
                }
                Some(document)
            }
            None if submission_type.requires_filing_document() => {
                return Err(RtiError::MissingFilingDocument {
                    submission_type: submission_type.to_string(),
                });
            }
            None => None,
        };

        let period = tax_period(Utc::now().date_naive());
        let (employees_count, total_payment, total_tax, total_ni) = match &document {
            Some(FilingDocument::PeriodicPayment(filing)) => (
                filing.worker_records.len(),
                filing.total_payment,
                filing.total_tax,
                filing.total_employee_ni,
            ),
            _ => (0, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        };

        let submission = Submission {
            id: Uuid::new_v4(),
            submission_type,
            tax_year: period.tax_year,
            tax_month: period.tax_month,
            status: SubmissionStatus::Draft,
            created_date: Utc::now(),
            submitted_date: None,
            accepted_date: None,
            payroll_run_id: payroll_run_id.to_string(),
            filing_document_id,
            employer_ref: self.employer.employer_ref.clone(),
            employees_count,
            total_payment,
            total_tax,
            total_ni,
            gateway_reference: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            version: 0,
        };
        let submission_id = submission.id;
        if let Some(document_id) = filing_document_id {
            self.filings.link(document_id, submission_id).await?;
        }

        let stored = match self.submissions.insert(submission).await {
            Ok(stored) => stored,
            Err(e) => {
                if let Some(document_id) = filing_document_id {
                    let released = self.filings.unlink(document_id, submission_id).await;
                    if let Err(unlink_error) = released {
                        warn!(
                            filing_id = %document_id,
                            error = %unlink_error,
                            "Could not release filing document"
                        );
                    }
                }
                return Err(e);
            }
        };

        info!(
            submission_id = %stored.id,
            submission_type = %stored.submission_type,
            payroll_run_id = %stored.payroll_run_id,
            tax_year = %stored.tax_year,
            tax_month = stored.tax_month,
            "Created submission"
        );
        Ok(stored)
    }

    /// Fetches a submission by id.
    pub async fn get_submission(&self, id: Uuid) -> RtiResult<Option<Submission>> {
        self.submissions.get(id).await
    }

    /// Submissions still to be sent (Draft or Ready), oldest first.
    pub async fn pending_submissions(&self) -> RtiResult<Vec<Submission>> {
        self.submissions
            .find_by_status(&SubmissionStatus::PENDING)
            .await
    }

    /// Submissions the gateway has taken (Submitted or Accepted), oldest first.
    pub async fn submitted_submissions(&self) -> RtiResult<Vec<Submission>> {
        self.submissions
            .find_by_status(&SubmissionStatus::SUBMITTED)
            .await
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Validates a submission against its filing document.
    ///
    /// Never changes the stored record. Lookup failures are reported as
    /// issues on the result rather than as errors.
    pub async fn validate(&self, id: Uuid) -> ValidationResult {
        match self.submissions.get(id).await {
            Ok(Some(submission)) => self.validate_submission(&submission).await,
            Ok(None) => ValidationResult::fatal(not_found_issue(id)),
            Err(e) => ValidationResult::fatal(Issue::error(
                "VALIDATION_FAILED",
                format!("Could not load submission: {}", e),
                "id",
            )),
        }
    }

    async fn validate_submission(&self, submission: &Submission) -> ValidationResult {
        if !submission.submission_type.requires_filing_document() {
            return ValidationResult::default();
        }

        let document = match submission.filing_document_id {
            Some(document_id) => match self.filings.get(document_id).await {
                Ok(document) => document,
                Err(e) => {
                    return ValidationResult::fatal(Issue::error(
                        "VALIDATION_FAILED",
                        format!("Could not load filing data: {}", e),
                        "filing_document_id",
                    ));
                }
            },
            None => None,
        };

        match (submission.submission_type, document) {
            (SubmissionType::PeriodicPayment, Some(FilingDocument::PeriodicPayment(filing))) => {
                validate_periodic_payment(&filing)
            }
            (SubmissionType::PeriodAdjustment, Some(FilingDocument::PeriodAdjustment(filing))) => {
                validate_period_adjustment(&filing)
            }
            _ => ValidationResult::fatal(Issue::error(
                "FILING_DATA_NOT_FOUND",
                format!("No filing data found for submission {}", submission.id),
                "filing_document_id",
            )),
        }
    }

    /// Validates a draft and, if it can be submitted, marks it Ready.
    ///
    /// Warnings from validation are stored on the submission.
    pub async fn mark_ready(&self, id: Uuid) -> RtiResult<ValidationResult> {
        let result = self.validate(id).await;
        if result.can_submit {
            let warnings = result.warnings.clone();
            self.apply_event(id, SubmissionEvent::MarkReady, |submission| {
                submission.errors.clear();
                submission.warnings = warnings.clone();
            })
            .await?;
            info!(submission_id = %id, "Submission marked ready");
        }
        Ok(result)
    }

    // ------------------------------------------------------------------
    // Submission to the gateway
    // ------------------------------------------------------------------

    /// Validates a submission and hands it to the gateway.
    ///
    /// On success the submission is Submitted with its gateway reference
    /// and a confirmation task is scheduled. On any failure the stored
    /// status is left unchanged and the outcome carries the reasons.
    pub async fn submit(&self, id: Uuid) -> SubmitOutcome {
        let Some(_guard) = self.claim(id) else {
            warn!(submission_id = %id, "Submit rejected, another submit is in progress");
            return SubmitOutcome::failed(vec![Issue::error(
                "SUBMISSION_IN_PROGRESS",
                format!("Submission {} is already being submitted", id),
                "id",
            )]);
        };
        let start = Instant::now();

        let submission = match self.submissions.get(id).await {
            Ok(Some(submission)) => submission,
            Ok(None) => return SubmitOutcome::failed(vec![not_found_issue(id)]),
            Err(e) => return SubmitOutcome::failed(vec![submission_failed(&e)]),
        };

        if !can_transition(submission.status, SubmissionEvent::Submit) {
            return SubmitOutcome::failed(vec![Issue::error(
                "INVALID_STATUS",
                format!(
                    "Submission {} cannot be submitted from status '{}'",
                    id, submission.status
                ),
                "status",
            )]);
        }

        let validation = self.validate_submission(&submission).await;
        if !validation.can_submit {
            info!(
                submission_id = %id,
                errors = validation.errors.len(),
                "Submission failed validation"
            );
            return SubmitOutcome::failed(validation.errors);
        }

        match self.send_to_gateway(submission, &validation.warnings).await {
            Ok(reference) => {
                info!(
                    submission_id = %id,
                    gateway_reference = %reference,
                    warnings = validation.warnings.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Submission sent to gateway"
                );
                SubmitOutcome::accepted(reference, validation.warnings)
            }
            Err(e) => {
                warn!(submission_id = %id, error = %e, "Submission failed");
                SubmitOutcome::failed(vec![submission_failed(&e)])
            }
        }
    }

    async fn send_to_gateway(
        &self,
        submission: Submission,
        warnings: &[Issue],
    ) -> RtiResult<String> {
        let document = match submission.filing_document_id {
            Some(document_id) => self.filings.get(document_id).await?,
            None => None,
        };

        let receipt = timeout(
            self.gateway_config.timeout(),
            self.gateway.submit(&submission, document.as_ref()),
        )
        .await
        .map_err(|_| RtiError::Gateway {
            message: format!(
                "no response within {} ms",
                self.gateway_config.timeout_ms
            ),
        })??;

        let reference = receipt.reference;
        let submitted_at = Utc::now();
        self.apply_event(submission.id, SubmissionEvent::Submit, |stored| {
            stored.submitted_date = Some(submitted_at);
            stored.gateway_reference = Some(reference.clone());
            stored.errors.clear();
            stored.warnings = warnings.to_vec();
        })
        .await?;

        self.schedule_confirmation(submission.id, reference.clone());
        Ok(reference)
    }

    fn claim(&self, id: Uuid) -> Option<InFlightGuard> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(id) {
            return None;
        }
        Some(InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            id,
        })
    }

    // ------------------------------------------------------------------
    // Confirmation
    // ------------------------------------------------------------------

    fn schedule_confirmation(&self, id: Uuid, reference: String) {
        let manager = self.clone();
        self.scheduler.schedule(id, async move {
            manager.run_confirmation(id, reference).await;
        });
        debug!(submission_id = %id, "Scheduled gateway confirmation");
    }

    async fn run_confirmation(&self, id: Uuid, reference: String) {
        for poll in 1..=MAX_CONFIRMATION_POLLS {
            sleep(self.gateway_config.acceptance_delay()).await;

            match self.submissions.get(id).await {
                Ok(Some(submission)) if submission.status == SubmissionStatus::Submitted => {}
                Ok(_) => {
                    debug!(submission_id = %id, "Submission no longer awaiting confirmation");
                    return;
                }
                Err(e) => {
                    warn!(submission_id = %id, poll, error = %e, "Could not load submission");
                    continue;
                }
            }

            match self.gateway.poll_status(&reference).await {
                Ok(GatewayStatus::Pending) => {
                    debug!(submission_id = %id, poll, "Gateway confirmation pending");
                }
                Ok(GatewayStatus::Accepted) => {
                    let accepted_at = Utc::now();
                    match self
                        .apply_event(id, SubmissionEvent::Accept, |submission| {
                            submission.accepted_date = Some(accepted_at);
                            submission
                                .warnings
                                .retain(|w| w.code != CONFIRMATION_PENDING);
                        })
                        .await
                    {
                        Ok(_) => info!(
                            submission_id = %id,
                            gateway_reference = %reference,
                            "Submission accepted"
                        ),
                        Err(e) => warn!(submission_id = %id, error = %e, "Could not record acceptance"),
                    }
                    return;
                }
                Ok(GatewayStatus::Rejected { reason }) => {
                    let issue = Issue::error("GATEWAY_REJECTED", reason, "gateway_reference");
                    match self
                        .apply_event(id, SubmissionEvent::Reject, |submission| {
                            submission.errors = vec![issue.clone()];
                        })
                        .await
                    {
                        Ok(_) => warn!(
                            submission_id = %id,
                            gateway_reference = %reference,
                            "Submission rejected by gateway"
                        ),
                        Err(e) => warn!(submission_id = %id, error = %e, "Could not record rejection"),
                    }
                    return;
                }
                Err(e) => {
                    warn!(submission_id = %id, poll, error = %e, "Gateway status poll failed");
                }
            }
        }

        warn!(
            submission_id = %id,
            polls = MAX_CONFIRMATION_POLLS,
            "Gave up waiting for gateway confirmation"
        );
        let issue = Issue::warning(
            CONFIRMATION_PENDING,
            format!(
                "No confirmation from the gateway after {} polls",
                MAX_CONFIRMATION_POLLS
            ),
            "gateway_reference",
        );
        let noted = self
            .update_submission(id, |submission| {
                if submission.status == SubmissionStatus::Submitted
                    && !submission.warnings.iter().any(|w| w.code == CONFIRMATION_PENDING)
                {
                    submission.warnings.push(issue.clone());
                }
                Ok(())
            })
            .await;
        if let Err(e) = noted {
            warn!(submission_id = %id, error = %e, "Could not record unconfirmed submission");
        }
    }

    /// Cancels the confirmation task for a submission.
    ///
    /// The submission stays Submitted and can be picked up again by
    /// [`Self::resume_pending_confirmations`].
    pub fn cancel_confirmation(&self, id: Uuid) -> bool {
        let cancelled = self.scheduler.cancel(id);
        if cancelled {
            info!(submission_id = %id, "Cancelled gateway confirmation");
        }
        cancelled
    }

    /// Schedules confirmation for every Submitted submission that has no
    /// running task. Returns the number scheduled.
    pub async fn resume_pending_confirmations(&self) -> RtiResult<usize> {
        let submitted = self
            .submissions
            .find_by_status(&[SubmissionStatus::Submitted])
            .await?;

        let mut resumed = 0;
        for submission in submitted {
            if self.scheduler.is_scheduled(submission.id) {
                continue;
            }
            match submission.gateway_reference {
                Some(reference) => {
                    self.schedule_confirmation(submission.id, reference);
                    resumed += 1;
                }
                None => warn!(
                    submission_id = %submission.id,
                    "Submitted without a gateway reference, cannot confirm"
                ),
            }
        }

        info!(resumed, "Resumed gateway confirmations");
        Ok(resumed)
    }

    /// Marks an Accepted or Rejected submission as Corrected.
    pub async fn correct(&self, id: Uuid) -> RtiResult<Submission> {
        let corrected = self
            .apply_event(id, SubmissionEvent::Correct, |_| {})
            .await?;
        info!(submission_id = %id, "Submission corrected");
        Ok(corrected)
    }

    /// Applies `event` to the stored submission and writes it back,
    /// retrying on concurrent modification.
    async fn apply_event<F>(
        &self,
        id: Uuid,
        event: SubmissionEvent,
        mutate: F,
    ) -> RtiResult<Submission>
    where
        F: Fn(&mut Submission) + Send,
    {
        self.update_submission(id, move |submission| {
            submission.status = transition(submission.status, event)?;
            mutate(submission);
            Ok(())
        })
        .await
    }

    /// Re-reads, changes and writes back a submission until the write is
    /// not stale or the retries run out.
    async fn update_submission<F>(&self, id: Uuid, change: F) -> RtiResult<Submission>
    where
        F: Fn(&mut Submission) -> RtiResult<()> + Send,
    {
        let mut attempt = 1;
        loop {
            let mut submission = self
                .submissions
                .get(id)
                .await?
                .ok_or(RtiError::SubmissionNotFound { id })?;
            change(&mut submission)?;

            match self.submissions.update(submission).await {
                Err(RtiError::ConcurrentModification { .. }) if attempt < MAX_WRITE_RETRIES => {
                    debug!(submission_id = %id, attempt, "Retrying stale write");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    // ------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------

    /// Renders the plain-text report for a submission, or `None` if it
    /// does not exist.
    pub async fn render_report(&self, id: Uuid) -> RtiResult<Option<String>> {
        let Some(submission) = self.submissions.get(id).await? else {
            return Ok(None);
        };
        let document = match submission.filing_document_id {
            Some(document_id) => self.filings.get(document_id).await?,
            None => None,
        };
        Ok(Some(report::render_report(&submission, document.as_ref())))
    }
}

fn submission_failed(error: &RtiError) -> Issue {
    Issue::error(
        "SUBMISSION_FAILED",
        format!("Submission failed: {}", error),
        "gateway",
    )
}
