use std::sync::Arc;

use pipeline_integration::{FileLister, StageExecutor};
use shared::{
    domain::{CheckKey, Stage},
    protocol::{Notice, WorkflowSnapshot},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    error::{GuardRejection, OperationKind},
    gate,
    ledger::{labels, StatusKey},
    selection::LoadOutcome,
    state::WorkflowState,
};

/// Identifies one dispatched collaborator call. A result is applied only
/// while its ticket is still the one in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
    operation: OperationKind,
    epoch: u64,
}

struct Session {
    state: WorkflowState,
    in_flight: Option<Ticket>,
    /// Bumped whenever the active stage context is replaced.
    stage_epoch: u64,
    /// Bumped only by reset.
    session_epoch: u64,
    notice: Option<Notice>,
    /// Stage label displaced by the processing run in flight.
    displaced_status: Option<String>,
}

impl Session {
    fn new(state: WorkflowState) -> Self {
        Self {
            state,
            in_flight: None,
            stage_epoch: 0,
            session_epoch: 0,
            notice: None,
            displaced_status: None,
        }
    }

    fn snapshot(&self) -> WorkflowSnapshot {
        self.state
            .to_snapshot(self.in_flight.is_some(), self.notice.clone())
    }

    fn ensure_idle(&self) -> Result<(), GuardRejection> {
        match self.in_flight {
            Some(ticket) => Err(GuardRejection::Busy(ticket.operation)),
            None => Ok(()),
        }
    }

    fn start(&mut self, operation: OperationKind) -> Ticket {
        let epoch = if operation.is_stage_scoped() {
            self.stage_epoch
        } else {
            self.session_epoch
        };
        let ticket = Ticket { operation, epoch };
        self.in_flight = Some(ticket);
        self.notice = None;
        ticket
    }

    /// Releases the busy flag if `ticket` is still current. `false` means the
    /// response is stale and must be dropped.
    fn finish(&mut self, ticket: Ticket) -> bool {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
            self.displaced_status = None;
            true
        } else {
            debug!(operation = %ticket.operation, "discarding stale response");
            false
        }
    }

    /// Invalidates listing/processing results that belong to the previous
    /// stage context. An abandoned processing run gives its stage back the
    /// label it had before submission.
    fn enter_stage_context(&mut self) {
        self.stage_epoch += 1;
        self.notice = None;
        let Some(ticket) = self.in_flight else {
            return;
        };
        if !ticket.operation.is_stage_scoped() {
            return;
        }
        self.in_flight = None;
        if let OperationKind::Processing(stage) = ticket.operation {
            if let Some(label) = self.displaced_status.take() {
                self.state.restore_status(StatusKey::Stage(stage), label);
            }
        }
    }
}

/// Owns one session's [`WorkflowState`] and is the only writer to it.
///
/// Commands return the snapshot the presentation layer should render. The
/// state lock is never held across a collaborator call, so a stage switch or
/// a reset issued while a call is outstanding takes effect immediately and
/// the late response is discarded.
pub struct WorkflowController {
    session: Mutex<Session>,
    lister: Arc<dyn FileLister>,
    executor: Arc<dyn StageExecutor>,
}

impl WorkflowController {
    pub fn new(lister: Arc<dyn FileLister>, executor: Arc<dyn StageExecutor>) -> Self {
        Self::with_state(WorkflowState::default(), lister, executor)
    }

    pub fn with_state(
        state: WorkflowState,
        lister: Arc<dyn FileLister>,
        executor: Arc<dyn StageExecutor>,
    ) -> Self {
        Self {
            session: Mutex::new(Session::new(state)),
            lister,
            executor,
        }
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn state(&self) -> WorkflowState {
        self.session.lock().await.state.clone()
    }

    /// Locked stages are ignored silently; the snapshot comes back unchanged.
    pub async fn switch_stage(&self, stage: Stage) -> WorkflowSnapshot {
        let mut session = self.session.lock().await;
        if session.state.switch_to(stage) {
            session.enter_stage_context();
            info!(stage = %stage, "switched stage");
        }
        session.snapshot()
    }

    pub async fn request_file_listing(&self) -> Result<WorkflowSnapshot, GuardRejection> {
        let (ticket, stage) = {
            let mut session = self.session.lock().await;
            session.ensure_idle()?;
            let stage = session.state.active_stage();
            session.state.clear_error();
            (session.start(OperationKind::Listing(stage)), stage)
        };

        let outcome = self.lister.list(stage).await;

        let mut session = self.session.lock().await;
        if !session.finish(ticket) {
            return Ok(session.snapshot());
        }
        match outcome {
            Ok(files) => match session.state.selection_mut().load_files(files) {
                LoadOutcome::Loaded(count) => {
                    info!(stage = %stage, count, "files listed");
                }
                LoadOutcome::EmptyButValid => {
                    info!(stage = %stage, "no files found");
                    session.notice = Some(Notice::NoFilesFound { stage });
                }
            },
            Err(err) => {
                let error = format!("{err:#}");
                warn!(stage = %stage, %error, "file listing failed");
                session
                    .state
                    .record_error(format!("failed to list files for {stage}: {error}"));
            }
        }
        Ok(session.snapshot())
    }

    pub async fn toggle_file(&self, name: &str) -> Result<WorkflowSnapshot, GuardRejection> {
        let mut session = self.session.lock().await;
        let selected = session.state.selection_mut().toggle(name)?;
        debug!(file = name, selected, "toggled file");
        Ok(session.snapshot())
    }

    pub async fn toggle_select_all(&self) -> WorkflowSnapshot {
        let mut session = self.session.lock().await;
        session.state.selection_mut().select_all();
        session.snapshot()
    }

    /// Submits the current selection for the active stage. An empty selection
    /// is rejected locally and never reaches the executor.
    pub async fn submit_processing(&self) -> Result<WorkflowSnapshot, GuardRejection> {
        let (ticket, stage, files) = {
            let mut session = self.session.lock().await;
            session.ensure_idle()?;
            let stage = session.state.active_stage();
            let files: Vec<String> = session
                .state
                .selection()
                .selected_names()
                .iter()
                .cloned()
                .collect();
            if files.is_empty() {
                debug!(stage = %stage, "refusing to process an empty selection");
                return Err(GuardRejection::EmptySelection);
            }
            let displaced = session.state.entry(stage).status.clone();
            session
                .state
                .begin_operation(StatusKey::Stage(stage), labels::PROCESSING);
            let ticket = session.start(OperationKind::Processing(stage));
            session.displaced_status = Some(displaced);
            (ticket, stage, files)
        };

        info!(stage = %stage, files = files.len(), "processing submitted");
        let outcome = self.executor.process(stage, &files).await;

        let mut session = self.session.lock().await;
        if !session.finish(ticket) {
            return Ok(session.snapshot());
        }
        let key = StatusKey::Stage(stage);
        match outcome {
            Ok(report) if report.all_succeeded() => {
                let label = labels::processed(report.succeeded_count(), report.total());
                let advance = session.state.complete_success(key, label);
                info!(stage = %stage, ?advance, "stage processed");
                session.enter_stage_context();
            }
            Ok(report) => {
                let failed: Vec<String> = report
                    .failures()
                    .map(|result| format!("{} ({})", result.name, result.message))
                    .collect();
                let error = if failed.is_empty() {
                    format!("{stage} processing returned no results")
                } else {
                    format!(
                        "{} of {} files failed for {stage}: {}",
                        failed.len(),
                        report.total(),
                        failed.join(", ")
                    )
                };
                session.state.complete_failure(
                    key,
                    labels::processed(report.succeeded_count(), report.total()),
                    error,
                );
            }
            Err(err) => {
                session.state.complete_failure(
                    key,
                    labels::PROCESSING_FAILED,
                    format!("failed to process {stage}: {err:#}"),
                );
            }
        }
        Ok(session.snapshot())
    }

    /// Runs one post-pipeline check. Never touches the active stage or which
    /// stages are unlocked, whatever the outcome.
    pub async fn run_validation(&self, check: CheckKey) -> Result<WorkflowSnapshot, GuardRejection> {
        let ticket = {
            let mut session = self.session.lock().await;
            session.ensure_idle()?;
            gate::ensure_open(&session.state)?;
            let label = if check.is_consolidation() {
                labels::CONSOLIDATING
            } else {
                labels::VALIDATING
            };
            session.state.begin_operation(StatusKey::Check(check), label);
            session.start(OperationKind::Check(check))
        };

        info!(check = %check, "check submitted");
        let outcome = if check.is_consolidation() {
            self.executor.consolidate().await
        } else {
            self.executor.validate(check).await
        };

        let mut session = self.session.lock().await;
        if !session.finish(ticket) {
            return Ok(session.snapshot());
        }
        let key = StatusKey::Check(check);
        match outcome {
            Ok(report) if report.success => {
                session
                    .state
                    .complete_success(key, labels::passed(&report.message));
                info!(check = %check, "check passed");
            }
            Ok(report) => {
                let error = if report.message.is_empty() {
                    format!("{check} failed")
                } else {
                    report.message
                };
                session
                    .state
                    .complete_failure(key, labels::CHECK_FAILED, error);
            }
            Err(err) => {
                session.state.complete_failure(
                    key,
                    labels::CHECK_FAILED,
                    format!("failed to run {check}: {err:#}"),
                );
            }
        }
        Ok(session.snapshot())
    }

    pub async fn run_consolidation(&self) -> Result<WorkflowSnapshot, GuardRejection> {
        self.run_validation(CheckKey::ConsolidateReports).await
    }

    /// Restores the initial state. Anything still in flight is abandoned and
    /// its response discarded on arrival.
    pub async fn reset_workflow(&self) -> WorkflowSnapshot {
        let mut session = self.session.lock().await;
        session.state.reset();
        session.in_flight = None;
        session.displaced_status = None;
        session.session_epoch += 1;
        session.enter_stage_context();
        session.snapshot()
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
