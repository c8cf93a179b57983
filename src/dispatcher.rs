//! Save Dispatcher
//!
//! Single entry point for every Save click on a client view:
//!
//! ```text
//! SaveRequest ─► route ─┬─ add-*  ─► fixed RecordKind ─► defaults + client_id ─┐
//!                       └─ edit-* ─► tag or classifier ─► client_id ──────────┤
//!                                                                             ▼
//!            notification ◄─ close dialog(s) ◄─ (retry transient) ◄─ RecordPort::write
//! ```
//!
//! ## Completion rules
//!
//! - Success closes the originating dialog. Edit saves close all five edit
//!   dialogs, since only one is ever open at a time.
//! - Failure leaves every open flag alone so the user can retry or cancel.
//! - Exactly one notification per dispatch, unless the late-completion policy
//!   drops it.
//! - Misuse (no port for the route, a target tag on a fixed route) is rejected
//!   before anything is written, and still notified.
//!
//! Dispatches are independent. Nothing is locked across the port call, and
//! concurrent saves from one dialog are the view layer's business (it disables
//! Submit while the dialog is pending).

use std::sync::Arc;

use care_records_types::{
    ActionKind, ActionRoute, ClientId, DialogKind, EditDialog, EntityKind, FieldBag, RecordKind,
};
use chrono::Utc;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::classifier::{resolve_target, Evidence};
use crate::config::{DispatcherConfig, LateCompletionPolicy};
use crate::error::{DispatchError, PortError, PortFailureKind};
use crate::notify::{Notification, NotificationLevel, Notifier};
use crate::payload::{merge_client_id, prepare_new_record};
use crate::ports::{PortRegistry, RecordPort};
use crate::session::SessionHandle;

/// Shown when the calling code, not the user or the backend, got it wrong
const MISUSE_MESSAGE: &str = "This form is not set up to save here. Nothing was saved.";

/// One Save click
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub action: ActionKind,
    pub client_id: ClientId,
    pub payload: FieldBag,
    /// Explicit destination for edit saves. `None` falls back to classification.
    pub target: Option<EntityKind>,
}

impl SaveRequest {
    pub fn new(action: ActionKind, payload: FieldBag, client_id: impl Into<ClientId>) -> Self {
        Self {
            action,
            client_id: client_id.into(),
            payload,
            target: None,
        }
    }

    pub fn with_target(mut self, target: EntityKind) -> Self {
        self.target = Some(target);
        self
    }

    /// Edit save tagged with the dialog's own record, bypassing classification
    pub fn tagged_by_dialog(
        dialog: EditDialog,
        payload: FieldBag,
        client_id: impl Into<ClientId>,
    ) -> Self {
        Self::new(ActionKind::Edit(dialog), payload, client_id).with_target(dialog.entity_kind())
    }
}

/// What a completed dispatch did
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReceipt {
    pub dispatch_id: Uuid,
    pub record: RecordKind,
    /// How an edit save was routed; `None` for fixed routes
    pub evidence: Option<Evidence>,
    pub attempts: u32,
    /// Dialogs this dispatch closed
    pub closed: Vec<DialogKind>,
    /// False when the late-completion policy suppressed the notification
    pub notified: bool,
}

/// Routed and prepared, ready for the port
struct Plan {
    record: RecordKind,
    evidence: Option<Evidence>,
    fields: FieldBag,
    closes: &'static [DialogKind],
}

/// Clears the dialog's pending flag however the dispatch ends
struct PendingGuard<'a> {
    session: &'a SessionHandle,
    dialog: DialogKind,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.session.lock().finish_save(self.dialog);
    }
}

pub struct SaveDispatcher {
    ports: PortRegistry,
    session: SessionHandle,
    notifier: Arc<dyn Notifier>,
    config: DispatcherConfig,
}

impl SaveDispatcher {
    pub fn new(ports: PortRegistry, session: SessionHandle, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            ports,
            session,
            notifier,
            config: DispatcherConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Save an untyped payload from the dialog behind `action`
    pub async fn dispatch(
        &self,
        action: ActionKind,
        payload: FieldBag,
        client_id: impl Into<ClientId>,
    ) -> Result<DispatchReceipt, DispatchError> {
        self.submit(SaveRequest::new(action, payload, client_id)).await
    }

    /// Save a request, tagged or not
    pub async fn submit(&self, request: SaveRequest) -> Result<DispatchReceipt, DispatchError> {
        let dispatch_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "dispatch",
            %dispatch_id,
            action = %request.action,
            client_id = %request.client_id
        );
        self.run(dispatch_id, request).instrument(span).await
    }

    async fn run(
        &self,
        dispatch_id: Uuid,
        request: SaveRequest,
    ) -> Result<DispatchReceipt, DispatchError> {
        let SaveRequest {
            action,
            client_id,
            payload,
            target,
        } = request;

        let plan = match self.plan(action, payload, target, &client_id) {
            Ok(plan) => plan,
            Err((record, err)) => {
                error!(record = %record, error = %err, "Rejected save");
                self.notify_failure(
                    dispatch_id,
                    action,
                    &client_id,
                    record,
                    MISUSE_MESSAGE,
                    None,
                );
                return Err(err);
            }
        };

        let port = match self.ports.get(plan.record) {
            Some(port) => port,
            None => {
                let err = DispatchError::NoPortRegistered {
                    action,
                    record: plan.record,
                };
                error!(record = %plan.record, "No port registered for record");
                self.notify_failure(
                    dispatch_id,
                    action,
                    &client_id,
                    plan.record,
                    MISUSE_MESSAGE,
                    None,
                );
                return Err(err);
            }
        };

        let dialog = action.dialog();
        let epoch = self.session.lock().begin_save(dialog);
        let _pending = PendingGuard {
            session: &self.session,
            dialog,
        };

        let outcome = match self.config.late_completion {
            LateCompletionPolicy::Abort => {
                let write =
                    self.write_with_retry(port.as_ref(), plan.record, &client_id, &plan.fields);
                tokio::select! {
                    outcome = write => Some(outcome),
                    _ = self.session.closed(dialog, epoch) => None,
                }
            }
            LateCompletionPolicy::Deliver | LateCompletionPolicy::Suppress => Some(
                self.write_with_retry(port.as_ref(), plan.record, &client_id, &plan.fields)
                    .await,
            ),
        };

        let Some(outcome) = outcome else {
            warn!(record = %plan.record, "Dialog closed while saving; save aborted");
            return Err(DispatchError::Cancelled { dialog });
        };

        let suppress = self.config.late_completion == LateCompletionPolicy::Suppress
            && self.session.closed_since(dialog, epoch);

        match outcome {
            Ok(attempts) => {
                if suppress {
                    warn!(
                        record = %plan.record,
                        attempts,
                        "Saved after dialog was closed; notification suppressed"
                    );
                    return Ok(DispatchReceipt {
                        dispatch_id,
                        record: plan.record,
                        evidence: plan.evidence,
                        attempts,
                        closed: Vec::new(),
                        notified: false,
                    });
                }

                self.session.lock().close_after_save(plan.closes);
                info!(record = %plan.record, attempts, "Saved");
                self.notify(Notification {
                    dispatch_id,
                    level: NotificationLevel::Success,
                    title: success_title(action, plan.record),
                    message: format!("{} saved.", plan.record.label()),
                    failure: None,
                    action,
                    client_id: client_id.clone(),
                    at: Utc::now(),
                });

                Ok(DispatchReceipt {
                    dispatch_id,
                    record: plan.record,
                    evidence: plan.evidence,
                    attempts,
                    closed: plan.closes.to_vec(),
                    notified: true,
                })
            }
            Err((attempts, source)) => {
                warn!(
                    record = %plan.record,
                    attempts,
                    kind = %source.kind,
                    error = %source.message,
                    "Save failed"
                );
                if suppress {
                    debug!("Dialog closed before failure; notification suppressed");
                } else {
                    self.notify_failure(
                        dispatch_id,
                        action,
                        &client_id,
                        plan.record,
                        &source.message,
                        Some(source.kind),
                    );
                }
                Err(DispatchError::Port {
                    record: plan.record,
                    attempts,
                    source,
                })
            }
        }
    }

    /// Pick the port and prepare the payload
    fn plan(
        &self,
        action: ActionKind,
        mut payload: FieldBag,
        target: Option<EntityKind>,
        client_id: &ClientId,
    ) -> Result<Plan, (RecordKind, DispatchError)> {
        match action.route() {
            ActionRoute::Static(record) => {
                if target.is_some() {
                    return Err((record, DispatchError::TargetNotApplicable { action }));
                }
                Ok(Plan {
                    record,
                    evidence: None,
                    fields: prepare_new_record(
                        record,
                        payload,
                        client_id,
                        &self.config.default_status,
                    ),
                    closes: originating(action),
                })
            }
            ActionRoute::Classified => {
                let classification = resolve_target(target, &payload);
                debug!(
                    entity = %classification.kind,
                    evidence = ?classification.evidence,
                    fields = payload.len(),
                    "Routed edit payload"
                );
                merge_client_id(&mut payload, client_id);
                Ok(Plan {
                    record: classification.kind.into(),
                    evidence: Some(classification.evidence),
                    fields: payload,
                    closes: &DialogKind::EDIT,
                })
            }
        }
    }

    /// Returns attempts made on success, or attempts plus the last error
    async fn write_with_retry(
        &self,
        port: &dyn RecordPort,
        record: RecordKind,
        client_id: &ClientId,
        fields: &FieldBag,
    ) -> Result<u32, (u32, PortError)> {
        let retry = &self.config.retry;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match port.write(client_id, fields).await {
                Ok(()) => return Ok(attempt),
                Err(e) if e.kind.is_retryable() && attempt <= retry.max_transient_retries => {
                    warn!(
                        record = %record,
                        attempt,
                        error = %e,
                        backoff_ms = retry.backoff_ms,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(retry.backoff()).await;
                }
                Err(e) => return Err((attempt, e)),
            }
        }
    }

    fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    fn notify_failure(
        &self,
        dispatch_id: Uuid,
        action: ActionKind,
        client_id: &ClientId,
        record: RecordKind,
        message: &str,
        failure: Option<PortFailureKind>,
    ) {
        self.notify(Notification {
            dispatch_id,
            level: NotificationLevel::Failure,
            title: failure_title(record, failure),
            message: message.to_string(),
            failure,
            action,
            client_id: client_id.clone(),
            at: Utc::now(),
        });
    }
}

/// The add dialog a fixed-route action closes on success
fn originating(action: ActionKind) -> &'static [DialogKind] {
    match action {
        ActionKind::AddNote => &[DialogKind::AddNote],
        ActionKind::AddEvent => &[DialogKind::AddEvent],
        ActionKind::AddGoal => &[DialogKind::AddGoal],
        ActionKind::AddActivity => &[DialogKind::AddActivity],
        ActionKind::AddAssessment => &[DialogKind::AddAssessment],
        ActionKind::AddEquipment => &[DialogKind::AddEquipment],
        ActionKind::AddRiskAssessment => &[DialogKind::AddRiskAssessment],
        ActionKind::AddServicePlan => &[DialogKind::AddServicePlan],
        ActionKind::AddServiceAction => &[DialogKind::AddServiceAction],
        ActionKind::Edit(_) => &DialogKind::EDIT,
    }
}

fn failure_title(record: RecordKind, failure: Option<PortFailureKind>) -> String {
    let label = record.label().to_lowercase();
    match failure {
        Some(kind) => format!("Could not save {label}: {}", kind.hint()),
        None => format!("Could not save {label}"),
    }
}

fn success_title(action: ActionKind, record: RecordKind) -> String {
    match action.route() {
        ActionRoute::Static(_) => format!("{} added", record.label()),
        ActionRoute::Classified => format!("{} updated", record.label()),
    }
}
