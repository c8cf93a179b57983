//! Late completion tests
//!
//! A save is still in flight when the user closes its dialog. What happens
//! next depends on `LateCompletionPolicy`.

mod helpers;

use std::sync::Arc;

use care_records::types::{ActionKind, DialogKind, EditDialog, FieldBag, RecordKind};
use care_records::{
    DispatchError, DispatchReceipt, DispatcherConfig, LateCompletionPolicy, PortError,
};
use helpers::Harness;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

fn with_policy(policy: LateCompletionPolicy) -> DispatcherConfig {
    DispatcherConfig {
        late_completion: policy,
        ..DispatcherConfig::default()
    }
}

/// Start an add-event save that blocks in the port until the gate opens
async fn start_event_save(
    policy: LateCompletionPolicy,
) -> (
    Harness,
    Arc<Semaphore>,
    JoinHandle<Result<DispatchReceipt, DispatchError>>,
) {
    let gate = Arc::new(Semaphore::new(0));
    let h = Harness::gated(with_policy(policy), &[RecordKind::Event], gate.clone());
    h.session.open(DialogKind::AddEvent);

    let task = {
        let dispatcher = h.dispatcher.clone();
        tokio::spawn(async move {
            dispatcher
                .dispatch(
                    ActionKind::AddEvent,
                    FieldBag::new().with("title", "Dentist"),
                    "C1",
                )
                .await
        })
    };
    h.port(RecordKind::Event).wait_entered().await;
    (h, gate, task)
}

#[tokio::test]
async fn deliver_still_notifies_after_close() {
    let (h, gate, task) = start_event_save(LateCompletionPolicy::Deliver).await;

    assert!(h.session.cancel(DialogKind::AddEvent));
    gate.add_permits(1);
    let receipt = task.await.unwrap().unwrap();

    assert!(receipt.notified);
    assert_eq!(h.notes.successes(), 1);
    assert_eq!(h.port(RecordKind::Event).writes().len(), 1);
    assert!(!h.session.is_open(DialogKind::AddEvent));
    assert!(!h.session.is_pending(DialogKind::AddEvent));
}

#[tokio::test]
async fn deliver_closes_a_reopened_dialog() {
    let (h, gate, task) = start_event_save(LateCompletionPolicy::Deliver).await;

    h.session.cancel(DialogKind::AddEvent);
    h.session.open(DialogKind::AddEvent);
    gate.add_permits(1);
    task.await.unwrap().unwrap();

    assert!(!h.session.is_open(DialogKind::AddEvent));
}

#[tokio::test]
async fn suppress_drops_notification_but_keeps_write() {
    let (h, gate, task) = start_event_save(LateCompletionPolicy::Suppress).await;

    h.session.cancel(DialogKind::AddEvent);
    h.session.open(DialogKind::AddEvent);
    gate.add_permits(1);
    let receipt = task.await.unwrap().unwrap();

    assert!(!receipt.notified);
    assert!(receipt.closed.is_empty());
    assert!(h.notes.all().is_empty());
    assert_eq!(h.port(RecordKind::Event).writes().len(), 1);
    // The reopened dialog holds a fresh draft; leave it alone
    assert!(h.session.is_open(DialogKind::AddEvent));
    assert!(!h.session.is_pending(DialogKind::AddEvent));
}

#[tokio::test]
async fn suppress_leaves_other_edit_dialogs_open() {
    let gate = Arc::new(Semaphore::new(0));
    let h = Harness::gated(
        with_policy(LateCompletionPolicy::Suppress),
        &[RecordKind::Dietary],
        gate.clone(),
    );
    h.session.open(DialogKind::EditDietary);

    let task = {
        let dispatcher = h.dispatcher.clone();
        tokio::spawn(async move {
            let payload = FieldBag::new().with("food_allergies", vec!["shellfish"]);
            dispatcher
                .dispatch(ActionKind::Edit(EditDialog::Dietary), payload, "C2")
                .await
        })
    };
    h.port(RecordKind::Dietary).wait_entered().await;

    assert!(h.session.cancel(DialogKind::EditDietary));
    h.session.open(DialogKind::EditMedicalInfo);
    gate.add_permits(1);
    let receipt = task.await.unwrap().unwrap();

    assert_eq!(receipt.record, RecordKind::Dietary);
    assert!(!receipt.notified);
    assert!(receipt.closed.is_empty());
    assert!(h.notes.all().is_empty());
    assert_eq!(h.port(RecordKind::Dietary).writes().len(), 1);
    assert!(h.session.is_open(DialogKind::EditMedicalInfo));
    assert!(!h.session.is_pending(DialogKind::EditDietary));
}

#[tokio::test]
async fn suppress_drops_late_failure_notification() {
    let (h, gate, task) = start_event_save(LateCompletionPolicy::Suppress).await;
    h.port(RecordKind::Event)
        .fail_next(PortError::validation("start time is in the past"));

    h.session.cancel(DialogKind::AddEvent);
    gate.add_permits(1);
    let err = task.await.unwrap().unwrap_err();

    assert!(matches!(err, DispatchError::Port { .. }));
    assert!(h.notes.all().is_empty());
}

#[tokio::test]
async fn suppress_without_close_behaves_normally() {
    let (h, gate, task) = start_event_save(LateCompletionPolicy::Suppress).await;

    gate.add_permits(1);
    let receipt = task.await.unwrap().unwrap();

    assert!(receipt.notified);
    assert_eq!(h.notes.successes(), 1);
    assert!(!h.session.is_open(DialogKind::AddEvent));
}

#[tokio::test]
async fn abort_cancels_in_flight_write() {
    let (h, _gate, task) = start_event_save(LateCompletionPolicy::Abort).await;

    h.session.cancel(DialogKind::AddEvent);
    let err = task.await.unwrap().unwrap_err();

    assert!(matches!(
        err,
        DispatchError::Cancelled {
            dialog: DialogKind::AddEvent
        }
    ));
    assert!(h.port(RecordKind::Event).writes().is_empty());
    assert!(h.notes.all().is_empty());
    assert!(!h.session.is_pending(DialogKind::AddEvent));
}

#[tokio::test]
async fn abort_ignores_other_dialogs_closing() {
    let (h, gate, task) = start_event_save(LateCompletionPolicy::Abort).await;

    h.session.open(DialogKind::AddNote);
    h.session.cancel(DialogKind::AddNote);
    gate.add_permits(1);
    let receipt = task.await.unwrap().unwrap();

    assert!(receipt.notified);
    assert_eq!(h.port(RecordKind::Event).writes().len(), 1);
}
