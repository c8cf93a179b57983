//! Edit Session State
//!
//! Open/pending flags for every record dialog on a client view, kept in one
//! map keyed by `DialogKind`.
//!
//! - The user opens and cancels dialogs.
//! - The dispatcher marks a dialog pending while its save is in flight and
//!   closes dialogs when a save succeeds.
//!
//! Each dialog also carries a close epoch, bumped whenever the *user* closes
//! it. A save captures the epoch when it starts; a different epoch at
//! completion means the dialog was closed underneath it. Closes made by the
//! dispatcher itself do not bump the epoch.

use care_records_types::DialogKind;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// What the view layer reads for one dialog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialogFlags {
    pub open: bool,
    /// A save from this dialog is in flight; the view disables Submit
    pub pending: bool,
}

#[derive(Debug, Default)]
struct DialogSlot {
    open: bool,
    in_flight: u32,
    close_epoch: u64,
}

impl DialogSlot {
    fn flags(&self) -> DialogFlags {
        DialogFlags {
            open: self.open,
            pending: self.in_flight > 0,
        }
    }
}

/// Flags for every dialog on one mounted client view
#[derive(Debug)]
pub struct EditSessionState {
    slots: HashMap<DialogKind, DialogSlot>,
}

impl EditSessionState {
    /// Fresh state for a newly mounted view: everything closed, nothing pending
    pub fn mount() -> Self {
        Self {
            slots: DialogKind::ALL
                .into_iter()
                .map(|d| (d, DialogSlot::default()))
                .collect(),
        }
    }

    fn slot(&mut self, dialog: DialogKind) -> &mut DialogSlot {
        self.slots.entry(dialog).or_default()
    }

    pub fn flags(&self, dialog: DialogKind) -> DialogFlags {
        self.slots
            .get(&dialog)
            .map(DialogSlot::flags)
            .unwrap_or_default()
    }

    pub fn is_open(&self, dialog: DialogKind) -> bool {
        self.flags(dialog).open
    }

    pub fn is_pending(&self, dialog: DialogKind) -> bool {
        self.flags(dialog).pending
    }

    pub fn open(&mut self, dialog: DialogKind) {
        self.slot(dialog).open = true;
    }

    /// User closed the dialog (Cancel, Escape, click-away).
    ///
    /// Returns true if it was open. Only a real close bumps the epoch.
    pub fn cancel(&mut self, dialog: DialogKind) -> bool {
        let slot = self.slot(dialog);
        if !slot.open {
            return false;
        }
        slot.open = false;
        slot.close_epoch += 1;
        true
    }

    pub fn close_epoch(&self, dialog: DialogKind) -> u64 {
        self.slots
            .get(&dialog)
            .map(|s| s.close_epoch)
            .unwrap_or_default()
    }

    /// Mark a save as started. Returns the close epoch to compare on completion.
    pub(crate) fn begin_save(&mut self, dialog: DialogKind) -> u64 {
        let slot = self.slot(dialog);
        slot.in_flight += 1;
        slot.close_epoch
    }

    pub(crate) fn finish_save(&mut self, dialog: DialogKind) {
        let slot = self.slot(dialog);
        slot.in_flight = slot.in_flight.saturating_sub(1);
    }

    /// Close after a successful save. Does not count as a user close.
    pub(crate) fn close_after_save(&mut self, dialogs: &[DialogKind]) {
        for dialog in dialogs {
            self.slot(*dialog).open = false;
        }
    }

    /// Dialogs currently open, in declaration order
    pub fn open_dialogs(&self) -> Vec<DialogKind> {
        DialogKind::ALL
            .into_iter()
            .filter(|d| self.is_open(*d))
            .collect()
    }

    /// Flags for every dialog, in declaration order
    pub fn snapshot(&self) -> Vec<(DialogKind, DialogFlags)> {
        DialogKind::ALL
            .into_iter()
            .map(|d| (d, self.flags(d)))
            .collect()
    }
}

impl Default for EditSessionState {
    fn default() -> Self {
        Self::mount()
    }
}

/// Shared handle to one view's session state.
///
/// Cloned into the dispatcher and the view layer. Every user close is also
/// broadcast on a watch channel so an in-flight save can react to it.
#[derive(Clone)]
pub struct SessionHandle {
    state: Arc<Mutex<EditSessionState>>,
    closes: Arc<watch::Sender<u64>>,
}

impl SessionHandle {
    pub fn mount() -> Self {
        let (closes, _) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(EditSessionState::mount())),
            closes: Arc::new(closes),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, EditSessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn open(&self, dialog: DialogKind) {
        self.lock().open(dialog);
    }

    /// User close. Wakes any save waiting on this dialog.
    pub fn cancel(&self, dialog: DialogKind) -> bool {
        let closed = self.lock().cancel(dialog);
        if closed {
            self.closes.send_modify(|n| *n += 1);
        }
        closed
    }

    pub fn flags(&self, dialog: DialogKind) -> DialogFlags {
        self.lock().flags(dialog)
    }

    pub fn is_open(&self, dialog: DialogKind) -> bool {
        self.lock().is_open(dialog)
    }

    pub fn is_pending(&self, dialog: DialogKind) -> bool {
        self.lock().is_pending(dialog)
    }

    pub fn open_dialogs(&self) -> Vec<DialogKind> {
        self.lock().open_dialogs()
    }

    pub fn snapshot(&self) -> Vec<(DialogKind, DialogFlags)> {
        self.lock().snapshot()
    }

    /// True if the user closed the dialog after `epoch` was captured
    pub(crate) fn closed_since(&self, dialog: DialogKind, epoch: u64) -> bool {
        self.lock().close_epoch(dialog) != epoch
    }

    /// Resolves once the user closes `dialog` after `epoch` was captured.
    /// Pends forever otherwise.
    pub(crate) async fn closed(&self, dialog: DialogKind, epoch: u64) {
        let mut closes = self.closes.subscribe();
        loop {
            if self.closed_since(dialog, epoch) {
                return;
            }
            if closes.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::mount()
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("open", &self.open_dialogs())
            .finish()
    }
}
