//! Shared Types for Care Records
//!
//! Vocabulary shared between the save dispatcher and whatever view layer
//! collects form input:
//! - `ClientId` - opaque join key for every client record
//! - `FieldBag` / `FieldValue` - the untyped field set one dialog submits
//! - `EntityKind` / `RecordKind` - backend record types a save can land in
//! - `DialogKind` / `EditDialog` / `ActionKind` - which dialog asked for the save
//!
//! ## Rules
//!
//! 1. Enum names serialize as `snake_case`
//! 2. Action and dialog names also parse from the kebab-case names the UI uses
//!    (`add-note`, `edit-dietary`, ...)

mod action;
mod client;
mod field_bag;
mod kinds;

pub use action::{ActionKind, ActionRoute, DialogKind, EditDialog, ParseKindError};
pub use client::ClientId;
pub use field_bag::{FieldBag, FieldBagError, FieldValue};
pub use kinds::{EntityKind, RecordKind};
