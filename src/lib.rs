//! Care Records - Save Dispatch
//!
//! The save path behind the record dialogs on a client view. Every dialog's
//! Save button hands an untyped field bag to one dispatcher, which picks the
//! record port, writes, closes the dialog and tells the user how it went.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  View layer: tabs + dialogs (reads DialogFlags, Notifications)  │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │ SaveRequest
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SaveDispatcher                               │
//! │   route ─► classifier (edit saves) ─► payload defaults          │
//! │   SessionHandle (open/pending per dialog)   Notifier            │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │ RecordPort::write
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │        PortRegistry: RecordKind -> RecordPort (external)        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use care_records::{ChannelNotifier, PortRegistry, SaveDispatcher, SessionHandle};
//! use care_records::types::{ActionKind, EditDialog, FieldBag};
//!
//! let (notifier, mut toasts) = ChannelNotifier::new();
//! let session = SessionHandle::mount();
//! let dispatcher = SaveDispatcher::new(ports, session.clone(), Arc::new(notifier))
//!     .with_config(DispatcherConfig::from_env()?);
//!
//! session.open(DialogKind::EditDietary);
//! let bag = FieldBag::new().with("food_allergies", vec!["nuts"]);
//! dispatcher.dispatch(ActionKind::Edit(EditDialog::Dietary), bag, "C123").await?;
//! ```

pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod notify;
pub mod payload;
pub mod ports;
pub mod session;

pub use care_records_types as types;

pub use classifier::{classify, Classification, Evidence};
pub use config::{DispatcherConfig, LateCompletionPolicy, RetryConfig};
pub use dispatcher::{DispatchReceipt, SaveDispatcher, SaveRequest};
pub use error::{ConfigError, DispatchError, PortError, PortFailureKind};
pub use notify::{ChannelNotifier, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use ports::{InMemoryRecordPort, PortRegistry, RecordPort, RecordedWrite};
pub use session::{DialogFlags, EditSessionState, SessionHandle};
