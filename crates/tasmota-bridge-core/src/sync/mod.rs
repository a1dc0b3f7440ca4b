//! Output-to-device synchronization.
//!
//! ```text
//! SyncController ──set──► SessionSlot ◄──load once per tick── Reconciler
//!                          │                                     │
//!                          └─ SyncSession                        ├─ OutputStateSource
//!                              ├─ DeviceRegistry                 └─ DeviceUpdater
//!                              ├─ SyncStateStore
//!                              └─ RetryPolicy
//! ```

mod controller;
mod reconciler;
mod registry;
mod session;
mod state;


pub use controller::SyncController;
pub use reconciler::{Clock, Reconciler, TickOutcome, TickReport, DISABLED_POLL_INTERVAL};
pub use registry::{Credentials, DeviceMapping, DeviceRegistry};
pub use session::{SessionSlot, SyncSession};
pub use state::{CooldownCheck, DeviceHealth, RetryPolicy, SyncState, SyncStateStore};
