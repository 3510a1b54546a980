//! Arrbot Core - status polling and notification engine.
//!
//! This crate holds the logic behind the arrbot Telegram bot; the bot crate
//! only wires it to Telegram and the backend clients:
//!
//! - **matcher**: Boundary-anchored, separator-tolerant title matching
//! - **progress**: Fixed-width text progress bars
//! - **report**: Capped, ordered reports split into message-sized chunks
//! - **queue**: Fetch-and-report over registered backend queues
//! - **liveness**: Up/down tracking for an external process with rate limiting
//! - **notify**: Down alerts with per-recipient failure isolation
//! - **gate**: Admin allow-list and the restart/log actions it guards
//! - **watchdog**: Timer-driven and on-demand check-and-notify pipeline
//! - **config**: Immutable configuration loaded from the environment
//! - **traits**: Collaborator interfaces implemented by backends and transports
//!
//! # Example
//!
//! ```
//! use arrbot_core::{ReportFormatter, ReportOutcome, WorkItem};
//!
//! let items = vec![
//!     WorkItem::new("The Office", "downloading", 42.0),
//!     WorkItem::new("Office Space", "completed", 100.0),
//! ];
//!
//! match ReportFormatter::new().render("office", &items) {
//!     ReportOutcome::Report(report) => {
//!         for chunk in report.chunks {
//!             println!("{chunk}");
//!         }
//!     }
//!     ReportOutcome::NoMatch => println!("office was not found..."),
//! }
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod liveness;
pub mod matcher;
pub mod model;
pub mod notify;
pub mod progress;
pub mod queue;
pub mod report;
pub mod traits;
pub mod watchdog;

pub use config::{ArrConfig, BotConfig, CommandAliases, MonitorConfig, TransmissionConfig};
pub use error::{BackendError, ConfigError, ControlError, DeliveryError, ProbeError};
pub use gate::{authorize, AdminGate, Gated, PrivilegedActions, RestartResult};
pub use liveness::{CheckOutcome, LivenessMonitor, LivenessRecord, Transition};
pub use matcher::{matches, TitleMatcher};
pub use model::{Liveness, Recipient, WorkItem};
pub use notify::{DeliveryReport, NotificationDispatcher};
pub use progress::{render_bar, render_percent};
pub use queue::{QueueKind, QueueReporter};
pub use report::{split_chunks, Report, ReportFormatter, ReportOutcome};
pub use traits::{MessageSender, ProcessControl, ProcessProbe, RestartOutcome, WorkSource};
pub use watchdog::{CheckReport, Watchdog};
