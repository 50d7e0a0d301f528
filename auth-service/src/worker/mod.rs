//! Group-assignment worker.
//!
//! ## Processing Flow
//!
//! ```text
//! QueuePoller (fixed-rate tick) → MessageProcessor → GroupAssigner + Notifier
//! ```

pub mod poller;
pub mod processor;

pub use poller::{QueuePoller, TickSummary};
pub use processor::{
    parse_assignment, GroupAssignment, MessageProcessor, ProcessOutcome, ProcessingFailure,
};
