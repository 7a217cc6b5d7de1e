//! A multi-stage concurrent text transformation pipeline.
//!
//! This crate assembles a linear chain of stages at runtime from an ordered
//! list of stage names. Each stage owns a bounded handoff queue and a
//! dedicated worker thread; lines pushed into the first stage flow through
//! the chain and the terminal stage writes its results to stdout. The
//! in-band sentinel `<END>` travels the same path as every other item and
//! shuts the chain down in order, without loss or duplication.
//!
//! # Features
//!
//! - Bounded FIFO handoff queues coordinated by manually-resettable latches
//! - One worker thread per stage; blocking-on-full is the only flow control
//! - In-band sentinel shutdown: stages drain, forward `<END>`, and stop
//! - A registry of built-in transforms (uppercaser, rotator, flipper,
//!   expander, logger, typewriter), one fresh instance per chain position
//! - Per-stage processed/dropped counters reported at shutdown
//!
//! # Example
//!
//! ```ignore
//! use std::io::Cursor;
//! use text_pipeline::Pipeline;
//!
//! let mut pipeline = Pipeline::build(&[
//!     "uppercaser".to_string(),
//!     "logger".to_string(),
//! ])?;
//! pipeline.start(10)?;
//! pipeline.run(Cursor::new("hello\n<END>\n"));
//! ```

pub mod error;
pub mod latch;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod queue;
pub mod registry;
pub mod stage;
pub mod transform;

// Re-exports for convenience
pub use error::{PipelineError, Result};
pub use latch::Latch;
pub use metrics::StageCounters;
pub use pipeline::Pipeline;
pub use queue::HandoffQueue;
pub use stage::{StageInstance, WorkHook, END_TOKEN};
pub use transform::{
    Expander, Flipper, LogPrefixer, Rotator, Transform, Typewriter, Uppercaser,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
