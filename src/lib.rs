//! spxsift: session analyzer for speech SDK diagnostic logs.
//!
//! Speech SDK trace files interleave every concurrent recognition
//! session and every worker thread into a single stream. This crate
//! untangles them: it enumerates the sessions a log mentions, resolves
//! which physical threads served each session and in what role, and
//! reconstructs a readable per-session excerpt with performance
//! metrics, recognition results, and a lifecycle timeline.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use spxsift::LogAnalyzer;
//!
//! fn main() -> spxsift::Result<()> {
//!     let analyzer = LogAnalyzer::from_path("trace.log")?;
//!
//!     for session in analyzer.list_sessions() {
//!         let details = analyzer.session_details(&session.session_id)?;
//!         println!(
//!             "{}: {} websocket messages",
//!             session.session_id, details.performance_metrics.websocket_messages
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`analyzer`]: High-level facade answering every query
//! - [`store`]: Log loading and line parsing
//! - [`patterns`]: The compiled matcher catalog
//! - [`index`]: Session enumeration and core identifiers
//! - [`correlate`]: Thread role resolution heuristics
//! - [`reconstruct`]: Per-session excerpt building
//! - [`analytics`]: Metrics, timeline, and recognition extraction
//! - [`cache`]: LRU caching of finished analyzers
//! - [`cli`]: Command-line interface
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod analytics;
pub mod analyzer;
pub mod cache;
pub mod cli;
pub mod config;
pub mod correlate;
pub mod error;
pub mod index;
pub mod model;
pub mod patterns;
pub mod reconstruct;
pub mod store;

// Re-export commonly used types at the crate root
pub use analyzer::LogAnalyzer;
pub use cache::AnalyzerPool;
pub use error::{Result, SiftError};
pub use model::{SessionDetails, SessionSummary, ThreadAnalysis, ThreadRole};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Prelude module for convenient imports.
pub mod prelude {

    pub use crate::analyzer::LogAnalyzer;
    pub use crate::config::ReconstructionConfig;
    pub use crate::error::{Result, SiftError};
    pub use crate::model::{
        CoreIdentifier, SessionDetails, SessionSummary, ThreadAnalysis, ThreadRole,
        ThreadRoleSet,
    };
    pub use crate::patterns::PatternCatalog;
}
