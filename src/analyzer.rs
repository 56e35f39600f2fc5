//! High-level analyzer facade.
//!
//! [`LogAnalyzer`] is the main entry point for programmatic use of the
//! library: it loads a log once, builds the session index, and answers
//! every query the CLI exposes.
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
//!         println!("{} (first seen at line {})", session.session_id, session.start_line);
//!     }
//!
//!     let analysis = analyzer.thread_analysis(None)?;
//!     for (sid, roles) in &analysis.session_threads {
//!         println!("{sid}: {} roles resolved", roles.resolved_count());
//!     }
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::analytics::{
    excerpt_lines, extract_basic_info, extract_errors, extract_recognition_config,
    extract_recognition_results, MetricsExtractor, TimelineBuilder,
};
use crate::config::ReconstructionConfig;
use crate::correlate::ThreadCorrelator;
use crate::error::{Result, SiftError};
use crate::index::SessionIndex;
use crate::model::{SessionDetails, SessionSummary, ThreadAnalysis, ThreadRoleSet};
use crate::patterns::PatternCatalog;
use crate::reconstruct::SessionReconstructor;
use crate::store::LineStore;

/// Analyzer over one loaded log file.
#[derive(Debug)]
pub struct LogAnalyzer {
    store: LineStore,
    catalog: Arc<PatternCatalog>,
    index: SessionIndex,
    settings: ReconstructionConfig,
}

impl LogAnalyzer {
    /// Load and index a log file with default settings.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let catalog = PatternCatalog::shared();
        let store = LineStore::from_path(path, &catalog)?;
        Ok(Self::build(store, catalog, ReconstructionConfig::default()))
    }

    /// Load and index a log file with explicit settings.
    pub fn from_path_with(
        path: impl AsRef<Path>,
        settings: ReconstructionConfig,
    ) -> Result<Self> {
        let catalog = PatternCatalog::shared();
        let store = LineStore::from_path(path, &catalog)?;
        Ok(Self::build(store, catalog, settings))
    }

    /// Index log text already in memory with default settings.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_text_with(text, ReconstructionConfig::default())
    }

    /// Index log text already in memory with explicit settings.
    #[must_use]
    pub fn from_text_with(text: &str, settings: ReconstructionConfig) -> Self {
        let catalog = PatternCatalog::shared();
        let store = LineStore::parse(text, &catalog);
        Self::build(store, catalog, settings)
    }

    fn build(
        store: LineStore,
        catalog: Arc<PatternCatalog>,
        settings: ReconstructionConfig,
    ) -> Self {
        let index = SessionIndex::build(&store, &catalog);
        Self {
            store,
            catalog,
            index,
            settings,
        }
    }

    /// Every session sighted anywhere in the log, in first-sighting order.
    #[must_use]
    pub fn list_sessions(&self) -> &[SessionSummary] {
        self.index.summaries()
    }

    /// Thread analysis over all sessions, or just `session_id` when given.
    ///
    /// Fails with [`SiftError::NoSessionStartEvents`] when the log has no
    /// authoritative start events at all, and with
    /// [`SiftError::SessionNotFound`] when a requested session has none.
    #[instrument(skip(self))]
    pub fn thread_analysis(&self, session_id: Option<&str>) -> Result<ThreadAnalysis> {
        if !self.index.has_core_identifiers() {
            return Err(SiftError::NoSessionStartEvents);
        }

        let correlator = ThreadCorrelator::new(&self.store, &self.catalog, &self.settings);
        let mut session_threads: IndexMap<String, ThreadRoleSet> = IndexMap::new();

        match session_id {
            Some(requested) => {
                let core = self
                    .index
                    .core_for(requested)
                    .ok_or_else(|| SiftError::session_not_found(requested))?;
                session_threads.insert(core.session_id.clone(), correlator.correlate(core));
            }
            None => {
                for core in self.index.core_identifiers().values() {
                    session_threads.insert(core.session_id.clone(), correlator.correlate(core));
                }
            }
        }

        let primary_session = if session_threads.len() == 1 {
            session_threads.keys().next().cloned()
        } else {
            None
        };

        Ok(ThreadAnalysis {
            core_identifiers: self.index.core_identifiers().clone(),
            session_threads,
            primary_session,
        })
    }

    /// Full per-session report: configuration, metrics, results, errors,
    /// and timeline, all computed over the reconstructed excerpt.
    #[instrument(skip(self))]
    pub fn session_details(&self, session_id: &str) -> Result<SessionDetails> {
        let excerpt = self.session_log_text(session_id)?;
        let lines = excerpt_lines(&excerpt);
        if lines.is_empty() {
            return Err(SiftError::session_not_found(session_id));
        }
        debug!(lines = lines.len(), "analyzing session excerpt");

        // basic info comes from the literal-mention lines only, matching
        // the narrower identity scope of that field
        let effective_id = self.effective_session_id(session_id);
        let literal_lines = excerpt_lines(&self.literal_session_text(&effective_id));

        Ok(SessionDetails {
            session_id: session_id.to_string(),
            basic_info: extract_basic_info(&self.catalog, &literal_lines),
            recognition_config: extract_recognition_config(&self.catalog, &lines),
            performance_metrics: MetricsExtractor::new(&self.catalog).extract(&lines),
            recognition_results: extract_recognition_results(&self.catalog, &lines),
            error_analysis: extract_errors(&self.catalog, &lines),
            timeline: TimelineBuilder::new(&self.catalog).build(&lines),
        })
    }

    /// Reconstructed log text for one session.
    ///
    /// Role correlation is attempted when the session has a core
    /// identifier; otherwise the degraded literal search runs directly.
    #[instrument(skip(self))]
    pub fn session_log_text(&self, session_id: &str) -> Result<String> {
        let effective_id = self.effective_session_id(session_id);
        let roles = self
            .index
            .core_for(session_id)
            .map(|core| {
                ThreadCorrelator::new(&self.store, &self.catalog, &self.settings).correlate(core)
            });

        let reconstructor =
            SessionReconstructor::new(&self.store, &self.catalog, &self.settings);
        Ok(reconstructor.reconstruct_text(&effective_id, roles.as_ref()))
    }

    /// Raw text of every line belonging to one physical thread.
    pub fn thread_log_text(&self, thread_id: &str) -> Result<String> {
        if !self.store.has_thread(thread_id) {
            return Err(SiftError::thread_not_found(thread_id));
        }
        Ok(self.store.thread_log_text(thread_id))
    }

    /// Map of thread ID to role label for one session.
    pub fn session_thread_names(&self, session_id: &str) -> Result<IndexMap<String, String>> {
        let analysis = self.thread_analysis(Some(session_id))?;
        let mut names = IndexMap::new();
        if let Some(roles) = analysis.session_threads.values().next() {
            // a thread holding several roles keeps its highest-priority label
            for (role, binding) in roles.resolved() {
                names
                    .entry(binding.thread_id.clone())
                    .or_insert_with(|| role.label().to_string());
            }
        }
        Ok(names)
    }

    /// Number of lines in the loaded log.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.store.len()
    }

    /// The spelling of the session ID as it appears in the log, when the
    /// log knows the session; falls back to the caller's spelling.
    fn effective_session_id(&self, session_id: &str) -> String {
        if let Some(core) = self.index.core_for(session_id) {
            return core.session_id.clone();
        }
        let normalized = crate::model::normalize_session_id(session_id);
        self.index
            .summaries()
            .iter()
            .find(|s| crate::model::normalize_session_id(&s.session_id) == normalized)
            .map_or_else(|| session_id.to_string(), |s| s.session_id.clone())
    }

    fn literal_session_text(&self, session_id: &str) -> String {
        let lines: Vec<&str> = self
            .store
            .lines()
            .iter()
            .filter(|l| l.text.contains(session_id))
            .map(|l| l.text.as_str())
            .collect();
        lines.join("\n")
    }
}
