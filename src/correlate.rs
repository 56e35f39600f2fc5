//! Thread role correlation.
//!
//! Starting from a session's core identifier, the correlator assigns
//! physical thread IDs to the roles a session involves: the background
//! worker itself, the kickoff thread that spawned it, the application
//! main thread, the user event dispatch thread, the audio pump thread,
//! and the streaming pipeline thread.
//!
//! Every strategy here is best-effort. A role that cannot be resolved is
//! simply left unset; correlation never fails.

use tracing::{debug, instrument};

use crate::config::ReconstructionConfig;
use crate::model::{CoreIdentifier, ThreadBinding, ThreadRole, ThreadRoleSet};
use crate::patterns::PatternCatalog;
use crate::store::LineStore;

/// Resolves thread roles for sessions within one log.
#[derive(Debug)]
pub struct ThreadCorrelator<'a> {
    store: &'a LineStore,
    catalog: &'a PatternCatalog,
    settings: &'a ReconstructionConfig,
}

impl<'a> ThreadCorrelator<'a> {
    /// Create a correlator over a parsed log.
    #[must_use]
    pub fn new(
        store: &'a LineStore,
        catalog: &'a PatternCatalog,
        settings: &'a ReconstructionConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            settings,
        }
    }

    /// Resolve the full role set for one session.
    #[instrument(skip_all, fields(session_id = %core.session_id))]
    #[must_use]
    pub fn correlate(&self, core: &CoreIdentifier) -> ThreadRoleSet {
        let mut roles = ThreadRoleSet {
            session_id: core.session_id.clone(),
            audio_stream_address: core.audio_stream_address.clone(),
            ..ThreadRoleSet::default()
        };

        let Some(background_id) = core.background_thread_id.clone() else {
            debug!("start event line has no thread header, roles unresolved");
            return roles;
        };
        roles.set(
            ThreadRole::Background,
            ThreadBinding {
                thread_id: background_id.clone(),
                discovery_line: core.discovery_line,
                raw_line: core.raw_line.clone(),
            },
        );

        let kickoff = self.find_kickoff(&background_id);
        let kickoff_line = kickoff.as_ref().map(|b| b.discovery_line);
        if let Some(binding) = kickoff {
            roles.set(ThreadRole::Kickoff, binding);
        }

        if let Some(binding) = self.find_main(&background_id, kickoff_line) {
            roles.set(ThreadRole::Main, binding);
        }
        if let Some(binding) = self.find_user(&background_id) {
            roles.set(ThreadRole::User, binding);
        }
        if let Some(binding) = self.find_audio(&background_id) {
            roles.set(ThreadRole::Audio, binding);
        }
        if let Some(binding) = self.find_gstreamer() {
            roles.set(ThreadRole::Gstreamer, binding);
        }

        debug!(resolved = roles.resolved_count(), "correlation finished");
        roles
    }

    /// The kickoff thread is whichever thread logged the announcement
    /// that this session's background thread was started.
    fn find_kickoff(&self, background_id: &str) -> Option<ThreadBinding> {
        for line in self.store.lines() {
            let Some(caps) = self.catalog.thread_started.captures(&line.text) else {
                continue;
            };
            if &caps[1] == "Background" && &caps[2] == background_id {
                if let Some(thread_id) = &line.thread_id {
                    return Some(ThreadBinding {
                        thread_id: thread_id.clone(),
                        discovery_line: line.line_number,
                        raw_line: line.text.clone(),
                    });
                }
            }
        }
        None
    }

    /// Three-stage main thread resolution: memory address correlation,
    /// then keyword proximity around the kickoff line, then earliest
    /// non-background thread as a last resort.
    fn find_main(&self, background_id: &str, kickoff_line: Option<usize>) -> Option<ThreadBinding> {
        if let Some(binding) = self.find_main_by_address(background_id) {
            debug!(thread_id = %binding.thread_id, "main thread via memory address");
            return Some(binding);
        }
        if let Some(binding) = self.find_main_by_proximity(background_id, kickoff_line) {
            debug!(thread_id = %binding.thread_id, "main thread via proximity");
            return Some(binding);
        }
        let binding = self.find_earliest_thread(background_id);
        if let Some(b) = &binding {
            debug!(thread_id = %b.thread_id, "main thread via earliest fallback");
        }
        binding
    }

    /// Stage 1: the background thread reads the `SPEECH-Region` property
    /// off an object the application created. The first line elsewhere in
    /// the log carrying that object's address belongs to the main thread.
    fn find_main_by_address(&self, background_id: &str) -> Option<ThreadBinding> {
        let mut addresses = Vec::new();
        for line in self.store.lines() {
            if line.thread_id.as_deref() != Some(background_id) {
                continue;
            }
            if let Some(caps) = self.catalog.region_property.captures(&line.text) {
                addresses.push((caps[1].to_string(), line.line_number));
            }
        }

        for (address, bg_line) in addresses {
            let forms = address_forms(&address);
            let mut first: Option<ThreadBinding> = None;
            for line in self.store.lines() {
                if line.line_number == bg_line {
                    continue;
                }
                let lowered = line.text.to_ascii_lowercase();
                if !forms.iter().any(|f| lowered.contains(f)) {
                    continue;
                }
                let Some(thread_id) = &line.thread_id else {
                    continue;
                };
                if thread_id == background_id {
                    continue;
                }
                if first.as_ref().is_none_or(|b| line.line_number < b.discovery_line) {
                    first = Some(ThreadBinding {
                        thread_id: thread_id.clone(),
                        discovery_line: line.line_number,
                        raw_line: line.text.clone(),
                    });
                }
            }
            if first.is_some() {
                return first;
            }
        }
        None
    }

    /// Stage 2: count SDK initialization keywords per thread in a window
    /// around the kickoff line and take the busiest non-background thread.
    /// Ties resolve to the thread that reached the count first.
    fn find_main_by_proximity(
        &self,
        background_id: &str,
        kickoff_line: Option<usize>,
    ) -> Option<ThreadBinding> {
        let kickoff_line = kickoff_line?;
        let range = self.settings.proximity_lines;
        let start = kickoff_line.saturating_sub(range).max(1);
        let end = (kickoff_line + range).min(self.store.len());

        let mut activity: indexmap::IndexMap<&str, usize> = indexmap::IndexMap::new();
        for line in &self.store.lines()[start - 1..end] {
            let Some(thread_id) = &line.thread_id else {
                continue;
            };
            if thread_id == background_id {
                continue;
            }
            if self
                .catalog
                .sdk_init_markers
                .iter()
                .any(|re| re.is_match(&line.text))
            {
                *activity.entry(thread_id.as_str()).or_insert(0) += 1;
            }
        }

        let mut best: Option<(&str, usize)> = None;
        for (id, count) in &activity {
            if best.is_none_or(|(_, c)| *count > c) {
                best = Some((id, *count));
            }
        }
        let best = best.map(|(id, _)| id.to_string())?;
        let line = self.store.thread_lines(&best).next()?;
        Some(ThreadBinding {
            thread_id: best.clone(),
            discovery_line: line.line_number,
            raw_line: line.text.clone(),
        })
    }

    /// Stage 3: the earliest thread in the file that is not the
    /// background thread.
    fn find_earliest_thread(&self, background_id: &str) -> Option<ThreadBinding> {
        self.store
            .lines()
            .iter()
            .find(|line| {
                line.thread_id
                    .as_deref()
                    .is_some_and(|id| id != background_id)
            })
            .map(|line| ThreadBinding {
                thread_id: line.thread_id.clone().unwrap_or_default(),
                discovery_line: line.line_number,
                raw_line: line.text.clone(),
            })
    }

    /// The user event dispatch thread is announced from the background
    /// thread itself.
    fn find_user(&self, background_id: &str) -> Option<ThreadBinding> {
        for line in self.store.thread_lines(background_id) {
            let Some(caps) = self.catalog.thread_started.captures(&line.text) else {
                continue;
            };
            if &caps[1] == "User" {
                return Some(ThreadBinding {
                    thread_id: caps[2].to_string(),
                    discovery_line: line.line_number,
                    raw_line: line.text.clone(),
                });
            }
        }
        None
    }

    /// Two-step audio pump resolution: grab the pump object address from
    /// the background thread's `StartPump()` line, then find the pump
    /// thread announcing itself against that address.
    fn find_audio(&self, background_id: &str) -> Option<ThreadBinding> {
        let mut pump_address = None;
        for line in self.store.thread_lines(background_id) {
            if let Some(caps) = self.catalog.pump_start.captures(&line.text) {
                pump_address = Some(caps[1].to_string());
                break;
            }
        }
        let pump_address = pump_address?;
        debug!(%pump_address, "audio pump address found");

        for marker in &self.catalog.pump_thread_markers {
            for line in self.store.lines() {
                if !line.text.contains(&pump_address) || !marker.is_match(&line.text) {
                    continue;
                }
                if let Some(thread_id) = &line.thread_id {
                    return Some(ThreadBinding {
                        thread_id: thread_id.clone(),
                        discovery_line: line.line_number,
                        raw_line: line.text.clone(),
                    });
                }
            }
        }
        None
    }

    /// First thread matching a streaming pipeline marker, markers tried
    /// in priority order.
    fn find_gstreamer(&self) -> Option<ThreadBinding> {
        for marker in &self.catalog.gstreamer_markers {
            for line in self.store.lines() {
                if !marker.is_match(&line.text) {
                    continue;
                }
                if let Some(thread_id) = &line.thread_id {
                    return Some(ThreadBinding {
                        thread_id: thread_id.clone(),
                        discovery_line: line.line_number,
                        raw_line: line.text.clone(),
                    });
                }
            }
        }
        None
    }
}

/// Lowercased spellings under which a captured memory address may
/// reappear.
///
/// The SDK writes object addresses in both `0x...` and doubled `0x0x...`
/// notation depending on the call site, in arbitrary letter case. Lines
/// are compared lowercased, so prefix doubling is the only variation
/// left to enumerate.
fn address_forms(address: &str) -> Vec<String> {
    let lower = address.to_ascii_lowercase();
    let mut forms = vec![lower.clone()];
    if let Some(rest) = lower.strip_prefix("0x0x") {
        forms.push(format!("0x{rest}"));
    } else if let Some(rest) = lower.strip_prefix("0x") {
        forms.push(format!("0x0x{rest}"));
    }
    forms
}
