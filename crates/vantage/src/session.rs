//! Session controller for the environment view.
//!
//! `EnvironmentSession` owns the tracked namespace for one interactive
//! session and drives the report cycle: the host fires the pre-execute hook,
//! runs user code against the namespace, then fires the post-execute hook,
//! and the controller turns the accumulated changes into an `update` (or a
//! full `list` when the diff is too large to be useful). Inbound client
//! requests -- refresh, clear, delete -- re-enter the controller directly.
//!
//! Nothing in this module may disturb the host's execution loop: every
//! failure inside a hook or message handler is logged and swallowed.

use std::collections::BTreeSet;

use ahash::AHashSet;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::{
    comm::{CommError, EnvironmentChannel, EnvironmentMessage},
    namespace::TrackedNamespace,
    summary::{DEFAULT_DATAFRAME_TYPES, MAX_VALUE_SUMMARY_LENGTH, Summarizer, VALUE_PRINT_WIDTH, VariableSummary},
    value::Value,
};

/// The comm channel target name for the environment view.
pub const ENVIRONMENT_COMM_TARGET: &str = "vantage.environment";

/// Maximum number of variables summarized in one report.
pub const MAX_ITEMS: usize = 2000;

// =============================================================================
// Configuration
// =============================================================================

/// Tunables for one environment session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum number of variables summarized in one report.
    pub max_items: usize,
    /// Maximum display-string length per summarized value, in characters.
    pub max_value_length: usize,
    /// Pretty-print target width for summarized values.
    pub print_width: usize,
    /// Qualified type names treated as dataframes.
    pub dataframe_types: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_items: MAX_ITEMS,
            max_value_length: MAX_VALUE_SUMMARY_LENGTH,
            print_width: VALUE_PRINT_WIDTH,
            dataframe_types: DEFAULT_DATAFRAME_TYPES.iter().map(|&name| name.to_owned()).collect(),
        }
    }
}

// =============================================================================
// EnvironmentSession
// =============================================================================

/// Controller for one session's environment view.
///
/// Owns the tracked namespace (created here, never shared from elsewhere),
/// the hidden-name registry, and the optional outbound channel. All report
/// operations are no-ops until a channel is attached.
pub struct EnvironmentSession {
    /// The live, change-tracked variable namespace.
    namespace: TrackedNamespace,
    /// Names excluded from every client-facing report.
    hidden: AHashSet<String>,
    /// Classifier/summarizer configured from [`SessionConfig`].
    summarizer: Summarizer,
    /// Maximum number of variables per report.
    max_items: usize,
    /// Outbound channel, once the client has connected.
    channel: Option<Box<dyn EnvironmentChannel>>,
}

impl Default for EnvironmentSession {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Constructor and wiring
// =============================================================================

impl EnvironmentSession {
    /// Creates a session with default limits and an empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Creates a session with explicit limits.
    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            namespace: TrackedNamespace::new(),
            hidden: AHashSet::new(),
            summarizer: Summarizer::new(config.max_value_length, config.print_width, config.dataframe_types),
            max_items: config.max_items,
            channel: None,
        }
    }

    /// Attaches the outbound channel and reports the full namespace, so a
    /// newly connected client starts from a complete snapshot.
    ///
    /// # Errors
    /// Returns [`CommError`] when the initial `list` report fails to send.
    pub fn attach_channel(&mut self, channel: Box<dyn EnvironmentChannel>) -> Result<(), CommError> {
        self.channel = Some(channel);
        self.send_list()
    }

    /// Excludes a name from every future report.
    pub fn mark_hidden(&mut self, name: impl Into<String>) {
        self.hidden.insert(name.into());
    }

    /// Returns true when a name is excluded from reports.
    #[must_use]
    pub fn is_hidden(&self, name: &str) -> bool {
        self.hidden.contains(name)
    }

    /// The tracked namespace.
    #[must_use]
    pub fn namespace(&self) -> &TrackedNamespace {
        &self.namespace
    }

    /// Mutable access to the tracked namespace for the executing host.
    pub fn namespace_mut(&mut self) -> &mut TrackedNamespace {
        &mut self.namespace
    }
}

// =============================================================================
// Execution hooks
// =============================================================================

impl EnvironmentSession {
    /// Pre-execution hook: resets the namespace watch so the upcoming
    /// execution starts a fresh change window. Never fails.
    pub fn on_pre_execute(&mut self) {
        self.namespace.reset_watch();
    }

    /// Post-execution hook: reports the changes observed during execution.
    ///
    /// Emits an `update` when both the assigned and removed counts stay
    /// strictly below the item cap; past that an incremental diff stops
    /// being useful, so the client gets a full `list` snapshot instead.
    /// Failures are logged and swallowed -- this runs on the host's
    /// execution path and must never interrupt it.
    pub fn on_post_execute(&mut self) {
        let changes = self.namespace.changes();

        let result = if changes.assigned.len() < self.max_items && changes.removed.len() < self.max_items {
            self.namespace.reset_watch();
            self.send_update(&changes.assigned, &changes.removed)
        } else {
            self.send_list()
        };

        if let Err(error) = result {
            warn!("failed to report namespace changes: {error}");
        }
    }
}

// =============================================================================
// Client messages
// =============================================================================

impl EnvironmentSession {
    /// Handles one inbound client record.
    ///
    /// Dispatches on the required `msg_type` field: `refresh` re-lists the
    /// namespace, `clear` deletes every non-hidden variable, `delete`
    /// removes the variables named in `name`. A missing or unrecognized
    /// type is answered with an `error` report. Channel failures are logged
    /// and swallowed.
    pub fn handle_message(&mut self, data: &JsonValue) {
        let result = match data.get("msg_type").and_then(JsonValue::as_str) {
            Some("refresh") => self.send_list(),
            Some("clear") => self.delete_all(),
            Some("delete") => match requested_names(data) {
                Some(names) => self.delete_names(&names),
                None => Ok(()),
            },
            Some(other) => self.send_error(format!("unknown message type '{other}'")),
            None => self.send_error("could not determine message type".to_owned()),
        };

        if let Err(error) = result {
            warn!("failed to answer client message: {error}");
        }
    }

    /// Deletes every non-hidden variable, then reports the full namespace.
    ///
    /// The name list and hidden set are snapshotted before any mutation so
    /// the loop never iterates a structure it is emptying. A failed
    /// deletion is logged and skipped.
    ///
    /// # Errors
    /// Returns [`CommError`] when the closing `list` report fails to send.
    pub fn delete_all(&mut self) -> Result<(), CommError> {
        let names = self.namespace.names();
        let hidden = self.hidden.clone();

        for name in names {
            if hidden.contains(&name) {
                continue;
            }
            if let Err(error) = self.namespace.remove(&name) {
                warn!("unable to delete variable '{name}': {error}");
            }
        }

        self.send_list()
    }

    /// Deletes the named variables, then reports the resulting diff.
    ///
    /// The watch is reset first so the accumulated changes reflect exactly
    /// these deletions. A failed deletion is logged and skipped.
    ///
    /// # Errors
    /// Returns [`CommError`] when the closing `update` report fails to send.
    pub fn delete_names(&mut self, names: &[String]) -> Result<(), CommError> {
        self.namespace.reset_watch();

        for name in names {
            if let Err(error) = self.namespace.remove(name) {
                warn!("unable to delete variable '{name}': {error}");
            }
        }

        let changes = self.namespace.changes();
        self.send_update(&changes.assigned, &changes.removed)
    }
}

// =============================================================================
// Reports
// =============================================================================

impl EnvironmentSession {
    /// Sends a `list` report summarizing the full non-hidden namespace.
    ///
    /// No-op while no channel is attached.
    ///
    /// # Errors
    /// Returns [`CommError`] when the transport rejects the message.
    pub fn send_list(&mut self) -> Result<(), CommError> {
        if self.channel.is_none() {
            return Ok(());
        }

        let variables = self.summarize_filtered(self.namespace.iter());
        self.send(EnvironmentMessage::List { variables })
    }

    /// Sends an `error` report carrying the message text.
    ///
    /// No-op while no channel is attached.
    ///
    /// # Errors
    /// Returns [`CommError`] when the transport rejects the message.
    pub fn send_error(&mut self, message: String) -> Result<(), CommError> {
        self.send(EnvironmentMessage::Error { message })
    }

    /// Sends an `update` report for a change window.
    ///
    /// Hidden names are filtered from both sides; an update whose filtered
    /// sides are both empty is suppressed entirely.
    fn send_update(&mut self, assigned: &IndexMap<String, Value>, removed: &AHashSet<String>) -> Result<(), CommError> {
        if self.channel.is_none() {
            return Ok(());
        }

        let filtered_assigned = self.summarize_filtered(assigned.iter().map(|(name, value)| (name.as_str(), value)));
        let filtered_removed: BTreeSet<String> = removed
            .iter()
            .filter(|name| !self.hidden.contains(name.as_str()))
            .cloned()
            .collect();

        if filtered_assigned.is_empty() && filtered_removed.is_empty() {
            return Ok(());
        }

        self.send(EnvironmentMessage::Update {
            assigned: filtered_assigned,
            removed: filtered_removed,
        })
    }

    /// Summarizes variables in order, skipping hidden names and stopping at
    /// the item cap.
    fn summarize_filtered<'a>(&self, variables: impl Iterator<Item = (&'a str, &'a Value)>) -> Vec<VariableSummary> {
        let mut summaries = Vec::new();
        for (name, value) in variables {
            if self.hidden.contains(name) {
                continue;
            }
            if summaries.len() >= self.max_items {
                break;
            }
            summaries.push(self.summarizer.summarize(name, value));
        }
        summaries
    }

    /// Delivers one message through the attached channel, if any.
    fn send(&mut self, message: EnvironmentMessage) -> Result<(), CommError> {
        match self.channel.as_mut() {
            Some(channel) => channel.send(&message),
            None => Ok(()),
        }
    }
}

/// Extracts the `name` field of a delete request as a list of strings.
fn requested_names(data: &JsonValue) -> Option<Vec<String>> {
    let items = data.get("name")?.as_array()?;
    Some(items.iter().filter_map(JsonValue::as_str).map(str::to_owned).collect())
}
