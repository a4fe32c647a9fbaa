use std::io::Write;

use serde_json::Value as JsonValue;
use tracing::warn;
use vantage::{CommError, EnvironmentChannel, EnvironmentMessage, EnvironmentSession, SessionConfig};

// =============================================================================
// Outbound framing
// =============================================================================

/// Channel that frames each outbound report as one JSON line.
///
/// Reports are serialized compactly, terminated with `\n`, and flushed
/// immediately so a connected client sees them as they happen.
#[derive(Debug)]
pub struct JsonLinesChannel<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesChannel<W> {
    /// Wraps a writer as an outbound channel.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the channel and returns the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EnvironmentChannel for JsonLinesChannel<W> {
    fn send(&mut self, message: &EnvironmentMessage) -> Result<(), CommError> {
        let body = serde_json::to_string(message).map_err(|err| CommError::Send(err.to_string()))?;
        writeln!(self.writer, "{body}").map_err(|err| CommError::Send(err.to_string()))?;
        self.writer.flush().map_err(|err| CommError::Send(err.to_string()))
    }
}

// =============================================================================
// EnvironmentEndpoint
// =============================================================================

/// Thin transport adapter around [`EnvironmentSession`].
///
/// Owns the session, accepts raw inbound text (one JSON record per line),
/// and leaves all report semantics to the core: a parseable record goes to
/// the session's message handler, an unparseable one is answered with an
/// `error` report.
pub struct EnvironmentEndpoint {
    /// The underlying session that handles all report logic.
    session: EnvironmentSession,
}

impl Default for EnvironmentEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentEndpoint {
    /// Creates an endpoint with a default-configured session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: EnvironmentSession::new(),
        }
    }

    /// Creates an endpoint with explicit session limits.
    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            session: EnvironmentSession::with_config(config),
        }
    }

    /// Attaches the outbound channel; the session answers with an initial
    /// `list` report.
    ///
    /// # Errors
    /// Returns [`CommError`] when the initial report fails to send.
    pub fn connect(&mut self, channel: Box<dyn EnvironmentChannel>) -> Result<(), CommError> {
        self.session.attach_channel(channel)
    }

    /// Handles one inbound line.
    ///
    /// Parse failures are answered with an `error` report rather than
    /// surfaced to the caller; the transport loop keeps running.
    pub fn handle_line(&mut self, line: &str) {
        match serde_json::from_str::<JsonValue>(line) {
            Ok(data) => self.session.handle_message(&data),
            Err(err) => {
                if let Err(error) = self.session.send_error(format!("invalid request: {err}")) {
                    warn!("failed to answer malformed request: {error}");
                }
            }
        }
    }

    /// The underlying session.
    #[must_use]
    pub fn session(&self) -> &EnvironmentSession {
        &self.session
    }

    /// Mutable access to the underlying session for the hosting runtime.
    pub fn session_mut(&mut self) -> &mut EnvironmentSession {
        &mut self.session
    }
}
