//! Environment comm messages and the outbound channel seam.
//!
//! The controller talks to the client through one logical duplex channel.
//! Outbound traffic is typed here as [`EnvironmentMessage`]; the transport
//! itself stays behind the [`EnvironmentChannel`] trait so hosts can wire
//! whatever framing they own.

use std::{cell::RefCell, collections::BTreeSet, fmt, rc::Rc};

use crate::summary::VariableSummary;

/// Messages sent to the client over the environment comm.
///
/// Each serializes as a record with a `msg_type` discriminator, e.g.
/// `{"msg_type": "update", "assigned": [...], "removed": [...]}`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "msg_type", rename_all = "lowercase")]
pub enum EnvironmentMessage {
    /// Full summary of the non-hidden namespace.
    List {
        /// Summaries in namespace insertion order, capped at the item limit.
        variables: Vec<VariableSummary>,
    },
    /// Changes observed since the last report.
    Update {
        /// Summaries of assigned variables, in assignment order.
        assigned: Vec<VariableSummary>,
        /// Names of removed variables, sorted.
        removed: BTreeSet<String>,
    },
    /// A problem report for the client.
    Error {
        /// Human-readable description.
        message: String,
    },
}

/// Error type for outbound message delivery.
#[derive(Debug, Clone)]
pub enum CommError {
    /// The transport failed to deliver the message.
    Send(String),
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send(detail) => write!(f, "failed to send environment message: {detail}"),
        }
    }
}

impl std::error::Error for CommError {}

/// Outbound half of the environment comm.
///
/// Implement this to route reports onto the host's transport. Delivery is
/// synchronous; the controller treats a send failure as a logged, non-fatal
/// event.
pub trait EnvironmentChannel {
    /// Delivers one message to the connected client.
    ///
    /// # Errors
    /// Returns [`CommError::Send`] when the transport rejects the message.
    fn send(&mut self, message: &EnvironmentMessage) -> Result<(), CommError>;
}

/// Channel that records every sent message.
///
/// Clones share one buffer via `Rc<RefCell<..>>`, so a test can hand one
/// clone to the session and read messages back through another.
#[derive(Debug, Clone, Default)]
pub struct CollectChannel {
    messages: Rc<RefCell<Vec<EnvironmentMessage>>>,
}

impl CollectChannel {
    /// Creates a new empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every message sent so far.
    #[must_use]
    pub fn messages(&self) -> Vec<EnvironmentMessage> {
        self.messages.borrow().clone()
    }

    /// Returns a copy of the most recent message, if any.
    #[must_use]
    pub fn last(&self) -> Option<EnvironmentMessage> {
        self.messages.borrow().last().cloned()
    }

    /// Number of messages sent so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    /// Returns true when no message has been sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl EnvironmentChannel for CollectChannel {
    fn send(&mut self, message: &EnvironmentMessage) -> Result<(), CommError> {
        self.messages.borrow_mut().push(message.clone());
        Ok(())
    }
}
