//! Events that drive the chat state machine

use crate::service::Suggestion;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// A raw line submitted by the user (may be empty)
    UserInput { text: String },

    /// Resolution of a previously issued service call
    ///
    /// `outcome` is `None` when the call produced no usable result; transport
    /// errors are degraded to `None` by the runtime after logging.
    ServiceResult {
        generation: u64,
        outcome: Option<Suggestion>,
    },
}
