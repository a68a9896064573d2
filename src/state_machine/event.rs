//! Events that drive a turn

use crate::backend::ExchangeError;

/// Identifies one request/response exchange
pub type ExchangeId = u64;

/// Normalized completion of a chat request: the reply text, or one of the
/// failure classes.
pub type ExchangeOutcome = Result<String, ExchangeError>;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// User submitted the input surface
    Submit {
        text: String,
        /// Id the runtime assigns to the exchange this submission would start
        exchange_id: ExchangeId,
    },

    /// The outbound request finished, one way or another
    ExchangeCompleted {
        exchange_id: ExchangeId,
        outcome: ExchangeOutcome,
    },

    /// User asked for a fresh conversation
    Clear,
}
