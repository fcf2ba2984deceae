//! Bidirectional byte-stream bridge
//!
//! A [`StreamBridge`] joins two [`Endpoint`](mcs_core::Endpoint)s with one
//! [`RelayTask`] per direction. Each task counts down a shared
//! [`CompletionGate`] exactly once when it stops, and the bridge returns when
//! the gate opens.
//!
//! Cancellation is cooperative: a task looks at its flag only between reads,
//! so a task parked in a blocking read stays there until the source yields.

mod gate;
mod relay;
mod stream;

pub use gate::CompletionGate;
pub use relay::{Direction, RelayOutcome, RelayReport, RelayState, RelayTask};
pub use stream::{BridgeReport, StreamBridge};

#[cfg(test)]
pub(crate) mod testing;
