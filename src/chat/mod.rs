//! Chat widget core.
//!
//! ARCHITECTURE
//! ============
//! - `store`: append-only message log, input text, responding flag
//! - `simulator`: canned reply selection and thinking-time draw
//! - `session`: binds the two and owns the pending reply timer
//! - `view`: render snapshot consumed by the front-end
//! - `input`: quick-action presets and key handling

pub mod input;
pub mod message;
pub mod session;
pub mod simulator;
pub mod store;
pub mod view;

pub use session::ChatSession;
pub use simulator::ResponseSimulator;
pub use store::{ConversationStore, StoreEvent, SubmitRejected};
