pub mod claude;
pub mod error;
pub mod sse;

pub use claude::types::StreamEvent;
pub use error::{ErrorDetail, ErrorEnvelope};
