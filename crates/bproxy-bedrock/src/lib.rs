pub mod client;
pub mod error;
pub mod stream;
pub mod transform;

pub use client::{BedrockClient, Completion};
pub use error::BedrockError;
pub use stream::{RELAY_CAPACITY, collect_completion};
pub use transform::{InvocationEnvelope, message_envelope, text_envelope};
