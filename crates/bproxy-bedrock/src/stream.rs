use bytes::Bytes;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::warn;

use bproxy_protocol::claude::text::TextCompletionStreamEvent;
use bproxy_protocol::claude::types::StreamEvent;

/// Relay buffer size between the upstream reader task and the HTTP writer.
/// A full buffer blocks the producer; events are never dropped or
/// reordered.
pub const RELAY_CAPACITY: usize = 10;

/// Decodes one upstream chunk payload into a dialect event, attaching the
/// original bytes for verbatim echoing. A chunk that fails to decode is
/// logged and skipped; one malformed frame must not end an otherwise
/// healthy stream.
pub(crate) fn decode_event<E>(payload: &[u8]) -> Option<E>
where
    E: StreamEvent + DeserializeOwned,
{
    match serde_json::from_slice::<E>(payload) {
        Ok(mut event) => {
            event.attach_raw(Bytes::copy_from_slice(payload));
            Some(event)
        }
        Err(err) => {
            warn!(error = %err, "dropping undecodable stream chunk");
            None
        }
    }
}

/// Decodes and forwards one chunk in receipt order. Returns `false` only
/// when the consumer is gone, which tells the relay to stop; decode
/// failures are absorbed here.
pub(crate) async fn forward_chunk<E>(tx: &mpsc::Sender<E>, payload: &[u8]) -> bool
where
    E: StreamEvent + DeserializeOwned,
{
    match decode_event::<E>(payload) {
        Some(event) => tx.send(event).await.is_ok(),
        None => true,
    }
}

/// Reduces a finite sequence of legacy stream events to the full
/// completion text. Convenience for tests and tooling; the live relay
/// never materializes the whole stream.
pub fn collect_completion(events: &[TextCompletionStreamEvent]) -> String {
    events.iter().map(|event| event.delta_text()).collect()
}
