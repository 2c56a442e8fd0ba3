use bytes::Bytes;

/// Builds one `text/event-stream` frame: `event: <type>\ndata: <payload>\n\n`.
///
/// The payload is forwarded byte-for-byte; callers pass the raw upstream
/// chunk so clients see exactly what the backend emitted.
pub fn frame(event: &str, data: &[u8]) -> Bytes {
    let mut out = Vec::with_capacity(event.len() + data.len() + 16);
    out.extend_from_slice(b"event: ");
    out.extend_from_slice(event.as_bytes());
    out.extend_from_slice(b"\ndata: ");
    out.extend_from_slice(data);
    out.extend_from_slice(b"\n\n");
    Bytes::from(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_layout() {
        let frame = frame("completion", br#"{"completion":"hi"}"#);
        assert_eq!(
            frame.as_ref(),
            b"event: completion\ndata: {\"completion\":\"hi\"}\n\n"
        );
    }

    #[test]
    fn frame_preserves_payload_bytes() {
        let payload = r#"{"type":"ping","pad":"é"}"#.as_bytes();
        let frame = frame("ping", payload);
        let text = std::str::from_utf8(&frame).unwrap();
        assert!(text.starts_with("event: ping\ndata: "));
        assert!(text.ends_with("\n\n"));
        assert!(text.contains(std::str::from_utf8(payload).unwrap()));
    }
}
