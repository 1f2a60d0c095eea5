//! `text/event-stream` frame parsing
//!
//! Incremental parser over raw response bytes. Frames may arrive split
//! across chunks at any byte boundary, so the parser buffers until a
//! terminating blank line completes an event.

/// One server-sent event as delivered to handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Event name from the `event:` field; `"message"` when unnamed
    pub event: String,
    /// Data lines joined with `\n`
    pub data: String,
    /// Last seen `id:` field, if any
    pub id: Option<String>,
}

/// Incremental `text/event-stream` parser
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    last_id: Option<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes; returns every event the chunk completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let mut line = &line[..line.len() - 1];
            if line.ends_with(b"\r") {
                line = &line[..line.len() - 1];
            }
            let line = String::from_utf8_lossy(line).into_owned();
            self.process_line(&line, &mut events);
        }

        events
    }

    fn process_line(&mut self, line: &str, events: &mut Vec<SseEvent>) {
        if line.is_empty() {
            // Blank line dispatches the buffered event. Without data there
            // is nothing to dispatch and the event name resets.
            if self.data.is_empty() {
                self.event = None;
                return;
            }
            events.push(SseEvent {
                event: self
                    .event
                    .take()
                    .unwrap_or_else(|| "message".to_string()),
                data: self.data.join("\n"),
                id: self.last_id.clone(),
            });
            self.data.clear();
            return;
        }

        // Lines starting with a colon are comments; servers send them as
        // keep-alives.
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" => {
                if !value.contains('\0') {
                    self.last_id = Some(value.to_string());
                }
            }
            // retry is a reconnection hint; this channel never reconnects
            // on its own, so it is ignored like unknown fields.
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_event_single_chunk() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"event: mesa.updated\ndata: {\"id\":5}\n\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "mesa.updated");
        assert_eq!(events[0].data, "{\"id\":5}");
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"event: pedido.up").is_empty());
        assert!(parser.feed(b"dated\ndata: 1").is_empty());
        let events = parser.feed(b"23\n\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "pedido.updated");
        assert_eq!(events[0].data, "123");
    }

    #[test]
    fn test_multi_line_data_joined() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"data: first\ndata: second\n\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "message");
        assert_eq!(events[0].data, "first\nsecond");
    }

    #[test]
    fn test_comment_keepalive_dispatches_nothing() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b": keep-alive\n\n").is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"event: reserva.updated\r\ndata: {}\r\n\r\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "reserva.updated");
        assert_eq!(events[0].data, "{}");
    }

    #[test]
    fn test_event_name_resets_between_frames() {
        let mut parser = SseParser::new();
        let first = parser.feed(b"event: mesa.updated\ndata: a\n\n");
        let second = parser.feed(b"data: b\n\n");

        assert_eq!(first[0].event, "mesa.updated");
        assert_eq!(second[0].event, "message");
    }

    #[test]
    fn test_id_field_carries_forward() {
        let mut parser = SseParser::new();
        let first = parser.feed(b"id: 7\ndata: a\n\n");
        let second = parser.feed(b"data: b\n\n");

        assert_eq!(first[0].id.as_deref(), Some("7"));
        assert_eq!(second[0].id.as_deref(), Some("7"));
    }

    #[test]
    fn test_two_events_in_one_chunk() {
        let mut parser = SseParser::new();
        let events =
            parser.feed(b"event: mesa.updated\ndata: 1\n\nevent: mesa.updated\ndata: 2\n\n");

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, "1");
        assert_eq!(events[1].data, "2");
    }
}
