//! Incremental Server-Sent Events decoder.
//!
//! Bytes arrive in arbitrary chunks; [`SseDecoder::feed`] buffers partial lines
//! and returns every frame completed by the chunk.

use livedeck_core::event::RawEvent;

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one body chunk and returns the frames it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<RawEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut consumed = 0;
        while let Some(pos) = self.buffer[consumed..].iter().position(|b| *b == b'\n') {
            let end = consumed + pos;
            let mut line = &self.buffer[consumed..end];
            if let [rest @ .., b'\r'] = line {
                line = rest;
            }
            let line = String::from_utf8_lossy(line).into_owned();
            consumed = end + 1;

            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }
        self.buffer.drain(..consumed);
        frames
    }

    /// Bytes held for an unterminated line.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    fn process_line(&mut self, line: &str) -> Option<RawEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id and retry carry nothing the dashboard uses
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<RawEvent> {
        let event = self.event.take().filter(|label| !label.is_empty());
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(RawEvent { event, data })
    }
}
