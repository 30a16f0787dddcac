use super::buffering::Utf8ChunkDecoder;

/// Event name used when a frame has no `event:` line
pub const DEFAULT_EVENT_NAME: &str = "message";

const LF_DELIMITER: &[u8] = b"\n\n";
const CRLF_DELIMITER: &[u8] = b"\r\n\r\n";

/// One blank-line delimited frame of the event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub event_name: String,
    pub data_lines: Vec<String>,
}

impl DecodedFrame {
    /// Data lines joined with `\n`
    pub fn data(&self) -> String {
        self.data_lines.join("\n")
    }
}

/// Incremental event-stream frame decoder.
///
/// Bytes go in through [`push`](Self::push) in whatever sizes the network
/// delivers them; complete frames come out of [`next_frame`](Self::next_frame)
/// in arrival order. Both `\n\n` and `\r\n\r\n` end a frame, and when both
/// occur in the buffer the one that starts first wins.
///
/// The buffer is a single owned `String` plus a read cursor. Consumed text
/// before the cursor is compacted away on the next push, so after the caller
/// drains `next_frame` the buffer holds at most one partial frame.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    text: Utf8ChunkDecoder,
    buffer: String,
    cursor: usize,
    /// Bytes past `cursor` already searched without finding a delimiter
    scanned: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw network chunk
    pub fn push(&mut self, chunk: &[u8]) {
        let decoded = self.text.decode(chunk);
        self.push_str(&decoded);
    }

    /// Append already-decoded text
    pub fn push_str(&mut self, chunk: &str) {
        if self.cursor > 0 {
            self.buffer.drain(..self.cursor);
            self.cursor = 0;
        }
        self.buffer.push_str(chunk);
    }

    /// Pop the next complete frame that carries data.
    ///
    /// Frames without any data are consumed and skipped. Returns `None` once
    /// no delimiter remains in the buffer.
    pub fn next_frame(&mut self) -> Option<DecodedFrame> {
        loop {
            let pending = &self.buffer[self.cursor..];
            // A delimiter straddling the old end starts at most 3 bytes back
            let from = self.scanned.saturating_sub(CRLF_DELIMITER.len() - 1);
            let Some((start, delimiter_len)) = find_boundary(pending.as_bytes(), from) else {
                self.scanned = pending.len();
                return None;
            };
            let frame = parse_frame(&pending[..start]);
            self.cursor += start + delimiter_len;
            self.scanned = 0;

            if frame.is_some() {
                return frame;
            }
        }
    }

    /// Push `chunk` and drain every frame it completes
    pub fn feed(&mut self, chunk: &str) -> Vec<DecodedFrame> {
        self.push_str(chunk);
        std::iter::from_fn(|| self.next_frame()).collect()
    }

    /// Bytes of text (plus held-back partial characters) not yet part of a frame
    pub fn buffered_len(&self) -> usize {
        self.buffer.len() - self.cursor + self.text.pending_len()
    }

    /// Text still waiting for a delimiter
    pub fn remainder(&self) -> &str {
        &self.buffer[self.cursor..]
    }
}

/// Earliest frame boundary at or after `from`, as `(offset, delimiter length)`.
///
/// Both delimiters are ASCII, so a byte offset that matches always lies on a
/// char boundary of the surrounding text.
fn find_boundary(buffer: &[u8], from: usize) -> Option<(usize, usize)> {
    (from..buffer.len()).find_map(|i| {
        let rest = &buffer[i..];
        if rest.starts_with(LF_DELIMITER) {
            Some((i, LF_DELIMITER.len()))
        } else if rest.starts_with(CRLF_DELIMITER) {
            Some((i, CRLF_DELIMITER.len()))
        } else {
            None
        }
    })
}

fn parse_frame(raw: &str) -> Option<DecodedFrame> {
    let mut event_name: Option<String> = None;
    let mut data_lines = Vec::new();

    for line in raw.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some(value) = line.strip_prefix("event:") {
            event_name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            data_lines.push(value.to_string());
        }
        // comments (":"), id:, retry: and unknown fields are ignored
    }

    if data_lines.iter().all(|line| line.is_empty()) {
        return None;
    }

    Some(DecodedFrame {
        event_name: event_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_EVENT_NAME.to_string()),
        data_lines,
    })
}
