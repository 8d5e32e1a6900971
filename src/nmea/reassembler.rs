use log::debug;

/// NMEA sentences are capped at 82 characters by convention; leave room for
/// proprietary sentences that run longer.
pub const DEFAULT_MAX_SENTENCE_LENGTH: usize = 4 * 82;

const START_MARKER: char = '$';
const TERMINATOR: &str = "\r\n";

/// A candidate sentence: starts with `$` and ended with CR/LF on the wire.
/// The terminator is kept out of the stored text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    text: String,
}

impl Sentence {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let text = text.trim_end_matches(['\r', '\n']).to_string();
        Self { text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for Sentence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Rebuilds sentences from a byte stream that may start mid-sentence or
/// carry noise.
///
/// The buffer only ever holds the tail of the stream starting at the most
/// recent `$`. Bytes seen before any `$` are garbage and are never stored.
#[derive(Debug)]
pub struct StreamReassembler {
    buffer: String,
    max_length: usize,
}

impl Default for StreamReassembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SENTENCE_LENGTH)
    }
}

impl StreamReassembler {
    pub fn new(max_length: usize) -> Self {
        Self {
            buffer: String::with_capacity(max_length.min(DEFAULT_MAX_SENTENCE_LENGTH)),
            max_length,
        }
    }

    /// Append bytes and return every sentence they complete.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Sentence> {
        bytes.iter().filter_map(|&byte| self.push(byte)).collect()
    }

    /// Process one byte; returns a sentence when this byte completes one.
    pub fn push(&mut self, byte: u8) -> Option<Sentence> {
        // Each byte is decoded on its own, so anything outside ASCII is a
        // decode failure and taints the sentence in progress.
        if !byte.is_ascii() {
            debug!("Undecodable byte 0x{:02x}, dropping buffer: {:?}", byte, self.buffer);
            self.buffer.clear();
            return None;
        }

        let ch = byte as char;
        if ch == START_MARKER {
            if !self.buffer.is_empty() {
                debug!("New start marker, discarding partial sentence: {:?}", self.buffer);
            }
            self.buffer.clear();
        } else if self.buffer.is_empty() {
            // Garbage before the first start marker
            return None;
        }

        self.buffer.push(ch);

        if self.buffer.ends_with(TERMINATOR) {
            let sentence = Sentence::new(std::mem::take(&mut self.buffer));
            return Some(sentence);
        }

        if self.buffer.len() >= self.max_length {
            debug!("No terminator within {} characters, resetting buffer", self.max_length);
            self.buffer.clear();
        }

        None
    }

    /// Characters currently held (at most one partial sentence).
    pub fn pending(&self) -> &str {
        &self.buffer
    }
}
