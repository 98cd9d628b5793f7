//! Incremental NDJSON decoder for the roundtable event stream.
//!
//! HTTP chunk boundaries are arbitrary: a chunk may hold several events, a
//! fraction of one, or split a multi-byte UTF-8 sequence. The decoder only
//! ever splits on the `\n` byte, which never occurs inside a UTF-8
//! continuation sequence, so partial lines are carried over untouched.

use serde::Deserialize;

use super::events::{RoundtableEvent, KNOWN_EVENT_TYPES};

/// Upper bound for a single buffered line (1 MiB).
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed event line: {source}")]
    Json {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("event line exceeds {MAX_LINE_BYTES} bytes")]
    LineTooLong,
}

/// Envelope used to peek at the tag before committing to a typed decode.
#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buf: Vec<u8>,
    /// Prefix of `buf` already known to hold no newline.
    scanned: usize,
    /// Dropping the rest of an oversized line up to its newline.
    discarding: bool,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every event completed by it.
    ///
    /// Blank lines and events with an unrecognised `type` are skipped. A
    /// line longer than [`MAX_LINE_BYTES`] yields one
    /// [`DecodeError::LineTooLong`] and is skipped through its newline.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<RoundtableEvent, DecodeError>> {
        let mut out = Vec::new();
        let mut chunk = chunk;

        if self.discarding {
            match chunk.iter().position(|b| *b == b'\n') {
                Some(pos) => {
                    self.discarding = false;
                    chunk = &chunk[pos + 1..];
                }
                None => return out,
            }
        }

        self.buf.extend_from_slice(chunk);

        let mut start = 0;
        while let Some(offset) = self.buf[start.max(self.scanned)..]
            .iter()
            .position(|b| *b == b'\n')
        {
            let end = start.max(self.scanned) + offset;
            if end - start > MAX_LINE_BYTES {
                out.push(Err(DecodeError::LineTooLong));
            } else if let Some(result) = decode_line(&self.buf[start..end]) {
                out.push(result);
            }
            start = end + 1;
            self.scanned = start;
        }
        self.buf.drain(..start);
        self.scanned = self.buf.len();

        if self.buf.len() > MAX_LINE_BYTES {
            self.buf.clear();
            self.scanned = 0;
            self.discarding = true;
            out.push(Err(DecodeError::LineTooLong));
        }
        out
    }

    /// Flush a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<Result<RoundtableEvent, DecodeError>> {
        let rest = std::mem::take(&mut self.buf);
        self.scanned = 0;
        if std::mem::take(&mut self.discarding) {
            return None;
        }
        decode_line(&rest)
    }

    /// Bytes currently buffered waiting for a newline.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

fn decode_line(line: &[u8]) -> Option<Result<RoundtableEvent, DecodeError>> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let raw: RawEnvelope = match serde_json::from_str(text) {
        Ok(raw) => raw,
        Err(source) => {
            return Some(Err(DecodeError::Json {
                line: text.to_string(),
                source,
            }))
        }
    };

    if !KNOWN_EVENT_TYPES.contains(&raw.event_type.as_str()) {
        tracing::debug!(event_type = %raw.event_type, "Skipping unknown roundtable event");
        return None;
    }

    let data = if raw.data.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        raw.data
    };
    let tagged = serde_json::json!({ "type": raw.event_type, "data": data });
    Some(
        serde_json::from_value(tagged).map_err(|source| DecodeError::Json {
            line: text.to_string(),
            source,
        }),
    )
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::roundtable::events::Stage;

    fn sample_stream() -> String {
        [
            RoundtableEvent::status("Round one", 5, Stage::Analysis),
            RoundtableEvent::TypingStart {
                agent: "director".into(),
            },
            RoundtableEvent::MessageChunk {
                agent: "director".into(),
                chunk: "Café lights, naïve ".into(),
            },
            RoundtableEvent::MessageComplete {
                agent: "director".into(),
                message: "Café lights, naïve warm.".into(),
            },
        ]
        .iter()
        .map(RoundtableEvent::to_line)
        .collect()
    }

    fn decode_all(decoder: &mut NdjsonDecoder, chunks: &[&[u8]]) -> Vec<RoundtableEvent> {
        let mut events = Vec::new();
        for chunk in chunks {
            for result in decoder.push(chunk) {
                events.push(result.unwrap());
            }
        }
        events
    }

    #[test]
    fn decodes_whole_stream_in_one_chunk() {
        let stream = sample_stream();
        let mut decoder = NdjsonDecoder::new();
        let events = decode_all(&mut decoder, &[stream.as_bytes()]);
        assert_eq!(events.len(), 4);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn chunk_boundaries_do_not_change_result() {
        let stream = sample_stream();
        let bytes = stream.as_bytes();

        let mut whole = NdjsonDecoder::new();
        let expected = decode_all(&mut whole, &[bytes]);

        // Every split size, including ones that cut through the multi-byte
        // characters in the sample.
        for size in 1..=17 {
            let chunks: Vec<&[u8]> = bytes.chunks(size).collect();
            let mut decoder = NdjsonDecoder::new();
            let events = decode_all(&mut decoder, &chunks);
            assert_eq!(events, expected, "chunk size {size}");
        }
    }

    #[test]
    fn partial_line_waits_for_newline() {
        let mut decoder = NdjsonDecoder::new();
        let out = decoder.push(br#"{"type":"shots_start","data":{}"#);
        assert!(out.is_empty());
        assert!(decoder.pending() > 0);

        let out = decoder.push(b"}\n");
        assert_eq!(out.len(), 1);
        assert_matches!(out[0], Ok(RoundtableEvent::ShotsStart {}));
    }

    #[test]
    fn malformed_line_does_not_poison_following_lines() {
        let mut decoder = NdjsonDecoder::new();
        let input = b"{not json}\n{\"type\":\"synthesis_chunk\",\"data\":{\"chunk\":\"x\"}}\n";
        let out = decoder.push(input);
        assert_eq!(out.len(), 2);
        assert_matches!(out[0], Err(DecodeError::Json { .. }));
        assert_matches!(&out[1], Ok(RoundtableEvent::SynthesisChunk { chunk }) if chunk == "x");
    }

    #[test]
    fn known_type_with_wrong_data_is_an_error() {
        let mut decoder = NdjsonDecoder::new();
        let out = decoder.push(b"{\"type\":\"message_chunk\",\"data\":{\"agent\":1}}\n");
        assert_matches!(out.as_slice(), [Err(DecodeError::Json { .. })]);
    }

    #[test]
    fn unknown_types_and_blank_lines_are_skipped() {
        let mut decoder = NdjsonDecoder::new();
        let out = decoder.push(b"\n  \n{\"type\":\"heartbeat\",\"data\":{}}\r\n");
        assert!(out.is_empty());
    }

    #[test]
    fn missing_data_is_treated_as_empty_object() {
        let mut decoder = NdjsonDecoder::new();
        let out = decoder.push(b"{\"type\":\"synthesis_start\"}\n");
        assert_matches!(out.as_slice(), [Ok(RoundtableEvent::SynthesisStart {})]);
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut decoder = NdjsonDecoder::new();
        assert!(decoder
            .push(b"{\"type\":\"error\",\"data\":{\"message\":\"boom\"}}")
            .is_empty());
        assert_matches!(
            decoder.finish(),
            Some(Ok(RoundtableEvent::Error { message })) if message == "boom"
        );
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn oversized_line_is_dropped() {
        let mut decoder = NdjsonDecoder::new();
        let big = vec![b'a'; MAX_LINE_BYTES + 1];
        let out = decoder.push(&big);
        assert_matches!(out.as_slice(), [Err(DecodeError::LineTooLong)]);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn oversized_line_tail_is_skipped_through_newline() {
        let mut decoder = NdjsonDecoder::new();
        let mut head = br#"{"type":"synthesis_chunk","data":{"chunk":""#.to_vec();
        head.extend(vec![b'x'; MAX_LINE_BYTES]);
        let out = decoder.push(&head);
        assert_matches!(out.as_slice(), [Err(DecodeError::LineTooLong)]);

        // More of the same line, then its end and a normal event.
        assert!(decoder.push(&vec![b'x'; 4096]).is_empty());
        let out = decoder.push(b"xx\"}}\n{\"type\":\"shots_start\",\"data\":{}}\n");
        assert_matches!(out.as_slice(), [Ok(RoundtableEvent::ShotsStart {})]);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn oversized_line_in_one_chunk_is_rejected() {
        let mut decoder = NdjsonDecoder::new();
        let mut chunk = vec![b' '; MAX_LINE_BYTES + 1];
        chunk.extend_from_slice(b"{\"type\":\"shots_start\",\"data\":{}}\n");
        chunk.extend_from_slice(b"{\"type\":\"synthesis_start\",\"data\":{}}\n");
        let out = decoder.push(&chunk);
        assert_matches!(
            out.as_slice(),
            [Err(DecodeError::LineTooLong), Ok(RoundtableEvent::SynthesisStart {})]
        );
    }

    #[test]
    fn oversized_unterminated_line_is_not_flushed() {
        let mut decoder = NdjsonDecoder::new();
        decoder.push(&vec![b'{'; MAX_LINE_BYTES + 1]);
        decoder.push(b"tail");
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn long_partial_line_in_small_chunks() {
        let line = RoundtableEvent::SynthesisChunk {
            chunk: "y".repeat(64 * 1024),
        }
        .to_line();
        let mut decoder = NdjsonDecoder::new();
        let mut events = Vec::new();
        for chunk in line.as_bytes().chunks(16) {
            events.extend(decoder.push(chunk));
        }
        assert_eq!(events.len(), 1);
        assert_matches!(&events[0], Ok(RoundtableEvent::SynthesisChunk { chunk }) if chunk.len() == 64 * 1024);
    }
}
