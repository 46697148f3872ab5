use thiserror::Error;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("message header has no Content-Length field")]
    MissingContentLength,
    #[error("invalid Content-Length value `{0}`")]
    InvalidContentLength(String),
}

/// Wrap a payload in a Content-Length header block.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = format!("Content-Length: {}\r\n\r\n", payload.len()).into_bytes();
    frame.extend_from_slice(payload);
    frame
}

/// Incremental decoder for Content-Length framed messages.
///
/// Bytes arrive in arbitrary chunks; `next_frame` yields one complete body at
/// a time and supports multiple pipelined messages in the buffer. A complete
/// header block without a usable Content-Length is consumed and reported as
/// an error, so a malformed peer cannot wedge the stream.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        let Some(header_end) = find_subsequence(&self.buffer, HEADER_TERMINATOR) else {
            return Ok(None);
        };
        let body_start = header_end + HEADER_TERMINATOR.len();
        let header = String::from_utf8_lossy(&self.buffer[..header_end]).to_string();

        let length = match parse_content_length(&header) {
            Ok(length) => length,
            Err(err) => {
                // Drop the malformed header block so decoding can resume at
                // whatever follows it.
                self.buffer.drain(..body_start);
                return Err(err);
            }
        };

        if self.buffer.len() < body_start + length {
            return Ok(None);
        }

        let body = self.buffer[body_start..body_start + length].to_vec();
        self.buffer.drain(..body_start + length);
        Ok(Some(body))
    }
}

fn parse_content_length(header: &str) -> Result<usize, FrameError> {
    for line in header.lines() {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if !name.trim().eq_ignore_ascii_case("content-length") {
            continue;
        }
        let value = value.trim();
        return value
            .parse::<usize>()
            .map_err(|_| FrameError::InvalidContentLength(value.to_string()));
    }
    Err(FrameError::MissingContentLength)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_single_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&encode_frame(b"{\"a\":1}"));
        let body = decoder.next_frame().expect("frame").expect("complete");
        assert_eq!(body, b"{\"a\":1}");
        assert_eq!(decoder.next_frame().expect("frame"), None);
    }

    #[test]
    fn decodes_pipelined_frames_from_one_chunk() {
        let mut decoder = FrameDecoder::new();
        let mut stream = encode_frame(b"one");
        stream.extend_from_slice(&encode_frame(b"two"));
        decoder.extend(&stream);
        assert_eq!(decoder.next_frame().unwrap().unwrap(), b"one");
        assert_eq!(decoder.next_frame().unwrap().unwrap(), b"two");
        assert_eq!(decoder.next_frame().unwrap(), None);
    }

    #[test]
    fn waits_for_partial_body() {
        let mut decoder = FrameDecoder::new();
        let frame = encode_frame(b"payload");
        decoder.extend(&frame[..frame.len() - 3]);
        assert_eq!(decoder.next_frame().unwrap(), None);
        decoder.extend(&frame[frame.len() - 3..]);
        assert_eq!(decoder.next_frame().unwrap().unwrap(), b"payload");
    }

    #[test]
    fn waits_for_partial_header() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(b"Content-Length: 4\r\n");
        assert_eq!(decoder.next_frame().unwrap(), None);
        decoder.extend(b"\r\nbody");
        assert_eq!(decoder.next_frame().unwrap().unwrap(), b"body");
    }

    #[test]
    fn header_name_is_case_insensitive() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(b"content-length: 2\r\n\r\nok");
        assert_eq!(decoder.next_frame().unwrap().unwrap(), b"ok");
    }

    #[test]
    fn missing_length_header_is_consumed_and_reported() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(b"X-Other: nope\r\n\r\n");
        decoder.extend(&encode_frame(b"after"));
        assert_eq!(
            decoder.next_frame().unwrap_err(),
            FrameError::MissingContentLength
        );
        // The stream recovers on the next well-formed frame.
        assert_eq!(decoder.next_frame().unwrap().unwrap(), b"after");
    }

    #[test]
    fn non_numeric_length_is_reported() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(b"Content-Length: twelve\r\n\r\n");
        assert_eq!(
            decoder.next_frame().unwrap_err(),
            FrameError::InvalidContentLength("twelve".to_string())
        );
    }

    #[test]
    fn extra_header_fields_are_ignored() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(b"Content-Type: application/json\r\nContent-Length: 2\r\n\r\nhi");
        assert_eq!(decoder.next_frame().unwrap().unwrap(), b"hi");
    }
}
