use crate::frame::Frame;

const DELIMITER: u8 = b'\n';
const TRAILING_WHITESPACE: [u8; 4] = [b' ', b'\t', b'\r', b'\n'];

/// Splits a chunked byte stream into record lines and decodes them.
///
/// Between calls the deframer only keeps the bytes that followed the last
/// newline it has seen. That remainder never contains a newline: every push
/// prepends it to the new chunk, hands all complete lines to the returned
/// [`Frames`] and keeps the new tail.
///
/// A deframer serves exactly one stream. Independent connections need one
/// deframer each.
#[derive(Debug, Default)]
pub struct Deframer {
    pending: Vec<u8>,
    max_pending: Option<usize>,
}

impl Deframer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards the retained remainder whenever it grows past `max_pending`
    /// bytes, so a stream that never sends a newline cannot grow the buffer
    /// without bound. A record longer than the limit is lost.
    pub fn with_max_pending(max_pending: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_pending: Some(max_pending),
        }
    }

    /// Appends `chunk` to the stream and returns the frames it completes.
    ///
    /// The remainder is updated before this returns, the decoding happens
    /// lazily as the iterator is consumed. Dropping [`Frames`] early discards
    /// the lines it has not reached yet.
    pub fn push(&mut self, chunk: impl AsRef<[u8]>) -> Frames {
        let mut total = std::mem::take(&mut self.pending);
        // the remainder holds no delimiter, only the new bytes need a scan
        let searched_from = total.len();
        total.extend_from_slice(chunk.as_ref());

        let last_delimiter = total[searched_from..]
            .iter()
            .rposition(|&b| b == DELIMITER)
            .map(|idx| searched_from + idx);

        let lines = match last_delimiter {
            Some(idx) => {
                self.pending = total.split_off(idx + 1);
                total
            }
            // no complete line yet, keep everything
            None => {
                self.pending = total;
                Vec::new()
            }
        };

        if let Some(max) = self.max_pending {
            if self.pending.len() > max {
                log::debug!(
                    "discarding {} pending bytes without a line delimiter",
                    self.pending.len()
                );
                self.pending.clear();
            }
        }

        Frames::new(lines)
    }

    /// Turns an iterator of chunks into an iterator of frames, e.g. to replay
    /// a capture file read in fixed size blocks.
    pub fn frames<I>(mut self, chunks: I) -> impl Iterator<Item = Frame>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        chunks.into_iter().flat_map(move |chunk| self.push(chunk))
    }

    /// Bytes received after the last newline.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    pub fn reset(&mut self) {
        self.pending.clear();
    }
}

/// The frames completed by a single [`Deframer::push`], in arrival order.
#[must_use = "frames are lost unless the iterator is consumed"]
#[derive(Debug)]
pub struct Frames {
    // complete lines, the last one terminated by a delimiter
    lines: Vec<u8>,
    cursor: usize,
}

impl Frames {
    fn new(lines: Vec<u8>) -> Self {
        Self { lines, cursor: 0 }
    }
}

impl Iterator for Frames {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor < self.lines.len() {
            let rest = &self.lines[self.cursor..];
            let end = rest
                .iter()
                .position(|&b| b == DELIMITER)
                .unwrap_or(rest.len());
            let line = trim_end(&rest[..end]);
            self.cursor += end + 1;

            if let Some(frame) = decode_line(line) {
                return Some(frame);
            }
        }
        None
    }
}

fn decode_line(line: &[u8]) -> Option<Frame> {
    let Ok(text) = std::str::from_utf8(line) else {
        log::trace!("dropping non UTF-8 record of {} bytes", line.len());
        return None;
    };

    let frame = Frame::decode(text);
    if frame.is_none() {
        log::trace!("dropping malformed record {:?}", text);
    }
    frame
}

fn trim_end(line: &[u8]) -> &[u8] {
    match line.iter().rposition(|b| !TRAILING_WHITESPACE.contains(b)) {
        Some(last) => &line[..=last],
        None => &[],
    }
}
