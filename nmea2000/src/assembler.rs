use crate::{deframer::Deframer, frame::Frame};
use std::marker::PhantomData;

/// Reassembles frames from a chunked stream and delivers them to a delegate.
///
/// Every frame completed by an [`ingest`](FrameAssembler::ingest) call is
/// passed to the delegate before the call returns, in arrival order, together
/// with the timestamp of that call. Frames decoded from a backlog of several
/// lines therefore share one timestamp.
///
/// Malformed lines never reach the delegate and never disturb the lines that
/// follow them.
pub struct FrameAssembler<T, F>
where
    F: FnMut(Frame, &T),
{
    deframer: Deframer,
    delegate: F,
    _timestamp: PhantomData<fn(&T)>,
}

impl<T, F> FrameAssembler<T, F>
where
    F: FnMut(Frame, &T),
{
    pub fn new(delegate: F) -> Self {
        Self::from_deframer(Deframer::new(), delegate)
    }

    /// See [`Deframer::with_max_pending`].
    pub fn with_max_pending(max_pending: usize, delegate: F) -> Self {
        Self::from_deframer(Deframer::with_max_pending(max_pending), delegate)
    }

    fn from_deframer(deframer: Deframer, delegate: F) -> Self {
        Self {
            deframer,
            delegate,
            _timestamp: PhantomData,
        }
    }

    /// Feeds the next chunk of the stream, captured at `timestamp`.
    pub fn ingest(&mut self, chunk: impl AsRef<[u8]>, timestamp: T) {
        for frame in self.deframer.push(chunk) {
            (self.delegate)(frame, &timestamp);
        }
    }

    /// Bytes received after the last newline.
    pub fn pending(&self) -> &[u8] {
        self.deframer.pending()
    }

    pub fn reset(&mut self) {
        self.deframer.reset();
    }
}

impl<T, F> std::fmt::Debug for FrameAssembler<T, F>
where
    F: FnMut(Frame, &T),
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameAssembler")
            .field("deframer", &self.deframer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    const DATA1: &str = "04:54:52.150 R 15FD080E 36 00 02 9F 73 FF FF FF\r\n";
    const DATA2: &str = "04:54:52.151 R 15FD070E 36 C2 9F 73 FF 7F FB 03\r\n";
    const DATA3: &str = "04:54:52.179 R 09F1120B B1 07 F2 00 00 FF 7F FD\r\n";

    #[test]
    fn delivers_frames_with_chunk_timestamp() {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = received.clone();
        let mut assembler =
            FrameAssembler::new(move |frame: Frame, ts: &u32| sink.borrow_mut().push((frame, *ts)));

        assembler.ingest(DATA1, 10);
        assembler.ingest(format!("{DATA2}{DATA3}"), 20);

        let received = received.borrow();
        assert_eq!(received.len(), 3);
        assert_eq!(received[0], (Frame::new("15FD080E", "3600029F73FFFFFF"), 10));
        assert_eq!(received[1], (Frame::new("15FD070E", "36C29F73FF7FFB03"), 20));
        assert_eq!(received[2], (Frame::new("09F1120B", "B107F20000FF7FFD"), 20));
    }

    #[test]
    fn split_record_gets_timestamp_of_completing_chunk() {
        let mut received = Vec::new();
        let mut assembler = FrameAssembler::new(|_: Frame, ts: &&'static str| received.push(*ts));

        let (head, tail) = DATA1.split_at(30);
        assembler.ingest(head, "first");
        assembler.ingest(tail, "second");
        drop(assembler);

        assert_eq!(received, vec!["second"]);
    }

    #[test]
    fn empty_chunk_without_remainder_is_noop() {
        let mut calls = 0;
        let mut assembler = FrameAssembler::new(|_: Frame, _: &()| calls += 1);

        assembler.ingest("", ());
        assert!(assembler.pending().is_empty());
        drop(assembler);

        assert_eq!(calls, 0);
    }

    #[test]
    fn empty_chunk_keeps_remainder() {
        let mut calls = 0;
        let mut assembler = FrameAssembler::new(|_: Frame, _: &()| calls += 1);

        assembler.ingest("04:54:52.150 R", ());
        assembler.ingest("", ());
        assert_eq!(assembler.pending(), b"04:54:52.150 R");
        drop(assembler);

        assert_eq!(calls, 0);
    }

    #[test]
    fn reset_drops_partial_record() {
        let mut calls = 0;
        let mut assembler = FrameAssembler::new(|_: Frame, _: &()| calls += 1);

        assembler.ingest(&DATA1[..20], ());
        assembler.reset();
        assembler.ingest(&DATA1[20..], ());
        drop(assembler);

        assert_eq!(calls, 0);
    }

    #[test]
    fn with_max_pending_bounds_remainder() {
        let mut calls = 0;
        let mut assembler = FrameAssembler::with_max_pending(8, |_: Frame, _: &()| calls += 1);

        assembler.ingest(&DATA1[..20], ());
        assert!(assembler.pending().is_empty());
        assembler.ingest(DATA1, ());
        drop(assembler);

        assert_eq!(calls, 1);
    }
}
