//! Reassembly of NMEA 2000 frames from a line-oriented capture stream.
//!
//! Gateways such as the YDEN-02 emit one record per line:
//!
//! ```text
//! 04:54:52.150 R 15FD080E 36 00 02 9F 73 FF FF FF
//! ```
//!
//! The transport delivers those lines in arbitrarily sized chunks. The
//! [`Deframer`] keeps whatever follows the last newline between chunks and
//! yields a [`Frame`] for every complete, well-formed record. The
//! [`FrameAssembler`] wraps it and hands each frame to a callback together with
//! the timestamp of the chunk that completed it.
//!
//! ```
//! use nmea2000::{Frame, FrameAssembler};
//!
//! let mut frames = Vec::new();
//! let mut assembler = FrameAssembler::new(|frame: Frame, ts: &u64| frames.push((frame, *ts)));
//!
//! assembler.ingest("04:54:52.150 R 15FD080E 36 00 02", 1);
//! assembler.ingest(" 9F 73 FF FF FF\r\n", 2);
//! drop(assembler);
//!
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].0.identifier, "15FD080E");
//! assert_eq!(frames[0].0.payload, "3600029F73FFFFFF");
//! assert_eq!(frames[0].1, 2);
//! ```

pub mod assembler;
pub mod deframer;
pub mod frame;

pub use assembler::FrameAssembler;
pub use deframer::{Deframer, Frames};
pub use frame::Frame;
