use serde::{Deserialize, Serialize};
use std::fmt;

const SEPARATOR: char = ' ';
// Timestamp, direction, identifier and eight data bytes.
const TOKEN_COUNT: usize = 11;
const IDENTIFIER_TOKEN: usize = 2;
const FIRST_DATA_TOKEN: usize = 3;
const SURROUNDING_WHITESPACE: [char; 4] = [' ', '\t', '\r', '\n'];

/// A raw NMEA 2000 frame as captured by the gateway.
///
/// ## Fields
/// - `identifier`: The 29-bit CAN identifier, as hex text exactly as received.
/// - `payload`: The eight data bytes concatenated without separators, as hex
///   text exactly as received.
///
/// No hex validation takes place, both fields are opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub identifier: String,
    pub payload: String,
}

impl Frame {
    pub fn new(identifier: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            payload: payload.into(),
        }
    }

    /// Decodes a single, delimiter free record line.
    ///
    /// The line is split on every single space, so two adjacent spaces produce
    /// an empty token that still counts. Only lines with exactly eleven tokens
    /// are records:
    ///
    /// ```text
    /// <timestamp> <direction> <identifier> <b0> <b1> <b2> <b3> <b4> <b5> <b6> <b7>
    /// ```
    ///
    /// Timestamp and direction are ignored. Anything else yields `None`.
    ///
    /// ```
    /// use nmea2000::Frame;
    ///
    /// let frame = Frame::decode("04:54:52.150 R 15FD080E 36 00 02 9F 73 FF FF FF").unwrap();
    /// assert_eq!(frame, Frame::new("15FD080E", "3600029F73FFFFFF"));
    ///
    /// assert!(Frame::decode("04:54:52.150 R 15FD080E 36 00 02 9F 73 FF FF").is_none());
    /// ```
    pub fn decode(line: &str) -> Option<Self> {
        let tokens: Vec<&str> = line.split(SEPARATOR).collect();

        if tokens.len() != TOKEN_COUNT {
            return None;
        }

        let identifier = tokens[IDENTIFIER_TOKEN].to_string();
        let payload = tokens[FIRST_DATA_TOKEN..].concat();

        Some(Self {
            identifier,
            payload,
        })
    }

    /// Decodes one already segmented record, such as a whole datagram that is
    /// known to carry exactly one line.
    ///
    /// Spaces, tabs and line terminators around the record are stripped
    /// before [`Frame::decode`] runs.
    pub fn extract(record: &str) -> Option<Self> {
        Self::decode(record.trim_matches(SURROUNDING_WHITESPACE))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.identifier, self.payload)
    }
}
