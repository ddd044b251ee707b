use crate::chip::RegionType;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ParserState {
    Idle,
    Unsynced,
    WaitingControl,
    WaitingData,
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ErrorKind {
    #[error("sync word not found before end of input")]
    Desync,
    #[error("unrecognized packet word {0:#010x}")]
    MalformedPacket(u32),
    #[error("FDRI write of {words} words is not a multiple of the frame length {frame_words}")]
    InconsistentFrameLength { words: usize, frame_words: usize },
    #[error("register write of {needed} words with only {available} words remaining")]
    TruncatedInput { needed: usize, available: usize },
    #[error("IDCODE {0:#010x} matches no known chip")]
    UnrecognizedChip(u32),
    #[error("frame address {0:#010x} does not map into the configuration geometry")]
    InvalidFrameAddress(u32),
    // warning unless strict mode promotes it
    #[error("CRC register write left residual {0:#06x}")]
    CrcResidual(u16),
    // warning unless strict mode promotes it
    #[error("FLR value {flr} is inconsistent with expected value {expected}")]
    GeometryMismatch { flr: u32, expected: u32 },
    // warning unless strict mode promotes it
    #[error("frame {region} {column:02x} {frame:02x} captured twice")]
    DuplicateFrameCapture {
        region: RegionType,
        column: u32,
        frame: u32,
    },
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{kind} (at byte offset {offset}, state {state:?})")]
pub struct DecodeError {
    pub state: ParserState,
    pub offset: usize,
    pub kind: ErrorKind,
}
