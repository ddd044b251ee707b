pub mod chip;
pub mod crc;
pub mod cursor;
pub mod error;
pub mod far;
pub mod frames;
mod parse;
pub mod regs;

pub use chip::{ChipDescriptor, ChipKind, GEOMETRIES, RegionType, geometry};
pub use error::{DecodeError, ErrorKind, ParserState};
pub use far::FrameAddr;
pub use frames::{FrameStore, frame_name};
pub use parse::{DecodeOptions, NOOP_WORD, ParsedBitstream, SYNC_WORD, parse, parse_with};
pub use regs::{Cmd, Reg, RegisterFile};
