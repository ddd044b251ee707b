use crate::chip::{self, ChipDescriptor};
use crate::crc;
use crate::cursor::WordCursor;
use crate::error::{DecodeError, ErrorKind, ParserState};
use crate::far::{self, FrameAddr};
use crate::frames::{FrameStore, frame_name};
use crate::regs::{Cmd, Reg, RegisterFile};
use log::{debug, trace, warn};

pub const SYNC_WORD: u32 = 0xaa995566;
pub const NOOP_WORD: u32 = 0x20000000;

#[derive(Clone, Copy, Debug, Default)]
pub struct DecodeOptions {
    // promotes CRC residuals, FLR mismatches and duplicate captures to
    // fatal errors instead of logged warnings
    pub strict: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum PacketHeader {
    Type1 { reg: u32, write: bool, words: usize },
    Type2 { words: usize },
}

fn decode_header(word: u32) -> Option<PacketHeader> {
    match word >> 29 {
        1 => Some(PacketHeader::Type1 {
            reg: word >> 13 & 0x3fff,
            write: word >> 27 & 3 == 2,
            words: (word & 0x7ff) as usize,
        }),
        2 => Some(PacketHeader::Type2 {
            words: (word & 0x07ffffff) as usize,
        }),
        _ => None,
    }
}

// Ordered side effects a register write triggers after the generic store.
#[derive(Clone, Copy, Debug)]
enum SideEffect {
    RunCommand,
    ResolveChip,
}

fn post_write_effects(reg: Reg) -> &'static [SideEffect] {
    match reg {
        Reg::Cmd => &[SideEffect::RunCommand],
        // hardware quirk: a FAR write re-triggers the latched command
        Reg::Far => &[SideEffect::RunCommand],
        Reg::Idcode => &[SideEffect::ResolveChip],
        _ => &[],
    }
}

#[derive(Clone, Debug)]
pub struct ParsedBitstream {
    pub chip: Option<&'static ChipDescriptor>,
    pub regs: RegisterFile,
    pub frames: Option<FrameStore>,
}

struct DecodeSession<'a> {
    cursor: WordCursor<'a>,
    state: ParserState,
    opts: DecodeOptions,
    regs: RegisterFile,
    // register selected by the last Type-1 header; Type-2 extends it
    active_reg: Option<Reg>,
    chip: Option<&'static ChipDescriptor>,
    frames: Option<FrameStore>,
    // FDRI capture runs one frame behind the cursor
    last_frame: Option<Box<[u8]>>,
    last_far: u32,
}

pub fn parse(data: &[u8]) -> Result<ParsedBitstream, DecodeError> {
    parse_with(data, DecodeOptions::default())
}

pub fn parse_with(data: &[u8], opts: DecodeOptions) -> Result<ParsedBitstream, DecodeError> {
    let mut session = DecodeSession {
        cursor: WordCursor::new(data),
        state: ParserState::Idle,
        opts,
        regs: RegisterFile::new(),
        active_reg: None,
        chip: None,
        frames: None,
        last_frame: None,
        last_far: 0,
    };
    session.run()?;
    Ok(ParsedBitstream {
        chip: session.chip,
        regs: session.regs,
        frames: session.frames,
    })
}

impl DecodeSession<'_> {
    fn fail(&self, kind: ErrorKind) -> DecodeError {
        DecodeError {
            state: self.state,
            offset: self.cursor.offset(),
            kind,
        }
    }

    fn warn_or_fail(&self, kind: ErrorKind) -> Result<(), DecodeError> {
        if self.opts.strict {
            Err(self.fail(kind))
        } else {
            warn!("{kind}");
            Ok(())
        }
    }

    fn read_word(&mut self) -> Result<u32, DecodeError> {
        let available = self.cursor.remaining_words();
        self.cursor
            .read_u32()
            .map_err(|_| self.fail(ErrorKind::TruncatedInput { needed: 1, available }))
    }

    fn run(&mut self) -> Result<(), DecodeError> {
        self.state = ParserState::Unsynced;
        self.synchronize()?;
        while self.read_packet()? {}
        self.flush_pending();
        Ok(())
    }

    // Scans forward word by word until the sync word is found.
    fn synchronize(&mut self) -> Result<(), DecodeError> {
        loop {
            match self.cursor.read_u32() {
                Ok(SYNC_WORD) => {
                    debug!("synchronized at byte offset {}", self.cursor.offset());
                    self.state = ParserState::WaitingControl;
                    return Ok(());
                }
                Ok(_) => (),
                Err(_) => return Err(self.fail(ErrorKind::Desync)),
            }
        }
    }

    fn read_packet(&mut self) -> Result<bool, DecodeError> {
        if self.cursor.remaining() < 4 {
            if self.cursor.remaining() != 0 {
                debug!("{} trailing bytes ignored", self.cursor.remaining());
            }
            debug!("end of bitstream reached");
            return Ok(false);
        }
        let Ok(word) = self.cursor.read_u32() else {
            return Ok(false);
        };
        if word == NOOP_WORD {
            trace!("noop packet");
            return Ok(true);
        }
        let (reg, words) = match decode_header(word) {
            Some(PacketHeader::Type1 { reg, write, words }) => {
                let Some(reg) = Reg::from_addr(reg) else {
                    return Err(self.fail(ErrorKind::MalformedPacket(word)));
                };
                trace!(
                    "type-1 packet: {} {reg}, {words} words",
                    if write { "write" } else { "read" }
                );
                self.active_reg = Some(reg);
                (reg, words)
            }
            Some(PacketHeader::Type2 { words }) => {
                let Some(reg) = self.active_reg else {
                    return Err(self.fail(ErrorKind::MalformedPacket(word)));
                };
                trace!("type-2 packet: {reg} extended to {words} words");
                (reg, words)
            }
            None => return Err(self.fail(ErrorKind::MalformedPacket(word))),
        };
        if words > 0 {
            self.state = ParserState::WaitingData;
            self.register_write(reg, words)?;
            self.state = ParserState::WaitingControl;
        }
        Ok(true)
    }

    fn register_write(&mut self, reg: Reg, words: usize) -> Result<(), DecodeError> {
        if reg == Reg::Fdri {
            return self.fdri_write(words);
        }
        let available = self.cursor.remaining_words();
        if words > available {
            return Err(self.fail(ErrorKind::TruncatedInput {
                needed: words,
                available,
            }));
        }
        self.generic_write(reg, words)?;
        for &effect in post_write_effects(reg) {
            match effect {
                SideEffect::RunCommand => self.run_command()?,
                SideEffect::ResolveChip => self.resolve_chip()?,
            }
        }
        Ok(())
    }

    fn generic_write(&mut self, reg: Reg, words: usize) -> Result<(), DecodeError> {
        trace!("writing {words} words to register {reg}");
        for _ in 0..words {
            let val = self.read_word()?;
            self.fold_crc(reg, val)?;
            match reg {
                // the CRC register only ever holds the accumulator; the
                // written value contributes through the fold alone
                Reg::Crc => (),
                Reg::Lout => {
                    debug!("LOUT {val:#010x} (as FAR: {})", FrameAddr::from_word(val));
                    self.regs.write(reg, val);
                }
                _ => self.regs.write(reg, val),
            }
        }
        Ok(())
    }

    fn fold_crc(&mut self, reg: Reg, val: u32) -> Result<(), DecodeError> {
        let bcc = crc::update(self.regs.read(Reg::Crc) as u16, reg, val);
        self.regs.write(Reg::Crc, bcc as u32);
        // a CRC-register write must settle the accumulator to zero
        if reg == Reg::Crc && bcc != 0 {
            self.warn_or_fail(ErrorKind::CrcResidual(bcc))?;
        }
        Ok(())
    }

    fn run_command(&mut self) -> Result<(), DecodeError> {
        let val = self.regs.read(Reg::Cmd);
        let Some(cmd) = Cmd::from_value(val) else {
            return Err(self.fail(ErrorKind::MalformedPacket(val)));
        };
        match cmd {
            Cmd::Mfwr => {
                debug!("executing multi-frame write");
                self.record_frame(self.regs.read(Reg::Far))?;
            }
            Cmd::Rcrc => {
                debug!("resetting CRC");
                self.regs.write(Reg::Crc, 0);
            }
            _ => debug!("command {cmd}"),
        }
        Ok(())
    }

    fn resolve_chip(&mut self) -> Result<(), DecodeError> {
        let idcode = self.regs.read(Reg::Idcode);
        let Some(chip) = chip::geometry(idcode) else {
            return Err(self.fail(ErrorKind::UnrecognizedChip(idcode)));
        };
        debug!("IDCODE {idcode:#010x} resolved to {:?}", chip.kind);
        self.chip = Some(chip);
        self.frames = Some(FrameStore::new(chip));
        let flr = self.regs.read(Reg::Flr);
        if flr.wrapping_add(1) != chip.framelen {
            self.warn_or_fail(ErrorKind::GeometryMismatch {
                flr,
                expected: chip.framelen - 1,
            })?;
        }
        Ok(())
    }

    // Handles a whole FDRI burst: splits the payload into frames, captures
    // each frame one behind the cursor, advances the FAR once per frame,
    // then folds the trailing autoCRC word.
    fn fdri_write(&mut self, words: usize) -> Result<(), DecodeError> {
        let frame_words = self.regs.frame_words() as usize;
        // a wrapped FLR yields frame_words of 0; no burst length fits it
        if frame_words == 0 || words % frame_words != 0 {
            return Err(self.fail(ErrorKind::InconsistentFrameLength { words, frame_words }));
        }
        // payload plus the trailing autoCRC word
        let needed = words + 1;
        let available = self.cursor.remaining_words();
        if needed > available {
            return Err(self.fail(ErrorKind::TruncatedInput { needed, available }));
        }
        let nframes = words / frame_words;
        for i in 0..nframes {
            if i != 0 {
                // flush the previous frame at the FAR it was written under
                self.record_frame(self.last_far)?;
            }
            self.last_far = self.regs.read(Reg::Far);
            let Ok(raw) = self.cursor.peek_slice(frame_words * 4) else {
                return Err(self.fail(ErrorKind::TruncatedInput { needed, available }));
            };
            self.last_frame = Some(Box::from(raw));
            for _ in 0..frame_words {
                let val = self.read_word()?;
                self.fold_crc(Reg::Fdri, val)?;
                self.regs.write(Reg::Fdri, val);
            }
            self.advance_far()?;
        }
        debug!("{nframes} frames written to FDRI");
        let autocrc = self.read_word()?;
        trace!("FDRI autoCRC word {autocrc:#010x}");
        self.fold_crc(Reg::Crc, autocrc)?;
        Ok(())
    }

    fn advance_far(&mut self) -> Result<(), DecodeError> {
        let Some(chip) = self.chip else {
            warn!("FAR advance before chip resolution; ignoring");
            return Ok(());
        };
        let mut addr = FrameAddr::from_word(self.regs.read(Reg::Far));
        far::advance_frame(chip, &mut addr).map_err(|kind| self.fail(kind))?;
        trace!("FAR is {addr}");
        self.regs.write(Reg::Far, addr.to_word());
        Ok(())
    }

    // Captures the pending frame data at the given FAR.
    fn record_frame(&mut self, far_word: u32) -> Result<(), DecodeError> {
        let Some(chip) = self.chip else {
            warn!("frame capture before chip resolution; ignoring");
            return Ok(());
        };
        let addr = FrameAddr::from_word(far_word);
        let (region, column) = match (addr.region(chip), addr.column(chip)) {
            (Some(region), Some(column)) => (region, column),
            _ => return Err(self.fail(ErrorKind::InvalidFrameAddress(far_word))),
        };
        let frame = addr.minor;
        if column >= chip.col_count[region] || frame >= chip.frame_count[region] {
            return Err(self.fail(ErrorKind::InvalidFrameAddress(far_word)));
        }
        let Some(data) = self.last_frame.clone() else {
            warn!("frame capture with no pending frame data; ignoring");
            return Ok(());
        };
        debug!("flushing {}", frame_name(region, column, frame));
        let occupied = self
            .frames
            .as_ref()
            .is_some_and(|frames| frames.get(region, column, frame).is_some());
        if occupied {
            self.warn_or_fail(ErrorKind::DuplicateFrameCapture {
                region,
                column,
                frame,
            })?;
        }
        if let Some(frames) = &mut self.frames {
            *frames.slot_mut(region, column, frame) = Some(data);
        }
        Ok(())
    }

    // The final frame of a burst stays pending until the next capture
    // event; at clean end of stream, place it at the FAR it was written
    // under if that slot is still inside the geometry and empty. bitgen
    // pads real bursts with a trailing frame that lands outside.
    fn flush_pending(&mut self) {
        let Some(chip) = self.chip else { return };
        let Some(data) = self.last_frame.clone() else { return };
        let addr = FrameAddr::from_word(self.last_far);
        let (Some(region), Some(column)) = (addr.region(chip), addr.column(chip)) else {
            return;
        };
        let frame = addr.minor;
        if column >= chip.col_count[region] || frame >= chip.frame_count[region] {
            return;
        }
        if let Some(frames) = &mut self.frames {
            let slot = frames.slot_mut(region, column, frame);
            if slot.is_none() {
                debug!("flushing trailing {}", frame_name(region, column, frame));
                *slot = Some(data);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type1_header_fields() {
        // write to FLR, 1 word
        let header = 0x30000000 | Reg::Flr.addr() << 13 | 1;
        assert_eq!(
            decode_header(header),
            Some(PacketHeader::Type1 { reg: 11, write: true, words: 1 })
        );
        // read from FDRO, 4 words
        let header = 0x28000000 | Reg::Fdro.addr() << 13 | 4;
        assert_eq!(
            decode_header(header),
            Some(PacketHeader::Type1 { reg: 3, write: false, words: 4 })
        );
    }

    #[test]
    fn type2_header_fields() {
        assert_eq!(
            decode_header(0x50000000 | 0x123456),
            Some(PacketHeader::Type2 { words: 0x123456 })
        );
    }

    #[test]
    fn junk_is_not_a_header() {
        assert_eq!(decode_header(0xdeadbeef), None);
        assert_eq!(decode_header(0x00000000), None);
        assert_eq!(decode_header(0xffffffff), None);
    }

    #[test]
    fn noop_is_a_type1_shape() {
        // the NOOP word must be caught before generic header decoding
        assert_eq!(
            decode_header(NOOP_WORD),
            Some(PacketHeader::Type1 { reg: 0, write: false, words: 0 })
        );
    }
}
