use crate::chip::{ChipDescriptor, RegionType};
use crate::error::ErrorKind;
use std::fmt;

// block address values (ug002, p. 322/340)
pub const BLOCK_CLB: u32 = 0;
pub const BLOCK_BRAM: u32 = 1;
pub const BLOCK_BRAM_INT: u32 = 2;

const BIT_LEN: u32 = 9;
const MINOR_LEN: u32 = 8;
const MAJOR_LEN: u32 = 8;
const BLOCK_LEN: u32 = 2;

const MINOR_OFFSET: u32 = BIT_LEN;
const MAJOR_OFFSET: u32 = MINOR_OFFSET + MINOR_LEN;
const BLOCK_OFFSET: u32 = MAJOR_OFFSET + MAJOR_LEN;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct FrameAddr {
    pub block: u32,
    pub major: u32,
    pub minor: u32,
    // in words within the frame, not bytes
    pub bit: u32,
}

impl FrameAddr {
    pub fn from_word(word: u32) -> Self {
        FrameAddr {
            block: word >> BLOCK_OFFSET & ((1 << BLOCK_LEN) - 1),
            major: word >> MAJOR_OFFSET & ((1 << MAJOR_LEN) - 1),
            minor: word >> MINOR_OFFSET & ((1 << MINOR_LEN) - 1),
            bit: word & ((1 << BIT_LEN) - 1),
        }
    }

    pub fn to_word(self) -> u32 {
        self.bit | self.minor << MINOR_OFFSET | self.major << MAJOR_OFFSET | self.block << BLOCK_OFFSET
    }

    pub fn region(self, chip: &ChipDescriptor) -> Option<RegionType> {
        match self.block {
            BLOCK_CLB => {
                let nclb = chip.col_count[RegionType::Clb];
                Some(match self.major {
                    0 => RegionType::Gclk,
                    m if m == 1 || m == nclb + 4 => RegionType::Iob,
                    m if m == 2 || m == nclb + 3 => RegionType::Ioi,
                    _ => RegionType::Clb,
                })
            }
            BLOCK_BRAM => Some(RegionType::Bram),
            BLOCK_BRAM_INT => Some(RegionType::BramInt),
            _ => None,
        }
    }

    pub fn column(self, chip: &ChipDescriptor) -> Option<u32> {
        let nclb = chip.col_count[RegionType::Clb];
        Some(match self.region(chip)? {
            RegionType::Iob => {
                if self.major == 1 {
                    0
                } else {
                    1
                }
            }
            RegionType::Ioi => {
                if self.major == 2 {
                    0
                } else {
                    1
                }
            }
            RegionType::Clb => {
                debug_assert!(self.major >= 3 && self.major < nclb + 3);
                self.major - 3
            }
            RegionType::Bram | RegionType::BramInt => self.major,
            RegionType::Gclk => 0,
        })
    }
}

impl fmt::Display for FrameAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}_{}_{}_{}", self.block, self.major, self.minor, self.bit)
    }
}

fn advance_major(chip: &ChipDescriptor, addr: &mut FrameAddr, region: RegionType) {
    addr.major += 1;
    // block rollover happens past the last IOB column of the CLB space and
    // past the last BRAM column; BRAM_INT has nothing after it
    if (region == RegionType::Iob && addr.major == chip.col_count[RegionType::Clb] + 5)
        || (region == RegionType::Bram && addr.major == chip.col_count[RegionType::Bram])
    {
        addr.major = 0;
        addr.block += 1;
    }
}

// One frame forward, carrying minor -> major -> block. The region used for
// the carry decision is resolved on the pre-carry major/block, matching the
// chip's addressing convention.
pub fn advance_frame(chip: &ChipDescriptor, addr: &mut FrameAddr) -> Result<(), ErrorKind> {
    addr.minor += 1;
    let Some(region) = addr.region(chip) else {
        return Err(ErrorKind::InvalidFrameAddress(addr.to_word()));
    };
    if addr.minor == chip.frame_count[region] {
        addr.minor = 0;
        advance_major(chip, addr, region);
    }
    Ok(())
}

// One word forward within the frame, carrying into the frame odometer when
// the word offset wraps at the live frame length. Readback address queries
// step at this granularity; the configuration stream itself only ever
// advances whole frames.
pub fn advance_bit(chip: &ChipDescriptor, frame_words: u32, addr: &mut FrameAddr) -> Result<(), ErrorKind> {
    addr.bit += 1;
    if addr.bit == frame_words {
        addr.bit = 0;
        advance_frame(chip, addr)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::geometry;
    use std::collections::HashSet;

    #[test]
    fn word_round_trip() {
        for block in 0..4 {
            for major in 0..256 {
                for minor in 0..256 {
                    for bit in [0, 1, 42, 255, 511] {
                        let addr = FrameAddr { block, major, minor, bit };
                        assert_eq!(FrameAddr::from_word(addr.to_word()), addr);
                    }
                }
            }
        }
        for bit in 0..512 {
            let addr = FrameAddr { block: 3, major: 255, minor: 255, bit };
            assert_eq!(FrameAddr::from_word(addr.to_word()), addr);
        }
        // reserved high bits are dropped on decode
        assert_eq!(FrameAddr::from_word(0xf8000000), FrameAddr::default());
    }

    #[test]
    fn region_boundaries_xc2v40() {
        let chip = geometry(0x01008093).unwrap();
        let at = |block, major| FrameAddr { block, major, minor: 0, bit: 0 };
        assert_eq!(at(0, 0).region(chip), Some(RegionType::Gclk));
        assert_eq!(at(0, 1).region(chip), Some(RegionType::Iob));
        assert_eq!(at(0, 2).region(chip), Some(RegionType::Ioi));
        assert_eq!(at(0, 3).region(chip), Some(RegionType::Clb));
        assert_eq!(at(0, 10).region(chip), Some(RegionType::Clb));
        assert_eq!(at(0, 11).region(chip), Some(RegionType::Ioi));
        assert_eq!(at(0, 12).region(chip), Some(RegionType::Iob));
        assert_eq!(at(1, 0).region(chip), Some(RegionType::Bram));
        assert_eq!(at(2, 1).region(chip), Some(RegionType::BramInt));
        assert_eq!(at(3, 0).region(chip), None);

        assert_eq!(at(0, 0).column(chip), Some(0));
        assert_eq!(at(0, 1).column(chip), Some(0));
        assert_eq!(at(0, 12).column(chip), Some(1));
        assert_eq!(at(0, 2).column(chip), Some(0));
        assert_eq!(at(0, 11).column(chip), Some(1));
        assert_eq!(at(0, 3).column(chip), Some(0));
        assert_eq!(at(0, 10).column(chip), Some(7));
        assert_eq!(at(1, 1).column(chip), Some(1));
        assert_eq!(at(3, 0).column(chip), None);
    }

    #[test]
    fn increment_visits_every_frame_once() {
        for idcode in [0x01008093, 0x0140d093] {
            let chip = geometry(idcode).unwrap();
            let mut addr = FrameAddr::default();
            let total = chip.total_frames();
            let mut seen = HashSet::new();
            for _ in 0..total {
                let region = addr.region(chip).unwrap();
                let column = addr.column(chip).unwrap();
                assert!(column < chip.col_count[region]);
                assert!(addr.minor < chip.frame_count[region]);
                assert!(seen.insert((region, column, addr.minor)), "revisited {addr}");
                advance_frame(chip, &mut addr).unwrap();
            }
            assert_eq!(seen.len(), total);
        }
    }

    #[test]
    fn increment_block_rollovers() {
        let chip = geometry(0x01008093).unwrap();
        // last frame of the second IOB column carries into the BRAM block
        let mut addr = FrameAddr { block: 0, major: 12, minor: 3, bit: 0 };
        advance_frame(chip, &mut addr).unwrap();
        assert_eq!(addr, FrameAddr { block: 1, major: 0, minor: 0, bit: 0 });
        // last frame of the last BRAM column carries into BRAM interconnect
        let mut addr = FrameAddr { block: 1, major: 1, minor: 63, bit: 0 };
        advance_frame(chip, &mut addr).unwrap();
        assert_eq!(addr, FrameAddr { block: 2, major: 0, minor: 0, bit: 0 });
    }

    #[test]
    fn bit_increment_carries_into_frame() {
        let chip = geometry(0x01008093).unwrap();
        let mut addr = FrameAddr::default();
        for _ in 0..26 {
            advance_bit(chip, 26, &mut addr).unwrap();
        }
        assert_eq!(addr, FrameAddr { block: 0, major: 0, minor: 1, bit: 0 });
    }

    #[test]
    fn increment_rejects_bad_block() {
        let chip = geometry(0x01008093).unwrap();
        let mut addr = FrameAddr { block: 3, major: 0, minor: 0, bit: 0 };
        let word = FrameAddr { block: 3, major: 0, minor: 1, bit: 0 }.to_word();
        assert_eq!(
            advance_frame(chip, &mut addr),
            Err(ErrorKind::InvalidFrameAddress(word))
        );
    }

    #[test]
    fn display_forms() {
        let addr = FrameAddr { block: 1, major: 2, minor: 3, bit: 4 };
        assert_eq!(addr.to_string(), "1_2_3_4");
    }
}
