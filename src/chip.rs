use enum_map::{Enum, EnumMap};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Enum)]
pub enum RegionType {
    Iob,
    Ioi,
    Clb,
    Bram,
    BramInt,
    Gclk,
}

impl RegionType {
    pub const ALL: [RegionType; 6] = [
        RegionType::Iob,
        RegionType::Ioi,
        RegionType::Clb,
        RegionType::Bram,
        RegionType::BramInt,
        RegionType::Gclk,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RegionType::Iob => "IOB",
            RegionType::Ioi => "IOI",
            RegionType::Clb => "CLB",
            RegionType::Bram => "BRAM",
            RegionType::BramInt => "BRAM_INT",
            RegionType::Gclk => "GCLK",
        }
    }
}

impl fmt::Display for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ChipKind {
    Xc2v40,
    Xc2v80,
    Xc2v250,
    Xc2v500,
    Xc2v1000,
    Xc2v1500,
    Xc2v2000,
    Xc2v3000,
    Xc2v4000,
    Xc2v6000,
    Xc2v8000,
    Xc3s50,
    Xc3s200,
    Xc3s400,
    Xc3s1000,
    Xc3s1500,
    Xc3s2000,
    Xc3s4000,
    Xc3s5000,
}

impl ChipKind {
    pub fn is_spartan3(self) -> bool {
        self >= ChipKind::Xc3s50
    }
}

#[derive(Clone, Debug)]
pub struct ChipDescriptor {
    pub kind: ChipKind,
    pub idcode: u32,
    // in 32-bit words, i.e. the FLR register value plus one
    pub framelen: u32,
    pub col_count: EnumMap<RegionType, u32>,
    pub frame_count: EnumMap<RegionType, u32>,
}

impl ChipDescriptor {
    // Uniform across regions on these families; the region argument matches
    // the query surface expected by site decoders.
    pub fn frame_words(&self, _region: RegionType) -> u32 {
        self.framelen
    }

    pub fn total_frames(&self) -> usize {
        RegionType::ALL
            .into_iter()
            .map(|r| (self.col_count[r] * self.frame_count[r]) as usize)
            .sum()
    }
}

// frame counts are per-family constants; see xapp452 for Spartan-3
const V2_FRAME_COUNT: EnumMap<RegionType, u32> = EnumMap::from_array([4, 22, 22, 64, 22, 4]);
const S3_FRAME_COUNT: EnumMap<RegionType, u32> = EnumMap::from_array([2, 19, 19, 76, 19, 3]);

const fn v2_chip(kind: ChipKind, idcode: u32, framelen: u32, nclb: u32, nbram: u32) -> ChipDescriptor {
    ChipDescriptor {
        kind,
        idcode,
        framelen,
        col_count: EnumMap::from_array([2, 2, nclb, nbram, nbram, 1]),
        frame_count: V2_FRAME_COUNT,
    }
}

const fn s3_chip(kind: ChipKind, idcode: u32, framelen: u32, nclb: u32, nbram: u32) -> ChipDescriptor {
    ChipDescriptor {
        kind,
        idcode,
        framelen,
        col_count: EnumMap::from_array([2, 2, nclb, nbram, nbram, 1]),
        frame_count: S3_FRAME_COUNT,
    }
}

pub static GEOMETRIES: [ChipDescriptor; 19] = [
    v2_chip(ChipKind::Xc2v40, 0x01008093, 26, 8, 2),
    v2_chip(ChipKind::Xc2v80, 0x01010093, 46, 8, 2),
    v2_chip(ChipKind::Xc2v250, 0x01018093, 66, 16, 4),
    v2_chip(ChipKind::Xc2v500, 0x01020093, 86, 24, 4),
    v2_chip(ChipKind::Xc2v1000, 0x01028093, 106, 32, 4),
    v2_chip(ChipKind::Xc2v1500, 0x01030093, 126, 40, 4),
    v2_chip(ChipKind::Xc2v2000, 0x01038093, 146, 48, 4),
    v2_chip(ChipKind::Xc2v3000, 0x01040093, 166, 56, 6),
    v2_chip(ChipKind::Xc2v4000, 0x01050093, 206, 72, 6),
    v2_chip(ChipKind::Xc2v6000, 0x01060093, 246, 88, 6),
    v2_chip(ChipKind::Xc2v8000, 0x01070093, 286, 104, 6),
    s3_chip(ChipKind::Xc3s50, 0x0140d093, 37, 12, 1),
    s3_chip(ChipKind::Xc3s200, 0x01414093, 53, 20, 2),
    s3_chip(ChipKind::Xc3s400, 0x0141c093, 69, 28, 2),
    s3_chip(ChipKind::Xc3s1000, 0x11428093, 101, 40, 2),
    s3_chip(ChipKind::Xc3s1500, 0x01434093, 133, 52, 2),
    s3_chip(ChipKind::Xc3s2000, 0x01440093, 165, 64, 2),
    s3_chip(ChipKind::Xc3s4000, 0x01448093, 197, 72, 4),
    s3_chip(ChipKind::Xc3s5000, 0x01450093, 213, 80, 4),
];

pub fn geometry(idcode: u32) -> Option<&'static ChipDescriptor> {
    GEOMETRIES.iter().find(|chip| chip.idcode == idcode)
}
