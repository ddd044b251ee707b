use crate::chip::{ChipDescriptor, RegionType};
use enum_map::EnumMap;

// Stable textual form used by logs and diff tooling.
pub fn frame_name(region: RegionType, column: u32, frame: u32) -> String {
    format!("frame_{}_{:02x}_{:02x}", region.name(), column, frame)
}

// Two-level frame lookup: per-region bases into one flat slot array,
// slot = base[region] + column * frame_count[region] + frame.
#[derive(Clone, Debug)]
pub struct FrameStore {
    chip: &'static ChipDescriptor,
    base: EnumMap<RegionType, usize>,
    slots: Vec<Option<Box<[u8]>>>,
}

impl FrameStore {
    pub fn new(chip: &'static ChipDescriptor) -> Self {
        let mut base = EnumMap::default();
        let mut offset = 0usize;
        for (region, slot) in base.iter_mut() {
            *slot = offset;
            offset += (chip.col_count[region] * chip.frame_count[region]) as usize;
        }
        FrameStore {
            chip,
            base,
            slots: vec![None; offset],
        }
    }

    pub fn chip(&self) -> &'static ChipDescriptor {
        self.chip
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // Out-of-geometry coordinates are a caller bug, not an input error.
    fn index(&self, region: RegionType, column: u32, frame: u32) -> usize {
        assert!(
            column < self.chip.col_count[region],
            "column {column} out of range for {region}"
        );
        assert!(
            frame < self.chip.frame_count[region],
            "frame {frame} out of range for {region}"
        );
        self.base[region] + (column * self.chip.frame_count[region] + frame) as usize
    }

    pub fn get(&self, region: RegionType, column: u32, frame: u32) -> Option<&[u8]> {
        self.slots[self.index(region, column, frame)].as_deref()
    }

    pub fn slot_mut(&mut self, region: RegionType, column: u32, frame: u32) -> &mut Option<Box<[u8]>> {
        let idx = self.index(region, column, frame);
        &mut self.slots[idx]
    }

    pub fn captured(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    // Deterministic full traversal in region-major, column, frame order;
    // unset slots are yielded as None so callers can detect holes.
    pub fn frames(&self) -> impl Iterator<Item = (RegionType, u32, u32, Option<&[u8]>)> {
        RegionType::ALL.into_iter().flat_map(move |region| {
            (0..self.chip.col_count[region]).flat_map(move |column| {
                (0..self.chip.frame_count[region])
                    .map(move |frame| (region, column, frame, self.get(region, column, frame)))
            })
        })
    }
}
