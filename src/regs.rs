use enum_map::{Enum, EnumMap};
use std::fmt;

// Configuration registers, in 5-bit address order (ug002).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Enum)]
pub enum Reg {
    Crc,
    Far,
    Fdri,
    Fdro,
    Cmd,
    Ctl,
    Mask,
    Stat,
    Lout,
    Cor,
    Mfwr,
    Flr,
    // RESERVED on Spartan-3
    Key,
    // RESERVED on Spartan-3
    Cbc,
    Idcode,
}

impl Reg {
    pub fn addr(self) -> u32 {
        self as u32
    }

    pub fn from_addr(addr: u32) -> Option<Reg> {
        ((addr as usize) < Reg::LENGTH).then(|| Enum::from_usize(addr as usize))
    }

    pub fn name(self) -> &'static str {
        match self {
            Reg::Crc => "CRC",
            Reg::Far => "FAR",
            Reg::Fdri => "FDRI",
            Reg::Fdro => "FDRO",
            Reg::Cmd => "CMD",
            Reg::Ctl => "CTL",
            Reg::Mask => "MASK",
            Reg::Stat => "STAT",
            Reg::Lout => "LOUT",
            Reg::Cor => "COR",
            Reg::Mfwr => "MFWR",
            Reg::Flr => "FLR",
            Reg::Key => "KEY",
            Reg::Cbc => "CBC",
            Reg::Idcode => "IDCODE",
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

// CMD register opcodes, shared between Virtex-2 and Spartan-3.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Cmd {
    Null,
    Wcfg,
    Mfwr,
    Lfrm,
    Rcfg,
    Start,
    Rcap,
    Rcrc,
    Aghigh,
    Switch,
    GRestore,
    Shutdown,
    GCapture,
    Desynch,
}

impl Cmd {
    pub fn from_value(val: u32) -> Option<Cmd> {
        Some(match val {
            0 => Cmd::Null,
            1 => Cmd::Wcfg,
            2 => Cmd::Mfwr,
            3 => Cmd::Lfrm,
            4 => Cmd::Rcfg,
            5 => Cmd::Start,
            6 => Cmd::Rcap,
            7 => Cmd::Rcrc,
            8 => Cmd::Aghigh,
            9 => Cmd::Switch,
            10 => Cmd::GRestore,
            11 => Cmd::Shutdown,
            12 => Cmd::GCapture,
            13 => Cmd::Desynch,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Cmd::Null => "NULL",
            Cmd::Wcfg => "WCFG",
            Cmd::Mfwr => "MFWR",
            Cmd::Lfrm => "LFRM",
            Cmd::Rcfg => "RCFG",
            Cmd::Start => "START",
            Cmd::Rcap => "RCAP",
            Cmd::Rcrc => "RCRC",
            Cmd::Aghigh => "AGHIGH",
            Cmd::Switch => "SWITCH",
            Cmd::GRestore => "GRESTORE",
            Cmd::Shutdown => "SHUTDOWN",
            Cmd::GCapture => "GCAPTURE",
            Cmd::Desynch => "DESYNCH",
        }
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Default)]
pub struct RegisterFile {
    regs: EnumMap<Reg, u32>,
}

impl RegisterFile {
    pub fn new() -> Self {
        RegisterFile::default()
    }

    pub fn read(&self, reg: Reg) -> u32 {
        self.regs[reg]
    }

    pub fn write(&mut self, reg: Reg, val: u32) {
        self.regs[reg] = val;
    }

    // frame length in words, as derived from the live FLR value; wraps on
    // FLR of all ones rather than trusting the input
    pub fn frame_words(&self) -> u32 {
        self.regs[Reg::Flr].wrapping_add(1)
    }
}
