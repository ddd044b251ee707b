use crate::regs::Reg;

// CRC-16/IBM, reflected form.
const POLY: u16 = 0xa001;

fn fold_bits(mut crc: u16, data: u32, bits: u32) -> u16 {
    for i in 0..bits {
        let bit = ((data >> i) as u16 ^ crc) & 1;
        crc >>= 1;
        if bit != 0 {
            crc ^= POLY;
        }
    }
    crc
}

// Folds one register write into the running accumulator: the four value
// bytes least-significant first, then the 5-bit register address. LOUT is
// a write-only debug port and contributes nothing.
pub fn update(crc: u16, reg: Reg, val: u32) -> u16 {
    if reg == Reg::Lout {
        return crc;
    }
    let crc = fold_bits(crc, val, 32);
    fold_bits(crc, reg.addr(), 5)
}
