use arrayref::array_ref;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Eof;

// Sequential big-endian word reader over the raw bitstream.
#[derive(Clone, Debug)]
pub struct WordCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WordCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        WordCursor { data, pos: 0 }
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn remaining_words(&self) -> usize {
        self.remaining() / 4
    }

    pub fn read_u32(&mut self) -> Result<u32, Eof> {
        if self.pos + 4 > self.data.len() {
            return Err(Eof);
        }
        let word = u32::from_be_bytes(*array_ref!(self.data, self.pos, 4));
        self.pos += 4;
        Ok(word)
    }

    pub fn peek_slice(&self, len: usize) -> Result<&'a [u8], Eof> {
        if self.pos + len > self.data.len() {
            return Err(Eof);
        }
        Ok(&self.data[self.pos..self.pos + len])
    }
}
