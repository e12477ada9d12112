//! LSB bit stream over a pixel buffer.
//!
//! Bits are placed one per channel in R, G, B order (alpha is skipped),
//! pixel after pixel, least-significant bit of each byte first. A single
//! [`BitCursor`] tracks the position for the whole lifetime of a job so the
//! payload region starts exactly where the header region ended.

use super::capacity::CHANNELS_PER_PIXEL;
use super::pixels::PixelBuffer;

/// Position in the embedded bit stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitCursor {
    /// Pixel index, row-major.
    pub pixel: usize,
    /// Channel within the pixel: 0 = R, 1 = G, 2 = B.
    pub channel: usize,
    /// Bit within the current byte, 0 = least significant.
    pub bit: u8,
}

impl BitCursor {
    /// Cursor at the first bit of the first pixel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute bit offset from the start of the embedded stream.
    pub fn bit_offset(&self) -> usize {
        self.pixel * CHANNELS_PER_PIXEL + self.channel
    }

    /// Moves to the next (pixel, channel) slot.
    fn advance(&mut self) {
        self.channel += 1;
        if self.channel == CHANNELS_PER_PIXEL {
            self.channel = 0;
            self.pixel += 1;
        }
        self.bit = (self.bit + 1) % 8;
    }

    /// Whole bytes that still fit between the cursor and the end of `pixels`.
    pub fn remaining_bytes(&self, pixels: &PixelBuffer) -> usize {
        let total_bits = pixels.len() * CHANNELS_PER_PIXEL;
        total_bits.saturating_sub(self.bit_offset()) / 8
    }
}

/// Writes bytes into the low bit of each channel, advancing a borrowed cursor.
pub struct BitWriter<'a> {
    pixels: &'a mut PixelBuffer,
    cursor: &'a mut BitCursor,
}

impl<'a> BitWriter<'a> {
    pub fn new(pixels: &'a mut PixelBuffer, cursor: &'a mut BitCursor) -> Self {
        Self { pixels, cursor }
    }

    /// Writes one byte, LSB first. Returns `false` without touching any
    /// pixel if fewer than 8 slots remain.
    pub fn write_byte(&mut self, byte: u8) -> bool {
        if self.cursor.remaining_bytes(self.pixels) == 0 {
            return false;
        }
        for i in 0..8 {
            let bit = (byte >> i) & 1;
            let value = self.pixels.channel_mut(self.cursor.pixel, self.cursor.channel);
            *value = (*value & 0xFE) | bit;
            self.cursor.advance();
        }
        true
    }

    /// Writes every byte of `bytes`. Returns the number written.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> usize {
        let mut written = 0;
        for &byte in bytes {
            if !self.write_byte(byte) {
                break;
            }
            written += 1;
        }
        written
    }
}

/// Reads bytes back from the low bit of each channel, advancing a borrowed cursor.
pub struct BitReader<'a> {
    pixels: &'a PixelBuffer,
    cursor: &'a mut BitCursor,
}

impl<'a> BitReader<'a> {
    pub fn new(pixels: &'a PixelBuffer, cursor: &'a mut BitCursor) -> Self {
        Self { pixels, cursor }
    }

    /// Reassembles one byte, LSB first. `None` once fewer than 8 slots remain.
    pub fn read_byte(&mut self) -> Option<u8> {
        if self.cursor.remaining_bytes(self.pixels) == 0 {
            return None;
        }
        let mut byte = 0u8;
        for i in 0..8 {
            let bit = self.pixels.channel(self.cursor.pixel, self.cursor.channel) & 1;
            byte |= bit << i;
            self.cursor.advance();
        }
        Some(byte)
    }

    /// Fills `out` completely. Returns `false` if the stream ran out first.
    pub fn read_exact(&mut self, out: &mut [u8]) -> bool {
        for slot in out.iter_mut() {
            match self.read_byte() {
                Some(byte) => *slot = byte,
                None => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(pixels: usize, fill: u8) -> PixelBuffer {
        let side = pixels as u32;
        PixelBuffer::from_raw(side, 1, vec![fill; pixels * 4]).unwrap()
    }

    #[test]
    fn test_cursor_order_skips_alpha() {
        let mut cursor = BitCursor::new();
        let slots: Vec<(usize, usize)> = (0..7)
            .map(|_| {
                let slot = (cursor.pixel, cursor.channel);
                cursor.advance();
                slot
            })
            .collect();
        assert_eq!(
            slots,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (2, 0)]
        );
    }

    #[test]
    fn test_writer_sets_only_low_bits() {
        let mut pixels = buffer(3, 0b1010_1010);
        let mut cursor = BitCursor::new();
        assert!(BitWriter::new(&mut pixels, &mut cursor).write_byte(0b0000_0101));

        // bits 1,0,1,0,0,0,0,0 across R,G,B,R,G,B,R,G
        let raw = pixels.as_raw();
        assert_eq!(raw[0], 0b1010_1011);
        assert_eq!(raw[1], 0b1010_1010);
        assert_eq!(raw[2], 0b1010_1011);
        assert_eq!(raw[3], 0b1010_1010, "alpha untouched");
        assert_eq!(raw[4], 0b1010_1010);
        assert_eq!(cursor.bit_offset(), 8);
        assert_eq!(cursor.bit, 0);
        assert_eq!((cursor.pixel, cursor.channel), (2, 2));
    }

    #[test]
    fn test_reader_mirrors_writer() {
        let mut pixels = buffer(40, 0x77);
        let data = [0x00, 0xFF, 0x5A, 0xC3, 0x81];

        let mut write_cursor = BitCursor::new();
        assert_eq!(
            BitWriter::new(&mut pixels, &mut write_cursor).write_bytes(&data),
            data.len()
        );

        let mut read_cursor = BitCursor::new();
        let mut out = [0u8; 5];
        assert!(BitReader::new(&pixels, &mut read_cursor).read_exact(&mut out));
        assert_eq!(out, data);
        assert_eq!(read_cursor, write_cursor);
    }

    #[test]
    fn test_writer_stops_before_partial_byte() {
        // 5 pixels = 15 slots: one whole byte and 7 leftover bits
        let mut pixels = buffer(5, 0);
        let mut cursor = BitCursor::new();
        let mut writer = BitWriter::new(&mut pixels, &mut cursor);
        assert!(writer.write_byte(0xFF));
        assert!(!writer.write_byte(0xFF));
        assert_eq!(cursor.bit_offset(), 8);
    }

    #[test]
    fn test_reader_continues_across_calls() {
        let mut pixels = buffer(20, 0);
        let mut cursor = BitCursor::new();
        BitWriter::new(&mut pixels, &mut cursor).write_bytes(b"abcdef");

        let mut cursor = BitCursor::new();
        let mut head = [0u8; 2];
        assert!(BitReader::new(&pixels, &mut cursor).read_exact(&mut head));
        let mut tail = [0u8; 4];
        assert!(BitReader::new(&pixels, &mut cursor).read_exact(&mut tail));
        assert_eq!(&head, b"ab");
        assert_eq!(&tail, b"cdef");
    }
}
