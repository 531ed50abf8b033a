//! Binary buffer reader with cursor tracking.

use crate::ReadError;

/// A binary buffer reader that reads big-endian data from a byte slice.
///
/// The reader maintains a cursor position and provides bounds-checked
/// methods for reading integers, floats, raw slices, and the two
/// length-prefixed UTF-8 string forms used by the object-stream format.
///
/// # Example
///
/// ```
/// use javaobj_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8().unwrap(), 0x01);
/// assert_eq!(reader.u16().unwrap(), 0x0203);
/// ```
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Returns the number of remaining bytes.
    pub fn remaining(&self) -> usize {
        self.uint8.len() - self.x
    }

    /// Returns `true` when the cursor has reached the end of the buffer.
    pub fn is_eof(&self) -> bool {
        self.x >= self.uint8.len()
    }

    fn check(&self, n: usize) -> Result<(), ReadError> {
        if self.x + n > self.uint8.len() {
            Err(ReadError::EndOfInput { offset: self.x })
        } else {
            Ok(())
        }
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, ReadError> {
        self.check(1)?;
        let val = self.uint8[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Reads a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self) -> Result<i8, ReadError> {
        Ok(self.u8()? as i8)
    }

    /// Reads an unsigned 16-bit integer.
    #[inline]
    pub fn u16(&mut self) -> Result<u16, ReadError> {
        self.check(2)?;
        let val = u16::from_be_bytes([self.uint8[self.x], self.uint8[self.x + 1]]);
        self.x += 2;
        Ok(val)
    }

    /// Reads a signed 16-bit integer.
    #[inline]
    pub fn i16(&mut self) -> Result<i16, ReadError> {
        Ok(self.u16()? as i16)
    }

    /// Reads an unsigned 32-bit integer.
    #[inline]
    pub fn u32(&mut self) -> Result<u32, ReadError> {
        self.check(4)?;
        let val = u32::from_be_bytes([
            self.uint8[self.x],
            self.uint8[self.x + 1],
            self.uint8[self.x + 2],
            self.uint8[self.x + 3],
        ]);
        self.x += 4;
        Ok(val)
    }

    /// Reads a signed 32-bit integer.
    #[inline]
    pub fn i32(&mut self) -> Result<i32, ReadError> {
        Ok(self.u32()? as i32)
    }

    /// Reads an unsigned 64-bit integer.
    #[inline]
    pub fn u64(&mut self) -> Result<u64, ReadError> {
        self.check(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.uint8[self.x..self.x + 8]);
        self.x += 8;
        Ok(u64::from_be_bytes(bytes))
    }

    /// Reads a signed 64-bit integer.
    #[inline]
    pub fn i64(&mut self) -> Result<i64, ReadError> {
        Ok(self.u64()? as i64)
    }

    /// Reads a 32-bit floating point number.
    #[inline]
    pub fn f32(&mut self) -> Result<f32, ReadError> {
        Ok(f32::from_bits(self.u32()?))
    }

    /// Reads a 64-bit floating point number.
    #[inline]
    pub fn f64(&mut self) -> Result<f64, ReadError> {
        Ok(f64::from_bits(self.u64()?))
    }

    /// Returns a subslice of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], ReadError> {
        self.check(size)?;
        let bin = &self.uint8[self.x..self.x + size];
        self.x += size;
        Ok(bin)
    }

    /// Reads `size` raw bytes rendered as lowercase hex digits.
    pub fn hex(&mut self, size: usize) -> Result<String, ReadError> {
        let bytes = self.buf(size)?;
        let mut out = String::with_capacity(size * 2);
        for b in bytes {
            out.push_str(&format!("{:02x}", b));
        }
        Ok(out)
    }

    /// Reads a UTF-8 string of the given byte length.
    pub fn utf8(&mut self, size: usize) -> Result<String, ReadError> {
        let offset = self.x;
        let bytes = self.buf(size)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ReadError::InvalidUtf8 { offset })
    }

    /// Reads a "short UTF" string: u16 byte length followed by UTF-8 data.
    pub fn utf(&mut self) -> Result<String, ReadError> {
        let length = self.u16()? as usize;
        self.utf8(length)
    }

    /// Reads a "long UTF" string: u64 byte length followed by UTF-8 data.
    ///
    /// Lengths with any of the high 32 bits set are rejected.
    pub fn long_utf(&mut self) -> Result<String, ReadError> {
        let offset = self.x;
        let length = self.u64()?;
        if length >> 32 != 0 {
            return Err(ReadError::LengthOverflow { offset, length });
        }
        self.utf8(length as usize)
    }
}
