//! Little-endian primitive encoder.
//!
//! Every byte of the container passes through [`LeEncoder`], which keeps a
//! running count of bytes written. The assembler compares that count with
//! the planned region offsets, so the position reported here is the ground
//! truth the layout is checked against.

use std::io::Write;

use bytes::{BufMut, BytesMut};

use crate::error::IoError;

/// Writes fixed-width little-endian values to an output sink.
#[derive(Debug)]
pub struct LeEncoder<W: Write> {
    inner: W,
    position: u64,
}

impl<W: Write> LeEncoder<W> {
    /// Wrap a writer. The position starts at zero.
    pub fn new(inner: W) -> Self {
        Self { inner, position: 0 }
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Write a u16 in little-endian order.
    pub fn write_u16(&mut self, value: u16) -> Result<(), IoError> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write a u32 in little-endian order.
    pub fn write_u32(&mut self, value: u32) -> Result<(), IoError> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write an IEEE-754 double in little-endian order.
    pub fn write_f64(&mut self, value: f64) -> Result<(), IoError> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write a run of u16 values with a single call to the sink.
    pub fn write_u16_slice(&mut self, values: &[u16]) -> Result<(), IoError> {
        let mut buf = BytesMut::with_capacity(values.len() * 2);
        for &value in values {
            buf.put_u16_le(value);
        }
        self.write_bytes(&buf)
    }

    /// Write a run of u32 values with a single call to the sink.
    pub fn write_u32_slice(&mut self, values: &[u32]) -> Result<(), IoError> {
        let mut buf = BytesMut::with_capacity(values.len() * 4);
        for &value in values {
            buf.put_u32_le(value);
        }
        self.write_bytes(&buf)
    }

    /// Write a run of doubles with a single call to the sink.
    pub fn write_f64_slice(&mut self, values: &[f64]) -> Result<(), IoError> {
        let mut buf = BytesMut::with_capacity(values.len() * 8);
        for &value in values {
            buf.put_f64_le(value);
        }
        self.write_bytes(&buf)
    }

    /// Write raw bytes unchanged.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), IoError> {
        self.inner.write_all(bytes).map_err(|e| IoError::Write {
            offset: self.position,
            message: e.to_string(),
        })?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), IoError> {
        self.inner.flush().map_err(|e| IoError::Flush {
            message: e.to_string(),
        })
    }

    /// Borrow the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Accepts a fixed number of bytes, then fails every write.
    struct FailingWriter {
        remaining: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            let n = buf.len().min(self.remaining);
            self.remaining -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_scalar_encoding() {
        let mut enc = LeEncoder::new(Vec::new());
        enc.write_u16(42).unwrap();
        enc.write_u32(190).unwrap();
        enc.write_f64(1.0).unwrap();

        let bytes = enc.into_inner();
        assert_eq!(&bytes[0..2], &[0x2A, 0x00]);
        assert_eq!(&bytes[2..6], &[0xBE, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[6..14], &1.0_f64.to_le_bytes());
    }

    #[test]
    fn test_position_tracks_every_write() {
        let mut enc = LeEncoder::new(Vec::new());
        assert_eq!(enc.position(), 0);
        enc.write_bytes(b"II").unwrap();
        enc.write_u16(42).unwrap();
        enc.write_u32(8).unwrap();
        assert_eq!(enc.position(), 8);
        enc.write_u16_slice(&[1, 1, 0, 18]).unwrap();
        assert_eq!(enc.position(), 16);
        enc.write_f64_slice(&[0.0; 6]).unwrap();
        assert_eq!(enc.position(), 64);
        assert_eq!(enc.get_ref().len(), 64);
    }

    #[test]
    fn test_slices_match_scalar_writes() {
        let mut a = LeEncoder::new(Vec::new());
        let mut b = LeEncoder::new(Vec::new());

        a.write_u32_slice(&[364, 620, 16384]).unwrap();
        for v in [364, 620, 16384] {
            b.write_u32(v).unwrap();
        }
        assert_eq!(a.into_inner(), b.into_inner());
    }

    #[test]
    fn test_write_error_reports_offset() {
        let mut enc = LeEncoder::new(FailingWriter { remaining: 8 });
        enc.write_bytes(&[0; 8]).unwrap();

        let err = enc.write_u32(1).unwrap_err();
        assert!(matches!(err, IoError::Write { offset: 8, .. }));
        assert_eq!(enc.position(), 8);
    }
}
