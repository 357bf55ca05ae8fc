//! Fortran sequential "unformatted" record framing.
//!
//! Every record is `[u32 len][len bytes][u32 len]`, little-endian. The
//! trailing marker is only used to step over the record; it is never compared
//! with the leading one, since real-world writers have not always kept the
//! two in sync.

use crate::common::constants::{RECORD_FRAMING_BYTES, RECORD_MARKER_BYTES};
use crate::domain::{WfcError, WfcResult};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom};

/// One framed record whose payload has been read into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub start: u64,
    pub payload: Vec<u8>,
    pub next_offset: u64,
}

impl Record {
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Fails when the payload is shorter than the layout the caller expects.
    /// Longer payloads are accepted and their tail ignored.
    pub fn require(&self, bytes: usize, what: &str) -> WfcResult<()> {
        if self.payload.len() < bytes {
            return Err(WfcError::malformed_header(format!(
                "{} record at byte {} holds {} bytes, expected at least {}",
                what,
                self.start,
                self.payload.len(),
                bytes
            )));
        }
        Ok(())
    }

    pub fn i32s(&self, count: usize, what: &str) -> WfcResult<Vec<i32>> {
        self.require(count * 4, what)?;
        let mut values = vec![0_i32; count];
        LittleEndian::read_i32_into(&self.payload[..count * 4], &mut values);
        Ok(values)
    }

    pub fn i32_scalar(&self, what: &str) -> WfcResult<i32> {
        self.require(4, what)?;
        Ok(LittleEndian::read_i32(&self.payload[..4]))
    }

    pub fn f64s(&self, count: usize, what: &str) -> WfcResult<Vec<f64>> {
        self.f64s_at(0, count, what)
    }

    /// Decodes `count` doubles starting `byte_offset` bytes into the payload.
    pub fn f64s_at(&self, byte_offset: usize, count: usize, what: &str) -> WfcResult<Vec<f64>> {
        let end = byte_offset + count * 8;
        self.require(end, what)?;
        let mut values = vec![0.0_f64; count];
        LittleEndian::read_f64_into(&self.payload[byte_offset..end], &mut values);
        Ok(values)
    }

    pub fn f32s(&self, count: usize, what: &str) -> WfcResult<Vec<f32>> {
        self.require(count * 4, what)?;
        let mut values = vec![0.0_f32; count];
        LittleEndian::read_f32_into(&self.payload[..count * 4], &mut values);
        Ok(values)
    }
}

/// Location of a record that was stepped over without reading its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedRecord {
    pub start: u64,
    pub payload_len: u64,
    pub next_offset: u64,
}

#[derive(Debug)]
pub struct RecordReader<R> {
    inner: R,
    stream_len: u64,
    cursor: u64,
}

impl<R: Read + Seek> RecordReader<R> {
    pub fn new(mut inner: R) -> WfcResult<Self> {
        let stream_len = inner
            .seek(SeekFrom::End(0))
            .map_err(|source| WfcError::io("failed to measure record stream", source))?;
        inner
            .seek(SeekFrom::Start(0))
            .map_err(|source| WfcError::io("failed to rewind record stream", source))?;
        Ok(Self {
            inner,
            stream_len,
            cursor: 0,
        })
    }

    pub fn stream_len(&self) -> u64 {
        self.stream_len
    }

    pub fn position(&self) -> u64 {
        self.cursor
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads the record at `at` (or at the cursor) and leaves the cursor just
    /// past its trailing marker.
    pub fn read_record(&mut self, at: Option<u64>) -> WfcResult<Record> {
        let (start, payload_len) = self.read_leading_marker(at)?;
        let mut payload = vec![0_u8; payload_len as usize];
        self.inner.read_exact(&mut payload).map_err(|source| {
            WfcError::io(format!("failed to read record payload at byte {}", start), source)
        })?;

        let next_offset = start + payload_len + RECORD_FRAMING_BYTES;
        self.seek_to(next_offset)?;
        Ok(Record {
            start,
            payload,
            next_offset,
        })
    }

    /// Steps over the record at `at` (or at the cursor) without touching its
    /// payload bytes.
    pub fn skip_record(&mut self, at: Option<u64>) -> WfcResult<SkippedRecord> {
        let (start, payload_len) = self.read_leading_marker(at)?;
        let next_offset = start + payload_len + RECORD_FRAMING_BYTES;
        self.seek_to(next_offset)?;
        Ok(SkippedRecord {
            start,
            payload_len,
            next_offset,
        })
    }

    fn read_leading_marker(&mut self, at: Option<u64>) -> WfcResult<(u64, u64)> {
        if let Some(offset) = at {
            self.seek_to(offset)?;
        }
        let start = self.cursor;

        let remaining = self.stream_len.saturating_sub(start);
        if remaining < RECORD_MARKER_BYTES {
            return Err(WfcError::TruncatedRecord {
                offset: start,
                declared: RECORD_MARKER_BYTES,
                available: remaining,
            });
        }

        let payload_len = u64::from(self.inner.read_u32::<LittleEndian>().map_err(|source| {
            WfcError::io(format!("failed to read record marker at byte {}", start), source)
        })?);
        self.cursor = start + RECORD_MARKER_BYTES;

        // Payload plus trailing marker must fit in what is left of the stream.
        let available = remaining - RECORD_MARKER_BYTES;
        let declared = payload_len + RECORD_MARKER_BYTES;
        if declared > available {
            return Err(WfcError::TruncatedRecord {
                offset: start,
                declared,
                available,
            });
        }

        Ok((start, payload_len))
    }

    fn seek_to(&mut self, offset: u64) -> WfcResult<()> {
        self.inner.seek(SeekFrom::Start(offset)).map_err(|source| {
            WfcError::io(format!("failed to seek record stream to byte {}", offset), source)
        })?;
        self.cursor = offset;
        Ok(())
    }
}
