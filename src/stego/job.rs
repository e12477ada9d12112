//! Encode and decode jobs.
//!
//! A job owns its pixel buffer, its [`BitCursor`] and its byte buffer for
//! its whole lifetime; nothing else touches them until it reaches
//! [`JobStatus::Complete`] or [`JobStatus::Failed`]. The decode job reads
//! the header and then the payload with the same cursor.

use log::{debug, info};

use super::bits::{BitCursor, BitReader, BitWriter};
use super::capacity::{capacity, ensure_fits, CHANNELS_PER_PIXEL};
use super::error::{ErrorKind, StegoError};
use super::header::{Header, HEADER_SIZE};
use super::pixels::PixelBuffer;
use super::scheduler::{Job, Progress, Step};
use super::validator::{PayloadValidator, ValidatedPayload};
use crate::format::format_file_size;

/// Lifecycle of a job. States are only ever entered in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Idle,
    WritingHeader,
    ReadingHeader,
    ProcessingPayload,
    Validating,
    Complete,
    Failed(ErrorKind),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed(_))
    }
}

fn stepped_after_finish() -> StegoError {
    StegoError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        "job stepped after it finished",
    ))
}

/// Whole bytes to process in a slice of `slice_pixels` pixels (at least one).
fn bytes_per_slice(slice_pixels: usize) -> usize {
    (slice_pixels.saturating_mul(CHANNELS_PER_PIXEL) / 8).max(1)
}

/// Embeds header and payload into a carrier, one slice at a time.
#[derive(Debug)]
pub struct EncodeJob {
    pixels: PixelBuffer,
    cursor: BitCursor,
    stream: Vec<u8>,
    written: usize,
    status: JobStatus,
}

impl EncodeJob {
    /// Prepares an encode of `payload` into `pixels`.
    ///
    /// Every size check runs here, before any pixel is modified.
    pub fn new(pixels: PixelBuffer, payload: &[u8], max_payload: u32) -> Result<Self, StegoError> {
        if payload.is_empty() {
            return Err(StegoError::EmptyPayload);
        }
        if payload.len() > max_payload as usize {
            return Err(StegoError::PayloadTooLarge {
                size: payload.len(),
                max: max_payload as usize,
            });
        }
        let (width, height) = pixels.dimensions();
        ensure_fits(width, height, payload.len())?;

        // Bounded by max_payload above.
        let header = Header::new(payload.len() as u32);
        let mut stream = Vec::with_capacity(HEADER_SIZE + payload.len());
        stream.extend_from_slice(&header.to_bytes());
        stream.extend_from_slice(payload);

        info!(
            "encoding {} into {}x{} image",
            format_file_size(payload.len() as u64),
            width,
            height
        );

        Ok(Self {
            pixels,
            cursor: BitCursor::new(),
            stream,
            written: 0,
            status: JobStatus::Idle,
        })
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn cursor(&self) -> BitCursor {
        self.cursor
    }

    fn percent(&self) -> u8 {
        (self.written * 100 / self.stream.len()).min(99) as u8
    }
}

impl Job for EncodeJob {
    type Output = PixelBuffer;

    fn step(&mut self, slice_pixels: usize) -> Result<Step<PixelBuffer>, StegoError> {
        match self.status {
            JobStatus::Idle => {
                self.status = JobStatus::WritingHeader;
                return Ok(Step::Continue(Progress::new(0, "Starting encoding...")));
            }
            JobStatus::WritingHeader | JobStatus::ProcessingPayload => {}
            _ => return Err(stepped_after_finish()),
        }

        let end = (self.written + bytes_per_slice(slice_pixels)).min(self.stream.len());
        let chunk = &self.stream[self.written..end];
        let count = BitWriter::new(&mut self.pixels, &mut self.cursor).write_bytes(chunk);
        self.written += count;
        if count < chunk.len() {
            // Capacity was checked up front, so this only trips on a bug.
            return Err(StegoError::CapacityExceeded {
                needed: self.stream.len() - HEADER_SIZE,
                capacity: capacity(self.pixels.width(), self.pixels.height()),
            });
        }

        if self.written >= HEADER_SIZE && self.status == JobStatus::WritingHeader {
            debug!("header written, payload starts at bit {}", self.cursor.bit_offset());
            self.status = JobStatus::ProcessingPayload;
        }

        if self.written == self.stream.len() {
            self.status = JobStatus::Complete;
            info!("encoding complete");
            return Ok(Step::Done(std::mem::take(&mut self.pixels)));
        }

        let percent = self.percent();
        Ok(Step::Continue(Progress::new(
            percent,
            format!("Encoding... {}%", percent),
        )))
    }

    fn fail(&mut self, err: &StegoError) {
        self.status = JobStatus::Failed(err.kind());
    }
}

/// Extracts and validates a payload from a carrier, one slice at a time.
pub struct DecodeJob<V> {
    pixels: PixelBuffer,
    cursor: BitCursor,
    header: [u8; HEADER_SIZE],
    header_read: usize,
    payload: Vec<u8>,
    payload_len: usize,
    max_payload: u32,
    validator: V,
    status: JobStatus,
}

impl<V: PayloadValidator> DecodeJob<V> {
    pub fn new(pixels: PixelBuffer, max_payload: u32, validator: V) -> Self {
        Self {
            pixels,
            cursor: BitCursor::new(),
            header: [0u8; HEADER_SIZE],
            header_read: 0,
            payload: Vec::new(),
            payload_len: 0,
            max_payload,
            validator,
            status: JobStatus::Idle,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn cursor(&self) -> BitCursor {
        self.cursor
    }

    /// Declared payload length, known once the header has been parsed.
    pub fn payload_len(&self) -> Option<usize> {
        (self.payload_len > 0).then_some(self.payload_len)
    }

    fn read_header(&mut self, budget: usize) -> Result<Step<ValidatedPayload>, StegoError> {
        if self.header_read < HEADER_SIZE {
            let end = (self.header_read + budget).min(HEADER_SIZE);
            let mut reader = BitReader::new(&self.pixels, &mut self.cursor);
            if !reader.read_exact(&mut self.header[self.header_read..end]) {
                // Too few pixels to even hold a header.
                return Err(StegoError::InvalidSignature);
            }
            self.header_read = end;

            let progress = if end < HEADER_SIZE {
                Progress::new(5, "Reading header...")
            } else {
                Progress::new(15, "Validating header...")
            };
            return Ok(Step::Continue(progress));
        }

        let header = Header::parse(&self.header, self.max_payload)?;
        let available = capacity(self.pixels.width(), self.pixels.height());
        if header.payload_len as usize > available {
            return Err(StegoError::InvalidDeclaredSize {
                size: header.payload_len,
                max: available.min(self.max_payload as usize) as u32,
            });
        }

        self.payload_len = header.payload_len as usize;
        self.payload = Vec::with_capacity(self.payload_len);
        self.status = JobStatus::ProcessingPayload;
        debug!(
            "header valid, {} payload bytes from bit {}",
            self.payload_len,
            self.cursor.bit_offset()
        );

        Ok(Step::Continue(Progress::new(
            25,
            format!("Extracting {}...", format_file_size(self.payload_len as u64)),
        )))
    }

    fn read_payload(&mut self, budget: usize) -> Result<Step<ValidatedPayload>, StegoError> {
        let want = budget.min(self.payload_len - self.payload.len());
        let mut reader = BitReader::new(&self.pixels, &mut self.cursor);
        for _ in 0..want {
            match reader.read_byte() {
                Some(byte) => self.payload.push(byte),
                None => {
                    return Err(StegoError::InvalidDeclaredSize {
                        size: self.payload_len as u32,
                        max: self.max_payload,
                    })
                }
            }
        }

        if self.payload.len() < self.payload_len {
            let percent = 25 + self.payload.len() * 70 / self.payload_len;
            return Ok(Step::Continue(Progress::new(
                percent.min(95) as u8,
                format!(
                    "Extracted {} of {}",
                    format_file_size(self.payload.len() as u64),
                    format_file_size(self.payload_len as u64)
                ),
            )));
        }

        self.status = JobStatus::Validating;
        Ok(Step::Continue(Progress::new(95, "Validating payload...")))
    }
}

impl<V: PayloadValidator> Job for DecodeJob<V> {
    type Output = ValidatedPayload;

    fn step(&mut self, slice_pixels: usize) -> Result<Step<ValidatedPayload>, StegoError> {
        let budget = bytes_per_slice(slice_pixels);
        match self.status {
            JobStatus::Idle => {
                self.status = JobStatus::ReadingHeader;
                Ok(Step::Continue(Progress::new(5, "Reading header...")))
            }
            JobStatus::ReadingHeader => self.read_header(budget),
            JobStatus::ProcessingPayload => self.read_payload(budget),
            JobStatus::Validating => {
                let payload = std::mem::take(&mut self.payload);
                let validated = self.validator.validate(payload)?;
                self.status = JobStatus::Complete;
                info!(
                    "extraction complete: {}",
                    format_file_size(validated.data.len() as u64)
                );
                Ok(Step::Done(validated))
            }
            JobStatus::WritingHeader | JobStatus::Complete | JobStatus::Failed(_) => {
                Err(stepped_after_finish())
            }
        }
    }

    fn fail(&mut self, err: &StegoError) {
        self.status = JobStatus::Failed(err.kind());
        // Partial output is never handed out.
        self.payload.clear();
    }
}
