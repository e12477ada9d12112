//! LSB embedding engine.
//!
//! A payload is prefixed with a 32-byte [`Header`] and written into the
//! least significant bit of the R, G and B channels of a [`PixelBuffer`].
//! Work is split into [`EncodeJob`] and [`DecodeJob`], both advanced one
//! slice at a time by a [`Scheduler`]. Extracted payloads go through a
//! [`PayloadValidator`] before they are returned.
//!
//! The image container (PNG/JPEG) is handled separately in [`codec`].

pub mod bits;
pub mod capacity;
pub mod codec;
pub mod error;
pub mod header;
pub mod job;
pub mod pixels;
pub mod scheduler;
pub mod validator;

pub use bits::{BitCursor, BitReader, BitWriter};
pub use capacity::capacity;
pub use codec::OutputFormat;
pub use error::{ErrorKind, StegoError};
pub use header::{Header, HEADER_SIGNATURE, HEADER_SIZE};
pub use job::{DecodeJob, EncodeJob, JobStatus};
pub use pixels::PixelBuffer;
pub use scheduler::{CancelToken, Job, NoProgress, Progress, ProgressSink, Scheduler, Step};
pub use validator::{
    AcceptAll, ArchiveKind, ArchiveValidator, Correction, PayloadValidator, ValidatedPayload,
};

/// Default ceiling for payload size: 50 MiB.
pub const MAX_PAYLOAD_SIZE: u32 = 50 * 1024 * 1024;

/// Embeds `payload` into `pixels` and returns the mutated buffer.
pub fn embed(
    pixels: PixelBuffer,
    payload: &[u8],
    scheduler: &Scheduler,
    sink: &mut dyn ProgressSink,
) -> Result<PixelBuffer, StegoError> {
    let mut job = EncodeJob::new(pixels, payload, MAX_PAYLOAD_SIZE)?;
    scheduler.run(&mut job, sink)
}

/// Extracts the payload embedded in `pixels` and runs it through `validator`.
pub fn extract<V: PayloadValidator>(
    pixels: PixelBuffer,
    validator: V,
    scheduler: &Scheduler,
    sink: &mut dyn ProgressSink,
) -> Result<ValidatedPayload, StegoError> {
    let mut job = DecodeJob::new(pixels, MAX_PAYLOAD_SIZE, validator);
    scheduler.run(&mut job, sink)
}
