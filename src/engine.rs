//! File-level encode and decode on top of the embedding engine.
//!
//! An [`Engine`] holds the configuration and allows at most one encode and
//! one decode job at a time. Everything a job needs lives in the job
//! itself; the engine only validates inputs, runs the scheduler and
//! converts between image files and pixel buffers.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use log::info;

use crate::config::Config;
use crate::stego::codec::{encode_pixels, image_format_from_path, load_pixels};
use crate::stego::{
    ArchiveKind, ArchiveValidator, CancelToken, Correction, DecodeJob, EncodeJob, PixelBuffer,
    ProgressSink, Scheduler, StegoError, ValidatedPayload,
};

/// Default file name for an extracted archive.
pub const EXTRACTED_FILE_NAME: &str = "extracted_file.zip";

/// Accepted payload file extension.
pub const PAYLOAD_EXTENSION: &str = "zip";

/// A payload recovered from a carrier image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub data: Vec<u8>,
    pub kind: ArchiveKind,
    /// Repair applied to make the signature valid, if any.
    pub correction: Option<Correction>,
}

/// Releases a busy flag when dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool, what: &'static str) -> Result<Self, StegoError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StegoError::Busy(what))?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Encode/decode context scoped to a set of operations.
#[derive(Debug, Default)]
pub struct Engine {
    config: Config,
    cancel: Option<CancelToken>,
    encoding: AtomicBool,
    decoding: AtomicBool,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel: None,
            encoding: AtomicBool::new(false),
            decoding: AtomicBool::new(false),
        }
    }

    /// Attaches a cancellation token to every job run by this engine.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn scheduler(&self) -> Scheduler {
        let scheduler = Scheduler::new(self.config.slice_pixels);
        match &self.cancel {
            Some(token) => scheduler.with_cancel(token.clone()),
            None => scheduler,
        }
    }

    /// Rejects image files too large to be accepted at all.
    fn check_image_size(&self, len: usize) -> Result<(), StegoError> {
        if len > self.config.max_payload_size as usize {
            return Err(StegoError::UnsupportedInputFormat(format!(
                "image file too large ({} bytes)",
                len
            )));
        }
        Ok(())
    }

    fn check_dimensions(&self, pixels: &PixelBuffer) -> Result<(), StegoError> {
        let (width, height) = pixels.dimensions();
        let min = self.config.min_image_dimension;
        if width < min || height < min {
            return Err(StegoError::ImageTooSmall { width, height, min });
        }
        Ok(())
    }

    /// Hides `payload` in the image encoded by `cover`, returning the
    /// output image in the configured format.
    pub fn encode_bytes(
        &self,
        cover: &[u8],
        payload: &[u8],
        sink: &mut dyn ProgressSink,
    ) -> Result<Vec<u8>, StegoError> {
        let _guard = BusyGuard::acquire(&self.encoding, "encode")?;

        self.check_image_size(cover.len())?;
        let pixels = load_pixels(cover)?;
        self.check_dimensions(&pixels)?;

        let mut job = EncodeJob::new(pixels, payload, self.config.max_payload_size)?;
        let pixels = self.scheduler().run(&mut job, sink)?;

        let bytes = encode_pixels(pixels, self.config.output_format, self.config.jpeg_quality)?;
        sink.report(100, "Encoding complete!");
        Ok(bytes)
    }

    /// Recovers the archive hidden in the image encoded by `stego`.
    pub fn decode_bytes(
        &self,
        stego: &[u8],
        sink: &mut dyn ProgressSink,
    ) -> Result<DecodedPayload, StegoError> {
        let _guard = BusyGuard::acquire(&self.decoding, "decode")?;

        self.check_image_size(stego.len())?;
        let pixels = load_pixels(stego)?;

        let validator = ArchiveValidator::new(self.config.auto_correct);
        let mut job = DecodeJob::new(pixels, self.config.max_payload_size, validator);
        let ValidatedPayload {
            data,
            kind,
            correction,
        } = self.scheduler().run(&mut job, sink)?;

        sink.report(100, "Extraction complete!");
        Ok(DecodedPayload {
            data,
            kind: kind.unwrap_or(ArchiveKind::LocalFile),
            correction,
        })
    }

    /// Hides the archive at `payload` in the image at `cover` and writes
    /// the result to `output` (or `hidden_<cover stem>.<ext>` next to the
    /// cover). Returns the path written.
    pub fn encode_file(
        &self,
        cover: &Path,
        payload: &Path,
        output: Option<&Path>,
        sink: &mut dyn ProgressSink,
    ) -> Result<PathBuf, StegoError> {
        image_format_from_path(cover)?;
        validate_payload_path(payload)?;

        let payload_len = fs::metadata(payload)?.len();
        if payload_len > u64::from(self.config.max_payload_size) {
            return Err(StegoError::PayloadTooLarge {
                size: payload_len as usize,
                max: self.config.max_payload_size as usize,
            });
        }

        let cover_bytes = fs::read(cover)?;
        let payload_bytes = fs::read(payload)?;
        let encoded = self.encode_bytes(&cover_bytes, &payload_bytes, sink)?;

        let output = match output {
            Some(path) => path.to_path_buf(),
            None => default_output_path(cover, self.config.output_format.extension()),
        };
        fs::write(&output, encoded)?;
        info!("wrote {}", output.display());
        Ok(output)
    }

    /// Recovers the archive hidden in the image at `stego` and writes it to
    /// `output` (or `extracted_file.zip` in the current directory).
    pub fn decode_file(
        &self,
        stego: &Path,
        output: Option<&Path>,
        sink: &mut dyn ProgressSink,
    ) -> Result<(PathBuf, DecodedPayload), StegoError> {
        image_format_from_path(stego)?;
        let stego_bytes = fs::read(stego)?;
        let decoded = self.decode_bytes(&stego_bytes, sink)?;

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(EXTRACTED_FILE_NAME));
        fs::write(&output, &decoded.data)?;
        info!("wrote {}", output.display());
        Ok((output, decoded))
    }
}

/// Payload files must be ZIP archives by extension.
pub fn validate_payload_path(path: &Path) -> Result<(), StegoError> {
    let is_zip = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(PAYLOAD_EXTENSION))
        .unwrap_or(false);

    if !is_zip {
        return Err(StegoError::UnsupportedInputFormat(format!(
            "{}: please select a valid ZIP file",
            path.display()
        )));
    }
    Ok(())
}

/// `hidden_<stem>.<extension>` in the cover image's directory.
pub fn default_output_path(cover: &Path, extension: &str) -> PathBuf {
    let stem = cover
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("image");
    cover.with_file_name(format!("hidden_{}.{}", stem, extension))
}
