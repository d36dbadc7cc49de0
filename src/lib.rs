use std::ops::RangeInclusive;

pub mod buffer;
pub mod convert;
pub mod decode;
pub mod encode;
pub mod error;
pub mod format;
pub mod resample;
pub mod store;

// Re-export symphonia
pub use symphonia;

pub use buffer::{
    BufferFactory, SampleBuffer, SampleBufferF32, SampleBufferF64, SampleBufferRead,
    SampleBufferWrite,
};
pub use decode::decode;
pub use encode::{encode, EncodedPcm};
pub use error::SampleBufferError;
pub use format::{Encoding, Endian, PcmFormat, SampleFormat};
pub use resample::{copy_frames, RateConverter};
pub use store::{SampleStore, Scalar};

#[cfg(feature = "resampler")]
pub use resample::{rubato, ResampleQuality, RubatoRateConverter};

/// The range of channel counts a sample buffer accepts.
pub const VALID_CHANNELS: RangeInclusive<usize> = 1..=usize::MAX;

/// The range of frame counts a sample buffer accepts.
pub const VALID_FRAMES: RangeInclusive<usize> = 1..=usize::MAX;

/// The sample rate assumed when codec parameters do not carry one.
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// Used to load raw PCM data into sample buffers, optionally converting
/// the sample rate on the way.
pub struct PcmLoader {
    #[cfg(feature = "resampler")]
    converter: RubatoRateConverter,
}

impl PcmLoader {
    /// Construct a new PCM loader.
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "resampler")]
            converter: RubatoRateConverter::default(),
        }
    }

    /// Decode raw PCM data into a new sample buffer.
    ///
    /// * `bytes` - The raw interleaved PCM data.
    /// * `format` - Describes the layout of `bytes`.
    /// * `target_sample_rate` - If this is `Some`, then the data will be resampled to that
    /// sample rate. (No resampling will occur if the data's sample rate is already
    /// the target sample rate). If this is `None`, then the data will not be resampled
    /// and it will stay its original sample rate.
    /// * `resample_quality` - The quality of the resampler to use if the `target_sample_rate`
    /// doesn't match the source sample rate.
    ///     - Has no effect if `target_sample_rate` is `None`.
    /// * `factory` - Creates the returned buffer.
    pub fn load<F: BufferFactory>(
        &mut self,
        bytes: &[u8],
        format: &PcmFormat,
        #[cfg(feature = "resampler")] target_sample_rate: Option<f64>,
        #[cfg(feature = "resampler")] resample_quality: ResampleQuality,
        factory: F,
    ) -> Result<F::Buffer, SampleBufferError> {
        #[cfg(feature = "resampler")]
        if let Some(target_sample_rate) = target_sample_rate {
            if format.sample_rate != target_sample_rate {
                // Resampling is needed.

                let decoded = decode::decode(bytes, format, SampleBufferF64::heap)?;

                self.converter.set_quality(resample_quality);
                return self.converter.convert(&decoded, target_sample_rate, factory);
            }
        }

        decode::decode(bytes, format, factory)
    }
}

impl Default for PcmLoader {
    fn default() -> Self {
        Self::new()
    }
}
