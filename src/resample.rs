#[cfg(feature = "resampler")]
use std::collections::hash_map::{Entry, HashMap};

// Re-export rubato
#[cfg(feature = "resampler")]
pub use rubato;

#[cfg(feature = "resampler")]
use rubato::{
    FastFixedIn, PolynomialDegree, ResampleResult, Resampler, SincFixedIn,
    SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

#[cfg(feature = "fft-resampler")]
use rubato::FftFixedIn;

use crate::buffer::{BufferFactory, SampleBufferRead, SampleBufferWrite};
use crate::error::SampleBufferError;

/// Converts a sample buffer to a different sample rate.
///
/// The converted buffer is created through `factory`, so the converter never
/// decides which concrete buffer or store type is used.
pub trait RateConverter {
    fn convert<B, F>(
        &mut self,
        buffer: &B,
        sample_rate: f64,
        factory: F,
    ) -> Result<F::Buffer, SampleBufferError>
    where
        B: SampleBufferRead + ?Sized,
        F: BufferFactory;
}

/// Copy every frame of `buffer` into a new buffer with the same shape and
/// sample rate.
///
/// This can be used to move samples into a different precision or store.
pub fn copy_frames<B, F>(buffer: &B, mut factory: F) -> Result<F::Buffer, SampleBufferError>
where
    B: SampleBufferRead + ?Sized,
    F: BufferFactory,
{
    let mut output = factory.create_buffer(buffer.channels(), buffer.frames(), buffer.sample_rate())?;

    let mut frame = vec![0.0; buffer.channels()];
    for index in 0..buffer.frames() {
        buffer.frame_get_exact(index, &mut frame)?;
        output.frame_set_exact(index, &frame)?;
    }

    Ok(output)
}

/// The quality of the resampling algorithm to use.
#[cfg(feature = "resampler")]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResampleQuality {
    /// Low quality, fast performance
    ///
    /// More specifically, this uses the [`FastFixedIn`] resampler from
    /// rubato with an interpolation type of [`PolynomialDegree::Linear`]
    /// and a chunk size of `1024`.
    Low,
    /// Good quality, medium performance
    ///
    /// This is recommended for most applications.
    ///
    /// If the `fft-resampler` feature is enabled (which it is by default)
    /// and both sample rates are whole numbers, then this uses the
    /// `FftFixedIn` resampler from rubato with a chunk size of `1024` and
    /// 2 sub chunks.
    ///
    /// Otherwise this uses the [`FastFixedIn`] resampler from rubato with an
    /// interpolation type of [`PolynomialDegree::Quintic`] and a chunk size
    /// of `1024`.
    #[default]
    Normal,
    /// High quality, slow performance
    ///
    /// More specifically, this uses the [`SincFixedIn`] resampler from
    /// rubato with the following parameters:
    ///
    /// ```ignore
    /// SincInterpolationParameters {
    ///     sinc_len: 128,
    ///     f_cutoff: rubato::calculate_cutoff(128, WindowFunction::Blackman2),
    ///     interpolation: SincInterpolationType::Cubic,
    ///     oversampling_factor: 256,
    ///     window: WindowFunction::Blackman2,
    /// }
    /// ```
    High,
}

#[cfg(feature = "resampler")]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct ResamplerKey {
    source_rate: u64,
    target_rate: u64,
    channels: usize,
    quality: ResampleQuality,
}

#[cfg(feature = "resampler")]
enum ResamplerOwned {
    Fast(FastFixedIn<f64>),
    #[cfg(feature = "fft-resampler")]
    Fft(FftFixedIn<f64>),
    Sinc(SincFixedIn<f64>),
}

#[cfg(feature = "resampler")]
impl ResamplerOwned {
    fn reset(&mut self) {
        match self {
            Self::Fast(r) => r.reset(),
            #[cfg(feature = "fft-resampler")]
            Self::Fft(r) => r.reset(),
            Self::Sinc(r) => r.reset(),
        }
    }

    fn input_frames_next(&self) -> usize {
        match self {
            Self::Fast(r) => r.input_frames_next(),
            #[cfg(feature = "fft-resampler")]
            Self::Fft(r) => r.input_frames_next(),
            Self::Sinc(r) => r.input_frames_next(),
        }
    }

    fn input_frames_max(&self) -> usize {
        match self {
            Self::Fast(r) => r.input_frames_max(),
            #[cfg(feature = "fft-resampler")]
            Self::Fft(r) => r.input_frames_max(),
            Self::Sinc(r) => r.input_frames_max(),
        }
    }

    fn output_delay(&self) -> usize {
        match self {
            Self::Fast(r) => r.output_delay(),
            #[cfg(feature = "fft-resampler")]
            Self::Fft(r) => r.output_delay(),
            Self::Sinc(r) => r.output_delay(),
        }
    }

    fn output_frames_max(&self) -> usize {
        match self {
            Self::Fast(r) => r.output_frames_max(),
            #[cfg(feature = "fft-resampler")]
            Self::Fft(r) => r.output_frames_max(),
            Self::Sinc(r) => r.output_frames_max(),
        }
    }

    fn process_into_buffer<Vin: AsRef<[f64]>, Vout: AsMut<[f64]>>(
        &mut self,
        wave_in: &[Vin],
        wave_out: &mut [Vout],
    ) -> ResampleResult<(usize, usize)> {
        match self {
            Self::Fast(r) => r.process_into_buffer(wave_in, wave_out, None),
            #[cfg(feature = "fft-resampler")]
            Self::Fft(r) => r.process_into_buffer(wave_in, wave_out, None),
            Self::Sinc(r) => r.process_into_buffer(wave_in, wave_out, None),
        }
    }
}

/// A [`RateConverter`] backed by the resamplers of the rubato crate.
///
/// Resamplers are cached and re-used for every combination of sample rates,
/// channel count and quality that this converter has seen.
#[cfg(feature = "resampler")]
pub struct RubatoRateConverter {
    // Re-use resamplers to improve performance.
    resamplers: HashMap<ResamplerKey, ResamplerOwned>,
    quality: ResampleQuality,
}

#[cfg(feature = "resampler")]
impl RubatoRateConverter {
    pub fn new(quality: ResampleQuality) -> Self {
        Self {
            resamplers: HashMap::new(),
            quality,
        }
    }

    pub fn quality(&self) -> ResampleQuality {
        self.quality
    }

    pub fn set_quality(&mut self, quality: ResampleQuality) {
        self.quality = quality;
    }

    /// Drop all cached resamplers.
    pub fn clear_cache(&mut self) {
        self.resamplers.clear();
    }
}

#[cfg(feature = "resampler")]
impl Default for RubatoRateConverter {
    fn default() -> Self {
        Self::new(ResampleQuality::default())
    }
}

#[cfg(feature = "resampler")]
impl RateConverter for RubatoRateConverter {
    /// Resample `buffer` to `sample_rate`.
    ///
    /// The converted buffer holds `ceil(frames * sample_rate / source_rate)`
    /// frames, with the delay of the resampler removed. If the rates are
    /// equal, the frames are copied unchanged.
    fn convert<B, F>(
        &mut self,
        buffer: &B,
        sample_rate: f64,
        mut factory: F,
    ) -> Result<F::Buffer, SampleBufferError>
    where
        B: SampleBufferRead + ?Sized,
        F: BufferFactory,
    {
        let source_rate = buffer.sample_rate();
        for rate in [source_rate, sample_rate] {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(SampleBufferError::InvalidSampleRate(rate));
            }
        }

        let channels = buffer.channels();
        if channels == 0 {
            return Err(SampleBufferError::InvalidChannels(channels));
        }

        if source_rate == sample_rate {
            return copy_frames(buffer, factory);
        }

        let total_frames = resampled_len(buffer.frames(), source_rate, sample_rate)?;

        // Size errors surface here, before any resampler state is allocated.
        let mut output = factory.create_buffer(channels, total_frames, sample_rate)?;

        let resampler = get_resampler(
            &mut self.resamplers,
            self.quality,
            source_rate,
            sample_rate,
            channels,
        )?;

        resample(resampler, buffer, &mut output, total_frames)?;

        Ok(output)
    }
}

/// The number of frames `frames` source frames occupy at the target rate,
/// rounded up.
#[cfg(feature = "resampler")]
fn resampled_len(frames: usize, source_rate: f64, target_rate: f64) -> Result<usize, SampleBufferError> {
    let len = (frames as f64 * (target_rate / source_rate)).ceil();

    // `usize::MAX as f64` rounds up, so the comparison is strict.
    if !(len.is_finite() && len < usize::MAX as f64) {
        return Err(SampleBufferError::Overflow);
    }

    Ok(len as usize)
}

/// Run every frame of `buffer` through `resampler`, writing the first
/// `total_frames` delay-compensated frames into `output`.
#[cfg(feature = "resampler")]
fn resample<B, O>(
    resampler: &mut ResamplerOwned,
    buffer: &B,
    output: &mut O,
    total_frames: usize,
) -> Result<(), SampleBufferError>
where
    B: SampleBufferRead + ?Sized,
    O: SampleBufferWrite,
{
    let channels = buffer.channels();
    let in_frames = buffer.frames();

    resampler.reset();

    let mut tmp_in_buf = vec![vec![0.0; resampler.input_frames_max()]; channels];
    let mut tmp_out_buf = vec![vec![0.0; resampler.output_frames_max()]; channels];

    let mut frame = vec![0.0; channels];
    let mut read_frames = 0;
    let mut written_frames = 0;
    let mut delay_frames_left = resampler.output_delay();

    while written_frames < total_frames {
        let desired_in_frames = resampler.input_frames_next();

        // Fill the temporary input buffer, zero-padding past the end.
        for i in 0..desired_in_frames {
            if read_frames < in_frames {
                buffer.frame_get_exact(read_frames, &mut frame)?;
                read_frames += 1;
            } else {
                frame.fill(0.0);
            }

            for (tmp_ch, value) in tmp_in_buf.iter_mut().zip(frame.iter()) {
                tmp_ch[i] = *value;
            }
        }

        let (_, output_frames) = resampler.process_into_buffer(&tmp_in_buf, &mut tmp_out_buf)?;

        if delay_frames_left >= output_frames {
            // Wait until the first non-delayed output sample.
            delay_frames_left -= output_frames;
            continue;
        }

        // Frames past `total_frames` are padding and are discarded.
        let end = output_frames.min(delay_frames_left + (total_frames - written_frames));
        for i in delay_frames_left..end {
            for (value, res_ch) in frame.iter_mut().zip(tmp_out_buf.iter()) {
                *value = res_ch[i];
            }
            output.frame_set_exact(written_frames, &frame)?;
            written_frames += 1;
        }
        delay_frames_left = 0;
    }

    Ok(())
}

#[cfg(feature = "resampler")]
fn get_resampler(
    resamplers: &mut HashMap<ResamplerKey, ResamplerOwned>,
    quality: ResampleQuality,
    source_rate: f64,
    target_rate: f64,
    channels: usize,
) -> Result<&mut ResamplerOwned, SampleBufferError> {
    let key = ResamplerKey {
        source_rate: source_rate.to_bits(),
        target_rate: target_rate.to_bits(),
        channels,
        quality,
    };

    match resamplers.entry(key) {
        Entry::Occupied(entry) => Ok(entry.into_mut()),
        Entry::Vacant(entry) => {
            log::debug!(
                "Creating {:?} quality resampler from {} Hz to {} Hz with {} channels",
                quality,
                source_rate,
                target_rate,
                channels
            );

            let resampler = new_resampler(quality, source_rate, target_rate, channels)?;
            Ok(entry.insert(resampler))
        }
    }
}

#[cfg(feature = "resampler")]
fn new_resampler(
    quality: ResampleQuality,
    source_rate: f64,
    target_rate: f64,
    channels: usize,
) -> Result<ResamplerOwned, SampleBufferError> {
    const CHUNK_SIZE: usize = 1024;

    let ratio = target_rate / source_rate;

    let resampler = match quality {
        ResampleQuality::Low => ResamplerOwned::Fast(FastFixedIn::new(
            ratio,
            1.0,
            PolynomialDegree::Linear,
            CHUNK_SIZE,
            channels,
        )?),
        ResampleQuality::Normal => {
            // The FFT resampler only handles whole-number rates.
            #[cfg(feature = "fft-resampler")]
            {
                if source_rate.fract() == 0.0 && target_rate.fract() == 0.0 {
                    return Ok(ResamplerOwned::Fft(FftFixedIn::new(
                        source_rate as usize,
                        target_rate as usize,
                        CHUNK_SIZE,
                        2,
                        channels,
                    )?));
                }
            }

            ResamplerOwned::Fast(FastFixedIn::new(
                ratio,
                1.0,
                PolynomialDegree::Quintic,
                CHUNK_SIZE,
                channels,
            )?)
        }
        ResampleQuality::High => {
            let sinc_len = 128;
            let oversampling_factor = 256;
            let interpolation = SincInterpolationType::Cubic;
            let window = WindowFunction::Blackman2;

            let f_cutoff = rubato::calculate_cutoff(sinc_len, window);
            let params = SincInterpolationParameters {
                sinc_len,
                f_cutoff,
                interpolation,
                oversampling_factor,
                window,
            };

            ResamplerOwned::Sinc(SincFixedIn::new(ratio, 1.0, params, CHUNK_SIZE, channels)?)
        }
    };

    Ok(resampler)
}
