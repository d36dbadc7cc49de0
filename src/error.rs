use std::error::Error;
use std::fmt;

use symphonia::core::codecs::CodecType;

use crate::format::Encoding;

#[derive(Debug)]
pub enum SampleBufferError {
    /// The channel count was outside of [`crate::VALID_CHANNELS`].
    InvalidChannels(usize),
    /// The frame count was outside of [`crate::VALID_FRAMES`].
    InvalidFrames(usize),
    /// The sample rate was not a finite, positive number.
    InvalidSampleRate(f64),
    /// The allocator returned a store whose size does not match the
    /// requested size in bytes.
    Misallocation { expected: usize, received: usize },
    /// A frame index was `>= frames()`.
    FrameOutOfRange { index: usize, frames: usize },
    /// The number of supplied channel values does not match the channel
    /// count of the buffer.
    ChannelMismatch { expected: usize, received: usize },
    /// The combination of bit depth and encoding cannot be decoded.
    UnsupportedFormat {
        bits_per_sample: u32,
        encoding: Encoding,
    },
    /// The codec parameters describe a codec other than uncompressed
    /// linear PCM.
    UnsupportedCodec(CodecType),
    /// A size computation exceeded the range of `usize`.
    Overflow,
    /// The raw byte stream ended before a scalar could be read.
    ReadError(std::io::Error),
    #[cfg(feature = "resampler")]
    ResamplerConstruction(rubato::ResamplerConstructionError),
    #[cfg(feature = "resampler")]
    ErrorWhileResampling(rubato::ResampleError),
}

impl Error for SampleBufferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SampleBufferError::ReadError(e) => Some(e),
            #[cfg(feature = "resampler")]
            SampleBufferError::ResamplerConstruction(e) => Some(e),
            #[cfg(feature = "resampler")]
            SampleBufferError::ErrorWhileResampling(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for SampleBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SampleBufferError::*;

        match self {
            InvalidChannels(channels) => write!(
                f,
                "Failed to create sample buffer: invalid channel count | {} is not in [1, {}]",
                channels,
                usize::MAX
            ),
            InvalidFrames(frames) => write!(
                f,
                "Failed to create sample buffer: invalid frame count | {} is not in [1, {}]",
                frames,
                usize::MAX
            ),
            InvalidSampleRate(rate) => write!(
                f,
                "Failed to create sample buffer: invalid sample rate | {} is not a positive number",
                rate
            ),
            Misallocation { expected, received } => write!(
                f,
                "Failed to create sample buffer: buffer size incorrect | expected {} octets, received {} octets",
                expected, received
            ),
            FrameOutOfRange { index, frames } => write!(
                f,
                "Frame index out of range | index {} is not in the frame range [0, {})",
                index, frames
            ),
            ChannelMismatch { expected, received } => write!(
                f,
                "Incorrect channel count | expected {} channel values, received {}",
                expected, received
            ),
            UnsupportedFormat {
                bits_per_sample,
                encoding,
            } => write!(
                f,
                "Failed to decode PCM data: format not supported | {}-bit {:?} samples",
                bits_per_sample, encoding
            ),
            UnsupportedCodec(codec) => write!(
                f,
                "Failed to describe PCM data: codec not supported | {:?} is not linear PCM",
                codec
            ),
            Overflow => write!(f, "Sample buffer size computation overflowed"),
            ReadError(e) => write!(f, "Failed to decode PCM data: error while reading | {}", e),
            #[cfg(feature = "resampler")]
            ResamplerConstruction(e) => write!(
                f,
                "Failed to convert sample rate: could not create resampler | {}",
                e
            ),
            #[cfg(feature = "resampler")]
            ErrorWhileResampling(e) => write!(
                f,
                "Failed to convert sample rate: error while resampling | {}",
                e
            ),
        }
    }
}

impl From<std::io::Error> for SampleBufferError {
    fn from(e: std::io::Error) -> Self {
        SampleBufferError::ReadError(e)
    }
}

#[cfg(feature = "resampler")]
impl From<rubato::ResamplerConstructionError> for SampleBufferError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        SampleBufferError::ResamplerConstruction(e)
    }
}

#[cfg(feature = "resampler")]
impl From<rubato::ResampleError> for SampleBufferError {
    fn from(e: rubato::ResampleError) -> Self {
        SampleBufferError::ErrorWhileResampling(e)
    }
}
