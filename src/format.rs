use symphonia::core::codecs::{self, CodecParameters, CodecType};

use crate::error::SampleBufferError;
use crate::DEFAULT_SAMPLE_RATE;

/// How the bits of a raw PCM scalar are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Signed,
    Unsigned,
    Float,
}

/// The byte order of multi-byte scalars in a raw PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// The byte order of the target platform.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Endian = Endian::Little;

    /// The byte order of the target platform.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Endian = Endian::Big;

    pub fn is_big(self) -> bool {
        self == Endian::Big
    }
}

/// Every raw sample layout the decoder understands.
///
/// 24-bit variants are packed as three bytes with no padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    U8,
    S8,
    U16,
    S16,
    U24,
    S24,
    U32,
    S32,
    F32,
    U64,
    S64,
    F64,
}

impl SampleFormat {
    /// Resolve a bit depth and encoding pair into a sample format.
    ///
    /// Float samples are only meaningful at 32 and 64 bits.
    pub fn from_bits(bits_per_sample: u32, encoding: Encoding) -> Result<Self, SampleBufferError> {
        use Encoding::*;

        match (bits_per_sample, encoding) {
            (8, Unsigned) => Ok(SampleFormat::U8),
            (8, Signed) => Ok(SampleFormat::S8),
            (16, Unsigned) => Ok(SampleFormat::U16),
            (16, Signed) => Ok(SampleFormat::S16),
            (24, Unsigned) => Ok(SampleFormat::U24),
            (24, Signed) => Ok(SampleFormat::S24),
            (32, Unsigned) => Ok(SampleFormat::U32),
            (32, Signed) => Ok(SampleFormat::S32),
            (32, Float) => Ok(SampleFormat::F32),
            (64, Unsigned) => Ok(SampleFormat::U64),
            (64, Signed) => Ok(SampleFormat::S64),
            (64, Float) => Ok(SampleFormat::F64),
            _ => Err(SampleBufferError::UnsupportedFormat {
                bits_per_sample,
                encoding,
            }),
        }
    }

    /// The number of bytes used by one raw scalar.
    pub fn sample_size(&self) -> usize {
        match self {
            SampleFormat::U8 | SampleFormat::S8 => 1,
            SampleFormat::U16 | SampleFormat::S16 => 2,
            SampleFormat::U24 | SampleFormat::S24 => 3,
            SampleFormat::U32 | SampleFormat::S32 | SampleFormat::F32 => 4,
            SampleFormat::U64 | SampleFormat::S64 | SampleFormat::F64 => 8,
        }
    }

    pub fn bits_per_sample(&self) -> u32 {
        self.sample_size() as u32 * 8
    }

    pub fn encoding(&self) -> Encoding {
        match self {
            SampleFormat::U8
            | SampleFormat::U16
            | SampleFormat::U24
            | SampleFormat::U32
            | SampleFormat::U64 => Encoding::Unsigned,
            SampleFormat::S8
            | SampleFormat::S16
            | SampleFormat::S24
            | SampleFormat::S32
            | SampleFormat::S64 => Encoding::Signed,
            SampleFormat::F32 | SampleFormat::F64 => Encoding::Float,
        }
    }
}

/// Describes a raw PCM byte stream handed to or produced by the codecs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PcmFormat {
    pub bits_per_sample: u32,
    pub encoding: Encoding,
    pub endian: Endian,
    pub channels: usize,
    pub sample_rate: f64,
}

impl PcmFormat {
    pub fn new(
        bits_per_sample: u32,
        encoding: Encoding,
        endian: Endian,
        channels: usize,
        sample_rate: f64,
    ) -> Self {
        Self {
            bits_per_sample,
            encoding,
            endian,
            channels,
            sample_rate,
        }
    }

    /// The format produced by [`crate::encode`]: interleaved 32-bit IEEE
    /// float in native byte order.
    pub fn float32_native(channels: usize, sample_rate: f64) -> Self {
        Self::new(32, Encoding::Float, Endian::NATIVE, channels, sample_rate)
    }

    pub fn sample_format(&self) -> Result<SampleFormat, SampleBufferError> {
        SampleFormat::from_bits(self.bits_per_sample, self.encoding)
    }

    /// The size of one raw scalar in bytes.
    pub fn sample_size(&self) -> Result<usize, SampleBufferError> {
        Ok(self.sample_format()?.sample_size())
    }

    /// The size of one interleaved frame in bytes.
    pub fn frame_size(&self) -> Result<usize, SampleBufferError> {
        if self.channels == 0 {
            return Err(SampleBufferError::InvalidChannels(self.channels));
        }

        self.sample_size()?
            .checked_mul(self.channels)
            .ok_or(SampleBufferError::Overflow)
    }

    /// Build a descriptor from the codec parameters of a track found by a
    /// symphonia format reader.
    ///
    /// Only the raw linear `CODEC_TYPE_PCM_*` codecs can be described, any
    /// other codec fails with [`SampleBufferError::UnsupportedCodec`]. If the
    /// parameters carry no sample rate, [`DEFAULT_SAMPLE_RATE`] is assumed.
    pub fn from_codec_params(params: &CodecParameters) -> Result<Self, SampleBufferError> {
        let sample_format = sample_format_of_codec(params.codec)
            .ok_or(SampleBufferError::UnsupportedCodec(params.codec))?;
        let endian = endian_of_codec(params.codec);

        let sample_rate = match params.sample_rate {
            Some(sample_rate) => f64::from(sample_rate),
            None => {
                log::warn!(
                    "Could not find sample rate of PCM track. Assuming a sample rate of {}",
                    DEFAULT_SAMPLE_RATE
                );
                DEFAULT_SAMPLE_RATE
            }
        };

        let channels = params
            .channels
            .map(|c| c.count())
            .ok_or(SampleBufferError::InvalidChannels(0))?;

        Ok(Self::new(
            sample_format.bits_per_sample(),
            sample_format.encoding(),
            endian,
            channels,
            sample_rate,
        ))
    }
}

fn sample_format_of_codec(codec: CodecType) -> Option<SampleFormat> {
    use codecs::*;

    Some(match codec {
        CODEC_TYPE_PCM_U8 => SampleFormat::U8,
        CODEC_TYPE_PCM_S8 => SampleFormat::S8,
        CODEC_TYPE_PCM_U16LE | CODEC_TYPE_PCM_U16BE => SampleFormat::U16,
        CODEC_TYPE_PCM_S16LE | CODEC_TYPE_PCM_S16BE => SampleFormat::S16,
        CODEC_TYPE_PCM_U24LE | CODEC_TYPE_PCM_U24BE => SampleFormat::U24,
        CODEC_TYPE_PCM_S24LE | CODEC_TYPE_PCM_S24BE => SampleFormat::S24,
        CODEC_TYPE_PCM_U32LE | CODEC_TYPE_PCM_U32BE => SampleFormat::U32,
        CODEC_TYPE_PCM_S32LE | CODEC_TYPE_PCM_S32BE => SampleFormat::S32,
        CODEC_TYPE_PCM_F32LE | CODEC_TYPE_PCM_F32BE => SampleFormat::F32,
        CODEC_TYPE_PCM_F64LE | CODEC_TYPE_PCM_F64BE => SampleFormat::F64,
        _ => return None,
    })
}

fn endian_of_codec(codec: CodecType) -> Endian {
    use codecs::*;

    match codec {
        CODEC_TYPE_PCM_U16BE
        | CODEC_TYPE_PCM_S16BE
        | CODEC_TYPE_PCM_U24BE
        | CODEC_TYPE_PCM_S24BE
        | CODEC_TYPE_PCM_U32BE
        | CODEC_TYPE_PCM_S32BE
        | CODEC_TYPE_PCM_F32BE
        | CODEC_TYPE_PCM_F64BE => Endian::Big,
        // Single byte samples have no byte order.
        _ => Endian::Little,
    }
}

#[cfg(test)]
mod tests {
    use symphonia::core::audio::Channels;

    use super::*;

    #[test]
    fn float_requires_wide_samples() {
        for bits in [8, 16, 24] {
            assert!(matches!(
                SampleFormat::from_bits(bits, Encoding::Float),
                Err(SampleBufferError::UnsupportedFormat {
                    encoding: Encoding::Float,
                    ..
                })
            ));
        }

        assert_eq!(
            SampleFormat::from_bits(32, Encoding::Float).unwrap(),
            SampleFormat::F32
        );
        assert_eq!(
            SampleFormat::from_bits(64, Encoding::Float).unwrap(),
            SampleFormat::F64
        );
    }

    #[test]
    fn unsupported_bit_depths() {
        for bits in [0, 1, 4, 12, 20, 48, 128] {
            for encoding in [Encoding::Signed, Encoding::Unsigned, Encoding::Float] {
                assert!(matches!(
                    SampleFormat::from_bits(bits, encoding),
                    Err(SampleBufferError::UnsupportedFormat { bits_per_sample, .. })
                        if bits_per_sample == bits
                ));
            }
        }
    }

    #[test]
    fn sample_format_describes_itself() {
        let s24 = SampleFormat::from_bits(24, Encoding::Signed).unwrap();
        assert_eq!(s24, SampleFormat::S24);
        assert_eq!(s24.sample_size(), 3);
        assert_eq!(s24.bits_per_sample(), 24);
        assert_eq!(s24.encoding(), Encoding::Signed);

        let u64_format = SampleFormat::from_bits(64, Encoding::Unsigned).unwrap();
        assert_eq!(u64_format.sample_size(), 8);
        assert_eq!(u64_format.encoding(), Encoding::Unsigned);
    }

    #[test]
    fn frame_size() {
        let format = PcmFormat::new(24, Encoding::Signed, Endian::Little, 2, 48000.0);
        assert_eq!(format.frame_size().unwrap(), 6);

        let format = PcmFormat::new(16, Encoding::Signed, Endian::Little, 0, 48000.0);
        assert!(matches!(
            format.frame_size(),
            Err(SampleBufferError::InvalidChannels(0))
        ));

        let format = PcmFormat::new(64, Encoding::Float, Endian::Big, usize::MAX, 48000.0);
        assert!(matches!(format.frame_size(), Err(SampleBufferError::Overflow)));
    }

    #[test]
    fn float32_native_descriptor() {
        let format = PcmFormat::float32_native(2, 44100.0);
        assert_eq!(format.bits_per_sample, 32);
        assert_eq!(format.encoding, Encoding::Float);
        assert_eq!(format.endian, Endian::NATIVE);
        assert_eq!(format.frame_size().unwrap(), 8);
    }

    #[test]
    fn from_codec_params() {
        let mut params = CodecParameters::new();
        params
            .for_codec(codecs::CODEC_TYPE_PCM_S24BE)
            .with_sample_rate(96000)
            .with_channels(Channels::FRONT_LEFT | Channels::FRONT_RIGHT);

        let format = PcmFormat::from_codec_params(&params).unwrap();
        assert_eq!(format.bits_per_sample, 24);
        assert_eq!(format.encoding, Encoding::Signed);
        assert_eq!(format.endian, Endian::Big);
        assert_eq!(format.channels, 2);
        assert_eq!(format.sample_rate, 96000.0);
    }

    #[test]
    fn from_codec_params_defaults_sample_rate() {
        let mut params = CodecParameters::new();
        params
            .for_codec(codecs::CODEC_TYPE_PCM_U8)
            .with_channels(Channels::FRONT_CENTRE);

        let format = PcmFormat::from_codec_params(&params).unwrap();
        assert_eq!(format.encoding, Encoding::Unsigned);
        assert_eq!(format.channels, 1);
        assert_eq!(format.sample_rate, DEFAULT_SAMPLE_RATE);
    }

    #[test]
    fn from_codec_params_rejects_companded_audio() {
        let mut params = CodecParameters::new();
        params
            .for_codec(codecs::CODEC_TYPE_PCM_ALAW)
            .with_sample_rate(8000)
            .with_channels(Channels::FRONT_CENTRE);

        let e = PcmFormat::from_codec_params(&params).unwrap_err();
        assert!(matches!(
            e,
            SampleBufferError::UnsupportedCodec(codec) if codec == codecs::CODEC_TYPE_PCM_ALAW
        ));
        assert!(e.to_string().contains("codec not supported"));
    }

    #[test]
    fn from_codec_params_requires_channels() {
        let mut params = CodecParameters::new();
        params
            .for_codec(codecs::CODEC_TYPE_PCM_F32LE)
            .with_sample_rate(48000);

        assert!(matches!(
            PcmFormat::from_codec_params(&params),
            Err(SampleBufferError::InvalidChannels(0))
        ));
    }
}
