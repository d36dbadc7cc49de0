use std::io;

use symphonia::core::io::{BufReader, ReadBytes};
use symphonia::core::sample::u24;

use crate::buffer::{BufferFactory, SampleBufferWrite};
use crate::convert;
use crate::error::SampleBufferError;
use crate::format::{PcmFormat, SampleFormat};

/// Decode raw interleaved PCM data into a new sample buffer.
///
/// * `bytes` - The raw PCM data, laid out as described by `format`.
/// * `format` - Describes the bit depth, encoding, byte order, channel count
/// and sample rate of `bytes`.
/// * `factory` - Creates the destination buffer. It is called exactly once
/// with `(format.channels, frames, format.sample_rate)`.
///
/// Integer samples are normalized into the range `[-1.0, 1.0]`. Float
/// samples are passed through unchanged. If `bytes` ends with a partial
/// frame, that frame is dropped.
///
/// No buffer is returned if the format is unsupported or if the factory
/// fails (for example because `bytes` does not contain a single complete
/// frame).
pub fn decode<F: BufferFactory>(
    bytes: &[u8],
    format: &PcmFormat,
    mut factory: F,
) -> Result<F::Buffer, SampleBufferError> {
    let sample_format = format.sample_format()?;
    let frame_size = format.frame_size()?;

    let frames = bytes.len() / frame_size;
    let trailing = bytes.len() % frame_size;
    if trailing != 0 {
        log::debug!(
            "Dropping {} trailing bytes of a partial frame ({} bytes per frame)",
            trailing,
            frame_size
        );
    }

    let mut buffer = factory.create_buffer(format.channels, frames, format.sample_rate)?;

    let mut reader = BufReader::new(&bytes[..frames * frame_size]);
    let channels = format.channels;
    let big = format.endian.is_big();

    match sample_format {
        SampleFormat::U8 => decode_frames(&mut reader, &mut buffer, channels, frames, |r| {
            Ok(convert::pcm_u8_to_f64(r.read_u8()?))
        }),
        SampleFormat::S8 => decode_frames(&mut reader, &mut buffer, channels, frames, |r| {
            Ok(convert::pcm_i8_to_f64(r.read_u8()? as i8))
        }),
        SampleFormat::U16 => decode_frames(&mut reader, &mut buffer, channels, frames, |r| {
            let s = if big { r.read_be_u16()? } else { r.read_u16()? };
            Ok(convert::pcm_u16_to_f64(s))
        }),
        SampleFormat::S16 => decode_frames(&mut reader, &mut buffer, channels, frames, |r| {
            let s = if big { r.read_be_u16()? } else { r.read_u16()? };
            Ok(convert::pcm_i16_to_f64(s as i16))
        }),
        SampleFormat::U24 => decode_frames(&mut reader, &mut buffer, channels, frames, |r| {
            let s = if big { r.read_be_u24()? } else { r.read_u24()? };
            Ok(convert::pcm_u24_to_f64(u24(s)))
        }),
        SampleFormat::S24 => decode_frames(&mut reader, &mut buffer, channels, frames, |r| {
            let s = if big { r.read_be_u24()? } else { r.read_u24()? };
            Ok(convert::pcm_i24_to_f64(convert::sign_extend_i24(s)))
        }),
        SampleFormat::U32 => decode_frames(&mut reader, &mut buffer, channels, frames, |r| {
            let s = if big { r.read_be_u32()? } else { r.read_u32()? };
            Ok(convert::pcm_u32_to_f64(s))
        }),
        SampleFormat::S32 => decode_frames(&mut reader, &mut buffer, channels, frames, |r| {
            let s = if big { r.read_be_u32()? } else { r.read_u32()? };
            Ok(convert::pcm_i32_to_f64(s as i32))
        }),
        SampleFormat::F32 => decode_frames(&mut reader, &mut buffer, channels, frames, |r| {
            let s = if big { r.read_be_f32()? } else { r.read_f32()? };
            Ok(f64::from(s))
        }),
        SampleFormat::U64 => decode_frames(&mut reader, &mut buffer, channels, frames, |r| {
            let s = if big { r.read_be_u64()? } else { r.read_u64()? };
            Ok(convert::pcm_u64_to_f64(s))
        }),
        SampleFormat::S64 => decode_frames(&mut reader, &mut buffer, channels, frames, |r| {
            let s = if big { r.read_be_u64()? } else { r.read_u64()? };
            Ok(convert::pcm_i64_to_f64(s as i64))
        }),
        SampleFormat::F64 => decode_frames(&mut reader, &mut buffer, channels, frames, |r| {
            let s = if big { r.read_be_f64()? } else { r.read_f64()? };
            Ok(s)
        }),
    }?;

    Ok(buffer)
}

#[inline]
fn decode_frames<R, B, S>(
    reader: &mut R,
    buffer: &mut B,
    channels: usize,
    frames: usize,
    mut read_sample: S,
) -> Result<(), SampleBufferError>
where
    R: ReadBytes,
    B: SampleBufferWrite,
    S: FnMut(&mut R) -> io::Result<f64>,
{
    let mut frame = vec![0.0; channels];

    for index in 0..frames {
        for sample in frame.iter_mut() {
            *sample = read_sample(reader)?;
        }

        buffer.frame_set_exact(index, &frame)?;
    }

    Ok(())
}
