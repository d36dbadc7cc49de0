use crate::buffer::SampleBufferRead;
use crate::error::SampleBufferError;
use crate::format::PcmFormat;

/// Raw PCM data together with the format that describes it.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPcm {
    pub data: Vec<u8>,
    pub format: PcmFormat,
}

impl EncodedPcm {
    /// The number of complete frames in `data`.
    pub fn frames(&self) -> Result<usize, SampleBufferError> {
        Ok(self.data.len() / self.format.frame_size()?)
    }
}

/// Encode a sample buffer as interleaved 32-bit float PCM in native byte
/// order.
///
/// Values are truncated to `f32` but never clamped, so samples outside of
/// `[-1.0, 1.0]` are written as-is.
pub fn encode<B: SampleBufferRead + ?Sized>(buffer: &B) -> Result<EncodedPcm, SampleBufferError> {
    let format = PcmFormat::float32_native(buffer.channels(), buffer.sample_rate());
    let len = format
        .frame_size()?
        .checked_mul(buffer.frames())
        .ok_or(SampleBufferError::Overflow)?;

    let mut data = Vec::with_capacity(len);
    let mut frame = vec![0.0; buffer.channels()];

    for index in 0..buffer.frames() {
        buffer.frame_get_exact(index, &mut frame)?;

        for value in frame.iter() {
            data.extend_from_slice(&(*value as f32).to_ne_bytes());
        }
    }

    Ok(EncodedPcm { data, format })
}
