use std::marker::PhantomData;

use crate::error::SampleBufferError;
use crate::store::{SampleStore, Scalar};
use crate::{VALID_CHANNELS, VALID_FRAMES};

/// Read access to a buffer of interleaved, normalized samples.
pub trait SampleBufferRead {
    /// The number of channels in a frame.
    fn channels(&self) -> usize;

    /// The number of frames in the buffer.
    fn frames(&self) -> usize;

    /// The sample rate in frames per second. This is metadata only.
    fn sample_rate(&self) -> f64;

    /// The number of scalar samples in the buffer (`channels * frames`).
    fn samples(&self) -> Result<usize, SampleBufferError> {
        self.channels()
            .checked_mul(self.frames())
            .ok_or(SampleBufferError::Overflow)
    }

    /// Copy the frame at `index` into `output`, one value per channel.
    ///
    /// This will return an error if `output.len() != channels()` or if
    /// `index >= frames()`.
    fn frame_get_exact(&self, index: usize, output: &mut [f64]) -> Result<(), SampleBufferError>;

    /// Get the value of the frame at `index` of a single-channel buffer.
    ///
    /// This will return an error if `channels() != 1` or if
    /// `index >= frames()`.
    fn frame_get_mono(&self, index: usize) -> Result<f64, SampleBufferError>;
}

/// Write access to a buffer of interleaved, normalized samples.
///
/// Every write affects only the addressed frame.
pub trait SampleBufferWrite: SampleBufferRead {
    /// Write `value` into every channel of the frame at `index`.
    fn frame_set_all(&mut self, index: usize, value: f64) -> Result<(), SampleBufferError>;

    /// Write one value per channel into the frame at `index`. No implicit
    /// broadcast takes place: `values.len()` must equal `channels()`.
    fn frame_set_exact(&mut self, index: usize, values: &[f64]) -> Result<(), SampleBufferError>;

    /// Set the frame at `index` of a single-channel buffer.
    fn frame_set_mono(&mut self, index: usize, c0: f64) -> Result<(), SampleBufferError> {
        self.frame_set_exact(index, &[c0])
    }

    /// Set the frame at `index` of a two-channel buffer.
    fn frame_set_stereo(&mut self, index: usize, c0: f64, c1: f64) -> Result<(), SampleBufferError> {
        self.frame_set_exact(index, &[c0, c1])
    }
}

/// Constructs buffers on behalf of the codecs, so that they stay agnostic of
/// the concrete buffer and store types in use.
///
/// Any `FnMut(channels, frames, sample_rate) -> Result<B, SampleBufferError>`
/// is a factory, including constructors such as [`SampleBufferF64::heap`].
pub trait BufferFactory {
    type Buffer: SampleBufferWrite;

    fn create_buffer(
        &mut self,
        channels: usize,
        frames: usize,
        sample_rate: f64,
    ) -> Result<Self::Buffer, SampleBufferError>;
}

impl<B, F> BufferFactory for F
where
    B: SampleBufferWrite,
    F: FnMut(usize, usize, f64) -> Result<B, SampleBufferError>,
{
    type Buffer = B;

    fn create_buffer(
        &mut self,
        channels: usize,
        frames: usize,
        sample_rate: f64,
    ) -> Result<B, SampleBufferError> {
        (self)(channels, frames, sample_rate)
    }
}

/// A buffer of interleaved samples held at `T` precision in a store of
/// type `S`.
///
/// The shape of the buffer is validated once at construction and never
/// changes afterwards. The buffer owns its store exclusively.
pub struct SampleBuffer<T: Scalar, S: SampleStore = Vec<u8>> {
    channels: usize,
    frames: usize,
    sample_rate: f64,
    frame_size: usize,
    store: S,
    _scalar: PhantomData<T>,
}

/// A sample buffer storing `f32` scalars.
pub type SampleBufferF32<S = Vec<u8>> = SampleBuffer<f32, S>;

/// A sample buffer storing `f64` scalars.
pub type SampleBufferF64<S = Vec<u8>> = SampleBuffer<f64, S>;

impl<T: Scalar, S: SampleStore> SampleBuffer<T, S> {
    /// Create a sample buffer whose store is obtained from `allocate`.
    ///
    /// * `channels` - The number of channels per frame. Must be at least `1`.
    /// * `frames` - The number of frames in the buffer. Must be at least `1`.
    /// * `sample_rate` - The sample rate in frames per second. Must be finite
    /// and positive.
    /// * `allocate` - Called once with the required size in bytes. The
    /// returned store must be exactly that size.
    pub fn create_with_store<A>(
        channels: usize,
        frames: usize,
        sample_rate: f64,
        allocate: A,
    ) -> Result<Self, SampleBufferError>
    where
        A: FnOnce(usize) -> S,
    {
        if !VALID_CHANNELS.contains(&channels) {
            return Err(SampleBufferError::InvalidChannels(channels));
        }
        if !VALID_FRAMES.contains(&frames) {
            return Err(SampleBufferError::InvalidFrames(frames));
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SampleBufferError::InvalidSampleRate(sample_rate));
        }

        let frame_size = T::WIDTH
            .checked_mul(channels)
            .ok_or(SampleBufferError::Overflow)?;
        let bytes = frame_size
            .checked_mul(frames)
            .ok_or(SampleBufferError::Overflow)?;

        let mut store = allocate(bytes);
        for received in [store.bytes().len(), store.bytes_mut().len()] {
            if received != bytes {
                return Err(SampleBufferError::Misallocation {
                    expected: bytes,
                    received,
                });
            }
        }

        Ok(Self {
            channels,
            frames,
            sample_rate,
            frame_size,
            store,
            _scalar: PhantomData,
        })
    }

    /// The backing store, holding scalars in native byte order.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume this buffer and return the backing store.
    pub fn into_store(self) -> S {
        self.store
    }

    fn check_channel_count(&self, received: usize) -> Result<(), SampleBufferError> {
        if self.channels != received {
            return Err(SampleBufferError::ChannelMismatch {
                expected: self.channels,
                received,
            });
        }
        Ok(())
    }

    /// Returns the byte offset of the frame at `index`.
    fn frame_offset(&self, index: usize) -> Result<usize, SampleBufferError> {
        if index >= self.frames {
            return Err(SampleBufferError::FrameOutOfRange {
                index,
                frames: self.frames,
            });
        }

        // Cannot overflow, the whole store was sized with checked arithmetic.
        Ok(index * self.frame_size)
    }

    fn frame_bytes(&self, index: usize) -> Result<&[u8], SampleBufferError> {
        let base = self.frame_offset(index)?;
        let expected = self.frame_size * self.frames;

        let bytes = self.store.bytes();
        bytes
            .get(base..base + self.frame_size)
            .ok_or(SampleBufferError::Misallocation {
                expected,
                received: bytes.len(),
            })
    }

    fn frame_bytes_mut(&mut self, index: usize) -> Result<&mut [u8], SampleBufferError> {
        let base = self.frame_offset(index)?;
        let end = base + self.frame_size;
        let expected = self.frame_size * self.frames;

        // The store is only trusted as far as the slice it hands out.
        let bytes = self.store.bytes_mut();
        let received = bytes.len();
        bytes
            .get_mut(base..end)
            .ok_or(SampleBufferError::Misallocation { expected, received })
    }
}

impl<T: Scalar> SampleBuffer<T, Vec<u8>> {
    /// Create a sample buffer backed by a growable heap allocation.
    pub fn heap(
        channels: usize,
        frames: usize,
        sample_rate: f64,
    ) -> Result<Self, SampleBufferError> {
        Self::create_with_store(channels, frames, sample_rate, |bytes| vec![0; bytes])
    }
}

impl<T: Scalar> SampleBuffer<T, Box<[u8]>> {
    /// Create a sample buffer backed by a fixed-size heap allocation.
    pub fn boxed(
        channels: usize,
        frames: usize,
        sample_rate: f64,
    ) -> Result<Self, SampleBufferError> {
        Self::create_with_store(channels, frames, sample_rate, |bytes| {
            vec![0; bytes].into_boxed_slice()
        })
    }
}

impl<'a, T: Scalar> SampleBuffer<T, &'a mut [u8]> {
    /// Create a sample buffer over a region of memory owned by the caller.
    ///
    /// The region must be exactly `channels * frames * T::WIDTH` bytes long.
    /// Its existing contents are interpreted as native-endian scalars.
    pub fn with_external(
        channels: usize,
        frames: usize,
        sample_rate: f64,
        region: &'a mut [u8],
    ) -> Result<Self, SampleBufferError> {
        Self::create_with_store(channels, frames, sample_rate, move |_| region)
    }
}

impl<T: Scalar, S: SampleStore> SampleBufferRead for SampleBuffer<T, S> {
    fn channels(&self) -> usize {
        self.channels
    }

    fn frames(&self) -> usize {
        self.frames
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn frame_get_exact(&self, index: usize, output: &mut [f64]) -> Result<(), SampleBufferError> {
        self.check_channel_count(output.len())?;

        let frame = self.frame_bytes(index)?;
        for (out, scalar) in output.iter_mut().zip(frame.chunks_exact(T::WIDTH)) {
            *out = T::read_ne(scalar);
        }

        Ok(())
    }

    fn frame_get_mono(&self, index: usize) -> Result<f64, SampleBufferError> {
        self.check_channel_count(1)?;

        Ok(T::read_ne(self.frame_bytes(index)?))
    }
}

impl<T: Scalar, S: SampleStore> SampleBufferWrite for SampleBuffer<T, S> {
    fn frame_set_all(&mut self, index: usize, value: f64) -> Result<(), SampleBufferError> {
        for scalar in self.frame_bytes_mut(index)?.chunks_exact_mut(T::WIDTH) {
            T::write_ne(scalar, value);
        }

        Ok(())
    }

    fn frame_set_exact(&mut self, index: usize, values: &[f64]) -> Result<(), SampleBufferError> {
        self.check_channel_count(values.len())?;

        let frame = self.frame_bytes_mut(index)?;
        for (scalar, value) in frame.chunks_exact_mut(T::WIDTH).zip(values.iter()) {
            T::write_ne(scalar, *value);
        }

        Ok(())
    }
}

impl<T: Scalar, S: SampleStore> std::fmt::Debug for SampleBuffer<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleBuffer")
            .field("channels", &self.channels)
            .field("frames", &self.frames)
            .field("sample_rate", &self.sample_rate)
            .field("scalar_width", &T::WIDTH)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_buffer(channels: usize, frames: usize) -> SampleBufferF64 {
        SampleBufferF64::heap(channels, frames, 44100.0).unwrap()
    }

    fn assert_near(expected: f64, actual: f64, delta: f64) {
        assert!(
            (expected - actual).abs() <= delta,
            "expected {} but got {} (delta {})",
            expected,
            actual,
            delta
        );
    }

    #[test]
    fn create_empty() {
        let e = SampleBufferF64::heap(1, 0, 44100.0).unwrap_err();
        assert!(matches!(e, SampleBufferError::InvalidFrames(0)));
        assert!(e.to_string().contains("frame count"));

        let e = SampleBufferF32::heap(0, 100, 44100.0).unwrap_err();
        assert!(matches!(e, SampleBufferError::InvalidChannels(0)));
        assert!(e.to_string().contains("channel count"));
    }

    #[test]
    fn create_bad_sample_rate() {
        for rate in [0.0, -44100.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                SampleBufferF64::heap(2, 100, rate),
                Err(SampleBufferError::InvalidSampleRate(_))
            ));
        }
    }

    #[test]
    fn create_overflow() {
        assert!(matches!(
            SampleBufferF64::heap(usize::MAX, 2, 44100.0),
            Err(SampleBufferError::Overflow)
        ));
        assert!(matches!(
            SampleBufferF32::heap(2, usize::MAX / 4, 44100.0),
            Err(SampleBufferError::Overflow)
        ));
    }

    #[test]
    fn create_misallocation() {
        let e = SampleBufferF64::create_with_store(2, 100, 44100.0, |_| vec![0u8; 10]).unwrap_err();
        assert!(matches!(
            e,
            SampleBufferError::Misallocation {
                expected: 1600,
                received: 10
            }
        ));
        assert!(e.to_string().contains("10 octets"));
    }

    /// Reports a different size through its two views of memory.
    struct InconsistentStore {
        read: Vec<u8>,
        write: Vec<u8>,
    }

    impl SampleStore for InconsistentStore {
        fn bytes(&self) -> &[u8] {
            &self.read
        }

        fn bytes_mut(&mut self) -> &mut [u8] {
            &mut self.write
        }
    }

    #[test]
    fn create_rejects_inconsistent_store() {
        let e = SampleBufferF64::create_with_store(1, 4, 44100.0, |bytes| InconsistentStore {
            read: vec![0; 8],
            write: vec![0; bytes],
        })
        .unwrap_err();
        assert!(matches!(
            e,
            SampleBufferError::Misallocation {
                expected: 32,
                received: 8
            }
        ));

        let e = SampleBufferF64::create_with_store(1, 4, 44100.0, |bytes| InconsistentStore {
            read: vec![0; bytes],
            write: vec![0; 8],
        })
        .unwrap_err();
        assert!(matches!(
            e,
            SampleBufferError::Misallocation {
                expected: 32,
                received: 8
            }
        ));
    }

    /// A store that shrinks after the buffer has been created.
    struct ShrinkingStore {
        bytes: Vec<u8>,
    }

    impl SampleStore for ShrinkingStore {
        fn bytes(&self) -> &[u8] {
            &self.bytes
        }

        fn bytes_mut(&mut self) -> &mut [u8] {
            &mut self.bytes
        }
    }

    #[test]
    fn shrunken_store_is_an_error() {
        let mut buffer = SampleBuffer::<f64, ShrinkingStore>::create_with_store(1, 4, 44100.0, |bytes| {
            ShrinkingStore {
                bytes: vec![0; bytes],
            }
        })
        .unwrap();
        buffer.store.bytes.truncate(8);

        assert!(matches!(
            buffer.frame_set_mono(3, 0.5),
            Err(SampleBufferError::Misallocation {
                expected: 32,
                received: 8
            })
        ));
        assert!(matches!(
            buffer.frame_get_mono(3),
            Err(SampleBufferError::Misallocation { .. })
        ));
        assert!(matches!(
            buffer.frame_get_exact(1, &mut [0.0]),
            Err(SampleBufferError::Misallocation { .. })
        ));

        buffer.frame_set_mono(0, 0.5).unwrap();
        assert_eq!(buffer.frame_get_mono(0).unwrap(), 0.5);
    }

    #[test]
    fn create_requests_exact_size() {
        let mut requested = 0;
        let buffer = SampleBufferF32::create_with_store(3, 7, 48000.0, |bytes| {
            requested = bytes;
            vec![0u8; bytes]
        })
        .unwrap();

        assert_eq!(requested, 3 * 7 * 4);
        assert_eq!(buffer.store().len(), requested);
    }

    #[test]
    fn create_mono_and_stereo() {
        for channels in [1, 2] {
            let buffer = create_buffer(channels, 100);
            assert_eq!(buffer.channels(), channels);
            assert_eq!(buffer.frames(), 100);
            assert_eq!(buffer.sample_rate(), 44100.0);
            assert_eq!(buffer.samples().unwrap(), channels * 100);
        }

        let buffer = SampleBufferF32::boxed(2, 100, 22050.0).unwrap();
        assert_eq!(buffer.samples().unwrap(), 200);
        assert_eq!(buffer.store().len(), 800);
    }

    #[test]
    fn frame_set_get_mono() {
        let mut buffer = create_buffer(1, 100);

        for index in 0..100 {
            buffer.frame_set_mono(index, index as f64).unwrap();
            assert_near(index as f64, buffer.frame_get_mono(index).unwrap(), 0.00001);
        }
    }

    #[test]
    fn frame_set_all_get_exact() {
        for channels in [1, 2, 5] {
            let mut buffer = create_buffer(channels, 100);
            let mut output = vec![0.0; channels];

            for index in 0..100 {
                buffer.frame_set_all(index, index as f64).unwrap();
                buffer.frame_get_exact(index, &mut output).unwrap();
                for value in output.iter() {
                    assert_near(index as f64, *value, 0.00001);
                }
            }
        }
    }

    #[test]
    fn frame_set_get_stereo() {
        let mut buffer = SampleBufferF32::heap(2, 100, 44100.0).unwrap();
        let mut output = [0.0; 2];

        for index in 0..100 {
            buffer
                .frame_set_stereo(index, index as f64, index as f64 * 2.0)
                .unwrap();
            buffer.frame_get_exact(index, &mut output).unwrap();
            assert_near(index as f64, output[0], 0.00001);
            assert_near(index as f64 * 2.0, output[1], 0.00001);
        }

        for index in 0..100 {
            buffer
                .frame_set_exact(index, &[-(index as f64), index as f64 * 3.0])
                .unwrap();
            buffer.frame_get_exact(index, &mut output).unwrap();
            assert_near(-(index as f64), output[0], 0.00001);
            assert_near(index as f64 * 3.0, output[1], 0.00001);
        }
    }

    #[test]
    fn frame_set_exact_stereo_fixed_values() {
        let mut buffer = SampleBufferF64::heap(2, 100, 44100.0).unwrap();
        buffer.frame_set_stereo(5, 0.25, -0.25).unwrap();

        let mut output = [0.0; 2];
        buffer.frame_get_exact(5, &mut output).unwrap();
        assert_eq!(output, [0.25, -0.25]);
    }

    #[test]
    fn writes_touch_only_the_addressed_frame() {
        let mut buffer = create_buffer(2, 4);
        buffer.frame_set_all(1, 0.5).unwrap();
        buffer.frame_set_exact(2, &[-0.5, 0.75]).unwrap();

        let mut output = [0.0; 2];
        buffer.frame_get_exact(0, &mut output).unwrap();
        assert_eq!(output, [0.0, 0.0]);
        buffer.frame_get_exact(1, &mut output).unwrap();
        assert_eq!(output, [0.5, 0.5]);
        buffer.frame_get_exact(2, &mut output).unwrap();
        assert_eq!(output, [-0.5, 0.75]);
        buffer.frame_get_exact(3, &mut output).unwrap();
        assert_eq!(output, [0.0, 0.0]);
    }

    #[test]
    fn channel_mismatch() {
        let mut stereo = create_buffer(2, 100);
        let e = stereo.frame_set_mono(0, 0.0).unwrap_err();
        assert!(matches!(
            e,
            SampleBufferError::ChannelMismatch {
                expected: 2,
                received: 1
            }
        ));
        assert!(e.to_string().contains("channel"));

        assert!(matches!(
            stereo.frame_get_mono(0),
            Err(SampleBufferError::ChannelMismatch { .. })
        ));
        assert!(matches!(
            stereo.frame_get_exact(0, &mut [0.0; 3]),
            Err(SampleBufferError::ChannelMismatch { .. })
        ));
        assert!(matches!(
            stereo.frame_set_exact(0, &[]),
            Err(SampleBufferError::ChannelMismatch { .. })
        ));

        let mut mono = create_buffer(1, 100);
        assert!(matches!(
            mono.frame_set_stereo(0, 0.0, 1.0),
            Err(SampleBufferError::ChannelMismatch {
                expected: 1,
                received: 2
            })
        ));
    }

    #[test]
    fn frame_out_of_range() {
        let mut mono = create_buffer(1, 100);
        let e = mono.frame_set_mono(100, 0.0).unwrap_err();
        assert!(matches!(
            e,
            SampleBufferError::FrameOutOfRange {
                index: 100,
                frames: 100
            }
        ));
        assert!(e.to_string().contains("range"));

        assert!(matches!(
            mono.frame_set_all(100, 0.0),
            Err(SampleBufferError::FrameOutOfRange { .. })
        ));
        assert!(matches!(
            mono.frame_get_mono(100),
            Err(SampleBufferError::FrameOutOfRange { .. })
        ));

        let mut stereo = create_buffer(2, 100);
        assert!(matches!(
            stereo.frame_set_stereo(100, 0.0, 1.0),
            Err(SampleBufferError::FrameOutOfRange { .. })
        ));
        assert!(matches!(
            stereo.frame_get_exact(usize::MAX, &mut [0.0; 2]),
            Err(SampleBufferError::FrameOutOfRange { .. })
        ));
    }

    #[test]
    fn channel_check_precedes_range_check() {
        let mut stereo = create_buffer(2, 10);
        assert!(matches!(
            stereo.frame_set_exact(10, &[0.0]),
            Err(SampleBufferError::ChannelMismatch { .. })
        ));
    }

    #[test]
    fn external_region() {
        let mut region = vec![0u8; 2 * 3 * 4];
        {
            let mut buffer = SampleBufferF32::with_external(2, 3, 8000.0, &mut region).unwrap();
            buffer.frame_set_stereo(1, 0.5, -1.0).unwrap();
        }

        assert_eq!(&region[8..12], &0.5f32.to_ne_bytes());
        assert_eq!(&region[12..16], &(-1.0f32).to_ne_bytes());

        let mut short = vec![0u8; 10];
        assert!(matches!(
            SampleBufferF32::with_external(2, 3, 8000.0, &mut short),
            Err(SampleBufferError::Misallocation {
                expected: 24,
                received: 10
            })
        ));
    }

    #[test]
    fn store_layout_is_interleaved() {
        let mut buffer = SampleBufferF64::heap(3, 2, 44100.0).unwrap();
        buffer.frame_set_exact(0, &[0.0, 0.1, 0.2]).unwrap();
        buffer.frame_set_exact(1, &[1.0, 1.1, 1.2]).unwrap();

        let scalars: Vec<f64> = buffer
            .into_store()
            .chunks_exact(8)
            .map(|b| f64::from_ne_bytes(b.try_into().unwrap()))
            .collect();
        assert_eq!(scalars, vec![0.0, 0.1, 0.2, 1.0, 1.1, 1.2]);
    }

    #[test]
    fn closures_are_factories() {
        let mut created = 0;
        let mut factory = |channels: usize, frames: usize, sample_rate: f64| {
            created += 1;
            SampleBufferF32::heap(channels, frames, sample_rate)
        };

        let buffer = factory.create_buffer(2, 10, 48000.0).unwrap();
        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.frames(), 10);
        assert_eq!(created, 1);

        let mut from_fn = SampleBufferF64::heap;
        let buffer = from_fn.create_buffer(1, 4, 8000.0).unwrap();
        assert_eq!(buffer.sample_rate(), 8000.0);
    }
}
