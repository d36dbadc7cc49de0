//! Backing storage for sample buffers.
//!
//! A store is a flat, byte-addressed block of memory. Scalars are kept in
//! native byte order at a fixed width determined by the buffer's [`Scalar`]
//! precision. Where the memory comes from is decided by the allocation
//! strategy handed to [`crate::SampleBuffer::create_with_store`].

/// An addressable block of memory owned exclusively by one sample buffer.
///
/// The size of the store is the length of the slices it hands out. Both
/// views must cover the same memory.
pub trait SampleStore {
    fn bytes(&self) -> &[u8];

    fn bytes_mut(&mut self) -> &mut [u8];
}

/// A growable heap allocation.
impl SampleStore for Vec<u8> {
    fn bytes(&self) -> &[u8] {
        self.as_slice()
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

/// A fixed-size heap allocation.
impl SampleStore for Box<[u8]> {
    fn bytes(&self) -> &[u8] {
        self
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        self
    }
}

/// A region of memory owned by the caller, such as a shared or mapped block.
impl<'a> SampleStore for &'a mut [u8] {
    fn bytes(&self) -> &[u8] {
        self
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        self
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// The native precision of the scalars held in a store.
///
/// Only `f32` and `f64` are supported. Values always cross the buffer API as
/// `f64`; an `f32` store truncates on write.
pub trait Scalar: sealed::Sealed + Copy + 'static {
    /// The width of one scalar in bytes.
    const WIDTH: usize;

    /// Read one scalar from the start of `bytes` in native byte order.
    fn read_ne(bytes: &[u8]) -> f64;

    /// Write `value` to the start of `bytes` in native byte order.
    fn write_ne(bytes: &mut [u8], value: f64);
}

impl Scalar for f32 {
    const WIDTH: usize = 4;

    #[inline]
    fn read_ne(bytes: &[u8]) -> f64 {
        let mut raw = [0; 4];
        raw.copy_from_slice(&bytes[..4]);
        f64::from(f32::from_ne_bytes(raw))
    }

    #[inline]
    fn write_ne(bytes: &mut [u8], value: f64) {
        bytes[..4].copy_from_slice(&(value as f32).to_ne_bytes());
    }
}

impl Scalar for f64 {
    const WIDTH: usize = 8;

    #[inline]
    fn read_ne(bytes: &[u8]) -> f64 {
        let mut raw = [0; 8];
        raw.copy_from_slice(&bytes[..8]);
        f64::from_ne_bytes(raw)
    }

    #[inline]
    fn write_ne(bytes: &mut [u8], value: f64) {
        bytes[..8].copy_from_slice(&value.to_ne_bytes());
    }
}
