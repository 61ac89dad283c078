//! The shared memory region and checked reinterpretation of its bytes.
//!
//! A [`SharedRegion`] wraps an [`arrow_buffer::Buffer`]: slicing it only bumps
//! a reference count, so every view handed out by this crate points into the
//! memory the region was created from.

use std::ptr::NonNull;
use std::sync::Arc;

use arrow_buffer::alloc::Allocation;
use arrow_buffer::{ArrowNativeType, Buffer, ScalarBuffer};

use crate::{BufferDescriptor, GpuArrowError, Result};

/// An externally owned, immutable, contiguous byte region
#[derive(Debug, Clone)]
pub struct SharedRegion {
    buffer: Buffer,
}

impl SharedRegion {
    /// Wrap an existing buffer
    pub fn new(buffer: Buffer) -> Self {
        Self { buffer }
    }

    /// Wrap reference counted bytes without copying them
    pub fn from_bytes(bytes: bytes::Bytes) -> Self {
        Self {
            buffer: Buffer::from(bytes),
        }
    }

    /// Wrap foreign memory, such as a mapped IPC handle.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `len` bytes for as long as `owner`
    /// is alive, and the memory must not be written to while any view
    /// derived from this region exists.
    pub unsafe fn from_raw_parts(ptr: NonNull<u8>, len: usize, owner: Arc<dyn Allocation>) -> Self {
        Self {
            buffer: Buffer::from_custom_allocation(ptr, len, owner),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Base address of the region
    pub fn as_ptr(&self) -> *const u8 {
        self.buffer.as_ptr()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Low-level handle passed to a metadata parser
    pub fn handle(&self) -> RegionHandle<'_> {
        RegionHandle {
            bytes: self.buffer.as_slice(),
        }
    }

    /// The sub-region starting at `offset` and running to the end
    pub fn slice_from(&self, offset: usize) -> Result<SharedRegion> {
        if offset > self.len() {
            return Err(GpuArrowError::size_mismatch(offset, self.len()));
        }
        Ok(Self {
            buffer: self.buffer.slice(offset),
        })
    }

    /// Slice exactly the bytes a descriptor locates.
    ///
    /// Fails with [`GpuArrowError::SizeMismatch`] when the descriptor reaches
    /// past the end of the region; a short view is never returned.
    pub fn slice(&self, desc: &BufferDescriptor) -> Result<Buffer> {
        let end = desc
            .end()
            .ok_or_else(|| GpuArrowError::size_mismatch(usize::MAX, self.len()))?;
        if end > self.len() {
            let available = self.len().saturating_sub(desc.offset);
            return Err(GpuArrowError::size_mismatch(desc.length, available));
        }
        Ok(self.buffer.slice_with_length(desc.offset, desc.length))
    }
}

impl From<Buffer> for SharedRegion {
    fn from(buffer: Buffer) -> Self {
        Self::new(buffer)
    }
}

/// Borrowed handle to the start of a region, as seen by a metadata parser
#[derive(Debug, Clone, Copy)]
pub struct RegionHandle<'a> {
    bytes: &'a [u8],
}

impl<'a> RegionHandle<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Base address, for parsers living on the other side of an FFI boundary
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// Reinterpret a byte buffer as a typed view without copying.
///
/// The byte length must be a whole number of elements and, unless the buffer
/// is empty, the base address must be aligned for `T`. One-dimensional views are contiguous, so the
/// element stride is always `size_of::<T>()`.
pub fn view_as<T: ArrowNativeType>(bytes: Buffer) -> Result<ScalarBuffer<T>> {
    // An empty view reads nothing, so its address is irrelevant
    if bytes.is_empty() {
        return Ok(ScalarBuffer::from(Vec::<T>::new()));
    }

    let width = std::mem::size_of::<T>();
    if bytes.len() % width != 0 {
        let whole = bytes.len() / width * width;
        return Err(GpuArrowError::size_mismatch(whole, bytes.len()));
    }

    let align = std::mem::align_of::<T>();
    if bytes.as_ptr().align_offset(align) != 0 {
        return Err(GpuArrowError::Misaligned {
            type_name: std::any::type_name::<T>(),
            align,
        });
    }

    Ok(ScalarBuffer::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test::aligned_region;

    #[test]
    fn test_slice_exact_length() {
        let region = aligned_region(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let slice = region.slice(&BufferDescriptor::new(2, 4)).unwrap();
        assert_eq!(slice.as_slice(), &[3, 4, 5, 6]);
    }

    #[test]
    fn test_slice_shares_memory() {
        let region = aligned_region(&[0u8; 32]);
        let slice = region.slice(&BufferDescriptor::new(8, 8)).unwrap();
        assert_eq!(slice.as_ptr(), region.as_ptr().wrapping_add(8));
    }

    #[test]
    fn test_slice_past_end_is_size_mismatch() {
        let region = aligned_region(&[0u8; 16]);
        match region.slice(&BufferDescriptor::new(8, 16)) {
            Err(GpuArrowError::SizeMismatch { expected, actual }) => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 8);
            }
            other => panic!("expected SizeMismatch, got {other:?}"),
        }
        assert!(region.slice(&BufferDescriptor::new(17, 0)).is_err());
        assert!(region.slice(&BufferDescriptor::new(usize::MAX, 2)).is_err());
    }

    #[test]
    fn test_slice_from() {
        let region = aligned_region(&[9u8; 10]);
        assert_eq!(region.slice_from(4).unwrap().len(), 6);
        assert_eq!(region.slice_from(10).unwrap().len(), 0);
        assert!(matches!(
            region.slice_from(11),
            Err(GpuArrowError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_view_as_typed() {
        let mut raw = Vec::new();
        for v in [1i32, -2, 3] {
            raw.extend_from_slice(&v.to_ne_bytes());
        }
        let region = aligned_region(&raw);
        let view = view_as::<i32>(region.buffer().clone()).unwrap();
        assert_eq!(&view[..], &[1, -2, 3]);
        assert_eq!(view.inner().as_ptr(), region.as_ptr());
    }

    #[test]
    fn test_view_as_rejects_partial_elements() {
        let region = aligned_region(&[0u8; 6]);
        assert!(matches!(
            view_as::<i32>(region.buffer().clone()),
            Err(GpuArrowError::SizeMismatch {
                expected: 4,
                actual: 6
            })
        ));
    }

    #[test]
    fn test_view_as_rejects_misaligned() {
        let region = aligned_region(&[0u8; 16]);
        let shifted = region.buffer().slice_with_length(1, 8);
        assert!(matches!(
            view_as::<i64>(shifted),
            Err(GpuArrowError::Misaligned { align: 8, .. })
        ));
    }

    #[test]
    fn test_view_as_empty_ignores_alignment() {
        let region = aligned_region(&[0u8; 16]);
        let empty = region.buffer().slice_with_length(3, 0);
        let view = view_as::<i64>(empty).unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn test_from_bytes_is_zero_copy() {
        let bytes = bytes::Bytes::from(vec![7u8; 24]);
        let ptr = bytes.as_ptr();
        let region = SharedRegion::from_bytes(bytes);
        assert_eq!(region.as_ptr(), ptr);
        assert_eq!(region.handle().as_ptr(), ptr);
        assert_eq!(region.handle().len(), 24);
    }

    #[test]
    fn test_from_raw_parts_keeps_owner_alive() {
        let owner: Arc<Vec<u64>> = Arc::new(vec![42u64, 7]);
        let ptr = NonNull::new(owner.as_ptr() as *mut u8).unwrap();
        let region = unsafe { SharedRegion::from_raw_parts(ptr, 16, owner.clone()) };
        assert_eq!(Arc::strong_count(&owner), 2);

        let view = view_as::<u64>(region.buffer().clone()).unwrap();
        assert_eq!(&view[..], &[42, 7]);

        drop(view);
        drop(region);
        assert_eq!(Arc::strong_count(&owner), 1);
    }
}
