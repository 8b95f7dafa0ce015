//! Allocation plumbing for the counts array.
//!
//! The counts array is the only heap allocation a histogram makes after
//! validation. It is obtained zeroed and 128-byte aligned so the hot
//! counters start on a cache-line boundary, and callers that need to place
//! histogram memory themselves (arenas, huge pages, instrumented
//! allocators) can substitute both sides of the allocation through
//! [`CountsAllocator`].

use std::alloc::Layout;
use std::ptr::NonNull;
use std::slice;
use std::sync::atomic::AtomicI64;

use crate::core::errors::CreationError;

/// Alignment of the counts array, in bytes.
pub const COUNTS_ALIGNMENT: usize = 128;

/// The pair of allocation hooks used for the counts array.
///
/// Both functions have the signatures (and contracts) of
/// [`std::alloc::alloc_zeroed`] and [`std::alloc::dealloc`]: the allocate
/// hook must return zeroed memory honoring the layout's alignment, or
/// null on failure. The pair is stored in the histogram so the buffer is
/// released through the same hooks it was obtained from.
#[derive(Debug, Clone, Copy)]
pub struct CountsAllocator {
    alloc_zeroed: unsafe fn(Layout) -> *mut u8,
    dealloc: unsafe fn(*mut u8, Layout),
}

impl CountsAllocator {
    /// Build an allocator from an `alloc_zeroed`/`dealloc` pair.
    pub fn new(
        alloc_zeroed: unsafe fn(Layout) -> *mut u8,
        dealloc: unsafe fn(*mut u8, Layout),
    ) -> CountsAllocator {
        CountsAllocator {
            alloc_zeroed,
            dealloc,
        }
    }
}

impl Default for CountsAllocator {
    fn default() -> CountsAllocator {
        CountsAllocator::new(std::alloc::alloc_zeroed, std::alloc::dealloc)
    }
}

/// Allocate a zeroed block of `num * size` bytes aligned to
/// [`COUNTS_ALIGNMENT`]. Returns null if the size overflows or the
/// allocation fails. Release with [`aligned_free`].
pub fn aligned_calloc(num: usize, size: usize) -> *mut u8 {
    let layout = match num
        .checked_mul(size)
        .and_then(|bytes| Layout::from_size_align(bytes, COUNTS_ALIGNMENT).ok())
    {
        Some(layout) if layout.size() > 0 => layout,
        _ => return std::ptr::null_mut(),
    };
    unsafe { std::alloc::alloc_zeroed(layout) }
}

/// Release a block obtained from [`aligned_calloc`].
///
/// # Safety
///
/// `ptr` must have come from `aligned_calloc(num, size)` with the same
/// `num` and `size`, and must not be used afterwards. Null is ignored.
pub unsafe fn aligned_free(ptr: *mut u8, num: usize, size: usize) {
    if ptr.is_null() {
        return;
    }
    let layout = Layout::from_size_align(num * size, COUNTS_ALIGNMENT)
        .expect("layout was valid when the block was allocated");
    std::alloc::dealloc(ptr, layout);
}

/// The owning counts buffer: `len` atomic 64-bit counters, zeroed and
/// 128-byte aligned, released through the allocator it was obtained from.
pub(crate) struct Counts {
    ptr: NonNull<AtomicI64>,
    len: usize,
    allocator: CountsAllocator,
}

// The cells are atomics and the buffer is uniquely owned; the raw pointer
// is only ever reconstituted as `&[AtomicI64]`.
unsafe impl Send for Counts {}
unsafe impl Sync for Counts {}

impl Counts {
    pub(crate) fn allocate(
        len: usize,
        allocator: CountsAllocator,
    ) -> Result<Counts, CreationError> {
        let layout = Self::layout(len)?;
        // Zeroed memory is a valid [AtomicI64]: every cell reads as 0.
        let ptr = unsafe { (allocator.alloc_zeroed)(layout) };
        let ptr = NonNull::new(ptr as *mut AtomicI64).ok_or(CreationError::OutOfMemory)?;
        Ok(Counts {
            ptr,
            len,
            allocator,
        })
    }

    fn layout(len: usize) -> Result<Layout, CreationError> {
        len.checked_mul(std::mem::size_of::<AtomicI64>())
            .and_then(|bytes| Layout::from_size_align(bytes, COUNTS_ALIGNMENT).ok())
            .ok_or(CreationError::UsizeTypeTooSmall)
    }

    pub(crate) fn as_slice(&self) -> &[AtomicI64] {
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn size_in_bytes(&self) -> usize {
        self.len * std::mem::size_of::<AtomicI64>()
    }
}

impl Drop for Counts {
    fn drop(&mut self) {
        let layout = Self::layout(self.len).expect("layout was valid at allocation time");
        unsafe { (self.allocator.dealloc)(self.ptr.as_ptr() as *mut u8, layout) }
    }
}

impl std::fmt::Debug for Counts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Counts").field("len", &self.len).finish()
    }
}
