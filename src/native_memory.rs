/*
 * Scoped native memory for records passed across a native message boundary.
 * A `NativeRecord` owns one allocation from a `NativeAllocator` and hands it
 * back in `Drop`, so the record is released exactly once whichever way the
 * sending code returns.
 */
use crate::error::{PlatformError, Result as PlatformResult};

use std::marker::PhantomData;
use std::ptr::NonNull;

pub(crate) trait NativeAllocator {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>>;

    /// # Safety
    /// `ptr` must come from `allocate` on this allocator and not have been released yet.
    unsafe fn release(&self, ptr: NonNull<u8>);
}

pub(crate) struct NativeRecord<'a, T: Copy, A: NativeAllocator + ?Sized> {
    ptr: NonNull<T>,
    allocator: &'a A,
    _marker: PhantomData<T>,
}

impl<'a, T: Copy, A: NativeAllocator + ?Sized> NativeRecord<'a, T, A> {
    pub(crate) fn new(allocator: &'a A, value: T) -> PlatformResult<Self> {
        let size = std::mem::size_of::<T>();
        let raw = allocator.allocate(size).ok_or_else(|| {
            PlatformError::ResourceExhausted(format!(
                "native allocation of {size} bytes for a message record failed"
            ))
        })?;

        if (raw.as_ptr() as usize) % std::mem::align_of::<T>() != 0 {
            unsafe { allocator.release(raw) };
            return Err(PlatformError::OperationFailed(
                "native allocation is not aligned for the message record".into(),
            ));
        }

        let ptr = raw.cast::<T>();
        unsafe { ptr.as_ptr().write(value) };
        Ok(Self {
            ptr,
            allocator,
            _marker: PhantomData,
        })
    }

    pub(crate) fn as_mut_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[cfg(test)]
    pub(crate) fn read(&self) -> T {
        unsafe { self.ptr.as_ptr().read() }
    }
}

impl<T: Copy, A: NativeAllocator + ?Sized> Drop for NativeRecord<'_, T, A> {
    fn drop(&mut self) {
        unsafe { self.allocator.release(self.ptr.cast()) };
    }
}

/*
 * Heap-backed allocator that records every allocation and release so tests can
 * assert that native records never leak.
 */
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct CountingAllocator {
    live: std::cell::RefCell<std::collections::HashMap<usize, std::alloc::Layout>>,
    allocations: std::cell::Cell<usize>,
    releases: std::cell::Cell<usize>,
    fail_next: std::cell::Cell<bool>,
}

#[cfg(test)]
impl CountingAllocator {
    pub(crate) fn allocations(&self) -> usize {
        self.allocations.get()
    }

    pub(crate) fn releases(&self) -> usize {
        self.releases.get()
    }

    pub(crate) fn live_count(&self) -> usize {
        self.live.borrow().len()
    }

    pub(crate) fn fail_next_allocation(&self) {
        self.fail_next.set(true);
    }
}

#[cfg(test)]
impl NativeAllocator for CountingAllocator {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        if self.fail_next.replace(false) {
            return None;
        }
        let layout = std::alloc::Layout::from_size_align(size.max(1), 16).ok()?;
        let ptr = NonNull::new(unsafe { std::alloc::alloc_zeroed(layout) })?;
        self.live.borrow_mut().insert(ptr.as_ptr() as usize, layout);
        self.allocations.set(self.allocations.get() + 1);
        Some(ptr)
    }

    unsafe fn release(&self, ptr: NonNull<u8>) {
        let layout = self
            .live
            .borrow_mut()
            .remove(&(ptr.as_ptr() as usize))
            .expect("released a pointer that is not live");
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) };
        self.releases.set(self.releases.get() + 1);
    }
}
