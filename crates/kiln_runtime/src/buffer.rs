//! Fixed-layout buffer descriptors passed across the load boundary.

use std::marker::PhantomData;

/// A read-only view of contiguous `f32` values: pointer plus element count.
///
/// The layout is `#[repr(C)]` so the descriptor can be handed to native code
/// unchanged. Borrowing from a slice guarantees the pointer is aligned,
/// contiguous and valid for `len` reads while the descriptor lives.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Buffer<'a> {
    ptr: *const f32,
    len: usize,
    _data: PhantomData<&'a [f32]>,
}

impl<'a> Buffer<'a> {
    /// Describes `data`.
    pub fn from_slice(data: &'a [f32]) -> Self {
        Self {
            ptr: data.as_ptr(),
            len: data.len(),
            _data: PhantomData,
        }
    }

    /// Pointer to the first element.
    pub fn as_ptr(&self) -> *const f32 {
        self.ptr
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A writable view of contiguous `f32` values.
#[repr(C)]
#[derive(Debug)]
pub struct BufferMut<'a> {
    ptr: *mut f32,
    len: usize,
    _data: PhantomData<&'a mut [f32]>,
}

impl<'a> BufferMut<'a> {
    /// Describes `data` for writing.
    pub fn from_slice(data: &'a mut [f32]) -> Self {
        Self {
            ptr: data.as_mut_ptr(),
            len: data.len(),
            _data: PhantomData,
        }
    }

    /// Pointer to the first element.
    pub fn as_mut_ptr(&mut self) -> *mut f32 {
        self.ptr
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
