//! Non-owning views over externally-owned bytes.
//!
//! Every view is a borrowed (address, length) pair tied to its backing
//! storage's lifetime. Copying or reassigning a view changes the view
//! only, never the payload. A view exists in one of two states:
//!
//! - **bound**: it references live bytes;
//! - **pending**: only its wire length is known, recorded while a record
//!   body has been decoded but its payload spans have not been carved out
//!   of the incoming stream yet.

use arrayvec::ArrayVec;
use bytemuck::Pod;
use core::ffi::CStr;
use core::marker::PhantomData;
use core::mem::size_of;

/// An (address, length) pair referencing bytes without owning them.
pub type Segment<'a> = &'a [u8];

/// Maximum number of segments a [`ScatterView`] can hold.
///
/// Bounded arity keeps the view allocation-free; it is also the upper
/// bound on how finely one scatter field may fragment across incoming
/// chunks.
pub const MAX_SCATTER_SEGMENTS: usize = 16;

/// Plain byte-span view.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByteView<'a> {
    data: Option<&'a [u8]>,
    len: usize,
}

impl<'a> ByteView<'a> {
    /// Create a view bound to `bytes`.
    #[inline(always)]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self {
            data: Some(bytes),
            len: bytes.len(),
        }
    }

    /// Create an empty bound view.
    #[inline(always)]
    pub const fn empty() -> Self {
        Self { data: None, len: 0 }
    }

    /// Create a pending view whose payload is expected to be `len` bytes.
    #[inline(always)]
    pub const fn pending(len: usize) -> Self {
        Self { data: None, len }
    }

    /// Wire length in bytes, known in both states.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if the wire length is zero.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if the view references live bytes.
    #[inline(always)]
    pub const fn is_bound(&self) -> bool {
        self.data.is_some()
    }

    /// The referenced bytes, if bound.
    #[inline(always)]
    pub const fn bytes(&self) -> Option<&'a [u8]> {
        self.data
    }

    /// Bind a pending view to its payload span.
    ///
    /// The span length must match the recorded wire length.
    #[inline(always)]
    pub fn bind(&mut self, bytes: &'a [u8]) {
        debug_assert_eq!(bytes.len(), self.len, "bound span must match wire length");
        self.data = Some(bytes);
    }

    /// Reassign the view to a different span, updating the wire length.
    #[inline(always)]
    pub fn assign(&mut self, bytes: &'a [u8]) {
        self.data = Some(bytes);
        self.len = bytes.len();
    }
}

/// View over one out-of-line fixed-size value.
///
/// The wire length is always `size_of::<T>()`. `T: Pod` bans nested
/// records at compile time: a record holds views and is never `Pod`.
#[derive(Clone, Copy, Debug)]
pub struct FixedView<'a, T: Pod> {
    view: ByteView<'a>,
    _marker: PhantomData<&'a T>,
}

impl<'a, T: Pod> FixedView<'a, T> {
    /// Create a view bound to `value`.
    #[inline(always)]
    pub fn new(value: &'a T) -> Self {
        Self {
            view: ByteView::new(bytemuck::bytes_of(value)),
            _marker: PhantomData,
        }
    }

    /// Create a pending view; the wire length is implied by `T`.
    #[inline(always)]
    pub const fn pending() -> Self {
        Self {
            view: ByteView::pending(size_of::<T>()),
            _marker: PhantomData,
        }
    }

    /// Wire length in bytes.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.view.len()
    }

    /// True if the view references live bytes.
    #[inline(always)]
    pub const fn is_bound(&self) -> bool {
        self.view.is_bound()
    }

    /// Read the value.
    ///
    /// Incoming spans carry no alignment guarantee, so this is an
    /// unaligned read returning a copy.
    #[inline(always)]
    pub fn get(&self) -> Option<T> {
        self.view.bytes().map(bytemuck::pod_read_unaligned)
    }

    /// The underlying byte-span view.
    #[inline(always)]
    pub fn view_mut(&mut self) -> &mut ByteView<'a> {
        &mut self.view
    }
}

impl<'a, T: Pod> Default for FixedView<'a, T> {
    fn default() -> Self {
        Self::pending()
    }
}

/// View over `N` contiguous elements of a fixed-size type.
///
/// The wire length is `N * size_of::<T>()`; the logical length is `N`.
/// `T: Pod` bans nested records, same as [`FixedView`].
#[derive(Clone, Copy, Debug)]
pub struct ArrayView<'a, T: Pod> {
    view: ByteView<'a>,
    _marker: PhantomData<&'a [T]>,
}

impl<'a, T: Pod> ArrayView<'a, T> {
    /// Create a view bound to `elements`.
    #[inline(always)]
    pub fn new(elements: &'a [T]) -> Self {
        Self {
            view: ByteView::new(bytemuck::cast_slice(elements)),
            _marker: PhantomData,
        }
    }

    /// Create a pending view expecting `len` payload bytes.
    #[inline(always)]
    pub const fn pending(len: usize) -> Self {
        Self {
            view: ByteView::pending(len),
            _marker: PhantomData,
        }
    }

    /// Wire length in bytes.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.view.len()
    }

    /// Number of elements.
    #[inline(always)]
    pub const fn logical_len(&self) -> usize {
        self.view.len() / size_of::<T>()
    }

    /// True if the view holds no elements.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// True if the view references live bytes.
    #[inline(always)]
    pub const fn is_bound(&self) -> bool {
        self.view.is_bound()
    }

    /// Read element `i` (unaligned, returns a copy).
    #[inline(always)]
    pub fn get(&self, i: usize) -> Option<T> {
        let size = size_of::<T>();
        let bytes = self.view.bytes()?;
        let span = bytes.get(i * size..(i + 1) * size)?;
        Some(bytemuck::pod_read_unaligned(span))
    }

    /// First element.
    #[inline(always)]
    pub fn first(&self) -> Option<T> {
        self.get(0)
    }

    /// Last element.
    #[inline(always)]
    pub fn last(&self) -> Option<T> {
        self.logical_len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate over element copies.
    pub fn iter(&self) -> impl Iterator<Item = T> + 'a {
        let bytes = self.view.bytes().unwrap_or(&[]);
        bytes
            .chunks_exact(size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
    }

    /// Borrow the elements as a slice, if the span happens to be aligned.
    #[inline]
    pub fn as_slice(&self) -> Option<&'a [T]> {
        bytemuck::try_cast_slice(self.view.bytes()?).ok()
    }

    /// The underlying byte-span view.
    #[inline(always)]
    pub fn view_mut(&mut self) -> &mut ByteView<'a> {
        &mut self.view
    }
}

impl<'a, T: Pod> Default for ArrayView<'a, T> {
    fn default() -> Self {
        Self::pending(0)
    }
}

/// View over contiguous NUL-terminated text, terminator included.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextView<'a> {
    view: ByteView<'a>,
}

impl<'a> TextView<'a> {
    /// Create a view bound to a C string, including its terminator.
    #[inline(always)]
    pub fn from_cstr(text: &'a CStr) -> Self {
        Self {
            view: ByteView::new(text.to_bytes_with_nul()),
        }
    }

    /// Create an empty view. Empty text emits no wire segment at all.
    #[inline(always)]
    pub const fn empty() -> Self {
        Self {
            view: ByteView::empty(),
        }
    }

    /// Create a pending view expecting `len` bytes (terminator included).
    #[inline(always)]
    pub const fn pending(len: usize) -> Self {
        Self {
            view: ByteView::pending(len),
        }
    }

    /// Wire length in bytes, terminator included.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.view.len()
    }

    /// True if the wire length is zero.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Borrow as a C string. Fails if unbound or not NUL-terminated.
    #[inline]
    pub fn as_cstr(&self) -> Option<&'a CStr> {
        CStr::from_bytes_with_nul(self.view.bytes()?).ok()
    }

    /// Borrow as UTF-8 text without the terminator.
    #[inline]
    pub fn as_str(&self) -> Option<&'a str> {
        self.as_cstr()?.to_str().ok()
    }

    /// The underlying byte-span view.
    #[inline(always)]
    pub fn view_mut(&mut self) -> &mut ByteView<'a> {
        &mut self.view
    }
}

/// Ordered list of byte segments with a cached total size.
///
/// The cache (`summed_size`) is recomputed whenever the segment list is
/// reassigned. A pending scatter view holds no segments but remembers the
/// total it expects to be bound to.
#[derive(Clone, Debug, Default)]
pub struct ScatterView<'a> {
    segments: ArrayVec<Segment<'a>, MAX_SCATTER_SEGMENTS>,
    summed: usize,
}

impl<'a> ScatterView<'a> {
    /// Create an empty view.
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pending view expecting `summed_size` payload bytes.
    #[inline(always)]
    pub fn pending(summed_size: usize) -> Self {
        Self {
            segments: ArrayVec::new(),
            summed: summed_size,
        }
    }

    /// Replace the segment list, recomputing `summed_size`.
    ///
    /// Returns the new total, or `None` if `segments` exceeds
    /// [`MAX_SCATTER_SEGMENTS`] (the view is left unchanged).
    pub fn assign(&mut self, segments: &[Segment<'a>]) -> Option<usize> {
        if segments.len() > MAX_SCATTER_SEGMENTS {
            return None;
        }
        self.segments.clear();
        self.segments.try_extend_from_slice(segments).ok()?;
        Some(self.recompute())
    }

    /// Append one segment. Returns `None` when the arity bound is hit.
    #[inline]
    pub fn push(&mut self, segment: Segment<'a>) -> Option<()> {
        self.segments.try_push(segment).ok()?;
        self.summed += segment.len();
        Some(())
    }

    /// Recompute and return the cached total size.
    pub fn recompute(&mut self) -> usize {
        self.summed = self.segments.iter().map(|s| s.len()).sum();
        self.summed
    }

    /// Cached total payload size across all segments.
    #[inline(always)]
    pub const fn summed_size(&self) -> usize {
        self.summed
    }

    /// Number of segments.
    #[inline(always)]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The segment list.
    #[inline(always)]
    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }
}

/// Tag marking a field for first-pass processing.
///
/// Aligned fields form a contiguous leading group in the flattened wire
/// image, independent of declaration order. Only plain byte spans and
/// scatter lists can carry the tag.
#[derive(Clone, Debug, Default)]
#[repr(transparent)]
pub struct Aligned<F>(pub F);

impl<F> core::ops::Deref for Aligned<F> {
    type Target = F;

    #[inline(always)]
    fn deref(&self) -> &F {
        &self.0
    }
}

impl<F> core::ops::DerefMut for Aligned<F> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut F {
        &mut self.0
    }
}
