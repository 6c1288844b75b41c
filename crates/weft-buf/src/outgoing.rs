//! Append-only, capacity-bounded outgoing segment list.

use arrayvec::ArrayVec;

use crate::view::Segment;

/// The outgoing list ran out of segment slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapacityExhausted;

/// Ordered segment list for one outgoing message.
///
/// Holds (address, length) pairs only; payload bytes stay wherever the
/// caller put them. `CAP` bounds the number of segments — once the list
/// is full it stays full for its lifetime.
#[derive(Debug, Default)]
pub struct Outgoing<'a, const CAP: usize> {
    segments: ArrayVec<Segment<'a>, CAP>,
}

impl<'a, const CAP: usize> Outgoing<'a, CAP> {
    /// Create an empty list.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            segments: ArrayVec::new(),
        }
    }

    /// Number of free segment slots.
    #[inline(always)]
    pub fn remaining_capacity(&self) -> usize {
        CAP - self.segments.len()
    }

    /// True when no slots remain.
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.segments.is_full()
    }

    /// Append one segment.
    #[inline(always)]
    pub fn append(&mut self, bytes: Segment<'a>) -> Result<(), CapacityExhausted> {
        self.segments.try_push(bytes).map_err(|_| CapacityExhausted)
    }

    /// Number of segments appended so far.
    #[inline(always)]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Total payload bytes across all segments.
    pub fn total_len(&self) -> usize {
        self.segments.iter().map(|s| s.len()).sum()
    }

    /// The segments in append order.
    #[inline(always)]
    pub fn as_slices(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// Iterate over the segments in append order.
    pub fn iter(&self) -> impl Iterator<Item = Segment<'a>> + '_ {
        self.segments.iter().copied()
    }
}
