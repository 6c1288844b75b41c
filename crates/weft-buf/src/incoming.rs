//! Consumable FIFO over possibly non-contiguous received chunks.
//!
//! Payload spans are carved off the front (oldest end) and record bodies
//! off the back, both as borrowed slices into the original chunks. The
//! container never copies; extracted spans stay valid for as long as the
//! backing chunks do, which the borrow checker enforces.

use bytemuck::Pod;
use core::mem::size_of;

use crate::view::ScatterView;

/// Cursor over a sequence of received chunks.
///
/// Front and back consume independently toward each other. Failed
/// extractions consume nothing.
#[derive(Debug)]
pub struct Incoming<'a> {
    chunks: &'a [&'a [u8]],
    /// Index of the chunk holding the front cursor.
    front_chunk: usize,
    /// Consumed bytes within the front chunk.
    front_off: usize,
    /// One past the last live chunk.
    back_chunk: usize,
    /// Bytes trimmed off the end of the last live chunk.
    back_trim: usize,
}

impl<'a> Incoming<'a> {
    /// Create a cursor over `chunks`.
    pub fn new(chunks: &'a [&'a [u8]]) -> Self {
        Self {
            chunks,
            front_chunk: 0,
            front_off: 0,
            back_chunk: chunks.len(),
            back_trim: 0,
        }
    }

    /// Live byte range of chunk `i`.
    fn live_span(&self, i: usize) -> (usize, usize) {
        let start = if i == self.front_chunk {
            self.front_off
        } else {
            0
        };
        let mut end = self.chunks[i].len();
        if i + 1 == self.back_chunk {
            end -= self.back_trim;
        }
        (start.min(end), end)
    }

    /// Unconsumed bytes remaining.
    pub fn remaining(&self) -> usize {
        (self.front_chunk..self.back_chunk)
            .map(|i| {
                let (start, end) = self.live_span(i);
                end - start
            })
            .sum()
    }

    /// True when fully consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Advance the front cursor past fully-consumed chunks.
    fn skip_drained_front(&mut self) {
        while self.front_chunk < self.back_chunk {
            let (start, end) = self.live_span(self.front_chunk);
            if start < end {
                break;
            }
            self.front_chunk += 1;
            self.front_off = 0;
        }
    }

    /// Carve exactly `n` contiguous bytes off the front.
    ///
    /// Fails on underrun, and also when the span would cross a chunk
    /// boundary: a borrowed view cannot splice two chunks without
    /// copying, so callers that need contiguity across chunks must
    /// reassemble upstream. Consumes nothing on failure.
    pub fn extract_front_contiguous(&mut self, n: usize) -> Option<&'a [u8]> {
        if n == 0 {
            return Some(&[]);
        }
        self.skip_drained_front();
        if self.front_chunk >= self.back_chunk {
            return None;
        }
        let (start, end) = self.live_span(self.front_chunk);
        if end - start < n {
            return None;
        }
        let bytes = &self.chunks[self.front_chunk][start..start + n];
        self.front_off = start + n;
        Some(bytes)
    }

    /// Carve exactly `n` bytes off the front as a segmented view.
    ///
    /// The view spans chunk boundaries. Fails on underrun and when more
    /// than [`MAX_SCATTER_SEGMENTS`](crate::MAX_SCATTER_SEGMENTS)
    /// segments would be needed. Consumes nothing on failure.
    pub fn extract_front_segmented(&mut self, n: usize) -> Option<ScatterView<'a>> {
        let mut view = ScatterView::new();
        if n == 0 {
            return Some(view);
        }

        let mut i = self.front_chunk;
        let mut off = self.front_off;
        let mut need = n;
        loop {
            if i >= self.back_chunk {
                return None;
            }
            let mut end = self.chunks[i].len();
            if i + 1 == self.back_chunk {
                end -= self.back_trim;
            }
            let start = off.min(end);
            let take = (end - start).min(need);
            if take > 0 {
                view.push(&self.chunks[i][start..start + take])?;
                need -= take;
            }
            if need == 0 {
                off = start + take;
                break;
            }
            i += 1;
            off = 0;
        }

        self.front_chunk = i;
        self.front_off = off;
        Some(view)
    }

    /// Carve `size_of::<B>()` bytes off the back, reinterpreted as `&B`.
    ///
    /// The tail region must be contiguous within the last live chunk.
    /// `B` is expected to have alignment 1 (`repr(C, packed)` wire
    /// bodies); a misaligned span fails the cast. Consumes nothing on
    /// failure.
    pub fn extract_back_as<B: Pod>(&mut self) -> Option<&'a B> {
        let size = size_of::<B>();

        // Drop fully-consumed chunks at the tail.
        loop {
            if self.front_chunk >= self.back_chunk {
                return None;
            }
            let last = self.back_chunk - 1;
            let (start, end) = self.live_span(last);
            if start < end {
                break;
            }
            self.back_chunk = last;
            self.back_trim = 0;
        }

        let last = self.back_chunk - 1;
        let (start, end) = self.live_span(last);
        if end - start < size {
            return None;
        }
        let bytes = &self.chunks[last][end - size..end];
        let body = bytemuck::try_from_bytes(bytes).ok()?;
        self.back_trim = self.chunks[last].len() - (end - size);
        Some(body)
    }
}
