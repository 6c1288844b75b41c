//! Serializing visitor: record → ordered segment list.
//!
//! Appends every out-of-line field as an (address, length) segment, then
//! the packed wire body as the trailing segment. Payload bytes are never
//! copied.

use weft_buf::{ByteView, Outgoing, ScatterView};

use crate::filter::AlignedFilter;
use crate::record::Record;
use crate::visit::Visit;

/// Serialization failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerializeError {
    /// The outgoing list ran out of segment slots mid-serialization.
    /// The segments appended before exhaustion are in place, but the
    /// result is not transmittable.
    CapacityExhausted,
}

/// Visitor that appends field spans to an outgoing list.
///
/// Overflow is sticky: once the list fills up, every later field is
/// silently dropped and the final result reports the failure.
pub struct Serializer<'a, 'o, const CAP: usize> {
    out: &'o mut Outgoing<'a, CAP>,
    overflow: bool,
}

impl<'a, 'o, const CAP: usize> Serializer<'a, 'o, CAP> {
    /// Wrap an outgoing list.
    #[inline(always)]
    pub fn new(out: &'o mut Outgoing<'a, CAP>) -> Self {
        Self {
            out,
            overflow: false,
        }
    }

    /// True once any append has been dropped.
    #[inline(always)]
    pub fn overflowed(&self) -> bool {
        self.overflow
    }

    /// Collapse the sticky flag into a result.
    #[inline(always)]
    pub fn finish(&self) -> Result<(), SerializeError> {
        if self.overflow {
            Err(SerializeError::CapacityExhausted)
        } else {
            Ok(())
        }
    }
}

impl<'a, 'o, const CAP: usize> Visit<'a> for Serializer<'a, 'o, CAP> {
    fn bytes(&mut self, view: &mut ByteView<'a>) {
        if self.out.remaining_capacity() == 0 {
            self.overflow = true;
            return;
        }
        if view.len() == 0 {
            // Zero-length fields emit no segment.
            return;
        }
        match view.bytes() {
            Some(bytes) => {
                // Capacity was checked above.
                let _ = self.out.append(bytes);
            }
            None => {
                debug_assert!(false, "serializing a pending view");
            }
        }
    }

    fn scatter(&mut self, view: &mut ScatterView<'a>) {
        // Refresh the cached total, then flatten into the outer list.
        view.recompute();
        for i in 0..view.segment_count() {
            let mut span = ByteView::new(view.segments()[i]);
            self.bytes(&mut span);
        }
    }
}

/// Serialize `record` into `out`.
///
/// The wire image is `[aligned fields] [non-aligned fields] [body]`,
/// each group in declaration order. `body` is caller-provided storage
/// for the trailing segment; it is overwritten with the packed body and
/// must stay alive as long as `out` references it (the borrow checker
/// holds callers to this).
///
/// On `Err`, `out` holds exactly the segments appended before capacity
/// ran out; the result must be discarded wholesale.
pub fn serialize<'a, R, const CAP: usize>(
    record: &mut R,
    body: &'a mut R::Body,
    out: &mut Outgoing<'a, CAP>,
) -> Result<(), SerializeError>
where
    R: Record<'a>,
{
    *body = record.pack_body();
    let body: &'a R::Body = body;

    let mut ser = Serializer::new(out);
    {
        let mut aligned = AlignedFilter::new(&mut ser, true);
        record.walk(&mut aligned);
    }
    {
        let mut rest = AlignedFilter::new(&mut ser, false);
        record.walk(&mut rest);
    }

    let mut tail = ByteView::new(bytemuck::bytes_of(body));
    ser.bytes(&mut tail);
    ser.finish()
}
