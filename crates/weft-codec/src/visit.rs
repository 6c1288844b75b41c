//! Closed-set field-category dispatch.
//!
//! Concrete visitors override the two primitives (`bytes`, `scatter`);
//! composite categories decompose into primitives through the default
//! methods, so transport-specific logic stays isolated while composite
//! handling is automatic and identical on both sides of the wire.

use bytemuck::Pod;
use weft_buf::{ArrayView, ByteView, FixedView, ScatterView, TextView};

use crate::record::Record;

/// Visitor over a record's out-of-line fields.
pub trait Visit<'a>: Sized {
    /// Plain byte span. The serializer appends it; the deserializer
    /// binds it.
    fn bytes(&mut self, view: &mut ByteView<'a>);

    /// Scatter list. No generic handling exists; every concrete visitor
    /// supplies its own.
    fn scatter(&mut self, view: &mut ScatterView<'a>);

    /// Alignment-tagged byte span. Plain forwarding by default; the
    /// two-pass filter intercepts this to reorder the wire image.
    #[inline(always)]
    fn aligned_bytes(&mut self, view: &mut ByteView<'a>) {
        self.bytes(view);
    }

    /// Alignment-tagged scatter list.
    #[inline(always)]
    fn aligned_scatter(&mut self, view: &mut ScatterView<'a>) {
        self.scatter(view);
    }

    /// Plain scalar. Scalars travel inside the record body, so the
    /// engines have nothing to do here.
    #[inline(always)]
    fn scalar<T: Pod>(&mut self, _value: &mut T) {}

    /// Out-of-line fixed-size value: the span as bytes, then the pointee
    /// as a scalar. `T: Pod` rules out nested records.
    fn fixed<T: Pod>(&mut self, view: &mut FixedView<'a, T>) {
        self.bytes(view.view_mut());
        if let Some(mut value) = view.get() {
            self.scalar(&mut value);
        }
    }

    /// Fixed-stride array: the whole span as bytes, then each element as
    /// a scalar. `T: Pod` rules out nested records.
    fn array<T: Pod>(&mut self, view: &mut ArrayView<'a, T>) {
        self.bytes(view.view_mut());
        for i in 0..view.logical_len() {
            if let Some(mut element) = view.get(i) {
                self.scalar(&mut element);
            }
        }
    }

    /// NUL-terminated text: the contiguous span, terminator included.
    fn text(&mut self, view: &mut TextView<'a>) {
        self.bytes(view.view_mut());
    }

    /// Nested record: recurse into its own field list with this visitor.
    /// Nested fields keep their positions within the enclosing pass; no
    /// per-nested alignment split happens.
    fn nested<R: Record<'a>>(&mut self, record: &mut R) {
        record.walk(self);
    }
}
