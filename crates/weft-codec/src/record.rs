//! Record trait: an ordered, fixed field list with a Pod wire body.

use bytemuck::Pod;

use crate::visit::Visit;

/// A structured message type with an ordered, fixed field list.
///
/// Declaration order is wire order. A record splits into two halves:
///
/// - the **wire body** ([`Record::Body`]): a `Pod` struct holding the
///   record's scalar fields plus the wire length of every out-of-line
///   field. The body travels as the trailing segment of the message.
/// - the **out-of-line fields**: borrowed views ([`ByteView`],
///   [`FixedView`], [`ArrayView`], [`TextView`], [`ScatterView`], nested
///   records) whose payloads travel as leading segments.
///
/// Bodies should be `repr(C, packed)` so they can be reinterpreted at
/// any offset of the receive buffer.
///
/// [`ByteView`]: weft_buf::ByteView
/// [`FixedView`]: weft_buf::FixedView
/// [`ArrayView`]: weft_buf::ArrayView
/// [`TextView`]: weft_buf::TextView
/// [`ScatterView`]: weft_buf::ScatterView
pub trait Record<'a>: Sized {
    /// Fixed-size wire body.
    type Body: Pod;

    /// Capture scalar fields and out-of-line wire lengths into a body.
    fn pack_body(&self) -> Self::Body;

    /// Rebuild the record from a received body, with every out-of-line
    /// field pending at its recorded length.
    fn unpack_body(body: &Self::Body) -> Self;

    /// Drive a visitor over the out-of-line fields in declaration order.
    ///
    /// One walk serves both directions and both alignment passes; the
    /// serializer and deserializer rely on it producing the identical
    /// field sequence every time.
    fn walk<V: Visit<'a>>(&mut self, visitor: &mut V);
}

/// Expand a field list into a [`Record::walk`] body.
///
/// Field kinds: `scalar`, `bytes`, `aligned`, `fixed`, `array`, `text`,
/// `scatter`, `aligned_scatter`, `nested`. `aligned` and
/// `aligned_scatter` expect the field wrapped in
/// [`Aligned`](weft_buf::Aligned).
///
/// ```ignore
/// fn walk<V: Visit<'a>>(&mut self, v: &mut V) {
///     walk_fields!(v => {
///         fixed self.id,
///         text self.name,
///         array self.payload,
///     });
/// }
/// ```
#[macro_export]
macro_rules! walk_fields {
    ($visitor:expr => { $($kind:ident $field:expr),* $(,)? }) => {{
        $( $crate::walk_fields!(@field $visitor, $kind, $field); )*
    }};
    (@field $v:expr, scalar, $f:expr) => { $v.scalar(&mut $f) };
    (@field $v:expr, bytes, $f:expr) => { $v.bytes(&mut $f) };
    (@field $v:expr, aligned, $f:expr) => { $v.aligned_bytes(&mut $f.0) };
    (@field $v:expr, fixed, $f:expr) => { $v.fixed(&mut $f) };
    (@field $v:expr, array, $f:expr) => { $v.array(&mut $f) };
    (@field $v:expr, text, $f:expr) => { $v.text(&mut $f) };
    (@field $v:expr, scatter, $f:expr) => { $v.scatter(&mut $f) };
    (@field $v:expr, aligned_scatter, $f:expr) => { $v.aligned_scatter(&mut $f.0) };
    (@field $v:expr, nested, $f:expr) => { $v.nested(&mut $f) };
}
