//! Deserializing visitor: received byte stream → record.
//!
//! Carves the wire body off the back of the stream, then binds every
//! out-of-line field to a span carved off the front, mirroring the
//! serializer's exact pass order. Fields alias the receive buffer; the
//! engine copies nothing.

use weft_buf::{ByteView, Incoming, ScatterView};

use crate::filter::AlignedFilter;
use crate::record::Record;
use crate::visit::Visit;

/// Deserialization failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeserializeError {
    /// The stream could not supply the record's fixed-size body from the
    /// back. Unrecoverable: no record exists to populate.
    TruncatedBody,
    /// Some payload span could not be carved off the front. The walk
    /// still ran to completion, but the partial record was discarded.
    PayloadUnderrun,
}

/// Visitor that binds pending field views into an incoming stream.
///
/// Underrun is sticky: a failed extraction marks the record unusable but
/// the walk continues, so the failure is checked once after the full
/// call rather than per field.
pub struct Deserializer<'a, 's> {
    incoming: &'s mut Incoming<'a>,
    failed: bool,
}

impl<'a, 's> Deserializer<'a, 's> {
    /// Wrap an incoming stream.
    #[inline(always)]
    pub fn new(incoming: &'s mut Incoming<'a>) -> Self {
        Self {
            incoming,
            failed: false,
        }
    }

    /// True once any extraction has failed.
    #[inline(always)]
    pub fn failed(&self) -> bool {
        self.failed
    }
}

impl<'a, 's> Visit<'a> for Deserializer<'a, 's> {
    fn bytes(&mut self, view: &mut ByteView<'a>) {
        if view.len() == 0 {
            // Nothing was serialized; the field stays empty.
            return;
        }
        match self.incoming.extract_front_contiguous(view.len()) {
            Some(bytes) => view.bind(bytes),
            None => self.failed = true,
        }
    }

    fn scatter(&mut self, view: &mut ScatterView<'a>) {
        match self.incoming.extract_front_segmented(view.summed_size()) {
            Some(bound) => *view = bound,
            None => self.failed = true,
        }
    }
}

/// Deserialize one record from `incoming`.
///
/// The record's views alias the stream's backing chunks; they stay
/// usable only while those chunks do, which the returned record's
/// lifetime enforces.
pub fn deserialize<'a, R>(incoming: &mut Incoming<'a>) -> Result<R, DeserializeError>
where
    R: Record<'a>,
{
    // The body travels last, so it comes off the back.
    let body = incoming
        .extract_back_as::<R::Body>()
        .ok_or(DeserializeError::TruncatedBody)?;
    let mut record = R::unpack_body(body);

    // Mirror the serializer's pass order exactly; the passes are not
    // independently idempotent.
    let mut de = Deserializer::new(incoming);
    {
        let mut aligned = AlignedFilter::new(&mut de, true);
        record.walk(&mut aligned);
    }
    {
        let mut rest = AlignedFilter::new(&mut de, false);
        record.walk(&mut rest);
    }

    if de.failed() {
        Err(DeserializeError::PayloadUnderrun)
    } else {
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::serialize;
    use crate::walk_fields;
    use bytemuck::{Pod, Zeroable};
    use core::mem::size_of;
    use std::ffi::CString;
    use std::vec::Vec;
    use weft_buf::{Aligned, ArrayView, FixedView, Outgoing, TextView};

    #[derive(Debug)]
    struct Ping<'a> {
        id: FixedView<'a, u64>,
        name: TextView<'a>,
        payload: ArrayView<'a, u8>,
    }

    #[derive(Clone, Copy, Pod, Zeroable)]
    #[repr(C, packed)]
    struct PingBody {
        id_len: u32,
        name_len: u32,
        payload_len: u32,
    }

    const _: () = assert!(size_of::<PingBody>() == 12);

    impl<'a> Record<'a> for Ping<'a> {
        type Body = PingBody;

        fn pack_body(&self) -> PingBody {
            PingBody {
                id_len: self.id.len() as u32,
                name_len: self.name.len() as u32,
                payload_len: self.payload.len() as u32,
            }
        }

        fn unpack_body(body: &PingBody) -> Self {
            Self {
                id: FixedView::pending(),
                name: TextView::pending(body.name_len as usize),
                payload: ArrayView::pending(body.payload_len as usize),
            }
        }

        fn walk<V: Visit<'a>>(&mut self, v: &mut V) {
            walk_fields!(v => {
                fixed self.id,
                text self.name,
                array self.payload,
            });
        }
    }

    /// Flatten an outgoing list into one contiguous wire buffer.
    fn flatten<const CAP: usize>(out: &Outgoing<'_, CAP>) -> Vec<u8> {
        let mut wire = Vec::new();
        for segment in out.iter() {
            wire.extend_from_slice(segment);
        }
        wire
    }

    #[test]
    fn test_ping_roundtrip() {
        let id = 42u64;
        let payload = [1u8, 2, 3];
        let mut ping = Ping {
            id: FixedView::new(&id),
            name: TextView::from_cstr(c"node-7"),
            payload: ArrayView::new(&payload),
        };

        let mut body = PingBody::zeroed();
        let mut out = Outgoing::<8>::new();
        serialize(&mut ping, &mut body, &mut out).unwrap();

        // [id, 8] [name, 7 incl. terminator] [payload, 3] [body, 12]
        assert_eq!(out.segment_count(), 4);
        assert_eq!(out.as_slices()[0].len(), 8);
        assert_eq!(out.as_slices()[1].len(), 7);
        assert_eq!(out.as_slices()[2].len(), 3);
        assert_eq!(out.as_slices()[3].len(), size_of::<PingBody>());

        let wire = flatten(&out);
        let chunks: [&[u8]; 1] = [&wire];
        let mut incoming = Incoming::new(&chunks);

        let decoded: Ping<'_> = deserialize(&mut incoming).unwrap();
        assert_eq!(decoded.id.get(), Some(42));
        assert_eq!(decoded.name.as_cstr(), Some(c"node-7"));
        assert_eq!(decoded.payload.logical_len(), 3);
        assert_eq!(decoded.payload.as_slice(), Some(&payload[..]));
        assert!(incoming.is_empty());
    }

    #[test]
    fn test_zero_length_fields_consume_nothing() {
        let id = 7u64;
        let mut ping = Ping {
            id: FixedView::new(&id),
            name: TextView::empty(),
            payload: ArrayView::new(&[]),
        };

        let mut body = PingBody::zeroed();
        let mut out = Outgoing::<8>::new();
        serialize(&mut ping, &mut body, &mut out).unwrap();
        assert_eq!(out.segment_count(), 2); // id + body only

        let wire = flatten(&out);
        let chunks: [&[u8]; 1] = [&wire];
        let mut incoming = Incoming::new(&chunks);

        let decoded: Ping<'_> = deserialize(&mut incoming).unwrap();
        assert_eq!(decoded.id.get(), Some(7));
        assert_eq!(decoded.name.len(), 0);
        assert_eq!(decoded.payload.logical_len(), 0);
    }

    #[test]
    fn test_truncated_body() {
        let short = [0u8; 4]; // shorter than PingBody
        let chunks: [&[u8]; 1] = [&short];
        let mut incoming = Incoming::new(&chunks);

        let result: Result<Ping<'_>, _> = deserialize(&mut incoming);
        assert_eq!(result.unwrap_err(), DeserializeError::TruncatedBody);
        // Header failure halts immediately; nothing was consumed.
        assert_eq!(incoming.remaining(), 4);
    }

    #[test]
    fn test_payload_underrun_continues_walking() {
        // Body claims an 8-byte id, a 4-byte name and a 2-byte payload,
        // but only 2 payload-side bytes precede it on the wire.
        let body = PingBody {
            id_len: 8,
            name_len: 4,
            payload_len: 2,
        };
        let mut wire = Vec::new();
        wire.extend_from_slice(&[0xAA, 0xBB]);
        wire.extend_from_slice(bytemuck::bytes_of(&body));

        let chunks: [&[u8]; 1] = [&wire];
        let mut incoming = Incoming::new(&chunks);

        let result: Result<Ping<'_>, _> = deserialize(&mut incoming);
        assert_eq!(result.unwrap_err(), DeserializeError::PayloadUnderrun);
        // The id and name extractions failed, but the walk went on and
        // the payload field still consumed its two bytes.
        assert!(incoming.is_empty());
    }

    #[test]
    fn test_aligned_roundtrip_in_serialized_order() {
        struct Framed<'a> {
            note: TextView<'a>,
            block: Aligned<ByteView<'a>>,
        }

        #[derive(Clone, Copy, Pod, Zeroable)]
        #[repr(C, packed)]
        struct FramedBody {
            note_len: u32,
            block_len: u32,
        }

        impl<'a> Record<'a> for Framed<'a> {
            type Body = FramedBody;

            fn pack_body(&self) -> FramedBody {
                FramedBody {
                    note_len: self.note.len() as u32,
                    block_len: self.block.len() as u32,
                }
            }

            fn unpack_body(body: &FramedBody) -> Self {
                Self {
                    note: TextView::pending(body.note_len as usize),
                    block: Aligned(ByteView::pending(body.block_len as usize)),
                }
            }

            fn walk<V: Visit<'a>>(&mut self, v: &mut V) {
                walk_fields!(v => {
                    text self.note,
                    aligned self.block,
                });
            }
        }

        let block = [0x55u8; 16];
        let mut framed = Framed {
            note: TextView::from_cstr(c"hi"),
            block: Aligned(ByteView::new(&block)),
        };

        let mut body = FramedBody::zeroed();
        let mut out = Outgoing::<8>::new();
        serialize(&mut framed, &mut body, &mut out).unwrap();

        // The tagged block leads even though it is declared last.
        assert_eq!(out.as_slices()[0], &block[..]);
        assert_eq!(out.as_slices()[1].len(), 3); // "hi\0"

        let wire = flatten(&out);
        let chunks: [&[u8]; 1] = [&wire];
        let mut incoming = Incoming::new(&chunks);

        let decoded: Framed<'_> = deserialize(&mut incoming).unwrap();
        assert_eq!(decoded.note.as_cstr(), Some(c"hi"));
        assert_eq!(decoded.block.bytes(), Some(&block[..]));
    }

    #[test]
    fn test_scatter_roundtrip_without_flattening() {
        struct Gather<'a> {
            data: ScatterView<'a>,
        }

        #[derive(Clone, Copy, Pod, Zeroable)]
        #[repr(C, packed)]
        struct GatherBody {
            data_len: u32,
        }

        impl<'a> Record<'a> for Gather<'a> {
            type Body = GatherBody;

            fn pack_body(&self) -> GatherBody {
                GatherBody {
                    data_len: self.data.summed_size() as u32,
                }
            }

            fn unpack_body(body: &GatherBody) -> Self {
                Self {
                    data: ScatterView::pending(body.data_len as usize),
                }
            }

            fn walk<V: Visit<'a>>(&mut self, v: &mut V) {
                walk_fields!(v => { scatter self.data });
            }
        }

        let a = [1u8; 10];
        let b = [2u8; 20];
        let c = [3u8; 30];
        let mut body = GatherBody::zeroed();
        let mut out = Outgoing::<8>::new();
        let mut gather = Gather {
            data: ScatterView::new(),
        };
        gather.data.assign(&[&a, &b, &c]).unwrap();

        serialize(&mut gather, &mut body, &mut out).unwrap();
        assert_eq!(out.segment_count(), 4);

        let wire = flatten(&out);
        let chunks: [&[u8]; 1] = [&wire];
        let mut incoming = Incoming::new(&chunks);

        let decoded: Gather<'_> = deserialize(&mut incoming).unwrap();
        // 60 contiguous incoming bytes come back as one segmented view.
        assert_eq!(decoded.data.summed_size(), 60);
        let mut rebuilt = Vec::new();
        for segment in decoded.data.segments() {
            rebuilt.extend_from_slice(segment);
        }
        assert_eq!(&rebuilt[..10], &a[..]);
        assert_eq!(&rebuilt[10..30], &b[..]);
        assert_eq!(&rebuilt[30..60], &c[..]);
    }

    #[test]
    fn test_nested_record_roundtrip() {
        struct Outer<'a> {
            tag: FixedView<'a, u32>,
            inner: Ping<'a>,
        }

        #[derive(Clone, Copy, Pod, Zeroable)]
        #[repr(C, packed)]
        struct OuterBody {
            tag_len: u32,
            inner: PingBody,
        }

        impl<'a> Record<'a> for Outer<'a> {
            type Body = OuterBody;

            fn pack_body(&self) -> OuterBody {
                OuterBody {
                    tag_len: self.tag.len() as u32,
                    inner: self.inner.pack_body(),
                }
            }

            fn unpack_body(body: &OuterBody) -> Self {
                Self {
                    tag: FixedView::pending(),
                    inner: Ping::unpack_body(&{ body.inner }),
                }
            }

            fn walk<V: Visit<'a>>(&mut self, v: &mut V) {
                walk_fields!(v => {
                    fixed self.tag,
                    nested self.inner,
                });
            }
        }

        let tag = 9u32;
        let id = 42u64;
        let payload = [5u8, 6];
        let mut outer = Outer {
            tag: FixedView::new(&tag),
            inner: Ping {
                id: FixedView::new(&id),
                name: TextView::from_cstr(c"inner"),
                payload: ArrayView::new(&payload),
            },
        };

        let mut body = OuterBody::zeroed();
        let mut out = Outgoing::<8>::new();
        serialize(&mut outer, &mut body, &mut out).unwrap();
        // tag + id + name + payload + body
        assert_eq!(out.segment_count(), 5);

        let wire = flatten(&out);
        let chunks: [&[u8]; 1] = [&wire];
        let mut incoming = Incoming::new(&chunks);

        let decoded: Outer<'_> = deserialize(&mut incoming).unwrap();
        assert_eq!(decoded.tag.get(), Some(9));
        assert_eq!(decoded.inner.id.get(), Some(42));
        assert_eq!(decoded.inner.name.as_cstr(), Some(c"inner"));
        assert_eq!(decoded.inner.payload.as_slice(), Some(&payload[..]));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn roundtrip_preserves_every_field(
                id in any::<u64>(),
                name in "[a-z]{0,12}",
                payload in proptest::collection::vec(any::<u8>(), 0..256),
            ) {
                let name = CString::new(name).unwrap();
                let mut ping = Ping {
                    id: FixedView::new(&id),
                    name: TextView::from_cstr(&name),
                    payload: ArrayView::new(&payload),
                };

                let mut body = PingBody::zeroed();
                let mut out = Outgoing::<8>::new();
                serialize(&mut ping, &mut body, &mut out).unwrap();

                let wire = flatten(&out);
                let chunks: [&[u8]; 1] = [&wire];
                let mut incoming = Incoming::new(&chunks);

                let decoded: Ping<'_> = deserialize(&mut incoming).unwrap();
                prop_assert_eq!(decoded.id.get(), Some(id));
                prop_assert_eq!(decoded.name.as_cstr(), Some(name.as_c_str()));
                prop_assert_eq!(decoded.payload.as_slice(), Some(&payload[..]));
                prop_assert!(incoming.is_empty());
            }

            #[test]
            fn scatter_survives_arbitrary_chunk_splits(
                payload in proptest::collection::vec(any::<u8>(), 1..512),
                cut_a in 0usize..512,
                cut_b in 0usize..512,
            ) {
                struct Gather<'a> {
                    data: ScatterView<'a>,
                }

                #[derive(Clone, Copy, Pod, Zeroable)]
                #[repr(C, packed)]
                struct GatherBody {
                    data_len: u32,
                }

                impl<'a> Record<'a> for Gather<'a> {
                    type Body = GatherBody;

                    fn pack_body(&self) -> GatherBody {
                        GatherBody { data_len: self.data.summed_size() as u32 }
                    }

                    fn unpack_body(body: &GatherBody) -> Self {
                        Self { data: ScatterView::pending(body.data_len as usize) }
                    }

                    fn walk<V: Visit<'a>>(&mut self, v: &mut V) {
                        walk_fields!(v => { scatter self.data });
                    }
                }

                let mut body = GatherBody::zeroed();
                let mut out = Outgoing::<4>::new();
                let mut gather = Gather { data: ScatterView::new() };
                gather.data.assign(&[payload.as_slice()]).unwrap();

                serialize(&mut gather, &mut body, &mut out).unwrap();
                let wire = flatten(&out);
                drop(gather);
                drop(out);

                // Split the payload region at two arbitrary points; the
                // body stays contiguous in the final chunk.
                let cut_a = cut_a % (payload.len() + 1);
                let cut_b = cut_b % (payload.len() + 1);
                let (lo, hi) = if cut_a <= cut_b { (cut_a, cut_b) } else { (cut_b, cut_a) };
                let chunks: [&[u8]; 3] = [&wire[..lo], &wire[lo..hi], &wire[hi..]];
                let mut incoming = Incoming::new(&chunks);

                let decoded: Gather<'_> = deserialize(&mut incoming).unwrap();
                prop_assert_eq!(decoded.data.summed_size(), payload.len());
                let mut rebuilt = Vec::new();
                for segment in decoded.data.segments() {
                    rebuilt.extend_from_slice(segment);
                }
                prop_assert_eq!(rebuilt, payload);
            }
        }
    }
}
