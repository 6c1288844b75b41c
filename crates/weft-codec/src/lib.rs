//! Zero-copy scatter-gather message codec.
//!
//! Serializes records into ordered lists of non-contiguous segments and
//! rebuilds them by binding fields directly into received byte streams.
//! No payload byte is copied in either direction; the engines move
//! (address, length) pairs only.
//!
//! ## Wire image
//!
//! ```text
//! [aligned fields, declaration order]
//! [non-aligned fields, declaration order]
//! [record body: scalars + out-of-line lengths]
//! ```
//!
//! The body travels last and is extracted from the back of the stream;
//! payload spans are extracted from the front in the same two-pass order
//! the serializer emitted them.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod de;
pub mod filter;
pub mod record;
pub mod ser;
pub mod visit;

pub use de::{deserialize, Deserializer, DeserializeError};
pub use filter::AlignedFilter;
pub use record::Record;
pub use ser::{serialize, SerializeError, Serializer};
pub use visit::Visit;

pub use weft_buf::{
    Aligned, ArrayView, ByteView, FixedView, Incoming, Outgoing, ScatterView, Segment, TextView,
};
