//! Borrowed buffer views and segment containers.
//!
//! Everything here is non-owning: views and containers hold
//! (address, length) pairs into caller-owned memory, with Rust lifetimes
//! standing in for the discipline the wire format otherwise demands.

#![no_std]

pub mod incoming;
pub mod outgoing;
pub mod view;

pub use incoming::Incoming;
pub use outgoing::{CapacityExhausted, Outgoing};
pub use view::{
    Aligned, ArrayView, ByteView, FixedView, ScatterView, Segment, TextView,
    MAX_SCATTER_SEGMENTS,
};
