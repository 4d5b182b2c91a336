//! Storage capability traits.
//!
//! The monitor only needs the "has this item been seen" relation, so the
//! surface is deliberately small and async so any backend can sit behind it.

pub mod seen;

pub use seen::SeenStore;
