//! Utility functions for the dpcompile project.

pub mod compile;
mod extendable_queue;
pub(crate) mod pack_format;
pub(crate) mod resource;

#[doc(inline)]
pub use extendable_queue::ExtendableQueue;
