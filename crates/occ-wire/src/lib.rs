//! OCC packet wire format: header layout, per-type encoders, and the
//! synthetic stream generator.

#![forbid(unsafe_code)]

mod das;
mod generate;
mod mps;
mod packet;

pub use das::*;
pub use generate::*;
pub use mps::*;
pub use packet::*;
