//! # Worldcore Serde
//! Bit-level wire codec shared between the worldcore server and its tools.
//!
//! Every value is written at an explicit bit width and read back at the
//! identical width in the identical order. The format carries no type tags,
//! so writer/reader symmetry is a hard correctness requirement.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bit_reader;
mod bit_writer;
mod error;
mod integer;
mod serde;

pub use bit_reader::BitReader;
pub use bit_writer::{BitWrite, BitWriter};
pub use error::SerdeErr;
pub use integer::UnsignedInteger;
pub use serde::{ConstBitLength, Serde};
