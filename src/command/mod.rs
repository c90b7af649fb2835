//! Command layer: address patterns, the assembler, documents and sequencing.

pub mod address;
pub mod assemble;
pub mod document;
pub mod sequence;

pub use address::AddressPattern;
pub use assemble::{AddressedEntry, AddressedPair, assemble};
pub use document::{CommandData, CommandDocument, CommandObj, InitData, State};
pub use sequence::{CommandSpec, Gate, generate_sequence};
