//! Instruction format, memory model and tick function for the ngc 16-bit
//! machine: a NandGame-derived single-ALU-instruction computer used to
//! teach assembly programming.

pub mod constants;
pub mod isa;
pub mod memory;
pub mod tick;

/// A signed machine word. Holds register and memory cell contents.
pub type Word = i16;

/// An unsigned machine word. Holds the program counter and instruction
/// counts, both of which run the full `0..=65535` range.
pub type UWord = u16;

pub use memory::Memory;
pub use tick::{ngc_reset, ngc_tick, TickDelta};
