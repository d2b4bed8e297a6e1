//! Numeric bounds shared across the assembler, emulator and binary format.

/// Largest value a non-negative literal or resolved label/constant may take.
pub const NGC_WORD_MAX: i32 = 32_767;

/// Largest instruction count an assembled program may reach.
pub const NGC_UWORD_MAX: u32 = 65_535;

/// Longest physical source line the parser accepts, in columns.
pub const MAX_LINE_LEN: usize = 253;

/// Longest source file the parser accepts, in lines.
pub const MAX_LINES: usize = 1_048_576;

/// Bound on macro expansion recursion depth.
pub const MAX_MACRO_DEPTH: usize = 256;

/// Size of the RAM and ROM arrays in `Memory`.
pub const MEMORY_SIZE: usize = 65_536;
