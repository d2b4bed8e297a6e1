//! ngc assembler: turns ngc assembly source into a stream of 16-bit
//! instruction words.

pub mod basic;
pub mod error;
pub mod lexer;
pub mod model;
mod parser;
pub mod scoped;
pub mod source_map;

use ngc_core::Word;

pub use error::{Error, ErrorKind, Result};
pub use model::ParsedFile;
pub use source_map::{SourceMap, SourceMapItem};

/// Parse ngc assembly source into its owned, unresolved representation.
pub fn parse(input: &str) -> Result<ParsedFile> {
    parser::parse(input)
}

/// Assemble a parsed file into its instruction words and source map,
/// dispatching to the basic (macro-free) or scoped assembler depending on
/// whether the file uses macros at all.
pub fn assemble(parsed: &ParsedFile) -> Result<(Vec<Word>, SourceMap)> {
    if parsed.defs_macros.is_empty() && parsed.base.refs_macros.is_empty() {
        basic::assemble(parsed)
    } else {
        scoped::assemble(parsed)
    }
}

/// Parse and assemble in one step.
pub fn assemble_source(input: &str) -> Result<(Vec<Word>, SourceMap)> {
    assemble(&parse(input)?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn assemble_source_dispatches_to_basic_without_macros() {
        let (words, map) = assemble_source("A = 1\nD = A\n").unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn assemble_source_dispatches_to_scoped_with_macros() {
        let (words, _) = assemble_source("%MACRO SET v\nA = v\n%END\nSET 9\n").unwrap();
        assert_eq!(words, vec![9]);
    }

    // Concrete end-to-end scenarios.

    #[test]
    fn scenario_a_equals_5() {
        let (words, _) = assemble_source("A = 5\n").unwrap();
        assert_eq!(words, vec![0x0005]);
    }

    #[test]
    fn scenario_d_equals_a() {
        // op "A" is U|ZX (no Op1/Op0), target D: ALU(0xE000) | 0x480 |
        // TgtD(0x10) = 0xE490.
        let (words, _) = assemble_source("D = A\n").unwrap();
        assert_eq!(words[0] as u16, 0xE490);
    }

    #[test]
    fn scenario_explicit_zero_jmp_after_a_zero() {
        // "A = 0" looks like the data form but "0" is itself a valid ALU
        // op token, and ALU parsing is tried before data parsing (see
        // DESIGN.md), so it assembles as ALU op "0" (ZX alone) targeting A:
        // ALU(0xE000) | 0x80 | TgtA(0x20) = 0xE0A0.
        // "0;JMP": op "0" (ZX alone), jump JMP sets all three condition bits:
        // ALU(0xE000) | 0x80 | 0x7 = 0xE087.
        let (words, _) = assemble_source("A = 0\n0;JMP\n").unwrap();
        assert_eq!(words[0] as u16, 0xE0A0);
        assert_eq!(words[1] as u16, 0xE087);
    }

    #[test]
    fn scenario_define_then_jeq() {
        let (words, _) = assemble_source("DEFINE X 7\nA = X\nD = A ; JEQ\n").unwrap();
        assert_eq!(words[0] as u16, 0x0007);
        assert_eq!(words[1] as u16, 0xE492);
    }

    #[test]
    fn scenario_macro_inc_twice_then_label() {
        // See the note on `scoped::test::macro_expansion_with_label_offset`
        // for how this instruction word is derived.
        let (words, _) = assemble_source(
            "%MACRO INC\nA = A + 1\n%END\nINC\nINC\nLABEL END\nA = END\n",
        )
        .unwrap();
        assert_eq!(words[0] as u16, 0xE560);
        assert_eq!(words[1] as u16, 0xE560);
        assert_eq!(words[2], 2);
    }
}
