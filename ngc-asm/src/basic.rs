//! Basic assembler: direct line-to-word lowering for the macro-free path.

use ngc_core::constants::NGC_UWORD_MAX;
use ngc_core::Word;

use crate::error::Error;
use crate::model::{def_data_get, DataDefKind, LineKind, ParsedFile};
use crate::source_map::{SourceMap, SourceMapItem};
use crate::Result;

/// Precondition: `parsed.defs_macros` is empty and `parsed.base.refs_macros`
/// is empty. Violating it is a programmer error, not a user-facing one.
pub fn assemble(parsed: &ParsedFile) -> Result<(Vec<Word>, SourceMap)> {
    if !parsed.defs_macros.is_empty() || !parsed.base.refs_macros.is_empty() {
        return Err(Error::failure(
            "basic assembler invoked on a program containing macros",
        ));
    }

    let mut words = Vec::with_capacity(parsed.base.lines.len());
    let mut map = SourceMap::with_capacity(parsed.base.lines.len());

    for line in &parsed.base.lines {
        let word = match &line.kind {
            LineKind::Instruction(w) => *w,
            LineKind::DataRef(idx) => {
                let key = &parsed.base.refs_data[*idx];
                let def = def_data_get(&parsed.base.defs_data, key)
                    .ok_or_else(|| Error::syntax(line.line_num, format!("undefined symbol \"{}\"", key)))?;
                match def.kind {
                    DataDefKind::Const(v) => v,
                    DataDefKind::Label(v) => v,
                }
            }
            LineKind::MacroRef(_) => {
                return Err(Error::failure("macro reference reached the basic assembler"));
            }
        };

        words.push(word);
        map.push(SourceMapItem {
            line: line.line_num as u32,
        });

        if words.len() as u32 > NGC_UWORD_MAX {
            return Err(Error::file(format!(
                "assembled program exceeds {} words",
                NGC_UWORD_MAX
            )));
        }
    }

    Ok((words, map))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse;

    #[test]
    fn no_macros_basic_path_resolves_defines_and_labels() {
        // "D=A;JEQ": op "A" (U|ZX), target D, jump EQ: 0xE000|0x480|0x10|0x2 = 0xE492.
        let parsed = parse("DEFINE X 7\nA = X\nD = A ; JEQ\n").unwrap();
        let (words, map) = assemble(&parsed).unwrap();
        assert_eq!(words, vec![0x0007, 0xE492u16 as Word]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn undefined_symbol_is_syntax_error() {
        let parsed = parse("A = MISSING\n").unwrap();
        let err = assemble(&parsed).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Syntax);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn label_value_is_count_of_preceding_lines() {
        let parsed = parse("A = 0\nA = 0\nLABEL END\nA = END\n").unwrap();
        let (words, _) = assemble(&parsed).unwrap();
        assert_eq!(words[3], 2);
    }
}
