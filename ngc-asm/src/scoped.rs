//! Scoped assembler: recursive macro expansion with per-call symbol scope
//! and a running program-counter offset.

use ngc_core::constants::{MAX_MACRO_DEPTH, NGC_UWORD_MAX};
use ngc_core::Word;

use crate::error::Error;
use crate::model::{
    def_data_get, def_macro_get, DataDef, DataDefKind, LineKind, MacroDef, MacroParamRef, ParsedBase,
    ParsedFile,
};
use crate::source_map::{SourceMap, SourceMapItem};
use crate::Result;

/// A scope threaded through recursive macro expansion: the symbol table
/// visible at this call level plus the running label-resolution offset
/// inherited from the caller. `pc_offset` only ever advances by the word
/// count a macro expansion actually contributes — a plain instruction or
/// data-ref line does not touch it, since the `Label` values captured at
/// parse time already count those lines within their own lexical scope.
struct Scope {
    defs_data: Vec<DataDef>,
    pc_offset: u32,
}

pub fn assemble(parsed: &ParsedFile) -> Result<(Vec<Word>, SourceMap)> {
    let mut words = Vec::new();
    let mut map = SourceMap::new();

    let scope = Scope {
        defs_data: parsed.base.defs_data.clone(),
        pc_offset: 0,
    };

    walk(&parsed.base, &scope, &parsed.defs_macros, 0, &mut words, &mut map)?;

    Ok((words, map))
}

/// Walk one `ParsedBase` (a file or a macro body) under `scope`, emitting
/// words and source-map entries as it goes. Returns the number of words
/// this call (including nested macro expansions) emitted, measured as a
/// snapshot of `words.len()` before and after the walk.
fn walk(
    base: &ParsedBase,
    scope: &Scope,
    defs_macros: &[MacroDef],
    depth: usize,
    words: &mut Vec<Word>,
    map: &mut SourceMap,
) -> Result<u32> {
    let start_len = words.len();
    let mut pc_offset = scope.pc_offset;

    for line in &base.lines {
        match &line.kind {
            LineKind::Instruction(w) => {
                emit(words, map, *w, line.line_num)?;
            }
            LineKind::DataRef(idx) => {
                let key = &base.refs_data[*idx];
                let value = resolve_data(&scope.defs_data, key, pc_offset)
                    .ok_or_else(|| Error::syntax(line.line_num, format!("undefined symbol \"{}\"", key)))?;
                emit(words, map, value, line.line_num)?;
            }
            LineKind::MacroRef(idx) => {
                if depth >= MAX_MACRO_DEPTH {
                    return Err(Error::syntax(
                        line.line_num,
                        format!("macro expansion depth exceeds {}", MAX_MACRO_DEPTH),
                    ));
                }

                let mref = &base.refs_macros[*idx];
                let mdef = def_macro_get(defs_macros, &mref.key)
                    .ok_or_else(|| Error::syntax(line.line_num, format!("undefined macro \"{}\"", mref.key)))?;

                if mref.params.len() != mdef.param_names.len() {
                    let diff = mref.params.len() as i64 - mdef.param_names.len() as i64;
                    return Err(Error::syntax(
                        line.line_num,
                        format!(
                            "macro \"{}\" expects {} argument(s), got {} ({:+})",
                            mref.key,
                            mdef.param_names.len(),
                            mref.params.len(),
                            diff
                        ),
                    ));
                }

                let macro_scope = build_macro_scope(base, scope, mref, mdef, pc_offset, line.line_num)?;
                let before_len = words.len();
                walk(&mdef.body, &macro_scope, defs_macros, depth + 1, words, map)?;
                pc_offset += (words.len() - before_len) as u32;
            }
        }
    }

    Ok((words.len() - start_len) as u32)
}

/// §4.7 step 3: parameters shadow body definitions shadow outer
/// definitions, so the merged list is built in that order and looked up
/// first-match-wins.
fn build_macro_scope(
    caller_base: &ParsedBase,
    caller_scope: &Scope,
    mref: &crate::model::MacroRef,
    mdef: &MacroDef,
    pc_offset: u32,
    line_num: usize,
) -> Result<Scope> {
    let mut defs_data = Vec::with_capacity(
        mdef.param_names.len() + mdef.body.defs_data.len() + caller_scope.defs_data.len(),
    );

    for (name, param) in mdef.param_names.iter().zip(&mref.params) {
        let value = match param {
            MacroParamRef::Const(v) => *v,
            MacroParamRef::DataRef(idx) => {
                let key = &caller_base.refs_data[*idx];
                resolve_data(&caller_scope.defs_data, key, pc_offset)
                    .ok_or_else(|| Error::syntax(line_num, format!("undefined symbol \"{}\"", key)))?
            }
        };
        defs_data.push(DataDef {
            key: name.clone(),
            kind: DataDefKind::Const(value),
        });
    }

    defs_data.extend(mdef.body.defs_data.iter().cloned());
    defs_data.extend(caller_scope.defs_data.iter().cloned());

    Ok(Scope {
        defs_data,
        pc_offset,
    })
}

/// §4.8: resolve a data reference in `defs_data`, offsetting `Label`
/// values by the caller's current running program-counter offset.
fn resolve_data(defs_data: &[DataDef], key: &str, pc_offset: u32) -> Option<Word> {
    let def = def_data_get(defs_data, key)?;
    Some(match def.kind {
        DataDefKind::Const(v) => v,
        DataDefKind::Label(v) => ((v as i32) + (pc_offset as i32)) as Word,
    })
}

fn emit(words: &mut Vec<Word>, map: &mut SourceMap, word: Word, line_num: usize) -> Result<()> {
    words.push(word);
    map.push(SourceMapItem {
        line: line_num as u32,
    });

    if words.len() as u32 > NGC_UWORD_MAX {
        return Err(Error::file(format!(
            "assembled program exceeds {} words",
            NGC_UWORD_MAX
        )));
    }

    Ok(())
}
