//! Single-line recognizer (a `pest` grammar) plus the cross-line state
//! machine that threads `File`/`Macro` scope over recognized lines and
//! builds a `ParsedFile`.
//!
//! Every top-level grammar rule is atomic (`@{ }`), so a successful parse
//! tells us only that the stripped line matches the shape of an ALU/data/
//! macro-reference statement; the actual sub-fields are pulled back out
//! with plain string splitting afterwards, since the enumerated
//! alternatives in the grammar are exactly the same token set `isa` and
//! `lexer` already know how to decode.

use std::str::FromStr;

use pest::Parser;
use pest_derive::Parser as PestDerive;

use ngc_core::constants::{MAX_LINES, MAX_LINE_LEN};
use ngc_core::isa::{self, JumpCond};
use ngc_core::Word;

use crate::error::Error;
use crate::lexer::{key_valid, parse_number};
use crate::model::{
    DataDef, DataDefKind, Line, LineKind, MacroDef, MacroParamRef, MacroRef, ParsedBase,
    ParsedFile,
};
use crate::Result;

#[derive(PestDerive)]
#[grammar = "grammar.pest"]
struct LineParser;

/// Parse a whole source file into a `ParsedFile`.
pub fn parse(input: &str) -> Result<ParsedFile> {
    let mut file = ParsedFile::new();
    let mut current_macro: Option<MacroDef> = None;

    let total_lines = input.lines().count();
    if total_lines > MAX_LINES {
        return Err(Error::file(format!(
            "file has {} lines, exceeding the {} line limit",
            total_lines, MAX_LINES
        )));
    }

    for (idx, raw_line) in input.lines().enumerate() {
        let line_num = idx + 1;

        if raw_line.len() > MAX_LINE_LEN {
            return Err(Error::file(format!(
                "line {} is {} columns, exceeding the {} column limit",
                line_num,
                raw_line.len(),
                MAX_LINE_LEN
            )));
        }

        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let head = tokens[0].to_uppercase();

        match head.as_str() {
            "DEFINE" => {
                if tokens.len() != 3 {
                    return Err(Error::syntax(
                        line_num,
                        "DEFINE requires exactly a key and a value",
                    ));
                }
                let key = tokens[1];
                require_key(key, line_num)?;
                let value = parse_number(tokens[2])
                    .ok_or_else(|| Error::syntax(line_num, format!("invalid literal \"{}\"", tokens[2])))?;
                active_base(&mut file, &mut current_macro)
                    .defs_data
                    .push(DataDef {
                        key: key.to_string(),
                        kind: DataDefKind::Const(value),
                    });
            }
            "LABEL" => {
                if tokens.len() != 2 {
                    return Err(Error::syntax(line_num, "LABEL requires exactly a key"));
                }
                let key = tokens[1];
                require_key(key, line_num)?;
                let base = active_base(&mut file, &mut current_macro);
                let value = (base.lines.len() - base.refs_macros.len()) as Word;
                base.defs_data.push(DataDef {
                    key: key.to_string(),
                    kind: DataDefKind::Label(value),
                });
            }
            "%MACRO" => {
                if current_macro.is_some() {
                    return Err(Error::syntax(
                        line_num,
                        "%MACRO is only legal in file scope, not inside another macro",
                    ));
                }
                if tokens.len() < 2 {
                    return Err(Error::syntax(line_num, "%MACRO requires a name"));
                }
                let key = tokens[1];
                require_key(key, line_num)?;

                let mut param_names = Vec::with_capacity(tokens.len() - 2);
                for p in &tokens[2..] {
                    require_key(p, line_num)?;
                    if param_names
                        .iter()
                        .any(|existing: &String| existing.eq_ignore_ascii_case(p))
                    {
                        return Err(Error::syntax(
                            line_num,
                            format!("duplicate macro parameter \"{}\"", p),
                        ));
                    }
                    param_names.push(p.to_string());
                }

                current_macro = Some(MacroDef {
                    key: key.to_string(),
                    param_names,
                    body: ParsedBase::new(),
                });
            }
            "%END" => match current_macro.take() {
                Some(def) => file.defs_macros.push(def),
                None => {
                    return Err(Error::syntax(line_num, "%END outside of a %MACRO block"));
                }
            },
            _ => {
                let kind = parse_statement(trimmed, &tokens, line_num, active_base(&mut file, &mut current_macro))?;
                active_base(&mut file, &mut current_macro)
                    .lines
                    .push(Line { kind, line_num });
            }
        }
    }

    if current_macro.is_some() {
        return Err(Error::syntax(0, "unterminated %MACRO at end of file"));
    }

    Ok(file)
}

fn active_base<'a>(file: &'a mut ParsedFile, current_macro: &'a mut Option<MacroDef>) -> &'a mut ParsedBase {
    match current_macro {
        Some(def) => &mut def.body,
        None => &mut file.base,
    }
}

fn require_key(key: &str, line_num: usize) -> Result<()> {
    if key_valid(key) {
        Ok(())
    } else {
        Err(Error::syntax(line_num, format!("invalid key \"{}\"", key)))
    }
}

/// Try ALU, then data, then macro-reference, in that order, reporting a
/// syntax error on the offending token if none match.
fn parse_statement(trimmed: &str, tokens: &[&str], line_num: usize, base: &mut ParsedBase) -> Result<LineKind> {
    let stripped: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();

    if let Some(word) = try_parse_alu(&stripped, line_num)? {
        return Ok(LineKind::Instruction(word));
    }

    if let Some(kind) = try_parse_data(&stripped, base)? {
        return Ok(kind);
    }

    if let Some(kind) = try_parse_macro_ref(tokens, line_num, base)? {
        return Ok(kind);
    }

    Err(Error::syntax(
        line_num,
        format!("unrecognized statement \"{}\"", trimmed),
    ))
}

/// §4.3: `[<targets> =] <op> [; <jump>]`, plus the bare `JMP` special case.
fn try_parse_alu(stripped: &str, line_num: usize) -> Result<Option<Word>> {
    if LineParser::parse(Rule::bare_jmp_line, stripped).is_ok() {
        return Ok(Some(isa::BARE_JMP as Word));
    }

    if LineParser::parse(Rule::alu_line, stripped).is_err() {
        return Ok(None);
    }

    let (targets_part, rest) = match stripped.find('=') {
        Some(i) => (Some(&stripped[..i]), &stripped[i + 1..]),
        None => (None, stripped),
    };
    let (op_part, jump_part) = match rest.find(';') {
        Some(i) => (&rest[..i], Some(&rest[i + 1..])),
        None => (rest, None),
    };

    let mut target_bits: u16 = 0;
    if let Some(targets_part) = targets_part {
        for t in targets_part.split(',') {
            let bit = isa::target_bits(t)
                .ok_or_else(|| Error::syntax(line_num, format!("unknown assignment target \"{}\"", t)))?;
            if target_bits & bit != 0 {
                return Err(Error::syntax(line_num, format!("duplicate assignment target \"{}\"", t)));
            }
            target_bits |= bit;
        }
    }

    let op_bits = isa::alu_op_bits(op_part)
        .ok_or_else(|| Error::syntax(line_num, format!("unknown ALU expression \"{}\"", op_part)))?;

    let jump_bits = match jump_part {
        Some(j) => JumpCond::from_str(j)
            .map_err(|_| Error::syntax(line_num, format!("unknown jump mnemonic \"{}\"", j)))?
            .bits(),
        None => 0,
    };

    Ok(Some((isa::ALU | op_bits | target_bits | jump_bits) as Word))
}

/// §4.4: `A = <expr>`, where `<expr>` is a non-negative literal or a key.
fn try_parse_data(stripped: &str, base: &mut ParsedBase) -> Result<Option<LineKind>> {
    if LineParser::parse(Rule::data_line, stripped).is_err() {
        return Ok(None);
    }

    let operand = &stripped["A=".len()..];

    if let Some(value) = parse_number(operand) {
        Ok(Some(LineKind::Instruction(value)))
    } else if key_valid(operand) {
        let idx = base.push_ref_data(operand);
        Ok(Some(LineKind::DataRef(idx)))
    } else {
        Ok(None)
    }
}

/// §4.5: `<key> [arg...]`, each arg a literal or a key.
///
/// §4.2 step 4c only reaches here when the first token is not a valid jump
/// mnemonic; a line like a bare `JEQ` is rejected so it falls through to
/// the caller's final syntax error instead of becoming an "undefined
/// macro" error at assembly time.
fn try_parse_macro_ref(tokens: &[&str], line_num: usize, base: &mut ParsedBase) -> Result<Option<LineKind>> {
    if JumpCond::from_str(tokens[0]).is_ok() {
        return Ok(None);
    }

    let joined = tokens.join(" ");
    if LineParser::parse(Rule::macro_ref_line, &joined).is_err() {
        return Ok(None);
    }

    let key = tokens[0];
    if !key_valid(key) {
        return Err(Error::syntax(line_num, format!("invalid macro reference \"{}\"", key)));
    }

    let mut params = Vec::with_capacity(tokens.len() - 1);
    for tok in &tokens[1..] {
        if let Some(value) = parse_number(tok) {
            params.push(MacroParamRef::Const(value));
        } else if key_valid(tok) {
            let idx = base.push_ref_data(tok);
            params.push(MacroParamRef::DataRef(idx));
        } else {
            return Err(Error::syntax(line_num, format!("invalid macro argument \"{}\"", tok)));
        }
    }

    base.refs_macros.push(MacroRef {
        key: key.to_string(),
        params,
    });

    Ok(Some(LineKind::MacroRef(base.refs_macros.len() - 1)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{def_data_get, def_macro_get};

    #[test]
    fn define_and_label_directives() {
        let file = parse("DEFINE X 7\nLABEL START\nA = 0\n").unwrap();
        let def = def_data_get(&file.base.defs_data, "x").unwrap();
        assert!(matches!(def.kind, DataDefKind::Const(7)));
        let label = def_data_get(&file.base.defs_data, "START").unwrap();
        assert!(matches!(label.kind, DataDefKind::Label(0)));
    }

    #[test]
    fn alu_line_with_targets_and_jump() {
        let file = parse("D=A;JEQ\n").unwrap();
        match file.base.lines[0].kind {
            LineKind::Instruction(w) => {
                assert_eq!(w as u16, isa::ALU | isa::OPR_U | isa::OPR_ZX | isa::TARGET_D | isa::JUMP_EQ);
            }
            _ => panic!("expected instruction"),
        }
    }

    #[test]
    fn bare_jmp_line() {
        let file = parse("JMP\n").unwrap();
        match file.base.lines[0].kind {
            LineKind::Instruction(w) => assert_eq!(w as u16, isa::BARE_JMP),
            _ => panic!("expected instruction"),
        }
    }

    #[test]
    fn data_line_literal_and_key() {
        let file = parse("A = 5\nA = FOO\n").unwrap();
        assert!(matches!(file.base.lines[0].kind, LineKind::Instruction(5)));
        assert!(matches!(file.base.lines[1].kind, LineKind::DataRef(0)));
        assert_eq!(file.base.refs_data[0], "FOO");
    }

    #[test]
    fn macro_definition_and_reference() {
        let file = parse("%MACRO INC\nA = A + 1\n%END\nINC\n").unwrap();
        assert_eq!(file.defs_macros.len(), 1);
        assert!(def_macro_get(&file.defs_macros, "inc").is_some());
        assert!(matches!(file.base.lines[0].kind, LineKind::MacroRef(0)));
    }

    #[test]
    fn duplicate_macro_parameters_rejected() {
        let err = parse("%MACRO M x x\n%END\n").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Syntax);
    }

    #[test]
    fn nested_macro_rejected() {
        let err = parse("%MACRO OUTER\n%MACRO INNER\n%END\n%END\n").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Syntax);
    }

    #[test]
    fn unterminated_macro_rejected() {
        let err = parse("%MACRO M\nA = 0\n").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Syntax);
    }

    #[test]
    fn duplicate_alu_targets_rejected() {
        let err = parse("A,A=0\n").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Syntax);
    }

    #[test]
    fn comment_and_blank_lines_are_skipped() {
        let file = parse("# a comment\n\nA = 1\n").unwrap();
        assert_eq!(file.base.lines.len(), 1);
    }

    #[test]
    fn reserved_key_is_rejected() {
        let err = parse("DEFINE A 1\n").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Syntax);
    }

    #[test]
    fn bare_jump_mnemonic_is_syntax_error_not_macro_ref() {
        let err = parse("JEQ\n").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Syntax);
        assert!(err.message.contains("unrecognized statement"));
    }
}
