//! Bit layout of the ngc instruction word and the lookup tables used to
//! encode/decode its ALU sub-fields.
//!
//! Bit positions mirror the machine's own header exactly; nothing here is
//! inferred, all of it is read off directly from the reference bit masks.

use util::EnumFromStr;
use util_derive::EnumFromStr;

/// Set for ALU instructions, clear for data instructions.
pub const CI: u16 = 1 << 15;

/// Bits 14 and 13 are unused by the hardware but always read back as 1.
pub const ALU_FIXED: u16 = (1 << 14) | (1 << 13);

/// Selects `*A` in place of `A` as the ALU's `y` operand.
pub const AA: u16 = 1 << 12;

pub const OPR_U: u16 = 1 << 10;
pub const OPR_OP1: u16 = 1 << 9;
pub const OPR_OP0: u16 = 1 << 8;
pub const OPR_ZX: u16 = 1 << 7;
pub const OPR_SW: u16 = 1 << 6;

/// Convenience combination used by the `-1` ALU op and the bare `JMP` line.
pub const OPR_NEG1: u16 = OPR_U | OPR_OP1 | OPR_OP0 | OPR_ZX;

pub const TARGET_A: u16 = 1 << 5;
pub const TARGET_D: u16 = 1 << 4;
pub const TARGET_STAR_A: u16 = 1 << 3;

pub const JUMP_LT: u16 = 1 << 2;
pub const JUMP_EQ: u16 = 1 << 1;
pub const JUMP_GT: u16 = 1 << 0;

/// `CI` plus the two fixed-high bits; present in every ALU instruction.
pub const ALU: u16 = CI | ALU_FIXED;

/// Bit pattern for a bare `JMP` line with no ALU expression: compute
/// `-1` and jump unconditionally.
pub const BARE_JMP: u16 = ALU | OPR_NEG1 | JUMP_LT | JUMP_EQ | JUMP_GT;

/// One entry of the ALU operand expression table: source text paired with
/// the operand bits (`AA`/`U`/`OP1`/`OP0`/`ZX`/`SW`) it encodes to.
///
/// Order matches the machine's own dispatch table; kept in that order so a
/// diff against it stays legible.
pub const ALU_OPS: &[(&str, u16)] = &[
    ("0", OPR_ZX),
    ("1", OPR_U | OPR_OP0 | OPR_ZX),
    ("-1", OPR_NEG1),
    ("A", OPR_U | OPR_ZX),
    ("-A", OPR_U | OPR_OP1 | OPR_ZX),
    ("~A", OPR_OP1 | OPR_OP0 | OPR_SW),
    ("A+1", OPR_U | OPR_OP0 | OPR_SW),
    ("A-1", OPR_U | OPR_OP1 | OPR_OP0 | OPR_SW),
    ("A-D", OPR_U | OPR_OP1 | OPR_SW),
    ("D", OPR_U | OPR_ZX | OPR_SW),
    ("-D", OPR_U | OPR_OP1 | OPR_ZX | OPR_SW),
    ("~D", OPR_OP1 | OPR_OP0),
    ("D+1", OPR_U | OPR_OP0),
    ("D-1", OPR_U | OPR_OP1 | OPR_OP0),
    ("D+A", OPR_U),
    ("D+*A", AA | OPR_U),
    ("D-A", OPR_U | OPR_OP1),
    ("D-*A", AA | OPR_U | OPR_OP1),
    ("D&A", 0),
    ("D&*A", AA),
    ("D|A", OPR_OP0),
    ("D|*A", AA | OPR_OP0),
    ("D^A", OPR_OP1),
    ("D^*A", AA | OPR_OP1),
    ("*A", AA | OPR_U | OPR_ZX),
    ("-*A", AA | OPR_U | OPR_OP1 | OPR_ZX),
    ("~*A", AA | OPR_OP1 | OPR_OP0 | OPR_SW),
    ("*A+1", AA | OPR_U | OPR_OP0 | OPR_SW),
    ("*A-1", AA | OPR_U | OPR_OP1 | OPR_OP0 | OPR_SW),
    ("*A-D", AA | OPR_U | OPR_OP1 | OPR_SW),
];

/// Look up the operand bits for an ALU expression token, e.g. `"D+A"`.
pub fn alu_op_bits(token: &str) -> Option<u16> {
    ALU_OPS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, bits)| *bits)
}

/// Look up the target bits for an assignment-target token (`A`, `D`, `*A`).
pub fn target_bits(token: &str) -> Option<u16> {
    match token {
        "A" => Some(TARGET_A),
        "D" => Some(TARGET_D),
        "*A" => Some(TARGET_STAR_A),
        _ => None,
    }
}

/// The seven jump mnemonics, named after the comparison they act on:
/// Greater-Than, EQual, Less-Than and combinations thereof.
#[derive(Clone, Copy, Eq, PartialEq, Debug, EnumFromStr)]
pub enum JumpCond {
    JGT,
    JEQ,
    JGE,
    JLT,
    JNE,
    JLE,
    JMP,
}

impl JumpCond {
    /// Encode to the three jump condition bits.
    pub fn bits(self) -> u16 {
        match self {
            JumpCond::JGT => JUMP_GT,
            JumpCond::JEQ => JUMP_EQ,
            JumpCond::JGE => JUMP_EQ | JUMP_GT,
            JumpCond::JLT => JUMP_LT,
            JumpCond::JNE => JUMP_LT | JUMP_GT,
            JumpCond::JLE => JUMP_LT | JUMP_EQ,
            JumpCond::JMP => JUMP_LT | JUMP_EQ | JUMP_GT,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn alu_op_count_matches_reference_table() {
        assert_eq!(ALU_OPS.len(), 30);
    }

    #[test]
    fn neg1_op_matches_bare_jmp_operand_bits() {
        assert_eq!(alu_op_bits("-1").unwrap(), OPR_NEG1);
    }

    #[test]
    fn bare_jmp_is_alu_with_neg1_and_all_jumps() {
        assert_eq!(BARE_JMP, ALU | OPR_NEG1 | JUMP_LT | JUMP_EQ | JUMP_GT);
    }

    #[test]
    fn target_tokens_are_disjoint_bits() {
        assert_eq!(target_bits("A"), Some(TARGET_A));
        assert_eq!(target_bits("D"), Some(TARGET_D));
        assert_eq!(target_bits("*A"), Some(TARGET_STAR_A));
        assert_eq!(target_bits("X"), None);
    }

    #[test]
    fn jump_cond_from_str_round_trips() {
        assert_eq!("JGE".parse::<JumpCond>().unwrap(), JumpCond::JGE);
        assert_eq!(JumpCond::JGE.bits(), JUMP_EQ | JUMP_GT);
    }

    #[test]
    fn unknown_alu_op_is_none() {
        assert_eq!(alu_op_bits("D%A"), None);
    }

    /// I5: encoding is injective on the op-mnemonic table, so a decode
    /// table built by reversing it recovers the original mnemonic for
    /// every entry.
    #[test]
    fn alu_op_encoding_is_injective() {
        for (i, (_, bits_a)) in ALU_OPS.iter().enumerate() {
            for (name_b, bits_b) in ALU_OPS.iter().skip(i + 1) {
                assert_ne!(bits_a, bits_b, "\"{}\" collides with another op", name_b);
            }
        }
    }

    #[test]
    fn alu_op_decode_round_trips() {
        fn decode(bits: u16) -> Option<&'static str> {
            ALU_OPS.iter().find(|(_, b)| *b == bits).map(|(name, _)| *name)
        }

        for (name, bits) in ALU_OPS {
            assert_eq!(decode(alu_op_bits(name).unwrap()), Some(*name));
            assert_eq!(*bits, alu_op_bits(name).unwrap());
        }
    }
}
