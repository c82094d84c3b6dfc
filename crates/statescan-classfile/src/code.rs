//! Best-effort scan of a method's `Code` attribute.
//!
//! The scanner walks the instruction stream once, recording the three facts
//! the class graph needs: invocation targets, field accesses, and class
//! literals pushed by `ldc`/`ldc_w`. Everything else is skipped by operand
//! width. A truncated or unrecognized tail ends the scan of that one method
//! body; it never fails the class.

use crate::constant_pool::{ConstantPool, MemberRef};
use crate::error::Result;
use crate::reader::Reader;

/// What a single method body references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeSummary {
    /// Targets of `invokevirtual`/`invokespecial`/`invokestatic`/`invokeinterface`.
    pub invocations: Vec<MemberRef>,
    /// Targets of `getstatic`/`putstatic`/`getfield`/`putfield`.
    pub field_accesses: Vec<MemberRef>,
    /// Class literals in bytecode order, internal (slash) form.
    ///
    /// Order matters: DI binding discovery pairs consecutive literals to
    /// recover `bind(X.class)` / `to(Y.class)` arguments.
    pub class_constants: Vec<String>,
}

pub(crate) fn parse_code_attribute(info: &[u8], cp: &ConstantPool) -> Result<CodeSummary> {
    let mut reader = Reader::new(info);
    reader.skip(2)?; // max_stack
    reader.skip(2)?; // max_locals
    let code_length = reader.read_u4()? as usize;
    let code = reader.read_bytes(code_length)?;
    // Exception table and nested attributes carry nothing the scan needs.
    Ok(scan_instructions(code, cp))
}

fn scan_instructions(code: &[u8], cp: &ConstantPool) -> CodeSummary {
    let mut summary = CodeSummary::default();
    let mut pc = 0usize;

    while pc < code.len() {
        let op = code[pc];
        match op {
            // getstatic / putstatic / getfield / putfield
            0xb2..=0xb5 => {
                let Some(index) = read_u16(code, pc + 1) else { break };
                if let Ok(member) = cp.member_ref(index) {
                    summary.field_accesses.push(member);
                }
                pc += 3;
            }
            // invokevirtual / invokespecial / invokestatic
            0xb6..=0xb8 => {
                let Some(index) = read_u16(code, pc + 1) else { break };
                if let Ok(member) = cp.member_ref(index) {
                    summary.invocations.push(member);
                }
                pc += 3;
            }
            // invokeinterface: index u2, count u1, zero u1
            0xb9 => {
                let Some(index) = read_u16(code, pc + 1) else { break };
                if let Ok(member) = cp.member_ref(index) {
                    summary.invocations.push(member);
                }
                pc += 5;
            }
            // invokedynamic: call-site owner is synthetic, nothing to record
            0xba => pc += 5,
            // ldc
            0x12 => {
                let Some(&index) = code.get(pc + 1) else { break };
                if let Some(name) = cp.class_constant(u16::from(index)) {
                    summary.class_constants.push(name);
                }
                pc += 2;
            }
            // ldc_w
            0x13 => {
                let Some(index) = read_u16(code, pc + 1) else { break };
                if let Some(name) = cp.class_constant(index) {
                    summary.class_constants.push(name);
                }
                pc += 3;
            }
            // ldc2_w loads long/double only
            0x14 => pc += 3,
            0xaa => match tableswitch_len(code, pc) {
                Some(len) => pc += len,
                None => break,
            },
            0xab => match lookupswitch_len(code, pc) {
                Some(len) => pc += len,
                None => break,
            },
            // wide: modified opcode follows, iinc carries an extra operand pair
            0xc4 => {
                let Some(&modified) = code.get(pc + 1) else { break };
                pc += if modified == 0x84 { 6 } else { 4 };
            }
            other => pc += 1 + operand_width(other),
        }
    }

    summary
}

fn read_u16(code: &[u8], at: usize) -> Option<u16> {
    let hi = *code.get(at)?;
    let lo = *code.get(at + 1)?;
    Some(u16::from_be_bytes([hi, lo]))
}

fn read_i32(code: &[u8], at: usize) -> Option<i32> {
    let bytes = code.get(at..at + 4)?;
    Some(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Total instruction length of a `tableswitch` starting at `pc`.
fn tableswitch_len(code: &[u8], pc: usize) -> Option<usize> {
    let pad = switch_padding(pc);
    let base = pc + 1 + pad;
    let low = read_i32(code, base + 4)?;
    let high = read_i32(code, base + 8)?;
    if high < low {
        return None;
    }
    let jumps = (high as i64 - low as i64 + 1) as usize;
    Some(1 + pad + 12 + jumps * 4)
}

/// Total instruction length of a `lookupswitch` starting at `pc`.
fn lookupswitch_len(code: &[u8], pc: usize) -> Option<usize> {
    let pad = switch_padding(pc);
    let base = pc + 1 + pad;
    let npairs = read_i32(code, base + 4)?;
    if npairs < 0 {
        return None;
    }
    Some(1 + pad + 8 + npairs as usize * 8)
}

fn switch_padding(pc: usize) -> usize {
    // Operands are aligned to a 4-byte boundary from the start of the code
    // array; the opcode itself sits at `pc`.
    (4 - ((pc + 1) % 4)) % 4
}

/// Operand byte count for the fixed-width instructions not handled above.
/// Unknown opcodes are treated as operand-free so the scan can continue.
fn operand_width(op: u8) -> usize {
    match op {
        0x10 => 1,          // bipush
        0x11 => 2,          // sipush
        0x15..=0x19 => 1,   // iload..aload
        0x36..=0x3a => 1,   // istore..astore
        0x84 => 2,          // iinc
        0x99..=0xa8 => 2,   // if<cond>, if_icmp<cond>, if_acmp<cond>, goto, jsr
        0xa9 => 1,          // ret
        0xbb => 2,          // new
        0xbc => 1,          // newarray
        0xbd => 2,          // anewarray
        0xc0 | 0xc1 => 2,   // checkcast, instanceof
        0xc5 => 3,          // multianewarray
        0xc6 | 0xc7 => 2,   // ifnull, ifnonnull
        0xc8 | 0xc9 => 4,   // goto_w, jsr_w
        _ => 0,
    }
}
