//! Static decode tables for the LR35902 instruction set.
//!
//! Two immutable 256-entry tables (primary and CB-prefixed) describe every
//! opcode: what it does, how its operands are addressed, and how many
//! T-cycles it consumes on each path. The CPU core never decodes bit fields
//! at execution time; it looks the opcode up here and dispatches on
//! [`Kind`].

use once_cell::sync::Lazy;

/// Instruction kinds for the primary and CB tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Nop,
    Ld,
    Inc,
    Dec,
    Rlca,
    Add,
    Rrca,
    Stop,
    Rla,
    Jr,
    Rra,
    Daa,
    Cpl,
    Scf,
    Ccf,
    Halt,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
    Pop,
    Jp,
    Push,
    Ret,
    Prefix,
    Call,
    Reti,
    Ldh,
    Di,
    Ei,
    Rst,
    /// Unused opcode slot. Executing one is a fatal emulator error.
    Err,
    // CB-prefixed kinds
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
    Bit,
    Res,
    Set,
}

/// Operand addressing modes.
///
/// `Mr` is "memory at register pair". The `Hli`/`Hld` variants read or write
/// through HL and then increment/decrement it. `A8`/`Hc` variants address
/// the 0xFF00 I/O page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    Imp,
    R,
    RR,
    RD8,
    RD16,
    Mr,
    MrR,
    RMr,
    RHli,
    RHld,
    HliR,
    HldR,
    RA8,
    A8R,
    RHc,
    HcR,
    A16R,
    RA16,
    D16R,
    D8,
    D16,
    MrD8,
    HlSpR8,
    CcD16,
    CcD8,
    Cc,
}

/// Register operands, including the 16-bit pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    None,
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
    Af,
    Bc,
    De,
    Hl,
    Sp,
    Pc,
}

impl Reg {
    /// Whether this operand names a 16-bit register pair.
    pub fn is_pair(self) -> bool {
        matches!(
            self,
            Reg::Af | Reg::Bc | Reg::De | Reg::Hl | Reg::Sp | Reg::Pc
        )
    }
}

/// Branch conditions for conditional jumps, calls and returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    None,
    Nz,
    Z,
    Nc,
    C,
}

/// One decoded opcode slot.
///
/// `cycles` is the T-cycle cost of the taken/unconditional path;
/// `alt_cycles` the not-taken path. For unconditional instructions the two
/// are equal.
#[derive(Debug, Clone, Copy)]
pub struct Instruction {
    pub kind: Kind,
    pub mode: AddrMode,
    pub reg1: Reg,
    pub reg2: Reg,
    pub cond: Cond,
    pub param: u8,
    pub cycles: u8,
    pub alt_cycles: u8,
}

const fn ins(kind: Kind, mode: AddrMode, reg1: Reg, reg2: Reg, cycles: u8) -> Instruction {
    Instruction {
        kind,
        mode,
        reg1,
        reg2,
        cond: Cond::None,
        param: 0,
        cycles,
        alt_cycles: cycles,
    }
}

const fn imp(kind: Kind, cycles: u8) -> Instruction {
    ins(kind, AddrMode::Imp, Reg::None, Reg::None, cycles)
}

const fn branch(kind: Kind, mode: AddrMode, cond: Cond, cycles: u8, alt_cycles: u8) -> Instruction {
    Instruction {
        kind,
        mode,
        reg1: Reg::None,
        reg2: Reg::None,
        cond,
        param: 0,
        cycles,
        alt_cycles,
    }
}

const fn rst(target: u8) -> Instruction {
    Instruction {
        kind: Kind::Rst,
        mode: AddrMode::Imp,
        reg1: Reg::None,
        reg2: Reg::None,
        cond: Cond::None,
        param: target,
        cycles: 16,
        alt_cycles: 16,
    }
}

const ERR_SLOT: Instruction = imp(Kind::Err, 4);

/// Register order used by the regular src/dst bit fields of the opcode map.
/// Index 6 is the (HL) memory slot.
const R8: [Reg; 8] = [
    Reg::B,
    Reg::C,
    Reg::D,
    Reg::E,
    Reg::H,
    Reg::L,
    Reg::Hl,
    Reg::A,
];

/// Primary opcode table. Built once on first use.
pub static PRIMARY: Lazy<[Instruction; 256]> = Lazy::new(build_primary);

/// CB-prefixed opcode table. Cycle counts include the prefix fetch.
pub static CB: Lazy<[Instruction; 256]> = Lazy::new(build_cb);

/// Look up a primary-table opcode.
#[inline]
pub fn decode(opcode: u8) -> &'static Instruction {
    &PRIMARY[opcode as usize]
}

/// Look up a CB-prefixed opcode.
#[inline]
pub fn decode_cb(opcode: u8) -> &'static Instruction {
    &CB[opcode as usize]
}

fn build_primary() -> [Instruction; 256] {
    use AddrMode::*;
    use Kind::*;

    let mut t = [ERR_SLOT; 256];

    // 0x00 - 0x0F
    t[0x00] = imp(Nop, 4);
    t[0x01] = ins(Ld, RD16, Reg::Bc, Reg::None, 12);
    t[0x02] = ins(Ld, MrR, Reg::Bc, Reg::A, 8);
    t[0x03] = ins(Inc, R, Reg::Bc, Reg::None, 8);
    t[0x04] = ins(Inc, R, Reg::B, Reg::None, 4);
    t[0x05] = ins(Dec, R, Reg::B, Reg::None, 4);
    t[0x06] = ins(Ld, RD8, Reg::B, Reg::None, 8);
    t[0x07] = imp(Rlca, 4);
    t[0x08] = ins(Ld, D16R, Reg::None, Reg::Sp, 20);
    t[0x09] = ins(Add, RR, Reg::Hl, Reg::Bc, 8);
    t[0x0A] = ins(Ld, RMr, Reg::A, Reg::Bc, 8);
    t[0x0B] = ins(Dec, R, Reg::Bc, Reg::None, 8);
    t[0x0C] = ins(Inc, R, Reg::C, Reg::None, 4);
    t[0x0D] = ins(Dec, R, Reg::C, Reg::None, 4);
    t[0x0E] = ins(Ld, RD8, Reg::C, Reg::None, 8);
    t[0x0F] = imp(Rrca, 4);

    // 0x10 - 0x1F
    t[0x10] = imp(Stop, 4);
    t[0x11] = ins(Ld, RD16, Reg::De, Reg::None, 12);
    t[0x12] = ins(Ld, MrR, Reg::De, Reg::A, 8);
    t[0x13] = ins(Inc, R, Reg::De, Reg::None, 8);
    t[0x14] = ins(Inc, R, Reg::D, Reg::None, 4);
    t[0x15] = ins(Dec, R, Reg::D, Reg::None, 4);
    t[0x16] = ins(Ld, RD8, Reg::D, Reg::None, 8);
    t[0x17] = imp(Rla, 4);
    t[0x18] = branch(Jr, D8, Cond::None, 12, 12);
    t[0x19] = ins(Add, RR, Reg::Hl, Reg::De, 8);
    t[0x1A] = ins(Ld, RMr, Reg::A, Reg::De, 8);
    t[0x1B] = ins(Dec, R, Reg::De, Reg::None, 8);
    t[0x1C] = ins(Inc, R, Reg::E, Reg::None, 4);
    t[0x1D] = ins(Dec, R, Reg::E, Reg::None, 4);
    t[0x1E] = ins(Ld, RD8, Reg::E, Reg::None, 8);
    t[0x1F] = imp(Rra, 4);

    // 0x20 - 0x2F
    t[0x20] = branch(Jr, CcD8, Cond::Nz, 12, 8);
    t[0x21] = ins(Ld, RD16, Reg::Hl, Reg::None, 12);
    t[0x22] = ins(Ld, HliR, Reg::Hl, Reg::A, 8);
    t[0x23] = ins(Inc, R, Reg::Hl, Reg::None, 8);
    t[0x24] = ins(Inc, R, Reg::H, Reg::None, 4);
    t[0x25] = ins(Dec, R, Reg::H, Reg::None, 4);
    t[0x26] = ins(Ld, RD8, Reg::H, Reg::None, 8);
    t[0x27] = imp(Daa, 4);
    t[0x28] = branch(Jr, CcD8, Cond::Z, 12, 8);
    t[0x29] = ins(Add, RR, Reg::Hl, Reg::Hl, 8);
    t[0x2A] = ins(Ld, RHli, Reg::A, Reg::Hl, 8);
    t[0x2B] = ins(Dec, R, Reg::Hl, Reg::None, 8);
    t[0x2C] = ins(Inc, R, Reg::L, Reg::None, 4);
    t[0x2D] = ins(Dec, R, Reg::L, Reg::None, 4);
    t[0x2E] = ins(Ld, RD8, Reg::L, Reg::None, 8);
    t[0x2F] = imp(Cpl, 4);

    // 0x30 - 0x3F
    t[0x30] = branch(Jr, CcD8, Cond::Nc, 12, 8);
    t[0x31] = ins(Ld, RD16, Reg::Sp, Reg::None, 12);
    t[0x32] = ins(Ld, HldR, Reg::Hl, Reg::A, 8);
    t[0x33] = ins(Inc, R, Reg::Sp, Reg::None, 8);
    t[0x34] = ins(Inc, Mr, Reg::Hl, Reg::None, 12);
    t[0x35] = ins(Dec, Mr, Reg::Hl, Reg::None, 12);
    t[0x36] = ins(Ld, MrD8, Reg::Hl, Reg::None, 12);
    t[0x37] = imp(Scf, 4);
    t[0x38] = branch(Jr, CcD8, Cond::C, 12, 8);
    t[0x39] = ins(Add, RR, Reg::Hl, Reg::Sp, 8);
    t[0x3A] = ins(Ld, RHld, Reg::A, Reg::Hl, 8);
    t[0x3B] = ins(Dec, R, Reg::Sp, Reg::None, 8);
    t[0x3C] = ins(Inc, R, Reg::A, Reg::None, 4);
    t[0x3D] = ins(Dec, R, Reg::A, Reg::None, 4);
    t[0x3E] = ins(Ld, RD8, Reg::A, Reg::None, 8);
    t[0x3F] = imp(Ccf, 4);

    // 0x40 - 0x7F: the regular LD block (0x76 is HALT).
    for op in 0x40..=0x7Fusize {
        if op == 0x76 {
            t[op] = imp(Halt, 4);
            continue;
        }
        let dst = R8[(op >> 3) & 0x07];
        let src = R8[op & 0x07];
        t[op] = match ((op >> 3) & 0x07, op & 0x07) {
            (6, _) => ins(Ld, MrR, Reg::Hl, src, 8),
            (_, 6) => ins(Ld, RMr, dst, Reg::Hl, 8),
            _ => ins(Ld, RR, dst, src, 4),
        };
    }

    // 0x80 - 0xBF: the regular 8-bit ALU block.
    const ALU: [Kind; 8] = [Add, Adc, Sub, Sbc, And, Xor, Or, Cp];
    for op in 0x80..=0xBFusize {
        let kind = ALU[(op - 0x80) >> 3];
        let src = R8[op & 0x07];
        t[op] = if op & 0x07 == 6 {
            ins(kind, RMr, Reg::A, Reg::Hl, 8)
        } else {
            ins(kind, RR, Reg::A, src, 4)
        };
    }

    // 0xC0 - 0xCF
    t[0xC0] = branch(Ret, Cc, Cond::Nz, 20, 8);
    t[0xC1] = ins(Pop, R, Reg::Bc, Reg::None, 12);
    t[0xC2] = branch(Jp, CcD16, Cond::Nz, 16, 12);
    t[0xC3] = branch(Jp, D16, Cond::None, 16, 16);
    t[0xC4] = branch(Call, CcD16, Cond::Nz, 24, 12);
    t[0xC5] = ins(Push, R, Reg::Bc, Reg::None, 16);
    t[0xC6] = ins(Add, RD8, Reg::A, Reg::None, 8);
    t[0xC7] = rst(0x00);
    t[0xC8] = branch(Ret, Cc, Cond::Z, 20, 8);
    t[0xC9] = imp(Ret, 16);
    t[0xCA] = branch(Jp, CcD16, Cond::Z, 16, 12);
    t[0xCB] = imp(Prefix, 4);
    t[0xCC] = branch(Call, CcD16, Cond::Z, 24, 12);
    t[0xCD] = branch(Call, D16, Cond::None, 24, 24);
    t[0xCE] = ins(Adc, RD8, Reg::A, Reg::None, 8);
    t[0xCF] = rst(0x08);

    // 0xD0 - 0xDF (0xD3/0xDB/0xDD stay ERR)
    t[0xD0] = branch(Ret, Cc, Cond::Nc, 20, 8);
    t[0xD1] = ins(Pop, R, Reg::De, Reg::None, 12);
    t[0xD2] = branch(Jp, CcD16, Cond::Nc, 16, 12);
    t[0xD4] = branch(Call, CcD16, Cond::Nc, 24, 12);
    t[0xD5] = ins(Push, R, Reg::De, Reg::None, 16);
    t[0xD6] = ins(Sub, RD8, Reg::A, Reg::None, 8);
    t[0xD7] = rst(0x10);
    t[0xD8] = branch(Ret, Cc, Cond::C, 20, 8);
    t[0xD9] = imp(Reti, 16);
    t[0xDA] = branch(Jp, CcD16, Cond::C, 16, 12);
    t[0xDC] = branch(Call, CcD16, Cond::C, 24, 12);
    t[0xDE] = ins(Sbc, RD8, Reg::A, Reg::None, 8);
    t[0xDF] = rst(0x18);

    // 0xE0 - 0xEF (0xE3/0xE4/0xEB/0xEC/0xED stay ERR)
    t[0xE0] = ins(Ldh, A8R, Reg::None, Reg::A, 12);
    t[0xE1] = ins(Pop, R, Reg::Hl, Reg::None, 12);
    t[0xE2] = ins(Ldh, HcR, Reg::C, Reg::A, 8);
    t[0xE5] = ins(Push, R, Reg::Hl, Reg::None, 16);
    t[0xE6] = ins(And, RD8, Reg::A, Reg::None, 8);
    t[0xE7] = rst(0x20);
    t[0xE8] = ins(Add, RD8, Reg::Sp, Reg::None, 16);
    t[0xE9] = ins(Jp, R, Reg::Hl, Reg::None, 4);
    t[0xEA] = ins(Ld, A16R, Reg::None, Reg::A, 16);
    t[0xEE] = ins(Xor, RD8, Reg::A, Reg::None, 8);
    t[0xEF] = rst(0x28);

    // 0xF0 - 0xFF (0xF4/0xFC/0xFD stay ERR)
    t[0xF0] = ins(Ldh, RA8, Reg::A, Reg::None, 12);
    t[0xF1] = ins(Pop, R, Reg::Af, Reg::None, 12);
    t[0xF2] = ins(Ldh, RHc, Reg::A, Reg::C, 8);
    t[0xF3] = imp(Di, 4);
    t[0xF5] = ins(Push, R, Reg::Af, Reg::None, 16);
    t[0xF6] = ins(Or, RD8, Reg::A, Reg::None, 8);
    t[0xF7] = rst(0x30);
    t[0xF8] = ins(Ld, HlSpR8, Reg::Hl, Reg::Sp, 12);
    t[0xF9] = ins(Ld, RR, Reg::Sp, Reg::Hl, 8);
    t[0xFA] = ins(Ld, RA16, Reg::A, Reg::None, 16);
    t[0xFB] = imp(Ei, 4);
    t[0xFE] = ins(Cp, RD8, Reg::A, Reg::None, 8);
    t[0xFF] = rst(0x38);

    t
}

fn build_cb() -> [Instruction; 256] {
    let mut t = [ERR_SLOT; 256];
    for op in 0..=0xFFusize {
        let mem = op & 0x07 == 6;
        let (kind, param) = match op >> 3 {
            0x00 => (Kind::Rlc, 0),
            0x01 => (Kind::Rrc, 0),
            0x02 => (Kind::Rl, 0),
            0x03 => (Kind::Rr, 0),
            0x04 => (Kind::Sla, 0),
            0x05 => (Kind::Sra, 0),
            0x06 => (Kind::Swap, 0),
            0x07 => (Kind::Srl, 0),
            0x08..=0x0F => (Kind::Bit, (op >> 3) as u8 - 0x08),
            0x10..=0x17 => (Kind::Res, (op >> 3) as u8 - 0x10),
            _ => (Kind::Set, (op >> 3) as u8 - 0x18),
        };
        // Register operations take 8 cycles; (HL) operations 16, except BIT
        // which only reads memory and finishes in 12.
        let cycles = if mem {
            if kind == Kind::Bit {
                12
            } else {
                16
            }
        } else {
            8
        };
        t[op] = Instruction {
            kind,
            mode: if mem { AddrMode::Mr } else { AddrMode::R },
            reg1: R8[op & 0x07],
            reg2: Reg::None,
            cond: Cond::None,
            param,
            cycles,
            alt_cycles: cycles,
        };
    }
    t
}
