use std::fmt;

/// Errors surfaced by the emulator core.
///
/// None of these are transient: each one means either the ROM is not
/// something we can run or the emulator itself has a bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GbError {
    /// The ROM image is malformed, fails its header checksum, or the
    /// machine was started without one.
    InvalidRom(String),
    /// The cartridge type byte names a bank controller we do not emulate.
    UnsupportedMbc(u8),
    /// The CPU decoded one of the undefined opcodes.
    IllegalOpcode { opcode: u8, pc: u16 },
    /// An address reached a device (or an MBC window) that does not
    /// handle it.
    BusRouting { address: u16 },
}

impl fmt::Display for GbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GbError::InvalidRom(reason) => write!(f, "invalid ROM: {reason}"),
            GbError::UnsupportedMbc(kind) => {
                write!(f, "unsupported cartridge type 0x{kind:02X}")
            }
            GbError::IllegalOpcode { opcode, pc } => {
                write!(f, "illegal opcode 0x{opcode:02X} at PC=0x{pc:04X}")
            }
            GbError::BusRouting { address } => {
                write!(f, "no device handles address 0x{address:04X}")
            }
        }
    }
}

impl std::error::Error for GbError {}
