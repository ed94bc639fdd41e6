use super::Cpu;

/// Combine a high and a low byte into a 16-bit register pair.
#[inline]
pub const fn pair(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi, lo])
}

/// Split a 16-bit value into its (high, low) bytes.
#[inline]
pub const fn split(value: u16) -> (u8, u8) {
    let [hi, lo] = value.to_be_bytes();
    (hi, lo)
}

/// Registers for the Game Boy CPU (LR35902).
///
/// Eight independent 8-bit registers plus SP and PC. The 16-bit pairs are
/// derived through `pair`/`split` rather than stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    /// Register file as left by the DMG boot ROM.
    pub fn post_boot() -> Self {
        let mut regs = Self {
            sp: 0xFFFE,
            pc: 0x0100,
            ..Self::default()
        };
        regs.set_af(0x01B0);
        regs.set_bc(0x0013);
        regs.set_de(0x00D8);
        regs.set_hl(0x014D);
        regs
    }

    #[inline]
    pub fn f(&self) -> u8 {
        self.f
    }

    /// The only writer of F. The low nibble does not exist in hardware.
    #[inline]
    pub fn set_f(&mut self, value: u8) {
        self.f = value & 0xF0;
    }

    #[inline]
    pub fn af(&self) -> u16 {
        pair(self.a, self.f)
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        let (a, f) = split(value);
        self.a = a;
        self.set_f(f);
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        pair(self.b, self.c)
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        (self.b, self.c) = split(value);
    }

    #[inline]
    pub fn de(&self) -> u16 {
        pair(self.d, self.e)
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        (self.d, self.e) = split(value);
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        pair(self.h, self.l)
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        (self.h, self.l) = split(value);
    }
}

/// Flag bits in the F register.
///
/// - bit 7: Z (zero)
/// - bit 6: N (subtract)
/// - bit 5: H (half carry)
/// - bit 4: C (carry)
#[derive(Clone, Copy, Debug)]
pub enum Flag {
    Z = 7,
    N = 6,
    H = 5,
    C = 4,
}

impl Cpu {
    #[inline]
    pub fn get_flag(&self, flag: Flag) -> bool {
        let bit = flag as u8;
        (self.regs.f() & (1 << bit)) != 0
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        let bit = flag as u8;
        let f = self.regs.f();
        if value {
            self.regs.set_f(f | (1 << bit));
        } else {
            self.regs.set_f(f & !(1 << bit));
        }
    }

    #[inline]
    pub fn clear_flags(&mut self) {
        self.regs.set_f(0);
    }
}
