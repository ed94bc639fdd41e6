//! Divider and programmable timer (0xFF04-0xFF07).
//!
//! Both counters hang off one free-running machine-cycle counter: DIV is
//! its bits 13..6, and TIMA counts falling edges of the counter bit that
//! TAC selects. That makes DIV resets and TAC changes behave like the
//! real circuit without any special cases.

use super::{Interrupt, MemoryMapped};

pub const DIV_ADDR: u16 = 0xFF04;
pub const TIMA_ADDR: u16 = 0xFF05;
pub const TMA_ADDR: u16 = 0xFF06;
pub const TAC_ADDR: u16 = 0xFF07;

pub struct Timer {
    /// Machine-cycle counter; DIV exposes its upper bits.
    counter: u16,
    tima: u8,
    tma: u8,
    /// Lower 3 bits meaningful.
    tac: u8,
    /// Clocks not yet folded into a whole machine cycle.
    pending_clocks: u32,
    requested: Interrupt,
    #[cfg(test)]
    pub(super) tima_increments: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Timer in its post-boot state: DIV reads 0xAB, counting disabled.
    pub fn new() -> Self {
        Self {
            counter: 0x2AC0,
            tima: 0,
            tma: 0,
            tac: 0,
            pending_clocks: 0,
            requested: Interrupt::empty(),
            #[cfg(test)]
            tima_increments: 0,
        }
    }

    #[inline]
    pub fn div(&self) -> u8 {
        (self.counter >> 6) as u8
    }

    #[inline]
    fn enabled(&self) -> bool {
        self.tac & 0x04 != 0
    }

    /// The counter bit TIMA watches, gated by the enable bit.
    ///
    /// TAC[1:0] = 00, 01, 10, 11 picks bit 7, 1, 3, 5: one TIMA step per
    /// 256, 4, 16 or 64 machine cycles.
    #[inline]
    fn timer_input(&self) -> bool {
        let bit = match self.tac & 0x03 {
            0x00 => 7,
            0x01 => 1,
            0x02 => 3,
            _ => 5,
        };
        self.enabled() && self.counter & (1 << bit) != 0
    }

    /// Advance by `cycles` clocks.
    pub fn update(&mut self, cycles: u32) {
        self.pending_clocks += cycles;
        while self.pending_clocks >= 4 {
            self.pending_clocks -= 4;
            self.tick_mcycle();
        }
    }

    fn tick_mcycle(&mut self) {
        let before = self.timer_input();
        self.counter = self.counter.wrapping_add(1);
        if before && !self.timer_input() {
            self.increment_tima();
        }
    }

    /// On overflow TIMA reloads from TMA and the Timer interrupt is raised.
    fn increment_tima(&mut self) {
        #[cfg(test)]
        {
            self.tima_increments += 1;
        }
        let (next, overflow) = self.tima.overflowing_add(1);
        if overflow {
            self.tima = self.tma;
            self.requested |= Interrupt::TIMER;
        } else {
            self.tima = next;
        }
    }

    /// Apply a change to the counter or TAC, catching the falling edge
    /// such a change can produce on the selected bit.
    fn with_edge_check(&mut self, change: impl FnOnce(&mut Self)) {
        let before = self.timer_input();
        change(self);
        if before && !self.timer_input() {
            self.increment_tima();
        }
    }
}

impl MemoryMapped for Timer {
    fn accepts(&self, addr: u16) -> bool {
        matches!(addr, DIV_ADDR..=TAC_ADDR)
    }

    fn read(&self, addr: u16) -> u8 {
        match addr {
            DIV_ADDR => self.div(),
            TIMA_ADDR => self.tima,
            TMA_ADDR => self.tma,
            // Upper five bits of TAC are unused and read as 1.
            _ => self.tac | 0xF8,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            // Any write clears the whole divider.
            DIV_ADDR => self.with_edge_check(|t| t.counter = 0),
            TIMA_ADDR => self.tima = value,
            TMA_ADDR => self.tma = value,
            _ => self.with_edge_check(|t| t.tac = value & 0x07),
        }
    }

    fn take_interrupts(&mut self) -> Interrupt {
        std::mem::take(&mut self.requested)
    }
}
