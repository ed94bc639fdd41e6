use super::{Interrupt, MemoryMapped};

pub const P1_ADDR: u16 = 0xFF00;

/// The eight DMG buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

/// Snapshot of which buttons are held, as reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoypadState {
    pub right: bool,
    pub left: bool,
    pub up: bool,
    pub down: bool,
    pub a: bool,
    pub b: bool,
    pub select: bool,
    pub start: bool,
}

impl JoypadState {
    pub fn set(&mut self, button: Button, pressed: bool) {
        *self.slot(button) = pressed;
    }

    pub fn with(mut self, button: Button, pressed: bool) -> Self {
        self.set(button, pressed);
        self
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        match button {
            Button::Right => self.right,
            Button::Left => self.left,
            Button::Up => self.up,
            Button::Down => self.down,
            Button::A => self.a,
            Button::B => self.b,
            Button::Select => self.select,
            Button::Start => self.start,
        }
    }

    fn slot(&mut self, button: Button) -> &mut bool {
        match button {
            Button::Right => &mut self.right,
            Button::Left => &mut self.left,
            Button::Up => &mut self.up,
            Button::Down => &mut self.down,
            Button::A => &mut self.a,
            Button::B => &mut self.b,
            Button::Select => &mut self.select,
            Button::Start => &mut self.start,
        }
    }

    /// Held d-pad keys, 1 = pressed: Right, Left, Up, Down in bits 0-3.
    fn dpad_bits(&self) -> u8 {
        u8::from(self.right)
            | u8::from(self.left) << 1
            | u8::from(self.up) << 2
            | u8::from(self.down) << 3
    }

    /// Held action keys, 1 = pressed: A, B, Select, Start in bits 0-3.
    fn button_bits(&self) -> u8 {
        u8::from(self.a)
            | u8::from(self.b) << 1
            | u8::from(self.select) << 2
            | u8::from(self.start) << 3
    }
}

/// P1/JOYP (0xFF00).
///
/// Bits 5 and 4 select the action and direction groups (0 selects); the
/// low nibble reports the selected keys active-low.
pub struct Joypad {
    select: u8,
    state: JoypadState,
    requested: Interrupt,
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new()
    }
}

impl Joypad {
    pub fn new() -> Self {
        Self {
            select: 0x30,
            state: JoypadState::default(),
            requested: Interrupt::empty(),
        }
    }

    #[inline]
    fn dpad_selected(&self) -> bool {
        self.select & 0x10 == 0
    }

    #[inline]
    fn buttons_selected(&self) -> bool {
        self.select & 0x20 == 0
    }

    /// Replace the held-button snapshot.
    ///
    /// A key that goes from released to pressed requests the Joypad
    /// interrupt when its group is currently selected.
    pub fn set_state(&mut self, state: JoypadState) {
        let new_dpad = state.dpad_bits() & !self.state.dpad_bits();
        let new_buttons = state.button_bits() & !self.state.button_bits();

        if (self.dpad_selected() && new_dpad != 0)
            || (self.buttons_selected() && new_buttons != 0)
        {
            log::trace!("joypad interrupt: dpad={new_dpad:04b} buttons={new_buttons:04b}");
            self.requested |= Interrupt::JOYPAD;
        }
        self.state = state;
    }

    pub fn state(&self) -> JoypadState {
        self.state
    }
}

impl MemoryMapped for Joypad {
    fn accepts(&self, addr: u16) -> bool {
        addr == P1_ADDR
    }

    fn read(&self, _addr: u16) -> u8 {
        let mut pressed = 0;
        if self.dpad_selected() {
            pressed |= self.state.dpad_bits();
        }
        if self.buttons_selected() {
            pressed |= self.state.button_bits();
        }
        0xC0 | self.select | (!pressed & 0x0F)
    }

    fn write(&mut self, _addr: u16, value: u8) {
        self.select = value & 0x30;
    }

    fn take_interrupts(&mut self) -> Interrupt {
        std::mem::take(&mut self.requested)
    }
}
