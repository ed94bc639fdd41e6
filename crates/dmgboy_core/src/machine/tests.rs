use super::cartridge::tests::rom_image;
use super::*;
use crate::frontend::{Color, Display, Input};
use crate::GbError;

/// A 32 KiB ROM-only cartridge with `code` at the entry point.
fn gameboy_with_code(code: &[u8]) -> GameBoy {
    let mut gb = GameBoy::with_config(GameBoyConfig::builder().frame_pacing(false).build());
    gb.load_cartridge(&rom_image(0x00, 2, 0x00, code)).unwrap();
    gb
}

struct FrameCounter {
    presented: usize,
    last: Vec<u8>,
}

impl Display for FrameCounter {
    fn present(&mut self, frame: &[u8], palette: &[Color; 4]) {
        assert_eq!(palette[0], Color::WHITE);
        self.presented += 1;
        self.last = frame.to_vec();
    }
}

/// Stops after `frames` polls.
struct StopAfter {
    frames: usize,
    polls: usize,
}

impl Input for StopAfter {
    fn poll(&mut self) -> JoypadState {
        self.polls += 1;
        JoypadState::default()
    }

    fn should_stop(&mut self) -> bool {
        self.polls >= self.frames
    }
}

#[test]
fn minimal_rom_loops_without_interrupts() {
    // LD A,5 ; INC A ; JP 0x0100
    let mut gb = gameboy_with_code(&[0x3E, 0x05, 0x3C, 0xC3, 0x00, 0x01]);

    for _ in 0..3 * 100 {
        gb.step().unwrap();
    }

    assert_eq!(gb.cpu.regs.a, 0x06);
    assert_eq!(gb.cpu.regs.pc, 0x0100);
    assert_eq!(gb.bus_mut().read(IF_ADDR) & 0x1F, 0);
}

#[test]
fn step_reports_instruction_cycles() {
    let mut gb = gameboy_with_code(&[0x3E, 0x05, 0x3C, 0xC3, 0x00, 0x01]);
    assert_eq!(gb.step().unwrap(), 8);
    assert_eq!(gb.step().unwrap(), 4);
    assert_eq!(gb.step().unwrap(), 16);
}

#[test]
fn illegal_opcode_aborts_step() {
    let mut gb = gameboy_with_code(&[0xD3]);
    assert_eq!(
        gb.step(),
        Err(GbError::IllegalOpcode {
            opcode: 0xD3,
            pc: 0x0100
        })
    );
}

#[test]
fn io_registers_round_trip() {
    let mut bus = MemoryBus::new();
    let plain = [
        0xFF01, // SB
        0xFF05, // TIMA
        0xFF06, // TMA
        0xFF42, // SCY
        0xFF43, // SCX
        0xFF45, // LYC
        0xFF47, // BGP
        0xFF48, // OBP0
        0xFF49, // OBP1
        0xFF4A, // WY
        0xFF4B, // WX
        IE_ADDR,
    ];
    for addr in plain {
        for value in [0x00, 0x5A, 0xA5, 0xFF] {
            bus.write(addr, value);
            assert_eq!(bus.read(addr), value, "0x{addr:04X}");
        }
    }

    bus.write(0xFF02, 0x01);
    assert_eq!(bus.read(0xFF02), 0x01);

    bus.write(0xFF40, 0xE3);
    assert_eq!(bus.read(0xFF40), 0xE3);

    bus.write(0xFF07, 0xFD);
    assert_eq!(bus.read(0xFF07), 0xFD);
    bus.write(0xFF07, 0x02);
    assert_eq!(bus.read(0xFF07), 0xFA);

    bus.write(IF_ADDR, 0x15);
    assert_eq!(bus.read(IF_ADDR), 0xF5);

    bus.write(0xFF46, 0xC0);
    assert_eq!(bus.read(0xFF46), 0xC0);
}

#[test]
fn read_only_and_live_bits() {
    let mut bus = MemoryBus::new();

    let ly = bus.read(0xFF44);
    bus.write(0xFF44, ly.wrapping_add(7));
    assert_eq!(bus.read(0xFF44), ly);

    // Mode and coincidence bits of STAT are not writable.
    bus.write(0xFF41, 0x07);
    assert_eq!(bus.read(0xFF41) & 0x78, 0);
    assert_eq!(bus.read(0xFF41) & 0x03, PpuMode::OamScan as u8);

    // Joypad: only the select bits stick, the nibble is live.
    bus.write(0xFF00, 0x0F);
    assert_eq!(bus.read(0xFF00), 0xCF);
    bus.write(0xFF00, 0x10);
    bus.set_joypad(JoypadState::default().with(Button::Start, true));
    assert_eq!(bus.read(0xFF00), 0xD7);
}

#[test]
fn unmapped_addresses_read_ff() {
    let mut bus = MemoryBus::new();
    for addr in [0x0000, 0x4000, 0xA000, 0xFF03, 0xFF4C, 0xFF50, 0xFF7F, 0xFEA0] {
        assert_eq!(bus.read(addr), 0xFF, "0x{addr:04X}");
    }
    bus.write(0xFF50, 0x01);
    assert_eq!(bus.read(0xFF50), 0xFF);
}

#[test]
fn echo_ram_mirrors_wram() {
    let mut bus = MemoryBus::new();
    bus.write(0xC123, 0x42);
    assert_eq!(bus.read(0xE123), 0x42);
    bus.write(0xFDFF, 0x24);
    assert_eq!(bus.read(0xDDFF), 0x24);
}

#[test]
fn first_mapped_device_wins() {
    let mut bus = MemoryBus::unmapped();
    assert_eq!(bus.read(0xFF80), 0xFF);

    bus.map(DeviceId::Ram);
    bus.write(0xFF80, 0x33);
    assert_eq!(bus.read(0xFF80), 0x33);
    // Remapping is ignored.
    bus.map(DeviceId::Ram);
    assert_eq!(bus.read(0xFF80), 0x33);
}

#[test]
fn timer_ticks_every_16_clocks_at_tac_5() {
    let mut bus = MemoryBus::new();
    bus.write(0xFF06, 0x42);
    bus.write(0xFF05, 0xFE);
    bus.write(0xFF07, 0x05);

    bus.advance(12);
    assert_eq!(bus.read(0xFF05), 0xFE);
    bus.advance(4);
    assert_eq!(bus.read(0xFF05), 0xFF);
    assert_eq!(bus.read(IF_ADDR) & 0x04, 0);

    bus.advance(16);
    assert_eq!(bus.read(0xFF05), 0x42);
    assert_eq!(bus.read(IF_ADDR) & 0x04, 0x04);
}

#[test]
fn timer_rates() {
    for (tac, period) in [(0x04u8, 1024u32), (0x05, 16), (0x06, 64), (0x07, 256)] {
        let mut timer = Timer::new();
        timer.write(0xFF04, 0);
        timer.write(0xFF07, tac);
        timer.update(period * 10);
        assert_eq!(timer.tima_increments, 10, "TAC=0x{tac:02X}");
        assert_eq!(timer.read(0xFF05), 10);
    }
}

#[test]
fn timer_disabled_does_not_count() {
    let mut timer = Timer::new();
    timer.write(0xFF07, 0x01);
    timer.update(10_000);
    assert_eq!(timer.read(0xFF05), 0);
}

#[test]
fn div_counts_and_resets_on_write() {
    let mut bus = MemoryBus::new();
    assert_eq!(bus.read(0xFF04), 0xAB);

    bus.write(0xFF04, 0x77);
    assert_eq!(bus.read(0xFF04), 0x00);
    bus.advance(255);
    assert_eq!(bus.read(0xFF04), 0x00);
    bus.advance(1);
    assert_eq!(bus.read(0xFF04), 0x01);
    bus.advance(256 * 255);
    assert_eq!(bus.read(0xFF04), 0x00);
}

#[test]
fn div_reset_can_tick_tima() {
    let mut timer = Timer::new();
    timer.write(0xFF04, 0);
    timer.write(0xFF07, 0x05);
    // Counter bit 1 is now high.
    timer.update(8);
    assert_eq!(timer.read(0xFF05), 0);
    timer.write(0xFF04, 0);
    assert_eq!(timer.read(0xFF05), 1);
}

#[test]
fn joypad_interrupt_on_new_press_in_selected_group() {
    let mut bus = MemoryBus::new();
    // Select the d-pad only.
    bus.write(0xFF00, 0x20);

    bus.set_joypad(JoypadState::default().with(Button::A, true));
    assert_eq!(bus.read(IF_ADDR) & 0x10, 0);
    assert_eq!(bus.read(0xFF00) & 0x0F, 0x0F);

    bus.set_joypad(
        JoypadState::default()
            .with(Button::A, true)
            .with(Button::Right, true),
    );
    assert_eq!(bus.read(IF_ADDR) & 0x10, 0x10);
    assert_eq!(bus.read(0xFF00), 0xEE);

    // Holding does not re-request.
    bus.write(IF_ADDR, 0x00);
    bus.set_joypad(
        JoypadState::default()
            .with(Button::A, true)
            .with(Button::Right, true),
    );
    assert_eq!(bus.read(IF_ADDR) & 0x10, 0);
}

#[test]
fn oam_dma_copies_one_byte_per_machine_cycle() {
    let mut bus = MemoryBus::new();
    for i in 0..0xA0u16 {
        bus.write(0xC100 + i, i as u8 ^ 0x5A);
    }
    bus.write(0xFF46, 0xC1);
    assert!(bus.ppu.dma_active());

    bus.advance(636);
    assert!(bus.ppu.dma_active());
    assert_eq!(bus.read(0xFE00), 0x5A);
    assert_eq!(bus.read(0xFE9E), 0x9E ^ 0x5A);
    assert_eq!(bus.read(0xFE9F), 0x00);

    bus.advance(4);
    assert!(!bus.ppu.dma_active());
    for i in 0..0xA0u16 {
        assert_eq!(bus.read(0xFE00 + i), i as u8 ^ 0x5A);
    }
}

#[test]
fn cpu_sees_only_hram_during_dma() {
    // LD A,0xC0 ; LDH (0x46),A ; LD A,(0xC000) ; JR -2
    let mut gb = gameboy_with_code(&[0x3E, 0xC0, 0xE0, 0x46, 0xFA, 0x00, 0xC0, 0x18, 0xFE]);
    gb.bus_mut().write(0xC000, 0x12);

    gb.step().unwrap();
    gb.step().unwrap();
    assert!(gb.bus().ppu.dma_active());

    // The opcode fetch from ROM is blocked as well and reads 0xFF (RST 38H).
    gb.step().unwrap();
    assert_eq!(gb.cpu.regs.pc, 0x0038);
}

#[test]
fn joypad_interrupt_dispatches_to_vector() {
    let mut rom = rom_image(
        0x00,
        2,
        0x00,
        // LD A,0x20 ; LDH (0x00),A ; LD A,0x10 ; LDH (0xFF),A ; EI ; JR -2
        &[0x3E, 0x20, 0xE0, 0x00, 0x3E, 0x10, 0xE0, 0xFF, 0xFB, 0x18, 0xFE],
    );
    // LD A,0x42 ; JR -2
    rom[0x60..0x64].copy_from_slice(&[0x3E, 0x42, 0x18, 0xFE]);

    let mut gb = GameBoy::with_config(GameBoyConfig::builder().frame_pacing(false).build());
    gb.load_cartridge(&rom).unwrap();
    for _ in 0..10 {
        gb.step().unwrap();
    }
    assert!(gb.cpu.ime);
    assert_eq!(gb.cpu.regs.pc, 0x0109);

    gb.set_joypad(JoypadState::default().with(Button::Up, true));
    for _ in 0..10 {
        gb.step().unwrap();
    }
    assert_eq!(gb.cpu.regs.a, 0x42);
    assert!((0x0060..0x0064).contains(&gb.cpu.regs.pc));
    assert_eq!(gb.bus_mut().read(IF_ADDR) & 0x10, 0);
}

#[test]
fn serial_transfer_is_captured() {
    // LD A,'H' ; LDH (0x01),A ; LD A,0x81 ; LDH (0x02),A ; JR -2
    let mut gb = gameboy_with_code(&[0x3E, b'H', 0xE0, 0x01, 0x3E, 0x81, 0xE0, 0x02, 0x18, 0xFE]);
    for _ in 0..5 {
        gb.step().unwrap();
    }
    assert_eq!(gb.serial_output(), b"H");
}

#[test]
fn step_frame_completes_one_frame() {
    let mut gb = gameboy_with_code(&[0x18, 0xFE]);
    assert!(gb.step_frame().unwrap());
    assert_eq!(gb.frame_count(), 1);
    assert!(gb.step_frame().unwrap());
    assert_eq!(gb.frame_count(), 2);
    assert_eq!(gb.framebuffer().len(), crate::SCREEN_WIDTH * crate::SCREEN_HEIGHT);
}

#[test]
fn frames_end_at_the_vblank_wrap() {
    // NOP ; JP 0x0100: a 20-clock loop that does not divide the frame length.
    let mut gb = gameboy_with_code(&[0x00, 0xC3, 0x00, 0x01]);
    for frame in 1..=400u64 {
        assert!(gb.step_frame().unwrap());
        assert_eq!(gb.frame_count(), frame);
        let ppu = &gb.bus().ppu;
        assert_eq!(ppu.ly(), 0, "frame {frame}");
        assert_eq!(ppu.mode(), PpuMode::OamScan, "frame {frame}");
    }
}

#[test]
fn lcd_off_frames_spend_the_cycle_budget() {
    // LD A,0x00 ; LDH (0x40),A ; JR -2
    let mut gb = gameboy_with_code(&[0x3E, 0x00, 0xE0, 0x40, 0x18, 0xFE]);
    for _ in 0..5 {
        assert!(!gb.step_frame().unwrap());
    }
    assert!(!gb.bus().ppu.lcd_enabled());
    assert_eq!(gb.frame_count(), 0);
}

#[test]
fn run_presents_frames_until_stopped() {
    let mut gb = gameboy_with_code(&[0x18, 0xFE]);
    let mut display = FrameCounter {
        presented: 0,
        last: Vec::new(),
    };
    let mut input = StopAfter {
        frames: 3,
        polls: 0,
    };

    gb.run(&mut display, &mut input).unwrap();
    assert_eq!(display.presented, 3);
    assert_eq!(display.last.len(), 160 * 144);
    assert_eq!(gb.frame_count(), 3);
}

#[test]
fn run_without_cartridge_is_invalid_rom() {
    let mut gb = GameBoy::new();
    let mut display = FrameCounter {
        presented: 0,
        last: Vec::new(),
    };
    let mut input = StopAfter {
        frames: 1,
        polls: 0,
    };
    assert!(matches!(
        gb.run(&mut display, &mut input),
        Err(GbError::InvalidRom(_))
    ));
    assert_eq!(display.presented, 0);
}

#[test]
fn load_rejects_bad_images() {
    let mut gb = GameBoy::new();
    assert!(matches!(
        gb.load_cartridge(&[0u8; 0x100]),
        Err(GbError::InvalidRom(_))
    ));
    assert_eq!(
        gb.load_cartridge(&rom_image(0x19, 2, 0x00, &[])),
        Err(GbError::UnsupportedMbc(0x19))
    );
    assert!(gb.cartridge().is_none());
}

#[test]
fn load_cartridge_file_reads_from_disk() {
    let path = std::env::temp_dir().join(format!("dmgboy-test-{}.gb", std::process::id()));
    std::fs::write(&path, rom_image(0x01, 4, 0x00, &[0x00])).unwrap();

    let mut gb = GameBoy::new();
    gb.load_cartridge_file(&path).unwrap();
    assert_eq!(gb.cartridge().unwrap().header().title, "TESTCART");
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(
        gb.load_cartridge_file(&path),
        Err(GbError::InvalidRom(_))
    ));
}

#[test]
fn reset_keeps_cartridge() {
    let mut gb = gameboy_with_code(&[0x3E, 0x05, 0x3C, 0xC3, 0x00, 0x01]);
    gb.step().unwrap();
    gb.step().unwrap();
    gb.reset();
    assert_eq!(gb.cpu.regs.pc, 0x0100);
    assert!(gb.cartridge().is_some());
    gb.step().unwrap();
    assert_eq!(gb.cpu.regs.a, 0x05);
}

#[test]
fn config_defaults() {
    let config = GameBoyConfig::default();
    assert!(config.frame_pacing);
    assert_eq!(config.clock_hz, 4_194_304);
    assert_eq!(config.cycles_per_frame(), 70_224);

    let fast = GameBoyConfig::builder().frame_rate(120.0).build();
    assert_eq!(fast.cycles_per_frame(), 34_953);
}

#[test]
fn unusable_frame_rates_fall_back_to_default() {
    for rate in [0.0, -60.0, 0.5, f64::NAN, f64::INFINITY] {
        let config = GameBoyConfig::builder().frame_rate(rate).build();
        assert_eq!(config.effective_frame_rate(), 59.7275);
        assert_eq!(config.cycles_per_frame(), 70_224);

        let gb = GameBoy::with_config(config);
        assert_eq!(gb.config().frame_rate, 59.7275);
    }
}

#[test]
fn paced_run_with_zero_frame_rate() {
    let config = GameBoyConfig::builder().frame_rate(0.0).build();
    let mut gb = GameBoy::with_config(config);
    gb.load_cartridge(&rom_image(0x00, 2, 0x00, &[0x18, 0xFE])).unwrap();
    let mut display = FrameCounter {
        presented: 0,
        last: Vec::new(),
    };
    let mut input = StopAfter {
        frames: 2,
        polls: 0,
    };
    gb.run(&mut display, &mut input).unwrap();
    assert_eq!(display.presented, 2);
}

#[test]
fn apu_power_gates_channel_registers() {
    let mut bus = MemoryBus::new();
    assert_eq!(bus.read(0xFF26) & 0x80, 0x80);
    bus.write(0xFF12, 0xF0);
    assert_eq!(bus.read(0xFF12), 0xF0);

    bus.write(0xFF26, 0x00);
    assert_eq!(bus.read(0xFF12), 0x00);
    bus.write(0xFF12, 0xF0);
    assert_eq!(bus.read(0xFF12), 0x00);
    assert_eq!(bus.read(0xFF26), 0x70);

    // Wave RAM stays writable.
    bus.write(0xFF30, 0x12);
    assert_eq!(bus.read(0xFF30), 0x12);
}
