use super::*;

/// `banks` ROM banks, each starting with its bank number.
fn mbc1(banks: usize, ram_size: usize) -> Mbc1 {
    let mut rom = vec![0u8; banks * ROM_BANK_SIZE];
    for (bank, chunk) in rom.chunks_mut(ROM_BANK_SIZE).enumerate() {
        chunk[0] = bank as u8;
    }
    Mbc1::new(rom, vec![0; ram_size])
}

#[test]
fn power_on_registers() {
    let mbc = mbc1(4, 0);
    assert_eq!(
        (mbc.ram_gate, mbc.bank_low, mbc.bank_high, mbc.mode),
        (0, 1, 0, 0)
    );
    assert_eq!(mbc.read(0x4000).unwrap(), 1);
}

#[test]
fn registers_store_masked_values() {
    let mut mbc = mbc1(4, 0);
    for value in 0..=0xFFu8 {
        mbc.write(0x0000, value).unwrap();
        mbc.write(0x2000, value).unwrap();
        mbc.write(0x4000, value).unwrap();
        mbc.write(0x6000, value).unwrap();

        let low = if value & 0x1F == 0 { 1 } else { value & 0x1F };
        assert_eq!(mbc.ram_gate, value & 0x0F);
        assert_eq!(mbc.bank_low, low);
        assert_eq!(mbc.bank_high, value & 0x03);
        assert_eq!(mbc.mode, value & 0x01);
    }
}

#[test]
fn zero_bank_becomes_one() {
    let mut mbc = mbc1(64, 0);
    mbc.write(0x2000, 0x00).unwrap();
    assert_eq!(mbc.bank_low, 1);
    // 0x20 keeps only its low five bits, which are zero.
    mbc.write(0x2000, 0x20).unwrap();
    assert_eq!(mbc.bank_low, 1);
    assert_eq!(mbc.read(0x4000).unwrap(), 1);
}

#[test]
fn bank_switching_selects_rom_window() {
    let mut mbc = mbc1(8, 0);
    mbc.write(0x2000, 0x05).unwrap();
    assert_eq!(mbc.read(0x4000).unwrap(), 5);
    assert_eq!(mbc.read(0x0000).unwrap(), 0);
}

#[test]
fn bank_number_wraps_to_rom_size() {
    let mut mbc = mbc1(4, 0);
    mbc.write(0x2000, 0x06).unwrap();
    assert_eq!(mbc.read(0x4000).unwrap(), 2);
}

#[test]
fn high_bits_extend_bank_and_mode_one_maps_first_window() {
    let mut mbc = mbc1(128, 0);
    mbc.write(0x2000, 0x03).unwrap();
    mbc.write(0x4000, 0x02).unwrap();
    assert_eq!(mbc.read(0x4000).unwrap(), 0x43);
    assert_eq!(mbc.read(0x0000).unwrap(), 0);

    mbc.write(0x6000, 0x01).unwrap();
    assert_eq!(mbc.read(0x0000).unwrap(), 0x40);
    assert_eq!(mbc.read(0x4000).unwrap(), 0x43);
}

#[test]
fn ram_needs_gate() {
    let mut mbc = mbc1(4, 0x2000);
    mbc.write(0xA000, 0x12).unwrap();
    assert_eq!(mbc.read(0xA000).unwrap(), 0xFF);

    mbc.write(0x0000, 0x0A).unwrap();
    mbc.write(0xA000, 0x12).unwrap();
    assert_eq!(mbc.read(0xA000).unwrap(), 0x12);

    mbc.write(0x0000, 0x00).unwrap();
    assert_eq!(mbc.read(0xA000).unwrap(), 0xFF);
    // Only the low nibble counts.
    mbc.write(0x0000, 0xFA).unwrap();
    assert_eq!(mbc.read(0xA000).unwrap(), 0x12);
}

#[test]
fn ram_banking_in_mode_one() {
    let mut mbc = mbc1(4, 0x8000);
    mbc.write(0x0000, 0x0A).unwrap();
    mbc.write(0x6000, 0x01).unwrap();

    mbc.write(0x4000, 0x00).unwrap();
    mbc.write(0xA000, 0x11).unwrap();
    mbc.write(0x4000, 0x02).unwrap();
    mbc.write(0xA000, 0x22).unwrap();
    assert_eq!(mbc.ram[0x0000], 0x11);
    assert_eq!(mbc.ram[0x4000], 0x22);

    // Mode 0 always uses RAM bank 0.
    mbc.write(0x6000, 0x00).unwrap();
    assert_eq!(mbc.read(0xA000).unwrap(), 0x11);
}

#[test]
fn small_ram_wraps() {
    let mut mbc = mbc1(4, 0x800);
    mbc.write(0x0000, 0x0A).unwrap();
    mbc.write(0xA000, 0x77).unwrap();
    assert_eq!(mbc.read(0xA800).unwrap(), 0x77);
}

#[test]
fn out_of_window_is_a_routing_error() {
    let mut mbc = mbc1(4, 0);
    assert_eq!(mbc.read(0x9000), Err(GbError::BusRouting { address: 0x9000 }));
    assert_eq!(mbc.write(0xC000, 0), Err(GbError::BusRouting { address: 0xC000 }));
}

thread_local! {
    static CAPTURED: std::cell::RefCell<Vec<String>> = const { std::cell::RefCell::new(Vec::new()) };
}

/// Collects debug records emitted on the calling thread.
struct ThreadLog;

impl log::Log for ThreadLog {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Debug
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            CAPTURED.with(|lines| lines.borrow_mut().push(record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static THREAD_LOG: ThreadLog = ThreadLog;

fn debug_lines(f: impl FnOnce()) -> Vec<String> {
    // Another test may have installed the logger already.
    let _ = log::set_logger(&THREAD_LOG);
    log::set_max_level(log::LevelFilter::Debug);
    CAPTURED.with(|lines| lines.borrow_mut().clear());
    f();
    CAPTURED.with(|lines| lines.take())
}

#[test]
fn register_changes_are_logged_at_debug() {
    let mut mbc = mbc1(8, 0x2000);
    let lines = debug_lines(|| {
        mbc.write(0x0000, 0x0A).unwrap();
        mbc.write(0x2000, 0x03).unwrap();
        mbc.write(0x4000, 0x01).unwrap();
        mbc.write(0x6000, 0x01).unwrap();
        // Rewriting the same values stays quiet.
        mbc.write(0x0000, 0x0A).unwrap();
        mbc.write(0x2000, 0x03).unwrap();
    });
    assert_eq!(
        lines,
        [
            "MBC1 RAM enabled",
            "MBC1 bank low = 0x03",
            "MBC1 bank high = 1",
            "MBC1 banking mode = 1",
        ]
    );
}
