use crate::GbError;

/// Size of the area that must exist for a header to be readable.
pub const HEADER_END: usize = 0x150;

const LOGO: [u8; 48] = [
    0xCE, 0xED, 0x66, 0x66, 0xCC, 0x0D, 0x00, 0x0B, 0x03, 0x73, 0x00, 0x83, 0x00, 0x0C, 0x00, 0x0D,
    0x00, 0x08, 0x11, 0x1F, 0x88, 0x89, 0x00, 0x0E, 0xDC, 0xCC, 0x6E, 0xE6, 0xDD, 0xDD, 0xD9, 0x99,
    0xBB, 0xBB, 0x67, 0x63, 0x6E, 0x0E, 0xEC, 0xCC, 0xDD, 0xDC, 0x99, 0x9F, 0xBB, 0xB9, 0x33, 0x3E,
];

/// Decoded cartridge header (0x0100-0x014F).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartridgeHeader {
    pub entry_point: [u8; 4],
    pub logo: [u8; 48],
    pub title: String,
    pub manufacturer: [u8; 4],
    pub cgb_flag: u8,
    pub new_licensee: [u8; 2],
    pub sgb_flag: u8,
    pub cartridge_type: u8,
    pub rom_size_code: u8,
    pub ram_size_code: u8,
    pub destination: u8,
    pub old_licensee: u8,
    pub version: u8,
    pub header_checksum: u8,
    pub global_checksum: u16,
}

/// The boot ROM's header check: `x = x - byte - 1` over 0x0134..=0x014C.
pub fn header_checksum(rom: &[u8]) -> u8 {
    rom[0x134..=0x14C]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1))
}

/// Sum of every ROM byte except the two global checksum bytes.
pub fn global_checksum(rom: &[u8]) -> u16 {
    rom.iter()
        .enumerate()
        .filter(|&(i, _)| i != 0x14E && i != 0x14F)
        .fold(0u16, |acc, (_, &b)| acc.wrapping_add(u16::from(b)))
}

fn bytes<const N: usize>(rom: &[u8], start: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&rom[start..start + N]);
    out
}

impl CartridgeHeader {
    /// Decode and validate the header of `rom`.
    ///
    /// Fails with `InvalidRom` when the image is too short to hold a
    /// header or when the header checksum does not match.
    pub fn parse(rom: &[u8]) -> Result<Self, GbError> {
        if rom.len() < HEADER_END {
            return Err(GbError::InvalidRom(format!(
                "image is {} bytes, too short for a header",
                rom.len()
            )));
        }

        let computed = header_checksum(rom);
        let stored = rom[0x14D];
        if computed != stored {
            return Err(GbError::InvalidRom(format!(
                "header checksum is 0x{stored:02X}, computed 0x{computed:02X}"
            )));
        }

        let cgb_flag = rom[0x143];
        // Newer carts reuse the tail of the title for the manufacturer
        // code and the CGB flag.
        let title_end = if cgb_flag & 0x80 != 0 { 0x143 } else { 0x144 };
        let title = rom[0x134..title_end]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .filter(|c| c.is_ascii_graphic() || *c == ' ')
            .collect::<String>()
            .trim_end()
            .to_string();

        Ok(Self {
            entry_point: bytes(rom, 0x100),
            logo: bytes(rom, 0x104),
            title,
            manufacturer: bytes(rom, 0x13F),
            cgb_flag,
            new_licensee: bytes(rom, 0x144),
            sgb_flag: rom[0x146],
            cartridge_type: rom[0x147],
            rom_size_code: rom[0x148],
            ram_size_code: rom[0x149],
            destination: rom[0x14A],
            old_licensee: rom[0x14B],
            version: rom[0x14C],
            header_checksum: stored,
            global_checksum: u16::from_be_bytes([rom[0x14E], rom[0x14F]]),
        })
    }

    pub fn logo_valid(&self) -> bool {
        self.logo == LOGO
    }

    /// ROM size declared by the header, in bytes.
    pub fn rom_size(&self) -> usize {
        match self.rom_size_code {
            code @ 0x00..=0x08 => 0x8000 << code,
            _ => 0x8000,
        }
    }

    /// External RAM size declared by the header, in bytes.
    pub fn ram_size(&self) -> usize {
        match self.ram_size_code {
            0x01 => 2 * 1024,
            0x02 => 8 * 1024,
            0x03 => 32 * 1024,
            0x04 => 128 * 1024,
            0x05 => 64 * 1024,
            _ => 0,
        }
    }

    pub fn has_battery(&self) -> bool {
        matches!(
            self.cartridge_type,
            0x03 | 0x06 | 0x09 | 0x0D | 0x0F | 0x10 | 0x13 | 0x1B | 0x1E | 0x22 | 0xFF
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self.cartridge_type {
            0x00 => "ROM ONLY",
            0x01 => "MBC1",
            0x02 => "MBC1+RAM",
            0x03 => "MBC1+RAM+BATTERY",
            0x05 => "MBC2",
            0x06 => "MBC2+BATTERY",
            0x08 => "ROM+RAM",
            0x09 => "ROM+RAM+BATTERY",
            0x0B => "MMM01",
            0x0C => "MMM01+RAM",
            0x0D => "MMM01+RAM+BATTERY",
            0x0F => "MBC3+TIMER+BATTERY",
            0x10 => "MBC3+TIMER+RAM+BATTERY",
            0x11 => "MBC3",
            0x12 => "MBC3+RAM",
            0x13 => "MBC3+RAM+BATTERY",
            0x19 => "MBC5",
            0x1A => "MBC5+RAM",
            0x1B => "MBC5+RAM+BATTERY",
            0x1C => "MBC5+RUMBLE",
            0x1D => "MBC5+RUMBLE+RAM",
            0x1E => "MBC5+RUMBLE+RAM+BATTERY",
            0x20 => "MBC6",
            0x22 => "MBC7+SENSOR+RUMBLE+RAM+BATTERY",
            0xFC => "POCKET CAMERA",
            0xFD => "BANDAI TAMA5",
            0xFE => "HuC3",
            0xFF => "HuC1+RAM+BATTERY",
            _ => "UNKNOWN",
        }
    }
}
