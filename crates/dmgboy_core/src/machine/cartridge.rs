mod header;
mod mbc1;
mod no_mbc;

pub use header::CartridgeHeader;

use super::bus::MemoryMapped;
use crate::GbError;
use header::global_checksum;
use mbc1::Mbc1;
use no_mbc::NoMbc;

/// Bank controllers this core understands.
enum Mapper {
    NoMbc(NoMbc),
    Mbc1(Mbc1),
}

impl Mapper {
    fn read(&self, addr: u16) -> Result<u8, GbError> {
        match self {
            Mapper::NoMbc(m) => m.read(addr),
            Mapper::Mbc1(m) => m.read(addr),
        }
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), GbError> {
        match self {
            Mapper::NoMbc(m) => m.write(addr, value),
            Mapper::Mbc1(m) => m.write(addr, value),
        }
    }

    fn ram(&self) -> &[u8] {
        match self {
            Mapper::NoMbc(m) => m.ram(),
            Mapper::Mbc1(m) => m.ram(),
        }
    }
}

/// A cartridge: parsed header plus the mapper that owns ROM and RAM.
pub struct Cartridge {
    header: CartridgeHeader,
    mapper: Mapper,
}

impl Cartridge {
    /// Parse `rom` and pick a mapper from the cartridge type byte.
    pub fn from_bytes(rom: &[u8]) -> Result<Self, GbError> {
        let header = CartridgeHeader::parse(rom)?;

        if !header.logo_valid() {
            log::warn!("cartridge logo does not match, real hardware would lock up");
        }
        let computed = global_checksum(rom);
        if computed != header.global_checksum {
            log::warn!(
                "global checksum is 0x{:04X}, computed 0x{computed:04X}",
                header.global_checksum
            );
        }
        if rom.len() != header.rom_size() {
            log::warn!(
                "ROM image is {} bytes, header declares {}",
                rom.len(),
                header.rom_size()
            );
        }

        let ram = vec![0u8; header.ram_size()];
        let mapper = match header.cartridge_type {
            0x00 | 0x08 | 0x09 => Mapper::NoMbc(NoMbc::new(rom.to_vec(), ram)),
            0x01..=0x03 => Mapper::Mbc1(Mbc1::new(rom.to_vec(), ram)),
            other => return Err(GbError::UnsupportedMbc(other)),
        };

        log::info!(
            "loaded \"{}\" ({}, {} KiB ROM, {} KiB RAM{})",
            header.title,
            header.type_name(),
            rom.len() / 1024,
            header.ram_size() / 1024,
            if header.has_battery() { ", battery" } else { "" }
        );

        Ok(Self { header, mapper })
    }

    pub fn header(&self) -> &CartridgeHeader {
        &self.header
    }

    /// Current contents of external RAM. Empty when the cart has none.
    pub fn ram(&self) -> &[u8] {
        self.mapper.ram()
    }
}

impl MemoryMapped for Cartridge {
    fn accepts(&self, addr: u16) -> bool {
        matches!(addr, 0x0000..=0x7FFF | 0xA000..=0xBFFF)
    }

    fn read(&self, addr: u16) -> u8 {
        self.mapper.read(addr).unwrap_or_else(|err| {
            log::error!("cartridge read: {err}");
            debug_assert!(false, "cartridge read outside its windows: {err}");
            0xFF
        })
    }

    fn write(&mut self, addr: u16, value: u8) {
        if let Err(err) = self.mapper.write(addr, value) {
            log::error!("cartridge write: {err}");
            debug_assert!(false, "cartridge write outside its windows: {err}");
        }
    }
}
