//! Code and data regions
//!
//! The machine has two disjoint address spaces:
//! code  $0000-$7FFF - 32KB program image, read-only once loaded
//! data  $0000-$FFFF - 64KB RAM, reached only through LOAD/STORE
//!
//! Every address is checked against the region it targets with
//! [`code_range_fits`] or [`data_address_fits`] before the region is touched.

use crate::image::{CodeImage, CODE_SIZE};

/// Data region capacity in bytes
pub const DATA_SIZE: usize = 64 * 1024;

/// Does `len` bytes starting at `pc` lie inside the code region?
pub fn code_range_fits(pc: usize, len: usize) -> bool {
    pc.checked_add(len).is_some_and(|end| end <= CODE_SIZE)
}

/// Does `address` name a byte of the data region?
pub fn data_address_fits(address: usize) -> bool {
    address < DATA_SIZE
}

/// Read-only view of the loaded program
#[derive(Debug, Clone)]
pub struct CodeRegion {
    image: CodeImage,
}

impl CodeRegion {
    pub fn new(image: CodeImage) -> Self {
        Self { image }
    }

    /// Byte at `offset`, or `None` outside the region
    pub fn get(&self, offset: usize) -> Option<u8> {
        self.image.as_bytes().get(offset).copied()
    }

    /// The whole region. Index it only after [`code_range_fits`] has passed.
    pub fn as_bytes(&self) -> &[u8; CODE_SIZE] {
        self.image.as_bytes()
    }
}

/// Byte-addressable RAM
#[derive(Clone)]
pub struct DataRegion {
    ram: Box<[u8]>,
}

impl DataRegion {
    /// Create a zeroed data region
    pub fn new() -> Self {
        Self {
            ram: vec![0; DATA_SIZE].into_boxed_slice(),
        }
    }

    /// Read a byte, or `None` outside the region
    pub fn get(&self, address: usize) -> Option<u8> {
        self.ram.get(address).copied()
    }

    /// Read a byte at an address already checked with [`data_address_fits`]
    pub fn read(&self, address: usize) -> u8 {
        self.ram[address]
    }

    /// Write a byte at an address already checked with [`data_address_fits`]
    pub fn write(&mut self, address: usize, value: u8) {
        self.ram[address] = value;
    }
}

impl Default for DataRegion {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DataRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataRegion").field("len", &self.ram.len()).finish()
    }
}
