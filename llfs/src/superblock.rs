//! The superblock: magic, block count and inode count at block 0.

use log::debug;

use crate::device::Device;
use crate::error::Result;
use crate::{BLOCK_COUNT, INODE_MAX};

/// Magic number identifying an LLFS store ("LLFS" in ASCII, little-endian).
pub const MAGIC: u32 = 0x53464c4c;

/// In-memory view of the superblock stored at block 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superblock {
	pub magic: u32,
	pub block_count: u32,
	pub inode_count: u32,
}

impl Default for Superblock {
	fn default() -> Self {
		Self {
			magic: MAGIC,
			block_count: BLOCK_COUNT as u32,
			inode_count: INODE_MAX as u32,
		}
	}
}

impl Superblock {
	fn decode(block: &[u8]) -> Self {
		Self {
			magic: u32::from_le_bytes(block[0..4].try_into().unwrap()),
			block_count: u32::from_le_bytes(block[4..8].try_into().unwrap()),
			inode_count: u32::from_le_bytes(block[8..12].try_into().unwrap()),
		}
	}

	fn encode(&self) -> [u8; 12] {
		let mut buf = [0u8; 12];
		buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
		buf[4..8].copy_from_slice(&self.block_count.to_le_bytes());
		buf[8..12].copy_from_slice(&self.inode_count.to_le_bytes());
		buf
	}

	/// Writes this superblock to block 0.
	pub fn write(&self, dev: &mut Device) -> Result<()> {
		debug!("writing superblock: {self:?}");
		dev.write_block(0, &self.encode())
	}

	/// Reads the superblock from block 0.
	pub fn read(dev: &mut Device) -> Result<Self> {
		let block = dev.read_block(0)?;
		Ok(Self::decode(&block))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_through_encode_decode() {
		let sb = Superblock {
			magic: MAGIC,
			block_count: 4096,
			inode_count: 256,
		};
		let mut block = [0u8; 512];
		block[0..12].copy_from_slice(&sb.encode());
		assert_eq!(Superblock::decode(&block), sb);
	}
}
