//! The inode map: an array of 256 little-endian `u16` block addresses,
//! stored at block 2, indexed by inode-id.

use log::trace;

use crate::device::Device;
use crate::error::{Error, Result};
use crate::{INODE_MAP_BLOCK, INODE_MAX};

/// Returns the block address of the inode with the given `id`, or 0 if that
/// id is not allocated.
pub fn inode_address(dev: &mut Device, id: u8) -> Result<u16> {
	let block = dev.read_block(INODE_MAP_BLOCK)?;
	let off = id as usize * 2;
	Ok(u16::from_le_bytes(block[off..off + 2].try_into().unwrap()))
}

/// Records that inode `id` now lives at block `addr`.
///
/// The original source wrote this address one byte at a time via
/// single-byte indexing, silently truncating it; this performs a proper
/// little-endian `u16` store.
pub fn assign(dev: &mut Device, id: u8, addr: u16) -> Result<()> {
	let mut block = dev.read_block(INODE_MAP_BLOCK)?;
	let off = id as usize * 2;
	block[off..off + 2].copy_from_slice(&addr.to_le_bytes());
	trace!("inode_map: assign id {id} -> block {addr}");
	dev.write_block(INODE_MAP_BLOCK, &block)
}

/// Clears the map entry for `id` (marks it unallocated).
pub fn clear(dev: &mut Device, id: u8) -> Result<()> {
	assign(dev, id, 0)
}

/// Scans entries `0..256` and returns the first unallocated id.
pub fn next_free_id(dev: &mut Device) -> Result<u8> {
	let block = dev.read_block(INODE_MAP_BLOCK)?;
	for id in 0..INODE_MAX {
		let off = id * 2;
		let addr = u16::from_le_bytes(block[off..off + 2].try_into().unwrap());
		if addr == 0 {
			return Ok(id as u8);
		}
	}
	Err(Error::NoInodeSlots)
}
