//! The free-block vector (FBV): one bit per block, stored at block 1.
//!
//! Bit = 1 means free. Blocks `0..RESERVED_BLOCKS` are permanently marked
//! in-use and are never handed out by [`find_free_block`].

use log::trace;

use crate::device::Device;
use crate::error::{Error, Result};
use crate::{BLOCK_COUNT, FBV_BLOCK, RESERVED_BLOCKS};

const RESERVED_BYTES: usize = (RESERVED_BLOCKS / 8) as usize;

/// Scans the FBV for the first free block, skipping the reserved region.
///
/// Scans bytewise starting at byte offset `RESERVED_BYTES`, then bit-wise
/// LSB-first within each byte.
pub fn find_free_block(dev: &mut Device) -> Result<u16> {
	let vector = dev.read_block(FBV_BLOCK)?;
	for byte_pos in RESERVED_BYTES..(BLOCK_COUNT as usize / 8) {
		let byte = vector[byte_pos];
		if byte == 0 {
			continue;
		}
		for bit in 0..8 {
			if byte & (1 << bit) != 0 {
				let block = (byte_pos * 8 + bit) as u16;
				trace!("find_free_block: found block {block}");
				return Ok(block);
			}
		}
	}
	Err(Error::NoSpace)
}

/// Sets the bit for `block` to 1 (free), via `byte |= mask`.
pub fn mark_free(dev: &mut Device, block: u16) -> Result<()> {
	let mut vector = dev.read_block(FBV_BLOCK)?;
	let (byte_num, bit_pos) = (block as usize / 8, block as usize % 8);
	vector[byte_num] |= 1 << bit_pos;
	trace!("mark_free: block {block}");
	dev.write_block(FBV_BLOCK, &vector)
}

/// Clears the bit for `block` to 0 (in-use), via `byte &= !mask`.
///
/// The original source toggled this bit with XOR, which is only correct if
/// the invariant "free bit clear implies no live pointer to the block" holds
/// beforehand. Clearing unconditionally is robust regardless of prior state.
pub fn mark_used(dev: &mut Device, block: u16) -> Result<()> {
	let mut vector = dev.read_block(FBV_BLOCK)?;
	let (byte_num, bit_pos) = (block as usize / 8, block as usize % 8);
	vector[byte_num] &= !(1 << bit_pos);
	trace!("mark_used: block {block}");
	dev.write_block(FBV_BLOCK, &vector)
}

/// Returns whether `block`'s bit is set to 1 (free). Test/verification helper.
pub fn is_free(dev: &mut Device, block: u16) -> Result<bool> {
	let vector = dev.read_block(FBV_BLOCK)?;
	let (byte_num, bit_pos) = (block as usize / 8, block as usize % 8);
	Ok(vector[byte_num] & (1 << bit_pos) != 0)
}

/// Initializes the FBV to all-ones, then clears bits `0..RESERVED_BLOCKS`.
pub fn init(dev: &mut Device) -> Result<()> {
	let mut vector = [0xffu8; 512];
	vector[..RESERVED_BYTES].fill(0);
	dev.write_block(FBV_BLOCK, &vector)
}
