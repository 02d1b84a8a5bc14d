//! The indirect-pointer engine: allocates and fills/clears the data blocks a
//! file owns, directly and through single- and double-indirect chains.

use std::io::{Read, Write};

use log::trace;

use crate::device::Device;
use crate::error::Result;
use crate::fbv;
use crate::{BLOCK_SIZE, PTRS_PER_BLOCK};

/// `ceil(a / b)` for unsigned integers.
pub fn ceil_div(a: u32, b: u32) -> u32 {
	if a == 0 {
		0
	} else {
		(a - 1) / b + 1
	}
}

/// How many bytes the next data block should carry: the full block size,
/// unless this is the last block of a file whose size isn't block-aligned.
pub(crate) fn bytes_for_next_block(size: u64, blocks_remaining: u32) -> usize {
	let rem = (size % BLOCK_SIZE as u64) as usize;
	if blocks_remaining == 1 && rem != 0 {
		rem
	} else {
		BLOCK_SIZE
	}
}

/// Allocates a free block, reads `nbytes` from `input` into it (the rest of
/// the block stays zero, since a free block always starts out zeroed), and
/// returns its address.
pub fn create_and_write_data_block(dev: &mut Device, input: &mut impl Read, nbytes: usize) -> Result<u16> {
	let addr = fbv::find_free_block(dev)?;
	fbv::mark_used(dev, addr)?;
	let mut buf = [0u8; BLOCK_SIZE];
	input.read_exact(&mut buf[..nbytes])?;
	dev.write_block(addr, &buf[..nbytes])?;
	Ok(addr)
}

/// Reads `nbytes` from data block `addr` and appends them to `output`.
pub fn read_data_block(dev: &mut Device, addr: u16, nbytes: usize, output: &mut impl Write) -> Result<()> {
	let block = dev.read_block(addr)?;
	output.write_all(&block[..nbytes])?;
	Ok(())
}

/// Allocates a fresh zero-filled block to serve as a single- or
/// double-indirect pointer table.
pub fn create_indirect_block(dev: &mut Device) -> Result<u16> {
	let addr = fbv::find_free_block(dev)?;
	fbv::mark_used(dev, addr)?;
	dev.write_block(addr, &[0u8; BLOCK_SIZE])?;
	Ok(addr)
}

/// Fills up to 256 slots of the single-indirect block at `addr`, allocating
/// and writing one data block per slot from `input`, decrementing
/// `blocks_remaining` as it goes.
///
/// Always writes the updated indirect block back and leaves
/// `blocks_remaining` accurate on return — including when the loop runs out
/// of slots before `blocks_remaining` reaches zero, so the caller can
/// continue into the double-indirect region. The original source had no
/// explicit return for that case; this closes that gap.
pub fn fill_single_indirect(
	dev: &mut Device,
	addr: u16,
	blocks_remaining: &mut u32,
	size: u64,
	input: &mut impl Read,
) -> Result<()> {
	let mut block = dev.read_block(addr)?;
	for k in 0..PTRS_PER_BLOCK {
		if *blocks_remaining == 0 {
			break;
		}
		let nbytes = bytes_for_next_block(size, *blocks_remaining);
		let data_addr = create_and_write_data_block(dev, input, nbytes)?;
		let off = k * 2;
		block[off..off + 2].copy_from_slice(&data_addr.to_le_bytes());
		*blocks_remaining -= 1;
		trace!("fill_single_indirect: slot {k} -> block {data_addr}, {blocks_remaining} left");
	}
	dev.write_block(addr, &block)
}

/// Reads the data blocks pointed to by the single-indirect block at `addr`,
/// in order, streaming their payload to `output`.
pub fn read_single_indirect(
	dev: &mut Device,
	addr: u16,
	blocks_remaining: &mut u32,
	size: u64,
	output: &mut impl Write,
) -> Result<()> {
	let block = dev.read_block(addr)?;
	for k in 0..PTRS_PER_BLOCK {
		if *blocks_remaining == 0 {
			break;
		}
		let off = k * 2;
		let data_addr = u16::from_le_bytes(block[off..off + 2].try_into().unwrap());
		let nbytes = bytes_for_next_block(size, *blocks_remaining);
		read_data_block(dev, data_addr, nbytes, output)?;
		*blocks_remaining -= 1;
	}
	Ok(())
}

/// Frees every data block referenced by the single-indirect block at `addr`
/// (but not `addr` itself).
pub fn clear_single_indirect(dev: &mut Device, addr: u16) -> Result<()> {
	let block = dev.read_block(addr)?;
	for k in 0..PTRS_PER_BLOCK {
		let off = k * 2;
		let ptr = u16::from_le_bytes(block[off..off + 2].try_into().unwrap());
		if ptr != 0 {
			dev.write_block(ptr, &[0u8; BLOCK_SIZE])?;
			fbv::mark_free(dev, ptr)?;
		}
	}
	Ok(())
}
