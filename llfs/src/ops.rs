//! High-level filesystem operations: the directory/file lifecycle a caller
//! actually wants (create, upload, download, delete), built on top of the
//! lower-level inode, directory, and indirect-block primitives.

use std::io::{Read, Write};

use log::info;

use crate::device::Device;
use crate::error::{Error, Result};
use crate::indirect;
use crate::inode::{self, FileType, Inode};
use crate::inode_map;
use crate::path;
use crate::{directory, fbv};
use crate::{BLOCK_SIZE, PTRS_PER_BLOCK};

/// Zeroes `addr`'s contents and returns it to the free-block vector.
fn free_block(dev: &mut Device, addr: u16) -> Result<()> {
	dev.write_block(addr, &[0u8; BLOCK_SIZE])?;
	fbv::mark_free(dev, addr)
}

/// Creates the directory named by `target_path`, registering it in its parent.
pub fn create_directory(dev: &mut Device, target_path: &str) -> Result<u8> {
	let (parent_path, name) = path::split_parent(target_path);
	let parent_id = path::find_file_inode_id(dev, parent_path)?;

	let child_id = inode_map::next_free_id(dev)?;
	let addr = inode::create_empty_inode(dev, child_id, 2 * directory::ENTRY_SIZE as u32, FileType::Directory)?;
	let data_addr = directory::create_dir_block(dev, child_id, parent_id)?;

	let mut new_inode = inode::read_inode(dev, addr)?;
	new_inode.direct[0] = data_addr;
	inode::write_inode(dev, addr, &new_inode)?;

	inode_map::assign(dev, child_id, addr)?;
	directory::add_entry(dev, parent_id, child_id, name)?;
	info!("create_directory: {target_path:?} -> inode {child_id}");
	Ok(child_id)
}

/// Creates the file named by `target_path` with `size` bytes of content
/// streamed from `input`, registering it in its parent.
pub fn upload_file(dev: &mut Device, target_path: &str, size: u32, input: &mut impl Read) -> Result<u8> {
	let (parent_path, name) = path::split_parent(target_path);
	let parent_id = path::find_file_inode_id(dev, parent_path)?;

	let child_id = inode_map::next_free_id(dev)?;
	let addr = inode::create_empty_inode(dev, child_id, size, FileType::File)?;
	let mut new_inode = inode::read_inode(dev, addr)?;

	let mut blocks_remaining = new_inode.data_block_count();

	for slot in new_inode.direct.iter_mut() {
		if blocks_remaining == 0 {
			break;
		}
		let nbytes = indirect::bytes_for_next_block(size as u64, blocks_remaining);
		*slot = indirect::create_and_write_data_block(dev, input, nbytes)?;
		blocks_remaining -= 1;
	}

	if blocks_remaining > 0 {
		let single_addr = indirect::create_indirect_block(dev)?;
		indirect::fill_single_indirect(dev, single_addr, &mut blocks_remaining, size as u64, input)?;
		new_inode.single_indirect = single_addr;
	}

	if blocks_remaining > 0 {
		let double_addr = indirect::create_indirect_block(dev)?;
		let mut double_block = dev.read_block(double_addr)?;
		for k in 0..PTRS_PER_BLOCK {
			if blocks_remaining == 0 {
				break;
			}
			let nested_addr = indirect::create_indirect_block(dev)?;
			indirect::fill_single_indirect(dev, nested_addr, &mut blocks_remaining, size as u64, input)?;
			let off = k * 2;
			double_block[off..off + 2].copy_from_slice(&nested_addr.to_le_bytes());
		}
		dev.write_block(double_addr, &double_block)?;
		new_inode.double_indirect = double_addr;
	}

	inode::write_inode(dev, addr, &new_inode)?;
	inode_map::assign(dev, child_id, addr)?;
	directory::add_entry(dev, parent_id, child_id, name)?;
	info!("upload_file: {target_path:?} ({size} bytes) -> inode {child_id}");
	Ok(child_id)
}

/// Streams the full content of the file named by `target_path` to `output`.
pub fn download_file(dev: &mut Device, target_path: &str, output: &mut impl Write) -> Result<()> {
	let id = path::find_file_inode_id(dev, target_path)?;
	let file_inode = inode::read_inode_checked(dev, id)?;
	if file_inode.file_type != FileType::File {
		return Err(Error::CorruptInode);
	}

	let mut blocks_remaining = file_inode.data_block_count();
	let size = file_inode.size as u64;

	for &addr in file_inode.direct.iter() {
		if blocks_remaining == 0 {
			break;
		}
		let nbytes = indirect::bytes_for_next_block(size, blocks_remaining);
		indirect::read_data_block(dev, addr, nbytes, output)?;
		blocks_remaining -= 1;
	}

	if blocks_remaining > 0 {
		indirect::read_single_indirect(dev, file_inode.single_indirect, &mut blocks_remaining, size, output)?;
	}

	if blocks_remaining > 0 {
		let double_block = dev.read_block(file_inode.double_indirect)?;
		for k in 0..PTRS_PER_BLOCK {
			if blocks_remaining == 0 {
				break;
			}
			let off = k * 2;
			let nested_addr = u16::from_le_bytes(double_block[off..off + 2].try_into().unwrap());
			indirect::read_single_indirect(dev, nested_addr, &mut blocks_remaining, size, output)?;
		}
	}

	Ok(())
}

/// Frees every data block owned by the file inode `id`, direct through
/// double-indirect, then the inode block itself, and clears its map entry.
fn delete_file(dev: &mut Device, id: u8) -> Result<()> {
	let addr = inode_map::inode_address(dev, id)?;
	let file_inode = inode::read_inode(dev, addr)?;

	for &ptr in file_inode.direct.iter() {
		if ptr != 0 {
			free_block(dev, ptr)?;
		}
	}
	if file_inode.single_indirect != 0 {
		indirect::clear_single_indirect(dev, file_inode.single_indirect)?;
		free_block(dev, file_inode.single_indirect)?;
	}
	if file_inode.double_indirect != 0 {
		let double_block = dev.read_block(file_inode.double_indirect)?;
		for k in 0..PTRS_PER_BLOCK {
			let off = k * 2;
			let nested_addr = u16::from_le_bytes(double_block[off..off + 2].try_into().unwrap());
			if nested_addr != 0 {
				indirect::clear_single_indirect(dev, nested_addr)?;
				free_block(dev, nested_addr)?;
			}
		}
		free_block(dev, file_inode.double_indirect)?;
	}

	free_block(dev, addr)?;
	inode_map::clear(dev, id)
}

/// Removes the (already verified empty) directory inode `id` and its data
/// block, then clears its map entry.
fn delete_directory(dev: &mut Device, id: u8) -> Result<()> {
	if !directory::is_empty(dev, id)? {
		return Err(Error::DirectoryNotEmpty);
	}
	let addr = inode_map::inode_address(dev, id)?;
	let dir_inode: Inode = inode::read_inode(dev, addr)?;

	free_block(dev, dir_inode.direct[0])?;
	free_block(dev, addr)?;
	inode_map::clear(dev, id)
}

/// Deletes whatever `path` names — a file or an empty directory — removing
/// it from its parent only after every other check has passed, so a failed
/// delete (e.g. a non-empty directory) leaves the store untouched.
pub fn delete_filepath(dev: &mut Device, target_path: &str) -> Result<()> {
	let (parent_path, name) = path::split_parent(target_path);
	let parent_id = path::find_file_inode_id(dev, parent_path)?;
	let child_id = directory::find_child(dev, parent_id, name)?;
	let child_inode = inode::read_inode_checked(dev, child_id)?;

	match child_inode.file_type {
		FileType::File => delete_file(dev, child_id)?,
		FileType::Directory => delete_directory(dev, child_id)?,
	}

	directory::remove_entry(dev, parent_id, name)?;
	info!("delete_filepath: {target_path:?} (inode {child_id})");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::format;
	use tempfile::NamedTempFile;

	fn fresh_fs() -> (NamedTempFile, Device) {
		let tmp = NamedTempFile::new().unwrap();
		let mut dev = Device::open_or_create(tmp.path()).unwrap();
		format::init(&mut dev).unwrap();
		(tmp, dev)
	}

	#[test]
	fn create_directory_then_look_it_up() {
		let (_tmp, mut dev) = fresh_fs();
		let id = create_directory(&mut dev, "/testdir1").unwrap();
		assert_eq!(path::find_file_inode_id(&mut dev, "/testdir1").unwrap(), id);
	}

	#[test]
	fn upload_then_download_small_file_round_trips() {
		let (_tmp, mut dev) = fresh_fs();
		create_directory(&mut dev, "/testdir1").unwrap();
		let content = b"hello, llfs!";
		let mut cursor = std::io::Cursor::new(content.to_vec());
		upload_file(&mut dev, "/testdir1/hello", content.len() as u32, &mut cursor).unwrap();

		let mut out = Vec::new();
		download_file(&mut dev, "/testdir1/hello", &mut out).unwrap();
		assert_eq!(out, content);
	}

	#[test]
	fn upload_then_download_multi_block_file_round_trips() {
		let (_tmp, mut dev) = fresh_fs();
		create_directory(&mut dev, "/testdir1").unwrap();
		let content: Vec<u8> = (0..5121u32).map(|i| (i % 251) as u8).collect();
		let mut cursor = std::io::Cursor::new(content.clone());
		upload_file(&mut dev, "/testdir1/big", content.len() as u32, &mut cursor).unwrap();

		let mut out = Vec::new();
		download_file(&mut dev, "/testdir1/big", &mut out).unwrap();
		assert_eq!(out, content);
	}

	#[test]
	fn delete_file_then_reclaims_inode_slot() {
		let (_tmp, mut dev) = fresh_fs();
		create_directory(&mut dev, "/testdir1").unwrap();
		let mut cursor = std::io::Cursor::new(b"x".to_vec());
		upload_file(&mut dev, "/testdir1/x", 1, &mut cursor).unwrap();

		delete_filepath(&mut dev, "/testdir1/x").unwrap();
		assert!(matches!(
			path::find_file_inode_id(&mut dev, "/testdir1/x"),
			Err(Error::NotFound)
		));
	}

	#[test]
	fn deleting_nonempty_directory_fails_and_leaves_it_intact() {
		let (_tmp, mut dev) = fresh_fs();
		create_directory(&mut dev, "/testdir1").unwrap();
		let mut cursor = std::io::Cursor::new(b"x".to_vec());
		upload_file(&mut dev, "/testdir1/x", 1, &mut cursor).unwrap();

		assert!(matches!(
			delete_filepath(&mut dev, "/testdir1"),
			Err(Error::DirectoryNotEmpty)
		));
		// the directory and its child are both still there
		assert!(path::find_file_inode_id(&mut dev, "/testdir1/x").is_ok());
	}

	#[test]
	fn deleting_now_empty_directory_succeeds() {
		let (_tmp, mut dev) = fresh_fs();
		create_directory(&mut dev, "/testdir1").unwrap();
		delete_filepath(&mut dev, "/testdir1").unwrap();
		assert!(matches!(
			path::find_file_inode_id(&mut dev, "/testdir1"),
			Err(Error::NotFound)
		));
	}
}
