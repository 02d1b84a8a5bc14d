//! Directory blocks: 16 fixed 32-byte entries, slots 0 and 1 reserved for
//! `.` and `..`, slots 2..=15 available to children (14 max).

use log::{debug, trace};

use crate::device::Device;
use crate::error::{Error, Result};
use crate::inode::{self, FileType};
use crate::BLOCK_SIZE;

/// Size in bytes of one directory entry.
pub const ENTRY_SIZE: usize = 32;
/// Entries per directory block.
pub const ENTRIES_PER_BLOCK: usize = BLOCK_SIZE / ENTRY_SIZE;
/// Maximum usable bytes of a filename (31, NUL-terminated within the slot).
pub const NAME_MAX: usize = ENTRY_SIZE - 1;
/// First slot available to a child entry.
const FIRST_CHILD_SLOT: usize = 2;
/// Last slot (inclusive) available to a child entry.
const LAST_CHILD_SLOT: usize = ENTRIES_PER_BLOCK - 1;

/// Writes `name` (truncated to `NAME_MAX` bytes) into the entry at `slot`
/// along with `inode_id`, leaving the rest of the slot NUL-padded.
fn encode_entry(block: &mut [u8], slot: usize, inode_id: u8, name: &[u8]) {
	let off = slot * ENTRY_SIZE;
	block[off..off + ENTRY_SIZE].fill(0);
	block[off] = inode_id;
	let len = name.len().min(NAME_MAX);
	block[off + 1..off + 1 + len].copy_from_slice(&name[..len]);
}

/// Returns the name bytes stored at `slot`, up to its NUL terminator (or all
/// `NAME_MAX` bytes if none is present).
fn entry_name(block: &[u8], slot: usize) -> &[u8] {
	let off = slot * ENTRY_SIZE + 1;
	let raw = &block[off..off + NAME_MAX];
	let len = raw.iter().position(|&b| b == 0).unwrap_or(NAME_MAX);
	&raw[..len]
}

fn entry_inode_id(block: &[u8], slot: usize) -> u8 {
	block[slot * ENTRY_SIZE]
}

/// Allocates and writes a fresh directory data block with `.` in slot 0
/// (pointing at `self_id`) and `..` in slot 1 (pointing at `parent_id`).
pub fn create_dir_block(dev: &mut Device, self_id: u8, parent_id: u8) -> Result<u16> {
	use crate::fbv;

	let addr = fbv::find_free_block(dev)?;
	fbv::mark_used(dev, addr)?;
	let mut block = [0u8; BLOCK_SIZE];
	encode_entry(&mut block, 0, self_id, b".");
	encode_entry(&mut block, 1, parent_id, b"..");
	dev.write_block(addr, &block)?;
	debug!("create_dir_block: self {self_id} parent {parent_id} at block {addr}");
	Ok(addr)
}

/// Returns the data block address of the directory whose inode is `dir_id`.
fn data_block_of(dev: &mut Device, dir_id: u8) -> Result<u16> {
	let inode = inode::read_inode_checked(dev, dir_id)?;
	if inode.file_type != FileType::Directory {
		return Err(Error::CorruptInode);
	}
	Ok(inode.direct[0])
}

/// Finds the first empty child slot and writes `child_id`/`name` into it.
pub fn add_entry(dev: &mut Device, dir_inode_id: u8, child_id: u8, name: &str) -> Result<()> {
	if name.len() > NAME_MAX {
		return Err(Error::NameTooLong);
	}
	let data_addr = data_block_of(dev, dir_inode_id)?;
	let mut block = dev.read_block(data_addr)?;

	let slot = (FIRST_CHILD_SLOT..=LAST_CHILD_SLOT)
		.find(|&i| entry_name(&block, i).is_empty())
		.ok_or(Error::DirectoryFull)?;

	encode_entry(&mut block, slot, child_id, name.as_bytes());
	dev.write_block(data_addr, &block)?;
	trace!("add_entry: {name:?} (inode {child_id}) in slot {slot} of dir {dir_inode_id}");
	Ok(())
}

/// Zeroes every child slot in `dir_inode_id`'s data block whose filename
/// equals `name`. All matches are cleared (duplicate names are not a legal
/// state, but clearing every match keeps the behavior deterministic).
pub fn remove_entry(dev: &mut Device, dir_inode_id: u8, name: &str) -> Result<()> {
	let data_addr = data_block_of(dev, dir_inode_id)?;
	let mut block = dev.read_block(data_addr)?;
	let target = name.as_bytes();

	let mut removed = false;
	for slot in FIRST_CHILD_SLOT..=LAST_CHILD_SLOT {
		if entry_name(&block, slot) == target {
			let off = slot * ENTRY_SIZE;
			block[off..off + ENTRY_SIZE].fill(0);
			removed = true;
		}
	}
	if removed {
		dev.write_block(data_addr, &block)?;
	}
	Ok(())
}

/// Looks up `name` among `dir_inode_id`'s children, returning its inode-id.
pub fn find_child(dev: &mut Device, dir_inode_id: u8, name: &str) -> Result<u8> {
	let data_addr = data_block_of(dev, dir_inode_id)?;
	let block = dev.read_block(data_addr)?;
	let target = name.as_bytes();
	(FIRST_CHILD_SLOT..=LAST_CHILD_SLOT)
		.find(|&i| entry_name(&block, i) == target)
		.map(|i| entry_inode_id(&block, i))
		.ok_or(Error::NotFound)
}

/// Returns whether every child slot (2..=15) of `dir_inode_id` is empty.
pub fn is_empty(dev: &mut Device, dir_inode_id: u8) -> Result<bool> {
	let data_addr = data_block_of(dev, dir_inode_id)?;
	let block = dev.read_block(data_addr)?;
	Ok((FIRST_CHILD_SLOT..=LAST_CHILD_SLOT).all(|i| entry_inode_id(&block, i) == 0))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fbv;
	use crate::inode::{self, FileType};
	use tempfile::NamedTempFile;

	fn fresh_dir() -> (NamedTempFile, Device, u8) {
		let tmp = NamedTempFile::new().unwrap();
		let mut dev = Device::open_or_create(tmp.path()).unwrap();
		fbv::init(&mut dev).unwrap();

		let dir_addr = inode::create_empty_inode(&mut dev, 0, 32, FileType::Directory).unwrap();
		let data_addr = create_dir_block(&mut dev, 0, 0).unwrap();
		let mut dir_inode = inode::read_inode(&mut dev, dir_addr).unwrap();
		dir_inode.direct[0] = data_addr;
		inode::write_inode(&mut dev, dir_addr, &dir_inode).unwrap();
		crate::inode_map::assign(&mut dev, 0, dir_addr).unwrap();

		(tmp, dev, 0)
	}

	#[test]
	fn dot_and_dotdot_point_correctly() {
		let (_tmp, mut dev, root) = fresh_dir();
		assert_eq!(find_child(&mut dev, root, ".").unwrap(), root);
		assert_eq!(find_child(&mut dev, root, "..").unwrap(), root);
	}

	#[test]
	fn add_then_find_then_remove() {
		let (_tmp, mut dev, root) = fresh_dir();
		add_entry(&mut dev, root, 5, "hello").unwrap();
		assert_eq!(find_child(&mut dev, root, "hello").unwrap(), 5);
		assert!(!is_empty(&mut dev, root).unwrap());
		remove_entry(&mut dev, root, "hello").unwrap();
		assert!(matches!(
			find_child(&mut dev, root, "hello"),
			Err(Error::NotFound)
		));
		assert!(is_empty(&mut dev, root).unwrap());
	}

	#[test]
	fn fourteen_children_then_directory_full() {
		let (_tmp, mut dev, root) = fresh_dir();
		for i in 0..14 {
			add_entry(&mut dev, root, i + 1, &format!("f{i}")).unwrap();
		}
		assert!(matches!(
			add_entry(&mut dev, root, 99, "one-too-many"),
			Err(Error::DirectoryFull)
		));
	}

	#[test]
	fn name_over_31_bytes_is_rejected() {
		let (_tmp, mut dev, root) = fresh_dir();
		let long_name = "a".repeat(32);
		assert!(matches!(
			add_entry(&mut dev, root, 5, &long_name),
			Err(Error::NameTooLong)
		));
	}

	#[test]
	fn removing_duplicate_names_clears_all_matches() {
		let (_tmp, mut dev, root) = fresh_dir();
		add_entry(&mut dev, root, 5, "dup").unwrap();
		add_entry(&mut dev, root, 6, "other").unwrap();
		// Force a second, duplicate "dup" entry directly since add_entry
		// itself never creates duplicates — this exercises the determinism
		// the spec calls for in that (otherwise illegal) state.
		let data_addr = data_block_of(&mut dev, root).unwrap();
		let mut block = dev.read_block(data_addr).unwrap();
		encode_entry(&mut block, 4, 7, b"dup");
		dev.write_block(data_addr, &block).unwrap();

		remove_entry(&mut dev, root, "dup").unwrap();
		assert!(matches!(
			find_child(&mut dev, root, "dup"),
			Err(Error::NotFound)
		));
		assert_eq!(find_child(&mut dev, root, "other").unwrap(), 6);
	}
}
