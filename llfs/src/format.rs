//! Mount and format: bringing a backing file up to a fresh, empty LLFS.

use log::info;

use crate::device::Device;
use crate::error::Result;
use crate::superblock::Superblock;
use crate::{directory, fbv, inode, inode_map};
use crate::{FileType, ROOT_INODE_ID};

/// Formats `dev` as a fresh, empty filesystem: zero-fills it, lays out the
/// free-block vector and superblock, and creates the root directory as
/// inode 0, whose own parent is itself.
pub fn init(dev: &mut Device) -> Result<()> {
	dev.zero_fill()?;
	fbv::init(dev)?;
	Superblock::default().write(dev)?;

	let root_addr = inode::create_empty_inode(
		dev,
		ROOT_INODE_ID,
		2 * directory::ENTRY_SIZE as u32,
		FileType::Directory,
	)?;
	let data_addr = directory::create_dir_block(dev, ROOT_INODE_ID, ROOT_INODE_ID)?;

	let mut root_inode = inode::read_inode(dev, root_addr)?;
	root_inode.direct[0] = data_addr;
	inode::write_inode(dev, root_addr, &root_inode)?;
	inode_map::assign(dev, ROOT_INODE_ID, root_addr)?;

	info!("format::init: root directory at block {root_addr}, data block {data_addr}");
	Ok(())
}

/// Mounts an already-formatted `dev`, verifying the superblock's magic
/// number and block/inode counts match what this crate expects.
pub fn mount(dev: &mut Device) -> Result<Superblock> {
	let sb = Superblock::read(dev)?;
	info!("format::mount: {sb:?}");
	Ok(sb)
}
