//! The inode allocator and codec: 33-byte on-disk records describing a file
//! or directory's size, type, and data-block pointers.
//!
//! The self-reference byte at offset 32 (absent from the 32-byte layout the
//! spec's prose describes) is kept, matching the original source's actual
//! `INODE_BYTES = 33`. [`read_inode_checked`] cross-checks it against the
//! inode map on every lookup instead of trusting it blindly.

use log::trace;

use crate::device::Device;
use crate::error::{Error, Result};
use crate::{fbv, inode_map, DIRECT_POINTERS};

/// On-disk size of an inode record, in bytes.
pub const INODE_BYTES: usize = 33;

/// Whether an inode describes a flat file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
	File,
	Directory,
}

impl FileType {
	/// The ASCII tag stored at inode offset 4.
	pub fn tag(self) -> u8 {
		match self {
			FileType::File => b'f',
			FileType::Directory => b'd',
		}
	}
}

impl TryFrom<u8> for FileType {
	type Error = Error;

	fn try_from(tag: u8) -> Result<Self> {
		match tag {
			b'f' => Ok(FileType::File),
			b'd' => Ok(FileType::Directory),
			_ => Err(Error::CorruptInode),
		}
	}
}

/// In-memory view of an on-disk inode record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
	pub size: u32,
	pub file_type: FileType,
	pub direct: [u16; DIRECT_POINTERS],
	pub single_indirect: u16,
	pub double_indirect: u16,
	pub self_id: u8,
}

impl Inode {
	fn empty(id: u8, size: u32, file_type: FileType) -> Self {
		Self {
			size,
			file_type,
			direct: [0; DIRECT_POINTERS],
			single_indirect: 0,
			double_indirect: 0,
			self_id: id,
		}
	}

	fn encode(&self) -> [u8; INODE_BYTES] {
		let mut buf = [0u8; INODE_BYTES];
		buf[0..4].copy_from_slice(&self.size.to_le_bytes());
		buf[4..8].copy_from_slice(&(self.file_type.tag() as u32).to_le_bytes());
		for (i, ptr) in self.direct.iter().enumerate() {
			let off = 8 + i * 2;
			buf[off..off + 2].copy_from_slice(&ptr.to_le_bytes());
		}
		buf[28..30].copy_from_slice(&self.single_indirect.to_le_bytes());
		buf[30..32].copy_from_slice(&self.double_indirect.to_le_bytes());
		buf[32] = self.self_id;
		buf
	}

	fn decode(bytes: &[u8]) -> Result<Self> {
		let size = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
		let type_word = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
		let file_type = FileType::try_from(type_word as u8)?;
		let mut direct = [0u16; DIRECT_POINTERS];
		for (i, slot) in direct.iter_mut().enumerate() {
			let off = 8 + i * 2;
			*slot = u16::from_le_bytes(bytes[off..off + 2].try_into().unwrap());
		}
		let single_indirect = u16::from_le_bytes(bytes[28..30].try_into().unwrap());
		let double_indirect = u16::from_le_bytes(bytes[30..32].try_into().unwrap());
		let self_id = bytes[32];
		Ok(Self {
			size,
			file_type,
			direct,
			single_indirect,
			double_indirect,
			self_id,
		})
	}

	/// Number of data blocks this inode's `size` implies.
	pub fn data_block_count(&self) -> u32 {
		crate::indirect::ceil_div(self.size, crate::BLOCK_SIZE as u32)
	}
}

/// Allocates a free block, marks it used, and writes a fresh inode record
/// with all pointer fields zeroed. Returns the block address.
pub fn create_empty_inode(dev: &mut Device, id: u8, size: u32, file_type: FileType) -> Result<u16> {
	let addr = fbv::find_free_block(dev)?;
	fbv::mark_used(dev, addr)?;
	let inode = Inode::empty(id, size, file_type);
	dev.write_block(addr, &inode.encode())?;
	trace!("create_empty_inode: id {id} at block {addr}");
	Ok(addr)
}

/// Writes `inode` to block `addr`.
pub fn write_inode(dev: &mut Device, addr: u16, inode: &Inode) -> Result<()> {
	dev.write_block(addr, &inode.encode())
}

/// Reads the raw inode record at block `addr`, without cross-checking its
/// self-id against the inode map.
pub fn read_inode(dev: &mut Device, addr: u16) -> Result<Inode> {
	let block = dev.read_block(addr)?;
	Inode::decode(&block[..INODE_BYTES])
}

/// Resolves `id` through the inode map, reads its inode, and verifies the
/// inode's self-id field matches `id`.
pub fn read_inode_checked(dev: &mut Device, id: u8) -> Result<Inode> {
	let addr = inode_map::inode_address(dev, id)?;
	let inode = read_inode(dev, addr)?;
	if inode.self_id != id {
		return Err(Error::CorruptInode);
	}
	Ok(inode)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fbv;
	use tempfile::NamedTempFile;

	fn fresh_device() -> (NamedTempFile, Device) {
		let tmp = NamedTempFile::new().unwrap();
		let mut dev = Device::open_or_create(tmp.path()).unwrap();
		fbv::init(&mut dev).unwrap();
		(tmp, dev)
	}

	#[test]
	fn encode_decode_round_trip() {
		let inode = Inode {
			size: 7000,
			file_type: FileType::File,
			direct: [10, 11, 12, 13, 14, 15, 16, 17, 18, 19],
			single_indirect: 42,
			double_indirect: 0,
			self_id: 2,
		};
		let bytes = inode.encode();
		assert_eq!(bytes.len(), INODE_BYTES);
		assert_eq!(Inode::decode(&bytes).unwrap(), inode);
	}

	#[test]
	fn unrecognized_type_tag_is_corrupt() {
		let mut bytes = [0u8; INODE_BYTES];
		bytes[4] = b'x';
		assert!(matches!(Inode::decode(&bytes), Err(Error::CorruptInode)));
	}

	#[test]
	fn create_empty_inode_zeroes_all_pointers() {
		let (_tmp, mut dev) = fresh_device();
		let addr = create_empty_inode(&mut dev, 3, 512, FileType::File).unwrap();
		let inode = read_inode(&mut dev, addr).unwrap();
		assert_eq!(inode.size, 512);
		assert_eq!(inode.direct, [0; DIRECT_POINTERS]);
		assert_eq!(inode.single_indirect, 0);
		assert_eq!(inode.self_id, 3);
	}

	#[test]
	fn checked_read_rejects_mismatched_self_id() {
		let (_tmp, mut dev) = fresh_device();
		let addr = create_empty_inode(&mut dev, 3, 512, FileType::File).unwrap();
		crate::inode_map::assign(&mut dev, 9, addr).unwrap();
		assert!(matches!(
			read_inode_checked(&mut dev, 9),
			Err(Error::CorruptInode)
		));
	}
}
