//! Error taxonomy returned by every fallible LLFS operation.

/// Everything that can go wrong while reading or mutating an LLFS store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The free-block vector has no bit set to 1.
	#[error("no free block available")]
	NoSpace,
	/// The inode map has no free slot (all 256 ids are live).
	#[error("inode map is full")]
	NoInodeSlots,
	/// A path component had no matching directory entry.
	#[error("path not found")]
	NotFound,
	/// A directory's slots 2..15 are all occupied.
	#[error("directory has no free entry slot")]
	DirectoryFull,
	/// Attempted to delete a directory that still has children.
	#[error("directory is not empty")]
	DirectoryNotEmpty,
	/// An inode's type tag is neither `'f'` nor `'d'`, or its self-id disagrees
	/// with the inode map.
	#[error("inode is corrupt")]
	CorruptInode,
	/// The backing device failed a read or write.
	#[error("device I/O failure: {0}")]
	Io(#[from] std::io::Error),
	/// A filename was longer than the 31 usable bytes of a directory entry.
	#[error("filename exceeds 31 bytes")]
	NameTooLong,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
