//! LLFS — a miniature on-disk filesystem layered over a single fixed-size
//! backing file standing in for a raw block device.
//!
//! The module layout mirrors the components of the on-disk design: a block
//! device (`device`), the superblock (`superblock`), the free-block vector
//! (`fbv`), the inode map (`inode_map`), the inode codec (`inode`), the
//! indirect-pointer engine (`indirect`), directory blocks (`directory`), the
//! path resolver (`path`), the high-level file operations (`ops`), and
//! mount/format (`format`).

pub mod device;
pub mod directory;
pub mod error;
pub mod fbv;
pub mod format;
pub mod indirect;
pub mod inode;
pub mod inode_map;
pub mod ops;
pub mod path;
pub mod superblock;

pub use device::Device;
pub use error::{Error, Result};
pub use inode::{FileType, Inode};

/// Size in bytes of a single block.
pub const BLOCK_SIZE: usize = 512;
/// Number of blocks on the backing device.
pub const BLOCK_COUNT: u16 = 4096;
/// Number of blocks reserved for the superblock, the FBV, the inode map and
/// scratch space. These blocks are permanently marked in-use.
pub const RESERVED_BLOCKS: u16 = 16;
/// Block holding the free-block vector.
pub const FBV_BLOCK: u16 = 1;
/// Block holding the inode map.
pub const INODE_MAP_BLOCK: u16 = 2;
/// Maximum number of live inodes (ids `0..256`).
pub const INODE_MAX: usize = 256;
/// Inode-id of the root directory.
pub const ROOT_INODE_ID: u8 = 0;
/// Number of direct block pointers stored in an inode.
pub const DIRECT_POINTERS: usize = 10;
/// Number of pointers held by a single-indirect (or double-indirect) block.
pub const PTRS_PER_BLOCK: usize = BLOCK_SIZE / 2;
/// Total size in bytes of the on-disk backing store.
pub const DEVICE_BYTES: u64 = BLOCK_SIZE as u64 * BLOCK_COUNT as u64;
