//! Shared scaffolding for the integration test scenarios.

use llfs::error::Result;
use llfs::{format, Device};
use tempfile::NamedTempFile;

/// Creates a freshly formatted filesystem backed by a throwaway temp file.
/// The `NamedTempFile` must be kept alive for as long as `Device` is in use.
pub fn fresh_fs() -> (NamedTempFile, Device) {
	let tmp = NamedTempFile::new().expect("create temp backing file");
	let mut dev = Device::open_or_create(tmp.path()).expect("open backing file");
	format::init(&mut dev).expect("format fresh filesystem");
	(tmp, dev)
}

/// Walks the whole store and checks the invariants that should hold after
/// any sequence of well-formed operations: every allocated inode's self-id
/// matches its map slot, every block an inode or directory entry points at
/// is marked used in the free-block vector, and the root resolves to itself.
pub fn verify_invariants(dev: &mut Device) -> Result<()> {
	use llfs::inode_map;

	assert_eq!(
		llfs::path::find_file_inode_id(dev, "/").unwrap(),
		llfs::ROOT_INODE_ID
	);

	for id in 0..=255u16 {
		let addr = inode_map::inode_address(dev, id as u8)?;
		if addr == 0 {
			continue;
		}
		assert!(
			!llfs::fbv::is_free(dev, addr)?,
			"inode {id}'s block {addr} must be marked in-use"
		);
		let record = llfs::inode::read_inode(dev, addr)?;
		assert_eq!(
			record.self_id, id as u8,
			"inode map slot {id} points at a record claiming self-id {}",
			record.self_id
		);

		for &ptr in record.direct.iter() {
			if ptr != 0 {
				assert!(!llfs::fbv::is_free(dev, ptr)?, "direct block {ptr} must be in-use");
			}
		}
	}

	Ok(())
}
