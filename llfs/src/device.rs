//! The block device: a fixed-size file standing in for a raw disk.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, trace};

use crate::error::Result;
use crate::{BLOCK_COUNT, BLOCK_SIZE, DEVICE_BYTES};

/// A fixed-size, positional block store backed by a single regular file.
///
/// Blocks are addressed by a 12-bit index in `[0, BLOCK_COUNT)`. Callers
/// compute `n * BLOCK_SIZE` offsets; `Device` only knows how to move bytes
/// in and out at those offsets.
pub struct Device {
	file: File,
}

impl Device {
	/// Opens `path` for read/write, creating and zero-filling it if absent.
	///
	/// This matches the uploader's stage-0 behavior: "open/create `vdisk`,
	/// initializing if absent".
	pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		match OpenOptions::new().read(true).write(true).open(path) {
			Ok(file) => {
				debug!("opened existing device at {}", path.display());
				Ok(Self { file })
			}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				debug!("creating new device at {}", path.display());
				let file = OpenOptions::new()
					.read(true)
					.write(true)
					.create(true)
					.truncate(true)
					.open(path)?;
				let mut dev = Self { file };
				dev.zero_fill()?;
				Ok(dev)
			}
			Err(e) => Err(e.into()),
		}
	}

	/// Opens an already-initialized device, failing if it does not exist.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let file = OpenOptions::new().read(true).write(true).open(path)?;
		Ok(Self { file })
	}

	/// Zero-fills all `BLOCK_COUNT` blocks, growing the file to
	/// `DEVICE_BYTES` if needed.
	pub fn zero_fill(&mut self) -> Result<()> {
		let zero = [0u8; BLOCK_SIZE];
		self.file.seek(SeekFrom::Start(0))?;
		for _ in 0..BLOCK_COUNT {
			self.file.write_all(&zero)?;
		}
		self.file.set_len(DEVICE_BYTES)?;
		trace!("zero-filled {BLOCK_COUNT} blocks");
		Ok(())
	}

	/// Reads block `n` in full.
	pub fn read_block(&mut self, n: u16) -> Result<[u8; BLOCK_SIZE]> {
		let mut buf = [0u8; BLOCK_SIZE];
		self.file.seek(SeekFrom::Start(n as u64 * BLOCK_SIZE as u64))?;
		self.file.read_exact(&mut buf)?;
		Ok(buf)
	}

	/// Writes the first `data.len()` bytes of block `n`. Bytes beyond that
	/// within the block retain their previous contents, since the file
	/// already holds them at that offset and this call never truncates.
	pub fn write_block(&mut self, n: u16, data: &[u8]) -> Result<()> {
		debug_assert!(data.len() <= BLOCK_SIZE);
		self.file.seek(SeekFrom::Start(n as u64 * BLOCK_SIZE as u64))?;
		self.file.write_all(data)?;
		Ok(())
	}
}
