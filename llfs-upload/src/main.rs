//! Uploader: exercises LLFS against a fixed backing file, dispatching on
//! how many arguments it was invoked with rather than on flags.
//!
//! - 0 args: open `../vdisk`, formatting it fresh if it doesn't exist yet.
//! - 1 arg:  create `/testdir1`.
//! - 2 args: upload `./smalltestfile` to `/testdir1/smalltestfile`.
//! - 3 args: upload `./largetestfile` to `/testdir1/largetestfile`.

use std::fs::File;
use std::path::Path;
use std::process::ExitCode;

use log::{error, info};

const VDISK_PATH: &str = "../vdisk";

fn run() -> llfs::Result<()> {
	let argc = std::env::args().count() - 1;
	info!("llfs-upload: stage {argc}");

	match argc {
		0 => {
			let path = Path::new(VDISK_PATH);
			let mut dev = if path.exists() {
				llfs::Device::open(path)?
			} else {
				let mut dev = llfs::Device::open_or_create(path)?;
				llfs::format::init(&mut dev)?;
				dev
			};
			llfs::format::mount(&mut dev)?;
		}
		1 => {
			let mut dev = llfs::Device::open(VDISK_PATH)?;
			llfs::ops::create_directory(&mut dev, "/testdir1")?;
		}
		2 => {
			let mut dev = llfs::Device::open(VDISK_PATH)?;
			let mut input = File::open("./smalltestfile")?;
			let size = input.metadata()?.len() as u32;
			llfs::ops::upload_file(&mut dev, "/testdir1/smalltestfile", size, &mut input)?;
		}
		_ => {
			let mut dev = llfs::Device::open(VDISK_PATH)?;
			let mut input = File::open("./largetestfile")?;
			let size = input.metadata()?.len() as u32;
			llfs::ops::upload_file(&mut dev, "/testdir1/largetestfile", size, &mut input)?;
		}
	}
	Ok(())
}

fn main() -> ExitCode {
	env_logger::init();
	match run() {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("llfs-upload failed: {e}");
			ExitCode::FAILURE
		}
	}
}
