//! Downloader/deleter: the counterpart to `llfs-upload`, dispatching on
//! argument count against the same `../vdisk`.
//!
//! - 0 args: download `/testdir1/smalltestfile` to `./downloadedsmalltestfile`.
//! - 1 arg:  download `/testdir1/largetestfile` to `./downloadedlargetestfile`.
//! - 2 args: delete `/testdir1/smalltestfile`.
//! - 3 args: delete `/testdir1/largetestfile`.
//! - 4 args: delete `/testdir1`.

use std::fs::File;
use std::process::ExitCode;

use log::{error, info};

const VDISK_PATH: &str = "../vdisk";

fn run() -> llfs::Result<()> {
	let argc = std::env::args().count() - 1;
	info!("llfs-down: stage {argc}");

	let mut dev = llfs::Device::open(VDISK_PATH)?;

	match argc {
		0 => {
			let mut out = File::create("./downloadedsmalltestfile")?;
			llfs::ops::download_file(&mut dev, "/testdir1/smalltestfile", &mut out)?;
		}
		1 => {
			let mut out = File::create("./downloadedlargetestfile")?;
			llfs::ops::download_file(&mut dev, "/testdir1/largetestfile", &mut out)?;
		}
		2 => {
			info!("removing the small test file");
			llfs::ops::delete_filepath(&mut dev, "/testdir1/smalltestfile")?;
		}
		3 => {
			info!("removing the large test file");
			llfs::ops::delete_filepath(&mut dev, "/testdir1/largetestfile")?;
		}
		_ => {
			info!("removing the directory /testdir1");
			llfs::ops::delete_filepath(&mut dev, "/testdir1")?;
		}
	}
	Ok(())
}

fn main() -> ExitCode {
	env_logger::init();
	match run() {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("llfs-down failed: {e}");
			ExitCode::FAILURE
		}
	}
}
