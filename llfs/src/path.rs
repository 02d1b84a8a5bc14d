//! Path resolution: walks a `/`-separated path from the root directory,
//! following one `directory::find_child` lookup per component.

use crate::device::Device;
use crate::directory;
use crate::error::Result;
use crate::ROOT_INODE_ID;

/// Splits `path` on `/`, dropping empty components (so a leading, trailing,
/// or doubled slash never produces a bogus token). An empty path, `/` alone,
/// or a path missing its leading slash all yield zero tokens and therefore
/// resolve to the root.
fn components(path: &str) -> Vec<&str> {
	path.split('/').filter(|c| !c.is_empty()).collect()
}

/// Resolves `path` to the inode-id of the file or directory it names,
/// starting from the root and following one child lookup per component.
pub fn find_file_inode_id(dev: &mut Device, path: &str) -> Result<u8> {
	let mut current = ROOT_INODE_ID;
	for component in components(path) {
		current = directory::find_child(dev, current, component)?;
	}
	Ok(current)
}

/// Splits `path` into its parent directory path and final component name.
///
/// Computed as the substring up to (not including) the last `/`, rather than
/// by re-joining all-but-the-last token — the two differ whenever a path has
/// interior empty components (e.g. `/a//b`), where token-rejoining would
/// silently drop the doubled slash and resolve against the wrong parent.
pub fn split_parent(path: &str) -> (&str, &str) {
	match path.rfind('/') {
		Some(idx) => {
			let parent = if idx == 0 { "/" } else { &path[..idx] };
			(parent, &path[idx + 1..])
		}
		None => ("/", path),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_and_root_and_unrooted_paths_resolve_to_root_tokens() {
		assert!(components("").is_empty());
		assert!(components("/").is_empty());
		assert!(components("testdir1").is_empty() == false);
		assert_eq!(components("testdir1"), vec!["testdir1"]);
	}

	#[test]
	fn nested_path_splits_into_components() {
		assert_eq!(
			components("/testdir1/smalltestfile"),
			vec!["testdir1", "smalltestfile"]
		);
	}

	#[test]
	fn split_parent_basic_cases() {
		assert_eq!(split_parent("/testdir1"), ("/", "testdir1"));
		assert_eq!(
			split_parent("/testdir1/smalltestfile"),
			("/testdir1", "smalltestfile")
		);
		assert_eq!(split_parent("lonely"), ("/", "lonely"));
	}

	#[test]
	fn split_parent_preserves_interior_empty_components() {
		// a doubled interior slash is not collapsed away when computing the
		// parent substring, unlike a token-rejoin approach would
		assert_eq!(split_parent("/a//b"), ("/a/", "b"));
	}
}
