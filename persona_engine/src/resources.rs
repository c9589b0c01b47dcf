use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Source of script text, addressed by `/`-separated resource paths.
pub trait ResourceReader {
    fn read_resource(&self, path: &str) -> Option<String>;
}

/// Reads resources relative to a directory on disk.
#[derive(Debug, Clone)]
pub struct FsResources {
    root: PathBuf,
}

impl FsResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsResources { root: root.into() }
    }
}

impl ResourceReader for FsResources {
    fn read_resource(&self, path: &str) -> Option<String> {
        let candidate = self.root.join(path);
        if !candidate.is_file() {
            return None;
        }
        match fs::read(&candidate) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) => {
                log::warn!("failed to read {}: {err}", candidate.display());
                None
            }
        }
    }
}

/// In-memory resource table.
#[derive(Debug, Clone, Default)]
pub struct MemoryResources {
    files: BTreeMap<String, String>,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) {
        self.files.insert(path.into(), source.into());
    }

    pub fn with(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }
}

impl ResourceReader for MemoryResources {
    fn read_resource(&self, path: &str) -> Option<String> {
        self.files.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::{FsResources, MemoryResources, ResourceReader};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn fs_resources_read_relative_to_root() {
        let dir = tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("alice")).expect("mkdir");
        fs::write(dir.path().join("alice/main.lua"), "return 1").expect("write");
        let resources = FsResources::new(dir.path());
        assert_eq!(
            resources.read_resource("alice/main.lua").as_deref(),
            Some("return 1")
        );
        assert!(resources.read_resource("alice/missing.lua").is_none());
        assert!(resources.read_resource("alice").is_none());
    }

    #[test]
    fn memory_resources_are_exact_match() {
        let resources = MemoryResources::new().with("a/b.lua", "x = 1");
        assert!(resources.read_resource("a/b.lua").is_some());
        assert!(resources.read_resource("a//b.lua").is_none());
    }
}
