//! The flat two-collection store.
//!
//! Files live in a path-keyed map and folders in a path set. The parent of
//! every entry (except root) must itself be a stored folder or root, and that
//! invariant is checked at write time. Iteration order over files is the
//! sorted path order of the map, which is what makes downstream document
//! assembly deterministic.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::VfsError;
use crate::file::{FileLanguage, VirtualFile};
use crate::path::{basename, is_valid_name, normalize, parent};

/// Direct children of a folder, split by kind. Paths are absolute and sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Listing {
    pub folders: Vec<String>,
    pub files: Vec<String>,
}

/// In-memory virtual file system.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Vfs {
    files: BTreeMap<String, VirtualFile>,
    folders: BTreeSet<String>,
}

impl Vfs {
    /// An empty store containing only the implicit root folder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Look up a file by path.
    pub fn get(&self, path: &str) -> Option<&VirtualFile> {
        self.files.get(&normalize(path))
    }

    /// Whether a folder exists at `path` (root always exists).
    pub fn has_folder(&self, path: &str) -> bool {
        let normalized = normalize(path);
        normalized == "/" || self.folders.contains(&normalized)
    }

    /// All files, in sorted path order.
    pub fn files(&self) -> impl Iterator<Item = (&String, &VirtualFile)> {
        self.files.iter()
    }

    /// All files of one language, in sorted path order.
    pub fn files_with_language(
        &self,
        language: FileLanguage,
    ) -> impl Iterator<Item = (&String, &VirtualFile)> {
        self.files
            .iter()
            .filter(move |(_, file)| file.language == language)
    }

    fn check_writable(&self, path: &str) -> Result<String, VfsError> {
        let normalized = normalize(path);
        if normalized == "/" {
            return Err(VfsError::InvalidPath(path.to_string()));
        }
        let name = basename(&normalized);
        if !is_valid_name(&name) {
            return Err(VfsError::InvalidName(name));
        }
        let parent_path = parent(&normalized).ok_or_else(|| VfsError::InvalidPath(normalized.clone()))?;
        if !self.has_folder(&parent_path) {
            if self.files.contains_key(&parent_path) {
                return Err(VfsError::NotAFolder(parent_path));
            }
            return Err(VfsError::MissingParent(parent_path));
        }
        Ok(normalized)
    }

    /// Create a new file. Fails if any entry already occupies the path.
    pub fn create(&mut self, path: &str, content: &str) -> Result<(), VfsError> {
        let normalized = self.check_writable(path)?;
        if self.files.contains_key(&normalized) || self.folders.contains(&normalized) {
            return Err(VfsError::Duplicate(normalized));
        }
        let name = basename(&normalized);
        debug!(path = %normalized, "creating file");
        self.files.insert(normalized, VirtualFile::new(name, content));
        Ok(())
    }

    /// Write a file, replacing its content wholesale if it already exists.
    ///
    /// The file's language is re-inferred from its name on every write.
    pub fn write(&mut self, path: &str, content: &str) -> Result<(), VfsError> {
        let normalized = self.check_writable(path)?;
        if self.folders.contains(&normalized) {
            return Err(VfsError::Duplicate(normalized));
        }
        let name = basename(&normalized);
        self.files.insert(normalized, VirtualFile::new(name, content));
        Ok(())
    }

    /// Create a folder and any missing ancestors.
    ///
    /// Fails if a file occupies the path or any ancestor, or a segment name
    /// is invalid. A no-op for folders that already exist.
    pub fn ensure_folder(&mut self, path: &str) -> Result<(), VfsError> {
        let normalized = normalize(path);
        if normalized == "/" {
            return Ok(());
        }
        let mut ancestors = Vec::new();
        let mut current = normalized.clone();
        loop {
            if self.files.contains_key(&current) {
                return Err(VfsError::NotAFolder(current));
            }
            if self.has_folder(&current) {
                break;
            }
            if !is_valid_name(&basename(&current)) {
                return Err(VfsError::InvalidName(basename(&current)));
            }
            ancestors.push(current.clone());
            match parent(&current) {
                Some(p) if p != "/" => current = p,
                _ => break,
            }
        }
        for folder in ancestors.into_iter().rev() {
            self.folders.insert(folder);
        }
        Ok(())
    }

    /// Delete a file, or a folder together with all of its descendants.
    ///
    /// Refusing to delete the last remaining file of a project is a caller
    /// policy; the store itself performs the deletion unconditionally.
    pub fn delete(&mut self, path: &str) -> Result<(), VfsError> {
        let normalized = normalize(path);
        if normalized == "/" {
            return Err(VfsError::InvalidPath(normalized));
        }
        if self.files.remove(&normalized).is_some() {
            return Ok(());
        }
        if !self.folders.contains(&normalized) {
            return Err(VfsError::NotFound(normalized));
        }
        let prefix = format!("{normalized}/");
        self.folders
            .retain(|f| f != &normalized && !f.starts_with(&prefix));
        self.files.retain(|p, _| !p.starts_with(&prefix));
        debug!(path = %normalized, "deleted folder recursively");
        Ok(())
    }

    /// Direct children of a folder, excluding the folder itself.
    pub fn list_children(&self, dir: &str) -> Result<Listing, VfsError> {
        let normalized = normalize(dir);
        if !self.has_folder(&normalized) {
            if self.files.contains_key(&normalized) {
                return Err(VfsError::NotAFolder(normalized));
            }
            return Err(VfsError::NotFound(normalized));
        }
        let mut listing = Listing::default();
        for folder in &self.folders {
            if parent(folder).as_deref() == Some(&normalized) {
                listing.folders.push(folder.clone());
            }
        }
        for path in self.files.keys() {
            if parent(path).as_deref() == Some(&normalized) {
                listing.files.push(path.clone());
            }
        }
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Vfs {
        let mut vfs = Vfs::new();
        vfs.create("/index.html", "<h1>Hi</h1>").unwrap();
        vfs.ensure_folder("/css").unwrap();
        vfs.create("/css/site.css", "h1 { color: red; }").unwrap();
        vfs.create("/app.js", "console.log('hi');").unwrap();
        vfs
    }

    #[test]
    fn test_create_and_get() {
        let vfs = seeded();
        let file = vfs.get("/css/site.css").unwrap();
        assert_eq!(file.language, FileLanguage::Style);
        assert_eq!(file.name, "site.css");
        assert_eq!(vfs.file_count(), 3);
    }

    #[test]
    fn test_create_duplicate_rejected() {
        let mut vfs = seeded();
        assert_eq!(
            vfs.create("/index.html", "x"),
            Err(VfsError::Duplicate("/index.html".to_string()))
        );
    }

    #[test]
    fn test_write_replaces_wholesale() {
        let mut vfs = seeded();
        vfs.write("/index.html", "<p>new</p>").unwrap();
        assert_eq!(vfs.get("/index.html").unwrap().content, "<p>new</p>");
    }

    #[test]
    fn test_write_requires_parent_folder() {
        let mut vfs = Vfs::new();
        assert_eq!(
            vfs.write("/js/app.js", ""),
            Err(VfsError::MissingParent("/js".to_string()))
        );
        vfs.ensure_folder("/js").unwrap();
        assert!(vfs.write("/js/app.js", "").is_ok());
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut vfs = Vfs::new();
        assert!(matches!(
            vfs.create("/.hidden", ""),
            Err(VfsError::InvalidName(_))
        ));
    }

    #[test]
    fn test_ensure_folder_creates_ancestors() {
        let mut vfs = Vfs::new();
        vfs.ensure_folder("/a/b/c").unwrap();
        assert!(vfs.has_folder("/a"));
        assert!(vfs.has_folder("/a/b"));
        assert!(vfs.has_folder("/a/b/c"));
    }

    #[test]
    fn test_ensure_folder_refuses_file_collision() {
        let mut vfs = seeded();
        assert_eq!(
            vfs.ensure_folder("/index.html/sub"),
            Err(VfsError::NotAFolder("/index.html".to_string()))
        );
    }

    #[test]
    fn test_delete_file() {
        let mut vfs = seeded();
        vfs.delete("/app.js").unwrap();
        assert!(vfs.get("/app.js").is_none());
        assert_eq!(
            vfs.delete("/app.js"),
            Err(VfsError::NotFound("/app.js".to_string()))
        );
    }

    #[test]
    fn test_delete_folder_recursive() {
        let mut vfs = seeded();
        vfs.ensure_folder("/css/themes").unwrap();
        vfs.create("/css/themes/dark.css", "").unwrap();
        vfs.delete("/css").unwrap();
        assert!(!vfs.has_folder("/css"));
        assert!(!vfs.has_folder("/css/themes"));
        assert!(vfs.get("/css/site.css").is_none());
        assert!(vfs.get("/css/themes/dark.css").is_none());
        assert!(vfs.get("/index.html").is_some());
    }

    #[test]
    fn test_list_children_direct_only() {
        let mut vfs = seeded();
        vfs.ensure_folder("/css/themes").unwrap();
        vfs.create("/css/themes/dark.css", "").unwrap();

        let root = vfs.list_children("/").unwrap();
        assert_eq!(root.folders, vec!["/css"]);
        assert_eq!(root.files, vec!["/app.js", "/index.html"]);

        let css = vfs.list_children("/css").unwrap();
        assert_eq!(css.folders, vec!["/css/themes"]);
        assert_eq!(css.files, vec!["/css/site.css"]);
    }

    #[test]
    fn test_list_children_missing_folder() {
        let vfs = seeded();
        assert_eq!(
            vfs.list_children("/nope"),
            Err(VfsError::NotFound("/nope".to_string()))
        );
        assert_eq!(
            vfs.list_children("/index.html"),
            Err(VfsError::NotAFolder("/index.html".to_string()))
        );
    }

    #[test]
    fn test_files_with_language_sorted_order() {
        let mut vfs = seeded();
        vfs.create("/base.css", "").unwrap();
        let styles: Vec<&String> = vfs
            .files_with_language(FileLanguage::Style)
            .map(|(p, _)| p)
            .collect();
        assert_eq!(styles, vec!["/base.css", "/css/site.css"]);
    }
}
