//! Builds [`ConfigTree`]s from mounted config and secret volumes.
//!
//! Every file below a root becomes a leaf keyed by its directory components
//! and file name. Symlinked files are read through the link; symlinked
//! directories are not descended into, so every file appears exactly once.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::domain::{ConfigNode, ConfigTree, FunctionIdentity};
use crate::error::ConfigError;

/// Resolves the config and secret trees for a function.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    configs_root: PathBuf,
    secrets_root: PathBuf,
}

impl ConfigResolver {
    pub fn new(configs_root: impl Into<PathBuf>, secrets_root: impl Into<PathBuf>) -> Self {
        Self {
            configs_root: configs_root.into(),
            secrets_root: secrets_root.into(),
        }
    }

    /// Resolve `(configs, secrets)` for `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadTree`] if an existing file or directory
    /// cannot be read.
    pub fn resolve(
        &self,
        identity: &FunctionIdentity,
    ) -> Result<(ConfigTree, ConfigTree), ConfigError> {
        let configs = resolve_tree(&self.configs_root, identity.namespace(), identity.name())?;
        let secrets = resolve_tree(&self.secrets_root, identity.namespace(), identity.name())?;
        Ok((configs, secrets))
    }
}

/// Build the tree below `root` with aliases for `namespace`/`name`.
///
/// A missing root, or a root that is not a directory, yields an empty tree.
///
/// # Errors
///
/// Returns [`ConfigError::ReadTree`] if an existing entry cannot be read.
pub fn resolve_tree(root: &Path, namespace: &str, name: &str) -> Result<ConfigTree, ConfigError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            debug!(root = %root.display(), "config root is not a directory");
            return Ok(ConfigTree::empty());
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(root = %root.display(), "config root does not exist");
            return Ok(ConfigTree::empty());
        }
        Err(source) => return Err(read_error(root, source)),
    }

    let children = load_dir(root)?;
    debug!(root = %root.display(), entries = children.len(), "config root loaded");
    Ok(ConfigTree::with_aliases(
        ConfigNode::Branch(children),
        namespace,
        name,
    ))
}

fn load_dir(dir: &Path) -> Result<BTreeMap<String, ConfigNode>, ConfigError> {
    let mut children = BTreeMap::new();

    for entry in fs::read_dir(dir).map_err(|e| read_error(dir, e))? {
        let entry = entry.map_err(|e| read_error(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| read_error(&path, e))?;
        let key = entry.file_name().to_string_lossy().into_owned();

        if file_type.is_dir() {
            children.insert(key, ConfigNode::Branch(load_dir(&path)?));
        } else if file_type.is_file() {
            children.insert(key, ConfigNode::Leaf(read_file(&path)?));
        } else if file_type.is_symlink() {
            let target = fs::metadata(&path).map_err(|e| read_error(&path, e))?;
            if target.is_file() {
                children.insert(key, ConfigNode::Leaf(read_file(&path)?));
            }
        }
    }

    Ok(children)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|e| read_error(path, e))
}

fn read_error(path: &Path, source: io::Error) -> ConfigError {
    ConfigError::ReadTree {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::core::domain::{GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_MAP};

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn missing_root_is_empty_tree() {
        let dir = TempDir::new().unwrap();

        let tree = resolve_tree(&dir.path().join("absent"), "ns", "fn").unwrap();

        assert!(tree.is_empty());
    }

    #[test]
    fn every_file_is_inserted_by_path() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "top", "t");
        write(dir.path(), "ns/func-fn/a", "1");
        write(dir.path(), "ns/func-fn/nested/deep", "d");
        write(dir.path(), "other/x", "x");

        let tree = resolve_tree(dir.path(), "ns", "fn").unwrap();

        assert_eq!(tree.root().value("top"), Some("t"));
        assert_eq!(tree.local_value("a"), Some("1"));
        assert_eq!(
            tree.get_path(&["ns", "func-fn", "nested", "deep"])
                .and_then(ConfigNode::as_leaf),
            Some("d")
        );
        assert_eq!(
            tree.get_path(&["other", "x"]).and_then(ConfigNode::as_leaf),
            Some("x")
        );
        assert!(tree.global().is_none());
    }

    #[test]
    fn global_alias_points_at_cluster_config_map() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            &format!("{GLOBAL_CONFIG_DIR}/{GLOBAL_CONFIG_MAP}/b"),
            "2",
        );

        let tree = resolve_tree(dir.path(), "ns", "fn").unwrap();

        assert_eq!(tree.global_value("b"), Some("2"));
        assert!(tree.local().is_none());
    }

    #[test]
    fn file_content_is_kept_verbatim() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "ns/func-fn/multi", "line one\nline two\n");

        let tree = resolve_tree(dir.path(), "ns", "fn").unwrap();

        assert_eq!(tree.local_value("multi"), Some("line one\nline two\n"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_file_is_read_through_link() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "data/real", "linked");
        fs::create_dir_all(dir.path().join("ns/func-fn")).unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("data/real"),
            dir.path().join("ns/func-fn/key"),
        )
        .unwrap();

        let tree = resolve_tree(dir.path(), "ns", "fn").unwrap();

        assert_eq!(tree.local_value("key"), Some("linked"));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_fatal() {
        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("key")).unwrap();

        let err = resolve_tree(dir.path(), "ns", "fn").unwrap_err();

        assert!(matches!(err, ConfigError::ReadTree { .. }));
    }

    #[test]
    fn resolver_reads_both_roots() {
        let configs = TempDir::new().unwrap();
        let secrets = TempDir::new().unwrap();
        write(configs.path(), "ns/func-fn/a", "1");
        write(secrets.path(), "ns/func-fn/token", "s3cret");

        let resolver = ConfigResolver::new(configs.path(), secrets.path());
        let (configs, secrets) = resolver.resolve(&FunctionIdentity::new("ns", "fn")).unwrap();

        assert_eq!(configs.local_value("a"), Some("1"));
        assert_eq!(secrets.local_value("token"), Some("s3cret"));
        assert!(configs.local_value("token").is_none());
    }
}
