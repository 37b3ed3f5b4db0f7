use std::fs;
use std::path::Path;

use flowhost::core::domain::{GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_MAP};

/// Write `content` to `relative` below `root`, creating parents.
pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("relative path has a parent")).expect("create dirs");
    fs::write(path, content).expect("write fixture");
}

/// Write a per-function value for `namespace`/`name`.
pub fn write_local(root: &Path, namespace: &str, name: &str, key: &str, content: &str) {
    write(root, &format!("{namespace}/func-{name}/{key}"), content);
}

/// Write a cluster-wide value.
pub fn write_global(root: &Path, key: &str, content: &str) {
    write(root, &format!("{GLOBAL_CONFIG_DIR}/{GLOBAL_CONFIG_MAP}/{key}"), content);
}
