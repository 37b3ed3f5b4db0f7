//! Nested configuration tree built from mounted config and secret volumes.
//!
//! Each directory level becomes a [`ConfigNode::Branch`] and each file a
//! [`ConfigNode::Leaf`] holding its content. Two aliases are derived when
//! the tree is built:
//!
//! - `global` - cluster-wide values at
//!   `fission-secret-configmap/fission-function-global-configmap`
//! - `local` - per-function values at `{namespace}/func-{name}`
//!
//! Aliases are stored as paths and resolved on access, so they always point
//! into the same tree.

use std::collections::BTreeMap;

use serde::Serialize;

/// Alias name for the cluster-wide subtree.
pub const GLOBAL_ALIAS: &str = "global";

/// Alias name for the per-function subtree.
pub const LOCAL_ALIAS: &str = "local";

/// Directory holding cluster-wide values.
pub const GLOBAL_CONFIG_DIR: &str = "fission-secret-configmap";

/// Subdirectory of [`GLOBAL_CONFIG_DIR`] holding cluster-wide values.
pub const GLOBAL_CONFIG_MAP: &str = "fission-function-global-configmap";

/// One node of a config tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigNode {
    Leaf(String),
    Branch(BTreeMap<String, ConfigNode>),
}

impl ConfigNode {
    /// Child node by segment; `None` for leaves.
    #[must_use]
    pub fn get(&self, segment: &str) -> Option<&ConfigNode> {
        match self {
            Self::Branch(children) => children.get(segment),
            Self::Leaf(_) => None,
        }
    }

    /// Leaf content of a direct child.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigNode::as_leaf)
    }

    #[must_use]
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Self::Leaf(content) => Some(content),
            Self::Branch(_) => None,
        }
    }

    fn walk(&self, path: &[String]) -> Option<&ConfigNode> {
        path.iter().try_fold(self, |node, segment| node.get(segment))
    }
}

/// A resolved config or secret tree with its `global`/`local` aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTree {
    root: ConfigNode,
    global: Option<Vec<String>>,
    local: Option<Vec<String>>,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::empty()
    }
}

impl ConfigTree {
    /// A tree with no entries and no aliases.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            root: ConfigNode::Branch(BTreeMap::new()),
            global: None,
            local: None,
        }
    }

    /// Build a tree from its root node and derive aliases for the function.
    #[must_use]
    pub fn with_aliases(root: ConfigNode, namespace: &str, name: &str) -> Self {
        let global = vec![GLOBAL_CONFIG_DIR.to_string(), GLOBAL_CONFIG_MAP.to_string()];
        let local = vec![namespace.to_string(), format!("func-{name}")];

        let global = root.walk(&global).is_some().then_some(global);
        let local = root.walk(&local).is_some().then_some(local);

        Self {
            root,
            global,
            local,
        }
    }

    #[must_use]
    pub fn root(&self) -> &ConfigNode {
        &self.root
    }

    /// Cluster-wide subtree, if present.
    #[must_use]
    pub fn global(&self) -> Option<&ConfigNode> {
        self.global.as_deref().and_then(|path| self.resolve(path))
    }

    /// Per-function subtree, if present.
    #[must_use]
    pub fn local(&self) -> Option<&ConfigNode> {
        self.local.as_deref().and_then(|path| self.resolve(path))
    }

    /// Leaf in the cluster-wide subtree.
    #[must_use]
    pub fn global_value(&self, key: &str) -> Option<&str> {
        self.global().and_then(|node| node.value(key))
    }

    /// Leaf in the per-function subtree.
    #[must_use]
    pub fn local_value(&self, key: &str) -> Option<&str> {
        self.local().and_then(|node| node.value(key))
    }

    /// Node at a path of segments from the root.
    #[must_use]
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&ConfigNode> {
        path.iter()
            .try_fold(&self.root, |node, segment| node.get(segment.as_ref()))
    }

    /// True when the tree holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(&self.root, ConfigNode::Branch(children) if children.is_empty())
    }

    /// JSON view of the tree with the aliases added as top-level keys.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(&self.root)
            .unwrap_or_else(|_| serde_json::Value::Object(Default::default()));
        if let serde_json::Value::Object(map) = &mut value {
            for (alias, node) in [(GLOBAL_ALIAS, self.global()), (LOCAL_ALIAS, self.local())] {
                if let Some(node) = node.and_then(|n| serde_json::to_value(n).ok()) {
                    map.insert(alias.to_string(), node);
                }
            }
        }
        value
    }

    fn resolve(&self, path: &[String]) -> Option<&ConfigNode> {
        self.root.walk(path)
    }
}
