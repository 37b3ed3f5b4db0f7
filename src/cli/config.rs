//! Handler for the `config` command group.

use crate::cli::ShowArgs;
use crate::core::service::resolve_tree;

/// Execute `config show`.
pub fn execute_show(args: &ShowArgs) -> anyhow::Result<()> {
    let tree = resolve_tree(&args.root, &args.namespace, &args.name)?;
    println!("{}", serde_json::to_string_pretty(&tree.to_json())?);
    Ok(())
}
