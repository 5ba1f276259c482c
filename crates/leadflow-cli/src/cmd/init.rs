use crate::output::print_json;
use anyhow::Context;
use leadflow_core::workspace;
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let name = match name {
        Some(n) => n.to_string(),
        None => root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "leadflow".to_string()),
    };

    let workspace = workspace::init(root, &name).context("failed to initialize workspace")?;

    if json {
        print_json(&workspace)?;
    } else {
        println!("Initialized leadflow workspace: {}", workspace.name);
        println!("Next: leadflow lead create \"Acme Corp\"");
    }
    Ok(())
}
