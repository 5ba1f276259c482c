use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use leadflow_core::playbook::Playbook;
use std::path::Path;

#[derive(Subcommand)]
pub enum PlaybookSubcommand {
    /// Create a new playbook
    Create {
        slug: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Markdown body (or pipe it in later with 'edit --file')
        #[arg(long, default_value = "")]
        content: String,
    },
    /// List playbooks
    List {
        #[arg(long)]
        include_deleted: bool,
    },
    /// Show a playbook with its content
    Show { slug: String },
    /// Edit title, category, or content
    Edit {
        slug: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Replace the content with this markdown
        #[arg(long)]
        content: Option<String>,
        /// Replace the content with the given file
        #[arg(long)]
        file: Option<std::path::PathBuf>,
    },
    /// Soft-delete a playbook
    Delete { slug: String },
    /// Restore a soft-deleted playbook
    Restore { slug: String },
}

pub fn run(root: &Path, subcmd: PlaybookSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PlaybookSubcommand::Create {
            slug,
            title,
            category,
            content,
        } => create(root, &slug, title, category, &content, json),
        PlaybookSubcommand::List { include_deleted } => list(root, include_deleted, json),
        PlaybookSubcommand::Show { slug } => show(root, &slug, json),
        PlaybookSubcommand::Edit {
            slug,
            title,
            category,
            content,
            file,
        } => edit(root, &slug, title, category, content, file, json),
        PlaybookSubcommand::Delete { slug } => delete(root, &slug, json),
        PlaybookSubcommand::Restore { slug } => restore(root, &slug, json),
    }
}

fn create(
    root: &Path,
    slug: &str,
    title: Option<String>,
    category: Option<String>,
    content: &str,
    json: bool,
) -> anyhow::Result<()> {
    let title = title.unwrap_or_else(|| slug.replace('-', " "));
    let playbook = Playbook::create(root, slug, &title, category, content)
        .with_context(|| format!("failed to create playbook '{slug}'"))?;

    if json {
        print_json(&playbook)?;
    } else {
        println!("Created playbook: {slug} — {title}");
    }
    Ok(())
}

fn list(root: &Path, include_deleted: bool, json: bool) -> anyhow::Result<()> {
    let playbooks =
        Playbook::list(root, include_deleted).context("failed to list playbooks")?;

    if json {
        print_json(&playbooks)?;
        return Ok(());
    }

    if playbooks.is_empty() {
        println!("No playbooks yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = playbooks
        .iter()
        .map(|p| {
            vec![
                p.slug.clone(),
                p.title.clone(),
                p.category.clone().unwrap_or_default(),
                if p.deleted_at.is_some() { "deleted".to_string() } else { String::new() },
            ]
        })
        .collect();
    print_table(&["SLUG", "TITLE", "CATEGORY", ""], rows);
    Ok(())
}

fn show(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let playbook =
        Playbook::load(root, slug).with_context(|| format!("playbook '{slug}' not found"))?;
    let content = playbook.read_content(root)?;

    if json {
        print_json(&serde_json::json!({
            "slug": playbook.slug,
            "title": playbook.title,
            "category": playbook.category,
            "content": content,
        }))?;
        return Ok(());
    }

    println!("Playbook: {} — {}", playbook.slug, playbook.title);
    if let Some(ref category) = playbook.category {
        println!("Category: {category}");
    }
    println!("Updated:  {}", playbook.updated_at.format("%Y-%m-%d %H:%M"));
    if !content.is_empty() {
        println!("\n{content}");
    }
    Ok(())
}

fn edit(
    root: &Path,
    slug: &str,
    title: Option<String>,
    category: Option<String>,
    content: Option<String>,
    file: Option<std::path::PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let mut playbook =
        Playbook::load(root, slug).with_context(|| format!("playbook '{slug}' not found"))?;

    if let Some(title) = title {
        playbook.rename(title);
    }
    if let Some(category) = category {
        playbook.set_category(Some(category));
    }
    if let Some(path) = file {
        let body = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        playbook.write_content(root, &body)?;
    } else if let Some(body) = content {
        playbook.write_content(root, &body)?;
    }
    playbook.save(root).context("failed to save playbook")?;

    if json {
        print_json(&playbook)?;
    } else {
        println!("Updated playbook: {slug}");
    }
    Ok(())
}

fn delete(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let mut playbook =
        Playbook::load(root, slug).with_context(|| format!("playbook '{slug}' not found"))?;
    playbook.soft_delete().context("failed to delete playbook")?;
    playbook.save(root).context("failed to save playbook")?;

    if json {
        print_json(&serde_json::json!({ "slug": slug, "deleted": true }))?;
    } else {
        println!("Deleted playbook: {slug}");
    }
    Ok(())
}

fn restore(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let mut playbook =
        Playbook::load(root, slug).with_context(|| format!("playbook '{slug}' not found"))?;
    playbook.restore().context("failed to restore playbook")?;
    playbook.save(root).context("failed to save playbook")?;

    if json {
        print_json(&serde_json::json!({ "slug": slug, "deleted": false }))?;
    } else {
        println!("Restored playbook: {slug}");
    }
    Ok(())
}
