use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use leadflow_core::lead::{Lead, LeadFilter, LeadUpdate, NewLead};
use leadflow_core::paths;
use leadflow_core::status::LeadStatus;
use std::path::Path;
use std::str::FromStr;

#[derive(Subcommand)]
pub enum LeadSubcommand {
    /// Create a new lead
    Create {
        name: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Where this lead came from (e.g. referral, cold-call)
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        revenue: Option<f64>,
        /// Win probability in percent (0-100)
        #[arg(long)]
        probability: Option<f64>,
        #[arg(long)]
        utm_source: Option<String>,
        #[arg(long)]
        utm_medium: Option<String>,
        #[arg(long)]
        utm_campaign: Option<String>,
    },
    /// List leads
    List {
        /// Only leads with this status
        #[arg(long)]
        status: Option<String>,
        /// Case-insensitive substring over name, email, and phone
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        utm_source: Option<String>,
        #[arg(long)]
        include_deleted: bool,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value = "0")]
        offset: usize,
    },
    /// Show lead details, history, and suggested next statuses
    Show { id: String },
    /// Change a lead's status
    Status {
        id: String,
        status: String,
        /// Reject statuses the transition graph does not suggest
        #[arg(long)]
        strict: bool,
    },
    /// Update lead fields
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        revenue: Option<f64>,
        #[arg(long)]
        probability: Option<f64>,
    },
    /// Manage notes on a lead
    Note {
        #[command(subcommand)]
        subcommand: NoteSubcommand,
    },
    /// Show the suggested next statuses for a lead
    Actions { id: String },
    /// Soft-delete a lead
    Delete { id: String },
    /// Restore a soft-deleted lead
    Restore { id: String },
}

#[derive(Subcommand)]
pub enum NoteSubcommand {
    /// Add a note
    Add { id: String, body: String },
    /// Edit a note
    Edit {
        id: String,
        note_id: String,
        body: String,
    },
    /// Remove a note (the audit event stays)
    Remove { id: String, note_id: String },
}

pub fn run(root: &Path, subcmd: LeadSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        LeadSubcommand::Create {
            name,
            first_name,
            last_name,
            email,
            phone,
            source,
            revenue,
            probability,
            utm_source,
            utm_medium,
            utm_campaign,
        } => create(
            root,
            NewLead {
                name,
                first_name,
                last_name,
                email,
                phone,
                source,
                expected_revenue: revenue,
                probability,
                utm_source,
                utm_medium,
                utm_campaign,
                utm_content: None,
                utm_term: None,
            },
            json,
        ),
        LeadSubcommand::List {
            status,
            search,
            utm_source,
            include_deleted,
            limit,
            offset,
        } => list(
            root,
            status.as_deref(),
            search,
            utm_source,
            include_deleted,
            limit,
            offset,
            json,
        ),
        LeadSubcommand::Show { id } => show(root, &id, json),
        LeadSubcommand::Status { id, status, strict } => {
            set_status(root, &id, &status, strict, json)
        }
        LeadSubcommand::Update {
            id,
            name,
            email,
            phone,
            revenue,
            probability,
        } => update(
            root,
            &id,
            LeadUpdate {
                name,
                email,
                phone,
                expected_revenue: revenue,
                probability,
                ..LeadUpdate::default()
            },
            json,
        ),
        LeadSubcommand::Note { subcommand } => note(root, subcommand, json),
        LeadSubcommand::Actions { id } => actions(root, &id, json),
        LeadSubcommand::Delete { id } => delete(root, &id, json),
        LeadSubcommand::Restore { id } => restore(root, &id, json),
    }
}

fn load(root: &Path, id: &str) -> anyhow::Result<Lead> {
    let id = paths::parse_lead_id(id)?;
    Lead::load(root, id).with_context(|| format!("lead '{id}' not found"))
}

fn create(root: &Path, input: NewLead, json: bool) -> anyhow::Result<()> {
    let lead = Lead::create(root, input).context("failed to create lead")?;

    if json {
        print_json(&lead)?;
    } else {
        println!("Created lead: {} — {}", lead.id, lead.name);
        println!("Status: {}", lead.status_config().label);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn list(
    root: &Path,
    status: Option<&str>,
    search: Option<String>,
    utm_source: Option<String>,
    include_deleted: bool,
    limit: Option<usize>,
    offset: usize,
    json: bool,
) -> anyhow::Result<()> {
    let statuses = match status {
        Some(s) => vec![LeadStatus::from_str(s).with_context(|| format!("unknown status: {s}"))?],
        None => Vec::new(),
    };
    let filter = LeadFilter {
        statuses,
        include_deleted,
        utm_source,
        search,
        offset,
        limit,
        ..LeadFilter::default()
    };
    let leads = Lead::list_filtered(root, &filter).context("failed to list leads")?;

    if json {
        let summaries: Vec<_> = leads
            .iter()
            .map(|l| {
                serde_json::json!({
                    "id": l.id,
                    "name": l.name,
                    "status": l.status,
                    "stage": l.stage(),
                    "expected_revenue": l.expected_revenue,
                    "deleted": l.is_deleted(),
                })
            })
            .collect();
        print_json(&summaries)?;
        return Ok(());
    }

    if leads.is_empty() {
        println!("No leads yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = leads
        .iter()
        .map(|l| {
            vec![
                l.id.to_string(),
                l.name.clone(),
                l.status_config().label.to_string(),
                l.stage().label().to_string(),
                l.expected_revenue
                    .map(|r| format!("{r:.0}"))
                    .unwrap_or_default(),
                if l.is_deleted() { "deleted".to_string() } else { String::new() },
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "STATUS", "STAGE", "REVENUE", ""], rows);
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let lead = load(root, id)?;

    if json {
        print_json(&lead)?;
        return Ok(());
    }

    println!("Lead: {} — {}", lead.id, lead.name);
    if let Some(ref email) = lead.email {
        println!("Email:   {email}");
    }
    if let Some(ref phone) = lead.phone {
        println!("Phone:   {phone}");
    }
    println!("Status:  {} ({})", lead.status_config().label, lead.stage().label());
    if let Some(revenue) = lead.expected_revenue {
        println!("Revenue: {revenue:.0}");
    }
    if let Some(ref source) = lead.utm_source {
        println!("UTM:     {source}");
    }
    println!("Created: {}", lead.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(deleted_at) = lead.deleted_at {
        println!("Deleted: {}", deleted_at.format("%Y-%m-%d %H:%M"));
    }

    let actions = lead.quick_actions();
    if !actions.is_empty() {
        println!("\nSuggested next:");
        for action in actions {
            println!("  {} — {}", action, action.label());
        }
    }

    if !lead.notes.is_empty() {
        println!("\nNotes ({}):", lead.notes.len());
        for note in &lead.notes {
            println!("  [{}] {}", note.id, note.body);
        }
    }

    println!("\nHistory:");
    for event in &lead.events {
        let detail = match (&event.from, &event.to, &event.field, &event.note_id) {
            (Some(from), Some(to), _, _) => format!(" {from} → {to}"),
            (_, _, Some(field), _) => format!(" {field}"),
            (_, _, _, Some(note_id)) => format!(" {note_id}"),
            _ => String::new(),
        };
        println!(
            "  {} {}{}",
            event.created_at.format("%Y-%m-%d %H:%M"),
            event.event_type.label(),
            detail
        );
    }

    Ok(())
}

fn set_status(root: &Path, id: &str, status: &str, strict: bool, json: bool) -> anyhow::Result<()> {
    let target =
        LeadStatus::from_str(status).with_context(|| format!("unknown status: {status}"))?;

    let mut lead = load(root, id)?;
    if strict {
        lead.set_status_strict(target)
            .with_context(|| format!("cannot move '{}' to {status}", lead.name))?;
    } else {
        lead.set_status(target);
    }
    lead.save(root).context("failed to save lead")?;

    if json {
        print_json(&serde_json::json!({
            "id": lead.id,
            "status": lead.status,
            "stage": lead.stage(),
        }))?;
    } else {
        println!("{} → {}", lead.name, lead.status_config().label);
    }
    Ok(())
}

fn update(root: &Path, id: &str, changes: LeadUpdate, json: bool) -> anyhow::Result<()> {
    let mut lead = load(root, id)?;
    let changed = lead.update(changes).context("failed to update lead")?;
    lead.save(root).context("failed to save lead")?;

    if json {
        print_json(&serde_json::json!({ "id": lead.id, "changed_fields": changed }))?;
    } else {
        println!("Updated {} ({} field(s) changed)", lead.name, changed);
    }
    Ok(())
}

fn note(root: &Path, subcmd: NoteSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        NoteSubcommand::Add { id, body } => {
            let mut lead = load(root, &id)?;
            let note_id = lead.add_note(body);
            lead.save(root).context("failed to save lead")?;
            if json {
                print_json(&serde_json::json!({ "id": lead.id, "note_id": note_id }))?;
            } else {
                println!("Added note {note_id} to {}", lead.name);
            }
        }
        NoteSubcommand::Edit { id, note_id, body } => {
            let mut lead = load(root, &id)?;
            lead.edit_note(&note_id, body)
                .with_context(|| format!("note '{note_id}' not found"))?;
            lead.save(root).context("failed to save lead")?;
            if json {
                print_json(&serde_json::json!({ "id": lead.id, "note_id": note_id }))?;
            } else {
                println!("Updated note {note_id}");
            }
        }
        NoteSubcommand::Remove { id, note_id } => {
            let mut lead = load(root, &id)?;
            lead.remove_note(&note_id)
                .with_context(|| format!("note '{note_id}' not found"))?;
            lead.save(root).context("failed to save lead")?;
            if json {
                print_json(&serde_json::json!({ "id": lead.id, "note_id": note_id }))?;
            } else {
                println!("Removed note {note_id}");
            }
        }
    }
    Ok(())
}

fn actions(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let lead = load(root, id)?;
    let actions = lead.quick_actions();

    if json {
        print_json(&serde_json::json!({
            "id": lead.id,
            "status": lead.status,
            "quick_actions": actions,
        }))?;
        return Ok(());
    }

    if actions.is_empty() {
        println!("No suggested next statuses for {}.", lead.name);
        return Ok(());
    }
    println!("Suggested next statuses for {}:", lead.name);
    for action in actions {
        println!("  {} — {}", action, action.label());
    }
    Ok(())
}

fn delete(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut lead = load(root, id)?;
    lead.soft_delete().context("failed to delete lead")?;
    lead.save(root).context("failed to save lead")?;

    if json {
        print_json(&serde_json::json!({ "id": lead.id, "deleted": true }))?;
    } else {
        println!("Deleted lead: {}", lead.name);
    }
    Ok(())
}

fn restore(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut lead = load(root, id)?;
    lead.restore().context("failed to restore lead")?;
    lead.save(root).context("failed to save lead")?;

    if json {
        print_json(&serde_json::json!({ "id": lead.id, "deleted": false }))?;
    } else {
        println!("Restored lead: {}", lead.name);
    }
    Ok(())
}
