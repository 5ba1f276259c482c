use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use leadflow_core::flow;
use leadflow_core::status::{LeadStatus, PipelineStage};
use std::path::Path;
use std::str::FromStr;

#[derive(Subcommand)]
pub enum StatusSubcommand {
    /// List the full status taxonomy grouped by pipeline stage
    List,
    /// Show one status: display config and suggested next statuses
    Show { status: String },
}

pub fn run(_root: &Path, subcmd: StatusSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        StatusSubcommand::List => list(json),
        StatusSubcommand::Show { status } => show(&status, json),
    }
}

fn list(json: bool) -> anyhow::Result<()> {
    if json {
        let stages: Vec<_> = PipelineStage::all()
            .iter()
            .map(|&stage| {
                serde_json::json!({
                    "stage": stage,
                    "label": stage.label(),
                    "statuses": stage.statuses(),
                    "visible_statuses": flow::visible_statuses(stage),
                })
            })
            .collect();
        print_json(&stages)?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = PipelineStage::all()
        .iter()
        .flat_map(|&stage| {
            stage.statuses().iter().map(move |&status| {
                vec![
                    status.to_string(),
                    status.label().to_string(),
                    stage.label().to_string(),
                    if flow::is_hidden(status) { "hidden".to_string() } else { String::new() },
                ]
            })
        })
        .collect();
    print_table(&["STATUS", "LABEL", "STAGE", ""], rows);
    Ok(())
}

fn show(status: &str, json: bool) -> anyhow::Result<()> {
    let status =
        LeadStatus::from_str(status).with_context(|| format!("unknown status: {status}"))?;
    let config = status.config();

    if json {
        print_json(&serde_json::json!({
            "status": status,
            "label": config.label,
            "color": config.color,
            "css_class": config.css_class,
            "stage": status.stage(),
            "hidden": flow::is_hidden(status),
            "quick_actions": flow::quick_actions(Some(status.as_str())),
        }))?;
        return Ok(());
    }

    println!("Status: {} — {}", status, config.label);
    println!("Stage:  {}", status.stage().label());
    if flow::is_hidden(status) {
        println!("Hidden: not offered in pickers");
    }
    let actions = flow::quick_actions(Some(status.as_str()));
    if !actions.is_empty() {
        println!("Suggested next:");
        for action in actions {
            println!("  {} — {}", action, action.label());
        }
    }
    Ok(())
}
