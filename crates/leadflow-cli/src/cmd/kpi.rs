use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use leadflow_core::config::Config;
use leadflow_core::kpi;
use leadflow_core::lead::Lead;
use std::path::Path;

#[derive(Subcommand)]
pub enum KpiSubcommand {
    /// Per-stage conversion funnel
    Funnel,
    /// Top UTM sources by lead count
    Utm {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Leads created per status per day
    Trend {
        #[arg(long)]
        days: Option<u32>,
    },
    /// Newest events across all leads
    Activity {
        #[arg(long)]
        limit: Option<usize>,
    },
}

pub fn run(root: &Path, subcmd: Option<KpiSubcommand>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let leads: Vec<Lead> = Lead::list(root)
        .context("failed to list leads")?
        .into_iter()
        .filter(|l| !l.is_deleted())
        .collect();

    match subcmd {
        None => summary(&leads, &config, json),
        Some(KpiSubcommand::Funnel) => funnel(&leads, json),
        Some(KpiSubcommand::Utm { limit }) => utm(&leads, limit.unwrap_or(config.utm_limit), json),
        Some(KpiSubcommand::Trend { days }) => {
            trend(&leads, days.unwrap_or(config.trend_days), json)
        }
        Some(KpiSubcommand::Activity { limit }) => {
            activity(root, limit.unwrap_or(config.activity_limit), json)
        }
    }
}

fn summary(leads: &[Lead], config: &Config, json: bool) -> anyhow::Result<()> {
    let kpis = kpi::pipeline_kpis(leads);

    if json {
        print_json(&kpis)?;
        return Ok(());
    }

    println!("Leads: {}", kpis.total_leads);
    println!("  Follow-up: {:>5}", kpis.follow_up);
    println!("  Warm:      {:>5}", kpis.warm);
    println!("  Hot:       {:>5}", kpis.hot);
    println!("  Signed:    {:>5}", kpis.signed);
    println!("  Lost:      {:>5}", kpis.lost);
    println!("  Future:    {:>5}", kpis.future);
    println!("Conversion rate: {:.1}%", kpis.conversion_rate);
    println!(
        "Pipeline value:  {:.0} {} ({:.0} weighted)",
        kpis.total_pipeline_value, config.currency, kpis.weighted_pipeline_value
    );
    Ok(())
}

fn funnel(leads: &[Lead], json: bool) -> anyhow::Result<()> {
    let funnel = kpi::conversion_funnel(leads);

    if json {
        print_json(&funnel)?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = funnel
        .iter()
        .map(|entry| {
            vec![
                entry.label.to_string(),
                entry.count.to_string(),
                format!("{:.1}%", entry.percentage),
            ]
        })
        .collect();
    print_table(&["STAGE", "LEADS", "SHARE"], rows);
    Ok(())
}

fn utm(leads: &[Lead], limit: usize, json: bool) -> anyhow::Result<()> {
    let performance = kpi::utm_performance(leads, limit);

    if json {
        print_json(&performance)?;
        return Ok(());
    }

    if performance.is_empty() {
        println!("No leads yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = performance
        .iter()
        .map(|p| {
            vec![
                p.source.clone(),
                p.lead_count.to_string(),
                p.signed_count.to_string(),
                format!("{:.1}%", p.conversion_rate),
                format!("{:.0}", p.total_revenue),
            ]
        })
        .collect();
    print_table(&["SOURCE", "LEADS", "SIGNED", "CONVERSION", "REVENUE"], rows);
    Ok(())
}

fn trend(leads: &[Lead], days: u32, json: bool) -> anyhow::Result<()> {
    let today = chrono::Utc::now().date_naive();
    let points = kpi::status_trend(leads, days, today);

    if json {
        print_json(&points)?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = points
        .iter()
        .map(|p| {
            let total: usize = p.counts.values().sum();
            vec![p.date.to_string(), total.to_string()]
        })
        .collect();
    print_table(&["DATE", "NEW LEADS"], rows);
    Ok(())
}

fn activity(root: &Path, limit: usize, json: bool) -> anyhow::Result<()> {
    // Activity includes soft-deleted leads — their history is still history.
    let leads = Lead::list(root).context("failed to list leads")?;
    let activity = kpi::recent_activity(&leads, limit);

    if json {
        print_json(&activity)?;
        return Ok(());
    }

    if activity.is_empty() {
        println!("No activity yet.");
        return Ok(());
    }

    for entry in &activity {
        println!(
            "{}  {}  {}",
            entry.event.created_at.format("%Y-%m-%d %H:%M"),
            entry.lead_name,
            entry.event.event_type.label()
        );
    }
    Ok(())
}
