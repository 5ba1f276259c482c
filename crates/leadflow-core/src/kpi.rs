use crate::event::LeadEvent;
use crate::lead::Lead;
use crate::status::{self, LeadStatus, PipelineStage};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Probability assumed for weighted pipeline value when a lead has none.
pub const DEFAULT_PROBABILITY: f64 = 50.0;

/// UTM bucket for leads without attribution.
pub const DIRECT_SOURCE: &str = "direct";

// ---------------------------------------------------------------------------
// PipelineKpis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineKpis {
    pub total_leads: usize,
    pub follow_up: usize,
    pub warm: usize,
    pub hot: usize,
    pub signed: usize,
    pub lost: usize,
    pub future: usize,
    /// Percentage of leads in the signed stage. 0 when there are no leads.
    pub conversion_rate: f64,
    pub total_pipeline_value: f64,
    pub weighted_pipeline_value: f64,
}

/// Single pass over the leads: stage counts, conversion rate, and pipeline
/// values. Revenue defaults to 0 and probability to
/// [`DEFAULT_PROBABILITY`] when absent. Signed-stage membership comes from
/// the stage partition, never a hardcoded status list.
pub fn pipeline_kpis(leads: &[Lead]) -> PipelineKpis {
    let mut kpis = PipelineKpis {
        total_leads: leads.len(),
        ..PipelineKpis::default()
    };

    for lead in leads {
        match lead.stage() {
            PipelineStage::FollowUp => kpis.follow_up += 1,
            PipelineStage::Warm => kpis.warm += 1,
            PipelineStage::Hot => kpis.hot += 1,
            PipelineStage::Signed => kpis.signed += 1,
            PipelineStage::Lost => kpis.lost += 1,
            PipelineStage::Future => kpis.future += 1,
        }

        let revenue = lead.expected_revenue.unwrap_or(0.0);
        let probability = lead.probability.unwrap_or(DEFAULT_PROBABILITY) / 100.0;
        kpis.total_pipeline_value += revenue;
        kpis.weighted_pipeline_value += revenue * probability;
    }

    if kpis.total_leads > 0 {
        kpis.conversion_rate = kpis.signed as f64 / kpis.total_leads as f64 * 100.0;
    }
    kpis
}

// ---------------------------------------------------------------------------
// Conversion funnel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelEntry {
    pub stage: PipelineStage,
    pub label: &'static str,
    pub count: usize,
    pub percentage: f64,
}

/// Per-stage counts and share, in stage order.
pub fn conversion_funnel(leads: &[Lead]) -> Vec<FunnelEntry> {
    let total = leads.len();
    PipelineStage::all()
        .iter()
        .map(|&stage| {
            let count = leads.iter().filter(|l| l.stage() == stage).count();
            let percentage = if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            FunnelEntry {
                stage,
                label: stage.label(),
                count,
                percentage,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// UTM performance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtmPerformance {
    pub source: String,
    pub lead_count: usize,
    pub signed_count: usize,
    pub conversion_rate: f64,
    /// Revenue of signed-stage leads only — open pipeline doesn't count.
    pub total_revenue: f64,
}

/// Group leads by UTM source (missing attribution buckets under
/// [`DIRECT_SOURCE`]), top sources by lead count first.
pub fn utm_performance(leads: &[Lead], limit: usize) -> Vec<UtmPerformance> {
    let mut buckets: BTreeMap<&str, (usize, usize, f64)> = BTreeMap::new();

    for lead in leads {
        let source = lead.utm_source.as_deref().unwrap_or(DIRECT_SOURCE);
        let entry = buckets.entry(source).or_default();
        entry.0 += 1;
        if lead.stage() == PipelineStage::Signed {
            entry.1 += 1;
            entry.2 += lead.expected_revenue.unwrap_or(0.0);
        }
    }

    let mut performance: Vec<UtmPerformance> = buckets
        .into_iter()
        .map(|(source, (lead_count, signed_count, total_revenue))| UtmPerformance {
            source: source.to_string(),
            lead_count,
            signed_count,
            conversion_rate: if lead_count > 0 {
                signed_count as f64 / lead_count as f64 * 100.0
            } else {
                0.0
            },
            total_revenue,
        })
        .collect();

    // BTreeMap iteration gives source-name order, making the sort stable
    // for equal lead counts.
    performance.sort_by(|a, b| b.lead_count.cmp(&a.lead_count));
    performance.truncate(limit);
    performance
}

// ---------------------------------------------------------------------------
// Status trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub counts: BTreeMap<LeadStatus, usize>,
}

/// Leads created per status per day over the trailing `days` window, one
/// point per calendar day with missing days filled with zero counts.
pub fn status_trend(leads: &[Lead], days: u32, today: NaiveDate) -> Vec<TrendPoint> {
    let start = today - chrono::Duration::days(i64::from(days));

    let zero_counts: BTreeMap<LeadStatus, usize> =
        LeadStatus::all().iter().map(|&s| (s, 0)).collect();

    let mut by_date: BTreeMap<NaiveDate, BTreeMap<LeadStatus, usize>> = BTreeMap::new();
    for lead in leads {
        let date = lead.created_at.date_naive();
        if date < start || date > today {
            continue;
        }
        let status = status::resolve(Some(&lead.status));
        let counts = by_date.entry(date).or_insert_with(|| zero_counts.clone());
        *counts.entry(status).or_insert(0) += 1;
    }

    let mut points = Vec::new();
    let mut date = start;
    while date <= today {
        let counts = by_date.remove(&date).unwrap_or_else(|| zero_counts.clone());
        points.push(TrendPoint { date, counts });
        date = date + chrono::Duration::days(1);
    }
    points
}

// ---------------------------------------------------------------------------
// Recent activity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub lead_id: Uuid,
    pub lead_name: String,
    pub event: LeadEvent,
}

/// Newest events across all leads, merged and capped at `limit`.
pub fn recent_activity(leads: &[Lead], limit: usize) -> Vec<ActivityEntry> {
    let mut activity: Vec<ActivityEntry> = leads
        .iter()
        .flat_map(|lead| {
            lead.events.iter().map(|event| ActivityEntry {
                lead_id: lead.id,
                lead_name: lead.name.clone(),
                event: event.clone(),
            })
        })
        .collect();
    activity.sort_by(|a, b| b.event.created_at.cmp(&a.event.created_at));
    activity.truncate(limit);
    activity
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::NewLead;

    fn lead(name: &str, status: &str, revenue: Option<f64>, probability: Option<f64>) -> Lead {
        let mut lead = Lead::new(NewLead {
            name: name.to_string(),
            ..NewLead::default()
        })
        .unwrap();
        lead.status = status.to_string();
        lead.expected_revenue = revenue;
        lead.probability = probability;
        lead
    }

    #[test]
    fn empty_collection_is_all_zero() {
        let kpis = pipeline_kpis(&[]);
        assert_eq!(kpis.total_leads, 0);
        assert_eq!(kpis.conversion_rate, 0.0);
        assert_eq!(kpis.total_pipeline_value, 0.0);
        assert_eq!(kpis.weighted_pipeline_value, 0.0);

        for entry in conversion_funnel(&[]) {
            assert_eq!(entry.count, 0);
            assert_eq!(entry.percentage, 0.0);
        }
        assert!(utm_performance(&[], 5).is_empty());
    }

    #[test]
    fn pipeline_values_and_conversion() {
        let leads = vec![
            lead("a", "signed", Some(10000.0), Some(80.0)),
            lead("b", "not_contacted", None, None),
        ];
        let kpis = pipeline_kpis(&leads);
        assert_eq!(kpis.total_leads, 2);
        assert_eq!(kpis.signed, 1);
        assert_eq!(kpis.follow_up, 1);
        assert_eq!(kpis.total_pipeline_value, 10000.0);
        assert_eq!(kpis.weighted_pipeline_value, 8000.0);
        assert_eq!(kpis.conversion_rate, 50.0);
    }

    #[test]
    fn probability_defaults_to_fifty() {
        let leads = vec![lead("a", "meeting_set", Some(2000.0), None)];
        let kpis = pipeline_kpis(&leads);
        assert_eq!(kpis.weighted_pipeline_value, 1000.0);
    }

    #[test]
    fn conversion_counts_whole_signed_stage() {
        // under_review and completed are signed-stage statuses even though
        // neither is literally "signed"
        let leads = vec![
            lead("a", "under_review", None, None),
            lead("b", "completed", None, None),
            lead("c", "no_answer", None, None),
            lead("d", "not_relevant", None, None),
        ];
        let kpis = pipeline_kpis(&leads);
        assert_eq!(kpis.signed, 2);
        assert_eq!(kpis.conversion_rate, 50.0);
        assert_eq!(kpis.lost, 1);
    }

    #[test]
    fn unknown_status_counts_as_follow_up() {
        let leads = vec![lead("a", "retired_status", None, None)];
        let kpis = pipeline_kpis(&leads);
        assert_eq!(kpis.follow_up, 1);
    }

    #[test]
    fn funnel_covers_stages_in_order() {
        let leads = vec![
            lead("a", "contacted", None, None),
            lead("b", "signed", None, None),
            lead("c", "signed", None, None),
            lead("d", "future_interest", None, None),
        ];
        let funnel = conversion_funnel(&leads);
        assert_eq!(funnel.len(), 6);
        assert_eq!(funnel[0].stage, PipelineStage::FollowUp);
        assert_eq!(funnel[3].stage, PipelineStage::Signed);
        assert_eq!(funnel[3].count, 2);
        assert_eq!(funnel[3].percentage, 50.0);
        assert_eq!(funnel[5].count, 1);
    }

    #[test]
    fn utm_groups_and_ranks_sources() {
        let mut leads = vec![
            lead("a", "signed", Some(5000.0), None),
            lead("b", "contacted", None, None),
            lead("c", "no_answer", None, None),
            lead("d", "signed", Some(1000.0), None),
        ];
        leads[0].utm_source = Some("google".to_string());
        leads[1].utm_source = Some("google".to_string());
        leads[2].utm_source = Some("newsletter".to_string());
        // leads[3] has no attribution → direct

        let perf = utm_performance(&leads, 5);
        assert_eq!(perf[0].source, "google");
        assert_eq!(perf[0].lead_count, 2);
        assert_eq!(perf[0].signed_count, 1);
        assert_eq!(perf[0].conversion_rate, 50.0);
        assert_eq!(perf[0].total_revenue, 5000.0);

        let direct = perf.iter().find(|p| p.source == "direct").unwrap();
        assert_eq!(direct.total_revenue, 1000.0);
    }

    #[test]
    fn utm_limit_caps_sources() {
        let mut leads = Vec::new();
        for i in 0..8 {
            let mut l = lead(&format!("l{i}"), "contacted", None, None);
            l.utm_source = Some(format!("source-{i}"));
            leads.push(l);
        }
        assert_eq!(utm_performance(&leads, 3).len(), 3);
    }

    #[test]
    fn trend_fills_missing_days() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut l = lead("a", "contacted", None, None);
        l.created_at = chrono::DateTime::parse_from_rfc3339("2026-03-08T09:30:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);

        let points = status_trend(&[l], 7, today);
        assert_eq!(points.len(), 8); // window start through today inclusive
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2026, 3, 3).unwrap());
        assert_eq!(points.last().unwrap().date, today);

        let day = points
            .iter()
            .find(|p| p.date == NaiveDate::from_ymd_opt(2026, 3, 8).unwrap())
            .unwrap();
        assert_eq!(day.counts[&LeadStatus::Contacted], 1);
        // every point carries the full taxonomy, zero-filled
        for point in &points {
            assert_eq!(point.counts.len(), LeadStatus::all().len());
        }
    }

    #[test]
    fn trend_ignores_leads_outside_window() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut old = lead("old", "contacted", None, None);
        old.created_at = chrono::DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let points = status_trend(&[old], 7, today);
        for point in &points {
            assert!(point.counts.values().all(|&c| c == 0));
        }
    }

    #[test]
    fn recent_activity_is_newest_first() {
        let mut a = lead("Acme", "not_contacted", None, None);
        std::thread::sleep(std::time::Duration::from_millis(2));
        a.set_status(crate::status::LeadStatus::Contacted);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let mut b = lead("Globex", "not_contacted", None, None);
        std::thread::sleep(std::time::Duration::from_millis(2));
        b.add_note("call next week");

        let activity = recent_activity(&[a, b], 10);
        assert_eq!(activity.len(), 4);
        assert_eq!(activity[0].lead_name, "Globex");
        assert_eq!(
            activity[0].event.event_type,
            crate::event::EventType::NoteAdded
        );

        let capped = recent_activity(&[], 10);
        assert!(capped.is_empty());
    }
}
