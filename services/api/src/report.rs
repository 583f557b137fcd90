use crate::infra::{parse_granularity, parse_instant, parse_preset, parse_range, parse_state};
use chrono::{DateTime, Utc};
use clap::Args;
use placement_analytics::config::AppConfig;
use placement_analytics::error::AppError;
use placement_analytics::import::PlacementCsvImporter;
use placement_analytics::placements::{
    AnalyticsPolicy, DateRange, Granularity, PlacementAnalytics, PlacementReport, PolicyPreset,
    ReportScope, State,
};
use placement_analytics::telemetry;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

const TEXT_ROW_LIMIT: usize = 10;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Placement export to analyze (.json array or .csv)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Date window: 30d, 90d, 12m, or all
    #[arg(long, value_parser = parse_range, default_value = "all")]
    pub(crate) range: DateRange,
    /// Trend bucket size: daily or weekly
    #[arg(long, value_parser = parse_granularity, default_value = "daily")]
    pub(crate) granularity: Granularity,
    /// Drill into one state (name or abbreviation)
    #[arg(long, value_parser = parse_state)]
    pub(crate) state: Option<State>,
    /// Dashboard policy preset; overrides the configured one
    #[arg(long, value_parser = parse_preset)]
    pub(crate) policy: Option<PolicyPreset>,
    /// Reporting instant (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Print the full report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        input,
        range,
        granularity,
        state,
        policy,
        now,
        json,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let policy = match policy {
        Some(preset) => AnalyticsPolicy::from_preset(preset),
        None => config.analytics.policy()?,
    };
    let engine = PlacementAnalytics::new(policy, config.analytics.calendar);

    let items = load_items(&input)?;
    let scope = ReportScope {
        date_range: range,
        granularity,
        selected_state: state,
    };
    let report = engine.report(&items, &scope, now.unwrap_or_else(Utc::now));
    info!(
        input = %input.display(),
        records = report.kpis.total_records,
        scoped = report.kpis.scoped_placements,
        range = range.code(),
        "placement report built"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_report(&report);
    }
    Ok(())
}

/// CSV exports go through the importer; anything else is read as JSON,
/// either a bare array or an object with a `records` array.
pub(crate) fn load_items(path: &Path) -> Result<Vec<Value>, AppError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        return Ok(PlacementCsvImporter::from_path(path)?);
    }

    let file = std::fs::File::open(path)?;
    let value: Value = serde_json::from_reader(std::io::BufReader::new(file))?;
    Ok(items_from_value(value))
}

fn items_from_value(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("records") {
            Some(Value::Array(items)) => items,
            _ => vec![Value::Object(object)],
        },
        other => vec![other],
    }
}

pub(crate) fn render_report(report: &PlacementReport) {
    let kpis = &report.kpis;
    println!("Placement analytics report");
    println!(
        "Generated {} | {} | {} buckets | UTC offset {} min",
        report.generated_at.format("%Y-%m-%d %H:%M UTC"),
        report.scope.date_range.label(),
        report.scope.granularity.label(),
        report.utc_offset_minutes
    );
    if let Some(state) = report.scope.selected_state {
        println!("Drill state: {}", state);
    }

    println!("\nHeadline");
    println!(
        "- {} placements in scope ({} records total, {:.2} per day)",
        kpis.scoped_placements, kpis.total_records, kpis.avg_placements_per_day
    );
    println!(
        "- {} active states across {} regions | {} untapped",
        kpis.active_states, kpis.active_regions, kpis.untapped_state_count
    );
    match kpis.top_state {
        Some(state) => println!("- Top state: {} ({:.1}%)", state, kpis.top_state_share),
        None => println!("- Top state: none"),
    }
    println!(
        "- Median placements per active state: {:.1}",
        kpis.median_placements_per_state
    );
    println!("- Stale states: {}", kpis.stale_state_count);
    println!(
        "- Latest placement: {}",
        kpis.latest_placement_label.as_deref().unwrap_or("none")
    );
    if kpis.invalid_date_records > 0 || kpis.unknown_state_records > 0 {
        println!(
            "- Data quality: {} undated records, {} unknown-state records",
            kpis.invalid_date_records, kpis.unknown_state_records
        );
    }

    println!("\nTop states");
    for row in report.state_totals.iter().take(TEXT_ROW_LIMIT) {
        println!(
            "  - {} ({}): {} placements | {:.1}%",
            row.state,
            row.region.label(),
            row.placements,
            row.share
        );
    }

    if !report.top_cities.is_empty() {
        println!("\nCity hotspots");
        for row in &report.top_cities {
            println!(
                "  - {}, {}: {} placements | {:.1}%",
                row.city, row.state, row.placements, row.share
            );
        }
    }

    if !report.city_drilldown.is_empty() {
        println!("\nCities in drill state");
        for row in &report.city_drilldown {
            println!("  - {}: {}", row.city, row.placements);
        }
    }

    let active_periods = report
        .trend
        .iter()
        .filter(|point| point.placements > 0)
        .count();
    println!(
        "\nTrend: {} periods, {} with placements",
        report.trend.len(),
        active_periods
    );
    for point in report.trend.iter().rev().take(5).rev() {
        println!("  - {}: {}", point.period_label, point.placements);
    }

    if !report.pace.is_empty() {
        println!("\nThirty-day pace");
        for row in report.pace.iter().take(TEXT_ROW_LIMIT) {
            println!(
                "  - {}: {} recent vs {} prior ({:+}, {:+.1}%)",
                row.state,
                row.recent_placements,
                row.prior_placements,
                row.growth_delta,
                row.growth_pct
            );
        }
    }

    if !report.pareto.is_empty() {
        println!("\nConcentration");
        for row in &report.pareto {
            println!(
                "  {:>2}. {} {:.1}% (cumulative {:.1}%)",
                row.rank, row.state, row.share, row.cumulative_share
            );
        }
    }

    if !report.recency.is_empty() {
        println!("\nRecency");
        for row in report.recency.iter().take(TEXT_ROW_LIMIT) {
            println!(
                "  - {} [{}]: {} | {} placements",
                row.state, row.risk_band_label, row.last_placement_label, row.total_placements
            );
        }
    }

    if !report.stale_states.is_empty() {
        println!("\nStale states");
        for row in &report.stale_states {
            println!(
                "  - {} ({}): {}",
                row.state,
                row.region.label(),
                row.last_placement_label
            );
        }
    }

    if !report.regions.is_empty() {
        println!("\nRegional coverage");
        for row in &report.regions {
            let hidden = if row.truncated {
                format!(" (+{} more)", row.hidden_states)
            } else {
                String::new()
            };
            println!(
                "  - {}: {} placements | {:.1}% | {} active states{}",
                row.region.label(),
                row.total_placements,
                row.share,
                row.active_states,
                hidden
            );
        }
    }
}
