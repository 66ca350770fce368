//! Terminal rendering of each dashboard page.

use std::time::Instant;

use chrono::Utc;
use console::{Style, style};
use dialoguer::Select;
use lovebug_cli_utils::{MultiProgress, with_spinner};
use lovebug_dashboard::format::{
    format_address, format_confidence, format_date, format_location, format_number,
    format_relative_time, format_time_ago, truncate_text,
};
use lovebug_dashboard::views::dashboard::DashboardSummary;
use lovebug_dashboard::views::home::{HEADLINE, HOME_LINKS};
use lovebug_dashboard::views::hotspots::HotspotSummary;
use lovebug_dashboard::views::map::MapPage;
use lovebug_dashboard::views::reports::ReportsPage;
use lovebug_dashboard::views::{connection_indicator, statistics, time_filter_label};
use lovebug_dashboard::{AppContext, FailurePanel, Route};
use lovebug_map::renderer::DEFAULT_SETTLE;
use lovebug_map::{MapRenderer, RecordingSurface, Selection};
use lovebug_report_models::{Hotspot, Platform, Report, SearchFilter, Severity};

type PageResult = Result<(), Box<dyn std::error::Error>>;

const BAR_WIDTH: usize = 30;

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Low => Style::new().green(),
        Severity::Medium => Style::new().yellow(),
        Severity::High => Style::new().color256(208),
        Severity::Critical => Style::new().red().bold(),
    }
}

fn heading(route: Route, ctx: &AppContext) {
    println!(
        "{}  {}",
        style(route.title()).bold().underlined(),
        style(connection_indicator(ctx.connection())).dim()
    );
    println!();
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn bar(count: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let width = (count as f64 / max as f64 * BAR_WIDTH as f64).round() as usize;
    "#".repeat(width)
}

fn report_line(report: &Report) -> String {
    let address = report
        .display_address()
        .map(format_address)
        .unwrap_or_else(|| format_location(report.location.latitude, report.location.longitude));
    format!(
        "{:<9} {:<24} {:<10} {:>6}  {}",
        severity_style(report.severity).apply_to(report.severity.label()),
        address,
        report.platform.label(),
        format_confidence(report.confidence),
        format_relative_time(report.created_at, Utc::now()),
    )
}

fn hotspot_line(hotspot: &Hotspot) -> String {
    format!(
        "{:<28} {:>5} reports  last {}",
        hotspot.display_address().unwrap_or("Unknown location"),
        format_number(hotspot.report_count),
        format_time_ago(hotspot.last_activity, Utc::now()),
    )
}

/// Prints a page failure.
pub fn failure(panel: &FailurePanel) {
    println!();
    println!("{}", style(panel.title).red().bold());
    println!("{}", panel.message);
    if let Some(details) = &panel.details {
        println!("{}", style(details).dim());
    }
}

/// Landing page.
///
/// # Errors
///
/// Never fails; the signature matches the other pages.
#[allow(clippy::unnecessary_wraps)]
pub fn home(ctx: &AppContext) -> PageResult {
    heading(Route::Home, ctx);
    println!("{HEADLINE}");
    println!();
    for link in HOME_LINKS {
        let label = if link.primary {
            style(link.label).magenta().bold()
        } else {
            style(link.label)
        };
        println!("  {label}  ({})", link.route.path());
    }
    Ok(())
}

/// Summary cards and top hotspots.
///
/// # Errors
///
/// Never fails; reads fall back to sample data.
pub async fn dashboard(ctx: &AppContext, multi: &MultiProgress, hours: u32) -> PageResult {
    let stats_filter = DashboardSummary::stats_filter(hours);
    let hotspot_filter = DashboardSummary::hotspot_filter(hours);
    let (stats, hotspots) = with_spinner(multi, "Loading dashboard...", async {
        tokio::join!(
            ctx.data().get_stats(&stats_filter),
            ctx.data().get_hotspots(&hotspot_filter)
        )
    })
    .await;
    let summary = DashboardSummary::from_stats(&stats, hours);

    heading(Route::Dashboard, ctx);
    println!("{}", style(time_filter_label(hours)).dim());
    println!(
        "Total {}   Verified {}   Pending {}   Verification rate {:.1}%",
        style(format_number(summary.total)).bold(),
        format_number(summary.verified),
        format_number(summary.pending),
        summary.verification_rate,
    );
    if let Some((platform, count)) = summary.dominant_platform {
        println!("Most reports from {} ({})", platform.label(), format_number(count));
    }
    println!();
    for share in &summary.severity {
        println!(
            "  {:<9} {:>6} {:>7}",
            severity_style(share.severity).apply_to(share.severity.label()),
            format_number(share.count),
            share.percentage,
        );
    }
    println!();
    println!("{}", style("Top hotspots").bold());
    for hotspot in &hotspots {
        println!("  {}", hotspot_line(hotspot));
    }
    Ok(())
}

/// Distributions and trends.
///
/// # Errors
///
/// Never fails; reads fall back to sample data.
pub async fn statistics(ctx: &AppContext, multi: &MultiProgress, hours: u32) -> PageResult {
    let stats_filter = SearchFilter::with_hours(hours);
    let report_filter = statistics::report_filter(hours);
    let (stats, reports) = with_spinner(multi, "Loading statistics...", async {
        tokio::join!(
            ctx.data().get_stats(&stats_filter),
            ctx.data().get_reports(&report_filter)
        )
    })
    .await;

    heading(Route::Statistics, ctx);

    let hourly = statistics::hourly_distribution(&reports);
    let max = hourly.iter().map(|b| b.count).max().unwrap_or_default();
    println!("{}", style("Reports by hour (UTC)").bold());
    for bucket in &hourly {
        println!(
            "  {:02}:00 {:<width$} {:>4} ({:.1}%)",
            bucket.hour,
            bar(bucket.count, max),
            bucket.count,
            bucket.percentage,
            width = BAR_WIDTH,
        );
    }
    if let Some(peak) = statistics::peak_hour(&hourly).filter(|_| !reports.is_empty()) {
        println!("  Peak hour: {peak:02}:00");
    }

    println!();
    println!("{}", style("Last 7 days").bold());
    for point in statistics::daily_trend(&reports, Utc::now()) {
        println!(
            "  {}  {:>4}  (running {})",
            point.date.format("%m-%d"),
            point.count,
            point.accumulated
        );
    }

    println!();
    println!("{}", style("Confidence by severity").bold());
    for group in statistics::confidence_by_severity(&reports) {
        println!(
            "  {:<9} {:>5.1}% over {} reports",
            severity_style(group.severity).apply_to(group.severity.label()),
            group.average_confidence,
            group.count,
        );
    }
    if let Some(mean) = statistics::average_confidence(&reports) {
        println!("  Overall   {mean:>5.1}%");
    }

    println!();
    println!("{}", style("Platforms").bold());
    for (platform, count, share) in statistics::platform_share(&stats) {
        println!("  {:<10} {:>6} {share:>7}", platform.label(), format_number(count));
    }
    Ok(())
}

/// Hotspot list with its summary.
///
/// # Errors
///
/// Never fails; reads fall back to sample data.
pub async fn hotspots(ctx: &AppContext, multi: &MultiProgress, hours: u32) -> PageResult {
    let filter = HotspotSummary::filter(hours);
    let hotspots = with_spinner(multi, "Loading hotspots...", ctx.data().get_hotspots(&filter)).await;
    let summary = HotspotSummary::from_hotspots(&hotspots);

    heading(Route::Hotspots, ctx);
    println!(
        "{} hotspots, {} reports, {} per hotspot on average",
        summary.count,
        format_number(summary.total_reports),
        summary.average_per_hotspot,
    );
    if let Some(most_active) = &summary.most_active {
        println!(
            "Most active: {}",
            style(most_active.display_address().unwrap_or("Unknown location")).bold()
        );
    }
    println!();
    for hotspot in &hotspots {
        println!("  {}", hotspot_line(hotspot));
        if let Some(distribution) = &hotspot.severity_distribution {
            let parts: Vec<String> = Severity::all()
                .iter()
                .rev()
                .map(|severity| {
                    severity_style(*severity)
                        .apply_to(format!("{} {}", severity.label(), distribution.get(*severity)))
                        .to_string()
                })
                .collect();
            println!("      {}", parts.join("  "));
        }
    }
    Ok(())
}

/// One page of the report list.
///
/// # Errors
///
/// Never fails; reads fall back to sample data.
pub async fn reports(ctx: &AppContext, multi: &MultiProgress, page: &ReportsPage) -> PageResult {
    let query = page.query();
    let (mut reports, stats) = with_spinner(multi, "Loading reports...", async {
        tokio::join!(
            ctx.data().get_reports(&query),
            ctx.data().get_stats(page.filter())
        )
    })
    .await;
    page.sort().apply(&mut reports);
    let total_pages = page.total_pages(stats.total_reports);

    heading(Route::Reports, ctx);
    println!(
        "{} · sorted by {} · page {} of {}",
        time_filter_label(page.filter().hours.unwrap_or_default()),
        page.sort(),
        page.page(),
        total_pages.max(1),
    );
    println!();
    for report in &reports {
        println!("  {}", report_line(report));
        let text = truncate_text(report.description.as_deref().or(Some(report.content.as_str())), 60);
        if !text.is_empty() {
            println!("            {}", style(text).dim());
        }
    }
    if reports.is_empty() {
        println!("  No reports match these filters.");
    }
    println!();
    let numbers: Vec<String> = ReportsPage::page_numbers(total_pages)
        .into_iter()
        .map(|n| {
            if n == page.page() {
                style(format!("[{n}]")).bold().to_string()
            } else {
                n.to_string()
            }
        })
        .collect();
    println!("  Pages: {}", numbers.join(" "));
    Ok(())
}

/// Map legend with interactive selection.
///
/// # Errors
///
/// Returns an error if the selection prompt fails.
pub async fn map(
    ctx: &AppContext,
    multi: &MultiProgress,
    hours: u32,
    severity: Option<Severity>,
    platform: Option<Platform>,
    show_hotspots: bool,
) -> PageResult {
    let mut page = MapPage::new(MapRenderer::new(RecordingSurface::new()));
    page.set_hours(hours);
    page.set_severity(severity);
    page.set_platform(platform);
    if !show_hotspots {
        page.toggle_hotspots();
    }

    let now = Instant::now();
    page.renderer_mut().surface_ready(now);
    page.renderer_mut().tick(now + DEFAULT_SETTLE);
    with_spinner(multi, "Loading map...", page.refresh(ctx.data())).await;

    heading(Route::Map, ctx);
    if let Some((center, zoom)) = page.renderer().surface().view() {
        println!(
            "Centred on {} at zoom {zoom}",
            format_location(center.lat, center.lng)
        );
    }

    loop {
        let legend = page.renderer().legend();
        if legend.is_empty() {
            println!("Nothing to show for these filters.");
            return Ok(());
        }
        let mut labels: Vec<String> = legend
            .iter()
            .map(|entry| format!("{} {}", style("●").dim(), entry.label))
            .collect();
        labels.push("Done".to_string());

        let idx = Select::new()
            .with_prompt("Select a marker or hotspot")
            .items(&labels)
            .default(0)
            .max_length(20)
            .interact()?;
        let Some(entry) = legend.get(idx) else {
            return Ok(());
        };
        match page.renderer_mut().click(entry.layer) {
            Some(Selection::Report(report)) => print_report(&report),
            Some(Selection::Hotspot(hotspot)) => print_hotspot(&hotspot),
            None => log::warn!("Layer {} is no longer on the map", entry.layer),
        }
    }
}

fn print_report(report: &Report) {
    println!();
    println!("{}", report_line(report));
    println!("  {}", report.content);
    println!(
        "  Reported {} · {}",
        format_date(&report.created_at),
        if report.verified {
            format!("verified by {}", report.verification_count)
        } else {
            "unverified".to_string()
        }
    );
    if !report.keywords.is_empty() {
        println!("  #{}", report.keywords.join(" #"));
    }
    println!();
}

fn print_hotspot(hotspot: &Hotspot) {
    println!();
    println!("{}", hotspot_line(hotspot));
    println!(
        "  {} · radius {:.0} m",
        format_location(hotspot.location.latitude, hotspot.location.longitude),
        hotspot.radius
    );
    println!();
}
