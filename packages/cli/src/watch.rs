//! Live loop: periodic polls plus pushed reports until Ctrl-C.

use std::time::Instant;

use chrono::Utc;
use console::style;
use lovebug_dashboard::format::{format_date, format_number};
use lovebug_dashboard::views::connection_indicator;
use lovebug_dashboard::views::dashboard::DashboardSummary;
use lovebug_dashboard::{AppContext, PollKind, UpdateSource};
use lovebug_live::{LiveEventKind, LiveMessage};
use lovebug_report_models::SearchFilter;
use tokio::sync::mpsc;

fn source_tag(source: UpdateSource) -> &'static str {
    match source {
        UpdateSource::Poll => "poll",
        UpdateSource::Push => "push",
    }
}

fn print_stats(ctx: &AppContext, hours: u32) {
    let state = ctx.snapshot();
    let Some(stats) = state.stats() else {
        return;
    };
    let summary = DashboardSummary::from_stats(&stats.value, hours);
    println!(
        "[{} {}] {} reports, {} verified ({:.1}%)",
        format_date(&stats.updated_at),
        source_tag(stats.source),
        format_number(summary.total),
        format_number(summary.verified),
        summary.verification_rate,
    );
}

fn print_counts(ctx: &AppContext) {
    let state = ctx.snapshot();
    if let Some(reports) = state.reports() {
        println!(
            "[{} {}] {} recent reports",
            format_date(&reports.updated_at),
            source_tag(reports.source),
            reports.value.len()
        );
    }
    if let Some(hotspots) = state.hotspots() {
        println!(
            "[{} {}] {} hotspots",
            format_date(&hotspots.updated_at),
            source_tag(hotspots.source),
            hotspots.value.len()
        );
    }
}

/// Polls on the standard intervals and prints pushed reports as toasts
/// until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the Ctrl-C handler cannot be installed.
pub async fn run(ctx: &AppContext, hours: u32) -> Result<(), Box<dyn std::error::Error>> {
    let filter = SearchFilter::with_hours(hours);

    let (tx, mut pushed) = mpsc::unbounded_channel::<LiveEventKind>();
    let subscriptions: Vec<_> = [
        LiveEventKind::NewReport,
        LiveEventKind::StatsUpdate,
        LiveEventKind::HotspotUpdate,
    ]
    .into_iter()
    .map(|kind| {
        let tx = tx.clone();
        let id = ctx.live().subscribe(kind, move |_: &LiveMessage| {
            let _ = tx.send(kind);
        });
        (kind, id)
    })
    .collect();
    drop(tx);

    let mut stats_tick = tokio::time::interval(PollKind::Stats.interval());
    let mut reports_tick = tokio::time::interval(PollKind::Reports.interval());
    let mut hotspots_tick = tokio::time::interval(PollKind::Hotspots.interval());
    let mut connection = ctx.live().watch_state();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    println!(
        "Watching the last {hours} hours. {} Press Ctrl-C to stop.",
        style(connection_indicator(ctx.connection())).dim()
    );

    let result = loop {
        tokio::select! {
            _ = stats_tick.tick() => {
                ctx.refresh(PollKind::Stats, &filter).await;
                print_stats(ctx, hours);
            }
            _ = reports_tick.tick() => {
                ctx.refresh(PollKind::Reports, &filter).await;
                print_counts(ctx);
            }
            _ = hotspots_tick.tick() => {
                ctx.refresh(PollKind::Hotspots, &filter).await;
                print_counts(ctx);
            }
            Some(kind) = pushed.recv() => match kind {
                LiveEventKind::NewReport => {
                    let lines = ctx.with_toast(|toast| toast.lines(Instant::now(), Utc::now()));
                    if let Some((title, rest)) = lines.split_first() {
                        println!("{}", style(title).magenta().bold());
                        for line in rest {
                            println!("  {line}");
                        }
                    }
                }
                LiveEventKind::StatsUpdate => print_stats(ctx, hours),
                LiveEventKind::HotspotUpdate => print_counts(ctx),
            },
            Ok(()) = connection.changed() => {
                let state = *connection.borrow_and_update();
                println!("{}", style(connection_indicator(state)).dim());
            }
            signal = &mut ctrl_c => break signal.map_err(Into::into),
        }
    };

    for (kind, id) in subscriptions {
        ctx.live().unsubscribe(kind, id);
    }
    println!("Stopped watching.");
    result
}
