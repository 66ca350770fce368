//! Interactive report submission.

use console::style;
use dialoguer::{Input, Select};
use lovebug_cli_utils::{MultiProgress, with_spinner};
use lovebug_dashboard::{AppContext, ReportForm, Route, SubmitError};
use lovebug_report_models::{Platform, Severity};

/// Prompts for the form fields and submits once. Validation and API
/// failures are printed, not retried.
///
/// # Errors
///
/// Returns an error if a prompt fails.
pub async fn run(ctx: &AppContext, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", style(Route::Report.title()).bold().underlined());
    println!();

    let mut form = ReportForm::default();

    form.address = Input::<String>::new()
        .with_prompt("Address")
        .allow_empty(true)
        .interact_text()?;

    let severities = Severity::all();
    let labels: Vec<&str> = severities.iter().map(|s| s.label()).collect();
    let default = severities
        .iter()
        .position(|s| *s == form.severity)
        .unwrap_or_default();
    form.severity = severities[Select::new()
        .with_prompt("Severity")
        .items(&labels)
        .default(default)
        .interact()?];

    let platforms = Platform::submittable();
    let labels: Vec<&str> = platforms.iter().map(|p| p.label()).collect();
    let default = platforms
        .iter()
        .position(|p| *p == form.platform)
        .unwrap_or_default();
    form.platform = platforms[Select::new()
        .with_prompt("Where did you see it?")
        .items(&labels)
        .default(default)
        .interact()?];

    form.description = Input::<String>::new()
        .with_prompt("Description")
        .allow_empty(true)
        .interact_text()?;

    let photos: String = Input::new()
        .with_prompt("Photo file names (comma-separated, optional)")
        .allow_empty(true)
        .interact_text()?;
    form.photos = photos
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect();

    match with_spinner(multi, "Submitting report...", form.submit(ctx.data())).await {
        Ok(report) => {
            println!(
                "{} Report {} submitted. Thanks for helping track lovebugs!",
                style("✓").green().bold(),
                report.id
            );
        }
        Err(SubmitError::Invalid(e)) => println!("{}", style(e).yellow()),
        Err(e @ SubmitError::Api(_)) => println!("{}", style(e).red()),
    }
    Ok(())
}
