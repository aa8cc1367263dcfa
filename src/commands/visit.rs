//! One-shot page load.

use clap::Args;

use alextras::App;
use alextras_core::types::{PageUrl, SiteSurface};
use alextras_core::{AppError, AppResult};

use crate::output::{self, OutputFormat};

/// Arguments for the visit command
#[derive(Debug, Args)]
pub struct VisitArgs {
    /// Page URL on either site
    pub url: String,
}

/// Execute the visit command
pub async fn execute(args: &VisitArgs, app: &App, format: OutputFormat) -> AppResult<()> {
    let page = PageUrl::parse(&args.url)?;
    let surface = page
        .host()
        .and_then(|host| SiteSurface::from_host(host, &app.config.site))
        .ok_or_else(|| AppError::validation(format!("'{}' is not a supported site", args.url)))?;

    let report = match surface {
        SiteSurface::Secondary => app.secondary_loader().run_once(page).await,
        SiteSurface::Primary => app.orchestrator().navigate(page, None).await,
    };

    output::print_report(&report, format);
    output::print_overlay(&app.overlay.snapshot(), format);
    Ok(())
}
