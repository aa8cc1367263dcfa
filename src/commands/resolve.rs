//! Cross-site id lookup CLI command.

use clap::Args;
use serde_json::json;

use alextras::App;
use alextras_core::AppResult;
use alextras_core::traits::MediaResolver;
use alextras_core::types::IdKind;

use crate::output::{self, OutputFormat};

/// Arguments for the resolve command
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Entry id, or a username with --user
    pub id: String,

    /// Site the id belongs to (anilist|mal)
    #[arg(long, default_value = "anilist")]
    pub from: String,

    /// Site to resolve to (anilist|mal)
    #[arg(long, default_value = "mal")]
    pub to: String,

    /// Entry type (anime|manga)
    #[arg(long = "type", default_value = "anime")]
    pub media_type: String,

    /// Resolve an AniList username to its user id instead
    #[arg(long)]
    pub user: bool,
}

/// Execute the resolve command
pub async fn execute(args: &ResolveArgs, app: &App, format: OutputFormat) -> AppResult<()> {
    if args.user {
        let user_id = app.anilist.resolve_user_id(&args.id).await?;
        return print(format, json!({ "username": args.id, "id": user_id }), || match user_id {
            Some(id) => output::print_kv(&args.id, &id.to_string()),
            None => output::print_warning(&format!("No user named '{}'", args.id)),
        });
    }

    let from: IdKind = args.from.parse()?;
    let to: IdKind = args.to.parse()?;
    let resolved = app
        .resolver
        .resolve_id(&args.id, from, to, &args.media_type)
        .await?;

    let value = json!({
        "type": args.media_type,
        "from": from,
        "to": to,
        "id": args.id,
        "resolved": resolved,
    });
    print(format, value, || match resolved {
        Some(id) => output::print_kv(&format!("{from} {}", args.id), &format!("{to} {id}")),
        None => output::print_warning(&format!("No {to} entry for {from} {}", args.id)),
    })
}

fn print(format: OutputFormat, value: serde_json::Value, table: impl FnOnce()) -> AppResult<()> {
    match format {
        OutputFormat::Json => output::print_json(&value),
        OutputFormat::Table => table(),
    }
    Ok(())
}
