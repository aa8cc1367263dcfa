//! Module management CLI commands.

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use alextras::App;
use alextras_core::AppResult;
use alextras_core::types::SiteSurface;

use crate::output::{self, OutputFormat};

/// Arguments for module commands
#[derive(Debug, Args)]
pub struct ModulesArgs {
    /// Module subcommand
    #[command(subcommand)]
    pub command: ModulesCommand,
}

/// Site filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SurfaceArg {
    /// AniList modules
    Anilist,
    /// MyAnimeList modules
    Mal,
}

impl From<SurfaceArg> for SiteSurface {
    fn from(arg: SurfaceArg) -> Self {
        match arg {
            SurfaceArg::Anilist => Self::Primary,
            SurfaceArg::Mal => Self::Secondary,
        }
    }
}

/// Module subcommands
#[derive(Debug, Subcommand)]
pub enum ModulesCommand {
    /// List registered modules
    List {
        /// Only list the modules of one site
        #[arg(short, long, value_enum)]
        surface: Option<SurfaceArg>,
    },
    /// Enable a module
    Enable {
        /// Module id
        id: String,
    },
    /// Disable a module
    Disable {
        /// Module id
        id: String,
    },
}

/// Module display row for table output
#[derive(Debug, Serialize, Tabled)]
struct ModuleRow {
    id: String,
    name: String,
    site: String,
    enabled: bool,
    toggleable: bool,
    tags: String,
    depends_on: String,
}

/// Execute module commands
pub async fn execute(args: &ModulesArgs, app: &App, format: OutputFormat) -> AppResult<()> {
    match &args.command {
        ModulesCommand::List { surface } => {
            let surfaces = match surface {
                Some(surface) => vec![SiteSurface::from(*surface)],
                None => vec![SiteSurface::Primary, SiteSurface::Secondary],
            };

            let rows: Vec<ModuleRow> = surfaces
                .into_iter()
                .flat_map(|surface| {
                    app.registry(surface)
                        .list()
                        .into_iter()
                        .map(move |info| (surface, info))
                })
                .map(|(surface, info)| ModuleRow {
                    id: info.descriptor.id.clone(),
                    name: info.descriptor.name.clone(),
                    site: surface.to_string(),
                    enabled: info.enabled,
                    toggleable: info.descriptor.toggleable,
                    tags: join(info.descriptor.tags.iter().map(ToString::to_string)),
                    depends_on: join(info.descriptor.depends_on.iter().cloned()),
                })
                .collect();

            output::print_list(&rows, format);
        }
        ModulesCommand::Enable { id } => {
            app.registry_of(id)?.enable(id).await?;
            output::print_success(&format!("Module '{id}' enabled"));
        }
        ModulesCommand::Disable { id } => {
            app.registry_of(id)?.disable(id).await?;
            output::print_success(&format!("Module '{id}' disabled"));
        }
    }

    Ok(())
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(", ")
}
