use crate::scene::grid::GridType;
use clap::{Parser, Subcommand, value_parser};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "Vellum")]
#[command(version)]
#[command(about = "A character sheet and tabletop scene engine")]
pub struct CliArgs {
    #[command(subcommand)]
    pub operation_mode: OperationMode,
}

#[derive(Subcommand, Debug)]
pub enum OperationMode {
    /// Parses a sheet, binds it to an actor and prints the display tree.
    RenderSheet {
        /// Path to the sheet markup file.
        sheet: String,

        #[arg(long, env = "VELLUM_ACTOR", help = "Path to an actor document (JSON)")]
        actor: Option<String>,

        #[arg(long, env = "VELLUM_RULESET", help = "Path to a ruleset document (JSON)")]
        ruleset: Option<String>,

        /// Actor field edits applied after the first render, as path=value.
        #[arg(long, value_parser = value_parser!(FieldEdit))]
        set: Vec<FieldEdit>,
    },
    /// Runs a scripted scene against a recording surface and dumps the
    /// draw commands.
    SceneDemo {
        #[arg(long, default_value_t = 800.0, env = "VELLUM_SCENE_WIDTH")]
        width: f32,

        #[arg(long, default_value_t = 600.0, env = "VELLUM_SCENE_HEIGHT")]
        height: f32,

        #[arg(long, default_value_t = 50.0)]
        grid_size: f32,

        #[arg(long, default_value = "square", value_parser = value_parser!(GridType))]
        grid_type: GridType,
    },
}

/// One `--set` edit: a dotted actor path and the value to write there.
#[derive(Debug, Clone)]
pub struct FieldEdit {
    pub path: String,
    pub value: String,
}

impl FromStr for FieldEdit {
    type Err = String;

    // stats.strength=16
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((path, value)) = s.split_once('=') else {
            return Err("Expected path=value".to_string());
        };
        if path.is_empty() {
            return Err("The path before '=' must not be empty".to_string());
        }
        Ok(FieldEdit {
            path: path.to_string(),
            value: value.to_string(),
        })
    }
}
