//! laserkit CLI - apply fabrication parameters to annotated SVG drawings

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use laserkit::{init_logging, load_settings, open_session, FabricationSession, JointKind, LoadOverrides, LogFormat};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "laserkit", version)]
#[command(about = "Parametric laser-cut drawings: thickness, joints and kerf", long_about = None)]
struct Cli {
    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Parameters {
    /// Input SVG drawing
    input: PathBuf,
    /// Material thickness in drawing units
    #[arg(short, long)]
    thickness: Option<f64>,
    /// Kerf (cut width) in drawing units
    #[arg(short, long)]
    kerf: Option<f64>,
    /// Scale in percent
    #[arg(short, long)]
    scale: Option<f64>,
    /// Load parameters as a query string, e.g. "thickness=3&scale=150"
    #[arg(long, conflicts_with_all = ["thickness", "kerf", "scale"])]
    query: Option<String>,
    /// Replace the type of every joint in the drawing
    #[arg(long)]
    joints: Option<JointKind>,
    /// Engine settings file (.toml or .json)
    #[arg(long)]
    settings: Option<PathBuf>,
}

impl Parameters {
    fn overrides(&self) -> Result<LoadOverrides> {
        match &self.query {
            Some(query) => Ok(LoadOverrides::from_query(query)?),
            None => Ok(LoadOverrides {
                thickness: self.thickness,
                kerf: self.kerf,
                scale_percent: self.scale,
            }),
        }
    }

    fn open(&self) -> Result<FabricationSession> {
        let settings = load_settings(self.settings.as_deref())?;
        let mut session = open_session(&self.input, &self.overrides()?, settings)?;
        if let Some(kind) = self.joints {
            let changed = session.set_joint_type_for_all(kind);
            tracing::info!("Switched {} joints to {}", changed, kind);
        }
        Ok(session)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write the kerf-compensated drawing for the cutter
    Export {
        #[command(flatten)]
        params: Parameters,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the drawing for further editing, templates kept
    Save {
        #[command(flatten)]
        params: Parameters,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the drawing with edges of a given length highlighted
    Render {
        #[command(flatten)]
        params: Parameters,
        /// Highlight every side and segment of this length
        #[arg(long)]
        length: Option<f64>,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Display the fabrication parameters and joints of a drawing
    Info {
        #[command(flatten)]
        params: Parameters,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    })?;

    match cli.command {
        Commands::Export { params, output } => {
            let session = params.open()?;
            write_output(output.as_deref(), &session.image_for_export())?;
        }
        Commands::Save { params, output } => {
            let session = params.open()?;
            write_output(output.as_deref(), &session.image_for_saving())?;
        }
        Commands::Render {
            params,
            length,
            output,
        } => {
            let mut session = params.open()?;
            if let Some(length) = length {
                let found = session.highlight_elements_with_length(length);
                tracing::info!("Highlighted {} edges of length {}", found, length);
            }
            write_output(output.as_deref(), &session.render())?;
        }
        Commands::Info { params, json } => {
            let session = params.open()?;
            show_info(&session, json)?;
        }
    }

    Ok(())
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content)?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn show_info(session: &FabricationSession, json: bool) -> Result<()> {
    let summary = session.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Material thickness: {}", summary.material_thickness);
    println!("Kerf:               {}", summary.kerf);
    println!("Scale:              {}", summary.scaling_factor);
    println!("Shapes:             {} ({} templated)", summary.shapes, summary.templated);
    if summary.joints.is_empty() {
        println!("Joints:             none");
    } else {
        println!("Joints:");
        for joint in &summary.joints {
            println!("  {:<24} {} {}", joint.shape, joint.direction, joint.kind);
        }
    }
    Ok(())
}
