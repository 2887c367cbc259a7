//! # LaserKit
//!
//! A parametric laser-cut drawing engine for annotated SVG documents.
//!
//! ## Architecture
//!
//! LaserKit is organized as a workspace with multiple crates:
//!
//! 1. **laserkit-core** - Fabrication context, settings, points and lengths
//! 2. **laserkit-path** - SVG path data model, parser and normaliser
//! 3. **laserkit-template** - Thickness templates and the expression language
//! 4. **laserkit-joints** - Finger, compact finger, flap and t-slot joints
//! 5. **laserkit-designer** - Documents, transforms and the fabrication session
//! 6. **laserkit** - Command line front end that integrates all crates
//!
//! ## Features
//!
//! - **Material thickness**: templated paths and thickness-adjusted rectangles
//!   follow the material in use
//! - **Joints**: edges marked in the drawing become interlocking joints
//! - **Kerf compensation**: per-shape grow/shrink and per-segment masks,
//!   applied to exported copies only
//! - **Scaling**: drawings scale while material-bound dimensions stay put

use std::path::Path;

pub use laserkit_core::{
    EngineSettings, FabricationContext, JointSettings, Length, LoadOverrides, Point,
};
pub use laserkit_designer::{
    Document, DocumentSummary, FabricationSession, HostCallbacks, NoHost, Shape, ShapeId,
};
pub use laserkit_joints::{JointDirection, JointKind};
pub use laserkit_path::PathCommand;
pub use laserkit_template::Template;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, leaving stdout for documents
/// - RUST_LOG environment variable support
/// - Pretty or JSON formatting
pub fn init_logging(format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    match format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_line_number(true)
                .pretty();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .json();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}

/// Load engine settings from a `.toml` or `.json` file, or the defaults.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<EngineSettings> {
    match path {
        Some(path) => Ok(EngineSettings::load_from_file(path)?),
        None => Ok(EngineSettings::default()),
    }
}

/// Read an SVG file and open a session on it with the given load-time
/// parameters.
pub fn open_session(
    path: &Path,
    overrides: &LoadOverrides,
    settings: EngineSettings,
) -> anyhow::Result<FabricationSession> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", path.display(), e))?;
    let session = FabricationSession::load(&source, overrides, settings, &mut NoHost)?;
    Ok(session)
}
