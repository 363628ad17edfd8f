//! brickmesh CLI: inspect, bound and pick brick-CAD models.
//!
//! Models are looked up through the library roots of the configuration file.
//! A model argument naming an existing file also adds that file's directory
//! as the first root.
//!
//! # Logging
//!
//! Log output goes to stderr. `RUST_LOG` takes precedence over `-v`:
//! - default: `brickmesh=info` (one summary per load)
//! - `-v`: `brickmesh=debug` (templates, prefetch progress, octree)
//! - `-vv`: `brickmesh=trace` (template cache hits)
//!
//! # Example
//!
//! ```bash
//! brickmesh --config brickmesh.toml info car.ldr
//! brickmesh pick car.ldr --origin 0,100,0 --direction 0,-1,0 --json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use brickmesh::math::{Point3, Vec3};
use brickmesh::{ColorPalette, Config, ObjectId, Ray, Session};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod output;

use output::{BoundsReport, HitReport, InfoReport, PaletteEntry};

/// Inspect, bound and pick brick-CAD models.
#[derive(Parser)]
#[command(name = "brickmesh")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a model and report its tree, welding and bounds
    Info {
        /// Model name or file
        model: String,
    },

    /// World bounding box of a model and its 8 corners
    Bounds {
        /// Model name or file
        model: String,
    },

    /// Cast a ray at a model and report the nearest hit
    Pick {
        /// Model name or file
        model: String,

        /// Ray origin as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        origin: [f64; 3],

        /// Ray direction as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        direction: [f64; 3],
    },

    /// List the colours defined in a colour file
    Palette {
        /// Colour definition file
        file: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(match verbose {
            0 => "brickmesh=info",
            1 => "brickmesh=debug",
            _ => "brickmesh=trace",
        })
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Info { model } => info(&cli, model),
        Commands::Bounds { model } => bounds(&cli, model),
        Commands::Pick {
            model,
            origin,
            direction,
        } => pick(&cli, model, *origin, *direction),
        Commands::Palette { file } => palette(&cli, file),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Open a session able to find `model`, returning it with the name to load.
fn open_session(cli: &Cli, model: &str) -> Result<(Session, String)> {
    let mut config = load_config(cli)?;
    let name = resolve_model(&mut config, model);
    debug!(model = %name, roots = config.library.roots.len(), "opening library");
    let session = Session::open(config).context("failed to open part library")?;
    Ok((session, name))
}

/// A model given as an existing file is loaded by file name from its own
/// directory, searched before the configured roots.
fn resolve_model(config: &mut Config, model: &str) -> String {
    let path = Path::new(model);
    if path.is_file() {
        if let (Some(parent), Some(file)) = (path.parent(), path.file_name()) {
            let dir = if parent.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                parent.to_path_buf()
            };
            config.library.roots.insert(0, dir);
            return file.to_string_lossy().into_owned();
        }
    }
    model.to_string()
}

fn info(cli: &Cli, model: &str) -> Result<()> {
    let (mut session, name) = open_session(cli, model)?;
    let loaded = session
        .load_model(&name)
        .with_context(|| format!("failed to load {name}"))?;
    let object = session.scene_object(&loaded, ObjectId(0));
    let report = InfoReport::new(&loaded, session.bounds(&object));
    output::emit(cli.json, &report)
}

fn bounds(cli: &Cli, model: &str) -> Result<()> {
    let (mut session, name) = open_session(cli, model)?;
    let loaded = session
        .load_model(&name)
        .with_context(|| format!("failed to load {name}"))?;
    let object = session.scene_object(&loaded, ObjectId(0));
    let Some(bounds) = session.bounds(&object) else {
        bail!("{name} has no geometry to bound");
    };
    output::emit(cli.json, &BoundsReport::new(&bounds))
}

fn pick(cli: &Cli, model: &str, origin: [f64; 3], direction: [f64; 3]) -> Result<()> {
    let direction = Vec3::from(direction);
    if direction.norm() == 0.0 {
        bail!("ray direction must be non-zero");
    }
    let (mut session, name) = open_session(cli, model)?;
    let loaded = session
        .load_model(&name)
        .with_context(|| format!("failed to load {name}"))?;
    let object = session.scene_object(&loaded, ObjectId(0));
    let picking = session.picking([&object]);
    let ray = Ray::new(Point3::from(origin), direction);
    let hit = picking.pick(&ray).map(HitReport::from);
    output::emit(cli.json, &hit)
}

fn palette(cli: &Cli, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let lines: Vec<&str> = text.lines().collect();
    let palette = ColorPalette::parse(&file.display().to_string(), &lines)
        .with_context(|| format!("failed to parse {}", file.display()))?;
    let entries: Vec<PaletteEntry> = palette.iter().map(PaletteEntry::from).collect();
    output::emit(cli.json, &entries)
}

fn parse_vec3(s: &str) -> std::result::Result<[f64; 3], String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in {s:?}: {e}"))?;
    match values.as_slice() {
        &[x, y, z] => Ok([x, y, z]),
        _ => Err(format!("expected x,y,z, got {s:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vec3() {
        assert_eq!(parse_vec3("1,-2.5, 3").unwrap(), [1.0, -2.5, 3.0]);
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("1,2,x").is_err());
    }

    #[test]
    fn test_pick_args() {
        let cli = Cli::try_parse_from([
            "brickmesh",
            "pick",
            "car.ldr",
            "--origin",
            "0,100,0",
            "--direction",
            "0,-1,0",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Pick {
                origin, direction, ..
            } => {
                assert_eq!(origin, [0.0, 100.0, 0.0]);
                assert_eq!(direction, [0.0, -1.0, 0.0]);
            }
            _ => panic!("expected pick"),
        }
    }

    #[test]
    fn test_named_model_is_not_resolved() {
        let mut config = Config::default();
        assert_eq!(resolve_model(&mut config, "3001.dat"), "3001.dat");
        assert!(config.library.roots.is_empty());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
