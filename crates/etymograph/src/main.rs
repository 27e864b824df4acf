use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use etymograph::{Pipeline, PipelineConfig, PipelineError};
use etymograph_layout::LayoutGraph;
use etymograph_parser::Document;
use etymograph_skia_render::RenderError;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    input: Option<PathBuf>,
    out: Option<PathBuf>,
    overlay: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    config: Option<PathBuf>,
    iterations: Option<usize>,
    hover: Option<(f32, f32)>,
    json: bool,
    help: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    document: &'a Document,
    layout: &'a LayoutGraph,
    #[serde(skip_serializing_if = "Option::is_none")]
    hovered: Option<&'a str>,
}

fn usage() -> &'static str {
    "etymograph\n\
\n\
USAGE:\n\
  etymograph [<path>|-] [--out FILE] [--overlay FILE] [--width N] [--height N]\n\
             [--config FILE] [--iterations N] [--hover X,Y] [--json]\n\
\n\
Reads a text blob with <structure> and <content> blocks from <path> or stdin\n\
and renders the derivation graph to PNG (or JPEG for .jpg/.jpeg paths).\n\
\n\
OPTIONS:\n\
  --out FILE        image path (default: <path>.png, or etymograph.png for stdin)\n\
  --overlay FILE    also write the transparent overlay layer\n\
  --width N         canvas width in pixels\n\
  --height N        canvas height in pixels\n\
  --config FILE     JSON pipeline config\n\
  --iterations N    crossing-reduction sweeps\n\
  --hover X,Y       simulate the pointer at X,Y before writing images\n\
  --json            print the parsed document and positioned graph as JSON\n\
\n\
Log verbosity follows RUST_LOG (default: warn)."
}

fn value<'a>(
    it: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<&'a String, CliError> {
    it.next()
        .ok_or_else(|| CliError::Usage(format!("{flag} expects a value\n\n{}", usage())))
}

fn number<T: std::str::FromStr>(raw: &str, flag: &str) -> Result<T, CliError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| CliError::Usage(format!("{flag}: invalid number `{raw}`")))
}

fn parse_point(raw: &str) -> Option<(f32, f32)> {
    let (x, y) = raw.split_once(',')?;
    let x = x.trim().parse::<f32>().ok()?;
    let y = y.trim().parse::<f32>().ok()?;
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => args.help = true,
            "--json" => args.json = true,
            "--out" => args.out = Some(PathBuf::from(value(&mut it, "--out")?)),
            "--overlay" => args.overlay = Some(PathBuf::from(value(&mut it, "--overlay")?)),
            "--config" => args.config = Some(PathBuf::from(value(&mut it, "--config")?)),
            "--width" => args.width = Some(number(value(&mut it, "--width")?, "--width")?),
            "--height" => args.height = Some(number(value(&mut it, "--height")?, "--height")?),
            "--iterations" => {
                args.iterations = Some(number(value(&mut it, "--iterations")?, "--iterations")?)
            }
            "--hover" => {
                let raw = value(&mut it, "--hover")?;
                let point = parse_point(raw)
                    .ok_or_else(|| CliError::Usage(format!("--hover: expected X,Y, got `{raw}`")))?;
                args.hover = Some(point);
            }
            "-" => {}
            other if other.starts_with('-') => {
                return Err(CliError::Usage(format!("unknown option `{other}`\n\n{}", usage())));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(format!(
                        "more than one input given\n\n{}",
                        usage()
                    )));
                }
                args.input = Some(PathBuf::from(path));
            }
        }
    }

    Ok(args)
}

fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn load_config(args: &Args) -> Result<PipelineConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(iterations) = args.iterations {
        config.layout.crossing_iterations = iterations;
    }
    Ok(config)
}

fn default_out(args: &Args) -> Option<PathBuf> {
    if args.out.is_some() {
        return args.out.clone();
    }
    if args.json {
        return None;
    }
    Some(match args.input.as_deref() {
        Some(path) => path.with_extension("png"),
        None => PathBuf::from("etymograph.png"),
    })
}

fn run(args: Args) -> Result<(), CliError> {
    let input = read_input(args.input.as_deref())?;
    let config = load_config(&args)?;
    let mut pipeline = Pipeline::new(&input, config)?;

    if let Some((x, y)) = args.hover {
        match pipeline.pointer_move(x, y) {
            Some(id) => tracing::info!(node = %id, x, y, "pointer over node"),
            None => tracing::info!(x, y, "pointer over empty canvas"),
        }
    }

    if let Some(out) = default_out(&args) {
        pipeline.scene_mut().write_image(&out, args.hover.is_some())?;
        tracing::info!(path = %out.display(), "wrote image");
    }
    if let Some(overlay) = args.overlay.as_deref() {
        pipeline.scene_mut().write_overlay(overlay)?;
        tracing::info!(path = %overlay.display(), "wrote overlay");
    }

    if args.json {
        let report = Report {
            document: pipeline.document(),
            layout: pipeline.layout(),
            hovered: pipeline.scene().hovered(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let argv: Vec<String> = env::args().collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };
    if args.help {
        println!("{}", usage());
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("etymograph: {err}");
            ExitCode::FAILURE
        }
    }
}
