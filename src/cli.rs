use crate::config::{Config, load_config};
use crate::ir::{Dimensions, LayoutInput, parse_input};
use crate::layout::{ExpansionSet, HighlightState, compute_scene};
use crate::layout_dump::{layout_dump_json, write_layout_dump};
use crate::render::{render_svg, write_output_svg};
use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "schemaviz",
    version,
    about = "Lay out and render schema-matching candidates against a target ontology"
)]
pub struct Args {
    /// Input document (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON5 file (layout heuristics, theme, themeVariables)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Toggle a node's expansion (repeatable), applied on top of the input
    #[arg(short = 'x', long = "toggle")]
    pub toggle: Vec<String>,

    /// Hovered element: super:<id>, category:<id>, column:<name> or edge:<column>
    #[arg(long = "hover")]
    pub hover: Option<String>,

    /// Search text to emphasise in labels
    #[arg(short = 'q', long = "query")]
    pub query: Option<String>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let (contents, source) = read_input(args.input.as_deref())?;
    let mut input = parse_input(&contents, &source)?;
    apply_overrides(&mut input, &args, &config)?;

    let dims = Dimensions::new(config.render.width, config.render.height, config.render.margin);
    let scene = compute_scene(&input, &config.layout, &dims);
    tracing::debug!(width = scene.width, height = scene.height, "scene ready");

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&scene, &config.theme, &config.layout);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => write_layout_dump(path, &scene)?,
            None => println!("{}", layout_dump_json(&scene)?),
        },
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&scene, &config.theme, &config.layout);
            write_png(&svg, &output, &config)?;
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Folds command-line toggles, hover and query into the input document.
fn apply_overrides(input: &mut LayoutInput, args: &Args, config: &Config) -> Result<()> {
    if !args.toggle.is_empty() {
        let mut expansion = match &input.expanded {
            Some(ids) => ExpansionSet::from_ids(ids.iter().cloned()),
            None => ExpansionSet::seeded(&config.layout.tree.root_sentinel),
        };
        for id in &args.toggle {
            expansion = expansion.toggled(id);
        }
        input.expanded = Some(expansion.iter().map(str::to_string).collect());
    }
    if let Some(hover) = &args.hover {
        HighlightState::parse(Some(hover.as_str()))?;
        input.hover = Some(hover.clone());
    }
    if let Some(query) = &args.query {
        input.query = Some(query.clone());
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<(String, PathBuf)> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        let content = std::fs::read_to_string(path)?;
        return Ok((content, path.to_path_buf()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, PathBuf::from("<stdin>")))
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["schemaviz"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn toggles_apply_on_top_of_seeded_root() {
        let mut input = LayoutInput::default();
        let args = args(&["-x", "clinical", "-x", "demographic", "-x", "clinical"]);
        apply_overrides(&mut input, &args, &Config::default()).unwrap();
        let mut expanded = input.expanded.unwrap();
        expanded.sort();
        assert_eq!(expanded, vec!["demographic", "root"]);
    }

    #[test]
    fn bad_hover_is_rejected_up_front() {
        let mut input = LayoutInput::default();
        let args = args(&["--hover", "cell:3"]);
        assert!(apply_overrides(&mut input, &args, &Config::default()).is_err());
        assert!(input.hover.is_none());
    }

    #[test]
    fn output_format_parses() {
        let args = args(&["-e", "json", "-w", "640"]);
        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.width, Some(640.0));
    }
}
