//! `component-bundle`: bundle a fully-resolved branch list into `<name>.js` and `<name>.css`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use component_bundler::{BranchInput, BundleOptions, Bundler};

/// Bundle resolved component branches into a single script and stylesheet.
#[derive(Debug, Parser)]
#[command(name = "component-bundle", version, about)]
struct Cli {
  /// JSON file listing the branches to bundle, dependencies first.
  #[arg(short, long)]
  input: PathBuf,
  /// Directory the bundles are written to.
  #[arg(short, long, default_value = "build")]
  out_dir: PathBuf,
  /// Base file name of the bundles.
  #[arg(short, long, default_value = "build")]
  name: String,
  /// Options file; defaults to `component-bundle.json` next to the input.
  #[arg(short, long)]
  config: Option<PathBuf>,
  /// Wrap modules for debugging with `sourceURL` locators.
  #[arg(long)]
  dev: bool,
  /// Public URL prefix for stylesheet assets.
  #[arg(long)]
  url_prefix: Option<String>,
  /// Leave the `require` runtime out of the script bundle.
  #[arg(long)]
  no_require: bool,
  /// Log progress at debug level unless `RUST_LOG` says otherwise.
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_filter = if cli.verbose { "debug" } else { "info" };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
    .init();

  let options = load_options(&cli)?;

  let description = fs::read_to_string(&cli.input)
    .with_context(|| format!("failed to read {}", cli.input.display()))?;
  let inputs: Vec<BranchInput> = serde_json::from_str(&description)
    .with_context(|| format!("failed to parse {}", cli.input.display()))?;

  let scripts = Bundler::scripts(options.clone())
    .build(&inputs)
    .context("failed to bundle scripts")?;
  let styles = Bundler::styles(options)
    .build(&inputs)
    .context("failed to bundle styles")?;

  fs::create_dir_all(&cli.out_dir)
    .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;

  let js_path = cli.out_dir.join(format!("{}.js", cli.name));
  fs::write(&js_path, &scripts).with_context(|| format!("failed to write {}", js_path.display()))?;
  info!("wrote {} ({} bytes)", js_path.display(), scripts.len());

  if !styles.is_empty() {
    let css_path = cli.out_dir.join(format!("{}.css", cli.name));
    fs::write(&css_path, &styles)
      .with_context(|| format!("failed to write {}", css_path.display()))?;
    info!("wrote {} ({} bytes)", css_path.display(), styles.len());
  }

  Ok(())
}

fn load_options(cli: &Cli) -> Result<BundleOptions> {
  let options = match &cli.config {
    Some(path) => BundleOptions::from_path(path)
      .with_context(|| format!("failed to load options from {}", path.display()))?,
    None => {
      let dir = cli
        .input
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
      BundleOptions::discover(&dir)
    }
  };

  Ok(apply_overrides(options, cli))
}

/// Flags given on the command line win over the options file.
fn apply_overrides(mut options: BundleOptions, cli: &Cli) -> BundleOptions {
  if cli.dev {
    options.dev = true;
  }
  if let Some(prefix) = &cli.url_prefix {
    options.url_prefix = prefix.clone();
  }
  if cli.no_require {
    options.require = false;
  }
  options
}
