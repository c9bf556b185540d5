//! `link2config`: read a share link, print or save the generated client configs.
//!
//! ```text
//! link2config 'trojan://pw@example.com:443#home'
//! echo "$LINK" | link2config --target singbox --out-dir ./out
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use vpn_link_config::{Rendered, SynthesisOptions, Target};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TargetArg {
    Xray,
    Singbox,
    All,
}

impl TargetArg {
    fn targets(self) -> Vec<Target> {
        match self {
            TargetArg::Xray => vec![Target::Xray],
            TargetArg::Singbox => vec![Target::Singbox],
            TargetArg::All => Target::ALL.to_vec(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "link2config", version)]
#[command(about = "Convert a proxy share link into Xray and sing-box client configs", long_about = None)]
struct Args {
    /// Share link (vmess://, vless://, ss://, trojan://); read from stdin when omitted
    link: Option<String>,
    /// Which configs to generate
    #[arg(short = 't', long = "target", value_enum, default_value_t = TargetArg::All)]
    target: TargetArg,
    /// JSON file with synthesis options (listen ports, log level, remote port)
    #[arg(short = 'o', long = "options", value_name = "FILE")]
    options: Option<PathBuf>,
    /// Write `<target>.json` files into this directory instead of printing
    #[arg(short = 'd', long = "out-dir", value_name = "DIR")]
    out_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let link = match args.link {
        Some(link) => link,
        None => read_stdin()?,
    };
    let options = load_options(args.options.as_deref())?;
    let targets = args.target.targets();

    let rendered =
        vpn_link_config::convert(&link, &targets, &options).context("invalid share link")?;

    let failed = emit_all(rendered, args.out_dir.as_deref());
    if failed > 0 {
        bail!("{} of {} configurations failed", failed, targets.len());
    }
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read share link from stdin")?;
    let link = input.trim();
    if link.is_empty() {
        bail!("no share link given");
    }
    Ok(link.to_string())
}

fn load_options(path: Option<&Path>) -> Result<SynthesisOptions> {
    let Some(path) = path else {
        return Ok(SynthesisOptions::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read options file {}", path.display()))?;
    let options = SynthesisOptions::from_json(&json)
        .with_context(|| format!("invalid options file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded synthesis options");
    Ok(options)
}

/// Emits every rendered document; a failed target does not stop the others.
/// Returns how many targets failed.
fn emit_all(rendered: Vec<Rendered>, out_dir: Option<&Path>) -> usize {
    let mut failed = 0;
    for Rendered { target, document } in rendered {
        let outcome = document
            .map_err(anyhow::Error::from)
            .and_then(|bytes| emit(target, &bytes, out_dir));
        if let Err(err) = outcome {
            tracing::error!(
                %target,
                error = %format!("{:#}", err),
                "failed to produce configuration"
            );
            failed += 1;
        }
    }
    failed
}

fn emit(target: Target, document: &[u8], out_dir: Option<&Path>) -> Result<()> {
    match out_dir {
        Some(dir) => {
            let path = write_document(dir, target, document)?;
            tracing::info!(%target, path = %path.display(), "wrote configuration");
        }
        None => {
            println!("{} configuration:", target);
            println!("{}", String::from_utf8_lossy(document));
        }
    }
    Ok(())
}

fn write_document(dir: &Path, target: Target, document: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(format!("{}.json", target.name()));
    fs::write(&path, document).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
