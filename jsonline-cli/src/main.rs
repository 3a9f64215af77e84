mod paths;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use jsonline_core::config::{config_path, load_from_root, JsonlineConfig};
use jsonline_core::{capture, extract_inline_json, CommandSpec, StreamPreference};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "jsonline")]
#[command(version)]
#[command(about = "Extract the inline JSON result line from tool output")]
struct Cli {
    /// Log at debug level (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract the inline JSON line from a file or stdin.
    Extract(ExtractArgs),
    /// Run a command and extract the inline JSON line from its output.
    Run(RunArgs),
    /// Print where the jsonline-core component lives.
    Paths,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Captured output to read (default: stdin)
    file: Option<PathBuf>,

    /// Re-render the payload as pretty JSON (fails if it does not parse)
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Named command from [commands.<name>] in jsonline.toml
    #[arg(long)]
    preset: Option<String>,

    /// Directory holding jsonline.toml
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Kill the command after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Stream searched first; the other one is the fallback
    #[arg(long, value_enum)]
    prefer: Option<PreferArg>,

    /// Re-render the payload as pretty JSON (fails if it does not parse)
    #[arg(long)]
    pretty: bool,

    /// Program and arguments (appended to the preset's arguments, if any)
    #[arg(last = true)]
    command: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PreferArg {
    Stdout,
    Stderr,
}

impl From<PreferArg> for StreamPreference {
    fn from(value: PreferArg) -> Self {
        match value {
            PreferArg::Stdout => StreamPreference::Stdout,
            PreferArg::Stderr => StreamPreference::Stderr,
        }
    }
}

enum Outcome {
    Found,
    Absent,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let res = match cli.command {
        Commands::Extract(args) => run_extract(args),
        Commands::Run(args) => run_capture(args).await,
        Commands::Paths => run_paths(),
    };

    match res {
        Ok(Outcome::Found) => ExitCode::SUCCESS,
        Ok(Outcome::Absent) => ExitCode::from(1),
        Err(err) => {
            eprintln!("jsonline: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_extract(args: ExtractArgs) -> anyhow::Result<Outcome> {
    // Tool logs may carry stray non-UTF-8 bytes; decode lossily like `run` does.
    let bytes = match &args.file {
        Some(p) => std::fs::read(p).with_context(|| format!("read {}", p.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("read stdin")?;
            buf
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    emit(extract_inline_json(&text), args.pretty)
}

async fn run_capture(args: RunArgs) -> anyhow::Result<Outcome> {
    let cfg = load_from_root(&args.root)?;
    let spec = command_spec(&args, cfg.as_ref().map(|c| (c, args.root.as_path())))?;

    let defaults = cfg.map(|c| c.capture).unwrap_or_default();
    let timeout = args
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| defaults.timeout());
    let prefer = args.prefer.map(StreamPreference::from).unwrap_or(defaults.prefer);

    let out = capture(&spec, timeout).await?;
    if !out.success() {
        tracing::warn!(
            program = %spec.program,
            status = ?out.status,
            "command exited unsuccessfully"
        );
    }
    emit(out.inline_json(prefer), args.pretty)
}

fn command_spec(
    args: &RunArgs,
    cfg: Option<(&JsonlineConfig, &Path)>,
) -> anyhow::Result<CommandSpec> {
    match (&args.preset, args.command.split_first()) {
        (Some(name), _) => {
            let Some((cfg, root)) = cfg else {
                bail!(
                    "preset `{name}` requested but {} does not exist",
                    config_path(&args.root).display()
                );
            };
            let spec = cfg
                .preset(name, root)
                .with_context(|| format!("no preset named `{name}`"))?;
            Ok(spec.args(args.command.iter().cloned()))
        }
        (None, Some((program, rest))) => {
            Ok(CommandSpec::new(program.clone()).args(rest.iter().cloned()))
        }
        (None, None) => bail!("nothing to run: pass --preset NAME or `-- PROGRAM [ARGS...]`"),
    }
}

fn run_paths() -> anyhow::Result<Outcome> {
    let manifest = paths::core_manifest();
    let payload = serde_json::json!({
        "component": paths::CORE_COMPONENT_NAME,
        "root": display_path(paths::core_root()),
        "manifest": display_path(manifest),
        "manifest_exists": manifest.exists(),
    });
    print_line(&payload.to_string())?;
    Ok(Outcome::Found)
}

fn display_path(p: &Path) -> String {
    p.canonicalize()
        .unwrap_or_else(|_| p.to_path_buf())
        .display()
        .to_string()
}

fn emit(line: Option<&str>, pretty: bool) -> anyhow::Result<Outcome> {
    let Some(line) = line else {
        return Ok(Outcome::Absent);
    };
    if pretty {
        let v: serde_json::Value =
            serde_json::from_str(line).context("inline JSON line does not parse")?;
        print_line(&serde_json::to_string_pretty(&v)?)?;
    } else {
        print_line(line.trim())?;
    }
    Ok(Outcome::Found)
}

/// A reader that hung up early (`jsonline paths | head -c0`) is not a failure.
fn print_line(line: &str) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    match writeln!(out, "{line}").and_then(|()| out.flush()) {
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
            tracing::debug!("stdout closed before the payload was written");
            Ok(())
        }
        res => res.context("write stdout"),
    }
}
