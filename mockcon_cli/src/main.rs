use clap::{Parser, Subcommand, ValueEnum};
use mockcon_core::config::OutputFormat;
use mockcon_core::script::{read_script, replay};
use mockcon_core::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mockcon")]
#[command(about = "Capture console calls and inspect the transcripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON Lines script of console calls through a mock console
    Replay {
        /// Script file, one `{"method": ..., "args": [...]}` object per line
        script: PathBuf,

        /// Which transcript to print
        #[arg(long, value_enum, default_value_t = View::Unified)]
        view: View,

        /// Print only the transcript of this level (log, info, warn, error)
        #[arg(long, conflicts_with = "method")]
        level: Option<Level>,

        /// Print only the transcript of this method
        #[arg(long)]
        method: Option<String>,

        /// Output format (text, json, csv)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Strip ANSI escape sequences from captured text
        #[arg(long)]
        strip_ansi: bool,

        /// Also send every call to the real stdout/stderr
        #[arg(long)]
        passthrough: bool,
    },

    /// Show which level each console method is classified into
    Methods,
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    /// Every entry in call order
    Unified,
    /// One section per level
    Levels,
    /// One section per method
    Methods,
    /// One line per entry with its level and method
    Entries,
}

fn main() -> Result<()> {
    mockcon_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Replay {
            script,
            view,
            level,
            method,
            format,
            strip_ansi,
            passthrough,
        } => {
            let mut options = config.capture.clone();
            options.strip_ansi |= strip_ansi;
            if passthrough {
                options.is_silent = false;
            }
            let format = format.unwrap_or(config.output.format);
            cmd_replay(script, options, view, level, method, format)
        }
        Commands::Methods => cmd_methods(),
    }
}

fn cmd_replay(
    script: PathBuf,
    options: MockOptions,
    view: View,
    level: Option<Level>,
    method: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let calls = read_script(&script)?;

    let scope = ConsoleScope::with_console(Arc::new(NativeConsole::stdio()));
    let console = create_console(options);
    let mut restore = mock_console(&console, &scope, install::DEFAULT_KEY);

    let ambient = scope
        .console()
        .ok_or_else(|| Error::Other("Console slot is empty".into()))?;
    let count = replay(ambient.as_ref(), &calls)?;
    restore.restore();

    tracing::info!("Replayed {} calls from {:?}", count, script);

    let record = console.record();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Json => writeln!(out, "{}", record.to_json()?)?,
        OutputFormat::Csv => record.write_csv(&mut out)?,
        OutputFormat::Text => {
            if let Some(level) = level {
                writeln!(out, "{}", record.level(level))?;
            } else if let Some(method) = method {
                writeln!(out, "{}", record.get_record(&method))?;
            } else {
                print_view(&mut out, &record, view)?;
            }
        }
    }

    Ok(())
}

fn print_view(out: &mut impl Write, record: &Record, view: View) -> Result<()> {
    match view {
        View::Unified => writeln!(out, "{}", record.log())?,
        View::Levels => {
            for (level, text) in record.levels() {
                writeln!(out, "[{}]", level)?;
                if !text.is_empty() {
                    writeln!(out, "{}", text)?;
                }
            }
        }
        View::Methods => {
            for (method, text) in record.methods() {
                writeln!(out, "[{}]", method)?;
                writeln!(out, "{}", text)?;
            }
        }
        View::Entries => {
            for entry in record.entries() {
                let level = entry.level.map_or("-", Level::as_str);
                writeln!(out, "{}\t{}\t{}", level, entry.method, entry.text.escape_default())?;
            }
        }
    }
    Ok(())
}

fn cmd_methods() -> Result<()> {
    let console = create_console(MockOptions::default());

    println!("{:<16} LEVEL", "METHOD");
    for method in console.methods() {
        let level = Level::classify(&method).map_or("-", Level::as_str);
        println!("{:<16} {}", method, level);
    }

    Ok(())
}
