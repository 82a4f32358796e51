//! Refrain — interactive score REPL.
//!
//! Reads notation line by line from stdin, plays what each line adds and
//! keeps the score across lines.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use refrain::audio::Renderer;
use refrain::config::{default_config_path, ReplConfig, TargetKind};
use refrain::dsl::note::note_name;
use refrain::repl::command;
use refrain::repl::{Command, Flow, Session, TurnOutcome};

/// How long to let live playback drain after the last line.
const DRAIN_LIMIT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "refrain", version)]
#[command(about = "An interactive score REPL that auditions each line as you type it")]
struct Cli {
    /// Score file to evaluate before the first prompt
    score: Option<PathBuf>,

    /// Config file (default: ~/.refrain/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where playback goes
    #[arg(long, value_enum)]
    target: Option<TargetKind>,

    /// Directory for WAV files (implies --target wav unless given)
    #[arg(long)]
    wav_dir: Option<PathBuf>,

    /// Don't load instruments for new parts
    #[arg(long)]
    no_load: bool,

    /// Master volume, 0.0 to 1.0
    #[arg(long)]
    volume: Option<f32>,

    /// Seed for noise-based instruments
    #[arg(long)]
    seed: Option<u64>,

    /// Print the notes each line added
    #[arg(long)]
    show_events: bool,
}

impl Cli {
    fn config(&self) -> Result<ReplConfig> {
        let mut config = match &self.config {
            Some(path) => ReplConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ReplConfig::load_or_default(&default_config_path()),
        };
        if let Some(dir) = &self.wav_dir {
            config.wav_dir = dir.clone();
            config.target = TargetKind::Wav;
        }
        if let Some(target) = self.target {
            config.target = target;
        }
        if self.no_load {
            config.load_instruments = false;
        }
        if let Some(volume) = self.volume {
            config.volume = volume;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.show_events |= self.show_events;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.config()?;
    let options = config.play_options();
    info!("playing to {:?}", options.target);

    let mut renderer = Renderer::new(config.seed);
    let flags = renderer.flags();
    ctrlc::set_handler(move || flags.stop.store(true, Ordering::Release))
        .context("installing Ctrl-C handler")?;

    let mut session = Session::default();

    if let Some(path) = &cli.score {
        let (lines, notes) = command::load(path, &mut session)
            .with_context(|| format!("loading score {}", path.display()))?;
        println!("loaded {lines} line(s), {notes} note(s) from {}", path.display());
    }

    println!("refrain v{} — :help for commands", env!("CARGO_PKG_VERSION"));

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        prompt(&session)?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            println!();
            break;
        }

        if let Some(parsed) = Command::parse(&line) {
            match parsed.and_then(|cmd| cmd.execute(&mut session, &mut renderer, &options)) {
                Ok(Flow::Continue(out)) => println!("{out}"),
                Ok(Flow::Quit) => break,
                Err(e) => eprintln!("{e}"),
            }
            continue;
        }

        match session.turn(&line, &mut renderer, &options) {
            Ok(Some(outcome)) => {
                if config.show_events {
                    print_events(&session, &outcome);
                }
                if let Some(path) = renderer.last_wav() {
                    if config.target == TargetKind::Wav {
                        println!("-> {}", path.display());
                    }
                }
            }
            Ok(None) => {}
            Err(e) => eprintln!("{e}"),
        }
    }

    let started = Instant::now();
    while renderer.is_playing() && started.elapsed() < DRAIN_LIMIT {
        thread::sleep(Duration::from_millis(50));
    }
    Ok(())
}

fn prompt(session: &Session) -> io::Result<()> {
    let names = session.part_names();
    let mut stdout = io::stdout();
    if names.is_empty() {
        write!(stdout, "> ")?;
    } else {
        write!(stdout, "{}> ", names.join("/"))?;
    }
    stdout.flush()
}

fn print_events(session: &Session, outcome: &TurnOutcome) {
    let score = session.current_score_snapshot();
    println!("[{}]", outcome.entry.name());
    for (event, played) in outcome.added.iter().zip(outcome.playback.events()) {
        let part = score.part(event.part).map_or("?", |p| p.name.as_str());
        println!(
            "  {:>9} (plays at {:>9})  {:<12} {:<4} {:>9}  vol {}",
            event.offset.to_string(),
            played.offset.to_string(),
            part,
            note_name(event.pitch),
            event.duration.to_string(),
            event.volume
        );
    }
}
