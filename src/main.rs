use std::fs::File;
use std::io;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use crossterm::cursor;
use crossterm::event;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::execute;
use crossterm::queue;
use crossterm::style;
use crossterm::terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use torus_life::app::App;
use torus_life::app::Flow;
use torus_life::config::Args;
use torus_life::config::Settings;
use torus_life::events;
use torus_life::pattern::Pattern;

const FRAMERATE: u32 = 60;
const FRAMETIME: Duration = Duration::from_millis((1_000 / FRAMERATE) as u64);

const HELP: &str = "space play/pause  n step  r reset  c clear  x random  +/- speed  [/] size  \
                    g gaps  1-6 patterns  q quit";

/// Puts the terminal into raw mode on creation, and restores it when dropped
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            cursor::Show,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    // stdout belongs to the UI, so logs only go to a file
    let Some(path) = &args.log_file else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn load_pattern_file(args: &Args) -> anyhow::Result<Option<Pattern>> {
    let Some(path) = &args.pattern_file else {
        return Ok(None);
    };

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let pattern = Pattern::from_rle(&bytes)
        .with_context(|| format!("Failed to parse RLE file {}", path.display()))?;

    info!(name = pattern.name(), path = %path.display(), "Loaded pattern file");

    Ok(Some(pattern))
}

fn draw(stdout: &mut impl Write, app: &mut App) -> io::Result<()> {
    let status = format!("{}  |  {HELP}", app.status());

    queue!(stdout, cursor::MoveTo(0, 0))?;

    for line in app.frame().lines() {
        queue!(
            stdout,
            style::Print(line),
            terminal::Clear(terminal::ClearType::UntilNewLine),
            cursor::MoveToNextLine(1)
        )?;
    }

    let (cols, _) = terminal::size()?;
    let status: String = status.chars().take(cols as usize).collect();

    queue!(
        stdout,
        style::Print(status),
        terminal::Clear(terminal::ClearType::UntilNewLine)
    )?;

    stdout.flush()
}

fn run(mut app: App) -> anyhow::Result<()> {
    let _guard = TerminalGuard::enter().context("Failed to set up the terminal")?;
    let mut stdout = io::stdout();

    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    draw(&mut stdout, &mut app)?;

    loop {
        let mut dirty = false;

        // Poll events for at most FRAMETIME, waking early when a generation is due
        let timeout = app
            .time_left(Instant::now())
            .map_or(FRAMETIME, |left| left.min(FRAMETIME));

        if event::poll(timeout)? {
            if let Some(command) = events::convert_event(event::read()?) {
                if let events::Command::Resize { .. } = command {
                    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
                }

                if app.apply(command) == Flow::Exit {
                    break;
                }

                dirty = true;
            }
        }

        dirty |= app.tick(Instant::now());

        if dirty {
            draw(&mut stdout, &mut app)?;
        }
    }

    info!(generation = app.generation(), "Exiting");

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let settings = Settings::try_from(&args)?;
    let custom = load_pattern_file(&args)?;

    let (cols, rows) = terminal::size().context("Failed to read the terminal size")?;
    let mut app = App::new(settings, cols, rows);

    if let Some(pattern) = custom {
        app = app.with_custom_pattern(pattern);
        app.load_custom();
    }

    if let Some(preset) = args.pattern {
        app.load_pattern(preset.name());
    }

    run(app)
}
