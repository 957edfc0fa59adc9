use crossterm::{
    cursor::{Hide, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use skyburst::terminal::{Presenter, run_session};
use skyburst::{AppConfig, Color, Engine, PixelBuffer, Result};
use std::env;
use std::fs::File;
use std::io::{BufWriter, Stdout, stdout};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("skyburst - endless fireworks in the terminal");
    eprintln!();
    eprintln!("Usage: skyburst [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config PATH      Load settings from a TOML file");
    eprintln!("  --fps N            Frames per second (default 60)");
    eprintln!("  --bursts N         Bursts kept in the sky (default 8)");
    eprintln!("  --interval MS      Mean time between launches (default 400)");
    eprintln!("  --seed N           Replay the same show every run");
    eprintln!("  --scale N          Canvas pixels per terminal pixel (default 4)");
    eprintln!("  --bg-color RRGGBB  Set background color as hex (e.g., --bg-color 1a1b26)");
    eprintln!("  --log-file PATH    Write logs to PATH (filter with RUST_LOG)");
    eprintln!();
    eprintln!("Keys: space = pause/resume, s = stop, b = launch a burst, click = burst at cursor");
    eprintln!("Press 'q', ESC, or Ctrl+C to exit");
}

/// Command line settings; each one overrides the config file.
#[derive(Default)]
struct Cli {
    config: Option<PathBuf>,
    fps: Option<f64>,
    bursts: Option<usize>,
    interval: Option<f64>,
    seed: Option<u64>,
    scale: Option<usize>,
    bg_color: Option<Color>,
    log_file: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut AppConfig) {
        let show = &mut config.show;
        show.fps = self.fps.unwrap_or(show.fps);
        show.target_burst_count = self.bursts.unwrap_or(show.target_burst_count);
        show.spawn_interval_ms = self.interval.unwrap_or(show.spawn_interval_ms);
        show.seed = self.seed.or(show.seed);

        let term = &mut config.terminal;
        term.scale = self.scale.unwrap_or(term.scale);
        term.background = self.bg_color.unwrap_or(term.background);
        term.log_file = self.log_file.or(term.log_file.take());
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    eprintln!();
    print_usage();
    std::process::exit(1);
}

fn parse_value<T: FromStr>(flag: &str, value: Option<&String>) -> T {
    let Some(value) = value else {
        fail(&format!("{flag} requires a value"));
    };
    value
        .parse()
        .unwrap_or_else(|_| fail(&format!("Invalid value for {flag}: {value}")))
}

fn parse_args() -> Cli {
    let args: Vec<String> = env::args().collect();
    let mut cli = Cli::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args.get(i + 1);
        match flag {
            "--config" => cli.config = Some(parse_value(flag, value)),
            "--fps" => cli.fps = Some(parse_value(flag, value)),
            "--bursts" => cli.bursts = Some(parse_value(flag, value)),
            "--interval" => cli.interval = Some(parse_value(flag, value)),
            "--seed" => cli.seed = Some(parse_value(flag, value)),
            "--scale" => cli.scale = Some(parse_value(flag, value)),
            "--log-file" => cli.log_file = Some(parse_value(flag, value)),
            "--bg-color" => {
                let hex: String = parse_value(flag, value);
                match hex.parse::<Color>() {
                    Ok(color) => cli.bg_color = Some(color),
                    Err(_) => {
                        eprintln!("Invalid hex color: {hex}");
                        eprintln!("Expected format: RRGGBB (e.g., 1a1b26)");
                        std::process::exit(1);
                    }
                }
            }
            "help" | "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            arg => fail(&format!("Unknown option: {arg}")),
        }
        i += 2;
    }

    cli
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    // stderr belongs to the alternate screen, so no file means no subscriber
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run_show(config: &AppConfig, stdout: &mut BufWriter<Stdout>) -> Result<()> {
    let mut presenter = Presenter::new(config.terminal.scale, config.terminal.background);
    let (cols, rows) = terminal::size()?;
    let (width, height) = presenter.canvas_size(cols, rows);
    let mut engine = Engine::new(PixelBuffer::new(width, height), config.show.clone())?;
    engine.start();
    let mut clock = Instant::now();

    loop {
        if event::poll(Duration::from_millis(1))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Char(' ') => {
                        if engine.is_running() {
                            engine.pause();
                        } else {
                            engine.start();
                        }
                    }
                    KeyCode::Char('s') => {
                        engine.stop();
                        presenter.present(engine.surface(), stdout)?;
                    }
                    KeyCode::Char('b') => engine.spawn_burst(None, None, None),
                    _ => {}
                },
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    let (x, y) = presenter.cell_center(mouse.column, mouse.row);
                    engine.spawn_burst(Some(x), Some(y), None);
                }
                Event::Resize(cols, rows) => {
                    let (width, height) = presenter.canvas_size(cols, rows);
                    match engine.resize(PixelBuffer::new(width, height)) {
                        Ok(resized) => {
                            info!(cols, rows, running = resized.is_running(), "terminal resized");
                            engine = resized;
                            clock = Instant::now();
                        }
                        Err(err) => warn!(%err, "keeping previous canvas"),
                    }
                    execute!(stdout, Clear(ClearType::All))?;
                    if !engine.is_running() {
                        presenter.present(engine.surface(), stdout)?;
                    }
                }
                _ => {}
            }
        }

        let now_ms = clock.elapsed().as_secs_f64() * 1000.0;
        if engine.advance(now_ms) > 0 {
            presenter.present(engine.surface(), stdout)?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = parse_args();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let config_path = cli.config.clone();
    cli.apply(&mut config);
    config.validate();

    init_logging(config.terminal.log_file.as_deref())?;
    info!(config = ?config_path, seed = ?config.show.seed, "skyburst starting");

    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout());
    run_session(
        &mut stdout,
        |out| {
            terminal::enable_raw_mode()?;
            execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All), EnableMouseCapture)
        },
        |out| run_show(&config, out),
        |out| {
            execute!(out, Show, LeaveAlternateScreen, DisableMouseCapture)?;
            terminal::disable_raw_mode()
        },
    )
}
