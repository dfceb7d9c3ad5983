mod app;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use line_navigator_config::Config;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    env,
    fs::OpenOptions,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
    time::{Duration, Instant},
};

use app::{App, Flow};

/// Poll interval when no redraw is pending
const IDLE_POLL: Duration = Duration::from_millis(500);

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} [--config <path>] <file>");
    process::exit(1);
}

/// Send logs to a file, only when RUST_LOG is set; stderr belongs to the TUI
fn init_logging(config: &Config) {
    if env::var_os("RUST_LOG").is_none() {
        return;
    }
    let path = config
        .log
        .file
        .clone()
        .unwrap_or_else(|| env::temp_dir().join("line-navigator.log"));
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            env_logger::Builder::from_default_env()
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("Warning: could not open log file {}: {e}", path.display()),
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("line-navigator-cli");

    let mut config_path = None;
    let mut file_path = None;
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--config" => match rest.next() {
                Some(path) => config_path = Some(PathBuf::from(path)),
                None => usage(program),
            },
            _ if file_path.is_none() => file_path = Some(PathBuf::from(arg)),
            _ => usage(program),
        }
    }
    let Some(file_path) = file_path else {
        usage(program);
    };

    let config_path = config_path.unwrap_or_else(Config::config_path);
    let config = match Config::load_from_path(&config_path) {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };
    init_logging(&config);

    let mut app = match App::new(file_path.clone(), &config, ui::PALETTE.len()) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: Cannot open '{}': {e}", file_path.display());
            process::exit(1);
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::ui(f, app))?;

        let timeout = app
            .debouncer
            .remaining(Instant::now())
            .unwrap_or(IDLE_POLL);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && app.handle_key(key.code) == Flow::Quit
        {
            return Ok(());
        }
        app.tick(Instant::now());
    }
}
