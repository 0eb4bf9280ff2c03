//! typespy - keystroke timing recorder
//!
//! Records keystrokes typed into a terminal UI, or replays recorded event
//! logs, and prints hold time and key pair latency statistics.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{
        self, Event, KeyCode as CtKeyCode, KeyEvent as CtKeyEvent, KeyEventKind, KeyModifiers,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use log::{info, warn};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use std::io::{stdout, Stdout};
use std::path::{Path, PathBuf};
use std::time::Duration;

use typespy::{
    analysis::SessionAnalysis,
    config::Config,
    keyboard::{load_event_log, terminal, RecorderStats, Session, SessionRecorder},
    report::SessionReport,
    ui::{
        App, AppState, AppView, HelpPanel, HoldTable, InputField, LatencyTable, RecordTable,
        ResultsPanel, StatusBar, TabBar,
    },
    utils::format_ms,
};

#[derive(Parser, Debug)]
#[command(name = "typespy", version, about = "Keystroke timing recorder")]
struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record keystrokes in the terminal UI (default)
    Record {
        /// Name stored with the session
        #[arg(short, long)]
        user: Option<String>,
        /// Write the session JSON here on exit
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Pair a JSON array of key events into keystrokes and print statistics
    Replay {
        /// Event log: [{"keyCode": 65, "type": "keydown", "timestamp": 0.0}, ...]
        events: PathBuf,
        /// Name stored with the session
        #[arg(short, long)]
        user: Option<String>,
        /// Write the paired session JSON here
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print statistics for a previously exported session
    Analyze {
        /// Session file: {"user": ..., "data": [...]}
        session: PathBuf,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Record {
        user: None,
        output: None,
    }) {
        Command::Record { user, output } => record(config, user, output),
        Command::Replay {
            events,
            user,
            output,
            json,
        } => replay(&config, &events, user, output.as_deref(), json),
        Command::Analyze { session, json } => analyze(&session, json),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(Config::load().unwrap_or_else(|e| {
            warn!("using default config: {}", e);
            Config::default()
        })),
    }
}

fn replay(
    config: &Config,
    events: &Path,
    user: Option<String>,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let events = load_event_log(events)
        .with_context(|| format!("failed to read event log {}", events.display()))?;
    info!("replaying {} events", events.len());

    let mut recorder = SessionRecorder::new(&config.recorder);
    for event in &events {
        recorder.process_event(event);
    }
    let session = recorder.finish(user);
    let stats = recorder.stats();

    if let Some(path) = output {
        session
            .export_json(path, config.export.pretty)
            .with_context(|| format!("failed to write session to {}", path.display()))?;
        info!("wrote session to {}", path.display());
    }

    print_statistics(&session, Some(stats), json)
}

fn analyze(path: &Path, json: bool) -> Result<()> {
    let session = Session::load(path)
        .with_context(|| format!("failed to read session {}", path.display()))?;
    print_statistics(&session, None, json)
}

fn print_statistics(session: &Session, stats: Option<RecorderStats>, json: bool) -> Result<()> {
    let analysis = SessionAnalysis::new(&session.data);

    if json {
        let report = SessionReport::new(session, &analysis, stats);
        println!("{}", report.to_json(true)?);
        return Ok(());
    }

    if let Some(user) = &session.user {
        println!("User: {}", user);
    }
    for section in analysis.analyses() {
        println!("{}", section.name());
        for result in section.get_results() {
            println!("  {:<16} {}", result.label, result.value);
        }
    }

    if !analysis.latency.is_empty() {
        println!("Pairs");
        for cell in analysis.latency.cells() {
            println!(
                "  {} -> {}  {} ({}x)",
                cell.from,
                cell.to,
                format_ms(cell.average_ms),
                cell.count
            );
        }
    }

    if let Some(stats) = stats {
        println!("Recorder");
        println!("  {:<16} {}", "Events", stats.events);
        println!("  {:<16} {}", "Recorded", stats.recorded);
        println!("  {:<16} {}", "Ignored", stats.ignored);
        println!("  {:<16} {}", "Repeats", stats.repeats);
        println!("  {:<16} {}", "Unmatched Ups", stats.unmatched_ups);
        println!("  {:<16} {}", "Out of Order", stats.out_of_order);
        println!("  {:<16} {}", "Dropped Downs", stats.dropped_downs);
    }

    Ok(())
}

fn record(config: Config, user: Option<String>, output: Option<PathBuf>) -> Result<()> {
    let mut app = App::new(config, user);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if enhanced {
        execute!(stdout, PushKeyboardEnhancementFlags(terminal::enhancement_flags()))?;
    }
    app.set_releases_supported(enhanced);
    let backend = CrosstermBackend::new(stdout);
    let mut term = Terminal::new(backend)?;

    let result = run(&mut term, &mut app);

    // Cleanup terminal
    if enhanced {
        execute!(term.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(term.backend_mut(), LeaveAlternateScreen)?;
    term.show_cursor()?;
    result?;

    let session = app.recorder.finish(app.user.clone());
    if let Some(path) = &output {
        session
            .export_json(path, app.config.export.pretty)
            .with_context(|| format!("failed to write session to {}", path.display()))?;
        println!("Session written to {}", path.display());
    }

    println!("\ntypespy session complete.");
    println!("Keystrokes recorded: {}", session.len());
    if let Some(avg) = app.analysis.average_hold_ms() {
        println!("Average hold: {}", format_ms(avg));
    }
    if let Some(avg) = app.analysis.latency.overall_average_ms() {
        println!("Average latency: {}", format_ms(avg));
    }
    println!("Total events processed: {}", app.total_events);
    println!("Session duration: {}", app.elapsed_formatted());

    Ok(())
}

fn run(term: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = app.config.refresh_interval();

    loop {
        term.draw(|frame| draw(frame, app))?;

        // Drain everything queued so timestamps are taken as close to arrival as possible
        if event::poll(tick_rate)? {
            loop {
                if let Event::Key(key) = event::read()? {
                    handle_key(app, &key);
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }

        if app.state == AppState::Quitting {
            break;
        }
    }

    Ok(())
}

fn is_command(key: &CtKeyEvent) -> bool {
    match key.code {
        CtKeyCode::Esc | CtKeyCode::Tab | CtKeyCode::BackTab => true,
        CtKeyCode::F(n) => (1..=6).contains(&n),
        CtKeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn handle_key(app: &mut App, key: &CtKeyEvent) {
    if !is_command(key) {
        let timestamp = app.timestamp_ms();
        if let Some(event) = terminal::translate(key, timestamp) {
            app.process_event(&event);
        }
        return;
    }

    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        CtKeyCode::Esc | CtKeyCode::Char('c') => app.quit(),
        CtKeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => app.prev_view(),
        CtKeyCode::BackTab => app.prev_view(),
        CtKeyCode::Tab => app.next_view(),
        CtKeyCode::F(1) => app.view = AppView::Help,
        CtKeyCode::F(2) => {
            let filename = format!("typespy_session_{}.json", file_stamp());
            if let Err(e) = app.export_session(&filename) {
                app.set_status(format!("Export failed: {}", e));
            }
        }
        CtKeyCode::F(3) => {
            let filename = format!("typespy_report_{}.json", file_stamp());
            if let Err(e) = app.export_report(&filename) {
                app.set_status(format!("Export failed: {}", e));
            }
        }
        CtKeyCode::F(4) => app.toggle_pause(),
        CtKeyCode::F(5) => app.clear_input(),
        CtKeyCode::F(6) => app.clear_log(),
        _ => {}
    }
}

fn file_stamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Main area split into a view pane and a results side panel
fn split_with_results(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(40)])
        .split(area);
    (chunks[0], chunks[1])
}

fn draw(frame: &mut Frame, app: &App) {
    let colors = app.colors;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(8),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let tab_names: Vec<&str> = AppView::all().iter().map(|v| v.name()).collect();
    frame.render_widget(TabBar::new(&tab_names, app.view.index(), colors), chunks[0]);

    let results = app.current_results();
    if app.view == AppView::Help {
        frame.render_widget(HelpPanel::new(colors), chunks[1]);
    } else {
        let (main, side) = split_with_results(chunks[1]);
        match app.view {
            AppView::Input => frame.render_widget(
                InputField::new(&app.input, colors).recording(app.state == AppState::Running),
                main,
            ),
            AppView::Log => frame.render_widget(
                RecordTable::new(app.analysis.timeline.records(), colors),
                main,
            ),
            AppView::Holds => {
                frame.render_widget(HoldTable::new(&app.analysis.holds, colors), main)
            }
            AppView::Latency => {
                frame.render_widget(LatencyTable::new(&app.analysis.latency, colors), main)
            }
            AppView::Help => {}
        }
        frame.render_widget(ResultsPanel::new(&results, app.view.name(), colors), side);
    }

    let state_str = match app.state {
        AppState::Running => "RECORDING",
        AppState::Paused => "PAUSED",
        AppState::Quitting => "QUITTING",
    };
    let elapsed = app.elapsed_formatted();
    let status = StatusBar::new(
        state_str,
        app.view.name(),
        &elapsed,
        app.recorder.records().len(),
        app.total_events,
        colors,
    )
    .message(app.get_status());
    frame.render_widget(status, chunks[2]);
}
