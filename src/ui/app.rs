//! Main application state and logic

use crate::analysis::{Analysis, AnalysisResult, ResultStatus, SessionAnalysis};
use crate::config::Config;
use crate::keyboard::{ControlKey, KeyEvent, KeyEventType, KeyToken, Session, SessionRecorder};
use crate::report::{ReportError, SessionReport};
use crate::ui::ThemeColors;
use crate::utils::format_ms;
use log::info;
use std::path::PathBuf;
use std::time::Instant;

/// Current view/tab in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    Input,
    Log,
    Holds,
    Latency,
    Help,
}

impl AppView {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Log => "Log",
            Self::Holds => "Holds",
            Self::Latency => "Latency",
            Self::Help => "Help",
        }
    }

    pub fn all() -> &'static [AppView] {
        &[
            Self::Input,
            Self::Log,
            Self::Holds,
            Self::Latency,
            Self::Help,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Input => 0,
            Self::Log => 1,
            Self::Holds => 2,
            Self::Latency => 3,
            Self::Help => 4,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Input,
            1 => Self::Log,
            2 => Self::Holds,
            3 => Self::Latency,
            _ => Self::Help,
        }
    }
}

/// Application running state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Running,
    Paused,
    Quitting,
}

/// Main application
pub struct App {
    /// Current view
    pub view: AppView,
    /// Application state
    pub state: AppState,
    /// Configuration
    pub config: Config,
    /// Palette for the configured theme
    pub colors: ThemeColors,
    /// Pairs key events into keystrokes
    pub recorder: SessionRecorder,
    /// Statistics over the recorded keystrokes
    pub analysis: SessionAnalysis,
    /// Text typed into the input field
    pub input: String,
    /// Name of the person typing
    pub user: Option<String>,
    /// Whether the terminal reports key releases
    pub releases_supported: bool,
    /// Application start time, the origin for event timestamps
    pub start_time: Instant,
    /// Total events processed
    pub total_events: u64,
    /// Last status message
    pub status_message: Option<String>,
    /// Status message timestamp
    pub status_time: Option<Instant>,
}

impl App {
    pub fn new(config: Config, user: Option<String>) -> Self {
        Self {
            view: AppView::Input,
            state: AppState::Running,
            colors: ThemeColors::from_theme(config.ui.theme),
            recorder: SessionRecorder::new(&config.recorder),
            config,
            analysis: SessionAnalysis::default(),
            input: String::new(),
            user,
            releases_supported: true,
            start_time: Instant::now(),
            total_events: 0,
            status_message: None,
            status_time: None,
        }
    }

    /// Milliseconds since the app started, used to timestamp terminal events
    pub fn timestamp_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }

    /// Feed a key event to the input field and the recorder.
    ///
    /// While paused only key-ups reach the recorder, so keys pressed before
    /// the pause are still released.
    pub fn process_event(&mut self, event: &KeyEvent) {
        match self.state {
            AppState::Running => {}
            AppState::Paused if event.event_type == KeyEventType::Up => {}
            AppState::Paused | AppState::Quitting => return,
        }

        self.total_events += 1;

        if self.state == AppState::Running
            && event.event_type == KeyEventType::Down
            && !event.modifiers.is_chord()
        {
            self.edit_input(event);
        }

        if self.recorder.process_event(event).is_some() {
            self.analysis.update(self.recorder.records());
        }
    }

    fn edit_input(&mut self, event: &KeyEvent) {
        match event.decode() {
            Some(KeyToken::Char(c)) => self.input.push(c),
            Some(KeyToken::Control(ControlKey::Enter)) => self.input.push('\n'),
            Some(KeyToken::Control(ControlKey::Backspace)) => {
                self.input.pop();
            }
            _ => {}
        }
    }

    /// Record that the terminal cannot report key releases
    pub fn set_releases_supported(&mut self, supported: bool) {
        self.releases_supported = supported;
        if !supported {
            self.set_status(
                "Terminal does not report key releases - hold times unavailable".to_string(),
            );
        }
    }

    /// Switch to the next view
    pub fn next_view(&mut self) {
        let next = (self.view.index() + 1) % AppView::all().len();
        self.view = AppView::from_index(next);
    }

    /// Switch to the previous view
    pub fn prev_view(&mut self) {
        let current = self.view.index();
        let prev = if current == 0 {
            AppView::all().len() - 1
        } else {
            current - 1
        };
        self.view = AppView::from_index(prev);
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            AppState::Running => {
                self.set_status("Paused".to_string());
                AppState::Paused
            }
            AppState::Paused => {
                self.set_status("Resumed".to_string());
                AppState::Running
            }
            AppState::Quitting => AppState::Quitting,
        };
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.state = AppState::Quitting;
    }

    /// Empty the input field. Recorded keystrokes are kept.
    pub fn clear_input(&mut self) {
        self.input.clear();
        self.set_status("Input cleared".to_string());
    }

    /// Discard all recorded keystrokes
    pub fn clear_log(&mut self) {
        self.recorder.clear();
        self.analysis.reset();
        self.total_events = 0;
        self.set_status("Log cleared".to_string());
    }

    /// Set a status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_time = Some(Instant::now());
    }

    /// Get status message if still valid (within 3 seconds)
    pub fn get_status(&self) -> Option<&str> {
        match (&self.status_message, self.status_time) {
            (Some(msg), Some(time)) if time.elapsed().as_secs() < 3 => Some(msg),
            _ => None,
        }
    }

    /// Get results for current view
    pub fn current_results(&self) -> Vec<AnalysisResult> {
        match self.view {
            AppView::Input => self.summary_results(),
            AppView::Log => self.analysis.timeline.get_results(),
            AppView::Holds => self.analysis.holds.get_results(),
            AppView::Latency => self.analysis.latency.get_results(),
            AppView::Help => Vec::new(),
        }
    }

    /// Summary shown next to the input field
    fn summary_results(&self) -> Vec<AnalysisResult> {
        let stats = self.recorder.stats();
        let mut results = vec![
            AnalysisResult::info("Keystrokes", format!("{}", self.recorder.records().len())),
            AnalysisResult::info("Keys Down", format!("{}", self.recorder.pending_count())),
        ];

        match self.analysis.average_hold_ms() {
            Some(avg) => results.push(AnalysisResult::ok("Avg Hold", format_ms(avg))),
            None if !self.releases_supported => {
                results.push(AnalysisResult::error("Avg Hold", "Key releases not reported"))
            }
            None => results.push(AnalysisResult::info("Avg Hold", "-")),
        }

        if let Some(avg) = self.analysis.latency.overall_average_ms() {
            results.push(AnalysisResult::ok("Avg Latency", format_ms(avg)));
        }

        let lost = stats.dropped_downs + stats.unmatched_ups + stats.out_of_order;
        let status = if lost > 0 {
            ResultStatus::Warning
        } else {
            ResultStatus::Info
        };
        results.push(AnalysisResult::new("Unpaired Events", format!("{}", lost), status));

        results
    }

    /// Get elapsed time formatted
    pub fn elapsed_formatted(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Snapshot of the recorded session
    pub fn session(&self) -> Session {
        self.recorder.session(self.user.clone())
    }

    /// Generate a statistics report
    pub fn generate_report(&self) -> SessionReport {
        SessionReport::new(&self.session(), &self.analysis, Some(self.recorder.stats()))
    }

    /// Export the session (`{user, data}`) to a JSON file
    pub fn export_session(&mut self, filename: &str) -> Result<PathBuf, ReportError> {
        let path = self.config.export.path_for(filename);
        self.session().export_json(&path, self.config.export.pretty)?;
        info!("exported session to {}", path.display());
        self.set_status(format!("Exported to {}", path.display()));
        Ok(path)
    }

    /// Export the statistics report to a JSON file
    pub fn export_report(&mut self, filename: &str) -> Result<PathBuf, ReportError> {
        let path = self.config.export.path_for(filename);
        self.generate_report()
            .export_json(&path, self.config.export.pretty)?;
        info!("exported report to {}", path.display());
        self.set_status(format!("Exported to {}", path.display()));
        Ok(path)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_helpers::{down, shift_down, up, A, B, SHIFT};
    use crate::keyboard::KeyCode;

    fn tap(app: &mut App, key: KeyCode, at: f64, hold: f64) {
        app.process_event(&down(key, at));
        app.process_event(&up(key, at + hold));
    }

    #[test]
    fn typing_fills_input_and_log() {
        let mut app = App::default();
        tap(&mut app, A, 0.0, 80.0);
        tap(&mut app, B, 100.0, 60.0);

        assert_eq!(app.input, "ab");
        assert_eq!(app.recorder.records().len(), 2);
        assert_eq!(app.analysis.average_hold_ms(), Some(70.0));
        assert_eq!(app.analysis.latency.average_ms('a', 'b'), Some(100.0));
        assert_eq!(app.total_events, 4);
    }

    #[test]
    fn shifted_letters_are_uppercase_in_input() {
        let mut app = App::default();
        app.process_event(&shift_down(SHIFT, 0.0));
        app.process_event(&shift_down(A, 10.0));
        app.process_event(&up(SHIFT, 30.0));
        app.process_event(&up(A, 50.0));

        assert_eq!(app.input, "A");
        assert_eq!(app.recorder.records()[0].character, KeyToken::Char('A'));
    }

    #[test]
    fn backspace_and_enter_edit_input() {
        let mut app = App::default();
        tap(&mut app, A, 0.0, 10.0);
        tap(&mut app, B, 20.0, 10.0);
        tap(&mut app, KeyCode(8), 40.0, 10.0);
        tap(&mut app, KeyCode(13), 60.0, 10.0);

        assert_eq!(app.input, "a\n");
        // Control keys are not recorded by default
        assert_eq!(app.recorder.records().len(), 2);
    }

    #[test]
    fn pause_ignores_events() {
        let mut app = App::default();
        app.toggle_pause();
        assert_eq!(app.state, AppState::Paused);
        tap(&mut app, A, 0.0, 10.0);
        assert!(app.input.is_empty());
        assert!(app.recorder.records().is_empty());
        assert_eq!(app.recorder.pending_count(), 0);

        app.toggle_pause();
        assert_eq!(app.state, AppState::Running);
        tap(&mut app, A, 20.0, 10.0);
        assert_eq!(app.input, "a");
        assert_eq!(app.recorder.records().len(), 1);
    }

    #[test]
    fn release_during_pause_completes_keystroke() {
        let mut app = App::default();
        app.process_event(&down(A, 0.0));
        app.toggle_pause();
        app.process_event(&up(A, 50.0));
        app.toggle_pause();
        tap(&mut app, A, 1000.0, 80.0);

        let holds: Vec<f64> = app
            .recorder
            .records()
            .iter()
            .map(|r| r.duration_ms())
            .collect();
        assert_eq!(holds, vec![50.0, 80.0]);
        assert_eq!(app.recorder.stats().repeats, 0);
    }

    #[test]
    fn clear_input_keeps_log() {
        let mut app = App::default();
        tap(&mut app, A, 0.0, 10.0);
        app.clear_input();
        assert!(app.input.is_empty());
        assert_eq!(app.recorder.records().len(), 1);
    }

    #[test]
    fn clear_log_resets_statistics() {
        let mut app = App::default();
        tap(&mut app, A, 0.0, 10.0);
        app.clear_log();
        assert!(app.recorder.records().is_empty());
        assert_eq!(app.analysis.average_hold_ms(), None);
        assert_eq!(app.total_events, 0);
        assert_eq!(app.get_status(), Some("Log cleared"));
    }

    #[test]
    fn view_cycling_wraps() {
        let mut app = App::default();
        assert_eq!(app.view, AppView::Input);
        app.prev_view();
        assert_eq!(app.view, AppView::Help);
        app.next_view();
        assert_eq!(app.view, AppView::Input);
        for _ in 0..AppView::all().len() {
            app.next_view();
        }
        assert_eq!(app.view, AppView::Input);
    }

    #[test]
    fn view_index_roundtrip() {
        for view in AppView::all() {
            assert_eq!(AppView::from_index(view.index()), *view);
        }
    }

    #[test]
    fn missing_releases_reported_in_summary() {
        let mut app = App::default();
        app.set_releases_supported(false);
        app.process_event(&down(A, 0.0));

        let avg = app
            .current_results()
            .into_iter()
            .find(|r| r.label == "Avg Hold")
            .expect("avg hold result");
        assert_eq!(avg.status, ResultStatus::Error);
    }

    #[test]
    fn session_snapshot_carries_user() {
        let mut app = App::new(Config::default(), Some("bob".to_string()));
        tap(&mut app, A, 0.0, 10.0);
        let session = app.session();
        assert_eq!(session.user.as_deref(), Some("bob"));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn export_session_writes_file() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = Config::default();
        config.export.directory = Some(dir.path().to_path_buf());
        let mut app = App::new(config, None);
        tap(&mut app, A, 0.0, 10.0);

        let path = app.export_session("session.json").expect("export");
        assert_eq!(path, dir.path().join("session.json"));
        let loaded = Session::load(&path).expect("load");
        assert_eq!(loaded.len(), 1);

        let report = app.export_report("report.json").expect("export report");
        assert!(report.exists());
    }
}
