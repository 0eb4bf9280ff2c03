//! Custom TUI widgets

use crate::analysis::{AnalysisResult, HoldAnalysis, LatencyMatrix, ResultStatus};
use crate::keyboard::{KeyToken, KeystrokeRecord};
use crate::ui::ThemeColors;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Short label for a token in a fixed-width cell
pub fn token_label(token: &KeyToken) -> String {
    match token {
        KeyToken::Char(' ') => "␣".to_string(),
        KeyToken::Char('\t') => "⇥".to_string(),
        KeyToken::Char(c) => c.to_string(),
        KeyToken::Control(key) => format!("[{}]", key),
    }
}

fn bordered<'a>(title: &'a str, colors: &ThemeColors) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.dim))
        .style(Style::default().bg(colors.bg).fg(colors.fg))
}

/// Widget for displaying analysis results
pub struct ResultsPanel<'a> {
    results: &'a [AnalysisResult],
    title: &'a str,
    colors: ThemeColors,
}

impl<'a> ResultsPanel<'a> {
    pub fn new(results: &'a [AnalysisResult], title: &'a str, colors: ThemeColors) -> Self {
        Self {
            results,
            title,
            colors,
        }
    }

    fn status_symbol(status: ResultStatus) -> &'static str {
        match status {
            ResultStatus::Ok => "[OK]",
            ResultStatus::Warning => "[!!]",
            ResultStatus::Error => "[XX]",
            ResultStatus::Info => "[--]",
        }
    }
}

impl<'a> Widget for ResultsPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = bordered(self.title, &self.colors);
        let inner = block.inner(area);
        block.render(area, buf);

        for (row, result) in self.results.iter().take(inner.height as usize).enumerate() {
            let color = self.colors.status(result.status);
            let line = Line::from(vec![
                Span::styled(
                    format!("{} ", Self::status_symbol(result.status)),
                    Style::default().fg(color),
                ),
                Span::styled(
                    format!("{}: ", result.label),
                    Style::default()
                        .fg(self.colors.fg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(&result.value, Style::default().fg(color)),
            ]);
            buf.set_line(inner.x, inner.y + row as u16, &line, inner.width);
        }
    }
}

/// Text field echoing what has been typed, with a block cursor
pub struct InputField<'a> {
    text: &'a str,
    colors: ThemeColors,
    recording: bool,
}

impl<'a> InputField<'a> {
    pub fn new(text: &'a str, colors: ThemeColors) -> Self {
        Self {
            text,
            colors,
            recording: true,
        }
    }

    pub fn recording(mut self, recording: bool) -> Self {
        self.recording = recording;
        self
    }

    /// Split text into display rows of at most `width` characters
    fn wrap(text: &str, width: usize) -> Vec<String> {
        let mut rows = Vec::new();
        for line in text.split('\n') {
            let chars: Vec<char> = line.chars().collect();
            if chars.is_empty() {
                rows.push(String::new());
                continue;
            }
            for chunk in chars.chunks(width.max(1)) {
                rows.push(chunk.iter().collect());
            }
        }
        rows
    }
}

impl<'a> Widget for InputField<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.recording {
            " Type here "
        } else {
            " Type here (paused) "
        };
        let block = bordered(title, &self.colors);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        // Reserve one column so the cursor never wraps onto a new row
        let width = inner.width.saturating_sub(1) as usize;
        let rows = Self::wrap(self.text, width);
        let skip = rows.len().saturating_sub(inner.height as usize);
        let style = Style::default().fg(self.colors.fg);

        let mut y = inner.y;
        let mut cursor_x = inner.x;
        for row in rows.iter().skip(skip) {
            buf.set_string(inner.x, y, row, style);
            cursor_x = inner.x + row.chars().count() as u16;
            y += 1;
        }

        let cursor_y = y.saturating_sub(1).max(inner.y);
        let cursor_style = if self.recording {
            Style::default().fg(self.colors.accent)
        } else {
            Style::default().fg(self.colors.dim)
        };
        buf.set_string(cursor_x, cursor_y, "█", cursor_style);
    }
}

/// Recorded keystrokes in key-down order, most recent at the bottom
pub struct RecordTable<'a> {
    records: &'a [KeystrokeRecord],
    colors: ThemeColors,
}

impl<'a> RecordTable<'a> {
    pub fn new(records: &'a [KeystrokeRecord], colors: ThemeColors) -> Self {
        Self { records, colors }
    }
}

impl<'a> Widget for RecordTable<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = bordered(" Keystroke Log ", &self.colors);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }

        let header = format!(
            "{:>5}  {:<10} {:>12} {:>12} {:>9}",
            "#", "Key", "Down (ms)", "Up (ms)", "Hold"
        );
        buf.set_string(
            inner.x,
            inner.y,
            &header,
            Style::default()
                .fg(self.colors.accent)
                .add_modifier(Modifier::BOLD),
        );

        let visible = inner.height.saturating_sub(1) as usize;
        let skip = self.records.len().saturating_sub(visible);

        for (row, (index, record)) in self.records.iter().enumerate().skip(skip).enumerate() {
            let line = format!(
                "{:>5}  {:<10} {:>12.1} {:>12.1} {:>9.1}",
                index + 1,
                token_label(&record.character),
                record.time_down,
                record.time_up,
                record.duration_ms()
            );
            buf.set_stringn(
                inner.x,
                inner.y + 1 + row as u16,
                &line,
                inner.width as usize,
                Style::default().fg(self.colors.fg),
            );
        }
    }
}

/// Per-character hold statistics
pub struct HoldTable<'a> {
    holds: &'a HoldAnalysis,
    colors: ThemeColors,
}

impl<'a> HoldTable<'a> {
    pub fn new(holds: &'a HoldAnalysis, colors: ThemeColors) -> Self {
        Self { holds, colors }
    }
}

impl<'a> Widget for HoldTable<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = bordered(" Hold Time per Key ", &self.colors);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }

        let header = format!(
            "{:<10} {:>6} {:>9} {:>9} {:>9}",
            "Key", "Count", "Avg", "Min", "Max"
        );
        buf.set_string(
            inner.x,
            inner.y,
            &header,
            Style::default()
                .fg(self.colors.accent)
                .add_modifier(Modifier::BOLD),
        );

        let rows = self
            .holds
            .keys()
            .take(inner.height.saturating_sub(1) as usize);
        for (row, (token, stats)) in rows.enumerate() {
            let line = format!(
                "{:<10} {:>6} {:>9.1} {:>9.1} {:>9.1}",
                token_label(token),
                stats.count,
                stats.mean_ms().unwrap_or(0.0),
                stats.min_ms.unwrap_or(0.0),
                stats.max_ms.unwrap_or(0.0)
            );
            buf.set_stringn(
                inner.x,
                inner.y + 1 + row as u16,
                &line,
                inner.width as usize,
                Style::default().fg(self.colors.fg),
            );
        }
    }
}

/// Latency matrix with one row per first key and one column per second key
pub struct LatencyTable<'a> {
    matrix: &'a LatencyMatrix,
    colors: ThemeColors,
}

impl<'a> LatencyTable<'a> {
    const LABEL_WIDTH: u16 = 8;
    const CELL_WIDTH: u16 = 7;

    pub fn new(matrix: &'a LatencyMatrix, colors: ThemeColors) -> Self {
        Self { matrix, colors }
    }
}

impl<'a> Widget for LatencyTable<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = bordered(" Latency (ms, row then column) ", &self.colors);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 || inner.width <= Self::LABEL_WIDTH {
            return;
        }

        if self.matrix.is_empty() {
            buf.set_string(
                inner.x,
                inner.y,
                "Type at least two keys to fill the matrix",
                Style::default().fg(self.colors.dim),
            );
            return;
        }

        let max_cols = ((inner.width - Self::LABEL_WIDTH) / Self::CELL_WIDTH) as usize;
        let columns: Vec<KeyToken> = self.matrix.columns().into_iter().take(max_cols).collect();
        let header_style = Style::default()
            .fg(self.colors.accent)
            .add_modifier(Modifier::BOLD);

        for (i, column) in columns.iter().enumerate() {
            let x = inner.x + Self::LABEL_WIDTH + i as u16 * Self::CELL_WIDTH;
            let width = Self::CELL_WIDTH as usize;
            let label = format!("{:>width$}", token_label(column));
            buf.set_string(x, inner.y, &label, header_style);
        }

        let rows = self
            .matrix
            .rows()
            .into_iter()
            .take(inner.height.saturating_sub(1) as usize);
        for (r, row) in rows.enumerate() {
            let y = inner.y + 1 + r as u16;
            buf.set_stringn(
                inner.x,
                y,
                token_label(&row),
                Self::LABEL_WIDTH as usize,
                header_style,
            );

            for (c, column) in columns.iter().enumerate() {
                let x = inner.x + Self::LABEL_WIDTH + c as u16 * Self::CELL_WIDTH;
                let (text, style) = match self.matrix.average_ms(row, *column) {
                    Some(avg) => (format!("{:>7.0}", avg), Style::default().fg(self.colors.fg)),
                    None => (format!("{:>7}", "·"), Style::default().fg(self.colors.dim)),
                };
                buf.set_string(x, y, &text, style);
            }
        }
    }
}

/// Widget for the help screen
pub struct HelpPanel {
    colors: ThemeColors,
}

impl HelpPanel {
    pub fn new(colors: ThemeColors) -> Self {
        Self { colors }
    }
}

impl Widget for HelpPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = bordered("Help - typespy", &self.colors);
        let inner = block.inner(area);
        block.render(area, buf);

        let help_text = [
            "",
            " NAVIGATION",
            " -----------",
            " Tab / Shift+Tab  : Switch between views",
            " F1               : Show this help",
            " Esc / Ctrl+C     : Quit application",
            "",
            " CONTROLS",
            " -----------",
            " F2               : Export session to JSON",
            " F3               : Export statistics report to JSON",
            " F4               : Pause/Resume recording",
            " F5               : Clear input field",
            " F6               : Clear keystroke log",
            "",
            " VIEWS",
            " -----------",
            " Input            : Type text and watch the running summary",
            " Log              : Keystrokes sorted by key-down time",
            " Holds            : Hold time per key",
            " Latency          : Average time between consecutive key pairs",
            "",
            " Every other key is recorded. Start typing!",
        ];

        for (i, line) in help_text.iter().enumerate().take(inner.height as usize) {
            let style = if line.contains("---") {
                Style::default().fg(self.colors.dim)
            } else if line.len() > 1 && line[1..].chars().all(|c| c.is_ascii_uppercase()) {
                Style::default()
                    .fg(self.colors.yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.colors.fg)
            };
            buf.set_string(inner.x, inner.y + i as u16, line, style);
        }
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    state: &'a str,
    view: &'a str,
    elapsed: &'a str,
    keystrokes: usize,
    events: u64,
    message: Option<&'a str>,
    colors: ThemeColors,
}

impl<'a> StatusBar<'a> {
    pub fn new(
        state: &'a str,
        view: &'a str,
        elapsed: &'a str,
        keystrokes: usize,
        events: u64,
        colors: ThemeColors,
    ) -> Self {
        Self {
            state,
            view,
            elapsed,
            keystrokes,
            events,
            message: None,
            colors,
        }
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg_style = Style::default().bg(self.colors.bar_bg).fg(self.colors.fg);
        buf.set_style(area, bg_style);

        let left = format!(" {} | {} ", self.state, self.view);
        buf.set_string(area.x, area.y, &left, bg_style.add_modifier(Modifier::BOLD));

        if let Some(msg) = self.message {
            let msg_x = area.x + (area.width / 2).saturating_sub(msg.chars().count() as u16 / 2);
            buf.set_string(msg_x, area.y, msg, bg_style.fg(self.colors.yellow));
        }

        let right = format!(
            " {} | Keys: {} | Events: {} ",
            self.elapsed, self.keystrokes, self.events
        );
        let right_x = area.x + area.width.saturating_sub(right.len() as u16);
        buf.set_string(right_x, area.y, &right, bg_style);
    }
}

/// Tab bar widget
pub struct TabBar<'a> {
    tabs: &'a [&'a str],
    selected: usize,
    colors: ThemeColors,
}

impl<'a> TabBar<'a> {
    pub fn new(tabs: &'a [&'a str], selected: usize, colors: ThemeColors) -> Self {
        Self {
            tabs,
            selected,
            colors,
        }
    }
}

impl<'a> Widget for TabBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bar = Style::default().bg(self.colors.bar_bg).fg(self.colors.fg);
        buf.set_style(area, bar);

        let mut x = area.x;
        for (i, tab) in self.tabs.iter().enumerate() {
            let style = if i == self.selected {
                Style::default()
                    .fg(self.colors.bg)
                    .bg(self.colors.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                bar
            };

            let label = format!(" {} ", tab);
            let width = label.len() as u16;
            if x + width > area.x + area.width {
                break;
            }
            buf.set_string(x, area.y, &label, style);
            x += width;

            if i + 1 < self.tabs.len() && x < area.x + area.width {
                buf.set_string(x, area.y, "|", bar.fg(self.colors.dim));
                x += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_helpers::record;
    use crate::analysis::Analysis;
    use crate::keyboard::ControlKey;

    fn row_text(buf: &Buffer, y: u16) -> String {
        let area = buf.area;
        (area.x..area.x + area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    fn render<W: Widget>(widget: W, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf
    }

    #[test]
    fn token_labels() {
        assert_eq!(token_label(&KeyToken::Char('a')), "a");
        assert_eq!(token_label(&KeyToken::Char(' ')), "␣");
        assert_eq!(token_label(&KeyToken::Control(ControlKey::Enter)), "[Enter]");
    }

    #[test]
    fn wrap_splits_lines_and_width() {
        assert_eq!(InputField::wrap("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(InputField::wrap("ab\n\ncd", 4), vec!["ab", "", "cd"]);
        assert_eq!(InputField::wrap("", 4), vec![""]);
    }

    #[test]
    fn input_field_shows_latest_rows() {
        let buf = render(
            InputField::new("one\ntwo\nthree", ThemeColors::default()),
            20,
            4,
        );
        // Two inner rows: the last two lines
        assert!(row_text(&buf, 1).contains("two"));
        assert!(row_text(&buf, 2).contains("three█"));
    }

    #[test]
    fn results_panel_renders_labels() {
        let results = vec![AnalysisResult::ok("Avg Hold", "80.0 ms")];
        let buf = render(ResultsPanel::new(&results, "Summary", ThemeColors::default()), 40, 3);
        assert!(row_text(&buf, 1).contains("[OK] Avg Hold: 80.0 ms"));
    }

    #[test]
    fn record_table_keeps_most_recent() {
        let records: Vec<_> = (0..10)
            .map(|i| record('a', i as f64 * 100.0, i as f64 * 100.0 + 50.0))
            .collect();
        // 2 inner rows: header plus one record
        let buf = render(RecordTable::new(&records, ThemeColors::default()), 60, 4);
        assert!(row_text(&buf, 1).contains("Down"));
        assert!(row_text(&buf, 2).trim_start_matches('│').trim_start().starts_with("10"));
    }

    #[test]
    fn hold_table_lists_keys() {
        let mut holds = HoldAnalysis::default();
        holds.analyze(&[record('a', 0.0, 80.0), record('b', 100.0, 160.0)]);
        let buf = render(HoldTable::new(&holds, ThemeColors::default()), 60, 5);
        assert!(row_text(&buf, 2).contains("80.0"));
        assert!(row_text(&buf, 3).contains("60.0"));
    }

    #[test]
    fn latency_table_marks_missing_cells() {
        let matrix = LatencyMatrix::from_timeline(&[
            record('a', 0.0, 10.0),
            record('b', 40.0, 50.0),
            record('a', 100.0, 110.0),
        ]);
        let buf = render(LatencyTable::new(&matrix, ThemeColors::default()), 40, 5);
        let a_row = row_text(&buf, 2);
        assert!(a_row.contains("40"));
        assert!(a_row.contains("·"));
        assert!(row_text(&buf, 3).contains("60"));
    }

    #[test]
    fn tab_bar_highlights_selected() {
        let tabs = ["Input", "Log"];
        let colors = ThemeColors::default();
        let buf = render(TabBar::new(&tabs, 1, colors), 20, 1);
        assert!(row_text(&buf, 0).starts_with(" Input | Log "));
        assert_eq!(buf[(9, 0)].bg, colors.accent);
    }
}
