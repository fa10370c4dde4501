//! Terminal user interface for the voice-memo pad.
//!
//! One screen: a capture panel with live volume metering, the draft panel,
//! and the saved-take list. Blocking notices (like the invalid-import
//! message) consume the next key press before anything else happens, and an
//! inline text field collects the path for imports.

use crate::recording::CaptureController;
use crate::session::board::{SavedTake, SessionBoard, TakeId};
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Sparkline, Wrap},
};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

/// Common colors/styles.
const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const ACCENT: Color = Color::Rgb(185, 207, 212);
const METER_FG: Color = Color::Rgb(206, 224, 220);
const HIGHLIGHT_BG: Color = Color::Rgb(20, 20, 20);
const HELP_FG: Color = Color::Rgb(100, 100, 100);

/// How long a transient status message stays in the footer.
const STATUS_TTL: Duration = Duration::from_millis(2500);

/// User intent read from the keyboard, resolved against the current board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PadCommand {
    /// Nothing to do this frame
    Continue,
    /// Start recording, or stop the running session ('r')
    ToggleRecord,
    /// Play the draft take ('p')
    PlayDraft,
    /// Save the draft to the list ('s')
    SaveDraft,
    /// Export the draft to disk ('d')
    ExportDraft,
    /// Load an audio file into the draft slot (import field submitted)
    Import(PathBuf),
    /// Play the selected saved take (Enter)
    PlaySelected(TakeId),
    /// Export the selected saved take ('e')
    ExportSelected(TakeId),
    /// Delete the selected saved take ('x' or Delete)
    DeleteSelected(TakeId),
    /// Leave the pad ('q', Escape or Ctrl+C)
    Quit,
}

/// Terminal UI for the pad screen.
pub struct PadUi {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Selection and scroll state for the saved list
    list_state: ListState,
    /// Scrolling volume history feeding the sparkline
    volume_history: Vec<u64>,
    history_width: usize,
    last_sample_time: Instant,
    sample_interval: Duration,
    last_peak: u8,
    peak_hold: u8,
    peak_hold_time: Instant,
    peak_volume_threshold: u8,
    reference_level_db: i8,
    /// Whether the import path field is open
    input_mode: bool,
    input: Input,
    /// Blocking message; the next key press dismisses it and does nothing else
    notice: Option<String>,
    /// Transient footer message
    status: Option<(String, Instant)>,
    cleaned_up: bool,
}

impl PadUi {
    /// Creates the pad UI and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    pub fn new(peak_volume_threshold: u8, reference_level_db: i8) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let size = terminal.size()?;
        let history_width = (size.width as usize).saturating_sub(4).max(10);

        let now = Instant::now();
        Ok(Self {
            terminal,
            list_state: ListState::default(),
            volume_history: vec![0u64; history_width],
            history_width,
            last_sample_time: now,
            sample_interval: Duration::from_millis(50),
            last_peak: 0,
            peak_hold: 0,
            peak_hold_time: now,
            peak_volume_threshold,
            reference_level_db,
            input_mode: false,
            input: Input::default(),
            notice: None,
            status: None,
            cleaned_up: false,
        })
    }

    /// Shows a blocking message. The next key press dismisses it and is
    /// otherwise swallowed.
    pub fn show_notice(&mut self, text: impl Into<String>) {
        self.notice = Some(text.into());
    }

    /// Shows a short-lived footer message.
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some((text.into(), Instant::now()));
    }

    /// Clears the volume meter for a fresh recording session.
    pub fn reset_meter(&mut self) {
        for v in &mut self.volume_history {
            *v = 0;
        }
        self.last_peak = 0;
        self.peak_hold = 0;
        self.peak_hold_time = Instant::now();
    }

    /// The id of the saved take under the cursor, if any.
    pub fn selected_id(&self, board: &SessionBoard) -> Option<TakeId> {
        self.list_state
            .selected()
            .and_then(|i| board.saved().get(i))
            .map(|s| s.id)
    }

    /// Polls for input for up to 50ms and translates it into a command.
    ///
    /// Navigation, the import field and notice dismissal are handled
    /// internally; everything the hosting loop must act on comes back as a
    /// [`PadCommand`].
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self, board: &SessionBoard) -> Result<PadCommand> {
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => return Ok(self.handle_key(board, key)),
                Event::Mouse(mouse) => {
                    if self.notice.is_none() && !self.input_mode {
                        match mouse.kind {
                            MouseEventKind::ScrollUp => self.list_state.select_previous(),
                            MouseEventKind::ScrollDown => self.list_state.select_next(),
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(PadCommand::Continue)
    }

    fn handle_key(&mut self, board: &SessionBoard, key: KeyEvent) -> PadCommand {
        // A notice blocks the screen until acknowledged.
        if self.notice.is_some() {
            self.notice = None;
            return PadCommand::Continue;
        }

        if self.input_mode {
            return self.handle_import_key(key);
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                tracing::debug!("Ctrl+C pressed: leaving pad");
                PadCommand::Quit
            }
            KeyCode::Char('q') | KeyCode::Esc => PadCommand::Quit,
            KeyCode::Char('r') => PadCommand::ToggleRecord,
            KeyCode::Char('p') => PadCommand::PlayDraft,
            KeyCode::Char('s') => PadCommand::SaveDraft,
            KeyCode::Char('d') => PadCommand::ExportDraft,
            KeyCode::Char('i') => {
                self.input_mode = true;
                PadCommand::Continue
            }
            KeyCode::Up => {
                self.list_state.select_previous();
                PadCommand::Continue
            }
            KeyCode::Down => {
                self.list_state.select_next();
                PadCommand::Continue
            }
            KeyCode::Enter => match self.selected_id(board) {
                Some(id) => PadCommand::PlaySelected(id),
                None => PadCommand::Continue,
            },
            KeyCode::Char('e') => match self.selected_id(board) {
                Some(id) => PadCommand::ExportSelected(id),
                None => PadCommand::Continue,
            },
            KeyCode::Char('x') | KeyCode::Delete => match self.selected_id(board) {
                Some(id) => PadCommand::DeleteSelected(id),
                None => PadCommand::Continue,
            },
            _ => PadCommand::Continue,
        }
    }

    /// Handle key events while the import path field is open.
    fn handle_import_key(&mut self, key: KeyEvent) -> PadCommand {
        match key.code {
            KeyCode::Enter => {
                let value = self.input.value().trim().to_string();
                self.input_mode = false;
                self.input = Input::default();
                if value.is_empty() {
                    PadCommand::Continue
                } else {
                    PadCommand::Import(PathBuf::from(value))
                }
            }
            KeyCode::Esc => {
                self.input_mode = false;
                self.input = Input::default();
                PadCommand::Continue
            }
            _ => {
                // Everything else edits the field through tui_input
                let ev = Event::Key(key);
                self.input.handle_event(&ev);
                PadCommand::Continue
            }
        }
    }

    /// Renders the pad screen.
    ///
    /// While a session records, `recorder` feeds the volume meter; otherwise
    /// the capture panel shows the idle hint.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(&mut self, board: &SessionBoard, recorder: Option<&CaptureController>) -> Result<()> {
        // Feed the meter before drawing.
        if board.is_recording() {
            if let Some(recorder) = recorder {
                let window = (recorder.sample_rate() / 20).max(1) as usize;
                let samples = recorder.recent_samples(window);
                let volume = self.calculate_volume(&samples);

                if self.last_sample_time.elapsed() >= self.sample_interval {
                    self.volume_history.push(volume as u64);
                    if self.volume_history.len() > self.history_width {
                        self.volume_history.remove(0);
                    }
                    self.last_sample_time = Instant::now();
                }
            }
        }

        // Keep the history in step with terminal resizes.
        let size = self.terminal.size()?;
        let target_width = (size.width as usize).saturating_sub(4).max(10);
        if target_width != self.history_width {
            self.history_width = target_width;
            while self.volume_history.len() > target_width {
                self.volume_history.remove(0);
            }
            while self.volume_history.len() < target_width {
                self.volume_history.insert(0, 0);
            }
        }

        // Drop expired status messages.
        if let Some((_, since)) = &self.status {
            if since.elapsed() >= STATUS_TTL {
                self.status = None;
            }
        }

        self.clamp_selection(board.saved().len());

        // Extract data before the closure to avoid borrow conflicts
        let input_mode = self.input_mode;
        let input_value = self.input.value().to_string();
        let input_cursor = self.input.cursor();
        let notice = self.notice.clone();
        let status_text = self.status.as_ref().map(|(text, _)| text.clone());
        let volume_history = self.volume_history.clone();
        let last_peak = self.last_peak;
        let peak_hold = self.peak_hold;
        let peak_volume_threshold = self.peak_volume_threshold;
        let list_state = &mut self.list_state;

        self.terminal.draw(|frame| {
            let area = frame.area();

            let padding_block = Block::default()
                .padding(Padding::uniform(1))
                .style(Style::default().fg(FG).bg(BG));
            frame.render_widget(&padding_block, area);
            let inner_area = padding_block.inner(area);

            let bottom_height = if input_mode { 3 } else { 1 };
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(4),
                    Constraint::Length(4),
                    Constraint::Min(1),
                    Constraint::Length(bottom_height),
                ])
                .split(inner_area);

            let capture_area = layout[0];
            let draft_area = layout[1];
            let list_area = layout[2];
            let bottom_area = layout[3];

            Self::render_capture_panel(
                frame,
                capture_area,
                board,
                &volume_history,
                last_peak,
                peak_hold,
                peak_volume_threshold,
            );
            Self::render_draft_panel(frame, draft_area, board);
            Self::render_saved_list(frame, list_area, board.saved(), list_state);

            if input_mode {
                Self::render_import_field(frame, bottom_area, &input_value, input_cursor);
            } else {
                Self::render_footer(frame, bottom_area, board, status_text.as_deref());
            }

            if let Some(text) = &notice {
                Self::render_notice(frame, area, text);
            }
        })?;

        Ok(())
    }

    fn render_capture_panel(
        frame: &mut Frame,
        area: Rect,
        board: &SessionBoard,
        volume_history: &[u64],
        last_peak: u8,
        peak_hold: u8,
        peak_volume_threshold: u8,
    ) {
        let status_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: 1,
        };
        let meter_area = Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: area.height.saturating_sub(1),
        };

        if board.is_recording() {
            let peak_style = if peak_hold >= peak_volume_threshold {
                Style::default().bg(Color::Red).fg(FG)
            } else {
                Style::default()
            };

            let status_line = Line::from(vec![
                Span::styled("● ", Style::default().fg(Color::Red)),
                Span::raw(format_elapsed(board.elapsed_secs())),
                Span::raw(" / "),
                Span::raw(format!("{last_peak}%")),
                Span::raw(" / "),
                Span::styled(format!("{peak_hold}%"), peak_style),
            ]);
            frame.render_widget(
                Paragraph::new(status_line).style(Style::default().fg(ACCENT).bg(BG)),
                status_area,
            );

            let sparkline = Sparkline::default()
                .data(volume_history)
                .max(100)
                .style(Style::default().bg(BG).fg(METER_FG));
            frame.render_widget(sparkline, meter_area);
        } else {
            let hint = Paragraph::new("Press r to record a memo, i to import an audio file")
                .style(Style::default().fg(HELP_FG));
            frame.render_widget(hint, status_area);
        }
    }

    fn render_draft_panel(frame: &mut Frame, area: Rect, board: &SessionBoard) {
        let block = Block::default()
            .title(" Draft ")
            .borders(Borders::ALL)
            .style(Style::default().fg(FG).bg(BG));

        let content = match board.visible_draft() {
            Some(take) => Line::from(vec![
                Span::raw(take.describe()),
                Span::styled(
                    format!("  loaded {}", take.created_at().format("%H:%M:%S")),
                    Style::default().fg(HELP_FG),
                ),
            ]),
            None if board.is_recording() => {
                Line::from(Span::styled("Recording...", Style::default().fg(HELP_FG)))
            }
            None => Line::from(Span::styled("No draft", Style::default().fg(HELP_FG))),
        };

        let paragraph = Paragraph::new(content).block(block);
        frame.render_widget(paragraph, area);
    }

    fn render_saved_list(
        frame: &mut Frame,
        area: Rect,
        saved: &[SavedTake],
        list_state: &mut ListState,
    ) {
        let items: Vec<ListItem> = saved
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let line = Line::from(vec![
                    Span::styled(format!("{:>3}. ", i + 1), Style::default().fg(HELP_FG)),
                    Span::raw(entry.take.created_at().format("%H:%M:%S").to_string()),
                    Span::raw("  "),
                    Span::raw(entry.take.describe()),
                ]);
                ListItem::new(line)
            })
            .collect();

        let title = format!(" Saved takes ({}) ", saved.len());
        let list = List::new(items)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .style(Style::default().fg(FG).bg(BG)),
            )
            .highlight_style(Style::default().bg(HIGHLIGHT_BG).fg(FG));

        frame.render_stateful_widget(list, area, list_state);
    }

    fn render_import_field(frame: &mut Frame, area: Rect, input_value: &str, input_cursor: usize) {
        let input_block = Block::default()
            .title(" Import audio file (Enter to load, Esc to cancel) ")
            .borders(Borders::ALL);
        frame.render_widget(&input_block, area);
        let input_inner = input_block.inner(area);

        let input_widget = Paragraph::new(input_value).style(Style::default().fg(FG));
        frame.render_widget(input_widget, input_inner);

        // Cursor position based on tui_input cursor
        let cursor_x = area.x + input_cursor as u16 + 1;
        let cursor_y = area.y + 1;
        frame.set_cursor_position(Position::new(cursor_x, cursor_y));
    }

    fn render_footer(frame: &mut Frame, area: Rect, board: &SessionBoard, status: Option<&str>) {
        let text = match status {
            Some(status) => status.to_string(),
            None if board.is_recording() => "r stop · i import · q quit".to_string(),
            None => {
                "r record · p play · s save · d export · i import · ↑↓ Enter e x list · q quit"
                    .to_string()
            }
        };

        let footer = Paragraph::new(text).style(Style::default().fg(HELP_FG).bg(BG));
        frame.render_widget(footer, area);
    }

    fn render_notice(frame: &mut Frame, area: Rect, text: &str) {
        let popup = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .style(Style::default().fg(FG).bg(BG));
        let body = format!("{text}\n\n(press any key)");
        let paragraph = Paragraph::new(body)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(paragraph, popup);
    }

    /// Keeps the selection valid as the saved list grows and shrinks.
    fn clamp_selection(&mut self, len: usize) {
        if len == 0 {
            self.list_state.select(None);
        } else {
            let idx = self.list_state.selected().unwrap_or(0).min(len - 1);
            self.list_state.select(Some(idx));
        }
    }

    /// Converts recent samples to a 0-100% level and updates peak tracking.
    ///
    /// RMS is converted to dBFS and normalized against the configured
    /// reference level. The peak indicator holds the maximum for 3 seconds.
    fn calculate_volume(&mut self, samples: &[i16]) -> u8 {
        if samples.is_empty() {
            return 0;
        }

        let sum_of_squares: i64 = samples.iter().map(|&x| (x as i64).pow(2)).sum();
        let mean_square = sum_of_squares / samples.len() as i64;
        let rms = (mean_square as f32).sqrt();

        let db_fs = if rms > 0.0 {
            20.0 * (rms / 32767.0).log10()
        } else {
            -160.0
        };

        let min_db = self.reference_level_db as f32 - 40.0;
        let normalized = ((db_fs - min_db) / 40.0 * 100.0).clamp(4.0, 100.0) as u8;

        self.last_peak = normalized;

        if normalized > self.peak_hold || self.peak_hold_time.elapsed().as_secs() >= 3 {
            self.peak_hold = normalized;
            self.peak_hold_time = Instant::now();
        }

        normalized
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        self.cleaned_up = true;

        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for PadUi {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Formats whole seconds as `m:ss` for the status line.
fn format_elapsed(total_secs: u32) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Centers a `percent_x` by `percent_y` rectangle inside `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "0:00");
        assert_eq!(format_elapsed(59), "0:59");
        assert_eq!(format_elapsed(61), "1:01");
        assert_eq!(format_elapsed(600), "10:00");
    }

    #[test]
    fn test_centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 30, area);
        assert!(popup.width <= area.width);
        assert!(popup.height <= area.height);
        assert!(popup.x >= area.x && popup.y >= area.y);
        assert!(popup.right() <= area.right());
        assert!(popup.bottom() <= area.bottom());
    }
}
