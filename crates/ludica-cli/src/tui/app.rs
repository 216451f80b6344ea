//! TUI application state and key handling.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use ludica_core::demo::{DemoSession, SubmitRejected};
use ludica_core::{GenerateError, LessonGenerator, LessonIdea};

/// Which form control has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Theme,
    Age,
    Submit,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::Theme => Self::Age,
            Self::Age => Self::Submit,
            Self::Submit => Self::Theme,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Theme => Self::Submit,
            Self::Age => Self::Theme,
            Self::Submit => Self::Age,
        }
    }
}

/// Which view the TUI is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Demo,
    Help,
}

type Completion = (u64, Result<LessonIdea, GenerateError>);

/// Application state for the TUI.
pub struct App {
    pub session: DemoSession,
    pub focus: Focus,
    pub current_view: View,
    pub tick_rate: Duration,
    pub should_quit: bool,
    pub status_message: Option<String>,
    /// Advances on every tick while loading; drives the spinner.
    pub spinner_frame: usize,
    generator: LessonGenerator,
    results_tx: mpsc::UnboundedSender<Completion>,
    results_rx: mpsc::UnboundedReceiver<Completion>,
}

impl App {
    pub fn new(generator: LessonGenerator) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            session: DemoSession::new(),
            focus: Focus::Theme,
            current_view: View::Demo,
            tick_rate: Duration::from_millis(120),
            should_quit: false,
            status_message: None,
            spinner_frame: 0,
            generator,
            results_tx,
            results_rx,
        }
    }

    // -- Input --

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.current_view == View::Help {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q')) {
                self.current_view = View::Demo;
            }
            return;
        }

        // Clear status message on any keypress in the demo view.
        self.status_message = None;

        match key.code {
            KeyCode::F(1) => self.current_view = View::Help,
            KeyCode::Esc => self.cancel_or_quit(),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Enter => self.submit(),
            code => match self.focus {
                Focus::Theme => self.edit_theme(code, key.modifiers),
                Focus::Age => match code {
                    KeyCode::Left | KeyCode::Up => self.session.age = self.session.age.prev(),
                    KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => {
                        self.session.age = self.session.age.next()
                    }
                    _ => {}
                },
                Focus::Submit => {
                    if code == KeyCode::Char(' ') {
                        self.submit();
                    }
                }
            },
        }
    }

    fn edit_theme(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match code {
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                self.session.theme_input.push(c);
            }
            KeyCode::Backspace => {
                self.session.theme_input.pop();
            }
            _ => {}
        }
    }

    // -- Actions --

    /// Start a generation on a background task.
    pub fn submit(&mut self) {
        let pending = match self.session.begin() {
            Ok(pending) => pending,
            Err(SubmitRejected::EmptyTheme) => {
                self.status_message = Some("Digite um tema primeiro.".to_string());
                self.focus = Focus::Theme;
                return;
            }
            Err(SubmitRejected::Busy) => {
                self.status_message = Some("Aguarde: a ideia anterior ainda está sendo criada.".to_string());
                return;
            }
        };

        self.spinner_frame = 0;
        let generator = self.generator.clone();
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let result = generator
                .generate_with_cancel(&pending.theme, pending.age, &pending.cancel)
                .await;
            let _ = tx.send((pending.ticket, result));
        });
    }

    fn cancel_or_quit(&mut self) {
        if self.session.cancel() {
            self.status_message = Some("Geração cancelada.".to_string());
        } else {
            self.should_quit = true;
        }
    }

    // -- Background results --

    /// Apply any finished generations without blocking.
    pub fn drain_results(&mut self) {
        while let Ok((ticket, result)) = self.results_rx.try_recv() {
            self.session.complete(ticket, result);
        }
    }

    /// Wait for the next finished generation and apply it.
    #[cfg(test)]
    pub async fn next_result(&mut self) {
        if let Some((ticket, result)) = self.results_rx.recv().await {
            self.session.complete(ticket, result);
        }
    }

    pub fn tick(&mut self) {
        if self.session.state().is_loading() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
