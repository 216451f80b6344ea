//! TUI rendering using ratatui.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use ludica_core::LessonIdea;
use ludica_core::demo::{FailureKind, FailureNotice, RequestState};

use super::app::{App, Focus, View};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Render the current view.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(3), // form
            Constraint::Min(5),    // result area
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    render_header(f, chunks[0]);
    render_form(f, app, chunks[1]);

    match app.current_view {
        View::Demo => render_result(f, app, chunks[2]),
        View::Help => render_help(f, chunks[2]),
    }

    render_status_bar(f, app, chunks[3]);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            " EducaLúdica",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            " Ideias de atividades lúdicas para a educação infantil",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    f.render_widget(header, area);
}

fn focus_style(app: &App, focus: Focus) -> Style {
    if app.focus == focus && app.current_view == View::Demo {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(30),
            Constraint::Min(12),
        ])
        .split(area);

    // Theme input.
    let theme = Paragraph::new(app.session.theme_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(app, Focus::Theme))
            .title(" Tema "),
    );
    f.render_widget(theme, chunks[0]);

    if app.focus == Focus::Theme && app.current_view == View::Demo {
        let typed = app.session.theme_input.chars().count() as u16;
        let max_x = chunks[0].x + chunks[0].width.saturating_sub(2);
        let x = (chunks[0].x + 1 + typed).min(max_x);
        f.set_cursor_position((x, chunks[0].y + 1));
    }

    // Age selector.
    let age = Paragraph::new(Line::from(vec![
        Span::raw("◂ "),
        Span::styled(
            app.session.age.label(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ▸"),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(app, Focus::Age))
            .title(" Faixa etária "),
    );
    f.render_widget(age, chunks[1]);

    // Submit button.
    let loading = app.session.state().is_loading();
    let label = if loading { "Criando..." } else { "Gerar Ideia" };
    let label_style = if app.session.can_submit() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let button = Paragraph::new(Span::styled(label, label_style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(app, Focus::Submit)),
    );
    f.render_widget(button, chunks[2]);
}

fn render_result(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL);

    let text = match app.session.state() {
        RequestState::Idle => vec![
            Line::from(""),
            Line::from("  Digite um tema (ex.: Primavera, Animais, Cores),"),
            Line::from("  escolha a faixa etária e pressione Enter."),
        ],
        RequestState::Loading => {
            let frame = SPINNER[app.spinner_frame % SPINNER.len()];
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {frame} Criando uma ideia para {}...", app.session.age.label()),
                    Style::default().fg(Color::Cyan),
                )),
                Line::from(Span::styled(
                    "  Esc cancela",
                    Style::default().fg(Color::DarkGray),
                )),
            ]
        }
        RequestState::Success(lesson) => lesson_lines(lesson),
        RequestState::Failed(notice) => failure_lines(notice),
    };

    let paragraph = Paragraph::new(text)
        .block(block.title(" Ideia "))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
}

fn lesson_lines(lesson: &LessonIdea) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            lesson.title().to_string(),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Objetivo"),
        Line::from(lesson.objective().to_string()),
        Line::from(""),
        section("Materiais"),
    ];
    lines.extend(
        lesson
            .materials()
            .iter()
            .map(|item| Line::from(format!("  • {item}"))),
    );
    lines.push(Line::from(""));
    lines.push(section("Passo a passo"));
    lines.extend(
        lesson
            .steps()
            .iter()
            .enumerate()
            .map(|(i, step)| Line::from(format!("  {}. {step}", i + 1))),
    );
    lines.push(Line::from(""));
    lines.push(section("Dica da Pedagoga"));
    lines.push(Line::from(Span::styled(
        lesson.tips().to_string(),
        Style::default().add_modifier(Modifier::ITALIC),
    )));
    lines
}

fn failure_lines(notice: &FailureNotice) -> Vec<Line<'static>> {
    let color = match notice.kind {
        FailureKind::Configuration => Color::Red,
        FailureKind::Transient => Color::LightRed,
    };
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", notice.message),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ];
    if let Some(hint) = &notice.hint {
        lines.push(Line::from(Span::styled(
            format!("  {hint}"),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

fn render_help(f: &mut Frame, area: Rect) {
    let heading = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("  Formulário", heading)),
        Line::from("    Tab/Shift-Tab   Próximo / anterior campo"),
        Line::from("    ←/→ ↑/↓         Mudar faixa etária"),
        Line::from("    Enter           Gerar ideia"),
        Line::from(""),
        Line::from(Span::styled("  Outros", heading)),
        Line::from("    Esc             Cancelar geração / sair"),
        Line::from("    Ctrl-C          Sair"),
        Line::from("    F1              Mostrar esta ajuda"),
        Line::from(""),
    ];

    let help = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Ajuda "));
    f.render_widget(help, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let view_name = match app.current_view {
        View::Demo => "Demo",
        View::Help => "Ajuda",
    };

    let status_msg = app.status_message.as_deref().unwrap_or("");

    let bar = Line::from(vec![
        Span::styled(
            format!(" {view_name} "),
            Style::default().bg(Color::Blue).fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(status_msg, Style::default().fg(Color::Green)),
        Span::raw("  Enter:gerar  Esc:sair  F1:ajuda"),
    ]);

    f.render_widget(Paragraph::new(bar), area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ludica_core::model::ModelError;
    use ludica_core::{GenerateError, LessonGenerator};
    use ludica_test_utils::{SAMPLE_LESSON_JSON, ScriptedModel, StaticCredentials};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        App::new(LessonGenerator::new(
            ScriptedModel::text(SAMPLE_LESSON_JSON),
            StaticCredentials::present("k"),
        ))
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn idle_screen_shows_form_and_intro() {
        let screen = draw(&app());
        assert!(screen.contains("EducaLúdica"), "{screen}");
        assert!(screen.contains("Tema"));
        assert!(screen.contains("Maternal (2-3 anos)"));
        assert!(screen.contains("Gerar Ideia"));
        assert!(screen.contains("pressione Enter"));
    }

    #[test]
    fn loading_screen_shows_progress() {
        let mut app = app();
        app.session.theme_input = "Primavera".into();
        app.session.begin().unwrap();
        let screen = draw(&app);
        assert!(screen.contains("Criando..."), "{screen}");
        assert!(screen.contains("Criando uma ideia para"));
    }

    #[test]
    fn success_screen_shows_lesson_sections() {
        let mut app = app();
        app.session.theme_input = "Primavera".into();
        let pending = app.session.begin().unwrap();
        let lesson = ludica_core::lesson::parse_lesson(SAMPLE_LESSON_JSON).unwrap();
        app.session.complete(pending.ticket, Ok(lesson));

        let screen = draw(&app);
        assert!(screen.contains("Jardim das Cores"), "{screen}");
        assert!(screen.contains("Materiais"));
        assert!(screen.contains("• Flores variadas"));
        assert!(screen.contains("1. Leve as crianças"));
        assert!(screen.contains("Dica da Pedagoga"));
    }

    #[test]
    fn failure_screen_shows_message() {
        let mut app = app();
        app.session.theme_input = "Primavera".into();
        let pending = app.session.begin().unwrap();
        let err: GenerateError = ModelError::Other("down".into()).into();
        app.session.complete(pending.ticket, Err(err));

        let screen = draw(&app);
        assert!(screen.contains("Ops! Não consegui criar a ideia agora."), "{screen}");
        assert!(!screen.contains("Jardim das Cores"));
    }

    #[test]
    fn help_view_lists_keys() {
        let mut app = app();
        app.current_view = View::Help;
        let screen = draw(&app);
        assert!(screen.contains("Ajuda"), "{screen}");
        assert!(screen.contains("Ctrl-C"));
    }
}
