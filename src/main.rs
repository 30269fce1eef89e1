mod app;
mod config;
mod event;
mod game;
mod store;

use std::io;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Gauge, Paragraph};

use app::{App, AppScreen};
use event::{AppEvent, EventHandler};
use game::question::{ALL_DIFFICULTIES, ALL_OPERATIONS, Difficulty, Operation};
use game::round::{Phase, Verdict};

#[derive(Parser)]
#[command(
    name = "mathdr",
    version,
    about = "Terminal arithmetic drill with timed scoring"
)]
struct Cli {
    #[arg(
        short,
        long,
        help = "Operation to practice (addition, subtraction, multiplication, division)"
    )]
    operation: Option<String>,

    #[arg(short, long, help = "Difficulty tier (easy, medium, hard)")]
    difficulty: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut app = App::new();
    if let Some(operation) = cli.operation.as_deref().and_then(Operation::parse) {
        app.settings.operation = operation;
    }
    if let Some(difficulty) = cli.difficulty.as_deref().and_then(Difficulty::parse) {
        app.settings.difficulty = difficulty;
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new();

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Only Press events count as input; Repeat would inflate digit entry.
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Game => handle_game_key(app, key),
        AppScreen::Results => handle_results_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('1') => app.start_game(Operation::Addition),
        KeyCode::Char('2') => app.start_game(Operation::Subtraction),
        KeyCode::Char('3') => app.start_game(Operation::Multiplication),
        KeyCode::Char('4') => app.start_game(Operation::Division),
        KeyCode::Char('s') => app.go_to_settings(),
        _ => {}
    }
}

fn handle_game_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.abandon_game();
        return;
    }
    let Some(ref mut engine) = app.engine else {
        return;
    };
    match key.code {
        KeyCode::Backspace => engine.press_backspace(),
        KeyCode::Enter => engine.submit(Instant::now()),
        KeyCode::Char(ch) if ch.is_ascii_digit() => engine.press_digit(ch, Instant::now()),
        _ => {}
    }
}

fn handle_results_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.replay(),
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => app.go_to_menu(),
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.screen = AppScreen::Menu,
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.settings_selected = (app.settings_selected + 1).min(ALL_DIFFICULTIES.len() - 1);
        }
        KeyCode::Enter => {
            app.select_difficulty(ALL_DIFFICULTIES[app.settings_selected]);
            app.screen = AppScreen::Menu;
        }
        KeyCode::Char(ch @ '1'..='3') => {
            let idx = ch as usize - '1' as usize;
            app.settings_selected = idx;
            app.select_difficulty(ALL_DIFFICULTIES[idx]);
            app.screen = AppScreen::Menu;
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Game => render_game(frame, app),
        AppScreen::Results => render_results(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let difficulty = app.settings.difficulty;
    let (min, max) = difficulty.operand_range();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " mathdr ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " Difficulty: {} (numbers {min}-{max})",
            difficulty.label()
        )),
    ]));
    frame.render_widget(header, layout[0]);

    let mut lines = vec![
        Line::from(Span::styled(
            "Choose an operation to practice",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
    ];
    for (i, operation) in ALL_OPERATIONS.into_iter().enumerate() {
        let best = app.ledger.get(difficulty, operation);
        let record = if best.games_played > 0 {
            format!(
                "best {} pts, streak {}, played {}",
                best.highest_score, best.highest_streak, best.games_played
            )
        } else {
            "not played yet".to_string()
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!(" [{}] {:<15} {} ", i + 1, operation.label(), operation.symbol()),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(record, Style::default().fg(Color::DarkGray)),
        ]));
        lines.push(Line::raw(""));
    }

    let menu_area = centered_rect(60, 70, layout[1]);
    frame.render_widget(Paragraph::new(lines), menu_area);

    let footer_text = if app.ledger.is_persistent() {
        " [1-4] Start  [s] Difficulty  [q] Quit "
    } else {
        " [1-4] Start  [s] Difficulty  [q] Quit  (stats storage unavailable) "
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        footer_text,
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, layout[2]);
}

fn render_game(frame: &mut ratatui::Frame, app: &App) {
    let Some(ref engine) = app.engine else {
        return;
    };
    let now = Instant::now();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(7),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(Span::styled(
        format!(
            " Score {} | Streak {} | Question {}",
            engine.score(),
            engine.streak(),
            engine.questions_resolved() + 1
        ),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(header, layout[0]);

    // Countdown: green for the first half of the limit, yellow after.
    let limit = engine.time_limit();
    let remaining = engine.time_remaining(now);
    let ratio = remaining.as_secs_f64() / limit.as_secs_f64();
    let color = if ratio > 0.5 {
        Color::Green
    } else {
        Color::Yellow
    };
    let label = if engine.timer_active() {
        format!("{:.1}s", remaining.as_secs_f64())
    } else if matches!(engine.phase(), Phase::AwaitingInput) {
        "time!".to_string()
    } else {
        String::new()
    };
    let gauge = Gauge::default()
        .block(Block::bordered().title(" Time "))
        .gauge_style(Style::default().fg(color))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, layout[1]);

    let entered = if engine.entered().is_empty() {
        "_".to_string()
    } else {
        engine.entered().to_string()
    };
    let mut lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            engine.question().display(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(Span::styled(
            format!("> {entered}"),
            Style::default().fg(Color::Cyan),
        )),
        Line::raw(""),
    ];
    match engine.phase() {
        Phase::Feedback {
            verdict: Verdict::Correct { points },
            ..
        } => {
            let text = if points > 0 {
                format!("Correct! +{points}")
            } else {
                "Correct!".to_string()
            };
            lines.push(Line::from(Span::styled(
                text,
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        Phase::Feedback {
            verdict: Verdict::Incorrect,
            ..
        } => {
            lines.push(Line::from(Span::styled(
                "Wrong! Try again",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
        }
        _ if engine.has_retried() => {
            lines.push(Line::from(Span::styled(
                "retry - no points for this one",
                Style::default().fg(Color::DarkGray),
            )));
        }
        _ => lines.push(Line::raw("")),
    }

    let question_area = centered_rect(60, 80, layout[2]);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        question_area,
    );

    let footer = Paragraph::new(Line::from(Span::styled(
        " [0-9] Answer  [Enter] Submit  [Backspace] Delete  [Esc] End game ",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, layout[3]);
}

fn render_results(frame: &mut ratatui::Frame, app: &App) {
    let summary = app.last_summary.unwrap_or_default();

    let mut lines = vec![
        Line::from(Span::styled(
            format!("You scored {} points!", summary.score),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw(format!("{}% - {}", summary.percentage(), summary.message())),
        Line::raw(""),
    ];
    if summary.max_streak >= 5 {
        lines.push(Line::from(Span::styled(
            format!("Best streak: {} in a row!", summary.max_streak),
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::raw(""));
    }
    lines.push(Line::raw(format!(
        "Operation: {}   Difficulty: {}",
        summary.operation.label(),
        summary.difficulty.label()
    )));
    lines.push(Line::raw(""));
    if app.is_new_best() {
        lines.push(Line::from(Span::styled(
            "New high score!",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
    } else if let Some(best) = app.previous_best {
        if best.games_played > 0 {
            lines.push(Line::from(Span::styled(
                format!("Best so far: {} pts", best.highest_score),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "[r] Play again  [q] Home",
        Style::default().fg(Color::DarkGray),
    )));

    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Choose difficulty",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
    ];
    for (i, difficulty) in ALL_DIFFICULTIES.into_iter().enumerate() {
        let selected = i == app.settings_selected;
        let indicator = if selected { " > " } else { "   " };
        let (min, max) = difficulty.operand_range();
        let seconds = difficulty.answer_time_limit_ms() / 1000;
        let style = if selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!(
                "{indicator}{:<8} numbers {min}-{max}, {seconds}s per question",
                difficulty.label()
            ),
            style,
        )));
        lines.push(Line::raw(""));
    }
    lines.push(Line::from(Span::styled(
        "[Enter] Select  [Esc] Back",
        Style::default().fg(Color::DarkGray),
    )));

    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Paragraph::new(lines), area);
}

/// Centered sub-rectangle sized as a percentage of `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
