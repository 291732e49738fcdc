//! Terminal setup and the dashboard event loop.

use std::{
    io::{self, Stdout},
    time::Duration,
};

use anyhow::Result;
use crossterm::{
    cursor,
    event::{Event, EventStream, KeyCode, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use tokio::{sync::mpsc, time::MissedTickBehavior};

use nowcast_core::{
    Animator, App, Command, Config, Msg, ParticleField, Services,
    particles::ShapeBuffer,
};

use crate::screen::{CELL_HEIGHT, CELL_WIDTH, Mode, Overlay, Screen, render};

/// What a key press asks the loop to do.
#[derive(Debug)]
enum Action {
    Quit,
    Send(Msg),
    Switch(Mode, Option<Msg>),
    Nothing,
}

pub async fn run(config: Config) -> Result<()> {
    let services = Services::from_config(&config)?;
    let field = ParticleField::new(config.animation.particles, 0.0, 0.0).shared();
    let app = App::new(config.unit, field);

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, app, services, config.animation.frame_interval()).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut app: App,
    services: Services,
    frame: Duration,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut screen = Screen::default();
    let mut mode = Mode::Normal;
    let mut shapes = ShapeBuffer::default();
    let mut particle_area = Rect::default();

    let dispatch = |commands: Vec<Command>| {
        for command in commands {
            services.dispatch(command, &tx);
        }
    };

    dispatch(app.start(&mut screen));
    let animator = Animator::start(app.field().clone(), frame);

    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(frame);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        app.field().lock().draw(&mut shapes);
        let overlay = Overlay {
            mode,
            query: app.search().input(),
            selected: app.search().selected(),
        };
        let mut drawn = particle_area;
        terminal.draw(|f| drawn = render(f, &screen, overlay, &shapes))?;

        if drawn != particle_area {
            particle_area = drawn;
            let resize = Msg::Resize {
                width: f64::from(drawn.width) * CELL_WIDTH,
                height: f64::from(drawn.height) * CELL_HEIGHT,
            };
            dispatch(app.update(resize, &mut screen));
        }

        tokio::select! {
            Some(msg) = rx.recv() => dispatch(app.update(msg, &mut screen)),
            _ = ticker.tick() => {}
            event = events.next() => {
                let key = match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => key,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                };

                let has_suggestions = !screen.suggestions().is_empty();
                match handle_key(mode, key.code, &app, has_suggestions) {
                    Action::Quit => break,
                    Action::Send(msg) => dispatch(app.update(msg, &mut screen)),
                    Action::Switch(next, msg) => {
                        mode = next;
                        if let Some(msg) = msg {
                            dispatch(app.update(msg, &mut screen));
                        }
                    }
                    Action::Nothing => {}
                }
            }
        }
    }

    let frames = animator.stop().await;
    tracing::debug!("Dashboard closed after {frames} animation frames");
    Ok(())
}

fn handle_key(mode: Mode, code: KeyCode, app: &App, has_suggestions: bool) -> Action {
    match mode {
        Mode::Normal => match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('u') | KeyCode::Char('U') => Action::Send(Msg::ToggleUnit),
            KeyCode::Char('r') | KeyCode::Char('R') => Action::Send(Msg::Retry),
            KeyCode::Char('/') => Action::Switch(Mode::Search, None),
            _ => Action::Nothing,
        },
        Mode::Search => match code {
            KeyCode::Esc => Action::Switch(Mode::Normal, Some(Msg::SearchInput(String::new()))),
            KeyCode::Enter if has_suggestions => Action::Switch(
                Mode::Normal,
                Some(Msg::SelectSuggestion(app.search().selected())),
            ),
            KeyCode::Up => Action::Send(Msg::MoveSelection(-1)),
            KeyCode::Down => Action::Send(Msg::MoveSelection(1)),
            KeyCode::Backspace => {
                let mut input = app.search().input().to_string();
                input.pop();
                Action::Send(Msg::SearchInput(input))
            }
            KeyCode::Char(c) => {
                let mut input = app.search().input().to_string();
                input.push(c);
                Action::Send(Msg::SearchInput(input))
            }
            _ => Action::Nothing,
        },
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode()?;
    let mut out = io::stdout();
    execute!(out, EnterAlternateScreen, cursor::Hide)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(term: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut out = io::stdout();
    execute!(out, cursor::Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    term.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nowcast_core::UnitPreference;

    fn app() -> App {
        App::new(UnitPreference::Celsius, ParticleField::seeded(0, 0.0, 0.0, 1).shared())
    }

    #[test]
    fn normal_mode_keys() {
        let app = app();
        assert!(matches!(handle_key(Mode::Normal, KeyCode::Char('q'), &app, false), Action::Quit));
        assert!(matches!(
            handle_key(Mode::Normal, KeyCode::Char('u'), &app, false),
            Action::Send(Msg::ToggleUnit)
        ));
        assert!(matches!(
            handle_key(Mode::Normal, KeyCode::Char('r'), &app, false),
            Action::Send(Msg::Retry)
        ));
        assert!(matches!(
            handle_key(Mode::Normal, KeyCode::Char('/'), &app, false),
            Action::Switch(Mode::Search, None)
        ));
    }

    #[test]
    fn typing_extends_the_search_input() {
        let mut app = app();
        let mut screen = Screen::default();
        app.update(Msg::SearchInput("Pa".into()), &mut screen);

        let Action::Send(Msg::SearchInput(text)) =
            handle_key(Mode::Search, KeyCode::Char('r'), &app, false)
        else {
            panic!("expected search input");
        };
        assert_eq!(text, "Par");

        let Action::Send(Msg::SearchInput(text)) =
            handle_key(Mode::Search, KeyCode::Backspace, &app, false)
        else {
            panic!("expected search input");
        };
        assert_eq!(text, "P");
    }

    #[test]
    fn enter_needs_suggestions_and_escape_clears() {
        let app = app();
        assert!(matches!(handle_key(Mode::Search, KeyCode::Enter, &app, false), Action::Nothing));
        assert!(matches!(
            handle_key(Mode::Search, KeyCode::Enter, &app, true),
            Action::Switch(Mode::Normal, Some(Msg::SelectSuggestion(0)))
        ));
        assert!(matches!(
            handle_key(Mode::Search, KeyCode::Esc, &app, true),
            Action::Switch(Mode::Normal, Some(Msg::SearchInput(ref s))) if s.is_empty()
        ));
    }
}
