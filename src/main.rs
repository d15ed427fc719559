mod app;
mod braille;
mod data;
mod event_log;
mod filter;
mod map;
mod ui;

use anyhow::Result;
use app::App;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::path::Path;
use std::time::Duration;

fn main() -> Result<()> {
    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn run(terminal: &mut DefaultTerminal) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize);

    match data::load_dams(Path::new(data::DATA_PATH)) {
        Ok(dataset) => {
            app.attach(dataset);
            // Paint one frame before the CPU-bound index build so the
            // markers show up ahead of it instead of a blank screen
            terminal.draw(|frame| ui::render(frame, &app))?;
            app.build_index();
        }
        // Fatal to initialization: log it and leave the session in the
        // loading state with an empty map
        Err(err) => app.fail_load(&err),
    }

    // Main loop
    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read() {
                Ok(Event::Key(key)) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        handle_key(&mut app, key.code);
                    }
                }
                Ok(Event::Mouse(mouse)) => handle_mouse(&mut app, mouse),
                Ok(Event::Resize(width, height)) => {
                    app.resize(width as usize, height as usize);
                }
                Ok(_) => {}
                // Log and continue; the session keeps whatever state it has
                Err(err) => app.report_fault(&err),
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => {
            if app.popup.is_some() {
                app.close_popup();
            } else {
                app.quit();
            }
        }

        // Pan with arrow keys or h/l
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up => app.pan(0, -6),
        KeyCode::Down => app.pan(0, 6),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        // Sidebar selection and checkbox toggling
        KeyCode::Char('j') => app.sidebar.select_next(),
        KeyCode::Char('k') => app.sidebar.select_prev(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(),

        // Reset view
        KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

        _ => {}
    }
}

/// Handle mouse events for panning, zooming, and marker popups
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for the coordinate readout
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel zooms towards the cursor
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll pans (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Click opens a marker popup, or starts a drag on open water
        MouseEventKind::Down(MouseButton::Left) => {
            app.click(mouse.column, mouse.row);
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
        }
        _ => {}
    }
}
