use crate::app::{App, Phase};
use crate::filter::SidebarRow;
use crate::map::{render_markers, MarkerLayer};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

/// Character width of the filter sidebar.
pub const SIDEBAR_WIDTH: u16 = 34;
/// Character height of the log pane, border included.
pub const LOG_HEIGHT: u16 = 8;

/// Braille pixel dimensions of the map canvas for a terminal size.
/// Accounts for the sidebar, the map border, the status bar, and the
/// log pane; one cell is 2x4 braille pixels.
pub fn map_pixel_size(width: usize, height: usize) -> (usize, usize) {
    let inner_width = width.saturating_sub(SIDEBAR_WIDTH as usize + 2);
    let inner_height = height.saturating_sub(LOG_HEIGHT as usize + 3);
    (inner_width * 2, inner_height * 4)
}

/// Map a terminal cell to braille pixel coordinates on the map canvas.
/// Returns `None` for cells left of or above the map area.
pub fn terminal_to_map_px(col: u16, row: u16) -> Option<(i32, i32)> {
    let x0 = SIDEBAR_WIDTH + 1; // sidebar + map border
    let y0 = 1;
    if col < x0 || row < y0 {
        return None;
    }
    Some((((col - x0) as i32) * 2, ((row - y0) as i32) * 4))
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(frame.area());

    render_sidebar(frame, app, columns[0]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),              // Map
            Constraint::Length(1),           // Status bar
            Constraint::Length(LOG_HEIGHT),  // Log pane
        ])
        .split(columns[1]);

    render_map(frame, app, rows[0]);
    render_status_bar(frame, app, rows[1]);
    render_log(frame, app, rows[2]);

    if let Some(id) = app.popup {
        render_popup(frame, app, id, rows[0]);
    }
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Filters ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.phase != Phase::Ready {
        frame.render_widget(Paragraph::new("Loading..."), inner);
        return;
    }

    let selected = app.sidebar.selected();
    let lines: Vec<Line> = app
        .sidebar
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| match row {
            SidebarRow::Header { key, distinct } => Line::from(Span::styled(
                format!("{key} ({distinct})"),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            SidebarRow::Checkbox {
                value,
                size,
                checked,
                ..
            } => {
                let mark = if *checked { "[x]" } else { "[ ]" };
                let mut style = Style::default().fg(if *checked {
                    Color::White
                } else {
                    Color::DarkGray
                });
                if selected == Some(i) {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Line::from(Span::styled(format!(" {mark} {value} ({size})"), style))
            }
        })
        .collect();

    // Keep the selected checkbox scrolled into view
    let visible = inner.height as usize;
    let scroll = selected
        .filter(|&sel| sel + 1 > visible)
        .map(|sel| (sel + 1 - visible) as u16)
        .unwrap_or(0);

    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.collection_name {
        Some(name) => format!(" {name} "),
        None => " Dam Map ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Size the viewport for this frame's inner area
    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layer = render_markers(
        &app.records,
        &app.visibility,
        &viewport,
        app.popup,
        inner.width as usize,
        inner.height as usize,
    );

    let cursor_pos = app.mouse_pos.and_then(|(col, row)| {
        terminal_to_map_px(col, row).and_then(|(px, py)| {
            let cx = (px / 2) as u16;
            let cy = (py / 4) as u16;
            (cx < inner.width && cy < inner.height).then_some((cx, cy))
        })
    });

    frame.render_widget(MapWidget { layer, cursor_pos }, inner);
}

/// Widget painting the braille marker canvas with glyph overlays.
struct MapWidget {
    layer: MarkerLayer,
    cursor_pos: Option<(u16, u16)>,
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (row_idx, row_str) in self.layer.canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;
            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(Color::Cyan);
            }
        }

        for &(gx, gy, glyph) in &self.layer.glyphs {
            if gx < area.width && gy < area.height {
                buf[(area.x + gx, area.y + gy)]
                    .set_char(glyph)
                    .set_fg(Color::Magenta);
            }
        }

        if let Some((cx, cy)) = self.cursor_pos {
            if cx < area.width && cy < area.height {
                buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (lat, lng) = app.readout_latlng();

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | LatLng: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("({lat:.5}, {lng:.5})"),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.count_text(), Style::default().fg(Color::Green)),
        Span::styled(
            " | arrows:pan +/-:zoom j/k:select space:toggle r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

fn render_log(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(" Log ", Style::default().fg(Color::Cyan)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = app
        .log
        .tail(inner.height as usize)
        .iter()
        .map(|msg| {
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::DarkGray)),
                Span::raw(msg.as_str()),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Read-only property popup for one marker, centered over the map.
fn render_popup(frame: &mut Frame, app: &App, id: usize, map_area: Rect) {
    let Some(record) = app.records.get(id) else {
        return;
    };

    let width = 48.min(map_area.width.saturating_sub(4));
    let height = (record.property_count() as u16 + 2).min(map_area.height.saturating_sub(2));
    if width < 8 || height < 3 {
        return;
    }
    let popup_area = Rect {
        x: map_area.x + (map_area.width - width) / 2,
        y: map_area.y + (map_area.height - height) / 2,
        width,
        height,
    };

    let lines: Vec<Line> = record
        .properties()
        .map(|(key, value)| {
            Line::from(vec![
                Span::styled(format!("{key}: "), Style::default().fg(Color::DarkGray)),
                Span::raw(value),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(Span::styled(
            format!(" {} ", record.name()),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_pixel_size_accounts_for_chrome() {
        let (w, h) = map_pixel_size(120, 40);
        assert_eq!(w, (120 - SIDEBAR_WIDTH as usize - 2) * 2);
        assert_eq!(h, (40 - LOG_HEIGHT as usize - 3) * 4);
    }

    #[test]
    fn cells_over_the_sidebar_do_not_map() {
        assert_eq!(terminal_to_map_px(0, 5), None);
        assert_eq!(terminal_to_map_px(SIDEBAR_WIDTH, 5), None);
        assert_eq!(terminal_to_map_px(SIDEBAR_WIDTH + 1, 1), Some((0, 0)));
        assert_eq!(terminal_to_map_px(SIDEBAR_WIDTH + 3, 2), Some((4, 4)));
    }
}
