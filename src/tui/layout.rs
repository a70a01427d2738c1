use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Smallest terminal the full interface is drawn in
pub const MIN_WIDTH: u16 = 50;
pub const MIN_HEIGHT: u16 = 12;

/// Screen regions for one frame
pub struct AppLayout {
    pub tabs_area: Rect,
    pub main_area: Rect,
    pub side_area: Rect,
    pub progress_area: Option<Rect>,
    pub status_area: Rect,
}

impl AppLayout {
    /// - Tab bar: 3 rows (bordered) at the top
    /// - Form or history list: 60% width (left)
    /// - Result / details pane: 40% width (right)
    /// - Progress row while a conversion runs
    /// - Status bar: bottom row
    pub fn new(area: Rect, show_progress: bool) -> Self {
        let progress_rows = if show_progress { 1 } else { 0 };
        let vertical_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(progress_rows),
                Constraint::Length(1),
            ])
            .split(area);

        let horizontal_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(vertical_chunks[1]);

        Self {
            tabs_area: vertical_chunks[0],
            main_area: horizontal_chunks[0],
            side_area: horizontal_chunks[1],
            progress_area: show_progress.then_some(vertical_chunks[2]),
            status_area: vertical_chunks[3],
        }
    }

    pub fn fits(area: Rect) -> bool {
        area.width >= MIN_WIDTH && area.height >= MIN_HEIGHT
    }
}

/// Rectangle of `percent_x` by `percent_y` centered in `area`.
pub fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
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
