use ratatui::style::{Color, Style};

pub const LABEL: Style = Style::new().fg(Color::Blue);
pub const SEPARATOR: Style = Style::new().fg(Color::DarkGray);
pub const VALUE: Style = Style::new().fg(Color::Green);
