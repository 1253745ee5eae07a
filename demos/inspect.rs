use crossterm::event::{Event, KeyCode, MouseEventKind};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Scrollbar, ScrollbarOrientation};
use ratatui::Terminal;

use ktx2_tree::{
    ByteRange, Container, Document, Image, LevelIndex, MetadataValue, RecordTreeView,
    SupercompressionScheme, VkFormat,
};

/// Cubemap with a full mip chain, faces filled with their index.
fn cubemap() -> Container {
    let size = 64_u32;
    let level_count = size.ilog2() + 1;
    let mut levels = Vec::new();
    let mut images = Vec::new();
    let mut offset = 0;
    for level in 0..level_count {
        let extent = (size >> level).max(1);
        let face_bytes = u64::from(extent * extent * 4);
        levels.push(LevelIndex {
            byte_offset: offset,
            byte_length: face_bytes * 6,
            uncompressed_byte_length: face_bytes * 6,
        });
        offset += face_bytes * 6;
        for face in 0..6_u8 {
            images.push(Image::new(
                extent,
                extent,
                vec![face; usize::try_from(face_bytes).unwrap_or_default()],
            ));
        }
    }
    Container::new(VkFormat::R8G8B8A8_SRGB)
        .with_size(size, size, 0)
        .with_counts(0, 6, level_count)
        .with_blocks(
            ByteRange::new(104, 92),
            ByteRange::new(196, 64),
            ByteRange::new(0, 0),
        )
        .with_levels(levels)
        .with_key_value("KTXorientation", MetadataValue::from_bytes(b"rd\0"))
        .with_key_value("KTXwriter", MetadataValue::from_bytes(b"ktx2-tree demo\0"))
        .with_images(images)
}

/// Texture array whose payload list is one image short, selecting the last layer shows the error.
fn truncated_array() -> Container {
    let images = (0..3).map(|_| Image::new(16, 16, vec![0; 256])).collect();
    Container::new(VkFormat::BC7_UNORM_BLOCK)
        .with_type_size(1)
        .with_size(16, 16, 0)
        .with_counts(4, 1, 1)
        .with_supercompression(SupercompressionScheme::Zstandard)
        .with_levels(vec![LevelIndex {
            byte_offset: 320,
            byte_length: 600,
            uncompressed_byte_length: 1024,
        }])
        .with_images(images)
}

struct App {
    document: Document,
    showing_cubemap: bool,
}

impl App {
    fn new() -> Self {
        Self {
            document: Document::open(cubemap()),
            showing_cubemap: true,
        }
    }

    fn switch_document(&mut self) {
        self.showing_cubemap = !self.showing_cubemap;
        let container = if self.showing_cubemap {
            cubemap()
        } else {
            truncated_array()
        };
        self.document = Document::open(container);
    }

    fn status(&self) -> String {
        match self.document.selected_image() {
            Ok(Some(image)) => format!(
                "{:?} {}x{} ({} bytes)",
                self.document.selected_address().unwrap_or_default(),
                image.pixel_width,
                image.pixel_height,
                image.data.len()
            ),
            Ok(None) => "no image".to_owned(),
            Err(err) => err.to_string(),
        }
    }
}

fn main() -> std::io::Result<()> {
    // Terminal initialization
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // App
    let app = App::new();
    let res = run_app(&mut terminal, app);

    // restore terminal
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> std::io::Result<()> {
    loop {
        let status = app.status();
        terminal.draw(|frame| {
            let area = frame.size();
            let (index, state) = app.document.parts_mut();
            let widget = RecordTreeView::new(index)
                .block(
                    Block::bordered()
                        .title("KTX2 (n: next document)")
                        .title_bottom(status),
                )
                .experimental_scrollbar(Some(
                    Scrollbar::new(ScrollbarOrientation::VerticalRight)
                        .begin_symbol(None)
                        .track_symbol(None)
                        .end_symbol(None),
                ))
                .highlight_style(
                    Style::new()
                        .fg(Color::Black)
                        .bg(Color::LightGreen)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol(">> ");
            frame.render_stateful_widget(widget, area, state);
        })?;

        let (index, state) = app.document.parts_mut();
        match crossterm::event::read()? {
            Event::Key(key) => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('n') => app.switch_document(),
                KeyCode::Char('\n' | ' ') => {
                    state.toggle_selected();
                }
                KeyCode::Left => {
                    state.key_left(index);
                }
                KeyCode::Right => {
                    state.key_right(index);
                }
                KeyCode::Down => {
                    state.key_down(index);
                }
                KeyCode::Up => {
                    state.key_up(index);
                }
                KeyCode::Home => {
                    state.select_first(index);
                }
                KeyCode::End => {
                    state.select_last(index);
                }
                KeyCode::PageDown => {
                    state.scroll_down(3);
                }
                KeyCode::PageUp => {
                    state.scroll_up(3);
                }
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => {
                    state.scroll_down(1);
                }
                MouseEventKind::ScrollUp => {
                    state.scroll_up(1);
                }
                _ => {}
            },
            _ => {}
        }
    }
}
