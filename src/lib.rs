#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]

/*!
Inspect KTX2 texture containers as a tree.

A parsed [`Container`] is turned into an immutable [`RecordTree`] once.
The [`TreeIndex`] wraps it for row based access like a tree view needs it and
[`resolve`] maps a selected depth slice back to the image it denotes.

[`RecordTreeView`] renders the tree with ratatui, the user interaction state is stored in the [`TreeState`].
*/

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Scrollbar, ScrollbarState, StatefulWidget, Widget};
use unicode_width::UnicodeWidthStr;

mod container;
mod dimensions;
mod document;
mod error;
mod flatten;
mod index;
#[cfg(feature = "json")]
mod json;
mod record;
mod select;
mod style;
mod tree_state;

pub use crate::container::{
    ByteRange, Container, Image, LevelIndex, MetadataValue, SupercompressionScheme, VkFormat,
};
pub use crate::dimensions::{ImageAddress, ImageDimensions};
pub use crate::document::Document;
pub use crate::error::{Error, Result};
pub use crate::flatten::Flattened;
pub use crate::index::TreeIndex;
pub use crate::record::{Node, NodeId, NodeKind, RecordTree, Value};
pub use crate::select::{image_index, resolve, selected_image};
pub use crate::tree_state::TreeState;

/// A view of a [`TreeIndex`] which can be rendered.
///
/// Every row shows the name and the value column of its node.
///
/// # Example
///
/// ```
/// # use ktx2_tree::{Container, RecordTree, RecordTreeView, TreeIndex, TreeState, VkFormat};
/// # use ratatui::backend::TestBackend;
/// # use ratatui::Terminal;
/// # use ratatui::widgets::Block;
/// # let mut terminal = Terminal::new(TestBackend::new(32, 32)).unwrap();
/// let mut state = TreeState::default();
///
/// let container = Container::new(VkFormat::R8G8B8A8_SRGB).with_size(256, 256, 0);
/// let index = TreeIndex::new(RecordTree::build(&container));
///
/// terminal.draw(|frame| {
///     let area = frame.size();
///
///     let tree_widget = RecordTreeView::new(&index)
///         .block(Block::bordered().title("KTX2"));
///
///     frame.render_stateful_widget(tree_widget, area, &mut state);
/// })?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct RecordTreeView<'a> {
    index: &'a TreeIndex,

    block: Option<Block<'a>>,
    scrollbar: Option<Scrollbar<'a>>,
    /// Style used as a base style for the widget
    style: Style,

    label_style: Style,
    value_style: Style,
    separator_style: Style,
    /// Between the name and the value column
    separator: &'a str,

    /// Style used to render selected item
    highlight_style: Style,
    /// Symbol in front of the selected item (Shift all items to the right)
    highlight_symbol: &'a str,

    /// Symbol displayed in front of a closed node (As in the children are currently not visible)
    node_closed_symbol: &'a str,
    /// Symbol displayed in front of an open node. (As in the children are currently visible)
    node_open_symbol: &'a str,
    /// Symbol displayed in front of a node without children.
    node_no_children_symbol: &'a str,
}

impl<'a> RecordTreeView<'a> {
    #[must_use]
    pub const fn new(index: &'a TreeIndex) -> Self {
        Self {
            index,
            block: None,
            scrollbar: None,
            style: Style::new(),
            label_style: style::LABEL,
            value_style: style::VALUE,
            separator_style: style::SEPARATOR,
            separator: ": ",
            highlight_style: Style::new(),
            highlight_symbol: "",
            node_closed_symbol: "\u{25b6} ", // Arrow to right
            node_open_symbol: "\u{25bc} ",   // Arrow down
            node_no_children_symbol: "  ",
        }
    }

    #[allow(clippy::missing_const_for_fn)]
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Show the scrollbar when rendering this widget.
    ///
    /// Experimental: Can change on any release without any additional notice.
    #[must_use]
    pub const fn experimental_scrollbar(mut self, scrollbar: Option<Scrollbar<'a>>) -> Self {
        self.scrollbar = scrollbar;
        self
    }

    #[must_use]
    pub const fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub const fn label_style(mut self, style: Style) -> Self {
        self.label_style = style;
        self
    }

    #[must_use]
    pub const fn value_style(mut self, style: Style) -> Self {
        self.value_style = style;
        self
    }

    #[must_use]
    pub const fn separator(mut self, separator: &'a str, style: Style) -> Self {
        self.separator = separator;
        self.separator_style = style;
        self
    }

    #[must_use]
    pub const fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self
    }

    #[must_use]
    pub const fn highlight_symbol(mut self, highlight_symbol: &'a str) -> Self {
        self.highlight_symbol = highlight_symbol;
        self
    }

    #[must_use]
    pub const fn node_closed_symbol(mut self, symbol: &'a str) -> Self {
        self.node_closed_symbol = symbol;
        self
    }

    #[must_use]
    pub const fn node_open_symbol(mut self, symbol: &'a str) -> Self {
        self.node_open_symbol = symbol;
        self
    }

    #[must_use]
    pub const fn node_no_children_symbol(mut self, symbol: &'a str) -> Self {
        self.node_no_children_symbol = symbol;
        self
    }

    /// Name and value cells of the node as one line.
    fn line(&self, node: NodeId) -> Line<'a> {
        let label = self.index.cell_value(node, 0).unwrap_or_default();
        let value = self.index.cell_value(node, 1).unwrap_or_default();
        let mut spans = vec![Span::styled(label, self.label_style)];
        if !value.is_empty() {
            spans.push(Span::styled(self.separator, self.separator_style));
            spans.push(Span::styled(value.into_owned(), self.value_style));
        }
        Line::from(spans)
    }
}

impl<'a> StatefulWidget for RecordTreeView<'a> {
    type State = TreeState;

    #[allow(clippy::too_many_lines)]
    fn render(self, full_area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        buf.set_style(full_area, self.style);

        // Get the inner area inside a possible block, otherwise use the full area
        let area = self.block.as_ref().map_or(full_area, |block| {
            let inner_area = block.inner(full_area);
            block.clone().render(full_area, buf);
            inner_area
        });

        if area.width < 1 || area.height < 1 {
            return;
        }

        let visible = state.flatten(self.index);
        if visible.is_empty() {
            return;
        }
        let available_height = area.height as usize;

        let ensure_index_in_view = if state.ensure_selected_in_view_on_next_render {
            state.selected.and_then(|selected| {
                visible
                    .iter()
                    .position(|flattened| flattened.node == selected)
            })
        } else {
            None
        };

        // Ensure last line is still visible
        let mut start = state.offset.min(visible.len().saturating_sub(1));

        if let Some(ensure_index_in_view) = ensure_index_in_view {
            start = start.min(ensure_index_in_view);
        }

        // Every row is exactly one line high
        let end = (start + available_height).min(visible.len());
        let (start, end) = match ensure_index_in_view {
            Some(ensure_index_in_view) if ensure_index_in_view >= end => {
                let end = ensure_index_in_view + 1;
                (end.saturating_sub(available_height), end)
            }
            _ => (start, end),
        };
        let height = end - start;

        state.offset = start;
        state.ensure_selected_in_view_on_next_render = false;

        if let Some(scrollbar) = self.scrollbar.clone() {
            let mut scrollbar_state = ScrollbarState::new(visible.len().saturating_sub(height))
                .position(start)
                .viewport_content_length(height);
            let scrollbar_area = Rect {
                // Inner height to be exactly as the content
                y: area.y,
                height: area.height,
                // Outer width to stay on the right border
                x: full_area.x,
                width: full_area.width,
            };
            scrollbar.render(scrollbar_area, buf, &mut scrollbar_state);
        }

        let blank_symbol = " ".repeat(self.highlight_symbol.width());

        let has_selection = state.selected.is_some();
        #[allow(clippy::cast_possible_truncation)]
        for (row, flattened) in visible.into_iter().skip(start).take(height).enumerate() {
            let Flattened {
                node,
                depth,
                has_children,
            } = flattened;

            let x = area.x;
            let y = area.y + row as u16;

            let area = Rect {
                x,
                y,
                width: area.width,
                height: 1,
            };

            buf.set_style(area, self.style);

            let is_selected = state.selected == Some(node);
            let after_highlight_symbol_x = if has_selection {
                let symbol = if is_selected {
                    self.highlight_symbol
                } else {
                    &blank_symbol
                };
                let (x, _) = buf.set_stringn(x, y, symbol, area.width as usize, self.style);
                x
            } else {
                x
            };

            let after_depth_x = {
                let indent_width = depth * 2;
                let (after_indent_x, _) = buf.set_stringn(
                    after_highlight_symbol_x,
                    y,
                    " ".repeat(indent_width),
                    indent_width,
                    self.style,
                );
                let symbol = if !has_children {
                    self.node_no_children_symbol
                } else if state.opened.contains(&node) {
                    self.node_open_symbol
                } else {
                    self.node_closed_symbol
                };
                let max_width = area.width.saturating_sub(after_indent_x - x);
                let (x, _) =
                    buf.set_stringn(after_indent_x, y, symbol, max_width as usize, self.style);
                x
            };

            let max_element_width = area.width.saturating_sub(after_depth_x - x);
            buf.set_line(after_depth_x, y, &self.line(node), max_element_width);
            if is_selected {
                buf.set_style(area, self.highlight_style);
            }
        }
    }
}

impl<'a> Widget for RecordTreeView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut state = TreeState::default();
        StatefulWidget::render(self, area, buf, &mut state);
    }
}

#[cfg(test)]
mod render_tests {
    use super::*;

    #[must_use]
    #[track_caller]
    fn render(width: u16, height: u16, state: &mut TreeState) -> Buffer {
        let container = crate::record::example_container();
        let index = TreeIndex::new(RecordTree::build(&container));
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        StatefulWidget::render(RecordTreeView::new(&index), area, &mut buffer, state);
        buffer
    }

    fn lines(buffer: &Buffer) -> Vec<String> {
        let area = buffer.area;
        (area.y..area.bottom())
            .map(|y| {
                (area.x..area.right())
                    .map(|x| buffer.get(x, y).symbol())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn does_not_panic() {
        _ = render(0, 0, &mut TreeState::default());
        _ = render(10, 0, &mut TreeState::default());
        _ = render(0, 10, &mut TreeState::default());
        _ = render(10, 10, &mut TreeState::default());
    }

    #[test]
    fn nothing_open() {
        let buffer = render(30, 3, &mut TreeState::default());
        assert_eq!(
            lines(&buffer),
            [
                "  vkFormat: VK_FORMAT_R8G8B8A8",
                "  typeSize: 1                 ",
                "  pixelWidth: 4               ",
            ]
        );
    }

    #[test]
    fn selected_is_scrolled_into_view() {
        let mut state = TreeState::default();
        state.select_last(&TreeIndex::new(RecordTree::build(
            &crate::record::example_container(),
        )));
        let buffer = render(16, 2, &mut state);
        assert_eq!(state.get_offset(), 18);
        assert_eq!(
            lines(&buffer),
            ["\u{25b6} sgd           ", "\u{25b6} images: [2]   "]
        );
    }

    #[test]
    fn opened_group_is_indented() {
        let index = TreeIndex::new(RecordTree::build(&crate::record::example_container()));
        let kv = index.child_at(NodeId::ROOT, 17).unwrap();
        let mut state = TreeState::default();
        state.open(kv);
        state.scroll_down(17);
        let buffer = render(24, 3, &mut state);
        assert_eq!(
            lines(&buffer),
            [
                "\u{25bc} kv: [2]               ",
                "    KTXorientation: rd  ",
                "    KTXwriter: toktx v4.",
            ]
        );
    }
}
