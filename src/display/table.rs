use std::sync::Arc;

use comfy_table::{Attribute, Cell, Color, Table as RenderTable, presets};
use crossterm::terminal;

use crate::core::registry::QueryPlugin;
use crate::core::results::Table;
use crate::display::pagination::{page_info, paginate};
use crate::display::sort::{SortDirection, sorted_rows};
use crate::error::AppError;
use crate::utils::text::truncate_text;

const DESCRIPTION_WIDTH: usize = 60;

/// Marker appended to interactive cells so follow-up queries are visible in
/// a terminal rendering.
const ACTION_MARKER: &str = " [+]";

/// Formatter for result tables and the query catalog.
pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl TableDisplay {
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }

    /// Detect terminal width, clamped for stability.
    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _rows)) => Some((cols as usize).clamp(40, 200)),
            Err(_) => Some(80),
        }
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Render one result table with an optional sort column and page window.
    /// Short pages are padded with blank rows to a uniform height.
    pub fn render_table(
        &self,
        table: &Table,
        sort: Option<(usize, SortDirection)>,
        page_index: usize,
        page_size: Option<usize>,
    ) -> Result<String, AppError> {
        let rows = sorted_rows(table, sort)?;

        let mut render = RenderTable::new();
        render.load_preset(presets::UTF8_FULL);
        render.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
        self.configure_table_width(&mut render);

        let header: Vec<Cell> = table
            .header()
            .iter()
            .enumerate()
            .map(|(position, cell)| {
                let mut label = cell.value().to_string();
                if let Some((column, direction)) = sort {
                    if column == position {
                        label.push_str(match direction {
                            SortDirection::Ascending => " ▲",
                            SortDirection::Descending => " ▼",
                        });
                    }
                }
                if self.use_colors {
                    Cell::new(label)
                        .add_attribute(Attribute::Bold)
                        .fg(Color::Cyan)
                } else {
                    Cell::new(label).add_attribute(Attribute::Bold)
                }
            })
            .collect();
        render.set_header(header);

        let mut footer = String::new();
        match page_size {
            Some(page_size) => {
                let page = paginate(&rows, page_index, page_size)?;
                for row in page.rows {
                    render.add_row(self.body_cells(row));
                }
                for _ in 0..page.empty_row_count {
                    render.add_row(vec![String::new(); table.column_count()]);
                }
                footer = page_info(rows.len(), page_index, page_size);
            }
            None => {
                for row in &rows {
                    render.add_row(self.body_cells(row));
                }
            }
        }

        let mut output = format!("{}\n{}", table.name, render);
        if !footer.is_empty() {
            output.push('\n');
            output.push_str(&footer);
        }
        Ok(output)
    }

    fn body_cells(&self, row: &[crate::core::results::Cell]) -> Vec<Cell> {
        row.iter()
            .map(|cell| {
                let mut text = cell.value().to_string();
                if cell.is_actionable() {
                    text.push_str(ACTION_MARKER);
                    if self.use_colors {
                        return Cell::new(text).fg(Color::Cyan);
                    }
                }
                Cell::new(text)
            })
            .collect()
    }

    /// Render the plugin catalog in table format.
    pub fn render_query_list(&self, plugins: &[Arc<dyn QueryPlugin>]) -> Result<String, AppError> {
        let mut render = RenderTable::new();
        render.load_preset(presets::UTF8_FULL);
        render.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
        self.configure_table_width(&mut render);

        let labels = ["Query", "Slug", "Category", "Description"];
        if self.use_colors {
            render.set_header(
                labels
                    .iter()
                    .map(|label| {
                        Cell::new(label)
                            .add_attribute(Attribute::Bold)
                            .fg(Color::Cyan)
                    })
                    .collect::<Vec<_>>(),
            );
        } else {
            render.set_header(labels.to_vec());
        }

        for plugin in plugins {
            let mut name = plugin.query_name().to_string();
            if plugin.experimental() {
                name.push_str(" (experimental)");
            }
            render.add_row(vec![
                name,
                crate::core::registry::slugify(plugin.query_name()),
                match plugin.category() {
                    Some(_) => "reconstruction".to_string(),
                    None => "general".to_string(),
                },
                truncate_text(plugin.description(), DESCRIPTION_WIDTH),
            ]);
        }

        Ok(render.to_string())
    }

    fn configure_table_width(&self, table: &mut RenderTable) {
        if let Some(terminal_width) = self.max_width {
            // Leave room for borders and padding.
            let available_width = if terminal_width > 20 {
                terminal_width - 6
            } else {
                terminal_width.max(40)
            };
            table.set_width(available_width as u16);
        } else {
            table.set_width(80);
        }
    }
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}
