use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrawError {
    #[error("cannot place {what} at ({x:.1}, {y:.1}): outside the page")]
    OutOfBounds { what: &'static str, x: f32, y: f32 },

    #[error("table has no columns")]
    EmptyTable,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("document exceeded {max} pages")]
    PageLimit { max: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableStyle {
    pub font_size: f32,
    pub cell_padding: f32,
    pub head_fill: [u8; 3],
    pub striped: bool,
    /// Fixed widths (mm) by column index; other columns share the rest.
    pub column_widths: Vec<(usize, f32)>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableSpec {
    pub head: Vec<String>,
    pub body: Vec<Vec<String>>,
    pub style: TableStyle,
}

/// Drawing primitives the report is laid out on.
pub trait DrawingSurface {
    fn text(&mut self, text: &str, font_size: f32, x: f32, y: f32) -> Result<(), DrawError>;

    /// Draws `table` from `start_y`, breaking pages as needed, and returns the
    /// y position where it ends on its last page.
    fn table(&mut self, table: &TableSpec, start_y: f32) -> Result<f32, DrawError>;

    fn add_page(&mut self) -> Result<(), DrawError>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutPolicy {
    pub left_margin: f32,
    pub title_y: f32,
    pub subtitle_y: f32,
    pub summary_top: f32,
    pub heading_advance: f32,
    pub page_break_at: f32,
    pub top_margin: f32,
    pub table_gap: f32,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            left_margin: 14.0,
            title_y: 18.0,
            subtitle_y: 24.0,
            summary_top: 30.0,
            heading_advance: 8.0,
            page_break_at: 270.0,
            top_margin: 20.0,
            table_gap: 4.0,
        }
    }
}

/// Vertical position on the current page. Every placement consumes a cursor
/// and returns the next one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cursor {
    pub y: f32,
}

impl Cursor {
    pub fn at(y: f32) -> Self {
        Self { y }
    }

    /// Advances by the heading step, breaking the page past the threshold,
    /// then draws `text` at the new position.
    pub fn heading(
        self,
        surface: &mut dyn DrawingSurface,
        policy: &LayoutPolicy,
        text: &str,
        font_size: f32,
    ) -> Result<Cursor, DrawError> {
        let mut y = self.y + policy.heading_advance;
        if y > policy.page_break_at {
            surface.add_page()?;
            y = policy.top_margin;
        }
        surface.text(text, font_size, policy.left_margin, y)?;
        Ok(Cursor { y })
    }

    /// Places `table` `gap` below the cursor; the table's end becomes the cursor.
    pub fn table(
        self,
        surface: &mut dyn DrawingSurface,
        table: &TableSpec,
        gap: f32,
    ) -> Result<Cursor, DrawError> {
        let end = surface.table(table, self.y + gap)?;
        Ok(Cursor { y: end })
    }
}
