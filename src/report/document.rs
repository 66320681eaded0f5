use serde::Serialize;

use super::layout::{DrawError, DrawingSurface, TableSpec, TableStyle};

const PT_TO_MM: f32 = 0.3528;
const LINE_HEIGHT_FACTOR: f32 = 1.15;
const AVG_CHAR_WIDTH: f32 = 0.5;

/// Page geometry in millimetres (A4 portrait by default).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 14.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacedRow {
    pub y: f32,
    pub height: f32,
    pub cells: Vec<String>,
    /// Index within the table body, or `None` for the head row. A row split
    /// across pages repeats its index on every fragment.
    pub index: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Text {
        text: String,
        font_size: f32,
        x: f32,
        y: f32,
    },
    Table {
        x: f32,
        widths: Vec<f32>,
        rows: Vec<PlacedRow>,
        style: TableStyle,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Page {
    pub elements: Vec<Element>,
}

/// In-memory drawing surface that records placed content page by page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PagedDocument {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
    #[serde(skip)]
    max_pages: usize,
}

impl Default for PagedDocument {
    fn default() -> Self {
        Self::new(PageGeometry::default())
    }
}

impl PagedDocument {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Page::default()],
            max_pages: 10_000,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn column_widths(&self, columns: usize, style: &TableStyle) -> Vec<f32> {
        let available = self.geometry.width - 2.0 * self.geometry.margin;
        let fixed: f32 = style
            .column_widths
            .iter()
            .filter(|(i, _)| *i < columns)
            .map(|(_, w)| *w)
            .sum();
        let flexible = (0..columns)
            .filter(|i| !style.column_widths.iter().any(|(c, _)| c == i))
            .count();
        let share = if flexible == 0 {
            0.0
        } else {
            ((available - fixed) / flexible as f32).max(10.0)
        };
        (0..columns)
            .map(|i| {
                style
                    .column_widths
                    .iter()
                    .find(|(c, _)| *c == i)
                    .map(|(_, w)| *w)
                    .unwrap_or(share)
            })
            .collect()
    }

    fn chars_per_line(width: f32, style: &TableStyle) -> usize {
        let char_w = style.font_size * PT_TO_MM * AVG_CHAR_WIDTH;
        let usable = (width - 2.0 * style.cell_padding).max(char_w);
        (usable / char_w).floor().max(1.0) as usize
    }

    fn line_height(style: &TableStyle) -> f32 {
        style.font_size * PT_TO_MM * LINE_HEIGHT_FACTOR
    }

    /// Visual lines of `cell` once wrapped to `per_line` characters.
    fn wrap(cell: &str, per_line: usize) -> Vec<String> {
        let mut out = Vec::new();
        for line in cell.lines() {
            let chars: Vec<char> = line.chars().collect();
            if chars.is_empty() {
                out.push(String::new());
                continue;
            }
            out.extend(chars.chunks(per_line).map(|c| c.iter().collect::<String>()));
        }
        out
    }

    fn row_height(cells: &[String], widths: &[f32], style: &TableStyle) -> f32 {
        let lines = cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, w)| Self::wrap(cell, Self::chars_per_line(*w, style)).len().max(1))
            .max()
            .unwrap_or(1);
        lines as f32 * Self::line_height(style) + 2.0 * style.cell_padding
    }

    /// Number of text lines a row fragment can hold in `room` millimetres.
    fn lines_fitting(room: f32, style: &TableStyle) -> usize {
        let lines = (room - 2.0 * style.cell_padding) / Self::line_height(style);
        if lines.is_finite() && lines >= 1.0 {
            lines.floor() as usize
        } else {
            0
        }
    }

    /// Splits a row after its first `lines` wrapped lines in every cell.
    fn split_row(
        cells: &[String],
        widths: &[f32],
        style: &TableStyle,
        lines: usize,
    ) -> (Vec<String>, Vec<String>) {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, w)| {
                let wrapped = Self::wrap(cell, Self::chars_per_line(*w, style));
                let cut = lines.min(wrapped.len());
                (wrapped[..cut].join("\n"), wrapped[cut..].join("\n"))
            })
            .unzip()
    }

    fn check_point(&self, what: &'static str, x: f32, y: f32) -> Result<(), DrawError> {
        let g = &self.geometry;
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 || x > g.width || y > g.height {
            return Err(DrawError::OutOfBounds { what, x, y });
        }
        Ok(())
    }
}

impl DrawingSurface for PagedDocument {
    fn text(&mut self, text: &str, font_size: f32, x: f32, y: f32) -> Result<(), DrawError> {
        self.check_point("text", x, y)?;
        self.current().elements.push(Element::Text {
            text: text.to_string(),
            font_size,
            x,
            y,
        });
        Ok(())
    }

    fn table(&mut self, table: &TableSpec, start_y: f32) -> Result<f32, DrawError> {
        let columns = table.head.len();
        if columns == 0 {
            return Err(DrawError::EmptyTable);
        }
        for (row, cells) in table.body.iter().enumerate() {
            if cells.len() != columns {
                return Err(DrawError::RaggedRow {
                    row,
                    found: cells.len(),
                    expected: columns,
                });
            }
        }
        let x = self.geometry.margin;
        self.check_point("table", x, start_y)?;

        let widths = self.column_widths(columns, &table.style);
        let bottom = self.geometry.height - self.geometry.margin;
        let head_h = Self::row_height(&table.head, &widths, &table.style);

        let line_h = Self::line_height(&table.style);
        let fresh_room = bottom - self.geometry.margin - head_h;
        let min_row_h = line_h + 2.0 * table.style.cell_padding;

        let mut y = start_y;
        // the head row moves with the first body row when it would be orphaned;
        // a row taller than a page only needs room for its first line
        let first_h = table
            .body
            .first()
            .map(|r| Self::row_height(r, &widths, &table.style))
            .map(|h| if h > fresh_room { min_row_h } else { h })
            .unwrap_or(0.0);
        if y + head_h + first_h > bottom {
            self.add_page()?;
            y = self.geometry.margin;
        }

        let mut rows = vec![PlacedRow {
            y,
            height: head_h,
            cells: table.head.clone(),
            index: None,
        }];
        y += head_h;

        for (i, cells) in table.body.iter().enumerate() {
            let mut pending = cells.clone();
            loop {
                let h = Self::row_height(&pending, &widths, &table.style);
                if y + h <= bottom {
                    rows.push(PlacedRow {
                        y,
                        height: h,
                        cells: pending,
                        index: Some(i),
                    });
                    y += h;
                    break;
                }
                if h > fresh_room {
                    let fit = Self::lines_fitting(bottom - y, &table.style);
                    if fit > 0 {
                        let (now, rest) = Self::split_row(&pending, &widths, &table.style, fit);
                        let now_h = Self::row_height(&now, &widths, &table.style);
                        rows.push(PlacedRow {
                            y,
                            height: now_h,
                            cells: now,
                            index: Some(i),
                        });
                        pending = rest;
                    } else if rows.len() == 1 {
                        return Err(DrawError::OutOfBounds {
                            what: "table row",
                            x,
                            y: y + h,
                        });
                    }
                }
                let fragment = std::mem::take(&mut rows);
                self.current().elements.push(Element::Table {
                    x,
                    widths: widths.clone(),
                    rows: fragment,
                    style: table.style.clone(),
                });
                self.add_page()?;
                y = self.geometry.margin;
                rows.push(PlacedRow {
                    y,
                    height: head_h,
                    cells: table.head.clone(),
                    index: None,
                });
                y += head_h;
            }
        }

        self.current().elements.push(Element::Table {
            x,
            widths,
            rows,
            style: table.style.clone(),
        });
        Ok(y)
    }

    fn add_page(&mut self) -> Result<(), DrawError> {
        if self.pages.len() >= self.max_pages {
            return Err(DrawError::PageLimit {
                max: self.max_pages,
            });
        }
        self.pages.push(Page::default());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TableStyle {
        TableStyle {
            font_size: 8.0,
            cell_padding: 2.0,
            head_fill: [200, 200, 200],
            striped: true,
            column_widths: Vec::new(),
        }
    }

    fn table(rows: usize) -> TableSpec {
        TableSpec {
            head: vec!["Row".to_string()],
            body: (0..rows).map(|i| vec![format!("#{}", i + 1)]).collect(),
            style: style(),
        }
    }

    #[test]
    fn long_table_spills_onto_new_pages_with_repeated_head() {
        let mut doc = PagedDocument::default();
        let end = doc.table(&table(200), 30.0).unwrap();
        assert!(doc.page_count() > 1);
        assert!(end > doc.geometry.margin);
        for page in doc.pages.iter() {
            if let Some(Element::Table { rows, .. }) = page.elements.first() {
                assert_eq!(rows[0].index, None);
            }
        }
        let placed: usize = doc
            .pages
            .iter()
            .flat_map(|p| p.elements.iter())
            .map(|e| match e {
                Element::Table { rows, .. } => rows.iter().filter(|r| r.index.is_some()).count(),
                _ => 0,
            })
            .sum();
        assert_eq!(placed, 200);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let mut doc = PagedDocument::default();
        let mut t = table(1);
        t.body[0].push("extra".to_string());
        assert!(matches!(
            doc.table(&t, 30.0),
            Err(DrawError::RaggedRow { row: 0, .. })
        ));
    }

    #[test]
    fn page_limit_is_enforced() {
        let mut doc = PagedDocument::default().with_max_pages(1);
        assert!(matches!(doc.add_page(), Err(DrawError::PageLimit { max: 1 })));
    }

    #[test]
    fn row_taller_than_a_page_is_split_across_pages() {
        let mut doc = PagedDocument::default();
        let long: Vec<String> = (0..150).map(|i| format!("line {i}")).collect();
        let t = TableSpec {
            head: vec!["Concern".to_string()],
            body: vec![vec!["short".to_string()], vec![long.join("\n")]],
            style: style(),
        };
        let end = doc.table(&t, 30.0).unwrap();
        let bottom = doc.geometry.height - doc.geometry.margin;
        assert!(end <= bottom);
        assert!(doc.page_count() > 1);

        let mut kept = Vec::new();
        for page in doc.pages.iter() {
            for e in page.elements.iter() {
                if let Element::Table { rows, .. } = e {
                    assert_eq!(rows[0].index, None);
                    for r in rows.iter() {
                        assert!(r.y + r.height <= bottom + 0.001);
                        if r.index == Some(1) {
                            kept.extend(r.cells[0].lines().map(str::to_string));
                        }
                    }
                }
            }
        }
        assert_eq!(kept, long);
    }

    #[test]
    fn text_outside_page_fails() {
        let mut doc = PagedDocument::default();
        assert!(doc.text("x", 10.0, 14.0, 400.0).is_err());
    }

    #[test]
    fn fixed_width_column_wraps_less() {
        let doc = PagedDocument::default();
        let mut st = style();
        st.column_widths = vec![(0, 110.0)];
        let widths = doc.column_widths(2, &st);
        assert_eq!(widths[0], 110.0);
        assert!((widths[1] - 72.0).abs() < 0.01);
    }
}
