pub mod document;
pub mod layout;
pub mod render;

use regex::Regex;
use thiserror::Error;

use crate::aggregate::{center_label, CenterCount};
use crate::dataset::Record;
use crate::schema::{DetailColumn, FieldMapping};
use crate::search::MatchTermSet;

use self::layout::{Cursor, DrawError, DrawingSurface, LayoutPolicy, TableSpec, TableStyle};
use self::render::OutputFormat;

pub const CONCERN_MAX_CHARS: usize = 180;
pub const TITLE_FONT_SIZE: f32 = 16.0;
pub const SUBTITLE_FONT_SIZE: f32 = 10.0;
pub const HEADING_FONT_SIZE: f32 = 13.0;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to lay out report: {source}")]
    Draw {
        #[source]
        source: DrawError,
    },

    #[error("failed to render report as {format}: {message}")]
    Render {
        format: &'static str,
        message: String,
    },
}

impl From<DrawError> for ReportError {
    fn from(source: DrawError) -> Self {
        Self::Draw { source }
    }
}

/// Everything the report is built from.
#[derive(Clone, Copy, Debug)]
pub struct ReportInput<'a> {
    pub terms: &'a MatchTermSet,
    pub counts: &'a [CenterCount],
    pub records: &'a [&'a Record],
    pub mapping: &'a FieldMapping,
    pub generated_at: &'a str,
}

pub fn summary_style() -> TableStyle {
    TableStyle {
        font_size: 9.0,
        cell_padding: 2.0,
        head_fill: [33, 150, 243],
        striped: true,
        column_widths: Vec::new(),
    }
}

pub fn detail_style() -> TableStyle {
    TableStyle {
        font_size: 8.0,
        cell_padding: 2.0,
        head_fill: [200, 200, 200],
        striped: true,
        column_widths: vec![(2, 110.0)],
    }
}

pub fn summary_table(label: &str, counts: &[CenterCount]) -> TableSpec {
    TableSpec {
        head: vec![
            "Call Center".to_string(),
            format!("Mentions of \"{label}\""),
        ],
        body: counts
            .iter()
            .map(|c| vec![c.label.clone(), c.count.to_string()])
            .collect(),
        style: summary_style(),
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Detail table for one center. Columns are the resolved optional fields in
/// report order, or a single `Row` enumeration when none resolved.
pub fn detail_table(rows: &[&Record], mapping: &FieldMapping) -> TableSpec {
    let columns = mapping.detail_columns();
    if columns.is_empty() {
        return TableSpec {
            head: vec!["Row".to_string()],
            body: (1..=rows.len()).map(|i| vec![format!("#{i}")]).collect(),
            style: detail_style(),
        };
    }
    let head = columns.iter().map(|(_, field)| field.to_string()).collect();
    let body = rows
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|(col, field)| match col {
                    DetailColumn::Concern => truncate_chars(r.get(field), CONCERN_MAX_CHARS),
                    _ => r.get(field).to_string(),
                })
                .collect()
        })
        .collect();
    TableSpec {
        head,
        body,
        style: detail_style(),
    }
}

/// Lays the full report onto `surface` in a single pass.
///
/// Any drawing failure aborts the whole report.
pub fn generate(
    input: &ReportInput<'_>,
    surface: &mut dyn DrawingSurface,
    policy: &LayoutPolicy,
) -> Result<(), ReportError> {
    let label = input.terms.label();
    let call_center = input.mapping.call_center_field();

    surface.text(
        &format!("Reviews Search – \"{label}\""),
        TITLE_FONT_SIZE,
        policy.left_margin,
        policy.title_y,
    )?;
    surface.text(
        &format!("Generated: {}", input.generated_at),
        SUBTITLE_FONT_SIZE,
        policy.left_margin,
        policy.subtitle_y,
    )?;

    let mut cursor = Cursor::at(policy.summary_top).table(
        surface,
        &summary_table(&label, input.counts),
        0.0,
    )?;

    for count in input.counts.iter() {
        let rows: Vec<&Record> = input
            .records
            .iter()
            .copied()
            .filter(|r| center_label(r, call_center) == count.label)
            .collect();
        if rows.is_empty() {
            continue;
        }
        let heading = format!("{} — {} match(es)", count.label, rows.len());
        cursor = cursor.heading(surface, policy, &heading, HEADING_FONT_SIZE)?;
        cursor = cursor.table(surface, &detail_table(&rows, input.mapping), policy.table_gap)?;
        tracing::trace!(center = %count.label, rows = rows.len(), y = cursor.y, "placed center section");
    }

    Ok(())
}

/// `reviews_<label>.<ext>` with runs of characters outside `[A-Za-z0-9_-]`
/// replaced by a single underscore.
pub fn file_name(label: &str, format: OutputFormat) -> String {
    let cleaned = match Regex::new(r"[^A-Za-z0-9_-]+") {
        Ok(re) => re.replace_all(label, "_").into_owned(),
        Err(_) => label.to_string(),
    };
    format!("reviews_{}.{}", cleaned, format.extension())
}
