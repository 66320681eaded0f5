use super::document::{Element, PagedDocument};
use super::ReportError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Json,
    Text,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "html" | "htm" => Some(Self::Html),
            "json" => Some(Self::Json),
            "text" | "txt" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
            Self::Text => "txt",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

pub fn render(doc: &PagedDocument, format: OutputFormat) -> Result<Vec<u8>, ReportError> {
    match format {
        OutputFormat::Html => Ok(render_html(doc)),
        OutputFormat::Json => render_json(doc),
        OutputFormat::Text => Ok(render_text(doc)),
    }
}

pub fn render_json(doc: &PagedDocument) -> Result<Vec<u8>, ReportError> {
    serde_json::to_vec_pretty(doc).map_err(|e| ReportError::Render {
        format: OutputFormat::Json.name(),
        message: e.to_string(),
    })
}

pub fn render_text(doc: &PagedDocument) -> Vec<u8> {
    let mut out = String::new();
    for (n, page) in doc.pages.iter().enumerate() {
        if n > 0 {
            out.push('\n');
        }
        out.push_str(&format!("--- Page {} of {} ---\n", n + 1, doc.pages.len()));
        for element in page.elements.iter() {
            match element {
                Element::Text { text, .. } => {
                    out.push_str(text);
                    out.push('\n');
                }
                Element::Table { rows, .. } => {
                    for row in rows.iter() {
                        out.push_str("| ");
                        out.push_str(&row.cells.join(" | "));
                        out.push_str(" |\n");
                    }
                }
            }
        }
    }
    out.into_bytes()
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn rgb(fill: [u8; 3]) -> String {
    format!("rgb({},{},{})", fill[0], fill[1], fill[2])
}

/// Printable HTML: one fixed-size sheet per page, content at its placed
/// coordinates.
pub fn render_html(doc: &PagedDocument) -> Vec<u8> {
    let g = &doc.geometry;
    let mut body = String::new();
    for page in doc.pages.iter() {
        body.push_str("  <section class=\"page\">\n");
        for element in page.elements.iter() {
            match element {
                Element::Text {
                    text,
                    font_size,
                    x,
                    y,
                } => {
                    body.push_str(&format!(
                        "    <div class=\"text\" style=\"left:{x:.2}mm;top:{:.2}mm;font-size:{font_size}pt\">{}</div>\n",
                        y - font_size * 0.3528,
                        escape_html(text)
                    ));
                }
                Element::Table {
                    x,
                    widths,
                    rows,
                    style,
                } => {
                    let top = rows.first().map(|r| r.y).unwrap_or(0.0);
                    let total: f32 = widths.iter().sum();
                    body.push_str(&format!(
                        "    <table style=\"left:{x:.2}mm;top:{top:.2}mm;width:{total:.2}mm;font-size:{}pt\">\n",
                        style.font_size
                    ));
                    body.push_str("      <colgroup>");
                    for w in widths.iter() {
                        body.push_str(&format!("<col style=\"width:{w:.2}mm\"/>"));
                    }
                    body.push_str("</colgroup>\n");
                    for row in rows.iter() {
                        let (tag, attrs) = match row.index {
                            None => ("th", format!(" style=\"background:{};padding:{}mm\"", rgb(style.head_fill), style.cell_padding)),
                            Some(i) if style.striped && i % 2 == 1 => {
                                ("td", format!(" class=\"stripe\" style=\"padding:{}mm\"", style.cell_padding))
                            }
                            Some(_) => ("td", format!(" style=\"padding:{}mm\"", style.cell_padding)),
                        };
                        body.push_str(&format!("      <tr style=\"height:{:.2}mm\">", row.height));
                        for cell in row.cells.iter() {
                            body.push_str(&format!("<{tag}{attrs}>{}</{tag}>", escape_html(cell)));
                        }
                        body.push_str("</tr>\n");
                    }
                    body.push_str("    </table>\n");
                }
            }
        }
        body.push_str("  </section>\n");
    }

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <title>Reviews Search Report</title>
  <style>
    @page {{ size: {w}mm {h}mm; margin: 0; }}
    body {{ margin: 0; background: #e2e8f0; font-family: Helvetica, Arial, sans-serif; color: #0f172a; }}
    .page {{ position: relative; width: {w}mm; height: {h}mm; margin: 8mm auto; background: #fff; box-shadow: 0 1px 4px rgba(0,0,0,.2); overflow: hidden; page-break-after: always; }}
    .text {{ position: absolute; white-space: pre; }}
    table {{ position: absolute; border-collapse: collapse; table-layout: fixed; }}
    th {{ color: #fff; text-align: left; font-weight: 700; }}
    td, th {{ vertical-align: top; overflow-wrap: anywhere; }}
    .stripe {{ background: #f5f5f5; }}
    @media print {{ body {{ background: #fff; }} .page {{ margin: 0; box-shadow: none; }} }}
  </style>
</head>
<body>
{body}</body>
</html>
"####,
        w = g.width,
        h = g.height,
        body = body
    );
    html.into_bytes()
}
