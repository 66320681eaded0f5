use crate::cli::args::CliArgs;
use crate::report::render::{infer_format_from_path, OutputFormat};

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(page) = args.page {
        if page == 0 {
            return Err("invalid page, expected positive integer".to_string());
        }
    }
    if let Some(size) = args.page_size {
        if size == 0 {
            return Err("invalid page-size, expected positive integer".to_string());
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive number of seconds".to_string());
        }
    }
    if let Some(raw) = args.output_format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected html, json, or text"
            ));
        }
    }
    if let Some(path) = args.output.as_deref() {
        if path.trim().is_empty() {
            return Err("invalid output path".to_string());
        }
        let ext = std::path::Path::new(path.trim())
            .extension()
            .map(|e| e.to_string_lossy().to_string());
        if ext.is_some() && infer_format_from_path(path).is_none() && args.output_format.is_none() {
            return Err(format!(
                "cannot infer report format from '{path}', pass --output-format"
            ));
        }
    }
    if let Some(col) = args.last_column.as_deref() {
        let col = col.trim();
        if col.is_empty() || !col.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("invalid last-column '{col}', expected a column letter"));
        }
    }
    if args.interactive && args.list_centers {
        return Err("use either --interactive or --list-centers, not both".to_string());
    }
    Ok(())
}
