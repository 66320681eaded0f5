use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::prompt::{self, Command};
use crate::cli::validation;
use crate::config::{self, ConfigFile, EnvSettings};
use crate::explorer::{Explorer, SearchView};
use crate::paginate::DEFAULT_PAGE_SIZE;
use crate::report::document::PagedDocument;
use crate::report::render::{self, infer_format_from_path, OutputFormat};
use crate::search::highlight::Highlighter;
use crate::search::{QueryState, DEFAULT_ISSUE_TERMS};
use crate::sheets::{self, SheetsConfig, DEFAULT_API_BASE, DEFAULT_LAST_COLUMN, DEFAULT_SHEET_NAME};

fn print_banner(sheet_name: &str) {
    println!(
        "{} {}",
        "reviewsearch".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("Reviews Search (Google Sheets – {sheet_name})");
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Clone, Debug)]
struct RunConfig {
    sheets: SheetsConfig,
    state: QueryState,
    page_size: usize,
    issue_terms: Vec<String>,
    list_centers: bool,
    export: bool,
    output: Option<String>,
    output_dir: Option<String>,
    output_format: OutputFormat,
    no_color: bool,
    interactive: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn build_run_config(args: CliArgs, cfg: ConfigFile, env: EnvSettings) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let sheets = SheetsConfig {
        api_key: non_blank(args.api_key)
            .or(env.api_key)
            .or(non_blank(cfg.api_key)),
        spreadsheet_id: non_blank(args.spreadsheet_id)
            .or(env.spreadsheet_id)
            .or(non_blank(cfg.spreadsheet_id)),
        sheet_name: non_blank(args.sheet)
            .or(env.sheet_name)
            .or(non_blank(cfg.sheet_name))
            .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
        last_column: non_blank(args.last_column)
            .or(non_blank(cfg.last_column))
            .unwrap_or_else(|| DEFAULT_LAST_COLUMN.to_string())
            .to_ascii_uppercase(),
        api_base: non_blank(cfg.api_base).unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        timeout_seconds: args.timeout.or(cfg.timeout).unwrap_or(30),
        proxy: non_blank(args.proxy).or(non_blank(cfg.proxy)),
    };

    let page_size = args.page_size.or(cfg.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err("invalid page_size in config, expected positive integer".to_string());
    }

    let issue_terms = cfg
        .issue_terms
        .unwrap_or_default()
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>();
    let issue_terms = if issue_terms.is_empty() {
        DEFAULT_ISSUE_TERMS.iter().map(|t| t.to_string()).collect()
    } else {
        issue_terms
    };

    let output = args.output.map(|p| config::expand_tilde_string(p.trim()));
    let format_raw = args.output_format.or(cfg.output_format);
    let output_format = match format_raw.as_deref() {
        Some(raw) => OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected html, json, or text"))?,
        None => output
            .as_deref()
            .and_then(infer_format_from_path)
            .unwrap_or(OutputFormat::Html),
    };

    let state = QueryState::default()
        .with_query(args.query.unwrap_or_default())
        .with_issues_only(args.issues_only)
        .with_center(args.center)
        .with_page(args.page.unwrap_or(1));

    Ok(RunConfig {
        sheets,
        state,
        page_size,
        issue_terms,
        list_centers: args.list_centers,
        export: args.export || output.is_some(),
        output,
        output_dir: non_blank(cfg.output_dir).map(|d| config::expand_tilde_string(&d)),
        output_format,
        no_color: args.no_color || cfg.no_color.unwrap_or(false),
        interactive: args.interactive,
    })
}

/// Fetches the sheet behind a spinner. Ctrl-C abandons the request and its
/// result.
async fn load_explorer(run: &RunConfig) -> Result<Explorer, String> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_draw_target(ProgressDrawTarget::stderr());
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Loading sheet…");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = tokio::select! {
        res = sheets::fetch_dataset(&run.sheets) => res.map_err(|e| e.to_string()),
        _ = tokio::signal::ctrl_c() => Err("load cancelled".to_string()),
    };
    spinner.finish_and_clear();

    let dataset = result?;
    let explorer = Explorer::new(dataset)
        .with_issue_terms(run.issue_terms.clone())
        .with_page_size(run.page_size);
    let mapping = explorer.mapping();
    debug!(?mapping, "resolved field mapping");
    if mapping.call_center.is_none() {
        warn!("sheet has no columns; nothing to search");
    }
    Ok(explorer)
}

fn print_badges(view: &SearchView<'_>) {
    if view.counts.is_empty() {
        println!("{}", "No matches yet".dimmed());
        return;
    }
    let badges = view
        .counts
        .iter()
        .map(|c| format!(" {}: {} ", c.label, c.count).on_bright_black().white().to_string())
        .collect::<Vec<_>>()
        .join(" ");
    println!("{badges}");
}

fn highlighted(h: &Highlighter, value: &str) -> String {
    h.segments(value)
        .into_iter()
        .map(|seg| {
            if seg.matched {
                seg.text.black().on_yellow().to_string()
            } else {
                seg.text.to_string()
            }
        })
        .collect()
}

fn print_view(explorer: &Explorer, state: &QueryState) {
    let view = explorer.view(state);
    println!();
    print_badges(&view);
    println!();

    let highlighter = Highlighter::new(&view.terms);
    let rows = view.page_records();
    if rows.is_empty() {
        println!("{}", "No results".bold());
    }
    let (start, _) = view.pager.bounds(view.page);
    let width = explorer
        .headers()
        .iter()
        .map(|h| h.chars().count())
        .max()
        .unwrap_or(0);
    for (i, record) in rows.iter().enumerate() {
        println!("{}", format!("#{}", start + i + 1).bold().cyan());
        for header in explorer.headers() {
            let value = record.get(header);
            if value.trim().is_empty() {
                continue;
            }
            println!(
                "  {:<width$}  {}",
                header.dimmed(),
                highlighted(&highlighter, value),
                width = width
            );
        }
    }

    println!();
    println!(
        "{}  (page {}/{})",
        view.pager.showing_label(view.page),
        view.page,
        view.pager.page_count()
    );
}

/// A path typed at the prompt must carry a known extension or none at all.
fn report_path(
    run: &RunConfig,
    label: &str,
    requested: Option<&str>,
) -> Result<(PathBuf, OutputFormat), String> {
    if let Some(path) = requested.map(str::trim).filter(|p| !p.is_empty()) {
        let has_ext = std::path::Path::new(path).extension().is_some();
        let format = match infer_format_from_path(path) {
            Some(format) => format,
            None if !has_ext => run.output_format,
            None => {
                return Err(format!(
                    "cannot infer report format from '{path}', use .html, .json or .txt"
                ))
            }
        };
        return Ok((config::expand_tilde(path), format));
    }
    if let Some(path) = run.output.as_deref() {
        return Ok((PathBuf::from(path), run.output_format));
    }
    let name = crate::report::file_name(label, run.output_format);
    Ok(match run.output_dir.as_deref() {
        Some(dir) => (PathBuf::from(dir).join(name), run.output_format),
        None => (PathBuf::from(name), run.output_format),
    })
}

const MAX_REPORT_PAGES: usize = 5_000;

/// Lays out and renders the report on a blocking worker, then writes it.
/// Nothing is written when layout or rendering fails.
async fn export_report(
    explorer: &Explorer,
    state: &QueryState,
    run: &RunConfig,
    requested: Option<&str>,
) -> Result<PathBuf, String> {
    let label = explorer.terms(state).label();
    let (path, format) = report_path(run, &label, requested)?;
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let worker_explorer = explorer.clone();
    let worker_state = state.clone();
    let rendered = tokio::task::spawn_blocking(move || {
        let mut doc = PagedDocument::default().with_max_pages(MAX_REPORT_PAGES);
        worker_explorer.export(&worker_state, &mut doc, &generated_at)?;
        debug!(pages = doc.page_count(), "report laid out");
        render::render(&doc, format)
    })
    .await
    .map_err(|e| format!("report task failed: {e}"))?
    .map_err(|e| format!("export failed: {e}"))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("failed to create output directory '{}': {e}", parent.display()))?;
    }
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .await
        .map_err(|e| format!("failed to open output file '{}': {e}", path.display()))?;
    outfile
        .write_all(&rendered)
        .await
        .map_err(|e| format!("failed to write output file '{}': {e}", path.display()))?;
    info!(path = %path.display(), format = format.name(), "report written");
    Ok(path)
}

fn print_centers(explorer: &Explorer) {
    let centers = explorer.centers();
    if centers.is_empty() {
        println!("{}", "No call centers found".dimmed());
        return;
    }
    for c in centers {
        println!("  {c}");
    }
}

async fn interactive(explorer: &Explorer, run: &RunConfig) -> Result<(), String> {
    let mut state = run.state.clone();
    print_view(explorer, &state);
    println!("{}", "type help for commands".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let line = match lines
            .next_line()
            .await
            .map_err(|e| format!("failed to read input: {e}"))?
        {
            Some(line) => line,
            None => break,
        };
        let cmd = match prompt::parse_command(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("{}", e.yellow());
                continue;
            }
        };
        match cmd {
            Command::Quit => break,
            Command::Help => println!("{}", prompt::HELP),
            Command::Centers => print_centers(explorer),
            Command::Export(ref path) => match export_report(explorer, &state, run, path.as_deref()).await {
                Ok(path) => println!(":: Report    : {}", path.display()),
                Err(e) => println!("{}", e.red()),
            },
            ref other => {
                let pager = explorer.view(&state).pager;
                state = prompt::apply(&state, other, &pager);
                print_view(explorer, &state);
            }
        }
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    print_banner(&run.sheets.sheet_name);

    let explorer = load_explorer(&run).await?;
    format_kv_line("Rows", &explorer.dataset().len().to_string());
    format_kv_line(
        "Center col",
        explorer.mapping().call_center_field().unwrap_or("-"),
    );
    format_kv_line("Page size", &explorer.page_size().to_string());
    format_kv_line("Issue set", &explorer.issue_terms().join(", "));

    if run.list_centers {
        print_centers(&explorer);
        return Ok(());
    }

    if run.interactive {
        return interactive(&explorer, &run).await;
    }

    let terms = explorer.terms(&run.state);
    format_kv_line("Search", &terms.label());
    format_kv_line("Issues", format_bool(run.state.issues_only));
    format_kv_line("Center", run.state.center.as_deref().unwrap_or("All"));
    print_view(&explorer, &run.state);

    if run.export {
        let path = export_report(&explorer, &run.state, &run, None).await?;
        println!();
        format_kv_line("Report", &path.display().to_string());
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", CliArgs::command().render_long_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_tracing(args.verbose);

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "cannot determine config path, pass --config".to_string())?;
        config::ensure_default_config_file(&path)?;
        println!(":: Config    : {}", path.display());
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg, EnvSettings::load())?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["reviewsearch"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn cli_beats_env_beats_config() {
        let cfg = ConfigFile {
            api_key: Some("from-config".to_string()),
            spreadsheet_id: Some("cfg-sheet".to_string()),
            sheet_name: Some("Config Tab".to_string()),
            ..ConfigFile::default()
        };
        let env = EnvSettings {
            api_key: Some("from-env".to_string()),
            spreadsheet_id: None,
            sheet_name: Some("Env Tab".to_string()),
        };
        let run = build_run_config(args(&["--sheet", "Cli Tab"]), cfg, env).unwrap();
        assert_eq!(run.sheets.api_key.as_deref(), Some("from-env"));
        assert_eq!(run.sheets.spreadsheet_id.as_deref(), Some("cfg-sheet"));
        assert_eq!(run.sheets.sheet_name, "Cli Tab");
    }

    #[test]
    fn defaults_apply_without_config() {
        let run = build_run_config(args(&[]), ConfigFile::default(), EnvSettings::default()).unwrap();
        assert_eq!(run.sheets.sheet_name, DEFAULT_SHEET_NAME);
        assert_eq!(run.sheets.last_column, "R");
        assert_eq!(run.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(run.issue_terms, vec!["headset", "connection"]);
        assert_eq!(run.output_format, OutputFormat::Html);
        assert!(!run.export);
        assert_eq!(run.state, QueryState::default());
    }

    #[test]
    fn output_path_implies_export_and_format() {
        let run = build_run_config(
            args(&["-q", "headset", "-o", "out/report.json"]),
            ConfigFile::default(),
            EnvSettings::default(),
        )
        .unwrap();
        assert!(run.export);
        assert_eq!(run.output_format, OutputFormat::Json);
        let (path, format) = report_path(&run, "headset", None).unwrap();
        assert_eq!(path, PathBuf::from("out/report.json"));
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn default_report_name_uses_output_dir() {
        let cfg = ConfigFile {
            output_dir: Some("reports".to_string()),
            ..ConfigFile::default()
        };
        let run = build_run_config(args(&["-e"]), cfg, EnvSettings::default()).unwrap();
        let (path, _) = report_path(&run, "headset OR connection", None).unwrap();
        assert_eq!(
            path,
            PathBuf::from("reports").join("reviews_headset_OR_connection.html")
        );
    }

    #[test]
    fn prompt_export_path_needs_a_known_extension() {
        let run = build_run_config(args(&[]), ConfigFile::default(), EnvSettings::default()).unwrap();
        assert!(report_path(&run, "headset", Some("report.pdf")).is_err());

        let (path, format) = report_path(&run, "headset", Some("out/report.txt")).unwrap();
        assert_eq!(path, PathBuf::from("out/report.txt"));
        assert_eq!(format, OutputFormat::Text);

        let (_, format) = report_path(&run, "headset", Some("report")).unwrap();
        assert_eq!(format, OutputFormat::Html);
    }

    #[test]
    fn initial_page_survives_filter_flags() {
        let run = build_run_config(
            args(&["-q", "mic", "-c", "A", "-p", "3"]),
            ConfigFile::default(),
            EnvSettings::default(),
        )
        .unwrap();
        assert_eq!(run.state.page, 3);
        assert_eq!(run.state.center.as_deref(), Some("A"));
    }
}
