use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "reviewsearch",
    version,
    about = "search and report on call-center review sheets",
    long_about = "reviewsearch fetches a Google Sheets range of call-center reviews, filters it by free-text terms and call center, and exports a summary/detail report.\n\nExamples:\n  reviewsearch -q headset\n  reviewsearch -q 'headset|connection' --center Manila -p 2\n  reviewsearch --issues-only --export\n  reviewsearch -i\n\nTip: put api_key and spreadsheet_id in ~/.reviewsearch/config.yml (see --init-config) or in a .env file."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.reviewsearch/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a default config file (if missing) and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'k',
        long = "key",
        visible_alias = "api-key",
        value_name = "KEY",
        help_heading = "Input",
        help = "Sheets API key (overrides SHEETS_API_KEY)."
    )]
    pub api_key: Option<String>,

    #[arg(
        short = 'S',
        long = "sid",
        visible_alias = "spreadsheet-id",
        value_name = "ID",
        help_heading = "Input",
        help = "Spreadsheet ID (overrides SPREADSHEET_ID)."
    )]
    pub spreadsheet_id: Option<String>,

    #[arg(
        short = 's',
        long = "sheet",
        visible_alias = "sheet-name",
        value_name = "NAME",
        help_heading = "Input",
        help = "Sheet (tab) name to read (overrides SHEET_NAME)."
    )]
    pub sheet: Option<String>,

    #[arg(
        long = "lc",
        visible_alias = "last-column",
        value_name = "COLUMN",
        help_heading = "Input",
        help = "Last column letter of the range to read (default R)."
    )]
    pub last_column: Option<String>,

    #[arg(
        short = 'q',
        long = "q",
        visible_alias = "query",
        value_name = "TEXT",
        help_heading = "Search",
        help = "Search terms separated by spaces or '|' (any term, any column)."
    )]
    pub query: Option<String>,

    #[arg(
        short = 'I',
        long = "io",
        visible_alias = "issues-only",
        help_heading = "Search",
        help = "Only rows mentioning the issue terms (used when no query is given)."
    )]
    pub issues_only: bool,

    #[arg(
        short = 'c',
        long = "ctr",
        visible_alias = "center",
        value_name = "NAME",
        help_heading = "Search",
        help = "Only rows from this call center (exact match)."
    )]
    pub center: Option<String>,

    #[arg(
        short = 'p',
        long = "pg",
        visible_alias = "page",
        value_name = "N",
        help_heading = "Search",
        help = "Result page to show (1-based)."
    )]
    pub page: Option<usize>,

    #[arg(
        long = "ps",
        visible_alias = "page-size",
        value_name = "N",
        help_heading = "Search",
        help = "Rows per page (default 25)."
    )]
    pub page_size: Option<usize>,

    #[arg(
        long = "lsc",
        visible_alias = "list-centers",
        help_heading = "Output",
        help = "List the call centers present in the sheet."
    )]
    pub list_centers: bool,

    #[arg(
        short = 'e',
        long = "exp",
        visible_alias = "export",
        help_heading = "Output",
        help = "Export the report for the current search."
    )]
    pub export: bool,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Report file path (implies --export; default reviews_<terms>.<ext>)."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Report format (html, json, text)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'x',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'i',
        long = "int",
        visible_alias = "interactive",
        help_heading = "Mode",
        help = "Browse the sheet with an interactive prompt."
    )]
    pub interactive: bool,
}
