use crate::paginate::Pager;
use crate::search::QueryState;

pub const QUICK_TERMS: [&str; 2] = ["headset", "connection"];

/// One line typed at the interactive prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Issues(bool),
    Center(Option<String>),
    Quick(String),
    Clear,
    First,
    Prev,
    Next,
    Last,
    Page(usize),
    Centers,
    Export(Option<String>),
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  search <text>     search all columns (terms split on spaces or '|'); empty clears
  issues on|off     toggle the issue-term filter
  center <name|all> filter by call center
  quick <term>      quick search (headset, connection)
  clear             reset search, toggle, center and page
  first | prev | next | last | page <n>
  centers           list call centers
  export [file]     write the report for the current search
  help | quit";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };
    match head.to_lowercase().as_str() {
        "search" | "s" | "/" => Ok(Command::Search(rest.to_string())),
        "issues" => match rest.to_lowercase().as_str() {
            "" | "on" | "true" | "yes" => Ok(Command::Issues(true)),
            "off" | "false" | "no" => Ok(Command::Issues(false)),
            other => Err(format!("expected on or off, got '{other}'")),
        },
        "center" | "c" => {
            if rest.is_empty() || rest.eq_ignore_ascii_case("all") {
                Ok(Command::Center(None))
            } else {
                Ok(Command::Center(Some(rest.to_string())))
            }
        }
        "quick" => {
            let term = rest.to_lowercase();
            if QUICK_TERMS.contains(&term.as_str()) {
                Ok(Command::Quick(term))
            } else {
                Err(format!("unknown quick term '{rest}' (try {})", QUICK_TERMS.join(", ")))
            }
        }
        "clear" => Ok(Command::Clear),
        "first" => Ok(Command::First),
        "prev" | "p" => Ok(Command::Prev),
        "next" | "n" | "" => Ok(Command::Next),
        "last" => Ok(Command::Last),
        "page" => rest
            .parse::<usize>()
            .ok()
            .filter(|p| *p > 0)
            .map(Command::Page)
            .ok_or_else(|| format!("invalid page '{rest}'")),
        "centers" => Ok(Command::Centers),
        "export" | "e" => Ok(Command::Export(if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        })),
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}' (type help)")),
    }
}

/// Applies a state-changing command. Filter changes reset the page;
/// navigation is clamped by `pager`.
pub fn apply(state: &QueryState, cmd: &Command, pager: &Pager) -> QueryState {
    let page = state.page.clamp(1, pager.page_count());
    match cmd {
        Command::Search(text) => state.with_query(text.clone()),
        Command::Issues(on) => state.with_issues_only(*on),
        Command::Center(center) => state.with_center(center.clone()),
        Command::Quick(term) => state.quick_search(term.clone()),
        Command::Clear => state.cleared(),
        Command::First => state.with_page(pager.first(page)),
        Command::Prev => state.with_page(pager.prev(page)),
        Command::Next => state.with_page(pager.next(page)),
        Command::Last => state.with_page(pager.last(page)),
        Command::Page(n) => state.with_page((*n).clamp(1, pager.page_count())),
        Command::Centers | Command::Export(_) | Command::Help | Command::Quit => state.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_command("search headset|mic").unwrap(),
            Command::Search("headset|mic".to_string())
        );
        assert_eq!(parse_command("center all").unwrap(), Command::Center(None));
        assert_eq!(
            parse_command("center  Manila North ").unwrap(),
            Command::Center(Some("Manila North".to_string()))
        );
        assert_eq!(parse_command("issues off").unwrap(), Command::Issues(false));
        assert_eq!(parse_command("page 3").unwrap(), Command::Page(3));
        assert_eq!(parse_command("").unwrap(), Command::Next);
        assert!(parse_command("page 0").is_err());
        assert!(parse_command("quick mic").is_err());
        assert!(parse_command("bogus").is_err());
    }

    #[test]
    fn navigation_clamps_and_filters_reset() {
        let pager = Pager::new(60, 25);
        let s = QueryState::default();
        let s = apply(&s, &Command::Prev, &pager);
        assert_eq!(s.page, 1);
        let s = apply(&s, &Command::Last, &pager);
        assert_eq!(s.page, 3);
        let s = apply(&s, &Command::Next, &pager);
        assert_eq!(s.page, 3);
        let s = apply(&s, &Command::Page(9), &pager);
        assert_eq!(s.page, 3);
        let s = apply(&s, &Command::Search("x".to_string()), &pager);
        assert_eq!(s.page, 1);
    }
}
