use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::aggregate::{count_by_center, CenterCount};
use crate::dataset::{Dataset, Record};
use crate::explorer::Explorer;
use crate::paginate::Pager;
use crate::report::document::{Element, PagedDocument};
use crate::schema::resolve_call_center_field;
use crate::search::{filter_records, MatchTermSet, QueryState};
use crate::sheets::{self, SheetsConfig, SheetsError};

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|x| x.to_string()).collect()
}

fn sample() -> Dataset {
    Dataset::from_rows(
        strings(&["Timestamp", "Call Center", "Agent's Name", "Concern for Review"]),
        vec![
            strings(&["2025-01-02", "A", "Ann", "Dropped call"]),
            strings(&["2025-01-03", "B", "Bob", "Headset broken"]),
            strings(&["2025-01-04", "A", "Cid", "Slow refund"]),
        ],
    )
}

fn texts(doc: &PagedDocument) -> Vec<String> {
    doc.pages
        .iter()
        .flat_map(|p| p.elements.iter())
        .filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn exact_cased_alias_is_returned_verbatim() {
    let headers = strings(&["Timestamp", "Call Center", "Agent"]);
    assert_eq!(
        resolve_call_center_field(&headers).as_deref(),
        Some("Call Center")
    );
}

#[test]
fn no_alias_falls_back_to_first_header_or_none() {
    let headers = strings(&["Region", "Agent"]);
    assert_eq!(resolve_call_center_field(&headers).as_deref(), Some("Region"));
    assert_eq!(resolve_call_center_field(&[]), None);
}

#[test]
fn blank_record_matches_only_empty_term_set() {
    let headers = strings(&["A", "B"]);
    let blank = Record::from_pairs([("A", ""), ("B", "")]);
    assert!(MatchTermSet::default().matches(&blank, &headers));
    assert!(!MatchTermSet::parse("x").matches(&blank, &headers));
}

#[test]
fn filtering_is_idempotent() {
    let ds = sample();
    let terms = MatchTermSet::parse("a|headset");
    let once = filter_records(&ds.records, &ds.headers, &terms, Some("Call Center"), None);
    let twice = filter_records(once.iter().copied(), &ds.headers, &terms, Some("Call Center"), None);
    assert_eq!(once, twice);
}

#[test]
fn query_splits_on_space_and_pipe() {
    assert_eq!(
        MatchTermSet::parse("headset connection").terms(),
        ["headset", "connection"]
    );
    assert_eq!(
        MatchTermSet::parse("headset|connection").terms(),
        ["headset", "connection"]
    );
}

#[test]
fn counts_sum_to_filtered_rows() {
    let ds = sample();
    let terms = MatchTermSet::parse("a");
    let rows = filter_records(&ds.records, &ds.headers, &terms, Some("Call Center"), None);
    let counts = count_by_center(&rows, Some("Call Center"));
    assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), rows.len());
}

#[test]
fn pagination_of_sixty_rows() {
    let rows: Vec<usize> = (0..60).collect();
    let p = Pager::new(rows.len(), 25);
    assert_eq!(p.page_count(), 3);
    assert_eq!(p.slice(&rows, 1), &rows[0..25]);
    assert_eq!(p.slice(&rows, 3), &rows[50..60]);
}

#[test]
fn unfiltered_view_counts_centers() {
    let explorer = Explorer::new(sample());
    let view = explorer.view(&QueryState::default());
    assert_eq!(
        view.counts,
        vec![
            CenterCount {
                label: "A".to_string(),
                count: 2
            },
            CenterCount {
                label: "B".to_string(),
                count: 1
            },
        ]
    );
    assert_eq!(view.records.len(), 3);
    assert_eq!(view.page_records().len(), 3);
}

#[test]
fn query_matches_case_insensitively_then_center_restricts() {
    let explorer = Explorer::new(sample());
    let state = QueryState::default().with_query("headset");
    let view = explorer.view(&state);
    assert_eq!(view.records, vec![&explorer.dataset().records[1]]);

    let restricted = explorer.view(&state.with_center(Some("A".to_string())));
    assert!(restricted.is_empty());

    let all_a = explorer.view(&QueryState::default().with_center(Some("A".to_string())));
    assert_eq!(all_a.records.len(), 2);
    assert!(all_a.records.iter().all(|r| r.get("Call Center") == "A"));
}

#[test]
fn center_filter_is_exact_and_trimmed() {
    let ds = Dataset::from_rows(
        strings(&["Center"]),
        vec![strings(&[" A "]), strings(&["a"]), strings(&["AB"])],
    );
    let explorer = Explorer::new(ds);
    let view = explorer.view(&QueryState::default().with_center(Some("A".to_string())));
    assert_eq!(view.records.len(), 1);
}

#[test]
fn term_labels() {
    assert_eq!(MatchTermSet::default().label(), "(all rows)");
    assert_eq!(
        MatchTermSet::parse("headset connection").label(),
        "headset OR connection"
    );
}

#[test]
fn issues_toggle_uses_configured_terms() {
    let explorer = Explorer::new(sample()).with_issue_terms(vec!["refund".to_string()]);
    assert_eq!(explorer.issue_terms(), ["refund"]);
    let view = explorer.view(&QueryState::default().with_issues_only(true));
    assert_eq!(view.records.len(), 1);
    assert_eq!(view.records[0].get("Agent's Name"), "Cid");
}

#[test]
fn requested_page_is_clamped() {
    let explorer = Explorer::new(sample()).with_page_size(2);
    assert_eq!(explorer.page_size(), 2);
    let view = explorer.view(&QueryState::default().with_page(9));
    assert_eq!(view.page, 2);
    assert_eq!(view.page_records().len(), 1);
}

#[test]
fn report_has_title_summary_and_sections() {
    let explorer = Explorer::new(sample());
    let mut doc = PagedDocument::default();
    explorer
        .export(&QueryState::default(), &mut doc, "2025-06-01 10:00:00")
        .unwrap();

    let t = texts(&doc);
    assert_eq!(t[0], "Reviews Search – \"(all rows)\"");
    assert_eq!(t[1], "Generated: 2025-06-01 10:00:00");
    assert_eq!(t[2], "A — 2 match(es)");
    assert_eq!(t[3], "B — 1 match(es)");

    let tables: Vec<&Element> = doc.pages[0]
        .elements
        .iter()
        .filter(|e| matches!(e, Element::Table { .. }))
        .collect();
    assert_eq!(tables.len(), 3);
    match tables[0] {
        Element::Table { rows, .. } => {
            assert_eq!(rows[0].cells, ["Call Center", "Mentions of \"(all rows)\""]);
            assert_eq!(rows[1].cells, ["A", "2"]);
            assert_eq!(rows[2].cells, ["B", "1"]);
            assert_eq!(rows[0].y, 30.0);
        }
        _ => unreachable!(),
    }
    match tables[1] {
        Element::Table { rows, .. } => {
            assert_eq!(
                rows[0].cells,
                ["Timestamp", "Agent's Name", "Concern for Review"]
            );
            assert_eq!(rows[1].cells, ["2025-01-02", "Ann", "Dropped call"]);
        }
        _ => unreachable!(),
    }
}

#[test]
fn unknown_center_rows_get_their_own_section() {
    let ds = Dataset::from_rows(
        strings(&["Call Center", "Agent"]),
        vec![strings(&["", "Ann"]), strings(&["A", "Bob"])],
    );
    let explorer = Explorer::new(ds);
    let mut doc = PagedDocument::default();
    explorer
        .export(&QueryState::default(), &mut doc, "now")
        .unwrap();
    let t = texts(&doc);
    assert!(t.contains(&"(Unknown) — 1 match(es)".to_string()));
    assert!(t.contains(&"A — 1 match(es)".to_string()));
}

#[test]
fn many_centers_spill_onto_later_pages() {
    let rows = (0..40)
        .map(|i| strings(&[&format!("Center {i:02}"), "Ann", "headset issue"]))
        .collect();
    let ds = Dataset::from_rows(strings(&["Call Center", "Agent", "Concern"]), rows);
    let explorer = Explorer::new(ds);
    let mut doc = PagedDocument::default();
    explorer
        .export(&QueryState::default().with_query("headset"), &mut doc, "now")
        .unwrap();
    assert!(doc.page_count() > 1);
    let last_page_text = doc
        .pages
        .last()
        .and_then(|p| {
            p.elements.iter().find_map(|e| match e {
                Element::Text { y, .. } => Some(*y),
                _ => None,
            })
        })
        .unwrap();
    assert!(last_page_text <= 270.0);
}

#[test]
fn sheet_values_become_records() {
    let body = r#"{
        "range": "'2025'!A1:R3",
        "majorDimension": "ROWS",
        "values": [
            ["Timestamp", "Call\nCenter", ""],
            ["2025-01-02", "A", "x", "ignored"],
            ["2025-01-03", 7]
        ]
    }"#;
    let ds = sheets::parse_values_response(body).unwrap();
    assert_eq!(ds.headers, ["Timestamp", "Call Center", "COL_2"]);
    assert_eq!(ds.records.len(), 2);
    assert_eq!(ds.records[1].get("Call Center"), "7");
    assert_eq!(ds.records[1].get("COL_2"), "");
}

#[test]
fn empty_sheet_is_empty_dataset() {
    let ds = sheets::parse_values_response(r#"{"range":"A1:R"}"#).unwrap();
    assert!(ds.is_empty());
    assert!(ds.headers.is_empty());
}

async fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let mut seen = Vec::new();
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            seen.extend_from_slice(&buf[..n]);
            if seen.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });
    format!("http://{addr}")
}

fn local_config(api_base: String) -> SheetsConfig {
    SheetsConfig {
        api_key: Some("k".to_string()),
        spreadsheet_id: Some("sheet".to_string()),
        api_base,
        timeout_seconds: 5,
        ..SheetsConfig::default()
    }
}

#[tokio::test]
async fn fetch_parses_successful_response() {
    let base = serve_once(
        "200 OK",
        r#"{"values":[["Call Center","Concern"],["A","Headset broken"]]}"#,
    )
    .await;
    let ds = sheets::fetch_dataset(&local_config(base)).await.unwrap();
    assert_eq!(ds.headers, ["Call Center", "Concern"]);
    assert_eq!(ds.records[0].get("Concern"), "Headset broken");
}

#[tokio::test]
async fn fetch_surfaces_upstream_error_message() {
    let base = serve_once(
        "403 Forbidden",
        r#"{"error":{"code":403,"message":"The caller does not have permission"}}"#,
    )
    .await;
    match sheets::fetch_dataset(&local_config(base)).await {
        Err(SheetsError::Status { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "The caller does not have permission");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
