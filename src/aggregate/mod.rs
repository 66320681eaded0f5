use std::collections::HashMap;

use serde::Serialize;

use crate::dataset::Record;

pub const UNKNOWN_CENTER: &str = "(Unknown)";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CenterCount {
    pub label: String,
    pub count: usize,
}

/// Group label for `record`: its trimmed center value, or `(Unknown)`.
pub fn center_label(record: &Record, call_center_field: Option<&str>) -> String {
    let v = record.trimmed(call_center_field);
    if v.is_empty() {
        UNKNOWN_CENTER.to_string()
    } else {
        v.to_string()
    }
}

/// Per-center counts, highest first; ties keep first-seen order.
pub fn count_by_center(records: &[&Record], call_center_field: Option<&str>) -> Vec<CenterCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<CenterCount> = Vec::new();
    for r in records {
        let label = center_label(r, call_center_field);
        match index.get(&label) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(label.clone(), counts.len());
                counts.push(CenterCount { label, count: 1 });
            }
        }
    }
    // sort_by is stable
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(center: &str) -> Record {
        Record::from_pairs([("Call Center", center)])
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let rows = [rec("B"), rec("A"), rec("C"), rec("A")];
        let refs: Vec<&Record> = rows.iter().collect();
        let counts = count_by_center(&refs, Some("Call Center"));
        let labels: Vec<&str> = counts.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["A", "B", "C"]);
    }

    #[test]
    fn blank_center_is_unknown() {
        let rows = [rec("  "), rec(" A ")];
        let refs: Vec<&Record> = rows.iter().collect();
        let counts = count_by_center(&refs, Some("Call Center"));
        assert_eq!(counts[0].label, UNKNOWN_CENTER);
        assert_eq!(counts[1].label, "A");
    }
}
