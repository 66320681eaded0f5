use std::collections::HashMap;

use serde::Serialize;

/// One sheet row keyed by header name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    values: HashMap<String, String>,
}

impl Record {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Missing fields read as the empty string.
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// Trimmed value of `field`, or "" when `field` is `None`.
    pub fn trimmed(&self, field: Option<&str>) -> &str {
        match field {
            Some(f) => self.get(f).trim(),
            None => "",
        }
    }
}

/// Header list plus records in fetch order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    /// Builds a dataset from a header row and raw data rows.
    ///
    /// Short rows are padded with empty cells. A repeated header keeps its first
    /// position in the header list and takes the value of its last column.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut ordered: Vec<String> = Vec::with_capacity(headers.len());
        for h in headers.iter() {
            if !ordered.contains(h) {
                ordered.push(h.clone());
            }
        }

        let records = if headers.is_empty() {
            Vec::new()
        } else {
            rows.into_iter()
                .map(|row| {
                    let mut values = HashMap::with_capacity(headers.len());
                    for (i, h) in headers.iter().enumerate() {
                        let cell = row.get(i).cloned().unwrap_or_default();
                        values.insert(h.clone(), cell);
                    }
                    Record::new(values)
                })
                .collect()
        };

        // headers are only meaningful when at least one record carries them
        let headers = if records.is_empty() { Vec::new() } else { ordered };

        Self { headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn short_rows_are_padded_with_empty_cells() {
        let ds = Dataset::from_rows(s(&["A", "B", "C"]), vec![s(&["1"])]);
        assert_eq!(ds.records[0].get("A"), "1");
        assert_eq!(ds.records[0].get("B"), "");
        assert_eq!(ds.records[0].get("C"), "");
    }

    #[test]
    fn header_only_sheet_has_no_headers() {
        let ds = Dataset::from_rows(s(&["A", "B"]), Vec::new());
        assert!(ds.is_empty());
        assert!(ds.headers.is_empty());
    }

    #[test]
    fn repeated_header_keeps_first_position_last_value() {
        let ds = Dataset::from_rows(s(&["A", "B", "A"]), vec![s(&["1", "2", "3"])]);
        assert_eq!(ds.headers, s(&["A", "B"]));
        assert_eq!(ds.records[0].get("A"), "3");
    }
}
