//! Column resolution strategies.
//!
//! A [`ColumnSet`] is derived fresh for every operation, either from a
//! header row, from the records about to be written, or from both (merge).
//! Lookup is case-insensitive while the stored name preserves the casing it
//! first appeared with. The set always satisfies
//! `columns[i].source_index == i`.

use rustc_hash::FxHashMap;

use crate::project::Record;

/// One logical field with its stable position in a raw row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub source_index: usize,
}

/// Ordered column list with a case-folded name index.
#[derive(Clone, Debug, Default)]
pub struct ColumnSet {
    columns: Vec<Column>,
    by_folded: FxHashMap<String, usize>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// From-header strategy: every cell of the designated row becomes a
    /// column at its position, duplicates and empty names included (the
    /// source grid may contain them; only the first occurrence is
    /// addressable by name).
    pub fn from_header_cells<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut set = Self::new();
        for name in names {
            let index = set.columns.len();
            set.by_folded.entry(name.to_lowercase()).or_insert(index);
            set.columns.push(Column {
                name,
                source_index: index,
            });
        }
        set
    }

    /// From-data strategy: the union of all record keys in first-seen
    /// order. Records need not share a uniform key set.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut set = Self::new();
        set.merge_record_keys(records);
        set
    }

    /// Merge strategy: append every record key not already present
    /// (case-insensitively), continuing the index sequence.
    pub fn merge_record_keys<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a Record>,
    {
        for record in records {
            for key in record.keys() {
                let folded = key.to_lowercase();
                if self.by_folded.contains_key(&folded) {
                    continue;
                }
                let index = self.columns.len();
                self.by_folded.insert(folded, index);
                self.columns.push(Column {
                    name: key.clone(),
                    source_index: index,
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Case-insensitive position lookup; the position equals the column's
    /// `source_index`.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.by_folded.get(&name.to_lowercase()).copied()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Comma-separated name list, used by unmatched-field errors.
    pub fn names_joined(&self) -> String {
        self.names().collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: &[(&str, serde_json::Value)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn header_cells_keep_position_and_duplicates() {
        let set = ColumnSet::from_header_cells(
            ["Name", "stocks", "stocks"].map(String::from),
        );
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(2).unwrap().name, "stocks");
        assert_eq!(set.get(2).unwrap().source_index, 2);
        // Only the first duplicate is addressable by name.
        assert_eq!(set.position_of("STOCKS"), Some(1));
        for (i, col) in set.columns().iter().enumerate() {
            assert_eq!(col.source_index, i);
        }
    }

    #[test]
    fn from_records_unions_keys_in_first_seen_order() {
        let records = [
            record(&[("b", json!(1)), ("a", json!(2))]),
            record(&[("A", json!(3)), ("c", json!(4))]),
        ];
        let set = ColumnSet::from_records(records.iter());
        let names: Vec<_> = set.names().collect();
        assert_eq!(names, ["b", "a", "c"]);
        // `A` matched the existing `a` column case-insensitively.
        assert_eq!(set.position_of("A"), Some(1));
    }

    #[test]
    fn merge_appends_unseen_keys_after_the_header() {
        let mut set = ColumnSet::from_header_cells(["Subname", "ACI"].map(String::from));
        let records = [record(&[("Subname", json!("X")), ("NewCol", json!("Y"))])];
        set.merge_record_keys(records.iter());
        let names: Vec<_> = set.names().collect();
        assert_eq!(names, ["Subname", "ACI", "NewCol"]);
        assert_eq!(set.position_of("newcol"), Some(2));
    }
}
