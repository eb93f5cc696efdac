use std::collections::HashSet;

use crate::domain::Record;

/// Keeps the first record of every `(sender, content)` pair, preserving order.
pub fn dedup_records(records: Vec<Record>) -> Vec<Record> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert((record.sender.clone(), record.content.clone())))
        .collect()
}
