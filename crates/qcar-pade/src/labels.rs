//! Qualitative labels built from Q-table rows.

use std::collections::BTreeMap;

use crate::error::PadeError;
use crate::matrix::QTable;

/// Formats one row of signs as `Q(+a, -b)`, skipping zero cells.
pub fn format_label<S: AsRef<str>>(signs: &[i8], names: &[S]) -> String {
    let terms: Vec<String> = signs
        .iter()
        .zip(names)
        .filter(|&(&s, _)| s != 0)
        .map(|(&s, name)| {
            let prefix = if s > 0 { '+' } else { '-' };
            format!("{prefix}{}", name.as_ref())
        })
        .collect();
    format!("Q({})", terms.join(", "))
}

/// One label per Q-table row, naming attributes in the order given.
///
/// # Errors
///
/// Returns `PadeError::NameCount` unless there is exactly one name per
/// column.
pub fn build_labels<S: AsRef<str>>(table: &QTable, names: &[S]) -> Result<Vec<String>, PadeError> {
    if names.len() != table.ncols() {
        return Err(PadeError::NameCount {
            expected: table.ncols(),
            found: names.len(),
        });
    }
    Ok((0..table.nrows())
        .map(|i| format_label(table.row(i), names))
        .collect())
}

/// Maps labels to class ids.
///
/// Returns the class id of each label and the distinct labels sorted
/// lexicographically; a label's id is its index in that list.
pub fn enumerate_labels<S: AsRef<str>>(labels: &[S]) -> (Vec<usize>, Vec<String>) {
    let ids: BTreeMap<&str, usize> = labels
        .iter()
        .map(|l| (l.as_ref(), 0))
        .collect::<BTreeMap<_, _>>()
        .into_keys()
        .enumerate()
        .map(|(id, label)| (label, id))
        .collect();

    let classes = labels.iter().map(|l| ids[l.as_ref()]).collect();
    let names = ids.into_keys().map(str::to_owned).collect();
    (classes, names)
}
