use std::collections::HashSet;
use std::path::Path;

use survey_stats::Answer;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Respondent identifiers: the file name and the row number in the spreadsheet
/// (the header is row 1).
pub fn make_default_id_lineno(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// Header names. Empty cells get a placeholder name based on their position.
pub fn header_name(idx: usize, cell: Option<String>) -> String {
    match cell {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => format!("Unnamed: {}", idx),
    }
}

pub fn find_duplicate(header: &[String]) -> Option<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    header
        .iter()
        .find(|c| !seen.insert(c.as_str()))
        .cloned()
}

/// For each expected column, finds its position in `found`.
///
/// Fails with the missing and the unexpected columns when the two headers do not
/// have the same set of names. Both headers are assumed to be free of duplicates.
pub fn align_columns(
    expected: &[String],
    found: &[String],
) -> Result<Vec<usize>, (Vec<String>, Vec<String>)> {
    let missing: Vec<String> = expected
        .iter()
        .filter(|c| !found.contains(c))
        .cloned()
        .collect();
    let unexpected: Vec<String> = found
        .iter()
        .filter(|c| !expected.contains(c))
        .cloned()
        .collect();
    if !missing.is_empty() || !unexpected.is_empty() {
        return Err((missing, unexpected));
    }
    let mut mapping: Vec<usize> = Vec::with_capacity(expected.len());
    for c in expected {
        match found.iter().position(|f| f == c) {
            Some(idx) => mapping.push(idx),
            None => return Err((vec![c.clone()], vec![])),
        }
    }
    Ok(mapping)
}

pub fn reorder_answers(mut answers: Vec<Answer>, mapping: &[usize]) -> Vec<Answer> {
    mapping
        .iter()
        .map(|idx| match answers.get_mut(*idx) {
            Some(a) => std::mem::replace(a, Answer::Missing),
            None => Answer::Missing,
        })
        .collect()
}
