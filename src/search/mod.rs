use crate::engine::models::MapCandidate;
use crate::util::contains_ignore_case;

/// Whether a candidate matches the search query. An empty query matches
/// everything; otherwise the query must be a case-insensitive substring of
/// the display name or of the folder name.
#[must_use]
pub fn matches_query(query: &str, candidate: &MapCandidate) -> bool {
    query.is_empty()
        || contains_ignore_case(&candidate.display_name, query)
        || contains_ignore_case(&candidate.folder_name, query)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterOutcome {
    pub filtered: Vec<MapCandidate>,
    pub selected: Option<MapCandidate>,
}

/// Recompute the filtered view and reconcile the previous selection against
/// it. The selection survives a re-filter iff its identity is still present;
/// otherwise it is cleared, never reassigned to a different candidate.
#[must_use]
pub fn apply_query(
    query: &str,
    candidates: &[MapCandidate],
    previous: Option<&MapCandidate>,
) -> FilterOutcome {
    let filtered: Vec<MapCandidate> = candidates
        .iter()
        .filter(|candidate| matches_query(query, candidate))
        .cloned()
        .collect();

    let selected = previous
        .filter(|prev| {
            filtered
                .iter()
                .any(|candidate| candidate.folder_name == prev.folder_name)
        })
        .cloned();

    FilterOutcome { filtered, selected }
}

/// Move the selection up or down the filtered view, clamped at both ends.
/// An empty view is a no-op: the selection stays none.
#[must_use]
pub fn step_selection(
    filtered: &[MapCandidate],
    selected: Option<&MapCandidate>,
    delta: i32,
) -> Option<MapCandidate> {
    if filtered.is_empty() {
        return None;
    }
    let current = selected.and_then(|sel| {
        filtered
            .iter()
            .position(|candidate| candidate.folder_name == sel.folder_name)
    });
    let next = match current {
        Some(index) => (index as i32 + delta).clamp(0, filtered.len() as i32 - 1) as usize,
        None => 0,
    };
    Some(filtered[next].clone())
}
