//! Word-overlap scoring of catalog candidates

use crate::model::Ref;
use crate::query::FlowQuery;

/// Sum of the character lengths of all `words` that occur in `text`,
/// ignoring case. Longer shared words weigh more than short generic ones.
pub fn match_length<'a, I>(text: &str, words: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    let text = text.to_lowercase();
    words
        .into_iter()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .filter(|w| text.contains(w.as_str()))
        .map(|w| w.chars().count())
        .sum()
}

/// Score of a candidate name against a query name split on whitespace.
pub fn name_score(query_name: &str, candidate_name: &str) -> usize {
    match_length(candidate_name, query_name.split_whitespace())
}

/// Score of a candidate category path against a `/` separated query path.
pub fn category_score(query_category: &str, candidate_path: &[String]) -> usize {
    if query_category.trim().is_empty() {
        return 0;
    }
    match_length(&candidate_path.join("/"), query_category.split('/'))
}

/// Case-insensitive location equality; an empty query location never matches.
pub fn location_matches(query_location: &str, candidate_location: Option<&str>) -> bool {
    let query_location = query_location.trim();
    if query_location.is_empty() {
        return false;
    }
    candidate_location
        .map(|l| l.trim().eq_ignore_ascii_case(query_location))
        .unwrap_or(false)
}

/// How well a candidate fits a query. The name score is primary; location
/// equality and then category overlap only break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchScore {
    pub name: usize,
    pub location: bool,
    pub category: usize,
}

impl MatchScore {
    pub fn of(query: &FlowQuery, candidate: &Ref) -> Self {
        MatchScore {
            name: name_score(query.name(), &candidate.name),
            location: location_matches(query.location(), candidate.location.as_deref()),
            category: category_score(query.category(), &candidate.category_path),
        }
    }

    /// Whether a candidate with this score should replace the current best.
    /// Equal scores never replace, so the first candidate wins a full tie.
    pub fn is_better_than(&self, current: &MatchScore) -> bool {
        if self.name != current.name {
            return self.name > current.name;
        }
        if self.location != current.location {
            return self.location;
        }
        self.category > current.category
    }
}
