//! Best-guess mapping from a display name to a stable player id.
//!
//! Names shared by several players resolve to whoever played most recently. There is no
//! disambiguation by birth year or team, so common names can pick the wrong person.

use crate::source::{IdentityCandidate, IdentitySource};
use itertools::Itertools;
use std::cmp::Ordering;

/// Splits `First [Middle] Last` into `(surname, given)`. Single-token names can't be split.
pub fn split_name(player_name: &str) -> Option<(String, String)> {
    let mut parts: Vec<&str> = player_name.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }
    let surname = parts.pop()?.to_string();
    Some((surname, parts.join(" ")))
}

/// Returns the player id for `player_name`, or an empty string if nothing matched.
pub fn resolve(source: &dyn IdentitySource, player_name: &str) -> String {
    let Some((surname, given)) = split_name(player_name) else {
        log::debug!("cannot split name {:?}", player_name);
        return String::new();
    };

    match source.lookup(&surname, &given) {
        Ok(candidates) => {
            let id = best_candidate(candidates);
            if id.is_empty() {
                log::debug!("no id for {}", player_name);
            }
            id
        }
        Err(e) => {
            log::debug!("lookup failed for {}: {}", player_name, e);
            String::new()
        }
    }
}

/// Most recent `played_last`, then most recent `played_first`. Missing seasons sort last.
pub fn best_candidate(candidates: Vec<IdentityCandidate>) -> String {
    candidates
        .into_iter()
        .sorted_by(|a, b| {
            desc_nulls_last(a.played_last, b.played_last)
                .then_with(|| desc_nulls_last(a.played_first, b.played_first))
        })
        .filter_map(|c| c.key)
        .find(|key| !key.trim().is_empty())
        .unwrap_or_default()
}

fn desc_nulls_last(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
