//! Budgeted serialization of a change summary.
//!
//! Output is compact JSON of the form `{"files":[{"f":..,"c":..},..]}` and
//! never exceeds the byte budget unless even the minimal fallback does.
//!
//! The search tries each entry in [`TRUNCATION_STEPS`] in order, and for each
//! one keeps the longest prefix of the change list that fits. The first fit
//! wins: full details on a few files are preferred over truncated details on
//! many.

use serde::Serialize;

use autocommiter_core::FileChange;

use crate::builder::FALLBACK_MARKER;

/// Per-file detail length caps, in characters. `None` keeps the full detail.
pub const TRUNCATION_STEPS: [Option<usize>; 5] = [None, Some(12), Some(6), Some(3), Some(1)];

pub const EMPTY_PAYLOAD: &str = r#"{"files":[]}"#;

const PREFIX: &str = r#"{"files":["#;
const SUFFIX: &str = "]}";

#[derive(Serialize)]
struct Payload<'a> {
    files: &'a [FileChange],
}

/// Serialize `changes` into at most `budget` bytes.
pub fn compress(changes: &[FileChange], budget: usize) -> String {
    if changes.is_empty() {
        return EMPTY_PAYLOAD.to_string();
    }

    for limit in TRUNCATION_STEPS {
        let entries: Vec<String> = changes
            .iter()
            .map(|change| entry_json(&truncated(change, limit)))
            .collect();

        let keep = longest_fitting_prefix(&entries, budget);
        if keep > 0 {
            if keep < changes.len() || limit.is_some() {
                tracing::debug!(
                    kept = keep,
                    total = changes.len(),
                    ?limit,
                    budget,
                    "compressed change summary"
                );
            }
            return format!("{PREFIX}{}{SUFFIX}", entries[..keep].join(","));
        }
    }

    tracing::warn!(budget, "change summary does not fit; sending minimal payload");
    minimal_payload(changes)
}

/// Largest `n` such that the first `n` entries, joined, fit the budget.
fn longest_fitting_prefix(entries: &[String], budget: usize) -> usize {
    let mut size = PREFIX.len() + SUFFIX.len();
    let mut keep = 0;
    for (i, entry) in entries.iter().enumerate() {
        size += entry.len() + usize::from(i > 0);
        if size > budget {
            break;
        }
        keep = i + 1;
    }
    keep
}

fn truncated(change: &FileChange, limit: Option<usize>) -> FileChange {
    match limit {
        Some(n) => FileChange {
            file: change.file.clone(),
            change: change.change.chars().take(n).collect(),
        },
        None => change.clone(),
    }
}

fn entry_json(change: &FileChange) -> String {
    serde_json::to_string(change).unwrap_or_else(|_| String::from("{}"))
}

/// Basename of the first file with the generic marker.
fn minimal_payload(changes: &[FileChange]) -> String {
    let first = &changes[0].file;
    let base = first.rsplit('/').next().unwrap_or(first);
    let only = [FileChange::new(base, FALLBACK_MARKER)];
    serde_json::to_string(&Payload { files: &only }).unwrap_or_else(|_| EMPTY_PAYLOAD.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample(n: usize, detail: &str) -> Vec<FileChange> {
        (0..n)
            .map(|i| FileChange::new(format!("src/module_{i:03}.rs"), detail))
            .collect()
    }

    fn decode(payload: &str) -> Vec<(String, String)> {
        let value: serde_json::Value = serde_json::from_str(payload).expect("valid json");
        value["files"]
            .as_array()
            .expect("files array")
            .iter()
            .map(|e| {
                (
                    e["f"].as_str().unwrap().to_string(),
                    e["c"].as_str().unwrap().to_string(),
                )
            })
            .collect()
    }

    /// Reference search: serialize every candidate in full.
    fn brute_force(changes: &[FileChange], budget: usize) -> Option<String> {
        for limit in TRUNCATION_STEPS {
            for keep in (1..=changes.len()).rev() {
                let files: Vec<_> = changes[..keep].iter().map(|c| truncated(c, limit)).collect();
                let json = serde_json::to_string(&Payload { files: &files }).unwrap();
                if json.len() <= budget {
                    return Some(json);
                }
            }
        }
        None
    }

    #[test]
    fn empty_input_is_empty_payload() {
        assert_eq!(compress(&[], 0), EMPTY_PAYLOAD);
        assert_eq!(compress(&[], 12_000), EMPTY_PAYLOAD);
    }

    #[test]
    fn fits_untouched_when_budget_allows() {
        let changes = sample(3, "10+/2−");
        let out = compress(&changes, 12_000);
        assert_eq!(
            out,
            serde_json::to_string(&Payload { files: &changes }).unwrap()
        );
    }

    #[test]
    fn escapes_like_serde() {
        let changes = vec![FileChange::new("we\"ird\\name.rs", "line \"quoted\"\tend")];
        assert_eq!(
            compress(&changes, 12_000),
            serde_json::to_string(&Payload { files: &changes }).unwrap()
        );
    }

    #[rstest]
    #[case(40)]
    #[case(60)]
    #[case(120)]
    #[case(400)]
    #[case(1_000)]
    fn matches_exhaustive_search(#[case] budget: usize) {
        let mut changes = sample(12, "diff --git a/src b/src changed");
        changes[4].change = "5+/1−".into();
        changes[7].change = "ünïcödé détails ➜ here".into();
        let expected = brute_force(&changes, budget).unwrap_or_else(|| minimal_payload(&changes));
        assert_eq!(compress(&changes, budget), expected);
    }

    #[rstest]
    #[case(30)]
    #[case(80)]
    #[case(250)]
    #[case(12_000)]
    fn never_exceeds_budget_when_a_fit_exists(#[case] budget: usize) {
        let changes = sample(50, "a fairly long change description line");
        let out = compress(&changes, budget);
        if brute_force(&changes, budget).is_some() {
            assert!(out.len() <= budget, "{} > {budget}", out.len());
        }
    }

    #[test]
    fn deterministic() {
        let changes = sample(30, "12+/4−");
        assert_eq!(compress(&changes, 300), compress(&changes, 300));
    }

    #[test]
    fn shrinking_budget_never_grows_detail() {
        let changes = sample(8, "a detailed excerpt of the change");
        let mut previous: Option<(usize, usize)> = None;
        for budget in (50..=600).rev().step_by(7) {
            let decoded = decode(&compress(&changes, budget));
            let detail = decoded.iter().map(|(_, c)| c.chars().count()).max().unwrap_or(0);
            if let Some((prev_detail, _)) = previous {
                assert!(detail <= prev_detail, "detail grew at budget {budget}");
            }
            previous = Some((detail, decoded.len()));
        }
    }

    #[test]
    fn first_fitting_step_wins() {
        let changes = sample(4, "a detailed excerpt of the change");
        let one_full = serde_json::to_string(&Payload { files: &changes[..1] }).unwrap();
        let out = compress(&changes, one_full.len());
        // One full entry fits exactly, so the untruncated step wins.
        assert_eq!(decode(&out).len(), 1);
        assert_eq!(out, one_full);
    }

    #[test]
    fn hopeless_budget_yields_minimal_payload() {
        let changes = vec![FileChange::new("deeply/nested/path/file.rs", "3+/1−")];
        assert_eq!(
            compress(&changes, 5),
            r#"{"files":[{"f":"file.rs","c":"mod"}]}"#
        );
    }
}
