//! Reference-driven tree walk.
//!
//! The reference decides which entries should exist. Every reference entry
//! yields one [`LeafEvent`] (or, for a group, the events of its members),
//! depth-first in the reference's own member order.

use nulp_tree::{Entry, GroupNode};
use tracing::debug;

use crate::CompareError;
use crate::leaf::compare_datasets;
use crate::options::CompareOptions;
use crate::outcome::{LeafEvent, Outcome, StructuralReason};

/// Walk `reference` against `candidate`, passing each event to `sink`.
///
/// Per-entry problems become events; only tree errors and entries of an
/// unknown kind abort the walk.
pub fn compare_trees(
    candidate: &dyn GroupNode,
    reference: &dyn GroupNode,
    options: &CompareOptions,
    sink: &mut dyn FnMut(LeafEvent),
) -> Result<(), CompareError> {
    walk_group(candidate, reference, options, sink)
}

fn walk_group(
    candidate: &dyn GroupNode,
    reference: &dyn GroupNode,
    options: &CompareOptions,
    sink: &mut dyn FnMut(LeafEvent),
) -> Result<(), CompareError> {
    debug!("walking {}", reference.path());
    for name in reference.member_names()? {
        let Some(expected) = reference.member(&name)? else {
            return Err(CompareError::InvariantViolation(format!(
                "{} lists member {} but cannot open it",
                reference.path(),
                name
            )));
        };
        if options.is_skipped(expected.path()) {
            sink(LeafEvent::new(expected.path(), Outcome::Skipped));
            continue;
        }
        match candidate.member(&name)? {
            Some(actual) => walk_entry(&actual, &expected, options, sink)?,
            None => sink(LeafEvent::new(expected.path(), Outcome::Missing)),
        }
    }
    Ok(())
}

fn walk_entry(
    candidate: &Entry,
    reference: &Entry,
    options: &CompareOptions,
    sink: &mut dyn FnMut(LeafEvent),
) -> Result<(), CompareError> {
    match (reference, candidate) {
        (Entry::Group(expected), Entry::Group(actual)) => {
            walk_group(actual.as_ref(), expected.as_ref(), options, sink)
        }
        (Entry::Dataset(expected), Entry::Dataset(actual)) => {
            let outcome = compare_datasets(actual.as_ref(), expected.as_ref(), options);
            sink(LeafEvent::new(expected.path(), outcome));
            Ok(())
        }
        (Entry::Group(_), Entry::Dataset(_)) | (Entry::Dataset(_), Entry::Group(_)) => {
            sink(LeafEvent::new(
                reference.path(),
                Outcome::StructuralDiff(StructuralReason::KindMismatch {
                    candidate: candidate.kind(),
                    reference: reference.kind(),
                }),
            ));
            Ok(())
        }
    }
}

/// Top-level candidate keys the reference does not have, sorted.
pub fn extra_top_level_keys(
    candidate: &dyn GroupNode,
    reference: &dyn GroupNode,
) -> Result<Vec<String>, CompareError> {
    let known = reference.member_names()?;
    let mut extra: Vec<String> = candidate
        .member_names()?
        .into_iter()
        .filter(|name| !known.contains(name))
        .collect();
    extra.sort();
    extra.dedup();
    Ok(extra)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nulp_tree::memory::{DatasetBuilder, GroupBuilder};

    fn double(x: f64) -> DatasetBuilder {
        DatasetBuilder::float64(&[1], vec![x])
            .unwrap()
            .attr("MATLAB_class", "double")
    }

    fn events(candidate: &dyn GroupNode, reference: &dyn GroupNode) -> Vec<LeafEvent> {
        let mut events = Vec::new();
        compare_trees(candidate, reference, &CompareOptions::default(), &mut |e: LeafEvent| {
            events.push(e)
        })
        .unwrap();
        events
    }

    #[test]
    fn test_missing_does_not_stop_siblings() {
        let reference = GroupBuilder::new()
            .dataset("a", double(1.0))
            .dataset("b", double(2.0))
            .dataset("c", double(3.0))
            .build();
        let candidate = GroupBuilder::new()
            .dataset("a", double(1.0))
            .dataset("c", double(3.0))
            .build();

        let events = events(&candidate, &reference);
        assert_eq!(
            events,
            vec![
                LeafEvent::new("/a", Outcome::Equal),
                LeafEvent::new("/b", Outcome::Missing),
                LeafEvent::new("/c", Outcome::Equal),
            ]
        );
    }

    #[test]
    fn test_nested_groups_are_depth_first() {
        let reference = GroupBuilder::new()
            .group(
                "g",
                GroupBuilder::new()
                    .dataset("x", double(1.0))
                    .group("h", GroupBuilder::new().dataset("y", double(2.0))),
            )
            .dataset("z", double(3.0))
            .build();
        let candidate = GroupBuilder::new()
            .dataset("z", double(3.0))
            .group(
                "g",
                GroupBuilder::new()
                    .group("h", GroupBuilder::new().dataset("y", double(2.0)))
                    .dataset("x", double(1.0)),
            )
            .build();

        let paths: Vec<String> = events(&candidate, &reference)
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(paths, vec!["/g/x", "/g/h/y", "/z"]);
    }

    #[test]
    fn test_internal_entries_are_skipped() {
        let reference = GroupBuilder::new()
            .group("#refs#", GroupBuilder::new().dataset("a", double(1.0)))
            .dataset("x", double(1.0))
            .build();
        let candidate = GroupBuilder::new().dataset("x", double(1.0)).build();

        assert_eq!(
            events(&candidate, &reference),
            vec![
                LeafEvent::new("/#refs#", Outcome::Skipped),
                LeafEvent::new("/x", Outcome::Equal),
            ]
        );
    }

    #[test]
    fn test_kind_mismatch_is_local() {
        let reference = GroupBuilder::new()
            .group("g", GroupBuilder::new().dataset("x", double(1.0)))
            .dataset("y", double(1.0))
            .build();
        let candidate = GroupBuilder::new()
            .dataset("g", double(1.0))
            .dataset("y", double(1.0))
            .build();

        let events = events(&candidate, &reference);
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0].outcome,
            Outcome::StructuralDiff(StructuralReason::KindMismatch { .. })
        ));
        assert_eq!(events[1], LeafEvent::new("/y", Outcome::Equal));
    }

    #[test]
    fn test_extra_keys_top_level_only() {
        let reference = GroupBuilder::new()
            .group("g", GroupBuilder::new())
            .build();
        let candidate = GroupBuilder::new()
            .dataset("zeta", double(1.0))
            .group("g", GroupBuilder::new().dataset("nested_extra", double(1.0)))
            .dataset("alpha", double(1.0))
            .build();

        assert!(events(&candidate, &reference).is_empty());
        assert_eq!(
            extra_top_level_keys(&candidate, &reference).unwrap(),
            vec!["alpha", "zeta"]
        );
    }
}
