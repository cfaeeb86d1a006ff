//! Property-based tests for path containment.
//!
//! These tests use proptest to generate relative paths and verify that
//! containment agrees with a purely lexical model of `..` handling.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{is_contained, relative_path, resolve};
    use proptest::prelude::*;
    use std::path::{Path, PathBuf};

    /// Relative paths made of plain names, `.` and `..`.
    fn relative_strategy() -> impl Strategy<Value = Vec<&'static str>> {
        prop::collection::vec(
            prop::sample::select(vec!["a", "b", "c", ".", ".."]),
            0..8,
        )
    }

    /// Depth below the root after walking `parts`, or `None` once the walk
    /// leaves the root. A `..` at the root is not clamped.
    fn lexical_depth(parts: &[&str]) -> Option<usize> {
        let mut depth = 0usize;
        for part in parts {
            match *part {
                "." => {}
                ".." => depth = depth.checked_sub(1)?,
                _ => depth += 1,
            }
        }
        Some(depth)
    }

    fn join_all(root: &Path, parts: &[&str]) -> PathBuf {
        parts.iter().fold(root.to_path_buf(), |p, part| p.join(part))
    }

    proptest! {
        /// Property: a path is contained iff it never walks above the root
        #[test]
        fn containment_matches_lexical_model(parts in relative_strategy()) {
            let root = Path::new("/nonexistent-install-root/inner");
            let candidate = join_all(root, &parts);
            prop_assert_eq!(
                is_contained(&candidate, root),
                lexical_depth(&parts).is_some()
            );
        }

        /// Property: the root itself and anything below it is contained
        #[test]
        fn names_below_root_are_contained(names in prop::collection::vec("[a-z]{1,6}", 0..6)) {
            let root = Path::new("/nonexistent-install-root");
            let candidate = names.iter().fold(root.to_path_buf(), |p, n| p.join(n));
            prop_assert!(is_contained(&candidate, root));
        }

        /// Property: joining the relative path back onto the base gives the target
        #[test]
        fn relative_path_round_trips(
            base in prop::collection::vec("[a-z]{1,4}", 0..4),
            target in prop::collection::vec("[a-z]{1,4}", 0..4),
        ) {
            let root = Path::new("/nonexistent-install-root");
            let base = base.iter().fold(root.to_path_buf(), |p, n| p.join(n));
            let target = target.iter().fold(root.to_path_buf(), |p, n| p.join(n));

            let relative = relative_path(&base, &target);
            prop_assert!(relative.is_relative());
            prop_assert_eq!(resolve(&base.join(&relative)), target);
        }
    }
}
