//! Property-based tests for manifest merging.
//!
//! These tests use proptest to generate manifests and verify the merge laws
//! hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::manifest::{Manifest, RepoEntry};
    use crate::merge::merge;
    use proptest::prelude::*;
    use std::collections::HashSet;

    /// Manifests whose URLs are unique and start with `prefix`.
    fn manifest_strategy(prefix: &'static str) -> impl Strategy<Value = Manifest> {
        prop::collection::hash_set("[a-z]{1,8}", 0..8).prop_flat_map(move |names| {
            let names: Vec<String> = names.into_iter().collect();
            let len = names.len();
            prop::collection::vec(prop::sample::select(vec!["master", "main", "dev"]), len)
                .prop_map(move |branches| Manifest {
                    clone_dir: None,
                    repos: names
                        .iter()
                        .zip(branches)
                        .map(|(name, branch)| {
                            let mut entry =
                                RepoEntry::new(format!("https://{}/{}.git", prefix, name), name);
                            entry.branch = branch.to_string();
                            entry
                        })
                        .collect(),
                })
        })
    }

    proptest! {
        /// Property: merging disjoint manifests keeps every entry
        #[test]
        fn merge_disjoint_keeps_all_entries(
            a in manifest_strategy("left"),
            b in manifest_strategy("right"),
        ) {
            let outcome = merge(&a, &b);
            prop_assert_eq!(outcome.manifest.repos.len(), a.repos.len() + b.repos.len());
            prop_assert_eq!(outcome.changed, !a.repos.is_empty());
        }

        /// Property: merging a manifest into itself changes nothing
        #[test]
        fn merge_with_self_is_noop(m in manifest_strategy("host")) {
            let outcome = merge(&m, &m);
            prop_assert!(!outcome.changed);
            prop_assert_eq!(outcome.manifest, m);
        }

        /// Property: a second identical merge is a no-op
        #[test]
        fn merge_is_idempotent(
            a in manifest_strategy("host"),
            b in manifest_strategy("host"),
        ) {
            let first = merge(&a, &b);
            let second = merge(&a, &first.manifest);
            prop_assert!(!second.changed);
            prop_assert_eq!(second.manifest, first.manifest);
        }

        /// Property: merged URLs are unique and default entries keep their position
        #[test]
        fn merge_keeps_urls_unique_and_default_order(
            a in manifest_strategy("host"),
            b in manifest_strategy("host"),
        ) {
            let outcome = merge(&a, &b);
            let urls: Vec<&str> = outcome.manifest.repos.iter().map(|e| e.url.as_str()).collect();
            let unique: HashSet<&str> = urls.iter().copied().collect();
            prop_assert_eq!(unique.len(), urls.len());
            for (position, entry) in b.repos.iter().enumerate() {
                prop_assert_eq!(&outcome.manifest.repos[position].url, &entry.url);
            }
        }
    }
}
