//! Property-based tests for resolution using proptest.
//!
//! Random module graphs check the ordering, cycle reporting and include
//! propagation guarantees across many shapes of input.

use std::collections::BTreeMap;

use modgraph::{resolve, Manifest, Registry, ResolveError, ResolveOptions, Visibility};
use proptest::prelude::*;

const MAX_MODULES: usize = 12;

fn name(i: usize) -> String {
    format!("M{:02}", i)
}

/// Edge list keyed by (from, to); each pair carries one visibility.
type Edges = BTreeMap<(usize, usize), Visibility>;

fn visibility_strategy() -> impl Strategy<Value = Visibility> {
    prop_oneof![
        Just(Visibility::Public),
        Just(Visibility::Private),
        Just(Visibility::Dynamic),
    ]
}

/// A module count plus edges where static edges only point at lower indices.
/// Dynamic edges may point anywhere except at the declaring module.
fn dag_strategy() -> impl Strategy<Value = (usize, Edges)> {
    (1..=MAX_MODULES).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n, visibility_strategy()), 0..=30)
            .prop_map(|raw| {
                let mut edges = Edges::new();
                for (from, to, visibility) in raw {
                    let allowed = match visibility {
                        Visibility::Dynamic => from != to,
                        _ => to < from,
                    };
                    if allowed {
                        edges.entry((from, to)).or_insert(visibility);
                    }
                }
                edges
            });
        (Just(n), edges)
    })
}

fn manifests(n: usize, edges: &Edges) -> Vec<Manifest> {
    (0..n)
        .map(|i| {
            let deps = |visibility: Visibility| -> Vec<String> {
                edges
                    .iter()
                    .filter(|((from, _), v)| *from == i && **v == visibility)
                    .map(|((_, to), _)| name(*to))
                    .collect()
            };
            Manifest::builder(name(i))
                .include_paths([format!("Inc{}", i)])
                .public_deps(deps(Visibility::Public))
                .private_deps(deps(Visibility::Private))
                .dynamic_deps(deps(Visibility::Dynamic))
                .build()
                .unwrap()
        })
        .collect()
}

fn registry(manifests: Vec<Manifest>) -> Registry {
    let registry = Registry::new();
    for manifest in manifests {
        registry.register(manifest).unwrap();
    }
    registry
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Every static dependency is built before its dependent.
    #[test]
    fn prop_static_dependencies_come_first((n, edges) in dag_strategy()) {
        let plan = resolve(&registry(manifests(n, &edges)), &ResolveOptions::default()).unwrap();
        prop_assert_eq!(plan.len(), n);

        for ((from, to), visibility) in &edges {
            if visibility.is_static() {
                let from_pos = plan.position(&name(*from)).unwrap();
                let to_pos = plan.position(&name(*to)).unwrap();
                prop_assert!(
                    to_pos < from_pos,
                    "{} must be built before {}",
                    name(*to),
                    name(*from)
                );
            }
        }
    }

    /// Registration order never changes the plan.
    #[test]
    fn prop_plan_is_deterministic(
        (n, edges) in dag_strategy(),
        rotation in 0..MAX_MODULES,
    ) {
        let forward = resolve(&registry(manifests(n, &edges)), &ResolveOptions::strict()).unwrap();

        let mut shuffled = manifests(n, &edges);
        shuffled.reverse();
        shuffled.rotate_left(rotation % n);
        let other = resolve(&registry(shuffled), &ResolveOptions::strict()).unwrap();

        prop_assert_eq!(forward, other);
    }

    /// A static ring is reported as a closed path along declared edges.
    #[test]
    fn prop_static_ring_reports_cycle(
        len in 2..=MAX_MODULES,
        public in prop::collection::vec(any::<bool>(), MAX_MODULES),
    ) {
        let mut edges = Edges::new();
        for i in 0..len {
            let visibility = if public[i] { Visibility::Public } else { Visibility::Private };
            edges.insert((i, (i + 1) % len), visibility);
        }

        let err = resolve(&registry(manifests(len, &edges)), &ResolveOptions::default()).unwrap_err();
        let cycle = match err {
            ResolveError::CyclicDependency { cycle } => cycle,
            other => panic!("expected a cycle, got {:?}", other),
        };

        prop_assert_eq!(cycle.len(), len + 1);
        prop_assert_eq!(cycle.first(), cycle.last());
        for pair in cycle.windows(2) {
            let from: usize = pair[0][1..].parse().unwrap();
            let to: usize = pair[1][1..].parse().unwrap();
            prop_assert!(edges.contains_key(&(from, to)));
        }
    }

    /// In a chain, a private link hides everything below it from modules above.
    #[test]
    fn prop_private_link_stops_propagation(
        len in 2..=MAX_MODULES,
        cut in 1..MAX_MODULES,
    ) {
        let cut = 1 + cut % (len - 1);
        let mut edges = Edges::new();
        for i in 1..len {
            let visibility = if i == cut { Visibility::Private } else { Visibility::Public };
            edges.insert((i, i - 1), visibility);
        }

        let plan = resolve(&registry(manifests(len, &edges)), &ResolveOptions::strict()).unwrap();

        // The module declaring the private link still sees everything
        let cut_module = plan.module(&name(cut)).unwrap();
        prop_assert_eq!(cut_module.include_paths.len(), cut + 1);

        let top = plan.module(&name(len - 1)).unwrap();
        let expected = if len - 1 == cut { cut + 1 } else { len - cut };
        prop_assert_eq!(top.include_paths.len(), expected);
    }
}
