//! Property-based tests over random relations and permutations.

use proptest::prelude::*;

use latticework::{
    closure::{reachable, Direction},
    element::{ElementIndex, ElementSet},
    lattice::{self, Bound},
    permutation::{self, Permutation},
    relation::Relation,
    validate::{self, Verdict, Violation},
};

fn labels(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("e{i}")).collect()
}

fn build(n: usize, bits: &[bool]) -> Relation {
    let mut r = Relation::empty(ElementSet::new(labels(n)).unwrap());
    for a in 0..n {
        for b in 0..n {
            if bits[a * n + b] {
                r.insert(ElementIndex(a), ElementIndex(b));
            }
        }
    }
    r
}

/// Any relation on up to six elements.
fn any_relation() -> impl Strategy<Value = Relation> {
    (0usize..7).prop_flat_map(|n| {
        prop::collection::vec(any::<bool>(), n * n).prop_map(move |bits| build(n, &bits))
    })
}

/// Partial orders: the closure of a relation that only points from lower to
/// higher indices.
fn any_order() -> impl Strategy<Value = Relation> {
    (0usize..7).prop_flat_map(|n| {
        prop::collection::vec(any::<bool>(), n * n).prop_map(move |bits| {
            let upward: Vec<bool> = (0..n * n)
                .map(|k| k / n < k % n && bits[k])
                .collect();
            build(n, &upward).reflexive_transitive_closure()
        })
    })
}

fn any_permutation() -> impl Strategy<Value = Vec<usize>> {
    (0usize..10).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
}

fn le(r: &Relation, a: &str, b: &str) -> bool {
    let elements = r.elements();
    r.relates(elements.index_of(a).unwrap(), elements.index_of(b).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn verdict_agrees_with_exhaustive_check(r in any_relation()) {
        let idx: Vec<ElementIndex> = r.elements().indices().collect();
        let reflexive = idx.iter().all(|&a| r.relates(a, a));
        let antisymmetric = idx.iter().all(|&a| {
            idx.iter().all(|&b| a == b || !(r.relates(a, b) && r.relates(b, a)))
        });
        let transitive = idx.iter().all(|&a| {
            idx.iter().all(|&b| {
                idx.iter().all(|&c| !(r.relates(a, b) && r.relates(b, c)) || r.relates(a, c))
            })
        });

        match validate::validate(&r) {
            Verdict::Valid => prop_assert!(reflexive && antisymmetric && transitive),
            Verdict::Invalid(Violation::NotReflexive { element }) => {
                prop_assert!(!le(&r, &element, &element));
            }
            Verdict::Invalid(Violation::NotAntisymmetric { a, b }) => {
                prop_assert!(reflexive);
                prop_assert!(a != b && le(&r, &a, &b) && le(&r, &b, &a));
            }
            Verdict::Invalid(Violation::NotTransitive { a, b, c }) => {
                prop_assert!(reflexive && antisymmetric);
                prop_assert!(le(&r, &a, &b) && le(&r, &b, &c) && !le(&r, &a, &c));
            }
        }
    }

    #[test]
    fn validation_is_idempotent(r in any_relation()) {
        prop_assert_eq!(validate::validate(&r), validate::validate(&r));
    }

    #[test]
    fn reachability_directions_mirror(r in any_relation()) {
        for a in r.elements().indices() {
            let forward = reachable(&r, a, Direction::Forward);
            for b in r.elements().indices() {
                let backward = reachable(&r, b, Direction::Backward);
                prop_assert_eq!(forward[b.0], backward[a.0]);
            }
        }
    }

    #[test]
    fn closure_is_reflexive_transitive_and_idempotent(r in any_relation()) {
        let closed = r.reflexive_transitive_closure();
        prop_assert!(validate::check_reflexive(&closed).is_ok());
        prop_assert!(validate::check_transitive(&closed).is_ok());
        prop_assert_eq!(closed.reflexive_transitive_closure(), closed.clone());
        for (a, b) in r.pairs() {
            prop_assert!(closed.relates(a, b));
        }
    }

    #[test]
    fn hasse_diagram_generates_the_order(order in any_order()) {
        prop_assert!(validate::validate(&order).is_valid());
        let diagram = order.hasse_diagram();
        let covers = Relation::new(order.elements().clone(), diagram.label_covers()).unwrap();
        prop_assert_eq!(covers.reflexive_transitive_closure(), order);
    }

    #[test]
    fn unique_bounds_are_least_and_greatest(order in any_order()) {
        let analysis = lattice::analyze(&order);
        let elements: Vec<String> = order.elements().iter().map(|(_, l)| l.to_string()).collect();
        for pair in &analysis.pairs {
            if let Bound::Unique(s) = &pair.supremum {
                prop_assert!(le(&order, &pair.a, s) && le(&order, &pair.b, s));
                for u in &elements {
                    if le(&order, &pair.a, u) && le(&order, &pair.b, u) {
                        prop_assert!(le(&order, s, u));
                    }
                }
            }
            if let Bound::Unique(i) = &pair.infimum {
                prop_assert!(le(&order, i, &pair.a) && le(&order, i, &pair.b));
                for l in &elements {
                    if le(&order, l, &pair.a) && le(&order, l, &pair.b) {
                        prop_assert!(le(&order, l, i));
                    }
                }
            }
        }
        prop_assert_eq!(analysis.is_lattice, analysis.counterexample.is_none());
    }

    #[test]
    fn cycles_partition_and_divide_the_order(map in any_permutation()) {
        let n = map.len();
        let names = labels(n);
        let mapping: Vec<&str> = map.iter().map(|&j| names[j].as_str()).collect();
        let analysis = permutation::analyze(&ElementSet::new(&names).unwrap(), &mapping).unwrap();

        let mut seen: Vec<&str> = analysis.cycles.iter().flatten().map(String::as_str).collect();
        seen.sort_unstable();
        let mut expected: Vec<&str> = names.iter().map(String::as_str).collect();
        expected.sort_unstable();
        prop_assert_eq!(seen, expected);

        for cycle in &analysis.cycles {
            prop_assert_eq!(analysis.order % cycle.len() as u128, 0);
        }

        let p = Permutation::from_map(map);
        prop_assert!(p.pow(analysis.order as usize).is_identity());
        prop_assert!(p.compose(&p.inverse()).is_identity());
        prop_assert_eq!(p.sign(), p.inverse().sign());
    }
}
