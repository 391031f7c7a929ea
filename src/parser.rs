//! # Text and DOT input
//!
//! Small textual formats for handing structures to the engine:
//!
//! - element lists: labels separated by commas and/or whitespace,
//!   `A, B, C` or `A B C`;
//! - relations: pairs separated by `,`, `;` or newlines, each written
//!   `a <= b`, `a ≤ b`, `a -> b` or `(a, b)`. Arrows chain, so
//!   `a <= b <= c` is the two pairs `(a, b)` and `(b, c)`;
//! - permutations: either one-line notation, the images of the elements in
//!   declaration order (`B C A`), or disjoint cycles (`(A B C)(D)`), where
//!   unmentioned elements are fixed;
//! - relations as Graphviz digraphs, through [`Relation::from_dot`] and the
//!   [`relation_dot!`](crate::relation_dot) macro. Every node becomes an
//!   element, in lexicographic order, and every edge `a -> b` the pair `(a, b)`.
//!
//! ```
//! use latticework::{parser::*, validate::validate};
//!
//! let elements = parse_elements("A B C D").unwrap();
//! let r = parse_relation(&elements, "A <= B <= D, A <= C <= D").unwrap();
//! assert!(!validate(&r).is_valid());
//! assert!(validate(&r.reflexive_transitive_closure()).is_valid());
//! ```

use std::collections::BTreeSet;

use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::{
    element::{ElementSet, InputError, Limits},
    permutation::{self, PermutationAnalysis, PermutationError},
    relation::Relation,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Permutation(#[from] PermutationError),

    #[error("expected a pair such as `a <= b` or `(a, b)`, found `{0}`")]
    MalformedPair(String),

    #[error("unclosed `(` in `{0}`")]
    Unclosed(String),

    #[error("`{0}` appears more than once in the cycles")]
    RepeatedInCycle(String),

    #[error("invalid DOT: {0}")]
    Dot(String),

    #[error("the DOT graph is undirected; a relation needs a `digraph`")]
    Undirected,
}

const SEPARATORS: &[char] = &[',', ';', '\n'];

fn is_separator(c: char) -> bool {
    c.is_whitespace() || SEPARATORS.contains(&c)
}

/// Splits an element list on commas and whitespace.
pub fn parse_labels(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_elements(text: &str) -> Result<ElementSet, InputError> {
    ElementSet::new(parse_labels(text))
}

fn label(part: &str, statement: &str) -> Result<String, ParseError> {
    let part = part.trim();
    if part.is_empty() || part.contains(char::is_whitespace) {
        return Err(ParseError::MalformedPair(statement.trim().to_string()));
    }
    Ok(part.to_string())
}

fn tuple_pair(inner: &str) -> Result<(String, String), ParseError> {
    let statement = format!("({inner})");
    match inner.split(',').collect_vec().as_slice() {
        [a, b] => Ok((label(a, &statement)?, label(b, &statement)?)),
        _ => Err(ParseError::MalformedPair(statement)),
    }
}

fn chain(statement: &str) -> Result<Vec<(String, String)>, ParseError> {
    let normalized = statement.replace('≤', "<=").replace("->", "<=");
    let labels = normalized
        .split("<=")
        .map(|part| label(part, statement))
        .collect::<Result<Vec<_>, _>>()?;
    if labels.len() < 2 {
        return Err(ParseError::MalformedPair(statement.trim().to_string()));
    }
    Ok(labels.into_iter().tuple_windows().collect())
}

/// Parses relation text into labelled pairs, without checking the labels.
///
/// # Examples
///
/// ```
/// # use latticework::parser::parse_pairs;
/// let pairs = parse_pairs("a <= b <= c; (c, c)\nd -> a").unwrap();
/// assert_eq!(
///     pairs,
///     [("a", "b"), ("b", "c"), ("c", "c"), ("d", "a")]
///         .map(|(x, y)| (x.to_string(), y.to_string()))
/// );
/// ```
pub fn parse_pairs(text: &str) -> Result<Vec<(String, String)>, ParseError> {
    let mut pairs = Vec::new();
    let mut rest = text;
    loop {
        rest = rest.trim_start_matches(is_separator);
        if rest.is_empty() {
            break;
        }
        if let Some(inner) = rest.strip_prefix('(') {
            let close = inner
                .find(')')
                .ok_or_else(|| ParseError::Unclosed(rest.trim_end().to_string()))?;
            pairs.push(tuple_pair(&inner[..close])?);
            rest = &inner[close + 1..];
        } else {
            let end = rest.find(SEPARATORS).unwrap_or(rest.len());
            pairs.extend(chain(&rest[..end])?);
            rest = &rest[end..];
        }
    }
    Ok(pairs)
}

/// Parses relation text over an already known element set.
pub fn parse_relation(elements: &ElementSet, text: &str) -> Result<Relation, ParseError> {
    let pairs = parse_pairs(text)?;
    Ok(Relation::new(elements.clone(), pairs)?)
}

/// Parses cycle notation such as `(A B C)(D E)`; `()` is the empty cycle list.
pub fn parse_cycles(text: &str) -> Result<Vec<Vec<String>>, ParseError> {
    let mut cycles = Vec::new();
    let mut seen = BTreeSet::<String>::new();
    let mut rest = text.trim();
    while let Some(inner) = rest.strip_prefix('(') {
        let close = inner
            .find(')')
            .ok_or_else(|| ParseError::Unclosed(rest.to_string()))?;
        let cycle = parse_labels(&inner[..close]);
        if let Some(repeated) = cycle.iter().find(|l| !seen.insert(l.to_string())) {
            return Err(ParseError::RepeatedInCycle(repeated.clone()));
        }
        if !cycle.is_empty() {
            cycles.push(cycle);
        }
        rest = inner[close + 1..].trim_start();
    }
    if !rest.is_empty() {
        return Err(ParseError::Unclosed(rest.to_string()));
    }
    Ok(cycles)
}

/// The one-line mapping described by `cycles`: the image of every element,
/// in declaration order.
fn cycles_to_mapping(
    elements: &ElementSet,
    cycles: &[Vec<String>],
) -> Result<Vec<String>, ParseError> {
    let mut mapping = elements.new_vec(|i| elements.label(i).to_string());
    for cycle in cycles {
        for (from, to) in cycle.iter().circular_tuple_windows() {
            mapping[elements.require(from)?] = to.clone();
        }
    }
    Ok(mapping.into_iter().map(|(_, image)| image).collect())
}

/// Parses and analyzes a permutation of `elements`, in one-line or cycle notation.
///
/// # Examples
///
/// ```
/// # use latticework::parser::*;
/// let elements = parse_elements("A, B, C, D").unwrap();
/// let one_line = parse_permutation(&elements, "B A D C").unwrap();
/// let cycles = parse_permutation(&elements, "(A B)(C D)").unwrap();
/// assert_eq!(one_line, cycles);
/// assert_eq!(cycles.order, 2);
/// ```
pub fn parse_permutation(
    elements: &ElementSet,
    text: &str,
) -> Result<PermutationAnalysis, ParseError> {
    let mapping = if text.trim_start().starts_with('(') {
        cycles_to_mapping(elements, &parse_cycles(text)?)?
    } else {
        parse_labels(text)
    };
    Ok(permutation::analyze(elements, &mapping)?)
}

/// DOT ids may be quoted, so `"A"` and `A` name the same element.
fn unquote(id: String) -> String {
    let Some(inner) = id.strip_prefix('"').and_then(|s| s.strip_suffix('"')) else {
        return id;
    };
    let mut label = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            label.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => label.push('\n'),
            Some('t') => label.push('\t'),
            Some(escaped) => label.push(escaped),
            None => label.push('\\'),
        }
    }
    label
}

impl Relation {
    /// Reads a relation from a Graphviz digraph, with the default [`Limits`].
    ///
    /// Node and edge attributes are ignored. Elements are the node ids, in
    /// lexicographic order, including ids that only occur in edges. Quoted ids
    /// are unquoted, so the output of [`HasseDiagram::dot`](crate::relation::HasseDiagram::dot)
    /// reads back as the same elements.
    ///
    /// # Examples
    ///
    /// ```
    /// # use latticework::relation::Relation;
    /// let r = Relation::from_dot("digraph { b -> c; a -> b; }").unwrap();
    /// assert_eq!(r.to_string(), "{(a, b), (b, c)}");
    /// ```
    pub fn from_dot<Str: AsRef<str>>(s: Str) -> Result<Self, ParseError> {
        Self::from_dot_with_limits(s, Limits::default())
    }

    pub fn from_dot_with_limits<Str: AsRef<str>>(
        s: Str,
        limits: Limits,
    ) -> Result<Self, ParseError> {
        let ast_graph = dot_parser::ast::Graph::try_from(s.as_ref())
            .map_err(|e| ParseError::Dot(e.to_string()))?;
        let can_graph = dot_parser::canonical::Graph::from(
            ast_graph.filter_map(&|a| Some((a.0.to_string(), a.1.to_string()))),
        );
        if !can_graph.is_digraph {
            return Err(ParseError::Undirected);
        }

        let edges: Vec<(String, String)> = can_graph
            .edges
            .set
            .into_iter()
            .map(|e| (unquote(e.from), unquote(e.to)))
            .collect();

        let labels: BTreeSet<String> = can_graph
            .nodes
            .set
            .into_iter()
            .map(|(id, _)| unquote(id))
            .chain(edges.iter().flat_map(|(a, b)| [a.clone(), b.clone()]))
            .collect();

        let relation = Relation::new(ElementSet::with_limits(labels, limits)?, edges)?;
        debug!(
            elements = relation.elements().len(),
            pairs = relation.len(),
            "read relation from DOT"
        );
        Ok(relation)
    }
}

/// Builds a [`Relation`] from inline DOT, e.g.
/// `relation_dot!(digraph { a -> b; })`.
#[macro_export]
macro_rules! relation_dot {
    ($($t:tt)*) => {
        $crate::relation::Relation::from_dot(stringify!($($t)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn element_lists() {
        assert_eq!(parse_labels("A, B  C,\nD"), vec!["A", "B", "C", "D"]);
        assert!(parse_elements("").unwrap().is_empty());
        assert_eq!(
            parse_elements("x y x"),
            Err(InputError::DuplicateElement("x".into()))
        );
    }

    #[test]
    fn pair_syntaxes() {
        assert_eq!(
            parse_pairs("A<=B, B ≤ C; (C, A)\n D -> A").unwrap(),
            owned(&[("A", "B"), ("B", "C"), ("C", "A"), ("D", "A")])
        );
        assert_eq!(parse_pairs("(a,b)(b,c)").unwrap(), owned(&[("a", "b"), ("b", "c")]));
        assert!(parse_pairs("  ;,\n").unwrap().is_empty());
    }

    #[test]
    fn malformed_pairs() {
        assert_eq!(
            parse_pairs("a <= b, c"),
            Err(ParseError::MalformedPair("c".into()))
        );
        assert_eq!(
            parse_pairs("a <= "),
            Err(ParseError::MalformedPair("a <=".into()))
        );
        assert_eq!(
            parse_pairs("(a, b, c)"),
            Err(ParseError::MalformedPair("(a, b, c)".into()))
        );
        assert_eq!(
            parse_pairs("(a, b"),
            Err(ParseError::Unclosed("(a, b".into()))
        );
        assert_eq!(
            parse_pairs("a b <= c"),
            Err(ParseError::MalformedPair("a b <= c".into()))
        );
    }

    #[test]
    fn relation_over_elements() {
        let elements = parse_elements("A B").unwrap();
        let r = parse_relation(&elements, "A <= A, A <= B, B <= B").unwrap();
        assert_eq!(r.len(), 3);
        assert_eq!(
            parse_relation(&elements, "A <= Z"),
            Err(ParseError::Input(InputError::UnknownElement("Z".into())))
        );
    }

    #[test]
    fn cycle_notation() {
        let elements = parse_elements("A B C D E").unwrap();
        let analysis = parse_permutation(&elements, "(A C)(B D E)").unwrap();
        assert_eq!(
            analysis.cycles,
            vec![vec!["A", "C"], vec!["B", "D", "E"]]
        );
        assert_eq!(analysis.order, 6);

        let identity = parse_permutation(&elements, "()").unwrap();
        assert!(identity.is_identity());

        assert_eq!(
            parse_cycles("(A B)(B C)"),
            Err(ParseError::RepeatedInCycle("B".into()))
        );
        assert_eq!(
            parse_permutation(&elements, "(A Q)"),
            Err(ParseError::Input(InputError::UnknownElement("Q".into())))
        );
        assert_eq!(parse_cycles("(A B"), Err(ParseError::Unclosed("(A B".into())));
    }

    #[test]
    fn one_line_notation() {
        let elements = parse_elements("A B C").unwrap();
        let analysis = parse_permutation(&elements, "B, C, A").unwrap();
        assert_eq!(analysis.to_string(), "(A B C), order 3");

        let err = parse_permutation(&elements, "A A C").unwrap_err();
        insta::assert_snapshot!(err, @"not a bijection: duplicated [A], missing [B]");
    }

    #[test]
    fn from_dot() {
        let r = relation_dot!(digraph {
            d;
            a -> b;
            a -> c;
            b -> d;
            c -> d;
        })
        .unwrap();
        assert_eq!(
            r.elements().iter().map(|(_, l)| l).collect::<Vec<_>>(),
            vec!["a", "b", "c", "d"]
        );
        assert_eq!(
            r.label_pairs(),
            owned(&[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")])
        );
        assert!(crate::validate::validate(&r.reflexive_transitive_closure()).is_valid());
    }

    #[test]
    fn hasse_output_reads_back() {
        let elements = parse_elements("A B").unwrap();
        let r = parse_relation(&elements, "A <= A, A <= B, B <= B").unwrap();
        let back = Relation::from_dot(r.hasse_diagram().dot()).unwrap();
        assert_eq!(
            back.elements().iter().map(|(_, l)| l).collect::<Vec<_>>(),
            vec!["A", "B"]
        );
        assert_eq!(back.label_pairs(), owned(&[("A", "B")]));
        assert_eq!(back.reflexive_transitive_closure(), r);
    }

    #[test]
    fn quoted_ids_with_spaces() {
        let r = Relation::from_dot(r#"digraph { "bottom" -> "top element"; }"#).unwrap();
        assert_eq!(r.label_pairs(), owned(&[("bottom", "top element")]));
        assert_eq!(unquote(r#""a\"b""#.to_string()), r#"a"b"#);
        assert_eq!(unquote("plain".to_string()), "plain");
    }

    #[test]
    fn dot_respects_limits() {
        let nodes: String = (0..300).map(|i| format!("n{i}; ")).collect();
        let dot = format!("digraph {{ {nodes}}}");

        assert_eq!(
            Relation::from_dot(&dot),
            Err(ParseError::Input(InputError::TooManyElements {
                count: 300,
                max: 256
            }))
        );
        let wide = Relation::from_dot_with_limits(&dot, Limits { max_elements: 500 }).unwrap();
        assert_eq!(wide.elements().len(), 300);

        let tight = Limits { max_elements: 2 };
        assert_eq!(
            Relation::from_dot_with_limits("digraph { a -> b; b -> c; }", tight),
            Err(ParseError::Input(InputError::TooManyElements {
                count: 3,
                max: 2
            }))
        );
    }

    #[test]
    fn undirected_and_invalid_dot() {
        assert_eq!(
            Relation::from_dot("graph { a -- b; }"),
            Err(ParseError::Undirected)
        );
        assert!(matches!(
            Relation::from_dot("digraph { a -> "),
            Err(ParseError::Dot(_))
        ));
    }
}
