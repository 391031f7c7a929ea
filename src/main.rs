use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use latticework::{
    element::{ElementSet, Limits, DEFAULT_MAX_ELEMENTS},
    lattice,
    parser::{self, ParseError},
    permutation::PermutationError,
    relation::Relation,
    validate,
};
use tracing::debug;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "latticework",
    version,
    about = "Check partial orders and lattices, and decompose permutations, over small labelled sets."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check the partial order axioms and report the first violation.
    Validate(RelationArgs),
    /// Supremum and infimum of every pair, and whether the order is a lattice.
    Lattice(RelationArgs),
    /// Look for a unique bottom and top element.
    Bounds(RelationArgs),
    /// Print the Hasse diagram of the order as a Graphviz digraph.
    Hasse(RelationArgs),
    /// Validate a mapping as a permutation and list its cycles and order.
    Permutation(PermutationArgs),
}

#[derive(Args, Debug)]
struct RelationArgs {
    /// Element labels, separated by commas or whitespace.
    #[arg(long, value_name = "LABELS", required_unless_present = "dot")]
    elements: Option<String>,
    /// Pairs such as "a <= b, b <= c" or "(a, b); (b, c)".
    #[arg(
        long,
        value_name = "PAIRS",
        requires = "elements",
        conflicts_with = "dot"
    )]
    pairs: Option<String>,
    /// Read the relation from a Graphviz digraph instead.
    #[arg(long, value_name = "FILE", conflicts_with = "elements")]
    dot: Option<PathBuf>,
    /// Take the reflexive transitive closure before analyzing, e.g. for a
    /// relation given as its covering pairs.
    #[arg(long)]
    closure: bool,
    /// Largest element set accepted.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_ELEMENTS)]
    max_elements: usize,
}

#[derive(Args, Debug)]
struct PermutationArgs {
    /// Element labels, separated by commas or whitespace.
    #[arg(long, value_name = "LABELS")]
    elements: String,
    /// Images in declaration order ("B C A") or cycles ("(A B C)(D)").
    #[arg(long, value_name = "MAPPING")]
    mapping: String,
    /// Largest element set accepted.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_ELEMENTS)]
    max_elements: usize,
}

impl RelationArgs {
    fn limits(&self) -> Limits {
        Limits {
            max_elements: self.max_elements,
        }
    }

    fn relation(&self) -> Result<Relation> {
        let relation = match (&self.dot, &self.elements) {
            (Some(path), _) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Relation::from_dot_with_limits(&text, self.limits())
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            (None, labels) => {
                let labels = parser::parse_labels(labels.as_deref().unwrap_or_default());
                let elements = ElementSet::with_limits(labels, self.limits())
                    .context("parsing --elements")?;
                let pairs = self.pairs.as_deref().unwrap_or_default();
                parser::parse_relation(&elements, pairs).context("parsing --pairs")?
            }
        };
        debug!(%relation, "input relation");

        Ok(if self.closure {
            relation.reflexive_transitive_closure()
        } else {
            relation
        })
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Validate(args) => println!("{}", validate::validate(&args.relation()?)),
        Commands::Lattice(args) => println!("{}", lattice::analyze(&args.relation()?)),
        Commands::Bounds(args) => println!("{}", lattice::check_bounded(&args.relation()?)),
        Commands::Hasse(args) => print!("{}", args.relation()?.hasse_diagram()),
        Commands::Permutation(args) => permutation(&args)?,
    }
    Ok(())
}

fn permutation(args: &PermutationArgs) -> Result<()> {
    let limits = Limits {
        max_elements: args.max_elements,
    };
    let elements = ElementSet::with_limits(parser::parse_labels(&args.elements), limits)
        .context("parsing --elements")?;

    match parser::parse_permutation(&elements, &args.mapping) {
        Ok(analysis) => {
            println!("{analysis}");
            Ok(())
        }
        // A mapping that is not a bijection is a negative verdict, not bad input.
        Err(ParseError::Permutation(
            err @ (PermutationError::NotBijective { .. }
            | PermutationError::LengthMismatch { .. }
            | PermutationError::UnknownImage(_)),
        )) => {
            println!("{err}");
            Ok(())
        }
        Err(err) => Err(err).context("parsing --mapping"),
    }
}
