use std::fmt;

use num::Float;
use serde::Serialize;

use crate::defuzz;
use crate::error::{Error, Result};

/// Logical combinator joining the precedents of a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connector {
    /// A single precedent, passed through unchanged
    Simple,
    /// Minimum over all precedents
    And,
    /// Maximum over all precedents
    Or,
}

impl Connector {
    /// Folds the precedent degrees with this connector's fuzzy operator.
    pub fn call<F: Float>(self, degrees: impl IntoIterator<Item = F>) -> Result<F> {
        let mut iter = degrees.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| Error::config("a rule needs at least one precedent"))?;

        match self {
            Self::Simple => match iter.next() {
                None => Ok(first),
                Some(_) => Err(Error::config("a SIMPLE rule takes exactly one precedent")),
            }
            Self::And => Ok(iter.fold(first, F::min)),
            Self::Or => Ok(iter.fold(first, F::max)),
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Simple => "SIMPLE",
            Self::And => "AND",
            Self::Or => "OR",
        })
    }
}

/// Mamdani implication: the consequent curve clipped at the rule's degree.
pub(crate) fn clip<F: Float>(degree: F, membership: &[F]) -> Vec<F> {
    membership.iter().map(|&y| F::min(degree, y)).collect()
}

/// Max aggregation of one more activation into `acc`.
pub(crate) fn aggregate_into<F: Float>(acc: &mut [F], activation: &[F]) {
    debug_assert_eq!(acc.len(), activation.len());

    for (a, &v) in acc.iter_mut().zip(activation) {
        *a = F::max(*a, v);
    }
}

/// Method for defuzzificating the aggregated membership function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DefuzzificationOp {
    /// Center of gravity
    Centroid,
    /// Abscissa splitting the area in two equal halves
    Bisector,
}

impl DefuzzificationOp {
    /// Crisp value rounded to `decimals` places.
    pub fn call(self, universe: &[f64], membership: &[f64], decimals: i32) -> Result<f64> {
        match self {
            Self::Centroid => defuzz::centroid(universe, membership, decimals),
            Self::Bisector => defuzz::bisector(universe, membership, decimals),
        }
    }
}

#[test]
fn test_connectors() {
    assert_eq!(Connector::Simple.call([0.4]).unwrap(), 0.4);
    assert_eq!(Connector::And.call([0.4, 0.9, 0.2, 0.7]).unwrap(), 0.2);
    assert_eq!(Connector::Or.call([0.4, 0.9, 0.2, 0.7]).unwrap(), 0.9);
    // Fold has no arity cap
    assert_eq!(Connector::And.call((1..=12).map(|i| i as f64 / 12.)).unwrap(), 1. / 12.);

    assert!(matches!(
        Connector::And.call(std::iter::empty::<f64>()),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        Connector::Simple.call([0.1, 0.2]),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_clip_and_aggregate() {
    let curve = [0., 0.5, 1., 0.5, 0.];
    let clipped = clip(0.6, &curve);

    assert_eq!(clipped, vec![0., 0.5, 0.6, 0.5, 0.]);

    let mut acc = vec![0.; 5];

    aggregate_into(&mut acc, &clipped);
    aggregate_into(&mut acc, &[0.2, 0.2, 0.2, 0.7, 0.7]);

    assert_eq!(acc, vec![0.2, 0.5, 0.6, 0.7, 0.7]);
    assert_eq!(Connector::Or.to_string(), "OR");
}
