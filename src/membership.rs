use serde::Serialize;
use slotmap::SecondaryMap;

use crate::arange::Arange;
use crate::math::interp;
use crate::variable::{FuzzyVariable, Trapezoid, VariableKey, Variables};

/// Sampled universe of one variable together with one curve per category.
#[derive(Clone, Debug, Serialize)]
pub struct VariableCurves {
    universe: Vec<f64>,
    terms: Vec<(String, Vec<f64>)>,
}

impl VariableCurves {
    pub fn universe(&self) -> &[f64] {
        &self.universe
    }

    pub fn curve(&self, term: &str) -> Option<&[f64]> {
        self.terms
            .iter()
            .find(|(name, _)| name == term)
            .map(|(_, ys)| ys.as_slice())
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.terms.iter().map(|(name, ys)| (name.as_str(), ys.as_slice()))
    }

    /// Membership of a crisp value in `term`, zero outside the universe.
    pub fn fuzzify(&self, term: &str, value: f64) -> Option<f64> {
        self.curve(term)
            .map(|ys| interp(value, &self.universe, ys, 0., 0.))
    }
}

/// Builds the universe `0..max_extent + step` and a trapezoid curve for every
/// category of `var`.
pub fn synthesize(var: &FuzzyVariable, step: f64) -> VariableCurves {
    let max_range = var
        .terms
        .iter()
        .map(|(_, shape)| shape.upper_bound())
        .fold(0., f64::max);
    let universe: Vec<f64> = Arange::new(0., max_range + step, step).collect();
    let tolerance = step * 1e-4;
    let terms = var
        .terms
        .iter()
        .map(|(name, shape)| {
            let ys = universe
                .iter()
                .map(|&x| trapezoid_degree(shape, x, tolerance))
                .collect();

            (name.to_owned(), ys)
        })
        .collect();

    VariableCurves { universe, terms }
}

pub fn synthesize_all(vars: &Variables, step: f64) -> SecondaryMap<VariableKey, VariableCurves> {
    vars.iter()
        .map(|(key, var)| (key, synthesize(var, step)))
        .collect()
}

/// Pointwise trapezoid membership. Samples within `tolerance` of a plateau
/// corner are pinned to exactly 1 and the falling edge wins when the two
/// slopes overlap.
pub(crate) fn trapezoid_degree(shape: &Trapezoid, x: f64, tolerance: f64) -> f64 {
    let [a, b, c, d] = shape.corners();
    let near = |p: f64| (x - p).abs() <= tolerance;

    if x >= c || near(c) {
        if near(c) {
            1.
        } else if x >= d {
            0.
        } else {
            (d - x) / (d - c)
        }
    } else if x <= b || near(b) {
        if near(b) {
            1.
        } else if x <= a {
            0.
        } else {
            (x - a) / (b - a)
        }
    } else {
        1.
    }
}

#[cfg(test)]
fn heart_rate() -> FuzzyVariable {
    use crate::terms::Terms;

    let mut terms = Terms::new();

    terms.insert("Low", Trapezoid::new(40., 60., 10., 10.));
    terms.insert("Spike", Trapezoid::new(20., 20., 0., 0.));
    terms.insert("Wall", Trapezoid::new(10., 30., 0., 5.));

    FuzzyVariable::new("HR", terms)
}

#[test]
fn test_universe_from_widest_term() {
    let curves = synthesize(&heart_rate(), 0.1);
    let universe = curves.universe();

    assert_eq!(universe.len(), 701);
    assert_eq!(universe[0], 0.);
    assert!((universe[700] - 70.).abs() < 1e-9);

    for (_, ys) in curves.terms() {
        assert_eq!(ys.len(), universe.len());
        assert!(ys.iter().all(|y| (0. ..=1.).contains(y)));
    }
}

#[test]
fn test_trapezoid_samples() {
    let curves = synthesize(&heart_rate(), 0.1);
    let at = |x: f64| curves.fuzzify("Low", x).unwrap();

    assert_eq!(at(30.), 0.);
    assert!((at(35.) - 0.5).abs() < 1e-9);
    assert_eq!(at(40.), 1.);
    assert_eq!(at(45.), 1.);
    assert_eq!(at(50.), 1.);
    assert_eq!(at(60.), 1.);
    assert!((at(65.) - 0.5).abs() < 1e-9);
    assert_eq!(at(70.), 0.);
    assert_eq!(at(-3.), 0.);
    assert_eq!(at(90.), 0.);
}

#[test]
fn test_degenerate_shapes() {
    let curves = synthesize(&heart_rate(), 0.1);
    let spike = curves.curve("Spike").unwrap();
    let ones = spike.iter().filter(|&&y| y == 1.).count();

    assert_eq!(ones, 1);
    assert_eq!(spike[200], 1.);
    assert_eq!(spike[199], 0.);
    assert_eq!(spike[201], 0.);

    let wall = curves.curve("Wall").unwrap();

    assert_eq!(wall[99], 0.);
    assert_eq!(wall[100], 1.);
    assert_eq!(wall[300], 1.);
    assert!((wall[325] - 0.5).abs() < 1e-9);
}

#[test]
fn test_corner_pinned_despite_rounding() {
    // 0.3 cannot be hit exactly by 3 * 0.1
    let shape = Trapezoid::new(0.3, 0.3, 0.1, 0.1);

    assert_eq!(trapezoid_degree(&shape, 3. * 0.1, 1e-5), 1.);
    assert_eq!(trapezoid_degree(&shape, 0.1, 1e-5), 0.);
}

#[test]
fn test_zero_extent_variable_has_single_sample() {
    use crate::terms::Terms;

    let mut terms = Terms::new();

    terms.insert("Zero", Trapezoid::new(0., 0., 0., 0.));

    let curves = synthesize(&FuzzyVariable::new("Z", terms), 0.1);

    assert_eq!(curves.universe(), [0.]);
    assert_eq!(curves.curve("Zero").unwrap(), [1.]);
}
