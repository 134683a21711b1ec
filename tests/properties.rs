//! Property-based tests for curve synthesis, connectors and defuzzification

use fuzzy_rulebase::defuzz::{area, bisector, centroid};
use fuzzy_rulebase::membership::synthesize;
use fuzzy_rulebase::{
    Connector, EngineConfig, Error, FuzzyVariable, KnowledgeBase, MamdaniInference, Measurements,
    Terms, Trapezoid,
};
use proptest::prelude::*;

/// Trapezoids with integral parameters and an ordered plateau
fn trapezoid_strategy() -> impl Strategy<Value = Trapezoid> {
    (0u32..50, 0u32..30, 0u32..20, 0u32..20).prop_map(|(c1, span, w1, w2)| {
        Trapezoid::new(
            f64::from(c1),
            f64::from(c1 + span),
            f64::from(w1),
            f64::from(w2),
        )
    })
}

fn degrees_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0..=1.0f64, 1..8)
}

fn variable(shapes: &[Trapezoid]) -> FuzzyVariable {
    let terms: Terms = shapes
        .iter()
        .enumerate()
        .map(|(i, shape)| (format!("T{i}"), *shape))
        .collect();

    FuzzyVariable::new("X", terms)
}

const KB: &str = "\
HR
name c1 c2 w1 w2
Low 40 60 10 10
High 80 100 10 10

D
name c1 c2 w1 w2
Stable 10 20 10 10
Critical 60 80 10 10

Rule1: If HR is Low then D is Stable
Rule2: If HR is High then D is Critical
";

proptest! {
    #[test]
    fn test_curves_stay_in_unit_interval(shapes in prop::collection::vec(trapezoid_strategy(), 1..4)) {
        let curves = synthesize(&variable(&shapes), 0.1);
        let universe = curves.universe();

        prop_assert!(universe.windows(2).all(|w| w[0] < w[1]));

        for (_, ys) in curves.terms() {
            prop_assert_eq!(ys.len(), universe.len());
            prop_assert!(ys.iter().all(|&y| (0. ..=1.).contains(&y)));
        }
    }

    #[test]
    fn test_plateau_is_full_membership(shape in trapezoid_strategy()) {
        let curves = synthesize(&variable(&[shape]), 0.1);

        for x in [shape.center1, shape.center2, (shape.center1 + shape.center2) / 2.] {
            let degree = curves.fuzzify("T0", x).unwrap();

            prop_assert!((degree - 1.).abs() < 1e-6, "membership {} at {}", degree, x);
        }

        // Outside the feet there is no membership
        let [a, _, _, d] = shape.corners();

        if a >= 0.2 {
            prop_assert_eq!(curves.fuzzify("T0", a - 0.2).unwrap(), 0.);
        }
        prop_assert_eq!(curves.fuzzify("T0", d + 0.2).unwrap(), 0.);
    }

    #[test]
    fn test_and_or_bounds(degrees in degrees_strategy()) {
        let and = Connector::And.call(degrees.iter().copied()).unwrap();
        let or = Connector::Or.call(degrees.iter().copied()).unwrap();

        prop_assert!(degrees.iter().all(|&d| and <= d && or >= d));
        prop_assert!(degrees.contains(&and) && degrees.contains(&or));
    }

    #[test]
    fn test_bisector_halves_area(shape in trapezoid_strategy(), height in 0.05..=1.0f64) {
        let curves = synthesize(&variable(&[shape]), 0.1);
        let xs = curves.universe();
        let ys: Vec<f64> = curves.curve("T0").unwrap().iter().map(|&y| y.min(height)).collect();
        let total = area(xs, &ys);
        let split = bisector(xs, &ys, 9).unwrap();

        // Left piece closed exactly at the split
        let n = xs.partition_point(|&x| x <= split);
        let mut left_xs = xs[..n].to_vec();
        let mut left_ys = ys[..n].to_vec();

        if n < xs.len() && n > 0 {
            let t = (split - xs[n - 1]) / (xs[n] - xs[n - 1]);

            left_xs.push(split);
            left_ys.push(ys[n - 1] + t * (ys[n] - ys[n - 1]));
        }

        prop_assert!((area(&left_xs, &left_ys) - total / 2.).abs() < 1e-6 * total.max(1.));
    }

    #[test]
    fn test_centroid_within_support(shape in trapezoid_strategy(), height in 0.05..=1.0f64) {
        let curves = synthesize(&variable(&[shape]), 0.1);
        let xs = curves.universe();
        let ys: Vec<f64> = curves.curve("T0").unwrap().iter().map(|&y| y.min(height)).collect();
        let [a, b, c, d] = shape.corners();
        let crisp = centroid(xs, &ys, 2).unwrap();

        prop_assert!(crisp >= a.max(0.) - 0.1 && crisp <= d + 0.1);
        // Symmetric shapes balance on the middle of the plateau
        if b - a == d - c && a >= 0. {
            prop_assert!((crisp - (b + c) / 2.).abs() <= 0.01);
        }
    }

    #[test]
    fn test_eval_is_total(hr in 0.0..=120.0f64) {
        let kb = KnowledgeBase::parse(KB).unwrap();
        let engine = MamdaniInference::from_knowledge_base(EngineConfig::default(), &kb).unwrap();
        let mut m = Measurements::new();

        m.add_named(&kb.variables, "HR", hr);

        match engine.eval(&m) {
            Ok(report) => {
                let d = report.single().unwrap();

                prop_assert!((0. ..=90.).contains(&d.centroid));
                prop_assert!((0. ..=90.).contains(&d.bisector));
                prop_assert!(report.out_of_support.is_empty());
            }
            // Only measurements touching neither category leave nothing to defuzzificate
            Err(Error::Configuration(_)) => {
                prop_assert!(hr <= 30. || hr >= 110. || hr == 70.);
            }
            Err(other) => prop_assert!(false, "unexpected {:?}", other),
        }
    }
}
