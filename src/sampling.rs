//! Repeated evaluation over perturbed shapes or swept measurements.
//!
//! Every trial gets its own [`Variables`] value and its own engine, so no
//! state is shared between trials and they run in parallel on `rayon`.

use rand::Rng;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::inference::{EngineConfig, MamdaniInference};
use crate::inputs::Measurements;
use crate::outputs::InferenceReport;
use crate::rules::Rules;
use crate::variable::{Trapezoid, Variables};

/// Randomly redraws a shape. With probability `keep_prob` it comes back
/// untouched; otherwise four integers in `0..=max(parameters)` are drawn and
/// accepted one by one while they keep the plateau ordered.
pub fn perturb<R: Rng + ?Sized>(shape: Trapezoid, rng: &mut R, keep_prob: f64) -> Trapezoid {
    if rng.gen::<f64>() <= keep_prob {
        return shape;
    }

    let max = shape.largest_parameter();

    if !(max.is_finite() && max >= 0.) {
        return shape;
    }

    let upper = max.floor() as u64;
    let mut draw = || rng.gen_range(0..=upper) as f64;
    let (a, b, alpha, beta) = (draw(), draw(), draw(), draw());
    let mut out = shape;

    if b >= out.center1 {
        out.center2 = b;
    }
    if alpha <= out.center1 {
        out.left_width = alpha;
    }
    if beta <= out.center2 {
        out.right_width = beta;
    }
    if a <= out.center2 {
        out.center1 = a;
    }

    out
}

/// New variable set with every category of every variable not listed in
/// `keep` passed through [`perturb`]. `vars` itself is never modified.
pub fn resample_variables<R: Rng + ?Sized>(
    vars: &Variables,
    rng: &mut R,
    keep_prob: f64,
    keep: &[&str],
) -> Variables {
    vars.map_shapes(|var, _term, shape| {
        if keep.iter().any(|k| *k == var) {
            shape
        } else {
            perturb(shape, rng, keep_prob)
        }
    })
}

/// Measurement sets sweeping `first` and `second` over their universes,
/// starting from the second sample and moving `stride` samples at a time.
pub fn grid_measurements(
    engine: &MamdaniInference,
    first: &str,
    second: &str,
    stride: usize,
) -> Result<Vec<Measurements>> {
    if stride == 0 {
        return Err(Error::config("grid stride must be at least 1"));
    }

    let axis = |name: &str| {
        let key = engine
            .variables()
            .key(name)
            .ok_or_else(|| Error::config(format!("unknown variable `{name}`")))?;
        let universe = engine
            .curves(key)
            .map(|c| c.universe())
            .unwrap_or_default();

        Ok::<_, Error>((key, universe))
    };
    let (key_a, xs) = axis(first)?;
    let (key_b, ys) = axis(second)?;
    let mut grid = Vec::new();

    for &x in xs.iter().skip(1).step_by(stride) {
        for &y in ys.iter().skip(1).step_by(stride) {
            let mut m = Measurements::new();

            // Measurements are single precision when read from text
            m.add(key_a, f64::from(x as f32));
            m.add(key_b, f64::from(y as f32));
            grid.push(m);
        }
    }

    Ok(grid)
}

/// Reports of the trials that succeeded, tagged with their index.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub reports: Vec<(usize, InferenceReport)>,
    pub skipped: usize,
}

impl BatchOutcome {
    fn collect(results: Vec<(usize, Result<InferenceReport>)>) -> Self {
        let mut outcome = BatchOutcome::default();

        for (i, result) in results {
            match result {
                Ok(report) => outcome.reports.push((i, report)),
                Err(err) => {
                    tracing::debug!(sample = i, error = %err, "skipping sample");
                    outcome.skipped += 1;
                }
            }
        }

        outcome
    }

    /// Centroids of `variable` over the successful trials, in trial order.
    pub fn centroids(&self, variable: &str) -> Vec<f64> {
        self.reports
            .iter()
            .filter_map(|(_, report)| report.centroid(variable))
            .collect()
    }
}

/// Evaluates every measurement set against one engine. Failed samples are
/// counted and skipped.
pub fn evaluate_batch(engine: &MamdaniInference, samples: &[Measurements]) -> BatchOutcome {
    let results = samples
        .par_iter()
        .enumerate()
        .map(|(i, m)| (i, engine.eval(m)))
        .collect();

    BatchOutcome::collect(results)
}

/// Builds one engine per variable set and evaluates it against the same
/// named measurements. Failed trials are counted and skipped.
pub fn evaluate_variants(
    config: &EngineConfig,
    variants: &[Variables],
    rules: &Rules,
    measurements: &[(&str, f64)],
) -> BatchOutcome {
    let results = variants
        .par_iter()
        .enumerate()
        .map(|(i, vars)| {
            let run = || {
                let engine = MamdaniInference::new(config.clone(), vars, rules)?;
                let mut m = Measurements::new();

                for &(name, value) in measurements {
                    m.add_named(vars, name, value);
                }

                engine.eval(&m)
            };

            (i, run())
        })
        .collect();

    BatchOutcome::collect(results)
}

#[test]
fn test_perturb_keeps_with_certainty() {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    let mut rng = SmallRng::seed_from_u64(7);
    let shape = Trapezoid::new(40., 60., 10., 10.);

    for _ in 0..100 {
        assert_eq!(perturb(shape, &mut rng, 1.), shape);
    }
}

#[test]
fn test_perturb_stays_in_range() {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    let mut rng = SmallRng::seed_from_u64(11);
    let shape = Trapezoid::new(40., 60., 10., 10.);
    let mut changed = 0;

    for _ in 0..500 {
        let out = perturb(shape, &mut rng, 0.);

        for p in [out.center1, out.center2, out.left_width, out.right_width] {
            assert!((0. ..=60.).contains(&p) && p.fract() == 0.);
        }
        // center2 only ever moves up from center1
        assert!(out.center2 >= shape.center1);
        changed += usize::from(out != shape);
    }

    assert!(changed > 400);
}

#[test]
fn test_resample_skips_listed_variables() {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use crate::terms::Terms;

    let mut vars = Variables::new();
    let terms: Terms = [("Mid", Trapezoid::new(40., 60., 10., 10.))].into_iter().collect();

    vars.add("HR", terms.clone());
    vars.add("D", terms.clone());

    let mut rng = SmallRng::seed_from_u64(3);
    let resampled = resample_variables(&vars, &mut rng, 0., &["D"]);

    assert_eq!(resampled.by_name("D").unwrap().terms(), &terms);
    assert_eq!(vars.by_name("HR").unwrap().terms(), &terms);
}
