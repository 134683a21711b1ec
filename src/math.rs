use num::Float;

/// Similar to numpy.interp with explicit `left`/`right` fill values.
///
/// `xp` must be ascending and the same length as `fp`.
pub(crate) fn interp<F: Float>(x: F, xp: &[F], fp: &[F], left: F, right: F) -> F {
    debug_assert_eq!(xp.len(), fp.len());

    let (Some(&first), Some(&last)) = (xp.first(), xp.last()) else {
        return left;
    };

    if x < first || x.is_nan() {
        return left;
    }
    if x > last {
        return right;
    }
    if x == last {
        return fp[fp.len() - 1];
    }

    // Index of the first sample strictly greater than x
    let hi = xp.partition_point(|&xi| xi <= x);
    let lo = hi - 1;
    let (x1, x2) = (xp[lo], xp[hi]);
    let (y1, y2) = (fp[lo], fp[hi]);

    if x == x1 {
        return y1;
    }

    y1 + (x - x1) * (y2 - y1) / (x2 - x1)
}

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to<F: Float>(value: F, decimals: i32) -> F {
    let Some(ten) = F::from(10.) else {
        return value;
    };
    let scale = ten.powi(decimals);

    (value * scale).round() / scale
}

#[test]
fn test_interp() {
    let xp = [1., 2., 3.];
    let fp = [3., 2., 0.];
    let got: Vec<f64> = [0., 1., 1.5, 2.72, 3.24]
        .into_iter()
        .map(|x| interp(x, &xp, &fp, 0., 0.))
        .collect();

    assert_eq!(got[0], 0.);
    assert_eq!(got[1], 3.);
    assert_eq!(got[2], 2.5);
    assert!((got[3] - 0.56).abs() < 1e-12);
    assert_eq!(got[4], 0.);

    let xp = [0., 1., 2., 3., 4.5];
    let fp = [0., 2., 5., 3., 2.];

    assert_eq!(interp(2.5, &xp, &fp, 0., 0.), 4.);
    assert_eq!(interp(-1., &xp, &fp, 7., 0.), 7.);
    assert_eq!(interp(7.5, &xp, &fp, 0., 9.), 9.);
    assert_eq!(interp(4.5, &xp, &fp, 0., 0.), 2.);
}

#[test]
fn test_interp_nan_takes_left() {
    let xp = [0., 1., 2.];
    let fp = [1., 1., 1.];

    assert_eq!(interp(f64::NAN, &xp, &fp, 0., 5.), 0.);
    assert_eq!(interp(f32::NAN, &[0f32, 1.], &[1., 1.], 0.25, 0.), 0.25);
}

#[test]
fn test_round_to() {
    assert_eq!(round_to(30.004999_f64, 2), 30.);
    assert_eq!(round_to(1.235_f64, 1), 1.2);
    assert_eq!(round_to(-2.5_f64, 0), -3.);
}
