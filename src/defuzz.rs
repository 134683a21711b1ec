//! Centroid and bisector of a sampled membership function.
//!
//! Both walk the polyline one segment at a time and classify each segment
//! so the exact area (and centroid) of its shape can be used instead of a
//! plain trapezoid rule.

use crate::error::{Error, Result};
use crate::math::round_to;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Shape {
    Rectangle,
    /// Rises from zero at `x1`
    LeftTriangle,
    /// Falls to zero at `x2`
    RightTriangle,
    Trapezoid,
}

#[derive(Clone, Copy, Debug)]
struct Segment {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
    shape: Shape,
}

impl Segment {
    /// `None` for segments of zero height or zero width.
    fn new(x1: f64, x2: f64, y1: f64, y2: f64) -> Option<Self> {
        if (y1 == 0. && y2 == 0.) || x1 == x2 {
            return None;
        }

        let shape = if y1 == y2 {
            Shape::Rectangle
        } else if y1 == 0. {
            Shape::LeftTriangle
        } else if y2 == 0. {
            Shape::RightTriangle
        } else {
            Shape::Trapezoid
        };

        Some(Self { x1, x2, y1, y2, shape })
    }

    fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    fn area(&self) -> f64 {
        let w = self.width();

        match self.shape {
            Shape::Rectangle => w * self.y1,
            Shape::LeftTriangle => 0.5 * w * self.y2,
            Shape::RightTriangle => 0.5 * w * self.y1,
            Shape::Trapezoid => 0.5 * w * (self.y1 + self.y2),
        }
    }

    fn centroid(&self) -> f64 {
        let (x1, w) = (self.x1, self.width());

        match self.shape {
            Shape::Rectangle => x1 + 0.5 * w,
            Shape::LeftTriangle => x1 + 2. / 3. * w,
            Shape::RightTriangle => x1 + 1. / 3. * w,
            Shape::Trapezoid => x1 + 2. / 3. * w * (self.y2 + 0.5 * self.y1) / (self.y1 + self.y2),
        }
    }

    /// Abscissa in `[x1, x2]` whose area to the left equals `subarea`.
    fn split_at_area(&self, subarea: f64) -> f64 {
        let Segment { x1, x2, y1, y2, .. } = *self;
        let w = self.width();

        match self.shape {
            Shape::Rectangle => x1 + subarea / y1,
            Shape::LeftTriangle => x1 + (2. * subarea * w / y2).max(0.).sqrt(),
            Shape::RightTriangle => x2 - (w * w - 2. * subarea * w / y1).max(0.).sqrt(),
            Shape::Trapezoid => {
                let m = (y2 - y1) / w;
                let root = (y1 * y1 + 2. * m * subarea).max(0.).sqrt();

                x1 - (y1 - root) / m
            }
        }
    }
}

fn segments<'a>(universe: &'a [f64], membership: &'a [f64]) -> impl Iterator<Item = Option<Segment>> + 'a {
    universe
        .windows(2)
        .zip(membership.windows(2))
        .map(|(x, y)| Segment::new(x[0], x[1], y[0], y[1]))
}

fn check_shapes(universe: &[f64], membership: &[f64]) -> Result<()> {
    if universe.len() != membership.len() {
        return Err(Error::config(format!(
            "universe has {} samples but membership has {}",
            universe.len(),
            membership.len()
        )));
    }
    if universe.is_empty() {
        return Err(Error::config("cannot defuzzificate an empty universe"));
    }

    Ok(())
}

/// Area under the polyline.
pub fn area(universe: &[f64], membership: &[f64]) -> f64 {
    segments(universe, membership).flatten().map(|s| s.area()).sum()
}

/// Centre of gravity of the area under the curve.
pub fn centroid(universe: &[f64], membership: &[f64], decimals: i32) -> Result<f64> {
    check_shapes(universe, membership)?;

    if let [x] = universe {
        return Ok(*x);
    }

    let (sum_moment, sum_area) = segments(universe, membership)
        .flatten()
        .fold((0., 0.), |(moment, total), s| {
            let area = s.area();

            (moment + s.centroid() * area, total + area)
        });

    if sum_area <= 0. {
        return Err(Error::config("centroid of a membership function with zero area"));
    }

    Ok(round_to(sum_moment / sum_area, decimals))
}

/// Vertical line dividing the area under the curve into two equal halves.
pub fn bisector(universe: &[f64], membership: &[f64], decimals: i32) -> Result<f64> {
    check_shapes(universe, membership)?;

    if let [x] = universe {
        return Ok(*x);
    }

    let segs: Vec<_> = segments(universe, membership).collect();
    let cumulative: Vec<f64> = segs
        .iter()
        .scan(0., |acc, s| {
            *acc += s.map_or(0., |s| s.area());
            Some(*acc)
        })
        .collect();
    let total = cumulative.last().copied().unwrap_or(0.);

    if total <= 0. {
        return Err(Error::config("bisector of a membership function with zero area"));
    }

    let half = total / 2.;
    let index = cumulative
        .iter()
        .position(|&acc| acc >= half)
        .unwrap_or(cumulative.len() - 1);
    let before = if index == 0 { 0. } else { cumulative[index - 1] };

    // The first segment reaching half the area can't be empty
    let Some(segment) = segs[index] else {
        return Err(Error::config("bisector landed on an empty segment"));
    };

    Ok(round_to(segment.split_at_area(half - before), decimals))
}

#[cfg(test)]
fn grid(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 * 0.1).collect()
}

#[test]
fn test_rectangle_plateau() {
    let xs = grid(501);
    let ys: Vec<f64> = xs
        .iter()
        .map(|&x| if (20. ..=40.).contains(&x) { 0.6 } else { 0. })
        .collect();

    assert_eq!(centroid(&xs, &ys, 2).unwrap(), 30.);
    assert_eq!(bisector(&xs, &ys, 2).unwrap(), 30.);
}

#[test]
fn test_symmetric_triangle() {
    let xs = grid(501);
    let ys: Vec<f64> = xs
        .iter()
        .map(|&x| (1. - (x - 25.).abs() / 10.).max(0.))
        .collect();

    assert!((centroid(&xs, &ys, 2).unwrap() - 25.).abs() <= 0.01);
    assert!((bisector(&xs, &ys, 2).unwrap() - 25.).abs() <= 0.01);
}

#[test]
fn test_skewed_shape_halves_area() {
    let xs = grid(101);
    let ys: Vec<f64> = xs.iter().map(|&x| (x / 10.).powi(2)).collect();
    let split = bisector(&xs, &ys, 6).unwrap();
    let total = area(&xs, &ys);
    let left: Vec<f64> = xs.iter().copied().filter(|&x| x <= split).collect();
    let mut left_ys: Vec<f64> = ys[..left.len()].to_vec();
    let mut left_xs = left;

    // close the left piece exactly at the split
    left_xs.push(split);
    left_ys.push((split / 10.).powi(2));

    assert!((area(&left_xs, &left_ys) - total / 2.).abs() < 1e-2 * total);
    assert!(split > 5. && split < 10.);
}

#[test]
fn test_single_sample() {
    assert_eq!(centroid(&[4.2], &[0.3], 2).unwrap(), 4.2);
    assert_eq!(bisector(&[4.2], &[0.], 2).unwrap(), 4.2);
}

#[test]
fn test_zero_area_is_an_error() {
    let xs = grid(10);
    let ys = vec![0.; 10];

    assert!(matches!(centroid(&xs, &ys, 2), Err(Error::Configuration(_))));
    assert!(matches!(bisector(&xs, &ys, 2), Err(Error::Configuration(_))));
    assert!(matches!(centroid(&xs, &ys[..3], 2), Err(Error::Configuration(_))));
    assert!(matches!(bisector(&[], &[], 2), Err(Error::Configuration(_))));
}

#[test]
fn test_gap_between_bumps() {
    // Equal bumps around a hole. The running area must carry across the hole
    let xs = [0., 1., 2., 3., 4., 5.];
    let ys = [1., 1., 0., 0., 1., 1.];
    let split = bisector(&xs, &ys, 2).unwrap();

    assert_eq!(centroid(&xs, &ys, 2).unwrap(), 2.5);
    assert_eq!(split, 2.);
}

#[test]
fn test_shape_classification() {
    assert!(Segment::new(0., 1., 0., 0.).is_none());
    assert!(Segment::new(1., 1., 0.2, 0.4).is_none());
    assert_eq!(Segment::new(0., 1., 0.5, 0.5).unwrap().shape, Shape::Rectangle);
    assert_eq!(Segment::new(0., 1., 0., 0.5).unwrap().shape, Shape::LeftTriangle);
    assert_eq!(Segment::new(0., 1., 0.5, 0.).unwrap().shape, Shape::RightTriangle);

    let t = Segment::new(0., 2., 0.2, 0.6).unwrap();

    assert_eq!(t.shape, Shape::Trapezoid);
    assert!((t.area() - 0.8).abs() < 1e-12);
    assert!((t.split_at_area(t.area()) - 2.).abs() < 1e-9);
    assert!(t.split_at_area(0.).abs() < 1e-9);
}
