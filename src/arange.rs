/// Evenly spaced values in `[start, stop)`, like numpy.arange
pub struct Arange {
    start: f64,
    step: f64,
    index: usize,
    len: usize,
}

impl Arange {
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        let span = (stop - start) / step;
        let len = if step > 0. && stop > start && span.is_finite() {
            // Ratios within rounding noise of an integer count as that integer, so
            // 3.1 / 0.1 = 31.000000000000004 yields 31 samples, not 32
            (span - 1e-6).ceil() as usize
        } else {
            0
        };

        Arange {
            start,
            step,
            index: 0,
            len,
        }
    }
}

impl Iterator for Arange {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        if self.index >= self.len {
            None
        } else {
            // Multiply instead of accumulating so error doesn't build up along the universe
            let i = self.index;
            self.index += 1;
            Some(self.start + self.step * i as f64)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.index;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Arange {}

#[test]
fn test_arange_len() {
    let xs: Vec<_> = Arange::new(0., 70.1, 0.1).collect();

    assert_eq!(xs.len(), 701);
    assert_eq!(xs[0], 0.);
    assert!((xs[700] - 70.).abs() < 1e-9);

    assert_eq!(Arange::new(0., 0.1, 0.1).collect::<Vec<_>>(), vec![0.]);
    assert_eq!(Arange::new(0., 1., 0.25).len(), 4);
    assert_eq!(Arange::new(0., 3.1, 0.1).len(), 31);
    assert_eq!(Arange::new(0., 0.35, 0.1).len(), 4);
    assert_eq!(Arange::new(1., 0., 0.1).len(), 0);
    assert_eq!(Arange::new(0., f64::INFINITY, 0.1).len(), 0);
    assert_eq!(Arange::new(0., f64::NAN, 0.1).len(), 0);
}
