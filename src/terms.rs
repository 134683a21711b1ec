use crate::variable::Trapezoid;

/// Categories of one variable, kept in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Terms(pub(crate) Vec<(String, Trapezoid)>);

impl Terms {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Redeclaring a category replaces its shape but keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, shape: Trapezoid) {
        let name = name.into();

        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = shape,
            None => self.0.push((name, shape)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Trapezoid> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Trapezoid)> {
        self.0.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Trapezoid)> {
        self.0.iter_mut().map(|(n, s)| (n.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Trapezoid)> for Terms {
    fn from_iter<It: IntoIterator<Item = (S, Trapezoid)>>(iter: It) -> Self {
        let mut terms = Terms::new();

        for (name, shape) in iter {
            terms.insert(name, shape);
        }

        terms
    }
}

#[test]
fn test_insert_keeps_order() {
    let mut terms = Terms::new();

    terms.insert("Low", Trapezoid::new(0., 10., 0., 5.));
    terms.insert("High", Trapezoid::new(20., 30., 5., 0.));
    terms.insert("Low", Trapezoid::new(1., 9., 1., 1.));

    let names: Vec<_> = terms.iter().map(|(n, _)| n).collect();

    assert_eq!(names, ["Low", "High"]);
    assert_eq!(terms.get("Low"), Some(&Trapezoid::new(1., 9., 1., 1.)));
    assert!(!terms.contains("Medium"));
}
