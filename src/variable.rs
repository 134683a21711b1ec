use std::collections::HashMap;

use serde::Serialize;
use slotmap::{new_key_type, SlotMap};

use crate::terms::Terms;

new_key_type! {
    /// A variable key
    pub struct VariableKey;
}

/// Trapezoid described by its plateau and the widths of its two slopes.
///
/// Corners are `a = center1 - left_width`, `b = center1`, `c = center2` and
/// `d = center2 + right_width`. A zero width turns that side into a vertical
/// edge; collapsing everything leaves a singleton.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Trapezoid {
    pub center1: f64,
    pub center2: f64,
    pub left_width: f64,
    pub right_width: f64,
}

impl Trapezoid {
    pub const fn new(center1: f64, center2: f64, left_width: f64, right_width: f64) -> Self {
        Self {
            center1,
            center2,
            left_width,
            right_width,
        }
    }

    pub fn corners(&self) -> [f64; 4] {
        [
            self.center1 - self.left_width,
            self.center1,
            self.center2,
            self.center2 + self.right_width,
        ]
    }

    /// Right edge of the support.
    pub fn upper_bound(&self) -> f64 {
        self.center2 + self.right_width
    }

    pub(crate) fn largest_parameter(&self) -> f64 {
        [self.center1, self.center2, self.left_width, self.right_width]
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FuzzyVariable {
    pub(crate) name: String,
    pub(crate) terms: Terms,
}

impl FuzzyVariable {
    pub fn new(name: impl Into<String>, terms: Terms) -> Self {
        Self {
            name: name.into(),
            terms,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn terms(&self) -> &Terms {
        &self.terms
    }
}

/// All declared variables, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct Variables {
    pub(crate) arena: SlotMap<VariableKey, FuzzyVariable>,
    names: HashMap<String, VariableKey>,
}

impl Variables {
    pub fn new() -> Self {
        Self {
            arena: SlotMap::with_key(),
            names: HashMap::new(),
        }
    }

    /// Redeclaring a variable replaces its terms and keeps its key.
    pub fn add(&mut self, name: impl Into<String>, terms: Terms) -> VariableKey {
        let name = name.into();

        if let Some(&key) = self.names.get(&name) {
            self.arena[key].terms = terms;
            return key;
        }

        let key = self.arena.insert(FuzzyVariable::new(name.clone(), terms));

        self.names.insert(name, key);

        key
    }

    pub fn key(&self, name: &str) -> Option<VariableKey> {
        self.names.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn get(&self, key: VariableKey) -> Option<&FuzzyVariable> {
        self.arena.get(key)
    }

    pub fn by_name(&self, name: &str) -> Option<&FuzzyVariable> {
        self.key(name).and_then(|key| self.arena.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableKey, &FuzzyVariable)> {
        self.arena.iter()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Copy of `self` with each shape passed through `f`. Keys stay valid.
    pub fn map_shapes(&self, mut f: impl FnMut(&str, &str, Trapezoid) -> Trapezoid) -> Self {
        let mut out = self.clone();

        for (_, var) in out.arena.iter_mut() {
            for (term, shape) in var.terms.iter_mut() {
                *shape = f(&var.name, term, *shape);
            }
        }

        out
    }
}

#[test]
fn test_trapezoid_corners() {
    let low = Trapezoid::new(40., 60., 10., 10.);

    assert_eq!(low.corners(), [30., 40., 60., 70.]);
    assert_eq!(low.upper_bound(), 70.);
    assert_eq!(low.largest_parameter(), 60.);
}

#[test]
fn test_redeclared_variable_keeps_key() {
    let mut vars = Variables::new();
    let mut terms = Terms::new();

    terms.insert("Low", Trapezoid::new(0., 1., 0., 1.));

    let hr = vars.add("HR", terms.clone());
    let r = vars.add("R", terms);
    let hr2 = vars.add("HR", Terms::new());

    assert_eq!(hr, hr2);
    assert_ne!(hr, r);
    assert_eq!(vars.len(), 2);
    assert!(vars.by_name("HR").unwrap().terms().is_empty());

    let names: Vec<_> = vars.iter().map(|(_, v)| v.name()).collect();

    assert_eq!(names, ["HR", "R"]);
}

#[test]
fn test_map_shapes_leaves_original() {
    let mut vars = Variables::new();
    let mut terms = Terms::new();

    terms.insert("Low", Trapezoid::new(0., 1., 0., 1.));
    vars.add("HR", terms);

    let shifted = vars.map_shapes(|_, _, s| Trapezoid::new(s.center1 + 1., s.center2 + 1., 0., 0.));

    assert_eq!(vars.by_name("HR").unwrap().terms().get("Low").unwrap().center1, 0.);
    assert_eq!(shifted.by_name("HR").unwrap().terms().get("Low").unwrap().center1, 1.);
}
