use std::collections::HashMap;

use crate::variable::{VariableKey, Variables};

/// Crisp measurements for one evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Measurements(pub(crate) HashMap<VariableKey, f64>);

impl Measurements {
    pub fn new() -> Self {
        Measurements(HashMap::new())
    }

    pub fn add(&mut self, var: VariableKey, val: f64) {
        self.0.insert(var, val);
    }

    /// Adds `val` if `name` is a declared variable; returns whether it was kept.
    pub fn add_named(&mut self, vars: &Variables, name: &str, val: f64) -> bool {
        match vars.key(name) {
            Some(key) => {
                self.add(key, val);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, var: VariableKey) -> Option<f64> {
        self.0.get(&var).copied()
    }

    pub fn contains(&self, var: VariableKey) -> bool {
        self.0.contains_key(&var)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableKey, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[test]
fn test_undeclared_names_are_ignored() {
    use crate::terms::Terms;

    let mut vars = Variables::new();
    let hr = vars.add("HR", Terms::new());
    let mut inputs = Measurements::new();

    assert!(inputs.add_named(&vars, "HR", 72.));
    assert!(!inputs.add_named(&vars, "BP", 120.));
    assert_eq!(inputs.get(hr), Some(72.));
    assert_eq!(inputs.len(), 1);
}
