use serde::Serialize;
use slotmap::SecondaryMap;

use crate::inputs::Measurements;
use crate::membership::VariableCurves;
use crate::variable::{VariableKey, Variables};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum VariableKind {
    /// Has a measurement in the current evaluation
    Antecedent,
    /// Produced by inference
    Consequent,
}

/// A declared variable labelled for one evaluation, with its sampled curves.
#[derive(Clone, Copy, Debug)]
pub struct ClassifiedVariable<'e> {
    pub key: VariableKey,
    pub name: &'e str,
    pub kind: VariableKind,
    pub curves: &'e VariableCurves,
}

/// Labels every variable with curves, in declaration order. Variables are
/// antecedents exactly when `measurements` has a value for them.
pub fn classify<'e>(
    vars: &'e Variables,
    curves: &'e SecondaryMap<VariableKey, VariableCurves>,
    measurements: &Measurements,
) -> Vec<ClassifiedVariable<'e>> {
    vars.iter()
        .filter_map(|(key, var)| {
            let kind = if measurements.contains(key) {
                VariableKind::Antecedent
            } else {
                VariableKind::Consequent
            };

            curves.get(key).map(|curves| ClassifiedVariable {
                key,
                name: var.name(),
                kind,
                curves,
            })
        })
        .collect()
}

#[test]
fn test_classify_by_measurement() {
    use crate::membership::synthesize_all;
    use crate::terms::Terms;
    use crate::variable::Trapezoid;

    let mut vars = Variables::new();
    let terms: Terms = [("Low", Trapezoid::new(1., 2., 1., 1.))].into_iter().collect();
    let hr = vars.add("HR", terms.clone());
    let r = vars.add("R", terms.clone());
    let d = vars.add("D", terms);
    let curves = synthesize_all(&vars, 0.1);
    let mut m = Measurements::new();

    m.add(hr, 1.5);
    m.add(r, 2.5);

    let classified = classify(&vars, &curves, &m);
    let kinds: Vec<_> = classified.iter().map(|c| (c.key, c.kind)).collect();

    assert_eq!(
        kinds,
        [
            (hr, VariableKind::Antecedent),
            (r, VariableKind::Antecedent),
            (d, VariableKind::Consequent)
        ]
    );
    assert_eq!(classified[2].name, "D");
    assert_eq!(classified[2].curves.universe().len(), 31);
}
