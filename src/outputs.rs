use serde::Serialize;

use crate::error::{Error, Result};

/// Membership of one measurement in one category.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Fuzzified {
    pub variable: String,
    pub term: String,
    pub degree: f64,
}

/// One fired rule: its combined precedent degree and the clipped consequent curve.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuleActivation {
    pub rule: String,
    pub consequent: String,
    pub degree: f64,
    pub curve: Vec<f64>,
}

/// Aggregated curve of a consequent and its two crisp readings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Defuzzified {
    pub variable: String,
    pub universe: Vec<f64>,
    pub aggregated: Vec<f64>,
    pub centroid: f64,
    pub bisector: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct InferenceReport {
    /// Measurements used, in declaration order
    pub measurements: Vec<(String, f64)>,
    pub fuzzified: Vec<Fuzzified>,
    pub activations: Vec<RuleActivation>,
    /// One entry per consequent targeted by a fired rule
    pub outputs: Vec<Defuzzified>,
    /// Antecedents whose measurement has zero membership everywhere
    pub out_of_support: Vec<String>,
}

impl InferenceReport {
    pub fn get(&self, variable: &str) -> Option<&Defuzzified> {
        self.outputs.iter().find(|o| o.variable == variable)
    }

    pub fn centroid(&self, variable: &str) -> Option<f64> {
        self.get(variable).map(|o| o.centroid)
    }

    pub fn bisector(&self, variable: &str) -> Option<f64> {
        self.get(variable).map(|o| o.bisector)
    }

    pub fn degree(&self, variable: &str, term: &str) -> Option<f64> {
        self.fuzzified
            .iter()
            .find(|f| f.variable == variable && f.term == term)
            .map(|f| f.degree)
    }

    /// The only output, for knowledge bases with a single consequent.
    pub fn single(&self) -> Result<&Defuzzified> {
        match &self.outputs[..] {
            [only] => Ok(only),
            outputs => Err(Error::config(format!(
                "expected exactly one consequent, found {}",
                outputs.len()
            ))),
        }
    }
}

#[test]
fn test_single_output() {
    let output = Defuzzified {
        variable: "D".into(),
        universe: vec![0., 1.],
        aggregated: vec![0., 1.],
        centroid: 0.67,
        bisector: 0.71,
    };
    let mut report = InferenceReport {
        outputs: vec![output.clone()],
        ..InferenceReport::default()
    };

    assert_eq!(report.single().unwrap(), &output);
    assert_eq!(report.centroid("D"), Some(0.67));
    assert_eq!(report.bisector("X"), None);

    report.outputs.push(Defuzzified {
        variable: "E".into(),
        ..output
    });

    assert!(matches!(report.single(), Err(Error::Configuration(_))));
    assert!(InferenceReport::default().single().is_err());
}
