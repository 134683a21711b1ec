use std::collections::HashMap;

use slotmap::SecondaryMap;

use crate::classify::{classify, ClassifiedVariable, VariableKind};
use crate::error::{Error, Result};
use crate::inputs::Measurements;
use crate::kb::KnowledgeBase;
use crate::membership::{synthesize_all, VariableCurves};
use crate::ops::{aggregate_into, clip, DefuzzificationOp};
use crate::outputs::{Defuzzified, Fuzzified, InferenceReport, RuleActivation};
use crate::rules::{Rule, Rules};
use crate::variable::{VariableKey, Variables};

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Sampling step of every universe
    pub step: f64,
    /// Decimal places kept in crisp results
    pub decimals: i32,
    /// Upper bound on precedents per rule, `None` for no bound
    pub max_precedents: Option<usize>,
    /// Fail with [`Error::Domain`] instead of letting an out-of-support
    /// measurement propagate as zero activation
    pub reject_out_of_support: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step: 0.1,
            decimals: 2,
            max_precedents: None,
            reject_out_of_support: false,
        }
    }
}

impl EngineConfig {
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn with_decimals(mut self, decimals: i32) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_max_precedents(mut self, max: impl Into<Option<usize>>) -> Self {
        self.max_precedents = max.into();
        self
    }

    pub fn with_reject_out_of_support(mut self, reject: bool) -> Self {
        self.reject_out_of_support = reject;
        self
    }
}

/// Mamdani inference over a fixed set of variables and rules.
///
/// Curves are synthesized once in [`MamdaniInference::new`]; [`eval`](Self::eval)
/// only reads them, so one engine can serve many measurement sets, including
/// from several threads at once.
pub struct MamdaniInference {
    config: EngineConfig,
    vars: Variables,
    curves: SecondaryMap<VariableKey, VariableCurves>,
    rules: Vec<Rule>,
}

impl MamdaniInference {
    /// Inert rules and rules referring to unknown variables or categories are
    /// dropped here.
    pub fn new(config: EngineConfig, vars: &Variables, rules: &Rules) -> Result<Self> {
        if !(config.step.is_finite() && config.step > 0.) {
            return Err(Error::config(format!("step must be positive, got {}", config.step)));
        }

        for (_, var) in vars.iter() {
            for (term, shape) in var.terms().iter() {
                let [a, b, c, d] = shape.corners();

                if ![a, b, c, d].iter().all(|p| p.is_finite()) {
                    return Err(Error::config(format!(
                        "`{}` category `{term}` has a non-finite parameter",
                        var.name()
                    )));
                }
            }
        }

        let curves = synthesize_all(vars, config.step);
        let known = |key: VariableKey, term: &str| {
            vars.get(key)
                .map_or(false, |var| var.terms().contains(term))
        };
        let rules: Vec<Rule> = rules
            .iter()
            .filter(|rule| {
                if rule.is_inert() {
                    tracing::debug!(rule = rule.label(), "skipping inert rule");
                    return false;
                }

                let resolved = rule
                    .precedents()
                    .iter()
                    .chain(rule.result())
                    .all(|c| known(c.variable(), c.term()));

                if !resolved {
                    tracing::warn!(rule = rule.label(), "dropping rule with unknown variable or category");
                }

                resolved
            })
            .cloned()
            .collect();

        tracing::debug!(variables = vars.len(), rules = rules.len(), "inference engine ready");

        Ok(Self {
            config,
            vars: vars.clone(),
            curves,
            rules,
        })
    }

    pub fn from_knowledge_base(config: EngineConfig, kb: &KnowledgeBase) -> Result<Self> {
        Self::new(config, &kb.variables, &kb.rules)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn variables(&self) -> &Variables {
        &self.vars
    }

    /// Rules that survived validation.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn curves(&self, key: VariableKey) -> Option<&VariableCurves> {
        self.curves.get(key)
    }

    pub fn curves_by_name(&self, name: &str) -> Option<&VariableCurves> {
        self.vars.key(name).and_then(|key| self.curves.get(key))
    }

    fn name(&self, key: VariableKey) -> &str {
        self.vars.get(key).map_or("?", |var| var.name())
    }

    pub fn classify(&self, measurements: &Measurements) -> Vec<ClassifiedVariable<'_>> {
        classify(&self.vars, &self.curves, measurements)
    }

    /// Fuzzificates every category of every antecedent some rule reads.
    fn fuzzificate(
        &self,
        measurements: &Measurements,
        kinds: &HashMap<VariableKey, VariableKind>,
        report: &mut InferenceReport,
    ) -> Result<HashMap<(VariableKey, String), f64>> {
        let mut degrees = HashMap::new();
        let mut fuzzificated: Vec<VariableKey> = Vec::new();

        for rule in &self.rules {
            for precedent in rule.precedents() {
                let key = precedent.variable();

                if fuzzificated.contains(&key) {
                    continue;
                }

                let (Some(VariableKind::Antecedent), Some(value)) = (kinds.get(&key), measurements.get(key))
                else {
                    return Err(Error::config(format!(
                        "rule `{}` reads `{}`, which has no measurement",
                        rule.label(),
                        self.name(key)
                    )));
                };
                let curves = &self.curves[key];
                let mut any_support = false;

                for (term, _) in curves.terms() {
                    let degree = curves.fuzzify(term, value).unwrap_or(0.);

                    tracing::trace!(variable = self.name(key), term, degree, "fuzzificated");
                    any_support |= degree > 0.;
                    degrees.insert((key, term.to_owned()), degree);
                    report.fuzzified.push(Fuzzified {
                        variable: self.name(key).to_owned(),
                        term: term.to_owned(),
                        degree,
                    });
                }

                if !any_support {
                    if self.config.reject_out_of_support {
                        return Err(Error::Domain {
                            variable: self.name(key).to_owned(),
                            value,
                        });
                    }

                    tracing::warn!(variable = self.name(key), value, "measurement outside every category");
                    report.out_of_support.push(self.name(key).to_owned());
                }

                fuzzificated.push(key);
            }
        }

        Ok(degrees)
    }

    /// Combined precedent degree and clipped consequent curve of one rule.
    fn activate(
        &self,
        rule: &Rule,
        kinds: &HashMap<VariableKey, VariableKind>,
        degrees: &HashMap<(VariableKey, String), f64>,
    ) -> Result<(VariableKey, f64, Vec<f64>)> {
        let precedents = rule.precedents();

        if let Some(max) = self.config.max_precedents {
            if precedents.len() > max {
                return Err(Error::config(format!(
                    "rule `{}` has {} precedents, at most {max} are supported",
                    rule.label(),
                    precedents.len()
                )));
            }
        }

        let Some(result) = rule.result() else {
            return Err(Error::config(format!("rule `{}` has no result", rule.label())));
        };
        let key = result.variable();

        if kinds.get(&key) != Some(&VariableKind::Consequent) {
            return Err(Error::config(format!(
                "rule `{}` concludes on `{}`, which was measured",
                rule.label(),
                self.name(key)
            )));
        }

        let membership = self.curves[key].curve(result.term()).ok_or_else(|| {
            Error::config(format!(
                "rule `{}` concludes on unknown category `{}`",
                rule.label(),
                result.term()
            ))
        })?;
        let precedent_degrees = precedents
            .iter()
            .map(|p| degrees.get(&(p.variable(), p.term().to_owned())).copied().unwrap_or(0.));
        let degree = rule.connector().call(precedent_degrees)?;

        tracing::debug!(rule = rule.label(), connector = %rule.connector(), degree, "rule activated");

        Ok((key, degree, clip(degree, membership)))
    }

    /// Runs one full inference. Takes `&self` only, so independent measurement
    /// sets can be evaluated concurrently.
    pub fn eval(&self, measurements: &Measurements) -> Result<InferenceReport> {
        let classified = self.classify(measurements);
        let kinds: HashMap<_, _> = classified.iter().map(|c| (c.key, c.kind)).collect();
        let mut report = InferenceReport {
            measurements: classified
                .iter()
                .filter_map(|c| measurements.get(c.key).map(|v| (c.name.to_owned(), v)))
                .collect(),
            ..InferenceReport::default()
        };

        let degrees = self.fuzzificate(measurements, &kinds, &mut report)?;

        // Aggregate per consequent
        let mut aggregated: SecondaryMap<VariableKey, Vec<f64>> = SecondaryMap::new();

        for rule in &self.rules {
            let (key, degree, curve) = self.activate(rule, &kinds, &degrees)?;
            let acc = aggregated
                .entry(key)
                .map(|e| e.or_insert_with(|| vec![0.; curve.len()]));

            if let Some(acc) = acc {
                aggregate_into(acc, &curve);
            }

            report.activations.push(RuleActivation {
                rule: rule.label().to_owned(),
                consequent: self.name(key).to_owned(),
                degree,
                curve,
            });
        }

        // Defuzzificate, in declaration order
        for consequent in &classified {
            let Some(membership) = aggregated.remove(consequent.key) else {
                continue;
            };
            let universe = consequent.curves.universe();
            let crisp = |op: DefuzzificationOp| {
                op.call(universe, &membership, self.config.decimals)
                    .map_err(|err| match err {
                        Error::Configuration(msg) => Error::config(format!("`{}`: {msg}", consequent.name)),
                        other => other,
                    })
            };
            let centroid = crisp(DefuzzificationOp::Centroid)?;
            let bisector = crisp(DefuzzificationOp::Bisector)?;

            tracing::debug!(variable = consequent.name, centroid, bisector, "defuzzificated");

            report.outputs.push(Defuzzified {
                variable: consequent.name.to_owned(),
                universe: universe.to_vec(),
                aggregated: membership,
                centroid,
                bisector,
            });
        }

        Ok(report)
    }
}

#[cfg(test)]
fn vitals() -> KnowledgeBase {
    KnowledgeBase::parse(
        "\
HR
name c1 c2 w1 w2
Low 40 60 10 10
High 80 100 10 10

R
name c1 c2 w1 w2
Slow 0 5 0 3
Normal 12 20 4 4

D
name c1 c2 w1 w2
Stable 20 20 20 20
Critical 70 80 10 0

Rule1: If HR is Low and R is Normal then D is Stable
Rule2: If HR is High or R is Slow then D is Critical

HR = 65
R = 10
",
    )
    .unwrap()
}

#[test]
fn test_vitals_eval() {
    let kb = vitals();
    let engine = MamdaniInference::from_knowledge_base(EngineConfig::default(), &kb).unwrap();
    let report = engine.eval(&kb.measurements).unwrap();

    // HR = 65 sits halfway down Low's falling edge, R = 10 halfway up Normal
    assert!((report.degree("HR", "Low").unwrap() - 0.5).abs() < 1e-9);
    assert_eq!(report.degree("HR", "High").unwrap(), 0.);
    assert!((report.degree("R", "Normal").unwrap() - 0.5).abs() < 1e-9);
    assert_eq!(report.degree("R", "Slow").unwrap(), 0.);

    assert_eq!(report.activations.len(), 2);
    assert!((report.activations[0].degree - 0.5).abs() < 1e-9);
    assert_eq!(report.activations[1].degree, 0.);
    assert!(report.activations[1].curve.iter().all(|&y| y == 0.));

    let d = report.single().unwrap();

    assert_eq!(d.variable, "D");
    assert!(d.aggregated.iter().all(|&y| y <= 0.5 + 1e-12));
    // Stable clipped at 0.5 is symmetric around 20
    assert_eq!(d.centroid, 20.);
    assert_eq!(d.bisector, 20.);
    assert_eq!(report.measurements, vec![("HR".into(), 65.), ("R".into(), 10.)]);
    assert!(report.out_of_support.is_empty());
}

#[test]
fn test_zero_activation_is_reported() {
    let kb = vitals();
    let engine = MamdaniInference::from_knowledge_base(EngineConfig::default(), &kb).unwrap();
    let mut m = Measurements::new();

    // Neither measurement touches any category
    m.add_named(&kb.variables, "HR", 200.);
    m.add_named(&kb.variables, "R", 30.);

    match engine.eval(&m) {
        Err(Error::Configuration(msg)) => assert!(msg.contains("`D`"), "{msg}"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_out_of_support_can_be_rejected() {
    let kb = vitals();
    let config = EngineConfig::default().with_reject_out_of_support(true);
    let engine = MamdaniInference::from_knowledge_base(config, &kb).unwrap();
    let mut m = Measurements::new();

    m.add_named(&kb.variables, "HR", 200.);
    m.add_named(&kb.variables, "R", 14.);

    match engine.eval(&m) {
        Err(Error::Domain { variable, value }) => {
            assert_eq!(variable, "HR");
            assert_eq!(value, 200.);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_out_of_support_propagates_as_zero() {
    let kb = vitals();
    let engine = MamdaniInference::from_knowledge_base(EngineConfig::default(), &kb).unwrap();
    let mut m = Measurements::new();

    // HR is nowhere, R is Slow so Rule2 still fires through OR
    m.add_named(&kb.variables, "HR", 200.);
    m.add_named(&kb.variables, "R", 5.);

    let report = engine.eval(&m).unwrap();

    assert_eq!(report.out_of_support, vec!["HR".to_owned()]);
    assert_eq!(report.activations[0].degree, 0.);
    assert_eq!(report.activations[1].degree, 1.);
    assert!(report.centroid("D").unwrap() > 70.);
}

#[test]
fn test_missing_measurement() {
    let kb = vitals();
    let engine = MamdaniInference::from_knowledge_base(EngineConfig::default(), &kb).unwrap();
    let mut m = Measurements::new();

    m.add_named(&kb.variables, "HR", 65.);

    assert!(matches!(engine.eval(&m), Err(Error::Configuration(_))));
}

#[test]
fn test_precedent_bound() {
    let kb = vitals();
    let config = EngineConfig::default().with_max_precedents(1);
    let engine = MamdaniInference::from_knowledge_base(config, &kb).unwrap();

    assert!(matches!(engine.eval(&kb.measurements), Err(Error::Configuration(_))));
}

#[test]
fn test_bad_step() {
    let kb = vitals();

    assert!(MamdaniInference::from_knowledge_base(EngineConfig::default().with_step(0.), &kb).is_err());
    assert!(MamdaniInference::from_knowledge_base(EngineConfig::default().with_step(f64::NAN), &kb).is_err());
}

#[test]
fn test_non_finite_inputs() {
    use crate::terms::Terms;
    use crate::variable::Trapezoid;

    let kb = vitals();
    let engine = MamdaniInference::from_knowledge_base(EngineConfig::default(), &kb).unwrap();
    let mut m = Measurements::new();

    // A NaN heart rate touches no category, so neither rule fires
    m.add_named(&kb.variables, "HR", f64::NAN);
    m.add_named(&kb.variables, "R", 10.);

    assert!(matches!(engine.eval(&m), Err(Error::Configuration(_))));

    let mut vars = kb.variables.clone();
    let terms: Terms = [("Huge", Trapezoid::new(0., f64::INFINITY, 0., 0.))].into_iter().collect();

    vars.add("HR", terms);

    assert!(matches!(
        MamdaniInference::new(EngineConfig::default(), &vars, &kb.rules),
        Err(Error::Configuration(_))
    ));
}
