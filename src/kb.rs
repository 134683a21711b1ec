//! Plain-text knowledge base.
//!
//! One file carries three kinds of sections, found by their shape rather than
//! by position:
//!
//! ```text
//! HR
//! name c1 c2 w1 w2
//! Low 40 60 10 10
//! High 80 100 10 10
//!
//! Rule1: If HR is Low and R is Normal then D is Stable
//!
//! HR = 55
//! ```

use std::fs;
use std::path::Path;

use crate::dsl::{self, ConditionSyntax};
use crate::error::{Error, Result};
use crate::inputs::Measurements;
use crate::rules::{Condition, Rule, Rules};
use crate::terms::Terms;
use crate::variable::{Trapezoid, Variables};

#[derive(Clone, Debug, Default)]
pub struct KnowledgeBase {
    pub variables: Variables,
    pub rules: Rules,
    pub measurements: Measurements,
}

impl KnowledgeBase {
    pub fn parse(text: &str) -> Result<Self> {
        let variables = parse_variables(text)?;
        let rules = parse_rules(text, &variables)?;
        let measurements = parse_measurements(text, &variables)?;

        tracing::debug!(
            variables = variables.len(),
            rules = rules.len(),
            measurements = measurements.len(),
            "knowledge base parsed"
        );

        Ok(Self {
            variables,
            rules,
            measurements,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;

        tracing::info!(path = %path.display(), "loading knowledge base");

        Self::parse(&text)
    }
}

/// A lone word opens a variable block, unless it looks like part of a rule
/// or a measurement.
fn block_header(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    let (Some(name), None) = (tokens.next(), tokens.next()) else {
        return None;
    };

    if name.contains("Rule") || name.contains(':') || name.contains('=') {
        return None;
    }

    Some(name)
}

fn parse_term(line: &str, line_no: usize) -> Result<(String, Trapezoid)> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    let &[name, c1, c2, w1, w2, ..] = fields.as_slice() else {
        return Err(Error::parse(
            line_no,
            format!("expected `<name> <c1> <c2> <w1> <w2>`, found `{}`", line.trim()),
        ));
    };

    // `parse` also takes `NaN` and `inf`
    let number = |field: &str| match field.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::parse(line_no, format!("`{field}` is not a number"))),
    };

    Ok((
        name.to_owned(),
        Trapezoid::new(number(c1)?, number(c2)?, number(w1)?, number(w2)?),
    ))
}

/// Variable blocks: a name line, one header line, then category lines up
/// to the next blank line.
pub fn parse_variables(text: &str) -> Result<Variables> {
    let lines: Vec<&str> = text.lines().collect();
    let mut vars = Variables::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(name) = block_header(lines[i]) else {
            i += 1;
            continue;
        };

        if i + 1 >= lines.len() {
            return Err(Error::parse(
                i + 1,
                format!("variable `{name}` ends before its header line"),
            ));
        }

        let mut terms = Terms::new();

        i += 2;

        while i < lines.len() && !lines[i].trim().is_empty() {
            let (term, shape) = parse_term(lines[i], i + 1)?;

            terms.insert(term, shape);
            i += 1;
        }

        if terms.is_empty() {
            tracing::debug!(variable = name, "skipping variable without categories");
        } else {
            tracing::debug!(variable = name, terms = terms.len(), "variable declared");
            vars.add(name, terms);
        }

        i += 1;
    }

    Ok(vars)
}

fn resolve(vars: &Variables, syntax: ConditionSyntax, label: &str) -> Option<Condition> {
    let Some(var) = vars.by_name(&syntax.variable) else {
        tracing::warn!(rule = label, variable = %syntax.variable, "clause on undeclared variable");
        return None;
    };

    if !var.terms().contains(&syntax.term) {
        tracing::warn!(
            rule = label,
            variable = %syntax.variable,
            term = %syntax.term,
            "clause on undeclared category"
        );
        return None;
    }

    vars.key(&syntax.variable)
        .map(|key| Condition::new(key, syntax.term))
}

/// Rule lines: `<label>: If <cond> [and|or <cond>]... then <cond>`.
///
/// A rule with any clause naming an undeclared variable or category is kept
/// but inert, so it never fires. Lines that don't follow the grammar are fatal.
pub fn parse_rules(text: &str, vars: &Variables) -> Result<Rules> {
    let mut rules = Rules::new();

    for (line_no, line) in text.lines().enumerate().map(|(i, l)| (i + 1, l)) {
        let Some((label, body)) = line.split_once(':') else {
            continue;
        };

        if !body.split_whitespace().any(|t| t.eq_ignore_ascii_case("then")) {
            continue;
        }

        let syntax = dsl::parse_rule(body).map_err(|message| Error::parse(line_no, message))?;
        let label = match label.trim() {
            "" => format!("R{}", rules.len() + 1),
            label => label.to_owned(),
        };
        // Resolve every clause so each unknown name gets reported
        let precedents: Vec<_> = syntax
            .conditions
            .into_iter()
            .map(|c| resolve(vars, c, &label))
            .collect();
        let result = resolve(vars, syntax.result, &label);
        let rule = match (precedents.into_iter().collect::<Option<Vec<_>>>(), result) {
            (Some(precedents), Some(result)) => Rule::new(label, syntax.connector, precedents, Some(result)),
            _ => {
                tracing::warn!(rule = %label, "rule refers to undeclared names and will never fire");
                Rule::new(label, syntax.connector, Vec::new(), None)
            }
        };

        rules.add(rule);
    }

    Ok(rules)
}

/// Measurement lines: `<variable> = <value>`. Undeclared variables are skipped.
pub fn parse_measurements(text: &str, vars: &Variables) -> Result<Measurements> {
    let mut measurements = Measurements::new();

    for (line_no, line) in text.lines().enumerate().map(|(i, l)| (i + 1, l)) {
        let Some((name, value)) = line.split_once('=') else {
            continue;
        };
        let name = name.trim();

        if !vars.contains(name) {
            continue;
        }

        let value = match value.trim().parse::<f32>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                return Err(Error::parse(
                    line_no,
                    format!("`{}` is not a valid measurement", value.trim()),
                ))
            }
        };

        measurements.add_named(vars, name, f64::from(value));
    }

    Ok(measurements)
}

#[cfg(test)]
const VITALS: &str = "\
HR
name c1 c2 w1 w2
Low 40 60 10 10
High 80 100 10 10

R
name c1 c2 w1 w2
Normal 12 20 4 4

D
name c1 c2 w1 w2
Stable 10 20 10 10
Critical 60 80 10 10

Rule1: If HR is Low and R is Normal then D is Stable
Rule2: If HR is High or R is Fast then D is Critical
Rule3: If BP is High then D is Critical
Rule4: If HR is High then Mood is Bad

HR = 55
R = 16.5
BP = 120
";

#[test]
fn test_variables() {
    let vars = parse_variables(VITALS).unwrap();
    let names: Vec<_> = vars.iter().map(|(_, v)| v.name()).collect();

    assert_eq!(names, ["HR", "R", "D"]);

    let hr = vars.by_name("HR").unwrap();

    assert_eq!(hr.terms().get("Low"), Some(&Trapezoid::new(40., 60., 10., 10.)));
    assert_eq!(hr.terms().len(), 2);
}

#[test]
fn test_rules() {
    let vars = parse_variables(VITALS).unwrap();
    let rules = parse_rules(VITALS, &vars).unwrap();
    let hr = vars.key("HR").unwrap();
    let r = vars.key("R").unwrap();
    let d = vars.key("D").unwrap();

    assert_eq!(rules.len(), 4);

    let rule1 = &rules.0[0];

    assert_eq!(rule1.label(), "Rule1");
    assert_eq!(rule1.connector(), crate::ops::Connector::And);
    assert_eq!(
        rule1.precedents(),
        [Condition::new(hr, "Low"), Condition::new(r, "Normal")]
    );
    assert_eq!(rule1.result(), Some(&Condition::new(d, "Stable")));

    // `R is Fast` names an unknown category, the others undeclared variables
    assert_eq!(rules.0[1].label(), "Rule2");
    assert!(rules.0[1].is_inert());
    assert!(rules.0[1].precedents().is_empty());
    assert!(rules.0[2].is_inert());
    assert!(rules.0[3].is_inert());
}

#[test]
fn test_unknown_clause_disables_whole_rule() {
    use crate::inference::{EngineConfig, MamdaniInference};

    let kb = KnowledgeBase::parse(
        "\
HR
name c1 c2 w1 w2
Low 40 60 10 10

D
name c1 c2 w1 w2
Stable 10 20 10 10

Rule1: If HR is Low and BP is High then D is Stable

HR = 50
",
    )
    .unwrap();
    let rule1 = kb.rules.iter().next().unwrap();

    assert_eq!(rule1.connector(), crate::ops::Connector::And);
    assert!(rule1.is_inert());
    assert!(rule1.precedents().is_empty());
    assert_eq!(rule1.result(), None);

    // `HR is Low` alone is fully true at 50, the conjunction is not
    let engine = MamdaniInference::from_knowledge_base(EngineConfig::default(), &kb).unwrap();
    let report = engine.eval(&kb.measurements).unwrap();

    assert!(engine.rules().is_empty());
    assert!(report.activations.is_empty());
    assert_eq!(report.centroid("D"), None);
}

#[test]
fn test_measurements() {
    let vars = parse_variables(VITALS).unwrap();
    let m = parse_measurements(VITALS, &vars).unwrap();

    assert_eq!(m.len(), 2);
    assert_eq!(m.get(vars.key("HR").unwrap()), Some(55.));
    assert_eq!(m.get(vars.key("R").unwrap()), Some(16.5));
}

#[test]
fn test_parse_errors_carry_line_numbers() {
    let bad_number = "HR\nheader\nLow 40 sixty 10 10\n";

    match parse_variables(bad_number) {
        Err(Error::Parse { line, message }) => {
            assert_eq!(line, 3);
            assert!(message.contains("sixty"));
        }
        other => panic!("unexpected {other:?}"),
    }

    assert!(matches!(
        parse_variables("HR\nheader\nLow 40 60\n"),
        Err(Error::Parse { line: 3, .. })
    ));
    assert!(matches!(parse_variables("\n\nHR"), Err(Error::Parse { line: 3, .. })));

    let vars = parse_variables(VITALS).unwrap();

    assert!(matches!(
        parse_rules("Rule9: If HR Low then D is Stable", &vars),
        Err(Error::Parse { line: 1, .. })
    ));
    assert!(matches!(
        parse_measurements("\nHR = fast\n", &vars),
        Err(Error::Parse { line: 2, .. })
    ));
    // undeclared variables are never parsed
    assert!(parse_measurements("BP = high", &vars).unwrap().is_empty());
}

#[test]
fn test_non_finite_numbers_are_rejected() {
    for shape in ["Low 40 inf 10 10", "Low NaN 60 10 10", "Low 40 60 -infinity 10"] {
        let text = format!("HR\nheader\n{shape}\n");

        assert!(
            matches!(parse_variables(&text), Err(Error::Parse { line: 3, .. })),
            "{shape}"
        );
    }

    let vars = parse_variables(VITALS).unwrap();

    for value in ["NaN", "inf", "-Infinity"] {
        let text = format!("R = 16\nHR = {value}\n");

        assert!(
            matches!(parse_measurements(&text, &vars), Err(Error::Parse { line: 2, .. })),
            "{value}"
        );
    }
}

#[test]
fn test_block_at_end_of_file() {
    let kb = KnowledgeBase::parse("Temp\nheader\nCold 0 5 0 5").unwrap();

    assert_eq!(kb.variables.len(), 1);
    assert!(kb.rules.is_empty());
    assert!(kb.measurements.is_empty());
}
