use crate::ops::Connector;
use crate::variable::VariableKey;

/// `<variable> is <term>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Condition {
    pub(crate) variable: VariableKey,
    pub(crate) term: String,
}

impl Condition {
    pub fn new(variable: VariableKey, term: impl Into<String>) -> Self {
        Self {
            variable,
            term: term.into(),
        }
    }

    pub fn variable(&self) -> VariableKey {
        self.variable
    }

    pub fn term(&self) -> &str {
        &self.term
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub(crate) label: String,
    pub(crate) connector: Connector,
    pub(crate) precedents: Vec<Condition>,
    pub(crate) result: Option<Condition>,
}

impl Rule {
    pub fn new(
        label: impl Into<String>,
        connector: Connector,
        precedents: Vec<Condition>,
        result: Option<Condition>,
    ) -> Self {
        Self {
            label: label.into(),
            connector,
            precedents,
            result,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn connector(&self) -> Connector {
        self.connector
    }

    pub fn precedents(&self) -> &[Condition] {
        &self.precedents
    }

    pub fn result(&self) -> Option<&Condition> {
        self.result.as_ref()
    }

    /// A rule that lost its result or every precedent while being read.
    /// It is kept around but never fires.
    pub fn is_inert(&self) -> bool {
        self.result.is_none() || self.precedents.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Rules(pub(crate) Vec<Rule>);

impl Rules {
    pub fn new() -> Self {
        Rules(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Rules(Vec::with_capacity(capacity))
    }

    pub fn add(&mut self, rule: Rule) {
        self.0.push(rule);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[test]
fn test_inert_rules() {
    use slotmap::SlotMap;

    let mut keys = SlotMap::<VariableKey, ()>::with_key();
    let hr = keys.insert(());
    let d = keys.insert(());

    let live = Rule::new(
        "Rule1",
        Connector::Simple,
        vec![Condition::new(hr, "Low")],
        Some(Condition::new(d, "Stable")),
    );
    let headless = Rule::new("Rule2", Connector::Simple, vec![Condition::new(hr, "Low")], None);
    let empty = Rule::new("Rule3", Connector::And, Vec::new(), Some(Condition::new(d, "Stable")));

    assert!(!live.is_inert());
    assert!(headless.is_inert());
    assert!(empty.is_inert());
}
