//! End-to-end inference over the vital signs knowledge base in `fixtures/`.

use std::path::PathBuf;

use approx::assert_abs_diff_eq;
use fuzzy_rulebase::{
    Connector, EngineConfig, Error, KnowledgeBase, MamdaniInference, Measurements, VariableKind,
};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/vitals.fuzzy")
}

fn load() -> (KnowledgeBase, MamdaniInference) {
    let kb = KnowledgeBase::from_path(fixture()).unwrap();
    let engine = MamdaniInference::from_knowledge_base(EngineConfig::default(), &kb).unwrap();

    (kb, engine)
}

#[test]
fn test_load_fixture() {
    let (kb, engine) = load();
    let names: Vec<_> = kb.variables.iter().map(|(_, v)| v.name()).collect();

    assert_eq!(names, ["HR", "R", "D"]);
    assert_eq!(kb.rules.len(), 5);
    assert_eq!(kb.measurements.len(), 2);
    assert_eq!(engine.rules().len(), 5);

    let connectors: Vec<_> = kb.rules.iter().map(|r| r.connector()).collect();

    assert_eq!(
        connectors,
        [
            Connector::And,
            Connector::And,
            Connector::Or,
            Connector::And,
            Connector::Simple
        ]
    );

    let rule1 = kb.rules.iter().next().unwrap();
    let hr = kb.variables.key("HR").unwrap();

    assert_eq!(rule1.label(), "Rule1");
    assert_eq!(rule1.precedents()[0].variable(), hr);
    assert_eq!(rule1.precedents()[0].term(), "Low");
    assert_eq!(rule1.precedents()[1].term(), "Normal");
    assert_eq!(rule1.result().map(|c| c.term()), Some("Stable"));
}

#[test]
fn test_missing_file_is_io_error() {
    let missing = fixture().with_file_name("no-such-file.fuzzy");

    assert!(matches!(KnowledgeBase::from_path(missing), Err(Error::Io(_))));
}

#[test]
fn test_classification_follows_measurements() {
    let (kb, engine) = load();
    let kinds: Vec<_> = engine
        .classify(&kb.measurements)
        .into_iter()
        .map(|c| (c.name, c.kind))
        .collect();

    assert_eq!(
        kinds,
        [
            ("HR", VariableKind::Antecedent),
            ("R", VariableKind::Antecedent),
            ("D", VariableKind::Consequent)
        ]
    );
}

#[test]
fn test_universes() {
    let (_, engine) = load();
    let len = |name| engine.curves_by_name(name).unwrap().universe().len();

    assert_eq!(len("HR"), 1501);
    assert_eq!(len("R"), 321);
    assert_eq!(len("D"), 1001);
}

#[test]
fn test_two_rules_fire() {
    let (kb, engine) = load();
    let report = engine.eval(&kb.measurements).unwrap();

    assert_eq!(report.measurements, [("HR".to_owned(), 95.), ("R".to_owned(), 21.)]);
    assert_abs_diff_eq!(report.degree("HR", "Normal").unwrap(), 0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(report.degree("HR", "High").unwrap(), 0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(report.degree("R", "Fast").unwrap(), 0.5, epsilon = 1e-9);
    assert_eq!(report.degree("HR", "Low"), Some(0.));
    assert_eq!(report.degree("R", "Slow"), Some(0.));

    let degrees: Vec<_> = report.activations.iter().map(|a| a.degree).collect();
    let expected = [0., 0.5, 0.5, 0., 0.];

    for (got, want) in degrees.iter().zip(expected) {
        assert_abs_diff_eq!(*got, want, epsilon = 1e-9);
    }

    // Clipped Stable (area 12.5 around 15) and clipped Critical (17.5 around 80)
    assert_eq!(report.centroid("D"), Some(52.92));
    assert_eq!(report.bisector("D"), Some(67.5));
    assert!(report.out_of_support.is_empty());
    assert_eq!(report.single().unwrap().variable, "D");
}

#[test]
fn test_slow_breathing() {
    let (kb, engine) = load();
    let mut m = Measurements::new();

    assert!(m.add_named(&kb.variables, "HR", 50.));
    assert!(m.add_named(&kb.variables, "R", 8.));

    let report = engine.eval(&m).unwrap();
    let d = report.single().unwrap();

    assert_eq!(d.centroid, 45.);
    assert_eq!(d.bisector, 45.);
    assert_eq!(d.universe.len(), d.aggregated.len());
    assert!(d.aggregated.iter().all(|&y| (0. ..=1.).contains(&y)));
}

#[test]
fn test_report_serializes() {
    let (kb, engine) = load();
    let report = engine.eval(&kb.measurements).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["outputs"][0]["variable"], "D");
    assert_eq!(json["outputs"][0]["centroid"], 52.92);
    assert_eq!(json["activations"][2]["rule"], "Rule3");
    assert_eq!(json["activations"].as_array().unwrap().len(), 5);
}

#[test]
fn test_out_of_support_measurement() {
    let (kb, engine) = load();
    let mut m = Measurements::new();

    m.add_named(&kb.variables, "HR", 95.);
    m.add_named(&kb.variables, "R", 40.);

    let report = engine.eval(&m).unwrap();

    assert_eq!(report.out_of_support, ["R"]);
    assert_eq!(report.degree("R", "Fast"), Some(0.));

    let strict = MamdaniInference::from_knowledge_base(
        EngineConfig::default().with_reject_out_of_support(true),
        &kb,
    )
    .unwrap();

    match strict.eval(&m) {
        Err(Error::Domain { variable, value }) => {
            assert_eq!(variable, "R");
            assert_eq!(value, 40.);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_nothing_fires() {
    let (kb, engine) = load();
    let mut m = Measurements::new();

    // Below every category of both antecedents
    m.add_named(&kb.variables, "HR", 10.);
    m.add_named(&kb.variables, "R", 1.);

    match engine.eval(&m) {
        Err(Error::Configuration(message)) => assert!(message.starts_with("`D`")),
        other => panic!("unexpected {other:?}"),
    }
}
