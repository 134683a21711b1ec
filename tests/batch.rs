use std::path::PathBuf;

use fuzzy_rulebase::sampling::{evaluate_batch, evaluate_variants, grid_measurements, resample_variables};
use fuzzy_rulebase::{EngineConfig, Error, KnowledgeBase, MamdaniInference};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn load() -> (KnowledgeBase, MamdaniInference) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/vitals.fuzzy");
    let kb = KnowledgeBase::from_path(path).unwrap();
    let engine = MamdaniInference::from_knowledge_base(EngineConfig::default(), &kb).unwrap();

    (kb, engine)
}

#[test]
fn test_grid_shape() {
    let (_, engine) = load();
    let grid = grid_measurements(&engine, "HR", "R", 100).unwrap();
    let hr = engine.variables().key("HR").unwrap();
    let r = engine.variables().key("R").unwrap();

    // 15 heart rates by 4 breathing rates, each skipping the first sample
    assert_eq!(grid.len(), 60);
    assert!((grid[0].get(hr).unwrap() - 0.1).abs() < 1e-6);
    assert!((grid[1].get(r).unwrap() - 10.1).abs() < 1e-4);
    assert!((grid[59].get(hr).unwrap() - 140.1).abs() < 1e-4);

    assert!(matches!(grid_measurements(&engine, "HR", "R", 0), Err(Error::Configuration(_))));
    assert!(matches!(grid_measurements(&engine, "HR", "BP", 10), Err(Error::Configuration(_))));
}

#[test]
fn test_batch_matches_sequential() {
    let (_, engine) = load();
    let grid = grid_measurements(&engine, "HR", "R", 100).unwrap();
    let outcome = evaluate_batch(&engine, &grid);

    assert_eq!(outcome.reports.len() + outcome.skipped, grid.len());
    assert!(outcome.skipped > 0);
    assert!(!outcome.reports.is_empty());
    assert!(outcome.reports.windows(2).all(|w| w[0].0 < w[1].0));

    for (i, report) in &outcome.reports {
        assert_eq!(&engine.eval(&grid[*i]).unwrap(), report);
    }

    assert_eq!(outcome.centroids("D").len(), outcome.reports.len());
}

#[test]
fn test_untouched_variants_agree() {
    let (kb, _) = load();
    let mut rng = SmallRng::seed_from_u64(42);
    let variants: Vec<_> = (0..8)
        .map(|_| resample_variables(&kb.variables, &mut rng, 1., &[]))
        .collect();
    let outcome = evaluate_variants(
        &EngineConfig::default(),
        &variants,
        &kb.rules,
        &[("HR", 95.), ("R", 21.)],
    );

    assert_eq!(outcome.skipped, 0);
    assert_eq!(outcome.centroids("D"), vec![52.92; 8]);
}

#[test]
fn test_perturbed_variants() {
    let (kb, _) = load();
    let mut rng = SmallRng::seed_from_u64(5);
    let variants: Vec<_> = (0..16)
        .map(|_| resample_variables(&kb.variables, &mut rng, 0., &["D"]))
        .collect();
    let outcome = evaluate_variants(
        &EngineConfig::default(),
        &variants,
        &kb.rules,
        &[("HR", 95.), ("R", 21.)],
    );

    assert_eq!(outcome.reports.len() + outcome.skipped, variants.len());

    for (_, report) in &outcome.reports {
        let d = report.get("D").unwrap();

        assert_eq!(d.universe.len(), 1001);
        assert!((0. ..=100.).contains(&d.centroid));
    }

    // The source set is never modified
    let hr = kb.variables.by_name("HR").unwrap();

    assert_eq!(hr.terms().get("Low").map(|t| t.center1), Some(40.));
}
