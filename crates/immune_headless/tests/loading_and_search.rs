//! File loading and search equivalence tests.

use std::io::Write;

use immune_core::battle::Side;
use immune_core::boost::BoostSearch;
use immune_core::scenario::{Scenario, SAMPLE_INPUT};
use immune_headless::{
    config::SimConfig,
    parallel_search,
    scenario_loader::{self, ScenarioError},
};
use immune_test_utils::fixtures::{challenge_scenario, CHALLENGE_INPUT};
use tempfile::{NamedTempFile, TempDir};

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_text_roster() {
    let file = write_temp(".txt", SAMPLE_INPUT);
    let scenario = scenario_loader::load(file.path()).unwrap();
    assert_eq!(scenario, Scenario::sample());
}

#[test]
fn loads_text_roster_with_crlf() {
    let file = write_temp(".txt", &CHALLENGE_INPUT.replace('\n', "\r\n"));
    let scenario = scenario_loader::load(file.path()).unwrap();
    assert_eq!(scenario, challenge_scenario());
}

#[test]
fn saves_and_loads_ron_roster() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sample.ron");
    scenario_loader::save_ron(&Scenario::sample(), &path).unwrap();
    let scenario = scenario_loader::load(&path).unwrap();
    assert_eq!(scenario, Scenario::sample());
}

#[test]
fn bad_text_reports_line() {
    let file = write_temp(".txt", "Immune System:\n17 units each with lots of hit points\n");
    let err = scenario_loader::load(file.path()).unwrap_err();
    match err {
        ScenarioError::Invalid { source, .. } => {
            assert!(source.to_string().contains("line 2"), "{source}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn ron_text_is_not_read_as_roster() {
    let file = write_temp(".ron", SAMPLE_INPUT);
    assert!(matches!(
        scenario_loader::load(file.path()),
        Err(ScenarioError::Invalid { .. })
    ));
}

#[test]
fn loads_config_file() {
    let file = write_temp(".ron", "(boosted_side: B, floor: 5, ceiling: 500, window: 8, threads: 2)");
    let config = SimConfig::load(file.path()).unwrap();
    assert_eq!(
        config,
        SimConfig::default()
            .with_side(Side::B)
            .with_floor(5)
            .with_ceiling(500)
            .with_window(8)
            .with_threads(2)
    );
}

#[test]
fn parallel_search_equals_linear_on_sample() {
    let scenario = Scenario::sample();
    let config = SimConfig::default().with_window(256).with_threads(4);
    let parallel = parallel_search(&scenario, &config).unwrap();
    let linear = BoostSearch::new(Side::A).run(&scenario).unwrap();
    assert_eq!(parallel.result, linear);
    assert!(parallel.battles_fought >= linear.trials);
}

#[test]
fn parallel_search_equals_linear_on_challenge() {
    let scenario = challenge_scenario();
    for window in [1, 7, 64] {
        let config = SimConfig::default().with_window(window);
        let parallel = parallel_search(&scenario, &config).unwrap();
        let linear = config.search().run(&scenario).unwrap();
        assert_eq!(parallel.result, linear, "window {window}");
    }
}
