/// End-to-end tests: CSV on disk -> train -> artifacts -> prediction
///
/// Run with: cargo test -p traffic_pipeline --test integration_tests -- --nocapture

use std::fs;
use std::path::Path;

use traffic_pipeline::{
    train, ArtifactBundle, Dataset, FeaturePipeline, ForestParams, PredictionInput, TrainParams,
    HOLIDAYS, WEATHER,
};

/// Deterministic synthetic history: volume falls with rain and snow, rises
/// with temperature, and drops on holidays.
fn synthetic_csv(rows: usize) -> String {
    let mut out = String::from("holiday,temp,rain_1h,snow_1h,weather,date,Time,traffic_volume\n");
    for i in 0..rows {
        let holiday = if i % 37 == 5 { HOLIDAYS[1 + i % 11] } else { "None" };
        let weather = WEATHER[(i * 7) % WEATHER.len()];
        let temp = 260.0 + ((i * 13) % 45) as f64;
        let rain = if weather == "Rain" { ((i % 5) as f64) * 0.5 } else { 0.0 };
        let snow = if weather == "Snow" { ((i % 3) as f64) * 0.25 } else { 0.0 };
        let mut volume = 1500.0 + (temp - 260.0) * 60.0 - rain * 400.0 - snow * 900.0;
        if holiday != "None" {
            volume *= 0.4;
        }
        // a few gaps for the forward-fill stage
        let temp_cell = if i % 50 == 3 { String::new() } else { format!("{temp:.2}") };
        out.push_str(&format!(
            "{holiday},{temp_cell},{rain},{snow},{weather},01-01-2013,{:02}:00:00,{}\n",
            i % 24,
            volume.round() as i64
        ));
    }
    out
}

fn first_split(v: &mut serde_json::Value) -> Option<&mut serde_json::Value> {
    if v.get("true_child").is_some_and(|c| !c.is_null()) {
        return Some(v);
    }
    match v {
        serde_json::Value::Object(map) => map.values_mut().find_map(first_split),
        serde_json::Value::Array(items) => items.iter_mut().find_map(first_split),
        _ => None,
    }
}

fn small_params() -> TrainParams {
    TrainParams {
        forest: ForestParams {
            n_trees: 20,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn train_from(path: &Path) -> traffic_pipeline::TrainOutcome {
    let ds = Dataset::from_path(path).expect("dataset should load");
    train(ds, &small_params()).expect("training should succeed")
}

#[test]
fn test_train_save_load_predict() {
    println!("\n=== Test: Train, Save, Load, Predict ===");
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("traffic_volume.csv");
    fs::write(&csv_path, synthetic_csv(400)).unwrap();

    let outcome = train_from(&csv_path);
    println!("✓ Trained on {} rows, RMSE {:.2}", outcome.n_rows, outcome.rmse);
    assert_eq!(outcome.n_test, 80);
    assert_eq!(outcome.n_train, 320);
    assert!(outcome.rmse.is_finite());

    let models = dir.path().join("models");
    outcome.bundle.save(&models).unwrap();
    let pipeline = FeaturePipeline::load(&models).expect("artifacts should load");
    assert_eq!(pipeline.run_id(), outcome.bundle.run_id);
    pipeline.bundle().model.validate().expect("saved model is well formed");

    let input = PredictionInput {
        holiday: "None".into(),
        temp: 288.28,
        rain_1h: 0.0,
        snow_1h: 0.0,
        weather: "Clouds".into(),
    };
    let encoded = pipeline.encode(&input);
    assert_eq!(encoded.features.len(), 5);
    assert_eq!(encoded.features[0], 0.0, "None is the first holiday seen");
    assert!(encoded.unseen.is_empty());

    let pred = pipeline.predict(&input).unwrap();
    let line = pred.display_line();
    println!("✓ {line}");
    let number = line.strip_prefix("Predicted Traffic Volume: ").unwrap();
    assert!(number.parse::<i64>().is_ok());

    // loaded pipeline matches the in-memory one
    let fresh = FeaturePipeline::new(outcome.bundle);
    assert_eq!(fresh.predict(&input).unwrap(), pred);
}

#[test]
fn test_unknown_holiday_uses_sentinel() {
    println!("\n=== Test: Unknown Holiday ===");
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("traffic_volume.csv");
    fs::write(&csv_path, synthetic_csv(200)).unwrap();
    let pipeline = FeaturePipeline::new(train_from(&csv_path).bundle);

    let input = PredictionInput {
        holiday: "Unknown Holiday".into(),
        temp: 290.0,
        rain_1h: 0.0,
        snow_1h: 0.0,
        weather: "Clear".into(),
    };
    let encoded = pipeline.encode(&input);
    assert_eq!(encoded.features[0], -1.0);
    let pred = pipeline.predict(&input).expect("sentinel path must not fail");
    assert!(pred.value.is_finite());
    assert_eq!(pred.unseen, vec!["holiday"]);
    println!("✓ {}", pred.display_line());
}

#[test]
fn test_retraining_is_reproducible() {
    println!("\n=== Test: Retraining Determinism ===");
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("traffic_volume.csv");
    fs::write(&csv_path, synthetic_csv(300)).unwrap();

    let a = train_from(&csv_path);
    let b = train_from(&csv_path);
    println!("✓ RMSE run 1 = {:.4}, run 2 = {:.4}", a.rmse, b.rmse);
    assert_eq!(a.rmse, b.rmse);
    assert_eq!(
        serde_json::to_string(&a.bundle.model).unwrap(),
        serde_json::to_string(&b.bundle.model).unwrap()
    );
    assert_eq!(a.bundle.scaler, b.bundle.scaler);
    // same fit, still a distinct run
    assert_ne!(a.bundle.run_id, b.bundle.run_id);
}

#[test]
fn test_artifacts_from_different_runs_do_not_mix() {
    println!("\n=== Test: Stale Artifact Detection ===");
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("traffic_volume.csv");
    fs::write(&csv_path, synthetic_csv(150)).unwrap();

    let mut first = train_from(&csv_path).bundle;
    first.run_id = "first".into();
    let mut second = train_from(&csv_path).bundle;
    second.run_id = "second".into();

    let a = dir.path().join("a");
    let b = dir.path().join("b");
    first.save(&a).unwrap();
    second.save(&b).unwrap();
    fs::copy(b.join("best_model.json"), a.join("best_model.json")).unwrap();

    let err = ArtifactBundle::load(&a).unwrap_err();
    println!("✓ Rejected: {err}");
    assert!(err.to_string().contains("run id"));
}

#[test]
fn test_back_to_back_runs_cannot_be_mixed() {
    println!("\n=== Test: Back-to-back Runs Stay Distinct ===");
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("traffic_volume.csv");
    fs::write(&csv_path, synthetic_csv(150)).unwrap();

    let params = TrainParams {
        forest: ForestParams {
            n_trees: 1,
            ..Default::default()
        },
        ..Default::default()
    };
    let first = train(Dataset::from_path(&csv_path).unwrap(), &params).unwrap().bundle;
    let second = train(Dataset::from_path(&csv_path).unwrap(), &params).unwrap().bundle;
    assert_ne!(first.run_id, second.run_id);

    let a = dir.path().join("a");
    let b = dir.path().join("b");
    first.save(&a).unwrap();
    second.save(&b).unwrap();
    fs::copy(b.join("scaler.json"), a.join("scaler.json")).unwrap();

    assert!(ArtifactBundle::load(&a).is_err());
    println!("✓ {} and {} rejected together", first.run_id, second.run_id);
}

#[test]
fn test_tampered_model_fails_to_load() {
    println!("\n=== Test: Tampered Model File ===");
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("traffic_volume.csv");
    fs::write(&csv_path, synthetic_csv(200)).unwrap();
    let models = dir.path().join("models");
    train_from(&csv_path).bundle.save(&models).unwrap();

    // point the first split node at a feature the pipeline does not have
    let model_path = models.join("best_model.json");
    let mut v: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&model_path).unwrap()).unwrap();
    first_split(&mut v).expect("trained model has a split")["split_feature"] = 7.into();
    fs::write(&model_path, v.to_string()).unwrap();

    let err = FeaturePipeline::load(&models).unwrap_err();
    println!("✓ Rejected: {err}");
    assert!(err.to_string().contains("best_model.json"));
}
