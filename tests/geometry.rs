mod common;

use circle_selector::candidates::enumerate_candidates;
use circle_selector::evaluator::ParallelEvaluator;
use circle_selector::geometry::GeometricScorer;
use circle_selector::{Interval, Metric};
use common::synthetic_path::circle_with_outliers;

fn inverted_sum(record: &circle_selector::MetricRecord) -> f64 {
    1.0 / record.sum(&Metric::GEOMETRIC).unwrap()
}

#[test]
fn full_circle_scores_as_a_clean_loop() {
    let path = circle_with_outliers(200, 50);
    let scorer = GeometricScorer::default();
    let record = scorer.score(&path, Interval::new(0, 200).unwrap()).unwrap();

    let flatness = record.get(Metric::FlatnessError).unwrap();
    let perimeter = record.get(Metric::PerimeterError).unwrap();
    let endpoint = record.get(Metric::EndpointError).unwrap();
    assert!(flatness < 1e-9, "flatness={flatness}");
    assert!(perimeter < 1e-3, "perimeter={perimeter}");
    assert!(endpoint < 0.01, "endpoint={endpoint}");
}

#[test]
fn reaching_into_outliers_lowers_inverted_error() {
    let path = circle_with_outliers(200, 50);
    let scorer = GeometricScorer::default();
    let clean = inverted_sum(&scorer.score(&path, Interval::new(0, 200).unwrap()).unwrap());
    for (start, end) in [(0, 210), (0, 230), (0, 249), (20, 240), (150, 249)] {
        let record = scorer.score(&path, Interval::new(start, end).unwrap()).unwrap();
        let noisy = inverted_sum(&record);
        assert!(noisy < clean, "({start}, {end}): {noisy} >= {clean}");
    }
}

#[test]
fn metrics_are_non_negative_and_repeatable() {
    let path = circle_with_outliers(40, 15);
    let candidates = enumerate_candidates(path.len(), 10);

    let first = ParallelEvaluator::new(GeometricScorer::default(), Some(3))
        .evaluate(&path, &candidates)
        .unwrap();
    let second = ParallelEvaluator::new(GeometricScorer::default(), Some(1))
        .evaluate(&path, &candidates)
        .unwrap();

    assert_eq!(first.len(), candidates.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.interval, b.interval);
        for metric in Metric::GEOMETRIC {
            let x = a.get(metric).unwrap();
            let y = b.get(metric).unwrap();
            assert!(x >= 0.0, "{metric} negative for {}", a.interval);
            assert_eq!(x.to_bits(), y.to_bits(), "{metric} differs for {}", a.interval);
        }
    }
}
