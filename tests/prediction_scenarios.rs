use std::time::{Duration, Instant};

use livepreview::application::prediction::{
    PredictionConfig, PredictionEngine, PrerenderScheduler,
};

#[test]
fn fresh_engine_covers_cursor_neighbourhood() {
    let engine = PredictionEngine::default();
    let prediction = engine.predict_next_blocks(10, 5);

    for index in [4, 5, 6] {
        assert!(prediction.block_indices.contains(&index), "{prediction:?}");
    }
    assert!(prediction.block_indices.iter().all(|index| *index < 10));
}

#[test]
fn sequential_edits_extrapolate_to_the_next_block() {
    let mut engine = PredictionEngine::default();
    for index in [5, 6, 7] {
        engine.record_edit(index);
    }
    assert_eq!(engine.signals().streak(), 2);

    let prediction = engine.predict_next_blocks(10, 7);

    assert!(prediction.block_indices.contains(&8), "{prediction:?}");
    assert!(prediction.reason.contains("sequential_streak"));
}

#[test]
fn current_block_outranks_distant_block_for_any_history() {
    let histories: [&[usize]; 6] = [
        &[],
        &[9],
        &[9, 9, 9],
        &[7, 8, 9],
        &[6, 7, 8],
        &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    ];

    for history in histories {
        let mut engine = PredictionEngine::default();
        for index in history {
            engine.record_edit(*index);
        }
        let near = engine.get_priority_score(5, 5);
        let far = engine.get_priority_score(9, 5);
        assert!(near > far, "history {history:?}: {near} <= {far}");
    }
}

#[test]
fn current_block_outranks_distant_block_with_tuned_history() {
    let cases: [(usize, usize, &[usize]); 4] = [
        (100, 2, &[9, 6, 7, 8]),
        (30, 1, &[9, 7, 8]),
        (1_000, 1, &[9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 7, 8]),
        (3, 3, &[9, 5, 6, 7, 8]),
    ];

    for (history_depth, min_streak, history) in cases {
        let mut engine = PredictionEngine::new(PredictionConfig {
            history_depth,
            min_streak,
            ..PredictionConfig::default()
        });
        for index in history {
            engine.record_edit(*index);
        }
        let near = engine.get_priority_score(5, 5);
        let far = engine.get_priority_score(9, 5);
        assert!(
            near > far,
            "depth {history_depth}, min_streak {min_streak}, history {history:?}: {near} <= {far}"
        );
    }
}

#[test]
fn predictions_stay_bounded() {
    let config = PredictionConfig {
        max_predictions: 3,
        ..PredictionConfig::default()
    };
    let mut engine = PredictionEngine::new(config);
    let now = Instant::now();
    for index in [0, 1, 2, 3, 11, 12] {
        engine.record_edit_at(index, now);
    }

    let prediction = engine.predict_next_blocks_at(4, 3, now + Duration::from_millis(10));

    assert!(prediction.block_indices.len() <= 3);
    assert!(prediction.block_indices.iter().all(|index| *index < 4));
    assert!((0.0..=1.0).contains(&prediction.confidence));
}

#[test]
fn empty_document_yields_nothing_to_prerender() {
    let mut scheduler = PrerenderScheduler::default();
    let prediction = scheduler.request_prediction(0, 0);

    assert!(prediction.is_empty());
    assert_eq!(scheduler.get_next_prerender_block(), None);
}

#[test]
fn scheduler_drains_in_priority_order() {
    let mut scheduler = PrerenderScheduler::default();
    let prediction = scheduler.request_prediction(10, 5);

    let mut drained = Vec::new();
    while let Some(index) = scheduler.get_next_prerender_block() {
        drained.push(index);
    }

    assert_eq!(drained, prediction.block_indices);
    assert_eq!(drained.first(), Some(&5));
    assert!(scheduler.is_empty());
}

#[test]
fn shrinking_document_drops_out_of_range_queue_entries() {
    let mut scheduler = PrerenderScheduler::default();
    scheduler.request_prediction(10, 8);

    scheduler.retain_within(8);

    assert!(scheduler.queue().all(|entry| entry.block_index < 8));
}
