mod support;

use std::collections::HashSet;

use livepreview::cache::CacheConfig;
use livepreview::infra::telemetry;
use livepreview::{PreviewSession, SessionConfig};
use metrics_util::debugging::DebuggingRecorder;

use support::CountingRenderer;

#[test]
fn preview_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");
    telemetry::describe_metrics();

    let config = SessionConfig {
        cache: CacheConfig { max_size: 1 },
        ..SessionConfig::default()
    };
    let mut session = PreviewSession::new(CountingRenderer::failing_on(&["broken"]), &config)
        .expect("session");

    // Misses, evictions and one fallback.
    session.render("= T\n== A\na\n== B\nb\n== C\nbroken");

    // Pre-render the blocks the tiny cache already dropped.
    session.update_cursor_position(0);
    session.request_prediction();
    assert!(session.idle_prerender(5) > 0);

    // A single-block document hits on the second pass.
    session.render("= Only\n");
    session.render("= Only\n");

    session.enable(false);
    session.render("= Only\n");

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "livepreview_block_cache_hit_total",
        "livepreview_block_cache_miss_total",
        "livepreview_block_cache_evict_total",
        "livepreview_fragment_render_total",
        "livepreview_fragment_fallback_total",
        "livepreview_prerender_total",
        "livepreview_render_ms",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
