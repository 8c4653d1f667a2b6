mod support;

use livepreview::IncrementalRenderer;
use livepreview::cache::{CacheConfig, content_hash};
use livepreview::domain::blocks::split;

use support::CountingRenderer;

const SAMPLE: &str = "= Title\n\n== A\n\nfoo\n\n== B\n\nbar";

fn preview(max_size: usize) -> IncrementalRenderer<CountingRenderer> {
    IncrementalRenderer::new(CountingRenderer::default(), &CacheConfig { max_size })
        .expect("renderer")
}

#[test]
fn sample_splits_into_three_blocks() {
    let blocks = split(SAMPLE);
    let levels: Vec<u8> = blocks.iter().map(|block| block.level).collect();
    assert_eq!(levels, vec![1, 2, 2]);
}

#[test]
fn two_renders_raise_hit_rate_from_zero_to_one() {
    let mut preview = preview(100);

    preview.render(SAMPLE);
    assert_eq!(preview.get_cache_stats().hit_rate, 0.0);

    preview.render(SAMPLE);
    let stats = preview.get_cache_stats();
    assert_eq!((stats.hits, stats.misses), (3, 0));
    assert_eq!(stats.hit_rate, 1.0);
}

#[test]
fn editing_one_body_rerenders_one_block() {
    let mut preview = preview(100);
    preview.render(SAMPLE);
    let before = preview.renderer().call_count();

    preview.render(&SAMPLE.replace("bar", "bar2"));

    assert_eq!(preview.renderer().call_count() - before, 1);
    assert_eq!(preview.get_cache_stats().hits, 2);
}

#[test]
fn rerender_is_byte_identical_and_hits_every_block() {
    let mut preview = preview(100);
    let first = preview.render(SAMPLE);
    let hits_before = preview.get_cache_stats().hits;

    let second = preview.render(SAMPLE);

    assert_eq!(first, second);
    assert_eq!(
        preview.get_cache_stats().hits - hits_before,
        split(SAMPLE).len() as u64
    );
}

#[test]
fn cached_content_is_never_rendered_twice() {
    let mut preview = preview(100);
    let reordered = "= Title\n\n== B\n\nbar\n== A\n\nfoo\n";

    preview.render(SAMPLE);
    preview.render(reordered);
    preview.render("= Title\n");
    preview.render(SAMPLE);

    let calls = preview.renderer().calls();
    let mut unique = calls.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(calls.len(), unique.len(), "duplicate renders: {calls:#?}");
}

#[test]
fn moved_block_keeps_its_id() {
    let before = split(SAMPLE);
    let moved = split("= Title\n\n== B\n\nbar\n== A\n\nfoo\n\n");

    let a = content_hash("== A\n\nfoo\n");
    assert!(before.iter().any(|block| block.id == a));
    assert!(moved.iter().any(|block| block.id == a));
}

#[test]
fn disabled_mode_matches_plain_renderer() {
    let mut preview = preview(100);
    preview.enable(false);

    let html = preview.render(SAMPLE);
    let direct = CountingRenderer::default();
    let expected = livepreview::FragmentRenderer::render_document(&direct, SAMPLE)
        .expect("direct render");

    assert_eq!(html, expected);
    assert!(!html.contains("data-block-id"));
    assert!(preview.cache().is_empty());
}

#[test]
fn broken_block_degrades_alone() {
    let mut preview = IncrementalRenderer::new(
        CountingRenderer::failing_on(&["foo"]),
        &CacheConfig { max_size: 100 },
    )
    .expect("renderer");

    let html = preview.render("= Title\n\n== A\n\n<foo>\n\n== B\n\nbar");

    assert!(html.contains("<pre class=\"preview-fallback\">"));
    assert!(!html.contains("<foo>"));
    assert!(html.contains("<section>== B\n\nbar</section>"));
    assert_eq!(preview.get_statistics().fallbacks, 1);
}

#[test]
fn cache_never_exceeds_capacity() {
    let mut preview = preview(2);
    for revision in 0..10 {
        preview.render(&format!("= Title\n== Body\nrevision {revision}\n== Tail\n"));
        assert!(preview.cache().len() <= 2);
    }
}

#[test]
fn assembled_html_carries_block_markers() {
    let mut preview = preview(100);
    let html = preview.render(SAMPLE);

    insta::assert_snapshot!(html, @r#"
    <div class="preview-block" data-block-id="7bdd385da155529b" data-line="0">
    <section>= Title</section>
    </div>
    <div class="preview-block" data-block-id="08211faf427bff75" data-line="2">
    <section>== A

    foo</section>
    </div>
    <div class="preview-block" data-block-id="2aaa25ec56f7d441" data-line="6">
    <section>== B

    bar</section>
    </div>
    "#);
}
