//! Benchmark tests for kino-quality operations
//!
//! Run with: cargo bench -p kino-quality

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use kino_quality::{
    CanPlay, Capabilities, ContainerFormat, Localization, PlaybackController, PlayerOptions,
    QualityStore, QualityTag, RawMediaEvent, SimulatedMedia, SourceClassifier, SourceDescriptor,
};

// ============================================================================
// Helpers
// ============================================================================

/// Alternating mp4/webm runs of untagged sources
fn create_untagged_sources(count: usize) -> Vec<SourceDescriptor> {
    (0..count)
        .map(|i| {
            if (i / 2) % 2 == 0 {
                SourceDescriptor::new(format!("https://cdn.example.com/clip-{}.mp4", i))
            } else {
                SourceDescriptor::new(format!("https://cdn.example.com/clip-{}.webm", i))
                    .with_codecs("vp9, opus")
            }
        })
        .collect()
}

/// Every quality offered as both mp4 and webm
fn create_tagged_sources(qualities: usize) -> Vec<SourceDescriptor> {
    (0..qualities)
        .flat_map(|q| {
            let tag = QualityTag::new(format!("{}p", 240 * (q + 1)), format!("{}p", 240 * (q + 1)));
            vec![
                SourceDescriptor::new(format!("https://cdn.example.com/{}.webm", q))
                    .with_mime("video/webm")
                    .with_quality(tag.clone()),
                SourceDescriptor::new(format!("https://cdn.example.com/{}.mp4", q))
                    .with_mime("video/mp4")
                    .with_codecs("avc1.640028, mp4a.40.2")
                    .with_quality(tag),
            ]
        })
        .collect()
}

fn can_play(type_string: &str) -> CanPlay {
    if type_string.starts_with("video/mp4") || type_string.starts_with("video/webm") {
        CanPlay::Probably
    } else {
        CanPlay::Empty
    }
}

// ============================================================================
// Classification
// ============================================================================

fn bench_classify_untagged(c: &mut Criterion) {
    let mut group = c.benchmark_group("Classify Untagged");
    let classifier = SourceClassifier::default();

    for &count in &[2, 8, 32, 128] {
        let sources = create_untagged_sources(count);
        group.bench_with_input(BenchmarkId::new("classify", count), &sources, |b, sources| {
            b.iter(|| {
                let mut sources = sources.clone();
                black_box(classifier.classify(&mut sources, can_play))
            });
        });
    }

    group.finish();
}

fn bench_classify_tagged(c: &mut Criterion) {
    let mut group = c.benchmark_group("Classify Tagged");

    for format in [ContainerFormat::Mp4, ContainerFormat::Webm] {
        let classifier = SourceClassifier::new(format.clone());
        let sources = create_tagged_sources(6);
        group.bench_with_input(
            BenchmarkId::new("prefer", format.to_string()),
            &sources,
            |b, sources| {
                b.iter(|| {
                    let mut sources = sources.clone();
                    black_box(classifier.classify(&mut sources, can_play))
                });
            },
        );
    }

    group.finish();
}

// ============================================================================
// Event handling
// ============================================================================

fn bench_event_stream(c: &mut Criterion) {
    let events = [
        RawMediaEvent::LoadedMetadata,
        RawMediaEvent::Waiting,
        RawMediaEvent::Playing,
        RawMediaEvent::Playing,
        RawMediaEvent::Waiting,
        RawMediaEvent::Playing,
        RawMediaEvent::Pause,
        RawMediaEvent::Ended,
    ];

    c.bench_function("handle_event_stream", |b| {
        b.iter(|| {
            let mut controller = PlaybackController::new(
                create_tagged_sources(3),
                PlayerOptions::default(),
                Localization::default(),
                Capabilities::default(),
                SimulatedMedia::new(),
                QualityStore::in_memory(),
            );
            for event in events {
                controller.handle_event(black_box(event));
            }
            controller.set_quality("720p");
            controller.handle_event(RawMediaEvent::LoadedMetadata);
            black_box(controller.get_current_time())
        });
    });
}

criterion_group!(
    benches,
    bench_classify_untagged,
    bench_classify_tagged,
    bench_event_stream,
);
criterion_main!(benches);
