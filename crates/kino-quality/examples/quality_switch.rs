//! Quality switch example
//!
//! Classifies a source list, starts playback on a simulated element and
//! switches quality mid-stream.
//!
//! Run with: cargo run -p kino-quality --example quality_switch

use kino_quality::{
    Capabilities, Localization, MediaErrorCode, PlaybackController, PlayerOptions, QualityStore,
    QualityTag, RawMediaEvent, SimulatedMedia, SourceDescriptor,
};

fn main() {
    println!("Kino Quality - Quality Switch Example");
    println!("==========================================\n");

    let sources = vec![
        SourceDescriptor::new("https://cdn.example.com/clip-360.webm")
            .with_mime("video/webm")
            .with_quality(QualityTag::new("360p", "Low")),
        SourceDescriptor::new("https://cdn.example.com/clip-360.mp4")
            .with_mime("video/mp4")
            .with_quality(QualityTag::new("360p", "Low")),
        SourceDescriptor::new("https://cdn.example.com/clip-720.mp4")
            .with_mime("video/mp4")
            .with_quality(QualityTag::new("720p", "HD")),
    ];

    let mut player = PlaybackController::new(
        sources,
        PlayerOptions {
            start_at: Some(5.0),
            ..Default::default()
        },
        Localization::default(),
        Capabilities::default(),
        SimulatedMedia::new(),
        QualityStore::in_memory(),
    );
    let mut events = player.subscribe();

    println!("Qualities offered:");
    for option in player.get_qualities().unwrap_or_default() {
        println!("  {} - {}", option.name, option.label);
    }
    println!("Starting on: {:?}\n", player.get_quality());

    player.append_to("#player");
    player.handle_event(RawMediaEvent::LoadedMetadata);
    if let Err(e) = player.play() {
        println!("Play refused: {}", e);
    }
    player.handle_event(RawMediaEvent::Playing);

    player.media_mut().current_time = 37.0;
    player.set_quality("720p");
    player.media_mut().current_time = 0.0;
    player.handle_event(RawMediaEvent::LoadedMetadata);
    println!(
        "After switch: quality {:?}, position {:.1}s",
        player.get_quality(),
        player.get_current_time()
    );

    player.handle_event(RawMediaEvent::Error(Some(MediaErrorCode::Network)));
    println!("After error: state {}, play allowed: {}", player.state(), player.play().is_ok());

    println!("\nEmitted events:");
    while let Ok(event) = events.try_recv() {
        println!("  {:?}", event);
    }
}
