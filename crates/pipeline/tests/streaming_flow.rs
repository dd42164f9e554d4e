//! End-to-end pipeline flow: token-by-token append through synthesis

use std::sync::Arc;

use tokio::sync::mpsc;

use voxstream_pipeline::{
    SegmenterConfig, SilenceTts, SpeechStream, TtsStreamEvent,
};

async fn collect(rx: &mut mpsc::Receiver<TtsStreamEvent>) -> Vec<TtsStreamEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn token_stream_is_spoken_in_order() {
    let (tx, mut rx) = mpsc::channel(256);
    let mut stream = SpeechStream::new(
        SegmenterConfig::default(),
        Arc::new(SilenceTts::new(16000)),
        tx,
    );

    // Tokens as a language model would emit them
    for token in ["Hello", " world", "!", " Stay", " warm", " pal"] {
        stream.append(token).await;
    }
    stream.flush().await;

    let events = collect(&mut rx).await;

    let mut chunk_texts = Vec::new();
    let mut audio_bytes = 0usize;
    let mut saw_flush = false;
    for event in &events {
        match event {
            TtsStreamEvent::Audio(segment) => audio_bytes += segment.data.len(),
            TtsStreamEvent::ChunkComplete { text, .. } => chunk_texts.push(text.clone()),
            TtsStreamEvent::FlushComplete { text, segments } => {
                saw_flush = true;
                chunk_texts.push(text.clone());
                assert!(*segments > 0);
            }
            TtsStreamEvent::SynthesisError { message, .. } => {
                panic!("unexpected synthesis error: {}", message)
            }
        }
    }

    assert!(saw_flush);
    assert!(audio_bytes > 0);

    // Every character reaches synthesis exactly once, in order
    let squash = |s: &str| s.split_whitespace().collect::<String>();
    assert_eq!(
        squash(&chunk_texts.concat()),
        squash("Hello world! Stay warm pal")
    );
}

#[tokio::test]
async fn audio_precedes_its_completion_notice() {
    let (tx, mut rx) = mpsc::channel(256);
    let mut stream = SpeechStream::new(
        SegmenterConfig::default(),
        Arc::new(SilenceTts::new(16000)),
        tx,
    );

    stream.append("Short answer.").await;

    let events = collect(&mut rx).await;
    let completion_at = events
        .iter()
        .position(|e| matches!(e, TtsStreamEvent::ChunkComplete { .. }))
        .expect("chunk completion missing");

    assert!(completion_at > 0);
    assert!(events[..completion_at]
        .iter()
        .all(|e| matches!(e, TtsStreamEvent::Audio(_))));
}
