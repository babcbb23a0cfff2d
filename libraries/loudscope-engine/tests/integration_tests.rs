//! Integration tests for loudscope-engine
//!
//! Tests include:
//! - Property-based tests with proptest
//! - Worker progress and cancellation
//! - Input validation and report serialization

use loudscope_engine::{
    analyze, momentary, AnalysisConfig, AnalysisEvent, AnalysisWorker, CancelFlag,
    LoudnessEngine, LoudnessError, SampleBuffer,
};
use proptest::prelude::*;
use std::time::Duration;

// ========== Helper Functions ==========

/// Generate a planar sine wave at specified amplitude and frequency
fn generate_sine(
    sample_rate: u32,
    frequency: f32,
    amplitude: f32,
    frames: usize,
) -> Vec<f32> {
    (0..frames)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Deterministic white noise in [-amplitude, amplitude]
fn generate_noise(seed: u64, amplitude: f32, frames: usize) -> Vec<f32> {
    let mut state = seed.wrapping_add(0x9E3779B97F4A7C15);
    (0..frames)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let random = ((state >> 33) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            random * amplitude
        })
        .collect()
}

fn with_silence(mut samples: Vec<f32>, seconds: f32, sample_rate: u32) -> Vec<f32> {
    let extra = (seconds * sample_rate as f32) as usize;
    samples.extend(std::iter::repeat(0.0).take(extra));
    samples
}

// ========== Property-Based Tests ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Block series length follows floor((N - W) / H), zero below one window
    #[test]
    fn series_cardinality(frames in 1usize..40_000) {
        let sample_rate = 8000;
        let buffer = SampleBuffer::new(vec![generate_noise(frames as u64, 0.3, frames)], sample_rate);
        let report = analyze(&buffer).unwrap();

        let config = AnalysisConfig::default();
        let window = config.window_samples(sample_rate);
        let hop = config.hop_samples(sample_rate);
        let expected = if frames <= window { 0 } else { (frames - window) / hop };

        prop_assert_eq!(momentary::block_count(frames, window, hop), expected);
        prop_assert_eq!(report.series.momentary.len(), expected);
        prop_assert_eq!(report.series.short_term.len(), expected);
        if expected == 0 {
            prop_assert!(report.result.is_silent());
            prop_assert_eq!(report.result.loudness_range_lu, 0.0);
        }
    }

    /// True peak never reads below the sample peak
    #[test]
    fn true_peak_at_least_sample_peak(
        frequency in 50.0_f32..3900.0,
        amplitude in 0.01_f32..1.0,
        seed in any::<u64>(),
    ) {
        let mut samples = generate_sine(8000, frequency, amplitude * 0.7, 8000);
        for (s, n) in samples.iter_mut().zip(generate_noise(seed, amplitude * 0.3, 8000)) {
            *s += n;
        }
        let report = analyze(&SampleBuffer::new(vec![samples], 8000)).unwrap();

        prop_assert!(report.result.true_peak_dbtp >= report.result.sample_peak_dbfs);
        prop_assert!(report.result.loudness_range_lu >= 0.0);
    }

    /// Momentary series never goes above its maximum, short-term max below momentary max
    #[test]
    fn maxima_are_consistent(seed in any::<u64>(), amplitude in 0.001_f32..1.0) {
        let samples = generate_noise(seed, amplitude, 8000 * 4);
        let report = analyze(&SampleBuffer::new(vec![samples], 8000)).unwrap();

        let momentary_max = report.result.momentary_max_lufs;
        prop_assert!(report.series.momentary.iter().all(|&v| v <= momentary_max));
        prop_assert!(report.result.short_term_max_lufs <= momentary_max + 1e-9);
        prop_assert!(report.result.integrated_lufs <= momentary_max + 1e-9);
    }

    /// Repeated runs over the same buffer are bit-identical
    #[test]
    fn analysis_is_idempotent(seed in any::<u64>(), channels in 1usize..=3) {
        let planar: Vec<Vec<f32>> = (0..channels)
            .map(|c| generate_noise(seed ^ c as u64, 0.5, 8000 * 2))
            .collect();
        let buffer = SampleBuffer::new(planar, 8000);
        let engine = LoudnessEngine::default();

        let first = engine.analyze_simple(&buffer).unwrap();
        let second = engine.analyze_simple(&buffer).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Trailing silence stops mattering once every block touching the
    /// program is already in the series
    #[test]
    fn trailing_silence_is_gated(seed in any::<u64>(), seconds in 1.0_f32..3.0) {
        let sample_rate = 8000;
        let program = generate_noise(seed, 0.4, (seconds * sample_rate as f32) as usize);

        let short_pad = with_silence(program.clone(), 1.0, sample_rate);
        let long_pad = with_silence(program, 4.0, sample_rate);

        let a = analyze(&SampleBuffer::new(vec![short_pad], sample_rate)).unwrap();
        let b = analyze(&SampleBuffer::new(vec![long_pad], sample_rate)).unwrap();

        prop_assert!((a.result.integrated_lufs - b.result.integrated_lufs).abs() < 1e-6);
        prop_assert!((a.result.true_peak_dbtp - b.result.true_peak_dbtp).abs() < 1e-9);
    }
}

// ========== Worker Tests ==========

#[test]
fn test_worker_progress_is_monotonic_and_ends_at_100() {
    let tone = generate_sine(44100, 440.0, 0.5, 44100 * 3);
    let buffer = SampleBuffer::new(vec![tone.clone(), tone], 44100);
    let config = AnalysisConfig {
        progress_chunk_frames: 2048,
        ..AnalysisConfig::default()
    };

    let mut handle = AnalysisWorker::spawn(buffer, config).unwrap();
    let mut progress = Vec::new();
    let mut report = None;

    while let Some(event) = handle.next_timeout(Duration::from_secs(60)) {
        match event {
            AnalysisEvent::Progress(p) => progress.push(p),
            AnalysisEvent::Completed(r) => report = Some(r),
            AnalysisEvent::Failed(err) => panic!("analysis failed: {}", err),
        }
    }

    assert!(report.is_some());
    assert_eq!(progress.first(), Some(&0));
    assert_eq!(progress.last(), Some(&100));
    assert!(progress.windows(2).all(|w| w[0] < w[1]), "{:?}", progress);
    assert!(progress.len() > 3, "expected intermediate progress: {:?}", progress);
}

#[test]
fn test_worker_matches_direct_analysis() {
    let samples = generate_noise(7, 0.25, 48000 * 2);
    let buffer = SampleBuffer::new(vec![samples], 48000);
    let direct = analyze(&buffer).unwrap();

    let handle = AnalysisWorker::spawn(buffer, AnalysisConfig::default()).unwrap();
    let threaded = handle.wait(|_| {}).unwrap();

    assert_eq!(direct, threaded);
}

#[test]
fn test_worker_cancellation() {
    let config = AnalysisConfig {
        progress_chunk_frames: 128,
        ..AnalysisConfig::default()
    };
    let samples = generate_noise(3, 0.5, 48000 * 10);
    let cancel = CancelFlag::new();
    cancel.cancel();
    let mut handle = AnalysisWorker::spawn_with_cancel(
        SampleBuffer::new(vec![samples], 48000),
        config,
        cancel,
    )
    .unwrap();

    let mut events = Vec::new();
    while let Some(event) = handle.next_timeout(Duration::from_secs(30)) {
        events.push(event);
    }

    let terminal: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
    assert_eq!(terminal.len(), 1);
    assert!(matches!(
        events.last(),
        Some(AnalysisEvent::Failed(LoudnessError::Cancelled))
    ));
    assert!(!events
        .iter()
        .any(|e| matches!(e, AnalysisEvent::Progress(100))));
}

#[test]
fn test_dropping_handle_does_not_block() {
    let samples = generate_noise(5, 0.5, 48000 * 30);
    let handle =
        AnalysisWorker::spawn(SampleBuffer::new(vec![samples], 48000), AnalysisConfig::default())
            .unwrap();
    drop(handle);
}

// ========== Input Validation ==========

#[test]
fn test_input_errors() {
    let cases: Vec<(SampleBuffer, fn(&LoudnessError) -> bool)> = vec![
        (SampleBuffer::new(vec![], 48000), |e| {
            matches!(e, LoudnessError::NoChannels)
        }),
        (SampleBuffer::new(vec![vec![]], 48000), |e| {
            matches!(e, LoudnessError::EmptyChannel { channel: 0 })
        }),
        (SampleBuffer::new(vec![vec![0.0; 10], vec![0.0; 9]], 48000), |e| {
            matches!(
                e,
                LoudnessError::ChannelLengthMismatch {
                    channel: 1,
                    expected: 10,
                    found: 9
                }
            )
        }),
        (SampleBuffer::new(vec![vec![0.0, f32::INFINITY]], 48000), |e| {
            matches!(e, LoudnessError::NonFiniteSample { channel: 0, index: 1 })
        }),
        (SampleBuffer::new(vec![vec![0.0; 10]], 1000), |e| {
            matches!(e, LoudnessError::InvalidSampleRate(1000))
        }),
        (SampleBuffer::new(vec![vec![0.0; 10]; 9], 48000), |e| {
            matches!(e, LoudnessError::InvalidChannelCount(9))
        }),
    ];

    for (buffer, expected) in cases {
        let err = analyze(&buffer).unwrap_err();
        assert!(expected(&err), "unexpected error: {:?}", err);
        assert!(err.is_input_error());
    }
}

#[test]
fn test_interleaved_length_must_be_whole_frames() {
    let result = SampleBuffer::from_interleaved(&[0.0; 7], 2, 48000);
    assert!(matches!(
        result,
        Err(LoudnessError::InterleavedLength {
            samples: 7,
            channels: 2
        })
    ));
}

// ========== Serialization ==========

#[test]
fn test_silent_report_serializes_sentinels_as_null() {
    let buffer = SampleBuffer::new(vec![vec![0.0; 8000 * 2]], 8000);
    let report = analyze(&buffer).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert!(json["result"]["integrated"].is_null());
    assert!(json["result"]["shortTermMax"].is_null());
    let floor = 20.0 * loudscope_engine::PEAK_EPSILON.log10();
    assert!((floor - loudscope_engine::PEAK_FLOOR_DB).abs() < 1e-9);
    assert!((json["result"]["truePeak"].as_f64().unwrap() - loudscope_engine::PEAK_FLOOR_DB).abs() < 1e-9);
    assert_eq!(json["result"]["sampleRate"].as_u64(), Some(8000));
    assert_eq!(json["result"]["lra"].as_f64(), Some(0.0));
    assert_eq!(json["result"]["duration"].as_f64(), Some(2.0));
    assert!((json["series"]["stepTime"].as_f64().unwrap() - 0.1).abs() < 1e-12);
    assert!(json["series"]["shortTerm"].is_array());
    assert!(json["series"]["momentary"]
        .as_array()
        .unwrap()
        .iter()
        .all(|v| v.is_null()));

    let back: loudscope_engine::LoudnessReport = serde_json::from_value(json).unwrap();
    assert_eq!(back, report);
}
