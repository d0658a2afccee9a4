//! Property-based tests for timecode conversion.
//!
//! Uses proptest to verify round-trip and ordering behavior of
//! `timecode_to_frames` / `frames_to_timecode` across frame rates.

use proptest::prelude::*;
use vfxpull_timecode::{frames_to_timecode, timecode_to_frames, FrameRate, Timecode};

fn integer_rate() -> impl Strategy<Value = FrameRate> {
    prop_oneof![
        Just(FrameRate::FPS_24),
        Just(FrameRate::FPS_25),
        Just(FrameRate::FPS_30),
        Just(FrameRate::FPS_48),
        Just(FrameRate::FPS_50),
        Just(FrameRate::FPS_60),
    ]
}

fn fractional_rate() -> impl Strategy<Value = FrameRate> {
    prop_oneof![
        Just(FrameRate::FPS_23_976),
        Just(FrameRate::FPS_29_97),
        Just(FrameRate::FPS_59_94),
    ]
}

/// A well-formed timecode whose frame digits fit the display rate.
fn timecode_for(rate: FrameRate) -> impl Strategy<Value = Timecode> {
    let display = rate.display_fps() as u32;
    (0u32..100, 0u32..60, 0u32..60, 0..display)
        .prop_map(|(h, m, s, f)| Timecode::new(h, m, s, f))
}

// =============================================================================
// Round-trip
// =============================================================================

proptest! {
    /// Text -> frames -> text reproduces the timecode at integer rates.
    #[test]
    fn roundtrip_text_integer_rate(
        (rate, tc) in integer_rate().prop_flat_map(|r| (Just(r), timecode_for(r)))
    ) {
        let text = tc.to_string();
        let frames = timecode_to_frames(&text, rate).unwrap();
        prop_assert_eq!(frames_to_timecode(frames as f64, rate.as_f64()), text);
    }

    /// Frames -> timecode -> frames is the identity at integer rates.
    #[test]
    fn roundtrip_frames_integer_rate(rate in integer_rate(), frames in 0u64..10_000_000) {
        let tc = Timecode::from_frames(frames, rate);
        prop_assert_eq!(tc.to_frames(rate), frames);
    }
}

// =============================================================================
// Ordering
// =============================================================================

proptest! {
    /// Timecode order maps to strictly increasing frame counts at integer rates.
    #[test]
    fn strictly_monotonic_integer_rate(
        (rate, a, b) in integer_rate().prop_flat_map(|r| (Just(r), timecode_for(r), timecode_for(r)))
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assume!(lo != hi);
        prop_assert!(lo.to_frames(rate) < hi.to_frames(rate));
    }

    /// Fractional rates never reorder timecodes.
    #[test]
    fn non_decreasing_fractional_rate(
        (rate, a, b) in fractional_rate().prop_flat_map(|r| (Just(r), timecode_for(r), timecode_for(r)))
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(lo.to_frames(rate) <= hi.to_frames(rate));
    }
}

// =============================================================================
// Display invariants
// =============================================================================

proptest! {
    /// Frame digits always stay below the display rate, for any positive rate.
    #[test]
    fn frame_digits_below_display_rate(frames in 0u64..50_000_000, fps in 1.0f64..120.0) {
        let rate = FrameRate::new(fps).unwrap();
        let tc = Timecode::from_frames(frames, rate);
        prop_assert!((tc.frames as u64) < rate.display_fps());
        prop_assert!(tc.minutes < 60);
        prop_assert!(tc.seconds < 60);
    }

    /// `frames_to_timecode` always yields four colon-separated fields.
    #[test]
    fn frames_to_timecode_is_total(frames in any::<f64>(), fps in any::<f64>()) {
        let text = frames_to_timecode(frames, fps);
        prop_assert_eq!(text.split(':').count(), 4);
    }
}
