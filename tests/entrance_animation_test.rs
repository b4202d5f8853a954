use std::time::Duration;

use cgmath::Rad;
use vitrine::animation::{ENTRANCE_SECONDS, ENTRANCE_TURNS, EntranceSpin};

const EPS: f32 = 1e-4;

#[test]
fn starts_at_two_full_turns() {
    let spin = EntranceSpin::new();
    let expected = ENTRANCE_TURNS * std::f32::consts::TAU;
    assert!((spin.offset().0 - expected).abs() < EPS);
}

#[test]
fn decreases_monotonically_without_overshoot() {
    let mut spin = EntranceSpin::new();
    let step = Duration::from_millis(40);
    let mut previous = spin.offset().0;

    // 125 * 40ms covers the full 4s plus one extra frame
    for _ in 0..126 {
        let Rad(offset) = spin.advance(step);
        assert!(
            offset <= previous + EPS,
            "offset increased from {previous} to {offset}"
        );
        assert!(offset >= -EPS, "offset overshot below rest: {offset}");
        previous = offset;
    }

    assert!(spin.is_finished());
    assert_eq!(spin.offset(), Rad(0.0));
}

#[test]
fn reaches_rest_exactly_at_the_duration() {
    let mut spin = EntranceSpin::new();
    let offset = spin.advance(Duration::from_secs_f32(ENTRANCE_SECONDS));
    assert_eq!(offset, Rad(0.0));
    assert!(spin.is_finished());
}

#[test]
fn custom_spins_sample_their_own_range() {
    let mut spin = EntranceSpin::with(Rad(1.0), Duration::from_secs(2));
    assert!((spin.offset().0 - 1.0).abs() < EPS);

    // halfway through a quadratic ease-out, 75% of the motion is done
    let Rad(offset) = spin.advance(Duration::from_secs(1));
    assert!((offset - 0.25).abs() < EPS);
}
