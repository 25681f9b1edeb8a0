use std::time::Duration;

use image_carousel::Carousel;
use image_carousel::config::CarouselTiming;
use image_carousel::events::{ChangeCause, HoverRegion, SlideChange};
use image_carousel::presentation::testkit::RecordingSurface;
use tokio::time::Instant;

const DELAY: Duration = Duration::from_millis(900);
const INTERVAL: Duration = Duration::from_millis(6000);

fn manual(n: usize, t0: Instant) -> Carousel<RecordingSurface> {
    let timing = CarouselTiming {
        autoplay: false,
        ..CarouselTiming::default()
    };
    Carousel::initialize(RecordingSurface::new(n), timing, t0).expect("non-empty carousel")
}

fn autoplaying(n: usize, t0: Instant) -> Carousel<RecordingSurface> {
    Carousel::initialize(RecordingSurface::new(n), CarouselTiming::default(), t0)
        .expect("non-empty carousel")
}

fn assert_single_indicator(c: &Carousel<RecordingSurface>) {
    assert_eq!(c.surface().active_indicators(), vec![c.index()]);
    assert_eq!(c.surface().visible_slides(), vec![c.index()]);
}

#[test]
fn unlocked_steps_follow_modular_arithmetic() {
    for n in 1..=5usize {
        let t0 = Instant::now();
        let mut c = manual(n, t0);
        let mut now = t0;
        // forward, forward, back, forward, back, back, back
        let steps = [true, true, false, true, false, false, false];
        for forward in steps {
            let before = c.index();
            let change = if forward {
                c.request_next(now)
            } else {
                c.request_previous(now)
            }
            .expect("unlocked request accepted");
            let expected = if forward {
                (before + 1) % n
            } else {
                (before + n - 1) % n
            };
            assert_eq!(change.from, before);
            assert_eq!(change.to, expected, "n={n}");
            assert_eq!(c.index(), expected);
            assert_single_indicator(&c);
            now += DELAY;
            c.on_tick(now);
            assert!(!c.is_transitioning());
        }
    }
}

#[test]
fn wraparound_at_both_ends() {
    let t0 = Instant::now();
    let mut c = manual(3, t0);
    c.request_jump(2, t0).unwrap();
    c.on_tick(t0 + DELAY);
    assert_eq!(
        c.request_next(t0 + DELAY),
        Some(SlideChange {
            from: 2,
            to: 0,
            cause: ChangeCause::Next
        })
    );
    c.on_tick(t0 + DELAY * 2);
    assert_eq!(c.request_previous(t0 + DELAY * 2).map(|ch| ch.to), Some(2));
}

#[test]
fn jump_to_current_index_is_a_no_op() {
    let t0 = Instant::now();
    let mut c = manual(4, t0);
    let mut surface_before = c.surface().calls().len();
    assert!(c.request_jump(0, t0).is_none());
    assert!(!c.is_transitioning());
    assert_eq!(c.surface().calls().len(), surface_before);

    c.request_jump(3, t0).unwrap();
    c.on_tick(t0 + DELAY);
    surface_before = c.surface().calls().len();
    assert!(c.request_jump(3, t0 + DELAY).is_none());
    assert!(!c.is_transitioning());
    assert_eq!(c.surface().calls().len(), surface_before);
}

#[test]
fn requests_are_rejected_while_locked() {
    let t0 = Instant::now();
    let mut c = manual(5, t0);
    c.request_next(t0).unwrap();
    assert_eq!(c.index(), 1);
    let calls = c.surface().calls().len();

    let during = t0 + Duration::from_millis(450);
    assert!(c.request_next(during).is_none());
    assert!(c.request_previous(during).is_none());
    assert!(c.request_jump(4, during).is_none());
    c.on_tick(t0 + DELAY - Duration::from_millis(1));
    assert!(c.request_next(t0 + DELAY - Duration::from_millis(1)).is_none());

    assert_eq!(c.index(), 1);
    assert_eq!(c.surface().calls().len(), calls);
    assert!(c.is_transitioning());
}

#[test]
fn lock_releases_after_exactly_the_transition_delay() {
    let t0 = Instant::now();
    let mut c = manual(3, t0);
    c.request_previous(t0).unwrap();
    assert_eq!(c.next_deadline(), Some(t0 + DELAY));
    c.on_tick(t0 + DELAY);
    assert!(!c.is_transitioning());
    assert_eq!(c.request_jump(0, t0 + DELAY).map(|ch| ch.cause), Some(ChangeCause::Jump));
}

#[test]
fn autoplay_advances_once_per_interval() {
    let t0 = Instant::now();
    let mut c = autoplaying(4, t0);
    assert!(c.on_tick(t0 + INTERVAL - Duration::from_millis(1)).is_empty());
    let changes: Vec<SlideChange> = (1..=3).flat_map(|k| c.on_tick(t0 + INTERVAL * k)).collect();
    assert_eq!(
        changes.iter().map(|ch| ch.to).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(changes.iter().all(|ch| ch.cause == ChangeCause::Autoplay));
    assert_eq!(c.index(), 3);
    assert_single_indicator(&c);
}

#[test]
fn autoplay_wraps_around() {
    let t0 = Instant::now();
    let mut c = autoplaying(2, t0);
    c.on_tick(t0 + INTERVAL);
    c.on_tick(t0 + INTERVAL * 2);
    assert_eq!(c.index(), 0);
}

#[test]
fn stalled_driver_advances_a_single_slide() {
    let t0 = Instant::now();
    let mut c = autoplaying(4, t0);
    let late = t0 + INTERVAL * 10 + Duration::from_millis(250);
    let changes = c.on_tick(late);
    assert_eq!(
        changes,
        vec![SlideChange {
            from: 0,
            to: 1,
            cause: ChangeCause::Autoplay
        }]
    );
    assert_single_indicator(&c);
    // The cadence resumes on its original grid and the unlock counts from
    // when the change actually happened.
    assert_eq!(c.next_deadline(), Some(late + DELAY));
    c.on_tick(late + DELAY);
    assert!(!c.is_transitioning());
    assert_eq!(c.next_deadline(), Some(t0 + INTERVAL * 11));
    assert_eq!(c.on_tick(t0 + INTERVAL * 11).len(), 1);
    assert_eq!(c.index(), 2);
}

#[test]
fn hovering_suppresses_ticks_until_leave() {
    for region in HoverRegion::ALL {
        let t0 = Instant::now();
        let mut c = autoplaying(3, t0);
        let enter_at = t0 + Duration::from_millis(1000);
        c.on_tick(enter_at);
        c.on_pointer_enter(region);
        assert!(!c.is_autoplaying());

        let leave_at = t0 + INTERVAL * 4;
        assert!(c.on_tick(leave_at).is_empty(), "{region} hover leaked a tick");
        assert_eq!(c.index(), 0);

        c.on_pointer_leave(region, leave_at);
        assert!(c.is_autoplaying());
        assert!(c.on_tick(leave_at + INTERVAL - Duration::from_millis(1)).is_empty());
        assert_eq!(c.on_tick(leave_at + INTERVAL).len(), 1);
        assert_eq!(c.index(), 1);
    }
}

#[test]
fn leaving_one_region_resumes_autoplay_while_another_is_hovered() {
    let t0 = Instant::now();
    let mut c = autoplaying(3, t0);
    c.on_pointer_enter(HoverRegion::Viewport);
    c.on_pointer_enter(HoverRegion::NextButton);
    c.on_pointer_leave(HoverRegion::NextButton, t0);
    // Pointer is still over the viewport, yet the timer is back.
    assert!(c.is_autoplaying());
    assert_eq!(c.on_tick(t0 + INTERVAL).len(), 1);

    // A second leave must not stack another timer.
    c.on_pointer_leave(HoverRegion::Viewport, t0 + INTERVAL);
    assert_eq!(c.on_tick(t0 + INTERVAL * 2).len(), 1);
}

#[test]
fn autoplay_tick_ignores_manual_lock() {
    let t0 = Instant::now();
    let mut c = autoplaying(4, t0);
    let click = t0 + INTERVAL - Duration::from_millis(500);
    c.on_tick(click);
    c.request_next(click).unwrap();
    assert!(c.is_transitioning());

    // The tick lands mid-transition and still advances.
    let changes = c.on_tick(t0 + INTERVAL);
    assert_eq!(
        changes,
        vec![SlideChange {
            from: 1,
            to: 2,
            cause: ChangeCause::Autoplay
        }]
    );
    assert!(c.is_transitioning());

    // The manual change's unlock fires first and clears the lock even though
    // the autoplay change started after it.
    c.on_tick(click + DELAY);
    assert!(!c.is_transitioning());
    assert!(c.request_next(click + DELAY).is_some());
    assert_eq!(c.index(), 3);
}

#[test]
fn exactly_one_indicator_tracks_the_index_through_mixed_traffic() {
    let t0 = Instant::now();
    let mut c = autoplaying(5, t0);
    let mut now = t0;
    let step = Duration::from_millis(700);
    for i in 0..40u64 {
        now += step;
        c.on_tick(now);
        match i % 5 {
            0 => {
                c.request_next(now);
            }
            1 => {
                c.request_jump((i as usize * 3) % 5, now);
            }
            2 => c.on_pointer_enter(HoverRegion::IndicatorStrip),
            3 => {
                c.request_previous(now);
            }
            _ => c.on_pointer_leave(HoverRegion::IndicatorStrip, now),
        }
        assert_single_indicator(&c);
    }
}
