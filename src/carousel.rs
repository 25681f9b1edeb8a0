//! Carousel controller: one index, one navigation lock, one autoplay timer.
//!
//! All operations are synchronous and take the current instant; deferred work
//! (lock release, autoplay ticks) lives in an internal [`TimerQueue`] and runs
//! when the driver calls [`Carousel::on_tick`]. Requests that arrive while a
//! slide change is in flight are dropped, never queued.

use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::CarouselTiming;
use crate::error::Error;
use crate::events::{CarouselCommand, ChangeCause, HoverRegion, SlideChange};
use crate::presentation::PresentationSurface;
use crate::timer::{TimerId, TimerQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    Unlock,
    AutoAdvance,
}

pub struct Carousel<S> {
    surface: S,
    slide_count: usize,
    index: usize,
    transitioning: bool,
    autoplay: Option<TimerId>,
    timers: TimerQueue<Deferred>,
    timing: CarouselTiming,
}

impl<S: PresentationSurface> Carousel<S> {
    /// Show the first slide, light its indicator and, unless disabled in
    /// `timing`, start autoplay.
    pub fn initialize(surface: S, timing: CarouselTiming, now: Instant) -> Result<Self, Error> {
        let slide_count = surface.slide_count();
        if slide_count == 0 {
            return Err(Error::NoSlides);
        }
        let mut carousel = Self {
            surface,
            slide_count,
            index: 0,
            transitioning: false,
            autoplay: None,
            timers: TimerQueue::new(),
            timing,
        };
        carousel.surface.show_slide(0);
        carousel.surface.activate_indicator(0);
        if carousel.timing.autoplay {
            carousel.start_autoplay(now);
        }
        info!(
            slides = slide_count,
            autoplay = carousel.timing.autoplay,
            "carousel initialized"
        );
        Ok(carousel)
    }

    pub fn request_next(&mut self, now: Instant) -> Option<SlideChange> {
        if self.transitioning {
            trace!("next request dropped while transitioning");
            return None;
        }
        let to = (self.index + 1) % self.slide_count;
        Some(self.begin_change(to, ChangeCause::Next, now))
    }

    pub fn request_previous(&mut self, now: Instant) -> Option<SlideChange> {
        if self.transitioning {
            trace!("previous request dropped while transitioning");
            return None;
        }
        let to = (self.index + self.slide_count - 1) % self.slide_count;
        Some(self.begin_change(to, ChangeCause::Previous, now))
    }

    /// Jump straight to `target`. Jumping to the current slide is a no-op and
    /// does not engage the lock.
    pub fn request_jump(&mut self, target: usize, now: Instant) -> Option<SlideChange> {
        if self.transitioning || target == self.index {
            trace!(target, "jump request dropped");
            return None;
        }
        if target >= self.slide_count {
            warn!(
                target,
                slides = self.slide_count,
                "ignoring jump to nonexistent slide"
            );
            return None;
        }
        Some(self.begin_change(target, ChangeCause::Jump, now))
    }

    /// Ensure exactly one recurring autoplay timer exists. Returns false when
    /// one was already running; its cadence is left untouched.
    pub fn start_autoplay(&mut self, now: Instant) -> bool {
        if let Some(id) = self.autoplay {
            if self.timers.is_pending(id) {
                return false;
            }
        }
        let id = self.timers.schedule_repeating(
            now,
            self.timing.autoplay_interval,
            Deferred::AutoAdvance,
        );
        self.autoplay = Some(id);
        debug!(interval = ?self.timing.autoplay_interval, "autoplay started");
        true
    }

    /// Cancel the autoplay timer. Pending lock releases are not affected.
    pub fn stop_autoplay(&mut self) -> bool {
        match self.autoplay.take() {
            Some(id) => {
                let cancelled = self.timers.cancel(id);
                debug!("autoplay stopped");
                cancelled
            }
            None => false,
        }
    }

    pub fn on_pointer_enter(&mut self, region: HoverRegion) {
        debug!(%region, "pointer entered");
        self.stop_autoplay();
    }

    /// Leaving any region restarts autoplay, even if another hover region is
    /// still under the pointer.
    pub fn on_pointer_leave(&mut self, region: HoverRegion, now: Instant) {
        debug!(%region, "pointer left");
        self.start_autoplay(now);
    }

    pub fn on_transition_start(&mut self, index: usize, property: &str) {
        if self.is_marker_signal(index, property) {
            self.surface.set_transition_marker(index, true);
        }
    }

    pub fn on_transition_end(&mut self, index: usize, property: &str) {
        if self.is_marker_signal(index, property) {
            self.surface.set_transition_marker(index, false);
        }
    }

    /// Dispatch one inbound command. Returns the slide change it caused, if any.
    pub fn handle(&mut self, command: CarouselCommand, now: Instant) -> Option<SlideChange> {
        match command {
            CarouselCommand::Next => self.request_next(now),
            CarouselCommand::Previous => self.request_previous(now),
            CarouselCommand::Jump(target) => self.request_jump(target, now),
            CarouselCommand::PointerEnter(region) => {
                self.on_pointer_enter(region);
                None
            }
            CarouselCommand::PointerLeave(region) => {
                self.on_pointer_leave(region, now);
                None
            }
            CarouselCommand::TransitionStarted { index, property } => {
                self.on_transition_start(index, &property);
                None
            }
            CarouselCommand::TransitionEnded { index, property } => {
                self.on_transition_end(index, &property);
                None
            }
        }
    }

    /// Run every deferred task due at or before `now`, in deadline order.
    /// Returns the slide changes autoplay produced along the way. A driver
    /// that stalled across several autoplay intervals gets a single advance.
    pub fn on_tick(&mut self, now: Instant) -> Vec<SlideChange> {
        let mut changes = Vec::new();
        while let Some((_, due, task)) = self.timers.pop_due(now) {
            match task {
                Deferred::Unlock => {
                    self.transitioning = false;
                    trace!(index = self.index, "navigation unlocked");
                }
                Deferred::AutoAdvance => {
                    if now > due {
                        debug!(late = ?now.duration_since(due), "autoplay tick ran late");
                    }
                    changes.push(self.auto_advance(now));
                }
            }
        }
        changes
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn is_autoplaying(&self) -> bool {
        self.autoplay.is_some_and(|id| self.timers.is_pending(id))
    }

    pub fn timing(&self) -> &CarouselTiming {
        &self.timing
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    // Autoplay does not consult the lock: a tick landing inside a manual
    // transition still advances, and the earlier unlock may clear the lock
    // before this change's own delay has run out.
    fn auto_advance(&mut self, now: Instant) -> SlideChange {
        if self.transitioning {
            debug!(index = self.index, "autoplay tick interrupting transition");
        }
        let to = (self.index + 1) % self.slide_count;
        self.begin_change(to, ChangeCause::Autoplay, now)
    }

    fn begin_change(&mut self, to: usize, cause: ChangeCause, now: Instant) -> SlideChange {
        self.transitioning = true;
        let from = self.index;
        self.index = to;
        self.apply_slide_change(now);
        debug!(from, to, ?cause, "slide change");
        SlideChange { from, to, cause }
    }

    fn apply_slide_change(&mut self, now: Instant) {
        for idx in 0..self.slide_count {
            self.surface.hide_slide(idx);
        }
        self.surface.show_slide(self.index);
        for idx in 0..self.slide_count {
            self.surface.deactivate_indicator(idx);
        }
        self.surface.activate_indicator(self.index);
        self.timers
            .schedule_once(now, self.timing.transition_delay, Deferred::Unlock);
    }

    fn is_marker_signal(&self, index: usize, property: &str) -> bool {
        index == self.index && property == self.timing.marker_property
    }
}
