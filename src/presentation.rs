use tracing::{debug, info};

/// Visual layer driven by the carousel controller.
///
/// Slides and indicators are owned by the surface; the controller only ever
/// refers to them by position. Both collections have `slide_count()` entries.
pub trait PresentationSurface {
    fn slide_count(&self) -> usize;
    fn show_slide(&mut self, index: usize);
    fn hide_slide(&mut self, index: usize);
    fn activate_indicator(&mut self, index: usize);
    fn deactivate_indicator(&mut self, index: usize);

    /// Cosmetic flag shown while the active slide's transition runs.
    fn set_transition_marker(&mut self, _index: usize, _active: bool) {}
}

/// Renders the carousel as a one-line strip through `tracing`.
#[derive(Debug, Clone)]
pub struct TerminalSurface {
    labels: Vec<String>,
    visible: Vec<bool>,
    indicators: Vec<bool>,
    marker: Option<usize>,
}

impl TerminalSurface {
    pub fn new(labels: Vec<String>) -> Self {
        let n = labels.len();
        Self {
            labels,
            visible: vec![false; n],
            indicators: vec![false; n],
            marker: None,
        }
    }

    /// `[ ]` for idle indicators, `[*]` for the active one.
    pub fn strip(&self) -> String {
        self.indicators
            .iter()
            .map(|active| if *active { "[*]" } else { "[ ]" })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn visible_label(&self) -> Option<&str> {
        self.visible
            .iter()
            .position(|shown| *shown)
            .and_then(|idx| self.labels.get(idx))
            .map(String::as_str)
    }

    pub fn marked_slide(&self) -> Option<usize> {
        self.marker
    }
}

impl PresentationSurface for TerminalSurface {
    fn slide_count(&self) -> usize {
        self.labels.len()
    }

    fn show_slide(&mut self, index: usize) {
        if let Some(slot) = self.visible.get_mut(index) {
            *slot = true;
        }
    }

    fn hide_slide(&mut self, index: usize) {
        if let Some(slot) = self.visible.get_mut(index) {
            *slot = false;
        }
    }

    fn activate_indicator(&mut self, index: usize) {
        if let Some(slot) = self.indicators.get_mut(index) {
            *slot = true;
        }
        info!(
            index,
            slide = self.visible_label().unwrap_or("-"),
            strip = %self.strip(),
            "showing slide"
        );
    }

    fn deactivate_indicator(&mut self, index: usize) {
        if let Some(slot) = self.indicators.get_mut(index) {
            *slot = false;
        }
    }

    fn set_transition_marker(&mut self, index: usize, active: bool) {
        self.marker = active.then_some(index);
        debug!(index, active, "transition marker");
    }
}

pub mod testkit {
    //! In-memory surface that records every call for assertions.

    use super::PresentationSurface;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum SurfaceCall {
        Show(usize),
        Hide(usize),
        Activate(usize),
        Deactivate(usize),
        Marker(usize, bool),
    }

    #[derive(Debug, Clone)]
    pub struct RecordingSurface {
        visible: Vec<bool>,
        indicators: Vec<bool>,
        markers: Vec<bool>,
        calls: Vec<SurfaceCall>,
    }

    impl RecordingSurface {
        pub fn new(slide_count: usize) -> Self {
            Self {
                visible: vec![false; slide_count],
                indicators: vec![false; slide_count],
                markers: vec![false; slide_count],
                calls: Vec::new(),
            }
        }

        pub fn visible_slides(&self) -> Vec<usize> {
            Self::set_positions(&self.visible)
        }

        pub fn active_indicators(&self) -> Vec<usize> {
            Self::set_positions(&self.indicators)
        }

        pub fn marked_slides(&self) -> Vec<usize> {
            Self::set_positions(&self.markers)
        }

        pub fn calls(&self) -> &[SurfaceCall] {
            &self.calls
        }

        pub fn take_calls(&mut self) -> Vec<SurfaceCall> {
            std::mem::take(&mut self.calls)
        }

        fn set_positions(flags: &[bool]) -> Vec<usize> {
            flags
                .iter()
                .enumerate()
                .filter_map(|(idx, set)| set.then_some(idx))
                .collect()
        }
    }

    impl PresentationSurface for RecordingSurface {
        fn slide_count(&self) -> usize {
            self.visible.len()
        }

        fn show_slide(&mut self, index: usize) {
            self.visible[index] = true;
            self.calls.push(SurfaceCall::Show(index));
        }

        fn hide_slide(&mut self, index: usize) {
            self.visible[index] = false;
            self.calls.push(SurfaceCall::Hide(index));
        }

        fn activate_indicator(&mut self, index: usize) {
            self.indicators[index] = true;
            self.calls.push(SurfaceCall::Activate(index));
        }

        fn deactivate_indicator(&mut self, index: usize) {
            self.indicators[index] = false;
            self.calls.push(SurfaceCall::Deactivate(index));
        }

        fn set_transition_marker(&mut self, index: usize, active: bool) {
            self.markers[index] = active;
            self.calls.push(SurfaceCall::Marker(index, active));
        }
    }
}
