pub const SCROLL_TO_TOP_THRESHOLD: f64 = 200.0;

/// Page geometry sampled on a single scroll or resize event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollState {
    scroll_top: f64,
    document_height: f64,
    viewport_height: f64,
}

impl ScrollState {
    pub fn new(scroll_top: f64, document_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_top: finite_or_zero(scroll_top).max(0.0),
            document_height: finite_or_zero(document_height),
            viewport_height: finite_or_zero(viewport_height),
        }
    }

    pub fn show_scroll_to_top(&self) -> bool {
        self.scroll_top > SCROLL_TO_TOP_THRESHOLD
    }

    pub fn nav_has_shadow(&self) -> bool {
        self.scroll_top > 0.0
    }

    /// Content no taller than the viewport reports `0`.
    pub fn progress_percent(&self) -> f64 {
        let scrollable = self.document_height - self.viewport_height;
        if scrollable <= 0.0 {
            return 0.0;
        }

        let percent = self.scroll_top / scrollable * 100.0;
        if percent.is_finite() {
            percent.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    pub fn progress_gradient(&self, fill: &str) -> String {
        let percent = self.progress_percent();
        format!("conic-gradient({fill} {percent:.2}%, transparent {percent:.2}% 100%)")
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_to_top_appears_only_past_threshold() {
        for top in [0.0, 1.0, 150.0, 199.9, 200.0] {
            assert!(!ScrollState::new(top, 3000.0, 800.0).show_scroll_to_top(), "top={top}");
        }
        for top in [200.1, 201.0, 500.0, 2200.0] {
            assert!(ScrollState::new(top, 3000.0, 800.0).show_scroll_to_top(), "top={top}");
        }
    }

    #[test]
    fn progress_matches_mid_page_sample() {
        let state = ScrollState::new(500.0, 2000.0, 800.0);

        assert!(state.show_scroll_to_top());
        assert!((state.progress_percent() - 41.666_666).abs() < 0.001);
    }

    #[test]
    fn progress_is_zero_when_content_fits_viewport() {
        assert_eq!(ScrollState::new(0.0, 800.0, 800.0).progress_percent(), 0.0);
        assert_eq!(ScrollState::new(40.0, 800.0, 800.0).progress_percent(), 0.0);
        assert_eq!(ScrollState::new(10.0, 600.0, 800.0).progress_percent(), 0.0);
    }

    #[test]
    fn progress_is_monotone_and_bounded() {
        let mut previous = 0.0;
        let mut top = 0.0;

        while top <= 1600.0 {
            let percent = ScrollState::new(top, 2000.0, 800.0).progress_percent();
            assert!((0.0..=100.0).contains(&percent), "top={top} percent={percent}");
            assert!(percent >= previous, "top={top}");
            previous = percent;
            top += 25.0;
        }

        assert_eq!(previous, 100.0);
    }

    #[test]
    fn overscroll_and_garbage_geometry_are_neutralised() {
        let bounced = ScrollState::new(-40.0, 2000.0, 800.0);
        assert_eq!(bounced, ScrollState::new(0.0, 2000.0, 800.0));
        assert!(!bounced.nav_has_shadow());
        assert_eq!(bounced.progress_percent(), 0.0);

        let garbage = ScrollState::new(f64::NAN, f64::INFINITY, 800.0);
        assert_eq!(garbage.progress_percent(), 0.0);
    }

    #[test]
    fn navbar_shadow_follows_any_scroll() {
        assert!(!ScrollState::new(0.0, 2000.0, 800.0).nav_has_shadow());
        assert!(ScrollState::new(1.0, 2000.0, 800.0).nav_has_shadow());
    }

    #[test]
    fn gradient_uses_guarded_percent() {
        let state = ScrollState::new(300.0, 1000.0, 1000.0);

        assert_eq!(
            state.progress_gradient("#4F46E5"),
            "conic-gradient(#4F46E5 0.00%, transparent 0.00% 100%)"
        );
    }
}
