/// Minimum horizontal travel for a fling, in pointer units.
pub const FLING_MIN_DISTANCE: f64 = 50.0;
/// Minimum horizontal speed for a fling, in pointer units per second.
pub const FLING_MIN_VELOCITY: f64 = 50.0;

/// Which of the two stacked panels is visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewState {
    Loading,
    #[default]
    Origin,
}

impl ViewState {
    pub const fn loading_visible(self) -> bool {
        matches!(self, Self::Loading)
    }

    pub const fn origin_visible(self) -> bool {
        matches!(self, Self::Origin)
    }
}

/// Toggles the panels on horizontal flings. Vertical motion is ignored and
/// nothing is journaled.
#[derive(Debug, Clone, Default)]
pub struct GestureRouter {
    view: ViewState,
}

impl GestureRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Returns the new view when the fling changed it.
    pub fn on_fling(&mut self, start_x: f64, end_x: f64, velocity_x: f64) -> Option<ViewState> {
        let next = classify_fling(start_x, end_x, velocity_x)?;
        if next == self.view {
            return None;
        }
        self.view = next;
        Some(next)
    }
}

fn classify_fling(start_x: f64, end_x: f64, velocity_x: f64) -> Option<ViewState> {
    let fast_enough = velocity_x.abs() > FLING_MIN_VELOCITY;
    if start_x - end_x > FLING_MIN_DISTANCE && fast_enough {
        Some(ViewState::Loading)
    } else if end_x - start_x > FLING_MIN_DISTANCE && fast_enough {
        Some(ViewState::Origin)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leftward_fling_shows_loading_and_rightward_restores_origin() {
        let mut router = GestureRouter::new();
        assert_eq!(router.view(), ViewState::Origin);

        assert_eq!(router.on_fling(200.0, 100.0, 100.0), Some(ViewState::Loading));
        assert!(router.view().loading_visible());
        assert!(!router.view().origin_visible());

        assert_eq!(router.on_fling(100.0, 200.0, 100.0), Some(ViewState::Origin));
        assert!(router.view().origin_visible());
    }

    #[test]
    fn velocity_sign_is_ignored() {
        let mut router = GestureRouter::new();
        assert_eq!(router.on_fling(200.0, 100.0, -100.0), Some(ViewState::Loading));
    }

    #[test]
    fn short_or_slow_flings_change_nothing() {
        let mut router = GestureRouter::new();
        router.on_fling(200.0, 100.0, 100.0);

        assert_eq!(router.on_fling(100.0, 130.0, 500.0), None);
        assert_eq!(router.on_fling(100.0, 300.0, 50.0), None);
        assert_eq!(router.on_fling(100.0, 150.0, 500.0), None);
        assert_eq!(router.view(), ViewState::Loading);
    }

    #[test]
    fn repeating_the_current_direction_reports_no_change() {
        let mut router = GestureRouter::new();
        assert_eq!(router.on_fling(100.0, 300.0, 400.0), None);
        assert_eq!(router.view(), ViewState::Origin);
    }
}
