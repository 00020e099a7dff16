//! Video control surface consumed by the host's video manager

/// Uniform control surface over an embedded player
///
/// Controls are fire-and-forget: they are forwarded to the player frame once it
/// is ready and silently dropped when no frame is attached.
pub trait VideoInterface {
    fn play(&mut self);
    fn pause(&mut self);
    fn mute(&mut self);
    fn unmute(&mut self);
    fn seek_to(&mut self, seconds: f64);

    /// Last position reported by the player
    fn current_time(&self) -> f64;

    /// The player never reports a duration; this is a fixed non-zero value
    fn duration(&self) -> f64;

    /// Played time ranges, always empty
    fn played_ranges(&self) -> Vec<(f64, f64)> {
        Vec::new()
    }

    fn supports_platform(&self) -> bool {
        true
    }

    fn is_interactive(&self) -> bool {
        true
    }

    /// The player draws its own controls
    fn show_controls(&mut self) {}

    fn hide_controls(&mut self) {}

    fn fullscreen_enter(&mut self) {}

    fn fullscreen_exit(&mut self) {}

    fn is_fullscreen(&self) -> bool {
        false
    }

    fn preimplements_media_session(&self) -> bool {
        false
    }

    fn preimplements_auto_fullscreen(&self) -> bool {
        false
    }
}
