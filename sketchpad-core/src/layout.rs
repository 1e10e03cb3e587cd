// Fits the canvas to its container and debounces resize requests.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Sizing rules for the canvas inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Width / height. `None` fills the container height instead.
    pub aspect_ratio: Option<f32>,
    pub max_width: f32,
    /// Pixels taken by the container border on both sides together.
    pub border: f32,
    /// Trailing delay before a resize applies. `None` applies immediately.
    pub resize_debounce_ms: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: Some(4.0 / 3.0),
            max_width: 1200.0,
            border: 6.0,
            resize_debounce_ms: Some(250),
        }
    }
}

/// Canvas size for a given container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasLayout {
    pub width: u32,
    pub height: u32,
    /// True when the canvas is narrower than the container and should be centered.
    pub centered: bool,
}

impl CanvasLayout {
    pub fn fit(config: &LayoutConfig, container_width: f32, container_height: f32) -> Self {
        let available = (container_width - config.border).max(1.0);
        let width = available.min(config.max_width);
        let height = match config.aspect_ratio {
            Some(ratio) if ratio > 0.0 => width / ratio,
            _ => container_height - config.border,
        };

        let layout = Self {
            width: (width.round() as u32).max(1),
            height: height.round().max(1.0) as u32,
            centered: width < available,
        };
        trace!(
            "Fit canvas into {}x{}: {:?}",
            container_width,
            container_height,
            layout
        );
        layout
    }
}

/// Trailing-edge debounce for window resizes.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Option<Duration>,
    pending: Option<((f32, f32), Instant)>,
}

impl ResizeDebouncer {
    pub fn new(delay: Option<Duration>) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.resize_debounce_ms.map(Duration::from_millis))
    }

    /// Note a new container size. Restarts the delay.
    pub fn request(&mut self, container: (f32, f32), now: Instant) {
        self.pending = Some((container, now));
    }

    /// The container size to apply, once the delay has passed since the last request.
    pub fn poll(&mut self, now: Instant) -> Option<(f32, f32)> {
        let (container, requested_at) = self.pending?;
        let ready = match self.delay {
            Some(delay) => now.saturating_duration_since(requested_at) >= delay,
            None => true,
        };
        if ready {
            debug!("Applying resize to {:?}", container);
            self.pending = None;
            Some(container)
        } else {
            None
        }
    }

    /// Time left until a pending request fires, for scheduling a repaint.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let (_, requested_at) = self.pending?;
        let delay = self.delay.unwrap_or_default();
        Some(delay.saturating_sub(now.saturating_duration_since(requested_at)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_keeps_aspect_ratio() {
        let layout = CanvasLayout::fit(&LayoutConfig::default(), 806.0, 2000.0);
        assert_eq!(layout.width, 800);
        assert_eq!(layout.height, 600);
        assert!(!layout.centered);
    }

    #[test]
    fn test_fit_caps_width_and_centers() {
        let layout = CanvasLayout::fit(&LayoutConfig::default(), 2006.0, 2000.0);
        assert_eq!(layout.width, 1200);
        assert_eq!(layout.height, 900);
        assert!(layout.centered);
    }

    #[test]
    fn test_fit_without_aspect_fills_height() {
        let config = LayoutConfig {
            aspect_ratio: None,
            ..LayoutConfig::default()
        };
        let layout = CanvasLayout::fit(&config, 506.0, 406.0);
        assert_eq!((layout.width, layout.height), (500, 400));
    }

    #[test]
    fn test_fit_tiny_container() {
        let layout = CanvasLayout::fit(&LayoutConfig::default(), 0.0, 0.0);
        assert_eq!(layout.width, 1);
        assert!(layout.height >= 1);
    }

    #[test]
    fn test_debounce_waits_for_quiet() {
        let start = Instant::now();
        let mut debouncer = ResizeDebouncer::new(Some(Duration::from_millis(250)));

        debouncer.request((100.0, 100.0), start);
        debouncer.request((200.0, 100.0), start + Duration::from_millis(100));
        assert_eq!(debouncer.poll(start + Duration::from_millis(300)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(350)),
            Some((200.0, 100.0))
        );
        assert_eq!(debouncer.poll(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn test_no_debounce_applies_immediately() {
        let now = Instant::now();
        let mut debouncer = ResizeDebouncer::new(None);
        debouncer.request((10.0, 10.0), now);
        assert_eq!(debouncer.poll(now), Some((10.0, 10.0)));
    }
}
