//! Viewport dimensions in logical pixels.

/// Size of the drawable area in logical (scale-factor independent) pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Convert a physical pixel size using the window scale factor.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self {
            width: (f64::from(width) / scale) as f32,
            height: (f64::from(height) / scale) as f32,
        }
    }

    /// True when there is nothing to draw into.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_physical_divides_by_scale() {
        let v = Viewport::from_physical(3840, 2160, 2.0);
        assert_eq!(v, Viewport::new(1920.0, 1080.0));
        // Degenerate scale factors are treated as 1.0.
        assert_eq!(Viewport::from_physical(800, 600, 0.0), Viewport::new(800.0, 600.0));
    }

    #[test]
    fn empty_viewport_detection() {
        assert!(Viewport::new(0.0, 600.0).is_empty());
        assert!(Viewport::new(800.0, -1.0).is_empty());
        assert!(Viewport::new(f32::NAN, 10.0).is_empty());
        assert!(!Viewport::new(800.0, 600.0).is_empty());
    }
}
