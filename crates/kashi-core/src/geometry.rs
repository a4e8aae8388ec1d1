//! Crop Geometry Model.
//!
//! Tracks the crop selection over the image *as displayed* (CSS pixels,
//! possibly scaled down from the natural size). Converting to native pixels
//! happens only at export time, in [`crate::render::to_native_rect`].
//!
//! The selection is always fully inside the display bounds and never smaller
//! than the configured minimum size (unless the image itself is smaller).

use serde::{Deserialize, Serialize};

/// Crop selection in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the region lies inside a `width` x `height` area.
    pub fn fits_within(&self, width: f64, height: f64) -> bool {
        const EPS: f64 = 1e-9;
        self.x >= -EPS
            && self.y >= -EPS
            && self.x + self.width <= width + EPS
            && self.y + self.height <= height + EPS
    }
}

/// Aspect ratio constraint for the crop selection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AspectLock {
    /// Any width and height.
    #[default]
    Free,
    /// Fixed width / height ratio.
    Ratio(f64),
}

impl AspectLock {
    /// The square lock offered by the photo editor.
    pub const SQUARE: AspectLock = AspectLock::Ratio(1.0);

    /// Square when `locked`, free otherwise.
    pub fn from_locked(locked: bool) -> Self {
        if locked {
            Self::SQUARE
        } else {
            Self::Free
        }
    }

    pub fn is_locked(self) -> bool {
        matches!(self, AspectLock::Ratio(_))
    }

    /// Ratio if it is usable; zero, negative and non-finite ratios count as free.
    fn ratio(self) -> Option<f64> {
        match self {
            AspectLock::Ratio(r) if r.is_finite() && r > 0.0 => Some(r),
            _ => None,
        }
    }
}

/// Default selection for a freshly loaded image.
///
/// - `Free`: the whole image, `{0, 0, width, height}`.
/// - `SQUARE`: the centered square of side `min(width, height)`.
/// - Any other ratio: the largest centered rectangle of that ratio.
pub fn compute_initial_region(width: f64, height: f64, aspect: AspectLock) -> CropRegion {
    let Some(ratio) = aspect.ratio() else {
        return CropRegion::new(0.0, 0.0, width, height);
    };
    if width <= 0.0 || height <= 0.0 {
        return CropRegion::new(0.0, 0.0, width.max(0.0), height.max(0.0));
    }

    let (w, h) = if width / height > ratio {
        (height * ratio, height)
    } else {
        (width, width / ratio)
    };

    CropRegion::new((width - w) / 2.0, (height - h) / 2.0, w, h)
}

/// Current crop selection plus the constraints it must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub struct CropGeometry {
    bounds: (f64, f64),
    aspect: AspectLock,
    min_size: f64,
    region: CropRegion,
}

impl CropGeometry {
    /// Start a selection over a `width` x `height` display area.
    pub fn new(width: f64, height: f64, aspect: AspectLock, min_size: f64) -> Self {
        let bounds = (finite_or_zero(width).max(0.0), finite_or_zero(height).max(0.0));
        Self {
            bounds,
            aspect,
            min_size: finite_or_zero(min_size).max(0.0),
            region: compute_initial_region(bounds.0, bounds.1, aspect),
        }
    }

    pub fn region(&self) -> CropRegion {
        self.region
    }

    pub fn aspect(&self) -> AspectLock {
        self.aspect
    }

    pub fn bounds(&self) -> (f64, f64) {
        self.bounds
    }

    /// Replace the selection with the default one for the current bounds.
    pub fn reset(&mut self) -> CropRegion {
        self.region = compute_initial_region(self.bounds.0, self.bounds.1, self.aspect);
        self.region
    }

    /// New display area (new image, resized view or rotation): resets the
    /// selection.
    pub fn set_bounds(&mut self, width: f64, height: f64) -> CropRegion {
        self.bounds = (finite_or_zero(width).max(0.0), finite_or_zero(height).max(0.0));
        self.reset()
    }

    /// Change the aspect lock.
    ///
    /// When the lock actually changes, any manual adjustment is discarded and
    /// the default selection for the new lock is used.
    pub fn set_aspect(&mut self, aspect: AspectLock) -> CropRegion {
        if aspect != self.aspect {
            self.aspect = aspect;
            self.reset();
        }
        self.region
    }

    /// Restore a previously accepted selection (e.g. when a crop is
    /// cancelled). The region goes through the same clamping as user input.
    pub fn restore(&mut self, region: CropRegion) -> CropRegion {
        self.adjust(region)
    }

    /// Accept a user move/resize, clamped to the constraints.
    ///
    /// Size is clamped to `[min_size, bounds]` and forced to the locked
    /// ratio (the largest box of that ratio inside the requested one), then
    /// the position is clamped so the region stays inside the bounds.
    pub fn adjust(&mut self, requested: CropRegion) -> CropRegion {
        let (bound_w, bound_h) = self.bounds;
        let req_w = finite_or_zero(requested.width).max(0.0);
        let req_h = finite_or_zero(requested.height).max(0.0);

        let (width, height) = match self.aspect.ratio() {
            Some(ratio) => {
                let max_w = bound_w.min(bound_h * ratio);
                let min_w = self.min_size.max(self.min_size * ratio).min(max_w);
                let width = req_w.min(req_h * ratio).clamp(min_w, max_w);
                (width, width / ratio)
            }
            None => (
                req_w.clamp(self.min_size.min(bound_w), bound_w),
                req_h.clamp(self.min_size.min(bound_h), bound_h),
            ),
        };

        let x = finite_or_zero(requested.x).clamp(0.0, (bound_w - width).max(0.0));
        let y = finite_or_zero(requested.y).clamp(0.0, (bound_h - height).max(0.0));

        self.region = CropRegion::new(x, y, width, height);
        self.region
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

    fn geometry(width: f64, height: f64, aspect: AspectLock) -> CropGeometry {
        CropGeometry::new(width, height, aspect, 10.0)
    }

    #[test]
    fn test_initial_region_free_is_full_image() {
        let region = compute_initial_region(800.0, 600.0, AspectLock::Free);
        assert_eq!(region, CropRegion::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn test_initial_region_square_landscape() {
        let region = compute_initial_region(800.0, 600.0, AspectLock::SQUARE);
        assert_eq!(region, CropRegion::new(100.0, 0.0, 600.0, 600.0));
    }

    #[test]
    fn test_initial_region_square_portrait() {
        let region = compute_initial_region(300.0, 500.0, AspectLock::SQUARE);
        assert_eq!(region, CropRegion::new(0.0, 100.0, 300.0, 300.0));
    }

    #[test]
    fn test_initial_region_other_ratio() {
        let region = compute_initial_region(800.0, 800.0, AspectLock::Ratio(2.0));
        assert_eq!(region, CropRegion::new(0.0, 200.0, 800.0, 400.0));
    }

    #[test]
    fn test_invalid_ratio_behaves_as_free() {
        let region = compute_initial_region(80.0, 60.0, AspectLock::Ratio(0.0));
        assert_eq!(region, CropRegion::new(0.0, 0.0, 80.0, 60.0));
    }

    #[test]
    fn test_adjust_inside_is_kept() {
        let mut geo = geometry(400.0, 300.0, AspectLock::Free);
        let region = geo.adjust(CropRegion::new(50.0, 50.0, 100.0, 120.0));
        assert_eq!(region, CropRegion::new(50.0, 50.0, 100.0, 120.0));
    }

    #[test]
    fn test_adjust_moves_region_back_inside() {
        let mut geo = geometry(400.0, 300.0, AspectLock::Free);
        let region = geo.adjust(CropRegion::new(350.0, -20.0, 100.0, 100.0));
        assert_eq!(region, CropRegion::new(300.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_adjust_enforces_min_size() {
        let mut geo = geometry(400.0, 300.0, AspectLock::Free);
        let region = geo.adjust(CropRegion::new(10.0, 10.0, 2.0, 0.0));
        assert_eq!((region.width, region.height), (10.0, 10.0));
    }

    #[test]
    fn test_adjust_caps_at_bounds() {
        let mut geo = geometry(400.0, 300.0, AspectLock::Free);
        let region = geo.adjust(CropRegion::new(0.0, 0.0, 1000.0, 1000.0));
        assert_eq!(region, CropRegion::new(0.0, 0.0, 400.0, 300.0));
    }

    #[test]
    fn test_adjust_square_uses_smaller_side() {
        let mut geo = geometry(400.0, 300.0, AspectLock::SQUARE);
        let region = geo.adjust(CropRegion::new(20.0, 20.0, 120.0, 80.0));
        assert_eq!(region, CropRegion::new(20.0, 20.0, 80.0, 80.0));
    }

    #[test]
    fn test_adjust_square_capped_by_short_side() {
        let mut geo = geometry(400.0, 300.0, AspectLock::SQUARE);
        let region = geo.adjust(CropRegion::new(200.0, 0.0, 500.0, 500.0));
        assert_eq!(region, CropRegion::new(100.0, 0.0, 300.0, 300.0));
    }

    #[test]
    fn test_adjust_non_finite_treated_as_zero() {
        let mut geo = geometry(400.0, 300.0, AspectLock::Free);
        let region = geo.adjust(CropRegion::new(f64::NAN, 5.0, f64::INFINITY, 50.0));
        assert_eq!(region, CropRegion::new(0.0, 5.0, 10.0, 50.0));
    }

    #[test]
    fn test_tiny_image_min_size_limited_by_bounds() {
        let mut geo = geometry(6.0, 4.0, AspectLock::Free);
        let region = geo.adjust(CropRegion::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(region, CropRegion::new(0.0, 0.0, 6.0, 4.0));
    }

    #[test]
    fn test_toggle_lock_discards_manual_adjustment() {
        let mut geo = geometry(800.0, 600.0, AspectLock::Free);
        geo.adjust(CropRegion::new(10.0, 10.0, 50.0, 50.0));

        let region = geo.set_aspect(AspectLock::SQUARE);
        assert_eq!(region, CropRegion::new(100.0, 0.0, 600.0, 600.0));

        let region = geo.set_aspect(AspectLock::Free);
        assert_eq!(region, CropRegion::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn test_same_lock_keeps_adjustment() {
        let mut geo = geometry(800.0, 600.0, AspectLock::SQUARE);
        let adjusted = geo.adjust(CropRegion::new(10.0, 10.0, 50.0, 50.0));
        assert_eq!(geo.set_aspect(AspectLock::SQUARE), adjusted);
    }

    #[test]
    fn test_set_bounds_resets() {
        let mut geo = geometry(800.0, 600.0, AspectLock::Free);
        geo.adjust(CropRegion::new(10.0, 10.0, 50.0, 50.0));
        let region = geo.set_bounds(400.0, 300.0);
        assert_eq!(region, CropRegion::new(0.0, 0.0, 400.0, 300.0));
    }
}
