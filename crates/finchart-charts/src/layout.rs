//! Plotting-surface sizing and viewport positioning.
//!
//! Dense series get a surface wider than their container so they scroll
//! horizontally; sparse series stretch to fill the container.

use serde::{Deserialize, Serialize};

/// Width policy for a plotting surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingPolicy {
    /// Smallest surface width, in pixels.
    pub min_width: f64,
    /// Horizontal space reserved per period, in pixels.
    pub per_period_width: f64,
    /// Fixed space for axes and padding, in pixels.
    pub margin: f64,
    /// Upper bound on the surface width, if any.
    pub max_width: Option<f64>,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        Self {
            min_width: 320.0,
            per_period_width: 60.0,
            margin: 80.0,
            max_width: None,
        }
    }
}

impl SizingPolicy {
    /// Sets the per-period width.
    #[must_use]
    pub const fn with_per_period_width(mut self, width: f64) -> Self {
        self.per_period_width = width;
        self
    }

    /// Sets the maximum width.
    #[must_use]
    pub const fn with_max_width(mut self, width: f64) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Width needed to draw `periods` periods legibly.
    ///
    /// Non-decreasing in `periods`.
    #[must_use]
    pub fn required_width(&self, periods: usize) -> f64 {
        let width = (periods as f64)
            .mul_add(self.per_period_width, self.margin)
            .max(self.min_width);
        match self.max_width {
            Some(max) => width.min(max.max(self.min_width)),
            None => width,
        }
    }

    /// Sizes a surface for `periods` periods inside a container `available` pixels wide.
    #[must_use]
    pub fn surface(&self, periods: usize, available: f64) -> Surface {
        let required = self.required_width(periods);
        let available = if available.is_finite() {
            available.max(0.0)
        } else {
            0.0
        };
        if required > available {
            Surface {
                width: required,
                available,
                scrollable: true,
            }
        } else {
            Surface {
                width: available,
                available,
                scrollable: false,
            }
        }
    }
}

/// Computed plotting-surface dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Effective surface width, in pixels.
    pub width: f64,
    /// Container width the surface was sized against.
    pub available: f64,
    /// True if the surface is wider than its container.
    pub scrollable: bool,
}

impl Surface {
    /// Width to pin on the plot, or `None` to let it fill the container.
    #[must_use]
    pub const fn fixed_width(&self) -> Option<f64> {
        if self.scrollable {
            Some(self.width)
        } else {
            None
        }
    }

    /// Horizontal scroll offset for the given anchor, never negative.
    #[must_use]
    pub fn scroll_offset(&self, anchor: ScrollAnchor) -> f64 {
        let overflow = (self.width - self.available).max(0.0);
        match anchor {
            ScrollAnchor::Latest => overflow,
            ScrollAnchor::Center => overflow / 2.0,
        }
    }
}

/// Where the viewport lands after a render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollAnchor {
    /// Trailing edge, showing the most recent period.
    #[default]
    Latest,
    /// Middle of the surface.
    Center,
}

/// X-axis domain that centres every bar or point on its tick.
#[must_use]
pub fn x_range(periods: usize) -> [f64; 2] {
    [-0.5, periods as f64 - 0.5]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_width_policy() {
        let policy = SizingPolicy::default();
        assert_eq!(policy.required_width(0), 320.0);
        assert_eq!(policy.required_width(4), 320.0);
        assert_eq!(policy.required_width(10), 680.0);
        assert_eq!(policy.with_max_width(500.0).required_width(10), 500.0);
    }

    #[test]
    fn test_required_width_is_monotonic() {
        let policy = SizingPolicy::default().with_per_period_width(37.5);
        let mut previous = 0.0;
        for n in 0..200 {
            let width = policy.required_width(n);
            assert!(width >= previous, "width shrank at n={n}");
            previous = width;
        }
    }

    #[test]
    fn test_dense_series_scrolls() {
        let surface = SizingPolicy::default().surface(13, 600.0);
        assert!(surface.scrollable);
        assert_eq!(surface.width, 860.0);
        assert_eq!(surface.fixed_width(), Some(860.0));
        assert_eq!(surface.scroll_offset(ScrollAnchor::Latest), 260.0);
        assert_eq!(surface.scroll_offset(ScrollAnchor::Center), 130.0);
    }

    #[test]
    fn test_sparse_series_fills_container() {
        let surface = SizingPolicy::default().surface(3, 900.0);
        assert!(!surface.scrollable);
        assert_eq!(surface.width, 900.0);
        assert_eq!(surface.fixed_width(), None);
        assert_eq!(surface.scroll_offset(ScrollAnchor::Latest), 0.0);
    }

    #[test]
    fn test_x_range() {
        assert_eq!(x_range(1), [-0.5, 0.5]);
        assert_eq!(x_range(12), [-0.5, 11.5]);
    }
}
