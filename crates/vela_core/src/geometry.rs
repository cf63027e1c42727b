//! Viewport geometry
//!
//! Rectangles in viewport (client) coordinates and CSS-style root margins
//! used to grow or shrink the region elements are tested against.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Axis-aligned rectangle; `y` grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Same rectangle moved by `(dx, dy)`
    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Overlap of two rectangles.
    ///
    /// Edge-adjacent rectangles produce a zero-area overlap rather than
    /// `None`, so zero-height elements sitting inside the region still count
    /// as intersecting.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.left().max(other.left());
        let y = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right >= x && bottom >= y {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }
}

/// Failed to parse a root margin string
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarginError {
    #[error("root margin must have 1 to 4 components, got {0}")]
    ComponentCount(usize),

    #[error("invalid root margin component `{0}` (expected px or %)")]
    InvalidComponent(String),
}

/// One side of a root margin
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum MarginValue {
    #[default]
    Zero,
    Px(f32),
    /// Percentage of the root's width (left/right) or height (top/bottom)
    Percent(f32),
}

impl MarginValue {
    fn parse(s: &str) -> Result<Self, MarginError> {
        let invalid = || MarginError::InvalidComponent(s.to_string());
        if let Some(px) = s.strip_suffix("px") {
            px.parse().map(MarginValue::Px).map_err(|_| invalid())
        } else if let Some(pct) = s.strip_suffix('%') {
            pct.parse().map(MarginValue::Percent).map_err(|_| invalid())
        } else if s == "0" {
            Ok(MarginValue::Zero)
        } else {
            Err(invalid())
        }
    }

    /// Resolve against the root extent along this side's axis
    pub fn resolve(&self, extent: f32) -> f32 {
        match *self {
            MarginValue::Zero => 0.0,
            MarginValue::Px(px) => px,
            MarginValue::Percent(pct) => extent * pct / 100.0,
        }
    }
}

/// CSS-style margin around the root region (`"0px 0px -50px 0px"`).
///
/// Positive values grow the region, negative values shrink it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl RootMargin {
    /// Parse the 1-4 component shorthand used by CSS `margin`
    pub fn parse(margin: &str) -> Result<Self, MarginError> {
        let parts = margin
            .split_whitespace()
            .map(MarginValue::parse)
            .collect::<Result<Vec<_>, _>>()?;

        let (top, right, bottom, left) = match parts.as_slice() {
            [] => return Ok(Self::default()),
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            more => return Err(MarginError::ComponentCount(more.len())),
        };

        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    /// Apply the margin to a root rectangle
    pub fn apply(&self, root: &Rect) -> Rect {
        let top = self.top.resolve(root.height);
        let right = self.right.resolve(root.width);
        let bottom = self.bottom.resolve(root.height);
        let left = self.left.resolve(root.width);

        Rect::new(
            root.x - left,
            root.y - top,
            root.width + left + right,
            root.height + top + bottom,
        )
    }
}

impl std::str::FromStr for RootMargin {
    type Err = MarginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
