//! Plane geometry for the memory canvas. Coordinates are canvas units with
//! y growing downward.

use serde::Serialize;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Axis-aligned box given by its top-left corner
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Bounds {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Rhombus with the given diagonal: top, right, bottom, left
pub fn diamond(center: Point, size: f64) -> Vec<Point> {
    let half = size / 2.0;
    vec![
        center.offset(0.0, -half),
        center.offset(half, 0.0),
        center.offset(0.0, half),
        center.offset(-half, 0.0),
    ]
}

/// Regular hexagon with a vertex at angle zero
pub fn hexagon(center: Point, radius: f64) -> Vec<Point> {
    (0..6_u32)
        .map(|i| {
            let angle = PI / 3.0 * f64::from(i);
            center.offset(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Point at parameter `t` on a quadratic Bezier curve
pub fn quadratic_point(start: Point, control: Point, end: Point, t: f64) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * start.x + 2.0 * u * t * control.x + t * t * end.x,
        u * u * start.y + 2.0 * u * t * control.y + t * t * end.y,
    )
}
