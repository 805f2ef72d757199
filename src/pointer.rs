use std::ops::{Add, AddAssign, Sub};

/// A 2D point or vector in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length, used for pointer speed from a velocity vector.
    pub fn hypot(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// One pointer coordinate snapshot. Timestamps are milliseconds.
///
/// The same shape is reused for the derived slots of [`InteractionCoords`]:
/// in `delta` the timestamp holds the covered span in milliseconds, in
/// `velocity` the fields are px/s and the timestamp holds the measured span
/// in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CoordsSnapshot {
    pub page: Point,
    pub client: Point,
    pub timestamp: f64,
}

/// A pointer sample delivered by the host's event source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub pointer_id: i32,
    pub page: Point,
    pub client: Point,
}

/// Current/previous/delta/velocity coordinate slots of one interaction.
#[derive(Clone, Debug, Default)]
pub struct InteractionCoords {
    pub cur: CoordsSnapshot,
    pub prev: CoordsSnapshot,
    pub delta: CoordsSnapshot,
    pub velocity: CoordsSnapshot,
}

/// Floor on the measured span so a zero-span update cannot divide by zero.
const MIN_VELOCITY_SPAN_SECONDS: f64 = 0.001;

impl InteractionCoords {
    /// Sets `cur` to the average of the active pointers at `now_ms`.
    pub fn set_cur(&mut self, pointers: &[PointerSample], now_ms: f64) {
        let mut page = Point::ZERO;
        let mut client = Point::ZERO;
        let n = pointers.len().max(1) as f64;

        for pointer in pointers {
            page += pointer.page;
            client += pointer.client;
        }

        self.cur = CoordsSnapshot {
            page: Point::new(page.x / n, page.y / n),
            client: Point::new(client.x / n, client.y / n),
            timestamp: now_ms,
        };
    }

    /// Sets `cur` from explicit points, used while a simulation is driving
    /// the interaction instead of a pointer.
    pub fn set_cur_points(&mut self, page: Point, client: Point, now_ms: f64) {
        self.cur = CoordsSnapshot {
            page,
            client,
            timestamp: now_ms,
        };
    }

    pub fn copy_prev_from_cur(&mut self) {
        self.prev = self.cur;
    }

    /// Recomputes `delta` from the current and previous snapshots.
    pub fn set_deltas(&mut self) {
        self.delta = CoordsSnapshot {
            page: self.cur.page - self.prev.page,
            client: self.cur.client - self.prev.client,
            timestamp: self.cur.timestamp - self.prev.timestamp,
        };
    }

    /// Recomputes `velocity` (px/s) from `delta`.
    pub fn set_velocity(&mut self) {
        let dt = (self.delta.timestamp / 1000.0).max(MIN_VELOCITY_SPAN_SECONDS);

        self.velocity = CoordsSnapshot {
            page: Point::new(self.delta.page.x / dt, self.delta.page.y / dt),
            client: Point::new(self.delta.client.x / dt, self.delta.client.y / dt),
            timestamp: dt,
        };
    }
}
