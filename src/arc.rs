//! Procedural shield outlines.
//!
//! A shield is an annular sector: everything between `inner_radius` and
//! `outer_radius` from angle 0 to `sweep`, in the shield's local frame. The
//! curved edges are approximated by straight chords, producing a closed
//! outline that the world builder turns into colliders.

use std::f32::consts::{PI, TAU};

use rapier2d::prelude::*;

use crate::error::GeometryError;

/// Relative tolerance used when merging vertices and testing crossings.
const EPSILON: f32 = 1.0e-5;

/// A point in a shield's local frame, in polar form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polar {
    pub radius: f32,
    /// Radians, counter-clockwise from the local x axis.
    pub angle: f32,
}

impl Polar {
    pub fn new(radius: f32, angle: f32) -> Self {
        Self { radius, angle }
    }

    pub fn to_cartesian(self) -> Point<Real> {
        Point::new(self.radius * self.angle.cos(), self.radius * self.angle.sin())
    }
}

/// A straight edge of an outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point<Real>,
    pub end: Point<Real>,
}

impl Segment {
    fn between(start: Polar, end: Polar) -> Self {
        Self {
            start: start.to_cartesian(),
            end: end.to_cartesian(),
        }
    }
}

/// Builds the outline of an annular sector as an ordered, closed list of
/// segments:
///
/// 1. radial edge from `(inner, 0)` to `(outer, 0)`
/// 2. `tessellation_points` chords along the outer arc, from 0 to `sweep`
/// 3. radial edge from `(outer, sweep)` back to `(inner, sweep)`
/// 4. `tessellation_points` chords along the inner arc, from `sweep` to 0
///
/// Each arc gets exactly `tessellation_points` chords, so consecutive
/// segments always share an endpoint and the last one ends where the first
/// one starts.
pub fn generate_arc_segments(
    inner_radius: f32,
    outer_radius: f32,
    sweep: f32,
    tessellation_points: usize,
) -> Result<Vec<Segment>, GeometryError> {
    if !(inner_radius >= 0.0 && inner_radius < outer_radius) {
        return Err(GeometryError::InvalidRadii {
            inner: inner_radius,
            outer: outer_radius,
        });
    }
    if !(sweep > 0.0 && sweep <= TAU) {
        return Err(GeometryError::InvalidSweep(sweep));
    }
    if tessellation_points == 0 {
        return Err(GeometryError::NoTessellation);
    }
    // A chord spanning half a turn or more bends the outline inside out.
    let step = sweep / tessellation_points as f32;
    if step >= PI {
        return Err(GeometryError::CoarseTessellation {
            step,
            tessellation_points,
        });
    }

    let angle_at = |k: usize| sweep * (k as f32 / tessellation_points as f32);
    let mut segments = Vec::with_capacity(2 * tessellation_points + 2);

    segments.push(Segment::between(
        Polar::new(inner_radius, 0.0),
        Polar::new(outer_radius, 0.0),
    ));
    for k in 0..tessellation_points {
        segments.push(Segment::between(
            Polar::new(outer_radius, angle_at(k)),
            Polar::new(outer_radius, angle_at(k + 1)),
        ));
    }
    segments.push(Segment::between(
        Polar::new(outer_radius, sweep),
        Polar::new(inner_radius, sweep),
    ));
    for k in (0..tessellation_points).rev() {
        segments.push(Segment::between(
            Polar::new(inner_radius, angle_at(k + 1)),
            Polar::new(inner_radius, angle_at(k)),
        ));
    }

    Ok(segments)
}

/// A validated shield outline, generated once at startup.
#[derive(Debug, Clone)]
pub struct ShieldGeometry {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub sweep: f32,
    pub tessellation_points: usize,
    segments: Vec<Segment>,
}

impl ShieldGeometry {
    /// Generates and validates the outline. Fails if the outline is
    /// degenerate, wound the wrong way or crosses itself.
    pub fn new(
        inner_radius: f32,
        outer_radius: f32,
        sweep: f32,
        tessellation_points: usize,
    ) -> Result<Self, GeometryError> {
        let segments =
            generate_arc_segments(inner_radius, outer_radius, sweep, tessellation_points)?;
        let geometry = Self {
            inner_radius,
            outer_radius,
            sweep,
            tessellation_points,
            segments,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Chords approximating the outer arc, in increasing angle order.
    pub fn outer_arc(&self) -> &[Segment] {
        &self.segments[1..=self.tessellation_points]
    }

    /// Chords approximating the inner arc, in decreasing angle order.
    pub fn inner_arc(&self) -> &[Segment] {
        &self.segments[self.tessellation_points + 2..]
    }

    /// Polygon vertices in outline order, with coincident neighbours merged.
    ///
    /// An inner radius of zero collapses the whole inner arc into the
    /// origin, which leaves a pie slice.
    pub fn vertices(&self) -> Vec<Point<Real>> {
        let tolerance = EPSILON * self.outer_radius;
        let mut vertices: Vec<Point<Real>> = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            let distinct = vertices
                .last()
                .map_or(true, |last| (segment.start - *last).norm() > tolerance);
            if distinct {
                vertices.push(segment.start);
            }
        }
        while vertices.len() > 1
            && (vertices[vertices.len() - 1] - vertices[0]).norm() <= tolerance
        {
            vertices.pop();
        }
        vertices
    }

    /// Signed area of the outline. Positive when angles increase along the
    /// outer arc, which is counter-clockwise for y up and clockwise on screen.
    pub fn signed_area(&self) -> f32 {
        let vertices = self.vertices();
        let mut twice_area = 0.0;
        for i in 0..vertices.len() {
            let a = vertices[i];
            let b = vertices[(i + 1) % vertices.len()];
            twice_area += a.x * b.y - b.x * a.y;
        }
        twice_area * 0.5
    }

    /// Splits the sector into one convex quad per tessellation step:
    /// `[inner(k), outer(k), outer(k+1), inner(k+1)]`.
    ///
    /// With a zero inner radius the two inner corners coincide and each
    /// piece is a triangle.
    pub fn convex_pieces(&self) -> Vec<[Point<Real>; 4]> {
        let n = self.tessellation_points;
        let angle_at = |k: usize| self.sweep * (k as f32 / n as f32);
        (0..n)
            .map(|k| {
                [
                    Polar::new(self.inner_radius, angle_at(k)).to_cartesian(),
                    Polar::new(self.outer_radius, angle_at(k)).to_cartesian(),
                    Polar::new(self.outer_radius, angle_at(k + 1)).to_cartesian(),
                    Polar::new(self.inner_radius, angle_at(k + 1)).to_cartesian(),
                ]
            })
            .collect()
    }

    fn validate(&self) -> Result<(), GeometryError> {
        let vertices = self.vertices();
        let area_tolerance = EPSILON * self.outer_radius * self.outer_radius;
        if vertices.len() < 3 || self.signed_area() <= area_tolerance {
            return Err(GeometryError::Degenerate {
                vertices: vertices.len(),
            });
        }

        let count = vertices.len();
        let edge = |i: usize| (vertices[i], vertices[(i + 1) % count]);
        for first in 0..count {
            // Neighbouring edges share a vertex and can only touch there.
            for second in (first + 2)..count {
                if first == 0 && second == count - 1 {
                    continue;
                }
                let (a, b) = edge(first);
                let (c, d) = edge(second);
                if segments_cross(a, b, c, d, area_tolerance) {
                    return Err(GeometryError::SelfIntersecting { first, second });
                }
            }
        }
        Ok(())
    }
}

fn cross(o: Point<Real>, a: Point<Real>, b: Point<Real>) -> f32 {
    (a - o).perp(&(b - o))
}

/// True when `ab` and `cd` properly cross. Touching endpoints and collinear
/// overlaps (the seam of a full circle) do not count.
fn segments_cross(a: Point<Real>, b: Point<Real>, c: Point<Real>, d: Point<Real>, tolerance: f32) -> bool {
    let side = |value: f32| {
        if value > tolerance {
            1
        } else if value < -tolerance {
            -1
        } else {
            0
        }
    };
    let d1 = side(cross(c, d, a));
    let d2 = side(cross(c, d, b));
    let d3 = side(cross(a, b, c));
    let d4 = side(cross(a, b, d));
    d1 * d2 < 0 && d3 * d4 < 0
}
