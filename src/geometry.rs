//! Per-cluster outlines and annotations for a 2-D cluster map.

use serde::Serialize;

use crate::error::{DocscopeError, Result};

/// Hull points are pulled this fraction of the way back from the centroid
pub const SHRINK_FACTOR: f64 = 1.0;
const MIN_FONT_SIZE: f64 = 8.0;
const MAX_FONT_SIZE: f64 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Outline of one cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "points", rename_all = "snake_case")]
pub enum Boundary {
    /// Counter-clockwise convex polygon
    Polygon(Vec<Point>),
    /// Fewer than three members
    TooFewPoints,
    /// Members are coincident, collinear or non-finite
    Degenerate,
}

impl Boundary {
    pub fn polygon(&self) -> Option<&[Point]> {
        match self {
            Boundary::Polygon(points) => Some(points),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterGeometry {
    pub cluster: usize,
    pub label: String,
    pub size: usize,
    /// Mean member position; absent for an empty cluster
    pub centroid: Option<Point>,
    pub boundary: Boundary,
    pub font_size: f64,
}

/// Convex hull by Andrew's monotone chain, counter-clockwise, without
/// repeating the first vertex. `None` when the points span no area.
pub fn convex_hull(points: &[Point]) -> Option<Vec<Point>> {
    if points.len() < 3 || !points.iter().all(Point::is_finite) {
        return None;
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() < 3 {
        return None;
    }

    let mut lower: Vec<Point> = Vec::new();
    for &p in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point> = Vec::new();
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);

    if lower.len() < 3 {
        None
    } else {
        Some(lower)
    }
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

/// `centre + factor * (p - centre)` for every point
pub fn shrink(points: &[Point], centre: Point, factor: f64) -> Vec<Point> {
    points
        .iter()
        .map(|p| {
            Point::new(
                centre.x + factor * (p.x - centre.x),
                centre.y + factor * (p.y - centre.y),
            )
        })
        .collect()
}

/// Label size grows with the cluster's share of all documents
pub fn font_size(count: usize, total: usize) -> f64 {
    if total == 0 {
        return MIN_FONT_SIZE;
    }
    let share = count as f64 / total as f64;
    (MIN_FONT_SIZE + share * 8.0).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

/// Builds [`ClusterGeometry`] for every cluster of a projected layout
#[derive(Debug, Clone)]
pub struct GeometryBuilder {
    shrink_factor: f64,
}

impl Default for GeometryBuilder {
    fn default() -> Self {
        Self {
            shrink_factor: SHRINK_FACTOR,
        }
    }
}

impl GeometryBuilder {
    pub fn new(shrink_factor: f64) -> Result<Self> {
        if !(shrink_factor > 0.0 && shrink_factor <= 1.0) {
            return Err(DocscopeError::Config(format!(
                "shrink factor must be in (0, 1], got {}",
                shrink_factor
            )));
        }
        Ok(Self { shrink_factor })
    }

    /// One entry per label in `names`. A cluster whose hull cannot be built
    /// gets [`Boundary::Degenerate`]; the others are unaffected.
    pub fn build(&self, points: &[Point], labels: &[usize], names: &[String]) -> Vec<ClusterGeometry> {
        let total = points.len();

        names
            .iter()
            .enumerate()
            .map(|(cluster, name)| {
                let members: Vec<Point> = points
                    .iter()
                    .zip(labels.iter())
                    .filter(|(_, &label)| label == cluster)
                    .map(|(p, _)| *p)
                    .collect();
                let centre = centroid(&members);

                let boundary = match centre {
                    _ if members.len() < 3 => Boundary::TooFewPoints,
                    Some(c) => match convex_hull(&members) {
                        Some(hull) => Boundary::Polygon(shrink(&hull, c, self.shrink_factor)),
                        None => {
                            tracing::warn!(cluster, "cluster has no area, drawing without outline");
                            Boundary::Degenerate
                        }
                    },
                    None => Boundary::TooFewPoints,
                };

                ClusterGeometry {
                    cluster,
                    label: name.clone(),
                    size: members.len(),
                    centroid: centre,
                    boundary,
                    font_size: font_size(members.len(), total),
                }
            })
            .collect()
    }
}
