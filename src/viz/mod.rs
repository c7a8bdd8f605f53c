//! Renderable 2-D scenes of the embedding collection.
//!
//! A scene is plain data: projected points, and for grouped scenes one
//! [`ClusterGeometry`] per cluster. [`svg`] and [`ascii`] turn it into text;
//! JSON comes from `serde`.

pub mod ascii;
pub mod svg;

use serde::Serialize;

use crate::cluster::{label_clusters, KMeans};
use crate::embeddings::EmbeddingStore;
use crate::error::{DocscopeError, Result};
use crate::geometry::{ClusterGeometry, GeometryBuilder, Point};
use crate::reduce::{self, ReductionMethod, ReductionParams};

/// Grouped layouts are stretched by this factor to reduce overlap
pub const SCALE_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenePoint {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub cluster: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub method: ReductionMethod,
    pub title: String,
    pub points: Vec<ScenePoint>,
    pub clusters: Vec<ClusterGeometry>,
}

/// What the caller asked to see
#[derive(Debug, Clone)]
pub struct VizRequest {
    pub method: ReductionMethod,
    /// `None` draws the unclustered layout
    pub clusters: Option<usize>,
    pub seed: u64,
    pub shrink_factor: f64,
}

impl VizRequest {
    /// Parse the method name; unknown names are rejected here
    pub fn new(method: &str, clusters: Option<usize>) -> Result<Self> {
        Ok(Self {
            method: method.parse()?,
            clusters,
            seed: crate::config::DEFAULT_SEED,
            shrink_factor: crate::geometry::SHRINK_FACTOR,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Build the scene for `request`. An empty store yields `None`.
pub fn render(store: &EmbeddingStore, request: &VizRequest) -> Result<Option<Scene>> {
    match request.clusters {
        None => plain_scene(
            &store.ids,
            &store.vectors,
            request.method,
            &ReductionParams::default().with_seed(request.seed),
        ),
        Some(k) => {
            let params = ReductionParams::for_clusters(store.len()).with_seed(request.seed);
            let geometry = GeometryBuilder::new(request.shrink_factor)?;
            grouped_scene(&store.ids, &store.vectors, request.method, k, &params, &geometry)
        }
    }
}

/// Direct 2-D projection with no staging or clustering
pub fn plain_scene(
    ids: &[String],
    vectors: &[Vec<f32>],
    method: ReductionMethod,
    params: &ReductionParams,
) -> Result<Option<Scene>> {
    if vectors.is_empty() {
        return Ok(None);
    }

    let projected = reduce::reduce(&reduce::to_f64(vectors)?, method, 2, params)?;
    let points = ids
        .iter()
        .zip(projected.rows())
        .map(|(id, xy)| ScenePoint {
            id: id.clone(),
            x: xy[0],
            y: xy[1],
            cluster: None,
        })
        .collect();

    Ok(Some(Scene {
        method,
        title: format!("Document map ({})", method.label()),
        points,
        clusters: Vec::new(),
    }))
}

/// k-means on the full vectors, staged projection to 2-D, keyword labels and
/// cluster outlines.
pub fn grouped_scene(
    ids: &[String],
    vectors: &[Vec<f32>],
    method: ReductionMethod,
    k: usize,
    params: &ReductionParams,
    geometry: &GeometryBuilder,
) -> Result<Option<Scene>> {
    if vectors.is_empty() {
        return Ok(None);
    }
    if k == 0 || k > vectors.len() {
        return Err(DocscopeError::InvalidK { k, n: vectors.len() });
    }

    let data = reduce::to_f64(vectors)?;
    let assignment = KMeans::new(k).with_seed(params.seed).fit(&data)?;
    tracing::info!(k, inertia = assignment.inertia, "grouped documents");

    let projected = reduce::staged_reduce(&data, method, 2, params)?;
    let positions: Vec<Point> = projected
        .rows()
        .into_iter()
        .map(|xy| Point::new(xy[0] * SCALE_FACTOR, xy[1] * SCALE_FACTOR))
        .collect();

    let names = label_clusters(ids, &assignment);
    let clusters = geometry.build(&positions, &assignment.labels, &names);

    let points = ids
        .iter()
        .zip(positions.iter())
        .zip(assignment.labels.iter())
        .map(|((id, p), &label)| ScenePoint {
            id: id.clone(),
            x: p.x,
            y: p.y,
            cluster: Some(label),
        })
        .collect();

    Ok(Some(Scene {
        method,
        title: format!("Clusters by similarity ({})", method.label()),
        points,
        clusters,
    }))
}
