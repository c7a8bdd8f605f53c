//! End-to-end scenarios against the library: store → search, and
//! store → reduce → group → geometry.

use docscope::geometry::{Boundary, GeometryBuilder};
use docscope::reduce::{ReductionMethod, ReductionParams};
use docscope::viz::{self, VizRequest};
use docscope::{search, EmbeddingStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

const DIM: usize = 768;

fn random_vector(rng: &mut StdRng) -> Vec<f32> {
    (0..DIM).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn around(base: &[f32], rng: &mut StdRng, spread: f32) -> Vec<f32> {
    base.iter()
        .map(|x| x + rng.gen_range(-spread..spread))
        .collect()
}

/// Four async-runtime docs and two serialization docs
fn six_document_store(tmp: &TempDir) -> EmbeddingStore {
    let mut rng = StdRng::seed_from_u64(7);
    let runtime = random_vector(&mut rng);
    let serial = random_vector(&mut rng);

    let mut store = EmbeddingStore::new(tmp.path().join("embeddings").join("docs.json"));
    for id in [
        "tokio_runtime_guide.txt",
        "async_std_book.txt",
        "tokio_tutorial.txt",
        "futures_async_primer.txt",
    ] {
        store.insert(id.into(), around(&runtime, &mut rng, 0.2)).unwrap();
    }
    for id in ["serde_guide.txt", "serde_json_docs.txt"] {
        store.insert(id.into(), around(&serial, &mut rng, 0.2)).unwrap();
    }
    store
}

// ── storage + search ─────────────────────────────────────────────────────

#[test]
fn saved_collection_reloads_and_searches_identically() {
    let tmp = TempDir::new().unwrap();
    let store = six_document_store(&tmp);
    store.save().unwrap();

    let loaded = EmbeddingStore::load(&store.index_path).unwrap();
    assert_eq!(loaded.len(), 6);
    assert_eq!(loaded.dimension(), Some(DIM));

    let query = loaded.vectors[4].clone();
    let first = loaded.search(&query, 3).unwrap();
    let second = loaded.search(&query, 3).unwrap();
    assert_eq!(first, second);
}

#[test]
fn query_equal_to_document_ranks_it_first() {
    let tmp = TempDir::new().unwrap();
    let store = six_document_store(&tmp);
    let query = store.vectors[3].clone();

    let results = store.search(&query, 5).unwrap();
    assert_eq!(results[0].id, store.ids[3]);
    assert!((results[0].score - 1.0).abs() < 1e-5);
}

#[test]
fn top_n_beyond_collection_returns_everything_once() {
    let tmp = TempDir::new().unwrap();
    let store = six_document_store(&tmp);
    let results = store.search(&store.vectors[0], 50).unwrap();

    assert_eq!(results.len(), store.len());
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    for id in &store.ids {
        assert_eq!(results.iter().filter(|r| &r.id == id).count(), 1);
    }
}

#[test]
fn empty_collection_searches_and_renders_nothing() {
    let tmp = TempDir::new().unwrap();
    let store = EmbeddingStore::new(tmp.path().join("empty.json"));
    store.save().unwrap();
    let loaded = EmbeddingStore::load(&store.index_path).unwrap();

    assert!(search::search(&[0.5; DIM], &loaded.ids, &loaded.vectors, 5)
        .unwrap()
        .is_empty());

    for method in ["pca", "tsne", "umap"] {
        let request = VizRequest::new(method, Some(2)).unwrap();
        assert!(viz::render(&loaded, &request).unwrap().is_none());
        let plain = VizRequest::new(method, None).unwrap();
        assert!(viz::render(&loaded, &plain).unwrap().is_none());
    }
}

// ── cluster map ──────────────────────────────────────────────────────────

#[test]
fn six_documents_two_clusters() {
    let tmp = TempDir::new().unwrap();
    let store = six_document_store(&tmp);

    let scene = viz::grouped_scene(
        &store.ids,
        &store.vectors,
        ReductionMethod::Pca,
        2,
        &ReductionParams::for_clusters(store.len()),
        &GeometryBuilder::default(),
    )
    .unwrap()
    .unwrap();

    assert_eq!(scene.points.len(), 6);
    assert!(scene
        .points
        .iter()
        .all(|p| matches!(p.cluster, Some(0) | Some(1))));
    assert_eq!(scene.clusters.len(), 2);
    assert!(scene.clusters.iter().all(|c| c.centroid.is_some()));

    for cluster in &scene.clusters {
        match cluster.size {
            n if n >= 3 => assert!(
                matches!(cluster.boundary, Boundary::Polygon(ref p) if p.len() >= 3),
                "cluster {} of {} should be outlined",
                cluster.cluster,
                n
            ),
            _ => assert_eq!(cluster.boundary, Boundary::TooFewPoints),
        }
    }

    // The two serialization docs share a cluster that has no outline
    let serde_cluster = scene.points[4].cluster.unwrap();
    assert_eq!(scene.points[5].cluster, Some(serde_cluster));
    assert_eq!(scene.clusters[serde_cluster].size, 2);
    assert_eq!(scene.clusters[serde_cluster].label, "serde, guide, json");
    let runtime_cluster = 1 - serde_cluster;
    assert_eq!(scene.clusters[runtime_cluster].label, "tokio, async, runtime");
}

#[test]
fn every_method_renders_the_small_corpus() {
    let tmp = TempDir::new().unwrap();
    let store = six_document_store(&tmp);

    for method in ["pca", "tsne", "umap"] {
        let request = VizRequest::new(method, Some(2)).unwrap();
        let scene = viz::render(&store, &request).unwrap().unwrap();
        assert_eq!(scene.points.len(), 6, "{}", method);
        assert!(
            scene.points.iter().all(|p| p.x.is_finite() && p.y.is_finite()),
            "{}",
            method
        );

        let again = viz::render(&store, &request).unwrap().unwrap();
        assert_eq!(scene, again, "{} should be reproducible", method);
    }
}

#[test]
fn plain_scene_serializes_to_json() {
    let tmp = TempDir::new().unwrap();
    let store = six_document_store(&tmp);
    let request = VizRequest::new("pca", None).unwrap();
    let scene = viz::render(&store, &request).unwrap().unwrap();

    let json: serde_json::Value = serde_json::to_value(&scene).unwrap();
    assert_eq!(json["method"], "pca");
    assert_eq!(json["points"].as_array().unwrap().len(), 6);
    assert!(json["clusters"].as_array().unwrap().is_empty());
}

#[test]
fn cluster_count_above_collection_size_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let store = six_document_store(&tmp);
    let request = VizRequest::new("umap", Some(7)).unwrap();
    assert!(matches!(
        viz::render(&store, &request),
        Err(docscope::DocscopeError::InvalidK { k: 7, n: 6 })
    ));
}
