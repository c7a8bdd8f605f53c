use super::Scene;
use crate::geometry::Boundary;

/// Terminal summary of a scene
pub fn render(scene: &Scene) -> String {
    let mut output = String::new();

    output.push_str(&format!("📊 {}\n\n", scene.title));
    output.push_str(&format!("Documents: {}", scene.points.len()));
    if !scene.clusters.is_empty() {
        output.push_str(&format!(", Clusters: {}", scene.clusters.len()));
    }
    output.push_str("\n\n");

    if scene.clusters.is_empty() {
        for point in &scene.points {
            output.push_str(&format!("  • {} ({:.2}, {:.2})\n", point.id, point.x, point.y));
        }
        return output;
    }

    for cluster in &scene.clusters {
        output.push_str(&format!("{} ({} documents)\n", cluster.label, cluster.size));
        if let Some(c) = cluster.centroid {
            output.push_str(&format!("  centre: ({:.2}, {:.2})\n", c.x, c.y));
        }
        let outline = match &cluster.boundary {
            Boundary::Polygon(points) => format!("{} vertices", points.len()),
            Boundary::TooFewPoints => "none (fewer than 3 documents)".to_string(),
            Boundary::Degenerate => "none (points span no area)".to_string(),
        };
        output.push_str(&format!("  outline: {}\n", outline));

        let members: Vec<_> = scene
            .points
            .iter()
            .filter(|p| p.cluster == Some(cluster.cluster))
            .collect();
        for (i, point) in members.iter().enumerate() {
            let prefix = if i == members.len() - 1 { "└──" } else { "├──" };
            output.push_str(&format!("  {} {}\n", prefix, point.id));
        }
        output.push('\n');
    }

    output
}
