use super::Scene;
use crate::geometry::Boundary;

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 900.0;
const MARGIN: f64 = 60.0;
const POINT_RADIUS: f64 = 5.0;
/// Annotation sizes are in points; SVG text is in pixels
const PT_TO_PX: f64 = 1.4;

/// Qualitative 20-colour palette (matplotlib tab20)
const PALETTE: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];
const UNCLUSTERED: &str = "#4682b4";

fn cluster_color(cluster: usize) -> &'static str {
    PALETTE[cluster % PALETTE.len()]
}

/// Maps scene coordinates into the drawing area, flipping y
struct Viewport {
    min_x: f64,
    min_y: f64,
    scale: f64,
}

impl Viewport {
    fn fit(scene: &Scene) -> Self {
        let xs = scene.points.iter().map(|p| p.x);
        let ys = scene.points.iter().map(|p| p.y);
        let (min_x, max_x) = bounds(xs);
        let (min_y, max_y) = bounds(ys);
        let span = (max_x - min_x).max(max_y - min_y);
        let scale = if span > 0.0 {
            ((WIDTH - 2.0 * MARGIN) / (max_x - min_x).max(f64::MIN_POSITIVE))
                .min((HEIGHT - 2.0 * MARGIN) / (max_y - min_y).max(f64::MIN_POSITIVE))
        } else {
            1.0
        };
        Self {
            min_x,
            min_y,
            scale,
        }
    }

    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        (
            MARGIN + (x - self.min_x) * self.scale,
            HEIGHT - MARGIN - (y - self.min_y) * self.scale,
        )
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo.is_finite() {
        (lo, hi)
    } else {
        (0.0, 0.0)
    }
}

/// Render a scene as a standalone SVG document
pub fn render(scene: &Scene) -> String {
    let view = Viewport::fit(scene);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
        w = WIDTH,
        h = HEIGHT
    ));
    svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"36\" font-family=\"sans-serif\" font-size=\"22\" text-anchor=\"middle\">{}</text>\n",
        WIDTH / 2.0,
        escape(&scene.title)
    ));

    // Outlines first so points sit on top
    for cluster in &scene.clusters {
        if let Boundary::Polygon(polygon) = &cluster.boundary {
            let path: Vec<String> = polygon
                .iter()
                .map(|p| {
                    let (x, y) = view.map(p.x, p.y);
                    format!("{:.2},{:.2}", x, y)
                })
                .collect();
            let color = cluster_color(cluster.cluster);
            svg.push_str(&format!(
                "  <polygon points=\"{}\" fill=\"{c}\" fill-opacity=\"0.25\" stroke=\"{c}\" stroke-width=\"2\"/>\n",
                path.join(" "),
                c = color
            ));
        }
    }

    for point in &scene.points {
        let (x, y) = view.map(point.x, point.y);
        let color = point.cluster.map(cluster_color).unwrap_or(UNCLUSTERED);
        svg.push_str(&format!(
            "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{}\" fill=\"{}\" fill-opacity=\"0.8\" stroke=\"black\" stroke-width=\"0.5\"><title>{}</title></circle>\n",
            x,
            y,
            POINT_RADIUS,
            color,
            escape(&point.id)
        ));
    }

    for cluster in &scene.clusters {
        let Some(centre) = cluster.centroid else {
            continue;
        };
        let (x, y) = view.map(centre.x, centre.y);
        let size = cluster.font_size * PT_TO_PX;
        let width = cluster.label.chars().count() as f64 * size * 0.6 + size;
        let height = size * 1.8;
        svg.push_str(&format!(
            "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"6\" fill=\"white\" fill-opacity=\"0.9\" stroke=\"{}\" stroke-width=\"2\"/>\n",
            x - width / 2.0,
            y - height / 2.0,
            width,
            height,
            cluster_color(cluster.cluster)
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.2}\" y=\"{:.2}\" font-family=\"sans-serif\" font-size=\"{:.1}\" font-weight=\"bold\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>\n",
            x,
            y,
            size,
            escape(&cluster.label)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
