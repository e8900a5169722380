//! SVG bubble chart rendering.
//!
//! Lays out a categorical grid with species on the x-axis and tissues on
//! the y-axis, and draws one bubble per occupied cell. Bubble area follows
//! scatter-plot conventions: `size` is the marker area in points squared.

use crate::models::{BubbleColor, BubbleStyle, CategoryOrder, CellAggregate};
use svg::node::element::{Circle, Line, Rectangle, Text};
use svg::Document;

/// Marker area per observation, in points squared.
pub const SIZE_FACTOR: f64 = 100.0;

// 6 x 10 inch figure at 100 dpi.
const SVG_WIDTH: f64 = 600.0;
const SVG_HEIGHT: f64 = 1000.0;
const DPI: f64 = 100.0;
const PX_PER_PT: f64 = DPI / 72.0;

const PLOT_LEFT: f64 = SVG_WIDTH * 0.15;
const PLOT_RIGHT: f64 = SVG_WIDTH * 0.90;
const PLOT_TOP: f64 = SVG_HEIGHT * (1.0 - 0.88);
const PLOT_BOTTOM: f64 = SVG_HEIGHT * (1.0 - 0.20);

const AXIS_PADDING: f64 = 0.05;
const BUBBLE_OPACITY: f64 = 0.7;
const BUBBLE_EDGE_PT: f64 = 1.5;
const GRID_OPACITY: f64 = 0.6;
const TICK_LABEL_ROTATION: f64 = 45.0;

const FONT: &str = "DejaVu Sans, Helvetica, Arial, sans-serif";

/// Map a cell's counts to its bubble size and color.
///
/// Any up observation makes the bubble red, however many down observations
/// share the cell.
pub fn bubble_style(cell: &CellAggregate, size_factor: f64) -> BubbleStyle {
    let color = if cell.up_count > 0 {
        BubbleColor::Up
    } else {
        BubbleColor::Down
    };

    BubbleStyle {
        size: cell.total() as f64 * size_factor,
        color,
    }
}

/// Radius in pixels of a marker with the given area in points squared.
pub fn marker_radius(size: f64) -> f64 {
    size.max(0.0).sqrt() / 2.0 * PX_PER_PT
}

/// Maps category indices onto a pixel range with padding at both ends.
#[derive(Debug, Clone, Copy)]
struct CategoryScale {
    count: usize,
    start: f64,
    end: f64,
}

impl CategoryScale {
    fn new(count: usize, start: f64, end: f64) -> Self {
        Self { count, start, end }
    }

    fn position(&self, index: usize) -> f64 {
        let span = self.count.saturating_sub(1).max(1) as f64;
        let pad = span * AXIS_PADDING;
        let lo = -pad;
        let hi = self.count.saturating_sub(1) as f64 + pad;
        let hi = if hi > lo { hi } else { lo + 1.0 };
        self.start + (index as f64 - lo) / (hi - lo) * (self.end - self.start)
    }
}

fn text(content: impl Into<String>, x: f64, y: f64, size: u32) -> Text {
    Text::new(content)
        .set("x", x)
        .set("y", y)
        .set("font-family", FONT)
        .set("font-size", size)
        .set("fill", "#000000")
}

fn grid_line(x1: f64, y1: f64, x2: f64, y2: f64) -> Line {
    Line::new()
        .set("x1", x1)
        .set("y1", y1)
        .set("x2", x2)
        .set("y2", y2)
        .set("stroke", "#b0b0b0")
        .set("stroke-width", 0.8 * PX_PER_PT)
        .set("stroke-dasharray", "5,2")
        .set("opacity", GRID_OPACITY)
}

/// Render a gene's grid as an SVG document.
///
/// Cells whose species or tissue is not in `order` are not drawn. Empty
/// cells produce no marker.
pub fn render_svg(
    gene: &str,
    cells: &[CellAggregate],
    order: &CategoryOrder,
    size_factor: f64,
) -> String {
    let x_scale = CategoryScale::new(order.species.len(), PLOT_LEFT, PLOT_RIGHT);
    let y_scale = CategoryScale::new(order.tissues.len(), PLOT_BOTTOM, PLOT_TOP);

    let mut doc = Document::new()
        .set("viewBox", (0.0, 0.0, SVG_WIDTH, SVG_HEIGHT))
        .set("width", SVG_WIDTH)
        .set("height", SVG_HEIGHT)
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", SVG_WIDTH)
                .set("height", SVG_HEIGHT)
                .set("fill", "#ffffff"),
        );

    // Grid lines and tick labels, x-axis.
    for (idx, species) in order.species.iter().enumerate() {
        let x = x_scale.position(idx);
        let label_y = PLOT_BOTTOM + 16.0;
        doc = doc.add(grid_line(x, PLOT_TOP, x, PLOT_BOTTOM)).add(
            text(species.clone(), x, label_y, 12)
                .set("text-anchor", "end")
                .set(
                    "transform",
                    format!("rotate(-{} {:.2} {:.2})", TICK_LABEL_ROTATION, x, label_y),
                ),
        );
    }

    // Grid lines and tick labels, y-axis.
    for (idx, tissue) in order.tissues.iter().enumerate() {
        let y = y_scale.position(idx);
        let label_x = PLOT_LEFT - 8.0;
        doc = doc.add(grid_line(PLOT_LEFT, y, PLOT_RIGHT, y)).add(
            text(tissue.clone(), label_x, y + 4.0, 12)
                .set("text-anchor", "end")
                .set(
                    "transform",
                    format!("rotate(-{} {:.2} {:.2})", TICK_LABEL_ROTATION, label_x, y),
                ),
        );
    }

    for cell in cells {
        let style = bubble_style(cell, size_factor);
        if style.size <= 0.0 {
            continue;
        }

        let (Some(xi), Some(yi)) = (
            order.species.iter().position(|s| *s == cell.species),
            order.tissues.iter().position(|t| *t == cell.tissue),
        ) else {
            continue;
        };

        doc = doc.add(
            Circle::new()
                .set("cx", x_scale.position(xi))
                .set("cy", y_scale.position(yi))
                .set("r", marker_radius(style.size))
                .set("fill", style.color.css())
                .set("fill-opacity", BUBBLE_OPACITY)
                .set("stroke", "#000000")
                .set("stroke-opacity", BUBBLE_OPACITY)
                .set("stroke-width", BUBBLE_EDGE_PT * PX_PER_PT)
                .set("data-species", cell.species.clone())
                .set("data-tissue", cell.tissue.clone())
                .set("data-up", cell.up_count.to_string())
                .set("data-down", cell.down_count.to_string()),
        );
    }

    // Axes frame on top of the bubbles.
    doc = doc
        .add(
            Rectangle::new()
                .set("x", PLOT_LEFT)
                .set("y", PLOT_TOP)
                .set("width", PLOT_RIGHT - PLOT_LEFT)
                .set("height", PLOT_BOTTOM - PLOT_TOP)
                .set("fill", "none")
                .set("stroke", "#000000")
                .set("stroke-width", 0.8 * PX_PER_PT),
        )
        .add(
            text(
                format!("Gene Expression Regulation for {}", gene),
                (PLOT_LEFT + PLOT_RIGHT) / 2.0,
                PLOT_TOP - 12.0,
                16,
            )
            .set("text-anchor", "middle"),
        )
        .add(
            text(
                "Animal Species",
                (PLOT_LEFT + PLOT_RIGHT) / 2.0,
                SVG_HEIGHT - 30.0,
                14,
            )
            .set("text-anchor", "middle"),
        );

    let y_label_x = 18.0;
    let y_label_y = (PLOT_TOP + PLOT_BOTTOM) / 2.0;
    doc = doc.add(
        text("Tissue Type", y_label_x, y_label_y, 14)
            .set("text-anchor", "middle")
            .set(
                "transform",
                format!("rotate(-90 {:.2} {:.2})", y_label_x, y_label_y),
            ),
    );

    doc.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate_gene;
    use crate::config::default_catalog;

    fn cell(up_count: usize, down_count: usize) -> CellAggregate {
        CellAggregate {
            species: "Mus musculus".to_string(),
            tissue: "Muscle".to_string(),
            up_count,
            down_count,
        }
    }

    #[test]
    fn test_bubble_style_size() {
        assert_eq!(bubble_style(&cell(1, 0), SIZE_FACTOR).size, 100.0);
        assert_eq!(bubble_style(&cell(0, 2), SIZE_FACTOR).size, 200.0);
        assert_eq!(bubble_style(&cell(0, 0), SIZE_FACTOR).size, 0.0);
    }

    #[test]
    fn test_any_up_wins_color() {
        assert_eq!(bubble_style(&cell(1, 5), SIZE_FACTOR).color, BubbleColor::Up);
        assert_eq!(bubble_style(&cell(0, 5), SIZE_FACTOR).color, BubbleColor::Down);
        assert_eq!(bubble_style(&cell(0, 0), SIZE_FACTOR).color, BubbleColor::Down);
    }

    #[test]
    fn test_marker_radius() {
        assert_eq!(marker_radius(0.0), 0.0);
        let r = marker_radius(100.0);
        assert!((r - 5.0 * PX_PER_PT).abs() < 1e-9);
        assert!(marker_radius(400.0) > r);
    }

    #[test]
    fn test_scale_keeps_order_and_padding() {
        let x = CategoryScale::new(4, PLOT_LEFT, PLOT_RIGHT);
        assert!(x.position(0) > PLOT_LEFT);
        assert!(x.position(3) < PLOT_RIGHT);
        assert!(x.position(0) < x.position(1));

        // First tissue sits at the bottom of the plot.
        let y = CategoryScale::new(9, PLOT_BOTTOM, PLOT_TOP);
        assert!(y.position(0) > y.position(8));

        let single = CategoryScale::new(1, 0.0, 100.0);
        assert!((single.position(0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_sparc_chart() {
        let catalog = default_catalog();
        let grid = aggregate_gene(catalog.gene("SPARC").unwrap(), &catalog.order);
        let svg = render_svg(&grid.gene, &grid.cells, &catalog.order, SIZE_FACTOR);

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Gene Expression Regulation for SPARC"));
        assert!(svg.contains("Animal Species"));
        assert!(svg.contains("Tissue Type"));
        assert!(svg.contains("Canis lupus familiaris"));
        assert!(svg.contains("Reproductive"));

        let occupied = grid.cells.iter().filter(|c| !c.is_empty()).count();
        assert_eq!(svg.matches("<circle").count(), occupied);
        assert_eq!(svg.matches("fill=\"red\"").count(), 1);
        assert_eq!(svg.matches("fill=\"blue\"").count(), occupied - 1);
    }

    /// Rotation pivot `(x, y)` of the first `<text>` element holding `label`.
    fn label_anchor(svg: &str, label: &str) -> (f64, f64) {
        let end = svg.find(label).expect("label rendered");
        let start = svg[..end].rfind("<text").expect("label inside <text>");
        let element = &svg[start..end];
        let pivot = element
            .split("rotate(-45 ")
            .nth(1)
            .and_then(|rest| rest.split(')').next())
            .expect("rotated label");
        let mut coords = pivot.split_whitespace().map(|v| v.parse::<f64>().unwrap());
        (coords.next().unwrap(), coords.next().unwrap())
    }

    #[test]
    fn test_tick_labels_follow_category_order() {
        let catalog = default_catalog();
        let grid = aggregate_gene(catalog.gene("SPARC").unwrap(), &catalog.order);
        let svg = render_svg(&grid.gene, &grid.cells, &catalog.order, SIZE_FACTOR);

        let xs: Vec<f64> = catalog
            .order
            .species
            .iter()
            .map(|s| label_anchor(&svg, s).0)
            .collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]), "species x positions {:?}", xs);

        // Tissues climb from the bottom, so y shrinks along the ordering.
        let ys: Vec<f64> = catalog
            .order
            .tissues
            .iter()
            .map(|t| label_anchor(&svg, t).1)
            .collect();
        assert!(ys.windows(2).all(|w| w[0] > w[1]), "tissue y positions {:?}", ys);

        // Reversed species order moves the labels with it.
        let mut reversed = catalog.order.clone();
        reversed.species.reverse();
        let svg = render_svg(&grid.gene, &grid.cells, &reversed, SIZE_FACTOR);
        let first = label_anchor(&svg, "Canis lupus familiaris").0;
        let last = label_anchor(&svg, "Mus musculus").0;
        assert!(first < last);
    }

    #[test]
    fn test_render_is_deterministic() {
        let catalog = default_catalog();
        let grid = aggregate_gene(catalog.gene("CASP1").unwrap(), &catalog.order);
        let first = render_svg(&grid.gene, &grid.cells, &catalog.order, SIZE_FACTOR);
        let second = render_svg(&grid.gene, &grid.cells, &catalog.order, SIZE_FACTOR);
        assert_eq!(first, second);
    }
}
