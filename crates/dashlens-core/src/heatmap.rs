//! Heatmap renderer.
//!
//! Cell colors are relative to the whole matrix: min and max are taken once
//! over every cell, so equal values get equal colors regardless of row or
//! column. Text on each cell is black or white depending on the luminance of
//! its fill.

use serde::{Deserialize, Serialize};

use crate::color::{ColorScale, TextColor, ValueRange, contrast_text};
use crate::error::{MatrixAxis, Result, VizError};
use crate::helpers::format_number;
use crate::surface::{Node, Surface};

/// Rectangular matrix with one label per row and per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatMatrix {
    values: Vec<Vec<f64>>,
    row_labels: Vec<String>,
    col_labels: Vec<String>,
}

impl HeatMatrix {
    pub fn new(values: Vec<Vec<f64>>, row_labels: Vec<String>, col_labels: Vec<String>) -> Result<Self> {
        if values.len() != row_labels.len() {
            return Err(VizError::MissingMatrixLabels {
                axis: MatrixAxis::Rows,
                expected: values.len(),
                found: row_labels.len(),
            });
        }
        if let Some(row) = values.iter().find(|r| r.len() != col_labels.len()) {
            return Err(VizError::MissingMatrixLabels {
                axis: MatrixAxis::Columns,
                expected: row.len(),
                found: col_labels.len(),
            });
        }
        Ok(Self {
            values,
            row_labels,
            col_labels,
        })
    }

    pub fn rows(&self) -> usize {
        self.values.len()
    }

    pub fn cols(&self) -> usize {
        self.col_labels.len()
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    /// Range over every cell of the matrix.
    pub fn range(&self) -> Option<ValueRange> {
        ValueRange::of(self.values.iter().flatten())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapOptions {
    /// Gradient stops; the palette default when absent.
    pub color_scale: Option<Vec<String>>,
    /// Suffix appended to values in cell descriptions (e.g. `"%"`).
    pub unit: Option<String>,
    pub show_values: bool,
    pub cell_size_px: u32,
    pub title: Option<String>,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            color_scale: None,
            unit: None,
            show_values: true,
            cell_size_px: 48,
            title: None,
        }
    }
}

/// One rendered cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    pub row: usize,
    pub col: usize,
    pub value: f64,
    pub fill: String,
    pub text_color: TextColor,
    /// Accessible description: row label, column label, value and unit.
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapGrid {
    pub cells: Vec<Vec<HeatCell>>,
    pub range: Option<ValueRange>,
}

/// Color every cell of `matrix` along `scale`.
pub fn layout_heatmap(matrix: &HeatMatrix, scale: &ColorScale, unit: Option<&str>) -> HeatmapGrid {
    let range = matrix.range();
    let unit = unit.unwrap_or("");
    let cells = matrix
        .values
        .iter()
        .enumerate()
        .map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(|(c, &value)| {
                    let normalized = range.map_or(0.0, |rg| rg.normalize(value));
                    let (fill, rgb) = scale.resolve(normalized);
                    HeatCell {
                        row: r,
                        col: c,
                        value,
                        fill,
                        text_color: contrast_text(rgb),
                        description: format!(
                            "{}, {}: {}{unit}",
                            matrix.row_labels[r],
                            matrix.col_labels[c],
                            format_number(value)
                        ),
                    }
                })
                .collect()
        })
        .collect();
    HeatmapGrid { cells, range }
}

/// Render `matrix` into `container_id`, replacing whatever was there.
pub fn render_heatmap<S: Surface + ?Sized>(
    surface: &mut S,
    container_id: &str,
    matrix: &HeatMatrix,
    options: &HeatmapOptions,
    default_scale: &[String],
) -> Result<HeatmapGrid> {
    if !surface.contains(container_id) {
        return Err(VizError::ElementNotFound(container_id.to_string()));
    }
    let stops = options.color_scale.as_deref().unwrap_or(default_scale);
    let scale = ColorScale::new(stops)?;
    let grid = layout_heatmap(matrix, &scale, options.unit.as_deref());

    let size = options.cell_size_px;
    let mut table = Node::new("div")
        .class("heatmap-grid")
        .attr("role", "grid")
        .style("display", "grid")
        .style(
            "grid-template-columns",
            format!("auto repeat({}, {size}px)", matrix.cols()),
        );

    table = table.child(Node::new("div").class("heatmap-corner"));
    for label in &matrix.col_labels {
        table = table.child(
            Node::new("div")
                .class("heatmap-col-label")
                .attr("role", "columnheader")
                .text(label.clone()),
        );
    }
    for (r, row) in grid.cells.iter().enumerate() {
        table = table.child(
            Node::new("div")
                .class("heatmap-row-label")
                .attr("role", "rowheader")
                .text(matrix.row_labels[r].clone()),
        );
        for cell in row {
            let mut node = Node::new("div")
                .class("heatmap-cell")
                .attr("role", "gridcell")
                .attr("aria-label", cell.description.clone())
                .attr("data-value", format_number(cell.value))
                .style("background-color", cell.fill.clone())
                .style("color", cell.text_color.css())
                .style("height", format!("{size}px"));
            if options.show_values {
                node = node.text(format_number(cell.value));
            }
            table = table.child(node);
        }
    }

    let mut nodes = Vec::new();
    if let Some(title) = &options.title {
        nodes.push(Node::new("h4").class("heatmap-title").text(title.clone()));
    }
    nodes.push(table);
    surface.replace_children(container_id, nodes)?;
    log::debug!(
        "heatmap #{container_id}: {}x{} cells",
        matrix.rows(),
        matrix.cols()
    );
    Ok(grid)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySurface;

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn scale() -> ColorScale {
        ColorScale::new(&["#ffffff", "#000000"]).unwrap()
    }

    #[test]
    fn row_label_mismatch_is_reported() {
        let err = HeatMatrix::new(vec![vec![1.0], vec![2.0]], labels(&["a"]), labels(&["x"])).unwrap_err();
        assert!(matches!(
            err,
            VizError::MissingMatrixLabels {
                axis: MatrixAxis::Rows,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn ragged_rows_are_reported_against_column_labels() {
        let err = HeatMatrix::new(
            vec![vec![1.0, 2.0], vec![3.0]],
            labels(&["a", "b"]),
            labels(&["x", "y"]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            VizError::MissingMatrixLabels {
                axis: MatrixAxis::Columns,
                ..
            }
        ));
    }

    #[test]
    fn colors_are_relative_to_whole_matrix() {
        // Row 0 spans 0..1, row 1 spans 9..10. Per-row scaling would make
        // both rows identical; global scaling must not.
        let m = HeatMatrix::new(
            vec![vec![0.0, 1.0], vec![9.0, 10.0]],
            labels(&["low", "high"]),
            labels(&["a", "b"]),
        )
        .unwrap();
        let g = layout_heatmap(&m, &scale(), None);
        assert_eq!(g.cells[0][0].fill, "#ffffff");
        assert_eq!(g.cells[1][1].fill, "#000000");
        assert_ne!(g.cells[0][1].fill, g.cells[1][1].fill);
        assert_eq!(g.cells[0][0].text_color, TextColor::Black);
        assert_eq!(g.cells[1][1].text_color, TextColor::White);
    }

    #[test]
    fn constant_matrix_uses_first_stop_everywhere() {
        let m = HeatMatrix::new(
            vec![vec![7.0, 7.0], vec![7.0, 7.0]],
            labels(&["a", "b"]),
            labels(&["x", "y"]),
        )
        .unwrap();
        let g = layout_heatmap(&m, &scale(), None);
        assert!(g.cells.iter().flatten().all(|c| c.fill == "#ffffff"));
    }

    #[test]
    fn descriptions_carry_labels_and_unit() {
        let m = HeatMatrix::new(vec![vec![0.5]], labels(&["North"]), labels(&["Q1"])).unwrap();
        let g = layout_heatmap(&m, &scale(), Some("%"));
        assert_eq!(g.cells[0][0].description, "North, Q1: 0.5%");
    }

    #[test]
    fn rerender_replaces_previous_content() {
        let mut s = MemorySurface::with_markup(vec![Node::new("div").id("hm")]);
        let m = HeatMatrix::new(vec![vec![1.0, 2.0]], labels(&["r"]), labels(&["a", "b"])).unwrap();
        let defaults = labels(&["#fff", "#000"]);
        render_heatmap(&mut s, "hm", &m, &HeatmapOptions::default(), &defaults).unwrap();
        render_heatmap(&mut s, "hm", &m, &HeatmapOptions::default(), &defaults).unwrap();
        let hm = s.node("hm").unwrap();
        assert_eq!(hm.children.len(), 1);
        assert_eq!(hm.ids_with_class("heatmap-cell").len(), 2);
    }

    #[test]
    fn bad_scale_fails_before_touching_container() {
        let mut s = MemorySurface::with_markup(vec![Node::new("div").id("hm").text("keep")]);
        let m = HeatMatrix::new(vec![vec![1.0]], labels(&["r"]), labels(&["c"])).unwrap();
        let opts = HeatmapOptions {
            color_scale: Some(labels(&["#fff", "nope"])),
            ..HeatmapOptions::default()
        };
        let err = render_heatmap(&mut s, "hm", &m, &opts, &[]).unwrap_err();
        assert!(matches!(err, VizError::InvalidColorFormat(_)));
        assert_eq!(s.text_content("hm").as_deref(), Some("keep"));
    }
}
