//! Confusion matrix rendering.
//!
//! Draws a heatmap of a confusion matrix to a PNG file, optionally
//! row-normalized so each true class shows recall fractions instead of raw
//! counts.

use std::path::Path;

use plotters::prelude::*;

use crate::error::{EspectroError, Result};
use crate::metrics::normalize_confusion;
use crate::primitives::Matrix;

const CELL_SIZE: usize = 90;
const MARGIN_LEFT: usize = 170;
const MARGIN_TOP: usize = 110;
const MARGIN_BOTTOM: usize = 90;
const MARGIN_RIGHT: usize = 40;

fn draw_err<E: std::fmt::Display>(e: E) -> EspectroError {
    EspectroError::Other(format!("plot rendering failed: {e}"))
}

/// Renders a confusion matrix heatmap to `path` as a PNG.
///
/// Rows are true classes, columns predicted classes. With `normalize` the
/// cells show row fractions formatted as `0.00`; otherwise raw counts.
/// Darker cells carry larger values and their text flips to white for
/// contrast.
///
/// # Errors
///
/// Returns an error when the matrix is empty or not square, or when the
/// backend cannot write the file.
pub fn plot_confusion_matrix<P: AsRef<Path>>(
    cm: &Matrix<usize>,
    class_names: &[String],
    normalize: bool,
    path: P,
) -> Result<()> {
    let (rows, cols) = cm.shape();
    if rows == 0 || rows != cols {
        return Err(EspectroError::DimensionMismatch {
            expected: "square non-empty confusion matrix".to_string(),
            actual: format!("{rows}x{cols}"),
        });
    }

    let values = if normalize {
        normalize_confusion(cm)
    } else {
        let data = (0..rows)
            .flat_map(|i| (0..cols).map(move |j| (i, j)))
            .map(|(i, j)| cm.get(i, j) as f32)
            .collect();
        Matrix::from_vec(rows, cols, data).map_err(|e| EspectroError::Other(e.to_string()))?
    };

    let max_value = (0..rows)
        .flat_map(|i| (0..cols).map(move |j| (i, j)))
        .map(|(i, j)| values.get(i, j))
        .fold(0.0f32, f32::max)
        .max(f32::EPSILON);

    let width = (MARGIN_LEFT + cols * CELL_SIZE + MARGIN_RIGHT) as u32;
    let height = (MARGIN_TOP + rows * CELL_SIZE + MARGIN_BOTTOM) as u32;

    let root = BitMapBackend::new(path.as_ref(), (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    root.draw_text(
        "Confusion Matrix",
        &TextStyle::from(("sans-serif", 32).into_font()).color(&BLACK),
        ((width / 2) as i32 - 110, 20),
    )
    .map_err(draw_err)?;

    for i in 0..rows {
        for j in 0..cols {
            let x = (MARGIN_LEFT + j * CELL_SIZE) as i32;
            let y = (MARGIN_TOP + i * CELL_SIZE) as i32;
            let value = values.get(i, j);

            // Blue ramp: white for zero, saturated blue at the maximum.
            let intensity = (value / max_value * 220.0) as u8;
            let fill = RGBColor(255 - intensity, 255 - intensity, 255);

            let cell = [(x, y), (x + CELL_SIZE as i32, y + CELL_SIZE as i32)];
            root.draw(&Rectangle::new(cell, fill.filled())).map_err(draw_err)?;
            root.draw(&Rectangle::new(cell, BLACK.stroke_width(1))).map_err(draw_err)?;

            let text = if normalize {
                format!("{value:.2}")
            } else {
                format!("{}", cm.get(i, j))
            };
            let text_color = if value > max_value / 2.0 { &WHITE } else { &BLACK };
            let style = TextStyle::from(("sans-serif", 18).into_font()).color(text_color);
            root.draw_text(
                &text,
                &style,
                (x + CELL_SIZE as i32 / 2 - 16, y + CELL_SIZE as i32 / 2 - 8),
            )
            .map_err(draw_err)?;
        }
    }

    let label_style = TextStyle::from(("sans-serif", 18).into_font()).color(&BLACK);

    root.draw_text(
        "True label",
        &label_style,
        (10, (MARGIN_TOP + rows * CELL_SIZE / 2) as i32),
    )
    .map_err(draw_err)?;
    root.draw_text(
        "Predicted label",
        &label_style,
        (
            (MARGIN_LEFT + cols * CELL_SIZE / 2 - 50) as i32,
            (MARGIN_TOP + rows * CELL_SIZE + 55) as i32,
        ),
    )
    .map_err(draw_err)?;

    for i in 0..rows {
        let fallback = i.to_string();
        let name = class_names.get(i).map_or(fallback.as_str(), String::as_str);
        // Long class names get clipped to the label gutter.
        let shown: String = name.chars().take(14).collect();

        root.draw_text(
            &shown,
            &label_style,
            (30, (MARGIN_TOP + i * CELL_SIZE + CELL_SIZE / 2 - 8) as i32),
        )
        .map_err(draw_err)?;
        root.draw_text(
            &shown,
            &label_style,
            (
                (MARGIN_LEFT + i * CELL_SIZE + 8) as i32,
                (MARGIN_TOP + rows * CELL_SIZE + 15) as i32,
            ),
        )
        .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;
    Ok(())
}
