//! Pie chart geometry: turns ordered summary rows into a draw-plan.
//!
//! No charting library is involved. The slice angles, label positions and
//! legend lines are computed here in one pass over the rows; a platform
//! renderer (HTML canvas, SVG, a test) just replays the plan. Chart and
//! legend are built from the same iteration, so their order and color
//! mapping cannot diverge.

use crate::routes::chart::{ChartSlice, ChartSurface, LegendRow, PieChartData};
use crate::routes::summary::SummaryRow;

/// Fixed pastel palette, indexed `row_index % len`. Colors repeat for long
/// row lists; two renders of the same rows always match.
pub const PASTEL_PALETTE: [&str; 8] = [
    "#E6E0FF", // lavender
    "#DFF5E1", // mint
    "#E0F2FF", // sky
    "#FFF4D6", // butter
    "#FFE3E8", // blush
    "#E0FFF4", // seafoam
    "#F3E8FF", // lilac
    "#FFEBD6", // peach
];

/// Gap between the circle and the surface edge so the pie never clips.
pub const CHART_MARGIN_PX: f64 = 16.0;

/// Labels sit at this fraction of the radius, inside the slice body for
/// typical distributions. Thin slices may overlap; accepted, no collision
/// avoidance.
pub const LABEL_RADIUS_FACTOR: f64 = 0.65;

/// Slices start at twelve o'clock and proceed clockwise.
const START_ANGLE_DEG: f64 = -90.0;

/// Hex color for a row position.
pub fn palette_color(index: usize) -> &'static str {
    PASTEL_PALETTE[index % PASTEL_PALETTE.len()]
}

/// Compute the full draw-plan for `rows` on `surface`.
///
/// Rows are consumed in the order given; the renderer never re-sorts, so the
/// aggregator's ordering (and its tie-break) carries through to the chart
/// and legend. A zero total produces an empty plan: no slices, empty legend.
pub fn compute_pie_chart(rows: &[SummaryRow], surface: ChartSurface) -> PieChartData {
    let center_x = f64::from(surface.width) / 2.0;
    let center_y = f64::from(surface.height) / 2.0;
    let radius = (center_x.min(center_y) - CHART_MARGIN_PX).max(0.0);

    let total: u64 = rows.iter().map(|r| r.total_minutes).sum();

    let mut plan = PieChartData {
        surface,
        center_x,
        center_y,
        radius,
        total_minutes: total,
        slices: Vec::new(),
        legend: Vec::new(),
    };

    if total == 0 {
        // Nothing to draw: a full-circle artifact for zero data would be
        // uninformative, and the division below would be undefined.
        return plan;
    }

    let mut start_angle = START_ANGLE_DEG;
    for (index, row) in rows.iter().enumerate() {
        let share = row.total_minutes as f64 / total as f64;
        let sweep = share * 360.0;
        let percent = (share * 100.0).round() as u32;
        let color_index = index % PASTEL_PALETTE.len();

        let mid_angle_rad = (start_angle + sweep / 2.0).to_radians();
        let label_radius = radius * LABEL_RADIUS_FACTOR;
        let label_x = center_x + label_radius * mid_angle_rad.cos();
        let label_y = center_y + label_radius * mid_angle_rad.sin();

        plan.slices.push(ChartSlice {
            label: row.label.clone(),
            value: row.total_minutes,
            start_angle_deg: start_angle,
            sweep_angle_deg: sweep,
            color_index,
            percent,
            label_text: format!("{} {}%", row.label, percent),
            label_x,
            label_y,
        });
        plan.legend.push(LegendRow {
            label: row.label.clone(),
            minutes: row.total_minutes,
            percent,
            color_index,
            text: format!("{} — {} min ({}%)", row.label, row.total_minutes, percent),
        });

        start_angle += sweep;
    }

    plan
}

#[cfg(test)]
#[path = "pie_chart_tests.rs"]
mod pie_chart_tests;
