use serde::{Deserialize, Serialize};

// =========================================================
// Pie chart draw-plan types
// =========================================================
//
// The chart is computed server-side as a structured draw-plan: ordered slice
// geometries plus legend rows. A thin platform renderer (canvas, SVG, ...)
// executes the plan without re-deriving any geometry, so chart and legend can
// never diverge.

/// Pixel dimensions of the drawing surface the plan targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSurface {
    pub width: u32,
    pub height: u32,
}

/// One wedge of the pie.
///
/// Angles are in degrees and follow canvas conventions: 0 at three o'clock,
/// positive clockwise with the y axis pointing down. Slices start at -90
/// (twelve o'clock) and are allocated clockwise in row order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSlice {
    pub label: String,
    pub value: u64,
    pub start_angle_deg: f64,
    pub sweep_angle_deg: f64,
    /// Index into [`PASTEL_PALETTE`](crate::services::pie_chart::PASTEL_PALETTE),
    /// already reduced modulo the palette length.
    pub color_index: usize,
    /// Share of the total, rounded to the nearest integer percent.
    pub percent: u32,
    /// Text drawn centered inside the slice body.
    pub label_text: String,
    pub label_x: f64,
    pub label_y: f64,
}

/// One legend line, same order and color mapping as the slices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegendRow {
    pub label: String,
    pub minutes: u64,
    pub percent: u32,
    pub color_index: usize,
    /// Preformatted `label — minutes min (percent%)` line.
    pub text: String,
}

/// Complete draw-plan for one pie chart.
///
/// When the total value is zero both `slices` and `legend` are empty and a
/// renderer draws nothing; the circle geometry is still reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieChartData {
    pub surface: ChartSurface,
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub total_minutes: u64,
    pub slices: Vec<ChartSlice>,
    pub legend: Vec<LegendRow>,
}

/// Route function name constant for pie chart data
pub const GET_PIE_CHART_DATA: &str = "get_pie_chart_data";
