//! ASCII histogram for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - bars: `#`
//! - vertical markers (mean, late threshold, ...): their own symbol, drawn on
//!   empty cells and on the axis row so they stay visible behind tall bars

/// A labelled vertical line across the histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub value: f64,
    pub symbol: char,
    pub label: String,
}

impl Marker {
    pub fn new(value: f64, symbol: char, label: impl Into<String>) -> Self {
        Self {
            value,
            symbol,
            label: label.into(),
        }
    }
}

/// Standard markers for a commute histogram: the mean (`|`) and, when
/// configured, the late threshold (`!`).
pub fn commute_markers(mean: f64, late_threshold: Option<f64>) -> Vec<Marker> {
    let mut markers = vec![Marker::new(mean, '|', "mean")];
    if let Some(t) = late_threshold {
        markers.push(Marker::new(t, '!', "late"));
    }
    markers
}

/// Render a histogram of `values` into `bins` equal-width bins.
///
/// `width` is rounded down to a multiple of `bins` (at least one column per
/// bin); `height` is the number of bar rows.
pub fn render_histogram(
    values: &[f64],
    bins: usize,
    width: usize,
    height: usize,
    markers: &[Marker],
) -> String {
    let bins = bins.max(1);
    let col_width = (width / bins).max(1);
    let width = col_width * bins;
    let height = height.max(2);

    let (x_min, x_max) = value_range(values, markers).unwrap_or((0.0, 1.0));
    let counts = bin_counts(values, bins, x_min, x_max);
    let max_count = counts.iter().copied().max().unwrap_or(0);

    let mut grid = vec![vec![' '; width]; height];
    if max_count > 0 {
        for (b, &count) in counts.iter().enumerate() {
            let bar = (count * height).div_ceil(max_count);
            for row in &mut grid[height - bar..] {
                for cell in &mut row[b * col_width..(b + 1) * col_width] {
                    *cell = '#';
                }
            }
        }
    }

    let mut axis = vec!['-'; width];
    for m in markers.iter().filter(|m| m.value.is_finite()) {
        let x = map_x(m.value, x_min, x_max, width);
        for row in grid.iter_mut() {
            if row[x] == ' ' {
                row[x] = m.symbol;
            }
        }
        axis[x] = m.symbol;
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Histogram: x=[{x_min:.2}, {x_max:.2}] | bins={bins} | max count={max_count}\n"
    ));
    if !markers.is_empty() {
        let legend: Vec<String> = markers
            .iter()
            .map(|m| format!("{} {}={:.2}", m.symbol, m.label, m.value))
            .collect();
        out.push_str(&format!("Markers: {}\n", legend.join("  ")));
    }

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str(&axis.into_iter().collect::<String>());
    out.push('\n');

    out
}

fn value_range(values: &[f64], markers: &[Marker]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let all = values.iter().copied().chain(markers.iter().map(|m| m.value));
    for x in all.filter(|x| x.is_finite()) {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }

    if !(min_x.is_finite() && max_x.is_finite()) {
        return None;
    }
    if max_x > min_x {
        Some((min_x, max_x))
    } else {
        Some((min_x - 0.5, max_x + 0.5))
    }
}

fn bin_counts(values: &[f64], bins: usize, x_min: f64, x_max: f64) -> Vec<usize> {
    let mut counts = vec![0; bins];
    let span = x_max - x_min;
    for &v in values.iter().filter(|v| v.is_finite()) {
        let u = ((v - x_min) / span).clamp(0.0, 1.0);
        let idx = ((u * bins as f64).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let last = width.saturating_sub(1);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    ((u * last as f64).round() as usize).min(last)
}
