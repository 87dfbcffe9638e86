//! Chart rendering on top of the [`plotters`] bitmap backend.
//!
//! All charts are 1000x600 PNG files. The bitmap backend composes the figure
//! in memory and only encodes the file on `present`, so a failed render does
//! not leave a partial image behind.

use std::path::Path;

use log::debug;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

use crate::analysis::aggregate::OutcomeShare;
use crate::analysis::table::{OUTCOME_AVERAGE, OUTCOME_QUOTIENT};
use crate::analysis::{AnalysisError, AnalysisResult};

const CHART_SIZE: (u32, u32) = (1000, 600);
const AGE_BINS: usize = 15;
// Vertical axis reaches 1.2x the tallest bar so the annotations fit.
const HEADROOM: f64 = 1.2;

const BAR_BLUE: RGBColor = RGBColor(65, 105, 225);
const HIST_PURPLE: RGBColor = RGBColor(128, 0, 128);
const AVERAGE_ORANGE: RGBColor = RGBColor(255, 165, 0);

fn draw_err(path: &Path, e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::Drawing {
        message: e.to_string(),
        path: path.display().to_string(),
    }
}

fn annotation_style(size: u32) -> TextStyle<'static> {
    ("sans-serif", size)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom))
}

/// One labeled bar per category, with the count written above non-zero bars.
pub fn bar_chart(counts: &[(String, u64)], title: &str, path: &Path) -> AnalysisResult<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_err(path, e))?;

    if counts.is_empty() {
        root.present().map_err(|e| draw_err(path, e))?;
        debug!("bar_chart: no data for {:?}", path);
        return Ok(());
    }

    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let y_max = (max as f64 * HEADROOM).max(1.0);
    let labels: Vec<&str> = counts.iter().map(|(k, _)| k.as_str()).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(150)
        .y_label_area_size(60)
        .build_cartesian_2d((0..counts.len()).into_segmented(), 0f64..y_max)
        .map_err(|e| draw_err(path, e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(counts.len())
        .x_desc("Categorias")
        .y_desc("Quantidade")
        .x_label_style(
            ("sans-serif", 14)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) if *i < labels.len() => labels[*i].to_string(),
            _ => String::new(),
        })
        .draw()
        .map_err(|e| draw_err(path, e))?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, (_, c))| {
            Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0.0),
                    (SegmentValue::Exact(i + 1), *c as f64),
                ],
                BAR_BLUE.filled(),
            )
        }))
        .map_err(|e| draw_err(path, e))?;

    chart
        .draw_series(
            counts
                .iter()
                .enumerate()
                .filter(|(_, (_, c))| *c > 0)
                .map(|(i, (_, c))| {
                    Text::new(
                        c.to_string(),
                        (SegmentValue::CenterOf(i), *c as f64 + y_max * 0.01),
                        annotation_style(16),
                    )
                }),
        )
        .map_err(|e| draw_err(path, e))?;

    root.present().map_err(|e| draw_err(path, e))?;
    debug!("bar_chart: wrote {:?}", path);
    Ok(())
}

/// Buckets the age distribution into `bins` equal-width bins.
///
/// Returns the lower bound, the bin width and the weighted count per bin.
/// `age_counts` must be sorted by age, as produced by the aggregator.
fn bin_ages(age_counts: &[(u32, u64)], bins: usize) -> Option<(f64, f64, Vec<u64>)> {
    let min = age_counts.first()?.0 as f64;
    let max = age_counts.last()?.0 as f64;
    let span = (max - min).max(1.0);
    let width = span / bins as f64;

    let mut counts = vec![0u64; bins];
    for (age, count) in age_counts {
        let idx = (((*age as f64 - min) / width) as usize).min(bins - 1);
        counts[idx] += count;
    }
    Some((min, width, counts))
}

/// A Gaussian-kernel density over the weighted ages, scaled to the bin-count
/// axis so it overlays the histogram bars.
fn density_overlay(age_counts: &[(u32, u64)], min: f64, width: f64, bins: usize) -> Vec<(f64, f64)> {
    let n: u64 = age_counts.iter().map(|(_, c)| c).sum();
    if n == 0 {
        return Vec::new();
    }
    let nf = n as f64;
    let mean = age_counts
        .iter()
        .map(|(a, c)| *a as f64 * *c as f64)
        .sum::<f64>()
        / nf;
    let var = age_counts
        .iter()
        .map(|(a, c)| *c as f64 * (*a as f64 - mean).powi(2))
        .sum::<f64>()
        / nf;
    // Scott's rule, floored so a degenerate sample still gets a finite kernel.
    let bandwidth = (var.sqrt() * nf.powf(-0.2)).max(0.5);

    let span = width * bins as f64;
    let norm = width / (bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    (0..=100)
        .map(|step| {
            let x = min + span * step as f64 / 100.0;
            let y = age_counts
                .iter()
                .map(|(a, c)| {
                    let z = (x - *a as f64) / bandwidth;
                    *c as f64 * (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            (x, y)
        })
        .collect()
}

/// Weighted age histogram over 15 bins with a smoothed density overlay.
pub fn age_histogram(age_counts: &[(u32, u64)], title: &str, path: &Path) -> AnalysisResult<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_err(path, e))?;

    let (min, width, bins) = match bin_ages(age_counts, AGE_BINS) {
        Some(b) => b,
        None => {
            root.present().map_err(|e| draw_err(path, e))?;
            debug!("age_histogram: no data for {:?}", path);
            return Ok(());
        }
    };
    let y_max = (*bins.iter().max().unwrap_or(&0) as f64 * HEADROOM).max(1.0);
    let x_max = min + width * AGE_BINS as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(min..x_max, 0f64..y_max)
        .map_err(|e| draw_err(path, e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Idade")
        .y_desc("Frequência")
        .draw()
        .map_err(|e| draw_err(path, e))?;

    chart
        .draw_series(bins.iter().enumerate().map(|(i, c)| {
            let x0 = min + width * i as f64;
            Rectangle::new(
                [(x0, 0.0), (x0 + width, *c as f64)],
                HIST_PURPLE.mix(0.5).filled(),
            )
        }))
        .map_err(|e| draw_err(path, e))?;

    chart
        .draw_series(LineSeries::new(
            density_overlay(age_counts, min, width, AGE_BINS),
            HIST_PURPLE.stroke_width(2),
        ))
        .map_err(|e| draw_err(path, e))?;

    root.present().map_err(|e| draw_err(path, e))?;
    debug!("age_histogram: wrote {:?}", path);
    Ok(())
}

/// Two bars per tier, one per election mode, annotated with one-decimal
/// percentages. The legend sits in a strip above the plot area.
pub fn outcome_share_chart(shares: &[OutcomeShare], path: &Path) -> AnalysisResult<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_err(path, e))?;

    let (legend, plot) = root.split_vertically(50);
    legend
        .draw(&Rectangle::new([(250, 15), (270, 35)], BAR_BLUE.filled()))
        .map_err(|e| draw_err(path, e))?;
    legend
        .draw(&Text::new(OUTCOME_QUOTIENT, (278, 18), ("sans-serif", 18)))
        .map_err(|e| draw_err(path, e))?;
    legend
        .draw(&Rectangle::new(
            [(470, 15), (490, 35)],
            AVERAGE_ORANGE.filled(),
        ))
        .map_err(|e| draw_err(path, e))?;
    legend
        .draw(&Text::new(OUTCOME_AVERAGE, (498, 18), ("sans-serif", 18)))
        .map_err(|e| draw_err(path, e))?;

    let max = shares
        .iter()
        .flat_map(|s| [s.pct_quotient, s.pct_average])
        .fold(0f64, f64::max);
    let y_max = (max * HEADROOM).max(1.0);

    let mut chart = ChartBuilder::on(&plot)
        .caption("Proporção de Eleitas por QP e por Média", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..2 * shares.len()).into_segmented(), 0f64..y_max)
        .map_err(|e| draw_err(path, e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(2 * shares.len())
        .y_desc("Percentual (%)")
        // The tier name goes under the first bar of its pair.
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(j) if j % 2 == 0 && j / 2 < shares.len() => {
                shares[j / 2].tier.title().to_string()
            }
            _ => String::new(),
        })
        .draw()
        .map_err(|e| draw_err(path, e))?;

    chart
        .draw_series(shares.iter().enumerate().map(|(i, share)| {
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(2 * i), 0.0),
                    (SegmentValue::Exact(2 * i + 1), share.pct_quotient),
                ],
                BAR_BLUE.filled(),
            );
            bar.set_margin(0, 0, 4, 4);
            bar
        }))
        .map_err(|e| draw_err(path, e))?;
    chart
        .draw_series(shares.iter().enumerate().map(|(i, share)| {
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(2 * i + 1), 0.0),
                    (SegmentValue::Exact(2 * i + 2), share.pct_average),
                ],
                AVERAGE_ORANGE.filled(),
            );
            bar.set_margin(0, 0, 4, 4);
            bar
        }))
        .map_err(|e| draw_err(path, e))?;

    chart
        .draw_series(shares.iter().enumerate().flat_map(|(i, share)| {
            [
                Text::new(
                    format!("{:.1}%", share.pct_quotient),
                    (
                        SegmentValue::CenterOf(2 * i),
                        share.pct_quotient + y_max * 0.01,
                    ),
                    annotation_style(15),
                ),
                Text::new(
                    format!("{:.1}%", share.pct_average),
                    (
                        SegmentValue::CenterOf(2 * i + 1),
                        share.pct_average + y_max * 0.01,
                    ),
                    annotation_style(15),
                ),
            ]
        }))
        .map_err(|e| draw_err(path, e))?;

    root.present().map_err(|e| draw_err(path, e))?;
    debug!("outcome_share_chart: wrote {:?}", path);
    Ok(())
}
