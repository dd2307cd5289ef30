//! The five survey charts, drawn with the plotters bitmap backend.
//!
//! Categorical axes are plain `f64` ranges with one unit per category;
//! labels are attached through the mesh label formatters.

use std::path::Path;

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::aggregate::{BoxSummary, ChartData};
use crate::color::{annotation_color, generate_palette, Colormap};
use crate::data::model::Covariate;

const FONT: &str = "sans-serif";

/// Label of the category whose centre sits at `x` (centres at 0, 1, …).
fn category_at(labels: &[String], x: f64) -> String {
    let r = x.round();
    if (x - r).abs() > 1e-6 || r < 0.0 {
        return String::new();
    }
    labels.get(r as usize).cloned().unwrap_or_default()
}

/// Label of the cell whose centre sits at `x` (centres at 0.5, 1.5, …).
fn cell_at(labels: &[String], x: f64) -> String {
    category_at(labels, x - 0.5)
}

/// Same as [`cell_at`] for an axis drawn top-down (first label on top).
fn cell_at_reversed(labels: &[String], y: f64) -> String {
    let n = labels.len() as f64;
    category_at(labels, n - 0.5 - y)
}

fn centered(size: f64, color: RGBColor) -> TextStyle<'static> {
    (FONT, size)
        .into_font()
        .color(&color)
        .pos(Pos::new(HPos::Center, VPos::Center))
}

// ---------------------------------------------------------------------------
// Occurrence rate: grouped bars
// ---------------------------------------------------------------------------

pub fn occurrence_by_habitat(data: &ChartData, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let n_habitats = data.habitats.len();
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Species Occurrence Rates Across Water Body Types",
            (FONT, 24.0),
        )
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n_habitats as f64 - 0.5), 0f64..100f64)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(2 * n_habitats + 1)
        .x_label_formatter(&|x: &f64| category_at(&data.habitats, *x))
        .x_desc("Water Body Type")
        .y_desc("Occurrence Rate (%)")
        .draw()?;

    let colors = generate_palette(data.species.len());
    let width = 0.8 / data.species.len().max(1) as f64;
    for (s, species) in data.species.iter().enumerate() {
        let color = colors[s];
        let bars = data.rates.iter().enumerate().map(|(h, row)| {
            let x0 = h as f64 - 0.4 + width * s as f64;
            Rectangle::new([(x0, 0.0), (x0 + width, row[s])], color.mix(0.85).filled())
        });
        chart
            .draw_series(bars)?
            .label(species.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Occurrence rate: heatmap
// ---------------------------------------------------------------------------

pub fn preference_heatmap(data: &ChartData, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (1000, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let n_species = data.species.len();
    let n_habitats = data.habitats.len();
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Habitat Preference Heatmap (% Species Occurrence by Water Body Type)",
            (FONT, 22.0),
        )
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(180)
        .build_cartesian_2d(0f64..n_species as f64, 0f64..n_habitats as f64)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(2 * n_species + 1)
        .y_labels(2 * n_habitats + 1)
        .x_label_formatter(&|x: &f64| cell_at(&data.species, *x))
        .y_label_formatter(&|y: &f64| cell_at_reversed(&data.habitats, *y))
        .x_desc("Species")
        .y_desc("Water Body Type")
        .draw()?;

    for (h, row) in data.rates.iter().enumerate() {
        let y = (n_habitats - 1 - h) as f64;
        for (s, &rate) in row.iter().enumerate() {
            let fill = Colormap::YlOrRd.scaled(rate, 0.0, 100.0);
            let x = s as f64;
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x, y), (x + 1.0, y + 1.0)],
                fill.filled(),
            )))?;
            chart.draw_series(std::iter::once(Text::new(
                format!("{rate:.1}"),
                (x + 0.5, y + 0.5),
                centered(20.0, annotation_color(fill)),
            )))?;
        }
    }

    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Environmental conditions: box plots
// ---------------------------------------------------------------------------

fn value_range(boxes: &[Option<BoxSummary>]) -> (f64, f64) {
    let (lo, hi) = boxes
        .iter()
        .flatten()
        .map(BoxSummary::extent)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (a, b)| {
            (lo.min(a), hi.max(b))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.08 } else { 1.0 };
    (lo - pad, hi + pad)
}

fn draw_box_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    covariate: Covariate,
    boxes: &[Option<BoxSummary>],
    habitats: &[String],
    colors: &[RGBColor],
) -> Result<()> {
    let (lo, hi) = value_range(boxes);
    let mut chart = ChartBuilder::on(area)
        .caption(covariate.label(), (FONT, 18.0))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(-0.5f64..(habitats.len() as f64 - 0.5), lo..hi)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(2 * habitats.len() + 1)
        .x_label_formatter(&|x: &f64| category_at(habitats, *x))
        .x_label_style((FONT, 12.0))
        .y_desc(covariate.label())
        .draw()?;

    for (h, summary) in boxes.iter().enumerate() {
        let Some(b) = summary else { continue };
        let x = h as f64;
        let (left, right) = (x - 0.3, x + 0.3);

        chart.draw_series(std::iter::once(Rectangle::new(
            [(left, b.q1), (right, b.q3)],
            colors[h].mix(0.7).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(left, b.q1), (right, b.q3)],
            BLACK.stroke_width(1),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(left, b.median), (right, b.median)],
            BLACK.stroke_width(2),
        )))?;

        let whiskers = [
            vec![(x, b.q3), (x, b.whisker_high)],
            vec![(x, b.q1), (x, b.whisker_low)],
            vec![(x - 0.12, b.whisker_high), (x + 0.12, b.whisker_high)],
            vec![(x - 0.12, b.whisker_low), (x + 0.12, b.whisker_low)],
        ];
        chart.draw_series(whiskers.into_iter().map(|pts| PathElement::new(pts, BLACK)))?;
        chart.draw_series(
            b.outliers
                .iter()
                .map(|&v| Circle::new((x, v), 3, BLACK.stroke_width(1))),
        )?;
    }
    Ok(())
}

pub fn environmental_conditions(data: &ChartData, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (1400, 1000)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        "Environmental Characteristics by Water Body Type",
        (FONT, 26.0),
    )?;

    let colors = generate_palette(data.habitats.len());
    let panels = root.split_evenly((2, 2));
    for (covariate, area) in Covariate::ALL.iter().zip(panels.iter()) {
        draw_box_panel(
            area,
            *covariate,
            &data.boxes[covariate.index()],
            &data.habitats,
            &colors,
        )?;
    }

    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Raw counts per species
// ---------------------------------------------------------------------------

pub fn species_distribution(data: &ChartData, path: &Path) -> Result<()> {
    let n_species = data.species.len();
    let root = BitMapBackend::new(path, (500 * n_species.max(1) as u32, 550)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Species Distribution Across Habitats", (FONT, 26.0))?;

    let colors = generate_palette(data.habitats.len());
    let panels = root.split_evenly((1, n_species.max(1)));
    let y_max = data
        .counts
        .iter()
        .flatten()
        .copied()
        .max()
        .unwrap_or(0) as f64;
    let y_top = (y_max * 1.15).max(1.0);
    let n_habitats = data.habitats.len();

    for (s, (species, area)) in data.species.iter().zip(panels.iter()).enumerate() {
        let mut chart = ChartBuilder::on(area)
            .caption(species.as_str(), (FONT, 20.0))
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(-0.5f64..(n_habitats as f64 - 0.5), 0f64..y_top)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(2 * n_habitats + 1)
            .x_label_formatter(&|x: &f64| category_at(&data.habitats, *x))
            .x_label_style((FONT, 11.0))
            .y_desc("Number of Observations")
            .draw()?;

        for (h, row) in data.counts.iter().enumerate() {
            let count = row[s] as f64;
            let x = h as f64;
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - 0.35, 0.0), (x + 0.35, count)],
                colors[h].mix(0.8).filled(),
            )))?;
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - 0.35, 0.0), (x + 0.35, count)],
                BLACK.stroke_width(2),
            )))?;
            chart.draw_series(std::iter::once(Text::new(
                format!("{}", row[s]),
                (x, count + y_top * 0.03),
                centered(16.0, BLACK),
            )))?;
        }
    }

    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Co-occurrence per habitat
// ---------------------------------------------------------------------------

pub fn species_cooccurrence(data: &ChartData, path: &Path) -> Result<()> {
    let n_habitats = data.habitats.len();
    let n_species = data.species.len();
    let root = BitMapBackend::new(path, (500 * n_habitats.max(1) as u32, 550)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Species Co-occurrence by Habitat Type", (FONT, 26.0))?;

    let panels = root.split_evenly((1, n_habitats.max(1)));
    for ((habitat, matrix), area) in data
        .habitats
        .iter()
        .zip(&data.co_occurrence)
        .zip(panels.iter())
    {
        let max = matrix.iter().flatten().copied().max().unwrap_or(0) as f64;
        let mut chart = ChartBuilder::on(area)
            .caption(habitat.as_str(), (FONT, 18.0))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0f64..n_species as f64, 0f64..n_species as f64)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(2 * n_species + 1)
            .y_labels(2 * n_species + 1)
            .x_label_formatter(&|x: &f64| cell_at(&data.species, *x))
            .y_label_formatter(&|y: &f64| cell_at_reversed(&data.species, *y))
            .x_desc("Species")
            .y_desc("Species")
            .draw()?;

        for (a, row) in matrix.iter().enumerate() {
            let y = (n_species - 1 - a) as f64;
            for (b, &count) in row.iter().enumerate() {
                let fill = Colormap::Blues.scaled(count as f64, 0.0, max);
                let x = b as f64;
                chart.draw_series(std::iter::once(Rectangle::new(
                    [(x, y), (x + 1.0, y + 1.0)],
                    fill.filled(),
                )))?;
                chart.draw_series(std::iter::once(Text::new(
                    format!("{count}"),
                    (x + 0.5, y + 0.5),
                    centered(18.0, annotation_color(fill)),
                )))?;
            }
        }
    }

    root.present()?;
    Ok(())
}
