use chrono::{Datelike, NaiveDate};
use eframe::egui::Ui;
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoints};
use rusty_pillars::pillar::SeriesPoint;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Time-series plot (central panel)
// ---------------------------------------------------------------------------

fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn format_day(mark: GridMark, _range: &std::ops::RangeInclusive<f64>) -> String {
    NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Split a series at nulls so gaps are not bridged by a straight line.
fn segments(points: &[SeriesPoint]) -> Vec<Vec<[f64; 2]>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for p in points {
        match p.value {
            Some(v) => current.push([day_number(p.date), v]),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Render the active pillar's series.
pub fn pillar_plot(ui: &mut Ui, state: &AppState) {
    let Some(eval) = &state.evaluation else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to start  (File → Open…)");
        });
        return;
    };
    if eval.no_data {
        return;
    }

    ui.label(eval.chart_title.as_str());

    let y_label = if state.pillar == rusty_pillars::Pillar::Burden {
        eval.series.iter().next().map_or(state.pillar.y_axis_label(), |s| s.label)
    } else {
        state.pillar.y_axis_label()
    };

    Plot::new("pillar_plot")
        .legend(Legend::default())
        .height(ui.available_height() * 0.7)
        .x_axis_label("Date")
        .y_axis_label(y_label)
        .x_axis_formatter(format_day)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in eval.series.included() {
                let color = state.color_map.color_for(series.key);
                for segment in segments(&series.points) {
                    let line = Line::new(PlotPoints::from(segment))
                        .name(series.label)
                        .color(color)
                        .width(2.0);
                    plot_ui.line(line);
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, value: Option<f64>) -> SeriesPoint {
        SeriesPoint {
            date: NaiveDate::from_ymd_opt(2021, 1, day).unwrap(),
            value,
        }
    }

    #[test]
    fn nulls_split_segments() {
        let pts = [
            point(1, None),
            point(2, Some(1.0)),
            point(3, Some(2.0)),
            point(4, None),
            point(5, None),
            point(6, Some(3.0)),
        ];
        let segs = segments(&pts);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].len(), 2);
        assert_eq!(segs[1][0][1], 3.0);
    }

    #[test]
    fn day_numbers_round_trip_through_formatter() {
        let d = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let mark = GridMark {
            value: day_number(d),
            step_size: 1.0,
        };
        assert_eq!(format_day(mark, &(0.0..=1.0)), "2021-03-01");
    }
}
