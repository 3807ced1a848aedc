//! SVG rendering sink
//!
//! Scalars become a single horizontal gauge on a `[0, 1]` axis, series
//! become a binned histogram. Output is a standalone UTF-8 SVG document.

use std::fmt::Write;

use itertools::{Itertools, MinMaxResult};

use crate::engines::core::config::RenderConfig;
use crate::engines::render::{RenderError, RenderResult, RenderingSink, Series};

const MARGIN_LEFT: f64 = 50.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 34.0;
const BAR_FILL: &str = "#7db8da";

#[derive(Debug, Clone, Default)]
pub struct SvgRenderer {
    config: RenderConfig,
}

impl SvgRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn plot_area(&self) -> (f64, f64) {
        let w = (self.config.width as f64 - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
        let h = (self.config.height as f64 - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
        (w, h)
    }

    fn open_document(&self, out: &mut String, title: &str) -> std::fmt::Result {
        let (w, h) = (self.config.width, self.config.height);
        let (plot_w, plot_h) = self.plot_area();

        writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>")?;
        writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
            w, h, w, h
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"14\" text-anchor=\"middle\">{}</text>",
            w as f64 / 2.0,
            MARGIN_TOP - 10.0,
            escape_xml(title)
        )?;
        writeln!(
            out,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#fff\" stroke=\"#ddd\"/>",
            MARGIN_LEFT, MARGIN_TOP, plot_w, plot_h
        )
    }

    fn x_ticks(&self, out: &mut String, min: f64, max: f64, ticks: usize) -> std::fmt::Result {
        let (plot_w, plot_h) = self.plot_area();
        let baseline = MARGIN_TOP + plot_h;
        for t in 0..=ticks {
            let frac = t as f64 / ticks as f64;
            let x = MARGIN_LEFT + frac * plot_w;
            let value = min + frac * (max - min);
            writeln!(
                out,
                "<line x1=\"{x}\" y1=\"{y1}\" x2=\"{x}\" y2=\"{y2}\" stroke=\"#999\"/>",
                x = x,
                y1 = baseline,
                y2 = baseline + 4.0
            )?;
            writeln!(
                out,
                "<text x=\"{}\" y=\"{}\" font-size=\"10\" text-anchor=\"middle\">{}</text>",
                x,
                baseline + 16.0,
                format_tick(value)
            )?;
        }
        Ok(())
    }

    fn render_scalar(&self, value: f64, title: &str) -> RenderResult<String> {
        if !value.is_finite() {
            return Err(RenderError::NonFinite {
                title: title.to_string(),
                value,
            });
        }

        let (plot_w, plot_h) = self.plot_area();
        let filled = value.clamp(0.0, 1.0) * plot_w;
        let bar_h = plot_h / 3.0;

        let mut out = String::new();
        self.write_scalar(&mut out, value, title, filled, bar_h)
            .map_err(|e| RenderError::Backend(e.to_string()))?;
        Ok(out)
    }

    fn write_scalar(
        &self,
        out: &mut String,
        value: f64,
        title: &str,
        filled: f64,
        bar_h: f64,
    ) -> std::fmt::Result {
        let (_, plot_h) = self.plot_area();
        self.open_document(out, title)?;
        self.x_ticks(out, 0.0, 1.0, 4)?;
        writeln!(
            out,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
            MARGIN_LEFT,
            MARGIN_TOP + (plot_h - bar_h) / 2.0,
            filled,
            bar_h,
            BAR_FILL
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"12\">{:.3}</text>",
            MARGIN_LEFT + filled + 4.0,
            MARGIN_TOP + plot_h / 2.0 + 4.0,
            value
        )?;
        writeln!(out, "</svg>")
    }

    fn render_histogram(&self, values: &[f64], title: &str) -> RenderResult<String> {
        if values.is_empty() {
            return Err(RenderError::EmptySeries {
                title: title.to_string(),
            });
        }
        if let Some(&value) = values.iter().find(|v| !v.is_finite()) {
            return Err(RenderError::NonFinite {
                title: title.to_string(),
                value,
            });
        }

        let (min, max) = match values.iter().copied().minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => (0.0, 1.0),
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };
        let counts = bin_counts(values, min, max, self.config.bins.max(1));

        let mut out = String::new();
        self.write_histogram(&mut out, &counts, min, max, title)
            .map_err(|e| RenderError::Backend(e.to_string()))?;
        Ok(out)
    }

    fn write_histogram(
        &self,
        out: &mut String,
        counts: &[u64],
        min: f64,
        max: f64,
        title: &str,
    ) -> std::fmt::Result {
        let (plot_w, plot_h) = self.plot_area();
        let max_count = counts.iter().copied().max().unwrap_or(0);
        let bar_w = plot_w / counts.len() as f64;

        self.open_document(out, title)?;
        self.x_ticks(out, min, if max > min { max } else { min + 1.0 }, 4)?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"10\" text-anchor=\"end\">{}</text>",
            MARGIN_LEFT - 4.0,
            MARGIN_TOP + 10.0,
            max_count
        )?;
        for (i, &count) in counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let h = count as f64 / max_count as f64 * plot_h;
            writeln!(
                out,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
                MARGIN_LEFT + i as f64 * bar_w,
                MARGIN_TOP + plot_h - h,
                bar_w.max(1.0),
                h,
                BAR_FILL
            )?;
        }
        writeln!(out, "</svg>")
    }
}

impl RenderingSink for SvgRenderer {
    fn render(&self, series: Series<'_>, title: &str) -> RenderResult<Vec<u8>> {
        let document = match series {
            Series::Scalar(value) => self.render_scalar(value, title)?,
            Series::Values(values) => self.render_histogram(values, title)?,
        };
        Ok(document.into_bytes())
    }
}

/// Histogram counts over `bins` equal-width bins spanning `[min, max]`.
///
/// A zero-width range puts everything in the first bin. Zero bins yields
/// an empty histogram.
pub fn bin_counts(values: &[f64], min: f64, max: f64, bins: usize) -> Vec<u64> {
    if bins == 0 {
        return Vec::new();
    }

    let mut counts = vec![0u64; bins];
    let span = max - min;

    for &value in values {
        let bin = if span <= 0.0 {
            0
        } else {
            (((value - min) / span) * bins as f64) as usize
        };
        counts[bin.min(bins - 1)] += 1;
    }

    counts
}

fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e9 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('\'', "&apos;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_str(series: Series<'_>, title: &str) -> String {
        let bytes = SvgRenderer::default().render(series, title).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_scalar_gauge() {
        let svg = render_str(Series::Scalar(0.42), "Mean GC content");
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Mean GC content"));
        assert!(svg.contains("0.420"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_histogram_has_one_bar_per_occupied_bin() {
        let renderer = SvgRenderer::new(RenderConfig {
            width: 400,
            height: 200,
            bins: 4,
        });
        let bytes = renderer
            .render(Series::Values(&[1.0, 1.0, 2.0, 4.0]), "lengths")
            .unwrap();
        let svg = String::from_utf8(bytes).unwrap();

        // Background plus three occupied bins
        assert_eq!(svg.matches("<rect").count(), 4);
        assert_eq!(svg.matches(BAR_FILL).count(), 3);
    }

    #[test]
    fn test_constant_series() {
        let svg = render_str(Series::Values(&[5.0, 5.0, 5.0]), "flat");
        assert_eq!(svg.matches(BAR_FILL).count(), 1);
    }

    #[test]
    fn test_title_is_escaped() {
        let svg = render_str(Series::Scalar(0.1), "<GC & AT>");
        assert!(svg.contains("&lt;GC &amp; AT&gt;"));
    }

    #[test]
    fn test_empty_series_fails() {
        let err = SvgRenderer::default()
            .render(Series::Values(&[]), "quality")
            .unwrap_err();
        assert_eq!(
            err,
            RenderError::EmptySeries {
                title: "quality".to_string()
            }
        );
    }

    #[test]
    fn test_non_finite_fails() {
        let renderer = SvgRenderer::default();
        assert!(matches!(
            renderer.render(Series::Values(&[1.0, f64::NAN]), "q"),
            Err(RenderError::NonFinite { .. })
        ));
        assert!(matches!(
            renderer.render(Series::Scalar(f64::INFINITY), "gc"),
            Err(RenderError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_bin_counts() {
        assert_eq!(bin_counts(&[0.0, 0.5, 1.0], 0.0, 1.0, 2), vec![1, 2]);
        assert_eq!(bin_counts(&[3.0, 3.0], 3.0, 3.0, 5), vec![2, 0, 0, 0, 0]);
        assert_eq!(bin_counts(&[0.1, 0.2, 0.9], 0.0, 1.0, 10), vec![0, 1, 1, 0, 0, 0, 0, 0, 0, 1]);
        assert!(bin_counts(&[1.0], 0.0, 1.0, 0).is_empty());
    }
}
