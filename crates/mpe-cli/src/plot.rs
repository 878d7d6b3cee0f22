//! PNG charts of parsed training metrics.
//!
//! Two stacked panels: average reward (blue line) with eval rewards (red
//! points) on top, policy entropy (orange line) below. Both share the
//! episode axis. Titles, legends and axis text use the 8x8 bitmap font.

use crate::logparse::TrainingSeries;
use anyhow::{Context, Result};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 600;

const MARGIN: i64 = 40;
const LEFT_MARGIN: i64 = 72;
/// Space above each panel for its title
const TITLE_BAND: i64 = 32;
const MARKER_RADIUS: i64 = 3;
const GLYPH: i64 = 8;
const TITLE_SCALE: i64 = 2;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const REWARD: Rgb<u8> = Rgb([31, 119, 180]);
const EVAL: Rgb<u8> = Rgb([214, 39, 40]);
const ENTROPY: Rgb<u8> = Rgb([255, 165, 0]);
const TEXT: Rgb<u8> = Rgb([0, 0, 0]);

/// One legend row: label plus how the series is drawn
struct LegendEntry<'a> {
    label: &'a str,
    color: Rgb<u8>,
    line: bool,
}

/// Pixel rectangle of one panel plus the data range it shows
struct Panel {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Panel {
    fn to_pixel(&self, x: f64, y: f64) -> (i64, i64) {
        let fx = (x - self.x_range.0) / (self.x_range.1 - self.x_range.0);
        let fy = (y - self.y_range.0) / (self.y_range.1 - self.y_range.0);
        let px = self.left as f64 + fx * (self.right - self.left) as f64;
        let py = self.bottom as f64 - fy * (self.bottom - self.top) as f64;
        (px.round() as i64, py.round() as i64)
    }

    fn draw_frame(&self, img: &mut RgbImage) {
        for k in 1..5 {
            let y = self.top + (self.bottom - self.top) * k / 5;
            draw_line(img, (self.left, y), (self.right, y), GRID);
        }
        draw_line(img, (self.left, self.top), (self.left, self.bottom), AXIS);
        draw_line(img, (self.left, self.bottom), (self.right, self.bottom), AXIS);
        draw_line(img, (self.left, self.top), (self.right, self.top), AXIS);
        draw_line(img, (self.right, self.top), (self.right, self.bottom), AXIS);
    }

    /// Centered title in the band above the panel, y-axis name at its left
    fn draw_labels(&self, img: &mut RgbImage, title: &str, y_label: &str) {
        let title_y = self.top - TITLE_BAND + (TITLE_BAND - GLYPH * TITLE_SCALE) / 2;
        let title_x = (self.left + self.right - text_width(title, TITLE_SCALE)) / 2;
        draw_text(img, (title_x, title_y), title, TITLE_SCALE, TEXT);
        draw_text(img, (4, self.top - GLYPH - 4), y_label, 1, TEXT);

        for (value, y) in [(self.y_range.1, self.top), (self.y_range.0, self.bottom - GLYPH)] {
            let tick = format!("{:.2}", value);
            draw_text(img, (self.left - 4 - text_width(&tick, 1), y), &tick, 1, TEXT);
        }
    }

    fn draw_legend(&self, img: &mut RgbImage, entries: &[LegendEntry<'_>]) {
        let width = entries.iter().map(|e| text_width(e.label, 1)).max().unwrap_or(0) + 36;
        let x = self.right - width - 8;
        for (k, entry) in entries.iter().enumerate() {
            let y = self.top + 10 + k as i64 * 16;
            let mid = y + GLYPH / 2;
            if entry.line {
                draw_line(img, (x, mid), (x + 20, mid), entry.color);
            }
            draw_marker(img, (x + 10, mid), entry.color);
            draw_text(img, (x + 28, y), entry.label, 1, TEXT);
        }
    }

    fn draw_series(&self, img: &mut RgbImage, xs: &[u64], ys: &[f64], color: Rgb<u8>, line: bool) {
        let points: Vec<_> = xs
            .iter()
            .zip(ys)
            .filter(|(_, y)| y.is_finite())
            .map(|(&x, &y)| self.to_pixel(x as f64, y))
            .collect();
        if line {
            for pair in points.windows(2) {
                draw_line(img, pair[0], pair[1], color);
            }
        }
        for &p in &points {
            draw_marker(img, p, color);
        }
    }
}

/// Value range padded by 5%; degenerate ranges widen to +/-1
fn padded_range<I: IntoIterator<Item = f64>>(values: I) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if hi - lo < 1e-12 {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Render both panels into an image, titled with `label`
pub fn render(series: &TrainingSeries, label: &str) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    let x_range = padded_range(
        series
            .episodes
            .iter()
            .chain(&series.eval_episodes)
            .map(|&e| e as f64),
    );
    let half = HEIGHT as i64 / 2;

    let reward_panel = Panel {
        left: LEFT_MARGIN,
        top: TITLE_BAND,
        right: WIDTH as i64 - MARGIN / 2,
        bottom: half - MARGIN / 2,
        x_range,
        y_range: padded_range(series.avg_rewards.iter().chain(&series.eval_rewards).copied()),
    };
    reward_panel.draw_frame(&mut img);
    reward_panel.draw_series(&mut img, &series.episodes, &series.avg_rewards, REWARD, true);
    reward_panel.draw_series(&mut img, &series.eval_episodes, &series.eval_rewards, EVAL, false);
    reward_panel.draw_labels(
        &mut img,
        &format!("{} Average and Eval Rewards Over Training", label),
        "Reward",
    );
    reward_panel.draw_legend(
        &mut img,
        &[
            LegendEntry { label: "Avg Reward", color: REWARD, line: true },
            LegendEntry { label: "Eval Reward", color: EVAL, line: false },
        ],
    );

    let entropy_panel = Panel {
        top: half + TITLE_BAND,
        bottom: HEIGHT as i64 - MARGIN,
        y_range: padded_range(series.entropies.iter().copied()),
        ..reward_panel
    };
    entropy_panel.draw_frame(&mut img);
    entropy_panel.draw_series(&mut img, &series.episodes, &series.entropies, ENTROPY, true);
    entropy_panel.draw_labels(
        &mut img,
        &format!("{} Policy Entropy Over Training", label),
        "Entropy",
    );
    entropy_panel.draw_legend(
        &mut img,
        &[LegendEntry { label: "Policy Entropy", color: ENTROPY, line: true }],
    );

    let x_label = "Episode (x5)";
    let x = (entropy_panel.left + entropy_panel.right - text_width(x_label, 1)) / 2;
    draw_text(&mut img, (x, entropy_panel.bottom + 16), x_label, 1, TEXT);

    img
}

/// Render and write `<out_dir>/<label>.png`, creating `out_dir` if needed
pub fn save(series: &TrainingSeries, out_dir: &Path, label: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    let path = out_dir.join(format!("{}.png", label));
    render(series, label)
        .save(&path)
        .with_context(|| format!("writing chart {}", path.display()))?;
    Ok(path)
}

fn text_width(text: &str, scale: i64) -> i64 {
    text.chars().count() as i64 * GLYPH * scale
}

/// Draw `text` with its top-left corner at `origin`; characters outside the
/// basic Latin block leave a blank cell
fn draw_text(img: &mut RgbImage, origin: (i64, i64), text: &str, scale: i64, color: Rgb<u8>) {
    for (i, c) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(c) else {
            continue;
        };
        let cell_x = origin.0 + i as i64 * GLYPH * scale;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH {
                if bits & (1 << col) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let x = cell_x + col * scale + sx;
                        let y = origin.1 + row as i64 * scale + sy;
                        put(img, x, y, color);
                    }
                }
            }
        }
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < img.width() as i64 && y < img.height() as i64 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham line
fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put(img, x, y, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn draw_marker(img: &mut RgbImage, (cx, cy): (i64, i64), color: Rgb<u8>) {
    for dy in -MARKER_RADIUS..=MARKER_RADIUS {
        for dx in -MARKER_RADIUS..=MARKER_RADIUS {
            if dx * dx + dy * dy <= MARKER_RADIUS * MARKER_RADIUS {
                put(img, cx + dx, cy + dy, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> TrainingSeries {
        TrainingSeries {
            episodes: vec![0, 5, 10],
            timesteps: vec![400, 2400, 4400],
            avg_rewards: vec![-50.0, -45.0, -40.0],
            entropies: vec![1.6, 1.5, 1.3],
            eval_episodes: vec![10],
            eval_rewards: vec![-38.0],
        }
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range([2.0, 2.0]), (1.0, 3.0));
        assert_eq!(padded_range(std::iter::empty()), (0.0, 1.0));
        let (lo, hi) = padded_range([0.0, 10.0]);
        assert!((lo + 0.5).abs() < 1e-12 && (hi - 10.5).abs() < 1e-12);
    }

    #[test]
    fn test_render_draws_series_colors() {
        let img = render(&series(), "shared");
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));

        let has = |c: Rgb<u8>| img.pixels().any(|p| *p == c);
        assert!(has(REWARD));
        assert!(has(EVAL));
        assert!(has(ENTROPY));
    }

    #[test]
    fn test_eval_point_in_top_panel() {
        let img = render(&series(), "shared");
        let half = HEIGHT / 2;
        let eval_rows: Vec<u32> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == EVAL)
            .map(|(_, y, _)| y)
            .collect();
        assert!(!eval_rows.is_empty());
        assert!(eval_rows.iter().all(|&y| y < half));
    }

    #[test]
    fn test_save_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = save(&series(), &dir.path().join("logging"), "shared").unwrap();
        assert!(path.ends_with("logging/shared.png"));
        let loaded = image::open(&path).unwrap();
        assert_eq!(loaded.width(), WIDTH);
    }

    #[test]
    fn test_titles_drawn_in_both_bands() {
        let img = render(&series(), "shared");
        let half = HEIGHT / 2;
        let text_rows = |from: u32, to: u32| {
            img.enumerate_pixels()
                .filter(|(x, y, p)| **p == TEXT && *y >= from && *y < to && *x >= LEFT_MARGIN as u32)
                .count()
        };
        assert!(text_rows(0, TITLE_BAND as u32) > 0);
        assert!(text_rows(half, half + TITLE_BAND as u32) > 0);
    }

    #[test]
    fn test_title_follows_label() {
        let band = |img: &RgbImage| -> Vec<Rgb<u8>> {
            img.enumerate_pixels()
                .filter(|(_, y, _)| *y < TITLE_BAND as u32)
                .map(|(_, _, p)| *p)
                .collect()
        };
        let shared = render(&series(), "shared");
        let individual = render(&series(), "individual");
        assert_ne!(band(&shared), band(&individual));
    }

    #[test]
    fn test_draw_text_scales_glyphs() {
        let mut img = RgbImage::from_pixel(64, 32, BACKGROUND);
        draw_text(&mut img, (0, 0), "I", 2, TEXT);
        let lit: Vec<_> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == TEXT)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(x, y)| x < 16 && y < 16));
        assert_eq!(text_width("Episode (x5)", 1), 96);
    }
}
