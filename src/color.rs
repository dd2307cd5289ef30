use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            // Start at a blue hue so the first series matches the heatmap ramps.
            let hue = 200.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.6, 0.45);
            let rgb: Srgb = hsl.into_color();
            to_rgb(rgb)
        })
        .collect()
}

fn to_rgb(color: Srgb) -> RGBColor {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    RGBColor(channel(color.red), channel(color.green), channel(color.blue))
}

// ---------------------------------------------------------------------------
// Sequential colour maps for heatmaps
// ---------------------------------------------------------------------------

/// Sequential colour ramps used by the heatmap charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// Pale yellow → orange → dark red.
    YlOrRd,
    /// Near white → dark blue.
    Blues,
}

impl Colormap {
    fn stops(self) -> &'static [(u8, u8, u8)] {
        match self {
            Colormap::YlOrRd => &[
                (255, 255, 204),
                (254, 217, 118),
                (253, 141, 60),
                (227, 26, 28),
                (128, 0, 38),
            ],
            Colormap::Blues => &[
                (247, 251, 255),
                (198, 219, 239),
                (107, 174, 214),
                (33, 113, 181),
                (8, 48, 107),
            ],
        }
    }

    /// Colour at position `t` in [0, 1]; out-of-range values are clamped.
    ///
    /// Interpolates between the ramp's stops in linear RGB.
    pub fn at(self, t: f64) -> RGBColor {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (stops.len() - 1) as f64;
        let lo = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = (scaled - lo as f64) as f32;

        let linear = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
            Srgb::new(r, g, b).into_format::<f32>().into_linear()
        };
        let mixed = linear(stops[lo]).mix(linear(stops[lo + 1]), frac);
        to_rgb(Srgb::from_linear(mixed))
    }

    /// Colour for `value` on a `[min, max]` scale.
    pub fn scaled(self, value: f64, min: f64, max: f64) -> RGBColor {
        if max <= min {
            return self.at(0.0);
        }
        self.at((value - min) / (max - min))
    }
}

/// Black or white, whichever reads better on `background`.
pub fn annotation_color(background: RGBColor) -> RGBColor {
    let RGBColor(r, g, b) = background;
    let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    if luminance > 140.0 {
        RGBColor(0, 0, 0)
    } else {
        RGBColor(255, 255, 255)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let colours = generate_palette(3);
        assert_eq!(colours.len(), 3);
        assert_ne!(colours[0], colours[1]);
        assert_ne!(colours[1], colours[2]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn colormap_hits_end_stops() {
        assert_eq!(Colormap::YlOrRd.at(0.0), RGBColor(255, 255, 204));
        assert_eq!(Colormap::YlOrRd.at(1.0), RGBColor(128, 0, 38));
        assert_eq!(Colormap::Blues.at(-3.0), RGBColor(247, 251, 255));
        assert_eq!(Colormap::Blues.at(f64::NAN), RGBColor(247, 251, 255));
    }

    #[test]
    fn scaled_handles_flat_range() {
        assert_eq!(Colormap::Blues.scaled(5.0, 5.0, 5.0), Colormap::Blues.at(0.0));
    }

    #[test]
    fn annotation_contrasts_with_background() {
        assert_eq!(annotation_color(RGBColor(255, 255, 204)), RGBColor(0, 0, 0));
        assert_eq!(annotation_color(RGBColor(8, 48, 107)), RGBColor(255, 255, 255));
    }
}
