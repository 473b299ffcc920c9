//! Color scale engine.
//!
//! Interpolates a color along an ordered gradient of stops given a value and
//! the dataset it belongs to. Shared by the heatmap renderer, the progress
//! bar and the gauge so there is exactly one interpolation routine.
//!
//! Stops are written either as hex (`#abc`, `#aabbcc`) or as `rgb(r,g,b)`.

use std::fmt;

use crate::error::{Result, VizError};

// ---------------------------------------------------------------------------
// Rgb
// ---------------------------------------------------------------------------

/// 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse either supported notation.
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        if s.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("rgb(")) {
            parse_rgb_fn(s).ok_or_else(|| VizError::InvalidColorFormat(input.to_string()))
        } else {
            hex_to_rgb(s)
        }
    }

    /// `#rrggbb`, lowercase.
    pub fn to_hex(self) -> String {
        rgb_to_hex(self.r, self.g, self.b)
    }

    /// Perceptual luminance `0.299 R + 0.587 G + 0.114 B`, in `[0, 255]`.
    pub fn luminance(self) -> f64 {
        0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b)
    }

    /// Channel-wise linear blend, each channel rounded to the nearest integer.
    pub fn lerp(self, other: Rgb, fraction: f64) -> Rgb {
        let mix = |a: u8, b: u8| -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * fraction).round().clamp(0.0, 255.0) as u8
        };
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

impl fmt::Display for Rgb {
    /// CSS functional notation: `rgb(r, g, b)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Parse `#abc` / `#aabbcc` (case-insensitive; the `#` is required).
///
/// Three-digit shorthand doubles each nibble: `#f80` is `#ff8800`.
pub fn hex_to_rgb(input: &str) -> Result<Rgb> {
    let bad = || VizError::InvalidColorFormat(input.to_string());
    let digits = input.trim().strip_prefix('#').ok_or_else(bad)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(bad());
    }

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(bad()),
    };

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| bad());
    Ok(Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn parse_rgb_fn(s: &str) -> Option<Rgb> {
    let inner = s.get(4..)?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Rgb { r, g, b })
}

// ---------------------------------------------------------------------------
// Text contrast
// ---------------------------------------------------------------------------

/// Luminance above which dark text is used. Fixed, not configurable.
pub const CONTRAST_THRESHOLD: f64 = 125.0;

/// Text color picked for legibility on top of a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    Black,
    White,
}

impl TextColor {
    pub fn css(self) -> &'static str {
        match self {
            Self::Black => "#000000",
            Self::White => "#ffffff",
        }
    }
}

/// Black text on bright fills (`Y > 125`), white otherwise.
pub fn contrast_text(fill: Rgb) -> TextColor {
    if fill.luminance() > CONTRAST_THRESHOLD {
        TextColor::Black
    } else {
        TextColor::White
    }
}

// ---------------------------------------------------------------------------
// Value range
// ---------------------------------------------------------------------------

/// Min/max of a dataset, ignoring non-finite values.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// `None` when the dataset holds no finite values.
    pub fn of<'a>(data: impl IntoIterator<Item = &'a f64>) -> Option<Self> {
        data.into_iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(ValueRange { min: v, max: v }),
                Some(r) => Some(ValueRange {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }

    /// `(value - min) / (max - min)`, with a zero-width range treated as 1 so a
    /// constant dataset normalizes every value to 0.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        let span = if span == 0.0 { 1.0 } else { span };
        (value - self.min) / span
    }
}

// ---------------------------------------------------------------------------
// ColorScale
// ---------------------------------------------------------------------------

/// Validated, pre-parsed gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    stops: Vec<String>,
    parsed: Vec<Rgb>,
}

impl ColorScale {
    pub fn new<S: AsRef<str>>(stops: &[S]) -> Result<Self> {
        if stops.len() < 2 {
            return Err(VizError::InvalidColorScale(stops.len()));
        }
        let parsed = stops
            .iter()
            .map(|s| Rgb::parse(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            stops: stops.iter().map(|s| s.as_ref().to_string()).collect(),
            parsed,
        })
    }

    pub fn stops(&self) -> &[String] {
        &self.stops
    }

    /// Color for an already normalized position.
    ///
    /// Endpoints return the stop string exactly as given; interior positions
    /// return `rgb(r, g, b)`.
    pub fn at(&self, normalized: f64) -> String {
        self.resolve(normalized).0
    }

    /// Same as [`at`](Self::at) plus the parsed channels of the result.
    pub fn resolve(&self, normalized: f64) -> (String, Rgb) {
        let last = self.stops.len() - 1;
        if normalized.is_nan() || normalized <= 0.0 {
            return (self.stops[0].clone(), self.parsed[0]);
        }
        if normalized >= 1.0 {
            return (self.stops[last].clone(), self.parsed[last]);
        }

        let position = normalized * last as f64;
        let index = position.floor() as usize;
        let fraction = position - index as f64;
        let rgb = self.parsed[index].lerp(self.parsed[index + 1], fraction);
        (rgb.to_string(), rgb)
    }

    /// Normalize `value` against `data` and resolve its color.
    pub fn color_for(&self, value: f64, data: &[f64]) -> String {
        let normalized = ValueRange::of(data).map_or(0.0, |r| r.normalize(value));
        self.at(normalized)
    }
}

/// One-shot interpolation: `value` placed within `data`, colored along `stops`.
pub fn interpolate<S: AsRef<str>>(value: f64, data: &[f64], stops: &[S]) -> Result<String> {
    Ok(ColorScale::new(stops)?.color_for(value, data))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const STOPS: [&str; 3] = ["#f7fbff", "rgb(107, 174, 214)", "#08306b"];

    #[test]
    fn hex_shorthand_doubles_nibbles() {
        assert_eq!(hex_to_rgb("#f80").unwrap(), Rgb::new(0xff, 0x88, 0x00));
        assert_eq!(hex_to_rgb("#FF8800").unwrap(), Rgb::new(0xff, 0x88, 0x00));
        assert!(matches!(hex_to_rgb("abc"), Err(VizError::InvalidColorFormat(_))));
    }

    #[test]
    fn rgb_function_form_parses() {
        assert_eq!(Rgb::parse("rgb(1,2,3)").unwrap(), Rgb::new(1, 2, 3));
        assert_eq!(Rgb::parse(" rgb( 10 , 20 , 30 ) ").unwrap(), Rgb::new(10, 20, 30));
    }

    #[test]
    fn malformed_colors_are_rejected() {
        for bad in ["", "#12", "#12345", "#ggg", "rgb(1,2)", "rgb(1,2,3,4)", "rgb(256,0,0)", "blue", "abc", "fed"] {
            assert!(
                matches!(Rgb::parse(bad), Err(VizError::InvalidColorFormat(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn hex_round_trips_every_channel_value() {
        for v in 0..=255u8 {
            let rgb = Rgb::new(v, 255 - v, v / 2);
            assert_eq!(hex_to_rgb(&rgb.to_hex()).unwrap(), rgb);
        }
    }

    #[test]
    fn endpoints_return_stops_verbatim() {
        let data = [3.0, 9.0, 5.0, 1.0];
        assert_eq!(interpolate(1.0, &data, &STOPS).unwrap(), "#f7fbff");
        assert_eq!(interpolate(9.0, &data, &STOPS).unwrap(), "#08306b");
        assert_eq!(interpolate(-4.0, &data, &STOPS).unwrap(), "#f7fbff");
        assert_eq!(interpolate(40.0, &data, &STOPS).unwrap(), "#08306b");
    }

    #[test]
    fn midpoint_lands_on_middle_stop() {
        let data = [0.0, 10.0];
        assert_eq!(interpolate(5.0, &data, &STOPS).unwrap(), "rgb(107, 174, 214)");
    }

    #[test]
    fn interior_channels_are_rounded() {
        let data = [0.0, 4.0];
        // 1/4 between black and white: 63.75 -> 64
        assert_eq!(
            interpolate(1.0, &data, &["#000", "#fff"]).unwrap(),
            "rgb(64, 64, 64)"
        );
    }

    #[test]
    fn constant_dataset_collapses_to_first_stop() {
        let data = [7.0, 7.0, 7.0];
        assert_eq!(interpolate(7.0, &data, &STOPS).unwrap(), "#f7fbff");
    }

    #[test]
    fn empty_dataset_uses_first_stop() {
        assert_eq!(interpolate(3.0, &[], &STOPS).unwrap(), "#f7fbff");
    }

    #[test]
    fn single_stop_scale_is_rejected() {
        assert!(matches!(
            ColorScale::new(&["#000"]),
            Err(VizError::InvalidColorScale(1))
        ));
    }

    #[test]
    fn contrast_boundary_is_strict() {
        // 0.299*125 + 0.587*125 + 0.114*125 = 125.0 exactly
        let grey = Rgb::new(125, 125, 125);
        assert!((grey.luminance() - 125.0).abs() < 1e-9);
        assert_eq!(contrast_text(grey), TextColor::White);
        assert_eq!(contrast_text(Rgb::new(126, 126, 126)), TextColor::Black);
        assert_eq!(contrast_text(Rgb::BLACK), TextColor::White);
        assert_eq!(contrast_text(Rgb::WHITE), TextColor::Black);
    }
}
