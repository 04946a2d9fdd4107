//! RGBA color model and CSS color parsing
//!
//! Colors are kept as four floating point channels: red, green and blue in `[0, 255]`
//! and alpha in `[0, 1]`, the same layout a canvas `rgba()` string uses.

use crate::{Result, StyleError};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A normalized RGBA color
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgba {
    /// Red channel in `[0, 255]`
    pub r: f64,
    /// Green channel in `[0, 255]`
    pub g: f64,
    /// Blue channel in `[0, 255]`
    pub b: f64,
    /// Alpha in `[0, 1]`
    pub a: f64,
}

/// Anything the style accepts as a color: a CSS color string or a raw `[r, g, b, a]` array
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum ColorLike {
    Css(String),
    Array([f64; 4]),
}

impl Rgba {
    /// Opaque black, the fallback for any color that fails to parse
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

    /// Fully transparent black
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from 8-bit channels
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f64, g as f64, b as f64, 1.0)
    }

    /// Clamp the color channels to their valid ranges
    ///
    /// Red, green and blue are rounded to the nearest integer and clamped to `[0, 255]`,
    /// alpha is clamped to `[0, 1]`. Fails on non-finite channels.
    pub fn normalized(self) -> Result<Self> {
        if ![self.r, self.g, self.b, self.a]
            .iter()
            .all(|channel| channel.is_finite())
        {
            return Err(StyleError::InvalidColor(format!("{self:?}")));
        }

        Ok(Self {
            r: self.r.round().clamp(0.0, 255.0),
            g: self.g.round().clamp(0.0, 255.0),
            b: self.b.round().clamp(0.0, 255.0),
            a: self.a.clamp(0.0, 1.0),
        })
    }

    /// Normalize for serialization, also rounding alpha to two decimals
    ///
    /// Used for colors produced by caller-supplied functions, whose channels can be
    /// arbitrary. Non-finite output becomes opaque black.
    pub fn quantized(self) -> Self {
        match self.normalized() {
            Ok(color) => Self {
                a: (color.a * 100.0).round() / 100.0,
                ..color
            },
            Err(_) => Self::BLACK,
        }
    }

    /// Convert to 8-bit channels, alpha scaled to `[0, 255]`
    pub fn to_rgba8(self) -> [u8; 4] {
        [
            self.r.round().clamp(0.0, 255.0) as u8,
            self.g.round().clamp(0.0, 255.0) as u8,
            self.b.round().clamp(0.0, 255.0) as u8,
            (self.a * 255.0).round().clamp(0.0, 255.0) as u8,
        ]
    }

    /// Parse the digits after a `#`
    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

        let (r, g, b, a) = match hex.len() {
            3 => (nibble(0)?, nibble(1)?, nibble(2)?, 255),
            4 => (nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?),
            6 => (byte(0)?, byte(2)?, byte(4)?, 255),
            8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
            _ => return None,
        };

        Some(Self::new(r as f64, g as f64, b as f64, a as f64 / 255.0))
    }

    /// Parse the arguments of `rgb(...)` or `rgba(...)`, channels as numbers or percentages
    fn parse_rgb(inner: &str) -> Option<Self> {
        let (channels, alpha) = split_arguments(inner)?;
        let r = parse_component(channels[0], 255.0)?;
        let g = parse_component(channels[1], 255.0)?;
        let b = parse_component(channels[2], 255.0)?;
        let a = match alpha {
            Some(alpha) => parse_component(alpha, 1.0)?,
            None => 1.0,
        };
        Some(Self::new(r, g, b, a))
    }

    /// Parse the arguments of `hsl(...)` or `hsla(...)`
    fn parse_hsl(inner: &str) -> Option<Self> {
        let (channels, alpha) = split_arguments(inner)?;
        let hue = channels[0].strip_suffix("deg").unwrap_or(channels[0]);
        let hue = hue.trim().parse::<f64>().ok()?;
        let s = parse_fraction(channels[1])?;
        let l = parse_fraction(channels[2])?;
        let a = match alpha {
            Some(alpha) => parse_component(alpha, 1.0)?,
            None => 1.0,
        };
        Some(Self::from_hsl(hue, s, l, a))
    }

    /// Hue in degrees, saturation and lightness in `[0, 1]`
    fn from_hsl(hue: f64, s: f64, l: f64, a: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 360.0;
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;

        let channel = |t: f64| {
            let t = t.rem_euclid(1.0);
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            v * 255.0
        };

        Self::new(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0), a)
    }

    /// Look up a CSS named color, `transparent` included
    fn named(name: &str) -> Option<Self> {
        if name == "transparent" {
            return Some(Self::TRANSPARENT);
        }
        let index = NAMED_COLORS
            .binary_search_by(|(candidate, _)| candidate.cmp(&name))
            .ok()?;
        let [r, g, b] = NAMED_COLORS[index].1;
        Some(Self::opaque(r, g, b))
    }
}

/// Split `a, b, c[, alpha]` or `a b c[ / alpha]` up to the closing parenthesis
fn split_arguments(inner: &str) -> Option<(Vec<&str>, Option<&str>)> {
    let inner = inner.strip_suffix(')')?;

    let (channels, alpha) = if inner.contains(',') {
        let mut parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        let alpha = if parts.len() == 4 { parts.pop() } else { None };
        (parts, alpha)
    } else {
        let (channels, alpha) = match inner.split_once('/') {
            Some((channels, alpha)) => (channels, Some(alpha.trim())),
            None => (inner, None),
        };
        (channels.split_whitespace().collect(), alpha)
    };

    (channels.len() == 3).then_some((channels, alpha))
}

/// A plain number, or a percentage of `full`
fn parse_component(value: &str, full: f64) -> Option<f64> {
    match value.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().ok().map(|p| p * full / 100.0),
        None => value.parse().ok(),
    }
}

/// A percentage as a fraction in `[0, 1]`, the `%` sign optional
fn parse_fraction(value: &str) -> Option<f64> {
    let percent = value.strip_suffix('%').unwrap_or(value).trim();
    percent.parse::<f64>().ok().map(|p| (p / 100.0).clamp(0.0, 1.0))
}

/// CSS named colors, sorted by name
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("aliceblue", [240, 248, 255]),
    ("antiquewhite", [250, 235, 215]),
    ("aqua", [0, 255, 255]),
    ("aquamarine", [127, 255, 212]),
    ("azure", [240, 255, 255]),
    ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]),
    ("black", [0, 0, 0]),
    ("blanchedalmond", [255, 235, 205]),
    ("blue", [0, 0, 255]),
    ("blueviolet", [138, 43, 226]),
    ("brown", [165, 42, 42]),
    ("burlywood", [222, 184, 135]),
    ("cadetblue", [95, 158, 160]),
    ("chartreuse", [127, 255, 0]),
    ("chocolate", [210, 105, 30]),
    ("coral", [255, 127, 80]),
    ("cornflowerblue", [100, 149, 237]),
    ("cornsilk", [255, 248, 220]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]),
    ("darkcyan", [0, 139, 139]),
    ("darkgoldenrod", [184, 134, 11]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkgrey", [169, 169, 169]),
    ("darkkhaki", [189, 183, 107]),
    ("darkmagenta", [139, 0, 139]),
    ("darkolivegreen", [85, 107, 47]),
    ("darkorange", [255, 140, 0]),
    ("darkorchid", [153, 50, 204]),
    ("darkred", [139, 0, 0]),
    ("darksalmon", [233, 150, 122]),
    ("darkseagreen", [143, 188, 143]),
    ("darkslateblue", [72, 61, 139]),
    ("darkslategray", [47, 79, 79]),
    ("darkslategrey", [47, 79, 79]),
    ("darkturquoise", [0, 206, 209]),
    ("darkviolet", [148, 0, 211]),
    ("deeppink", [255, 20, 147]),
    ("deepskyblue", [0, 191, 255]),
    ("dimgray", [105, 105, 105]),
    ("dimgrey", [105, 105, 105]),
    ("dodgerblue", [30, 144, 255]),
    ("firebrick", [178, 34, 34]),
    ("floralwhite", [255, 250, 240]),
    ("forestgreen", [34, 139, 34]),
    ("fuchsia", [255, 0, 255]),
    ("gainsboro", [220, 220, 220]),
    ("ghostwhite", [248, 248, 255]),
    ("gold", [255, 215, 0]),
    ("goldenrod", [218, 165, 32]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("greenyellow", [173, 255, 47]),
    ("grey", [128, 128, 128]),
    ("honeydew", [240, 255, 240]),
    ("hotpink", [255, 105, 180]),
    ("indianred", [205, 92, 92]),
    ("indigo", [75, 0, 130]),
    ("ivory", [255, 255, 240]),
    ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]),
    ("lavenderblush", [255, 240, 245]),
    ("lawngreen", [124, 252, 0]),
    ("lemonchiffon", [255, 250, 205]),
    ("lightblue", [173, 216, 230]),
    ("lightcoral", [240, 128, 128]),
    ("lightcyan", [224, 255, 255]),
    ("lightgoldenrodyellow", [250, 250, 210]),
    ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lightgrey", [211, 211, 211]),
    ("lightpink", [255, 182, 193]),
    ("lightsalmon", [255, 160, 122]),
    ("lightseagreen", [32, 178, 170]),
    ("lightskyblue", [135, 206, 250]),
    ("lightslategray", [119, 136, 153]),
    ("lightslategrey", [119, 136, 153]),
    ("lightsteelblue", [176, 196, 222]),
    ("lightyellow", [255, 255, 224]),
    ("lime", [0, 255, 0]),
    ("limegreen", [50, 205, 50]),
    ("linen", [250, 240, 230]),
    ("magenta", [255, 0, 255]),
    ("maroon", [128, 0, 0]),
    ("mediumaquamarine", [102, 205, 170]),
    ("mediumblue", [0, 0, 205]),
    ("mediumorchid", [186, 85, 211]),
    ("mediumpurple", [147, 112, 219]),
    ("mediumseagreen", [60, 179, 113]),
    ("mediumslateblue", [123, 104, 238]),
    ("mediumspringgreen", [0, 250, 154]),
    ("mediumturquoise", [72, 209, 204]),
    ("mediumvioletred", [199, 21, 133]),
    ("midnightblue", [25, 25, 112]),
    ("mintcream", [245, 255, 250]),
    ("mistyrose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]),
    ("navajowhite", [255, 222, 173]),
    ("navy", [0, 0, 128]),
    ("oldlace", [253, 245, 230]),
    ("olive", [128, 128, 0]),
    ("olivedrab", [107, 142, 35]),
    ("orange", [255, 165, 0]),
    ("orangered", [255, 69, 0]),
    ("orchid", [218, 112, 214]),
    ("palegoldenrod", [238, 232, 170]),
    ("palegreen", [152, 251, 152]),
    ("paleturquoise", [175, 238, 238]),
    ("palevioletred", [219, 112, 147]),
    ("papayawhip", [255, 239, 213]),
    ("peachpuff", [255, 218, 185]),
    ("peru", [205, 133, 63]),
    ("pink", [255, 192, 203]),
    ("plum", [221, 160, 221]),
    ("powderblue", [176, 224, 230]),
    ("purple", [128, 0, 128]),
    ("rebeccapurple", [102, 51, 153]),
    ("red", [255, 0, 0]),
    ("rosybrown", [188, 143, 143]),
    ("royalblue", [65, 105, 225]),
    ("saddlebrown", [139, 69, 19]),
    ("salmon", [250, 128, 114]),
    ("sandybrown", [244, 164, 96]),
    ("seagreen", [46, 139, 87]),
    ("seashell", [255, 245, 238]),
    ("sienna", [160, 82, 45]),
    ("silver", [192, 192, 192]),
    ("skyblue", [135, 206, 235]),
    ("slateblue", [106, 90, 205]),
    ("slategray", [112, 128, 144]),
    ("slategrey", [112, 128, 144]),
    ("snow", [255, 250, 250]),
    ("springgreen", [0, 255, 127]),
    ("steelblue", [70, 130, 180]),
    ("tan", [210, 180, 140]),
    ("teal", [0, 128, 128]),
    ("thistle", [216, 191, 216]),
    ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]),
    ("violet", [238, 130, 238]),
    ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]),
    ("whitesmoke", [245, 245, 245]),
    ("yellow", [255, 255, 0]),
    ("yellowgreen", [154, 205, 50]),
];

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Rgba {
    type Err = StyleError;

    /// Parse a CSS color: hex, `rgb()`, `rgba()`, `hsl()`, `hsla()` or a named color
    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_ascii_lowercase();

        let parsed = if let Some(hex) = value.strip_prefix('#') {
            Self::parse_hex(hex)
        } else if let Some(inner) = value
            .strip_prefix("rgba(")
            .or_else(|| value.strip_prefix("rgb("))
        {
            Self::parse_rgb(inner)
        } else if let Some(inner) = value
            .strip_prefix("hsla(")
            .or_else(|| value.strip_prefix("hsl("))
        {
            Self::parse_hsl(inner)
        } else {
            Self::named(&value)
        };

        parsed
            .ok_or_else(|| StyleError::InvalidColor(s.to_string()))?
            .normalized()
    }
}

impl TryFrom<ColorLike> for Rgba {
    type Error = StyleError;

    fn try_from(color: ColorLike) -> Result<Self> {
        match color {
            ColorLike::Css(css) => css.parse(),
            ColorLike::Array([r, g, b, a]) => Rgba::new(r, g, b, a).normalized(),
        }
    }
}

/// Serializes as a canvas color string, e.g. `rgba(128,0,128,1)`
impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Adding 0.0 turns -0.0 into 0.0
        write!(
            f,
            "rgba({},{},{},{})",
            self.r + 0.0,
            self.g + 0.0,
            self.b + 0.0,
            self.a + 0.0
        )
    }
}

impl From<&str> for ColorLike {
    fn from(css: &str) -> Self {
        Self::Css(css.to_string())
    }
}

impl From<String> for ColorLike {
    fn from(css: String) -> Self {
        Self::Css(css)
    }
}

impl From<[f64; 4]> for ColorLike {
    fn from(channels: [f64; 4]) -> Self {
        Self::Array(channels)
    }
}

impl From<Rgba> for ColorLike {
    fn from(color: Rgba) -> Self {
        Self::Array([color.r, color.g, color.b, color.a])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!("#f00".parse::<Rgba>().unwrap(), Rgba::opaque(255, 0, 0));
        assert_eq!("#00ff00".parse::<Rgba>().unwrap(), Rgba::opaque(0, 255, 0));

        let with_alpha: Rgba = "#0000ff80".parse().unwrap();
        assert_eq!(with_alpha.b, 255.0);
        assert!((with_alpha.a - 128.0 / 255.0).abs() < 1e-9);

        let short_alpha: Rgba = "#fff0".parse().unwrap();
        assert_eq!(short_alpha.a, 0.0);
    }

    #[test]
    fn test_parse_functional_forms() {
        let rgb: Rgba = "rgb(10, 20, 30)".parse().unwrap();
        assert_eq!(rgb, Rgba::new(10.0, 20.0, 30.0, 1.0));

        let rgba: Rgba = " RGBA(255,0,0,0.5) ".parse().unwrap();
        assert_eq!(rgba, Rgba::new(255.0, 0.0, 0.0, 0.5));
    }

    #[test]
    fn test_parse_clamps_channels() {
        let color: Rgba = "rgba(300,-5,12.6,2)".parse().unwrap();
        assert_eq!(color, Rgba::new(255.0, 0.0, 13.0, 1.0));
    }

    #[test]
    fn test_parse_space_and_percent_forms() {
        assert_eq!("rgb(255 0 0)".parse::<Rgba>().unwrap(), Rgba::opaque(255, 0, 0));
        assert_eq!(
            "rgb(255 0 0 / 50%)".parse::<Rgba>().unwrap(),
            Rgba::new(255.0, 0.0, 0.0, 0.5)
        );
        assert_eq!(
            "rgba(255,0,0,50%)".parse::<Rgba>().unwrap(),
            Rgba::new(255.0, 0.0, 0.0, 0.5)
        );
        assert_eq!("rgb(100%, 0%, 50%)".parse::<Rgba>().unwrap(), Rgba::opaque(255, 0, 128));
    }

    #[test]
    fn test_parse_hsl() {
        assert_eq!("hsl(120, 100%, 50%)".parse::<Rgba>().unwrap(), Rgba::opaque(0, 255, 0));
        assert_eq!("hsl(0, 100%, 50%)".parse::<Rgba>().unwrap(), Rgba::opaque(255, 0, 0));
        assert_eq!("hsl(-120, 100%, 50%)".parse::<Rgba>().unwrap(), Rgba::opaque(0, 0, 255));
        assert_eq!("hsl(0, 0%, 100%)".parse::<Rgba>().unwrap(), Rgba::opaque(255, 255, 255));
        assert_eq!(
            "hsla(240deg 100% 50% / 0.25)".parse::<Rgba>().unwrap(),
            Rgba::new(0.0, 0.0, 255.0, 0.25)
        );
        assert_eq!(
            "hsla(270, 50%, 40%, 1)".parse::<Rgba>().unwrap(),
            Rgba::opaque(102, 51, 153)
        );
    }

    #[test]
    fn test_parse_named() {
        assert_eq!("Red".parse::<Rgba>().unwrap(), Rgba::opaque(255, 0, 0));
        assert_eq!("transparent".parse::<Rgba>().unwrap(), Rgba::TRANSPARENT);
        assert_eq!("dodgerblue".parse::<Rgba>().unwrap(), Rgba::opaque(30, 144, 255));
        assert_eq!("rebeccapurple".parse::<Rgba>().unwrap(), Rgba::opaque(102, 51, 153));
        assert_eq!("lightblue".parse::<Rgba>().unwrap(), Rgba::opaque(173, 216, 230));
        assert_eq!("DarkSlateGray".parse::<Rgba>().unwrap(), Rgba::opaque(47, 79, 79));
        assert_eq!("aliceblue".parse::<Rgba>().unwrap(), Rgba::opaque(240, 248, 255));
        assert_eq!("yellowgreen".parse::<Rgba>().unwrap(), Rgba::opaque(154, 205, 50));
    }

    #[test]
    fn test_named_table_is_sorted() {
        assert_eq!(NAMED_COLORS.len(), 148);
        assert!(NAMED_COLORS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_parse_invalid() {
        for input in [
            "",
            "#12",
            "#ggg",
            "rgb(1,2)",
            "rgb(1,2,3",
            "not-a-color",
            "rgba(a,b,c,d)",
            "rgb(1 2 3 4)",
            "rgb(1,2,3,4,5)",
            "hsl(120, 100%)",
            "hsl(red, 100%, 50%)",
            "dodgerblu",
        ] {
            assert_eq!(
                input.parse::<Rgba>(),
                Err(StyleError::InvalidColor(input.to_string())),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_array_conversion() {
        let color = Rgba::try_from(ColorLike::from([0.0, 0.0, 255.0, 1.0])).unwrap();
        assert_eq!(color, Rgba::opaque(0, 0, 255));

        assert!(Rgba::try_from(ColorLike::from([f64::NAN, 0.0, 0.0, 1.0])).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Rgba::opaque(128, 0, 128).to_string(), "rgba(128,0,128,1)");
        assert_eq!(Rgba::new(1.0, 2.0, 3.0, 0.25).to_string(), "rgba(1,2,3,0.25)");
        assert_eq!(Rgba::new(-0.0, 0.0, 0.0, 1.0).to_string(), "rgba(0,0,0,1)");
    }

    #[test]
    fn test_quantized() {
        let color = Rgba::new(12.4, 300.0, -3.0, 0.456).quantized();
        assert_eq!(color, Rgba::new(12.0, 255.0, 0.0, 0.46));
        assert_eq!(Rgba::new(f64::INFINITY, 0.0, 0.0, 1.0).quantized(), Rgba::BLACK);
    }

    #[test]
    fn test_to_rgba8() {
        assert_eq!(Rgba::new(255.0, 128.0, 0.0, 0.5).to_rgba8(), [255, 128, 0, 128]);
    }
}
