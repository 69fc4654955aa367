//! Color types and markup color-code resolution.
//!
//! The markup addresses colors either by a one-character mnemonic (`r`, `g`,
//! `b`, ...) or by a CSS-style hex string (`#RGB` or `#RRGGBB`). Resolution
//! is total: anything unrecognized falls back to opaque white, so a bad
//! color code can never abort a parse or a draw.

/// RGBA color with floating-point components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    /// Red component (0.0-1.0).
    pub r: f32,
    /// Green component (0.0-1.0).
    pub g: f32,
    /// Blue component (0.0-1.0).
    pub b: f32,
    /// Alpha component (0.0-1.0, 1.0 = fully opaque).
    pub a: f32,
}

impl Rgba {
    /// Opaque white — the fallback for every unresolvable color code.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Opaque green (mnemonic `g`).
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 1.0).
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Create a color with modified alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Complementary color at the given alpha.
    ///
    /// Used as the translucent background fallback for bars that carry no
    /// explicit background color group.
    #[must_use]
    pub fn complement(self, a: f32) -> Self {
        Self::new(1.0 - self.r, 1.0 - self.g, 1.0 - self.b, a)
    }
}

/// A color code as written in the markup: mnemonic or hex string.
///
/// Kept unresolved inside parsed elements so the layout engine resolves
/// against a single total function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSpec(String);

impl ColorSpec {
    /// Wrap a raw color code.
    #[must_use]
    pub fn new(spec: impl Into<String>) -> Self {
        Self(spec.into())
    }

    /// The raw code as written in the markup.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve to an opaque [`Rgba`]. Total; never errors.
    ///
    /// Mnemonics use a fixed 9-entry table. A leading `#` selects hex form:
    /// 3 digits expand by doubling (`#29c` -> `#2299cc`), 6 digits parse to
    /// three bytes normalized to [0, 1]. Any other shape is white.
    #[must_use]
    pub fn resolve(&self) -> Rgba {
        resolve(&self.0)
    }
}

impl From<&str> for ColorSpec {
    fn from(spec: &str) -> Self {
        Self::new(spec)
    }
}

/// Resolve a raw color code to an opaque [`Rgba`]. Total; never errors.
#[must_use]
pub fn resolve(spec: &str) -> Rgba {
    match spec {
        "r" => Rgba::rgb(1.0, 0.0, 0.0),
        "g" => Rgba::rgb(0.0, 1.0, 0.0),
        "b" => Rgba::rgb(0.0, 0.0, 1.0),
        "y" => Rgba::rgb(1.0, 1.0, 0.0),
        "k" => Rgba::rgb(0.0, 0.0, 0.0),
        "w" => Rgba::rgb(1.0, 1.0, 1.0),
        "c" => Rgba::rgb(0.0, 1.0, 1.0),
        "m" => Rgba::rgb(1.0, 0.0, 1.0),
        "o" => Rgba::rgb(1.0, 0.7, 0.0),
        _ => spec
            .strip_prefix('#')
            .and_then(resolve_hex)
            .unwrap_or(Rgba::WHITE),
    }
}

/// Parse the hex digits after `#`. `None` on any malformed input.
fn resolve_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };

    let byte = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    let (r, g, b) = (byte(0)?, byte(2)?, byte(4)?);

    Some(Rgba::rgb(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
    ))
}
