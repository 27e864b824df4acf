use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use etymograph_parser::{FontSlant, TextStyle};
use skia_safe::font::Edging;
use skia_safe::font_style::{Slant, Weight, Width};
use skia_safe::{Font, FontHinting, FontMgr, FontStyle, Typeface};

use crate::RenderError;

/// Width of a string in pixels when set in `style`.
pub trait TextMeasure {
    fn width(&self, text: &str, style: &TextStyle) -> f32;
}

/// Every character advances by `char_width` scaled to the style's size
/// relative to 16px. Lets box layout run without a font backend.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthMeasure {
    pub char_width: f32,
}

impl Default for FixedWidthMeasure {
    fn default() -> Self {
        Self { char_width: 8.0 }
    }
}

impl TextMeasure for FixedWidthMeasure {
    fn width(&self, text: &str, style: &TextStyle) -> f32 {
        text.chars().count() as f32 * self.char_width * style.size / 16.0
    }
}

const SERIF_FAMILIES: [&str; 5] = [
    "Times New Roman",
    "Times",
    "Liberation Serif",
    "DejaVu Serif",
    "Noto Serif",
];
const SANS_FAMILIES: [&str; 5] = [
    "Helvetica",
    "Arial",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FontKey {
    family: String,
    size_bits: u32,
    weight: u16,
    italic: bool,
}

impl FontKey {
    fn new(style: &TextStyle) -> Self {
        Self {
            family: style.family.clone(),
            size_bits: style.size.to_bits(),
            weight: style.weight.numeric(),
            italic: style.slant == FontSlant::Italic,
        }
    }
}

/// Resolves [`TextStyle`]s to skia fonts, caching one font per distinct style.
pub struct FontBook {
    mgr: FontMgr,
    typeface_override: Option<Typeface>,
    cache: RefCell<HashMap<FontKey, Font>>,
}

impl FontBook {
    pub fn new() -> Self {
        Self {
            mgr: FontMgr::new(),
            typeface_override: None,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Uses the font file at `path` for every style; weight and slant are
    /// synthesized.
    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let data = fs::read(path).map_err(|err| {
            RenderError::FontLoadFailed(format!("failed to read font {path:?}: {err}"))
        })?;
        let mgr = FontMgr::new();
        let typeface = mgr
            .new_from_data(&data, 0)
            .ok_or_else(|| RenderError::FontLoadFailed(format!("failed to load font {path:?}")))?;
        Ok(Self {
            mgr,
            typeface_override: Some(typeface),
            cache: RefCell::new(HashMap::new()),
        })
    }

    pub fn with_font_path(path: Option<&Path>) -> Result<Self, RenderError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::new()),
        }
    }

    pub fn font(&self, style: &TextStyle) -> Font {
        let key = FontKey::new(style);
        if let Some(font) = self.cache.borrow().get(&key) {
            return font.clone();
        }
        let font = self.make_font(style);
        self.cache.borrow_mut().insert(key, font.clone());
        font
    }

    /// Distance from the top of a line to its baseline.
    pub fn ascent(&self, style: &TextStyle) -> f32 {
        let (_, metrics) = self.font(style).metrics();
        -metrics.ascent
    }

    fn make_font(&self, style: &TextStyle) -> Font {
        let slant = match style.slant {
            FontSlant::Normal => Slant::Upright,
            FontSlant::Italic => Slant::Italic,
        };
        let weight = style.weight.numeric();
        let font_style = FontStyle::new(Weight::from(weight as i32), Width::NORMAL, slant);

        let mut font = if let Some(typeface) = self.typeface_override.as_ref() {
            let mut font = Font::from_typeface(typeface.clone(), style.size);
            font.set_embolden(weight >= 600);
            if slant == Slant::Italic {
                font.set_skew_x(-0.2);
            }
            font
        } else {
            match self.match_typeface(&style.family, font_style) {
                Some(typeface) => Font::from_typeface(typeface, style.size),
                None => {
                    tracing::debug!(
                        family = %style.family,
                        "no typeface found, using default font"
                    );
                    let mut font = Font::default();
                    font.set_size(style.size);
                    font
                }
            }
        };

        font.set_edging(Edging::AntiAlias);
        font.set_hinting(FontHinting::Slight);
        font.set_subpixel(true);
        font
    }

    fn match_typeface(&self, family: &str, style: FontStyle) -> Option<Typeface> {
        let generic: &[&str] = match family.to_ascii_lowercase().as_str() {
            "sans-serif" => &SANS_FAMILIES,
            "serif" => &SERIF_FAMILIES,
            _ if SERIF_FAMILIES.contains(&family) => &SERIF_FAMILIES,
            _ => &SANS_FAMILIES,
        };
        std::iter::once(family)
            .chain(generic.iter().copied())
            .find_map(|candidate| self.mgr.match_family_style(candidate, style))
            .or_else(|| self.mgr.legacy_make_typeface(None, style))
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasure for FontBook {
    fn width(&self, text: &str, style: &TextStyle) -> f32 {
        let (width, _) = self.font(style).measure_str(text, None);
        width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_scales_with_size() {
        let measure = FixedWidthMeasure { char_width: 10.0 };
        let base = TextStyle {
            size: 16.0,
            ..TextStyle::default()
        };
        let large = TextStyle {
            size: 32.0,
            ..TextStyle::default()
        };
        assert_eq!(measure.width("abc", &base), 30.0);
        assert_eq!(measure.width("abc", &large), 60.0);
        assert_eq!(measure.width("", &base), 0.0);
    }

    #[test]
    fn font_keys_separate_weights() {
        let regular = TextStyle::default();
        let bold = regular.with_weight(etymograph_parser::FontWeight::Bold);
        assert_ne!(FontKey::new(&regular), FontKey::new(&bold));
        assert_eq!(FontKey::new(&regular), FontKey::new(&TextStyle::default()));
    }
}
