//! FILENAME: core/engine/src/style.rs
//! PURPOSE: Cell formatting for report tables.
//! CONTEXT: A sheet stores each distinct style once in its StyleRegistry and
//! cells carry the index. Header, data, summary and highlight styles are
//! built with the `with_*` builders and deduplicated on write.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Horizontal alignment options for cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TextAlign {
    #[default]
    General, // Auto: numbers right, text left
    Left,
    Center,
    Right,
}

/// Vertical alignment options for cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VerticalAlign {
    Top,
    Middle,
    #[default]
    Bottom,
}

/// Number format types for displaying numeric values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NumberFormat {
    #[default]
    General,
    Number {
        decimal_places: u8,
        use_thousands_separator: bool,
    },
    Currency {
        decimal_places: u8,
        symbol: String,
    },
    Custom {
        format: String,
    },
}

impl NumberFormat {
    /// Excel format code, empty for General.
    pub fn to_format_code(&self) -> String {
        let decimals = |places: u8| {
            if places > 0 {
                format!(".{}", "0".repeat(places as usize))
            } else {
                String::new()
            }
        };
        match self {
            NumberFormat::General => String::new(),
            NumberFormat::Number { decimal_places, use_thousands_separator } => {
                if *use_thousands_separator {
                    format!("#,##0{}", decimals(*decimal_places))
                } else {
                    format!("0{}", decimals(*decimal_places))
                }
            }
            NumberFormat::Currency { decimal_places, symbol } => {
                format!("{}#,##0{}", symbol, decimals(*decimal_places))
            }
            NumberFormat::Custom { format } => format.clone(),
        }
    }
}

/// RGB color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    pub const fn black() -> Self {
        Color::new(0, 0, 0)
    }

    /// Packed 0xRRGGBB value.
    pub fn to_rgb(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::black()
    }
}

/// Border applied to all four edges of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BorderLineStyle {
    #[default]
    None,
    Thin,
    Medium,
}

/// Font style configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontStyle {
    pub family: String,
    pub size: u8, // Font size in points
    pub bold: bool,
    pub color: Color,
}

impl Default for FontStyle {
    fn default() -> Self {
        FontStyle {
            family: "Calibri".to_string(),
            size: 11,
            bold: false,
            color: Color::black(),
        }
    }
}

/// Everything the writer needs to format one cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellStyle {
    pub font: FontStyle,
    /// Solid fill; `None` leaves the cell unfilled.
    pub background: Option<Color>,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
    pub number_format: NumberFormat,
    pub border: BorderLineStyle,
    pub wrap_text: bool,
}

impl CellStyle {
    pub fn new() -> Self {
        CellStyle {
            font: FontStyle::default(),
            background: None,
            text_align: TextAlign::General,
            vertical_align: VerticalAlign::Bottom,
            number_format: NumberFormat::General,
            border: BorderLineStyle::None,
            wrap_text: false,
        }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.font.bold = bold;
        self
    }

    pub fn with_font(mut self, family: &str, size: u8) -> Self {
        self.font.family = family.to_string();
        self.font.size = size;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_text_align(mut self, align: TextAlign) -> Self {
        self.text_align = align;
        self
    }

    pub fn with_vertical_align(mut self, align: VerticalAlign) -> Self {
        self.vertical_align = align;
        self
    }

    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = format;
        self
    }

    pub fn with_border(mut self, border: BorderLineStyle) -> Self {
        self.border = border;
        self
    }

    pub fn with_wrap_text(mut self, wrap: bool) -> Self {
        self.wrap_text = wrap;
        self
    }
}

impl Default for CellStyle {
    fn default() -> Self {
        CellStyle::new()
    }
}

/// Distinct styles of one sheet. Index 0 is the default style.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    styles: Vec<CellStyle>,
    index_of: HashMap<CellStyle, usize>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        let mut index_of = HashMap::new();
        index_of.insert(CellStyle::new(), 0);
        StyleRegistry {
            styles: vec![CellStyle::new()],
            index_of,
        }
    }

    /// Index of `style`, registering it on first use.
    pub fn get_or_create(&mut self, style: CellStyle) -> usize {
        if let Some(&index) = self.index_of.get(&style) {
            return index;
        }
        let index = self.styles.len();
        self.index_of.insert(style.clone(), index);
        self.styles.push(style);
        index
    }

    /// Style at `index`; unknown indexes read as the default style.
    pub fn get(&self, index: usize) -> &CellStyle {
        self.styles.get(index).unwrap_or(&self.styles[0])
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// True while only the default style is registered.
    pub fn is_empty(&self) -> bool {
        self.styles.len() <= 1
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        StyleRegistry::new()
    }
}
