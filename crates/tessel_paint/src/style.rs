//! Fill and stroke styles
//!
//! Styles are immutable values. A context holds one current fill and one
//! current stroke style and replaces them wholesale through
//! [`resolve_fill_style`] / [`resolve_stroke_style`].

use tessel_core::{Affine2D, Color, Texture};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// How texture coordinates are derived for a textured fill
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextureSpace {
    /// The texture is stretched over each shape's bounds
    #[default]
    Local,
    /// Texture pixels map 1:1 onto path space and repeat
    Global,
}

/// Resolved fill style
#[derive(Clone, Debug, PartialEq)]
pub struct FillStyle {
    /// Base color; its own alpha is folded into `alpha` during resolution
    pub color: Color,
    pub alpha: f32,
    pub texture: Texture,
    /// Pattern transform, mapping texture space into path space
    pub matrix: Option<Affine2D>,
    pub texture_space: TextureSpace,
}

impl Default for FillStyle {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            alpha: 1.0,
            texture: Texture::WHITE,
            matrix: None,
            texture_space: TextureSpace::Local,
        }
    }
}

/// Resolved stroke style
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    pub fill: FillStyle,
    pub width: f32,
    /// 0.0 = outside the path, 0.5 = centered, 1.0 = inside
    pub alignment: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            fill: FillStyle::default(),
            width: 1.0,
            alignment: 0.5,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 10.0,
        }
    }
}

/// Partial fill description; unset fields keep the defaults
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FillOptions {
    pub color: Option<Color>,
    pub alpha: Option<f32>,
    pub texture: Option<Texture>,
    pub matrix: Option<Affine2D>,
    pub texture_space: Option<TextureSpace>,
}

/// Partial stroke description; unset fields keep the defaults
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokeOptions {
    pub fill: FillOptions,
    pub width: Option<f32>,
    pub alignment: Option<f32>,
    pub cap: Option<LineCap>,
    pub join: Option<LineJoin>,
    pub miter_limit: Option<f32>,
}

/// Anything a fill can be described with
#[derive(Clone, Debug, PartialEq)]
pub enum FillInput {
    Color(Color),
    Texture(Texture),
    Pattern { texture: Texture, matrix: Affine2D },
    Options(FillOptions),
}

impl From<Color> for FillInput {
    fn from(color: Color) -> Self {
        FillInput::Color(color)
    }
}

impl From<Texture> for FillInput {
    fn from(texture: Texture) -> Self {
        FillInput::Texture(texture)
    }
}

impl From<FillOptions> for FillInput {
    fn from(options: FillOptions) -> Self {
        FillInput::Options(options)
    }
}

/// Anything a stroke can be described with
#[derive(Clone, Debug, PartialEq)]
pub enum StrokeInput {
    Fill(FillInput),
    Options(StrokeOptions),
}

impl From<FillInput> for StrokeInput {
    fn from(input: FillInput) -> Self {
        StrokeInput::Fill(input)
    }
}

impl From<Color> for StrokeInput {
    fn from(color: Color) -> Self {
        StrokeInput::Fill(FillInput::Color(color))
    }
}

impl From<Texture> for StrokeInput {
    fn from(texture: Texture) -> Self {
        StrokeInput::Fill(FillInput::Texture(texture))
    }
}

impl From<StrokeOptions> for StrokeInput {
    fn from(options: StrokeOptions) -> Self {
        StrokeInput::Options(options)
    }
}

/// Split a color's own alpha out of it
fn split_alpha(color: Color, fallback: f32) -> (Color, f32) {
    let alpha = if color.a == 1.0 { fallback } else { color.a };
    (color.with_alpha(1.0), alpha)
}

/// Resolve `input` against `defaults` into a complete fill style
pub fn resolve_fill_style(input: impl Into<FillInput>, defaults: &FillStyle) -> FillStyle {
    match input.into() {
        FillInput::Color(color) => {
            let (color, alpha) = split_alpha(color, defaults.alpha);
            FillStyle {
                color,
                alpha,
                texture: Texture::WHITE,
                matrix: None,
                texture_space: defaults.texture_space,
            }
        }
        FillInput::Texture(texture) => FillStyle {
            color: Color::WHITE,
            alpha: defaults.alpha,
            texture,
            matrix: None,
            texture_space: TextureSpace::Local,
        },
        FillInput::Pattern { texture, matrix } => FillStyle {
            color: Color::WHITE,
            alpha: defaults.alpha,
            texture,
            matrix: Some(matrix),
            texture_space: TextureSpace::Global,
        },
        FillInput::Options(options) => {
            let mut style = defaults.clone();
            if let Some(color) = options.color {
                let (color, alpha) = split_alpha(color, style.alpha);
                style.color = color;
                style.alpha = alpha;
            }
            if let Some(alpha) = options.alpha {
                style.alpha = alpha;
            }
            if let Some(texture) = options.texture {
                style.texture = texture;
            }
            if let Some(matrix) = options.matrix {
                style.matrix = Some(matrix);
            }
            if let Some(space) = options.texture_space {
                style.texture_space = space;
            }
            style.alpha = style.alpha.clamp(0.0, 1.0);
            style
        }
    }
}

/// Resolve `input` against `defaults` into a complete stroke style
pub fn resolve_stroke_style(input: impl Into<StrokeInput>, defaults: &StrokeStyle) -> StrokeStyle {
    match input.into() {
        StrokeInput::Fill(fill) => StrokeStyle {
            fill: resolve_fill_style(fill, &defaults.fill),
            ..defaults.clone()
        },
        StrokeInput::Options(options) => StrokeStyle {
            fill: resolve_fill_style(options.fill, &defaults.fill),
            width: options.width.unwrap_or(defaults.width).max(0.0),
            alignment: options
                .alignment
                .unwrap_or(defaults.alignment)
                .clamp(0.0, 1.0),
            cap: options.cap.unwrap_or(defaults.cap),
            join: options.join.unwrap_or(defaults.join),
            miter_limit: options.miter_limit.unwrap_or(defaults.miter_limit),
        },
    }
}
