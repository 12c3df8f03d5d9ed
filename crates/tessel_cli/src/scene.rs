//! Scene files (scene.toml)
//!
//! A scene is an ordered list of drawing operations replayed onto one
//! graphics context.

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tessel_core::Color;
use tessel_paint::{BatchMode, FillOptions, GraphicsContext, LineCap, LineJoin, StrokeOptions};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CapArg {
    #[default]
    Butt,
    Round,
    Square,
}

impl From<CapArg> for LineCap {
    fn from(cap: CapArg) -> Self {
        match cap {
            CapArg::Butt => LineCap::Butt,
            CapArg::Round => LineCap::Round,
            CapArg::Square => LineCap::Square,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinArg {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl From<JoinArg> for LineJoin {
    fn from(join: JoinArg) -> Self {
        match join {
            JoinArg::Miter => LineJoin::Miter,
            JoinArg::Round => LineJoin::Round,
            JoinArg::Bevel => LineJoin::Bevel,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneBatchMode {
    #[default]
    Auto,
    Batch,
    NoBatch,
}

impl From<SceneBatchMode> for BatchMode {
    fn from(mode: SceneBatchMode) -> Self {
        match mode {
            SceneBatchMode::Auto => BatchMode::Auto,
            SceneBatchMode::Batch => BatchMode::Batch,
            SceneBatchMode::NoBatch => BatchMode::NoBatch,
        }
    }
}

/// Stroke parameters shared by the CLI flags and scene ops
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StrokeArgs {
    pub width: f32,
    pub alignment: f32,
    pub cap: CapArg,
    pub join: JoinArg,
    pub miter_limit: f32,
    pub color: Option<String>,
}

impl Default for StrokeArgs {
    fn default() -> Self {
        Self {
            width: 1.0,
            alignment: 0.5,
            cap: CapArg::Butt,
            join: JoinArg::Miter,
            miter_limit: 10.0,
            color: None,
        }
    }
}

impl StrokeArgs {
    pub fn to_options(&self) -> Result<StrokeOptions> {
        Ok(StrokeOptions {
            fill: FillOptions {
                color: parse_color(self.color.as_deref())?,
                ..FillOptions::default()
            },
            width: Some(self.width),
            alignment: Some(self.alignment),
            cap: Some(self.cap.into()),
            join: Some(self.join.into()),
            miter_limit: Some(self.miter_limit),
        })
    }
}

/// One drawing operation
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SceneOp {
    Fill {
        path: String,
        #[serde(default)]
        color: Option<String>,
    },
    Stroke {
        path: String,
        #[serde(flatten)]
        stroke: StrokeArgs,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        #[serde(default)]
        radius: f32,
        #[serde(default)]
        color: Option<String>,
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        #[serde(default)]
        color: Option<String>,
    },
}

/// Top-level scene description
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Scene {
    #[serde(default)]
    pub batch_mode: SceneBatchMode,
    #[serde(default)]
    pub ops: Vec<SceneOp>,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Replay the scene onto `ctx`
    pub fn draw(&self, ctx: &mut GraphicsContext) -> Result<()> {
        ctx.set_batch_mode(self.batch_mode.into());
        for (i, op) in self.ops.iter().enumerate() {
            draw_op(ctx, op).with_context(|| format!("Scene op #{}", i + 1))?;
        }
        Ok(())
    }
}

fn fill_options(color: Option<&str>) -> Result<FillOptions> {
    Ok(FillOptions {
        color: parse_color(color)?,
        ..FillOptions::default()
    })
}

fn draw_op(ctx: &mut GraphicsContext, op: &SceneOp) -> Result<()> {
    match op {
        SceneOp::Fill { path, color } => {
            ctx.begin_path();
            ctx.svg_path(path)?;
            ctx.fill_with(fill_options(color.as_deref())?);
        }
        SceneOp::Stroke { path, stroke } => {
            ctx.begin_path();
            ctx.svg_path(path)?;
            ctx.stroke_with(stroke.to_options()?);
        }
        SceneOp::Rect {
            x,
            y,
            width,
            height,
            radius,
            color,
        } => {
            ctx.begin_path();
            if *radius > 0.0 {
                ctx.round_rect(*x, *y, *width, *height, *radius);
            } else {
                ctx.rect(*x, *y, *width, *height);
            }
            ctx.fill_with(fill_options(color.as_deref())?);
        }
        SceneOp::Circle {
            x,
            y,
            radius,
            color,
        } => {
            ctx.begin_path();
            ctx.circle(*x, *y, *radius);
            ctx.fill_with(fill_options(color.as_deref())?);
        }
    }
    Ok(())
}

/// Parse an optional `#rrggbb` style color
pub fn parse_color(value: Option<&str>) -> Result<Option<Color>> {
    value
        .map(|v| Color::from_hex_str(v).ok_or_else(|| anyhow!("Invalid color: {v}")))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r##"
batch_mode = "no-batch"

[[ops]]
op = "rect"
x = 0
y = 0
width = 10
height = 10
color = "#ff0000"

[[ops]]
op = "stroke"
path = "M0 0 L 50 0 L 50 50"
width = 4
cap = "round"
join = "bevel"

[[ops]]
op = "circle"
x = 5
y = 5
radius = 3
"##;

    #[test]
    fn test_scene_parses_and_draws() {
        let scene: Scene = toml::from_str(SCENE).unwrap();
        assert_eq!(scene.ops.len(), 3);
        assert_eq!(scene.batch_mode, SceneBatchMode::NoBatch);
        match &scene.ops[1] {
            SceneOp::Stroke { stroke, .. } => {
                assert_eq!(stroke.width, 4.0);
                assert_eq!(stroke.cap, CapArg::Round);
                assert_eq!(stroke.join, JoinArg::Bevel);
                assert_eq!(stroke.miter_limit, 10.0);
            }
            other => panic!("expected stroke, got {other:?}"),
        }

        let mut ctx = GraphicsContext::new();
        scene.draw(&mut ctx).unwrap();
        assert_eq!(ctx.instructions().len(), 3);
        assert_eq!(ctx.batch_mode(), BatchMode::NoBatch);
        assert_eq!(ctx.stroke_style().width, 4.0);
    }

    #[test]
    fn test_bad_path_names_the_op() {
        let scene = Scene {
            ops: vec![
                SceneOp::Circle {
                    x: 0.0,
                    y: 0.0,
                    radius: 1.0,
                    color: None,
                },
                SceneOp::Fill {
                    path: "L 10 10".to_string(),
                    color: None,
                },
            ],
            ..Scene::default()
        };
        let err = scene.draw(&mut GraphicsContext::new()).unwrap_err();
        assert!(format!("{err:#}").contains("Scene op #2"));
    }

    #[test]
    fn test_invalid_color_is_an_error() {
        assert!(parse_color(Some("#12")).is_err());
        assert_eq!(parse_color(None).unwrap(), None);
        assert_eq!(parse_color(Some("#00ff00")).unwrap(), Some(Color::GREEN));
    }
}
