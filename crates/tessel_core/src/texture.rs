//! Texture handles
//!
//! Textures are owned by the GPU backend; geometry only needs an identity to
//! batch by, the source dimensions, and the frame inside the source (atlas
//! sub-rectangle) to derive UVs.

use crate::geometry::Size;
use crate::shapes::Rectangle;
use serde::{Deserialize, Serialize};

/// Opaque texture identity assigned by the backend
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u64);

impl TextureId {
    /// Reserved for the 1x1 white texture used by untextured fills
    pub const WHITE: TextureId = TextureId(0);
}

/// UV coordinates of a texture frame's four corners, clockwise from top-left
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureUvs {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub x3: f32,
    pub y3: f32,
}

/// A (sub-)texture reference
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    pub id: TextureId,
    /// Full size of the source image in pixels
    pub source_size: Size,
    /// Region of the source this texture samples, in pixels
    pub frame: Rectangle,
}

impl Texture {
    pub const WHITE: Texture = Texture {
        id: TextureId::WHITE,
        source_size: Size::new(1.0, 1.0),
        frame: Rectangle::new(0.0, 0.0, 1.0, 1.0),
    };

    /// A texture covering its whole source
    pub fn new(id: TextureId, width: f32, height: f32) -> Self {
        Self {
            id,
            source_size: Size::new(width, height),
            frame: Rectangle::new(0.0, 0.0, width, height),
        }
    }

    /// A sub-texture; the frame is in source pixels
    pub fn with_frame(mut self, frame: Rectangle) -> Self {
        self.frame = frame;
        self
    }

    pub fn is_white(&self) -> bool {
        self.id == TextureId::WHITE
    }

    pub fn uvs(&self) -> TextureUvs {
        let w = if self.source_size.width > 0.0 {
            self.source_size.width
        } else {
            1.0
        };
        let h = if self.source_size.height > 0.0 {
            self.source_size.height
        } else {
            1.0
        };
        let u0 = self.frame.x / w;
        let v0 = self.frame.y / h;
        let u1 = (self.frame.x + self.frame.width) / w;
        let v1 = (self.frame.y + self.frame.height) / h;
        TextureUvs {
            x0: u0,
            y0: v0,
            x1: u1,
            y1: v0,
            x2: u1,
            y2: v1,
            x3: u0,
            y3: v1,
        }
    }
}

impl Default for Texture {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atlas_frame_uvs() {
        let atlas = Texture::new(TextureId(7), 256.0, 128.0)
            .with_frame(Rectangle::new(64.0, 32.0, 64.0, 32.0));
        let uvs = atlas.uvs();
        assert_eq!((uvs.x0, uvs.y0), (0.25, 0.25));
        assert_eq!((uvs.x2, uvs.y2), (0.5, 0.5));
        assert_eq!((uvs.x1, uvs.y1), (0.5, 0.25));
        assert_eq!((uvs.x3, uvs.y3), (0.25, 0.5));
        assert!(!atlas.is_white());
        assert!(Texture::default().is_white());
    }

    #[test]
    fn test_texture_json_shape() {
        let texture = Texture::new(TextureId(3), 64.0, 32.0)
            .with_frame(Rectangle::new(8.0, 0.0, 16.0, 16.0));
        let json = serde_json::to_value(texture).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["source_size"]["width"], 64.0);
        assert_eq!(json["frame"]["x"], 8.0);

        let back: Texture = serde_json::from_value(json).unwrap();
        assert_eq!(back, texture);
    }
}
