//! Drawable capability of scene nodes

use std::fmt::Debug;

use crate::foundation::math::Vec2;
use crate::render::{Color, CullingId, GraphicsLayer, MaterialId, RenderTexture, TextureId};

/// Which renderer, index and transform space a node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Screen-space 2D
    TwoD,
    /// World-space 3D
    ThreeD,
}

/// What a drawable submits to the graphics layer
#[derive(Debug, Clone, PartialEq)]
pub enum DrawnContent {
    /// Textured quad
    Sprite {
        /// Texture, `None` draws a white quad
        texture: Option<TextureId>,
        /// Size in pixels
        size: Vec2,
    },
    /// Filled polygon
    Polygon {
        /// Vertices in local space
        vertices: Vec<Vec2>,
    },
    /// Text run
    Text {
        /// Text to draw
        text: String,
    },
    /// Triangle mesh
    Mesh {
        /// Vertices in the mesh buffer
        vertex_count: u32,
    },
    /// Opaque user command list, interpreted by the graphics layer
    Command {
        /// Command identity
        id: u64,
    },
}

impl DrawnContent {
    /// True for polygons and meshes that cannot form a single triangle
    pub fn is_degenerate(&self) -> bool {
        match self {
            Self::Polygon { vertices } => vertices.len() < 3,
            Self::Mesh { vertex_count } => *vertex_count < 3,
            Self::Sprite { .. } | Self::Text { .. } | Self::Command { .. } => false,
        }
    }
}

/// A pass that reads the framebuffer drawn so far and writes a processed image back
pub trait PostEffect: Debug {
    /// Draw the effect. `source` holds a copy of everything drawn before it.
    fn draw(&self, graphics: &mut dyn GraphicsLayer, source: &RenderTexture, clear_color: Color);
}

/// Post-effect rendering one fullscreen quad with a material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullscreenPostEffect {
    /// Material sampling the source copy
    pub material: MaterialId,
}

impl FullscreenPostEffect {
    /// Create the effect
    pub fn new(material: MaterialId) -> Self {
        Self { material }
    }
}

impl PostEffect for FullscreenPostEffect {
    fn draw(&self, graphics: &mut dyn GraphicsLayer, source: &RenderTexture, _clear_color: Color) {
        graphics.draw_fullscreen(self.material, source);
    }
}

/// Drawable variant; the dispatcher switches on this tag
#[derive(Debug)]
pub enum DrawnKind {
    /// Drawn only when the culling system reports its id visible
    Cullable {
        /// Identity in the culling system, assigned when the node enters the engine
        culling_id: CullingId,
        /// What to draw
        content: DrawnContent,
    },
    /// Drawn whenever visible; never culled
    Plain {
        /// What to draw
        content: DrawnContent,
    },
    /// Framebuffer post-processing step; never culled, ignores `is_drawn`
    PostEffect(Box<dyn PostEffect>),
}

/// Drawable capability: ordering keys, visibility and payload
#[derive(Debug)]
pub struct Drawn {
    pub(crate) z_order: i32,
    pub(crate) camera_group: u64,
    pub(crate) is_drawn: bool,
    pub(crate) is_drawn_actually: bool,
    pub(crate) dimension: Dimension,
    pub(crate) kind: DrawnKind,
}

impl Drawn {
    /// Drawable with z-order 0, no camera group and visible
    pub fn new(dimension: Dimension, kind: DrawnKind) -> Self {
        Self {
            z_order: 0,
            camera_group: 0,
            is_drawn: true,
            is_drawn_actually: true,
            dimension,
            kind,
        }
    }

    /// Cullable drawable; the culling id is assigned on insertion
    pub fn cullable(dimension: Dimension, content: DrawnContent) -> Self {
        Self::new(
            dimension,
            DrawnKind::Cullable {
                culling_id: CullingId::UNASSIGNED,
                content,
            },
        )
    }

    /// Paint order key; lower is drawn first
    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    /// Camera-group mask
    pub fn camera_group(&self) -> u64 {
        self.camera_group
    }

    /// Local visibility toggle
    pub fn is_drawn(&self) -> bool {
        self.is_drawn
    }

    /// Visibility after same-dimension drawable ancestors are taken into account
    pub fn is_drawn_actually(&self) -> bool {
        self.is_drawn_actually
    }

    /// Index this drawable lives in
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Variant and payload
    pub fn kind(&self) -> &DrawnKind {
        &self.kind
    }

    /// Culling id of a cullable drawable
    pub fn culling_id(&self) -> Option<CullingId> {
        match self.kind {
            DrawnKind::Cullable { culling_id, .. } => Some(culling_id),
            DrawnKind::Plain { .. } | DrawnKind::PostEffect(_) => None,
        }
    }

    /// Payload of a cullable or plain drawable
    pub fn content(&self) -> Option<&DrawnContent> {
        match &self.kind {
            DrawnKind::Cullable { content, .. } | DrawnKind::Plain { content } => Some(content),
            DrawnKind::PostEffect(_) => None,
        }
    }

    /// Mutable payload, for updating text, vertices and the like
    pub fn content_mut(&mut self) -> Option<&mut DrawnContent> {
        match &mut self.kind {
            DrawnKind::Cullable { content, .. } | DrawnKind::Plain { content } => Some(content),
            DrawnKind::PostEffect(_) => None,
        }
    }

    pub(crate) fn assign_culling_id(&mut self, id: CullingId) {
        if let DrawnKind::Cullable { culling_id, .. } = &mut self.kind {
            *culling_id = id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{GraphicsCall, HeadlessGraphics, TextureFormat, TextureSize};

    #[test]
    fn test_degenerate_content() {
        let two = DrawnContent::Polygon { vertices: vec![Vec2::zeros(), Vec2::new(1.0, 0.0)] };
        let tri = DrawnContent::Polygon {
            vertices: vec![Vec2::zeros(), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
        };
        assert!(two.is_degenerate());
        assert!(!tri.is_degenerate());
        assert!(DrawnContent::Mesh { vertex_count: 0 }.is_degenerate());
        assert!(!DrawnContent::Text { text: String::new() }.is_degenerate());
    }

    #[test]
    fn test_culling_id_only_for_cullable() {
        let mut drawn = Drawn::cullable(Dimension::TwoD, DrawnContent::Text { text: "a".into() });
        assert_eq!(drawn.culling_id(), Some(CullingId::UNASSIGNED));
        drawn.assign_culling_id(CullingId(4));
        assert_eq!(drawn.culling_id(), Some(CullingId(4)));

        let plain = Drawn::new(Dimension::TwoD, DrawnKind::Plain { content: DrawnContent::Command { id: 1 } });
        assert_eq!(plain.culling_id(), None);
    }

    #[test]
    fn test_fullscreen_effect_samples_source() {
        let mut gfx = HeadlessGraphics::new(TextureSize::new(4, 4));
        let source = gfx.acquire_scratch_texture(TextureSize::new(4, 4), TextureFormat::Rgba8);
        let effect = FullscreenPostEffect::new(MaterialId(9));

        effect.draw(&mut gfx, &source, Color::default());

        assert_eq!(
            gfx.calls().last(),
            Some(&GraphicsCall::DrawFullscreen { material: MaterialId(9), source: source.id })
        );
    }
}
