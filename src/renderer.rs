//! The per-frame render pipeline.
//!
//! [`Renderer::render`] runs strictly in order:
//!
//! 1. **Update**: camera aspect, scene world matrices, camera view matrix.
//! 2. **Cull**: collect visible mesh nodes that touch the view frustum.
//! 3. **Depth-sort**: painter's order, farthest mesh first.
//! 4. **Rasterize**: world -> view -> clip -> NDC -> screen per triangle,
//!    backface culled by screen winding, then filled or outlined.
//! 5. **Present**: hand the pixels to the surface.
//!
//! There is no depth buffer. Sorting is per mesh, so intersecting or very
//! large meshes can overlap incorrectly.

use tracing::{debug, trace};

use crate::camera::Camera;
use crate::clipper::{ClipSpaceClipper, ClipSpacePolygon};
use crate::config::RendererConfig;
use crate::culling::{signed_area, CullingContext};
use crate::error::{RenderError, Result};
use crate::material::Material;
use crate::math::{Matrix4, Vector2, Vector3, Vector4};
use crate::raster::{Frame, Rasterizer, Rgba};
use crate::scene::{Mesh, NodeId, Scene};
use crate::surface::Surface;

/// Screen-space area below which a triangle is drawn as a line.
const DEGENERATE_AREA: f32 = 1e-6;

// ============================================================================
// Render list
// ============================================================================

/// A mesh node queued for drawing, with its painter's sort key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderItem {
    pub node: NodeId,
    /// Distance in front of the camera (view-space `-z`).
    pub depth: f32,
}

/// Visible mesh nodes for one frame. Rebuilt by every [`Renderer::render`].
#[derive(Debug, Clone, Default)]
pub struct RenderList {
    items: Vec<RenderItem>,
}

impl RenderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push(&mut self, node: NodeId, depth: f32) {
        self.items.push(RenderItem { node, depth });
    }

    /// Farthest first. Stable, so equal depths keep traversal order.
    pub fn sort_back_to_front(&mut self) {
        self.items.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    }

    pub fn items(&self) -> &[RenderItem] {
        &self.items
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.items.iter().map(|item| item.node)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Frame output
// ============================================================================

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Meshes that made it into the render list.
    pub meshes: usize,
    /// Meshes rejected by the frustum test.
    pub meshes_culled: usize,
    /// Triangles handed to the rasterizer as triangles.
    pub triangles: usize,
    /// Zero-area triangles handed to the rasterizer as lines.
    pub lines: usize,
    /// Triangles dropped for facing the wrong way.
    pub backfaces_culled: usize,
    /// Triangles dropped for reaching behind the camera.
    pub behind_camera: usize,
}

/// What the rasterizer was asked to draw, in screen space.
///
/// Points are `(x, y)` in pixels with y down, and `z` the NDC depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Triangle {
        node: NodeId,
        points: [Vector3; 3],
        color: Rgba,
        wireframe: bool,
    },
    Line {
        node: NodeId,
        points: [Vector3; 2],
        color: Rgba,
    },
}

impl Primitive {
    pub fn node(&self) -> NodeId {
        match self {
            Self::Triangle { node, .. } | Self::Line { node, .. } => *node,
        }
    }

    pub fn points(&self) -> &[Vector3] {
        match self {
            Self::Triangle { points, .. } => points,
            Self::Line { points, .. } => points,
        }
    }

    pub fn color(&self) -> Rgba {
        match self {
            Self::Triangle { color, .. } | Self::Line { color, .. } => *color,
        }
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Draws a [`Scene`] through a [`Camera`] onto a [`Surface`].
pub struct Renderer<S: Surface> {
    config: RendererConfig,
    rasterizer: Rasterizer,
    surface: S,
    culling: CullingContext,
    clipper: ClipSpaceClipper,
    render_list: RenderList,
    primitives: Vec<Primitive>,
    stats: FrameStats,
}

impl<S: Surface> Renderer<S> {
    /// Creates a renderer drawing at the configured size. The surface is
    /// resized to match when it differs.
    ///
    /// # Errors
    /// [`RenderError::InvalidSize`] for a zero width or height, or the
    /// surface's resize error.
    pub fn new(config: RendererConfig, mut surface: S) -> Result<Self> {
        check_size(config.width, config.height)?;
        if surface.width() != config.width || surface.height() != config.height {
            surface.resize(config.width, config.height)?;
        }
        debug!(width = config.width, height = config.height, "renderer created");

        Ok(Self {
            rasterizer: Rasterizer::new(config.width, config.height),
            config,
            surface,
            culling: CullingContext::default(),
            clipper: ClipSpaceClipper::near_only(),
            render_list: RenderList::new(),
            primitives: Vec::new(),
            stats: FrameStats::default(),
        })
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Replaces the whole configuration, resizing when the size changed.
    ///
    /// # Errors
    /// [`RenderError::InvalidSize`] for a zero width or height, in which case
    /// the current configuration is kept.
    pub fn set_config(&mut self, config: RendererConfig) -> Result<()> {
        check_size(config.width, config.height)?;
        self.set_size(config.width, config.height)?;
        self.config = config;
        Ok(())
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// The pixels of the last frame.
    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    pub fn render_list(&self) -> &RenderList {
        &self.render_list
    }

    /// Everything submitted to the rasterizer during the last frame, in draw order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn last_stats(&self) -> FrameStats {
        self.stats
    }

    /// Resizes the pixel buffer and the surface.
    ///
    /// # Errors
    /// [`RenderError::InvalidSize`] for a zero width or height.
    pub fn set_size(&mut self, width: u32, height: u32) -> Result<()> {
        check_size(width, height)?;
        self.config.width = width;
        self.config.height = height;
        if self.rasterizer.width() != width || self.rasterizer.height() != height {
            self.rasterizer.resize(width, height);
        }
        if self.surface.width() != width || self.surface.height() != height {
            self.surface.resize(width, height)?;
        }
        Ok(())
    }

    /// Renders one frame and presents it.
    pub fn render(&mut self, scene: &mut Scene, camera: &mut Camera) -> Result<FrameStats> {
        let mut stats = FrameStats::default();

        // Update
        if self.config.auto_aspect {
            let aspect = self.config.aspect();
            if camera
                .projection()
                .aspect()
                .is_some_and(|current| current != aspect)
            {
                camera.set_aspect(aspect);
            }
        }
        scene.update_matrix_world();
        camera.update_matrix_world();
        self.culling.update(camera);

        // Cull
        self.render_list.clear();
        let view = *camera.matrix_world_inverse();
        let culling = &self.culling;
        let render_list = &mut self.render_list;
        let frustum_culling = self.config.frustum_culling;
        let root = scene.root();
        scene.traverse_visible(root, |id, node| {
            let Some(mesh) = node.mesh.as_ref().filter(|mesh| mesh.is_visible()) else {
                return;
            };
            if frustum_culling && !culling.frustum_cull(mesh, &node.matrix_world) {
                stats.meshes_culled += 1;
                return;
            }
            render_list.push(id, sort_depth(mesh, &node.matrix_world, &view));
        });
        stats.meshes = self.render_list.len();

        // Depth-sort
        if self.config.depth_sort {
            self.render_list.sort_back_to_front();
        }

        // Rasterize
        self.primitives.clear();
        let background = scene.background.unwrap_or(self.config.background);
        let viewport = Vector2::new(self.config.width as f32, self.config.height as f32);
        let projection = *camera.projection_matrix();

        let mut frame = self.rasterizer.begin_frame();
        frame.clear(background);

        for item in self.render_list.items() {
            let Some((node, mesh)) = scene
                .get(item.node)
                .and_then(|node| node.mesh.as_ref().map(|mesh| (node, mesh)))
            else {
                return Err(RenderError::NodeNotFound(item.node));
            };
            let mvp = projection * (view * node.matrix_world);
            let pass = MeshPass {
                node: item.node,
                material: mesh.material.unwrap_or_default(),
                color: mesh.color_or(self.config.default_color).to_rgba8(),
                cull_backfaces: self.config.backface_culling,
                viewport,
            };

            for triangle in mesh.shape.triangles() {
                let clip = triangle.map(|v| mvp * Vector4::from_vec3(v, 1.0));

                if clip.iter().all(|c| !is_behind_camera(c)) {
                    pass.submit(&mut frame, clip, &mut self.primitives, &mut stats);
                    continue;
                }

                stats.behind_camera += 1;
                if self.config.near_plane_clipping {
                    let polygon = self
                        .clipper
                        .clip_polygon(ClipSpacePolygon::from_triangle(clip[0], clip[1], clip[2]));
                    for piece in polygon.triangulate() {
                        pass.submit(&mut frame, piece, &mut self.primitives, &mut stats);
                    }
                }
            }
        }

        // Present
        frame.end_frame(&mut self.surface)?;

        trace!(?stats, "frame rendered");
        self.stats = stats;
        Ok(stats)
    }
}

fn check_size(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidSize { width, height });
    }
    Ok(())
}

/// A vertex behind the eye or in front of the near plane.
fn is_behind_camera(clip: &Vector4) -> bool {
    clip.w <= 0.0 || clip.z < -clip.w
}

/// Average view-space depth of the first triangle, or of the node's origin
/// for empty geometry.
fn sort_depth(mesh: &Mesh, world: &Matrix4, view: &Matrix4) -> f32 {
    let model_view = *view * *world;
    match mesh.shape.first_triangle() {
        Some(triangle) => triangle.iter().map(|&v| -(model_view * v).z).sum::<f32>() / 3.0,
        None => -(model_view * Vector3::ZERO).z,
    }
}

/// Clip space to screen space: perspective divide, then NDC to pixels with y
/// flipped. NDC depth is kept in `z`.
pub fn clip_to_screen(clip: Vector4, viewport: Vector2) -> Vector3 {
    let ndc = clip.to_vec3_perspective();
    Vector3::new(
        (ndc.x + 1.0) * 0.5 * viewport.x,
        (1.0 - ndc.y) * 0.5 * viewport.y,
        ndc.z,
    )
}

/// Per-mesh state for submitting triangles.
struct MeshPass {
    node: NodeId,
    material: Material,
    color: Rgba,
    cull_backfaces: bool,
    viewport: Vector2,
}

impl MeshPass {
    fn submit(
        &self,
        frame: &mut Frame<'_>,
        clip: [Vector4; 3],
        primitives: &mut Vec<Primitive>,
        stats: &mut FrameStats,
    ) {
        let points = clip.map(|c| clip_to_screen(c, self.viewport));
        let [a, b, c] = points.map(|p| Vector2::new(p.x, p.y));
        let area = signed_area(a, b, c);

        if !area.is_finite() {
            return;
        }

        if area.abs() <= DEGENERATE_AREA {
            // Collinear: draw the longest edge
            let edges = [(points[0], points[1]), (points[1], points[2]), (points[0], points[2])];
            let (from, to) = edges
                .into_iter()
                .max_by(|(p0, p1), (q0, q1)| {
                    p0.distance_to_squared(*p1).total_cmp(&q0.distance_to_squared(*q1))
                })
                .unwrap_or((points[0], points[1]));
            frame.draw_line(
                from.x.round() as i32,
                from.y.round() as i32,
                to.x.round() as i32,
                to.y.round() as i32,
                self.color,
            );
            primitives.push(Primitive::Line {
                node: self.node,
                points: [from, to],
                color: self.color,
            });
            stats.lines += 1;
            return;
        }

        // y-down screen space: counter-clockwise in NDC comes out negative
        let front_facing = area < 0.0;
        if self.cull_backfaces
            && !self.material.skips_backface_cull()
            && !self.material.side.accepts(front_facing)
        {
            stats.backfaces_culled += 1;
            return;
        }

        if self.material.wireframe {
            frame.draw_triangle(a, b, c, self.color);
        } else {
            frame.draw_triangle_filled(a, b, c, self.color);
        }
        primitives.push(Primitive::Triangle {
            node: self.node,
            points,
            color: self.color,
            wireframe: self.material.wireframe,
        });
        stats.triangles += 1;
    }
}
