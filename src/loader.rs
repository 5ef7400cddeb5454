//! Wavefront OBJ geometry provider.
//!
//! Each object or group in the file becomes one [`Shape`]. Faces are
//! triangulated and re-indexed so positions, normals and texture coordinates
//! share a single index buffer. Materials (`mtllib`) are ignored.

use std::io::BufRead;
use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::shape::Shape;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

/// Loads every model in an OBJ file.
///
/// # Errors
/// [`RenderError::Load`](crate::RenderError::Load) when the file cannot be read
/// or parsed, [`RenderError::InvalidGeometry`](crate::RenderError::InvalidGeometry)
/// when a model's buffers are inconsistent.
pub fn load_obj(path: impl AsRef<Path>) -> Result<Vec<Shape>> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(path, &load_options())?;
    let shapes = to_shapes(models)?;
    info!(
        path = %path.display(),
        shapes = shapes.len(),
        triangles = shapes.iter().map(Shape::triangle_count).sum::<usize>(),
        "loaded obj"
    );
    Ok(shapes)
}

/// Parses OBJ text from a reader. `mtllib` statements are not followed.
pub fn load_obj_from_reader<R: BufRead>(reader: &mut R) -> Result<Vec<Shape>> {
    let (models, _materials) = tobj::load_obj_buf(reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })?;
    to_shapes(models)
}

fn to_shapes(models: Vec<tobj::Model>) -> Result<Vec<Shape>> {
    models.into_iter().map(to_shape).collect()
}

fn to_shape(model: tobj::Model) -> Result<Shape> {
    let tobj::Mesh {
        positions,
        normals,
        texcoords,
        indices,
        ..
    } = model.mesh;

    let mut shape = Shape::new(positions, indices)?;
    if !normals.is_empty() {
        shape = shape.with_normals(normals)?;
    }
    if !texcoords.is_empty() {
        shape = shape.with_uvs(texcoords)?;
    }
    shape.compute_bounding_sphere();

    debug!(
        name = %model.name,
        vertices = shape.vertex_count(),
        triangles = shape.triangle_count(),
        "obj model converted"
    );
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;

    const QUAD: &str = "\
o quad
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
vn 0.0 0.0 1.0
f 1//1 2//1 3//1 4//1
";

    #[test]
    fn quad_is_triangulated() {
        let shapes = load_obj_from_reader(&mut QUAD.as_bytes()).unwrap();
        assert_eq!(shapes.len(), 1);
        let quad = &shapes[0];
        assert_eq!(quad.triangle_count(), 2);
        assert_eq!(quad.vertex_count(), 4);
        assert!(quad.normals().is_some());
        assert!(quad.uvs().is_none());
        assert!(quad.bounding_sphere().is_some());
    }

    #[test]
    fn groups_become_separate_shapes() {
        let text = "\
o a
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o b
v 0 0 1
v 1 0 1
v 0 1 1
f 4 5 6
";
        let shapes = load_obj_from_reader(&mut text.as_bytes()).unwrap();
        assert_eq!(shapes.len(), 2);
        assert!(shapes.iter().all(|s| s.triangle_count() == 1));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_obj("definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, RenderError::Load(_)));
    }
}
