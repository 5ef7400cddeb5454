//! End-to-end scenarios: scene graph -> camera -> culling -> rasterizer -> surface.

use approx::assert_relative_eq;
use rustle3d::prelude::*;

fn cube_node(name: &str, material: Material) -> Object3D {
    Object3D::named(name).with_mesh(Mesh::new(Shape::cube(1.0)).with_material(material))
}

fn front_camera() -> Camera {
    let mut camera = Camera::perspective(70.0, 640.0 / 480.0, 0.1, 100.0).with_position(0.0, 0.0, 5.0);
    camera.look_at(Vector3::ZERO);
    camera
}

fn renderer() -> Renderer<ImageSurface> {
    Renderer::new(RendererConfig::default(), ImageSurface::new(640, 480)).unwrap()
}

#[test]
fn world_matrix_is_parent_world_times_local() {
    let mut scene = Scene::new();
    let root = scene.root();
    let parent = scene
        .spawn(
            root,
            Object3D::new()
                .with_position(1.0, 2.0, 3.0)
                .with_rotation(Euler::with_order(0.3, -0.7, 0.2, EulerOrder::XYZ))
                .with_scale(2.0, 2.0, 2.0),
        )
        .unwrap();
    let child = scene
        .spawn(
            parent,
            Object3D::new()
                .with_position(-1.0, 0.5, 0.0)
                .with_rotation(Euler::with_order(0.0, 1.1, 0.0, EulerOrder::YXZ)),
        )
        .unwrap();

    scene.update_matrix_world();

    let parent_world = scene.get(parent).unwrap().matrix_world;
    let child_node = scene.get(child).unwrap();
    assert_relative_eq!(child_node.matrix_world, parent_world * child_node.matrix, epsilon = 1e-5);

    let origin = scene.world_position(child).unwrap();
    assert_relative_eq!(origin, parent_world * Vector3::new(-1.0, 0.5, 0.0), epsilon = 1e-5);
}

#[test]
fn unit_cube_submits_twelve_triangles_on_screen() {
    let mut scene = Scene::new();
    let root = scene.root();
    scene.spawn(root, cube_node("cube", Material::wireframe(Color::WHITE))).unwrap();
    let mut camera = front_camera();
    let mut renderer = renderer();

    let stats = renderer.render(&mut scene, &mut camera).unwrap();

    assert_eq!(stats.meshes, 1);
    assert_eq!(stats.triangles, 12);
    assert_eq!(renderer.primitives().len(), 12);
    for primitive in renderer.primitives() {
        for p in primitive.points() {
            assert!((0.0..=640.0).contains(&p.x), "x out of bounds: {p:?}");
            assert!((0.0..=480.0).contains(&p.y), "y out of bounds: {p:?}");
        }
    }
    assert_eq!(renderer.surface().frames_presented(), 1);
}

#[test]
fn solid_cube_shows_only_the_front_face() {
    let mut scene = Scene::new();
    let root = scene.root();
    scene.spawn(root, cube_node("cube", Material::new(Color::WHITE))).unwrap();
    let mut camera = front_camera();
    let mut renderer = renderer();

    let stats = renderer.render(&mut scene, &mut camera).unwrap();

    assert_eq!(stats.triangles, 2);
    assert_eq!(stats.backfaces_culled, 10);
    let center = renderer.surface().image().get_pixel(300, 225).0;
    assert_eq!(center, [255, 255, 255, 255]);
}

#[test]
fn farther_mesh_is_drawn_first() {
    let mut scene = Scene::new();
    let root = scene.root();
    let near = scene
        .spawn(root, cube_node("near", Material::new(Color::from_hex(0x00ff00))).with_position(0.0, 0.0, -5.0))
        .unwrap();
    let far = scene
        .spawn(root, cube_node("far", Material::new(Color::from_hex(0xff0000))).with_position(0.0, 0.0, -10.0))
        .unwrap();
    let mut camera = Camera::perspective(60.0, 640.0 / 480.0, 0.1, 100.0);
    let mut renderer = renderer();

    renderer.render(&mut scene, &mut camera).unwrap();

    assert_eq!(renderer.render_list().nodes().collect::<Vec<_>>(), vec![far, near]);
    // the near cube covers the far one
    assert_eq!(renderer.surface().image().get_pixel(300, 225).0, [0, 255, 0, 255]);
}

#[test]
fn mesh_beyond_far_plane_is_culled() {
    let mut scene = Scene::new();
    let root = scene.root();
    scene
        .spawn(root, cube_node("distant", Material::default()).with_position(0.0, 0.0, -200.0))
        .unwrap();
    let mut camera = Camera::perspective(60.0, 640.0 / 480.0, 0.1, 100.0);
    let mut renderer = renderer();

    let stats = renderer.render(&mut scene, &mut camera).unwrap();

    assert!(renderer.render_list().is_empty());
    assert_eq!(stats.meshes_culled, 1);
    assert_eq!(stats.triangles, 0);
}

#[test]
fn invisible_subtree_is_skipped() {
    let mut scene = Scene::new();
    let root = scene.root();
    let group = scene.spawn(root, Object3D::named("group")).unwrap();
    scene.spawn(group, cube_node("cube", Material::default())).unwrap();
    scene.get_mut(group).unwrap().visible = false;
    let mut camera = front_camera();
    let mut renderer = renderer();

    let stats = renderer.render(&mut scene, &mut camera).unwrap();
    assert_eq!(stats.meshes, 0);
}

#[test]
fn auto_aspect_follows_the_render_size() {
    let mut scene = Scene::new();
    let mut camera = Camera::perspective(60.0, 1.0, 0.1, 100.0);
    let mut renderer = renderer();

    renderer.render(&mut scene, &mut camera).unwrap();
    assert_relative_eq!(camera.projection().aspect().unwrap(), 640.0 / 480.0);

    renderer.set_size(300, 300).unwrap();
    renderer.render(&mut scene, &mut camera).unwrap();
    assert_relative_eq!(camera.projection().aspect().unwrap(), 1.0);
    assert_eq!(renderer.surface().image().dimensions(), (300, 300));
}

#[test]
fn headless_surface_saves_png() {
    let mut scene = Scene::new();
    let root = scene.root();
    scene.spawn(root, cube_node("cube", Material::default())).unwrap();
    let mut camera = front_camera();
    let mut renderer = renderer();
    renderer.render(&mut scene, &mut camera).unwrap();

    let path = std::env::temp_dir().join(format!("rustle3d-{}.png", std::process::id()));
    renderer.surface().save(&path).unwrap();
    let saved = image::open(&path).unwrap().to_rgba8();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(saved.dimensions(), (640, 480));
    assert_eq!(saved.get_pixel(300, 225).0, [255, 255, 255, 255]);
}
