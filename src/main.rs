//! Interactive demo: a spinning cube with an orbiting child, or the shapes of
//! an OBJ file passed as the first argument.

use rustle3d::logging::init_logging;
use rustle3d::prelude::*;
use rustle3d::pacing::FramePacer;
use rustle3d::window::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use tracing::{error, info};

const FPS: u32 = 60;

fn build_scene(obj_path: Option<&str>) -> Result<(Scene, NodeId)> {
    let mut scene = Scene::new().with_background(Color::from_hex(0x101018));
    let root = scene.root();

    let pivot = scene.spawn(root, Object3D::named("pivot"))?;

    match obj_path {
        Some(path) => {
            for shape in rustle3d::loader::load_obj(path)? {
                let mesh = Mesh::new(shape).with_material(Material::wireframe(Color::from_hex(0x66ccff)));
                scene.spawn(pivot, Object3D::named("model").with_mesh(mesh))?;
            }
        }
        None => {
            let cube = Mesh::new(Shape::cube(1.5)).with_material(Material::new(Color::from_hex(0xff8800)));
            scene.spawn(pivot, Object3D::named("cube").with_mesh(cube))?;

            let moon = Mesh::new(Shape::cube(0.4)).with_material(Material::wireframe(Color::WHITE));
            scene.spawn(pivot, Object3D::named("moon").with_mesh(moon).with_position(2.0, 0.0, 0.0))?;
        }
    }

    Ok((scene, pivot))
}

fn main() -> Result<()> {
    init_logging();

    let obj_path = std::env::args().nth(1);
    let (mut scene, pivot) = build_scene(obj_path.as_deref())?;

    let mut camera = Camera::perspective(60.0, DEFAULT_WIDTH as f32 / DEFAULT_HEIGHT as f32, 0.1, 100.0)
        .with_position(0.0, 1.5, 6.0);
    camera.look_at(Vector3::ZERO);

    let window = Window::new("rustle3d", DEFAULT_WIDTH, DEFAULT_HEIGHT)?;
    let config = RendererConfig::default().with_size(DEFAULT_WIDTH, DEFAULT_HEIGHT);
    let mut renderer = Renderer::new(config, window)?;
    let mut pacer = FramePacer::new(FPS);

    info!(fps = FPS, "starting render loop");

    'running: loop {
        while let Some(event) = renderer.surface_mut().next_event() {
            match event {
                WindowEvent::Quit => break 'running,
                WindowEvent::Resized { width, height } => {
                    if let Err(err) = renderer.set_size(width, height) {
                        error!(%err, "resize failed");
                    }
                }
            }
        }

        let delta = pacer.tick().as_secs_f32();
        if let Some(node) = scene.get_mut(pivot) {
            node.rotate_y(delta * 0.8).rotate_x(delta * 0.3);
        }

        renderer.render(&mut scene, &mut camera)?;
    }

    Ok(())
}
