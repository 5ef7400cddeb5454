use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rustle3d::bench::Rasterizer;
use rustle3d::prelude::*;

const BUFFER_WIDTH: u32 = 800;
const BUFFER_HEIGHT: u32 = 600;
const RED: [u8; 4] = [255, 0, 0, 255];

fn small_triangle() -> [Vector2; 3] {
    [
        Vector2::new(100.0, 100.0),
        Vector2::new(120.0, 100.0),
        Vector2::new(110.0, 120.0),
    ]
}

fn medium_triangle() -> [Vector2; 3] {
    [
        Vector2::new(100.0, 100.0),
        Vector2::new(300.0, 100.0),
        Vector2::new(200.0, 300.0),
    ]
}

fn large_triangle() -> [Vector2; 3] {
    [
        Vector2::new(50.0, 50.0),
        Vector2::new(750.0, 100.0),
        Vector2::new(400.0, 550.0),
    ]
}

fn benchmark_single_triangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_triangle");

    for (name, triangle) in [
        ("small", small_triangle()),
        ("medium", medium_triangle()),
        ("large", large_triangle()),
    ] {
        group.bench_with_input(BenchmarkId::new("filled", name), &triangle, |b, &[p0, p1, p2]| {
            let mut rasterizer = Rasterizer::new(BUFFER_WIDTH, BUFFER_HEIGHT);
            b.iter(|| {
                let mut frame = rasterizer.begin_frame();
                frame.draw_triangle_filled(black_box(p0), black_box(p1), black_box(p2), RED);
            });
        });

        group.bench_with_input(BenchmarkId::new("wireframe", name), &triangle, |b, &[p0, p1, p2]| {
            let mut rasterizer = Rasterizer::new(BUFFER_WIDTH, BUFFER_HEIGHT);
            b.iter(|| {
                let mut frame = rasterizer.begin_frame();
                frame.draw_triangle(black_box(p0), black_box(p1), black_box(p2), RED);
            });
        });
    }

    group.finish();
}

fn benchmark_many_triangles(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_triangles");

    // Generate a grid of small triangles
    let triangles: Vec<[Vector2; 3]> = (0..20)
        .flat_map(|row| {
            (0..20).map(move |col| {
                let x = col as f32 * 40.0;
                let y = row as f32 * 30.0;
                [
                    Vector2::new(x, y),
                    Vector2::new(x + 35.0, y),
                    Vector2::new(x + 17.5, y + 25.0),
                ]
            })
        })
        .collect();

    group.bench_function("filled_400_triangles", |b| {
        let mut rasterizer = Rasterizer::new(BUFFER_WIDTH, BUFFER_HEIGHT);
        b.iter(|| {
            let mut frame = rasterizer.begin_frame();
            for &[p0, p1, p2] in &triangles {
                frame.draw_triangle_filled(black_box(p0), p1, p2, RED);
            }
        });
    });

    group.finish();
}

fn benchmark_scene(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene");

    let mut scene = Scene::new();
    let root = scene.root();
    for i in 0..100 {
        let x = (i % 10) as f32 - 4.5;
        let y = (i / 10) as f32 - 4.5;
        let mesh = Mesh::new(Shape::cube(0.6)).with_material(Material::new(Color::from_hex(0x3388ff)));
        scene
            .spawn(root, Object3D::new().with_mesh(mesh).with_position(x, y, -(i as f32) * 0.1))
            .expect("root exists");
    }
    let mut camera = Camera::perspective(60.0, 4.0 / 3.0, 0.1, 100.0).with_position(0.0, 0.0, 12.0);
    camera.look_at(Vector3::ZERO);
    let config = RendererConfig::default().with_size(BUFFER_WIDTH, BUFFER_HEIGHT);
    let mut renderer =
        Renderer::new(config, ImageSurface::new(BUFFER_WIDTH, BUFFER_HEIGHT)).expect("valid size");

    group.bench_function("render_100_cubes", |b| {
        b.iter(|| renderer.render(black_box(&mut scene), &mut camera).expect("render"));
    });

    group.finish();
}

criterion_group!(benches, benchmark_single_triangle, benchmark_many_triangles, benchmark_scene);
criterion_main!(benches);
