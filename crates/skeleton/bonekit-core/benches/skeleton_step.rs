use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;

use bonekit_core::{Atlas, AtlasAttachmentLoader, Skeleton, SkeletonData, SkeletonJson};
use bonekit_test_fixtures as fixtures;

fn load_stickman() -> Arc<SkeletonData> {
    let atlas = Atlas::parse(&fixtures::atlases::text("stickman").unwrap()).unwrap();
    let json = fixtures::skeletons::json("stickman").unwrap();
    let data = SkeletonJson::new(AtlasAttachmentLoader::new(&atlas))
        .read_str(&json)
        .unwrap();
    Arc::new(data)
}

fn load_benchmark(c: &mut Criterion) {
    let atlas_text = fixtures::atlases::text("stickman").unwrap();
    let json = fixtures::skeletons::json("stickman").unwrap();

    c.bench_function("parse_atlas", |b| {
        b.iter(|| black_box(Atlas::parse(black_box(&atlas_text)).unwrap()))
    });

    let atlas = Atlas::parse(&atlas_text).unwrap();
    c.bench_function("read_skeleton_json", |b| {
        b.iter(|| {
            let mut reader = SkeletonJson::new(AtlasAttachmentLoader::new(&atlas));
            black_box(reader.read_str(black_box(&json)).unwrap())
        })
    });
}

fn step_benchmark(c: &mut Criterion) {
    let data = load_stickman();
    let walk = data.find_animation("walk").unwrap().clone();
    let hurt = data.find_animation("hurt").unwrap().clone();

    // 60 fps frame: two mixed animations, world transform, draw output
    c.bench_function("skeleton_step", |b| {
        let mut skel = Skeleton::new(data.clone());
        let mut time = 0.0f32;
        b.iter(|| {
            time += 1.0 / 60.0;
            skel.update(1.0 / 60.0);
            walk.apply(&mut skel, time, true);
            hurt.mix(&mut skel, time, true, 0.5);
            skel.update_world_transform();
            let quads = skel.draw_regions().count();
            black_box(quads)
        })
    });

    c.bench_function("instantiate_skeleton", |b| {
        b.iter(|| black_box(Skeleton::new(black_box(data.clone()))))
    });
}

criterion_group!(benches, load_benchmark, step_benchmark);
criterion_main!(benches);
