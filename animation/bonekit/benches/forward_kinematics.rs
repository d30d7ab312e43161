use bonekit::{JointSpec, KeyframeStore, Skeleton};
use criterion::{Criterion, criterion_group, criterion_main};
use glam::{Quat, Vec3};
use std::hint::black_box;

/// A spine of `spine` joints with a three-joint limb hanging off each
fn create_test_rig(spine: usize) -> Skeleton {
    let mut specs = Vec::with_capacity(spine * 4);
    for i in 0..spine {
        let id = specs.len();
        let position = Vec3::new(0.0, (i + 1) as f32, 0.0);
        specs.push(if i == 0 {
            JointSpec::root(id, position)
        } else {
            JointSpec::child(id, position, id - 4)
        });
        for limb in 1..=3 {
            let parent = specs.len() - 1;
            specs.push(JointSpec::child(
                id + limb,
                position + Vec3::new(limb as f32 * 0.5, 0.0, 0.0),
                parent,
            ));
        }
    }
    Skeleton::new(&specs).unwrap()
}

fn bench_refresh_all(c: &mut Criterion) {
    let mut skeleton = create_test_rig(64);
    c.bench_function("refresh_all_256_joints", |b| {
        b.iter(|| {
            skeleton.refresh_all();
            black_box(skeleton.joints()[255].position());
        })
    });
}

fn bench_apply_rotation(c: &mut Criterion) {
    let mut skeleton = create_test_rig(64);
    let delta = Quat::from_rotation_x(0.01);
    c.bench_function("apply_rotation_root", |b| {
        b.iter(|| skeleton.apply_rotation(0, black_box(delta)).unwrap())
    });
}

fn bench_interpolate(c: &mut Criterion) {
    let mut skeleton = create_test_rig(64);
    let mut store = KeyframeStore::new();
    store.capture(&skeleton);
    for joint in (0..skeleton.len()).step_by(3) {
        skeleton
            .apply_rotation(joint, Quat::from_rotation_z(0.2))
            .unwrap();
    }
    store.capture(&skeleton);

    c.bench_function("interpolate_256_joints", |b| {
        b.iter(|| {
            store
                .interpolate(0, 1, black_box(0.37), &mut skeleton)
                .unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_refresh_all,
    bench_apply_rotation,
    bench_interpolate
);
criterion_main!(benches);
