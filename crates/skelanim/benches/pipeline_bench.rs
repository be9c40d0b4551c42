use criterion::{Criterion, criterion_group, criterion_main};
use glam::{Mat4, Quat, Vec3};
use skelanim::{
    AnimatedModel, AnimationClip, Animator, AnimatorConfig, Channel, InterpolationMode, Keyframes,
    NodeTable, Sampler, Skin, Transform, update_instances,
};
use std::hint::black_box;

const JOINTS: usize = 64;

fn create_test_model() -> AnimatedModel {
    // A single long chain, every joint swinging around Z
    let parents: Vec<Option<usize>> = (0..JOINTS).map(|i| i.checked_sub(1)).collect();
    let transforms = vec![Transform::from_translation(Vec3::Y); JOINTS];
    let nodes = NodeTable::from_parents(&parents, &transforms).unwrap();

    let times: Vec<f32> = (0..=30).map(|i| i as f32 / 30.0).collect();
    let channels = (0..JOINTS)
        .map(|joint| Channel {
            target: joint,
            sampler: Sampler::new(
                times.clone(),
                Keyframes::Rotation(
                    times
                        .iter()
                        .map(|t| Quat::from_rotation_z((t * 6.0).sin() * 0.3))
                        .collect(),
                ),
                InterpolationMode::Linear,
            )
            .unwrap(),
        })
        .collect();

    let skin = Skin::new(None, (0..JOINTS).collect(), vec![Mat4::IDENTITY; JOINTS]).unwrap();
    AnimatedModel::new(
        nodes,
        vec![skin],
        vec![AnimationClip::new("swing", channels)],
        vec![],
        vec![],
        vec![],
    )
    .unwrap()
}

fn bench_frame_update(c: &mut Criterion) {
    let mut model = create_test_model();
    let mut animator = Animator::new(&model, AnimatorConfig::default());

    c.bench_function("frame_update_64_joints", |b| {
        b.iter(|| {
            animator.update(&mut model, black_box(1.0 / 60.0));
        })
    });
}

fn bench_instances(c: &mut Criterion) {
    let model = create_test_model();
    let mut instances: Vec<_> = (0..32)
        .map(|_| {
            let animator = Animator::new(&model, AnimatorConfig::default());
            (model.clone(), animator)
        })
        .collect();

    c.bench_function("update_32_instances", |b| {
        b.iter(|| update_instances(&mut instances, black_box(1.0 / 60.0)))
    });
}

criterion_group!(benches, bench_frame_update, bench_instances);
criterion_main!(benches);
