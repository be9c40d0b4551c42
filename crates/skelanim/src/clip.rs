//! Animation clips and channel application

use crate::hierarchy::NodeTable;
use crate::sampler::{Property, Sampler};

/// A curve bound to one property of one node
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Node table index
    pub target: usize,
    pub sampler: Sampler,
}

impl Channel {
    pub fn property(&self) -> Property {
        self.sampler.property()
    }
}

/// Named set of channels played together
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Seconds; the last keyframe time over all channels
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .map(|c| c.sampler.end_time())
            .fold(0.0f32, f32::max);

        Self {
            name: name.into(),
            duration,
            channels,
        }
    }
}

/// Sample every channel of a clip and write the results into the target nodes
///
/// Only node TRS is touched; matrices are left for the hierarchy pass.
pub fn apply_clip(clip: &AnimationClip, time: f32, nodes: &mut NodeTable) {
    for channel in &clip.channels {
        let value = channel.sampler.sample(time);
        if let Some(node) = nodes.get_mut(channel.target) {
            value.apply(&mut node.transform);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{Transform, evaluate_hierarchy};
    use crate::sampler::{InterpolationMode, Keyframes};
    use glam::{Quat, Vec3};

    fn channel(target: usize, times: Vec<f32>, keyframes: Keyframes) -> Channel {
        Channel {
            target,
            sampler: Sampler::new(times, keyframes, InterpolationMode::Linear).unwrap(),
        }
    }

    #[test]
    fn test_duration_is_latest_keyframe() {
        let clip = AnimationClip::new(
            "walk",
            vec![
                channel(0, vec![0.0, 1.5], Keyframes::Scale(vec![Vec3::ONE, Vec3::ONE])),
                channel(1, vec![0.2, 2.5], Keyframes::Scale(vec![Vec3::ONE, Vec3::ONE])),
            ],
        );
        assert_eq!(clip.duration, 2.5);
        assert_eq!(clip.channels[1].property(), Property::Scale);
    }

    #[test]
    fn test_empty_clip_has_zero_duration() {
        let clip = AnimationClip::new("idle", Vec::new());
        assert_eq!(clip.duration, 0.0);
    }

    #[test]
    fn test_channels_on_same_node_are_independent() {
        let mut nodes = NodeTable::from_parents(&[None], &[Transform::IDENTITY]).unwrap();
        let turn = Quat::from_rotation_z(1.0);
        let clip = AnimationClip::new(
            "mixed",
            vec![
                channel(
                    0,
                    vec![0.0, 1.0],
                    Keyframes::Rotation(vec![turn, turn]),
                ),
                channel(
                    0,
                    vec![0.0, 1.0],
                    Keyframes::Translation(vec![Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0)]),
                ),
            ],
        );

        apply_clip(&clip, 0.5, &mut nodes);
        let node = nodes.get(0).unwrap();
        assert!(node.transform.rotation.abs_diff_eq(turn, 1e-6));
        assert_eq!(node.transform.translation, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(node.transform.scale, Vec3::ONE);

        // Matrices only change once the hierarchy is evaluated
        assert_eq!(node.global_matrix, glam::Mat4::IDENTITY);
        evaluate_hierarchy(&mut nodes);
        assert_ne!(nodes.global(0), glam::Mat4::IDENTITY);
    }
}
