//! Per-frame animation driver
//!
//! The [`Animator`] is the runtime context for one model instance. Each call
//! to [`Animator::update`] runs the frame pipeline in a fixed order:
//!
//! 1. the playback clock advances,
//! 2. every channel of the active clip writes its sampled value into node TRS,
//! 3. the hierarchy is re-evaluated into global matrices,
//! 4. the joint palette for the bound skin is recomputed.
//!
//! Each step reads what the previous one wrote during the same frame.

use log::{debug, warn};

use crate::clip::apply_clip;
use crate::clock::PlaybackClock;
use crate::hierarchy::evaluate_hierarchy;
use crate::model::AnimatedModel;
use crate::skinning::{DEFAULT_MAX_JOINTS, JointPalette};

/// How the clip played on creation is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipSelector {
    Index(usize),
    Name(String),
}

/// Animator settings
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatorConfig {
    /// Palette capacity; joints past it are dropped
    pub max_joints: usize,
    /// Clip to start with, the first clip when `None`
    pub default_clip: Option<ClipSelector>,
    /// Skin whose palette is computed
    pub skin: Option<usize>,
    /// Playback speed multiplier
    pub speed: f32,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            max_joints: DEFAULT_MAX_JOINTS,
            default_clip: None,
            skin: Some(0),
            speed: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Animator {
    clock: PlaybackClock,
    palette: JointPalette,
    skin: Option<usize>,
}

impl Animator {
    pub fn new(model: &AnimatedModel, config: AnimatorConfig) -> Self {
        let clip_count = model.clips().len();
        let active_clip = match &config.default_clip {
            Some(ClipSelector::Index(index)) if *index < clip_count => Some(*index),
            Some(ClipSelector::Name(name)) if model.clip_index(name).is_some() => {
                model.clip_index(name)
            }
            Some(selector) => {
                warn!("Default clip {selector:?} not found, using the first clip");
                (clip_count > 0).then_some(0)
            }
            None => (clip_count > 0).then_some(0),
        };

        let mut clock = PlaybackClock::new(active_clip);
        clock.speed = config.speed;

        let mut animator = Self {
            clock,
            palette: JointPalette::new(config.max_joints),
            skin: None,
        };
        animator.bind_skin(model, config.skin);
        animator
    }

    /// Run one frame of the pipeline, `dt` in seconds
    pub fn update(&mut self, model: &mut AnimatedModel, dt: f32) {
        let (nodes, skins, clips) = model.pose_parts();

        if let Some(clip) = self.clock.active_clip.and_then(|i| clips.get(i)) {
            self.clock.advance(dt, clip.duration);
            apply_clip(clip, self.clock.elapsed, nodes);
        }

        evaluate_hierarchy(nodes);

        match self.skin.and_then(|i| skins.get(i)) {
            Some(skin) => self.palette.compute(skin, nodes),
            None => self.palette.clear(),
        }
    }

    /// Switch to a clip by index; unknown indices are ignored
    pub fn set_clip(&mut self, model: &AnimatedModel, index: usize) -> bool {
        if index >= model.clips().len() {
            return false;
        }
        self.clock.set_clip(Some(index));
        true
    }

    /// Switch to a clip by name; unknown names are ignored
    pub fn set_clip_by_name(&mut self, model: &AnimatedModel, name: &str) -> bool {
        match model.clip_index(name) {
            Some(index) => self.set_clip(model, index),
            None => false,
        }
    }

    /// Choose the skin whose palette is computed
    pub fn bind_skin(&mut self, model: &AnimatedModel, skin: Option<usize>) -> bool {
        let resolved = skin.filter(|&i| i < model.skins().len());
        self.skin = resolved;

        if let Some(skin) = resolved.and_then(|i| model.skins().get(i)) {
            let capacity = self.palette.capacity();
            if skin.joint_count() > capacity {
                debug!(
                    "Skin {:?} has {} joints, palette keeps the first {}",
                    skin.name,
                    skin.joint_count(),
                    capacity
                );
            }
        }
        resolved == skin
    }

    /// Put the model back into its rest pose and restart the clip
    pub fn reset_pose(&mut self, model: &mut AnimatedModel) {
        self.clock.reset();
        let (nodes, skins, _) = model.pose_parts();
        nodes.reset_to_rest();
        evaluate_hierarchy(nodes);
        match self.skin.and_then(|i| skins.get(i)) {
            Some(skin) => self.palette.compute(skin, nodes),
            None => self.palette.clear(),
        }
    }

    pub fn palette(&self) -> &JointPalette {
        &self.palette
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut PlaybackClock {
        &mut self.clock
    }

    pub fn active_clip(&self) -> Option<usize> {
        self.clock.active_clip
    }

    pub fn bound_skin(&self) -> Option<usize> {
        self.skin
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed
    }
}

/// Update many independent model instances by the same time step
///
/// Instances share nothing, so with the `parallel` feature they are spread
/// over the rayon thread pool. Each instance still runs its own phases in
/// order.
pub fn update_instances(instances: &mut [(AnimatedModel, Animator)], dt: f32) {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        instances
            .par_iter_mut()
            .for_each(|(model, animator)| animator.update(model, dt));
    }

    #[cfg(not(feature = "parallel"))]
    for (model, animator) in instances.iter_mut() {
        animator.update(model, dt);
    }
}
