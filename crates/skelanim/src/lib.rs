//! Skeletal animation runtime
//!
//! Turns decoded scene data into an [`AnimatedModel`] once at load time, then
//! drives it frame by frame with an [`Animator`]:
//!
//! - keyframe sampling with linear and step interpolation,
//! - node hierarchy evaluation into global matrices,
//! - joint matrix palettes ready for GPU skinning,
//! - a looping playback clock.
//!
//! # Example
//!
//! ```no_run
//! use skelanim::{Animator, AnimatorConfig, build_model, load_scene};
//!
//! let scene = load_scene("character.json")?;
//! let mut model = build_model(&scene)?;
//! let mut animator = Animator::new(&model, AnimatorConfig::default());
//!
//! animator.update(&mut model, 1.0 / 60.0);
//! let palette = animator.palette().as_cols_arrays();
//! println!("{} joint matrices", palette.len());
//! # Ok::<(), skelanim::AnimError>(())
//! ```

pub mod animator;
pub mod builder;
pub mod clip;
pub mod clock;
pub mod decoded;
pub mod error;
pub mod hierarchy;
pub mod model;
pub mod sampler;
pub mod scene_file;
pub mod skinning;

// Re-export common types
pub use animator::{Animator, AnimatorConfig, ClipSelector, update_instances};
pub use builder::build_model;
pub use clip::{AnimationClip, Channel, apply_clip};
pub use clock::PlaybackClock;
pub use decoded::DecodedScene;
pub use error::{AnimError, Result};
pub use hierarchy::{Node, NodeTable, Transform, evaluate_hierarchy};
pub use model::{AnimatedModel, SkinnedVertex, Submesh};
pub use sampler::{InterpolationMode, Keyframes, Property, PropertyValue, Sampler};
pub use scene_file::{load_scene, parse_scene};
pub use skinning::{DEFAULT_MAX_JOINTS, JointPalette, Skin, SkinnedPoint};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
