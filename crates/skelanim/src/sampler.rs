//! Keyframe curves and their interpolation

use glam::{Quat, Vec3, Vec4};

use crate::error::{AnimError, Result};
use crate::hierarchy::Transform;

/// Trait for values that can be interpolated between two keyframes
pub trait Lerp: Copy {
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::lerp(*self, *other, t)
    }
}

impl Lerp for Quat {
    /// Normalized linear interpolation along the shorter arc
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let a = Vec4::from(*self);
        let mut b = Vec4::from(*other);
        if a.dot(b) < 0.0 {
            b = -b;
        }
        a.lerp(b, t)
            .try_normalize()
            .map_or(*self, Quat::from_vec4)
    }
}

/// Node property driven by a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Translation,
    Rotation,
    Scale,
}

impl Property {
    /// Floats per keyframe in a flat output buffer
    pub fn stride(self) -> usize {
        match self {
            Self::Translation | Self::Scale => 3,
            Self::Rotation => 4,
        }
    }
}

/// Sampled value for one property
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Translation(Vec3),
    Rotation(Quat),
    Scale(Vec3),
}

impl PropertyValue {
    /// Write the value into the matching field of a transform
    pub fn apply(self, transform: &mut Transform) {
        match self {
            Self::Translation(v) => transform.translation = v,
            Self::Rotation(q) => transform.rotation = q,
            Self::Scale(v) => transform.scale = v,
        }
    }
}

/// Keyframe values, typed by the property they drive
#[derive(Debug, Clone, PartialEq)]
pub enum Keyframes {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

impl Keyframes {
    /// Split a flat output buffer into per-keyframe values
    pub fn from_flat(property: Property, values: &[f32]) -> Result<Self> {
        let stride = property.stride();
        if values.len() % stride != 0 {
            return Err(AnimError::MalformedAccessor(format!(
                "{:?} output has {} floats, not a multiple of {}",
                property,
                values.len(),
                stride
            )));
        }
        let chunks = values.chunks_exact(stride);
        Ok(match property {
            Property::Translation => Self::Translation(chunks.map(Vec3::from_slice).collect()),
            Property::Scale => Self::Scale(chunks.map(Vec3::from_slice).collect()),
            Property::Rotation => Self::Rotation(
                chunks
                    .enumerate()
                    .map(|(i, c)| unit_rotation(i, c))
                    .collect::<Result<_>>()?,
            ),
        })
    }

    pub fn property(&self) -> Property {
        match self {
            Self::Translation(_) => Property::Translation,
            Self::Rotation(_) => Property::Rotation,
            Self::Scale(_) => Property::Scale,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Translation(v) | Self::Scale(v) => v.len(),
            Self::Rotation(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normalize a rotation keyframe, rejecting zero-length or non-finite ones
fn unit_rotation(index: usize, components: &[f32]) -> Result<Quat> {
    Vec4::from_slice(components)
        .try_normalize()
        .map(Quat::from_vec4)
        .ok_or_else(|| {
            AnimError::MalformedAccessor(format!(
                "rotation keyframe {index} {components:?} cannot be normalized"
            ))
        })
}

/// How values between two keyframes are produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InterpolationMode {
    /// Linear for vectors, normalized linear for rotations
    #[default]
    Linear,
    /// Hold the earlier keyframe until the next one is reached
    Step,
}

/// Find the index of the keyframe at or before the given time
///
/// Times before the first keyframe map to index 0.
pub fn find_keyframe(times: &[f32], time: f32) -> usize {
    times.partition_point(|&t| t <= time).saturating_sub(1)
}

/// Keyframe curve for one property
#[derive(Debug, Clone, PartialEq)]
pub struct Sampler {
    times: Vec<f32>,
    keyframes: Keyframes,
    mode: InterpolationMode,
}

impl Sampler {
    /// Create a sampler; times must be finite and non-decreasing with one
    /// value per time
    pub fn new(times: Vec<f32>, keyframes: Keyframes, mode: InterpolationMode) -> Result<Self> {
        if times.is_empty() {
            return Err(AnimError::MalformedAccessor(
                "sampler has no keyframes".to_string(),
            ));
        }
        if times.len() != keyframes.len() {
            return Err(AnimError::MalformedAccessor(format!(
                "sampler has {} times but {} values",
                times.len(),
                keyframes.len()
            )));
        }
        if times.iter().any(|t| !t.is_finite()) {
            return Err(AnimError::MalformedAccessor(
                "sampler times must be finite".to_string(),
            ));
        }
        if let Some(pair) = times.windows(2).find(|w| w[1] < w[0]) {
            return Err(AnimError::MalformedAccessor(format!(
                "sampler times are not ascending ({} after {})",
                pair[1], pair[0]
            )));
        }

        Ok(Self {
            times,
            keyframes,
            mode,
        })
    }

    pub fn times(&self) -> &[f32] {
        &self.times
    }

    pub fn keyframes(&self) -> &Keyframes {
        &self.keyframes
    }

    pub fn property(&self) -> Property {
        self.keyframes.property()
    }

    pub fn mode(&self) -> InterpolationMode {
        self.mode
    }

    /// Time of the last keyframe
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Bracketing keyframes and interpolation factor for a time
    ///
    /// Outside of the keyframe range both indices point at the boundary
    /// keyframe. A zero-length interval yields factor 0.
    pub fn locate(&self, time: f32) -> (usize, usize, f32) {
        let last = self.times.len() - 1;
        if time <= self.times[0] {
            return (0, 0, 0.0);
        }
        if time >= self.times[last] {
            return (last, last, 0.0);
        }

        let index = find_keyframe(&self.times, time);
        let start = self.times[index];
        let span = self.times[index + 1] - start;
        let factor = if span > 0.0 {
            ((time - start) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (index, index + 1, factor)
    }

    /// Evaluate the curve at the given time
    pub fn sample(&self, time: f32) -> PropertyValue {
        let (index, next, factor) = self.locate(time);
        match &self.keyframes {
            Keyframes::Translation(values) => {
                PropertyValue::Translation(self.interpolate(values, index, next, factor))
            }
            Keyframes::Rotation(values) => {
                PropertyValue::Rotation(self.interpolate(values, index, next, factor))
            }
            Keyframes::Scale(values) => {
                PropertyValue::Scale(self.interpolate(values, index, next, factor))
            }
        }
    }

    fn interpolate<T: Lerp>(&self, values: &[T], index: usize, next: usize, factor: f32) -> T {
        // Exact keyframe hits return the stored value untouched
        if factor == 0.0 || index == next {
            return values[index];
        }
        match self.mode {
            InterpolationMode::Step => values[index],
            InterpolationMode::Linear => values[index].lerp(&values[next], factor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn translation_sampler(times: Vec<f32>, values: Vec<Vec3>) -> Sampler {
        Sampler::new(
            times,
            Keyframes::Translation(values),
            InterpolationMode::Linear,
        )
        .unwrap()
    }

    fn translation(value: PropertyValue) -> Vec3 {
        match value {
            PropertyValue::Translation(v) => v,
            other => panic!("expected translation, got {other:?}"),
        }
    }

    fn rotation(value: PropertyValue) -> Quat {
        match value {
            PropertyValue::Rotation(q) => q,
            other => panic!("expected rotation, got {other:?}"),
        }
    }

    #[test]
    fn test_find_keyframe() {
        let times = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(find_keyframe(&times, -1.0), 0);
        assert_eq!(find_keyframe(&times, 0.0), 0);
        assert_eq!(find_keyframe(&times, 0.5), 0);
        assert_eq!(find_keyframe(&times, 1.0), 1);
        assert_eq!(find_keyframe(&times, 2.5), 2);
        assert_eq!(find_keyframe(&times, 4.0), 3);
    }

    #[test]
    fn test_linear_midpoint() {
        let sampler = translation_sampler(vec![0.0, 1.0], vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)]);
        assert_eq!(translation(sampler.sample(0.5)), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test_case(-5.0, 0.0 ; "before first keyframe")]
    #[test_case(0.0, 0.0 ; "at first keyframe")]
    #[test_case(2.0, 20.0 ; "at last keyframe")]
    #[test_case(7.5, 20.0 ; "after last keyframe")]
    fn test_boundary_clamping(time: f32, expected_x: f32) {
        let sampler = translation_sampler(
            vec![0.0, 1.0, 2.0],
            vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0)],
        );
        assert_eq!(translation(sampler.sample(time)), Vec3::new(expected_x, 0.0, 0.0));
    }

    #[test]
    fn test_exact_keyframe_times_return_stored_values() {
        let values = vec![
            Quat::from_rotation_y(0.1),
            Quat::from_rotation_x(1.3),
            Quat::from_rotation_z(-2.2),
        ];
        let sampler = Sampler::new(
            vec![0.0, 0.25, 0.9],
            Keyframes::Rotation(values.clone()),
            InterpolationMode::Linear,
        )
        .unwrap();

        for (k, &time) in sampler.times().iter().enumerate() {
            assert_eq!(rotation(sampler.sample(time)), values[k]);
        }
    }

    #[test]
    fn test_rotation_midpoint_is_unit() {
        let half_turn = Quat::from_rotation_y(std::f32::consts::PI);
        let sampler = Sampler::new(
            vec![0.0, 1.0],
            Keyframes::Rotation(vec![Quat::IDENTITY, half_turn]),
            InterpolationMode::Linear,
        )
        .unwrap();

        let q = rotation(sampler.sample(0.5));
        assert!((q.length() - 1.0).abs() < 1e-5);
        // A quarter turn about Y, in whichever direction the arc picked
        assert!(q.x.abs() < 1e-5 && q.z.abs() < 1e-5);
        assert!((q.w.abs() - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_takes_shorter_arc() {
        let a = Quat::from_rotation_z(0.2);
        let b = -Quat::from_rotation_z(0.4);
        let q = Lerp::lerp(&a, &b, 0.5);
        let expected = Quat::from_rotation_z(0.3);
        assert!(q.abs_diff_eq(expected, 1e-4), "got {q:?}");
    }

    #[test]
    fn test_duplicate_times_do_not_divide_by_zero() {
        let sampler = translation_sampler(
            vec![0.0, 1.0, 1.0, 2.0],
            vec![
                Vec3::ZERO,
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(5.0, 0.0, 0.0),
                Vec3::new(6.0, 0.0, 0.0),
            ],
        );
        let (index, _, factor) = sampler.locate(1.0);
        assert_eq!(index, 2);
        assert_eq!(factor, 0.0);
        assert!(translation(sampler.sample(1.0)).is_finite());
    }

    #[test]
    fn test_step_mode_holds_value() {
        let sampler = Sampler::new(
            vec![0.0, 1.0],
            Keyframes::Scale(vec![Vec3::ONE, Vec3::splat(3.0)]),
            InterpolationMode::Step,
        )
        .unwrap();
        assert_eq!(sampler.sample(0.99), PropertyValue::Scale(Vec3::ONE));
        assert_eq!(sampler.sample(1.0), PropertyValue::Scale(Vec3::splat(3.0)));
    }

    #[test]
    fn test_from_flat_stride() {
        let keyframes =
            Keyframes::from_flat(Property::Rotation, &[0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0])
                .unwrap();
        assert_eq!(keyframes.len(), 2);
        assert_eq!(keyframes.property(), Property::Rotation);

        let err = Keyframes::from_flat(Property::Translation, &[1.0, 2.0]);
        assert!(matches!(err, Err(AnimError::MalformedAccessor(_))));
    }

    #[test]
    fn test_rotation_keyframes_are_normalized() {
        let keyframes =
            Keyframes::from_flat(Property::Rotation, &[0.0, 0.0, 0.0, 2.0, 0.0, 3.0, 0.0, 0.0])
                .unwrap();
        let Keyframes::Rotation(rotations) = keyframes else {
            panic!("expected rotation keyframes");
        };
        assert_eq!(rotations, vec![Quat::IDENTITY, Quat::from_xyzw(0.0, 1.0, 0.0, 0.0)]);

        let err = Keyframes::from_flat(Property::Rotation, &[0.0; 4]);
        assert!(matches!(err, Err(AnimError::MalformedAccessor(_))));
        let err = Keyframes::from_flat(Property::Rotation, &[f32::NAN, 0.0, 0.0, 1.0]);
        assert!(matches!(err, Err(AnimError::MalformedAccessor(_))));
    }

    #[test]
    fn test_descending_times_rejected() {
        let result = Sampler::new(
            vec![1.0, 0.5],
            Keyframes::Translation(vec![Vec3::ZERO, Vec3::ONE]),
            InterpolationMode::Linear,
        );
        assert!(matches!(result, Err(AnimError::MalformedAccessor(_))));
    }

    #[test]
    fn test_apply_writes_only_target_field() {
        let mut transform = Transform::IDENTITY;
        PropertyValue::Scale(Vec3::splat(2.0)).apply(&mut transform);
        assert_eq!(transform.scale, Vec3::splat(2.0));
        assert_eq!(transform.translation, Vec3::ZERO);
        assert_eq!(transform.rotation, Quat::IDENTITY);
    }
}
