//! Light sources.
//!
//! Delta lights (point, directional) are evaluated exactly with one shadow
//! ray. The sphere light is an area light sampled with the sampler's unit
//! sphere set. The ambient light is omnidirectional and never shadowed.

use lumen_math::{Point3, Vector3};

use crate::{Color, Sampler};

/// Where light reaches a surface point from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Incidence {
    /// From a unit `direction` (surface to light) at `distance`, which is
    /// infinite for lights at infinity.
    Directed { direction: Vector3, distance: f64 },
    /// From everywhere at once; no shadow test applies.
    Omni,
}

/// One evaluated light contribution at a surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    pub color: Color,
    /// Power reaching the point, after falloff
    pub energy: f64,
    pub incidence: Incidence,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    Point {
        position: Point3,
        color: Color,
        power: f64,
    },
    /// Parallel light travelling along `direction`.
    Directional {
        direction: Vector3,
        color: Color,
        power: f64,
    },
    Ambient {
        color: Color,
        power: f64,
    },
    Sphere {
        center: Point3,
        radius: f64,
        color: Color,
        power: f64,
    },
}

impl Light {
    /// True for lights without extent, evaluated with a single sample.
    pub fn is_delta(&self) -> bool {
        matches!(self, Light::Point { .. } | Light::Directional { .. })
    }

    pub fn color(&self) -> Color {
        match self {
            Light::Point { color, .. }
            | Light::Directional { color, .. }
            | Light::Ambient { color, .. }
            | Light::Sphere { color, .. } => *color,
        }
    }

    pub fn power(&self) -> f64 {
        match self {
            Light::Point { power, .. }
            | Light::Directional { power, .. }
            | Light::Ambient { power, .. }
            | Light::Sphere { power, .. } => *power,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Light::Point { .. } => "point",
            Light::Directional { .. } => "directional",
            Light::Ambient { .. } => "ambient",
            Light::Sphere { .. } => "sphere",
        }
    }

    /// Contributions of this light at `point`.
    ///
    /// Area lights draw positions from sample set `set` of `sampler` and
    /// split their power evenly between them. Samples that coincide with
    /// `point` carry no direction and are dropped.
    pub fn sample(&self, point: Point3, sampler: &Sampler, set: usize) -> Vec<LightSample> {
        match *self {
            Light::Point { position, color, power } => {
                directed(point, position, color, power).into_iter().collect()
            }
            Light::Directional { direction, color, power } => match (-direction).normalize() {
                Ok(direction) => vec![LightSample {
                    color,
                    energy: power,
                    incidence: Incidence::Directed {
                        direction,
                        distance: f64::INFINITY,
                    },
                }],
                Err(_) => Vec::new(),
            },
            Light::Ambient { color, power } => vec![LightSample {
                color,
                energy: power,
                incidence: Incidence::Omni,
            }],
            Light::Sphere { center, radius, color, power } => {
                let positions = sampler.unit_sphere_samples(set);
                let share = power / positions.len() as f64;
                positions
                    .iter()
                    .filter_map(|s| directed(point, center + *s * radius, color, share))
                    .collect()
            }
        }
    }
}

/// Light from a point source with inverse-square falloff.
fn directed(point: Point3, light: Point3, color: Color, power: f64) -> Option<LightSample> {
    let to_light = light - point;
    let distance = to_light.length();
    let direction = to_light.normalize().ok()?;

    Some(LightSample {
        color,
        energy: power / (distance * distance),
        incidence: Incidence::Directed { direction, distance },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SamplerKind;

    fn sampler() -> Sampler {
        Sampler::new(SamplerKind::Stratified, 16, 2, 1)
    }

    #[test]
    fn test_point_light_falloff() {
        let light = Light::Point {
            position: Point3::new(0.0, 2.0, 0.0),
            color: Color::ONE,
            power: 8.0,
        };
        let samples = light.sample(Point3::ZERO, &sampler(), 0);

        assert_eq!(samples.len(), 1);
        assert!((samples[0].energy - 2.0).abs() < 1e-12);
        assert_eq!(
            samples[0].incidence,
            Incidence::Directed {
                direction: Vector3::Y,
                distance: 2.0
            }
        );
        assert!(light.is_delta());
    }

    #[test]
    fn test_directional_light_points_back_to_source() {
        let light = Light::Directional {
            direction: Vector3::new(0.0, -3.0, 0.0),
            color: Color::ONE,
            power: 1.5,
        };
        let samples = light.sample(Point3::new(10.0, 0.0, -4.0), &sampler(), 0);

        match samples[0].incidence {
            Incidence::Directed { direction, distance } => {
                assert_eq!(direction, Vector3::Y);
                assert!(distance.is_infinite());
            }
            Incidence::Omni => panic!("directional light must be directed"),
        }
        assert_eq!(samples[0].energy, 1.5);
    }

    #[test]
    fn test_ambient_light_is_omni() {
        let light = Light::Ambient {
            color: Color::new(0.2, 0.2, 0.2),
            power: 1.0,
        };
        let samples = light.sample(Point3::ZERO, &sampler(), 0);

        assert_eq!(samples[0].incidence, Incidence::Omni);
        assert!(!light.is_delta());
    }

    #[test]
    fn test_sphere_light_splits_power() {
        let light = Light::Sphere {
            center: Point3::new(0.0, 10.0, 0.0),
            radius: 0.5,
            color: Color::ONE,
            power: 100.0,
        };
        let samples = light.sample(Point3::ZERO, &sampler(), 1);

        assert_eq!(samples.len(), 16);
        let total: f64 = samples.iter().map(|s| s.energy).sum();
        // Every sample sits between 9.5 and 10.5 units away.
        assert!(total > 100.0 / (10.5 * 10.5) && total < 100.0 / (9.5 * 9.5));
        for s in &samples {
            if let Incidence::Directed { direction, distance } = s.incidence {
                assert!(direction.y() > 0.99);
                assert!((9.5..=10.5).contains(&distance));
            }
        }
    }
}
