//! Density scoring and zoning tier classification for placement cells.
//!
//! The score is a radial falloff from the island center plus a smooth,
//! low-frequency noise term. High scores near the center become the inner
//! city, medium scores midtown, everything else suburb.

use bevy::math::DVec2;
use noise::{NoiseFn, Perlin};

/// Zoning tier resolved for a placement cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoningTier {
    /// Tall mixed archetypes around downtown.
    Inner,
    Midtown,
    /// Low-rise housing, sparser fill.
    Suburb,
}

impl ZoningTier {
    pub fn label(self) -> &'static str {
        match self {
            ZoningTier::Inner => "inner",
            ZoningTier::Midtown => "midtown",
            ZoningTier::Suburb => "suburb",
        }
    }

    /// Number of factory archetypes available for this tier.
    pub fn archetype_count(self) -> usize {
        match self {
            ZoningTier::Inner => 3,
            ZoningTier::Midtown => 1,
            ZoningTier::Suburb => 3,
        }
    }
}

/// Low-frequency noise layered onto the radial falloff.
#[derive(Clone, Debug, PartialEq)]
pub enum DensityNoise {
    /// `amplitude * sin(x * frequency) * cos(z * frequency)`
    Sines { frequency: f64, amplitude: f64 },
    /// Perlin noise remapped to `[-amplitude, amplitude]`.
    Perlin { seed: u32, scale: f64, amplitude: f64 },
    Flat,
}

impl Default for DensityNoise {
    fn default() -> Self {
        DensityNoise::Sines {
            frequency: 0.05,
            amplitude: 0.3,
        }
    }
}

/// Score cutoffs for promoting a cell to a denser tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierThresholds {
    pub inner_score: f64,
    pub inner_radius: f64,
    pub midtown_score: f64,
    pub midtown_radius: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            inner_score: 0.5,
            inner_radius: 60.0,
            midtown_score: 0.25,
            midtown_radius: 120.0,
        }
    }
}

/// Evaluates density scores over the island.
pub struct DensityField {
    noise: DensityNoise,
    perlin: Option<Perlin>,
    max_radius: f64,
}

impl DensityField {
    pub fn new(noise: DensityNoise, max_radius: f64) -> Self {
        let perlin = match noise {
            DensityNoise::Perlin { seed, .. } => Some(Perlin::new(seed)),
            _ => None,
        };
        Self {
            noise,
            perlin,
            max_radius,
        }
    }

    pub fn noise_at(&self, point: DVec2) -> f64 {
        match (&self.noise, &self.perlin) {
            (DensityNoise::Sines { frequency, amplitude }, _) => {
                (point.x * frequency).sin() * (point.y * frequency).cos() * amplitude
            }
            (DensityNoise::Perlin { scale, amplitude, .. }, Some(perlin)) => {
                perlin.get([point.x * scale, point.y * scale]).clamp(-1.0, 1.0) * amplitude
            }
            _ => 0.0,
        }
    }

    /// `(1 - dist / max_radius) + noise(x, z)`
    pub fn score(&self, point: DVec2) -> f64 {
        let falloff = if self.max_radius > 0.0 {
            1.0 - point.length() / self.max_radius
        } else {
            0.0
        };
        falloff + self.noise_at(point)
    }
}

pub fn classify_tier(score: f64, distance: f64, thresholds: &TierThresholds) -> ZoningTier {
    if score > thresholds.inner_score && distance < thresholds.inner_radius {
        ZoningTier::Inner
    } else if score > thresholds.midtown_score && distance < thresholds.midtown_radius {
        ZoningTier::Midtown
    } else {
        ZoningTier::Suburb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_classification_respects_thresholds() {
        let t = TierThresholds::default();
        assert_eq!(classify_tier(0.8, 40.0, &t), ZoningTier::Inner);
        // Dense but too far out for the inner city.
        assert_eq!(classify_tier(0.8, 80.0, &t), ZoningTier::Midtown);
        assert_eq!(classify_tier(0.3, 100.0, &t), ZoningTier::Midtown);
        assert_eq!(classify_tier(0.3, 150.0, &t), ZoningTier::Suburb);
        assert_eq!(classify_tier(0.1, 10.0, &t), ZoningTier::Suburb);
    }

    #[test]
    fn score_falls_off_with_distance() {
        let field = DensityField::new(DensityNoise::Flat, 185.0);
        assert_eq!(field.score(DVec2::ZERO), 1.0);
        assert!((field.score(DVec2::new(185.0, 0.0))).abs() < 1e-12);
        assert!(field.score(DVec2::new(50.0, 0.0)) > field.score(DVec2::new(100.0, 0.0)));
    }

    #[test]
    fn noise_stays_within_its_amplitude() {
        let sines = DensityField::new(DensityNoise::default(), 185.0);
        let perlin = DensityField::new(
            DensityNoise::Perlin {
                seed: 7,
                scale: 0.03,
                amplitude: 0.3,
            },
            185.0,
        );
        for i in 0..200 {
            let p = DVec2::new(i as f64 * 1.7 - 170.0, i as f64 * -0.9 + 80.0);
            assert!(sines.noise_at(p).abs() <= 0.3 + 1e-12);
            assert!(perlin.noise_at(p).abs() <= 0.3 + 1e-9);
        }
    }
}
