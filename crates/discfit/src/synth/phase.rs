//! Brightness modulation laws applied on top of the radial profile.

use std::f64::consts::PI;

/// Henyey-Greenstein single-scattering phase function
/// `p(g, cosθ) = (1 - g²) / (4π (1 + g² + 2g cosθ)^1.5)`.
#[inline]
pub fn henyey_greenstein(g: f64, cos_theta: f64) -> f64 {
    let denom = 1.0 + g * g + 2.0 * g * cos_theta;
    (1.0 - g * g) / (4.0 * PI * denom.powf(1.5))
}

/// Scattering cosine for a pixel at rotated-frame `(x, y)` on a disc tilted
/// by `tan_inc`: height `z = -y tan(inc)`, `cosθ = -z / |(x, y, z)|`.
///
/// Returns 0 at the origin.
#[inline]
pub fn scattering_cosine(x: f64, y: f64, tan_inc: f64) -> f64 {
    let z = -y * tan_inc;
    let norm = (x * x + y * y + z * z).sqrt();
    if norm == 0.0 {
        0.0
    } else {
        -z / norm
    }
}

/// Azimuthally modulated peak brightness
/// `surf_0 + surf_theta * cos²((theta_max - θ + π) / 2)`, angles in radians.
#[inline]
pub fn azimuthal_peak(surf_0: f64, surf_theta: f64, theta_max: f64, theta: f64) -> f64 {
    let c = (0.5 * (theta_max - theta + PI)).cos();
    surf_0 + surf_theta * c * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn isotropic_phase_is_uniform() {
        for &c in &[-1.0, -0.3, 0.0, 0.7, 1.0] {
            assert_relative_eq!(henyey_greenstein(0.0, c), 1.0 / (4.0 * PI), epsilon = 1e-15);
        }
    }

    #[test]
    fn phase_integrates_to_one_over_sphere() {
        // ∫ p dΩ = 2π ∫_{-1}^{1} p(μ) dμ
        let n = 20_000;
        for &g in &[-0.6, 0.2, 0.8] {
            let mut acc = 0.0;
            for k in 0..n {
                let mu = -1.0 + (k as f64 + 0.5) * 2.0 / n as f64;
                acc += henyey_greenstein(g, mu) * 2.0 / n as f64;
            }
            assert_relative_eq!(2.0 * PI * acc, 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn scattering_cosine_edge_cases() {
        assert_eq!(scattering_cosine(0.0, 0.0, 1.0), 0.0);
        // Face-on disc: z = 0 everywhere.
        assert_eq!(scattering_cosine(3.0, 4.0, 0.0), 0.0);
        // At 45° a point on the minor axis has |cosθ| = 1/sqrt(2).
        let c = scattering_cosine(0.0, 1.0, 1.0);
        assert_relative_eq!(c, 1.0 / 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn azimuthal_peak_extrema() {
        // cos² term is 1 when theta = theta_max + π and 0 when theta = theta_max.
        assert_relative_eq!(azimuthal_peak(10.0, 5.0, 0.3, 0.3 + PI), 15.0, epsilon = 1e-12);
        assert_relative_eq!(azimuthal_peak(10.0, 5.0, 0.3, 0.3), 10.0, epsilon = 1e-12);
    }
}
