//! 2×2 gate matrices in row-major order
//!
//! Rotation constructors take the full rotation angle and build the
//! half-angle matrix e^(-iθ/2·P); the phase-shift matrix rotates around
//! the |1⟩ state.

use num_complex::Complex64;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const NEG_ONE: Complex64 = Complex64::new(-1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);
const NEG_I: Complex64 = Complex64::new(0.0, -1.0);

const INV_SQRT2: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Pauli-X (NOT)
pub(crate) const PAULI_X: [Complex64; 4] = [ZERO, ONE, ONE, ZERO];

/// Pauli-Y
pub(crate) const PAULI_Y: [Complex64; 4] = [ZERO, NEG_I, I, ZERO];

/// Pauli-Z
pub(crate) const PAULI_Z: [Complex64; 4] = [ONE, ZERO, ZERO, NEG_ONE];

/// Hadamard
pub(crate) const HADAMARD: [Complex64; 4] = [
    Complex64::new(INV_SQRT2, 0.0),
    Complex64::new(INV_SQRT2, 0.0),
    Complex64::new(INV_SQRT2, 0.0),
    Complex64::new(-INV_SQRT2, 0.0),
];

/// diag(1, e^(iθ/2)) — phase rotation around |1⟩
pub(crate) fn phase_shift(radians: f64) -> [Complex64; 4] {
    let (sine, cosine) = (radians / 2.0).sin_cos();
    [ONE, ZERO, ZERO, Complex64::new(cosine, sine)]
}

/// e^(-iθ/2·X)
pub(crate) fn rotation_x(radians: f64) -> [Complex64; 4] {
    let (sine, cosine) = (radians / 2.0).sin_cos();
    [
        Complex64::new(cosine, 0.0),
        Complex64::new(0.0, -sine),
        Complex64::new(0.0, -sine),
        Complex64::new(cosine, 0.0),
    ]
}

/// e^(-iθ/2·Y)
pub(crate) fn rotation_y(radians: f64) -> [Complex64; 4] {
    let (sine, cosine) = (radians / 2.0).sin_cos();
    [
        Complex64::new(cosine, 0.0),
        Complex64::new(-sine, 0.0),
        Complex64::new(sine, 0.0),
        Complex64::new(cosine, 0.0),
    ]
}

/// e^(-iθ/2·Z)
pub(crate) fn rotation_z(radians: f64) -> [Complex64; 4] {
    let (sine, cosine) = (radians / 2.0).sin_cos();
    [
        Complex64::new(cosine, -sine),
        ZERO,
        ZERO,
        Complex64::new(cosine, sine),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn is_unitary(m: &[Complex64; 4]) -> bool {
        // M·M† = I for a 2×2.
        let e00 = m[0] * m[0].conj() + m[1] * m[1].conj();
        let e01 = m[0] * m[2].conj() + m[1] * m[3].conj();
        let e11 = m[2] * m[2].conj() + m[3] * m[3].conj();
        (e00.re - 1.0).abs() < 1e-12
            && e00.im.abs() < 1e-12
            && e01.norm() < 1e-12
            && (e11.re - 1.0).abs() < 1e-12
            && e11.im.abs() < 1e-12
    }

    #[test]
    fn constants_are_unitary() {
        assert!(is_unitary(&PAULI_X));
        assert!(is_unitary(&PAULI_Y));
        assert!(is_unitary(&PAULI_Z));
        assert!(is_unitary(&HADAMARD));
    }

    #[test]
    fn rotations_are_unitary() {
        for &theta in &[0.0, 0.3, std::f64::consts::PI, 2.5] {
            assert!(is_unitary(&phase_shift(theta)));
            assert!(is_unitary(&rotation_x(theta)));
            assert!(is_unitary(&rotation_y(theta)));
            assert!(is_unitary(&rotation_z(theta)));
        }
    }

    #[test]
    fn phase_shift_uses_half_angle() {
        let m = phase_shift(std::f64::consts::PI);
        assert_relative_eq!(m[3].re, (std::f64::consts::FRAC_PI_2).cos(), epsilon = 1e-12);
        assert_relative_eq!(m[3].im, (std::f64::consts::FRAC_PI_2).sin(), epsilon = 1e-12);
    }
}
