//! One-rep-max estimation formulas.
//!
//! Pure functions mapping a submaximal set (weight, reps) to an estimated 1RM.
//! Brzycki is only defined below 37 reps; callers outside that range get
//! [`Error::FormulaDomain`] rather than a clamped value.

use crate::{Error, FormulaMethod, Result};

/// Largest rep count Brzycki accepts (denominator is `37 - reps`)
pub const BRZYCKI_MAX_REPS: u32 = 36;

/// Epley: `weight * (1 + reps / 30)`
pub fn epley(weight: f64, reps: u32) -> f64 {
    weight * (1.0 + reps as f64 / 30.0)
}

/// Brzycki: `weight * 36 / (37 - reps)`
///
/// # Errors
/// Returns [`Error::FormulaDomain`] when `reps >= 37`.
pub fn brzycki(weight: f64, reps: u32) -> Result<f64> {
    if reps > BRZYCKI_MAX_REPS {
        return Err(Error::FormulaDomain {
            method: FormulaMethod::Brzycki.name(),
            reps,
        });
    }
    Ok(weight * 36.0 / (37.0 - reps as f64))
}

/// Lombardi: `weight * reps^0.10`
pub fn lombardi(weight: f64, reps: u32) -> f64 {
    weight * (reps as f64).powf(0.10)
}

/// McGlothin: `100 * weight / (101.3 - 2.67123 * reps)`
pub fn mcglothin(weight: f64, reps: u32) -> f64 {
    100.0 * weight / (101.3 - 2.67123 * reps as f64)
}

/// Estimate a 1RM with the given method
pub fn estimate(weight: f64, reps: u32, method: FormulaMethod) -> Result<f64> {
    match method {
        FormulaMethod::Epley => Ok(epley(weight, reps)),
        FormulaMethod::Brzycki => brzycki(weight, reps),
        FormulaMethod::Lombardi => Ok(lombardi(weight, reps)),
        FormulaMethod::McGlothin => Ok(mcglothin(weight, reps)),
    }
}

/// Every method whose domain admits `reps`, for side-by-side comparison
pub fn estimate_all(weight: f64, reps: u32) -> Vec<(FormulaMethod, f64)> {
    FormulaMethod::ALL
        .iter()
        .filter_map(|method| match estimate(weight, reps, *method) {
            Ok(value) => Some((*method, value)),
            Err(e) => {
                tracing::debug!("Skipping {}: {}", method, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_epley() {
        assert!(close(epley(100.0, 5), 116.667));
        assert!(close(epley(100.0, 1), 103.333));
        for reps in 1..=36 {
            assert!(close(epley(80.0, reps), 80.0 * (1.0 + reps as f64 / 30.0)));
        }
    }

    #[test]
    fn test_brzycki() {
        assert!(close(brzycki(100.0, 5).unwrap(), 112.5));
        assert!(close(brzycki(100.0, 1).unwrap(), 100.0));
    }

    #[test]
    fn test_brzycki_domain() {
        assert!(brzycki(100.0, 36).is_ok());
        let err = brzycki(100.0, 37).unwrap_err();
        assert!(matches!(err, Error::FormulaDomain { reps: 37, .. }));
        assert!(estimate(100.0, 40, FormulaMethod::Brzycki).is_err());
    }

    #[test]
    fn test_lombardi() {
        assert!(close(lombardi(100.0, 5), 117.46));
        assert!(close(lombardi(100.0, 1), 100.0));
    }

    #[test]
    fn test_mcglothin() {
        assert!(close(mcglothin(100.0, 5), 113.71));
    }

    #[test]
    fn test_estimate_dispatch() {
        assert!(close(estimate(100.0, 5, FormulaMethod::Epley).unwrap(), 116.667));
        assert!(close(estimate(100.0, 5, FormulaMethod::McGlothin).unwrap(), 113.71));
    }

    #[test]
    fn test_estimate_all_skips_out_of_domain() {
        assert_eq!(estimate_all(100.0, 5).len(), 4);

        let high_reps = estimate_all(50.0, 40);
        assert_eq!(high_reps.len(), 3);
        assert!(high_reps.iter().all(|(m, _)| *m != FormulaMethod::Brzycki));
    }
}
