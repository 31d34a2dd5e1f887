use std::time::Duration;

use super::FastaError;

/// When to declare convergence
///
/// With $`r_k = \|x_k - y_k\|_2 / t_k`$ the residual of iteration $`k`$
/// (the forward-backward step taken from lookahead point $`y_k`$):
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StopRule {
    /// ```math
    /// \frac{r_k}{r_1 + \epsilon_r} < \mathrm{tol}
    /// ```
    Residual,

    /// ```math
    /// \frac{r_k}{\max(\|\nabla f(y_k)\|, \|x_k - \hat{x}_k\| / t_k) + \epsilon_n} < \mathrm{tol}
    /// ```
    Normalized,

    /// Either of the above.
    Hybrid,

    /// Never; run until `max_iters`.
    Iterations,
}

impl Default for StopRule {
    fn default() -> Self {
        StopRule::Hybrid
    }
}

/// Options for [`fasta`](fn.fasta.html)
///
/// The defaults give the adaptive (spectral step), non-accelerated
/// method with non-monotone backtracking.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct FastaOptions {
    /// Iteration limit. Zero returns `x0` untouched.
    pub max_iters: usize,
    /// Tolerance for the stopping rule.
    pub tol: f64,
    /// Choose steps with the spectral (Barzilai-Borwein) rule.
    pub adaptive_step: bool,
    /// FISTA-style momentum.
    pub accelerate: bool,
    /// Reset momentum when it points uphill, and retake any step that
    /// raised $`f + g`$ without momentum, so the objective never
    /// increases. Only used with `accelerate`.
    pub restart: bool,
    /// Enforce sufficient decrease by shrinking the step.
    pub backtrack: bool,
    /// Shrinks allowed per iteration before giving up.
    pub backtrack_max: usize,
    /// Factor applied to the step on each backtrack. Defaults to 0.2
    /// with `adaptive_step` and 0.5 otherwise.
    pub stepsize_shrink: Option<f64>,
    /// Number of past values of `f` the line search compares against.
    /// A window of one gives a monotone method.
    pub window: usize,
    pub stop_rule: StopRule,
    /// Consecutive iterations the stopping rule must hold.
    pub stop_count: usize,
    pub eps_r: f64,
    pub eps_n: f64,
    /// Lipschitz constant of the gradient of $`x \mapsto f(Ax)`$; the
    /// initial step is its inverse.
    pub lipschitz: Option<f64>,
    /// Initial step. When neither this nor `lipschitz` is given the
    /// Lipschitz constant is estimated from two random points.
    pub tau: Option<f64>,
    /// Keep per-iteration records and the best iterate. Costs one
    /// evaluation of `g` per iteration.
    pub record_history: bool,
    /// Log every iteration at `info` rather than `trace`.
    pub verbose: bool,
    /// Check that `At` is the adjoint of `A` on random vectors.
    pub check_adjoint: bool,
    /// Check `gradf` against finite differences of `f` at `A x0`.
    pub check_gradient: bool,
    /// Seed for the random vectors used by the checks and the
    /// Lipschitz estimate.
    pub seed: u64,
    /// Wall-clock budget, checked between iterations.
    pub max_time: Option<Duration>,
}

impl Default for FastaOptions {
    fn default() -> Self {
        FastaOptions {
            max_iters: 1000,
            tol: 1e-3,
            adaptive_step: true,
            accelerate: false,
            restart: true,
            backtrack: true,
            backtrack_max: 20,
            stepsize_shrink: None,
            window: 10,
            stop_rule: StopRule::Hybrid,
            stop_count: 1,
            eps_r: 1e-8,
            eps_n: 1e-8,
            lipschitz: None,
            tau: None,
            record_history: true,
            verbose: false,
            check_adjoint: true,
            check_gradient: false,
            seed: 0,
            max_time: None,
        }
    }
}

impl FastaOptions {
    /// Forward-backward splitting with a fixed step and backtracking.
    pub fn plain() -> Self {
        FastaOptions {
            adaptive_step: false,
            ..FastaOptions::default()
        }
    }

    /// Spectral step sizes; same as the default.
    pub fn adaptive() -> Self {
        FastaOptions::default()
    }

    /// FISTA momentum with adaptive restart.
    pub fn accelerated() -> Self {
        FastaOptions {
            adaptive_step: false,
            accelerate: true,
            ..FastaOptions::default()
        }
    }

    /// Check the options, returning them unchanged when consistent.
    pub fn validated(self) -> Result<Self, FastaError> {
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), FastaError> {
        fn non_negative(name: &str, v: f64) -> Result<(), FastaError> {
            if v.is_finite() && v >= 0. {
                Ok(())
            } else {
                Err(FastaError::invalid(format!(
                    "{} must be finite and non-negative, got {}",
                    name, v
                )))
            }
        }
        fn positive(name: &str, v: Option<f64>) -> Result<(), FastaError> {
            match v {
                Some(v) if !(v.is_finite() && v > 0.) => Err(FastaError::invalid(format!(
                    "{} must be finite and positive, got {}",
                    name, v
                ))),
                _ => Ok(()),
            }
        }

        non_negative("tol", self.tol)?;
        non_negative("eps_r", self.eps_r)?;
        non_negative("eps_n", self.eps_n)?;
        positive("lipschitz", self.lipschitz)?;
        positive("tau", self.tau)?;

        if let Some(shrink) = self.stepsize_shrink {
            if !(shrink > 0. && shrink < 1.) {
                return Err(FastaError::invalid(format!(
                    "stepsize_shrink must lie in (0, 1), got {}",
                    shrink
                )));
            }
        }
        if self.window == 0 {
            return Err(FastaError::invalid("window must be at least 1"));
        }
        if self.stop_count == 0 {
            return Err(FastaError::invalid("stop_count must be at least 1"));
        }
        if self.backtrack && self.backtrack_max == 0 {
            return Err(FastaError::invalid(
                "backtrack_max must be at least 1 when backtracking is enabled",
            ));
        }
        if self.lipschitz.is_some() && self.tau.is_some() {
            return Err(FastaError::invalid(
                "give at most one of lipschitz and tau",
            ));
        }
        if self.max_time == Some(Duration::from_secs(0)) {
            return Err(FastaError::invalid("max_time must be non-zero"));
        }
        Ok(())
    }

    pub(crate) fn shrink_factor(&self) -> f64 {
        self.stepsize_shrink
            .unwrap_or(if self.adaptive_step { 0.2 } else { 0.5 })
    }
}

#[cfg(feature = "serde")]
impl FastaOptions {
    /// Read options from any serde format and validate them
    ///
    /// Unknown keys, malformed values and inconsistent settings all
    /// become [`FastaError::InvalidConfiguration`](enum.FastaError.html).
    pub fn load<'de, D>(deserializer: D) -> Result<Self, FastaError>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::Deserialize;
        FastaOptions::deserialize(deserializer)
            .map_err(|e| FastaError::invalid(e.to_string()))?
            .validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejects(opts: FastaOptions) -> bool {
        matches!(opts.validate(), Err(FastaError::InvalidConfiguration(_)))
    }

    #[test]
    fn presets_are_valid() {
        assert!(FastaOptions::default().validate().is_ok());
        assert!(FastaOptions::plain().validate().is_ok());
        assert!(FastaOptions::adaptive().validate().is_ok());
        assert!(FastaOptions::accelerated().validate().is_ok());
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(rejects(FastaOptions {
            tol: -1e-3,
            ..Default::default()
        }));
        assert!(rejects(FastaOptions {
            tol: f64::NAN,
            ..Default::default()
        }));
        assert!(rejects(FastaOptions {
            tau: Some(0.),
            ..Default::default()
        }));
        assert!(rejects(FastaOptions {
            lipschitz: Some(f64::INFINITY),
            ..Default::default()
        }));
        assert!(rejects(FastaOptions {
            stepsize_shrink: Some(1.),
            ..Default::default()
        }));
        assert!(rejects(FastaOptions {
            window: 0,
            ..Default::default()
        }));
        assert!(rejects(FastaOptions {
            stop_count: 0,
            ..Default::default()
        }));
        assert!(rejects(FastaOptions {
            max_time: Some(Duration::from_secs(0)),
            ..Default::default()
        }));
    }

    #[test]
    fn rejects_contradictions() {
        assert!(rejects(FastaOptions {
            tau: Some(0.1),
            lipschitz: Some(10.),
            ..Default::default()
        }));
        assert!(rejects(FastaOptions {
            backtrack_max: 0,
            ..Default::default()
        }));
        // no backtracking means the limit is never consulted
        assert!(FastaOptions {
            backtrack: false,
            backtrack_max: 0,
            ..Default::default()
        }
        .validated()
        .is_ok());
    }

    #[test]
    fn modes_combine_freely() {
        for &adaptive_step in &[false, true] {
            for &accelerate in &[false, true] {
                for &restart in &[false, true] {
                    let opts = FastaOptions {
                        adaptive_step,
                        accelerate,
                        restart,
                        ..Default::default()
                    };
                    assert!(opts.validate().is_ok(), "{:?}", opts);
                }
            }
        }
    }

    #[test]
    fn shrink_factor_depends_on_mode() {
        assert_eq!(FastaOptions::adaptive().shrink_factor(), 0.2);
        assert_eq!(FastaOptions::plain().shrink_factor(), 0.5);
        let opts = FastaOptions {
            stepsize_shrink: Some(0.9),
            ..FastaOptions::plain()
        };
        assert_eq!(opts.shrink_factor(), 0.9);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn unknown_keys_are_rejected() {
        let opts: FastaOptions =
            serde_json::from_str(r#"{"max_iters": 50, "accelerate": true, "adaptive_step": false}"#)
                .unwrap();
        assert_eq!(opts.max_iters, 50);
        assert!(opts.accelerate);
        assert_eq!(opts.tol, 1e-3);

        let bad = serde_json::from_str::<FastaOptions>(r#"{"max_iter": 50}"#);
        assert!(bad.is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn load_reports_invalid_configuration() {
        let load = |text: &str| FastaOptions::load(&mut serde_json::Deserializer::from_str(text));

        let opts = load(r#"{"tol": 1e-6, "stop_rule": "residual"}"#).unwrap();
        assert_eq!(opts.tol, 1e-6);
        assert_eq!(opts.stop_rule, StopRule::Residual);

        assert!(matches!(
            load(r#"{"max_iter": 50}"#),
            Err(FastaError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            load(r#"{"tol": -1.0}"#),
            Err(FastaError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            load(r#"{"max_iters": "many"}"#),
            Err(FastaError::InvalidConfiguration(_))
        ));
    }
}
