//! Interpolator filter design routines.
//!
//! This module contains code used to design the low-pass FIR filter of the
//! interpolator. The design is done using the Parks-McClellan algorithm with
//! the [pm-remez](mod@pm_remez) crate, and the resulting filter is quantized to
//! the coefficient format of the [`CoefficientTable`].

use crate::{
    coefficients::CoefficientTable,
    constants::{self, INTERPOLATION, NUM_TAPS},
    fixed::COEFFICIENT_FORMAT,
};
use anyhow::{Context, Result};
use pm_remez::{
    constant, linear, order_estimates::ichige, pm_parameters, pm_remez, BandSetting, PMDesign,
};

#[derive(Debug, Copy, Clone, PartialEq)]
struct Config {
    // transition bandwidth, as a fraction of the input Nyquist band
    delta_f: f64,
    // passband ripple
    delta_p: f64,
    // stopband ripple
    delta_s: f64,
    // 1/f stopband
    one_over_f: bool,
}

impl Config {
    fn from_filter_design(design: &maia_interp_json::FilterDesign) -> Result<Config> {
        let config = Config {
            delta_f: design.transition_bandwidth.unwrap_or(0.1),
            delta_p: design.passband_ripple.unwrap_or(0.01),
            delta_s: design
                .stopband_attenuation_db
                .map_or(0.001, |db| 10.0f64.powf(-db / 20.0)),
            one_over_f: design.stopband_one_over_f.unwrap_or(true),
        };
        anyhow::ensure!(
            config.delta_f > 0.0 && config.delta_f < 1.0,
            "transition bandwidth must be between 0 and 1"
        );
        anyhow::ensure!(
            config.delta_p > 0.0 && config.delta_p < 1.0,
            "passband ripple must be between 0 and 1"
        );
        anyhow::ensure!(
            config.delta_s > 0.0 && config.delta_s < 1.0,
            "stopband attenuation must be positive"
        );
        Ok(config)
    }

    // passband end, normalized to the output sample rate
    fn passband_end(&self) -> f64 {
        0.5 * (1.0 - self.delta_f) / INTERPOLATION as f64
    }

    // stopband start, normalized to the output sample rate; this is where the
    // first image of the passband begins
    fn stopband_start(&self) -> f64 {
        1.0 / INTERPOLATION as f64 - self.passband_end()
    }
}

/// Calculates an interpolator filter according to some requirements.
///
/// The `design` parameter gives the filter requirements. The function returns
/// a coefficient table with the quantized filter, or an error if the filter
/// would need more than 1024 taps.
///
/// The following defaults are used for values in `design` that are not
/// specified:
/// - Transition bandwidth: 0.1.
/// - Passband ripple: 0.01.
/// - Stopband attenuation: 60 dB.
/// - Stopband 1/f response: enabled.
pub fn make_design(design: &maia_interp_json::FilterDesign) -> Result<CoefficientTable> {
    let config = Config::from_filter_design(design)?;
    let design = pm_design(&config, NUM_TAPS)?;
    tracing::debug!(
        num_taps = design.impulse_response.len(),
        weighted_error = design.weighted_error,
        "filter design done"
    );
    Ok(CoefficientTable::new(&quantize(&design.impulse_response)?)?)
}

/// Calculates the default interpolator filter.
pub fn default_design() -> Result<CoefficientTable> {
    make_design(&maia_interp_json::FilterDesign::default())
}

// Scales the filter to have a DC gain of INTERPOLATION (unity gain per phase),
// rounds to the coefficient format, and pads with zeros to NUM_TAPS.
fn quantize(h: &[f64]) -> Result<Vec<i32>> {
    let max_abs = h.iter().map(|x| x.abs()).fold(0.0, f64::max);
    let sum = h.iter().sum::<f64>();
    anyhow::ensure!(sum > 0.0, "filter has no DC gain");
    let scale_desired = INTERPOLATION as f64 / sum;
    let scale_max = COEFFICIENT_FORMAT.to_f64(constants::MAX_COEFF) / max_abs;
    let scale = if scale_desired > scale_max {
        tracing::warn!(
            "filter gain reduced to {:.3} to fit coefficients in {} bits",
            scale_max / scale_desired,
            constants::COEFFICIENT_BITS
        );
        scale_max
    } else {
        scale_desired
    };
    let mut coefficients = h
        .iter()
        .map(|&x| {
            COEFFICIENT_FORMAT
                .from_f64(x * scale)
                .with_context(|| format!("coefficient {x} does not fit after scaling"))
        })
        .collect::<Result<Vec<_>>>()?;
    coefficients.resize(NUM_TAPS, 0);
    Ok(coefficients)
}

fn pm_design(config: &Config, max_taps: usize) -> Result<PMDesign<f64>> {
    const THRESHOLD: f64 = 1.1;

    let passband_end = config.passband_end();
    let stopband_start = config.stopband_start();
    let stopband_weight = config.delta_p / config.delta_s;
    let stopband_weight = if config.one_over_f {
        linear(stopband_weight, stopband_weight * 0.5 / stopband_start)
    } else {
        constant(stopband_weight)
    };
    let bands = [
        BandSetting::new(0.0, passband_end, constant(1.0))?,
        BandSetting::with_weight(stopband_start, 0.5, constant(0.0), stopband_weight)?,
    ];

    // Initial estimate for number of taps
    let mut num_taps = pm_estimate(config);
    if num_taps as f64 > max_taps as f64 * THRESHOLD {
        anyhow::bail!(
            "FIR filter would need about {num_taps} taps, but at most {max_taps} are supported"
        );
    }
    num_taps = num_taps.min(max_taps);

    let parameters = pm_parameters(num_taps, &bands)?;
    let mut design = pm_remez(&parameters)?;

    if design.weighted_error < config.delta_p {
        // Initial estimate was an overestimate. Back off the number of taps
        // until we no longer meet the estimate.
        loop {
            num_taps -= 1;
            let parameters = pm_parameters(num_taps, &bands)?;
            let new_design = pm_remez(&parameters)?;
            if new_design.weighted_error > config.delta_p {
                return Ok(design);
            }
            design = new_design;
        }
    } else {
        // Initial estimate was an underestimate. Increase the number of taps
        // until the estimate is met.
        while design.weighted_error > config.delta_p {
            num_taps += 1;
            if num_taps > max_taps {
                anyhow::bail!("FIR filter would need more than {max_taps} taps");
            }
            let parameters = pm_parameters(num_taps, &bands)?;
            design = pm_remez(&parameters)?;
        }
        Ok(design)
    }
}

fn pm_estimate(config: &Config) -> usize {
    let passband_end = config.passband_end();
    ichige(
        passband_end,
        config.stopband_start() - passband_end,
        config.delta_p,
        config.delta_s,
    )
}
