//! Present-value rescaling against a baseline captured at well load
//!
//! The engine does not run a cashflow model. It assumes present value moves
//! in proportion to net EUR, which is an approximation: price decks, timing
//! and costs are all held at the baseline's values.

use serde::{Deserialize, Serialize};

/// Net EUR and present value captured when a well is opened for editing
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueBaseline {
    /// Combined oil + gas net EUR; None unless positive
    pub baseline_net_eur: Option<f64>,

    /// Present value (PV17) of the well; None when not provided
    pub baseline_present_value: Option<f64>,
}

impl ValueBaseline {
    pub fn new(baseline_net_eur: Option<f64>, baseline_present_value: Option<f64>) -> Self {
        Self {
            baseline_net_eur,
            baseline_present_value,
        }
    }

    /// From a well record's stored net EURs and PV
    ///
    /// Non-finite parts of the net EUR are skipped; a total that is not
    /// positive is left undefined so scaling falls back to the stored PV.
    pub fn from_well_record(net_oil_eur: Option<f64>, net_gas_eur: Option<f64>, present_value: Option<f64>) -> Self {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite()).unwrap_or(0.0);
        let net = finite(net_oil_eur) + finite(net_gas_eur);

        Self {
            baseline_net_eur: (net > 0.0).then_some(net),
            baseline_present_value: present_value.filter(|v| v.is_finite()),
        }
    }
}

/// Linear present-value rescaling
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueScaler;

impl ValueScaler {
    /// Present-value estimate for the current net EUR
    ///
    /// - no baseline PV: undefined
    /// - positive baseline net EUR and a defined current net EUR:
    ///   `pv * current / baseline`
    /// - otherwise: the baseline PV unchanged
    pub fn scale(current_net_eur: Option<f64>, baseline: &ValueBaseline) -> Option<f64> {
        let pv = baseline.baseline_present_value?;

        match (baseline.baseline_net_eur, current_net_eur) {
            (Some(base), Some(current)) if base > 0.0 && current.is_finite() => Some(pv * (current / base)),
            _ => Some(pv),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scales_proportionally() {
        let baseline = ValueBaseline::new(Some(1000.0), Some(500_000.0));
        assert_eq!(ValueScaler::scale(Some(1200.0), &baseline), Some(600_000.0));
        assert_eq!(ValueScaler::scale(Some(1000.0), &baseline), Some(500_000.0));
    }

    #[test]
    fn test_zero_or_missing_baseline_net_keeps_pv() {
        let zero = ValueBaseline::new(Some(0.0), Some(500_000.0));
        assert_eq!(ValueScaler::scale(Some(1200.0), &zero), Some(500_000.0));
        assert_eq!(ValueScaler::scale(Some(99.0), &zero), Some(500_000.0));

        let missing = ValueBaseline::new(None, Some(500_000.0));
        assert_eq!(ValueScaler::scale(Some(1200.0), &missing), Some(500_000.0));
    }

    #[test]
    fn test_undefined_current_keeps_pv() {
        let baseline = ValueBaseline::new(Some(1000.0), Some(500_000.0));
        assert_eq!(ValueScaler::scale(None, &baseline), Some(500_000.0));
    }

    #[test]
    fn test_missing_pv_is_undefined() {
        let baseline = ValueBaseline::new(Some(1000.0), None);
        assert_eq!(ValueScaler::scale(Some(1200.0), &baseline), None);
    }

    #[test]
    fn test_scaler_is_a_plain_value() {
        let scaler = ValueScaler::default();
        let copied = scaler;
        assert_eq!(format!("{:?}", copied), "ValueScaler");
    }

    #[test]
    fn test_from_well_record() {
        let baseline = ValueBaseline::from_well_record(Some(600.0), Some(f64::NAN), Some(250_000.0));
        assert_eq!(baseline.baseline_net_eur, Some(600.0));

        let empty = ValueBaseline::from_well_record(None, Some(0.0), Some(f64::INFINITY));
        assert_eq!(empty.baseline_net_eur, None);
        assert_eq!(empty.baseline_present_value, None);
    }
}
