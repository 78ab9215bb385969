//! Arps decline curves
//!
//! Rates are monthly volumes. Month 0 of a schedule is the initial rate; the
//! schedule ends as soon as the next rate would fall to or below the economic
//! limit, or when `max_periods` months have been produced.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_B_FACTOR_FLOOR;
use crate::production::non_negative;

/// Arps decline form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclineType {
    /// Constant-percentage decline
    #[serde(rename = "EXP", alias = "EXPONENTIAL", alias = "exp", alias = "Exponential")]
    Exponential,
    /// Hyperbolic decline that hands off to terminal exponential decline
    #[serde(rename = "HYP", alias = "HYPERBOLIC", alias = "hyp", alias = "Hyperbolic")]
    Hyperbolic,
}

impl DeclineType {
    /// Parse a settings-store code (`EXP`, `HYP`, or the long names)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "EXP" | "EXPONENTIAL" => Some(DeclineType::Exponential),
            "HYP" | "HYPERBOLIC" => Some(DeclineType::Hyperbolic),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DeclineType::Exponential => "EXP",
            DeclineType::Hyperbolic => "HYP",
        }
    }
}

/// Which equation drives the next month's rate
#[derive(Debug, Clone, Copy, PartialEq)]
enum DeclinePhase {
    /// Arps hyperbolic in elapsed months since the start
    Hyperbolic,
    /// Multiplicative decline; the value is the monthly decline fraction
    Exponential(f64),
}

/// Monthly decline fraction for a nominal annual decline
fn monthly_decline(annual: f64) -> f64 {
    1.0 - (-annual / 12.0).exp()
}

/// A decline curve with sanitized inputs
#[derive(Debug, Clone, PartialEq)]
pub struct DeclineCurve {
    /// Initial rate (qi)
    pub qi: f64,
    /// Economic limit rate (qf), excluded from the schedule
    pub qf: f64,
    pub decline_type: DeclineType,
    /// Arps exponent; callers clamp it to the configured floor
    pub b_factor: f64,
    /// Nominal initial annual decline (Di)
    pub initial_decline: f64,
    /// Terminal annual decline
    pub terminal_decline: f64,
}

/// Evaluated monthly rates of a decline curve
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeclineSchedule {
    /// Monthly rates starting at the forecast start month
    pub rates: Vec<f64>,

    /// Index of the first month on terminal exponential decline
    /// (hyperbolic curves only; None if the switch never happened)
    pub transition_month: Option<usize>,
}

impl DeclineSchedule {
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl DeclineCurve {
    pub fn new(
        qi: f64,
        qf: f64,
        decline_type: DeclineType,
        b_factor: f64,
        initial_decline: f64,
        terminal_decline: f64,
    ) -> Self {
        let b_factor = if b_factor.is_finite() && b_factor > 0.0 {
            b_factor
        } else {
            warn!("b-factor {} is not usable, falling back to {}", b_factor, DEFAULT_B_FACTOR_FLOOR);
            DEFAULT_B_FACTOR_FLOOR
        };

        Self {
            qi: non_negative(qi),
            qf: non_negative(qf),
            decline_type,
            b_factor,
            initial_decline: non_negative(initial_decline),
            terminal_decline: non_negative(terminal_decline),
        }
    }

    /// Instantaneous nominal decline of the hyperbolic trajectory at month `t`
    pub fn instantaneous_decline(&self, t: u32) -> f64 {
        self.initial_decline / (1.0 + self.b_factor * self.initial_decline * t as f64 / 12.0)
    }

    /// Hyperbolic rate at elapsed month `t`
    pub fn hyperbolic_rate(&self, t: u32) -> f64 {
        self.qi / (1.0 + self.b_factor * self.initial_decline * t as f64 / 12.0).powf(1.0 / self.b_factor)
    }

    /// Evaluate at most `max_periods` monthly rates
    pub fn evaluate(&self, max_periods: usize) -> DeclineSchedule {
        let mut schedule = DeclineSchedule::default();
        if self.qi <= 0.0 || self.qf >= self.qi {
            return schedule;
        }

        let mut phase = match self.decline_type {
            DeclineType::Exponential => DeclinePhase::Exponential(monthly_decline(self.initial_decline)),
            DeclineType::Hyperbolic => DeclinePhase::Hyperbolic,
        };
        let mut rate = self.qi;
        let mut t: u32 = 0;

        while rate > self.qf && schedule.rates.len() < max_periods {
            // One-way switch once the hyperbolic decline has flattened to terminal
            if phase == DeclinePhase::Hyperbolic && self.instantaneous_decline(t) <= self.terminal_decline {
                phase = DeclinePhase::Exponential(monthly_decline(self.terminal_decline));
                schedule.transition_month = Some(schedule.rates.len());
            }

            schedule.rates.push(rate);

            rate = match phase {
                DeclinePhase::Hyperbolic => {
                    t += 1;
                    self.hyperbolic_rate(t)
                }
                DeclinePhase::Exponential(decline) => rate * (1.0 - decline),
            };
        }

        debug!(
            "{} curve qi={:.2} qf={:.2}: {} months, transition at {:?}",
            self.decline_type.code(),
            self.qi,
            self.qf,
            schedule.rates.len(),
            schedule.transition_month
        );

        schedule
    }
}

/// Monthly rates for a decline curve
///
/// Ends before the rate reaches `qf` or after `max_periods` months. Empty when
/// `qi <= 0` or `qf >= qi`.
pub fn rates(
    qi: f64,
    qf: f64,
    decline_type: DeclineType,
    b_factor: f64,
    initial_decline: f64,
    terminal_decline: f64,
    max_periods: usize,
) -> Vec<f64> {
    DeclineCurve::new(qi, qf, decline_type, b_factor, initial_decline, terminal_decline)
        .evaluate(max_periods)
        .rates
}

/// Plain Arps curve for `periods` months, t = 1..=periods, with no economic
/// limit and no terminal decline. `b == 0` is exponential.
pub fn arps_rates(qi: f64, di: f64, b: f64, periods: usize) -> Vec<f64> {
    let qi = non_negative(qi);
    let di = non_negative(di);
    let b = non_negative(b);

    (1..=periods)
        .map(|t| {
            let t = t as f64;
            if b == 0.0 {
                qi * (-di * t).exp()
            } else {
                qi / (1.0 + b * di * t).powf(1.0 / b)
            }
        })
        .collect()
}
