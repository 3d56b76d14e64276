//! Shipping price estimation.
//!
//! Two independent strategies exist: a linear formula used at intake and
//! the admin tariff grid. They disagree for most inputs and neither is
//! derived from the other; callers pick one through [`PriceEstimator`].

use super::entities::TariffRule;
use super::validation::is_decimal;

/// Cities that carry the flat distance surcharge.
pub const DEFAULT_DISTANT_CITIES: [&str; 5] = ["Agadir", "Oujda", "Tanger", "Tetouan", "Casablanca"];

pub trait PriceEstimator {
    /// Short name shown next to an estimate.
    fn name(&self) -> &'static str;

    /// Price for a parcel, or `None` when the inputs cannot be priced.
    fn estimate(&self, weight_kg: f64, city: &str) -> Option<u32>;
}

/// `round(base + weight * per_kg [+ surcharge])`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearTariff {
    pub base: f64,
    pub per_kg: f64,
    pub distant_surcharge: f64,
    pub distant_cities: Vec<String>,
}

impl Default for LinearTariff {
    fn default() -> Self {
        Self {
            base: 25.0,
            per_kg: 8.0,
            distant_surcharge: 15.0,
            distant_cities: DEFAULT_DISTANT_CITIES
                .iter()
                .map(|city| city.to_string())
                .collect(),
        }
    }
}

impl LinearTariff {
    pub fn is_distant(&self, city: &str) -> bool {
        let city = city.trim();
        self.distant_cities
            .iter()
            .any(|distant| distant.eq_ignore_ascii_case(city))
    }

    /// Raw formula for any non-negative weight. Rounds half away from zero.
    /// `None` when the total does not fit a `u32` price.
    pub fn price(&self, weight_kg: f64, city: &str) -> Option<u32> {
        let surcharge = if self.is_distant(city) {
            self.distant_surcharge
        } else {
            0.0
        };
        let total = (self.base + weight_kg.max(0.0) * self.per_kg + surcharge).round();
        let fits = total.is_finite() && total >= 0.0 && total <= f64::from(u32::MAX);
        fits.then(|| total as u32)
    }
}

impl PriceEstimator for LinearTariff {
    fn name(&self) -> &'static str {
        "Linear"
    }

    fn estimate(&self, weight_kg: f64, city: &str) -> Option<u32> {
        if !is_priceable_weight(weight_kg) || city.trim().is_empty() {
            return None;
        }
        self.price(weight_kg, city)
    }
}

/// Lookup over the tariff grid. The first rule for the city whose range
/// satisfies `min < weight <= max` wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TariffTable {
    rules: Vec<TariffRule>,
}

impl TariffTable {
    pub fn new(rules: Vec<TariffRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[TariffRule] {
        &self.rules
    }

    pub fn rule_for(&self, weight_kg: f64, city: &str) -> Option<&TariffRule> {
        let city = city.trim();
        self.rules.iter().find(|rule| {
            rule.city.eq_ignore_ascii_case(city)
                && weight_kg > rule.weight_min_kg
                && weight_kg <= rule.weight_max_kg
        })
    }
}

impl PriceEstimator for TariffTable {
    fn name(&self) -> &'static str {
        "Tariff grid"
    }

    fn estimate(&self, weight_kg: f64, city: &str) -> Option<u32> {
        if !is_priceable_weight(weight_kg) || city.trim().is_empty() {
            return None;
        }
        self.rule_for(weight_kg, city).map(|rule| rule.price)
    }
}

/// Strategy picked by the integrator at runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum PricingStrategy {
    Linear(LinearTariff),
    Table(TariffTable),
}

impl Default for PricingStrategy {
    fn default() -> Self {
        PricingStrategy::Linear(LinearTariff::default())
    }
}

impl PriceEstimator for PricingStrategy {
    fn name(&self) -> &'static str {
        match self {
            PricingStrategy::Linear(inner) => inner.name(),
            PricingStrategy::Table(inner) => inner.name(),
        }
    }

    fn estimate(&self, weight_kg: f64, city: &str) -> Option<u32> {
        match self {
            PricingStrategy::Linear(inner) => inner.estimate(weight_kg, city),
            PricingStrategy::Table(inner) => inner.estimate(weight_kg, city),
        }
    }
}

/// Heaviest parcel the desk accepts.
pub const MAX_WEIGHT_KG: f64 = 1_000.0;

/// Parses a weight typed into a form field. Only plain decimals such as
/// `2` or `2.5` are read; zero and anything above [`MAX_WEIGHT_KG`] yield `None`.
pub fn parse_weight(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if !is_decimal(raw) {
        return None;
    }
    raw.parse::<f64>()
        .ok()
        .filter(|weight| is_priceable_weight(*weight) && *weight <= MAX_WEIGHT_KG)
}

/// Live estimate for the intake form. Recomputed on every keystroke.
pub fn estimate_from_input(
    estimator: &dyn PriceEstimator,
    weight: Option<&str>,
    city: Option<&str>,
) -> Option<u32> {
    let weight = parse_weight(weight?)?;
    let city = city.map(str::trim).filter(|city| !city.is_empty())?;
    estimator.estimate(weight, city)
}

fn is_priceable_weight(weight_kg: f64) -> bool {
    weight_kg.is_finite() && weight_kg > 0.0
}
