use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::{ConstructionType, ContactDetails, CoverageLevel, SiteProfile};

/// Hardware line items that appear on a bill of materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    SmokeDetector,
    HeatDetector,
    CallPoint,
    InterfaceUnit,
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 4] = [
        DeviceKind::SmokeDetector,
        DeviceKind::HeatDetector,
        DeviceKind::CallPoint,
        DeviceKind::InterfaceUnit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DeviceKind::SmokeDetector => "Smoke Detectors",
            DeviceKind::HeatDetector => "Heat Detectors",
            DeviceKind::CallPoint => "Call Points",
            DeviceKind::InterfaceUnit => "Interface Units",
        }
    }
}

/// Device quantities for one site. Always produced as a whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCounts {
    pub smoke: u32,
    pub heat: u32,
    pub call_points: u32,
    pub interface_units: u32,
}

impl DeviceCounts {
    pub fn get(&self, kind: DeviceKind) -> u32 {
        match kind {
            DeviceKind::SmokeDetector => self.smoke,
            DeviceKind::HeatDetector => self.heat,
            DeviceKind::CallPoint => self.call_points,
            DeviceKind::InterfaceUnit => self.interface_units,
        }
    }

    pub fn detectors(&self) -> u32 {
        self.smoke + self.heat
    }

    pub fn total(&self) -> u32 {
        self.smoke + self.heat + self.call_points + self.interface_units
    }
}

/// Money units per cent. Amounts are held in ten-thousandths of a dollar.
const UNITS_PER_CENT: u64 = 100;
const UNITS_PER_DOLLAR: u64 = 100 * UNITS_PER_CENT;

/// Monetary amount held in ten-thousandths of a dollar.
///
/// Any price given to the cent keeps every whole-percent surcharge exact: 1 %
/// of one cent is a single unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_dollars(dollars: u64) -> Self {
        Money(dollars * UNITS_PER_DOLLAR)
    }

    pub const fn from_cents(cents: u64) -> Self {
        Money(cents * UNITS_PER_CENT)
    }

    /// Exact conversion from a dollar figure. `None` for negative, non-finite
    /// or sub-unit amounts.
    pub fn try_from_dollars(dollars: f64) -> Option<Self> {
        if !dollars.is_finite() || dollars < 0.0 {
            return None;
        }
        let scaled = dollars * UNITS_PER_DOLLAR as f64;
        let units = scaled.round();
        ((scaled - units).abs() < 1e-6 && units <= u64::MAX as f64).then_some(Money(units as u64))
    }

    /// Ten-thousandths of a dollar.
    pub fn units(&self) -> u64 {
        self.0
    }

    pub fn as_dollars(&self) -> f64 {
        self.0 as f64 / UNITS_PER_DOLLAR as f64
    }

    pub fn times(&self, quantity: u32) -> Money {
        Money(self.0 * quantity as u64)
    }

    /// `percent` of this amount. Exact whenever the amount is a whole number of cents.
    pub fn percent(&self, percent: u64) -> Money {
        Money(self.0 * percent / 100)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl std::fmt::Display for Money {
    /// Two decimals, extended to four when the amount has a fraction of a cent.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dollars = self.0 / UNITS_PER_DOLLAR;
        let fraction = self.0 % UNITS_PER_DOLLAR;
        let digits = dollars.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        if fraction % UNITS_PER_CENT == 0 {
            write!(f, "${}.{:02}", grouped, fraction / UNITS_PER_CENT)
        } else {
            let sub_cent = format!("{:04}", fraction);
            write!(f, "${}.{}", grouped, sub_cent.trim_end_matches('0'))
        }
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_dollars())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let dollars = f64::deserialize(deserializer)?;
        Money::try_from_dollars(dollars).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "money must be a non-negative dollar amount with at most four decimals, got {}",
                dollars
            ))
        })
    }
}

/// One priced hardware line. Only present for non-zero quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostLine {
    pub device: DeviceKind,
    pub quantity: u32,
    pub unit_price: Money,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub lines: Vec<CostLine>,
    /// Hardware only.
    pub subtotal: Money,
    pub installation: Money,
    /// Informational annual figure, not part of `total`.
    pub maintenance: Money,
    /// Annual REACT subscription, reported apart from the one-time total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub react_subscription: Option<Money>,
    pub total: Money,
}

impl CostBreakdown {
    pub fn line(&self, device: DeviceKind) -> Option<&CostLine> {
        self.lines.iter().find(|l| l.device == device)
    }
}

/// Spacing figures for one detector type at the chosen coverage level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorSpacing {
    pub radius_ft: f64,
    pub spacing_ft: f64,
    pub wall_clearance_ft: f64,
    pub coverage_area_sq_ft: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageDetails {
    pub level: CoverageLevel,
    pub construction_type: ConstructionType,
    pub multiplier: f64,
    pub max_spacing_ft: f64,
    pub min_detectors_per_floor: u32,
    pub interface_required: bool,
    pub smoke_ratio: f64,
    pub heat_ratio: f64,
    pub smoke: DetectorSpacing,
    pub heat: DetectorSpacing,
}

/// The single artifact handed to export, chart and delivery collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub profile: SiteProfile,
    pub contact: ContactDetails,
    pub device_counts: DeviceCounts,
    pub costs: CostBreakdown,
    pub coverage: CoverageDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

impl Estimate {
    pub fn total_devices(&self) -> u32 {
        self.device_counts.total()
    }
}
