//! Cost Calculator

use serde::{Deserialize, Serialize};

use crate::model::{CostBreakdown, CostLine, DeviceCounts, DeviceKind, Money};

/// Installation surcharge on hardware, percent.
pub const INSTALLATION_PERCENT: u64 = 30;
/// Annual maintenance estimate on hardware, percent. Informational only.
pub const MAINTENANCE_PERCENT: u64 = 15;

/// Unit prices. `react_subscription` is the only recurring (annual) item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTable {
    pub smoke_detector: Money,
    pub heat_detector: Money,
    pub call_point: Money,
    pub interface_unit: Money,
    pub react_subscription: Money,
}

impl PriceTable {
    pub fn unit_price(&self, device: DeviceKind) -> Money {
        match device {
            DeviceKind::SmokeDetector => self.smoke_detector,
            DeviceKind::HeatDetector => self.heat_detector,
            DeviceKind::CallPoint => self.call_point,
            DeviceKind::InterfaceUnit => self.interface_unit,
        }
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            smoke_detector: Money::from_dollars(150),
            heat_detector: Money::from_dollars(200),
            call_point: Money::from_dollars(100),
            interface_unit: Money::from_dollars(500),
            react_subscription: Money::from_dollars(2500),
        }
    }
}

/// Price a device-count vector with the reference price table.
pub fn compute_costs(counts: &DeviceCounts, react_subscription: bool) -> CostBreakdown {
    compute_costs_with(&PriceTable::default(), counts, react_subscription)
}

pub fn compute_costs_with(prices: &PriceTable, counts: &DeviceCounts, react_subscription: bool) -> CostBreakdown {
    let lines: Vec<CostLine> = DeviceKind::ALL
        .iter()
        .filter_map(|&device| {
            let quantity = counts.get(device);
            if quantity == 0 {
                return None;
            }
            let unit_price = prices.unit_price(device);
            Some(CostLine {
                device,
                quantity,
                unit_price,
                amount: unit_price.times(quantity),
            })
        })
        .collect();

    let subtotal: Money = lines.iter().map(|l| l.amount).sum();
    let installation = subtotal.percent(INSTALLATION_PERCENT);

    CostBreakdown {
        lines,
        subtotal,
        installation,
        maintenance: subtotal.percent(MAINTENANCE_PERCENT),
        react_subscription: react_subscription.then_some(prices.react_subscription),
        total: subtotal + installation,
    }
}
