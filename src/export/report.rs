use std::fmt::Write;

use crate::engine::coverage::catalog_entry;
use crate::model::{ContactDetails, Estimate};

const RULE_WIDTH: usize = 60;

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}\n{}", title, "─".repeat(RULE_WIDTH));
}

fn contact_lines(out: &mut String, contact: &ContactDetails) {
    let fields = [
        ("Name", &contact.name),
        ("Company", &contact.company_name),
        ("Email", &contact.email),
        ("Phone", &contact.phone),
        ("Construction Phase", &contact.construction_phase),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            let _ = writeln!(out, "{:<22}{}", format!("{}:", label), value);
        }
    }
}

/// Plain-text estimate document for download or print.
pub fn render_report(estimate: &Estimate) -> String {
    let mut out = String::new();
    let p = &estimate.profile;
    let c = &estimate.coverage;
    let d = &estimate.device_counts;
    let costs = &estimate.costs;

    let _ = writeln!(out, "WES3 Budget Estimate");
    let _ = writeln!(out, "{}", "═".repeat(RULE_WIDTH));
    let _ = writeln!(out, "Reference: {}", estimate.id);
    let _ = writeln!(out, "Generated: {}", estimate.generated_at.format("%Y-%m-%d %H:%M UTC"));

    if estimate.contact != ContactDetails::default() {
        section(&mut out, "Contact");
        contact_lines(&mut out, &estimate.contact);
    }

    section(&mut out, "Site");
    let _ = writeln!(out, "{:<22}{} sq. ft", "Site Size:", p.site_size_sq_ft);
    let _ = writeln!(out, "{:<22}{}", "Floors:", p.floors);
    let _ = writeln!(out, "{:<22}{}", "Staircases:", p.staircases);
    let _ = writeln!(out, "{:<22}{}", "Construction Type:", p.construction_type);

    section(&mut out, "Coverage");
    let entry = catalog_entry(c.level);
    let _ = writeln!(out, "{} - {}", entry.title, entry.description);
    let _ = writeln!(
        out,
        "Smoke: {:.1} ft spacing, {:.1} ft from walls ({:.0}% of detectors)",
        c.smoke.spacing_ft,
        c.smoke.wall_clearance_ft,
        c.smoke_ratio * 100.0
    );
    let _ = writeln!(
        out,
        "Heat:  {:.1} ft spacing, {:.1} ft from walls ({:.0}% of detectors)",
        c.heat.spacing_ft,
        c.heat.wall_clearance_ft,
        c.heat_ratio * 100.0
    );
    let _ = writeln!(out, "Minimum {} detectors per floor for {} construction", c.min_detectors_per_floor, c.construction_type);
    if c.interface_required && !p.interface_integration {
        let _ = writeln!(out, "Note: {} sites normally require an interface unit.", c.construction_type);
    }

    section(&mut out, "Devices");
    let _ = writeln!(out, "{:<22}{}", "Smoke Detectors:", d.smoke);
    let _ = writeln!(out, "{:<22}{}", "Heat Detectors:", d.heat);
    let _ = writeln!(out, "{:<22}{}", "Call Points:", d.call_points);
    if d.interface_units > 0 {
        let _ = writeln!(out, "{:<22}{}", "Interface Units:", d.interface_units);
    }
    let _ = writeln!(out, "{:<22}{}", "Total Devices:", d.total());

    section(&mut out, "Costs");
    for line in &costs.lines {
        let _ = writeln!(
            out,
            "{:<18}{:>6} x {:>10} = {:>14}",
            line.device.label(),
            line.quantity,
            line.unit_price.to_string(),
            line.amount.to_string()
        );
    }
    let _ = writeln!(out, "{:<40}{:>14}", "Hardware Subtotal", costs.subtotal.to_string());
    let _ = writeln!(out, "{:<40}{:>14}", "Installation (30%)", costs.installation.to_string());
    let _ = writeln!(out, "{:<40}{:>14}", "Total (one-time)", costs.total.to_string());
    let _ = writeln!(out, "{:<40}{:>14}", "Maintenance (est. annual, 15%)", costs.maintenance.to_string());
    if let Some(subscription) = costs.react_subscription {
        let _ = writeln!(out, "{:<40}{:>14}", "REACT Subscription (annual)", format!("{}/year", subscription));
    }

    if let Some(narrative) = &estimate.narrative {
        section(&mut out, "Spacing Rationale");
        let _ = writeln!(out, "{}", narrative);
    }

    let _ = writeln!(
        out,
        "\nFigures are budget approximations, not a certified fire-code design."
    );
    out
}
