//! Bounds, patterns and user-facing messages.

use lazy_static::lazy_static;
use regex::Regex;

pub const SITE_SIZE_MIN: f64 = 100.0;
pub const SITE_SIZE_MAX: f64 = 1_000_000.0;
pub const FLOORS_MIN: f64 = 1.0;
pub const FLOORS_MAX: f64 = 200.0;
pub const STAIRS_MIN: f64 = 1.0;
/// Staircases allowed per floor.
pub const STAIRS_PER_FLOOR_MAX: f64 = 20.0;
/// Minimum usable area of each floor, sq ft.
pub const MIN_AREA_PER_FLOOR: f64 = 100.0;

lazy_static! {
    pub static ref EMAIL: Regex = Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    pub static ref PHONE: Regex =
        Regex::new(r"^[+]?[(]?[0-9]{3}[)]?[-\s.]?[0-9]{3}[-\s.]?[0-9]{4,6}$").unwrap();
    pub static ref NAME: Regex = Regex::new(r"^[a-zA-Z\s'-]{2,}$").unwrap();
    pub static ref COMPANY_NAME: Regex = Regex::new(r"^[a-zA-Z0-9\s'&,.-]{2,}$").unwrap();
}

pub const REQUIRED: &str = "This field is required";
pub const EMAIL_INVALID: &str = "Please enter a valid email address";
pub const PHONE_INVALID: &str = "Please enter a valid phone number (e.g., 123-456-7890)";
pub const NAME_INVALID: &str = "Please enter a valid name (minimum 2 characters)";
pub const COMPANY_NAME_INVALID: &str = "Please enter a valid company name (minimum 2 characters)";

pub const SITE_SIZE_REQUIRED: &str = "Site size is required";
pub const SITE_SIZE_MIN_MSG: &str = "Site size must be at least 100 sq ft";
pub const SITE_SIZE_MAX_MSG: &str = "Site size cannot exceed 1,000,000 sq ft";
pub const SITE_SIZE_INVALID: &str = "Please enter a valid site size";

pub const FLOORS_REQUIRED: &str = "Number of floors is required";
pub const FLOORS_MIN_MSG: &str = "Building must have at least 1 floor";
pub const FLOORS_MAX_MSG: &str = "Number of floors cannot exceed 200";
pub const FLOORS_INVALID: &str = "Please enter a valid number of floors";

pub const STAIRS_REQUIRED: &str = "Number of staircases is required";
pub const STAIRS_MIN_MSG: &str = "Building must have at least 1 staircase";
pub const STAIRS_INVALID: &str = "Please enter a valid number of staircases";

pub const CONSTRUCTION_TYPE_INVALID: &str = "Please select a valid construction type";
pub const COVERAGE_LEVEL_INVALID: &str = "Please select a valid coverage level";

pub fn stairs_total_max_msg(floors: f64) -> String {
    format!(
        "Maximum {} staircases allowed for {} floors",
        STAIRS_PER_FLOOR_MAX * floors,
        floors
    )
}

pub fn stairs_per_floor_msg() -> String {
    format!("Maximum {} staircases allowed per floor", STAIRS_PER_FLOOR_MAX)
}

pub fn area_per_floor_msg() -> String {
    format!("Minimum {} sq ft required per floor", MIN_AREA_PER_FLOOR)
}

/// Parse a numeric form value. Blank, non-finite and garbage input all yield `None`.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

pub fn site_size_error(size: f64) -> Option<String> {
    if size < SITE_SIZE_MIN {
        Some(SITE_SIZE_MIN_MSG.to_string())
    } else if size > SITE_SIZE_MAX {
        Some(SITE_SIZE_MAX_MSG.to_string())
    } else {
        None
    }
}

pub fn floors_error(floors: f64) -> Option<String> {
    if floors.fract() != 0.0 {
        Some(FLOORS_INVALID.to_string())
    } else if floors < FLOORS_MIN {
        Some(FLOORS_MIN_MSG.to_string())
    } else if floors > FLOORS_MAX {
        Some(FLOORS_MAX_MSG.to_string())
    } else {
        None
    }
}

/// Staircase bounds. The upper bound depends on the floor count and is only
/// enforced once that is known.
pub fn stairs_error(stairs: f64, floors: Option<f64>) -> Option<String> {
    if stairs.fract() != 0.0 {
        return Some(STAIRS_INVALID.to_string());
    }
    if stairs < STAIRS_MIN {
        return Some(STAIRS_MIN_MSG.to_string());
    }
    match floors {
        Some(floors) if stairs > floors * STAIRS_PER_FLOOR_MAX => Some(stairs_total_max_msg(floors)),
        _ => None,
    }
}
