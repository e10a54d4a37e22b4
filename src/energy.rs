use serde::Serialize;

use crate::model::{
    ASSUMED_DAILY_SERVER_REQUESTS, ASSUMED_DAILY_USER_EXECUTIONS, CARBON_G_PER_KWH,
    DEVICE_POWER_OVERHEAD, DEV_ENVIRONMENT_MULTIPLIER, ENERGY_PER_OP_JOULES, JOULES_PER_KWH,
    NETWORK_ENERGY_PER_REQUEST_J, SERVER_PUE,
};

/// Joules for a weighted operation total.
pub fn energy_joules(weighted_ops: u64) -> f64 {
    sanitize(weighted_ops as f64 * ENERGY_PER_OP_JOULES)
}

pub fn joules_to_kwh(joules: f64) -> f64 {
    sanitize(joules / JOULES_PER_KWH)
}

pub fn joules_to_carbon_grams(joules: f64) -> f64 {
    sanitize(joules_to_kwh(joules) * CARBON_G_PER_KWH)
}

/// Energy and carbon attributed to one deployment tier.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryFootprint {
    pub label: &'static str,
    pub description: String,
    pub energy_joules: f64,
    pub carbon_grams: f64,
}

impl CategoryFootprint {
    fn from_joules(label: &'static str, description: String, joules: f64) -> Self {
        let joules = sanitize(joules);
        Self {
            label,
            description,
            energy_joules: joules,
            carbon_grams: joules_to_carbon_grams(joules),
        }
    }
}

/// Daily footprint split across the three deployment tiers, plus their sum.
#[derive(Debug, Clone, Serialize)]
pub struct CarbonBreakdown {
    pub user_end: CategoryFootprint,
    pub developer_end: CategoryFootprint,
    pub server_side: CategoryFootprint,
    pub total: CategoryFootprint,
}

/// Derive the three-tier daily breakdown from the per-execution base joules.
///
/// All tiers start from the same base so no precision is lost to repeated
/// conversion.
pub fn breakdown(base_joules: f64) -> CarbonBreakdown {
    let base_joules = sanitize(base_joules);

    let user_joules = base_joules * DEVICE_POWER_OVERHEAD * ASSUMED_DAILY_USER_EXECUTIONS;
    let user_end = CategoryFootprint::from_joules(
        "User End",
        format!(
            "{ASSUMED_DAILY_USER_EXECUTIONS} daily executions × {DEVICE_POWER_OVERHEAD}x device overhead"
        ),
        user_joules,
    );

    let dev_joules = base_joules * DEV_ENVIRONMENT_MULTIPLIER;
    let developer_end = CategoryFootprint::from_joules(
        "Developer End",
        format!("Development environment overhead ({DEV_ENVIRONMENT_MULTIPLIER}x multiplier)"),
        dev_joules,
    );

    let server_joules = base_joules * SERVER_PUE * ASSUMED_DAILY_SERVER_REQUESTS
        + NETWORK_ENERGY_PER_REQUEST_J * ASSUMED_DAILY_SERVER_REQUESTS;
    let server_side = CategoryFootprint::from_joules(
        "Server Side",
        format!(
            "{ASSUMED_DAILY_SERVER_REQUESTS} daily requests × {SERVER_PUE} PUE + network transfer"
        ),
        server_joules,
    );

    let total = CategoryFootprint::from_joules(
        "Total",
        "Sum of all deployment tiers".to_string(),
        user_end.energy_joules + developer_end.energy_joules + server_side.energy_joules,
    );

    CarbonBreakdown {
        user_end,
        developer_end,
        server_side,
        total,
    }
}

/// Clamp pathological values to something representable. NaN becomes zero,
/// infinities clamp to the largest finite double.
fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamping NaN energy value to 0");
        0.0
    } else if value.is_infinite() {
        log::warn!("clamping infinite energy value");
        f64::MAX.copysign(value)
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joules_from_ops() {
        assert!((energy_joules(1_000_000) - 3e-3).abs() < 1e-12);
    }

    #[test]
    fn kwh_and_grams() {
        let joules = 3_600_000.0;
        assert!((joules_to_kwh(joules) - 1.0).abs() < 1e-12);
        assert!((joules_to_carbon_grams(joules) - 475.0).abs() < 1e-9);
    }

    #[test]
    fn tier_total_is_sum_of_parts() {
        let b = breakdown(1.0);
        let sum = b.user_end.energy_joules + b.developer_end.energy_joules
            + b.server_side.energy_joules;
        assert!((b.total.energy_joules - sum).abs() < 1e-9);
        let carbon_sum = b.user_end.carbon_grams + b.developer_end.carbon_grams
            + b.server_side.carbon_grams;
        assert!((b.total.carbon_grams - carbon_sum).abs() < 1e-9);
    }

    #[test]
    fn tier_formulas() {
        let base = 2.0;
        let b = breakdown(base);
        assert!((b.user_end.energy_joules - base * 1.2 * 1000.0).abs() < 1e-9);
        assert!((b.developer_end.energy_joules - base * 5.0).abs() < 1e-9);
        assert!((b.server_side.energy_joules - (base * 1.58 * 10_000.0 + 0.001 * 10_000.0)).abs() < 1e-9);
    }

    #[test]
    fn descriptions_name_the_assumptions() {
        let b = breakdown(1.0);
        assert_eq!(b.user_end.description, "1000 daily executions × 1.2x device overhead");
        assert!(b.developer_end.description.contains("5x"));
        assert!(b.server_side.description.contains("10000 daily requests"));
        assert!(b.server_side.description.contains("1.58 PUE"));
    }

    #[test]
    fn zero_base_is_all_zero() {
        let b = breakdown(0.0);
        assert_eq!(b.total.energy_joules, 0.0);
        assert_eq!(b.total.carbon_grams, 0.0);
    }

    #[test]
    fn nan_clamps_to_zero() {
        let b = breakdown(f64::NAN);
        assert_eq!(b.total.energy_joules, 0.0);
    }
}
