//! KPI derivation configuration.

use serde::{Deserialize, Serialize};

/// Thresholds and leaderboard sizes used when deriving a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiConfig {
    /// Orders completed within this many days count as on time.
    #[serde(default = "default_on_time_threshold_days")]
    pub on_time_threshold_days: f64,
    /// Entries kept in `top_suppliers` and `suppliers`.
    #[serde(default = "default_supplier_limit")]
    pub supplier_limit: usize,
    /// Entries kept in `top_projects`, `projects_orders` and `projects_amounts`.
    #[serde(default = "default_project_limit")]
    pub project_limit: usize,
    /// Entries kept in the equipment leaderboards.
    #[serde(default = "default_equipment_limit")]
    pub equipment_limit: usize,
    /// Entries kept in the payments `suppliers` board.
    #[serde(default = "default_payment_supplier_limit")]
    pub payment_supplier_limit: usize,
    /// Entries kept in the payments `requesters` board.
    #[serde(default = "default_requester_limit")]
    pub requester_limit: usize,
}

fn default_on_time_threshold_days() -> f64 {
    3.0
}

fn default_supplier_limit() -> usize {
    10
}

fn default_project_limit() -> usize {
    20
}

fn default_equipment_limit() -> usize {
    15
}

fn default_payment_supplier_limit() -> usize {
    15
}

fn default_requester_limit() -> usize {
    10
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            on_time_threshold_days: default_on_time_threshold_days(),
            supplier_limit: default_supplier_limit(),
            project_limit: default_project_limit(),
            equipment_limit: default_equipment_limit(),
            payment_supplier_limit: default_payment_supplier_limit(),
            requester_limit: default_requester_limit(),
        }
    }
}

impl KpiConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !self.on_time_threshold_days.is_finite() || self.on_time_threshold_days < 0.0 {
            return Err(format!(
                "on_time_threshold_days ({}) must be a non-negative number",
                self.on_time_threshold_days
            ));
        }

        for (name, limit) in [
            ("supplier_limit", self.supplier_limit),
            ("project_limit", self.project_limit),
            ("equipment_limit", self.equipment_limit),
            ("payment_supplier_limit", self.payment_supplier_limit),
            ("requester_limit", self.requester_limit),
        ] {
            if limit == 0 {
                return Err(format!("{name} must be at least 1"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard_layout() {
        let config = KpiConfig::default();
        assert_eq!(config.on_time_threshold_days, 3.0);
        assert_eq!(config.supplier_limit, 10);
        assert_eq!(config.project_limit, 20);
        assert_eq!(config.equipment_limit, 15);
        assert_eq!(config.payment_supplier_limit, 15);
        assert_eq!(config.requester_limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: KpiConfig = serde_json::from_str(r#"{"supplier_limit": 5}"#).unwrap();
        assert_eq!(config.supplier_limit, 5);
        assert_eq!(config.project_limit, 20);
    }

    #[test]
    fn test_validate_rejects_zero_limit_and_bad_threshold() {
        let config = KpiConfig {
            equipment_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("equipment_limit"));

        let config = KpiConfig {
            on_time_threshold_days: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
