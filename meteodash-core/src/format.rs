//! Unit-aware display strings. Values are already in the unit system's native
//! units; these helpers only round and label.

use crate::model::UnitSystem;

/// Shown in place of any absent measurement.
pub const PLACEHOLDER: &str = "–";

pub fn format_temp(value: Option<f64>, unit: UnitSystem) -> String {
    let suffix = match unit {
        UnitSystem::Imperial => "°F",
        UnitSystem::Metric => "°C",
    };
    labelled(value, "", suffix)
}

pub fn format_speed(value: Option<f64>, unit: UnitSystem) -> String {
    let suffix = match unit {
        UnitSystem::Imperial => "mph",
        UnitSystem::Metric => "km/h",
    };
    labelled(value, " ", suffix)
}

pub fn format_distance(value: Option<f64>, unit: UnitSystem) -> String {
    let suffix = match unit {
        UnitSystem::Imperial => "mi",
        UnitSystem::Metric => "km",
    };
    labelled(value, " ", suffix)
}

/// Whole-number percentage, or the placeholder.
pub fn format_percent(value: Option<f64>) -> String {
    labelled(value, "", "%")
}

fn labelled(value: Option<f64>, sep: &str, suffix: &str) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{}{sep}{suffix}", round_half_up(v)),
        None => PLACEHOLDER.to_string(),
    }
}

// Halves round toward +inf so -2.5 reads as -2, not -3.
fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_render_placeholder_for_every_unit() {
        for unit in [UnitSystem::Metric, UnitSystem::Imperial] {
            assert_eq!(format_temp(None, unit), PLACEHOLDER);
            assert_eq!(format_speed(None, unit), PLACEHOLDER);
            assert_eq!(format_distance(None, unit), PLACEHOLDER);
        }
        assert_eq!(format_percent(None), PLACEHOLDER);
    }

    #[test]
    fn labels_follow_unit_system() {
        assert_eq!(format_temp(Some(21.6), UnitSystem::Metric), "22°C");
        assert_eq!(format_temp(Some(70.2), UnitSystem::Imperial), "70°F");
        assert_eq!(format_speed(Some(12.4), UnitSystem::Metric), "12 km/h");
        assert_eq!(format_speed(Some(12.5), UnitSystem::Imperial), "13 mph");
        assert_eq!(format_distance(Some(24.14), UnitSystem::Metric), "24 km");
        assert_eq!(format_distance(Some(0.4), UnitSystem::Imperial), "0 mi");
        assert_eq!(format_percent(Some(35.0)), "35%");
    }

    #[test]
    fn negative_halves_round_up() {
        assert_eq!(format_temp(Some(-2.5), UnitSystem::Metric), "-2°C");
        assert_eq!(format_temp(Some(-2.6), UnitSystem::Metric), "-3°C");
    }

    #[test]
    fn non_finite_values_are_treated_as_absent() {
        assert_eq!(format_temp(Some(f64::NAN), UnitSystem::Metric), PLACEHOLDER);
        assert_eq!(format_speed(Some(f64::INFINITY), UnitSystem::Metric), PLACEHOLDER);
    }
}
