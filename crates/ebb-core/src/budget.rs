//! Monthly budgets declared in category names
//!
//! A category called `Streaming 15/m` budgets 15 per month, `Insurance 600/y`
//! budgets 50 per month and `Car Service 300/qt` budgets 100 per month.
//! Markers add up: `Phone 20/m 60/y` budgets 25 per month.

use std::sync::OnceLock;

use regex::Regex;

fn marker(unit: &str) -> Regex {
    Regex::new(&format!(r"(\d+(?:\.\d+)?)/{}", unit)).expect("valid regex")
}

fn markers() -> &'static [(Regex, f64); 3] {
    static MARKERS: OnceLock<[(Regex, f64); 3]> = OnceLock::new();
    MARKERS.get_or_init(|| [(marker("m"), 1.0), (marker("qt"), 3.0), (marker("y"), 12.0)])
}

/// Monthly budget encoded in a category name, 0 when there is none
pub fn monthly_budget(category: &str) -> f64 {
    markers()
        .iter()
        .filter_map(|(re, months)| {
            re.captures(category)
                .and_then(|c| c[1].parse::<f64>().ok())
                .map(|amount| amount / months)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_marker() {
        assert_eq!(monthly_budget("Groceries"), 0.0);
        assert_eq!(monthly_budget("24/7 Store"), 0.0);
    }

    #[test]
    fn test_single_markers() {
        assert_eq!(monthly_budget("Streaming 15/m"), 15.0);
        assert_eq!(monthly_budget("Car Service 300/qt"), 100.0);
        assert_eq!(monthly_budget("Insurance 600/y"), 50.0);
        assert_eq!(monthly_budget("Coffee 12.5/m"), 12.5);
    }

    #[test]
    fn test_markers_add_up() {
        assert_eq!(monthly_budget("Phone 20/m 60/y"), 25.0);
        assert_eq!(monthly_budget("Everything 10/m 30/qt 120/y"), 30.0);
    }
}
