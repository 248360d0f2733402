use std::fmt;

use rivet::Component;

#[derive(Debug, Clone, Default, PartialEq, Component)]
#[component(constructor(name, charge_left))]
pub struct Battery {
    pub name: String,
    pub charge_left: f64,
}

impl Battery {
    pub fn is_empty(&self) -> bool {
        self.charge_left <= 0.0
    }

    /// Charge after one more charging cycle, capped at 100
    pub fn charged(&self) -> f64 {
        if self.charge_left <= 90.0 {
            self.charge_left + 10.0
        } else {
            self.charge_left
        }
    }
}

impl fmt::Display for Battery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:.1}%)", self.name, self.charge_left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charging_stops_at_ninety() {
        let battery = Battery {
            name: "Amaron".into(),
            charge_left: 40.0,
        };
        assert_eq!(battery.charged(), 50.0);
        assert_eq!(
            Battery {
                charge_left: 95.0,
                ..battery
            }
            .charged(),
            95.0
        );
    }

    #[test]
    fn test_display() {
        let battery = Battery {
            name: "Amaron".into(),
            charge_left: 40.0,
        };
        assert_eq!(battery.to_string(), "Amaron(40.0%)");
    }
}
