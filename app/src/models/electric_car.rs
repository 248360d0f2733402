use std::fmt;
use std::sync::Arc;

use rivet::Component;

use super::Battery;

/// A car whose battery is injected from the component registered as `battery`
#[derive(Debug, Default, Component)]
pub struct ElectricCar {
    pub name: String,
    #[inject]
    pub battery: Option<Arc<Battery>>,
}

impl ElectricCar {
    /// Whether the car has a battery with charge left
    pub fn run(&self) -> bool {
        let runnable = self.battery.as_ref().is_some_and(|b| !b.is_empty());
        if runnable {
            tracing::info!(car = %self, "running");
        } else {
            tracing::warn!(car = %self, "cannot run, charge the battery first");
        }
        runnable
    }
}

impl fmt::Display for ElectricCar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.battery {
            Some(battery) => write!(f, "ElectricCar{{{} running on {}}}", self.name, battery),
            None => write!(f, "ElectricCar{{{} without a battery}}", self.name),
        }
    }
}
