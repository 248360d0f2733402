//! Demo components wired by `config/rivet.json`

pub mod battery;
pub mod electric_car;

pub use battery::Battery;
pub use electric_car::ElectricCar;

use rivet::Instance;

/// Human readable form of a resolved component
pub fn describe(instance: &Instance) -> String {
    if let Some(car) = instance.downcast_ref::<ElectricCar>() {
        car.to_string()
    } else if let Some(battery) = instance.downcast_ref::<Battery>() {
        battery.to_string()
    } else {
        "<opaque component>".to_string()
    }
}
