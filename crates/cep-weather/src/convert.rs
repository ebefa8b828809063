use crate::types::Temperatures;

/// Kelvin offset used by the service. The physical value is 273.15; reports
/// have always used 273 and clients depend on it.
pub const KELVIN_OFFSET: f64 = 273.0;

/// Derive Fahrenheit and Kelvin from a Celsius reading.
pub fn convert(celsius: f64) -> Temperatures {
    Temperatures {
        celsius,
        fahrenheit: celsius * 1.8 + 32.0,
        kelvin: celsius + KELVIN_OFFSET,
    }
}
