// sg-core/src/units.rs
//
// The models work in engineering units (°C, MPa, mm, years). These helpers
// route the conversions through uom so the factors live in one place.

use uom::si::f64::{
    Length as UomLength, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
};

pub type Length = UomLength;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;

/// Seconds in a Julian year, used for all fouling clocks.
pub const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Universal gas constant (J/mol/K) as used by the deposition kinetics.
pub const GAS_CONSTANT: f64 = 8.314;

#[inline]
pub fn celsius(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn celsius_to_kelvin(t_c: f64) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    celsius(t_c).get::<kelvin>()
}

#[inline]
pub fn mpa(v: f64) -> Pressure {
    use uom::si::pressure::megapascal;
    Pressure::new::<megapascal>(v)
}

#[inline]
pub fn mpa_to_bar(p_mpa: f64) -> f64 {
    use uom::si::pressure::bar;
    mpa(p_mpa).get::<bar>()
}

#[inline]
pub fn mpa_to_pa(p_mpa: f64) -> f64 {
    use uom::si::pressure::pascal;
    mpa(p_mpa).get::<pascal>()
}

#[inline]
pub fn mm_to_m(v_mm: f64) -> f64 {
    use uom::si::length::{meter, millimeter};
    Length::new::<millimeter>(v_mm).get::<meter>()
}

#[inline]
pub fn seconds_to_hours(dt_s: f64) -> f64 {
    use uom::si::time::{hour, second};
    Time::new::<second>(dt_s).get::<hour>()
}

#[inline]
pub fn seconds_to_years(dt_s: f64) -> f64 {
    dt_s / SECONDS_PER_YEAR
}
