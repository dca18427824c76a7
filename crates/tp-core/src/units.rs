// tp-core/src/units.rs

use uom::si::f64::{Angle as UomAngle, Area as UomArea, Length as UomLength};

// Pipe geometry is carried as uom quantities; flow kernels take SI `Real`s.
pub type Angle = UomAngle;
pub type Area = UomArea;
pub type Length = UomLength;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn deg(v: f64) -> Angle {
    use uom::si::angle::degree;
    Angle::new::<degree>(v)
}

/// Cross-section of a circular pipe.
#[inline]
pub fn pipe_area(diameter: Length) -> Area {
    diameter * diameter * (std::f64::consts::PI / 4.0)
}

pub mod constants {
    /// Gravity used by the flow-pattern correlations unless overridden [m/s²].
    pub const G_ENGINEERING_MPS2: f64 = 9.81;

    /// 0 °C in kelvin.
    pub const KELVIN_OFFSET: f64 = 273.15;

    #[inline]
    pub fn celsius_to_kelvin(t_c: f64) -> f64 {
        t_c + KELVIN_OFFSET
    }
}
