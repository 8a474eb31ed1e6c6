//! Ion mobility estimate from the ion mass, as used by the SDS (statistical diffusion
//! simulation) ion transport model.
//!
//! The ion diameter is estimated from the mass, the reduced mobility in air follows from an
//! empirical polynomial in log10(diameter), which is then scaled to the collision gas and to the
//! background temperature and pressure.

/// mass of an air molecule, amu
const AIR_MASS_AMU: f64 = 28.94515;
/// diameter of an air molecule, nm
const AIR_DIAMETER_NM: f64 = 0.366;
/// reference pressure, mbar
const REFERENCE_PRESSURE: f64 = 1024.0;
/// reference temperature, K
const REFERENCE_TEMPERATURE: f64 = 273.15;

/// Background gas conditions of the mobility estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MobilityConditions {
    /// background temperature, K
    pub temperature: f64,
    /// background pressure, mbar
    pub pressure: f64,
    /// collision gas mass, amu (default: N2 / air)
    pub collision_gas_mass_amu: f64,
    /// collision gas molecule diameter, nm (default: N2 / air)
    pub collision_gas_diameter_nm: f64,
}

impl Default for MobilityConditions {
    fn default() -> Self {
        Self {
            temperature: REFERENCE_TEMPERATURE,
            pressure: REFERENCE_PRESSURE,
            collision_gas_mass_amu: AIR_MASS_AMU,
            collision_gas_diameter_nm: AIR_DIAMETER_NM,
        }
    }
}

/// Returns the ion mobility (in 10^-4 m^2 V^-1 s^-1) of an ion of mass `mass` (amu)
pub fn mobility_from_mass_sds(mass: f64, conditions: &MobilityConditions) -> f64 {
    // ion diameter (nm) from the mass
    let d_ion = mass.powf(1.0 / 3.0) * 0.120415405;
    let log_d = d_ion.log10();

    // reduced mobility in air
    let k0_air = 10f64.powf(4.9137 - 1.4491 * log_d - 0.2772 * log_d.powi(2) + 0.0717 * log_d.powi(3))
        * 1.0e-5;

    // ((d_ion + d_air)/(d_ion + d_gas))^2 * sqrt(mu_air / mu_gas)
    let m_gas = conditions.collision_gas_mass_amu;
    let reduced_mass_air = mass * AIR_MASS_AMU / (mass + AIR_MASS_AMU);
    let reduced_mass_gas = mass * m_gas / (mass + m_gas);
    let air_to_gas = ((d_ion + AIR_DIAMETER_NM) / (d_ion + conditions.collision_gas_diameter_nm))
        .powi(2)
        * (reduced_mass_air / reduced_mass_gas).sqrt();

    let k0 = k0_air * air_to_gas;
    k0 * (REFERENCE_PRESSURE / conditions.pressure) * (conditions.temperature / REFERENCE_TEMPERATURE)
}
