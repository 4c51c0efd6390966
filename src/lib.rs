//! Closed-form deflection of charged particles in uniform electric and magnetic fields,
//! as used by the SIMS deflection viewer.

pub mod simulation;
