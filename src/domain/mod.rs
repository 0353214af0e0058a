//! Domain layer: loans, money value objects and the ports the application
//! layer depends on.

pub mod loan;
pub mod money;
pub mod ports;
