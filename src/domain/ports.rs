use chrono::{DateTime, Utc};

/// Source of the current time for loan evaluation.
///
/// Payment acceptance and delinquency are pure functions of "now" and the
/// timestamps a loan stores; the registry asks its clock for "now" on every
/// call instead of caching anything time-dependent.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type ClockBox = Box<dyn Clock>;
