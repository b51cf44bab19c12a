//! `telemetry` — Tabular I/O for the lap feed and the filtered output.
//!
//! The upstream extraction step delivers clean racing laps as CSV with the
//! header `LapNumber,Stint,Compound,TyreLife,TrackTemp,LapTime_Sec,
//! Degradation_Delta`; this crate is the only place that format is known.

pub mod laps;
pub mod report;

pub use laps::{read_laps, read_laps_from, write_laps_csv};
pub use report::{write_filtered_csv, write_filtered_json};
