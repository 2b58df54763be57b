//! Pure decoders turning response payload bytes into domain values: trouble
//! codes, supported-PID sets, and scaled live-data readings.
pub mod dtc;
pub mod live_data;
pub mod pid_catalog;
