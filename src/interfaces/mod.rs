//! Batch input/output for the command line front end.

pub mod csv;
