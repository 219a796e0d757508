//! End-to-end scenarios spanning more than one module, too large to live
//! comfortably next to the unit tests in each primitive's own file.

mod merkle_scenario;
