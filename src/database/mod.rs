//! wledmark database layer.
//!
//! Wraps access to a Firefox `places.sqlite` file. Unlike an application-owned
//! database there are no migrations here: the schema belongs to Firefox, and
//! this layer only verifies that the tables we touch exist.

pub mod places;

pub use places::PlacesDb;
