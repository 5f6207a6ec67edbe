//! Domain services used by HTTP routes.
//!
//! Services own file access and validation so route handlers stay focused on
//! protocol translation.

pub mod catalog;
