//! Platform-independent logic for the POI editor frontend.
//!
//! Everything here is pure Rust: the POI data model and wire parsing, the
//! edit-mode state machine, form validation, marker/panel animation math and
//! endpoint path builders. The wasm frontend consumes these types and keeps
//! its own code down to DOM and scene-graph glue.

pub mod attr;
pub mod editor;
pub mod form;
pub mod links;
pub mod marker;
pub mod panel;
pub mod poi;

pub use editor::*;
pub use form::*;
pub use poi::*;
