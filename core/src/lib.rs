//! opsheet-core: schema resolution and open/closed record classification
//! for loosely structured spreadsheet exports.
//!
//! PIPELINE (one table load):
//!   1. Resolve every logical field to a real column (`resolver`).
//!   2. Classify every row by its closing-field cell (`classify`).
//!   3. Group and select the open subset for display (`drilldown`).
//!
//! Nothing here fetches, caches or renders. The caller owns the table.

pub mod classify;
pub mod config;
pub mod drilldown;
pub mod error;
pub mod normalize;
pub mod resolver;
pub mod table;
pub mod types;
