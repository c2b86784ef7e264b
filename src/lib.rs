pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod ops;
pub mod output;
pub mod paths;
pub mod tui;
