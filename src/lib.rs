pub mod config;
pub mod controller;
pub mod graph;
pub mod io;
pub mod layout;
pub mod logging;
pub mod util;
pub mod viewport;
