pub mod config;
pub mod launch;
pub mod logs;
pub mod service;
pub mod stop;
pub mod sync;
