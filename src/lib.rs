pub mod app;
pub mod camera;
pub mod config;
pub mod events;
pub mod grid;
pub mod pacer;
pub mod parse_rle;
pub mod pattern;
pub mod rule_set;

mod parse_util;

pub type ScreenSize = u16;
