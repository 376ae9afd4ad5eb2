pub mod coords;
pub mod dims;
pub mod extent;
pub mod nodata;
pub mod planner;
pub mod reproject;
