pub mod coordinate_mapper;
pub mod error;
pub mod global_pixel;
