pub mod classifier;
pub mod color_space;
pub mod pixel;
pub mod region_detector;
pub mod sampler;
pub mod utils;
