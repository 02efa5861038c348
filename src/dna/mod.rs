pub mod sampler;
pub mod tracker;
