pub mod gpu;

pub use gpu::run;
