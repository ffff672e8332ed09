mod frame;

pub use frame::{GpuFrame, MainTarget};
