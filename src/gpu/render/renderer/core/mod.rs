mod state;
mod init;

pub use state::GpuContext;
pub use init::{init_gpu, optional_features, InitError};
