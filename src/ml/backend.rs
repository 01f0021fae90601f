use serde::{Deserialize, Serialize};

/// CPU backend for training and inference
pub type CpuBackend = burn::backend::NdArray;

/// GPU backend (Vulkan / Metal / DX12 through wgpu)
pub type GpuBackend = burn::backend::Wgpu;

pub type CpuTrainBackend = burn::backend::Autodiff<CpuBackend>;
pub type GpuTrainBackend = burn::backend::Autodiff<GpuBackend>;

/// Which backend a command runs on. CPU is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    #[default]
    Cpu,
    Gpu,
}
