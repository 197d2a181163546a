/// Runtime pipeline tunables, relative to the asset root.
pub const PIPELINE_CONFIG_PATH: &str = "config/pipeline.json";

pub const RECONSTRUCTION_SHADER_PATH: &str = "shaders/depth_reconstruction.wgsl";
