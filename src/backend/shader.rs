// Shader module loading
//
// Vulkan consumes SPIR-V as 32-bit words. Shader binaries live in the data
// directory under fixed names and are only needed while the pipeline is being
// created.

use super::error::{native, BackendError, BackendResult};
use super::guard::Guarded;
use ash::vk;
use std::fs;
use std::io;
use std::path::Path;

pub const VERTEX_SHADER_FILE: &str = "shader.vert.spv";
pub const FRAGMENT_SHADER_FILE: &str = "shader.frag.spv";

/// Read a SPIR-V binary into words.
///
/// A missing file is `AssetMissing`; a byte length that is not a multiple of
/// the 4-byte code word is `AssetMalformed`. Contents are not validated here,
/// the driver does that when the module is created.
pub fn read_spirv(path: &Path) -> BackendResult<Vec<u32>> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => BackendError::AssetMissing {
            path: path.to_path_buf(),
        },
        _ => BackendError::AssetRead {
            path: path.to_path_buf(),
            source,
        },
    })?;

    if bytes.len() % 4 != 0 {
        return Err(BackendError::AssetMalformed {
            path: path.to_path_buf(),
            len: bytes.len() as u64,
        });
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|word| u32::from_ne_bytes([word[0], word[1], word[2], word[3]]))
        .collect())
}

/// Create a shader module from SPIR-V words
pub fn create_shader_module(device: &ash::Device, code: &[u32]) -> BackendResult<vk::ShaderModule> {
    let create_info = vk::ShaderModuleCreateInfo::builder().code(code);

    unsafe { device.create_shader_module(&create_info, None) }.map_err(native("vkCreateShaderModule"))
}

/// Load `path` and wrap the resulting module so it is destroyed when the guard drops.
pub fn load_shader_module<'d>(
    device: &'d ash::Device,
    path: &Path,
) -> BackendResult<Guarded<vk::ShaderModule, impl FnOnce(vk::ShaderModule) + 'd>> {
    let code = read_spirv(path)?;
    log::debug!("Loaded {:?} ({} words)", path, code.len());

    let module = create_shader_module(device, &code)?;
    Ok(Guarded::new(module, move |module| unsafe {
        device.destroy_shader_module(module, None)
    }))
}
