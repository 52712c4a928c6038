// Build script to compile GLSL shaders to SPIR-V
//
// Output lands in data/, where the renderer looks for shader.vert.spv and
// shader.frag.spv at runtime.

use std::fs;
use std::path::Path;
use std::process::Command;

const SHADERS: [(&str, &str); 2] = [
    ("shaders/shader.vert", "data/shader.vert.spv"),
    ("shaders/shader.frag", "data/shader.frag.spv"),
];

fn main() {
    println!("cargo:rerun-if-changed=shaders/");

    if let Err(e) = fs::create_dir_all("data") {
        println!("cargo:warning=Could not create data/ ({}), skipping shader compilation", e);
        return;
    }

    for (input, output) in SHADERS {
        compile_shader(input, output);
    }
}

fn compile_shader(input: &str, output: &str) {
    let input_path = Path::new(input);
    let output_path = Path::new(output);

    // glslc ships with the Vulkan SDK
    let result = Command::new("glslc")
        .arg(input_path)
        .arg("-o")
        .arg(output_path)
        .status();

    match result {
        Ok(status) if status.success() => {
            println!("Compiled {} -> {}", input, output);
        }
        Ok(status) => {
            panic!("Failed to compile {}: exit code {:?}", input, status.code());
        }
        Err(e) => {
            println!("cargo:warning=glslc not found ({}), {} was not compiled", e, input);
            println!("cargo:warning=Install the Vulkan SDK or run: glslc {} -o {}", input, output);
        }
    }
}
