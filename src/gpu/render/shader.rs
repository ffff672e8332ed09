// ============================================
// Shader Program - WGSL модуль + рефлексия uniform
// ============================================
// Шейдер разбирается и валидируется naga ещё до создания
// wgpu-модуля. Ошибка разбора не роняет приложение: программа
// просто не создаётся, а объекты с ней пропускают отрисовку.
// Смещения uniform-членов читаются из модуля один раз.

use std::fmt;

use super::uniforms::UniformLayout;

/// Группа/биндинг uniform-блока объекта
const OBJECT_GROUP: u32 = 0;
const OBJECT_BINDING: u32 = 0;

#[derive(Debug)]
pub enum ShaderError {
    Parse { label: String, message: String },
    Validation { label: String, message: String },
    Layout { label: String, message: String },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::Parse { label, message } => write!(f, "{}: parse error\n{}", label, message),
            ShaderError::Validation { label, message } => write!(f, "{}: validation error: {}", label, message),
            ShaderError::Layout { label, message } => write!(f, "{}: layout error: {}", label, message),
        }
    }
}

impl std::error::Error for ShaderError {}

/// Разобрать WGSL и вернуть раскладку uniform-блока группы 0.
/// Имена из `contract`, которых нет в шейдере, логируются здесь и только здесь.
pub fn reflect_uniforms(label: &str, source: &str, contract: &[&str]) -> Result<UniformLayout, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Parse {
        label: label.to_string(),
        message: e.emit_to_string(source),
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator.validate(&module).map_err(|e| ShaderError::Validation {
        label: label.to_string(),
        message: format!("{:?}", e),
    })?;

    let mut layouter = naga::proc::Layouter::default();
    layouter.update(module.to_ctx()).map_err(|e| ShaderError::Layout {
        label: label.to_string(),
        message: e.to_string(),
    })?;

    let uniform = module.global_variables.iter().find(|(_, var)| {
        var.space == naga::AddressSpace::Uniform
            && var
                .binding
                .as_ref()
                .is_some_and(|b| b.group == OBJECT_GROUP && b.binding == OBJECT_BINDING)
    });

    let layout = match uniform {
        None => UniformLayout::default(),
        Some((_, var)) => match &module.types[var.ty].inner {
            naga::TypeInner::Struct { members, span } => {
                let mut layout = UniformLayout::new(*span);
                for member in members {
                    if let Some(name) = &member.name {
                        layout.insert(name.as_str(), member.offset, layouter[member.ty].size);
                    }
                }
                layout
            }
            // Одиночная переменная: `var<uniform> MVP: mat4x4<f32>`
            _ => {
                let size = layouter[var.ty].size;
                let mut layout = UniformLayout::new(size);
                if let Some(name) = &var.name {
                    layout.insert(name.as_str(), 0, size);
                }
                layout
            }
        },
    };

    for name in layout.missing(contract) {
        log::warn!("{}: uniform '{}' not found in shader, writes will be skipped", label, name);
    }

    Ok(layout)
}

/// Скомпилированный модуль с закэшированной раскладкой uniform
pub struct ShaderProgram {
    label: String,
    module: wgpu::ShaderModule,
    uniforms: UniformLayout,
}

impl ShaderProgram {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        source: &str,
        contract: &[&str],
    ) -> Result<Self, ShaderError> {
        let uniforms = reflect_uniforms(label, source, contract)?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        log::debug!("Shader '{}' ready, uniform block {} bytes", label, uniforms.size());

        Ok(Self {
            label: label.to_string(),
            module,
            uniforms,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    pub fn uniforms(&self) -> &UniformLayout {
        &self.uniforms
    }
}
