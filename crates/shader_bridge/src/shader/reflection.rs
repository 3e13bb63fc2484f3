//! WGSL reflection with naga
//!
//! Parses and validates a module, then measures every named struct with
//! naga's layouter so host and shader layouts can be compared byte for byte.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use naga::{AddressSpace, ArraySize, ImageClass, ImageDimension, ScalarKind, StorageAccess, TypeInner};

use crate::bindings::{
    BindingKind, BufferIndex, SamplerIndex, TextureIndex, BUFFER_GROUP, SAMPLER_GROUP, TEXTURE_GROUP,
};
use crate::error::{ContractError, ContractResult};
use crate::layout::schema::{self, CURRENT_SCHEMA};
use crate::layout::{FieldLayout, GpuLayout, StructLayout};
use crate::render::camera::CameraInfo;
use crate::render::lighting::{
    Attenuation, BaseLight, DirectionalLight, LightsUniforms, PointLight, SpotLight,
    DISTANCE_EPSILON, NUMBER_OF_DIRECTIONAL_LIGHTS, NUMBER_OF_POINT_LIGHTS, NUMBER_OF_SPOT_LIGHTS,
};
use crate::render::passes::{
    Constants, FireBallConstants, MainPass, ObjectData, ShadowPass, ToonConstants,
};
use crate::render::uniform::{InstanceUniform, MaterialInfo, Uniform};
use crate::render::vertex::Vertex;

/// Name of the vertex input struct in shader source
pub const VERTEX_INPUT_STRUCT: &str = "VertexIn";

/// A resource-bound global variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalBinding {
    /// Variable name
    pub name: String,
    /// Bind group
    pub group: u32,
    /// Binding number within the group
    pub binding: u32,
    /// Buffer kind, `None` for textures and samplers
    pub kind: Option<BindingKind>,
    /// WGSL type, e.g. `array<PointLight, 5>`
    pub type_name: String,
}

/// One `@location` member of the vertex input struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexInput {
    /// Attribute location
    pub location: u32,
    /// Member name
    pub name: String,
    /// WGSL type
    pub type_name: String,
}

/// Layouts and bindings reflected from one WGSL module
#[derive(Debug)]
pub struct ShaderReflection {
    structs: HashMap<String, StructLayout>,
    bindings: BTreeMap<(u32, u32), GlobalBinding>,
    vertex_inputs: Option<Vec<VertexInput>>,
    constants: HashMap<String, f64>,
    schema: Option<u32>,
}

/// What a successful conformance run covered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformanceReport {
    /// Layout revision the shader declared
    pub schema: u32,
    /// Structs compared against their host twins
    pub structs: Vec<String>,
    /// Number of resource bindings checked against the registries
    pub bindings: usize,
    /// Number of vertex attributes checked
    pub vertex_attributes: usize,
    /// Number of shared constants checked
    pub constants: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "schema {}, {} struct(s), {} binding(s), {} vertex attribute(s), {} constant(s) conform",
            self.schema,
            self.structs.len(),
            self.bindings,
            self.vertex_attributes,
            self.constants
        )
    }
}

fn scalar_name(kind: ScalarKind, width: u8) -> String {
    match (kind, width) {
        (ScalarKind::Float, 4) => "f32".to_string(),
        (ScalarKind::Float, 2) => "f16".to_string(),
        (ScalarKind::Sint, 4) => "i32".to_string(),
        (ScalarKind::Uint, 4) => "u32".to_string(),
        (ScalarKind::Bool, _) => "bool".to_string(),
        (kind, width) => format!("{kind:?}{}", u32::from(width) * 8),
    }
}

fn dimension_name(dim: ImageDimension, arrayed: bool) -> String {
    let dim = match dim {
        ImageDimension::D1 => "1d",
        ImageDimension::D2 => "2d",
        ImageDimension::D3 => "3d",
        ImageDimension::Cube => "cube",
    };
    if arrayed {
        format!("{dim}_array")
    } else {
        dim.to_string()
    }
}

/// WGSL spelling of a type
fn type_name(module: &naga::Module, ty: naga::Handle<naga::Type>) -> String {
    let ty = &module.types[ty];
    match ty.inner {
        TypeInner::Struct { .. } => ty.name.clone().unwrap_or_else(|| "<anonymous struct>".to_string()),
        TypeInner::Scalar(scalar) => scalar_name(scalar.kind, scalar.width),
        TypeInner::Vector { size, scalar } => {
            format!("vec{}<{}>", size as u8, scalar_name(scalar.kind, scalar.width))
        }
        TypeInner::Matrix { columns, rows, scalar } => format!(
            "mat{}x{}<{}>",
            columns as u8,
            rows as u8,
            scalar_name(scalar.kind, scalar.width)
        ),
        TypeInner::Array { base, size, .. } => match size {
            ArraySize::Constant(n) => format!("array<{}, {}>", type_name(module, base), n),
            _ => format!("array<{}>", type_name(module, base)),
        },
        TypeInner::Image { dim, arrayed, class } => match class {
            ImageClass::Depth { .. } => format!("texture_depth_{}", dimension_name(dim, arrayed)),
            ImageClass::Sampled { kind, .. } => {
                format!("texture_{}<{}>", dimension_name(dim, arrayed), scalar_name(kind, 4))
            }
            ImageClass::Storage { .. } => format!("texture_storage_{}", dimension_name(dim, arrayed)),
        },
        TypeInner::Sampler { comparison: true } => "sampler_comparison".to_string(),
        TypeInner::Sampler { comparison: false } => "sampler".to_string(),
        ref other => format!("{other:?}"),
    }
}

fn literal_value(literal: naga::Literal) -> Option<f64> {
    match literal {
        naga::Literal::F32(v) => Some(f64::from(v)),
        naga::Literal::F64(v) => Some(v),
        naga::Literal::U32(v) => Some(f64::from(v)),
        naga::Literal::I32(v) => Some(f64::from(v)),
        _ => None,
    }
}

/// Host values of the module-scope constants every shader shares
fn shared_constants() -> [(&'static str, f64); 4] {
    [
        ("NUMBER_OF_DIRECTIONAL_LIGHTS", NUMBER_OF_DIRECTIONAL_LIGHTS as f64),
        ("NUMBER_OF_POINT_LIGHTS", NUMBER_OF_POINT_LIGHTS as f64),
        ("NUMBER_OF_SPOT_LIGHTS", NUMBER_OF_SPOT_LIGHTS as f64),
        ("DISTANCE_EPSILON", f64::from(DISTANCE_EPSILON)),
    ]
}

fn binding_kind(space: AddressSpace) -> Option<BindingKind> {
    match space {
        AddressSpace::Uniform => Some(BindingKind::Uniform),
        AddressSpace::Storage { access } if !access.contains(StorageAccess::STORE) => {
            Some(BindingKind::ReadOnlyStorage)
        }
        _ => None,
    }
}

impl ShaderReflection {
    /// Parse, validate and reflect WGSL source
    pub fn from_wgsl(source: &str) -> ContractResult<Self> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|e| ContractError::ShaderParse(e.emit_to_string(source)))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| ContractError::ShaderValidation(format!("{e}")))?;

        let mut layouter = naga::proc::Layouter::default();
        layouter
            .update(module.to_ctx())
            .map_err(|e| ContractError::ShaderValidation(format!("Layout error: {e}")))?;

        let mut structs = HashMap::new();
        let mut vertex_inputs = None;
        for (handle, ty) in module.types.iter() {
            let (TypeInner::Struct { members, span }, Some(name)) = (&ty.inner, &ty.name) else {
                continue;
            };

            if name == VERTEX_INPUT_STRUCT {
                vertex_inputs = Some(
                    members
                        .iter()
                        .filter_map(|m| match m.binding {
                            Some(naga::Binding::Location { location, .. }) => Some(VertexInput {
                                location,
                                name: m.name.clone().unwrap_or_default(),
                                type_name: type_name(&module, m.ty),
                            }),
                            _ => None,
                        })
                        .collect(),
                );
            }

            let fields = members
                .iter()
                .map(|m| FieldLayout {
                    name: m.name.clone().unwrap_or_default(),
                    offset: m.offset as usize,
                    size: layouter[m.ty].size as usize,
                    padding: false,
                })
                .collect();
            structs.insert(
                name.clone(),
                StructLayout {
                    name: name.clone(),
                    size: *span as usize,
                    align: layouter[handle].alignment.round_up(1) as usize,
                    fields,
                },
            );
        }

        let bindings = module
            .global_variables
            .iter()
            .filter_map(|(_, var)| {
                let binding = var.binding.as_ref()?;
                Some((
                    (binding.group, binding.binding),
                    GlobalBinding {
                        name: var.name.clone().unwrap_or_default(),
                        group: binding.group,
                        binding: binding.binding,
                        kind: binding_kind(var.space),
                        type_name: type_name(&module, var.ty),
                    },
                ))
            })
            .collect();

        let constants = module
            .constants
            .iter()
            .filter_map(|(_, constant)| {
                let name = constant.name.clone()?;
                match module.global_expressions[constant.init] {
                    naga::Expression::Literal(literal) => Some((name, literal_value(literal)?)),
                    _ => None,
                }
            })
            .collect();

        log::debug!("Reflected {} struct(s) from WGSL module", structs.len());

        Ok(Self {
            structs,
            bindings,
            vertex_inputs,
            constants,
            schema: schema::parse_marker(source),
        })
    }

    /// Layout of a struct as the shader sees it
    pub fn struct_layout(&self, name: &str) -> Option<&StructLayout> {
        self.structs.get(name)
    }

    /// Resource bindings ordered by group and binding
    pub fn bindings(&self) -> impl Iterator<Item = &GlobalBinding> {
        self.bindings.values()
    }

    /// Global bound at `group`/`binding`
    pub fn binding(&self, group: u32, binding: u32) -> Option<&GlobalBinding> {
        self.bindings.get(&(group, binding))
    }

    /// Members of the vertex input struct, if declared
    pub fn vertex_inputs(&self) -> Option<&[VertexInput]> {
        self.vertex_inputs.as_deref()
    }

    /// Layout revision declared by the source marker
    pub fn schema(&self) -> Option<u32> {
        self.schema
    }

    /// Value of a module-scope scalar constant
    pub fn constant(&self, name: &str) -> Option<f64> {
        self.constants.get(name).copied()
    }

    /// Check the light array lengths and the distance guard against the host
    ///
    /// Returns the number of constants checked.
    pub fn verify_constants(&self) -> ContractResult<usize> {
        let expected = shared_constants();
        for (name, host) in expected {
            let mismatch = |detail: String| ContractError::ConstantMismatch {
                name: name.to_string(),
                detail,
            };
            let shader = self
                .constant(name)
                .ok_or_else(|| mismatch("not declared as a scalar constant".to_string()))?;
            if shader != host {
                return Err(mismatch(format!("shader value {shader} != host value {host}")));
            }
        }
        Ok(expected.len())
    }

    /// Compare the host layout of `T` with the shader struct of the same name
    pub fn verify_struct<T: GpuLayout>(&self) -> ContractResult<()> {
        let shader = self
            .struct_layout(T::SHADER_NAME)
            .ok_or_else(|| ContractError::MissingStruct(T::SHADER_NAME.to_string()))?;
        T::host_layout().check_against(shader)
    }

    /// Check every resource binding against the slot registries
    ///
    /// Returns the number of bindings checked.
    pub fn verify_bindings(&self) -> ContractResult<usize> {
        for global in self.bindings.values() {
            match global.group {
                BUFFER_GROUP => Self::verify_buffer_binding(global)?,
                TEXTURE_GROUP => {
                    let index = TextureIndex::try_from_slot(global.binding)?;
                    Self::verify_resource_name(global, index.label())?;
                }
                SAMPLER_GROUP => {
                    let index = SamplerIndex::try_from_slot(global.binding)?;
                    Self::verify_resource_name(global, index.label())?;
                }
                group => {
                    return Err(ContractError::ResourceBindingMismatch {
                        name: global.name.clone(),
                        detail: format!("bind group {group} is not used by this contract"),
                    })
                }
            }
        }
        Ok(self.bindings.len())
    }

    fn verify_buffer_binding(global: &GlobalBinding) -> ContractResult<()> {
        let index = BufferIndex::try_from_slot(global.binding)?;
        let mismatch = |detail: String| Err(ContractError::BindingMismatch { slot: index, detail });

        if global.name != index.label() {
            return mismatch(format!("bound as `{}`, expected `{}`", global.name, index.label()));
        }
        if global.kind != Some(index.binding_kind()) {
            return mismatch(format!(
                "bound as {:?}, expected {:?}",
                global.kind,
                index.binding_kind()
            ));
        }
        let expected = index.shader_type_name();
        if global.type_name != expected {
            return mismatch(format!("has type `{}`, expected `{expected}`", global.type_name));
        }
        Ok(())
    }

    fn verify_resource_name(global: &GlobalBinding, expected: &str) -> ContractResult<()> {
        if global.name == expected {
            Ok(())
        } else {
            Err(ContractError::ResourceBindingMismatch {
                name: global.name.clone(),
                detail: format!(
                    "group {} binding {} belongs to `{expected}`",
                    global.group, global.binding
                ),
            })
        }
    }

    /// Check the vertex input struct against [`Vertex::layout`]
    ///
    /// Returns the number of attributes checked.
    pub fn verify_vertex_input(&self) -> ContractResult<usize> {
        let inputs = self
            .vertex_inputs()
            .ok_or_else(|| ContractError::MissingStruct(VERTEX_INPUT_STRUCT.to_string()))?;
        let layout = Vertex::layout();

        if inputs.len() != layout.attributes.len() {
            return Err(ContractError::VertexInputMismatch(format!(
                "shader declares {} attribute(s), host vertex has {}",
                inputs.len(),
                layout.attributes.len()
            )));
        }
        for attr in &layout.attributes {
            let input = inputs
                .iter()
                .find(|i| i.location == attr.location())
                .ok_or_else(|| {
                    ContractError::VertexInputMismatch(format!("no input at {}", attr.attribute))
                })?;
            if input.name != attr.attribute.label() {
                return Err(ContractError::VertexInputMismatch(format!(
                    "location {} is `{}` in the shader, `{}` on the host",
                    input.location,
                    input.name,
                    attr.attribute.label()
                )));
            }
            if input.type_name != attr.format.wgsl_type() {
                return Err(ContractError::VertexInputMismatch(format!(
                    "`{}` is `{}` in the shader, `{}` on the host",
                    input.name,
                    input.type_name,
                    attr.format.wgsl_type()
                )));
            }
        }
        Ok(inputs.len())
    }

    /// Check the schema marker against [`CURRENT_SCHEMA`]
    pub fn verify_schema(&self) -> ContractResult<()> {
        match self.schema {
            Some(CURRENT_SCHEMA) => Ok(()),
            found => Err(ContractError::SchemaMismatch {
                expected: CURRENT_SCHEMA,
                found,
            }),
        }
    }

    /// Run every check: schema, vertex input, constants, bindings and all shared structs
    pub fn verify_all(&self) -> ContractResult<ConformanceReport> {
        self.verify_schema()?;
        let vertex_attributes = self.verify_vertex_input()?;
        let constants = self.verify_constants()?;
        let bindings = self.verify_bindings()?;

        let checks: [(&str, fn(&Self) -> ContractResult<()>); 16] = [
            (Uniform::SHADER_NAME, Self::verify_struct::<Uniform>),
            (MaterialInfo::SHADER_NAME, Self::verify_struct::<MaterialInfo>),
            (InstanceUniform::SHADER_NAME, Self::verify_struct::<InstanceUniform>),
            (CameraInfo::SHADER_NAME, Self::verify_struct::<CameraInfo>),
            (BaseLight::SHADER_NAME, Self::verify_struct::<BaseLight>),
            (Attenuation::SHADER_NAME, Self::verify_struct::<Attenuation>),
            (DirectionalLight::SHADER_NAME, Self::verify_struct::<DirectionalLight>),
            (PointLight::SHADER_NAME, Self::verify_struct::<PointLight>),
            (SpotLight::SHADER_NAME, Self::verify_struct::<SpotLight>),
            (LightsUniforms::SHADER_NAME, Self::verify_struct::<LightsUniforms>),
            (ShadowPass::SHADER_NAME, Self::verify_struct::<ShadowPass>),
            (MainPass::SHADER_NAME, Self::verify_struct::<MainPass>),
            (ObjectData::SHADER_NAME, Self::verify_struct::<ObjectData>),
            (Constants::SHADER_NAME, Self::verify_struct::<Constants>),
            (ToonConstants::SHADER_NAME, Self::verify_struct::<ToonConstants>),
            (FireBallConstants::SHADER_NAME, Self::verify_struct::<FireBallConstants>),
        ];

        let mut structs = Vec::with_capacity(checks.len());
        for (name, check) in checks {
            check(self)?;
            structs.push(name.to_string());
        }

        Ok(ConformanceReport {
            schema: CURRENT_SCHEMA,
            structs,
            bindings,
            vertex_attributes,
            constants,
        })
    }
}
