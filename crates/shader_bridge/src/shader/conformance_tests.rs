//! Host and shader layouts against hand-written offset tables
//!
//! The tables are the contract: each record is checked against them from the
//! host side (memoffset) and from the shader side (naga), so a drift on
//! either side fails here even if the two happen to drift together.

use super::*;
use crate::bindings::{BindingKind, BufferIndex, TextureIndex, SamplerIndex};
use crate::error::ContractError;
use crate::layout::schema::{self, CURRENT_SCHEMA};
use crate::layout::GpuLayout;
use crate::render::camera::CameraInfo;
use crate::render::lighting::{
    self, Attenuation, BaseLight, DirectionalLight, LightsUniforms, PointLight, SpotLight,
    DISTANCE_EPSILON,
};
use crate::render::passes::{
    Constants, FireBallConstants, MainPass, ObjectData, ShadowPass, ToonConstants,
};
use crate::render::uniform::{InstanceUniform, MaterialInfo, Uniform};
use crate::render::vertex::wgsl_vertex_input;

type Table = (&'static str, usize, &'static [(&'static str, usize, usize)]);

const DECLARED: &[Table] = &[
    (
        "Uniform",
        240,
        &[
            ("projection_matrix", 0, 64),
            ("model_matrix", 64, 64),
            ("view_matrix", 128, 64),
            ("normal_matrix", 192, 48),
        ],
    ),
    ("MaterialInfo", 32, &[("color", 0, 16), ("shininess", 16, 4), ("use_texture", 20, 4)]),
    ("InstanceUniform", 272, &[("transform", 0, 240), ("material", 240, 32)]),
    ("CameraInfo", 32, &[("position", 0, 12), ("front", 16, 12)]),
    (
        "BaseLight",
        32,
        &[
            ("color", 0, 12),
            ("intensity", 12, 4),
            ("ambient", 16, 4),
            ("diffuse", 20, 4),
            ("specular", 24, 4),
        ],
    ),
    ("Attenuation", 12, &[("constant", 0, 4), ("linear", 4, 4), ("exponent", 8, 4)]),
    ("DirectionalLight", 48, &[("base", 0, 32), ("direction", 32, 12)]),
    ("PointLight", 64, &[("base", 0, 32), ("attenuation", 32, 12), ("position", 48, 12)]),
    (
        "SpotLight",
        96,
        &[("point_light", 0, 64), ("direction", 64, 12), ("cut_off", 76, 4), ("outer_cut_off", 80, 4)],
    ),
    (
        "LightsUniforms",
        464,
        &[("directional_lights", 0, 48), ("point_lights", 48, 320), ("spot_lights", 368, 96)],
    ),
    (
        "ShadowPass",
        256,
        &[("view_projection", 0, 64), ("pad1", 64, 64), ("pad2", 128, 64), ("pad3", 192, 64)],
    ),
    (
        "MainPass",
        256,
        &[
            ("view_projection", 0, 64),
            ("shadow_view_projection", 64, 64),
            ("light_position", 128, 16),
            ("pad00", 144, 16),
            ("pad01", 160, 16),
            ("pad02", 176, 16),
            ("pad1", 192, 64),
        ],
    ),
    (
        "ObjectData",
        256,
        &[
            ("local_to_world", 0, 64),
            ("color", 64, 16),
            ("pad0", 80, 16),
            ("pad01", 96, 16),
            ("pad02", 112, 16),
            ("pad1", 128, 64),
            ("pad2", 192, 64),
        ],
    ),
    ("Constants", 4, &[("time", 0, 4)]),
    ("ToonConstants", 4, &[("toon_edge", 0, 4)]),
    ("FireBallConstants", 12, &[("time", 0, 4), ("frequency", 4, 4), ("explosion", 8, 4)]),
];

fn host_layouts() -> Vec<crate::layout::StructLayout> {
    vec![
        Uniform::host_layout(),
        MaterialInfo::host_layout(),
        InstanceUniform::host_layout(),
        CameraInfo::host_layout(),
        BaseLight::host_layout(),
        Attenuation::host_layout(),
        DirectionalLight::host_layout(),
        PointLight::host_layout(),
        SpotLight::host_layout(),
        LightsUniforms::host_layout(),
        ShadowPass::host_layout(),
        MainPass::host_layout(),
        ObjectData::host_layout(),
        Constants::host_layout(),
        ToonConstants::host_layout(),
        FireBallConstants::host_layout(),
    ]
}

fn types() -> ShaderReflection {
    ShaderSource::TYPES.reflect().expect("shared declarations reflect")
}

fn assert_matches_table(layout: &crate::layout::StructLayout, side: &str) {
    let (_, size, fields) = DECLARED
        .iter()
        .find(|(name, _, _)| *name == layout.name)
        .unwrap_or_else(|| panic!("no declared table for {}", layout.name));
    assert_eq!(layout.size, *size, "{side} size of {}", layout.name);

    let actual: Vec<(&str, usize, usize)> = layout
        .contract_fields()
        .map(|f| (f.name.as_str(), f.offset, f.size))
        .collect();
    assert_eq!(actual, fields.to_vec(), "{side} fields of {}", layout.name);
}

#[test]
fn test_host_layouts_match_declared_tables() {
    let hosts = host_layouts();
    assert_eq!(hosts.len(), DECLARED.len());
    for layout in &hosts {
        assert_matches_table(layout, "host");
    }
}

#[test]
fn test_shader_layouts_match_declared_tables() {
    let reflection = types();
    for (name, _, _) in DECLARED {
        let layout = reflection
            .struct_layout(name)
            .unwrap_or_else(|| panic!("shader does not declare {name}"));
        assert_matches_table(layout, "shader");
    }
}

#[test]
fn test_declared_sizes_are_the_current_schema() {
    let current = schema::current();
    for (name, size, _) in DECLARED {
        assert_eq!(current.record_size(name), Some(*size), "{name}");
    }
    assert_eq!(current.record_size("Vertex"), Some(std::mem::size_of::<crate::render::vertex::Vertex>()));
}

#[test]
fn test_every_pass_conforms() {
    for source in ShaderSource::PASSES {
        let report = source
            .verify()
            .unwrap_or_else(|e| panic!("{} does not conform: {e}", source.name));
        assert_eq!(report.schema, CURRENT_SCHEMA);
        assert_eq!(report.structs.len(), DECLARED.len());
        assert_eq!(report.vertex_attributes, 4);
        assert_eq!(report.constants, 4);
        assert!(report.bindings > 0, "{} binds nothing", source.name);
    }
}

#[test]
fn test_shared_declarations_conform_without_bindings() {
    let report = types().verify_all().expect("shared declarations conform");
    assert_eq!(report.bindings, 0);
}

#[test]
fn test_every_shader_global_slot_is_bound_by_some_pass() {
    let reflections: Vec<ShaderReflection> = ShaderSource::PASSES
        .iter()
        .map(|s| s.reflect().expect("pass reflects"))
        .collect();

    for &index in BufferIndex::ALL.iter().filter(|i| i.is_shader_global()) {
        let bound = reflections.iter().any(|r| r.binding(0, index.slot()).is_some());
        assert!(bound, "{index} is not bound by any pass");
    }
    for &index in TextureIndex::ALL.iter().filter(|i| matches!(i, TextureIndex::Color | TextureIndex::ShadowMap)) {
        assert!(reflections.iter().any(|r| r.binding(1, index.slot()).is_some()), "{index}");
    }
    for &index in SamplerIndex::ALL {
        assert!(reflections.iter().any(|r| r.binding(2, index.slot()).is_some()), "{index}");
    }
}

#[test]
fn test_reflected_binding_details() {
    let lighting = ShaderSource::LIGHTING.reflect().unwrap();

    let instances = lighting.binding(0, BufferIndex::Instances.slot()).unwrap();
    assert_eq!(instances.name, "instances");
    assert_eq!(instances.kind, Some(BindingKind::ReadOnlyStorage));
    assert_eq!(instances.type_name, "array<InstanceUniform>");

    let points = lighting.binding(0, BufferIndex::PointLightInfo.slot()).unwrap();
    assert_eq!(points.type_name, "array<PointLight, 5>");

    let texture = lighting.binding(1, 0).unwrap();
    assert_eq!(texture.kind, None);
    assert_eq!(texture.type_name, "texture_2d<f32>");

    let shadow = ShaderSource::SHADOW.reflect().unwrap();
    assert_eq!(shadow.binding(1, 5).unwrap().type_name, "texture_depth_2d");
    assert_eq!(shadow.binding(2, 1).unwrap().type_name, "sampler_comparison");
}

#[test]
fn test_vertex_input_is_generated_from_host_layout() {
    assert!(ShaderSource::TYPES.source.contains(&wgsl_vertex_input()));

    let reflection = types();
    let inputs = reflection.vertex_inputs().unwrap();
    let names: Vec<&str> = inputs.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["position", "tex_coord", "color", "normal"]);
    assert_eq!(inputs[1].type_name, "vec2<f32>");
}

#[test]
fn test_shifted_member_is_reported() {
    let source = ShaderSource::TYPES.source.replace(
        "    shininess: f32,\n",
        "    shininess: f32,\n    roughness: f32,\n",
    );
    let reflection = ShaderReflection::from_wgsl(&source).unwrap();
    let err = reflection.verify_struct::<MaterialInfo>().unwrap_err();
    assert!(
        matches!(err, ContractError::LayoutMismatch { ref struct_name, .. } if struct_name == "MaterialInfo"),
        "{err}"
    );
}

#[test]
fn test_wrong_slot_is_reported() {
    let source = ShaderSource::LIGHTING.composed().replace(
        "@group(0) @binding(4) var<uniform> material",
        "@group(0) @binding(8) var<uniform> material",
    );
    let err = ShaderReflection::from_wgsl(&source).unwrap().verify_bindings().unwrap_err();
    assert!(
        matches!(err, ContractError::BindingMismatch { slot: BufferIndex::Constants, .. }),
        "{err}"
    );
}

#[test]
fn test_unregistered_slot_is_reported() {
    let source = format!(
        "{}\n@group(0) @binding(40) var<uniform> extra: Constants;\n",
        ShaderSource::TYPES.source
    );
    let err = ShaderReflection::from_wgsl(&source).unwrap().verify_bindings().unwrap_err();
    assert!(matches!(err, ContractError::UnknownSlot { slot: 40, .. }), "{err}");
}

#[test]
fn test_distance_guard_is_shared_with_shaders() {
    let reflection = types();
    assert_eq!(reflection.constant("DISTANCE_EPSILON"), Some(f64::from(DISTANCE_EPSILON)));
    assert_eq!(reflection.constant("NUMBER_OF_POINT_LIGHTS"), Some(5.0));
    assert_eq!(reflection.verify_constants().unwrap(), 4);

    // The lighting pass uses the shared declaration rather than its own copy
    assert!(!ShaderSource::LIGHTING.source.contains("const DISTANCE_EPSILON"));
    let lighting = ShaderSource::LIGHTING.reflect().unwrap();
    assert_eq!(lighting.constant("DISTANCE_EPSILON"), Some(f64::from(DISTANCE_EPSILON)));

    // A fragment closer than the guard is attenuated exactly as one at the guard
    let inverse_square = Attenuation::new(0.0, 0.0, 1.0);
    let at_guard = lighting::attenuation_factor(&inverse_square, DISTANCE_EPSILON);
    assert_eq!(lighting::attenuation_factor(&inverse_square, 0.0), at_guard);
}

#[test]
fn test_drifted_constant_is_reported() {
    let source = ShaderSource::TYPES
        .source
        .replace("const DISTANCE_EPSILON: f32 = 1e-4;", "const DISTANCE_EPSILON: f32 = 0.5;");
    let err = ShaderReflection::from_wgsl(&source).unwrap().verify_constants().unwrap_err();
    assert!(
        matches!(err, ContractError::ConstantMismatch { ref name, .. } if name == "DISTANCE_EPSILON"),
        "{err}"
    );

    let source = ShaderSource::TYPES
        .source
        .replace("const DISTANCE_EPSILON: f32 = 1e-4;", "");
    let err = ShaderReflection::from_wgsl(&source).unwrap().verify_all().unwrap_err();
    assert!(matches!(err, ContractError::ConstantMismatch { .. }), "{err}");
}

#[test]
fn test_schema_mismatch_is_reported() {
    let stale = ShaderSource::TYPES
        .source
        .replace("// layout-schema: 3", "// layout-schema: 2");
    let err = ShaderReflection::from_wgsl(&stale).unwrap().verify_schema().unwrap_err();
    assert!(matches!(err, ContractError::SchemaMismatch { expected: 3, found: Some(2) }));

    let unmarked = ShaderSource::TYPES.source.replace("// layout-schema: 3", "");
    let err = ShaderReflection::from_wgsl(&unmarked).unwrap().verify_all().unwrap_err();
    assert!(matches!(err, ContractError::SchemaMismatch { found: None, .. }));
}

#[test]
fn test_missing_struct_is_reported() {
    let reflection = ShaderReflection::from_wgsl("// layout-schema: 3\nstruct Other { x: f32 }\n").unwrap();
    assert!(matches!(
        reflection.verify_struct::<Constants>(),
        Err(ContractError::MissingStruct(name)) if name == "Constants"
    ));
    assert!(matches!(reflection.verify_vertex_input(), Err(ContractError::MissingStruct(_))));
}

#[test]
fn test_invalid_source_is_rejected() {
    assert!(matches!(
        ShaderReflection::from_wgsl("struct Broken { x: f32"),
        Err(ContractError::ShaderParse(_))
    ));
}
