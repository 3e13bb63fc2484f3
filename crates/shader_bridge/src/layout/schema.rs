//! Versioned layout schema
//!
//! The contract has been revised several times. Only [`CURRENT_SCHEMA`] is
//! produced by this crate; older revisions are kept as named entries with the
//! notes needed to migrate data or shader code written against them.

/// Revision every host struct in this crate is laid out for
pub const CURRENT_SCHEMA: u32 = 3;

/// Prefix of the marker comment shader sources use to declare their revision
pub const SCHEMA_MARKER: &str = "// layout-schema:";

/// One named revision of the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaRevision {
    /// Revision number, strictly increasing
    pub version: u32,
    /// Short name
    pub name: &'static str,
    /// Byte size of each record in this revision, by shader struct name
    pub record_sizes: &'static [(&'static str, usize)],
    /// What changed relative to the previous revision
    pub migration: &'static str,
}

impl SchemaRevision {
    /// Declared size of `record` in this revision
    pub fn record_size(&self, record: &str) -> Option<usize> {
        self.record_sizes
            .iter()
            .find(|(name, _)| *name == record)
            .map(|&(_, size)| size)
    }
}

/// All known revisions, oldest first
pub const SCHEMA_HISTORY: &[SchemaRevision] = &[
    SchemaRevision {
        version: 1,
        name: "inline-material",
        record_sizes: &[("Vertex", 64), ("Uniform", 272)],
        migration: "Material colour, shininess and a float texture flag were stored inline \
                    after the matrices of Uniform. The host mirror used a 4x4 normal matrix \
                    where the shader read a 3x3, so the two sides agreed on size only by \
                    accident. Lights carried per-channel vec3 coefficients and no shared base.",
    },
    SchemaRevision {
        version: 2,
        name: "split-buffers",
        record_sizes: &[
            ("Vertex", 64),
            ("Uniform", 240),
            ("MaterialInfo", 32),
            ("InstanceUniform", 272),
            ("CameraInfo", 32),
            ("DirectionalLight", 48),
            ("PointLight", 64),
            ("SpotLight", 96),
        ],
        migration: "Material moved out of Uniform into MaterialInfo at its own slot and \
                    InstanceUniform combined the two for instanced draws. Lights gained a \
                    common BaseLight with scalar coefficients and one buffer per light kind. \
                    The texture flag was a one-byte bool.",
    },
    SchemaRevision {
        version: 3,
        name: "wgsl-std140",
        record_sizes: &[
            ("Vertex", 64),
            ("Uniform", 240),
            ("MaterialInfo", 32),
            ("InstanceUniform", 272),
            ("CameraInfo", 32),
            ("BaseLight", 32),
            ("Attenuation", 12),
            ("DirectionalLight", 48),
            ("PointLight", 64),
            ("SpotLight", 96),
            ("LightsUniforms", 464),
            ("ShadowPass", 256),
            ("MainPass", 256),
            ("ObjectData", 256),
            ("Constants", 4),
            ("ToonConstants", 4),
            ("FireBallConstants", 12),
        ],
        migration: "Padding re-derived for WGSL host-shareable layout (identical to std140 \
                    for these records). The texture flag is a u32 because bool is not \
                    host-shareable. Every host struct names its filler explicitly. Shadow \
                    and main pass records got registry slots 11 to 13 and stay at 256 bytes \
                    to match the dynamic uniform offset alignment.",
    },
];

/// Look up a revision by number
pub fn revision(version: u32) -> Option<&'static SchemaRevision> {
    SCHEMA_HISTORY.iter().find(|r| r.version == version)
}

/// The revision this crate produces
pub fn current() -> &'static SchemaRevision {
    &SCHEMA_HISTORY[SCHEMA_HISTORY.len() - 1]
}

/// Read the `// layout-schema: N` marker from shader source
///
/// Returns `None` when no well-formed marker is present.
pub fn parse_marker(source: &str) -> Option<u32> {
    source
        .lines()
        .find_map(|line| line.trim().strip_prefix(SCHEMA_MARKER))
        .and_then(|rest| rest.trim().parse().ok())
}
