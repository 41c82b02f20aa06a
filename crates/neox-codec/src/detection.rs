//! Content detection: text/binary heuristic, extension and category.

use neox_common::memchr::memmem;

use crate::{Category, DataFlags};

/// How far into the data to look for NUL bytes.
const NUL_SCAN_LEN: usize = 4000;

/// How much of the data must decode as UTF-8.
const UTF8_SAMPLE_LEN: usize = 2048;

/// Text signatures are only searched in payloads below this size.
const TEXT_SCAN_LIMIT: usize = 100_000_000;

/// Check if the data looks binary.
///
/// Data is binary when a NUL byte appears in the first 4000 bytes or when the
/// first 2048 bytes are not valid UTF-8. A multi-byte sequence cut off by the
/// sample boundary does not count as invalid.
pub fn is_binary(data: &[u8]) -> bool {
    let scan = &data[..data.len().min(NUL_SCAN_LEN)];
    if memchr_nul(scan) {
        return true;
    }

    let sample = &data[..data.len().min(UTF8_SAMPLE_LEN)];
    match std::str::from_utf8(sample) {
        Ok(_) => false,
        // Only a real encoding error counts; a sequence cut by the sample limit is text.
        Err(e) => e.error_len().is_some() || sample.len() == data.len(),
    }
}

#[inline]
fn memchr_nul(data: &[u8]) -> bool {
    neox_common::memchr::memchr(0, data).is_some()
}

#[inline]
fn contains(data: &[u8], needle: &[u8]) -> bool {
    memmem::find(data, needle).is_some()
}

#[inline]
fn slice_eq(data: &[u8], start: usize, expected: &[u8]) -> bool {
    data.get(start..start + expected.len()) == Some(expected)
}

/// Detect a file extension (without the dot) from content and flags.
///
/// Empty data yields `empty`. Text-flagged data is matched against markup
/// markers, everything else against binary signatures. Unknown content
/// yields `dat`.
pub fn detect_extension(data: &[u8], flags: DataFlags) -> &'static str {
    if data.is_empty() {
        return "empty";
    }

    let detected = if flags.contains(DataFlags::TEXT) {
        text_extension(data)
    } else {
        binary_extension(data)
    };

    detected.unwrap_or("dat")
}

fn binary_extension(data: &[u8]) -> Option<&'static str> {
    const MESH: [u8; 4] = [0x34, 0x80, 0xC8, 0xBB];
    const FOLIAGE: [u8; 6] = [0x01, 0x00, 0x05, 0x00, 0x00, 0x00];
    const PYC: [[u8; 4]; 4] = [
        [0xE3, 0x00, 0x00, 0x00],
        [0x63, 0x00, 0x00, 0x00],
        [0x4C, 0x0F, 0x00, 0x00],
        [0x27, 0xE3, 0x00, 0x01],
    ];
    const ASTC: [u8; 4] = [0x13, 0xAB, 0xA1, 0x5C];
    const NEOX_RESOURCE: [u8; 4] = [0xC1, 0x59, 0x41, 0x0D];
    const JPEG: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE1];
    const SLPB: [u8; 5] = [0xC5, 0x00, 0x00, 0x80, 0x3F];
    const ANIMATION: [u8; 7] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x55, 0x55];

    let ext = if data.starts_with(b"PVR") {
        "pvr"
    } else if data.starts_with(&MESH) {
        "mesh"
    } else if data.starts_with(b"RIFF") && contains(data, b"FEV") {
        "fev"
    } else if data.starts_with(b"RIFF") && contains(data, b"WAVE") {
        "wem"
    } else if data.starts_with(b"RAWANIMA") {
        "rawanimation"
    } else if data.starts_with(b"NEOXBIN1") {
        "uiprefab"
    } else if data.starts_with(b"SKELETON") {
        "skeleton"
    } else if data.starts_with(&FOLIAGE) {
        "foliage"
    } else if data.starts_with(b"NEOXMESH") {
        "uimesh"
    } else if data.starts_with(b"NVidia(r) GameWorks Blast(tm) v.1") {
        "blast"
    } else if PYC.iter().any(|magic| data.starts_with(magic)) {
        "pyc"
    } else if data.starts_with(b"CocosStudio-UI") {
        "coc"
    } else if data.starts_with(&ASTC) {
        "astc"
    } else if data.starts_with(b"hit") {
        "hit"
    } else if data.starts_with(b"PKM") {
        "pkm"
    } else if data.starts_with(b"DDS") {
        "dds"
    } else if is_tga(data) {
        "tga"
    } else if data.starts_with(b"NFXO") {
        "nfx"
    } else if data.starts_with(&NEOX_RESOURCE) {
        if contains(data, b"Material") {
            "mtg"
        } else if contains(data, b"GisFiles") {
            "gim"
        } else if contains(data, b"Anim") {
            "ags"
        } else {
            "unknown1"
        }
    } else if data.starts_with(b"CompBlks") {
        "cbk"
    } else if data.starts_with(b"BM") {
        "bmp"
    } else if slice_eq(data, 1, b"KTX") {
        "ktx"
    } else if data.starts_with(b"blastmesh") {
        "blastmesh"
    } else if data.starts_with(b"clothasset") {
        "clothasset"
    } else if slice_eq(data, 1, b"PNG") {
        "png"
    } else if data.starts_with(b"FSB5") {
        "fsb"
    } else if data.starts_with(b"VANT") {
        "vant"
    } else if data.starts_with(b"MDMP") {
        "mdmp"
    } else if data.starts_with(b"RGIS") {
        "gis"
    } else if data.starts_with(b"NTRK") {
        "trk"
    } else if data.starts_with(b"OggS") {
        "ogg"
    } else if data.starts_with(&JPEG) {
        "jpg"
    } else if data.starts_with(b"BKHD") {
        "bnk"
    } else if data.starts_with(b"TZif") {
        "tzif"
    } else if slice_eq(data, 6, b"JFIF") {
        "jfif"
    } else if slice_eq(data, 4, b"ftyp") {
        "mp4"
    } else if slice_eq(data, 0x3B, &SLPB) {
        "slpb"
    } else if contains(data, &ANIMATION) {
        "animation"
    } else {
        return None;
    };

    Some(ext)
}

fn is_tga(data: &[u8]) -> bool {
    let footer = data.len() >= 18 && &data[data.len() - 18..data.len() - 2] == b"TRUEVISION-XFILE";
    footer || data.starts_with(&[0x00, 0x00, 0x02]) || data.starts_with(&[0x0D, 0x00, 0x02])
}

/// Markup markers, checked in order. The first marker found wins.
const TEXT_MARKERS: &[(&[u8], &str)] = &[
    (b"<MaterialGroup", "mtg"),
    (b"<Material", "mtl"),
    (b"<MetaInfo", "pvr.meta"),
    (b"<Section", "sec"),
    (b"<SubMesh", "gim"),
    (b"<FxGroup", "sfx"),
    (b"<Track", "trackgroup"),
    (b"<Instances", "decal"),
    (b"<Physics", "col"),
    (b"<LODPolicy", "lod"),
    (b"<LODProfile", "lod"),
    (b"Type=\"Animation\"", "animation"),
    (b"DisableBakeLightProbe=", "prefab"),
    (b"<Scene", "scn"),
    (b"\"ParticleSystemTemplate\"", "pse"),
    (b"<MainBody", "nxcompute"),
    (b"<MapSkeletonToMeshBone", "skeletonextra"),
    (b"<ShadingModel", "nxshader"),
    (b"<BlastDynamic", "blt"),
    (b"\"ParticleAudio\"", "psemusic"),
];

const TEXT_MARKERS_TAIL: &[(&[u8], &str)] = &[
    (b"<AnimationConfig", "animconfig"),
    (b"<AnimationGraph", "animgraph"),
    (b"<Head Type=\"Timeline\"", "timeline"),
    (b"<Chain", "physicalbone"),
    (b"<PostProcess", "postprocess"),
    (b"\"mesh_import_options\":{", "nxmeta"),
    (b"<SceneConfig", "scnex"),
    (b"<LocalPoints", "localweather"),
    (b"GeoBatchHint=\"0\"", "gimext"),
    (b"\"AssetType\":\"HapticsData\"", "haptic"),
    (b"<LocalFogParams", "localfogparams"),
    (b"<Audios", "prefabaudio"),
    (b"<AudioSource", "prefabaudio"),
    (b"\"ReferenceSkeletonPath\"", "mirrortable"),
    (b"\"ReferenceSkeleton", "featureschema"),
    (b"<Relationships", "xml.rels"),
    (b"<Waterfall", "waterfall"),
    (b"<ClothAsset", "clt"),
    (b"<plist", "plist"),
    (b"<ShaderCompositor", "render"),
    (b"<ShaderFeature", "render"),
    (b"<ShaderIndexes", "render"),
    (b"<RenderTrigger", "render"),
    (b"<SkeletonRig", "skeletonrig"),
];

fn text_extension(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(b"from typing import ") {
        return Some("pyi");
    }
    if data.starts_with(b"-----BEGIN PUBLIC KEY-----") {
        return Some("pem");
    }
    if data.len() >= TEXT_SCAN_LIMIT {
        return None;
    }

    let marker = |table: &[(&[u8], &'static str)]| {
        table
            .iter()
            .find(|(needle, _)| contains(data, needle))
            .map(|(_, ext)| *ext)
    };

    if let Some(ext) = marker(TEXT_MARKERS) {
        return Some(ext);
    }
    if contains(data, b"SHEX") && contains(data, b"OSGN") {
        return Some("binary");
    }
    if contains(data, b"<BlendSpace") {
        return Some(if contains(data, b"is2D=\"false\"") {
            "blendspace1d"
        } else {
            "blendspace"
        });
    }
    if let Some(ext) = marker(TEXT_MARKERS_TAIL) {
        return Some(ext);
    }

    let ext = if contains(data, b"format: ") && contains(data, b"filter: ") {
        "atlas"
    } else if contains(data, b"<ShaderCache") {
        "cache"
    } else if contains(data, b"char") && contains(data, b"width=") && contains(data, b"height=") {
        "fnt"
    } else if contains(data, b"<AllCaches") {
        "info"
    } else if contains(data, b"<AllPreloadCaches") {
        "list"
    } else if contains(data, b"<Remove_Files") {
        "map"
    } else if contains(data, b"<HLSL File=\"") {
        "md5"
    } else if contains(data, b"<EnvParticle") {
        "envp"
    } else if contains(data, b"<TextureGroup") {
        "txg"
    } else if contains(data, b"?xml") {
        "xml"
    } else {
        return None;
    };

    Some(ext)
}

const TEXTURE_EXTENSIONS: &[&str] = &[
    "bmp", "gif", "jpg", "jpeg", "png", "pbm", "pgm", "ppm", "xbm", "xpm", "tga", "ico", "tiff",
    "dds", "pvr", "astc", "ktx", "ktx_low", "cbk",
];

const TEXT_EXTENSIONS: &[&str] = &[
    "xml", "mtl", "pyi", "pem", "plist", "atlas", "fnt", "txt", "json",
];

/// Map an extension to its coarse category (case-insensitive).
pub fn category_for_extension(extension: &str) -> Category {
    let extension = extension.to_ascii_lowercase();
    let ext = extension.as_str();

    if TEXTURE_EXTENSIONS.contains(&ext) {
        Category::Texture
    } else if ext == "mesh" {
        Category::Mesh
    } else if ext == "bnk" {
        Category::Bank
    } else if TEXT_EXTENSIONS.contains(&ext) {
        Category::Text
    } else {
        Category::Other
    }
}
