//! Static node-type → output-port table.
//!
//! A finite mapping over the node types we recognize, plus one open-world
//! fallback: unknown types resolve to a single generic `output:any` port and
//! are never an error.

use super::heuristics::ParamType;

/// Fallback port for node types not in the table.
pub static FALLBACK_OUTPUT: &[(&str, ParamType)] = &[("output", ParamType::Any)];

/// Resolve the output ports for a node type.
pub fn output_ports(node_type: &str) -> &'static [(&'static str, ParamType)] {
    match node_type {
        "LoadImage" => &[("IMAGE", ParamType::Image)],
        "LoadImageMask" => &[("MASK", ParamType::Mask)],
        "SaveImage" | "PreviewImage" | "VAEDecode" | "ImageScale" => {
            &[("IMAGE", ParamType::Image)]
        }
        "CheckpointLoaderSimple" => &[
            ("MODEL", ParamType::Model),
            ("CLIP", ParamType::Any),
            ("VAE", ParamType::Any),
        ],
        "LoraLoader" => &[("MODEL", ParamType::Model), ("CLIP", ParamType::Any)],
        "CLIPTextEncode" => &[("CONDITIONING", ParamType::Any)],
        "KSampler" | "EmptyLatentImage" | "VAEEncode" => &[("LATENT", ParamType::Any)],
        "LoadAudio" => &[("AUDIO", ParamType::Audio)],
        "SaveAudio" => &[("AUDIO", ParamType::Audio)],
        "LoadVideo" | "SaveVideo" => &[("VIDEO", ParamType::Video)],
        _ => FALLBACK_OUTPUT,
    }
}

/// Whether the node type is in the table (as opposed to the fallback arm).
/// Only known types contribute mappable outputs.
pub fn is_known_output_type(node_type: &str) -> bool {
    matches!(
        node_type,
        "LoadImage"
            | "LoadImageMask"
            | "SaveImage"
            | "PreviewImage"
            | "VAEDecode"
            | "ImageScale"
            | "CheckpointLoaderSimple"
            | "LoraLoader"
            | "CLIPTextEncode"
            | "KSampler"
            | "EmptyLatentImage"
            | "VAEEncode"
            | "LoadAudio"
            | "SaveAudio"
            | "LoadVideo"
            | "SaveVideo"
    )
}
