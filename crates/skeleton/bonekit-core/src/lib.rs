//! Bonekit Core (renderer-agnostic)
//!
//! 2D skeletal animation runtime for skeleton JSON + texture atlas exports.
//! Templates (`SkeletonData`) are loaded once and shared; each on-screen
//! character owns a `Skeleton` instance that animations mutate every frame.
//!
//! Per-frame order for one skeleton:
//! 1. `Animation::apply` / `Animation::mix` for every active animation
//! 2. `Skeleton::update_world_transform`
//! 3. `Skeleton::draw_regions` (or `world_vertices` per slot)

pub mod animation;
pub mod atlas;
pub mod attachment;
pub mod bone;
pub mod color;
pub mod config;
pub mod curve;
pub mod data;
pub mod error;
pub mod interp;
pub mod json;
pub mod loader;
pub mod render;
pub mod skeleton;
pub mod skin;
pub mod slot;
pub mod timeline;

// Re-exports for consumers (renderers, game glue)
pub use animation::Animation;
pub use atlas::{Atlas, AtlasPage, AtlasRegion, Format, TextureFilter, TextureHandle, TextureWrap};
pub use attachment::{Attachment, RegionAttachment};
pub use bone::Bone;
pub use color::Color;
pub use config::Config;
pub use curve::Curve;
pub use data::{BoneData, SkeletonData, SlotData};
pub use error::{LoadError, LookupKind, SkeletonError};
pub use json::SkeletonJson;
pub use loader::{AtlasAttachmentLoader, AttachmentLoader, PlainAttachmentLoader};
pub use render::RegionDraw;
pub use skeleton::Skeleton;
pub use skin::Skin;
pub use slot::Slot;
pub use timeline::{
    AttachmentTimeline, ColorTimeline, RotateTimeline, ScaleTimeline, Timeline,
    TranslateTimeline,
};
