//! Typed manifest and lockfile records plus the reader ports producing them
pub mod cyclonedx;
pub mod dotnet;
pub mod npm;
pub mod poetry;

pub use cyclonedx::CycloneDxReader;
pub use dotnet::DotnetAssetReader;
pub use npm::NpmManifestReader;
pub use poetry::PoetryManifestReader;
