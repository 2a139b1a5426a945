mod component_resolver;
mod integrity;
mod npm_range;
mod nuget_range;
mod path_filter;

pub use component_resolver::{ComponentResolver, Resolution};
pub use integrity::Integrity;
pub use npm_range::NpmVersionRange;
pub use nuget_range::NuGetVersionRange;
pub use path_filter::PathFilter;
