/// Adapters layer - Infrastructure implementations
///
/// This layer contains concrete implementations of the outbound ports:
/// manifest reading, discovery, output and console rendering.
pub mod outbound;
