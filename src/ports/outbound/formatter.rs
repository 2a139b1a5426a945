use crate::sbom_generation::domain::Bom;
use crate::shared::Result;

/// BomFormatter port for serializing the finished BOM
pub trait BomFormatter {
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, bom: &Bom) -> Result<String>;
}
