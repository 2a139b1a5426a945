use crate::ports::outbound::BomFormatter;
use crate::sbom_generation::domain::Bom;
use crate::shared::Result;
use anyhow::Context;

/// JsonFormatter adapter writing the BOM aggregate as pretty-printed JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl BomFormatter for JsonFormatter {
    fn format(&self, bom: &Bom) -> Result<String> {
        serde_json::to_string_pretty(bom).context("Failed to serialize BOM to JSON")
    }
}
