use crate::ports::outbound::manifests::dotnet::{NuspecLicense, NuspecMetadata};
use crate::shared::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Extracts package metadata from `.nuspec` XML.
///
/// Only direct children of `<metadata>` are read; namespace prefixes are ignored.
pub fn parse_nuspec(xml: &str) -> Result<NuspecMetadata> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut metadata = NuspecMetadata::default();
    let mut stack: Vec<String> = Vec::new();
    let mut license_type: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                let name = local_name(&element);
                if name == "license" {
                    license_type = type_attribute(&element)?;
                }
                stack.push(name);
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(text) => {
                let value = text.unescape()?.trim().to_string();
                if value.is_empty() || !in_metadata(&stack) {
                    continue;
                }
                let Some(field) = stack.last() else {
                    continue;
                };
                match field.as_str() {
                    "id" => metadata.id = Some(value),
                    "version" => metadata.version = Some(value),
                    "licenseUrl" => metadata.license_url = Some(value),
                    "copyright" => metadata.copyright = Some(value),
                    "license" => {
                        metadata.license = Some(match license_type.as_deref() {
                            Some("file") => NuspecLicense::File(value),
                            _ => NuspecLicense::Expression(value),
                        });
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(metadata)
}

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn type_attribute(element: &BytesStart<'_>) -> Result<Option<String>> {
    for attribute in element.attributes() {
        let attribute = attribute?;
        if attribute.key.local_name().as_ref() == b"type" {
            return Ok(Some(attribute.unescape_value()?.to_ascii_lowercase()));
        }
    }
    Ok(None)
}

fn in_metadata(stack: &[String]) -> bool {
    stack.len() >= 2 && stack[stack.len() - 2] == "metadata"
}
