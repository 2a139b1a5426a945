use crate::ports::outbound::manifests::dotnet::{SolutionFile, SolutionProject};
use crate::shared::Result;
use regex::Regex;

const PROJECT_LINE: &str =
    r#"(?m)^\s*Project\("\{[^}]*\}"\)\s*=\s*"(?P<name>[^"]*)"\s*,\s*"(?P<path>[^"]*)"\s*,\s*"\{[^}]*\}"\s*$"#;

const PROJECT_EXTENSIONS: [&str; 3] = [".csproj", ".fsproj", ".vbproj"];

/// Parses the `Project(...)` lines of a Visual Studio solution.
///
/// Solution folders and other non-project entries are dropped.
pub fn parse_solution(content: &str) -> Result<SolutionFile> {
    let matcher = Regex::new(PROJECT_LINE)?;

    let projects = matcher
        .captures_iter(content)
        .filter_map(|captures| {
            let name = captures.name("name")?.as_str().trim();
            let path = captures.name("path")?.as_str().trim();
            is_project_file(path).then(|| SolutionProject {
                name: name.to_string(),
                relative_path: path.to_string(),
            })
        })
        .collect();

    Ok(SolutionFile { projects })
}

fn is_project_file(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    PROJECT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
