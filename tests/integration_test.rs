/// Integration tests for the application layer
mod test_utilities;

use bomgraph::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use test_utilities::mocks::*;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn npm_project(root: &Path, dir: &str, name: &str, leftpad: &str) {
    write(
        root,
        &format!("{}/package.json", dir),
        &format!(
            r#"{{ "name": "{}", "version": "1.0.0", "dependencies": {{ "leftpad": "^1.0.0" }} }}"#,
            name
        ),
    );
    write(
        root,
        &format!("{}/package-lock.json", dir),
        &format!(
            r#"{{
                "name": "{}",
                "lockfileVersion": 3,
                "packages": {{
                    "": {{ "name": "{}", "version": "1.0.0" }},
                    "node_modules/leftpad": {{ "version": "{}", "license": "MIT" }}
                }}
            }}"#,
            name, name, leftpad
        ),
    );
}

fn use_case(
    analyzers: Vec<Box<dyn Analyzer>>,
) -> AnalyzeProjectUseCase<WalkDirGlobber, MockProgressReporter> {
    AnalyzeProjectUseCase::new(WalkDirGlobber::new(), MockProgressReporter::new(), analyzers)
}

fn all_analyzers() -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(DotnetAnalyzer::new(FileSystemReader::new())),
        Box::new(NpmAnalyzer::new(FileSystemReader::new())),
        Box::new(PoetryAnalyzer::new(FileSystemReader::new())),
        Box::new(CycloneDxAnalyzer::new(FileSystemReader::new())),
    ]
}

fn request(root: &Path) -> AnalysisRequest {
    AnalysisRequest::new(Some(root.to_path_buf()))
}

fn component_names(bom: &Bom) -> Vec<&str> {
    bom.components.iter().map(|c| c.name()).collect()
}

#[test]
fn test_npm_project_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    npm_project(temp_dir.path(), "web", "web", "1.3.0");

    let response = use_case(all_analyzers())
        .execute(request(temp_dir.path()), &MockOptionResolver::new())
        .unwrap();

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(response.files_analyzed, 1);
    assert_eq!(component_names(&response.bom), vec!["web", "leftpad"]);
    assert_eq!(response.bom.dependencies.len(), 1);

    let record = &response.bom.dependencies[0];
    assert_eq!(record.bom_ref.to_string(), "pkg:bomgraph/npm/web@1.0.0");
    assert_eq!(record.depends_on, vec![BomRef::new("pkg:npm/leftpad@1.3.0")]);
    assert!(response.bom.dangling_refs().is_empty());
}

#[test]
fn test_shared_dependency_is_deduplicated_across_projects() {
    let temp_dir = TempDir::new().unwrap();
    npm_project(temp_dir.path(), "web", "web", "1.3.0");
    npm_project(temp_dir.path(), "admin", "admin", "1.3.0");

    let response = use_case(all_analyzers())
        .execute(request(temp_dir.path()), &MockOptionResolver::new())
        .unwrap();

    let leftpads = response
        .bom
        .components
        .iter()
        .filter(|c| c.name() == "leftpad")
        .count();
    assert_eq!(leftpads, 1);
    assert_eq!(response.bom.components.len(), 3);
    assert_eq!(response.bom.dependencies.len(), 2);
    // Sorted discovery: admin/ before web/
    assert_eq!(component_names(&response.bom), vec!["admin", "leftpad", "web"]);
}

#[test]
fn test_project_links_the_version_its_own_lockfile_installed() {
    let temp_dir = TempDir::new().unwrap();
    npm_project(temp_dir.path(), "a", "alpha", "1.9.0");
    npm_project(temp_dir.path(), "b", "beta", "1.0.5");

    let response = use_case(all_analyzers())
        .execute(request(temp_dir.path()), &MockOptionResolver::new())
        .unwrap();

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let alpha = response
        .bom
        .find_dependency(&BomRef::new("pkg:bomgraph/npm/alpha@1.0.0"))
        .unwrap();
    assert_eq!(alpha.depends_on, vec![BomRef::new("pkg:npm/leftpad@1.9.0")]);
    let beta = response
        .bom
        .find_dependency(&BomRef::new("pkg:bomgraph/npm/beta@1.0.0"))
        .unwrap();
    assert_eq!(beta.depends_on, vec![BomRef::new("pkg:npm/leftpad@1.0.5")]);
}

fn dotnet_assets(project: &str, packages: &[&str], references: &[(&str, &Path)]) -> String {
    let mut libraries = serde_json::Map::new();
    let mut target = serde_json::Map::new();
    let mut declared = serde_json::Map::new();
    for package in packages {
        let key = format!("{}/1.0.0", package);
        libraries.insert(
            key.clone(),
            serde_json::json!({ "type": "package", "path": format!("{}/1.0.0", package.to_lowercase()) }),
        );
        target.insert(key, serde_json::json!({ "type": "package" }));
        declared.insert(
            package.to_string(),
            serde_json::json!({ "target": "Package", "version": "[1.0.0, )" }),
        );
    }

    let mut project_references = serde_json::Map::new();
    for (name, path) in references {
        let key = format!("{}/1.0.0", name);
        libraries.insert(
            key.clone(),
            serde_json::json!({ "type": "project", "path": format!("../{}/{}.csproj", name, name) }),
        );
        target.insert(key, serde_json::json!({ "type": "project" }));
        let project_path = path.display().to_string();
        project_references.insert(
            project_path.clone(),
            serde_json::json!({ "projectPath": project_path }),
        );
    }

    serde_json::to_string_pretty(&serde_json::json!({
        "version": 3,
        "targets": { "net8.0": target },
        "libraries": libraries,
        "project": {
            "version": "1.0.0",
            "frameworks": { "net8.0": { "dependencies": declared } },
            "restore": {
                "projectName": project,
                "frameworks": { "net8.0": { "projectReferences": project_references } }
            }
        }
    }))
    .unwrap()
}

#[test]
fn test_solution_projects_share_package_and_reference_each_other() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(
        root,
        "S.sln",
        r#"
Microsoft Visual Studio Solution File, Format Version 12.00
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "A", "A\A.csproj", "{11111111-1111-1111-1111-111111111111}"
EndProject
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "B", "B\B.csproj", "{22222222-2222-2222-2222-222222222222}"
EndProject
"#,
    );
    write(root, "A/A.csproj", "<Project />");
    write(root, "B/B.csproj", "<Project />");
    write(root, "A/obj/project.assets.json", &dotnet_assets("A", &["P"], &[]));
    write(
        root,
        "B/obj/project.assets.json",
        &dotnet_assets("B", &["P"], &[("A", &root.join("A").join("A.csproj"))]),
    );

    let response = use_case(all_analyzers())
        .execute(request(root), &MockOptionResolver::new())
        .unwrap();

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    let p_nodes = response
        .bom
        .components
        .iter()
        .filter(|c| c.name() == "P")
        .count();
    assert_eq!(p_nodes, 1);
    assert_eq!(response.bom.components.len(), 3);

    let p = BomRef::new("pkg:nuget/P@1.0.0");
    let a = BomRef::new("pkg:bomgraph/nuget/A@1.0.0");
    let a_record = response.bom.find_dependency(&a).unwrap();
    assert_eq!(a_record.depends_on, vec![p.clone()]);
    let b_record = response
        .bom
        .find_dependency(&BomRef::new("pkg:bomgraph/nuget/B@1.0.0"))
        .unwrap();
    assert_eq!(b_record.depends_on.len(), 2);
    assert!(b_record.depends_on.contains(&p));
    assert!(b_record.depends_on.contains(&a));
    assert!(response.bom.dangling_refs().is_empty());
}

#[test]
fn test_ingested_bom_merges_with_npm_component() {
    let temp_dir = TempDir::new().unwrap();
    npm_project(temp_dir.path(), "web", "web", "1.3.0");
    write(
        temp_dir.path(),
        "third-party/vendor.cdx.json",
        r#"{
            "bomFormat": "CycloneDX",
            "specVersion": "1.5",
            "metadata": { "component": { "type": "application", "name": "vendor", "version": "2.0.0", "purl": "pkg:generic/vendor@2.0.0" } },
            "components": [
                { "type": "library", "name": "LeftPad", "version": "1.3.0", "purl": "pkg:npm/LeftPad@1.3.0" }
            ],
            "dependencies": [
                { "ref": "pkg:generic/vendor@2.0.0", "dependsOn": ["pkg:npm/LeftPad@1.3.0"] }
            ]
        }"#,
    );

    let response = use_case(all_analyzers())
        .execute(request(temp_dir.path()), &MockOptionResolver::new())
        .unwrap();

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    let leftpads: Vec<_> = response
        .bom
        .components
        .iter()
        .filter(|c| c.name().eq_ignore_ascii_case("leftpad"))
        .collect();
    assert_eq!(leftpads.len(), 1);
    assert_eq!(response.bom.dependencies.len(), 2);
    assert!(response.bom.dangling_refs().is_empty());
}

#[test]
fn test_missing_poetry_lock_reports_one_error() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "service/pyproject.toml",
        "[tool.poetry]\nname = \"service\"\nversion = \"0.1.0\"\n",
    );

    let response = use_case(all_analyzers())
        .execute(request(temp_dir.path()), &MockOptionResolver::new())
        .unwrap();

    assert!(response.has_errors());
    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].kind(), DiagnosticKind::Error);
    assert!(response.bom.components.is_empty());
}

#[test]
fn test_missing_npm_dependency_warns() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "package.json",
        r#"{ "name": "app", "version": "1.0.0", "dependencies": { "ghost": "^1.0.0" } }"#,
    );
    write(
        temp_dir.path(),
        "package-lock.json",
        r#"{ "lockfileVersion": 3, "packages": { "": { "name": "app", "version": "1.0.0" } } }"#,
    );

    let response = use_case(all_analyzers())
        .execute(request(temp_dir.path()), &MockOptionResolver::new())
        .unwrap();

    assert!(!response.has_errors());
    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].kind(), DiagnosticKind::Warning);
    assert!(response.diagnostics[0].message().contains("ghost"));
    assert_eq!(component_names(&response.bom), vec!["app"]);
}

#[test]
fn test_disable_flag_skips_analyzer() {
    let temp_dir = TempDir::new().unwrap();
    npm_project(temp_dir.path(), "web", "web", "1.3.0");

    let options = MockOptionResolver::new().with_flag("disable-npm");
    let response = use_case(all_analyzers())
        .execute(request(temp_dir.path()), &options)
        .unwrap();

    assert!(response.bom.components.is_empty());
    assert_eq!(response.files_analyzed, 0);
}

#[test]
fn test_exclude_paths_prune_projects() {
    let temp_dir = TempDir::new().unwrap();
    npm_project(temp_dir.path(), "web", "web", "1.3.0");
    npm_project(temp_dir.path(), "legacy/old", "old", "0.9.0");

    let mut request = request(temp_dir.path());
    request.exclude_paths = vec!["legacy".to_string()];
    let response = use_case(all_analyzers())
        .execute(request, &MockOptionResolver::new())
        .unwrap();

    assert_eq!(component_names(&response.bom), vec!["web", "leftpad"]);
}

#[test]
fn test_installed_packages_are_not_discovered() {
    let temp_dir = TempDir::new().unwrap();
    npm_project(temp_dir.path(), "web", "web", "1.3.0");
    write(
        temp_dir.path(),
        "web/node_modules/leftpad/package.json",
        r#"{ "name": "leftpad", "version": "1.3.0", "license": "MIT" }"#,
    );

    let response = use_case(all_analyzers())
        .execute(request(temp_dir.path()), &MockOptionResolver::new())
        .unwrap();

    assert_eq!(response.files_analyzed, 1);
    assert_eq!(response.bom.components.len(), 2);
}

#[test]
fn test_single_file_input() {
    let temp_dir = TempDir::new().unwrap();
    npm_project(temp_dir.path(), "web", "web", "1.3.0");
    npm_project(temp_dir.path(), "admin", "admin", "1.3.0");

    let response = use_case(all_analyzers())
        .execute(
            request(&temp_dir.path().join("web/package.json")),
            &MockOptionResolver::new(),
        )
        .unwrap();

    assert_eq!(component_names(&response.bom), vec!["web", "leftpad"]);
    assert_eq!(response.bom.name, "web");
}

#[test]
fn test_mock_analyzer_runs_alongside_builtin_analyzers() {
    let temp_dir = TempDir::new().unwrap();
    npm_project(temp_dir.path(), "web", "web", "1.3.0");
    write(temp_dir.path(), "tools/scripts.mock", "jq@1.7\nleftpad@1.3.0\n");

    let mock = MockAnalyzer::new();
    let mut analyzers = all_analyzers();
    analyzers.push(Box::new(mock.clone()));

    let response = use_case(analyzers)
        .execute(request(temp_dir.path()), &MockOptionResolver::new())
        .unwrap();

    assert_eq!(mock.seen_files().len(), 1);
    assert!(component_names(&response.bom).contains(&"scripts"));
    assert!(component_names(&response.bom).contains(&"jq"));
    // Generic leftpad is a different component from the npm one
    assert_eq!(response.bom.components.len(), 5);
    assert_eq!(response.bom.dependencies.len(), 2);
}

#[test]
fn test_bom_name_and_metadata_from_request() {
    let temp_dir = TempDir::new().unwrap();
    npm_project(temp_dir.path(), "web", "web", "1.3.0");

    let mut request = request(temp_dir.path());
    request.name = Some("shop".to_string());
    request.version = Some("3.1.0".to_string());
    request.metadata = vec![("team".to_string(), "payments".to_string())];
    let reporter = MockProgressReporter::new();
    let response = AnalyzeProjectUseCase::new(WalkDirGlobber::new(), reporter.clone(), all_analyzers())
        .execute(request, &MockOptionResolver::new())
        .unwrap();

    assert_eq!(response.bom.name, "shop");
    assert_eq!(response.bom.version, "3.1.0");
    assert_eq!(response.bom.metadata[0].key, "team");
    assert_eq!(reporter.steps(), vec!["web/package.json".to_string()]);
    assert!(matches!(
        reporter.events().last(),
        Some(ProgressEvent::Done(message)) if message.contains("2 component(s)")
    ));
}
