//! Built-in file organizer
//!
//! Sorts the files directly inside a directory into category folders by
//! extension. Subdirectories and files with unknown extensions are left
//! alone. Runs in-process, so it is always installed.

use actiongate_domain::{
    OperationResult, OperationSpec, ParamDef, Params, Tier, ToolDomain, ToolStatus, ToolWrapper,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

pub const ORGANIZER_ID: &str = "organize-tool";

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Documents",
        &["pdf", "doc", "docx", "txt", "rtf", "odt", "xls", "xlsx", "csv", "ppt", "pptx"],
    ),
    (
        "Images",
        &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "ico"],
    ),
    ("Videos", &["mp4", "mkv", "avi", "mov", "wmv", "webm"]),
    ("Audio", &["mp3", "wav", "flac", "ogg", "m4a"]),
    ("Archives", &["zip", "rar", "7z", "tar", "gz"]),
    (
        "Code",
        &[
            "ts", "js", "py", "java", "cpp", "c", "h", "cs", "go", "rs", "html", "css", "json",
            "xml", "yaml", "yml",
        ],
    ),
    ("Installers", &["exe", "msi", "dmg", "deb", "rpm"]),
];

/// Category folder for a file name, by lowercased extension.
pub fn category_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    CATEGORIES
        .iter()
        .find(|(_, exts)| exts.contains(&ext.as_str()))
        .map(|(category, _)| *category)
}

/// What an organize run did (or would do).
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OrganizeReport {
    pub moved: usize,
    pub skipped: usize,
    pub moves: Vec<(PathBuf, PathBuf)>,
}

/// Move each categorized file in `dir` into `dir/<Category>/`.
///
/// With `dry_run` nothing is touched; the report lists the planned moves.
/// Entries are processed in file-name order.
pub async fn organize_directory(dir: &Path, dry_run: bool) -> std::io::Result<OrganizeReport> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.file_name());
        }
    }
    files.sort();

    let mut report = OrganizeReport::default();
    for name in files {
        let from = dir.join(&name);
        let Some(category) = category_for(&from) else {
            report.skipped += 1;
            continue;
        };

        let target_dir = dir.join(category);
        let to = target_dir.join(&name);
        if !dry_run {
            tokio::fs::create_dir_all(&target_dir).await?;
            tokio::fs::rename(&from, &to).await?;
            debug!(from = %from.display(), to = %to.display(), "Moved");
        }
        report.moves.push((from, to));
        report.moved += 1;
    }

    Ok(report)
}

fn render(report: &OrganizeReport, header: [String; 3]) -> String {
    let mut lines: Vec<String> = header.into();
    lines.push(String::new());
    lines.extend(
        report
            .moves
            .iter()
            .map(|(from, to)| format!("  {} → {}", from.display(), to.display())),
    );
    lines.join("\n")
}

/// [`ToolWrapper`] exposing [`organize_directory`].
#[derive(Debug)]
pub struct OrganizerTool {
    operations: Vec<OperationSpec>,
}

impl OrganizerTool {
    pub fn new() -> Self {
        let path = || ParamDef::required("path", "Directory path to organize");
        Self {
            operations: vec![
                OperationSpec::new(
                    "organize-preview",
                    "Preview file organization",
                    "Dry-run: show what files would be moved without actually moving them",
                    Tier::Green,
                )
                .with_param(path()),
                OperationSpec::new(
                    "organize-execute",
                    "Organize files",
                    "Move files into category folders based on extension (Documents, Images, Videos, etc.)",
                    Tier::Yellow,
                )
                .with_param(path()),
            ],
        }
    }

    async fn run(&self, operation_id: &str, params: &Params) -> Result<String, String> {
        let spec = self
            .operation(operation_id)
            .ok_or_else(|| format!("Unknown operation for {}: {}", ORGANIZER_ID, operation_id))?;
        let params = spec.resolve_params(params)?;
        let path = params.get("path").map(String::as_str).unwrap_or_default();
        let dry_run = operation_id == "organize-preview";

        let report = organize_directory(Path::new(path), dry_run)
            .await
            .map_err(|e| format!("Failed to organize {}: {}", path, e))?;

        if dry_run {
            Ok(render(
                &report,
                [
                    format!("Preview for: {}", path),
                    format!("Would move: {} files", report.moved),
                    format!("Would skip: {} files (unknown extension)", report.skipped),
                ],
            ))
        } else {
            info!(path, moved = report.moved, skipped = report.skipped, "Organized directory");
            Ok(render(
                &report,
                [
                    format!("Organized: {}", path),
                    format!("Moved: {} files", report.moved),
                    format!("Skipped: {} files", report.skipped),
                ],
            ))
        }
    }
}

impl Default for OrganizerTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolWrapper for OrganizerTool {
    fn id(&self) -> &str {
        ORGANIZER_ID
    }

    fn name(&self) -> &str {
        "Built-in File Organizer"
    }

    fn description(&self) -> &str {
        "Built-in extension-based file organizer. Sorts files into category folders (Documents, Images, Videos, etc.)."
    }

    fn domain(&self) -> ToolDomain {
        ToolDomain::FileOps
    }

    fn install_method(&self) -> Option<&str> {
        Some("built-in")
    }

    async fn detect(&self) -> ToolStatus {
        ToolStatus::installed()
    }

    fn operations(&self) -> &[OperationSpec] {
        &self.operations
    }

    async fn execute(&self, operation_id: &str, params: &Params) -> OperationResult {
        let start = Instant::now();
        let outcome = self.run(operation_id, params).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(output) => OperationResult::success(ORGANIZER_ID, output),
            Err(error) => OperationResult::failure(ORGANIZER_ID, error),
        }
        .with_duration(duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), b"x").unwrap();
        }
    }

    fn path_params(dir: &Path) -> Params {
        Params::from([("path".to_string(), dir.to_string_lossy().into_owned())])
    }

    #[test]
    fn test_category_for() {
        assert_eq!(category_for(Path::new("report.PDF")), Some("Documents"));
        assert_eq!(category_for(Path::new("main.rs")), Some("Code"));
        assert_eq!(category_for(Path::new("setup.msi")), Some("Installers"));
        assert_eq!(category_for(Path::new("notes.xyz")), None);
        assert_eq!(category_for(Path::new("Makefile")), None);
    }

    #[tokio::test]
    async fn test_dry_run_moves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["a.pdf", "b.png", "c.unknown"]);

        let report = organize_directory(dir.path(), true).await.unwrap();
        assert_eq!(report.moved, 2);
        assert_eq!(report.skipped, 1);
        assert!(dir.path().join("a.pdf").exists());
        assert!(!dir.path().join("Documents").exists());
    }

    #[tokio::test]
    async fn test_execute_moves_files_and_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["a.pdf", "song.mp3", "c.unknown"]);
        std::fs::create_dir(dir.path().join("nested.zip")).unwrap();

        let report = organize_directory(dir.path(), false).await.unwrap();
        assert_eq!(report.moved, 2);
        assert_eq!(report.skipped, 1);
        assert!(dir.path().join("Documents").join("a.pdf").exists());
        assert!(dir.path().join("Audio").join("song.mp3").exists());
        assert!(dir.path().join("c.unknown").exists());
        assert!(dir.path().join("nested.zip").is_dir());
    }

    #[tokio::test]
    async fn test_preview_output_format() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["a.pdf", "c.unknown"]);

        let tool = OrganizerTool::new();
        let result = tool.execute("organize-preview", &path_params(dir.path())).await;
        assert!(result.success);
        assert_eq!(result.tool_id, "organize-tool");

        let output = result.output.unwrap();
        let shown = dir.path().display().to_string();
        assert!(output.starts_with(&format!(
            "Preview for: {}\nWould move: 1 files\nWould skip: 1 files (unknown extension)\n\n",
            shown
        )));
        assert!(output.contains(" → "));
        assert!(dir.path().join("a.pdf").exists());
    }

    #[tokio::test]
    async fn test_organize_output_format() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["a.pdf"]);

        let result = OrganizerTool::new()
            .execute("organize-execute", &path_params(dir.path()))
            .await;
        let output = result.output.unwrap();
        assert!(output.contains("Moved: 1 files\nSkipped: 0 files"));
        assert!(dir.path().join("Documents").join("a.pdf").exists());
    }

    #[tokio::test]
    async fn test_missing_directory_fails() {
        let result = OrganizerTool::new()
            .execute(
                "organize-execute",
                &Params::from([("path".to_string(), "/no/such/dir/here".to_string())]),
            )
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("Failed to organize /no/such/dir/here:"));
    }

    #[tokio::test]
    async fn test_path_is_required() {
        let result = OrganizerTool::new().execute("organize-preview", &Params::new()).await;
        assert_eq!(result.error.as_deref(), Some("Missing required parameter: path"));
    }

    #[tokio::test]
    async fn test_always_installed() {
        assert!(OrganizerTool::new().detect().await.installed);
    }
}
