//! Writing generated code to disk

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const DEFAULT_STEM: &str = "generated_code";
const MAX_FILENAME_CHARS: usize = 100;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\:*?"<>|]"#).expect("unsafe char pattern is valid"));

/// Turn a user-supplied name into a safe, single-component filename
pub fn sanitize_filename(name: &str, default_extension: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(name, "_");
    let mut name = replaced
        .trim_matches(|c| c == '.' || c == ' ')
        .to_string();

    if name.is_empty() {
        name = DEFAULT_STEM.to_string();
    }
    if !name.contains('.') {
        name = format!("{name}.{default_extension}");
    }

    if name.chars().count() > MAX_FILENAME_CHARS {
        let extension = Path::new(&name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let keep = MAX_FILENAME_CHARS.saturating_sub(extension.chars().count());
        let stem: String = name.chars().take(keep).collect();
        name = format!("{stem}{extension}");
    }

    name
}

/// MIME type for a code file, by extension
pub fn mime_type(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());
    match extension.as_deref() {
        Some("py") => "text/x-python",
        Some("cpp") => "text/x-c++src",
        Some("c") => "text/x-csrc",
        Some("java") => "text/x-java",
        Some("js") => "text/javascript",
        Some("ts") => "text/typescript",
        Some("go") => "text/x-go",
        Some("rs") => "text/x-rust",
        _ => "text/plain",
    }
}

/// Write `code` to `dir/filename` and return the path written
pub fn write_code(dir: &Path, filename: &str, code: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, code)?;
    tracing::info!(path = %path.display(), bytes = code.len(), mime = mime_type(filename), "Code written");
    Ok(path)
}
