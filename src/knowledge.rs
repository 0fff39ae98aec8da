use std::fs;
use std::path::Path;

/// Default location of the knowledge base, relative to the working directory.
pub const DEFAULT_KNOWLEDGE_PATH: &str = "data/important_knowledge.txt";

/// Reads the knowledge base once at startup.
///
/// Returns the trimmed file contents, or an empty string when the file is
/// missing or not valid UTF-8. A missing knowledge base is not an error.
pub fn load_knowledge(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(text) => {
            let text = text.trim().to_string();
            tracing::debug!(path = %path.display(), bytes = text.len(), "loaded knowledge base");
            text
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no knowledge base available");
            String::new()
        }
    }
}
