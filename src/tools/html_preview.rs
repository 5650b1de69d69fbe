//! WRITE_FULL_HTML_PREVIEW: overwrite the live preview page.
//!
//! The browser UI polls `/preview.html` and reloads its iframe whenever the
//! file changes, so writing here is how the model "shows" a website.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{ToolDefinition, ToolHandler, ToolResponse};

pub const SLUG: &str = "WRITE_FULL_HTML_PREVIEW";

/// File name inside the public directory, also its URL path.
pub const PREVIEW_FILE: &str = "preview.html";

fn full_document_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)<!doctype\s+html|<html[\s>]").expect("valid document pattern")
    })
}

pub fn input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "html": {
                "type": "string",
                "minLength": 1,
                "description": "Full HTML document (must include <!doctype html> or <html>)"
            }
        },
        "required": ["html"],
        "additionalProperties": false
    })
}

/// Build the tool definition writing to `<public_dir>/preview.html`.
pub fn definition(public_dir: &Path) -> ToolDefinition {
    ToolDefinition {
        slug: SLUG.into(),
        name: "Write Full HTML Preview".into(),
        description: "Writes a complete HTML document to public/preview.html so the preview updates."
            .into(),
        input_schema: input_schema(),
        handler: Arc::new(HtmlPreviewTool::new(public_dir.join(PREVIEW_FILE))),
    }
}

pub struct HtmlPreviewTool {
    preview_path: PathBuf,
}

impl HtmlPreviewTool {
    pub fn new(preview_path: PathBuf) -> Self {
        Self { preview_path }
    }

    async fn write(&self, html: &str) -> ToolResponse {
        match tokio::fs::write(&self.preview_path, html).await {
            Ok(()) => {
                let bytes = html.len();
                info!(path = %self.preview_path.display(), bytes, "Preview written");
                ToolResponse::success(json!({
                    "path": PREVIEW_FILE,
                    "url": format!("/{PREVIEW_FILE}"),
                    "bytesWritten": bytes,
                }))
            }
            Err(e) => {
                let message = format!("Failed to write {}: {}", self.preview_path.display(), e);
                warn!("{}", message);
                ToolResponse::failure_with_data(
                    json!({
                        "path": PREVIEW_FILE,
                        "url": format!("/{PREVIEW_FILE}"),
                        "errorMessage": message,
                    }),
                    message,
                )
            }
        }
    }
}

impl ToolHandler for HtmlPreviewTool {
    fn validate(&self, input: &Value) -> Result<(), String> {
        let obj = input
            .as_object()
            .ok_or_else(|| "Input must be an object".to_string())?;

        if let Some(extra) = obj.keys().find(|k| k.as_str() != "html") {
            return Err(format!("Unrecognized key: {}", extra));
        }

        let html = obj
            .get("html")
            .ok_or_else(|| "Missing required field: html".to_string())?
            .as_str()
            .ok_or_else(|| "html must be a string".to_string())?;

        if html.is_empty() {
            return Err("Provide a complete HTML document".into());
        }
        if !full_document_pattern().is_match(html) {
            return Err(
                "Input must be a full HTML document (include <!doctype html> or <html>)".into(),
            );
        }
        Ok(())
    }

    fn execute(&self, input: Value) -> Pin<Box<dyn Future<Output = ToolResponse> + Send + '_>> {
        Box::pin(async move {
            let html = input.get("html").and_then(Value::as_str).unwrap_or_default();
            self.write(html).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("voice-preview-test-html")
            .join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create test dir");
        dir
    }

    #[test]
    fn test_validate_accepts_full_documents() {
        let tool = HtmlPreviewTool::new(PathBuf::from("unused.html"));
        assert!(tool.validate(&json!({"html": "<html><body>hi</body></html>"})).is_ok());
        assert!(tool.validate(&json!({"html": "<!DOCTYPE html><p>x</p>"})).is_ok());
        assert!(tool.validate(&json!({"html": "<!doctype   HTML>"})).is_ok());
        assert!(tool.validate(&json!({"html": "<HTML lang=\"en\"></HTML>"})).is_ok());
    }

    #[test]
    fn test_validate_rejects_fragments_and_bad_shapes() {
        let tool = HtmlPreviewTool::new(PathBuf::from("unused.html"));
        assert!(tool.validate(&json!({"html": "not html"})).is_err());
        assert!(tool.validate(&json!({"html": "<htmlx>"})).is_err());
        assert!(tool.validate(&json!({"html": ""})).is_err());
        assert!(tool.validate(&json!({"html": 42})).is_err());
        assert!(tool.validate(&json!({})).is_err());
        assert!(tool.validate(&json!("<html>")).is_err());
        assert!(tool
            .validate(&json!({"html": "<html></html>", "extra": true}))
            .is_err());
    }

    #[tokio::test]
    async fn test_execute_writes_file_and_reports_bytes() {
        let dir = test_dir("write_ok");
        let tool = HtmlPreviewTool::new(dir.join(PREVIEW_FILE));
        let html = "<html><body>hi</body></html>";

        let resp = tool.execute(json!({ "html": html })).await;
        assert!(resp.successful);
        assert_eq!(resp.data["bytesWritten"], html.len());
        assert_eq!(resp.data["url"], "/preview.html");
        assert_eq!(std::fs::read_to_string(dir.join(PREVIEW_FILE)).unwrap(), html);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_execute_reports_io_failure_without_panicking() {
        let dir = test_dir("write_fail");
        let tool = HtmlPreviewTool::new(dir.join("missing").join(PREVIEW_FILE));

        let resp = tool.execute(json!({"html": "<html></html>"})).await;
        assert!(!resp.successful);
        assert!(resp.error.as_deref().unwrap().starts_with("Failed to write"));
        assert!(resp.data["errorMessage"].is_string());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_definition_schema() {
        let def = definition(Path::new("public"));
        let schema = def.schema();
        assert_eq!(schema["function"]["name"], SLUG);
        assert_eq!(schema["function"]["parameters"]["required"][0], "html");
        assert_eq!(schema["function"]["parameters"]["additionalProperties"], false);
    }
}
