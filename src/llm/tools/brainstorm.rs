//! Brainstorm document tools.
//!
//! A [`BrainstormDocument`] is the session-scoped accumulator of the brainstormer agent.
//! [`UpdateTool`] appends entries to it and [`SaveTool`] writes it to a `.txt` file. Both
//! tools hold a handle to the same document, so two brainstormer sessions never share
//! content.

use crate::error::{Result, ToolchatError};
use crate::llm::tools::{parse_args, LlmTool, ToolDescriptor, ToolOutput};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// Shared, session-local brainstorming content
#[derive(Debug, Clone, Default)]
pub struct BrainstormDocument {
    content: Arc<Mutex<String>>,
}

impl BrainstormDocument {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, String>> {
        self.content
            .lock()
            .map_err(|_| ToolchatError::ToolError("brainstorm document is poisoned".to_string()))
    }

    /// Append an entry on its own line and return the whole document
    pub fn append(&self, entry: &str) -> Result<String> {
        let mut content = self.lock()?;
        content.push('\n');
        content.push_str(entry);
        Ok(content.clone())
    }

    pub fn content(&self) -> Result<String> {
        Ok(self.lock()?.clone())
    }

    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

/// Append `.txt` unless the name already ends with it
pub fn with_txt_extension(filename: &str) -> String {
    if filename.ends_with(".txt") {
        filename.to_string()
    } else {
        format!("{}.txt", filename)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateArgs {
    /// The content to update the Brainstorming with.
    pub content: String,
}

/// Appends ideas to the brainstorm document
pub struct UpdateTool {
    document: BrainstormDocument,
}

impl UpdateTool {
    pub fn new(document: BrainstormDocument) -> Self {
        Self { document }
    }
}

impl LlmTool for UpdateTool {
    fn run(&self, args: &HashMap<String, Value>) -> Result<ToolOutput> {
        let UpdateArgs { content } = parse_args(args)?;
        let updated = self.document.append(&content)?;
        Ok(ToolOutput::new(json!(updated)))
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function::<UpdateArgs>(
            "update",
            "Updates the Brainstorming content with the provided string. Returns the updated Brainstorming content.",
        )
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SaveArgs {
    /// The name of the document to save the Brainstorming content to.
    pub filename: String,
    /// Clear the Brainstorming content after it has been saved.
    #[serde(default)]
    pub clear: Option<bool>,
}

/// Writes the brainstorm document to a text file
///
/// A successful save completes the brainstorming session. Write failures are reported
/// back to the model as text and leave the session running.
pub struct SaveTool {
    document: BrainstormDocument,
    directory: Option<PathBuf>,
}

impl SaveTool {
    pub fn new(document: BrainstormDocument) -> Self {
        Self {
            document,
            directory: None,
        }
    }

    /// Resolve relative filenames against `directory` instead of the working directory
    pub fn in_directory(mut self, directory: impl AsRef<Path>) -> Self {
        self.directory = Some(directory.as_ref().to_path_buf());
        self
    }

    fn target(&self, filename: &str) -> PathBuf {
        match &self.directory {
            Some(dir) => dir.join(filename),
            None => PathBuf::from(filename),
        }
    }
}

impl LlmTool for SaveTool {
    fn run(&self, args: &HashMap<String, Value>) -> Result<ToolOutput> {
        let SaveArgs { filename, clear } = parse_args(args)?;
        let filename = with_txt_extension(&filename);
        let content = self.document.content()?;

        match std::fs::write(self.target(&filename), content) {
            Ok(()) => {
                info!("Brainstorm document saved to {}", filename);
                if clear.unwrap_or(false) {
                    self.document.clear()?;
                }
                Ok(ToolOutput::completing(json!(format!(
                    "Brainstorming content saved to {}.",
                    filename
                ))))
            }
            Err(e) => {
                warn!("Failed to save brainstorm document to {}: {}", filename, e);
                Ok(ToolOutput::new(json!(format!(
                    "Error saving Brainstorming content to {}: {}",
                    filename, e
                ))))
            }
        }
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function::<SaveArgs>(
            "save",
            "Saves the current Brainstorming content to a document file. Returns a message indicating that the document has been saved.",
        )
    }
}

/// The `update` and `save` tools, sharing one document
///
/// Saves land in `save_directory` when given, otherwise in the working directory.
pub fn all_tools(
    document: &BrainstormDocument,
    save_directory: Option<&Path>,
) -> Vec<Box<dyn LlmTool>> {
    let mut save = SaveTool::new(document.clone());
    if let Some(dir) = save_directory {
        save = save.in_directory(dir);
    }
    vec![Box::new(UpdateTool::new(document.clone())), Box::new(save)]
}
