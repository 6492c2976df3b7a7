// ABOUTME: Built-in tools: provider questions, comparisons, postal code lookup
// ABOUTME: and local file operations, plus the default registry wiring.

mod ask;
mod comparison;
mod file_info;
mod list_files;
mod read_file;
mod search;
mod write_file;
mod zipcode;

pub use ask::{AskBinding, AskTool, bind};
pub use comparison::{ComparisonResult, ComparisonTool, DEFAULT_PROVIDERS, render};
pub use file_info::FileInfoTool;
pub use list_files::ListFilesTool;
pub use read_file::ReadFileTool;
pub use search::SearchFilesTool;
pub use write_file::WriteFileTool;
pub use zipcode::{Address, ZipcodeTool, format_cep, normalize_cep};

use crate::config::Config;
use crate::llm::ProviderKind;
use crate::tool::Registry;

/// Register every built-in tool.
///
/// Provider tools are registered even without credentials and report
/// the missing key when called.
pub fn register_defaults(registry: &mut Registry, config: &Config) {
    registry.register(ZipcodeTool::from_config(config));
    for kind in ProviderKind::ALL {
        registry.register(AskTool::new(kind, config));
    }
    registry.register(ComparisonTool::from_config(config));

    registry.register(ReadFileTool);
    registry.register(WriteFileTool);
    registry.register(ListFilesTool);
    registry.register(SearchFilesTool);
    registry.register(FileInfoTool);
}

/// A registry holding every built-in tool.
pub fn default_tools(config: &Config) -> Registry {
    let mut registry = Registry::new();
    register_defaults(&mut registry, config);
    registry
}
