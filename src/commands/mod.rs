pub mod completions;
pub mod url;

pub use completions::CompletionsCommand;
pub use url::UrlCommand;
