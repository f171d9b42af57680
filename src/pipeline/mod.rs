pub mod error;
pub mod extractor;
pub mod invoker;
pub mod result;
pub mod subprocess;

use std::path::Path;

use async_trait::async_trait;

pub use error::PipelineError;
pub use extractor::extract_result;
pub use invoker::{ProcessInvocation, ProcessOutcome};
pub use result::TranslationResult;
pub use subprocess::SubprocessPipeline;

/// A translation backend: media file plus target language in, script
/// result out. The local subprocess is one implementation; the relay only
/// sees this trait.
#[async_trait]
pub trait TranslationPipeline: Send + Sync {
    async fn translate(
        &self,
        input_path: &Path,
        target_lang: &str,
    ) -> Result<TranslationResult, PipelineError>;
}
