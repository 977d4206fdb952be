pub mod client;
pub mod models;

use models::{ProviderError, ProviderResponse, TemplateParams};
use std::future::Future;

/// Narrow port to the transactional email provider.
pub trait EmailProvider {
    fn send(
        &self,
        template_id: &str,
        params: &TemplateParams,
    ) -> impl Future<Output = Result<ProviderResponse, ProviderError>> + Send;
}
