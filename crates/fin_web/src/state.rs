use std::sync::Arc;
use fin_gateway::RequestGateway;
use fin_news::NewsCache;
use fin_parsers::FormatRegistry;

pub struct AppState {
    pub gateway: Arc<RequestGateway>,
    pub news: Arc<NewsCache>,
    pub registry: FormatRegistry,
}
