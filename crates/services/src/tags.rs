use std::sync::Arc;

use domains::{GraphExecutor, GraphValue, Result, Statement};
use tracing::instrument;

pub struct TagService {
    graph: Arc<dyn GraphExecutor>,
}

impl TagService {
    pub fn new(graph: Arc<dyn GraphExecutor>) -> Self {
        Self { graph }
    }

    /// Every tag name, ascending.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<String>> {
        let statement = Statement::new("MATCH (t:Tag) RETURN t.name AS name ORDER BY name ASC");
        Ok(self
            .graph
            .read(statement)
            .await?
            .into_records()
            .filter_map(|record| record.into_value("name").into_string())
            .collect())
    }
}

/// `{tags: [...]}`
pub fn projection(tags: Vec<String>) -> GraphValue {
    GraphValue::map([("tags", GraphValue::from(tags))])
}
