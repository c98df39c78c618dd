use std::sync::Arc;

use crate::models::{RunResult, SearchTerm, Source};
use crate::querier::DealQuery;

/// Queries every source for every term, one after another.
pub struct Aggregator {
    query: Arc<dyn DealQuery>,
}

impl Aggregator {
    pub fn new(query: Arc<dyn DealQuery>) -> Self {
        Self { query }
    }

    /// Sources outer, terms inner. A failed pair is logged and contributes
    /// nothing; the remaining pairs still run.
    pub async fn run(&self, sources: &[Source], terms: &[SearchTerm]) -> RunResult {
        let mut result = RunResult::default();

        for source in sources {
            for term in terms {
                result.queries_attempted += 1;
                metrics::counter!("dealbot_queries_total", "source" => source.name.clone())
                    .increment(1);

                match self.query.fetch(source, term).await {
                    Ok(deals) => result.deals.extend(deals),
                    Err(e) => {
                        result.queries_failed += 1;
                        metrics::counter!(
                            "dealbot_query_failures_total",
                            "source" => source.name.clone()
                        )
                        .increment(1);
                        tracing::error!("❌ Error querying {} for '{}': {}", source.name, term, e);
                    }
                }
            }
        }

        result
    }
}
