use tracing::debug;

use crate::error::{Result, TagMeshError};
use crate::graph::GraphSupport;
use crate::models::{GraphOptions, TagGraph};

use super::TagMesh;

impl TagMesh {
    /// Co-occurrence graph snapshot. Repeated calls with equal options reuse the cached
    /// accumulation under the read lock; anything else rebuilds under the write lock.
    pub fn get_graph(&self, options: &GraphOptions) -> Result<TagGraph> {
        {
            let state = self.read_state()?;
            let GraphSupport::Enabled(builder) = &state.graph else {
                return Err(TagMeshError::GraphUnavailable);
            };
            if let Some(graph) = builder.cached_snapshot(state.index.as_ref(), &state.cache, options)
            {
                debug!(edges = graph.edges.len(), "graph served from cached accumulation");
                return Ok(graph);
            }
        }

        let mut guard = self.write_state()?;
        let state = &mut *guard;
        let Some(builder) = state.graph.builder_mut() else {
            return Err(TagMeshError::GraphUnavailable);
        };
        Ok(builder.build(state.index.as_ref(), &state.cache, options))
    }
}
