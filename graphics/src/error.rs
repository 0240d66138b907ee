//! Graphics error types.

use lumenwall_core::pool::PoolError;

use crate::backend::BackendError;

/// Errors raised while building or compiling a frame graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The pass dependencies form a cycle.
    #[error("frame graph has a dependency cycle through pass '{pass}'")]
    CyclicDependency {
        /// A pass that is part of the cycle.
        pass: String,
    },
}

/// Errors that can occur in the graphics system.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphicsError {
    /// A resource pool reached its capacity.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// The backend rejected an operation.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// The frame graph could not be compiled.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
