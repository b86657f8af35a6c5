//! [`Handler`] abstractions.

use std::future::Future;

/// Executor of an operation described by its `Args`.
///
/// Every collaborator seam (database, search index, query, command) is
/// addressed through this single abstraction.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
