//! The two seams the harness is agnostic about: how a connection is opened
//! and what one benchmarked call does with it.

use stampede_core::{ConnectError, ExecutionError};
use std::future::Future;

/// Opens, validates and closes connections to the target service.
///
/// The pool drives this trait and nothing else: it never executes queries
/// and never inspects whatever configuration the connector was built from
/// (endpoint, credentials, CA bundle — see
/// [`ConnectionSettings`](stampede_core::ConnectionSettings)).
pub trait Connector: Send + Sync + 'static {
    type Connection: Send + 'static;

    /// Establish a fresh connection.
    fn open(&self) -> impl Future<Output = Result<Self::Connection, ConnectError>> + Send;

    /// Cheap health check for an idle connection about to be reused. A
    /// `false` here causes the pool to close it and open a replacement.
    fn validate(&self, conn: &mut Self::Connection) -> impl Future<Output = bool> + Send;

    /// Tear down a connection that will not be reused.
    fn close(&self, conn: Self::Connection) -> impl Future<Output = ()> + Send;
}

impl<C: Connector> Connector for std::sync::Arc<C> {
    type Connection = C::Connection;

    fn open(&self) -> impl Future<Output = Result<Self::Connection, ConnectError>> + Send {
        (**self).open()
    }

    fn validate(&self, conn: &mut Self::Connection) -> impl Future<Output = bool> + Send {
        (**self).validate(conn)
    }

    fn close(&self, conn: Self::Connection) -> impl Future<Output = ()> + Send {
        (**self).close(conn)
    }
}

/// One opaque, repeatable unit of work; the operation being benchmarked.
///
/// The harness discards any result: the contract is execute-and-discard,
/// e.g. "run a fixed query and drain its result set". A returned error is
/// recorded as a failure and the worker's loop continues.
pub trait WorkUnit<C>: Send + Sync + 'static {
    fn execute(&self, conn: &mut C) -> impl Future<Output = Result<(), ExecutionError>> + Send;
}
