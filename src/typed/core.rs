use crate::dispatcher::{HandlerError, HandlerFn};
use crate::schema::{EndpointBuilder, EndpointDescriptor, SchemaError};
use crate::validator::ValidatedArgs;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

/// Handler that receives a typed request built from validated arguments.
///
/// Conversion runs only after validation succeeded, so a conversion failure
/// means the declaration and the request type disagree. It is answered with
/// 500, never 422.
pub trait Handler: Send + Sync + 'static {
    type Request: TryFrom<ValidatedArgs, Error = anyhow::Error> + Send + 'static;
    type Response: Serialize + Send + 'static;

    /// # Errors
    ///
    /// A [`HandlerError`] is sent back as `{"detail": ...}` with its status.
    fn handle(&self, req: Self::Request) -> Result<Self::Response, HandlerError>;
}

/// Erase a typed handler into the closure form stored on a descriptor.
pub fn into_handler_fn<H: Handler>(handler: H) -> HandlerFn {
    let handler = Arc::new(handler);
    Arc::new(move |args: ValidatedArgs| {
        let request = H::Request::try_from(args).map_err(|e| {
            error!(
                request_type = std::any::type_name::<H::Request>(),
                error = %e,
                "Validated arguments did not convert to the handler's request type"
            );
            HandlerError::internal("Internal Server Error")
        })?;
        let response = handler.handle(request)?;
        serde_json::to_value(response).map_err(|e| {
            error!(error = %e, "Failed to serialize handler response");
            HandlerError::internal("Internal Server Error")
        })
    })
}

impl EndpointBuilder {
    /// Finish with a typed handler.
    ///
    /// # Errors
    ///
    /// Returns every schema issue found in the declaration.
    pub fn typed<H: Handler>(self, handler: H) -> Result<EndpointDescriptor, SchemaError> {
        self.handler_fn(into_handler_fn(handler))
    }
}

/// Implement `TryFrom<ValidatedArgs>` for a `Deserialize` struct whose
/// fields are named after the endpoint's parameters.
#[macro_export]
macro_rules! impl_from_args {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ::std::convert::TryFrom<$crate::validator::ValidatedArgs> for $ty {
                type Error = ::anyhow::Error;

                fn try_from(args: $crate::validator::ValidatedArgs) -> ::anyhow::Result<Self> {
                    args.deserialize()
                }
            }
        )+
    };
}
