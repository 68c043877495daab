// Custom-resource Lambda entry point
//
// One bootstrap binary serves both handlers; CLICKSTACK_HANDLER selects
// which custom resource this deployment of the function reconciles.
//
// lambda_runtime provides the tokio runtime - we don't bring our own.

use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::info;

mod associate_role;
mod create_schemas;
mod event;

pub use event::{CustomResourceEvent, CustomResourceResponse, RequestType};

/// Which custom resource this function instance serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandlerKind {
    AssociateWarehouseRole,
    CreateSchemas,
}

impl HandlerKind {
    /// Read from CLICKSTACK_HANDLER; the role association handler is the
    /// default for backwards compatibility with earlier templates.
    fn from_env() -> Result<Self, Error> {
        match std::env::var("CLICKSTACK_HANDLER").as_deref() {
            Ok("associate-warehouse-role") | Err(_) => Ok(Self::AssociateWarehouseRole),
            Ok("create-schemas") => Ok(Self::CreateSchemas),
            Ok(other) => Err(Error::from(format!("unknown CLICKSTACK_HANDLER: {other}"))),
        }
    }
}

/// Lambda runtime entry point
pub async fn run() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .init();

    let handler = HandlerKind::from_env()?;
    info!("starting custom-resource handler: {handler:?}");
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<CustomResourceEvent>| {
            let sdk_config = sdk_config.clone();
            async move {
                let (event, _context) = event.into_parts();
                let response = match handler {
                    HandlerKind::AssociateWarehouseRole => {
                        associate_role::handle(event, &sdk_config).await?
                    }
                    HandlerKind::CreateSchemas => create_schemas::handle(event).await?,
                };
                Ok::<CustomResourceResponse, Error>(response)
            }
        },
    ))
    .await
}
