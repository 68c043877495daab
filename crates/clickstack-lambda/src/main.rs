// Custom-resource Lambda binary
//
// Build with: cargo build -p clickstack-lambda
//
// The lambda_runtime crate provides the tokio runtime, so we use #[tokio::main]

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    clickstack_lambda::run().await
}
