// Prints the service's OpenAPI document to stdout
// Usage: cargo run --bin openapi_export > openapi.json

use utoipa::OpenApi;

use httperrors::api::openapi::ApiDoc;

fn main() -> anyhow::Result<()> {
    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}
