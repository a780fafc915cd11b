//! OpenAPI Specification Generator Binary
//!
//! Prints the CyberDash OpenAPI documentification as JSON to stdout.
//!
//! Usage:
//!   cargo run -p cyberdash-api --bin generate-openapi > openapi.json

use cyberdash_api::ApiDoc;

fn main() {
    match ApiDoc::to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI document: {}", e);
            std::process::exit(1);
        }
    }
}
