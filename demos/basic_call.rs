//! Basic example demonstrating layered request configuration.
//!
//! This example shows how to:
//! - Create a dispatcher with a base configuration
//! - Substitute URL placeholders and add query parameters
//! - Send a JSON body
//! - Handle transport failures without error handling at the call site
//!
//! Run with: `cargo run --example basic_call`

use serde_json::json;
use unified_network::{unified_network, RequestConfig};

#[tokio::main]
async fn main() -> Result<(), unified_network::Error> {
    tracing_subscriber::fmt()
        .with_env_filter("unified_network=debug,basic_call=info")
        .init();

    let mut network = unified_network(Some(
        RequestConfig::new()
            .with_base_url("https://jsonplaceholder.typicode.com")
            .with_header("Accept", "application/json"),
    ))?;

    println!("=== GET Request Example ===");
    let response = network
        .get(
            RequestConfig::new()
                .with_url("posts/[id]")
                .with_parameter("id", 1),
        )
        .await;

    println!("Status code: {}", response.status);
    if let Some(post) = response.json() {
        println!("Title: {}", post["title"]);
    }
    println!();

    println!("=== POST Request Example ===");
    network.apply_header("X-Request-Source", Some("basic_call"));
    let response = network
        .post(RequestConfig::new().with_url("posts").with_body(json!({
            "title": "My New Post",
            "body": "This is the content of my new post!",
            "userId": 1,
        })))
        .await;

    println!("Status code: {}", response.status);
    println!("Created: {:?}", response.json());
    println!("Content-Type: {:?}", response.header("content-type"));
    println!();

    println!("=== Query Example ===");
    let response = network
        .get(
            RequestConfig::new()
                .with_url("comments")
                .with_query("postId", 1),
        )
        .await;

    let count = response
        .json()
        .and_then(|comments| comments.as_array())
        .map(|comments| comments.len())
        .unwrap_or(0);
    println!("Comments on post 1: {}", count);
    println!();

    println!("=== Failure Example ===");
    let response = network
        .get(RequestConfig::new().with_base_url("http://127.0.0.1:1"))
        .await;

    println!("Status code: {} (failure: {})", response.status, response.is_failure());

    Ok(())
}
