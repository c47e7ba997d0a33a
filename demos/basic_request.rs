//! Basic example performing the same request in all three calling styles.
//!
//! This example shows how to:
//! - Create a client with a default host
//! - Describe a response type and its key decoding strategy
//! - Perform a request with `async`/`await`, as a stream, and with a completion closure
//! - Handle the typed errors
//!
//! Run with: `cargo run --example basic_request`

use courier::{Endpoint, JsonDecoder, NetworkClient, NetworkError, SelfDecodable};
use futures::StreamExt;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
#[serde(rename_all = "camelCase")]
struct Post {
    user_id: u32,
    id: u32,
    title: String,
    body: String,
}

impl SelfDecodable for Post {
    const DECODER: JsonDecoder = JsonDecoder::DEFAULT;
}

#[tokio::main]
async fn main() -> Result<(), NetworkError> {
    tracing_subscriber::fmt()
        .with_env_filter("courier=debug,basic_request=info")
        .init();

    let client = NetworkClient::builder()
        .default_host("jsonplaceholder.typicode.com")
        .build()?;

    let request = client.request(Endpoint::new("/posts/1")).build();

    println!("=== async/await ===");
    let response = client.send::<Post>(&request).await?;
    println!("Title: {}", response.title);
    println!("Status: {}, latency: {:?}", response.status, response.latency);
    println!();

    println!("=== Stream ===");
    let mut stream = client.perform_stream::<Post>(&request);
    while let Some(result) = stream.next().await {
        println!("Streamed: {:?}", result.map(|post| post.id));
    }
    println!();

    println!("=== Completion closure ===");
    let (tx, rx) = tokio::sync::oneshot::channel();
    client.perform_with(&request, move |result: Result<Post, NetworkError>| {
        let _ = tx.send(result);
    });
    match rx.await {
        Ok(Ok(post)) => println!("Completed with post {}", post.id),
        Ok(Err(e)) => println!("Completed with error: {}", e),
        Err(_) => println!("Completion was dropped"),
    }
    println!();

    println!("=== Error handling ===");
    let missing = client.request(Endpoint::new("/posts/does-not-exist")).build();
    match client.perform::<Post>(&missing).await {
        Err(NetworkError::NotFound) => println!("Not found, as expected"),
        Err(e) => println!("Unexpected error: {}", e),
        Ok(post) => println!("Unexpectedly found post {}", post.id),
    }

    Ok(())
}
