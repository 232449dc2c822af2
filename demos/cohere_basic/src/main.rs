use synaptic_cohere::{
    CohereEmbeddings, CohereEmbeddingsConfig, CohereLlm, CohereLlmConfig, CohereReranker,
    CohereRerankerConfig, Document,
};
use synaptic_core::{Embeddings, Llm, SynapticError};

#[tokio::main]
async fn main() -> Result<(), SynapticError> {
    // RUST_LOG=debug shows the outgoing Cohere requests.
    tracing_subscriber::fmt::init();

    // All three configs read COHERE_API_KEY.
    let llm_config = CohereLlmConfig::from_env()?
        .with_max_tokens(40)
        .with_temperature(0.3);
    println!("API key: {}", llm_config.api_key);
    println!("Generation params: {:?}", llm_config.default_params());

    // --- Completion ---
    println!("\n=== Generate ===");
    let llm = CohereLlm::new(llm_config);
    let text = llm.invoke("Describe Rust in one sentence:").await?;
    println!("{}", text.trim());

    // --- Embeddings ---
    println!("\n=== Embed ===");
    let embeddings = CohereEmbeddings::new(CohereEmbeddingsConfig::from_env()?);
    let vectors = embeddings
        .embed_documents(&["ownership and borrowing", "garbage collection"])
        .await?;
    for (i, v) in vectors.iter().enumerate() {
        println!("doc {i}: {} dims", v.len());
    }

    // --- Rerank ---
    println!("\n=== Rerank ===");
    let reranker = CohereReranker::new(CohereRerankerConfig::from_env()?.with_top_n(2));
    let docs = vec![
        Document::new("1", "Python is great for data science"),
        Document::new("2", "Rust is a systems programming language"),
        Document::new("3", "JavaScript runs in the browser"),
    ];
    for doc in reranker.rerank("systems programming", docs, None).await? {
        println!(
            "[{}] {} (score {})",
            doc.id, doc.content, doc.metadata["relevance_score"]
        );
    }

    Ok(())
}
