//! List documents command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_documents(config: &Config, min_score: Option<f64>) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let documents = match min_score {
        Some(threshold) => {
            let total = store.document_count().await?;
            store.top_documents(threshold, total).await?
        }
        None => store.list_documents().await?,
    };

    if documents.is_empty() {
        println!("No documents stored.");
        println!();
        println!("Add some with: docsearch seed  or  docsearch ingest");
        return Ok(());
    }

    println!("Documents ({} total)", documents.len());
    println!("{:-<70}", "");

    for doc in documents {
        println!("[{:>5}] {:.2}  {}", doc.id, doc.score, doc.content);
    }

    Ok(())
}
