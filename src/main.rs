use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use chat_wcloud::{ChatAnalysis, CloudConfig, DataDir, Result};

/// Runs the whole pipeline against the default data directory:
/// `data/result.json` in, `data/word_cloud.png` out.
fn run() -> Result<String> {
    let data_dir = DataDir::default();
    let chat_path = data_dir.root().join("result.json");

    let analysis = ChatAnalysis::default().with_data_dir(data_dir);

    let corpus = analysis.build_corpus(&chat_path)?;
    let image = analysis.generate_wordcloud(&corpus, &CloudConfig::default())?;

    analysis.save_wordcloud(&image, None, "png")
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
