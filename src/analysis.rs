use std::{collections::HashMap, path::Path};

use image::{Rgba, RgbaImage};
use snafu::{ensure, ResultExt};
use tracing::{debug, info};

use crate::{
    config::{CloudConfig, DataDir},
    error::{RenderSnafu, Result, WriteSnafu},
    export,
    filter::{load_stopwords, TokenFilter},
    normalize::Normalizer,
    tokenizer::WordTokenizer,
    WordCloud, WordCloudSize,
};

/// The filtered, substituted vocabulary of a whole chat, space-joined.
/// Built once per run and consumed by the renderer.
#[derive(Debug, Clone)]
pub struct Corpus(String);

impl Corpus {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One-shot chat analysis: parse an exported transcript, reduce it to a
/// corpus of surviving tokens and render the corpus as a word cloud.
///
/// ```no_run
/// use chat_wcloud::{ChatAnalysis, CloudConfig};
///
/// # fn main() -> chat_wcloud::Result<()> {
/// let analysis = ChatAnalysis::default();
/// let corpus = analysis.build_corpus("data/result.json".as_ref())?;
/// let image = analysis.generate_wordcloud(&corpus, &CloudConfig::default())?;
/// println!("{}", analysis.save_wordcloud(&image, None, "png")?);
/// # Ok(())
/// # }
/// ```
pub struct ChatAnalysis {
    normalizer: Normalizer,
    tokenizer: WordTokenizer,
    alternatives: HashMap<String, String>,
    stopwords_path: Option<std::path::PathBuf>,
    data_dir: DataDir,
}

impl Default for ChatAnalysis {
    fn default() -> Self {
        ChatAnalysis {
            normalizer: Normalizer::default(),
            tokenizer: WordTokenizer::default(),
            alternatives: HashMap::new(),
            stopwords_path: None,
            data_dir: DataDir::default(),
        }
    }
}

impl ChatAnalysis {
    pub fn with_data_dir(mut self, value: DataDir) -> Self {
        self.data_dir = value;
        self
    }

    pub fn with_tokenizer(mut self, value: WordTokenizer) -> Self {
        self.tokenizer = value;
        self
    }

    /// Overrides the default `<data dir>/stopwords.txt`.
    pub fn with_stopwords_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.stopwords_path = Some(path.into());
        self
    }

    /// Alternative spellings rewritten to a canonical form after stopword
    /// filtering. Keys must be pre-normalized to match tokens.
    pub fn with_alternatives(mut self, value: HashMap<String, String>) -> Self {
        self.alternatives = value;
        self
    }

    /// Loads the export and the stopword list, then runs every message
    /// through normalize → tokenize → filter → substitute and joins the
    /// survivors. Messages whose `text` is not a plain string are skipped;
    /// messages with no surviving tokens contribute nothing.
    pub fn build_corpus(&self, chat_path: &Path) -> Result<Corpus> {
        let export = export::load_export(chat_path)?;
        debug!(messages = export.messages.len(), "parsed chat export");

        let stopwords_path = self
            .stopwords_path
            .clone()
            .unwrap_or_else(|| self.data_dir.stopwords());
        let stopwords = load_stopwords(&stopwords_path, &self.normalizer, &self.tokenizer)?;
        debug!(stopwords = stopwords.len(), "loaded stopword set");

        let filter = TokenFilter::new(stopwords, self.alternatives.clone());

        let mut corpus = String::new();
        for message in &export.messages {
            let Some(raw) = message.text() else { continue };

            let normalized = self.normalizer.normalize(raw);
            let tokens = self.tokenizer.tokenize(&normalized);
            let kept = filter.apply(tokens);

            if kept.is_empty() {
                continue;
            }

            // Each contributing message adds a leading space.
            corpus.push(' ');
            corpus.push_str(&kept.join(" "));
        }

        debug!(corpus_bytes = corpus.len(), "aggregated corpus");
        Ok(Corpus(corpus))
    }

    /// Renders the corpus with the given settings. Fails before touching
    /// the font when nothing survived filtering.
    pub fn generate_wordcloud(&self, corpus: &Corpus, config: &CloudConfig) -> Result<RgbaImage> {
        ensure!(
            !corpus.is_empty(),
            RenderSnafu {
                reason: "the corpus is empty, no words survived filtering".to_string(),
            }
        );

        let background = parse_background(&config.background)?;

        let font_path = config
            .font_path
            .clone()
            .unwrap_or_else(|| self.data_dir.font());

        let mut cloud = WordCloud::from_font_path(font_path)?.with_background_color(background);
        if let Some(seed) = config.seed {
            cloud = cloud.with_rng_seed(seed);
        }

        let size = WordCloudSize::FromDimensions {
            width: config.width,
            height: config.height,
        };

        // Frequencies come from the same tokenizer that shaped the corpus,
        // so dictionary words and token rules hold through rendering.
        let words = self
            .tokenizer
            .get_normalized_word_frequencies(corpus.as_str());

        cloud.generate_from_frequencies(&words, size, 1.0)
    }

    /// Encodes the image in the format implied by the extension and writes
    /// it out. Default destination: `<data dir>/word_cloud.<extension>`.
    /// Returns a confirmation message with the resolved path.
    pub fn save_wordcloud(
        &self,
        image: &RgbaImage,
        save_path: Option<&Path>,
        extension: &str,
    ) -> Result<String> {
        let path = match save_path {
            Some(path) => path.to_path_buf(),
            None => self.data_dir.output(extension),
        };

        image.save(&path).context(WriteSnafu { path: &path })?;

        info!(path = %path.display(), "word cloud saved");
        Ok(format!("wordcloud image saved in: {}", path.display()))
    }
}

fn parse_background(color: &str) -> Result<Rgba<u8>> {
    let parsed = csscolorparser::parse(color).map_err(|source| {
        RenderSnafu {
            reason: format!("invalid background color {color:?}: {source}"),
        }
        .build()
    })?;

    Ok(Rgba(parsed.to_rgba8()))
}
