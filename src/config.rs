use std::path::{Path, PathBuf};

/// Root directory for default input and output paths. Passed explicitly so
/// tests can point the pipeline at a scratch directory instead of sharing
/// process-wide state.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl Default for DataDir {
    fn default() -> Self {
        DataDir { root: "data".into() }
    }
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DataDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stopwords(&self) -> PathBuf {
        self.root.join("stopwords.txt")
    }

    pub fn font(&self) -> PathBuf {
        self.root.join("Vazir.ttf")
    }

    pub fn output(&self, extension: &str) -> PathBuf {
        self.root.join(format!("word_cloud.{extension}"))
    }
}

/// Render settings with documented defaults: 1200x800, white background.
/// A `font_path` left unset resolves to `Vazir.ttf` inside the data
/// directory of the analysis that renders, so a custom data directory
/// carries its font along. `seed` pins the otherwise random layout.
#[derive(Debug, Clone)]
pub struct CloudConfig {
    pub width: u32,
    pub height: u32,
    pub font_path: Option<PathBuf>,
    pub background: String,
    pub seed: Option<u64>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        CloudConfig {
            width: 1200,
            height: 800,
            font_path: None,
            background: "white".to_string(),
            seed: None,
        }
    }
}

impl CloudConfig {
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background = color.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{CloudConfig, DataDir};

    #[test]
    fn data_dir_resolves_default_paths() {
        let dir = DataDir::new("/tmp/run");
        assert_eq!(dir.stopwords(), std::path::Path::new("/tmp/run/stopwords.txt"));
        assert_eq!(dir.output("png"), std::path::Path::new("/tmp/run/word_cloud.png"));
    }

    #[test]
    fn config_defaults_match_documented_values() {
        let config = CloudConfig::default();
        assert_eq!((config.width, config.height), (1200, 800));
        assert_eq!(config.background, "white");
        // Unset: resolved against the rendering analysis's data dir.
        assert!(config.font_path.is_none());
        assert!(config.seed.is_none());
    }

    #[test]
    fn with_font_path_overrides_the_data_dir_default() {
        let config = CloudConfig::default().with_font_path("/fonts/Other.ttf");
        assert_eq!(
            config.font_path.as_deref(),
            Some(std::path::Path::new("/fonts/Other.ttf"))
        );
    }
}
