use std::{fs, path::PathBuf};

use ab_glyph::{point, FontVec, Point, PxScale};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use nanorand::{Rng, WyRand};
use palette::{Hsl, IntoColor, Pixel, Srgb};
use snafu::ensure;
use tracing::debug;

use error::RenderSnafu;
use sat::Rect;

pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod normalize;
pub mod tokenizer;

mod sat;
mod text;

pub use analysis::{ChatAnalysis, Corpus};
pub use config::{CloudConfig, DataDir};
pub use error::{Error, Result};
pub use normalize::Normalizer;
pub use text::GlyphData;
pub use tokenizer::WordTokenizer;

/// A word with its final layout, handed to the color function.
pub struct Word<'a> {
    pub text: &'a str,
    pub font: &'a FontVec,
    pub font_size: PxScale,
    pub glyphs: GlyphData,
    pub rotated: bool,
    pub position: Point,
    pub frequency: f32,
    pub index: usize,
}

pub enum WordCloudSize {
    FromDimensions { width: u32, height: u32 },
}

/// Lays out a corpus as a word cloud: the most frequent words get the
/// largest font sizes, positions come from a free-space search over a
/// summed-area table. Layout is random unless `rng_seed` is set.
pub struct WordCloud {
    tokenizer: WordTokenizer,
    background_color: Rgba<u8>,
    pub font: FontVec,
    min_font_size: f32,
    max_font_size: Option<f32>,
    font_step: f32,
    word_margin: u32,
    word_rotate_chance: f64,
    relative_font_scaling: f32,
    rng_seed: Option<u64>,
}

impl WordCloud {
    pub fn new(font: FontVec) -> Self {
        WordCloud {
            tokenizer: WordTokenizer::default(),
            background_color: Rgba([255, 255, 255, 255]),
            font,
            min_font_size: 4.0,
            max_font_size: None,
            font_step: 1.0,
            word_margin: 2,
            word_rotate_chance: 0.10,
            relative_font_scaling: 0.5,
            rng_seed: None,
        }
    }

    /// Loads the font from disk. An unreadable or unparsable font is a
    /// render failure, not an input-file failure.
    pub fn from_font_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let font_file = fs::read(&path).map_err(|source| {
            RenderSnafu {
                reason: format!("unable to read font file {path:?}: {source}"),
            }
            .build()
        })?;

        let font = FontVec::try_from_vec(font_file).map_err(|source| {
            RenderSnafu {
                reason: format!("invalid font file {path:?}: {source}"),
            }
            .build()
        })?;

        Ok(WordCloud::new(font))
    }

    pub fn with_tokenizer(mut self, value: WordTokenizer) -> Self {
        self.tokenizer = value;
        self
    }

    pub fn with_background_color(mut self, value: Rgba<u8>) -> Self {
        self.background_color = value;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_word_margin(mut self, value: u32) -> Self {
        self.word_margin = value;
        self
    }

    pub fn with_min_font_size(mut self, value: f32) -> Self {
        self.min_font_size = value;
        self
    }

    pub fn with_max_font_size(mut self, value: f32) -> Self {
        self.max_font_size = Some(value);
        self
    }

    pub fn with_word_rotate_chance(mut self, value: f64) -> Self {
        self.word_rotate_chance = value;
        self
    }

    fn generate_from_word_positions(
        rng: &mut WyRand,
        width: u32,
        height: u32,
        word_positions: Vec<Word>,
        scale: f32,
        background_color: Rgba<u8>,
        color_func: fn(&Word, &mut WyRand) -> Rgba<u8>,
    ) -> RgbaImage {
        let mut final_image_buffer = RgbaImage::from_pixel(
            (width as f32 * scale) as u32,
            (height as f32 * scale) as u32,
            background_color,
        );

        for mut word in word_positions {
            let col = color_func(&word, rng);

            if scale != 1.0 {
                word.font_size = PxScale::from(word.font_size.x * scale);
                word.position = point(word.position.x * scale, word.position.y * scale);
                word.glyphs = text::text_to_glyphs(word.text, word.font, word.font_size);
            }

            text::draw_glyphs_to_rgba_buffer(
                &mut final_image_buffer,
                word.glyphs,
                word.font,
                word.position,
                word.rotated,
                col,
            )
        }

        final_image_buffer
    }

    pub fn generate_from_text(
        &self,
        text: &str,
        size: WordCloudSize,
        scale: f32,
    ) -> Result<RgbaImage> {
        self.generate_from_text_with_color_func(text, size, scale, random_color_rgba)
    }

    pub fn generate_from_text_with_color_func(
        &self,
        text: &str,
        size: WordCloudSize,
        scale: f32,
        color_func: fn(&Word, &mut WyRand) -> Rgba<u8>,
    ) -> Result<RgbaImage> {
        let words = self.tokenizer.get_normalized_word_frequencies(text);
        self.generate_from_frequencies_with_color_func(&words, size, scale, color_func)
    }

    pub fn generate_from_frequencies(
        &self,
        words: &[(&str, f32)],
        size: WordCloudSize,
        scale: f32,
    ) -> Result<RgbaImage> {
        self.generate_from_frequencies_with_color_func(words, size, scale, random_color_rgba)
    }

    /// Lays out pre-counted frequencies. Callers that tokenized the corpus
    /// themselves go through here so the rendered counts come from the
    /// same tokenizer that shaped the corpus.
    pub fn generate_from_frequencies_with_color_func(
        &self,
        words: &[(&str, f32)],
        size: WordCloudSize,
        scale: f32,
        color_func: fn(&Word, &mut WyRand) -> Rgba<u8>,
    ) -> Result<RgbaImage> {
        ensure!(
            !words.is_empty(),
            RenderSnafu {
                reason: "the corpus is empty, no words survived filtering".to_string(),
            }
        );
        debug!(distinct_words = words.len(), "counted word frequencies");

        let (mut summed_area_table, mut gray_buffer) = match size {
            WordCloudSize::FromDimensions { width, height } => {
                let buf = GrayImage::from_pixel(width, height, Luma([0]));
                let summed_area_table = buf.as_raw().iter().map(|e| *e as u32).collect::<Vec<_>>();

                (summed_area_table, buf)
            }
        };

        let mut rng = match self.rng_seed {
            Some(seed) => WyRand::new_seed(seed),
            None => WyRand::new(),
        };

        // The first (most frequent) word's aspect ratio picks the starting
        // font size; every later word scales down from there.
        let first_word = &words[0];
        let mut font_size = {
            let rect_at_image_height = self.text_dimensions_at_font_size(
                first_word.0,
                PxScale::from(gray_buffer.height() as f32 * 0.95),
            );

            let height_ratio =
                rect_at_image_height.height as f32 / rect_at_image_height.width.max(1) as f32;

            (gray_buffer.width() as f32 * height_ratio).min(gray_buffer.height() as f32 * 0.95)
        };

        if let Some(max_font_size) = self.max_font_size {
            font_size = font_size.min(max_font_size);
        }

        let mut final_words = Vec::with_capacity(words.len());
        let mut last_freq = 1.0;

        'words: for (index, (word, freq)) in words.iter().enumerate() {
            if self.relative_font_scaling != 0.0 {
                font_size *= (freq / last_freq).powf(self.relative_font_scaling);
            }

            if font_size < self.min_font_size {
                break;
            }

            let rotated = self.word_rotate_chance > 0.0
                && (rng.generate_range(0u32..100) as f64) < self.word_rotate_chance * 100.0;

            // Shrink until the word fits somewhere; give up once the step
            // crosses the minimum size.
            let (glyphs, position) = loop {
                let glyphs = text::text_to_glyphs(word, &self.font, PxScale::from(font_size));
                let rect = if rotated {
                    Rect {
                        width: glyphs.height + self.word_margin,
                        height: glyphs.width + self.word_margin,
                    }
                } else {
                    Rect {
                        width: glyphs.width + self.word_margin,
                        height: glyphs.height + self.word_margin,
                    }
                };

                if let Some(found) = sat::find_space_for_rect(
                    &summed_area_table,
                    gray_buffer.width(),
                    gray_buffer.height(),
                    &rect,
                    &mut rng,
                ) {
                    let half_margin = self.word_margin as f32 / 2.0;
                    break (
                        glyphs,
                        point(found.x as f32 + half_margin, found.y as f32 + half_margin),
                    );
                }

                font_size -= self.font_step;
                if font_size < self.min_font_size {
                    debug!(%word, placed = final_words.len(), "ran out of space");
                    break 'words;
                }
            };

            text::draw_glyphs_to_gray_buffer(
                &mut gray_buffer,
                glyphs.clone(),
                &self.font,
                position,
                rotated,
            );
            sat::refresh_from_buffer(&mut summed_area_table, &gray_buffer, position.y as usize);

            final_words.push(Word {
                text: word,
                font: &self.font,
                font_size: PxScale::from(font_size),
                glyphs,
                rotated,
                position,
                frequency: *freq,
                index,
            });
            last_freq = *freq;
        }

        ensure!(
            !final_words.is_empty(),
            RenderSnafu {
                reason: "no word fits the requested dimensions".to_string(),
            }
        );
        debug!(placed = final_words.len(), "layout complete");

        Ok(WordCloud::generate_from_word_positions(
            &mut rng,
            gray_buffer.width(),
            gray_buffer.height(),
            final_words,
            scale,
            self.background_color,
            color_func,
        ))
    }

    fn text_dimensions_at_font_size(&self, text: &str, font_size: PxScale) -> Rect {
        let glyphs = text::text_to_glyphs(text, &self.font, font_size);
        Rect {
            width: glyphs.width + self.word_margin,
            height: glyphs.height + self.word_margin,
        }
    }
}

fn random_color_rgba(_: &Word, rng: &mut WyRand) -> Rgba<u8> {
    let hue: u8 = rng.generate_range(0..255);

    let col = Hsl::new(hue as f32, 1.0, 0.5);
    let rgb: Srgb = col.into_color();

    let raw: [u8; 3] = rgb.into_format().into_raw();

    Rgba([raw[0], raw[1], raw[2], 1])
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::{Error, WordCloud, WordCloudSize};

    const FIXTURE_FONT: &str = "tests/fixtures/DejaVuSans.ttf";

    fn fixture_cloud() -> WordCloud {
        WordCloud::from_font_path(FIXTURE_FONT).unwrap()
    }

    #[test]
    fn missing_font_is_a_render_error() {
        assert!(matches!(
            WordCloud::from_font_path("no/such/font.ttf"),
            Err(Error::Render { .. })
        ));
    }

    #[test]
    fn garbage_font_bytes_are_a_render_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"definitely not a font").unwrap();

        assert!(matches!(
            WordCloud::from_font_path(file.path()),
            Err(Error::Render { .. })
        ));
    }

    #[test]
    fn rendered_cloud_matches_requested_dimensions_and_places_words() {
        let cloud = fixture_cloud().with_rng_seed(42);
        let size = WordCloudSize::FromDimensions {
            width: 400,
            height: 200,
        };

        let image = cloud
            .generate_from_text("hello hello world", size, 1.0)
            .unwrap();

        assert_eq!(image.dimensions(), (400, 200));
        // The white canvas must carry ink somewhere.
        assert!(image
            .pixels()
            .any(|px| px != &Rgba([255u8, 255, 255, 255])));
    }

    #[test]
    fn seeded_layout_is_reproducible() {
        let cloud = fixture_cloud().with_rng_seed(99);
        let size = || WordCloudSize::FromDimensions {
            width: 320,
            height: 160,
        };

        let first = cloud
            .generate_from_text("alpha beta beta gamma", size(), 1.0)
            .unwrap();
        let second = cloud
            .generate_from_text("alpha beta beta gamma", size(), 1.0)
            .unwrap();

        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn scale_multiplies_output_dimensions() {
        let cloud = fixture_cloud().with_rng_seed(5);
        let size = WordCloudSize::FromDimensions {
            width: 200,
            height: 100,
        };

        let image = cloud.generate_from_text("one two two", size, 2.0).unwrap();
        assert_eq!(image.dimensions(), (400, 200));
    }

    #[test]
    fn empty_frequency_list_is_a_render_error() {
        let cloud = fixture_cloud();
        let size = WordCloudSize::FromDimensions {
            width: 100,
            height: 100,
        };

        assert!(matches!(
            cloud.generate_from_frequencies(&[], size, 1.0),
            Err(Error::Render { .. })
        ));
    }
}
