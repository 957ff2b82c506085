use std::collections::{HashMap, HashSet};

use jieba_rs::Jieba;
use regex::Regex;

/// Splits normalized text into word tokens.
///
/// Words are matched by a Unicode word-boundary regex; runs that contain
/// CJK characters are further segmented with jieba so mixed-language chats
/// count Chinese words individually. Tokenization is eager: the whole text
/// is consumed up front and no token is empty.
pub struct WordTokenizer {
    regex: Regex,
    pub jieba: Jieba,
    pub filter: HashSet<String>,
    pub min_word_length: usize,
    pub exclude_numbers: bool,
    pub max_words: usize,
}

impl Default for WordTokenizer {
    fn default() -> Self {
        let regex = Regex::new("\\w[\\w']*").expect("Unable to compile tokenization regex");

        WordTokenizer {
            regex,
            jieba: Jieba::new(),
            filter: Default::default(),
            min_word_length: 0,
            exclude_numbers: true,
            max_words: 200,
        }
    }
}

fn contains_cjk(word: &str) -> bool {
    word.chars()
        .any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

impl<'a> WordTokenizer {
    pub fn with_word(mut self, word: &str) -> Self {
        self.jieba.add_word(word, None, None);
        self
    }

    pub fn with_min_word_length(mut self, size: usize) -> Self {
        self.min_word_length = size;
        self
    }

    pub fn with_max_words(mut self, size: usize) -> Self {
        self.max_words = size;
        self
    }

    pub fn with_filter(mut self, value: &[&str]) -> Self {
        self.filter = value.iter().map(|el| el.to_lowercase()).collect();

        self
    }

    pub fn with_exclude_numbers(mut self, value: bool) -> Self {
        self.exclude_numbers = value;
        self
    }

    pub fn tokenize(&'a self, text: &'a str) -> Vec<&'a str> {
        let mut tokens: Vec<&str> = self
            .regex
            .find_iter(text)
            .map(|mat| mat.as_str())
            .flat_map(|word| {
                if contains_cjk(word) {
                    self.jieba.cut(word, false)
                } else {
                    vec![word]
                }
            })
            .filter(|word| !word.trim().is_empty())
            .collect();

        if self.min_word_length > 0 {
            tokens.retain(|word| word.chars().count() >= self.min_word_length);
        }

        if self.exclude_numbers {
            tokens.retain(|word| !word.chars().all(char::is_numeric));
        }

        if !self.filter.is_empty() {
            tokens.retain(|word| !self.filter.contains(&word.to_lowercase()));
        }

        tokens
    }

    pub fn get_word_frequencies(&'a self, text: &'a str) -> HashMap<&'a str, usize> {
        let mut frequencies = HashMap::new();

        for word in self.tokenize(text) {
            let entry = frequencies.entry(word).or_insert(0);
            *entry += 1;
        }

        Self::keep_common_case(&frequencies)
    }

    fn keep_common_case(map: &HashMap<&'a str, usize>) -> HashMap<&'a str, usize> {
        type CaseCounts<'a> = HashMap<&'a str, usize>;

        let mut common_cases = HashMap::<String, CaseCounts>::new();
        for (key, val) in map {
            common_cases
                .entry(key.to_lowercase())
                .or_default()
                .insert(key, *val);
        }

        common_cases
            .values()
            .map(|val| {
                let mut most_common_case: Vec<(&str, usize)> = val
                    .iter()
                    .map(|(case_key, case_val)| (*case_key, *case_val))
                    .collect();

                most_common_case.sort_by(|a, b| {
                    if a.1 != b.1 {
                        (b.1).partial_cmp(&a.1).unwrap()
                    } else {
                        (b.0).partial_cmp(a.0).unwrap()
                    }
                });

                let occurrence_sum = val.values().sum();

                (most_common_case.first().unwrap().0, occurrence_sum)
            })
            .collect()
    }

    /// Frequencies scaled to the most frequent word, sorted descending with
    /// lexicographic tie-breaking, truncated to `max_words`.
    pub fn get_normalized_word_frequencies(&'a self, text: &'a str) -> Vec<(&'a str, f32)> {
        let frequencies = self.get_word_frequencies(text);

        if frequencies.is_empty() {
            return vec![];
        }

        let max_freq = *frequencies
            .values()
            .max()
            .expect("Can't not find max frequency") as f32;

        let mut normalized_freqs: Vec<(&str, f32)> = frequencies
            .into_iter()
            .map(|(key, val)| (key, val as f32 / max_freq))
            .collect();

        normalized_freqs.sort_by(|a, b| {
            if a.1 != b.1 {
                (b.1).partial_cmp(&a.1).unwrap()
            } else {
                (a.0).partial_cmp(b.0).unwrap()
            }
        });

        if self.max_words > 0 {
            normalized_freqs.truncate(self.max_words);
        }

        normalized_freqs
    }
}

#[cfg(test)]
mod tests {
    use super::WordTokenizer;

    #[test]
    fn splits_on_word_boundaries() {
        let tokenizer = WordTokenizer::default();
        assert_eq!(
            tokenizer.tokenize("hello, world! سلام دنیا"),
            vec!["hello", "world", "سلام", "دنیا"]
        );
    }

    #[test]
    fn no_token_is_empty() {
        let tokenizer = WordTokenizer::default();
        assert!(tokenizer
            .tokenize("a .. b -- c !!")
            .iter()
            .all(|token| !token.is_empty()));
    }

    #[test]
    fn numbers_are_excluded_by_default() {
        let tokenizer = WordTokenizer::default();
        assert_eq!(
            tokenizer.tokenize("call me 123 times"),
            vec!["call", "me", "times"]
        );

        let keep_numbers = WordTokenizer::default().with_exclude_numbers(false);
        assert_eq!(
            keep_numbers.tokenize("call me 123 times"),
            vec!["call", "me", "123", "times"]
        );
    }

    #[test]
    fn custom_dictionary_words_stay_whole() {
        let tokenizer = WordTokenizer::default().with_word("悟空传");
        assert_eq!(tokenizer.tokenize("悟空传"), vec!["悟空传"]);
    }

    #[test]
    fn custom_dictionary_words_count_as_one_entry() {
        let tokenizer = WordTokenizer::default().with_word("悟空传");
        assert_eq!(
            tokenizer.get_normalized_word_frequencies("悟空传"),
            vec![("悟空传", 1.0)]
        );
    }

    #[test]
    fn min_word_length_counts_chars_not_bytes() {
        let tokenizer = WordTokenizer::default().with_min_word_length(3);
        assert_eq!(tokenizer.tokenize("به سلام an and"), vec!["سلام", "and"]);
    }

    #[test]
    fn tokenization_is_restartable() {
        let tokenizer = WordTokenizer::default();
        let text = "one two two";
        assert_eq!(tokenizer.tokenize(text), tokenizer.tokenize(text));
    }

    #[test]
    fn extra_filter_list_is_case_insensitive() {
        let tokenizer = WordTokenizer::default().with_filter(&["Spam"]);
        assert_eq!(tokenizer.tokenize("spam SPAM ham"), vec!["ham"]);
    }

    #[test]
    fn max_words_caps_frequency_queries() {
        let tokenizer = WordTokenizer::default().with_max_words(2);
        let frequencies = tokenizer.get_normalized_word_frequencies("a a a b b c d");
        assert_eq!(frequencies.len(), 2);
        assert_eq!(frequencies[0].0, "a");
    }

    #[test]
    fn frequencies_merge_casings_to_most_common() {
        let tokenizer = WordTokenizer::default();
        let frequencies = tokenizer.get_word_frequencies("Rust rust rust RUST");
        assert_eq!(frequencies.len(), 1);
        assert_eq!(frequencies.get("rust"), Some(&4));
    }

    #[test]
    fn normalized_frequencies_are_sorted_and_scaled() {
        let tokenizer = WordTokenizer::default();
        let frequencies = tokenizer.get_normalized_word_frequencies("b b b a a c");
        assert_eq!(frequencies[0], ("b", 1.0));
        assert_eq!(frequencies[1].0, "a");
        assert!(frequencies[1].1 < 1.0);
        assert_eq!(frequencies.last().unwrap().0, "c");
    }
}
