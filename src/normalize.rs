use regex::Regex;

/// Deterministic text canonicalization applied before tokenization.
///
/// Unifies Arabic presentation variants with their Persian forms, strips
/// harakat, maps Eastern digits to ASCII and replaces zero-width joiners
/// with a plain space so the tokenizer sees compound words as separate
/// tokens. Same input always yields the same output.
pub struct Normalizer {
    whitespace: Regex,
}

impl Default for Normalizer {
    fn default() -> Self {
        let whitespace = Regex::new(r"\s+").expect("Unable to compile whitespace regex");

        Normalizer { whitespace }
    }
}

impl Normalizer {
    pub fn normalize(&self, text: &str) -> String {
        let mut unified = String::with_capacity(text.len());

        for c in text.chars() {
            match c {
                // zero-width non-joiner / joiner, must become a real space
                // before tokenization or compound words merge
                '\u{200c}' | '\u{200d}' => unified.push(' '),
                // Arabic yeh variants
                'ي' | 'ى' => unified.push('ی'),
                // Arabic kaf
                'ك' => unified.push('ک'),
                // teh marbuta
                'ة' => unified.push('ه'),
                // harakat (tanwin, fatha, damma, kasra, shadda, sukun, ...)
                // and the superscript alef, plus tatweel
                '\u{064b}'..='\u{0655}' | '\u{0670}' | '\u{0640}' => {}
                // Persian digits
                '۰'..='۹' => {
                    let digit = c as u32 - '۰' as u32;
                    unified.push(char::from(b'0' + digit as u8));
                }
                // Arabic-Indic digits
                '٠'..='٩' => {
                    let digit = c as u32 - '٠' as u32;
                    unified.push(char::from(b'0' + digit as u8));
                }
                _ => unified.push(c),
            }
        }

        self.whitespace.replace_all(&unified, " ").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::Normalizer;

    #[test]
    fn joiners_become_spaces() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize("می\u{200c}خواهم"), "می خواهم");
        assert_eq!(normalizer.normalize("a\u{200d}b"), "a b");
    }

    #[test]
    fn arabic_characters_are_unified() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize("علي"), "علی");
        assert_eq!(normalizer.normalize("كتاب"), "کتاب");
    }

    #[test]
    fn harakat_are_stripped() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize("مُحَمَّد"), "محمد");
    }

    #[test]
    fn eastern_digits_become_ascii() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize("۱۲۳"), "123");
        assert_eq!(normalizer.normalize("٤٥"), "45");
    }

    #[test]
    fn whitespace_collapses_to_single_spaces() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.normalize("  hello \t\n world  "), "hello world");
    }

    #[test]
    fn normalization_is_deterministic() {
        let normalizer = Normalizer::default();
        let input = "سلام\u{200c}دنیا ۱۲";
        assert_eq!(normalizer.normalize(input), normalizer.normalize(input));
    }
}
