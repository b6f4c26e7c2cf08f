//! Text normalizer — canonical comparison keys for headers and aliases.
//!
//! A key is the input with accents removed (canonical decomposition, then
//! combining marks dropped), lower-cased, and reduced to ASCII letters and
//! digits. Keys are only ever compared, never displayed.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Canonical key for `text`. Total and idempotent.
pub fn normalize(text: &str) -> String {
    text.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn strips_accents() {
        assert_eq!(normalize("Evolução"), "evolucao");
        assert_eq!(normalize("Evolucao"), "evolucao");
        assert_eq!(normalize("Ação Média"), "acaomedia");
    }

    #[test]
    fn strips_case_spacing_and_punctuation() {
        assert_eq!(normalize("  Data Fecho "), "datafecho");
        assert_eq!(normalize("DataFecho"), "datafecho");
        assert_eq!(normalize("Evol %"), "evol");
        assert_eq!(normalize("Financeiro_Venda (R$)"), "financeirovendar");
        assert_eq!(normalize("Atual (AG)"), "atualag");
    }

    #[test]
    fn empty_and_symbol_only_inputs_give_empty_key() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("%$#"), "");
    }

    #[test]
    fn is_idempotent() {
        let samples = [
            "Evolução %",
            "NomeCorretora",
            "  Ünïcödé—Header  ",
            "İstanbul",
            "ﬁnanceiro",
            "12/01/2024",
            "",
            "Straße",
            "ÅNGSTRÖM",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn is_idempotent_on_seeded_random_strings() {
        // Header-like characters weighted in, plus arbitrary scalar values.
        const POOL: &[char] = &[
            'a', 'Z', '0', '9', ' ', '%', '_', '.', ',', '(', ')', 'ç', 'Ç', 'ã', 'é', 'ü',
            'ß', 'ﬁ', 'İ', 'Å', '\u{0301}', '\u{0327}', '\u{00A0}', '\t', '—', '€',
        ];
        let mut rng = Pcg64Mcg::seed_from_u64(0x5EED_0F_C0FFEE);
        for _ in 0..2_000 {
            let len = rng.gen_range(0..24);
            let s: String = (0..len)
                .map(|_| {
                    if rng.gen_bool(0.7) {
                        POOL[rng.gen_range(0..POOL.len())]
                    } else {
                        rng.gen::<char>()
                    }
                })
                .collect();
            let once = normalize(&s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
            assert!(once.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }
}
