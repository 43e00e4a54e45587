//! Duplicate-avoiding random selection

use rand::Rng;

use super::{QuoteCatalog, QuoteRecord};

impl QuoteCatalog {
    /// Pick a random quote that differs from `current`
    ///
    /// With a single quote in the catalog that quote is always returned.
    #[must_use]
    pub fn select_next(&self, current: Option<&str>) -> &QuoteRecord {
        self.select_next_with(&mut rand::thread_rng(), current)
    }

    /// Pick a random quote using the supplied generator
    ///
    /// Redraws while the drawn text equals `current`. Texts are unique within
    /// a catalog, so with two or more quotes at least one candidate is always
    /// accepted.
    #[must_use]
    pub fn select_next_with<R>(&self, rng: &mut R, current: Option<&str>) -> &QuoteRecord
    where
        R: Rng + ?Sized,
    {
        let records = self.records();
        if let [only] = records {
            return only;
        }

        loop {
            let candidate = &records[rng.gen_range(0..records.len())];
            if current != Some(candidate.text.as_str()) {
                return candidate;
            }
            tracing::trace!("drew current quote again, resampling");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn catalog(texts: &[&str]) -> QuoteCatalog {
        QuoteCatalog::new(
            texts
                .iter()
                .map(|t| QuoteRecord::new(*t, "Author"))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn never_repeats_current_quote() {
        let catalog = catalog(&["a", "b", "c"]);
        let mut rng = StdRng::seed_from_u64(7);

        let mut current = catalog.select_next_with(&mut rng, None).text.clone();
        for _ in 0..1000 {
            let next = catalog.select_next_with(&mut rng, Some(&current));
            assert_ne!(next.text, current);
            current.clone_from(&next.text);
        }
    }

    #[test]
    fn two_quotes_alternate() {
        let catalog = catalog(&["first", "second"]);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1000 {
            assert_eq!(catalog.select_next_with(&mut rng, Some("first")).text, "second");
            assert_eq!(catalog.select_next_with(&mut rng, Some("second")).text, "first");
        }
    }

    #[test]
    fn single_quote_is_always_returned() {
        let catalog = catalog(&["only"]);

        for _ in 0..1000 {
            assert_eq!(catalog.select_next(Some("only")).text, "only");
            assert_eq!(catalog.select_next(None).text, "only");
        }
    }

    #[test]
    fn unknown_current_text_allows_any_quote() {
        let catalog = catalog(&["a", "b", "c", "d"]);
        let mut rng = StdRng::seed_from_u64(1);

        let seen: HashSet<&str> = (0..500)
            .map(|_| catalog.select_next_with(&mut rng, Some("not in list")).text.as_str())
            .collect();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn thread_rng_selection_avoids_current() {
        let catalog = QuoteCatalog::embedded().unwrap();
        let first = catalog.records()[0].text.clone();

        for _ in 0..1000 {
            assert_ne!(catalog.select_next(Some(&first)).text, first);
        }
    }
}
