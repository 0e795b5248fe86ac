//! TF-IDF vector space over product text, with articles projected into it.
//!
//! Document frequencies are counted over products only. When an article is
//! compared to a product, the article is treated as one more document, so
//! the IDF of a term is
//!
//! ```text
//! idf(t) = ln((1 + n) / (1 + df(t))) + 1,   n = products + 1
//! ```
//!
//! where `df(t)` includes the article if it contains `t`. An article's
//! scores therefore never depend on which other articles were indexed
//! alongside it.

use ahash::AHashMap;

use crate::vector_space::{VectorSpace, cosine_similarity};

/// Raw term counts of one document, sorted by term index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    counts: Vec<(usize, f64)>,
}

impl TermVector {
    fn from_counts(counts: AHashMap<usize, f64>) -> Self {
        let mut counts: Vec<(usize, f64)> = counts.into_iter().collect();
        counts.sort_unstable_by_key(|(term, _)| *term);
        TermVector { counts }
    }

    pub fn counts(&self) -> &[(usize, f64)] {
        &self.counts
    }

    pub fn contains(&self, term: usize) -> bool {
        self.counts.binary_search_by_key(&term, |(t, _)| *t).is_ok()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[derive(Debug, Clone)]
struct ArticleVector {
    terms: TermVector,
    weighted: Vec<(usize, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct TfIdfVectorSpace {
    vocabulary: AHashMap<String, usize>,
    terms: Vec<String>,
    /// Product document frequency, indexed by term. Terms at or past
    /// `document_frequency.len()` only occur in articles.
    document_frequency: Vec<usize>,
    articles: AHashMap<String, ArticleVector>,
    products: AHashMap<String, TermVector>,
}

impl TfIdfVectorSpace {
    /// Build the space from `(id, terms)` documents.
    ///
    /// Duplicate ids keep their first occurrence. With `max_features`, only
    /// the most frequent product terms (ties lexicographic) enter product
    /// vectors.
    pub fn build(
        articles: Vec<(String, Vec<String>)>,
        products: Vec<(String, Vec<String>)>,
        max_features: Option<usize>,
    ) -> Self {
        let mut seen = ahash::AHashSet::new();
        let products: Vec<(String, Vec<String>)> = products
            .into_iter()
            .filter(|(id, _)| seen.insert(id.clone()))
            .collect();

        let mut frequency: AHashMap<&str, (usize, usize)> = AHashMap::new();
        for (_, terms) in &products {
            let mut in_doc = ahash::AHashSet::new();
            for term in terms {
                let entry = frequency.entry(term.as_str()).or_insert((0, 0));
                entry.0 += 1;
                if in_doc.insert(term.as_str()) {
                    entry.1 += 1;
                }
            }
        }

        let mut product_terms: Vec<(&str, usize, usize)> = frequency
            .into_iter()
            .map(|(term, (total, df))| (term, total, df))
            .collect();
        if let Some(limit) = max_features {
            product_terms.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            product_terms.truncate(limit);
        }
        product_terms.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut space = TfIdfVectorSpace::default();
        for (term, _, df) in &product_terms {
            space.vocabulary.insert(term.to_string(), space.terms.len());
            space.terms.push(term.to_string());
            space.document_frequency.push(*df);
        }

        for (id, terms) in &products {
            let mut counts = AHashMap::new();
            for term in terms {
                if let Some(&index) = space.vocabulary.get(term) {
                    *counts.entry(index).or_insert(0.0) += 1.0;
                }
            }
            space.products.insert(id.clone(), TermVector::from_counts(counts));
        }

        let mut article_only: Vec<&str> = articles
            .iter()
            .flat_map(|(_, terms)| terms.iter().map(String::as_str))
            .filter(|term| !space.vocabulary.contains_key(*term))
            .collect();
        article_only.sort_unstable();
        article_only.dedup();
        for term in article_only {
            space.vocabulary.insert(term.to_string(), space.terms.len());
            space.terms.push(term.to_string());
        }

        for (id, terms) in articles {
            if space.articles.contains_key(&id) {
                continue;
            }
            let mut counts = AHashMap::new();
            for term in &terms {
                if let Some(&index) = space.vocabulary.get(term) {
                    *counts.entry(index).or_insert(0.0) += 1.0;
                }
            }
            let terms = TermVector::from_counts(counts);
            let weighted = terms
                .counts
                .iter()
                .map(|&(term, tf)| (term, tf * space.idf(term, true)))
                .collect();
            space.articles.insert(id, ArticleVector { terms, weighted });
        }

        space
    }

    /// Smoothed IDF of `term` with the article counted as a document.
    pub fn idf(&self, term: usize, in_article: bool) -> f64 {
        let n = (self.products.len() + 1) as f64;
        let df = self.document_frequency.get(term).copied().unwrap_or(0) + usize::from(in_article);
        ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0
    }

    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn article_vector(&self, article_id: &str) -> Option<&TermVector> {
        self.articles.get(article_id).map(|a| &a.terms)
    }

    pub fn product_vector(&self, product_id: &str) -> Option<&TermVector> {
        self.products.get(product_id)
    }

    pub fn num_articles(&self) -> usize {
        self.articles.len()
    }

    pub fn num_products(&self) -> usize {
        self.products.len()
    }

    /// Number of distinct terms across products and articles.
    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty() && self.products.is_empty()
    }
}

impl VectorSpace for TfIdfVectorSpace {
    fn similarity(&self, article_id: &str, product_id: &str) -> f64 {
        let (Some(article), Some(product)) =
            (self.articles.get(article_id), self.products.get(product_id))
        else {
            return 0.0;
        };

        let weighted: Vec<(usize, f64)> = product
            .counts
            .iter()
            .map(|&(term, tf)| (term, tf * self.idf(term, article.terms.contains(term))))
            .collect();

        cosine_similarity(&article.weighted, &weighted)
    }

    fn contains_article(&self, article_id: &str) -> bool {
        self.articles.contains_key(article_id)
    }

    fn shared_terms(&self, article_id: &str, product_id: &str) -> Vec<String> {
        let (Some(article), Some(product)) =
            (self.articles.get(article_id), self.products.get(product_id))
        else {
            return Vec::new();
        };

        let mut shared: Vec<(usize, f64)> = article
            .weighted
            .iter()
            .filter(|(term, _)| product.contains(*term))
            .copied()
            .collect();
        shared.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| self.terms[a.0].cmp(&self.terms[b.0]))
        });
        shared.into_iter().map(|(term, _)| self.terms[term].clone()).collect()
    }

    fn name(&self) -> &'static str {
        "tfidf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, terms: &[&str]) -> (String, Vec<String>) {
        (id.to_string(), terms.iter().map(|t| t.to_string()).collect())
    }

    fn sample() -> TfIdfVectorSpace {
        TfIdfVectorSpace::build(
            vec![
                doc("a1", &["wallet", "leather", "gift"]),
                doc("a2", &["flowers", "mother"]),
            ],
            vec![
                doc("p1", &["wallet", "leather"]),
                doc("p2", &["flowers", "bouquet"]),
                doc("p3", &["gift", "box"]),
            ],
            None,
        )
    }

    #[test]
    fn test_similarity_in_unit_range() {
        let space = sample();
        for article in ["a1", "a2"] {
            for product in ["p1", "p2", "p3"] {
                let s = space.similarity(article, product);
                assert!((0.0..=1.0).contains(&s), "{article}/{product} = {s}");
            }
        }
        assert!(space.similarity("a1", "p1") > space.similarity("a1", "p3"));
        assert_eq!(space.similarity("a1", "p2"), 0.0);
    }

    #[test]
    fn test_identical_documents_score_one() {
        let space = TfIdfVectorSpace::build(
            vec![doc("a", &["gift", "box"])],
            vec![doc("p", &["gift", "box"]), doc("q", &["gift"])],
            None,
        );
        assert!((space.similarity("a", "p") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_ids_score_zero() {
        let space = sample();
        assert_eq!(space.similarity("missing", "p1"), 0.0);
        assert_eq!(space.similarity("a1", "missing"), 0.0);
        assert!(space.contains_article("a1"));
        assert!(!space.contains_article("p1"));
    }

    #[test]
    fn test_empty_space() {
        let space = TfIdfVectorSpace::build(Vec::new(), Vec::new(), None);
        assert!(space.is_empty());
        assert_eq!(space.vocabulary_size(), 0);
        assert_eq!(space.similarity("a", "p"), 0.0);
    }

    #[test]
    fn test_article_scores_independent_of_other_articles() {
        let products = vec![
            doc("p1", &["wallet", "leather"]),
            doc("p2", &["flowers", "bouquet"]),
        ];
        let first = TfIdfVectorSpace::build(
            vec![doc("a1", &["wallet"]), doc("a2", &["flowers"])],
            products.clone(),
            None,
        );
        let second = TfIdfVectorSpace::build(
            vec![
                doc("a1", &["wallet"]),
                doc("a2", &["flowers", "bouquet", "wallet", "new"]),
            ],
            products,
            None,
        );
        assert_eq!(first.similarity("a1", "p1"), second.similarity("a1", "p1"));
        assert_eq!(first.similarity("a1", "p2"), second.similarity("a1", "p2"));
    }

    #[test]
    fn test_idf_is_smoothed() {
        let space = sample();
        let wallet = space.term_index("wallet").unwrap();
        let n = 4.0_f64;
        assert!((space.idf(wallet, false) - ((1.0 + n) / 2.0).ln() - 1.0).abs() < 1e-12);
        assert!((space.idf(wallet, true) - ((1.0 + n) / 3.0).ln() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let space = TfIdfVectorSpace::build(
            Vec::new(),
            vec![
                doc("p1", &["gift", "box"]),
                doc("p2", &["gift", "card"]),
                doc("p3", &["gift", "box"]),
            ],
            Some(2),
        );
        assert!(space.term_index("gift").is_some());
        assert!(space.term_index("box").is_some());
        assert!(space.term_index("card").is_none());
        assert!(space.product_vector("p2").unwrap().len() == 1);
    }

    #[test]
    fn test_shared_terms() {
        let space = sample();
        let shared = space.shared_terms("a1", "p1");
        assert_eq!(shared.len(), 2);
        assert!(shared.contains(&"wallet".to_string()));
        assert!(space.shared_terms("a1", "p2").is_empty());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let space = TfIdfVectorSpace::build(
            vec![doc("a", &["gift"]), doc("a", &["box"])],
            vec![doc("p", &["gift"]), doc("p", &["box"])],
            None,
        );
        assert_eq!(space.num_products(), 1);
        assert!(space.similarity("a", "p") > 0.0);
    }
}
