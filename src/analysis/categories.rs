use crate::analysis::normalizer::Corpus;
use crate::models::{CategoryBreakdown, CategoryMatch};
use crate::taxonomy::CategoryTaxonomy;

pub struct CategoryTagger {
    taxonomy: CategoryTaxonomy,
}

impl CategoryTagger {
    pub fn new() -> Self {
        Self {
            taxonomy: CategoryTaxonomy::new(),
        }
    }

    /// Categories are independent: one post may land in several, or none.
    pub fn tag(&self, corpus: &Corpus) -> CategoryBreakdown {
        let categories = self
            .taxonomy
            .categories()
            .iter()
            .map(|category| {
                let posts: Vec<_> = corpus
                    .iter()
                    .filter(|doc| category.matches(&doc.clean_text))
                    .map(|doc| doc.post.clone())
                    .collect();
                CategoryMatch {
                    name: category.name.clone(),
                    count: posts.len(),
                    posts,
                }
            })
            .collect();

        CategoryBreakdown { categories }
    }
}

impl Default for CategoryTagger {
    fn default() -> Self {
        Self::new()
    }
}
