pub mod stopwords;

pub use stopwords::is_query_stopword;

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub keywords: Vec<String>,
}

impl Category {
    /// Plain substring match against already-normalized text.
    pub fn matches(&self, clean_text: &str) -> bool {
        let text = clean_text.to_lowercase();
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

/// Fixed table of USCIS topic categories and their keyword phrases.
pub struct CategoryTaxonomy {
    categories: Vec<Category>,
}

impl CategoryTaxonomy {
    pub fn new() -> Self {
        let mut taxonomy = Self {
            categories: Vec::new(),
        };

        taxonomy.add_category(
            "green_card",
            &[
                "green card",
                "i485",
                "adjustment of status",
                "aos",
                "permanent resident",
            ],
        );
        taxonomy.add_category(
            "citizenship",
            &[
                "n400",
                "citizenship",
                "naturalization",
                "oath ceremony",
                "citizen",
            ],
        );
        taxonomy.add_category(
            "work_visa",
            &[
                "h1b",
                // Never matches: normalization strips the hyphen, so "h1b" catches these.
                "h-1b",
                "i94",
                "work authorization",
                "ead",
                "work permit",
            ],
        );
        taxonomy.add_category(
            "family_visa",
            &[
                "i130",
                "family petition",
                "spouse visa",
                "fiance",
                "k1",
                "marriage",
            ],
        );
        taxonomy.add_category(
            "processing_issues",
            &[
                "delay",
                "waiting",
                "processing time",
                "stuck",
                "slow",
                "expedite",
            ],
        );

        taxonomy
    }

    fn add_category(&mut self, name: &str, keywords: &[&str]) {
        self.categories.push(Category {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        });
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }
}

impl Default for CategoryTaxonomy {
    fn default() -> Self {
        Self::new()
    }
}
