/// How the store folds unquoted identifiers.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierCase {
    Upper,
    Lower,
    #[default]
    Mixed,
}

/// Information discovered from the store once, when the database is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreMetadata {
    pub product_name: String,
    pub product_version: String,
    /// Keywords reported by the store on top of the standard ones.
    pub keywords: Vec<String>,
    pub identifier_quote: String,
    pub identifier_case: IdentifierCase,
}

impl Default for StoreMetadata {
    fn default() -> Self {
        Self {
            product_name: String::new(),
            product_version: String::new(),
            keywords: Vec::new(),
            identifier_quote: "\"".into(),
            identifier_case: IdentifierCase::Mixed,
        }
    }
}
