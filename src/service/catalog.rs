//! Article and product catalog as handed over by the data-loading side.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{Article, Product};

/// All articles and products of one catalog version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Deserialize)]
struct RawCatalog {
    #[serde(default)]
    articles: Vec<Value>,
    #[serde(default)]
    products: Vec<Value>,
}

impl Catalog {
    pub fn new(articles: Vec<Article>, products: Vec<Product>) -> Self {
        Catalog { articles, products }
    }

    /// Parse `{"articles": [...], "products": [...]}`.
    ///
    /// Entries that do not deserialize are skipped with a warning; only a
    /// document that is not a catalog object at all is an error.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_reader(reader)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let catalog = Self::from_reader(BufReader::new(File::open(path)?))?;
        debug!(
            path = %path.display(),
            articles = catalog.articles.len(),
            products = catalog.products.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    fn from_raw(raw: RawCatalog) -> Self {
        Catalog {
            articles: parse_entries(raw.articles, "article"),
            products: parse_entries(raw.products, "product"),
        }
    }

    pub fn article(&self, article_id: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == article_id)
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// CRC32 of the catalog's canonical JSON form.
    pub fn fingerprint(&self) -> Result<u32> {
        let bytes = serde_json::to_vec(self)?;
        Ok(crc32fast::hash(&bytes))
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty() && self.products.is_empty()
    }
}

fn parse_entries<T: serde::de::DeserializeOwned>(values: Vec<Value>, kind: &str) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let id = value
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(kind, index, id = %id, error = %e, "skipping malformed catalog entry");
                    None
                }
            }
        })
        .collect()
}
