pub mod config;
pub mod error;
pub mod search;
pub mod storage;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use search::NewsSearch;
pub use storage::ArticleStorage;
pub use types::{Article, ArticleQuery, Category, Language, NewArticle, SearchResult};
