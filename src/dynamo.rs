use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::types::AttributeValue;
use tracing::debug;

use crate::error::{Error, Result};

pub const MOVIES_TABLE: &str = "Movies";

pub type Item = HashMap<String, AttributeValue>;

#[async_trait]
pub trait ItemStore {
    /// Returns `None` when no item has `key`.
    async fn get_item(&self, table: &str, key: Item) -> Result<Option<Item>>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieInfo {
    pub plot: String,
    pub rating: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Movie {
    pub year: i32,
    pub title: String,
    pub info: MovieInfo,
}

impl Movie {
    pub fn key(year: i32, title: &str) -> Item {
        HashMap::from([
            ("year".to_owned(), AttributeValue::N(year.to_string())),
            ("title".to_owned(), AttributeValue::S(title.to_owned())),
        ])
    }

    pub fn to_item(&self) -> Item {
        let info = HashMap::from([
            ("plot".to_owned(), AttributeValue::S(self.info.plot.clone())),
            ("rating".to_owned(), AttributeValue::N(self.info.rating.to_string())),
        ]);
        let mut item = Movie::key(self.year, &self.title);
        item.insert("info".to_owned(), AttributeValue::M(info));
        item
    }

    /// `year` and `title` are required. A missing `info` map, or missing
    /// fields inside it, decode to their defaults.
    pub fn from_item(item: &Item) -> Result<Self> {
        let year = number(item, "year")?
            .ok_or_else(|| Error::decode("movie", "missing attribute year"))?;
        let title = string(item, "title")?
            .ok_or_else(|| Error::decode("movie", "missing attribute title"))?;
        let info = match item.get("info") {
            None => MovieInfo::default(),
            Some(value) => {
                let info = value
                    .as_m()
                    .map_err(|_| Error::decode("movie", "attribute info is not a map"))?;
                MovieInfo {
                    plot: string(info, "plot")?.unwrap_or_default(),
                    rating: number(info, "rating")?.unwrap_or_default(),
                }
            }
        };
        Ok(Movie { year, title, info })
    }
}

fn string(item: &Item, name: &str) -> Result<Option<String>> {
    match item.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_s()
            .map(|s| Some(s.clone()))
            .map_err(|_| Error::decode("movie", format!("attribute {} is not a string", name))),
    }
}

fn number<T: std::str::FromStr>(item: &Item, name: &str) -> Result<Option<T>> {
    match item.get(name) {
        None => Ok(None),
        Some(value) => {
            let n = value.as_n().map_err(|_| {
                Error::decode("movie", format!("attribute {} is not a number", name))
            })?;
            n.parse().map(Some).map_err(|_| {
                Error::decode("movie", format!("attribute {} has bad number {:?}", name, n))
            })
        }
    }
}

/// Looks up one movie by its primary key. An absent item is `Ok(None)`, not
/// an error.
pub async fn get_movie<S: ItemStore + ?Sized>(
    store: &S,
    table: &str,
    year: i32,
    title: &str,
) -> Result<Option<Movie>> {
    debug!("getting {:?} ({}) from {}", title, year, table);
    match store.get_item(table, Movie::key(year, title)).await? {
        Some(item) if !item.is_empty() => Ok(Some(Movie::from_item(&item)?)),
        _ => Ok(None),
    }
}

pub fn describe_lookup(year: i32, title: &str, movie: Option<&Movie>) -> String {
    match movie {
        None => format!("Could not find '{}' ({})", title, year),
        Some(movie) => format!(
            "Found item:\nYear:   {}\nTitle:  {}\nPlot:   {}\nRating: {}",
            movie.year, movie.title, movie.info.plot, movie.info.rating
        ),
    }
}

#[derive(Clone)]
pub struct DynamoService {
    pub client: aws_sdk_dynamodb::Client,
}

impl DynamoService {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_dynamodb::Client::new(config),
        }
    }
}

#[async_trait]
impl ItemStore for DynamoService {
    async fn get_item(&self, table: &str, key: Item) -> Result<Option<Item>> {
        let resp = self
            .client
            .get_item()
            .table_name(table)
            .set_key(Some(key))
            .send()
            .await?;
        Ok(resp.item)
    }
}
