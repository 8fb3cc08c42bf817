use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::model::Category;
use crate::SyncError;

/// Raw `meals` array as the API returns it. `None` means `"meals": null`,
/// which is how the API reports "no matches".
pub type RawMeals = Option<Vec<Value>>;

/// Remote meal database used by the store and the search controller
#[async_trait]
pub trait RecipeApi: Send + Sync {
    /// `GET /search.php?s=<keyword>`
    async fn search_by_name(&self, keyword: &str) -> Result<RawMeals, SyncError>;

    /// `GET /search.php?f=<letter>`
    async fn list_by_first_letter(&self, letter: char) -> Result<RawMeals, SyncError>;

    /// `GET /categories.php`
    async fn list_categories(&self) -> Result<Vec<Category>, SyncError>;
}

#[derive(Debug, Deserialize)]
struct MealsResponse {
    #[serde(default)]
    meals: RawMeals,
}

#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    #[serde(default)]
    categories: Option<Vec<Category>>,
}

/// [`RecipeApi`] over HTTP with `reqwest`.
///
/// Dropping a request future aborts the request and hands the connection
/// back, which is what search cancellation relies on.
#[derive(Debug, Clone)]
pub struct HttpRecipeApi {
    client: Client,
    base_url: String,
}

impl HttpRecipeApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SyncError> {
        Self::with_timeout(base_url, None)
    }

    /// No timeout unless one is given; requests otherwise live until they
    /// complete or are cancelled.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, SyncError> {
        Self::with_options(base_url, &crate::config::default_user_agent(), timeout)
    }

    pub fn with_options(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, SyncError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, SyncError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status {
                status: status.as_u16(),
                url,
            });
        }

        // Decode from bytes so a bad body reports as a decode error, not a transport one
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl RecipeApi for HttpRecipeApi {
    async fn search_by_name(&self, keyword: &str) -> Result<RawMeals, SyncError> {
        let response: MealsResponse = self.get_json("search.php", &[("s", keyword)]).await?;
        Ok(response.meals)
    }

    async fn list_by_first_letter(&self, letter: char) -> Result<RawMeals, SyncError> {
        let letter = letter.to_string();
        let response: MealsResponse = self.get_json("search.php", &[("f", letter.as_str())]).await?;
        Ok(response.meals)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, SyncError> {
        let response: CategoriesResponse = self.get_json("categories.php", &[]).await?;
        Ok(response.categories.unwrap_or_default())
    }
}
