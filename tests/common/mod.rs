#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use recipe_sync::{Category, RawMeals, RecipeApi, SyncError};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};

pub type Reply = Result<RawMeals, SyncError>;

/// Fake meal API whose search responses are released by the test.
///
/// Each `search_by_name` call reports its keyword on the `started` channel
/// and then waits for the reply registered with [`GatedApi::gate`].
pub struct GatedApi {
    started: mpsc::UnboundedSender<String>,
    gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    aborted: AtomicUsize,
}

impl GatedApi {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (started, started_rx) = mpsc::unbounded_channel();
        let api = Arc::new(Self {
            started,
            gates: Mutex::new(HashMap::new()),
            aborted: AtomicUsize::new(0),
        });
        (api, started_rx)
    }

    /// Hold the next search for `keyword` until the returned sender fires
    pub fn gate(&self, keyword: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(keyword.to_string(), rx);
        tx
    }

    /// Requests whose future was dropped before a reply arrived
    pub fn aborted(&self) -> usize {
        self.aborted.load(Ordering::SeqCst)
    }
}

struct AbortProbe<'a> {
    aborted: &'a AtomicUsize,
    finished: bool,
}

impl Drop for AbortProbe<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.aborted.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl RecipeApi for GatedApi {
    async fn search_by_name(&self, keyword: &str) -> Result<RawMeals, SyncError> {
        let gate = self.gates.lock().unwrap().remove(keyword);
        let mut probe = AbortProbe {
            aborted: &self.aborted,
            finished: false,
        };
        let _ = self.started.send(keyword.to_string());

        let reply = match gate {
            Some(gate) => gate.await.unwrap_or(Ok(None)),
            None => Ok(None),
        };
        probe.finished = true;
        reply
    }

    async fn list_by_first_letter(&self, _letter: char) -> Result<RawMeals, SyncError> {
        Ok(Some(vec![meal("100", "Beef and Mustard Pie")]))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, SyncError> {
        Ok(Vec::new())
    }
}

pub fn meal(id: &str, title: &str) -> Value {
    json!({
        "idMeal": id,
        "strMeal": title,
        "strCategory": "Miscellaneous",
        "strMealThumb": format!("https://www.themealdb.com/images/media/meals/{id}.jpg"),
        "strInstructions": "Cook it.",
        "strIngredient1": "Salt",
        "strMeasure1": "Pinch"
    })
}

pub fn titles(recipes: &[recipe_sync::Recipe]) -> Vec<String> {
    recipes.iter().map(|recipe| recipe.title.clone()).collect()
}
