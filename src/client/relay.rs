//! HTTP client for the upstream block API, usually reached through a relay.

use super::{ContentClient, blocks_from_values};
use crate::error::{FetchError, FetchResult};
use crate::model::{Block, PageMetadata};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Children below this depth are not fetched.
pub const MAX_FETCH_DEPTH: usize = 16;

const PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub api_version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RelayClient {
    http: Client,
    config: RelayConfig,
}

#[derive(Deserialize)]
struct ListPage {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

impl RelayClient {
    pub fn new(mut config: RelayConfig) -> FetchResult<Self> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| FetchError::Network(err.to_string()))?;
        Ok(Self { http, config })
    }

    fn children_url(&self, id: &str, cursor: Option<&str>) -> String {
        let mut url = format!(
            "{}/blocks/{}/children?page_size={}",
            self.config.base_url, id, PAGE_SIZE
        );
        if let Some(cursor) = cursor {
            url.push_str("&start_cursor=");
            url.push_str(cursor);
        }
        url
    }

    fn page_url(&self, id: &str) -> String {
        format!("{}/pages/{}", self.config.base_url, id)
    }

    fn get(&self, url: &str) -> FetchResult<Value> {
        debug!(url, "GET");
        let mut request = self.http.get(url);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }
        if let Some(version) = &self.config.api_version {
            request = request.header("Notion-Version", version);
        }

        let response = request.send()?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(FetchError::NotFound(url.to_string())),
            status if !status.is_success() => {
                let body = response.text().unwrap_or_default();
                Err(FetchError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
            _ => Ok(response.json()?),
        }
    }

    /// Every direct child of `id`, following pagination.
    fn list_children(&self, id: &str) -> FetchResult<Vec<Value>> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let url = self.children_url(id, cursor.as_deref());
            let page: ListPage = serde_json::from_value(self.get(&url)?)?;
            items.extend(page.results);
            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }
        Ok(items)
    }
}

impl ContentClient for RelayClient {
    fn try_fetch_blocks(&self, id: &str) -> FetchResult<Vec<Block>> {
        let tree = fetch_tree(id, MAX_FETCH_DEPTH, |parent| self.list_children(parent))?;
        info!(id, count = tree.len(), "fetched block tree");
        Ok(blocks_from_values(tree))
    }

    fn try_fetch_page_metadata(&self, id: &str) -> FetchResult<PageMetadata> {
        Ok(serde_json::from_value(self.get(&self.page_url(id))?)?)
    }

    fn describe(&self) -> String {
        self.config.base_url.clone()
    }
}

struct Node {
    value: Value,
    children: Vec<usize>,
}

/// Fetch the children of `root_id` breadth-first, attaching each block's
/// children under a `children` key. Blocks deeper than `max_depth`, or whose
/// child listing fails, keep no children; only a failed root listing is an
/// error.
pub(crate) fn fetch_tree<F>(root_id: &str, max_depth: usize, mut list: F) -> FetchResult<Vec<Value>>
where
    F: FnMut(&str) -> FetchResult<Vec<Value>>,
{
    let mut arena: Vec<Node> = Vec::new();
    let mut queue = VecDeque::new();

    let roots: Vec<usize> = list(root_id)?
        .into_iter()
        .map(|value| {
            arena.push(Node {
                value,
                children: Vec::new(),
            });
            arena.len() - 1
        })
        .collect();
    queue.extend(roots.iter().map(|&idx| (idx, 1)));

    while let Some((idx, depth)) = queue.pop_front() {
        let node = &arena[idx].value;
        if !node.get("has_children").and_then(Value::as_bool).unwrap_or(false) {
            continue;
        }
        let Some(id) = node.get("id").and_then(Value::as_str).map(str::to_string) else {
            continue;
        };
        if depth >= max_depth {
            warn!(id, depth, "block nesting too deep, children not fetched");
            continue;
        }

        let children = match list(&id) {
            Ok(children) => children,
            Err(err) => {
                warn!(id, error = %err, "failed to fetch children, block kept without them");
                continue;
            }
        };
        for value in children {
            arena.push(Node {
                value,
                children: Vec::new(),
            });
            let child = arena.len() - 1;
            arena[idx].children.push(child);
            queue.push_back((child, depth + 1));
        }
    }

    let mut slots: Vec<Option<Node>> = arena.into_iter().map(Some).collect();
    Ok(roots.into_iter().filter_map(|idx| assemble(&mut slots, idx)).collect())
}

fn assemble(slots: &mut [Option<Node>], idx: usize) -> Option<Value> {
    let Node {
        mut value,
        children,
    } = slots.get_mut(idx)?.take()?;
    if !children.is_empty() {
        let built: Vec<Value> = children
            .into_iter()
            .filter_map(|child| assemble(slots, child))
            .collect();
        if let Value::Object(map) = &mut value {
            map.insert("children".to_string(), Value::Array(built));
        }
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::list_results;
    use serde_json::json;
    use std::collections::HashMap;

    fn client() -> RelayClient {
        RelayClient::new(RelayConfig {
            base_url: "http://localhost:8787/v1/".into(),
            token: None,
            api_version: Some("2022-06-28".into()),
        })
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let client = client();
        assert_eq!(
            client.children_url("abc", None),
            "http://localhost:8787/v1/blocks/abc/children?page_size=100"
        );
        assert_eq!(
            client.children_url("abc", Some("cur")),
            "http://localhost:8787/v1/blocks/abc/children?page_size=100&start_cursor=cur"
        );
        assert_eq!(client.page_url("abc"), "http://localhost:8787/v1/pages/abc");
    }

    #[test]
    fn test_fetch_tree_attaches_children_breadth_first() {
        let responses: HashMap<&str, Value> = HashMap::from([
            (
                "page",
                json!([
                    {"id": "t", "type": "toggle", "has_children": true, "toggle": {"rich_text": []}},
                    {"id": "p", "type": "paragraph", "has_children": false, "paragraph": {"rich_text": []}}
                ]),
            ),
            (
                "t",
                json!([
                    {"id": "h", "type": "heading_2", "has_children": true, "heading_2": {"rich_text": []}}
                ]),
            ),
            (
                "h",
                json!([
                    {"id": "leaf", "type": "paragraph", "has_children": false, "paragraph": {"rich_text": []}}
                ]),
            ),
        ]);
        let mut order = Vec::new();
        let tree = fetch_tree("page", MAX_FETCH_DEPTH, |id| {
            order.push(id.to_string());
            Ok(list_results(responses.get(id).cloned().unwrap_or(json!([]))))
        })
        .unwrap();

        assert_eq!(order, ["page", "t", "h"]);
        let blocks: Vec<Block> = tree
            .into_iter()
            .map(Block::from)
            .collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].children[0].id, "h");
        assert_eq!(blocks[0].children[0].children[0].id, "leaf");
    }

    #[test]
    fn test_fetch_tree_depth_limit() {
        let tree = fetch_tree("root", 2, |id| {
            Ok(vec![json!({
                "id": format!("{}-c", id),
                "type": "toggle",
                "has_children": true,
                "toggle": {}
            })])
        })
        .unwrap();
        assert_eq!(tree.len(), 1);
        let child = &tree[0]["children"][0];
        assert_eq!(child["id"], "root-c-c");
        assert!(child.get("children").is_none());
    }

    #[test]
    fn test_fetch_tree_propagates_root_errors() {
        let result = fetch_tree("root", 4, |_| Err(FetchError::Network("down".into())));
        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[test]
    fn test_failed_child_listing_keeps_the_tree() {
        let tree = fetch_tree("page", MAX_FETCH_DEPTH, |id| match id {
            "page" => Ok(vec![
                json!({"id": "synced", "type": "synced_block", "has_children": true, "synced_block": {}}),
                json!({"id": "t", "type": "toggle", "has_children": true, "toggle": {"rich_text": []}}),
            ]),
            "synced" => Err(FetchError::Status {
                status: 404,
                body: "archived".into(),
            }),
            _ => Ok(vec![
                json!({"id": "leaf", "type": "paragraph", "paragraph": {"rich_text": []}}),
            ]),
        })
        .unwrap();

        assert_eq!(tree.len(), 2);
        assert!(tree[0].get("children").is_none());
        assert_eq!(tree[1]["children"][0]["id"], "leaf");
    }
}
