use crate::core::models::{Activity, Relationship};
use crate::core::types::RelationType;
use crate::errors::{Error, Result};
use crate::store::GraphStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Neo4j client speaking the HTTP transactional Cypher API
/// (`/db/{database}/tx/commit`). Every call is a single auto-committed
/// transaction.
#[derive(Debug, Clone)]
pub struct Neo4jStore {
    client: reqwest::Client,
    base_url: String,
    database: String,
    user: String,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
struct CypherRequest {
    statements: Vec<CypherStatement>,
}

#[derive(Debug, Serialize)]
struct CypherStatement {
    statement: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct CypherResponse {
    #[serde(default)]
    results: Vec<CypherResult>,
    #[serde(default)]
    errors: Vec<CypherError>,
}

#[derive(Debug, Deserialize)]
struct CypherResult {
    #[serde(default)]
    data: Vec<CypherRow>,
}

#[derive(Debug, Deserialize)]
struct CypherRow {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct CypherError {
    code: String,
    message: String,
}

impl Neo4jStore {
    pub fn new(
        base_url: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: Option<String>,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url,
            database: database.into(),
            user: user.into(),
            password,
        }
    }

    fn commit_url(&self) -> String {
        format!("{}/db/{}/tx/commit", self.base_url, self.database)
    }

    async fn run(&self, statement: &str, parameters: Value) -> Result<Vec<Vec<Value>>> {
        let request = CypherRequest {
            statements: vec![CypherStatement {
                statement: statement.to_string(),
                parameters,
            }],
        };
        let response = self
            .client
            .post(self.commit_url())
            .basic_auth(&self.user, self.password.as_deref())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::store(format!("Neo4j returned {status}: {body}")));
        }

        let body: CypherResponse = response.json().await?;
        if let Some(err) = body.errors.first() {
            return Err(Error::store(format!(
                "Neo4j query failed ({}): {}",
                err.code, err.message
            )));
        }
        Ok(body
            .results
            .into_iter()
            .next()
            .map(|r| r.data.into_iter().map(|d| d.row).collect())
            .unwrap_or_default())
    }
}

fn row_str(row: &[Value], idx: usize) -> Result<&str> {
    row.get(idx)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::store(format!("Malformed Neo4j row: missing column {idx}")))
}

fn row_f64(row: &[Value], idx: usize) -> Result<f64> {
    row.get(idx)
        .and_then(Value::as_f64)
        .ok_or_else(|| Error::store(format!("Malformed Neo4j row: missing column {idx}")))
}

fn row_uuid(row: &[Value], idx: usize) -> Result<Uuid> {
    Uuid::parse_str(row_str(row, idx)?)
        .map_err(|e| Error::store(format!("Malformed Neo4j row: bad uuid: {e}")))
}

#[async_trait]
impl GraphStore for Neo4jStore {
    fn name(&self) -> &'static str {
        "Neo4j"
    }

    async fn health_check(&self) -> Result<()> {
        self.run("RETURN 1", json!({})).await.map(|_| ())
    }

    async fn load(&self) -> Result<(Vec<Activity>, Vec<Relationship>)> {
        let rows = self
            .run(
                "MATCH (a:Activity) RETURN a.id, a.name, a.description, a.duration",
                json!({}),
            )
            .await?;
        let mut activities = Vec::with_capacity(rows.len());
        for row in &rows {
            activities.push(Activity {
                id: row_uuid(row, 0)?,
                name: row_str(row, 1)?.to_string(),
                description: row_str(row, 2)?.to_string(),
                duration: row_f64(row, 3)?,
            });
        }

        let rows = self
            .run(
                "MATCH (p:Activity)-[r:PRECEDES]->(s:Activity) \
                 RETURN r.id, p.id, s.id, r.relation, r.lag",
                json!({}),
            )
            .await?;
        let mut relationships = Vec::with_capacity(rows.len());
        for row in &rows {
            relationships.push(Relationship {
                id: row_uuid(row, 0)?,
                predecessor: row_uuid(row, 1)?,
                successor: row_uuid(row, 2)?,
                relation: RelationType::try_from(row_str(row, 3)?)?,
                lag: row_f64(row, 4)?,
            });
        }
        Ok((activities, relationships))
    }

    async fn put_activity(&self, activity: &Activity) -> Result<()> {
        self.run(
            "MERGE (a:Activity {id: $id}) \
             SET a.name = $name, a.description = $description, a.duration = $duration",
            json!({
                "id": activity.id.to_string(),
                "name": activity.name,
                "description": activity.description,
                "duration": activity.duration,
            }),
        )
        .await
        .map(|_| ())
    }

    async fn delete_activity(&self, id: Uuid) -> Result<()> {
        self.run(
            "MATCH (a:Activity {id: $id}) DETACH DELETE a",
            json!({ "id": id.to_string() }),
        )
        .await
        .map(|_| ())
    }

    async fn put_relationship(&self, relationship: &Relationship) -> Result<()> {
        self.run(
            "MATCH (p:Activity {id: $pred}), (s:Activity {id: $succ}) \
             MERGE (p)-[r:PRECEDES {id: $id}]->(s) \
             SET r.relation = $relation, r.lag = $lag",
            json!({
                "id": relationship.id.to_string(),
                "pred": relationship.predecessor.to_string(),
                "succ": relationship.successor.to_string(),
                "relation": relationship.relation.to_string(),
                "lag": relationship.lag,
            }),
        )
        .await
        .map(|_| ())
    }

    async fn delete_relationship(&self, id: Uuid) -> Result<()> {
        self.run(
            "MATCH ()-[r:PRECEDES {id: $id}]->() DELETE r",
            json!({ "id": id.to_string() }),
        )
        .await
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_url_strips_trailing_slashes() {
        let store = Neo4jStore::new("http://localhost:7474///", "neo4j", "neo4j", None);
        assert_eq!(
            store.commit_url(),
            "http://localhost:7474/db/neo4j/tx/commit"
        );
    }

    #[test]
    fn cypher_response_parses_rows_and_errors() {
        let body = r#"{
            "results": [{"columns": ["a.id"], "data": [{"row": ["x"], "meta": [null]}]}],
            "errors": []
        }"#;
        let parsed: CypherResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.results[0].data[0].row[0], "x");

        let body = r#"{
            "results": [],
            "errors": [{"code": "Neo.ClientError.Statement.SyntaxError", "message": "bad"}]
        }"#;
        let parsed: CypherResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.errors[0].code, "Neo.ClientError.Statement.SyntaxError");
    }

    #[test]
    fn row_helpers_reject_missing_columns() {
        let row = vec![serde_json::json!("not-a-uuid")];
        assert!(row_uuid(&row, 0).is_err());
        assert!(row_str(&row, 5).is_err());
        assert!(row_f64(&row, 0).is_err());
    }
}
