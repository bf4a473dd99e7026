//! Emergency state for the web frontend.
//!
//! [`EmergencyData`] owns the containers the views render from. Every
//! operation makes one request and writes its outcome into the matching
//! container. Fetch failures are logged and leave the container empty
//! (`None`); the views render that as an error state.

use allerta_common::{
    links::EMERGENCIES_PATH,
    params::EmergencyParams,
    views::Emergency,
};
use tracing::{debug, error};

use crate::{
    ApiClient,
    format::{format_date, id_from_self},
    session::LoggedUser,
};

/// An emergency ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyEntry {
    /// Id taken from the record's self link.
    pub id: String,

    /// Start date in Italian long form.
    pub start_date: String,

    pub record: Emergency,
}

impl From<Emergency> for EmergencyEntry {
    fn from(record: Emergency) -> Self {
        Self {
            id: id_from_self(&record.self_link).to_string(),
            start_date: format_date(&record.start_date),
            record,
        }
    }
}

fn entries(records: Vec<Emergency>) -> Vec<EmergencyEntry> {
    records.into_iter().map(Into::into).collect()
}

fn emergency_path(id: &str) -> String {
    format!("{EMERGENCIES_PATH}/{id}")
}

#[derive(Debug, Clone)]
pub struct EmergencyData {
    client: ApiClient,

    /// The emergency shown on the details view.
    pub emergency: Option<EmergencyEntry>,

    /// Every emergency, oldest first.
    pub emergencies: Option<Vec<EmergencyEntry>>,

    /// Emergencies still "In corso".
    pub emergencies_in_progress: Option<Vec<EmergencyEntry>>,
}

impl EmergencyData {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            emergency: None,
            emergencies: Some(Vec::new()),
            emergencies_in_progress: Some(Vec::new()),
        }
    }

    /// Empties every container, e.g. on logout.
    pub fn reset(&mut self) {
        self.emergency = None;
        self.emergencies = Some(Vec::new());
        self.emergencies_in_progress = Some(Vec::new());
    }

    /// Number of stored emergencies, or 0 when the list cannot be fetched.
    pub async fn n_emergencies(&self) -> usize {
        match self.client.get::<Vec<Emergency>>(EMERGENCIES_PATH).await {
            Ok(records) => records.len(),
            Err(e) => {
                error!(error = %e, "Failed to count emergencies");
                0
            }
        }
    }

    pub async fn get_emergencies(&mut self) {
        self.emergencies = match self.client.get::<Vec<Emergency>>(EMERGENCIES_PATH).await {
            Ok(records) => Some(entries(records)),
            Err(e) => {
                error!(error = %e, "Failed to fetch emergencies");
                None
            }
        };
    }

    pub async fn get_emergency_by_id(&mut self, id: &str) {
        self.emergency = match self.client.get::<Emergency>(&emergency_path(id)).await {
            Ok(record) => Some(record.into()),
            Err(e) => {
                error!(error = %e, emergency_id = id, "Failed to fetch emergency");
                None
            }
        };
    }

    pub async fn get_emergencies_in_progress(&mut self) {
        let path = format!("{EMERGENCIES_PATH}?state=in_corso");
        self.emergencies_in_progress = match self.client.get::<Vec<Emergency>>(&path).await {
            Ok(records) => Some(entries(records)),
            Err(e) => {
                error!(error = %e, "Failed to fetch emergencies in progress");
                None
            }
        };
    }

    /// Reports an emergency and appends it to the list. Returns whether the
    /// report was accepted.
    pub async fn create_emergency(&mut self, user: &LoggedUser, data: &EmergencyParams) -> bool {
        let created = self
            .client
            .post::<_, Emergency>(EMERGENCIES_PATH, data, Some(&user.token))
            .await;

        match created {
            Ok(record) => {
                debug!(emergency_id = %record.id, "Emergency reported");
                self.emergencies
                    .get_or_insert_with(Vec::new)
                    .push(record.into());
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to create emergency");
                false
            }
        }
    }

    /// Sends `changes` to the emergency at `self_link` and replaces the
    /// matching entry in the list.
    pub async fn update_emergency(
        &mut self,
        user: &LoggedUser,
        self_link: &str,
        changes: &EmergencyParams,
    ) -> bool {
        let path = emergency_path(id_from_self(self_link));
        let updated = self
            .client
            .put::<_, Emergency>(&path, changes, Some(&user.token))
            .await;

        match updated {
            Ok(record) => {
                let entry = EmergencyEntry::from(record);
                if let Some(existing) = self
                    .emergencies
                    .iter_mut()
                    .flatten()
                    .find(|e| e.id == entry.id)
                {
                    *existing = entry.clone();
                }
                if self.emergency.as_ref().is_some_and(|e| e.id == entry.id) {
                    self.emergency = Some(entry);
                }
                true
            }
            Err(e) => {
                error!(error = %e, self_link, "Failed to update emergency");
                false
            }
        }
    }

    pub async fn delete_emergency_by_id(&mut self, user: &LoggedUser, id: &str) -> bool {
        match self.client.delete(&emergency_path(id), Some(&user.token)).await {
            Ok(()) => {
                if let Some(list) = self.emergencies.as_mut() {
                    list.retain(|e| e.id != id);
                }
                true
            }
            Err(e) => {
                error!(error = %e, emergency_id = id, "Failed to delete emergency");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use allerta_common::caller::Role;
    use httptest::{Expectation, Server, all_of, matchers::*, responders::*};
    use serde_json::{Value, json};

    use super::*;

    fn record(id: &str, title: &str, state: &str) -> Value {
        json!({
            "_id": id,
            "self": format!("/api/emergencies/{id}"),
            "title": title,
            "category": "Test Category",
            "description": "Test Description",
            "location": "Test Location",
            "startDate": "2021-09-01T00:00:00Z",
            "state": state,
            "createdAt": "2021-09-01T00:00:00Z",
            "updatedAt": "2021-09-01T00:00:00Z",
        })
    }

    fn operator() -> LoggedUser {
        LoggedUser {
            id: "01J8".into(),
            email: "op@example.com".into(),
            role: Role::Operator,
            token: "tok".into(),
        }
    }

    fn data(server: &Server) -> EmergencyData {
        EmergencyData::new(ApiClient::new(server.url_str("")).unwrap())
    }

    #[tokio::test]
    async fn fetches_and_formats_emergencies() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/emergencies")).respond_with(
                json_encoded(json!([record("a1", "Flood", "In corso"), record("b2", "Fire", "Terminato")])),
            ),
        );

        let mut data = data(&server);
        data.get_emergencies().await;

        let list = data.emergencies.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, "a1");
        assert_eq!(list[0].start_date, "1 settembre 2021, 00:00");
        assert_eq!(list[1].record.title, "Fire");
    }

    #[tokio::test]
    async fn failed_fetch_empties_container() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/emergencies/zz")).respond_with(
                status_code(404).body(r#"{"code":"NotFound","message":"Emergency not found"}"#),
            ),
        );

        let mut data = data(&server);
        data.get_emergency_by_id("zz").await;
        assert!(data.emergency.is_none());
    }

    #[tokio::test]
    async fn in_progress_uses_state_filter() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/api/emergencies"),
                request::query(url_decoded(contains(("state", "in_corso")))),
            ])
            .respond_with(json_encoded(json!([record("a1", "Flood", "In corso")]))),
        );

        let mut data = data(&server);
        data.get_emergencies_in_progress().await;

        let list = data.emergencies_in_progress.unwrap();
        assert_eq!(list.len(), 1);
        assert!(list[0].record.is_in_progress());
    }

    #[tokio::test]
    async fn counts_emergencies() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/emergencies")).respond_with(
                json_encoded(json!([record("a1", "Flood", "In corso"), record("b2", "Fire", "In corso")])),
            ),
        );

        assert_eq!(data(&server).n_emergencies().await, 2);
    }

    #[tokio::test]
    async fn count_is_zero_when_unreachable() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/emergencies"))
                .respond_with(status_code(500).body("not json")),
        );

        assert_eq!(data(&server).n_emergencies().await, 0);
    }

    #[tokio::test]
    async fn create_appends_with_bearer_token() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/api/emergencies"),
                request::headers(contains(("authorization", "Bearer tok"))),
                request::body(json_decoded(eq(json!({
                    "title": "Flood",
                    "startDate": "2021-09-01",
                })))),
            ])
            .respond_with(
                status_code(201)
                    .insert_header("Location", "/api/emergencies/a1")
                    .body(record("a1", "Flood", "In corso").to_string()),
            ),
        );

        let mut data = data(&server);
        let params = EmergencyParams {
            title: Some("Flood".into()),
            start_date: Some("2021-09-01".into()),
            ..Default::default()
        };

        assert!(data.create_emergency(&operator(), &params).await);
        let list = data.emergencies.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "a1");
    }

    #[tokio::test]
    async fn update_replaces_matching_entry() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/emergencies")).respond_with(
                json_encoded(json!([record("a1", "Flood", "In corso"), record("b2", "Fire", "In corso")])),
            ),
        );
        let mut terminated = record("b2", "Fire", "Terminato");
        terminated["endDate"] = json!("2021-09-02T10:00:00Z");
        server.expect(
            Expectation::matching(all_of![
                request::method_path("PUT", "/api/emergencies/b2"),
                request::headers(contains(("authorization", "Bearer tok"))),
            ])
            .respond_with(json_encoded(terminated)),
        );

        let mut data = data(&server);
        data.get_emergencies().await;

        let changes = EmergencyParams {
            state: Some("Terminato".into()),
            ..Default::default()
        };
        assert!(
            data.update_emergency(&operator(), "/api/emergencies/b2", &changes)
                .await
        );

        let list = data.emergencies.unwrap();
        assert_eq!(list[0].record.state, "In corso");
        assert_eq!(list[1].record.state, "Terminato");
        assert!(list[1].record.end_date.is_some());
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/emergencies")).respond_with(
                json_encoded(json!([record("a1", "Flood", "In corso"), record("b2", "Fire", "In corso")])),
            ),
        );
        server.expect(
            Expectation::matching(request::method_path("DELETE", "/api/emergencies/a1"))
                .respond_with(status_code(204)),
        );

        let mut data = data(&server);
        data.get_emergencies().await;
        assert!(data.delete_emergency_by_id(&operator(), "a1").await);

        let list = data.emergencies.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "b2");
    }

    #[tokio::test]
    async fn failed_delete_keeps_entry() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/api/emergencies"))
                .respond_with(json_encoded(json!([record("a1", "Flood", "In corso")]))),
        );
        server.expect(
            Expectation::matching(request::method_path("DELETE", "/api/emergencies/a1"))
                .respond_with(
                    status_code(401)
                        .body(r#"{"code":"Unauthorized","message":"Missing credentials"}"#),
                ),
        );

        let mut data = data(&server);
        data.get_emergencies().await;
        assert!(!data.delete_emergency_by_id(&operator(), "a1").await);
        assert_eq!(data.emergencies.unwrap().len(), 1);
    }

    #[test]
    fn reset_clears_containers() {
        let server = Server::run();
        let mut data = data(&server);
        data.emergencies = None;
        data.emergency = Some(
            serde_json::from_value::<Emergency>(record("a1", "Flood", "In corso"))
                .unwrap()
                .into(),
        );

        data.reset();

        assert!(data.emergency.is_none());
        assert_eq!(data.emergencies, Some(Vec::new()));
        assert_eq!(data.emergencies_in_progress, Some(Vec::new()));
    }
}
