use reqwest::{Method, StatusCode};

use crate::domain::usuario::{Credenciales, LoginResponse};
use crate::repository::errors::{RepositoryError, RepositoryResult, detail_from_body};
use crate::repository::{ApiRepository, AuthReader};

impl AuthReader for ApiRepository {
    /// Exchanges credentials for a token.
    ///
    /// A 401 here is a refused login, not a stale session, so it bypasses
    /// the rejection latch and keeps the backend reason.
    async fn login(&self, credenciales: &Credenciales) -> RepositoryResult<LoginResponse> {
        let response = self
            .client
            .request(Method::POST, self.url(&["login"])?)
            .json(credenciales)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            let detail =
                detail_from_body(&body).unwrap_or_else(|| "Credenciales incorrectas".to_string());
            return Err(RepositoryError::Credentials(detail));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RepositoryError::from_status(status, &body));
        }

        Ok(response.json::<LoginResponse>().await?)
    }
}
