use async_trait::async_trait;

use super::base_client::{field, NotifyClient};
use crate::domain::entities::{ServiceData, User};
use crate::domain::errors::ClientResult;
use crate::domain::ports::UserApi;

#[derive(Clone)]
pub struct UserApiClient {
    client: NotifyClient,
}

impl UserApiClient {
    pub fn new(client: NotifyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserApi for UserApiClient {
    async fn get_user(&self, user_id: &str) -> ClientResult<User> {
        field(self.client.get(&format!("/user/{}", user_id)).await?, "data")
    }

    async fn get_users_for_service(&self, service_id: &str) -> ClientResult<Vec<User>> {
        field(self.client.get(&format!("/service/{}/users", service_id)).await?, "data")
    }

    async fn get_services_for_user(&self, user_id: &str) -> ClientResult<Vec<ServiceData>> {
        let response = self
            .client
            .get_with_query("/service", &[("user_id", user_id)])
            .await?;
        field(response, "data")
    }
}
