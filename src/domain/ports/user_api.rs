use crate::domain::entities::{ServiceData, User};
use crate::domain::errors::ClientResult;
use async_trait::async_trait;

#[async_trait]
pub trait UserApi: Send + Sync {
    async fn get_user(&self, user_id: &str) -> ClientResult<User>;
    async fn get_users_for_service(&self, service_id: &str) -> ClientResult<Vec<User>>;
    async fn get_services_for_user(&self, user_id: &str) -> ClientResult<Vec<ServiceData>>;
}
